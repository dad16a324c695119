pub mod flag;
pub mod medicine;
pub mod user;

pub use flag::*;
pub use medicine::*;
pub use user::*;
