pub mod enums;
pub mod flag;
pub mod medicine;
pub mod user;

pub use enums::Role;
pub use flag::{FlagDetail, MedicineFlag};
pub use medicine::{Medicine, MedicineUpdate, NewMedicine};
pub use user::User;
