pub mod flags;
pub mod health;
pub mod lookup;
pub mod medicines;
