pub mod callback;
pub mod home;

pub use callback::*;
pub use home::*;
