pub mod cors;
pub mod logging;
pub mod request_id;

pub use cors::*;
pub use logging::*;
pub use request_id::*;
