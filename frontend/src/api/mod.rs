pub mod client;
pub mod error;
mod steam;
pub mod types;

pub use client::*;
pub use error::ApiError;
pub use steam::*;
pub use types::*;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests;
