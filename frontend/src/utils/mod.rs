#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod images;
pub mod pacing;
pub mod storage;
pub mod time;

pub use images::{game_image_url, ImageSize};
