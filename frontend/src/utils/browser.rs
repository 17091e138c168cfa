use web_sys::{Storage, Window};

use crate::api::ApiError;

pub fn window() -> Result<Window, ApiError> {
    web_sys::window().ok_or_else(|| ApiError::Storage("No window object".to_string()))
}

pub fn local_storage() -> Result<Storage, ApiError> {
    window()?
        .local_storage()
        .map_err(|_| ApiError::Storage("No localStorage".to_string()))?
        .ok_or_else(|| ApiError::Storage("No localStorage".to_string()))
}

pub fn current_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Full-page navigation; used for the identity provider redirect and post-login landing.
pub fn navigate(href: &str) {
    if let Some(win) = web_sys::window() {
        if let Err(err) = win.location().set_href(href) {
            log::error!("navigation to {} failed: {:?}", href, err);
        }
    }
}
