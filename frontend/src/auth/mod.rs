pub mod callback;
pub mod openid;

pub use callback::{complete_login, LoginFailure, LOGIN_SUCCESS_PATH};
pub use openid::{parse_callback, validate_callback, CallbackParams, OpenIdConfig};
