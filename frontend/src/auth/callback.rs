//! Completes a login once the provider redirects back to the callback route.

use crate::{
    api::{ApiError, SteamClient},
    auth::openid::{parse_callback, CallbackParams, OpenIdConfig},
    state::session::{materialize_session, IdentitySource, Session},
    utils::storage::SessionStore,
};

pub const LOGIN_SUCCESS_PATH: &str = "/?login=success";

/// User-facing reason codes for a refused login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    InvalidResponse,
    NoSteamId,
    NoProfile,
    SteamApiError,
    CallbackError,
}

impl LoginFailure {
    pub fn code(self) -> &'static str {
        match self {
            LoginFailure::InvalidResponse => "invalid_response",
            LoginFailure::NoSteamId => "no_steam_id",
            LoginFailure::NoProfile => "no_profile",
            LoginFailure::SteamApiError => "steam_api_error",
            LoginFailure::CallbackError => "callback_error",
        }
    }

    pub fn redirect_path(self) -> String {
        format!("/?error={}", self.code())
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "invalid_response" => Some(LoginFailure::InvalidResponse),
            "no_steam_id" => Some(LoginFailure::NoSteamId),
            "no_profile" => Some(LoginFailure::NoProfile),
            "steam_api_error" => Some(LoginFailure::SteamApiError),
            "callback_error" => Some(LoginFailure::CallbackError),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LoginFailure::InvalidResponse => "Steam returned an invalid login response.",
            LoginFailure::NoSteamId => "Could not read your Steam ID from the login response.",
            LoginFailure::NoProfile => "Could not load your Steam profile.",
            LoginFailure::SteamApiError => {
                "Could not reach the Steam API. Please check your configuration."
            }
            LoginFailure::CallbackError => "Steam login failed. Please try again.",
        }
    }
}

impl From<&ApiError> for LoginFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NoProfile(_) => LoginFailure::NoProfile,
            // The placeholder profile only appears when the relay cannot reach Steam.
            ApiError::SyntheticProfile(_)
            | ApiError::Configuration { .. }
            | ApiError::Upstream { .. }
            | ApiError::Transport(_)
            | ApiError::Decode(_) => LoginFailure::SteamApiError,
            ApiError::Validation(_) => LoginFailure::InvalidResponse,
            ApiError::NotAuthenticated | ApiError::Storage(_) => LoginFailure::CallbackError,
        }
    }
}

/// Validate, extract the Steam id, then materialize and persist the session.
pub async fn complete_login(
    openid: &OpenIdConfig,
    params: &CallbackParams,
    client: &SteamClient,
    store: &dyn SessionStore,
) -> Result<Session, LoginFailure> {
    if !openid.validate_callback(params) {
        return Err(LoginFailure::InvalidResponse);
    }
    let steam_id = parse_callback(params).ok_or_else(|| {
        log::warn!("OpenID identity did not contain a Steam id");
        LoginFailure::NoSteamId
    })?;

    materialize_session(client, store, steam_id, IdentitySource::Claimed)
        .await
        .map_err(|err| {
            log::error!("login failed: {}", err);
            LoginFailure::from(&err)
        })
}
