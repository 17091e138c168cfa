use thiserror::Error;

/// Everything the client core can fail with.
///
/// Kept `Clone + PartialEq` so results can be stored in leptos signals and
/// compared in tests; transport errors are therefore flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A strict-mode call failed. The relay is unreachable, has no API key,
    /// or the upstream rejected the request outright.
    #[error("configuration error while {operation}: {reason}")]
    Configuration { operation: String, reason: String },
    #[error("Steam API request failed: {status} {status_text}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("no player profile found for {0}")]
    NoProfile(String),
    #[error("profile for {0} matches the fallback placeholder, refusing to sign in")]
    SyntheticProfile(String),
    #[error("invalid identity callback: {0}")]
    Validation(String),
    #[error("user not authenticated")]
    NotAuthenticated,
    #[error("session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn configuration(operation: impl Into<String>, cause: &ApiError) -> Self {
        ApiError::Configuration {
            operation: operation.into(),
            reason: cause.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Configuration { .. } => "CONFIGURATION_ERROR",
            ApiError::Upstream { .. } => "UPSTREAM_ERROR",
            ApiError::Transport(_) => "TRANSPORT_ERROR",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::NoProfile(_) => "NO_PROFILE",
            ApiError::SyntheticProfile(_) => "SYNTHETIC_PROFILE",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotAuthenticated => "NOT_AUTHENTICATED",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Text suitable for showing to the signed-in user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Configuration { .. } => {
                "Could not reach the Steam API. Please check your configuration.".into()
            }
            ApiError::Upstream { status, .. } => {
                format!("Steam API request failed (status {}).", status)
            }
            ApiError::NotAuthenticated => "Please login with Steam to continue.".into(),
            ApiError::NoProfile(_) | ApiError::SyntheticProfile(_) | ApiError::Validation(_) => {
                "Steam login failed. Please try again.".into()
            }
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Storage(_) => {
                "Something went wrong. Please try again later.".into()
            }
        }
    }
}
