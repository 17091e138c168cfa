//! Steam OpenID 2.0 handshake, browser side.
//!
//! # Security
//!
//! Callback validation is structural only. `openid.sig` is checked for
//! presence and never verified against the provider's association, so a
//! forged callback can assert any Steam id. Sessions built from it carry
//! [`IdentitySource::Claimed`](crate::state::session::IdentitySource). Closing
//! this needs a provider-side `check_authentication` round trip from a trusted
//! server before the id is treated as verified.

use std::{collections::BTreeMap, sync::OnceLock};

use regex::Regex;
use url::Url;

use crate::api::{ApiError, SteamId};

pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
pub const STEAM_OPENID_LOGIN_URL: &str = "https://steamcommunity.com/openid/login";
pub const CALLBACK_PATH: &str = "/auth/steam/callback";
pub const MODE_SETUP: &str = "checkid_setup";
pub const MODE_ASSERTION: &str = "id_res";

pub const REQUIRED_CALLBACK_PARAMS: [&str; 9] = [
    "openid.ns",
    "openid.mode",
    "openid.identity",
    "openid.claimed_id",
    "openid.return_to",
    "openid.response_nonce",
    "openid.assoc_handle",
    "openid.signed",
    "openid.sig",
];

fn identity_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^https://steamcommunity\.com/openid/id/(\d+)/?$").ok())
        .as_ref()
}

/// Query parameters delivered to the callback route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams(BTreeMap<String, String>);

impl CallbackParams {
    /// Parses a raw query string (with or without the leading `?`). Repeated
    /// keys keep their first value.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (k, v) in iter {
            map.entry(k.into()).or_insert_with(|| v.into());
        }
        Self(map)
    }
}

/// Why a callback failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRejection {
    MissingParam(&'static str),
    UnexpectedMode(String),
    ReturnToMismatch { expected: String, actual: String },
}

impl std::fmt::Display for CallbackRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackRejection::MissingParam(name) => write!(f, "missing parameter {}", name),
            CallbackRejection::UnexpectedMode(mode) => write!(f, "unexpected mode {:?}", mode),
            CallbackRejection::ReturnToMismatch { expected, actual } => {
                write!(f, "return_to {:?} does not start with {:?}", actual, expected)
            }
        }
    }
}

impl From<CallbackRejection> for ApiError {
    fn from(rejection: CallbackRejection) -> Self {
        ApiError::Validation(rejection.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenIdConfig {
    origin: String,
    provider_login_url: String,
}

impl OpenIdConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            provider_login_url: STEAM_OPENID_LOGIN_URL.to_string(),
        }
    }

    pub fn with_provider_login_url(mut self, url: impl Into<String>) -> Self {
        self.provider_login_url = url.into();
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn callback_url(&self) -> String {
        format!("{}{}", self.origin, CALLBACK_PATH)
    }

    pub fn login_url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.provider_login_url).map_err(|e| ApiError::Configuration {
            operation: "building login redirect".into(),
            reason: format!("{}: {}", self.provider_login_url, e),
        })?;
        url.query_pairs_mut()
            .append_pair("openid.ns", OPENID_NS)
            .append_pair("openid.mode", MODE_SETUP)
            .append_pair("openid.return_to", &self.callback_url())
            .append_pair("openid.realm", &self.origin)
            .append_pair("openid.identity", IDENTIFIER_SELECT)
            .append_pair("openid.claimed_id", IDENTIFIER_SELECT);
        Ok(url)
    }

    /// Sends the browser to the provider. Does not return control on success.
    pub fn begin_login(&self) -> Result<(), ApiError> {
        let url = self.login_url()?;
        log::info!("redirecting to Steam OpenID login");
        #[cfg(target_arch = "wasm32")]
        crate::utils::browser::navigate(url.as_str());
        #[cfg(not(target_arch = "wasm32"))]
        log::debug!("no browser to navigate, login url: {}", url);
        Ok(())
    }

    pub fn check_callback(&self, params: &CallbackParams) -> Result<(), CallbackRejection> {
        for name in REQUIRED_CALLBACK_PARAMS {
            if params.non_empty(name).is_none() {
                return Err(CallbackRejection::MissingParam(name));
            }
        }
        let mode = params.get("openid.mode").unwrap_or_default();
        if mode != MODE_ASSERTION {
            return Err(CallbackRejection::UnexpectedMode(mode.to_string()));
        }
        let expected = self.callback_url();
        let return_to = params.get("openid.return_to").unwrap_or_default();
        if !return_to.starts_with(&expected) {
            return Err(CallbackRejection::ReturnToMismatch {
                expected,
                actual: return_to.to_string(),
            });
        }
        Ok(())
    }

    /// Structural check only; `openid.sig` is never verified. See the module docs.
    pub fn validate_callback(&self, params: &CallbackParams) -> bool {
        match self.check_callback(params) {
            Ok(()) => true,
            Err(rejection) => {
                log::warn!("rejecting OpenID callback: {}", rejection);
                false
            }
        }
    }
}

pub fn validate_callback(config: &OpenIdConfig, params: &CallbackParams) -> bool {
    config.validate_callback(params)
}

/// Extracts the Steam id from `openid.identity`.
pub fn parse_callback(params: &CallbackParams) -> Option<SteamId> {
    let identity = params.get("openid.identity")?;
    let captures = identity_pattern()?.captures(identity)?;
    SteamId::parse(captures.get(1)?.as_str()).ok()
}

#[cfg(test)]
pub(crate) fn valid_callback(origin: &str, steam_id: &str) -> CallbackParams {
    let identity = format!("https://steamcommunity.com/openid/id/{}", steam_id);
    [
        ("openid.ns", OPENID_NS.to_string()),
        ("openid.mode", MODE_ASSERTION.to_string()),
        ("openid.op_endpoint", STEAM_OPENID_LOGIN_URL.to_string()),
        ("openid.claimed_id", identity.clone()),
        ("openid.identity", identity),
        ("openid.return_to", format!("{}{}", origin, CALLBACK_PATH)),
        ("openid.response_nonce", "2024-01-01T00:00:00ZabcDEF".to_string()),
        ("openid.assoc_handle", "1234567890".to_string()),
        (
            "openid.signed",
            "signed,op_endpoint,claimed_id,identity,return_to,response_nonce,assoc_handle"
                .to_string(),
        ),
        ("openid.sig", "c2lnbmF0dXJl".to_string()),
    ]
    .into_iter()
    .collect()
}
