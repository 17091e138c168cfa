use std::{rc::Rc, time::Duration};

use chrono::{DateTime, Utc};
use leptos::*;
use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiError, PlayerSummary, SteamClient, SteamId},
    utils::{
        storage::{self, SessionStore},
        time,
    },
};

/// Persona name the gateway's old mock profile carried.
pub const FALLBACK_PERSONA_NAME: &str = "Steam User";
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// How the subject id was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// Taken from a structurally valid OpenID callback; the signature was not verified.
    Claimed,
    Verified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub steam_id: SteamId,
    pub profile: PlayerSummary,
    pub source: IdentitySource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn steam_id(&self) -> Option<&SteamId> {
        self.session.as_ref().map(|s| &s.steam_id)
    }
}

pub type SessionContext = (ReadSignal<SessionState>, WriteSignal<SessionState>);

/// The persisted store shared through context.
#[derive(Clone)]
pub struct SessionStoreHandle(pub Rc<dyn SessionStore>);

impl SessionStoreHandle {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self(Rc::new(store))
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.0.as_ref()
    }
}

/// True when `profile` is indistinguishable from the fallback placeholder:
/// sentinel name and an id echoing the request.
pub fn is_synthetic_profile(requested: &SteamId, profile: &PlayerSummary) -> bool {
    profile.personaname == FALLBACK_PERSONA_NAME && profile.steamid == requested.as_str()
}

/// Only a player whose id equals the requested one counts as that user's profile.
fn pick_profile(requested: &SteamId, players: Vec<PlayerSummary>) -> Option<PlayerSummary> {
    let returned = players.len();
    let profile = players
        .into_iter()
        .find(|p| p.steamid == requested.as_str());
    if profile.is_none() && returned > 0 {
        log::warn!(
            "profile lookup for {} returned {} players, none matching",
            requested,
            returned
        );
    }
    profile
}

/// Fetches the profile for `steam_id`, refuses placeholders and persists the session.
pub async fn materialize_session(
    client: &SteamClient,
    store: &dyn SessionStore,
    steam_id: SteamId,
    source: IdentitySource,
) -> Result<Session, ApiError> {
    let players = client
        .get_player_summaries(std::slice::from_ref(&steam_id))
        .await?;
    let profile = pick_profile(&steam_id, players)
        .ok_or_else(|| ApiError::NoProfile(steam_id.to_string()))?;

    if is_synthetic_profile(&steam_id, &profile) {
        log::warn!("refusing synthetic fallback profile for {}", steam_id);
        return Err(ApiError::SyntheticProfile(steam_id.to_string()));
    }

    let session = Session {
        steam_id,
        profile,
        source,
        created_at: time::now(),
    };
    store.persist(&session, SESSION_TTL)?;
    log::info!("session created for {}", session.steam_id);
    Ok(session)
}

/// Loads the persisted session at startup. Corrupt entries are cleared and
/// reported as absent.
pub fn restore_session(store: &dyn SessionStore) -> Option<Session> {
    match store.load() {
        Ok(session) => session,
        Err(err) => {
            log::warn!("discarding unreadable session: {}", err);
            if let Err(clear_err) = store.clear() {
                log::error!("failed to clear session: {}", clear_err);
            }
            None
        }
    }
}

pub fn sign_in(set_state: WriteSignal<SessionState>, session: Session) {
    set_state.update(|state| {
        state.session = Some(session);
        state.loading = false;
    });
}

pub fn logout(store: &dyn SessionStore, set_state: WriteSignal<SessionState>) {
    if let Err(err) = store.clear() {
        log::error!("failed to clear session: {}", err);
    }
    set_state.update(|state| {
        state.session = None;
        state.loading = false;
    });
}

fn create_session_context(store: &dyn SessionStore) -> SessionContext {
    create_signal(SessionState {
        session: restore_session(store),
        loading: false,
    })
}

#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let handle = use_context::<SessionStoreHandle>()
        .unwrap_or_else(|| SessionStoreHandle(storage::default_store()));
    let ctx = create_session_context(handle.store());
    provide_context::<SessionContext>(ctx);
    provide_context(handle);
    view! { <>{children()}</> }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().unwrap_or_else(|| create_signal(SessionState::default()))
}

pub fn use_session_store() -> SessionStoreHandle {
    use_context::<SessionStoreHandle>()
        .unwrap_or_else(|| SessionStoreHandle(storage::default_store()))
}

#[cfg(test)]
pub(crate) fn test_session(steam_id: &str, personaname: &str) -> Session {
    let profile: PlayerSummary = serde_json::from_value(serde_json::json!({
        "steamid": steam_id,
        "personaname": personaname,
        "communityvisibilitystate": 3
    }))
    .unwrap();
    Session {
        steam_id: SteamId::parse(steam_id).unwrap(),
        profile,
        source: IdentitySource::Claimed,
        created_at: time::now(),
    }
}
