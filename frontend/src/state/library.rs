//! Cached, session-gated reads for the dashboard views.

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    achievements::{AchievementAggregator, AggregatorConfig},
    api::{
        AggregatedAchievement, ApiError, OwnedTitle, PlayerAchievement, PlayerSummary,
        SteamClient, SteamId,
    },
    state::session::Session,
    utils::time,
};

pub const OWNED_GAMES_FRESHNESS: Duration = Duration::from_secs(5 * 60);
pub const TITLE_ACHIEVEMENTS_FRESHNESS: Duration = Duration::from_secs(15 * 60);
pub const PROFILE_FRESHNESS: Duration = Duration::from_secs(30 * 60);
pub const ALL_ACHIEVEMENTS_FRESHNESS: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Profile(SteamId),
    OwnedGames(SteamId),
    TitleAchievements(SteamId, u32),
    AllAchievements(SteamId),
}

impl QueryKey {
    pub fn freshness(&self) -> Duration {
        match self {
            QueryKey::Profile(_) => PROFILE_FRESHNESS,
            QueryKey::OwnedGames(_) => OWNED_GAMES_FRESHNESS,
            QueryKey::TitleAchievements(..) => TITLE_ACHIEVEMENTS_FRESHNESS,
            QueryKey::AllAchievements(_) => ALL_ACHIEVEMENTS_FRESHNESS,
        }
    }
}

pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    match chrono::Duration::from_std(window) {
        Ok(window) => now - fetched_at < window,
        Err(_) => true,
    }
}

#[derive(Debug, Clone)]
enum Cached {
    Profile(PlayerSummary),
    OwnedGames(Vec<OwnedTitle>),
    TitleAchievements(Vec<PlayerAchievement>),
    AllAchievements(Vec<AggregatedAchievement>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Cached,
    fetched_at: DateTime<Utc>,
}

/// Shared cache over the gateway. Clones share entries.
#[derive(Clone)]
pub struct LibraryQueries {
    client: SteamClient,
    aggregator: AggregatorConfig,
    cache: Rc<RefCell<HashMap<QueryKey, CacheEntry>>>,
}

fn require_session(session: Option<&Session>) -> Result<&Session, ApiError> {
    session.ok_or(ApiError::NotAuthenticated)
}

impl LibraryQueries {
    pub fn new(client: SteamClient) -> Self {
        Self::with_aggregator(client, AggregatorConfig::default())
    }

    pub fn with_aggregator(client: SteamClient, aggregator: AggregatorConfig) -> Self {
        Self {
            client,
            aggregator,
            cache: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn cached(&self, key: &QueryKey) -> Option<Cached> {
        let cache = self.cache.borrow();
        let entry = cache.get(key)?;
        is_fresh(entry.fetched_at, time::now(), key.freshness()).then(|| entry.value.clone())
    }

    fn store(&self, key: QueryKey, value: Cached) {
        self.cache.borrow_mut().insert(
            key,
            CacheEntry {
                value,
                fetched_at: time::now(),
            },
        );
    }

    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Falls back to the profile captured at sign-in when the upstream has no
    /// player with the session's id.
    pub async fn profile(&self, session: Option<&Session>) -> Result<PlayerSummary, ApiError> {
        let session = require_session(session)?;
        let key = QueryKey::Profile(session.steam_id.clone());
        if let Some(Cached::Profile(profile)) = self.cached(&key) {
            return Ok(profile);
        }
        let players = self
            .client
            .get_player_summaries(std::slice::from_ref(&session.steam_id))
            .await?;
        let profile = players
            .into_iter()
            .find(|p| p.steamid == session.steam_id.as_str())
            .unwrap_or_else(|| session.profile.clone());
        self.store(key, Cached::Profile(profile.clone()));
        Ok(profile)
    }

    pub async fn owned_games(&self, session: Option<&Session>) -> Result<Vec<OwnedTitle>, ApiError> {
        let session = require_session(session)?;
        let key = QueryKey::OwnedGames(session.steam_id.clone());
        if let Some(Cached::OwnedGames(titles)) = self.cached(&key) {
            return Ok(titles);
        }
        let titles = self.client.get_owned_games(&session.steam_id).await?;
        self.store(key, Cached::OwnedGames(titles.clone()));
        Ok(titles)
    }

    pub async fn title_achievements(
        &self,
        session: Option<&Session>,
        appid: u32,
    ) -> Result<Vec<PlayerAchievement>, ApiError> {
        let session = require_session(session)?;
        let key = QueryKey::TitleAchievements(session.steam_id.clone(), appid);
        if let Some(Cached::TitleAchievements(records)) = self.cached(&key) {
            return Ok(records);
        }
        let records = self
            .client
            .get_player_achievements(&session.steam_id, appid)
            .await?;
        // Soft degradation yields an empty list; retry it on the next read.
        if !records.is_empty() {
            self.store(key, Cached::TitleAchievements(records.clone()));
        }
        Ok(records)
    }

    pub async fn all_achievements(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<AggregatedAchievement>, ApiError> {
        let session = require_session(session)?;
        let key = QueryKey::AllAchievements(session.steam_id.clone());
        if let Some(Cached::AllAchievements(merged)) = self.cached(&key) {
            return Ok(merged);
        }
        let merged = AchievementAggregator::with_config(self.client.clone(), self.aggregator.clone())
            .aggregate(&session.steam_id)
            .await?;
        if !merged.is_empty() {
            self.store(key, Cached::AllAchievements(merged.clone()));
        }
        Ok(merged)
    }
}
