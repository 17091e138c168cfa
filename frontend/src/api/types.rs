use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::error::ApiError;

/// Numeric Steam account id (`^[0-9]+$`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SteamId(String);

impl SteamId {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ApiError::Validation(format!("not a Steam id: {:?}", raw)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SteamId {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SteamId::parse(&value)
    }
}

impl From<SteamId> for String {
    fn from(id: SteamId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,
    pub personaname: String,
    #[serde(default)]
    pub profileurl: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub avatarmedium: String,
    #[serde(default)]
    pub avatarfull: String,
    #[serde(default)]
    pub communityvisibilitystate: u8,
    #[serde(default)]
    pub profilestate: u8,
    #[serde(default)]
    pub personastate: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primaryclanid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecreated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastlogoff: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameextrainfo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loccountrycode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locstatecode: Option<String>,
}

impl PlayerSummary {
    /// Steam reports 3 for public profiles; anything else hides game details.
    pub fn is_public(&self) -> bool {
        self.communityvisibilitystate == 3
    }

    pub fn location(&self) -> Option<String> {
        match (&self.locstatecode, &self.loccountrycode) {
            (Some(state), Some(country)) => Some(format!("{}, {}", state, country)),
            (None, Some(country)) => Some(country.clone()),
            _ => None,
        }
    }
}

/// One entry of the owned-games library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedTitle {
    pub appid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playtime_forever: u32,
    /// Absent when the title was not played in the last two weeks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_2weeks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_logo_url: Option<String>,
    #[serde(default)]
    pub has_community_visible_stats: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_windows_forever: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_mac_forever: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_linux_forever: Option<u32>,
}

impl OwnedTitle {
    pub fn has_recent_activity(&self) -> bool {
        self.playtime_2weeks.is_some_and(|minutes| minutes > 0)
    }

    pub fn playtime_hours(&self) -> f64 {
        crate::utils::time::minutes_to_hours(self.playtime_forever)
    }
}

/// Sorts a library by total playtime, most played first. Ties keep upstream order.
pub fn sort_by_playtime(titles: &mut [OwnedTitle]) {
    titles.sort_by(|a, b| b.playtime_forever.cmp(&a.playtime_forever));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAchievement {
    pub apiname: String,
    pub achieved: u8,
    #[serde(default)]
    pub unlocktime: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlayerAchievement {
    pub fn is_achieved(&self) -> bool {
        self.achieved != 0
    }

    /// Unlock time, ignoring the timestamp of locked achievements.
    pub fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        if !self.is_achieved() || self.unlocktime <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.unlocktime, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSchema {
    #[serde(rename = "gameName", default, skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    #[serde(rename = "gameVersion", default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(
        rename = "availableGameStats",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub available_game_stats: Option<AvailableGameStats>,
}

impl GameSchema {
    pub fn achievements(&self) -> &[SchemaAchievement] {
        self.available_game_stats
            .as_ref()
            .map(|stats| stats.achievements.as_slice())
            .unwrap_or(&[])
    }

    pub fn achievement(&self, key: &str) -> Option<&SchemaAchievement> {
        self.achievements().iter().find(|entry| entry.name == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableGameStats {
    #[serde(default)]
    pub achievements: Vec<SchemaAchievement>,
}

/// Static per-title metadata for one achievement, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaAchievement {
    pub name: String,
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icongray: Option<String>,
    #[serde(default)]
    pub hidden: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAchievementPercentage {
    pub name: String,
    #[serde(deserialize_with = "percent_from_number_or_string")]
    pub percent: f64,
}

// Steam has served percentages both as JSON numbers and as strings.
fn percent_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// An achievement merged with its schema metadata and tagged with its title.
/// Built only by the aggregator and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedAchievement {
    pub apiname: String,
    pub achieved: bool,
    /// Epoch seconds; always 0 for locked achievements.
    pub unlocktime: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub icon_gray: Option<String>,
    pub appid: u32,
    pub game_name: String,
    pub rarity: Option<f64>,
}

impl AggregatedAchievement {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.apiname)
    }
}

// Response envelopes as the upstream wraps them. Missing wrappers decode to
// empty collections so an empty library is not an error.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlayerSummariesEnvelope {
    #[serde(default)]
    pub response: PlayerSummariesResponse,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlayerSummariesResponse {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwnedGamesEnvelope {
    #[serde(default)]
    pub response: OwnedGamesResponse,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwnedGamesResponse {
    #[serde(default)]
    pub games: Vec<OwnedTitle>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlayerStatsEnvelope {
    #[serde(default)]
    pub playerstats: PlayerStats,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlayerStats {
    #[serde(default)]
    pub achievements: Vec<PlayerAchievement>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GameSchemaEnvelope {
    #[serde(default)]
    pub game: Option<GameSchema>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GlobalPercentagesEnvelope {
    #[serde(default)]
    pub achievementpercentages: GlobalPercentages,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GlobalPercentages {
    #[serde(default)]
    pub achievements: Vec<GlobalAchievementPercentage>,
}
