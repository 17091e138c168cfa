use std::collections::HashMap;

use super::{
    client::{FallbackPolicy, SteamClient},
    error::ApiError,
    types::{
        GameSchema, GameSchemaEnvelope, GlobalPercentagesEnvelope, OwnedGamesEnvelope,
        OwnedTitle, PlayerAchievement, PlayerStatsEnvelope, PlayerSummariesEnvelope,
        PlayerSummary, SteamId,
    },
};

pub const PLAYER_SUMMARIES_ROUTE: &str = "ISteamUser/GetPlayerSummaries/v0002/";
pub const OWNED_GAMES_ROUTE: &str = "IPlayerService/GetOwnedGames/v0001/";
pub const PLAYER_ACHIEVEMENTS_ROUTE: &str = "ISteamUserStats/GetPlayerAchievements/v0001/";
pub const GAME_SCHEMA_ROUTE: &str = "ISteamUserStats/GetSchemaForGame/v2/";
pub const GLOBAL_PERCENTAGES_ROUTE: &str =
    "ISteamUserStats/GetGlobalAchievementPercentagesForApp/v0002/";

impl SteamClient {
    /// Strict: a failed lookup is a configuration problem, never a placeholder profile.
    pub async fn get_player_summaries(
        &self,
        steam_ids: &[SteamId],
    ) -> Result<Vec<PlayerSummary>, ApiError> {
        let ids = steam_ids
            .iter()
            .map(SteamId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let result = self
            .call_as::<PlayerSummariesEnvelope>(PLAYER_SUMMARIES_ROUTE, &[("steamids", ids)])
            .await
            .map(|envelope| envelope.response.players);
        FallbackPolicy::Strict.apply("fetching player summaries", result)
    }

    pub async fn get_owned_games(&self, steam_id: &SteamId) -> Result<Vec<OwnedTitle>, ApiError> {
        let result = self
            .call_as::<OwnedGamesEnvelope>(
                OWNED_GAMES_ROUTE,
                &[
                    ("steamid", steam_id.to_string()),
                    ("include_appinfo", "1".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await
            .map(|envelope| envelope.response.games);
        FallbackPolicy::Strict.apply("fetching owned games", result)
    }

    /// Soft: titles without stats (or a flaky upstream) yield an empty list.
    pub async fn get_player_achievements(
        &self,
        steam_id: &SteamId,
        appid: u32,
    ) -> Result<Vec<PlayerAchievement>, ApiError> {
        let result = self.fetch_player_achievements(steam_id, appid).await;
        FallbackPolicy::Soft.apply(&format!("fetching achievements for app {}", appid), result)
    }

    /// Same request as [`Self::get_player_achievements`], with failures surfaced.
    pub(crate) async fn fetch_player_achievements(
        &self,
        steam_id: &SteamId,
        appid: u32,
    ) -> Result<Vec<PlayerAchievement>, ApiError> {
        self.call_as::<PlayerStatsEnvelope>(
            PLAYER_ACHIEVEMENTS_ROUTE,
            &[
                ("steamid", steam_id.to_string()),
                ("appid", appid.to_string()),
            ],
        )
        .await
        .map(|envelope| envelope.playerstats.achievements)
    }

    pub async fn get_game_schema(&self, appid: u32) -> Result<Option<GameSchema>, ApiError> {
        let result = self
            .call_as::<GameSchemaEnvelope>(GAME_SCHEMA_ROUTE, &[("appid", appid.to_string())])
            .await
            .map(|envelope| envelope.game);
        FallbackPolicy::Soft.apply(&format!("fetching schema for app {}", appid), result)
    }

    /// Global unlock percentage per achievement key.
    pub async fn get_global_achievement_percentages(
        &self,
        appid: u32,
    ) -> Result<HashMap<String, f64>, ApiError> {
        let result = self
            .call_as::<GlobalPercentagesEnvelope>(
                GLOBAL_PERCENTAGES_ROUTE,
                &[("gameid", appid.to_string())],
            )
            .await
            .map(|envelope| {
                envelope
                    .achievementpercentages
                    .achievements
                    .into_iter()
                    .map(|entry| (entry.name, entry.percent))
                    .collect()
            });
        FallbackPolicy::Soft.apply(
            &format!("fetching global achievement percentages for app {}", appid),
            result,
        )
    }
}
