use std::{collections::HashMap, time::Duration};

use crate::{
    api::{
        AggregatedAchievement, ApiError, GameSchema, OwnedTitle, PlayerAchievement, SteamClient,
        SteamId,
    },
    utils::pacing,
};

/// Upper bound on titles visited per aggregation pass.
pub const MAX_TITLES_PER_PASS: usize = 10;
/// Delay between consecutive titles, to stay under the upstream rate limiter.
pub const TITLE_PACING: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub max_titles: usize,
    pub pacing: Duration,
    /// Also fetch global unlock percentages per title (one extra request each).
    pub include_rarity: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_titles: MAX_TITLES_PER_PASS,
            pacing: TITLE_PACING,
            include_rarity: false,
        }
    }
}

/// Titles with visible stats, in library order, capped at `max_titles`.
/// Titles past the cap are left out of this pass.
pub fn select_eligible(titles: &[OwnedTitle], max_titles: usize) -> Vec<&OwnedTitle> {
    titles
        .iter()
        .filter(|title| title.has_community_visible_stats)
        .take(max_titles)
        .collect()
}

/// Overlays schema metadata onto the player's records and tags them with the title.
pub fn merge_title(
    title: &OwnedTitle,
    records: Vec<PlayerAchievement>,
    schema: Option<&GameSchema>,
    rarity: &HashMap<String, f64>,
) -> Vec<AggregatedAchievement> {
    records
        .into_iter()
        .map(|record| {
            let entry = schema.and_then(|s| s.achievement(&record.apiname));
            let achieved = record.is_achieved();
            AggregatedAchievement {
                achieved,
                unlocktime: if achieved { record.unlocktime.max(0) } else { 0 },
                name: entry
                    .and_then(|e| e.display_name.clone())
                    .or(record.name),
                description: entry
                    .and_then(|e| e.description.clone())
                    .or(record.description),
                icon: entry.and_then(|e| e.icon.clone()),
                icon_gray: entry.and_then(|e| e.icongray.clone()),
                appid: title.appid,
                game_name: title.name.clone(),
                rarity: rarity.get(&record.apiname).copied(),
                apiname: record.apiname,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct AchievementAggregator {
    client: SteamClient,
    config: AggregatorConfig,
}

impl AchievementAggregator {
    pub fn new(client: SteamClient) -> Self {
        Self::with_config(client, AggregatorConfig::default())
    }

    pub fn with_config(client: SteamClient, config: AggregatorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fails when the title's records cannot be read. Schema and rarity are
    /// enrichment and degrade to nothing.
    async fn fetch_title(
        &self,
        steam_id: &SteamId,
        title: &OwnedTitle,
    ) -> Result<Vec<AggregatedAchievement>, ApiError> {
        let records = self
            .client
            .fetch_player_achievements(steam_id, title.appid)
            .await?;
        let schema = self.client.get_game_schema(title.appid).await?;
        let rarity = if self.config.include_rarity {
            self.client
                .get_global_achievement_percentages(title.appid)
                .await?
        } else {
            HashMap::new()
        };
        Ok(merge_title(title, records, schema.as_ref(), &rarity))
    }

    /// Achievements across the subject's eligible titles, in title order.
    ///
    /// Only the owned-games lookup is fatal. Titles are visited one at a
    /// time with [`AggregatorConfig::pacing`] between them; a failing title is
    /// logged and skipped.
    pub async fn aggregate(
        &self,
        steam_id: &SteamId,
    ) -> Result<Vec<AggregatedAchievement>, ApiError> {
        let titles = self.client.get_owned_games(steam_id).await?;
        let eligible = select_eligible(&titles, self.config.max_titles);
        log::debug!(
            "aggregating achievements for {}: {} of {} titles eligible",
            steam_id,
            eligible.len(),
            titles.len()
        );

        let mut aggregated = Vec::new();
        for (index, title) in eligible.into_iter().enumerate() {
            if index > 0 {
                pacing::pause(self.config.pacing).await;
            }
            match self.fetch_title(steam_id, title).await {
                Ok(merged) => {
                    log::debug!("app {}: {} achievements", title.appid, merged.len());
                    aggregated.extend(merged);
                }
                Err(err) => {
                    log::warn!("skipping achievements for app {}: {}", title.appid, err);
                }
            }
        }
        Ok(aggregated)
    }
}

impl SteamClient {
    /// Strict: fails only when the owned-games lookup fails.
    pub async fn get_all_achievements(
        &self,
        steam_id: &SteamId,
    ) -> Result<Vec<AggregatedAchievement>, ApiError> {
        AchievementAggregator::new(self.clone())
            .aggregate(steam_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn title(appid: u32, visible: bool) -> OwnedTitle {
        serde_json::from_value(json!({
            "appid": appid,
            "name": format!("Game {}", appid),
            "playtime_forever": 10,
            "has_community_visible_stats": visible
        }))
        .unwrap()
    }

    fn record(apiname: &str, achieved: u8, unlocktime: i64) -> PlayerAchievement {
        PlayerAchievement {
            apiname: apiname.into(),
            achieved,
            unlocktime,
            name: Some(format!("raw {}", apiname)),
            description: None,
        }
    }

    #[test]
    fn eligibility_keeps_order_and_skips_hidden_stats() {
        let titles = vec![title(1, true), title(2, false), title(3, true)];
        let ids: Vec<u32> = select_eligible(&titles, 10)
            .iter()
            .map(|t| t.appid)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn eligibility_is_capped() {
        let titles: Vec<OwnedTitle> = (1..=50).map(|id| title(id, true)).collect();
        let eligible = select_eligible(&titles, MAX_TITLES_PER_PASS);
        assert_eq!(eligible.len(), 10);
        assert_eq!(eligible.last().map(|t| t.appid), Some(10));
    }

    #[test]
    fn schema_fields_win_over_record_defaults() {
        let schema: GameSchema = serde_json::from_value(json!({
            "availableGameStats": { "achievements": [
                { "name": "A", "displayName": "Alpha", "description": "First", "icon": "a.jpg", "icongray": "a_g.jpg" }
            ]}
        }))
        .unwrap();
        let merged = merge_title(
            &title(7, true),
            vec![record("A", 1, 1_700_000_000), record("B", 0, 1_700_000_000)],
            Some(&schema),
            &HashMap::from([("A".to_string(), 12.5)]),
        );

        assert_eq!(merged.len(), 2);
        let alpha = &merged[0];
        assert_eq!(alpha.name.as_deref(), Some("Alpha"));
        assert_eq!(alpha.description.as_deref(), Some("First"));
        assert_eq!(alpha.icon.as_deref(), Some("a.jpg"));
        assert_eq!(alpha.icon_gray.as_deref(), Some("a_g.jpg"));
        assert_eq!(alpha.appid, 7);
        assert_eq!(alpha.game_name, "Game 7");
        assert_eq!(alpha.unlocktime, 1_700_000_000);
        assert_eq!(alpha.rarity, Some(12.5));

        let beta = &merged[1];
        assert_eq!(beta.name.as_deref(), Some("raw B"));
        assert!(!beta.achieved);
        assert_eq!(beta.unlocktime, 0);
        assert_eq!(beta.rarity, None);
    }

    #[test]
    fn merge_without_schema_keeps_records() {
        let merged = merge_title(&title(3, true), vec![record("X", 1, 5)], None, &HashMap::new());
        assert_eq!(merged[0].display_name(), "raw X");
        assert!(merged[0].icon.is_none());
    }
}
