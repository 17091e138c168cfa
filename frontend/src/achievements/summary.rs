use serde::{Deserialize, Serialize};

use crate::api::AggregatedAchievement;

/// Rarity tier from the global unlock percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Missing or zero percentages carry no rarity signal and count as common.
    pub fn from_percent(percent: Option<f64>) -> Self {
        match percent {
            None => Rarity::Common,
            Some(p) if p <= 0.0 || p.is_nan() => Rarity::Common,
            Some(p) if p >= 50.0 => Rarity::Common,
            Some(p) if p >= 25.0 => Rarity::Uncommon,
            Some(p) if p >= 10.0 => Rarity::Rare,
            Some(p) if p >= 5.0 => Rarity::Epic,
            Some(_) => Rarity::Legendary,
        }
    }

    pub fn is_rare(self) -> bool {
        matches!(self, Rarity::Rare | Rarity::Epic | Rarity::Legendary)
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl AggregatedAchievement {
    pub fn rarity_tier(&self) -> Rarity {
        Rarity::from_percent(self.rarity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementFilter {
    #[default]
    All,
    Unlocked,
    Locked,
    Rare,
}

impl AchievementFilter {
    pub fn matches(self, achievement: &AggregatedAchievement) -> bool {
        match self {
            AchievementFilter::All => true,
            AchievementFilter::Unlocked => achievement.achieved,
            AchievementFilter::Locked => !achievement.achieved,
            AchievementFilter::Rare => achievement.rarity_tier().is_rare(),
        }
    }
}

/// Applies `filter` and an optional title restriction, preserving order.
pub fn filter_achievements(
    achievements: &[AggregatedAchievement],
    filter: AchievementFilter,
    appid: Option<u32>,
) -> Vec<&AggregatedAchievement> {
    achievements
        .iter()
        .filter(|a| appid.map_or(true, |id| a.appid == id))
        .filter(|a| filter.matches(a))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleProgress {
    pub appid: u32,
    pub game_name: String,
    pub total: usize,
    pub unlocked: usize,
}

impl TitleProgress {
    pub fn completion_percent(&self) -> f64 {
        percent(self.unlocked, self.total)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AchievementSummary {
    pub total: usize,
    pub unlocked: usize,
    pub locked: usize,
    pub rare: usize,
    pub completion_percent: f64,
    pub titles: Vec<TitleProgress>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

impl AchievementSummary {
    pub fn from_achievements(achievements: &[AggregatedAchievement]) -> Self {
        let mut titles: Vec<TitleProgress> = Vec::new();
        for achievement in achievements {
            let progress = match titles.iter_mut().position(|t| t.appid == achievement.appid) {
                Some(index) => &mut titles[index],
                None => {
                    titles.push(TitleProgress {
                        appid: achievement.appid,
                        game_name: achievement.game_name.clone(),
                        total: 0,
                        unlocked: 0,
                    });
                    let last = titles.len() - 1;
                    &mut titles[last]
                }
            };
            progress.total += 1;
            if achievement.achieved {
                progress.unlocked += 1;
            }
        }

        let total = achievements.len();
        let unlocked = achievements.iter().filter(|a| a.achieved).count();
        AchievementSummary {
            total,
            unlocked,
            locked: total - unlocked,
            rare: achievements
                .iter()
                .filter(|a| a.rarity_tier().is_rare())
                .count(),
            completion_percent: percent(unlocked, total),
            titles,
        }
    }
}
