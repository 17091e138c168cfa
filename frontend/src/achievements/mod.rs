pub mod aggregator;
pub mod summary;

pub use aggregator::{
    merge_title, select_eligible, AchievementAggregator, AggregatorConfig, MAX_TITLES_PER_PASS,
    TITLE_PACING,
};
pub use summary::{filter_achievements, AchievementFilter, AchievementSummary, Rarity, TitleProgress};

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests;
