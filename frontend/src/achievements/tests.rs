#![cfg(not(coverage))]

use std::time::{Duration, Instant};

use super::*;
use crate::api::{
    test_support::*, ApiError, SteamId, GAME_SCHEMA_ROUTE, GLOBAL_PERCENTAGES_ROUTE,
    OWNED_GAMES_ROUTE, PLAYER_ACHIEVEMENTS_ROUTE,
};
use httpmock::prelude::*;

fn steam_id() -> SteamId {
    SteamId::parse(STEAM_ID).unwrap()
}

fn unpaced() -> AggregatorConfig {
    AggregatorConfig {
        pacing: Duration::ZERO,
        ..AggregatorConfig::default()
    }
}

fn mock_title<'a>(server: &'a MockServer, appid: u32, apiname: &str) -> (httpmock::Mock<'a>, httpmock::Mock<'a>) {
    let records = server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(PLAYER_ACHIEVEMENTS_ROUTE))
            .query_param("appid", appid.to_string());
        then.status(200)
            .json_body(achievements_json(appid, &[(apiname, 1, 1_700_000_000)]));
    });
    let schema = server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(GAME_SCHEMA_ROUTE))
            .query_param("appid", appid.to_string());
        then.status(200)
            .json_body(schema_json(appid, &[(apiname, "Display", "Described")]));
    });
    (records, schema)
}

#[tokio::test]
async fn processes_only_titles_with_visible_stats_in_order() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200).json_body(owned_games_json(vec![
            title_json(1, "One", true),
            title_json(2, "Two", false),
            title_json(3, "Three", true),
        ]));
    });
    let (one, _) = mock_title(&server, 1, "ONE_A");
    let (two, two_schema) = mock_title(&server, 2, "TWO_A");
    let (three, _) = mock_title(&server, 3, "THREE_A");

    let merged = AchievementAggregator::with_config(relay_client(&server), unpaced())
        .aggregate(&steam_id())
        .await
        .unwrap();

    let keys: Vec<(u32, &str)> = merged.iter().map(|a| (a.appid, a.apiname.as_str())).collect();
    assert_eq!(keys, vec![(1, "ONE_A"), (3, "THREE_A")]);
    assert_eq!(merged[0].name.as_deref(), Some("Display"));
    assert_eq!(merged[1].game_name, "Three");
    one.assert_hits(1);
    three.assert_hits(1);
    two.assert_hits(0);
    two_schema.assert_hits(0);
}

#[tokio::test]
async fn failing_title_does_not_abort_aggregation() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200).json_body(owned_games_json(vec![
            title_json(1, "One", true),
            title_json(3, "Three", true),
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(PLAYER_ACHIEVEMENTS_ROUTE))
            .query_param("appid", "1");
        then.status(500).body("upstream exploded");
    });
    let skipped_schema = server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(GAME_SCHEMA_ROUTE))
            .query_param("appid", "1");
        then.status(200)
            .json_body(schema_json(1, &[("ONE_A", "Display", "Described")]));
    });
    mock_title(&server, 3, "THREE_A");

    let merged = AchievementAggregator::with_config(relay_client(&server), unpaced())
        .aggregate(&steam_id())
        .await
        .unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].appid, 3);
    assert_eq!(merged[0].apiname, "THREE_A");
    // The title is dropped as soon as its records fail.
    skipped_schema.assert_hits(0);
}

#[tokio::test]
async fn schema_failure_keeps_the_title_records() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200)
            .json_body(owned_games_json(vec![title_json(1, "One", true)]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(PLAYER_ACHIEVEMENTS_ROUTE))
            .query_param("appid", "1");
        then.status(200)
            .json_body(achievements_json(1, &[("ONE_A", 1, 1_700_000_000)]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(GAME_SCHEMA_ROUTE))
            .query_param("appid", "1");
        then.status(500);
    });

    let merged = AchievementAggregator::with_config(relay_client(&server), unpaced())
        .aggregate(&steam_id())
        .await
        .unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].apiname, "ONE_A");
    assert_eq!(merged[0].name.as_deref(), None);
    assert_eq!(merged[0].icon, None);
}

#[tokio::test]
async fn owned_games_failure_is_fatal() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(500).body("no key");
    });

    let err = AchievementAggregator::with_config(relay_client(&server), unpaced())
        .aggregate(&steam_id())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Configuration { .. }));
}

#[tokio::test]
async fn never_fetches_more_than_ten_titles() {
    let server = MockServer::start_async().await;
    let games = (1..=50).map(|id| title_json(id, "Game", true)).collect();
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200).json_body(owned_games_json(games));
    });
    let records = server.mock(|when, then| {
        when.method(GET).path(relay_path(PLAYER_ACHIEVEMENTS_ROUTE));
        then.status(200).json_body(achievements_json(0, &[]));
    });
    let schemas = server.mock(|when, then| {
        when.method(GET).path(relay_path(GAME_SCHEMA_ROUTE));
        then.status(200).json_body(schema_json(0, &[]));
    });

    let merged = AchievementAggregator::with_config(relay_client(&server), unpaced())
        .aggregate(&steam_id())
        .await
        .unwrap();

    assert!(merged.is_empty());
    records.assert_hits(MAX_TITLES_PER_PASS);
    schemas.assert_hits(MAX_TITLES_PER_PASS);
}

#[tokio::test]
async fn titles_are_paced() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200).json_body(owned_games_json(vec![
            title_json(1, "One", true),
            title_json(2, "Two", true),
            title_json(3, "Three", true),
        ]));
    });
    for appid in 1..=3 {
        mock_title(&server, appid, "A");
    }
    let config = AggregatorConfig {
        pacing: Duration::from_millis(30),
        ..AggregatorConfig::default()
    };

    let started = Instant::now();
    AchievementAggregator::with_config(relay_client(&server), config)
        .aggregate(&steam_id())
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn rarity_is_fetched_only_when_enabled() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200)
            .json_body(owned_games_json(vec![title_json(1, "One", true)]));
    });
    mock_title(&server, 1, "ONE_A");
    let percentages = server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(GLOBAL_PERCENTAGES_ROUTE))
            .query_param("gameid", "1");
        then.status(200)
            .json_body(global_percentages_json(&[("ONE_A", 4.2)]));
    });

    let plain = relay_client(&server)
        .get_all_achievements(&steam_id())
        .await
        .unwrap();
    assert_eq!(plain[0].rarity, None);
    percentages.assert_hits(0);

    let config = AggregatorConfig {
        include_rarity: true,
        ..unpaced()
    };
    let enriched = AchievementAggregator::with_config(relay_client(&server), config)
        .aggregate(&steam_id())
        .await
        .unwrap();
    assert_eq!(enriched[0].rarity, Some(4.2));
    assert_eq!(enriched[0].rarity_tier(), Rarity::Legendary);
    percentages.assert_hits(1);
}
