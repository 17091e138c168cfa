#![cfg(not(coverage))]

use super::test_support::*;
use super::*;
use httpmock::prelude::*;
use serde_json::json;

fn steam_id() -> SteamId {
    SteamId::parse(STEAM_ID).unwrap()
}

#[tokio::test]
async fn call_returns_relay_json() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(PLAYER_SUMMARIES_ROUTE))
            .query_param("steamids", STEAM_ID);
        then.status(200)
            .json_body(players_json(vec![player_json(STEAM_ID, "alice")]));
    });

    let value = relay_client(&server)
        .call(PLAYER_SUMMARIES_ROUTE, &[("steamids", STEAM_ID.to_string())])
        .await
        .unwrap();
    assert_eq!(value["response"]["players"][0]["personaname"], "alice");
}

#[tokio::test]
async fn call_maps_non_success_to_upstream_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(GAME_SCHEMA_ROUTE));
        then.status(503).body("maintenance");
    });

    let err = relay_client(&server)
        .call(GAME_SCHEMA_ROUTE, &[("appid", "10".to_string())])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Upstream {
            status: 503,
            status_text: "Service Unavailable".into(),
            body: "maintenance".into(),
        }
    );
}

#[tokio::test]
async fn flat_query_shape_sends_endpoint_param() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(RELAY_PATH)
            .query_param("endpoint", OWNED_GAMES_ROUTE)
            .query_param("steamid", STEAM_ID);
        then.status(200)
            .json_body(owned_games_json(vec![title_json(10, "Counter-Strike", true)]));
    });

    let games = relay_client(&server)
        .with_relay_shape(RelayShape::FlatQuery)
        .get_owned_games(&steam_id())
        .await
        .unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].name, "Counter-Strike");
    mock.assert();
}

#[tokio::test]
async fn player_summaries_are_strict() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(PLAYER_SUMMARIES_ROUTE));
        then.status(500)
            .json_body(json!({ "error": "Steam API key not configured", "code": "CONFIGURATION_ERROR" }));
    });

    let err = relay_client(&server)
        .get_player_summaries(&[steam_id()])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn player_summaries_never_fabricate_profiles() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(PLAYER_SUMMARIES_ROUTE));
        then.status(200).json_body(json!({ "response": {} }));
    });

    let players = relay_client(&server)
        .get_player_summaries(&[steam_id()])
        .await
        .unwrap();
    assert!(players.is_empty());
}

#[tokio::test]
async fn owned_games_are_strict() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(502);
    });

    let err = relay_client(&server)
        .get_owned_games(&steam_id())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Configuration { .. }));
}

#[tokio::test]
async fn owned_games_request_includes_app_info() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(OWNED_GAMES_ROUTE))
            .query_param("steamid", STEAM_ID)
            .query_param("include_appinfo", "1")
            .query_param("format", "json");
        then.status(200).json_body(owned_games_json(vec![
            title_json(10, "Counter-Strike", true),
            title_json(20, "Team Fortress Classic", false),
        ]));
    });

    let games = relay_client(&server)
        .get_owned_games(&steam_id())
        .await
        .unwrap();
    assert_eq!(games.len(), 2);
    assert!(!games[1].has_community_visible_stats);
    mock.assert();
}

#[tokio::test]
async fn player_achievements_are_soft() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(PLAYER_ACHIEVEMENTS_ROUTE));
        then.status(400).json_body(json!({
            "playerstats": { "error": "Requested app has no stats", "success": false }
        }));
    });

    let achievements = relay_client(&server)
        .get_player_achievements(&steam_id(), 10)
        .await
        .unwrap();
    assert!(achievements.is_empty());
}

#[tokio::test]
async fn game_schema_is_soft() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(GAME_SCHEMA_ROUTE));
        then.status(500);
    });

    let schema = relay_client(&server).get_game_schema(10).await.unwrap();
    assert!(schema.is_none());
}

#[tokio::test]
async fn game_schema_decodes_display_metadata() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(GAME_SCHEMA_ROUTE))
            .query_param("appid", "10");
        then.status(200)
            .json_body(schema_json(10, &[("WIN_ONE", "First Win", "Win a round")]));
    });

    let schema = relay_client(&server)
        .get_game_schema(10)
        .await
        .unwrap()
        .unwrap();
    let entry = schema.achievement("WIN_ONE").unwrap();
    assert_eq!(entry.display_name.as_deref(), Some("First Win"));
    assert_eq!(entry.description.as_deref(), Some("Win a round"));
}

#[tokio::test]
async fn global_percentages_are_keyed_by_achievement() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET)
            .path(relay_path(GLOBAL_PERCENTAGES_ROUTE))
            .query_param("gameid", "10");
        then.status(200)
            .json_body(global_percentages_json(&[("WIN_ONE", 71.5), ("WIN_ALL", 2.0)]));
    });

    let rarity = relay_client(&server)
        .get_global_achievement_percentages(10)
        .await
        .unwrap();
    assert_eq!(rarity.get("WIN_ONE"), Some(&71.5));
    assert_eq!(rarity.get("WIN_ALL"), Some(&2.0));
}

#[tokio::test]
async fn undecodable_body_is_reported_for_strict_calls() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(relay_path(OWNED_GAMES_ROUTE));
        then.status(200).body("<html>not json</html>");
    });

    let err = relay_client(&server)
        .get_owned_games(&steam_id())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Configuration { ref reason, .. } if reason.starts_with("failed to parse response")));
}
