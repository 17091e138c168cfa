//! JSON fixtures shaped like Steam Web API responses.

use serde_json::{json, Value};

use super::SteamClient;

pub const RELAY_PATH: &str = "/api/steam";
pub const STEAM_ID: &str = "76561198000000000";

pub fn relay_path(route: &str) -> String {
    format!("{}/{}", RELAY_PATH, route)
}

pub fn relay_client(server: &httpmock::MockServer) -> SteamClient {
    SteamClient::new_with_base_url(server.url(RELAY_PATH))
}

pub fn player_json(steamid: &str, personaname: &str) -> Value {
    json!({
        "steamid": steamid,
        "communityvisibilitystate": 3,
        "profilestate": 1,
        "personaname": personaname,
        "profileurl": format!("https://steamcommunity.com/profiles/{}/", steamid),
        "avatar": "https://avatars.steamstatic.com/abc.jpg",
        "avatarmedium": "https://avatars.steamstatic.com/abc_medium.jpg",
        "avatarfull": "https://avatars.steamstatic.com/abc_full.jpg",
        "personastate": 1,
        "realname": "Alice Example",
        "loccountrycode": "US"
    })
}

pub fn players_json(players: Vec<Value>) -> Value {
    json!({ "response": { "players": players } })
}

pub fn title_json(appid: u32, name: &str, stats_visible: bool) -> Value {
    json!({
        "appid": appid,
        "name": name,
        "playtime_forever": appid * 10,
        "img_icon_url": format!("icon{}", appid),
        "has_community_visible_stats": stats_visible
    })
}

pub fn owned_games_json(games: Vec<Value>) -> Value {
    json!({ "response": { "game_count": games.len(), "games": games } })
}

pub fn achievements_json(appid: u32, entries: &[(&str, u8, i64)]) -> Value {
    let achievements: Vec<Value> = entries
        .iter()
        .map(|(apiname, achieved, unlocktime)| {
            json!({ "apiname": apiname, "achieved": achieved, "unlocktime": unlocktime })
        })
        .collect();
    json!({
        "playerstats": {
            "steamID": STEAM_ID,
            "gameName": format!("Game {}", appid),
            "achievements": achievements,
            "success": true
        }
    })
}

pub fn schema_json(appid: u32, entries: &[(&str, &str, &str)]) -> Value {
    let achievements: Vec<Value> = entries
        .iter()
        .map(|(key, display_name, description)| {
            json!({
                "name": key,
                "defaultvalue": 0,
                "displayName": display_name,
                "hidden": 0,
                "description": description,
                "icon": format!("https://cdn.example/{}/{}.jpg", appid, key),
                "icongray": format!("https://cdn.example/{}/{}_gray.jpg", appid, key)
            })
        })
        .collect();
    json!({
        "game": {
            "gameName": format!("Game {}", appid),
            "gameVersion": "1",
            "availableGameStats": { "achievements": achievements }
        }
    })
}

pub fn global_percentages_json(entries: &[(&str, f64)]) -> Value {
    let achievements: Vec<Value> = entries
        .iter()
        .map(|(name, percent)| json!({ "name": name, "percent": percent }))
        .collect();
    json!({ "achievementpercentages": { "achievements": achievements } })
}
