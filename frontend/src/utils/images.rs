use serde::{Deserialize, Serialize};

pub const HEADER_CDN_BASE: &str = "https://cdn.akamai.steamstatic.com/steam/apps";
pub const COMMUNITY_IMAGE_BASE: &str =
    "https://media.steampowered.com/steamcommunity/public/images/apps";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Icon,
    Logo,
    #[default]
    Header,
}

/// Resolves a title's display image.
///
/// `Header` is keyed by app id only. `Icon` and `Logo` need the hash the
/// owned-games call reports; without one they fall back to the header image.
pub fn game_image_url(appid: u32, hash: Option<&str>, size: ImageSize) -> String {
    match (size, hash.filter(|h| !h.is_empty())) {
        (ImageSize::Icon | ImageSize::Logo, Some(hash)) => {
            format!("{}/{}/{}.jpg", COMMUNITY_IMAGE_BASE, appid, hash)
        }
        _ => format!("{}/{}/header.jpg", HEADER_CDN_BASE, appid),
    }
}
