use serde::{Deserialize, Serialize};

use super::common::{deserialize_string_bool, Envelope, PaginationMeta};

/// A social media link shown in the mobile app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub type_label: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLinkCollection {
    #[serde(default)]
    pub social_media: Vec<SocialLink>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

pub type SocialLinksResponse = Envelope<SocialLinkCollection>;

/// Payload for editing a social link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLinkUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub url: String,
    pub username: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Static page content (terms, privacy policy, about).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticContent {
    pub key: String,
    pub title: String,
    pub content: String,
}
