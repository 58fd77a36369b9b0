// Wire shapes of the legacy REST API. Every field may be missing or null.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

// Status

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct Status {
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub text: String,
    #[serde_as(as = "DefaultOnNull")]
    pub created_at: String,
    #[serde_as(as = "DefaultOnNull")]
    pub favorited: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub truncated: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub source: String,
    pub in_reply_to_screen_name: Option<String>,
    pub in_reply_to_status_id: Option<i64>,
    pub in_reply_to_user_id: Option<i64>,
    pub user: Option<Box<User>>,
    pub error: Option<String>,
}

// User

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct User {
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub screen_name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub location: String,
    #[serde_as(as = "DefaultOnNull")]
    pub description: String,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_image_url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_background_tile: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_background_image_url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_sidebar_fill_color: String,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_link_color: String,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_text_color: String,
    #[serde_as(as = "DefaultOnNull")]
    pub protected: bool,
    pub utc_offset: Option<i32>,
    pub time_zone: Option<String>,
    pub url: Option<String>,
    pub status: Option<Box<Status>>,
    #[serde_as(as = "DefaultOnNull")]
    pub statuses_count: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub followers_count: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub friends_count: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub favourites_count: u32,
    pub error: Option<String>,
}

// Search

/// Items are kept raw and decoded one by one, see [`SearchResponse::into_results`].
#[derive(Deserialize, Serialize, Debug)]
pub struct SearchResponse {
    pub results: Vec<serde_json::Value>,
}

// Failure

/// Body the service sends instead of the expected shape, e.g. `{"error": "Not found", "request": "/users/show.json"}`.
#[derive(Deserialize, Serialize, Debug)]
pub struct RemoteFailure {
    pub error: String,
    pub request: Option<String>,
}
