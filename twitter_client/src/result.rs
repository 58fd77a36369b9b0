use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::cache::Identified;
use crate::response;
use crate::util::parse_twitter_date;

/// A record that may carry an error message set by the service itself.
pub trait RemoteError {
    fn remote_error(&self) -> Option<&str>;
}

/// The author of a status, as referenced from the status.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub screen_name: String,
    pub profile_image_url: String,
}

/// The latest status of a user, as referenced from the user.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub id: i64,
    pub text: String,
    pub created_at: String,
}

static EMPTY_USER_SUMMARY: UserSummary = UserSummary {
    id: 0,
    name: String::new(),
    screen_name: String::new(),
    profile_image_url: String::new(),
};

static EMPTY_STATUS_SUMMARY: StatusSummary = StatusSummary {
    id: 0,
    text: String::new(),
    created_at: String::new(),
};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub favorited: bool,
    pub truncated: bool,
    pub source: String,
    pub in_reply_to_screen_name: Option<String>,
    pub in_reply_to_status_id: Option<i64>,
    pub in_reply_to_user_id: Option<i64>,
    pub author: Option<UserSummary>,
    pub error: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub screen_name: String,
    pub location: String,
    pub description: String,
    pub profile_image_url: String,
    pub profile_background_tile: bool,
    pub profile_background_image_url: String,
    pub profile_sidebar_fill_color: String,
    pub profile_link_color: String,
    pub profile_text_color: String,
    pub protected: bool,
    pub utc_offset: Option<i32>,
    pub time_zone: Option<String>,
    pub url: Option<String>,
    pub statuses_count: u32,
    pub followers_count: u32,
    pub friends_count: u32,
    pub favourites_count: u32,
    pub last_status: Option<StatusSummary>,
    pub error: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SearchResult {
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub text: String,
    #[serde_as(as = "DefaultOnNull")]
    pub created_at: String,
    #[serde_as(as = "DefaultOnNull")]
    pub from_user: String,
    pub from_user_id: i64,
    pub to_user_id: Option<i64>,
    pub geo: Option<serde_json::Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub iso_language_code: String,
    #[serde_as(as = "DefaultOnNull")]
    pub source: String,
    #[serde_as(as = "DefaultOnNull")]
    pub profile_image_url: String,
    pub error: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimit {
    pub remaining_hits: u32,
    pub hourly_limit: u32,
    pub reset_time_in_seconds: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub reset_time: String,
    pub error: Option<String>,
}

// MARK: Helpers

impl Status {
    /// The author, or an empty placeholder if the payload had none.
    pub fn author(&self) -> &UserSummary {
        self.author.as_ref().unwrap_or(&EMPTY_USER_SUMMARY)
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_twitter_date(&self.created_at)
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary {
            id: self.id,
            text: self.text.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

impl User {
    /// The latest status, or an empty placeholder if the payload had none.
    pub fn last_status(&self) -> &StatusSummary {
        self.last_status.as_ref().unwrap_or(&EMPTY_STATUS_SUMMARY)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            screen_name: self.screen_name.clone(),
            profile_image_url: self.profile_image_url.clone(),
        }
    }
}

impl SearchResult {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_twitter_date(&self.created_at)
    }
}

impl Identified for Status {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for User {
    fn id(&self) -> i64 {
        self.id
    }
}

impl RemoteError for Status {
    fn remote_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

impl RemoteError for User {
    fn remote_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

impl RemoteError for SearchResult {
    fn remote_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

impl RemoteError for RateLimit {
    fn remote_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

// MARK: Conversions

impl response::Status {
    /// Split into the public status and its embedded author, if any.
    /// The author's `last_status` points back at this status.
    pub fn into_parts(self) -> (Status, Option<User>) {
        let author = self.user.map(|u| u.into_parts().0).filter(|u| u.id != 0);
        let status = Status {
            id: self.id,
            text: self.text,
            created_at: self.created_at,
            favorited: self.favorited,
            truncated: self.truncated,
            source: self.source,
            in_reply_to_screen_name: self.in_reply_to_screen_name,
            in_reply_to_status_id: self.in_reply_to_status_id,
            in_reply_to_user_id: self.in_reply_to_user_id,
            author: author.as_ref().map(User::summary),
            error: self.error,
        };
        let author = author.map(|mut u| {
            u.last_status = Some(status.summary());
            u
        });
        (status, author)
    }
}

impl response::User {
    /// Split into the public user and its embedded latest status, if any.
    /// The status' `author` points back at this user.
    pub fn into_parts(self) -> (User, Option<Status>) {
        let status = self.status.map(|s| s.into_parts().0).filter(|s| s.id != 0);
        let user = User {
            id: self.id,
            name: self.name,
            screen_name: self.screen_name,
            location: self.location,
            description: self.description,
            profile_image_url: self.profile_image_url,
            profile_background_tile: self.profile_background_tile,
            profile_background_image_url: self.profile_background_image_url,
            profile_sidebar_fill_color: self.profile_sidebar_fill_color,
            profile_link_color: self.profile_link_color,
            profile_text_color: self.profile_text_color,
            protected: self.protected,
            utc_offset: self.utc_offset,
            time_zone: self.time_zone,
            url: self.url,
            statuses_count: self.statuses_count,
            followers_count: self.followers_count,
            friends_count: self.friends_count,
            favourites_count: self.favourites_count,
            last_status: status.as_ref().map(Status::summary),
            error: self.error,
        };
        let status = status.map(|mut s| {
            s.author = Some(user.summary());
            s
        });
        (user, status)
    }
}

impl response::SearchResponse {
    /// Decode every item on its own, so a malformed item does not fail the batch.
    pub fn into_results(self) -> (Vec<SearchResult>, Vec<serde_json::Error>) {
        let mut results = Vec::with_capacity(self.results.len());
        let mut errors = Vec::new();
        for item in self.results {
            match serde_json::from_value(item) {
                Ok(result) => results.push(result),
                Err(e) => errors.push(e),
            }
        }
        (results, errors)
    }
}
