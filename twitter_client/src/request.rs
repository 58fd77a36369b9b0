use reqwest::Url;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use twitter_util::build_params;

use crate::error::{Error, Result};
use crate::util::is_screen_name;

/// Which user an operation is about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserRef {
    /// The user the client is authenticated as.
    #[default]
    Authenticated,
    Id(i64),
    ScreenName(String),
}

impl UserRef {
    pub fn validate(&self) -> Result<()> {
        match self {
            UserRef::Authenticated => Ok(()),
            UserRef::Id(id) if *id > 0 => Ok(()),
            UserRef::ScreenName(name) if is_screen_name(name) => Ok(()),
            _ => Err(Error::InvalidUserRef(self.to_string())),
        }
    }
}

impl Display for UserRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRef::Authenticated => write!(f, "authenticated user"),
            UserRef::Id(id) => write!(f, "user id {}", id),
            UserRef::ScreenName(name) => write!(f, "screen name {:?}", name),
        }
    }
}

/// Empty is the authenticated user, all digits is an id, anything else a screen name (leading `@` dropped).
impl FromStr for UserRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let user = if s.is_empty() {
            UserRef::Authenticated
        } else if s.bytes().all(|b| b.is_ascii_digit()) {
            UserRef::Id(s.parse().map_err(|_| Error::InvalidUserRef(s.to_string()))?)
        } else {
            UserRef::ScreenName(s.strip_prefix('@').unwrap_or(s).to_string())
        };
        user.validate()?;
        Ok(user)
    }
}

impl From<i64> for UserRef {
    fn from(id: i64) -> Self {
        UserRef::Id(id)
    }
}

impl From<i32> for UserRef {
    fn from(id: i32) -> Self {
        UserRef::Id(id.into())
    }
}

impl From<&str> for UserRef {
    fn from(name: &str) -> Self {
        UserRef::ScreenName(name.to_string())
    }
}

impl From<String> for UserRef {
    fn from(name: String) -> Self {
        UserRef::ScreenName(name)
    }
}

impl<T: Into<UserRef>> From<Option<T>> for UserRef {
    fn from(user: Option<T>) -> Self {
        user.map(Into::into).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserResource {
    Show,
    Followers,
    Friends,
}

impl UserResource {
    fn path(&self) -> &'static str {
        match self {
            UserResource::Show => "users/show",
            UserResource::Followers => "statuses/followers",
            UserResource::Friends => "statuses/friends",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    Public,
    User,
    Friends,
    Replies,
}

impl Timeline {
    fn path(&self) -> &'static str {
        match self {
            Timeline::Public => "statuses/public_timeline.json",
            Timeline::User => "statuses/user_timeline.json",
            Timeline::Friends => "statuses/friends_timeline.json",
            Timeline::Replies => "statuses/mentions.json",
        }
    }
}

/// A search request. Filters left unset, or set to their default value, are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub since_id: Option<i64>,
    pub locale: Option<String>,
    pub lang: Option<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        SearchQuery {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn since_id(mut self, since_id: i64) -> Self {
        self.since_id = Some(since_id);
        self
    }

    /// Language of the query itself (only `ja` is effective).
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Restrict results to an ISO 639-1 language.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    fn params(&self) -> Result<Vec<(String, String)>> {
        if self.text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let q = &self.text;
        let page = self.page.filter(|p| *p >= 2);
        let rpp = self.per_page.filter(|n| *n > 0);
        let since_id = self.since_id.filter(|id| *id > 0);
        let locale = self.locale.as_deref().filter(|s| !s.is_empty());
        let lang = self.lang.as_deref().filter(|s| !s.is_empty());
        Ok(build_params! {
            required q,
            optional page,
            optional rpp,
            optional since_id,
            optional locale,
            optional lang,
        })
    }
}

/// Renders request URLs against the configured roots.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_root: Url,
    search_root: Url,
}

impl Endpoints {
    pub fn new(api_root: Url, search_root: Url) -> Self {
        Endpoints { api_root, search_root }
    }

    pub fn status(&self, id: i64) -> Result<Url> {
        Ok(self.api_root.join(&format!("statuses/show/{}.json", id))?)
    }

    pub fn update(&self) -> Result<Url> {
        Ok(self.api_root.join("statuses/update.json")?)
    }

    pub fn timeline(&self, timeline: Timeline) -> Result<Url> {
        Ok(self.api_root.join(timeline.path())?)
    }

    pub fn rate_limit(&self) -> Result<Url> {
        Ok(self.api_root.join("account/rate_limit_status.json")?)
    }

    /// `page` is sent only from the second page on.
    pub fn user_resource(&self, resource: UserResource, user: &UserRef, page: u32) -> Result<Url> {
        user.validate()?;
        let user_id = match user {
            UserRef::Id(id) => Some(*id),
            _ => None,
        };
        let screen_name = match user {
            UserRef::ScreenName(name) => Some(name.as_str()),
            _ => None,
        };
        let page = Some(page).filter(|p| *p >= 2);
        let params = build_params! {
            optional user_id,
            optional screen_name,
            optional page,
        };

        let mut url = self.api_root.join(&format!("{}.json", resource.path()))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Url> {
        let params = query.params()?;
        let mut url = self.search_root.join("search.json")?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }
}
