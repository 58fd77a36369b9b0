use std::time::Duration;

pub const API_ROOT: &str = "http://www.twitter.com";
pub const SEARCH_ROOT: &str = "http://search.twitter.com";

pub const DEFAULT_CLIENT: &str = "rust-twitter";
pub const DEFAULT_CLIENT_URL: &str = "https://github.com/rust-twitter/twitter_client";
pub const DEFAULT_CLIENT_VERSION: &str = "0.1";
pub const DEFAULT_USER_AGENT: &str = "rust-twitter";

pub const DEFAULT_CACHE_EXPIRY: Duration = Duration::from_secs(60);

/// Capacity of the reported error ring.
pub const ERROR_BUFFER_CAPACITY: usize = 16;

pub const SCREEN_NAME_MAX_LEN: usize = 15;

pub const HEADER_CLIENT: &str = "X-Twitter-Client";
pub const HEADER_CLIENT_URL: &str = "X-Twitter-Client-URL";
pub const HEADER_CLIENT_VERSION: &str = "X-Twitter-Client-Version";
