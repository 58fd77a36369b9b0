use reqwest::Url;

use std::env;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::consts::*;
use crate::error::{Error, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both parts must be non-empty for requests to be authenticated.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identification strings sent to the service along with requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client: String,
    pub client_url: String,
    pub client_version: String,
    pub user_agent: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        ClientIdentity {
            client: DEFAULT_CLIENT.to_string(),
            client_url: DEFAULT_CLIENT_URL.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Option<Credentials>,
    pub identity: ClientIdentity,
    pub api_root: Url,
    pub search_root: Url,
    pub cache_expiry: Duration,
    /// Per-request timeout of the HTTP transport. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Directory to dump raw response bodies into.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            credentials: None,
            identity: ClientIdentity::default(),
            api_root: Url::parse(API_ROOT).expect("valid default API root"),
            search_root: Url::parse(SEARCH_ROOT).expect("valid default search root"),
            cache_expiry: DEFAULT_CACHE_EXPIRY,
            timeout: None,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Build a config from `TWITTER_*` variables and `CLIENT_LOG_DIR`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = ClientConfig::default();

        let username = env::var("TWITTER_USERNAME").unwrap_or_default();
        let password = env::var("TWITTER_PASSWORD").unwrap_or_default();
        if !username.is_empty() || !password.is_empty() {
            config.credentials = Some(Credentials::new(username, password));
        }
        if let Some(root) = read_var::<Url>("TWITTER_API_ROOT")? {
            config.api_root = root;
        }
        if let Some(root) = read_var::<Url>("TWITTER_SEARCH_ROOT")? {
            config.search_root = root;
        }
        if let Some(secs) = read_var::<u64>("TWITTER_CACHE_EXPIRY_SECS")? {
            config.cache_expiry = Duration::from_secs(secs);
        }
        config.timeout = read_var::<u64>("TWITTER_TIMEOUT_SECS")?.map(Duration::from_secs);
        config.log_dir = env::var("CLIENT_LOG_DIR").ok().map(PathBuf::from);

        Ok(config)
    }
}

fn read_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{}={}", key, value))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert!(config.credentials.is_none());
        assert_eq!(config.cache_expiry, Duration::from_secs(60));
        assert_eq!(config.api_root.as_str(), "http://www.twitter.com/");
        assert_eq!(config.identity.client, DEFAULT_CLIENT);
    }

    #[test]
    fn credentials_need_both_parts() {
        assert!(Credentials::new("user", "pass").is_complete());
        assert!(!Credentials::new("user", "").is_complete());
        assert!(!Credentials::new("", "pass").is_complete());
    }

    #[test]
    fn debug_output_hides_password() {
        let config = ClientConfig {
            credentials: Some(Credentials::new("jb55", "hunter2")),
            ..Default::default()
        };
        let printed = format!("{:?}", config);
        assert!(printed.contains("jb55"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn malformed_variable_is_config_error() {
        env::set_var("TWITTER_TEST_MALFORMED_SECS", "soon");
        let err = read_var::<u64>("TWITTER_TEST_MALFORMED_SECS").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(read_var::<u64>("TWITTER_TEST_UNSET_VARIABLE").unwrap().is_none());
    }
}
