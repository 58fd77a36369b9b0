use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};

use std::path::PathBuf;

use crate::config::{ClientConfig, ClientIdentity, Credentials};
use crate::consts::*;
use crate::error::{Error, Result};

/// Credentials and identification in effect when a call was issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub credentials: Option<Credentials>,
    pub identity: ClientIdentity,
}

impl Session {
    /// The credentials to authenticate with, if both username and password are set.
    pub fn authenticated(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| c.is_complete())
    }
}

/// Performs the raw HTTP exchange and hands back the response body.
///
/// A non-success status is [`Error::HttpStatus`] carrying the body, so callers can still decode it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: Url, session: &Session) -> Result<String>;

    /// POST `form` URL-encoded.
    async fn post(&self, url: Url, session: &Session, form: Vec<(String, String)>) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    log_dir: Option<PathBuf>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<HttpTransport> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(HttpTransport {
            client,
            log_dir: config.log_dir.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        let request = request.header(header::USER_AGENT, &session.identity.user_agent);
        match session.authenticated() {
            Some(credentials) => request.basic_auth(&credentials.username, Some(&credentials.password)),
            None => request,
        }
    }

    /// Error statuses keep their body, which usually holds the service's own error object.
    async fn read(&self, url: &Url, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let content = response.text().await?;

        log(self.log_dir.as_ref(), url, &content).await?;
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: content,
            });
        }
        Ok(content)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url, session: &Session) -> Result<String> {
        tracing::debug!("GET {}", url);
        let request = self.authorize(self.client.get(url.clone()), session);
        self.read(&url, request).await
    }

    async fn post(&self, url: Url, session: &Session, form: Vec<(String, String)>) -> Result<String> {
        tracing::debug!("POST {}", url);
        let identity = &session.identity;
        let request = self
            .authorize(self.client.post(url.clone()), session)
            .header(HEADER_CLIENT, &identity.client)
            .header(HEADER_CLIENT_URL, &identity.client_url)
            .header(HEADER_CLIENT_VERSION, &identity.client_version)
            .form(&form);
        self.read(&url, request).await
    }
}

/// Dump a response body into `dir`, named after the endpoint path.
async fn log(dir: Option<&PathBuf>, url: &Url, content: &str) -> Result<()> {
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Some(dir) = dir {
        let path = url.path();
        let name = path
            .strip_prefix('/')
            .unwrap_or(path)
            .trim_end_matches(".json")
            .replace('/', "_");
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = dir.join(format!("twitter_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_credentials_are_not_used() {
        let mut session = Session::default();
        assert!(session.authenticated().is_none());

        session.credentials = Some(Credentials::new("jb55", ""));
        assert!(session.authenticated().is_none());

        session.credentials = Some(Credentials::new("jb55", "secret"));
        assert_eq!(session.authenticated().unwrap().username, "jb55");
    }
}
