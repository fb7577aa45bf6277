//! GitHub REST API access for the backup gist.
//!
//! [`GistApi`] is the seam the sync and OAuth services talk to. The real
//! implementation is [`GitHubClient`]; tests plug in an in-memory fake.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// Default GitHub API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("easyhybrid/", env!("CARGO_PKG_VERSION"));

/// A boxed future for async trait methods, keeping the trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The authenticated GitHub account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

impl GitHubUser {
    /// Display name, falling back to the login.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

/// A file inside a gist. `content` is absent in list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A gist as returned by the list and get endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: HashMap<String, GistFile>,
}

impl Gist {
    /// Returns true if the gist has this exact description and a file with this name.
    pub fn matches(&self, description: &str, filename: &str) -> bool {
        self.description.as_deref() == Some(description) && self.files.contains_key(filename)
    }

    /// Content of a file, if present.
    pub fn file_content(&self, filename: &str) -> Option<&str> {
        self.files.get(filename)?.content.as_deref()
    }
}

/// Operations on the GitHub API used by sync and authentication.
///
/// Every call takes the bearer token explicitly so one client can serve
/// the token being validated during setup and the stored one afterwards.
pub trait GistApi: Send + Sync {
    /// `GET /user`. A non-success answer means the token is invalid.
    fn current_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, SyncResult<GitHubUser>>;

    /// `GET /gists?per_page=100`.
    fn list_gists<'a>(&'a self, token: &'a str) -> BoxFuture<'a, SyncResult<Vec<Gist>>>;

    /// `GET /gists/<id>`.
    fn get_gist<'a>(&'a self, token: &'a str, id: &'a str) -> BoxFuture<'a, SyncResult<Gist>>;

    /// `POST /gists` with a single private file. Returns the new gist id.
    fn create_gist<'a>(
        &'a self,
        token: &'a str,
        description: &'a str,
        filename: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, SyncResult<String>>;

    /// `PATCH /gists/<id>` replacing one file's content.
    fn update_gist<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
        filename: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>>;
}

/// reqwest-backed [`GistApi`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    pub fn new() -> SyncResult<Self> {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Creates a client against another API root, e.g. GitHub Enterprise.
    pub fn with_base_url(api_base: impl Into<String>) -> SyncResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> SyncResult<reqwest::Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                SyncError::network("request timeout").with_source(e)
            } else if e.is_connect() {
                SyncError::network(format!("connection failed: {}", e)).with_source(e)
            } else {
                SyncError::network(format!("request failed: {}", e)).with_source(e)
            }
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> SyncResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::network(format!("failed to read response: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| SyncError::parse(format!("invalid {} response: {}", what, e)))
    }

    fn check_status(response: &reqwest::Response) -> SyncResult<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::remote(status.as_u16(), "GitHub API error"))
        }
    }
}

impl GistApi for GitHubClient {
    fn current_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, SyncResult<GitHubUser>> {
        Box::pin(async move {
            let request = self.http_client.get(self.url("/user")).bearer_auth(token);
            let response = self.send(request).await?;

            let status = response.status();
            if !status.is_success() {
                debug!(status = status.as_u16(), "token rejected by GitHub");
                return Err(SyncError::invalid_token(format!(
                    "Invalid GitHub token (HTTP {})",
                    status.as_u16()
                )));
            }

            Self::read_json(response, "user").await
        })
    }

    fn list_gists<'a>(&'a self, token: &'a str) -> BoxFuture<'a, SyncResult<Vec<Gist>>> {
        Box::pin(async move {
            let request = self
                .http_client
                .get(self.url("/gists"))
                .query(&[("per_page", "100")])
                .bearer_auth(token);
            let response = self.send(request).await?;
            Self::check_status(&response)?;

            let gists: Vec<Gist> = Self::read_json(response, "gist list").await?;
            debug!(count = gists.len(), "listed gists");
            Ok(gists)
        })
    }

    fn get_gist<'a>(&'a self, token: &'a str, id: &'a str) -> BoxFuture<'a, SyncResult<Gist>> {
        Box::pin(async move {
            let url = self.url(&format!("/gists/{}", urlencoding::encode(id)));
            let response = self.send(self.http_client.get(url).bearer_auth(token)).await?;
            Self::check_status(&response)?;
            Self::read_json(response, "gist").await
        })
    }

    fn create_gist<'a>(
        &'a self,
        token: &'a str,
        description: &'a str,
        filename: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, SyncResult<String>> {
        Box::pin(async move {
            let body = json!({
                "description": description,
                "public": false,
                "files": { filename: { "content": content } },
            });
            let request = self
                .http_client
                .post(self.url("/gists"))
                .bearer_auth(token)
                .json(&body);
            let response = self.send(request).await?;
            Self::check_status(&response)?;

            let gist: Gist = Self::read_json(response, "created gist").await?;
            debug!(gist_id = %gist.id, "created gist");
            Ok(gist.id)
        })
    }

    fn update_gist<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
        filename: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            let body = json!({ "files": { filename: { "content": content } } });
            let url = self.url(&format!("/gists/{}", urlencoding::encode(id)));
            let request = self.http_client.patch(url).bearer_auth(token).json(&body);
            let response = self.send(request).await?;
            Self::check_status(&response)?;

            debug!(gist_id = %id, "updated gist");
            Ok(())
        })
    }
}
