//! GitHub OAuth authorization-code flow.
//!
//! # Flow Overview
//!
//! 1. Generate a random state token and persist it
//! 2. Send the user to GitHub's authorize page with that state
//! 3. GitHub redirects back with `code` and `state`
//! 4. Check the state, then hand the code to the token relay, which holds
//!    the client secret and performs the exchange
//! 5. Fetch the identity with the new token
//!
//! The redirect lands on a short-lived loopback listener (see
//! [`LoopbackReceiver`]). The persisted state is cleared whatever the outcome
//! of the callback, so a code can never be replayed against it.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use easyhybrid_core::LocalStore;
use easyhybrid_core::store::{GITHUB_USER_FILE, OAUTH_STATE_FILE, Visibility};

use crate::error::{SyncError, SyncResult};
use crate::gist::{BoxFuture, GistApi, GitHubUser};

/// GitHub's authorization endpoint.
pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Public client id of the GitHub OAuth app.
pub const DEFAULT_CLIENT_ID: &str = "Iv1.b507a08443956f65";

/// Scope needed to read and write gists.
pub const DEFAULT_SCOPE: &str = "gist";

/// How long the loopback listener waits for the browser.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const STATE_BYTES: usize = 16;

/// OAuth app settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub scope: String,
    pub authorize_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
        }
    }
}

/// Query parameters GitHub appends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parses a query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "code" => params.code = value,
                "state" => params.state = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                _ => {}
            }
        }
        params
    }

    /// Parses the query of a request target such as `/callback?code=…`.
    pub fn from_request_target(target: &str) -> Self {
        match target.split_once('?') {
            Some((_, query)) => Self::from_query(query),
            None => Self::default(),
        }
    }
}

/// Returns true when both `code` and `state` are present.
pub fn is_oauth_callback(params: &CallbackParams) -> bool {
    params.code.is_some() && params.state.is_some()
}

/// Body sent to the token relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    pub code: String,
    pub client_id: String,
    pub redirect_uri: String,
}

/// Exchanges an authorization code for an access token.
pub trait TokenRelay: Send + Sync {
    fn exchange_code<'a>(&'a self, request: &'a TokenRequest) -> BoxFuture<'a, SyncResult<String>>;
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// [`TokenRelay`] talking to the relay service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTokenRelay {
    http_client: reqwest::Client,
    url: String,
}

impl HttpTokenRelay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TokenRelay for HttpTokenRelay {
    fn exchange_code<'a>(&'a self, request: &'a TokenRequest) -> BoxFuture<'a, SyncResult<String>> {
        Box::pin(async move {
            let response = self
                .http_client
                .post(&self.url)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    SyncError::network(format!("token relay request failed: {}", e)).with_source(e)
                })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| SyncError::network(format!("failed to read relay response: {}", e)))?;

            // The relay reports failures as {"error": "..."} on 4xx/5xx.
            let parsed: Option<RelayResponse> = serde_json::from_str(&body).ok();
            if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_deref()) {
                return Err(SyncError::invalid_token(format!(
                    "token exchange failed: {}",
                    error
                )));
            }
            if !status.is_success() {
                return Err(SyncError::remote(status.as_u16(), "token relay error"));
            }

            parsed
                .and_then(|r| r.access_token)
                .ok_or_else(|| SyncError::parse("token relay response has no access_token"))
        })
    }
}

/// A completed sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    pub access_token: String,
    pub user: GitHubUser,
}

/// Result of [`OAuthService::authenticate_with_github`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The flow was started; the caller must send the user to `url`.
    Redirecting { url: String },
    Authenticated(AuthSuccess),
}

/// Drives the authorization-code flow.
pub struct OAuthService {
    store: LocalStore,
    config: OAuthConfig,
    relay: Arc<dyn TokenRelay>,
    api: Arc<dyn GistApi>,
}

impl std::fmt::Debug for OAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthService")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

impl OAuthService {
    pub fn new(
        store: LocalStore,
        config: OAuthConfig,
        relay: Arc<dyn TokenRelay>,
        api: Arc<dyn GistApi>,
    ) -> Self {
        Self {
            store,
            config,
            relay,
            api,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Persists a fresh state token and returns the authorization URL.
    pub fn initiate_oauth_flow(&self, redirect_uri: &str) -> SyncResult<String> {
        let state = generate_state();
        self.store
            .write_text(OAUTH_STATE_FILE, &state, Visibility::Private)?;

        let url = self.build_auth_url(redirect_uri, &state);
        debug!(redirect_uri, "initiated OAuth flow");
        Ok(url)
    }

    fn build_auth_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(state),
        )
    }

    /// Validates the callback, exchanges the code and fetches the identity.
    ///
    /// The persisted state token is removed before anything can fail.
    pub async fn handle_oauth_callback(
        &self,
        params: &CallbackParams,
        redirect_uri: &str,
    ) -> SyncResult<AuthSuccess> {
        let expected = self.store.read_text(OAUTH_STATE_FILE);
        if let Err(e) = self.store.remove(OAUTH_STATE_FILE) {
            warn!(error = %e, "failed to clear OAuth state");
        }
        let expected = expected?;

        if let Some(error) = params.error.as_deref() {
            let detail = params.error_description.as_deref().unwrap_or(error);
            return Err(SyncError::invalid_token(format!(
                "authorization denied: {}",
                detail
            )));
        }

        let (Some(code), Some(state)) = (params.code.as_deref(), params.state.as_deref()) else {
            return Err(SyncError::invalid_token(
                "missing code or state in OAuth callback",
            ));
        };

        if expected.as_deref() != Some(state) {
            warn!("OAuth state mismatch");
            return Err(SyncError::csrf("Invalid state parameter"));
        }

        let request = TokenRequest {
            code: code.to_string(),
            client_id: self.config.client_id.clone(),
            redirect_uri: redirect_uri.to_string(),
        };
        let access_token = self.relay.exchange_code(&request).await?;

        let user = self.api.current_user(&access_token).await?;
        self.store
            .save_json(GITHUB_USER_FILE, &user, Visibility::Normal)?;
        info!(login = %user.login, "signed in to GitHub");

        Ok(AuthSuccess { access_token, user })
    }

    /// Completes the flow when `params` is a callback, otherwise starts it.
    pub async fn authenticate_with_github(
        &self,
        params: Option<&CallbackParams>,
        redirect_uri: &str,
    ) -> SyncResult<AuthOutcome> {
        match params {
            Some(params) if is_oauth_callback(params) => self
                .handle_oauth_callback(params, redirect_uri)
                .await
                .map(AuthOutcome::Authenticated),
            _ => self
                .initiate_oauth_flow(redirect_uri)
                .map(|url| AuthOutcome::Redirecting { url }),
        }
    }

    /// Runs the whole flow through a loopback listener.
    ///
    /// Opens the browser when `open_browser` is set; the URL is also printed
    /// so it can be copied by hand.
    pub async fn authorize_in_browser(
        &self,
        port_range: (u16, u16),
        open_browser: bool,
    ) -> SyncResult<AuthSuccess> {
        let receiver = LoopbackReceiver::bind(port_range).await?;
        let redirect_uri = receiver.redirect_uri();

        let url = match self.authenticate_with_github(None, &redirect_uri).await? {
            AuthOutcome::Redirecting { url } => url,
            AuthOutcome::Authenticated(success) => return Ok(success),
        };

        info!("starting GitHub sign-in");
        debug!(url = %url, "authorization URL");
        if open_browser {
            if let Err(e) = open::that(&url) {
                warn!("failed to open browser: {}", e);
            }
        }
        eprintln!("\nIf the browser did not open, visit:\n\n{}\n", url);

        let params = receiver.wait(CALLBACK_TIMEOUT).await?;
        match self
            .authenticate_with_github(Some(&params), &redirect_uri)
            .await?
        {
            AuthOutcome::Authenticated(success) => Ok(success),
            AuthOutcome::Redirecting { .. } => {
                // Not a callback: make sure the state does not linger.
                self.store.remove(OAUTH_STATE_FILE)?;
                Err(SyncError::invalid_token(
                    "missing code or state in OAuth callback",
                ))
            }
        }
    }

    /// The identity cached by the last sign-in.
    pub fn cached_user(&self) -> SyncResult<Option<GitHubUser>> {
        Ok(self.store.load_json(GITHUB_USER_FILE)?)
    }

    /// Forgets the cached identity.
    pub fn sign_out(&self) -> SyncResult<()> {
        self.store.remove(GITHUB_USER_FILE)?;
        Ok(())
    }
}

/// Generates a random state string for CSRF protection.
fn generate_state() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..STATE_BYTES).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// One-shot HTTP listener on 127.0.0.1 receiving the OAuth redirect.
#[derive(Debug)]
pub struct LoopbackReceiver {
    listener: TcpListener,
    port: u16,
}

impl LoopbackReceiver {
    /// Binds the first free port in the inclusive range.
    pub async fn bind(port_range: (u16, u16)) -> SyncResult<Self> {
        for port in port_range.0..=port_range.1 {
            match TcpListener::bind(("127.0.0.1", port)).await {
                Ok(listener) => {
                    let port = listener.local_addr().map(|a| a.port()).unwrap_or(port);
                    debug!(port, "bound loopback listener");
                    return Ok(Self { listener, port });
                }
                Err(e) => debug!(port, error = %e, "port unavailable"),
            }
        }
        Err(SyncError::internal(format!(
            "no available port in range {}-{}",
            port_range.0, port_range.1
        )))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }

    /// Waits for `GET /callback?…` and returns its parameters.
    ///
    /// Other paths (favicon requests and the like) get a 404 and are ignored.
    pub async fn wait(self, timeout: Duration) -> SyncResult<CallbackParams> {
        tokio::time::timeout(timeout, self.accept_callback())
            .await
            .map_err(|_| SyncError::invalid_token("OAuth callback timeout"))?
    }

    async fn accept_callback(&self) -> SyncResult<CallbackParams> {
        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| SyncError::internal(format!("failed to accept connection: {}", e)))?;
            debug!(%peer, "loopback connection");

            match Self::read_callback(stream).await {
                Ok(Some(params)) => return Ok(params),
                Ok(None) => continue,
                Err(e) => warn!(error = %e, "bad loopback request"),
            }
        }
    }

    async fn read_callback(mut stream: TcpStream) -> std::io::Result<Option<CallbackParams>> {
        let mut request_line = String::new();
        {
            let mut reader = BufReader::new(&mut stream);
            reader.read_line(&mut request_line).await?;
        }

        // GET /callback?code=...&state=... HTTP/1.1
        let mut parts = request_line.split_whitespace();
        let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
            stream.write_all(NOT_FOUND.as_bytes()).await?;
            return Ok(None);
        };
        let path = target.split('?').next().unwrap_or_default();
        if path != "/callback" {
            stream.write_all(NOT_FOUND.as_bytes()).await?;
            return Ok(None);
        }

        let params = CallbackParams::from_request_target(target);
        let page = if params.error.is_some() || params.code.is_none() {
            FAILURE_PAGE
        } else {
            SUCCESS_PAGE
        };
        stream.write_all(page.as_bytes()).await?;
        stream.flush().await?;

        Ok(Some(params))
    }
}

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Signed in to GitHub</h1>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "HTTP/1.1 400 Bad Request\r\n\
    Content-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>GitHub sign-in failed</h1>\
    <p>You can close this window.</p></body></html>";
