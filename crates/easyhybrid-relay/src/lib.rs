//! Token-exchange relay for the GitHub OAuth flow.
//!
//! The client sends `{code, client_id, redirect_uri}`; the relay adds the
//! client secret, calls GitHub's token endpoint and answers
//! `{access_token}` or `{error}`. Every response carries permissive CORS
//! headers so browser-based clients can call it too.

pub mod config;
pub mod error;

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCEPT, HeaderName, HeaderValue, USER_AGENT};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};

/// Route the client posts to.
pub const CALLBACK_PATH: &str = "/api/oauth/callback";

const RELAY_USER_AGENT: &str = "Easy-Hybrid-App";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
];

/// Shared handler state.
#[derive(Clone)]
pub struct RelayState {
    http_client: reqwest::Client,
    client_secret: Arc<str>,
    token_url: Arc<str>,
}

impl RelayState {
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(RELAY_USER_AGENT)
            .build()?;
        Ok(Self {
            http_client,
            client_secret: config.client_secret.as_str().into(),
            token_url: config.token_url.as_str().into(),
        })
    }
}

/// Builds the relay router.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(CALLBACK_PATH, post(exchange_handler).options(preflight_handler))
        .layer(middleware::map_response(add_cors_headers))
        .with_state(state)
}

/// Binds and serves until the process is stopped.
pub async fn serve(config: RelayConfig) -> RelayResult<()> {
    let state = RelayState::new(&config)?;
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, token_url = %config.token_url, "relay listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn exchange_handler(State(state): State<RelayState>, body: Bytes) -> Response {
    let request: ExchangeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "OAuth token exchange failed: malformed request body");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let (Some(code), Some(client_id), Some(redirect_uri)) = (
        non_empty(request.code),
        non_empty(request.client_id),
        non_empty(request.redirect_uri),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required parameters");
    };

    match exchange_code(&state, &code, &client_id, &redirect_uri).await {
        Ok(Ok(access_token)) => {
            info!(client_id = %client_id, "exchanged OAuth code");
            Json(json!({ "access_token": access_token })).into_response()
        }
        Ok(Err(github_error)) => {
            warn!(error = %github_error, "GitHub refused the code");
            error_response(StatusCode::BAD_REQUEST, github_error)
        }
        Err(message) => {
            error!(error = %message, "OAuth token exchange failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

/// Calls GitHub. The outer error is a relay failure (500), the inner one an
/// error GitHub reported for the code (400).
async fn exchange_code(
    state: &RelayState,
    code: &str,
    client_id: &str,
    redirect_uri: &str,
) -> Result<Result<String, String>, String> {
    let form = [
        ("client_id", client_id),
        ("client_secret", &*state.client_secret),
        ("code", code),
        ("redirect_uri", redirect_uri),
    ];

    let response = state
        .http_client
        .post(&*state.token_url)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, RELAY_USER_AGENT)
        .form(&form)
        .send()
        .await
        .map_err(|e| format!("token request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("GitHub API error: {}", status.as_u16()));
    }

    let token: GitHubTokenResponse = response
        .json()
        .await
        .map_err(|e| format!("invalid token response: {}", e))?;

    if let Some(error) = token.error {
        return Ok(Err(token.error_description.unwrap_or(error)));
    }

    token
        .access_token
        .map(Ok)
        .ok_or_else(|| "token response has no access_token".to_string())
}
