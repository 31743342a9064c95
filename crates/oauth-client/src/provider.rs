//! Client-credentials token acquisition.

use tracing::{debug, error, info};

use crate::error::{OAuthError, Result};
use crate::token::{Credentials, Token};

/// Anything that can hand out a fresh token.
///
/// The controller is generic over this so it can run against a fake.
#[allow(async_fn_in_trait)]
pub trait TokenSource {
    async fn fetch_token(&self) -> Result<Token>;
}

/// Obtains bearer tokens with the OAuth2 client-credentials grant.
///
/// Every call to [`TokenProvider::fetch_token`] performs a new round trip;
/// tokens are never cached.
#[derive(Clone, Debug)]
pub struct TokenProvider {
    http: reqwest::Client,
    credentials: Credentials,
}

impl TokenProvider {
    /// Create a provider with its own HTTP client.
    ///
    /// Fails without touching the network if any credential field is empty.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), credentials)
    }

    /// Create a provider that shares an existing HTTP client.
    pub fn with_client(http: reqwest::Client, credentials: Credentials) -> Result<Self> {
        credentials.validate()?;
        Ok(Self { http, credentials })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// POST the form-encoded credentials and parse the token document.
    ///
    /// # Errors
    /// * `Transport` - the request could not be sent
    /// * `Status` - the endpoint answered with a non-2xx status
    /// * `Decode` - the body is not a token document
    pub async fn fetch_token(&self) -> Result<Token> {
        let url = self.credentials.token_url();
        info!("Requesting token from {}", url);

        let response = self
            .http
            .post(url)
            .form(&self.credentials.form())
            .send()
            .await
            .map_err(|e| {
                error!("Token request to {} failed: {}", url, e);
                OAuthError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Token endpoint returned {}", status);
            return Err(OAuthError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let token: Token = serde_json::from_str(&body).map_err(|e| {
            error!("Could not parse token response: {}", e);
            OAuthError::Decode(e)
        })?;

        debug!(
            "Received {} token (scope: {}, expires in {}s)",
            token.token_type, token.scope, token.expires_in
        );
        Ok(token)
    }
}

impl TokenSource for TokenProvider {
    async fn fetch_token(&self) -> Result<Token> {
        TokenProvider::fetch_token(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    // ============================================================================
    // Stub token endpoint
    // ============================================================================

    #[derive(Clone, Copy)]
    enum Reply {
        Token,
        Unauthorized,
        Garbage,
        MissingScope,
    }

    #[derive(Clone)]
    struct StubState {
        reply: Reply,
        seen: Seen,
    }

    async fn token_handler(
        State(state): State<StubState>,
        Form(form): Form<HashMap<String, String>>,
    ) -> axum::response::Response {
        state.seen.lock().unwrap().push(form);
        match state.reply {
            Reply::Token => Json(json!({
                "access_token": "tok-123",
                "token_type": "Bearer",
                "expires_in": 300,
                "scope": "api"
            }))
            .into_response(),
            Reply::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid_client" })),
            )
                .into_response(),
            Reply::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
            Reply::MissingScope => Json(json!({
                "access_token": "tok-123",
                "token_type": "Bearer",
                "expires_in": 300
            }))
            .into_response(),
        }
    }

    /// Start a stub token endpoint on a random port
    async fn start_stub(reply: Reply) -> (String, Seen, tokio::task::JoinHandle<()>) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/oauth/token", post(token_handler))
            .with_state(StubState {
                reply,
                seen: seen.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub token endpoint");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Stub token endpoint failed");
        });

        (format!("http://{}/oauth/token", addr), seen, handle)
    }

    fn provider(url: &str) -> TokenProvider {
        TokenProvider::new(Credentials::new("client-1", "secret-1", url))
            .expect("Failed to create provider")
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[tokio::test]
    async fn test_fetch_token_returns_stub_fields_verbatim() {
        let (url, _seen, handle) = start_stub(Reply::Token).await;

        let token = provider(&url).fetch_token().await.expect("fetch_token failed");

        assert_eq!(token.access_token, "tok-123");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 300);
        assert_eq!(token.scope, "api");

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_token_posts_form_encoded_credentials() {
        let (url, seen, handle) = start_stub(Reply::Token).await;

        provider(&url).fetch_token().await.expect("fetch_token failed");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "Exactly one token request");
        assert_eq!(seen[0]["client_id"], "client-1");
        assert_eq!(seen[0]["client_secret"], "secret-1");
        assert_eq!(seen[0]["grant_type"], "client_credentials");
        assert_eq!(seen[0].len(), 3, "No extra form fields");

        handle.abort();
    }

    #[tokio::test]
    async fn test_every_call_hits_the_endpoint() {
        let (url, seen, handle) = start_stub(Reply::Token).await;
        let provider = provider(&url);

        provider.fetch_token().await.expect("first fetch failed");
        provider.fetch_token().await.expect("second fetch failed");

        assert_eq!(seen.lock().unwrap().len(), 2, "Tokens must not be cached");

        handle.abort();
    }

    #[tokio::test]
    async fn test_non_2xx_is_an_error() {
        let (url, _seen, handle) = start_stub(Reply::Unauthorized).await;

        match provider(&url).fetch_token().await {
            Err(OAuthError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("expected Status error, got {:?}", other),
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let (url, _seen, handle) = start_stub(Reply::Garbage).await;

        let result = provider(&url).fetch_token().await;
        assert!(matches!(result, Err(OAuthError::Decode(_))));

        handle.abort();
    }

    #[tokio::test]
    async fn test_incomplete_token_is_an_error() {
        let (url, _seen, handle) = start_stub(Reply::MissingScope).await;

        let result = provider(&url).fetch_token().await;
        assert!(matches!(result, Err(OAuthError::Decode(_))));

        handle.abort();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        // Grab a free port, then release it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/oauth/token", addr);
        let result = provider(&url).fetch_token().await;
        assert!(matches!(result, Err(OAuthError::Transport(_))));
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let result = TokenProvider::new(Credentials::new(
            "client-1",
            "",
            "http://localhost/oauth/token",
        ));
        assert!(matches!(
            result,
            Err(OAuthError::MissingField { field: "client_secret" })
        ));
    }
}
