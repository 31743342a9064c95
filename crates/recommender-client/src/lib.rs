//! HTTP client for the recommender REST API.
//!
//! This crate provides a thin wrapper over the three authorized endpoints:
//! - Fetching the next item the profile has not reacted to
//! - Posting a reaction or answer
//! - Listing matches for the profile
//!
//! Every call takes a [`Token`] obtained by the caller. Nothing is retried;
//! the first failure is returned.

pub mod types;

use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use oauth_client::Token;

pub use types::{
    Ack, Item, ItemId, MAX_RATING, MIN_RATING, MatchQuery, MatchResult, ProfileId, ReactionValue,
    SKIP_SENTINEL, SortOrder, Submission,
};

/// Errors that can occur when talking to the recommender API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid {name} endpoint {url}: {reason}")]
    InvalidEndpoint {
        name: &'static str,
        url: String,
        reason: String,
    },

    #[error("No {0} endpoint configured")]
    MissingEndpoint(&'static str),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from API: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Endpoint URLs, fixed for the lifetime of a client.
///
/// `next_item` is already bound to a profile id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub next_item: String,
    pub submit: String,
    pub matches: Option<String>,
}

impl Endpoints {
    /// Check that every configured endpoint is an absolute URL.
    pub fn validate(&self) -> Result<()> {
        check_url("next_item", &self.next_item)?;
        check_url("submit", &self.submit)?;
        if let Some(matches) = &self.matches {
            check_url("matches", matches)?;
        }
        Ok(())
    }
}

fn check_url(name: &'static str, url: &str) -> Result<()> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| ApiError::InvalidEndpoint {
            name,
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// The API wraps every payload in `{"result": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    result: Option<T>,
}

/// The operations the controller needs from the recommender API.
#[allow(async_fn_in_trait)]
pub trait RecommenderApi {
    async fn fetch_next_item(&self, token: &Token) -> Result<Option<Item>>;

    async fn submit(&self, token: &Token, submission: &Submission) -> Result<Ack>;

    async fn fetch_matches(&self, token: &Token, query: &MatchQuery) -> Result<Vec<MatchResult>>;
}

/// Client for the recommender API.
#[derive(Debug, Clone)]
pub struct RecommenderClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl RecommenderClient {
    /// Create a client with its own connection pool.
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    /// Create a client sharing an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoints: Endpoints) -> Result<Self> {
        endpoints.validate()?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Get the next item the profile has not reacted to.
    ///
    /// # Returns
    /// * `Ok(Some(item))` - the body's `result` field
    /// * `Ok(None)` - `result` is missing, `null` or empty: nothing left
    /// * `Err(ApiError::Decode)` - `result` is not a single item
    pub async fn fetch_next_item(&self, token: &Token) -> Result<Option<Item>> {
        info!("Fetching next item from {}", self.endpoints.next_item);

        let request = self.http.get(&self.endpoints.next_item);
        let body = self.send(request, token).await?;

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
        let item = match envelope.result {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Object(map)) if map.is_empty() => None,
            Some(serde_json::Value::Array(list)) if list.is_empty() => None,
            Some(serde_json::Value::Array(_)) => {
                return Err(ApiError::Decode(serde::de::Error::custom(
                    "expected a single item, got a list",
                )));
            }
            Some(value) => Some(serde_json::from_value::<Item>(value)?),
        };

        match &item {
            Some(item) => debug!("Received item {}", item.id),
            None => info!("No unreacted items left"),
        }
        Ok(item)
    }

    /// Post a reaction or answer as JSON.
    pub async fn submit(&self, token: &Token, submission: &Submission) -> Result<Ack> {
        info!(
            "Submitting response for item {} to {}",
            submission.item_id(),
            self.endpoints.submit
        );

        let request = self.http.post(&self.endpoints.submit).json(submission);
        let body = self.send(request, token).await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// List matches for the profile.
    pub async fn fetch_matches(
        &self,
        token: &Token,
        query: &MatchQuery,
    ) -> Result<Vec<MatchResult>> {
        let url = self
            .endpoints
            .matches
            .as_deref()
            .ok_or(ApiError::MissingEndpoint("matches"))?;
        info!("Fetching matches from {}", url);

        let request = self.http.get(url).query(query);
        let body = self.send(request, token).await?;

        let envelope: Envelope<Vec<MatchResult>> = serde_json::from_str(&body)?;
        let matches = envelope.result.unwrap_or_default();
        debug!("Received {} matches", matches.len());
        Ok(matches)
    }

    /// Attach the authorization header, send, and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, token: &Token) -> Result<String> {
        let response = request
            .header(AUTHORIZATION, token.authorization())
            .send()
            .await
            .map_err(|e| {
                error!("Request to recommender API failed: {}", e);
                ApiError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Recommender API returned {}", status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl RecommenderApi for RecommenderClient {
    async fn fetch_next_item(&self, token: &Token) -> Result<Option<Item>> {
        RecommenderClient::fetch_next_item(self, token).await
    }

    async fn submit(&self, token: &Token, submission: &Submission) -> Result<Ack> {
        RecommenderClient::submit(self, token, submission).await
    }

    async fn fetch_matches(&self, token: &Token, query: &MatchQuery) -> Result<Vec<MatchResult>> {
        RecommenderClient::fetch_matches(self, token, query).await
    }
}
