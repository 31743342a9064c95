//! Credentials and the token they are exchanged for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};

/// Grant type sent when none is configured.
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";

/// Client credentials for the token endpoint.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    token_url: String,
    grant_type: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
        }
    }

    /// Override the grant type (builder pattern).
    pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = grant_type.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn grant_type(&self) -> &str {
        &self.grant_type
    }

    /// Check that every field is present and the endpoint is an absolute URL.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("token_url", &self.token_url),
            ("grant_type", &self.grant_type),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(OAuthError::MissingField { field });
            }
        }

        reqwest::Url::parse(&self.token_url).map_err(|e| OAuthError::InvalidEndpoint {
            url: self.token_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Form body of the token request.
    pub(crate) fn form(&self) -> [(&'static str, &str); 3] {
        [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", self.grant_type.as_str()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("grant_type", &self.grant_type)
            .finish()
    }
}

/// Access token returned by the token endpoint.
///
/// Tokens are used once and dropped; nothing here tracks expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
}

impl Token {
    /// Value of the `Authorization` header: `"<token_type> <access_token>"`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}
