//! Connection settings, from command-line flags or `KOOYARA_*` variables.

use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};
use reqwest::Url;
use tracing::debug;

use controller::FlowKind;
use oauth_client::Credentials;
use recommender_client::Endpoints;

/// Placeholder replaced with the profile id in endpoint paths
pub const PROFILE_PLACEHOLDER: &str = "{profile}";

/// Which kind of item a command works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flow {
    /// Statements rated 1-5
    Statements,
    /// Multiple-choice questions
    Questions,
}

impl From<Flow> for FlowKind {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Statements => FlowKind::Reaction,
            Flow::Questions => FlowKind::Answer,
        }
    }
}

#[derive(Args, Clone)]
pub struct Settings {
    /// OAuth2 client id
    #[arg(long, env = "KOOYARA_CLIENT_ID")]
    pub client_id: String,

    /// OAuth2 client secret
    #[arg(long, env = "KOOYARA_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// OAuth2 grant type
    #[arg(long, env = "KOOYARA_GRANT_TYPE", default_value = oauth_client::DEFAULT_GRANT_TYPE)]
    pub grant_type: String,

    /// Base URL of the recommender service
    #[arg(long, env = "KOOYARA_API_URL", default_value = "http://localhost:5000")]
    pub base_url: String,

    /// Token endpoint (default: <base-url>/oauth/token)
    #[arg(long, env = "KOOYARA_TOKEN_URL")]
    pub token_url: Option<String>,

    /// Profile to fetch items for
    #[arg(long, env = "KOOYARA_PROFILE")]
    pub profile: String,

    /// Next-item endpoint path or URL; `{profile}` is substituted
    #[arg(long, env = "KOOYARA_NEXT_PATH")]
    pub next_path: Option<String>,

    /// Submission endpoint path or URL
    #[arg(long, env = "KOOYARA_SUBMIT_PATH")]
    pub submit_path: Option<String>,

    /// Matches endpoint path or URL; `{profile}` is substituted
    #[arg(
        long,
        env = "KOOYARA_MATCHES_PATH",
        default_value = "/api/v1.0/profiles/{profile}/matches"
    )]
    pub matches_path: String,
}

impl Settings {
    pub fn credentials(&self) -> Credentials {
        let token_url = self
            .token_url
            .clone()
            .unwrap_or_else(|| join_url(&self.base_url, "/oauth/token"));

        Credentials::new(&self.client_id, &self.client_secret, token_url)
            .with_grant_type(&self.grant_type)
    }

    /// Endpoint URLs for `flow`, bound to the configured profile.
    pub fn endpoints(&self, flow: Flow) -> Result<Endpoints> {
        let (next_default, submit_default) = match flow {
            Flow::Statements => (
                "/api/v1.0/profiles/{profile}/inaction",
                "/api/v1.0/reactions",
            ),
            Flow::Questions => (
                "/api/v1.0/profiles/{profile}/unanswered",
                "/api/v1.0/answers",
            ),
        };
        let next = self.next_path.as_deref().unwrap_or(next_default);
        let submit = self.submit_path.as_deref().unwrap_or(submit_default);

        let endpoints = Endpoints {
            next_item: self.resolve(next)?,
            submit: self.resolve(submit)?,
            matches: Some(self.resolve(&self.matches_path)?),
        };
        debug!("Resolved endpoints: {:?}", endpoints);
        Ok(endpoints)
    }

    fn resolve(&self, template: &str) -> Result<String> {
        let (base, path) = split_origin(template).unwrap_or((self.base_url.as_str(), template));
        bind_profile(base, path, &self.profile)
    }
}

/// Split an absolute URL into its origin and path.
fn split_origin(url: &str) -> Option<(&str, &str)> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))?;
    let origin_len = url.len() - rest.len() + rest.find('/').unwrap_or(rest.len());
    Some(url.split_at(origin_len))
}

/// Append the segments of `template` to `base`, with the profile id
/// percent-encoded as a single segment in place of `{profile}`.
pub fn bind_profile(base: &str, template: &str, profile: &str) -> Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid base URL {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("{} cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(template.split('/').filter(|s| !s.is_empty()).map(|segment| {
            if segment == PROFILE_PLACEHOLDER {
                profile
            } else {
                segment
            }
        }));
    Ok(url.to_string())
}

/// Join a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
