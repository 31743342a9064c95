//! Error types for the controller crate.

use thiserror::Error;

use oauth_client::OAuthError;
use recommender_client::ApiError;

/// Everything that can interrupt the fetch/display/submit cycle.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The token endpoint could not produce a token
    #[error("Could not obtain an access token: {0}")]
    Token(#[from] OAuthError),

    /// A fetch or submit call failed
    #[error("Recommender API call failed: {0}")]
    Api(#[from] ApiError),

    /// The user's input cannot be submitted; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// A rating outside the slider's range
    #[error("Rating {0} is outside the allowed range")]
    InvalidRating(u8),

    /// An action arrived while no item is on display
    #[error("No item is currently displayed")]
    NotDisplaying,
}

pub type Result<T> = std::result::Result<T, ControllerError>;
