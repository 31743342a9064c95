//! # OAuth Client Crate
//!
//! Obtains access tokens with the OAuth2 client-credentials grant.
//!
//! ## Main Components
//!
//! - **token**: `Credentials` and the `Token` they are exchanged for
//! - **provider**: `TokenProvider` and the `TokenSource` trait
//! - **error**: Error types for token acquisition
//!
//! ## Example Usage
//!
//! ```ignore
//! use oauth_client::{Credentials, TokenProvider};
//!
//! let credentials = Credentials::new(
//!     "client-id",
//!     "client-secret",
//!     "http://localhost:5000/oauth/token",
//! );
//! let provider = TokenProvider::new(credentials)?;
//!
//! let token = provider.fetch_token().await?;
//! println!("Authorization: {}", token.authorization());
//! ```

pub mod error;
pub mod provider;
pub mod token;

pub use error::{OAuthError, Result};
pub use provider::{TokenProvider, TokenSource};
pub use token::{Credentials, DEFAULT_GRANT_TYPE, Token};
