//! Controller for the fetch/display/submit cycle.
//!
//! This crate provides:
//! - `PageController`, the state machine that sequences token, fetch and submit calls
//! - Pure render functions turning items and matches into `RenderInstruction`s
//! - `ControllerConfig` describing which flow a page runs
//!
//! ## Example Usage
//! ```ignore
//! use controller::{ControllerConfig, FlowKind, PageController, UserAction};
//!
//! let config = ControllerConfig::new(profile_id, FlowKind::Reaction);
//! let mut page = PageController::new(config, token_provider, recommender_client);
//!
//! let plan = page.start().await?;
//! page.set_rating(4)?;
//! let plan = page.handle(UserAction::Submit).await?;
//! ```

pub mod page;
pub mod error;
pub mod flow;
pub mod render;

// Re-export main types
pub use page::{ControllerState, PageController, UserAction};
pub use error::{ControllerError, Result};
pub use flow::{ControllerConfig, FlowKind, NEUTRAL_RATING};
pub use render::{MatchRow, RenderInstruction};
