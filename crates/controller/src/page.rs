//! # Page Controller
//!
//! Drives the fetch/display/submit cycle:
//! 1. Acquire a token
//! 2. Fetch the next unreacted item
//! 3. Display it and wait for the user
//! 4. Acquire a token
//! 5. Submit the reaction or answer
//! 6. Go back to step 1
//!
//! Every network stage is awaited in sequence and any failure is returned
//! to the caller, who hands it to [`PageController::report_error`].

use tracing::{debug, error, info, warn};

use oauth_client::TokenSource;
use recommender_client::{Item, MatchResult, ReactionValue, RecommenderApi, Submission};

use crate::error::{ControllerError, Result};
use crate::flow::{ControllerConfig, FlowKind, NEUTRAL_RATING};
use crate::render::{self, RenderInstruction};

/// Where the controller is in the cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing requested yet, or the last fetch failed
    Idle,
    AwaitingItem,
    Displaying(Item),
    Submitting(Item),
    /// The server has no more items for this profile
    Exhausted,
}

/// A user gesture on the displayed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Send the current slider value or selected option
    Submit,
    /// Send the skip sentinel, ignoring the slider
    Skip,
}

/// Owns the clients and the page state for one profile.
pub struct PageController<T, A> {
    config: ControllerConfig,
    tokens: T,
    api: A,
    state: ControllerState,
    rating: u8,
    selected: Option<String>,
}

impl<T: TokenSource, A: RecommenderApi> PageController<T, A> {
    pub fn new(config: ControllerConfig, tokens: T, api: A) -> Self {
        Self {
            config,
            tokens,
            api,
            state: ControllerState::Idle,
            rating: NEUTRAL_RATING,
            selected: None,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// The item on display, if any
    pub fn displayed_item(&self) -> Option<&Item> {
        match &self.state {
            ControllerState::Displaying(item) => Some(item),
            _ => None,
        }
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Page load: fetch the first item if the profile has been pushed.
    ///
    /// A profile that was never pushed has nothing pending, so no request
    /// is made and the controller stays idle.
    pub async fn start(&mut self) -> Result<Vec<RenderInstruction>> {
        if !self.config.pushed {
            info!("Profile {} has not been pushed, nothing to fetch", self.config.profile);
            return Ok(Vec::new());
        }

        let mut plan = Vec::new();
        if self.config.show_matches {
            plan.extend(self.sidebar().await);
        }
        plan.extend(self.load_next().await?);
        Ok(plan)
    }

    /// Fetch the next item and display it.
    pub async fn load_next(&mut self) -> Result<Vec<RenderInstruction>> {
        self.state = ControllerState::AwaitingItem;

        let fetched = match self.fetch_next().await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.state = ControllerState::Idle;
                return Err(e);
            }
        };

        match fetched {
            Some(item) => {
                info!("Displaying item {}", item.id);
                self.rating = NEUTRAL_RATING;
                self.selected = None;
                let plan = render::render_item(&item, self.config.flow, NEUTRAL_RATING);
                self.state = ControllerState::Displaying(item);
                Ok(plan)
            }
            None => {
                info!("No items left for profile {}", self.config.profile);
                self.state = ControllerState::Exhausted;
                Ok(render::render_exhausted())
            }
        }
    }

    /// Move the rating slider.
    pub fn set_rating(&mut self, value: u8) -> Result<()> {
        ReactionValue::rating(value).ok_or(ControllerError::InvalidRating(value))?;
        debug!("Slider moved to {}", value);
        self.rating = value;
        Ok(())
    }

    /// Select one of the displayed item's options.
    pub fn select_option(&mut self, option: impl Into<String>) -> Result<()> {
        let option = option.into();
        let item = self.displayed_item().ok_or(ControllerError::NotDisplaying)?;
        if !item.options.contains(&option) {
            return Err(ControllerError::Validation(format!(
                "'{}' is not one of the options.",
                option
            )));
        }
        debug!("Selected option {:?}", option);
        self.selected = Some(option);
        Ok(())
    }

    /// Handle a user action on the displayed item.
    ///
    /// On success the next item has already been fetched and the returned
    /// plan displays it. A validation failure sends nothing and leaves the
    /// item on display; so does a failed submission.
    pub async fn handle(&mut self, action: UserAction) -> Result<Vec<RenderInstruction>> {
        let item = self
            .displayed_item()
            .cloned()
            .ok_or(ControllerError::NotDisplaying)?;

        let submission = self.build_submission(&item, action)?;

        self.state = ControllerState::Submitting(item.clone());
        if let Err(e) = self.send(&submission).await {
            self.state = ControllerState::Displaying(item);
            return Err(e);
        }

        let mut plan = Vec::new();
        if self.config.show_matches {
            plan.extend(self.sidebar().await);
        }
        plan.extend(self.load_next().await?);
        Ok(plan)
    }

    /// Fetch the matches sidebar.
    pub async fn refresh_matches(&self) -> Result<Vec<RenderInstruction>> {
        let matches = self.fetch_matches().await?;
        Ok(render::render_matches(&matches))
    }

    /// The sidebar, or an error notice in its place. The item fetch goes
    /// ahead either way.
    async fn sidebar(&self) -> Vec<RenderInstruction> {
        match self.refresh_matches().await {
            Ok(plan) => plan,
            Err(e) => self.report_error(&e),
        }
    }

    /// The single place failures are turned into log lines and display changes.
    pub fn report_error(&self, err: &ControllerError) -> Vec<RenderInstruction> {
        match err {
            ControllerError::Validation(message) => warn!("Rejected input: {}", message),
            other => error!("Cycle for profile {} failed: {}", self.config.profile, other),
        }
        render::render_error(err)
    }

    fn build_submission(&self, item: &Item, action: UserAction) -> Result<Submission> {
        let profile = self.config.profile.clone();
        let item_id = item.id.clone();

        match (self.config.flow, action) {
            (FlowKind::Reaction, UserAction::Submit) => Ok(Submission::reaction(
                profile,
                item_id,
                ReactionValue::Rating(self.rating),
            )),
            (FlowKind::Reaction, UserAction::Skip) => {
                Ok(Submission::reaction(profile, item_id, ReactionValue::Skip))
            }
            (FlowKind::Answer, UserAction::Submit) => {
                let answer = self.selected.clone().ok_or_else(|| {
                    ControllerError::Validation("Please select an answer before saving.".into())
                })?;
                Ok(Submission::answer(profile, item_id, answer))
            }
            (FlowKind::Answer, UserAction::Skip) => Err(ControllerError::Validation(
                "Questions cannot be skipped.".into(),
            )),
        }
    }

    async fn fetch_next(&self) -> Result<Option<Item>> {
        let token = self.tokens.fetch_token().await?;
        Ok(self.api.fetch_next_item(&token).await?)
    }

    async fn send(&self, submission: &Submission) -> Result<()> {
        let token = self.tokens.fetch_token().await?;
        let ack = self.api.submit(&token, submission).await?;
        debug!("Submission for {} acknowledged: {}", submission.item_id(), ack);
        Ok(())
    }

    async fn fetch_matches(&self) -> Result<Vec<MatchResult>> {
        let token = self.tokens.fetch_token().await?;
        Ok(self.api.fetch_matches(&token, &self.config.match_query).await?)
    }
}
