//! Configuration of a reaction/answer flow.

use recommender_client::{MatchQuery, ProfileId};

/// Rating the slider returns to whenever a new item is shown
pub const NEUTRAL_RATING: u8 = 3;

/// What kind of input the user gives for each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Statements rated on the 1-5 scale, skippable
    Reaction,
    /// Multiple-choice questions, one option must be selected
    Answer,
}

/// Everything the controller needs to know about the page it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub profile: ProfileId,
    /// Whether the profile has been pushed to the recommender, i.e. items are pending
    pub pushed: bool,
    pub flow: FlowKind,
    /// Refresh the matches sidebar on start and after every submission
    pub show_matches: bool,
    pub match_query: MatchQuery,
}

impl ControllerConfig {
    pub fn new(profile: impl Into<ProfileId>, flow: FlowKind) -> Self {
        Self {
            profile: profile.into(),
            pushed: true,
            flow,
            show_matches: false,
            match_query: MatchQuery::default(),
        }
    }

    pub fn with_pushed(mut self, pushed: bool) -> Self {
        self.pushed = pushed;
        self
    }

    pub fn with_matches(mut self, query: MatchQuery) -> Self {
        self.show_matches = true;
        self.match_query = query;
        self
    }
}
