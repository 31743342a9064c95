//! Wire types for the recommender API.

use serde::{Deserialize, Serialize};

/// Type alias for item (statement or question) identifiers
pub type ItemId = String;

/// Type alias for profile identifiers
pub type ProfileId = String;

/// Acknowledgement returned by the submit endpoint.
///
/// Only its arrival matters; the content is not interpreted.
pub type Ack = serde_json::Value;

/// Lowest value on the rating scale
pub const MIN_RATING: u8 = 1;

/// Highest value on the rating scale
pub const MAX_RATING: u8 = 5;

/// Reaction value sent when the user skips an item
pub const SKIP_SENTINEL: i32 = -1;

/// A statement or question the profile has not reacted to yet.
///
/// The server names the text field after the item kind, so `statement`,
/// `question` and `text` are all accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id", alias = "id")]
    pub id: ItemId,
    #[serde(alias = "statement", alias = "question")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A reaction on the ordinal scale, or a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i32")]
pub enum ReactionValue {
    Rating(u8),
    Skip,
}

impl ReactionValue {
    /// Build a rating, rejecting values outside `MIN_RATING..=MAX_RATING`.
    pub fn rating(value: u8) -> Option<Self> {
        (MIN_RATING..=MAX_RATING)
            .contains(&value)
            .then_some(ReactionValue::Rating(value))
    }
}

impl From<ReactionValue> for i32 {
    fn from(value: ReactionValue) -> Self {
        match value {
            ReactionValue::Rating(r) => i32::from(r),
            ReactionValue::Skip => SKIP_SENTINEL,
        }
    }
}

/// Body of a submit request.
///
/// Serializes to `{profile, statement, reaction}` or `{profile, question, answer}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Submission {
    Reaction {
        profile: ProfileId,
        statement: ItemId,
        reaction: ReactionValue,
    },
    Answer {
        profile: ProfileId,
        question: ItemId,
        answer: String,
    },
}

impl Submission {
    pub fn reaction(
        profile: impl Into<ProfileId>,
        statement: impl Into<ItemId>,
        reaction: ReactionValue,
    ) -> Self {
        Submission::Reaction {
            profile: profile.into(),
            statement: statement.into(),
            reaction,
        }
    }

    pub fn answer(
        profile: impl Into<ProfileId>,
        question: impl Into<ItemId>,
        answer: impl Into<String>,
    ) -> Self {
        Submission::Answer {
            profile: profile.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The item this submission refers to
    pub fn item_id(&self) -> &str {
        match self {
            Submission::Reaction { statement, .. } => statement,
            Submission::Answer { question, .. } => question,
        }
    }
}

/// Another profile and its similarity to ours, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub external_id: String,
    pub name: String,
    pub similarity: f64,
}

/// Sort direction for the matches endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i8")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl From<SortOrder> for i8 {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Query parameters accepted by the matches endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchQuery {
    #[serde(rename = "sort_similarity", skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
