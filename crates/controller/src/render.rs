//! Pure rendering: items and matches in, instructions out.
//!
//! Nothing here touches a terminal or a network. Front ends apply the
//! returned instructions in order.

use recommender_client::{Item, MAX_RATING, MIN_RATING, MatchResult};

use crate::error::ControllerError;
use crate::flow::FlowKind;

/// One row of the matches sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub external_id: String,
    pub name: String,
    /// Similarity as a whole percentage, 0-100
    pub percent: u8,
}

/// A single display change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// Remove whatever item is currently shown
    ClearItem,
    ShowText { text: String },
    ResetSlider { min: u8, max: u8, value: u8 },
    ShowOptions { options: Vec<String> },
    ClearSelection,
    ShowMatches { rows: Vec<MatchRow> },
    /// The server has nothing left for this profile
    ShowExhausted,
    /// Blocking notice; the user must acknowledge it
    Alert { message: String },
    ShowError { message: String },
}

/// Instructions to display `item` with its input widget reset to `neutral`.
pub fn render_item(item: &Item, flow: FlowKind, neutral: u8) -> Vec<RenderInstruction> {
    let mut plan = vec![
        RenderInstruction::ClearItem,
        RenderInstruction::ShowText {
            text: item.text.clone(),
        },
    ];

    match flow {
        FlowKind::Reaction => plan.push(RenderInstruction::ResetSlider {
            min: MIN_RATING,
            max: MAX_RATING,
            value: neutral,
        }),
        FlowKind::Answer => {
            plan.push(RenderInstruction::ShowOptions {
                options: item.options.clone(),
            });
            plan.push(RenderInstruction::ClearSelection);
        }
    }

    plan
}

/// Instructions to replace the matches sidebar.
pub fn render_matches(matches: &[MatchResult]) -> Vec<RenderInstruction> {
    let rows = matches
        .iter()
        .map(|m| MatchRow {
            external_id: m.external_id.clone(),
            name: m.name.clone(),
            percent: (m.similarity.clamp(0.0, 1.0) * 100.0).round() as u8,
        })
        .collect();

    vec![RenderInstruction::ShowMatches { rows }]
}

pub fn render_exhausted() -> Vec<RenderInstruction> {
    vec![RenderInstruction::ClearItem, RenderInstruction::ShowExhausted]
}

/// Validation failures become alerts; everything else an error notice.
pub fn render_error(error: &ControllerError) -> Vec<RenderInstruction> {
    match error {
        ControllerError::Validation(message) => vec![RenderInstruction::Alert {
            message: message.clone(),
        }],
        other => vec![RenderInstruction::ShowError {
            message: other.to_string(),
        }],
    }
}
