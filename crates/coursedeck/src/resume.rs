//! The persisted resume snapshot.
//!
//! Layout is stable across sessions: `answers[slideIndex][elementOrdinal]`
//! where the ordinal follows element definition order, the same order the
//! attachment service uses. Slides whose elements expose no state getter
//! hold `None` at their ordinal so later elements keep their position.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    /// Slide index to resume on.
    pub progress: usize,

    /// Per-slide answered flag at save time.
    #[serde(default)]
    pub answered: Vec<bool>,

    /// Per-slide, per-element serialized sub-state.
    #[serde(default)]
    pub answers: Vec<Vec<Option<Value>>>,
}

impl SavedState {
    /// Look up the resume fragment for one element.
    pub fn fragment(&self, slide_index: usize, ordinal: usize) -> Option<&Value> {
        self.answers
            .get(slide_index)?
            .get(ordinal)?
            .as_ref()
    }

    pub fn was_answered(&self, slide_index: usize) -> bool {
        self.answered.get(slide_index).copied().unwrap_or(false)
    }
}
