//! xAPI-shaped reporting records.
//!
//! The engine does not speak to an LRS itself; it produces statement-shaped
//! JSON the host forwards, and it consumes verb signals from task elements
//! to keep the progress indicator's answered markers current.

use serde_json::{Value, json};

/// The verbs the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XapiVerb {
    Attempted,
    Interacted,
    Answered,
    Completed,
}

impl XapiVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attempted => "attempted",
            Self::Interacted => "interacted",
            Self::Answered => "answered",
            Self::Completed => "completed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "attempted" => Some(Self::Attempted),
            "interacted" => Some(Self::Interacted),
            "answered" => Some(Self::Answered),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Verbs that mark a task as having been worked on, triggering an
    /// answered-state recompute on the progress indicator.
    pub fn marks_activity(self) -> bool {
        matches!(self, Self::Attempted | Self::Interacted | Self::Answered)
    }
}

/// Statement-shaped record returned to the host: the deck-level statement
/// plus the flattened per-task sub-records.
#[derive(Debug, Clone)]
pub struct XapiData {
    pub statement: Value,
    pub children: Vec<XapiData>,
}

impl XapiData {
    pub fn new(statement: Value) -> Self {
        Self {
            statement,
            children: Vec::new(),
        }
    }

    /// Flatten this record and all descendants, depth-first.
    pub fn flatten(&self) -> Vec<&Value> {
        let mut out = vec![&self.statement];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

/// One-time completion signal emitted by the summary slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSignal {
    pub score: i32,
    pub max_score: i32,
}

/// Build a statement with a scored result. The scaled score maps 0/0 to 0
/// rather than NaN.
pub fn scored_statement(verb: XapiVerb, score: i32, max_score: i32) -> Value {
    json!({
        "verb": { "display": { "en-US": verb.as_str() } },
        "result": {
            "score": {
                "raw": score,
                "max": max_score,
                "scaled": scaled(score, max_score),
            }
        }
    })
}

fn scaled(score: i32, max_score: i32) -> f64 {
    if max_score == 0 {
        0.0
    } else {
        f64::from(score) / f64::from(max_score)
    }
}
