//! Content-element contract between the engine and the host runtime.
//!
//! Elements are opaque: the engine never knows whether it is holding a video
//! player, a quiz or a plain text block. What a given element can do is
//! expressed through optional facets. Absence of a facet is a valid, common
//! case and never an error — facets are probed exactly once at attachment
//! time and the result cached as a [`Capabilities`] set, so hot paths never
//! re-query.

use crate::copyright::CopyrightInfo;
use crate::deck::{ContentDescriptor, Placement};
use crate::xapi::XapiData;

/// A live, host-constructed content element.
///
/// All facet accessors default to `None`; implement only the ones the
/// content type actually supports.
pub trait ContentElement {
    /// The content-type tag this instance was built from.
    fn type_name(&self) -> &str;

    /// Called once when the element is mounted at its slide position.
    fn attach(&mut self, _placement: &Placement) {}

    /// Called when the presentation surface changes size so the element can
    /// re-layout.
    fn resize(&mut self) {}

    /// Human-readable title for reporting, if the element has one.
    fn title(&self) -> Option<String> {
        None
    }

    /// Carries a score. Presence makes the element count toward the deck
    /// total.
    fn as_scoreable(&self) -> Option<&dyn Scoreable> {
        None
    }

    /// Can report whether the user has given an answer. Presence classifies
    /// the element as a task.
    fn as_task(&self) -> Option<&dyn AnswerableTask> {
        None
    }

    /// Can serialize per-element state for the resume snapshot.
    fn as_resumable(&self) -> Option<&dyn Resumable> {
        None
    }

    /// Can be reset to its pristine state.
    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        None
    }

    /// Can reveal its correct answers.
    fn as_solvable(&mut self) -> Option<&mut dyn Solvable> {
        None
    }

    /// Exposes media attribution.
    fn as_copyrightable(&self) -> Option<&dyn Copyrightable> {
        None
    }

    /// Whether the element contributes exportable answer text.
    fn exports_answers(&self) -> bool {
        false
    }

    /// Per-task xAPI record for `getXAPIData`-style reporting.
    fn xapi_data(&self) -> Option<XapiData> {
        None
    }
}

pub trait Scoreable {
    fn score(&self) -> i32;
    fn max_score(&self) -> i32;
}

pub trait AnswerableTask {
    fn answer_given(&self) -> bool;
}

pub trait Resumable {
    fn current_state(&self) -> serde_json::Value;
}

pub trait Resettable {
    fn reset_task(&mut self);
}

pub trait Solvable {
    fn show_solutions(&mut self);
}

pub trait Copyrightable {
    fn copyrights(&self) -> CopyrightInfo;
}

/// Attachment-time classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Answerable and/or scoreable.
    Task,
    /// Carries only solution/comment text.
    CommentOnly,
    /// Everything else: passive content.
    Decoration,
}

/// Cached facet set, probed once per instance at attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub scoreable: bool,
    pub task: bool,
    pub resumable: bool,
    pub resettable: bool,
    pub solvable: bool,
    pub copyrightable: bool,
    pub exports_answers: bool,
}

impl Capabilities {
    pub fn probe(element: &mut dyn ContentElement) -> Self {
        Self {
            scoreable: element.as_scoreable().is_some(),
            task: element.as_task().is_some(),
            resumable: element.as_resumable().is_some(),
            resettable: element.as_resettable().is_some(),
            solvable: element.as_solvable().is_some(),
            copyrightable: element.as_copyrightable().is_some(),
            exports_answers: element.exports_answers(),
        }
    }
}

/// Host-provided element constructor.
///
/// The factory owns the mapping from content-type tags to concrete widget
/// implementations. Construction failures are treated as defects in the
/// content package and propagate uncaught through the attachment service.
pub trait ElementFactory {
    /// Build a live instance. `resume` is the per-element fragment from a
    /// previous session, looked up by `(slideIndex, elementOrdinal)`.
    fn create(
        &self,
        descriptor: &ContentDescriptor,
        content_id: &str,
        resume: Option<&serde_json::Value>,
    ) -> anyhow::Result<Box<dyn ContentElement>>;

    /// Whether a descriptor denotes a task type, judged *before*
    /// instantiation. Used for summary-slide gating and progress-bar task
    /// markers on slides that have not been attached yet.
    fn descriptor_is_task(&self, descriptor: &ContentDescriptor) -> bool;

    /// Whether a descriptor's type contributes exportable answer text.
    fn descriptor_exports_answers(&self, _descriptor: &ContentDescriptor) -> bool {
        false
    }
}
