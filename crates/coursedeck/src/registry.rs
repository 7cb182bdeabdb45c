//! Slide registry: immutable definitions plus per-slide runtime state.

use tracing::debug;

use crate::deck::SlideDefinition;
use crate::element::{Capabilities, ContentElement, ElementFactory, ElementKind};
use crate::error::Error;

/// A mounted element together with its cached capability set and bucket.
pub struct ElementEntry {
    pub instance: Box<dyn ContentElement>,
    pub caps: Capabilities,
    pub kind: ElementKind,
}

/// Mutable runtime state, index-aligned with the definition list.
///
/// `attached` transitions false → true exactly once and is never reset;
/// element instances live until the whole presentation is torn down.
#[derive(Default)]
pub struct SlideRuntimeState {
    pub attached: bool,
    pub elements: Vec<ElementEntry>,

    /// Ordinals (into `elements`) of the entries classified as tasks.
    /// Fixed at attachment time.
    pub tasks: Vec<usize>,
}

impl SlideRuntimeState {
    /// Whether any task on this slide has been answered. Slides that are not
    /// attached yet (or have no tasks) report false.
    pub fn answered(&self) -> bool {
        self.tasks.iter().any(|&ordinal| {
            self.elements[ordinal]
                .instance
                .as_task()
                .is_some_and(|t| t.answer_given())
        })
    }
}

pub struct SlideRegistry {
    slides: Vec<SlideDefinition>,
    runtime: Vec<SlideRuntimeState>,
    summary_index: Option<usize>,
}

impl SlideRegistry {
    /// Construction validates that the deck is non-empty.
    pub fn new(slides: Vec<SlideDefinition>) -> Result<Self, Error> {
        if slides.is_empty() {
            return Err(Error::EmptyDeck);
        }
        let runtime = slides.iter().map(|_| SlideRuntimeState::default()).collect();
        Ok(Self {
            slides,
            runtime,
            summary_index: None,
        })
    }

    pub fn count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> &SlideDefinition {
        &self.slides[index]
    }

    pub fn runtime(&self, index: usize) -> &SlideRuntimeState {
        &self.runtime[index]
    }

    pub fn runtime_mut(&mut self, index: usize) -> &mut SlideRuntimeState {
        &mut self.runtime[index]
    }

    pub fn runtimes_mut(&mut self) -> impl Iterator<Item = &mut SlideRuntimeState> {
        self.runtime.iter_mut()
    }

    pub fn summary_index(&self) -> Option<usize> {
        self.summary_index
    }

    pub fn is_summary(&self, index: usize) -> bool {
        self.summary_index == Some(index)
    }

    /// Whether a slide's *definitions* contain at least one task type.
    /// Judged via the factory so unattached slides can be classified.
    pub fn slide_has_task_definition(&self, index: usize, factory: &dyn ElementFactory) -> bool {
        self.slides[index]
            .elements
            .iter()
            .any(|e| factory.descriptor_is_task(&e.action))
    }

    /// Append the synthetic summary slide. At most one mutation of the
    /// definition list, gated on: scoring enabled, no host override, and the
    /// deck actually having something to summarize (a task anywhere, or any
    /// element exporting answer text).
    pub fn maybe_append_summary(
        &mut self,
        scoring_enabled: bool,
        hide_summary_slide: bool,
        factory: &dyn ElementFactory,
    ) -> bool {
        if self.summary_index.is_some() || !scoring_enabled || hide_summary_slide {
            return false;
        }
        let has_tasks = (0..self.count()).any(|i| self.slide_has_task_definition(i, factory));
        let has_exports = self.slides.iter().any(|s| {
            s.elements
                .iter()
                .any(|e| factory.descriptor_exports_answers(&e.action))
        });
        if !has_tasks && !has_exports {
            return false;
        }

        debug!(index = self.slides.len(), "appending summary slide");
        self.slides.push(SlideDefinition::default());
        self.runtime.push(SlideRuntimeState::default());
        self.summary_index = Some(self.slides.len() - 1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{ContentDescriptor, ElementDefinition, Placement};

    struct ProbeOnlyFactory;

    impl ElementFactory for ProbeOnlyFactory {
        fn create(
            &self,
            _descriptor: &ContentDescriptor,
            _content_id: &str,
            _resume: Option<&serde_json::Value>,
        ) -> anyhow::Result<Box<dyn ContentElement>> {
            anyhow::bail!("not used in these tests")
        }

        fn descriptor_is_task(&self, descriptor: &ContentDescriptor) -> bool {
            descriptor.library == "Quiz"
        }

        fn descriptor_exports_answers(&self, descriptor: &ContentDescriptor) -> bool {
            descriptor.library == "TextInput"
        }
    }

    fn slide_with(library: &str) -> SlideDefinition {
        SlideDefinition {
            elements: vec![ElementDefinition {
                placement: Placement::default(),
                action: ContentDescriptor {
                    library: library.to_string(),
                    params: serde_json::Value::Null,
                },
                display_as_button: false,
                solution: None,
                always_display_comments: false,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(matches!(SlideRegistry::new(vec![]), Err(Error::EmptyDeck)));
    }

    #[test]
    fn test_summary_appended_for_task_deck() {
        let mut registry =
            SlideRegistry::new(vec![slide_with("Text"), slide_with("Quiz")]).unwrap();
        assert!(registry.maybe_append_summary(true, false, &ProbeOnlyFactory));
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.summary_index(), Some(2));
        assert!(registry.is_summary(2));
        // One-time mutation: a second call is a no-op.
        assert!(!registry.maybe_append_summary(true, false, &ProbeOnlyFactory));
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn test_summary_skipped_without_tasks() {
        let mut registry = SlideRegistry::new(vec![slide_with("Text")]).unwrap();
        assert!(!registry.maybe_append_summary(true, false, &ProbeOnlyFactory));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.summary_index(), None);
    }

    #[test]
    fn test_summary_appended_for_exporting_deck() {
        let mut registry = SlideRegistry::new(vec![slide_with("TextInput")]).unwrap();
        assert!(registry.maybe_append_summary(true, false, &ProbeOnlyFactory));
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_summary_suppressed_by_gates() {
        let mut registry = SlideRegistry::new(vec![slide_with("Quiz")]).unwrap();
        assert!(!registry.maybe_append_summary(false, false, &ProbeOnlyFactory));
        assert!(!registry.maybe_append_summary(true, true, &ProbeOnlyFactory));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_task_definition_probe() {
        let registry =
            SlideRegistry::new(vec![slide_with("Text"), slide_with("Quiz")]).unwrap();
        assert!(!registry.slide_has_task_definition(0, &ProbeOnlyFactory));
        assert!(registry.slide_has_task_definition(1, &ProbeOnlyFactory));
    }
}
