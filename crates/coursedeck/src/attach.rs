//! Lazy element attachment.
//!
//! Attachment instantiates and mounts a slide's elements exactly once.
//! Idempotency is load-bearing: re-attaching would duplicate mounted widgets
//! and double-register their listeners, so a second call for the same slide
//! is a no-op. A factory failure propagates uncaught — a malformed content
//! parameter is a configuration defect for the host to surface, not a
//! runtime condition to recover from.

use tracing::debug;

use crate::element::{Capabilities, ElementFactory, ElementKind};
use crate::error::Error;
use crate::registry::{ElementEntry, SlideRegistry};
use crate::resume::SavedState;

pub struct AttachmentService {
    factory: Box<dyn ElementFactory>,
    content_id: String,
    resume: Option<SavedState>,
}

impl AttachmentService {
    pub fn new(
        factory: Box<dyn ElementFactory>,
        content_id: String,
        resume: Option<SavedState>,
    ) -> Self {
        Self {
            factory,
            content_id,
            resume,
        }
    }

    pub fn factory(&self) -> &dyn ElementFactory {
        self.factory.as_ref()
    }

    /// Mount a slide's elements. Returns `Ok(true)` if work was done,
    /// `Ok(false)` if the slide was already attached.
    pub fn attach(&self, registry: &mut SlideRegistry, slide_index: usize) -> Result<bool, Error> {
        if slide_index >= registry.count() || registry.runtime(slide_index).attached {
            return Ok(false);
        }

        let definitions = registry.slide(slide_index).elements.clone();

        // Construct in definition order. A failure aborts the remaining
        // elements on this slide and leaves `attached` false; already
        // mounted elements stay in place.
        for (ordinal, definition) in definitions.iter().enumerate() {
            let fragment = self
                .resume
                .as_ref()
                .and_then(|s| s.fragment(slide_index, ordinal));

            let mut instance = self
                .factory
                .create(&definition.action, &self.content_id, fragment)
                .map_err(|source| Error::ElementConstruction {
                    slide_index,
                    ordinal,
                    source,
                })?;

            let caps = Capabilities::probe(instance.as_mut());
            let is_task = caps.task || self.factory.descriptor_is_task(&definition.action);
            let kind = if is_task {
                ElementKind::Task
            } else if definition.solution.is_some() {
                ElementKind::CommentOnly
            } else {
                ElementKind::Decoration
            };

            instance.attach(&definition.placement);

            let runtime = registry.runtime_mut(slide_index);
            if kind == ElementKind::Task {
                runtime.tasks.push(ordinal);
            }
            runtime.elements.push(ElementEntry {
                instance,
                caps,
                kind,
            });
        }

        let runtime = registry.runtime_mut(slide_index);
        runtime.attached = true;
        debug!(
            slide_index,
            elements = runtime.elements.len(),
            tasks = runtime.tasks.len(),
            "slide attached"
        );
        Ok(true)
    }

    /// The resume snapshot the presentation was constructed with, if any.
    pub fn resume_state(&self) -> Option<&SavedState> {
        self.resume.as_ref()
    }
}
