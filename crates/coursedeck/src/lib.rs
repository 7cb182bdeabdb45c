//! Slide-deck presentation engine.
//!
//! A host runtime constructs a [`engine::PresentationEngine`] from declarative
//! deck parameters, a content id and optional resume state, and supplies the
//! actual interactive content elements through an [`element::ElementFactory`].
//! The engine owns the current-slide state machine, lazy element attachment,
//! per-slide answer tracking, score aggregation and the synthetic summary
//! slide. Rendering is left entirely to the host.

pub mod attach;
pub mod copyright;
pub mod deck;
pub mod element;
pub mod engine;
pub mod error;
pub mod input;
pub mod keyword_menu;
pub mod progress;
pub mod registry;
pub mod resume;
pub mod summary;
pub mod xapi;

pub use deck::{DeckParameters, ElementDefinition, Placement, SlideDefinition};
pub use element::{Capabilities, ContentElement, ElementFactory};
pub use engine::{ConfirmationDialog, EngineEvent, Extras, JumpOptions, PresentationEngine};
pub use error::Error;
pub use resume::SavedState;
