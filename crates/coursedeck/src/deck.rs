//! Deck model: the immutable slide definitions supplied by the host.
//!
//! Parameters arrive as camelCase JSON (the host runtime's authoring format)
//! and are deserialized with serde. Definitions are never mutated after
//! construction; the one exception is the synthetic summary slide the
//! registry may append at setup time.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Top-level parameters handed over by the host runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckParameters {
    pub presentation: PresentationParams,

    /// Host-level behaviour overrides.
    #[serde(default, rename = "override")]
    pub overrides: OverrideParams,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationParams {
    pub slides: Vec<SlideDefinition>,

    /// Deck-wide background, used when a slide declares none.
    #[serde(default)]
    pub global_background: Option<SlideBackground>,

    /// Whether the keyword side menu is available at all.
    #[serde(default = "default_true")]
    pub keyword_list_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideParams {
    /// Never append the synthetic summary slide, even for task-bearing decks.
    #[serde(default)]
    pub hide_summary_slide: bool,

    /// Suppress the per-slide task markers on the progress bar.
    #[serde(default)]
    pub hide_task_markers: bool,
}

/// One page of the presentation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDefinition {
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,

    /// Side-menu index entries. Slides without keywords are skipped in the
    /// menu (outside authoring mode).
    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,

    #[serde(default)]
    pub background: Option<SlideBackground>,

    /// Aspect-ratio tag, e.g. "16:9". Purely advisory for the host renderer.
    #[serde(default)]
    pub aspect: Option<String>,
}

impl SlideDefinition {
    /// Title shown in the keyword menu, if the slide has one.
    pub fn main_keyword(&self) -> Option<&str> {
        self.keywords.first().map(|k| k.main.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordEntry {
    pub main: String,

    #[serde(default)]
    pub subs: Vec<String>,
}

/// A positioned content unit on a slide.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Position and size as percentages of the slide canvas.
    #[serde(flatten)]
    pub placement: Placement,

    /// Opaque content-type descriptor resolved by the host factory.
    pub action: ContentDescriptor,

    /// Render collapsed to a button that expands on activation.
    #[serde(default)]
    pub display_as_button: bool,

    /// Solution/comment text revealed in solution mode.
    #[serde(default)]
    pub solution: Option<String>,

    /// Show the comment permanently instead of only in solution mode.
    #[serde(default)]
    pub always_display_comments: bool,
}

/// Percent-based placement on the slide canvas.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        }
    }
}

/// Opaque content-type reference: a type tag plus type-specific parameters.
/// The engine never interprets `params`; only the host factory does.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub library: String,

    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideBackground {
    #[serde(default)]
    pub fill: Option<String>,

    #[serde(default)]
    pub image: Option<String>,
}

impl DeckParameters {
    /// Parse host-supplied JSON parameters.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let params: DeckParameters =
            serde_json::from_str(json).map_err(|e| Error::InvalidSlide {
                index: 0,
                reason: format!("malformed deck parameters: {e}"),
            })?;
        params.validate()?;
        Ok(params)
    }

    /// Construction-time validation. An empty deck is a fatal configuration
    /// error; there is no partial render.
    pub fn validate(&self) -> Result<(), Error> {
        if self.presentation.slides.is_empty() {
            return Err(Error::EmptyDeck);
        }
        for (index, slide) in self.presentation.slides.iter().enumerate() {
            for element in &slide.elements {
                if element.action.library.is_empty() {
                    return Err(Error::InvalidSlide {
                        index,
                        reason: "element with empty content-type tag".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
