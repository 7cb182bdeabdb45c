use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Configuration problems are fatal and reported at construction time; an
/// element factory failure during attachment is a defect in the content
/// package and is passed through unretried. Navigation refusals (out of
/// range, already animating) are *not* errors — those paths return `false`.
#[derive(Debug, Error)]
pub enum Error {
    /// The deck contained no slides.
    #[error("presentation has no slides")]
    EmptyDeck,

    /// A slide definition failed validation.
    #[error("invalid slide {index}: {reason}")]
    InvalidSlide { index: usize, reason: String },

    /// The host factory failed to construct a content element.
    #[error("failed to construct element {ordinal} on slide {slide_index}")]
    ElementConstruction {
        slide_index: usize,
        ordinal: usize,
        #[source]
        source: anyhow::Error,
    },
}
