//! Segmented navigation/progress bar model.
//!
//! One segment per slide (including the synthetic summary slide). Each
//! segment carries three independently computed visual states: visited fill
//! (index ≤ current), a task-presence marker, and an answered state. The
//! host renders from this model and feeds clicks/keys back through the
//! engine; no visual toggling happens ad hoc.

use std::time::Duration;

/// Decks larger than this don't get per-slide task markers; a marker-heavy
/// bar on huge decks reads as noise. Legacy cutoff, overridable via
/// [`ProgressIndicator::with_task_marker_limit`].
pub const TASK_MARKER_MAX_SLIDES: usize = 60;

/// Total duration of the staggered fill animation between two slides.
pub const FILL_ANIMATION_TOTAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsweredState {
    /// Slide has no task elements.
    NoInteractions,
    NotAnswered,
    Answered,
    /// Only set while in solution mode.
    AllCorrect,
    /// Only set while in solution mode.
    HasIncorrect,
}

#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub has_task_marker: bool,
    pub answered: AnsweredState,
}

/// One step of the staggered fill animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStep {
    pub index: usize,
    pub delay: Duration,
    /// True to fill the segment, false to un-fill (backward jump).
    pub fill: bool,
}

/// Segments inside the jump range animate with these steps; everything
/// outside the range snaps instantly.
#[derive(Debug, Clone, Default)]
pub struct TransitionPlan {
    pub steps: Vec<SegmentStep>,
}

pub struct ProgressIndicator {
    segments: Vec<Segment>,
    has_task: Vec<bool>,
    current: usize,
    focused: usize,
}

impl ProgressIndicator {
    pub fn new(task_slides: &[bool]) -> Self {
        Self::with_task_marker_limit(task_slides, TASK_MARKER_MAX_SLIDES)
    }

    pub fn with_task_marker_limit(task_slides: &[bool], limit: usize) -> Self {
        let show_markers = task_slides.len() <= limit;
        let segments = task_slides
            .iter()
            .map(|&has_task| Segment {
                has_task_marker: has_task && show_markers,
                answered: initial_answered(has_task),
            })
            .collect();
        Self {
            segments,
            has_task: task_slides.to_vec(),
            current: 0,
            focused: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, index: usize) -> &Segment {
        &self.segments[index]
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Visited fill: monotone up to the current index, un-filled beyond it
    /// after a backward jump.
    pub fn is_filled(&self, index: usize) -> bool {
        index <= self.current
    }

    /// Move the current marker and compute the staggered animation for the
    /// segments between the old and new position. The focus follows the
    /// current segment (roving tabindex, single tab stop).
    pub fn set_current(&mut self, index: usize) -> TransitionPlan {
        let from = self.current;
        self.current = index;
        self.focused = index;
        Self::plan(from, index)
    }

    fn plan(from: usize, to: usize) -> TransitionPlan {
        let mut steps = Vec::new();
        if from < to {
            let count = to - from;
            let stagger = FILL_ANIMATION_TOTAL / count as u32;
            for (k, index) in (from + 1..=to).enumerate() {
                steps.push(SegmentStep {
                    index,
                    delay: stagger * k as u32,
                    fill: true,
                });
            }
        } else if to < from {
            let count = from - to;
            let stagger = FILL_ANIMATION_TOTAL / count as u32;
            for (k, index) in (to + 1..=from).rev().enumerate() {
                steps.push(SegmentStep {
                    index,
                    delay: stagger * k as u32,
                    fill: false,
                });
            }
        }
        TransitionPlan { steps }
    }

    pub fn set_answered(&mut self, index: usize, state: AnsweredState) {
        if let Some(segment) = self.segments.get_mut(index) {
            segment.answered = state;
        }
    }

    pub fn answered(&self, index: usize) -> AnsweredState {
        self.segments[index].answered
    }

    /// Drop all answered/correctness marks back to their initial state, as
    /// on a load with no previous-slide context.
    pub fn clear_answered(&mut self) {
        for (segment, &has_task) in self.segments.iter_mut().zip(&self.has_task) {
            segment.answered = initial_answered(has_task);
        }
    }

    /// Back to initial: nothing visited, nothing answered.
    pub fn reset(&mut self) {
        self.current = 0;
        self.focused = 0;
        self.clear_answered();
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Keyboard traversal. Boundary segments refuse to advance past
    /// themselves.
    pub fn focus_next(&mut self) -> bool {
        if self.focused + 1 >= self.segments.len() {
            return false;
        }
        self.focused += 1;
        true
    }

    pub fn focus_prev(&mut self) -> bool {
        if self.focused == 0 {
            return false;
        }
        self.focused -= 1;
        true
    }
}

fn initial_answered(has_task: bool) -> AnsweredState {
    if has_task {
        AnsweredState::NotAnswered
    } else {
        AnsweredState::NoInteractions
    }
}
