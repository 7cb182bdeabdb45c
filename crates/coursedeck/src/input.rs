//! Keyboard and touch-swipe input adapters.
//!
//! Both adapters only *decide*; they translate raw input into navigation
//! commands for the engine. The keyboard guard is time-bounded rather than
//! state-bounded: key-repeat arrives faster than transition animations
//! resolve, and a stuck boolean would desynchronize the bar from the index.

use std::time::{Duration, Instant};

/// Key-repeat guard window.
pub const KEY_DEBOUNCE: Duration = Duration::from_millis(300);

/// Floor for the swipe threshold on very narrow surfaces.
pub const MIN_SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
    First,
    Last,
}

/// Debounced keyboard adapter.
pub struct KeyboardAdapter {
    last_accepted: Option<Instant>,
    debounce: Duration,
}

impl Default for KeyboardAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardAdapter {
    pub fn new() -> Self {
        Self {
            last_accepted: None,
            debounce: KEY_DEBOUNCE,
        }
    }

    /// Whether a key press at `now` should be forwarded to the engine.
    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now.duration_since(last) < self.debounce {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: advance.
    Left,
    /// Finger moved right: go back.
    Right,
}

/// Tracks one touch gesture and decides whether it was a horizontal swipe.
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
    threshold: f32,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self {
            start: None,
            threshold: MIN_SWIPE_THRESHOLD,
        }
    }

    /// Derive the threshold from the current render width: a tenth of the
    /// surface, floored so narrow phones don't navigate on taps.
    pub fn set_render_width(&mut self, width: f32) {
        self.threshold = (width / 10.0).max(MIN_SWIPE_THRESHOLD);
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// End the gesture. Returns a direction only when the horizontal travel
    /// beats the threshold and dominates the vertical travel.
    pub fn end(&mut self, x: f32, y: f32) -> Option<SwipeDirection> {
        let (start_x, start_y) = self.start.take()?;
        let dx = x - start_x;
        let dy = y - start_y;
        if dx.abs() < self.threshold || dx.abs() <= dy.abs() {
            return None;
        }
        if dx < 0.0 {
            Some(SwipeDirection::Left)
        } else {
            Some(SwipeDirection::Right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_window() {
        let mut keys = KeyboardAdapter::new();
        let t0 = Instant::now();
        assert!(keys.accept(t0));
        assert!(!keys.accept(t0 + Duration::from_millis(100)));
        assert!(!keys.accept(t0 + Duration::from_millis(299)));
        assert!(keys.accept(t0 + Duration::from_millis(300)));
        assert!(!keys.accept(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn test_swipe_threshold_from_width() {
        let mut swipe = SwipeTracker::new();
        swipe.set_render_width(1200.0);
        assert_eq!(swipe.threshold(), 120.0);
        swipe.set_render_width(300.0);
        assert_eq!(swipe.threshold(), MIN_SWIPE_THRESHOLD);
    }

    #[test]
    fn test_horizontal_swipe_decision() {
        let mut swipe = SwipeTracker::new();
        swipe.set_render_width(1000.0);
        swipe.begin(500.0, 300.0);
        assert_eq!(swipe.end(380.0, 310.0), Some(SwipeDirection::Left));

        swipe.begin(500.0, 300.0);
        assert_eq!(swipe.end(650.0, 280.0), Some(SwipeDirection::Right));
    }

    #[test]
    fn test_short_or_vertical_gestures_ignored() {
        let mut swipe = SwipeTracker::new();
        swipe.set_render_width(1000.0);
        swipe.begin(500.0, 300.0);
        assert_eq!(swipe.end(440.0, 305.0), None);

        // Long but mostly vertical: a scroll, not a swipe.
        swipe.begin(500.0, 300.0);
        assert_eq!(swipe.end(350.0, 600.0), None);

        // No begin recorded.
        assert_eq!(swipe.end(0.0, 0.0), None);
    }
}
