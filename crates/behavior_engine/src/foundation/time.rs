//! Frame timing utilities

use std::time::Instant;

/// High-precision timer for driving a frame loop
///
/// Reports time in milliseconds to match the units behavior ticks receive.
pub struct FrameTimer {
    start: Instant,
    last_frame: Instant,
    delta_ms: f64,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_ms = now.duration_since(self.last_frame).as_secs_f64() * 1000.0;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in milliseconds
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Get the total elapsed time since timer creation in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_has_zero_delta() {
        let timer = FrameTimer::new();
        assert_eq!(timer.delta_ms(), 0.0);
        assert_eq!(timer.frame_count(), 0);
    }

    #[test]
    fn test_update_advances_frame_count() {
        let mut timer = FrameTimer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_ms() >= 0.0);
    }
}
