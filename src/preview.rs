//! Hover-preview cycling over a capped frame window.
//!
//! **Why**: Hovering a sequence tile should hint at the motion without
//! spinning up the full loader. The cycler steps a pointer at ~24 steps per
//! second through the first `min(frame_count, 30)` members only, so a
//! thousand-frame sequence costs no more than a thirty-frame one.
//!
//! **Used by**: Preview widget (thumbnail flip-through on hover)

use std::time::{Duration, Instant};

/// Steps per second while cycling.
pub const PREVIEW_RATE: f64 = 24.0;

/// Upper bound on the cycled window.
pub const PREVIEW_WINDOW: usize = 30;

/// Low-frequency frame pointer for hover previews. Pure state machine; the
/// widget reads thumbnails for whatever index it reports.
#[derive(Debug, Clone, Default)]
pub struct PreviewCycler {
    pointer: usize,
    window: usize,
    running: bool,
    last_step: Option<Instant>,
}

impl PreviewCycler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin cycling over the first `min(frame_count, PREVIEW_WINDOW)`
    /// frames. Idempotent while already running.
    pub fn start(&mut self, frame_count: usize) {
        if self.running {
            return;
        }
        self.window = frame_count.min(PREVIEW_WINDOW);
        self.running = true;
        self.last_step = None;
    }

    /// Stop cycling and reset the pointer to the first frame.
    pub fn stop(&mut self) {
        self.running = false;
        self.pointer = 0;
        self.last_step = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current frame pointer within the window.
    pub fn current(&self) -> usize {
        self.pointer
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / PREVIEW_RATE)
    }

    /// Advance the pointer if a step is due. Same catch-up-skip rule as the
    /// main scheduler: a late tick moves one step and rebases.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running || self.window <= 1 {
            return false;
        }

        let Some(last) = self.last_step else {
            self.last_step = Some(now);
            return false;
        };

        if now.duration_since(last) < self.step_interval() {
            return false;
        }

        self.last_step = Some(now);
        self.pointer = (self.pointer + 1) % self.window;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_window_is_capped() {
        let mut cycler = PreviewCycler::new();
        cycler.start(2000);

        let t0 = Instant::now();
        cycler.tick(t0);
        let mut seen_max = 0;
        for i in 1..=100u64 {
            cycler.tick(t0 + ms(i * 42));
            seen_max = seen_max.max(cycler.current());
        }
        assert_eq!(seen_max, PREVIEW_WINDOW - 1);
    }

    #[test]
    fn test_wraps_within_short_window() {
        let mut cycler = PreviewCycler::new();
        cycler.start(4);

        let t0 = Instant::now();
        cycler.tick(t0);
        for i in 1..=4u64 {
            cycler.tick(t0 + ms(i * 42));
        }
        // 4 steps over a window of 4: back at the start.
        assert_eq!(cycler.current(), 0);
    }

    #[test]
    fn test_stop_resets_pointer() {
        let mut cycler = PreviewCycler::new();
        cycler.start(10);

        let t0 = Instant::now();
        cycler.tick(t0);
        cycler.tick(t0 + ms(42));
        assert_eq!(cycler.current(), 1);

        cycler.stop();
        assert_eq!(cycler.current(), 0);
        assert!(!cycler.is_running());
        assert!(!cycler.tick(t0 + ms(84)));
    }

    #[test]
    fn test_single_frame_never_cycles() {
        let mut cycler = PreviewCycler::new();
        cycler.start(1);
        let t0 = Instant::now();
        cycler.tick(t0);
        assert!(!cycler.tick(t0 + ms(1000)));
        assert_eq!(cycler.current(), 0);
    }
}
