//! Playback scheduling with wall-clock-accurate frame timing.
//!
//! **Why**: Playback speed must track the wall clock even when the host's
//! refresh callback arrives late. The clock is catch-up-skip: a late tick
//! advances at most one frame and rebases on the tick time, dropping missed
//! frames instead of queuing a backlog.
//!
//! **Used by**: Player widget (per-frame `tick`, transport controls)
//!
//! # Timing Model
//!
//! While playing, each tick compares elapsed time against `1/fps`. On
//! advance, the baseline resets to the tick time (not a fresh clock read) so
//! drift never accumulates across late ticks. Reaching the end either wraps
//! to frame 0 (loop) or pauses holding the last frame.
//!
//! The scheduler never touches frame data; it only moves the index. Whether
//! a frame is actually loaded is the renderer's problem.

use log::debug;
use std::time::{Duration, Instant};

/// Frame-rate bounds; `set_fps` clamps into this range.
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 120;

const DEFAULT_FPS: u32 = 24;

/// Transport state for one open player. Created on open, dropped on close;
/// nothing persists across sessions.
#[derive(Debug, Clone)]
pub struct Playback {
    frame_index: usize,
    frame_count: usize,
    playing: bool,
    looping: bool,
    fps: u32,
    /// Baseline for the next advance; None while paused or before the first
    /// tick after play starts.
    last_advance: Option<Instant>,
}

impl Playback {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_index: 0,
            frame_count,
            playing: false,
            looping: true,
            fps: DEFAULT_FPS,
            last_advance: None,
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Toggle between Paused and Playing.
    pub fn toggle_play(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if self.frame_count == 0 || self.playing {
            return;
        }
        self.playing = true;
        // Baseline is armed by the first tick so the first interval is
        // measured from real tick time, not from the button press.
        self.last_advance = None;
    }

    /// Pause and drop the clock baseline. Cancellation is total: no advance
    /// survives into the next play.
    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            debug!("paused at frame {}", self.frame_index);
        }
        self.last_advance = None;
    }

    /// Jump to a frame, clamped to the valid range. Play state is untouched.
    pub fn seek(&mut self, frame_index: usize) {
        if self.frame_count == 0 {
            return;
        }
        self.frame_index = frame_index.min(self.frame_count - 1);
    }

    /// Move by `delta` frames, clamped at the ends. Manual stepping never
    /// wraps, regardless of the loop flag.
    pub fn step(&mut self, delta: i64) {
        if self.frame_count == 0 {
            return;
        }
        let target = self.frame_index as i64 + delta;
        self.frame_index = target.clamp(0, self.frame_count as i64 - 1) as usize;
    }

    /// Clamp into `[MIN_FPS, MAX_FPS]`; takes effect on the next advance.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Interval between frame advances at the current rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Clock-driven advance; call once per host display tick with the tick's
    /// timestamp. Returns true when the frame index changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.playing || self.frame_count == 0 {
            return false;
        }

        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return false;
        };

        if now.duration_since(last) < self.frame_interval() {
            return false;
        }

        // Rebase on the tick time: late ticks skip frames instead of
        // queuing extra advances.
        self.last_advance = Some(now);
        self.advance();
        true
    }

    fn advance(&mut self) {
        let next = self.frame_index + 1;
        if next < self.frame_count {
            self.frame_index = next;
        } else if self.looping {
            self.frame_index = 0;
        } else {
            // Hold the last valid frame and stop.
            self.frame_index = self.frame_count - 1;
            self.playing = false;
            self.last_advance = None;
            debug!("reached end, stopping");
        }
    }
}
