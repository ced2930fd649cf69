//! Frame-advance timer for the preview animation.
//!
//! The driver owns at most one repeating timer. It is polled with the current
//! instant by whatever event loop hosts it and reports which frame to show.

use std::time::{Duration, Instant};

pub const MIN_INTERVAL_MS: u64 = 10;
pub const MAX_INTERVAL_MS: u64 = 200;
pub const INTERVAL_STEP_MS: u64 = 10;
pub const DEFAULT_INTERVAL_MS: u64 = 50;

/// Clamp a requested interval into the supported range.
pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Map a speed control position to a frame interval (higher speed, shorter interval).
pub fn interval_for_speed(speed: u64) -> u64 {
    let speed = clamp_interval_ms(speed);
    MIN_INTERVAL_MS + MAX_INTERVAL_MS - speed
}

/// Inverse of [`interval_for_speed`].
pub fn speed_for_interval(interval_ms: u64) -> u64 {
    interval_for_speed(interval_ms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    id: u64,
    due: Instant,
}

/// Playback position and the repeating timer driving it.
#[derive(Debug)]
pub struct AnimationDriver {
    frame_count: usize,
    /// Index shown on the next tick.
    index: usize,
    /// Index currently on screen.
    displayed: usize,
    interval: Duration,
    timer: Option<Timer>,
    next_timer_id: u64,
}

impl AnimationDriver {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            frame_count: 0,
            index: 0,
            displayed: 0,
            interval: Duration::from_millis(clamp_interval_ms(interval_ms)),
            timer: None,
            next_timer_id: 0,
        }
    }

    /// Reset for a freshly loaded sequence of `frame_count` frames.
    pub fn load(&mut self, frame_count: usize) {
        self.cancel_timer();
        self.frame_count = frame_count;
        self.index = 0;
        self.displayed = 0;
    }

    /// Start (or resume) playback from the current index.
    pub fn start(&mut self, now: Instant) {
        self.cancel_timer();
        if self.frame_count == 0 {
            return;
        }
        self.next_timer_id += 1;
        self.timer = Some(Timer {
            id: self.next_timer_id,
            due: now + self.interval,
        });
    }

    /// Stop the timer but keep the playback position.
    pub fn pause(&mut self) {
        self.cancel_timer();
    }

    /// Toggle between playing and paused.
    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause();
        } else {
            self.start(now);
        }
    }

    /// Stop playback and rewind to the first frame.
    pub fn stop(&mut self) {
        self.cancel_timer();
        self.index = 0;
        self.displayed = 0;
    }

    /// Change the frame interval. A running timer is replaced and keeps its position.
    ///
    /// The replacement never fires later than the timer it replaces, so a burst of
    /// changes (dragging the speed control) cannot hold the animation still.
    pub fn set_interval_ms(&mut self, interval_ms: u64, now: Instant) {
        let interval = Duration::from_millis(clamp_interval_ms(interval_ms));
        if interval == self.interval {
            return;
        }
        self.interval = interval;
        let Some(previous_due) = self.timer.map(|timer| timer.due) else {
            return;
        };
        self.start(now);
        if let Some(timer) = self.timer.as_mut() {
            timer.due = timer.due.min(previous_due);
        }
    }

    /// Fire the timer if it is due. Returns the frame index to display.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let timer = self.timer.as_mut()?;
        if now < timer.due {
            return None;
        }
        timer.due = now + self.interval;
        Some(self.tick())
    }

    /// Show the frame at the current index, then advance with wrap-around.
    pub fn tick(&mut self) -> usize {
        if self.frame_count == 0 {
            return 0;
        }
        if self.index >= self.frame_count {
            self.index = 0;
        }
        self.displayed = self.index;
        self.index = (self.index + 1) % self.frame_count;
        self.displayed
    }

    /// Time left until the next tick, if the timer is live.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.timer.map(|timer| timer.due.saturating_duration_since(now))
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn displayed(&self) -> usize {
        self.displayed
    }

    pub fn next_index(&self) -> usize {
        self.index
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Identifier of the live timer, if any.
    pub fn timer_id(&self) -> Option<u64> {
        self.timer.map(|timer| timer.id)
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_MS)
    }
}
