//! Hysteresis repetition counter for push-ups and squats.
//!
//! A repetition is a dip of the smoothed magnitude below
//! [`LOWER_THRESHOLD`] followed by a rise above [`UPPER_THRESHOLD`].
//! Upward crossings closer than [`DEBOUNCE`] to the previous counted rep
//! are ignored and the detector stays in the down phase.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

pub const LOWER_THRESHOLD: f32 = 8.5;
pub const UPPER_THRESHOLD: f32 = 11.0;
pub const DEBOUNCE: TimeDelta = TimeDelta::milliseconds(500);

#[derive(Clone, Debug, Default)]
pub struct RepetitionDetector {
    is_down: bool,
    last_rep_at: Option<DateTime<Utc>>,
}

impl RepetitionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one smoothed magnitude. Returns `true` when a rep is counted.
    pub fn observe(&mut self, magnitude: f32, at: DateTime<Utc>) -> bool {
        if !self.is_down && magnitude < LOWER_THRESHOLD {
            self.is_down = true;
            trace!(magnitude, "rep detector: down phase");
        }
        if self.is_down && magnitude > UPPER_THRESHOLD {
            let debounced = self
                .last_rep_at
                .is_none_or(|last| at.signed_duration_since(last) > DEBOUNCE);
            if debounced {
                self.is_down = false;
                self.last_rep_at = Some(at);
                return true;
            }
            trace!(magnitude, "rep detector: crossing inside debounce window");
        }
        false
    }

    pub fn is_down(&self) -> bool {
        self.is_down
    }

    pub fn last_rep_at(&self) -> Option<DateTime<Utc>> {
        self.last_rep_at
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
