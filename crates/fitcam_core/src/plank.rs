use crate::types::MotionSample;

pub const MAX_STABILITY: u8 = 100;
/// Lateral shake (|x| + |y|) above which a sample costs one stability point.
pub const SHAKE_THRESHOLD: f32 = 1.5;

/// Stability decay and elapsed time for an isometric hold.
///
/// The score never recovers within a set; it only resets with the set.
#[derive(Clone, Debug)]
pub struct PlankStabilityTracker {
    stability_score: u8,
    elapsed_secs: u64,
}

impl Default for PlankStabilityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PlankStabilityTracker {
    pub fn new() -> Self {
        Self {
            stability_score: MAX_STABILITY,
            elapsed_secs: 0,
        }
    }

    /// Apply one valid sample. Returns `true` if the score dropped.
    pub fn observe(&mut self, sample: &MotionSample) -> bool {
        let shake = sample.x.abs() + sample.y.abs();
        if shake > SHAKE_THRESHOLD && self.stability_score > 0 {
            self.stability_score -= 1;
            return true;
        }
        false
    }

    /// One second of active time.
    pub fn tick(&mut self) -> u64 {
        self.elapsed_secs += 1;
        self.elapsed_secs
    }

    pub fn is_complete(&self, target_secs: u64) -> bool {
        self.elapsed_secs >= target_secs
    }

    pub fn stability_score(&self) -> u8 {
        self.stability_score
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
