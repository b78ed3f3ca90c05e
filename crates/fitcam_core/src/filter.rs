/// Standard gravity; the filter restarts from here at every set.
pub const GRAVITY: f32 = 9.8;
/// Smoothing factor applied to each new magnitude.
pub const SMOOTHING_ALPHA: f32 = 0.15;

/// Exponential smoothing of acceleration magnitude.
#[derive(Clone, Debug)]
pub struct SignalFilter {
    smoothed: f32,
}

impl Default for SignalFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalFilter {
    pub fn new() -> Self {
        Self { smoothed: GRAVITY }
    }

    /// Fold one raw magnitude into the running value and return it.
    pub fn update(&mut self, raw_magnitude: f32) -> f32 {
        self.smoothed = SMOOTHING_ALPHA * raw_magnitude + (1.0 - SMOOTHING_ALPHA) * self.smoothed;
        self.smoothed
    }

    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.smoothed = GRAVITY;
    }
}
