//! Phone orientation gate and the per-exercise strategy record.
//!
//! Every exercise is described once by an [`ExerciseProfile`]: which axis
//! must carry gravity and which detector consumes the filtered signal.
//! The profile is picked when a session starts so the per-sample path
//! never branches on the exercise kind again.

use crate::types::{ExerciseKind, MotionSample};

/// Minimum absolute acceleration on the posture axis, in m/s².
pub const ORIENTATION_THRESHOLD: f32 = 7.0;

pub const LABEL_CORRECT: &str = "Correct Orientation";
pub const LABEL_PLACE_FLAT: &str = "Place phone flat";
pub const LABEL_POCKET_VERTICAL: &str = "Phone in pocket (vertical)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Y,
    Z,
}

impl Axis {
    fn read(self, sample: &MotionSample) -> f32 {
        match self {
            Axis::Y => sample.y,
            Axis::Z => sample.z,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorKind {
    Repetitions,
    Stability,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExerciseProfile {
    pub kind: ExerciseKind,
    pub posture_axis: Axis,
    pub invalid_label: &'static str,
    pub detector: DetectorKind,
}

impl ExerciseProfile {
    pub fn for_kind(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::PushUp => Self {
                kind,
                posture_axis: Axis::Z,
                invalid_label: LABEL_PLACE_FLAT,
                detector: DetectorKind::Repetitions,
            },
            ExerciseKind::Squat => Self {
                kind,
                posture_axis: Axis::Y,
                invalid_label: LABEL_POCKET_VERTICAL,
                detector: DetectorKind::Repetitions,
            },
            ExerciseKind::Plank => Self {
                kind,
                posture_axis: Axis::Z,
                invalid_label: LABEL_PLACE_FLAT,
                detector: DetectorKind::Stability,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrientationCheck {
    pub valid: bool,
    pub label: &'static str,
}

/// Stateless validator; both entry points are pure functions.
pub struct OrientationValidator;

impl OrientationValidator {
    pub fn check(sample: &MotionSample, profile: &ExerciseProfile) -> OrientationCheck {
        if profile.posture_axis.read(sample).abs() > ORIENTATION_THRESHOLD {
            OrientationCheck {
                valid: true,
                label: LABEL_CORRECT,
            }
        } else {
            OrientationCheck {
                valid: false,
                label: profile.invalid_label,
            }
        }
    }

    pub fn validate(sample: &MotionSample, kind: ExerciseKind) -> OrientationCheck {
        Self::check(sample, &ExerciseProfile::for_kind(kind))
    }
}
