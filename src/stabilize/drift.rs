//! Cumulative drift state: clamping and per-strategy shift bookkeeping.

use nalgebra::Vector2;

use crate::stabilize::estimator::{Displacement, ShiftMode};

/// Hard per-axis bound on how much correction a single step may contribute,
/// guarding against mistracked outlier displacements.
pub const MAX_SHIFT_PX: f32 = 20.0;

/// Holds the cumulative shift of one stabilization run and turns raw
/// displacement estimates into the translation handed to the warper.
///
/// The two strategies feed this differently, by design: optical flow
/// reports incremental step-to-step motion that is summed into the state
/// and applied negated, while feature matching reports absolute offsets
/// against a fixed reference that are applied directly and never
/// accumulated.
pub struct DriftAccumulator {
    mode: ShiftMode,
    cumulative: Vector2<f32>,
}

impl DriftAccumulator {
    pub fn new(mode: ShiftMode) -> Self {
        Self {
            mode,
            cumulative: Vector2::zeros(),
        }
    }

    /// Cumulative shift carried so far (incremental mode only moves it).
    pub fn cumulative(&self) -> Vector2<f32> {
        self.cumulative
    }

    /// Fold a displacement estimate into the drift state and return the
    /// translation to apply to the current frame.
    ///
    /// An insufficient-evidence frame applies the identity translation and
    /// leaves the state untouched; the run carries on.
    pub fn update(&mut self, displacement: Displacement) -> Vector2<f32> {
        let shift = match displacement {
            Displacement::Insufficient => return Vector2::zeros(),
            Displacement::Shift(s) => Vector2::new(clamp_axis(s.x), clamp_axis(s.y)),
        };

        match self.mode {
            ShiftMode::Incremental => {
                self.cumulative += shift;
                -self.cumulative
            }
            ShiftMode::Absolute => shift,
        }
    }
}

fn clamp_axis(v: f32) -> f32 {
    v.clamp(-MAX_SHIFT_PX, MAX_SHIFT_PX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_mode_accumulates_and_negates() {
        let mut drift = DriftAccumulator::new(ShiftMode::Incremental);
        let applied = drift.update(Displacement::Shift(Vector2::new(3.0, -2.0)));
        assert_eq!(applied, Vector2::new(-3.0, 2.0));
        let applied = drift.update(Displacement::Shift(Vector2::new(1.0, 1.0)));
        assert_eq!(applied, Vector2::new(-4.0, 1.0));
        assert_eq!(drift.cumulative(), Vector2::new(4.0, -1.0));
    }

    #[test]
    fn test_absolute_mode_applies_directly_without_accumulating() {
        let mut drift = DriftAccumulator::new(ShiftMode::Absolute);
        assert_eq!(
            drift.update(Displacement::Shift(Vector2::new(-6.0, 2.0))),
            Vector2::new(-6.0, 2.0)
        );
        assert_eq!(
            drift.update(Displacement::Shift(Vector2::new(-7.0, 2.5))),
            Vector2::new(-7.0, 2.5)
        );
        assert_eq!(drift.cumulative(), Vector2::zeros());
    }

    #[test]
    fn test_clamp_bounds_each_axis_independently() {
        let mut drift = DriftAccumulator::new(ShiftMode::Absolute);
        let applied = drift.update(Displacement::Shift(Vector2::new(50.0, -3.0)));
        assert_eq!(applied, Vector2::new(MAX_SHIFT_PX, -3.0));
        let applied = drift.update(Displacement::Shift(Vector2::new(-1.0, -120.0)));
        assert_eq!(applied, Vector2::new(-1.0, -MAX_SHIFT_PX));
    }

    #[test]
    fn test_insufficient_evidence_is_identity_and_preserves_state() {
        let mut drift = DriftAccumulator::new(ShiftMode::Incremental);
        drift.update(Displacement::Shift(Vector2::new(5.0, 5.0)));
        let applied = drift.update(Displacement::Insufficient);
        assert_eq!(applied, Vector2::zeros());
        assert_eq!(drift.cumulative(), Vector2::new(5.0, 5.0));
        // The next trusted estimate resumes from the carried state.
        let applied = drift.update(Displacement::Shift(Vector2::new(1.0, 0.0)));
        assert_eq!(applied, Vector2::new(-6.0, -5.0));
    }
}
