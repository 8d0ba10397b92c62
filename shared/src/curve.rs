use serde::{Deserialize, Serialize};

use crate::constants::CURVE_WEIGHT_EPS;

/// Values sampled from the turn animation curves for one frame.
///
/// `remaining_turn_yaw` is how much yaw rotation the playing turn animation
/// has left; `turn_yaw_weight` is how strongly that rotation is currently
/// blended in. The product of the two is the yaw the animation actually
/// contributed, which is what gets removed from the turn offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveValues {
    pub remaining_turn_yaw: f32,
    pub turn_yaw_weight: f32,
}

impl CurveValues {
    pub const ZERO: Self = Self {
        remaining_turn_yaw: 0.0,
        turn_yaw_weight: 0.0,
    };

    pub fn new(remaining_turn_yaw: f32, turn_yaw_weight: f32) -> Self {
        Self {
            remaining_turn_yaw,
            turn_yaw_weight,
        }
    }

    /// Whether the weight is high enough for the yaw curve to be meaningful.
    ///
    /// Blending in and out of turn animations leaves frames where the weight
    /// is effectively zero; consuming the yaw curve on those frames divides
    /// noise by noise.
    #[inline]
    pub fn is_relevant(&self) -> bool {
        self.turn_yaw_weight.abs() > CURVE_WEIGHT_EPS
    }
}
