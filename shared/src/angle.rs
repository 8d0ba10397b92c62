/*!
Wrap-around yaw arithmetic.

Angles are signed degrees. The canonical range is (-180, 180]; every value
leaving this module has been passed through [`normalize_axis`]. Quaternions
(about the world up axis, +Y) are only used where degree comparison is
unreliable: tolerance-bounded change detection across the -180/180 seam and
spherical interpolation of facing.
*/

use crate::constants::TURN_ROTATOR_TOLERANCE;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Maps any degree value into (-180, 180].
#[inline]
pub fn normalize_axis(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Shortest signed rotation from `b` to `a`, in degrees.
#[inline]
pub fn signed_delta(a: f32, b: f32) -> f32 {
    normalize_axis(a - b)
}

/// Rotation of `yaw_deg` degrees about the world up axis.
#[inline]
pub fn yaw_quat(yaw_deg: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw_deg.to_radians())
}

/// Extracts the signed yaw (degrees) of a rotation that is known to be about
/// the world up axis.
#[inline]
pub fn quat_yaw(quat: &Quat) -> f32 {
    normalize_axis(quat.scaled_axis().y.to_degrees())
}

/// Whether two yaw angles represent materially different rotations.
///
/// Compared as quaternions with a tolerance rather than as raw floats, so that
/// values straddling the -180/180 seam do not read as changed. Either the
/// component-wise difference or the component-wise sum must vanish (a unit
/// quaternion and its negation encode the same rotation).
#[inline]
pub fn has_turn_offset_changed(current: f32, last: f32) -> bool {
    let a = yaw_quat(current).into_inner().coords;
    let b = yaw_quat(last).into_inner().coords;
    (a - b).amax() > TURN_ROTATOR_TOLERANCE && (a + b).amax() > TURN_ROTATOR_TOLERANCE
}

/// Spherical interpolation between two yaw headings, returning degrees.
///
/// Antipodal headings have no unique great-circle path; in that degenerate
/// case the target is returned.
#[inline]
pub fn slerp_yaw(from_deg: f32, to_deg: f32, alpha: f32) -> f32 {
    let from = yaw_quat(from_deg);
    let to = yaw_quat(to_deg);
    let blended = from.try_slerp(&to, alpha, 1.0e-6).unwrap_or(to);
    quat_yaw(&blended)
}

/// Yaw heading (degrees) facing along the planar (XZ) part of `direction`.
///
/// Returns `None` when the planar component is too small to define a heading.
#[inline]
pub fn yaw_from_direction(direction: Vec3) -> Option<f32> {
    const YAW_EPS: f32 = 1.0e-6;
    let planar_sq = direction.x * direction.x + direction.z * direction.z;
    if planar_sq <= YAW_EPS {
        return None;
    }
    Some(normalize_axis((-direction.x).atan2(-direction.z).to_degrees()))
}

/// Constant-rate interpolation of `current` toward `target`, stepping at most
/// `rate * dt` per call.
#[inline]
pub fn interp_constant_to(current: f32, target: f32, dt: f32, rate: f32) -> f32 {
    if rate <= 0.0 {
        return target;
    }
    let max_step = rate * dt;
    current + (target - current).clamp(-max_step, max_step)
}

/// A world-space orientation in degrees.
///
/// The turn system only ever *moves* yaw; pitch and roll are carried through
/// so that the host can decide whether a rotation write needs a collision
/// sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Orientation {
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    #[inline]
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Orientation with only a yaw component.
    #[inline]
    pub fn yaw_only(yaw: f32) -> Self {
        Self {
            pitch: 0.0,
            yaw,
            roll: 0.0,
        }
    }

    /// Same orientation with every axis wrapped into (-180, 180].
    #[inline]
    pub fn normalized(self) -> Self {
        Self {
            pitch: normalize_axis(self.pitch),
            yaw: normalize_axis(self.yaw),
            roll: normalize_axis(self.roll),
        }
    }

    /// This orientation with the yaw component replaced.
    #[inline]
    pub fn with_yaw(self, yaw: f32) -> Self {
        Self { yaw, ..self }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Rotation writes always sweep in stock engines, even for yaw-only changes
/// which cannot reasonably collide. This policy restricts sweeps to rotations
/// that actually tilt the collision shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepHandling {
    /// Only sweep when the rotation delta contains pitch or roll.
    #[default]
    AutoDetect,
    /// Always perform a sweep when rotating.
    AlwaysSweep,
    /// Never perform a sweep when rotating.
    NeverSweep,
}

/// Whether writing `new` over `current` should perform a collision sweep.
#[inline]
pub fn needs_rotation_sweep(handling: SweepHandling, current: Orientation, new: Orientation) -> bool {
    match handling {
        SweepHandling::AlwaysSweep => true,
        SweepHandling::NeverSweep => false,
        SweepHandling::AutoDetect => {
            const AXIS_EPS: f32 = 1.0e-4;
            signed_delta(new.pitch, current.pitch).abs() > AXIS_EPS
                || signed_delta(new.roll, current.roll).abs() > AXIS_EPS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_axis_maps_into_half_open_range() {
        assert_eq!(normalize_axis(0.0), 0.0);
        assert_eq!(normalize_axis(180.0), 180.0);
        assert_eq!(normalize_axis(-180.0), 180.0);
        assert_eq!(normalize_axis(190.0), -170.0);
        assert_eq!(normalize_axis(360.0), 0.0);
        assert_eq!(normalize_axis(720.5), 0.5);
        assert_eq!(normalize_axis(-90.0), -90.0);
    }

    #[test]
    fn signed_delta_takes_the_short_way_around() {
        assert_eq!(signed_delta(170.0, -170.0), -20.0);
        assert_eq!(signed_delta(-170.0, 170.0), 20.0);
        assert_eq!(signed_delta(90.0, 0.0), 90.0);
    }

    #[test]
    fn change_detection_ignores_the_seam() {
        // -180 and 180 are the same rotation; raw float comparison would
        // report a change and spam replication.
        assert!(!has_turn_offset_changed(180.0, -180.0));
        assert!(!has_turn_offset_changed(-180.0, 180.0));
        assert!(!has_turn_offset_changed(42.0, 42.0));
    }

    #[test]
    fn change_detection_sees_material_differences() {
        assert!(has_turn_offset_changed(0.0, 1.0));
        assert!(has_turn_offset_changed(179.0, -179.0)); // 2 degrees apart
    }

    #[test]
    fn change_detection_tolerates_sub_tolerance_noise() {
        // 1e-3 quaternion tolerance corresponds to well over 1e-3 degrees.
        assert!(!has_turn_offset_changed(10.0, 10.0 + 1.0e-4));
    }

    #[test]
    fn slerp_yaw_hits_endpoints_and_midpoint() {
        assert!((slerp_yaw(0.0, 90.0, 0.0) - 0.0).abs() < 1.0e-3);
        assert!((slerp_yaw(0.0, 90.0, 1.0) - 90.0).abs() < 1.0e-3);
        assert!((slerp_yaw(0.0, 90.0, 0.5) - 45.0).abs() < 1.0e-3);
    }

    #[test]
    fn slerp_yaw_wraps_across_the_seam() {
        // Short way from 170 to -170 passes through 180, not 0.
        let mid = slerp_yaw(170.0, -170.0, 0.5);
        assert!((mid.abs() - 180.0).abs() < 1.0e-3, "mid was {mid}");
    }

    #[test]
    fn yaw_from_direction_rejects_vertical_input() {
        assert_eq!(yaw_from_direction(Vec3::new(0.0, 1.0, 0.0)), None);
        assert_eq!(yaw_from_direction(Vec3::zeros()), None);
    }

    #[test]
    fn yaw_from_direction_is_stable_under_scaling() {
        let a = yaw_from_direction(Vec3::new(1.0, 0.0, 1.0)).unwrap();
        let b = yaw_from_direction(Vec3::new(10.0, 3.0, 10.0)).unwrap();
        assert!((a - b).abs() < 1.0e-4);
    }

    #[test]
    fn interp_constant_to_clamps_step_and_reaches_target() {
        // One second at rate 1.0 covers the whole 0..1 range.
        let mut alpha = 0.0;
        alpha = interp_constant_to(alpha, 1.0, 0.25, 1.0);
        assert!((alpha - 0.25).abs() < 1.0e-6);
        alpha = interp_constant_to(alpha, 1.0, 10.0, 1.0);
        assert_eq!(alpha, 1.0);
    }

    #[test]
    fn sweep_only_when_pitch_or_roll_changes() {
        let current = Orientation::new(10.0, 40.0, 0.0);
        let yaw_only = current.with_yaw(90.0);
        let tilted = Orientation::new(11.0, 90.0, 0.0);

        assert!(!needs_rotation_sweep(SweepHandling::AutoDetect, current, yaw_only));
        assert!(needs_rotation_sweep(SweepHandling::AutoDetect, current, tilted));
        assert!(needs_rotation_sweep(SweepHandling::AlwaysSweep, current, yaw_only));
        assert!(!needs_rotation_sweep(SweepHandling::NeverSweep, current, tilted));
    }
}
