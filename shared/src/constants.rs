/// Tolerance for deciding whether two yaw angles represent materially different
/// rotations once converted to quaternions.
///
/// Replication pushes are gated on this so that values which differ as raw
/// floats but are rotationally indistinguishable (e.g. -180 vs 180) do not
/// generate network traffic.
pub const TURN_ROTATOR_TOLERANCE: f32 = 1.0e-3;

/// Hard ceiling for the accumulated turn offset in degrees.
///
/// A candidate offset whose magnitude exceeds this is rejected for the tick;
/// applying it would wrap past the far side of the circle and present as a
/// visible snap. The in-progress turn animation is left to remove the excess.
pub const MAX_ACCUMULATED_OFFSET_DEG: f32 = 180.0;

/// Weight-curve values below this are treated as "curve not relevant".
pub const CURVE_WEIGHT_EPS: f32 = 1.0e-4;

/// Speed (m/s) below which a character counts as stationary.
pub const STATIONARY_SPEED_EPS: f32 = 1.0e-4;

/// Size of one quantization step of the 16-bit axis codec, in degrees.
pub const AXIS_QUANTIZE_STEP_DEG: f32 = 360.0 / 65536.0;

/// Per-axis rotation applied in a single tick is clamped to a full revolution.
/// Values over 360 do nothing useful and giant rates would overflow other math.
pub const MAX_AXIS_STEP_DEG: f32 = 360.0;

/// Grace period (seconds) after root motion stops affecting velocity before
/// velocity is trusted again as an input-direction source.
pub const ROOT_MOTION_GRACE_SECS: f32 = 0.25;
