pub mod angle;
pub mod constants;
pub mod curve;
pub mod params;
pub mod quantize;
pub mod step;

pub use angle::{
    Orientation, Quat, SweepHandling, Vec3, has_turn_offset_changed, interp_constant_to,
    needs_rotation_sweep, normalize_axis, quat_yaw, signed_delta, slerp_yaw, yaw_from_direction,
    yaw_quat,
};
pub use constants::{
    AXIS_QUANTIZE_STEP_DEG, CURVE_WEIGHT_EPS, MAX_ACCUMULATED_OFFSET_DEG, MAX_AXIS_STEP_DEG,
    ROOT_MOTION_GRACE_SECS, STATIONARY_SPEED_EPS, TURN_ROTATOR_TOLERANCE,
};
pub use curve::CurveValues;
pub use params::{
    AnimUpdateMode, ClipId, EnabledState, MontageHandling, MontageId, SelectMode, TurnAngles,
    TurnAnimSet, TurnMode, TurnOverride, TurnParams, TurnSettings,
};
pub use quantize::{compress_axis_to_u16, decompress_axis_from_u16};
pub use step::{
    GraphNodeData, StepSelection, advance_anim_time, determine_step_size, select_turn_clip,
    turn_play_rate, update_turn_node_play_rate,
};
