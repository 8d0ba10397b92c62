/*!
Turn-in-place configuration.

These are plain-data types supplied per animation context by the host (each
anim set decides how turning behaves while it is active). The engine never
mutates them. Defaults mirror the reference tuning: 60/90/180 degree step
animations, turning triggered at 60 degrees, a 135 degree hard clamp while
strafing, and sped-up playback at the clamp or on direction reversal.
*/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle to a prerecorded turn animation clip, resolved by the host's
/// animation source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

/// Handle to a montage (a root-motion-driven animation), resolved by the
/// host's animation source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MontageId(pub u64);

/// Classifier selecting which min/max turn-angle pair applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnMode {
    /// Orienting toward movement direction.
    Movement,
    /// Facing is decoupled from movement direction.
    #[default]
    Strafe,
}

/// State of the turn-in-place system.
///
/// `Locked` prevents any rotation from occurring; `Paused` prevents any turn
/// offset from accumulating while still permitting underlying rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnabledState {
    #[default]
    Enabled,
    Locked,
    Paused,
}

/// Forces the enabled state regardless of [`TurnParams`], e.g. from debug
/// configuration or while a root-motion montage drives the character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOverride {
    /// Process turn in place as normal based on [`TurnParams::state`].
    #[default]
    Default,
    ForceEnabled,
    ForceLocked,
    ForcePaused,
}

/// How to select the turn animation based on the turn angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectMode {
    /// Highest animation not exceeding the angle (at 175, use the 135 turn).
    #[default]
    Greater,
    /// Closest matching animation (at 175, use the 180 turn). Can over-step
    /// the turn and turn back again with 45 degree increments; pair with a
    /// min turn angle above the smallest animation.
    Nearest,
}

/// How a server without rendered meshes advances turn animation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimUpdateMode {
    /// Curve values come from actually-evaluated animations.
    #[default]
    Animation,
    /// Curve values come from pseudo-evaluation of the selected clip.
    Pseudo,
}

/// Minimum and maximum turn angles for one turn mode.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TurnAngles {
    /// Angle at which turn in place triggers.
    pub min_turn_angle: f32,
    /// Hard clamp on the accumulated angle. 0.0 disables the clamp.
    pub max_turn_angle: f32,
}

impl TurnAngles {
    pub fn new(min_turn_angle: f32, max_turn_angle: f32) -> Self {
        Self {
            min_turn_angle,
            max_turn_angle,
        }
    }
}

impl Default for TurnAngles {
    fn default() -> Self {
        Self::new(60.0, 0.0)
    }
}

/// Rules deciding which root-motion montages should *not* suppress turning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MontageHandling {
    /// Montages with additive tracks are not considered to be playing.
    pub ignore_additive_montages: bool,
    /// Montages using any of these slots are not considered to be playing.
    pub ignore_montage_slots: Vec<String>,
    /// Montages listed here are not considered to be playing.
    pub ignore_montages: Vec<MontageId>,
}

impl Default for MontageHandling {
    fn default() -> Self {
        Self {
            ignore_additive_montages: true,
            ignore_montage_slots: vec![
                "UpperBody".to_string(),
                "UpperBodyAdditive".to_string(),
                "UpperBodyDynAdditiveBase".to_string(),
                "UpperBodyDynAdditive".to_string(),
                "Attack".to_string(),
            ],
            ignore_montages: Vec::new(),
        }
    }
}

/// Names of the animation curves the engine consumes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnSettings {
    /// Curve holding how much yaw rotation remains to complete the turn.
    /// Queried to reduce the turn offset by the rotation in the animation.
    pub turn_yaw_curve_name: String,
    /// Curve holding how much of the remaining yaw is currently live. When it
    /// drops to zero the animation is in recovery: still playing, no longer
    /// rotating.
    pub turn_weight_curve_name: String,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            turn_yaw_curve_name: "RemainingTurnYaw".to_string(),
            turn_weight_curve_name: "TurnYawWeight".to_string(),
        }
    }
}

/// Turn-in-place parameters, per animation context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnParams {
    pub state: EnabledState,
    pub select_mode: SelectMode,
    /// Added to the current offset when selecting the animation to play.
    /// Large values can over-rotate far enough to trigger a correction turn.
    pub select_offset: f32,
    /// Turn angles for different movement orientations.
    pub turn_angles: HashMap<TurnMode, TurnAngles>,
    /// Yaw angles at which the different step animations occur. Corresponding
    /// clips must be present in the anim set.
    pub step_sizes: Vec<u16>,
    /// Rate at which the visual offset is interpolated away once movement
    /// starts on the instant rotation path. Interpolation runs in a 0..1
    /// alpha domain: 1.0 takes one second, 2.0 takes half a second.
    pub moving_interp_out_rate: f32,
    pub montage_handling: MontageHandling,
}

impl TurnParams {
    /// Turn angles for the given mode, if configured.
    pub fn turn_angles(&self, mode: TurnMode) -> Option<&TurnAngles> {
        self.turn_angles.get(&mode)
    }
}

impl Default for TurnParams {
    fn default() -> Self {
        let mut turn_angles = HashMap::new();
        turn_angles.insert(TurnMode::Movement, TurnAngles::new(60.0, 0.0));
        turn_angles.insert(TurnMode::Strafe, TurnAngles::new(60.0, 135.0));
        Self {
            state: EnabledState::Enabled,
            select_mode: SelectMode::Greater,
            select_offset: 0.0,
            turn_angles,
            step_sizes: vec![60, 90, 180],
            moving_interp_out_rate: 1.0,
            montage_handling: MontageHandling::default(),
        }
    }
}

/// Animation set for turn in place: the clips to play, the parameters active
/// while this set is active, and play-rate modifiers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnAnimSet {
    pub params: TurnParams,
    /// When a turn in the opposite direction is triggered mid-turn, scale
    /// playback by this rate so the stale turn completes quickly.
    pub play_rate_on_direction_change: f32,
    /// Playback rate while clamped at the max angle; starting the turn faster
    /// keeps up with fast camera rotation.
    pub play_rate_at_max_angle: f32,
    /// Keep the max-angle play rate for the in-progress turn even after
    /// leaving the max angle. Mouse input constantly re-enters and exits the
    /// clamp, which otherwise jitters the play rate.
    pub maintain_max_angle_play_rate: bool,
    /// Clips to select from when turning left, indexed by step size.
    pub left_turns: Vec<ClipId>,
    /// Clips to select from when turning right, indexed by step size.
    pub right_turns: Vec<ClipId>,
}

impl Default for TurnAnimSet {
    fn default() -> Self {
        Self {
            params: TurnParams::default(),
            play_rate_on_direction_change: 1.7,
            play_rate_at_max_angle: 1.3,
            maintain_max_angle_play_rate: true,
            left_turns: Vec::new(),
            right_turns: Vec::new(),
        }
    }
}
