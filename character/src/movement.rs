/*!
Movement-side rotation integration.

[`TurnMovement`] carries the rotation state the turn system needs from the
host's movement layer: the last meaningful input direction, per-axis rotation
rates with a separate idle rate, and the two orchestrators that offer each
tick's rotation to [`TurnInPlace`] before falling back to ordinary facing
logic. Hosts call `face_rotation` or `physics_rotation` from their own
rotation update, depending on which path their configuration selects.
*/

use crate::component::TurnInPlace;
use crate::context::TurnContext;
use shared::{
    MAX_AXIS_STEP_DEG, Orientation, ROOT_MOTION_GRACE_SECS, Vec3, needs_rotation_sweep,
    normalize_axis, signed_delta, yaw_from_direction,
};

/// Per-axis rotation step for one tick, clamped to a full revolution.
#[inline]
fn turn_axis_delta(rate_deg_per_sec: f32, dt: f32) -> f32 {
    if rate_deg_per_sec >= 0.0 {
        (rate_deg_per_sec * dt).min(MAX_AXIS_STEP_DEG)
    } else {
        // Negative rates mean instant rotation.
        MAX_AXIS_STEP_DEG
    }
}

pub struct TurnMovement {
    /// Rotation rate (degrees per second per axis) while moving.
    pub rotation_rate: Orientation,
    /// Rotation rate while stationary on the ground. Fast enough that turn
    /// animations drive the visible rotation, not the interpolation.
    pub rotation_rate_idle: Orientation,
    /// While stationary with orient-to-movement, keep facing the last input
    /// direction instead of freezing at the current rotation.
    pub rotate_to_last_input_vector: bool,
    pub last_input_vector: Vec3,
    /// Timestamp of the last tick root motion affected velocity.
    pub last_root_motion_time: f32,
}

impl Default for TurnMovement {
    fn default() -> Self {
        Self {
            rotation_rate: Orientation::new(0.0, 360.0, 0.0),
            rotation_rate_idle: Orientation::new(0.0, 1150.0, 0.0),
            rotate_to_last_input_vector: true,
            last_input_vector: Vec3::zeros(),
            last_root_motion_time: f32::NEG_INFINITY,
        }
    }
}

impl TurnMovement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks the last meaningful input direction.
    ///
    /// Acceleration is trusted first, then velocity once root motion has been
    /// quiet for a grace period. The half-strength acceleration threshold
    /// keeps a released gamepad thumbstick that bounces past the center line
    /// from flipping the character.
    #[allow(clippy::too_many_arguments)]
    pub fn update_last_input_vector<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &C,
        acceleration: Vec3,
        max_acceleration: f32,
        max_speed: f32,
        has_root_motion: bool,
        forward: Vec3,
        now: f32,
    ) {
        if !ctx.rotation_config().orient_rotation_to_movement || has_root_motion {
            self.last_input_vector = forward;
            return;
        }

        let analog_input = if max_acceleration > 0.0 {
            acceleration.norm() / max_acceleration
        } else {
            0.0
        };
        let root_motion_quiet = now - self.last_root_motion_time >= ROOT_MOTION_GRACE_SECS;
        let velocity = ctx.velocity();

        if analog_input >= 0.5 {
            self.last_input_vector = acceleration.normalize();
        } else if velocity.norm() > max_speed * 0.05 && root_motion_quiet {
            self.last_input_vector = velocity.normalize();
        }
    }

    /// Marks root motion as active this tick, deferring velocity-sourced
    /// input tracking for the grace period.
    pub fn note_root_motion(&mut self, now: f32) {
        self.last_root_motion_time = now;
    }

    /// Maximum rotation this tick, per axis.
    pub fn delta_rotation(&self, dt: f32, stationary: bool) -> Orientation {
        let rate = if stationary {
            self.rotation_rate_idle
        } else {
            self.rotation_rate
        };
        Orientation::new(
            turn_axis_delta(rate.pitch, dt),
            turn_axis_delta(rate.yaw, dt),
            turn_axis_delta(rate.roll, dt),
        )
    }

    /// Desired facing while orienting to movement: acceleration direction,
    /// else an AI-requested velocity, else the last input vector, else hold.
    pub fn orient_to_movement_rotation(
        &self,
        current: Orientation,
        acceleration: Vec3,
        requested_velocity: Option<Vec3>,
    ) -> Orientation {
        const INPUT_EPS: f32 = 1.0e-8;

        if acceleration.norm_squared() >= INPUT_EPS {
            return yaw_from_direction(acceleration)
                .map(Orientation::yaw_only)
                .unwrap_or(current);
        }

        if let Some(requested) = requested_velocity {
            if requested.norm_squared() >= INPUT_EPS {
                if let Some(yaw) = yaw_from_direction(requested) {
                    return Orientation::yaw_only(yaw);
                }
            }
        }

        if self.rotate_to_last_input_vector {
            if let Some(yaw) = yaw_from_direction(self.last_input_vector) {
                return Orientation::yaw_only(yaw);
            }
        }

        current
    }

    /// Instant-path orchestrator: offers the control rotation to the turn
    /// system and replicates the result. Returns whether rotation was
    /// handled; `false` asks the host to run its stock facing logic.
    pub fn face_rotation<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        turn: &mut TurnInPlace,
        new_control_rotation: Orientation,
        dt: f32,
        has_root_motion: bool,
        now: f32,
    ) -> bool {
        if !turn.has_valid_data() {
            return false;
        }

        // Velocity will not reflect input during root motion; keep the grace
        // window open.
        if has_root_motion {
            self.note_root_motion(now);
        }

        let last_turn_offset = turn.turn_offset();
        let handled = turn.face_rotation(ctx, new_control_rotation, dt);
        turn.post_turn_in_place(ctx, last_turn_offset);
        handled
    }

    /// Interpolated-path orchestrator: lets the turn system claim the tick,
    /// falls back to smooth rotation toward the desired facing, and
    /// replicates the result.
    pub fn physics_rotation<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        turn: &mut TurnInPlace,
        dt: f32,
        acceleration: Vec3,
        requested_velocity: Option<Vec3>,
    ) {
        let config = ctx.rotation_config();
        if !(config.orient_rotation_to_movement || config.use_controller_desired_rotation) {
            return;
        }
        if ctx.desired_controller_rotation().is_none() && !config.run_physics_with_no_controller {
            return;
        }

        let last_turn_offset = turn.turn_offset();
        if !turn.physics_rotation(ctx, self.rotate_to_last_input_vector, self.last_input_vector) {
            self.smooth_physics_rotation(ctx, turn, dt, acceleration, requested_velocity);
        }
        turn.post_turn_in_place(ctx, last_turn_offset);
    }

    /// Default smooth rotation toward the desired facing, rate-limited per
    /// axis. Runs when the turn system declined the tick.
    fn smooth_physics_rotation<C: TurnContext + ?Sized>(
        &self,
        ctx: &mut C,
        turn: &TurnInPlace,
        dt: f32,
        acceleration: Vec3,
        requested_velocity: Option<Vec3>,
    ) {
        let config = ctx.rotation_config();
        let current = ctx.actor_rotation().normalized();

        let desired = if config.orient_rotation_to_movement {
            self.orient_to_movement_rotation(current, acceleration, requested_velocity)
        } else if let Some(desired) = ctx
            .desired_controller_rotation()
            .or_else(|| ctx.fallback_controller_rotation())
        {
            desired
        } else {
            return;
        };

        let max_step = self.delta_rotation(dt, ctx.is_stationary());
        let mut new_rotation = current;
        new_rotation.yaw = normalize_axis(
            current.yaw + signed_delta(desired.yaw, current.yaw).clamp(-max_step.yaw, max_step.yaw),
        );

        if new_rotation == current {
            return;
        }
        let sweep = needs_rotation_sweep(turn.sweep_handling, current, new_rotation);
        ctx.set_actor_rotation(new_rotation, sweep);
    }
}
