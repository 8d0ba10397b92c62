/*!
The turn-in-place component.

One instance per character. Holds the accumulated turn offset (how far the
visual facing leads or lags the simulated rotation) and reconciles it every
tick from three inputs: the desired facing, the rotation the host has already
applied, and yaw fed back from the playing turn animation's curves.

All mutation happens on the owning character's simulation tick. The anim graph
snapshot ([`crate::graph`]) is the only data handed to animation workers.
*/

use crate::context::{MontageInfo, NetMode, TurnContext, TurnMethod, turn_method};
use crate::pseudo::PseudoAnim;
use crate::replication::SimulatedTurnOffset;
use shared::{
    AnimUpdateMode, CurveValues, EnabledState, MAX_ACCUMULATED_OFFSET_DEG, MontageHandling,
    Orientation, SweepHandling, TurnMode, TurnOverride, TurnParams, TurnSettings, Vec3,
    interp_constant_to, needs_rotation_sweep, normalize_axis, signed_delta, slerp_yaw,
    yaw_from_direction,
};

/// Whether the montage-exclusion rules say this montage should *not* count as
/// a playing root-motion montage.
pub fn is_montage_ignored(handling: &MontageHandling, montage: &MontageInfo) -> bool {
    if handling.ignore_montages.contains(&montage.id) {
        return true;
    }
    if handling.ignore_additive_montages && montage.is_additive {
        return true;
    }
    montage
        .slots
        .iter()
        .any(|slot| handling.ignore_montage_slots.contains(slot))
}

pub struct TurnInPlace {
    /// Names of the animation curves to sample.
    pub settings: TurnSettings,
    /// How a dedicated server advances turn animation state.
    pub anim_update_mode: AnimUpdateMode,
    /// Collision sweep policy for rotation writes.
    pub sweep_handling: SweepHandling,

    /// Signed yaw degrees the visual facing leads the simulated rotation.
    pub(crate) turn_offset: f32,
    /// Last committed curve value (remaining yaw scaled by weight).
    pub(crate) curve_value: f32,
    /// Whether the weight curve was relevant last tick. Deltas only apply
    /// while the curve is continuously relevant, so re-entry cannot jump.
    pub(crate) last_curve_valid: bool,
    /// Progress of blending the offset away after movement starts on the
    /// instant rotation path.
    pub(crate) interp_out_alpha: f32,
    /// Yaw applied to the character by the last core update. Saved moves need
    /// it to restore rotation when the host combines moves.
    pub(crate) last_applied_turn_yaw: f32,

    pub(crate) is_bound: bool,
    warned_missing_animation: bool,

    pub(crate) simulated_turn_offset: SimulatedTurnOffset,
    pub(crate) replication_dirty: bool,

    pub(crate) pseudo: PseudoAnim,
}

impl Default for TurnInPlace {
    fn default() -> Self {
        Self {
            settings: TurnSettings::default(),
            anim_update_mode: AnimUpdateMode::Animation,
            sweep_handling: SweepHandling::AutoDetect,
            turn_offset: 0.0,
            curve_value: 0.0,
            last_curve_valid: false,
            interp_out_alpha: 0.0,
            last_applied_turn_yaw: 0.0,
            is_bound: false,
            warned_missing_animation: false,
            simulated_turn_offset: SimulatedTurnOffset::default(),
            replication_dirty: false,
            pseudo: PseudoAnim::new(),
        }
    }
}

impl TurnInPlace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes the cached animation binding. Call at attach time and
    /// whenever the host swaps its animation evaluator; the component does
    /// not re-probe the capability every tick.
    pub fn bind_animation<C: TurnContext + ?Sized>(&mut self, ctx: &C) {
        self.is_bound = ctx.animation().is_some();
        if !self.is_bound && !self.warned_missing_animation {
            log::warn!("no compatible animation source bound, turn in place stays locked");
            self.warned_missing_animation = true;
        }
    }

    pub fn has_valid_data(&self) -> bool {
        self.is_bound
    }

    pub fn turn_offset(&self) -> f32 {
        self.turn_offset
    }

    pub fn last_applied_turn_yaw(&self) -> f32 {
        self.last_applied_turn_yaw
    }

    /// Overwrites the turn offset, bypassing the update algorithm. Used by
    /// replication receipt and saved-move restoration.
    pub fn restore_turn_offset(&mut self, offset: f32) {
        self.turn_offset = normalize_axis(offset);
    }

    /// The character is turning in place while the weight curve is relevant.
    pub fn is_turning_in_place<C: TurnContext + ?Sized>(&self, ctx: &C) -> bool {
        self.has_valid_data() && self.curve_values(ctx).is_relevant()
    }

    /// Which min/max angle pair applies given the host's movement setup.
    pub fn turn_mode<C: TurnContext + ?Sized>(&self, ctx: &C) -> TurnMode {
        if ctx.rotation_config().orient_rotation_to_movement {
            TurnMode::Movement
        } else {
            TurnMode::Strafe
        }
    }

    pub(crate) fn wants_pseudo_anim_state<C: TurnContext + ?Sized>(&self, ctx: &C) -> bool {
        ctx.net_mode() == NetMode::DedicatedServer && self.anim_update_mode == AnimUpdateMode::Pseudo
    }

    /// Active turn parameters from the bound anim set.
    pub(crate) fn params<C: TurnContext + ?Sized>(&self, ctx: &C) -> TurnParams {
        if !self.has_valid_data() {
            return TurnParams::default();
        }
        ctx.animation()
            .map(|anim| anim.anim_set().params)
            .unwrap_or_default()
    }

    /// Current curve feedback, routed through the pseudo animation state on
    /// dedicated servers that do not tick meshes.
    pub(crate) fn curve_values<C: TurnContext + ?Sized>(&self, ctx: &C) -> CurveValues {
        if !self.has_valid_data() {
            return CurveValues::ZERO;
        }
        let Some(anim) = ctx.animation() else {
            return CurveValues::ZERO;
        };
        if self.wants_pseudo_anim_state(ctx) {
            if let Some(values) = self.pseudo.curve_values(anim, &self.settings) {
                return values;
            }
        }
        anim.curve_values(&self.settings)
    }

    fn resolve_override<C: TurnContext + ?Sized>(&self, ctx: &C, params: &TurnParams) -> TurnOverride {
        let debug = ctx.debug_override();
        if debug != TurnOverride::Default {
            return debug;
        }
        // A root-motion montage drives the character's rotation itself, so
        // accumulating a turn offset underneath it fights the montage. Only
        // montages the params explicitly ignore leave turning enabled.
        if let Some(anim) = ctx.animation() {
            if let Some(montage) = anim.current_root_motion_montage() {
                if !is_montage_ignored(&params.montage_handling, &montage) {
                    return TurnOverride::ForcePaused;
                }
            }
        }
        TurnOverride::Default
    }

    /// Effective enabled state after the override chain.
    pub fn enabled_state<C: TurnContext + ?Sized>(&self, ctx: &C, params: &TurnParams) -> EnabledState {
        if !self.has_valid_data() {
            return EnabledState::Locked;
        }
        match self.resolve_override(ctx, params) {
            TurnOverride::Default => params.state,
            TurnOverride::ForceEnabled => EnabledState::Enabled,
            TurnOverride::ForceLocked => EnabledState::Locked,
            TurnOverride::ForcePaused => EnabledState::Paused,
        }
    }

    /// Core update. Reconciles the turn offset against the desired rotation
    /// and writes the character's new simulated rotation.
    ///
    /// `is_client_simulation` marks a non-authoritative extrapolation pass:
    /// the offset is not reseeded from the rotation delta (only curve decay
    /// runs) and no rotation is written.
    pub fn turn_in_place<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        current: Orientation,
        desired: Orientation,
        is_client_simulation: bool,
    ) {
        let params = self.params(ctx);
        let state = self.enabled_state(ctx, &params);
        if state == EnabledState::Locked {
            self.turn_offset = 0.0;
            self.curve_value = 0.0;
            return;
        }

        if !is_client_simulation {
            // Recompute from scratch; the caller has already applied any
            // velocity-driven rotation this tick.
            self.turn_offset = 0.0;
            self.interp_out_alpha = 0.0;
            if state != EnabledState::Paused {
                self.turn_offset = signed_delta(desired.yaw, current.yaw);
            }
        }

        self.apply_curve_feedback(self.curve_values(ctx));

        // Clamping prevents under-rotating relative to the control rotation,
        // which would leave the character insufficiently facing the camera.
        let mode = self.turn_mode(ctx);
        let max_turn_angle = match params.turn_angles(mode) {
            Some(angles) => angles.max_turn_angle,
            None => {
                log::warn!("no turn angles configured for {mode:?}");
                0.0
            }
        };
        if max_turn_angle > 0.0 && self.turn_offset.abs() > max_turn_angle {
            self.turn_offset = self.turn_offset.clamp(-max_turn_angle, max_turn_angle);
        }

        if is_client_simulation {
            return;
        }

        // Advance the simulated yaw only by the portion of the desired
        // rotation not absorbed into the offset.
        let actor_turn_yaw = signed_delta(desired.yaw, self.turn_offset + current.yaw);
        let new_rotation = current.with_yaw(normalize_axis(current.yaw + actor_turn_yaw));
        if !new_rotation.is_finite() || !self.turn_offset.is_finite() {
            log::error!(
                "turn in place produced a non-finite rotation (desired yaw {}), applying zero rotation",
                desired.yaw
            );
            self.turn_offset = 0.0;
            self.last_applied_turn_yaw = 0.0;
            return;
        }
        self.last_applied_turn_yaw = actor_turn_yaw;

        let sweep = needs_rotation_sweep(self.sweep_handling, current, new_rotation);
        ctx.set_actor_rotation(new_rotation, sweep);

        log::trace!(
            "turn in place: curve {:.2} offset {:.2} applied yaw {:.2}",
            self.curve_value,
            self.turn_offset,
            actor_turn_yaw
        );
    }

    /// Applies the yaw the turn animation contributed since last tick.
    fn apply_curve_feedback(&mut self, curves: CurveValues) {
        let mut last_curve_value = self.curve_value;

        if !curves.is_relevant() {
            self.curve_value = 0.0;
            self.last_curve_valid = false;
            return;
        }

        self.curve_value = curves.remaining_turn_yaw * curves.turn_yaw_weight;

        // Suppress the delta when the curve first becomes relevant again,
        // otherwise the full curve value lands in a single tick.
        if !self.last_curve_valid {
            self.curve_value = 0.0;
            last_curve_value = 0.0;
        }
        self.last_curve_valid = true;

        // A strict sign flip is a direction reversal; drop the delta for this
        // tick so the offset does not snap. Zero matches either direction.
        let reversal = self.curve_value != 0.0
            && last_curve_value != 0.0
            && (self.curve_value > 0.0) != (last_curve_value > 0.0);
        if reversal {
            return;
        }

        // Exceeding 180 degrees would wrap past the far side of the circle
        // and present as a snap. Hold the offset and let the animation remove
        // the excess.
        let candidate = self.turn_offset + (self.curve_value - last_curve_value);
        if candidate.abs() <= MAX_ACCUMULATED_OFFSET_DEG {
            self.turn_offset = candidate;
        }
    }

    /// Instant rotation path. Returns whether rotation was handled; `false`
    /// asks the caller to apply its own default facing logic.
    pub fn face_rotation<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        new_control_rotation: Orientation,
        dt: f32,
    ) -> bool {
        let config = ctx.rotation_config();
        if turn_method(&config) != TurnMethod::FaceRotation {
            return true;
        }

        if !self.has_valid_data() {
            self.turn_offset = 0.0;
            self.curve_value = 0.0;
            return true;
        }

        let params = self.params(ctx);
        let state = self.enabled_state(ctx, &params);
        if state == EnabledState::Paused {
            self.turn_offset = 0.0;
            self.curve_value = 0.0;
            return false;
        }

        let current = ctx.actor_rotation().normalized();

        if ctx.is_stationary() {
            self.turn_in_place(ctx, current, new_control_rotation, false);
            return true;
        }

        self.turn_offset = 0.0;

        // Moving: interpolate toward the control rotation instead of snapping,
        // so the leftover visual offset eases away.
        let mut new_rotation = new_control_rotation;
        if !config.use_controller_rotation_pitch
            && !config.use_controller_rotation_yaw
            && !config.use_controller_rotation_roll
        {
            return true;
        }

        if !config.use_controller_rotation_pitch {
            new_rotation.pitch = current.pitch;
        }
        if config.use_controller_rotation_yaw {
            self.interp_out_alpha =
                interp_constant_to(self.interp_out_alpha, 1.0, dt, params.moving_interp_out_rate);
            new_rotation.yaw = slerp_yaw(current.yaw, new_rotation.yaw, self.interp_out_alpha);
        } else {
            new_rotation.yaw = current.yaw;
        }
        if !config.use_controller_rotation_roll {
            new_rotation.roll = current.roll;
        }

        if !new_rotation.is_finite() {
            log::error!(
                "face rotation produced a non-finite rotation (control yaw {}), applying zero rotation",
                new_control_rotation.yaw
            );
            return true;
        }

        let sweep = needs_rotation_sweep(self.sweep_handling, current, new_rotation);
        ctx.set_actor_rotation(new_rotation, sweep);
        true
    }

    /// Interpolated rotation path. Returns whether rotation was handled;
    /// `false` hands control back to the host's smooth rotation logic.
    pub fn physics_rotation<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        rotate_to_last_input: bool,
        last_input_vector: Vec3,
    ) -> bool {
        let config = ctx.rotation_config();
        if turn_method(&config) != TurnMethod::PhysicsRotation {
            return false;
        }

        if !self.has_valid_data() {
            self.turn_offset = 0.0;
            self.curve_value = 0.0;
            return true;
        }

        let params = self.params(ctx);
        let state = self.enabled_state(ctx, &params);
        if state == EnabledState::Paused {
            self.turn_offset = 0.0;
            self.curve_value = 0.0;
            return false;
        }

        let current = ctx.actor_rotation().normalized();

        if ctx.is_stationary() {
            if rotate_to_last_input && config.orient_rotation_to_movement {
                let yaw = yaw_from_direction(last_input_vector).unwrap_or(0.0);
                self.turn_in_place(ctx, current, Orientation::yaw_only(yaw), false);
            } else if config.use_controller_desired_rotation {
                if let Some(desired) = ctx.desired_controller_rotation() {
                    self.turn_in_place(ctx, current, desired, false);
                } else if config.run_physics_with_no_controller {
                    // No possessing controller; try one from the owner chain.
                    if let Some(desired) = ctx.fallback_controller_rotation() {
                        self.turn_in_place(ctx, current, desired, false);
                    }
                }
            }
            return true;
        }

        // Moving: cull the offset, it is recalculated when we stop.
        self.turn_offset = 0.0;
        false
    }

    /// Local extrapolation for simulated proxies between replication updates.
    ///
    /// Runs the core update with zero rotations so only curve decay applies,
    /// keeping the observed turn progressing when the server replicates at a
    /// low frequency. A received offset always overwrites this.
    pub fn simulate_turn_in_place<C: TurnContext + ?Sized>(&mut self, ctx: &mut C) {
        if ctx.local_role() != crate::context::NetRole::SimulatedProxy {
            return;
        }
        if !self.has_valid_data() || !ctx.is_stationary() {
            return;
        }
        self.turn_in_place(ctx, Orientation::ZERO, Orientation::ZERO, true);
    }
}
