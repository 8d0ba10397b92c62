/*!
Per-tick snapshot for the animation graph.

[`TurnInPlace::update_anim_graph_data`] is the main-thread capture step; the
snapshot it returns is immutable and safe to hand to an animation worker.
[`process_anim_graph`] turns the snapshot into the transition flags a
locomotion graph consumes. Nothing here mutates component state.
*/

use crate::component::TurnInPlace;
use crate::context::TurnContext;
use shared::{
    EnabledState, StepSelection, TurnAngles, TurnAnimSet, TurnMode, TurnSettings,
    determine_step_size,
};

/// Snapshot of everything the animation graph needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct AnimGraphData {
    pub anim_set: TurnAnimSet,
    pub settings: TurnSettings,
    pub turn_offset: f32,
    /// Weight curve is currently relevant.
    pub is_turning: bool,
    pub step: StepSelection,
    pub turn_mode: TurnMode,
    /// Angles for the current turn mode; `None` on a configuration fault.
    pub turn_angles: Option<TurnAngles>,
    /// Offset passed the min turn angle and turning is not locked.
    pub wants_to_turn: bool,
    pub wants_pseudo_anim_state: bool,
}

/// Transition flags produced from a frame's snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimGraphOutput {
    pub turn_offset: f32,
    pub wants_to_turn: bool,
    /// The turn animation stopped rotating; play out its recovery tail.
    pub wants_turn_recovery: bool,
    pub transition_start_to_cycle_from_turn: bool,
    pub transition_stop_to_idle_for_turn: bool,
    pub play_turn_anim: bool,
}

impl TurnInPlace {
    /// Main-thread capture of the animation graph snapshot.
    pub fn update_anim_graph_data<C: TurnContext + ?Sized>(&self, ctx: &C) -> AnimGraphData {
        let mut data = AnimGraphData::default();
        if !self.has_valid_data() {
            return data;
        }
        let Some(anim) = ctx.animation() else {
            return data;
        };

        data.anim_set = anim.anim_set();
        data.settings = self.settings.clone();
        let params = &data.anim_set.params;
        let state = self.enabled_state(ctx, params);

        data.turn_offset = self.turn_offset();
        data.is_turning = self.is_turning_in_place(ctx);
        data.turn_mode = self.turn_mode(ctx);
        data.wants_pseudo_anim_state = self.wants_pseudo_anim_state(ctx);

        if params.step_sizes.is_empty() {
            log::warn!("no step sizes configured, turn animation selection falls back to index 0");
        }
        data.step = determine_step_size(params, self.turn_offset());

        match params.turn_angles(data.turn_mode) {
            Some(angles) => {
                data.turn_angles = Some(*angles);
                data.wants_to_turn = state != EnabledState::Locked
                    && !params.step_sizes.is_empty()
                    && self.turn_offset().abs() >= angles.min_turn_angle;
            }
            None => {
                log::warn!("no turn angles configured for {:?}", data.turn_mode);
            }
        }

        data
    }
}

/// Thread-safe processing step: derives the locomotion transitions from a
/// snapshot captured earlier in the frame.
pub fn process_anim_graph(data: &AnimGraphData, is_strafing: bool) -> AnimGraphOutput {
    let min_turn_angle = data
        .turn_angles
        .map(|angles| angles.min_turn_angle)
        .unwrap_or(0.0);

    AnimGraphOutput {
        turn_offset: data.turn_offset,
        wants_to_turn: data.wants_to_turn,
        wants_turn_recovery: !data.is_turning,
        transition_start_to_cycle_from_turn: is_strafing
            && data.turn_angles.is_some()
            && data.turn_offset.abs() > min_turn_angle,
        transition_stop_to_idle_for_turn: data.is_turning || data.wants_to_turn,
        play_turn_anim: data.wants_to_turn && !data.wants_pseudo_anim_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::MockContext;
    use shared::{CurveValues, Orientation, TurnOverride};

    fn turning_component(ctx: &MockContext) -> TurnInPlace {
        let mut turn = TurnInPlace::new();
        turn.bind_animation(ctx);
        turn
    }

    #[test]
    fn snapshot_reports_wanting_to_turn_past_the_min_angle() {
        let mut ctx = MockContext::stationary();
        let mut turn = turning_component(&ctx);

        // Below the 60 degree min angle.
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(30.0), false);
        let data = turn.update_anim_graph_data(&ctx);
        assert!(!data.wants_to_turn);

        // Past it.
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(95.0), false);
        let data = turn.update_anim_graph_data(&ctx);
        assert!(data.wants_to_turn);
        assert_eq!(data.step.step_index, 1);
        assert!(data.step.turn_right);
    }

    #[test]
    fn locked_state_never_wants_to_turn() {
        let mut ctx = MockContext::stationary();
        ctx.debug_override = TurnOverride::ForceLocked;
        let turn = turning_component(&ctx);
        let data = turn.update_anim_graph_data(&ctx);
        assert!(!data.wants_to_turn);
    }

    #[test]
    fn recovery_follows_the_weight_curve() {
        let mut ctx = MockContext::stationary();
        let mut turn = turning_component(&ctx);
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(95.0), false);

        // Weight live: turning, no recovery.
        ctx.anim_mut().curves = CurveValues::new(40.0, 1.0);
        let output = process_anim_graph(&turn.update_anim_graph_data(&ctx), true);
        assert!(!output.wants_turn_recovery);
        assert!(output.transition_stop_to_idle_for_turn);
        assert!(output.transition_start_to_cycle_from_turn);
        assert!(output.play_turn_anim);

        // Weight dropped: recovery.
        ctx.anim_mut().curves = CurveValues::ZERO;
        let output = process_anim_graph(&turn.update_anim_graph_data(&ctx), true);
        assert!(output.wants_turn_recovery);
    }

    #[test]
    fn unbound_component_yields_an_inert_snapshot() {
        let mut ctx = MockContext::stationary();
        ctx.animation = None;
        let turn = turning_component(&ctx);
        let data = turn.update_anim_graph_data(&ctx);
        assert!(!data.wants_to_turn);
        assert_eq!(process_anim_graph(&data, true), AnimGraphOutput {
            wants_turn_recovery: true,
            transition_stop_to_idle_for_turn: false,
            ..AnimGraphOutput::default()
        });
    }
}
