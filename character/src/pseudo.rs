/*!
Pseudo animation state for dedicated servers.

A server that never ticks meshes has no animation curves to feed the turn
algorithm, so the offset would stick at its seeded value. This module runs a
minimal Idle / TurnInPlace / Recovery state machine instead: it picks the same
clip the client's graph would, advances a local playback time with the shared
play-rate policy, and samples the clip's curves directly through the animation
source. Selected with [`shared::AnimUpdateMode::Pseudo`].
*/

use crate::component::TurnInPlace;
use crate::context::{AnimationTurnSource, TurnContext};
use crate::graph::{AnimGraphData, AnimGraphOutput};
use shared::{
    ClipId, CurveValues, GraphNodeData, StepSelection, TurnSettings, advance_anim_time,
    select_turn_clip, update_turn_node_play_rate,
};

/// State the pseudo animation is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PseudoAnimState {
    #[default]
    Idle,
    TurnInPlace,
    Recovery,
}

#[derive(Clone, Debug)]
pub(crate) struct PseudoAnim {
    pub state: PseudoAnimState,
    pub node: GraphNodeData,
    pub clip: Option<ClipId>,
}

impl PseudoAnim {
    pub(crate) fn new() -> Self {
        Self {
            state: PseudoAnimState::Idle,
            node: GraphNodeData {
                turn_play_rate: 1.0,
                ..GraphNodeData::default()
            },
            clip: None,
        }
    }

    /// Curve feedback from the pseudo-evaluated clip, when one is playing.
    pub(crate) fn curve_values(
        &self,
        anim: &dyn AnimationTurnSource,
        settings: &TurnSettings,
    ) -> Option<CurveValues> {
        let clip = self.clip?;
        let time = self.node.anim_state_time;
        Some(CurveValues::new(
            anim.evaluate_clip_curve(clip, &settings.turn_yaw_curve_name, time),
            anim.evaluate_clip_curve(clip, &settings.turn_weight_curve_name, time),
        ))
    }

    fn turn_clip(&self, data: &AnimGraphData, recovery: bool) -> Option<ClipId> {
        let turn_right = if recovery {
            self.node.is_recovery_turning_right
        } else {
            self.node.is_turning_right
        };
        select_turn_clip(
            &data.anim_set,
            StepSelection {
                step_index: self.node.step_index,
                turn_right,
            },
        )
    }

    fn update_play_rate(&mut self, data: &AnimGraphData) {
        update_turn_node_play_rate(
            &mut self.node,
            &data.anim_set,
            data.turn_offset,
            data.turn_angles.as_ref(),
            data.is_turning,
        );
    }

    pub(crate) fn update(
        &mut self,
        anim: &dyn AnimationTurnSource,
        dt: f32,
        data: &AnimGraphData,
        output: &AnimGraphOutput,
    ) {
        match self.state {
            PseudoAnimState::Idle => {
                if output.wants_to_turn {
                    self.state = PseudoAnimState::TurnInPlace;
                    self.node.step_index = data.step.step_index;
                    self.node.is_turning_right = data.step.turn_right;
                    self.node.anim_state_time = 0.0;
                    self.node.has_reached_max_turn_angle = false;
                    self.clip = self.turn_clip(data, false);
                    self.update_play_rate(data);
                }
            }
            PseudoAnimState::TurnInPlace => {
                if output.wants_turn_recovery {
                    // Playback time carries over into the recovery tail.
                    self.state = PseudoAnimState::Recovery;
                    self.node.is_recovery_turning_right = self.node.is_turning_right;
                    self.clip = self.turn_clip(data, true);
                } else {
                    self.clip = self.turn_clip(data, false);
                    if let Some(clip) = self.clip {
                        self.node.anim_state_time = advance_anim_time(
                            self.node.anim_state_time,
                            dt,
                            self.node.turn_play_rate,
                            anim.clip_rate_scale(clip),
                            anim.clip_play_length(clip),
                        );
                    }
                    self.update_play_rate(data);
                }
            }
            PseudoAnimState::Recovery => {
                self.clip = self.turn_clip(data, true);
                if let Some(clip) = self.clip {
                    // Recovery plays at 1x speed.
                    self.node.anim_state_time = advance_anim_time(
                        self.node.anim_state_time,
                        dt,
                        1.0,
                        anim.clip_rate_scale(clip),
                        anim.clip_play_length(clip),
                    );
                    if self.node.anim_state_time >= anim.clip_play_length(clip) {
                        self.state = PseudoAnimState::Idle;
                        self.node.turn_play_rate = 1.0;
                        self.node.has_reached_max_turn_angle = false;
                    }
                }
            }
        }
    }
}

impl TurnInPlace {
    /// Current pseudo animation state. Idle unless pseudo updates are active.
    pub fn pseudo_anim_state(&self) -> PseudoAnimState {
        self.pseudo.state
    }

    /// Advances the pseudo animation state machine. Call once per tick after
    /// capturing and processing the anim graph snapshot; a no-op unless this
    /// process is a dedicated server configured for pseudo updates.
    pub fn update_pseudo_anim_state<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &C,
        dt: f32,
        data: &AnimGraphData,
        output: &AnimGraphOutput,
    ) {
        if !self.wants_pseudo_anim_state(ctx) || !self.has_valid_data() {
            return;
        }
        let Some(anim) = ctx.animation() else {
            return;
        };
        self.pseudo.update(anim, dt, data, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NetMode;
    use crate::context::testing::MockContext;
    use crate::graph::process_anim_graph;
    use shared::{AnimUpdateMode, Orientation};

    fn pseudo_server() -> (MockContext, TurnInPlace) {
        let mut ctx = MockContext::stationary();
        ctx.net_mode = NetMode::DedicatedServer;
        let anim = ctx.anim_mut();
        anim.anim_set.left_turns = vec![ClipId(10), ClipId(11), ClipId(12)];
        anim.anim_set.right_turns = vec![ClipId(20), ClipId(21), ClipId(22)];
        anim.clip_length = 1.0;
        anim.clip_start_yaw = -90.0;
        anim.recovery_fraction = 0.8;

        let mut turn = TurnInPlace::new();
        turn.anim_update_mode = AnimUpdateMode::Pseudo;
        turn.bind_animation(&ctx);
        (ctx, turn)
    }

    fn tick_graph(turn: &mut TurnInPlace, ctx: &MockContext, dt: f32) {
        let data = turn.update_anim_graph_data(ctx);
        let output = process_anim_graph(&data, true);
        turn.update_pseudo_anim_state(ctx, dt, &data, &output);
    }

    #[test]
    fn turn_starts_and_plays_the_selected_clip() {
        let (mut ctx, mut turn) = pseudo_server();

        // Seed a 95 degree right turn; step index 1 selects the 90 clip.
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(95.0), false);
        tick_graph(&mut turn, &ctx, 0.1);
        assert_eq!(turn.pseudo_anim_state(), PseudoAnimState::TurnInPlace);
        assert_eq!(turn.pseudo.clip, Some(ClipId(21)));
        assert_eq!(turn.pseudo.node.anim_state_time, 0.0);

        // Subsequent ticks advance playback.
        tick_graph(&mut turn, &ctx, 0.1);
        assert!(turn.pseudo.node.anim_state_time > 0.0);
    }

    #[test]
    fn pseudo_curves_feed_the_core_update() {
        let (mut ctx, mut turn) = pseudo_server();
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(95.0), false);
        tick_graph(&mut turn, &ctx, 0.25);
        tick_graph(&mut turn, &ctx, 0.25);

        // The clip is mid-playback, so the sampled weight is live and the
        // component counts as turning from pseudo evaluation alone.
        assert!(turn.is_turning_in_place(&ctx));
    }

    #[test]
    fn recovery_completes_back_to_idle_at_normal_rate() {
        let (mut ctx, mut turn) = pseudo_server();
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(95.0), false);
        tick_graph(&mut turn, &ctx, 0.1);

        // Advance playback into the weight-silent recovery region.
        for _ in 0..9 {
            tick_graph(&mut turn, &ctx, 0.1);
        }
        assert_eq!(turn.pseudo_anim_state(), PseudoAnimState::Recovery);
        assert_eq!(turn.pseudo.node.turn_play_rate, 1.0);

        // The turn finished removing the offset; recovery runs the clip out
        // and resets to idle.
        turn.restore_turn_offset(0.0);
        for _ in 0..12 {
            tick_graph(&mut turn, &ctx, 0.1);
        }
        assert_eq!(turn.pseudo_anim_state(), PseudoAnimState::Idle);
        assert!(!turn.pseudo.node.has_reached_max_turn_angle);
    }

    #[test]
    fn pseudo_updates_are_inert_off_the_dedicated_server() {
        let (mut ctx, mut turn) = pseudo_server();
        ctx.net_mode = NetMode::Standalone;
        turn.turn_in_place(&mut ctx, Orientation::ZERO, Orientation::yaw_only(95.0), false);
        tick_graph(&mut turn, &ctx, 0.1);
        assert_eq!(turn.pseudo_anim_state(), PseudoAnimState::Idle);
    }
}
