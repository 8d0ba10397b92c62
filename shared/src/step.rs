/*!
Turn step animation selection.

Given the accumulated turn offset, picks which prerecorded step animation to
play (60, 90, 180 degree turns and so on), at what playback rate, and keeps
per-node graph state for hosts that drive an animation state machine from
these decisions. Everything here is pure and thread safe; animation workers
may call it off the game thread.
*/

use crate::params::{SelectMode, TurnAngles, TurnAnimSet, TurnParams};

/// Result of step selection: which step animation, turning which way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSelection {
    /// Index into the anim set's left or right turn clip list.
    pub step_index: usize,
    /// Positive turn offset means the body must catch up by turning right.
    pub turn_right: bool,
}

/// Picks the step animation for the given signed turn angle.
///
/// The configured `select_offset` inflates the angle before matching, which
/// biases selection toward larger steps. `Greater` picks the largest step not
/// exceeding the angle and falls back to the smallest; `Nearest` picks the
/// closest step, first match winning ties.
pub fn determine_step_size(params: &TurnParams, angle: f32) -> StepSelection {
    let turn_right = angle > 0.0;
    let step_angle = angle.abs() + params.select_offset;
    let mut step_index = 0;

    match params.select_mode {
        SelectMode::Greater => {
            for (i, &size) in params.step_sizes.iter().enumerate().rev() {
                if step_angle >= size as f32 {
                    step_index = i;
                    break;
                }
            }
        }
        SelectMode::Nearest => {
            let mut best_diff = f32::INFINITY;
            for (i, &size) in params.step_sizes.iter().enumerate() {
                let diff = (step_angle - size as f32).abs();
                if diff < best_diff {
                    best_diff = diff;
                    step_index = i;
                }
            }
        }
    }

    StepSelection {
        step_index,
        turn_right,
    }
}

/// Resolves a step selection to a clip from the anim set, or `None` when the
/// set has no clip at that index.
#[inline]
pub fn select_turn_clip(anim_set: &TurnAnimSet, selection: StepSelection) -> Option<crate::params::ClipId> {
    let clips = if selection.turn_right {
        &anim_set.right_turns
    } else {
        &anim_set.left_turns
    };
    clips.get(selection.step_index).copied()
}

/// Playback rate for the current turn, and whether the offset sits at the
/// configured max angle.
///
/// The rate starts at 1.0 and only ever increases: being clamped at the max
/// angle and reversing direction mid-turn each impose a floor, and the higher
/// floor wins. A max angle of zero disables the clamp entirely, so it can
/// never count as reached.
pub fn turn_play_rate(
    anim_set: &TurnAnimSet,
    turn_offset: f32,
    turn_angles: Option<&TurnAngles>,
    is_turning: bool,
    is_turning_right: bool,
) -> (f32, bool) {
    let mut play_rate = 1.0_f32;

    let at_max_angle = turn_angles.is_some_and(|angles| {
        angles.max_turn_angle > 0.0 && turn_offset.abs() >= angles.max_turn_angle
    });
    if at_max_angle {
        play_rate = play_rate.max(anim_set.play_rate_at_max_angle);
    }

    // A new turn triggered opposite to the one in progress plays the stale
    // animation out faster.
    let direction_change = is_turning && (turn_offset > 0.0) != is_turning_right;
    if direction_change {
        play_rate = play_rate.max(anim_set.play_rate_on_direction_change);
    }

    (play_rate, at_max_angle)
}

/// Per-node state for a turn-in-place animation graph node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphNodeData {
    pub step_index: usize,
    /// Playback position within the selected clip, in seconds.
    pub anim_state_time: f32,
    pub turn_play_rate: f32,
    /// Latched while a turn that touched the max angle is still playing.
    pub has_reached_max_turn_angle: bool,
    pub is_turning_right: bool,
    /// Direction of the turn whose recovery is currently playing.
    pub is_recovery_turning_right: bool,
}

/// Updates the node's play rate from the current offset, latching the
/// max-angle rate for the remainder of the turn when configured.
///
/// Without the latch, mouse-driven view rotation rapidly enters and leaves
/// the clamp and the play rate flickers between the two values.
pub fn update_turn_node_play_rate(
    node: &mut GraphNodeData,
    anim_set: &TurnAnimSet,
    turn_offset: f32,
    turn_angles: Option<&TurnAngles>,
    is_turning: bool,
) {
    let (mut play_rate, at_max_angle) = turn_play_rate(
        anim_set,
        turn_offset,
        turn_angles,
        is_turning,
        node.is_turning_right,
    );

    if at_max_angle {
        node.has_reached_max_turn_angle = true;
    } else if !is_turning {
        node.has_reached_max_turn_angle = false;
    }

    if anim_set.maintain_max_angle_play_rate && node.has_reached_max_turn_angle {
        play_rate = play_rate.max(anim_set.play_rate_at_max_angle);
    }

    node.turn_play_rate = play_rate;
}

/// Advances a clip's playback position, capped at the end of the clip.
///
/// `rate_scale` is the clip's own authored rate; `play_rate` is the turn
/// system's modifier on top of it.
#[inline]
pub fn advance_anim_time(current: f32, dt: f32, play_rate: f32, rate_scale: f32, play_length: f32) -> f32 {
    (current + dt * play_rate * rate_scale).min(play_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ClipId;

    fn params_with_steps() -> TurnParams {
        TurnParams::default() // step sizes 60, 90, 180
    }

    #[test]
    fn greater_picks_largest_step_not_exceeding_the_angle() {
        let params = params_with_steps();
        // 95 degrees clears the 90 step but not the 180 step.
        let sel = determine_step_size(&params, 95.0);
        assert_eq!(sel.step_index, 1);
        assert!(sel.turn_right);
    }

    #[test]
    fn greater_falls_back_to_smallest_step_below_all_sizes() {
        let params = params_with_steps();
        let sel = determine_step_size(&params, -45.0);
        assert_eq!(sel.step_index, 0);
        assert!(!sel.turn_right);
    }

    #[test]
    fn nearest_picks_closest_step_first_on_ties() {
        let mut params = params_with_steps();
        params.select_mode = SelectMode::Nearest;
        // 175 is closer to 180 than to 90.
        assert_eq!(determine_step_size(&params, 175.0).step_index, 2);
        // 75 is equidistant from 60 and 90; first match wins.
        assert_eq!(determine_step_size(&params, 75.0).step_index, 0);
    }

    #[test]
    fn select_offset_inflates_the_matched_angle() {
        let mut params = params_with_steps();
        params.select_offset = 30.0;
        // 65 + 30 clears the 90 step.
        assert_eq!(determine_step_size(&params, 65.0).step_index, 1);
    }

    #[test]
    fn clip_lookup_respects_direction_and_bounds() {
        let mut anim_set = TurnAnimSet::default();
        anim_set.left_turns = vec![ClipId(1), ClipId(2)];
        anim_set.right_turns = vec![ClipId(3)];

        let left = StepSelection {
            step_index: 1,
            turn_right: false,
        };
        let right_missing = StepSelection {
            step_index: 1,
            turn_right: true,
        };
        assert_eq!(select_turn_clip(&anim_set, left), Some(ClipId(2)));
        assert_eq!(select_turn_clip(&anim_set, right_missing), None);
    }

    #[test]
    fn play_rate_floors_stack_and_higher_wins() {
        let anim_set = TurnAnimSet::default();
        let clamp = TurnAngles::new(60.0, 135.0);

        // At the clamp, not reversing.
        let (rate, at_max) = turn_play_rate(&anim_set, 135.0, Some(&clamp), false, true);
        assert_eq!(rate, anim_set.play_rate_at_max_angle);
        assert!(at_max);

        // At the clamp and reversing; direction-change rate is higher.
        let (rate, _) = turn_play_rate(&anim_set, 135.0, Some(&clamp), true, false);
        assert_eq!(rate, anim_set.play_rate_on_direction_change);
    }

    #[test]
    fn zero_max_angle_never_counts_as_reached() {
        let anim_set = TurnAnimSet::default();
        let unclamped = TurnAngles::new(60.0, 0.0);
        let (rate, at_max) = turn_play_rate(&anim_set, 170.0, Some(&unclamped), false, true);
        assert_eq!(rate, 1.0);
        assert!(!at_max);
    }

    #[test]
    fn max_angle_play_rate_latches_until_the_turn_ends() {
        let anim_set = TurnAnimSet::default();
        let clamp = TurnAngles::new(60.0, 135.0);
        let mut node = GraphNodeData {
            is_turning_right: true,
            ..GraphNodeData::default()
        };

        update_turn_node_play_rate(&mut node, &anim_set, 135.0, Some(&clamp), true);
        assert!(node.has_reached_max_turn_angle);

        // Offset drops below the clamp while the turn still plays; the rate
        // must not drop with it.
        update_turn_node_play_rate(&mut node, &anim_set, 40.0, Some(&clamp), true);
        assert_eq!(node.turn_play_rate, anim_set.play_rate_at_max_angle);

        // Turn finished; the latch releases.
        update_turn_node_play_rate(&mut node, &anim_set, 0.0, Some(&clamp), false);
        assert!(!node.has_reached_max_turn_angle);
        assert_eq!(node.turn_play_rate, 1.0);
    }

    #[test]
    fn anim_time_advances_scaled_and_caps_at_clip_end() {
        let t = advance_anim_time(0.5, 0.1, 1.3, 1.0, 2.0);
        assert!((t - 0.63).abs() < 1.0e-6);
        assert_eq!(advance_anim_time(1.95, 0.1, 1.0, 1.0, 2.0), 2.0);
    }
}
