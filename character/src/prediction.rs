/*!
Client-side prediction bookkeeping.

Predicting clients record the turn offset at the boundaries of every saved
move. Two rules keep the visual turn identical to the server's view:

- a move whose offset materially changed must never be combined with its
  neighbor, otherwise the collapsed replay applies roughly half the rotation
  locally;
- when the host does combine moves, it resets rotation to the old move's start
  rotation, which silently discards the turn yaw that move applied. The yaw
  must be re-added on top of the start rotation before replay continues.
*/

use crate::component::TurnInPlace;
use shared::{Orientation, has_turn_offset_changed, quat_yaw, yaw_quat};

/// Turn state captured at the boundaries of one predicted move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SavedTurnMove {
    /// Simulated rotation at the start of the move.
    pub start_rotation: Orientation,
    pub start_turn_offset: f32,
    pub end_turn_offset: f32,
    /// Yaw the core update applied to the character during the move.
    pub last_applied_turn_yaw: f32,
}

impl SavedTurnMove {
    /// Captures the state at move start.
    pub fn capture_start(turn: &TurnInPlace, start_rotation: Orientation) -> Self {
        Self {
            start_rotation,
            start_turn_offset: turn.turn_offset(),
            end_turn_offset: turn.turn_offset(),
            last_applied_turn_yaw: turn.last_applied_turn_yaw(),
        }
    }

    /// Captures the state at move end.
    pub fn capture_end(&mut self, turn: &TurnInPlace) {
        self.end_turn_offset = turn.turn_offset();
        self.last_applied_turn_yaw = turn.last_applied_turn_yaw();
    }

    /// Whether the offset rotationally changed during this move.
    pub fn offset_changed(&self) -> bool {
        has_turn_offset_changed(self.end_turn_offset, self.start_turn_offset)
    }
}

/// Result of combining an older saved move with a newer one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CombineResult {
    Combined(CombinedMove),
    /// The old move must replay on its own.
    Rejected,
}

/// Replacement start state for the merged move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombinedMove {
    /// Old start rotation with the old move's applied turn yaw re-added.
    pub start_rotation: Orientation,
    /// Offset to restore before replaying the merged move.
    pub turn_offset: f32,
}

/// Combines two adjacent saved moves, or rejects the combination when the
/// older move carried a material offset change.
pub fn combine_moves(old: &SavedTurnMove, _new: &SavedTurnMove) -> CombineResult {
    if old.offset_changed() {
        return CombineResult::Rejected;
    }

    // The host resets rotation to the old move's start; compose the old
    // applied turn yaw back on top through quaternions so the seam is safe.
    let restored = yaw_quat(old.start_rotation.yaw) * yaw_quat(old.last_applied_turn_yaw);
    CombineResult::Combined(CombinedMove {
        start_rotation: old.start_rotation.with_yaw(quat_yaw(&restored)).normalized(),
        turn_offset: old.start_turn_offset,
    })
}

impl TurnInPlace {
    /// Restores turn state from a combined move before replay continues.
    pub fn apply_combined_move(&mut self, combined: &CombinedMove) {
        self.restore_turn_offset(combined.turn_offset);
    }
}
