/*!
Turn-in-place rotation reconciliation for networked characters.

The central idea is a per-character turn offset, a signed yaw in degrees that
decouples the mesh's visual facing from the simulated rotation. While a
character stands still the simulated rotation tracks the desired facing
immediately and the offset absorbs the difference; turn animations then report
progress through curves and the offset decays as the mesh visibly rotates.

[`TurnInPlace`] owns the offset and the core update. Hosts integrate it by
implementing [`TurnContext`] and [`AnimationTurnSource`], routing their
rotation tick through [`TurnMovement`], and wiring the animation graph with
[`process_anim_graph`]. Dedicated servers without animation evaluation run the
pseudo state machine instead, and the prediction and replication modules cover
the networking seams.

Shared math, parameters, and the step-selection policy live in the `shared`
crate so server and client binaries agree on them.
*/

mod component;
mod context;
mod graph;
mod movement;
mod prediction;
mod pseudo;
mod replication;

pub use component::{TurnInPlace, is_montage_ignored};
pub use context::{
    AnimationTurnSource, MontageInfo, NetMode, NetRole, RotationConfig, TurnContext, TurnMethod,
    turn_method,
};
pub use graph::{AnimGraphData, AnimGraphOutput, process_anim_graph};
pub use movement::TurnMovement;
pub use prediction::{CombineResult, CombinedMove, SavedTurnMove, combine_moves};
pub use pseudo::PseudoAnimState;
pub use replication::SimulatedTurnOffset;
