/*!
Replicated turn offset.

The wire payload is one `u16` per character, produced on the authority only
when the offset has rotationally changed since the last push, and consumed on
simulated proxies only. The transport itself is external: it polls
[`TurnInPlace::take_replication`] for a dirty payload and delivers received
payloads through [`TurnInPlace::on_replicated_offset`].
*/

use crate::component::TurnInPlace;
use crate::context::{NetMode, NetRole, TurnContext};
use shared::{compress_axis_to_u16, decompress_axis_from_u16, has_turn_offset_changed};

/// The quantized turn offset as it travels on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulatedTurnOffset {
    code: u16,
}

impl SimulatedTurnOffset {
    pub fn compress(&mut self, angle_deg: f32) {
        self.code = compress_axis_to_u16(angle_deg);
    }

    pub fn decompress(&self) -> f32 {
        decompress_axis_from_u16(self.code)
    }

    pub fn code(&self) -> u16 {
        self.code
    }
}

impl TurnInPlace {
    /// Post-update replication step. Call after either rotation path ran,
    /// passing the offset captured before the update.
    pub fn post_turn_in_place<C: TurnContext + ?Sized>(&mut self, ctx: &C, last_turn_offset: f32) {
        self.compress_simulated_turn_offset(ctx, last_turn_offset);
    }

    /// Authority-only push gate. Values that differ as floats but are
    /// rotationally indistinguishable do not generate traffic.
    fn compress_simulated_turn_offset<C: TurnContext + ?Sized>(
        &mut self,
        ctx: &C,
        last_turn_offset: f32,
    ) {
        if !ctx.has_authority() || ctx.net_mode() == NetMode::Standalone {
            return;
        }
        if has_turn_offset_changed(self.turn_offset, last_turn_offset) {
            self.simulated_turn_offset.compress(self.turn_offset);
            self.replication_dirty = true;
        }
    }

    /// Dirty payload for the transport, if any. Clears the dirty mark.
    pub fn take_replication(&mut self) -> Option<u16> {
        if self.replication_dirty {
            self.replication_dirty = false;
            Some(self.simulated_turn_offset.code())
        } else {
            None
        }
    }

    /// Applies a received payload. Only simulated proxies accept it; the
    /// decompressed value overwrites any locally extrapolated offset without
    /// running the update algorithm.
    pub fn on_replicated_offset<C: TurnContext + ?Sized>(&mut self, ctx: &C, code: u16) {
        if ctx.local_role() != NetRole::SimulatedProxy || !self.has_valid_data() {
            return;
        }
        let mut incoming = SimulatedTurnOffset::default();
        incoming.code = code;
        self.turn_offset = incoming.decompress();
    }
}
