use crate::core::wire::{WireDecode, WireEncode};
use bytes::{Buf, BufMut, BytesMut};

/// Current tick announcement returned for `RequestCurrentTickInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInfo {
    pub tick_duration: u16,
    pub epoch: u16,
    pub tick: u32,
    pub number_of_aligned_votes: u16,
    pub number_of_misaligned_votes: u16,
    pub initial_tick: u32,
}

impl TickInfo {
    pub const SIZE: usize = 16;
}

impl WireEncode for TickInfo {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.tick_duration);
        buf.put_u16_le(self.epoch);
        buf.put_u32_le(self.tick);
        buf.put_u16_le(self.number_of_aligned_votes);
        buf.put_u16_le(self.number_of_misaligned_votes);
        buf.put_u32_le(self.initial_tick);
    }
}

impl WireDecode for TickInfo {
    const NAME: &'static str = "TickInfo";
    const WIRE_SIZE: usize = Self::SIZE;

    fn decode_from(buf: &mut &[u8]) -> Self {
        Self {
            tick_duration: buf.get_u16_le(),
            epoch: buf.get_u16_le(),
            tick: buf.get_u32_le(),
            number_of_aligned_votes: buf.get_u16_le(),
            number_of_misaligned_votes: buf.get_u16_le(),
            initial_tick: buf.get_u32_le(),
        }
    }
}
