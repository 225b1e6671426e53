// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Record layouts (after the one-byte tag):
//!
//! | Tag | Event | Payload |
//! |-----|-------|---------|
//! | 1 | [`GearTickEvent`] | epoch u64, gear u32, depth u32, phase u32, ratio u16, rotated u8 |
//! | 2 | [`StateChangeEvent`] | epoch u64, gear u32, from u8, to u8 |
//! | 3 | [`HookEvent`] | epoch u64, gear u32, hook u8, phase u32 |

use gearbox_core::gear::EngagementState;
use gearbox_core::observer::Hook;
use gearbox_core::trace::{GearTickEvent, HookEvent, StateChangeEvent, TraceSink};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_GEAR_TICK: u8 = 1;
const TAG_STATE_CHANGE: u8 = 2;
const TAG_HOOK: u8 = 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder with room for `bytes` bytes before reallocating.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_state(&mut self, s: EngagementState) {
        self.write_u8(match s {
            EngagementState::Disengaged => 0,
            EngagementState::Engaging => 1,
            EngagementState::Engaged => 2,
            EngagementState::Disengaging => 3,
        });
    }

    fn write_hook(&mut self, h: Hook) {
        self.write_u8(match h {
            Hook::Engaged => 0,
            Hook::Tick => 1,
            Hook::Rotation => 2,
            Hook::Disengaged => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_gear_tick(&mut self, e: &GearTickEvent) {
        self.write_u8(TAG_GEAR_TICK);
        self.write_u64(e.epoch);
        self.write_u32(e.gear_index);
        self.write_u32(e.depth);
        self.write_u32(e.phase);
        self.write_u16(e.ratio);
        self.write_u8(u8::from(e.rotated));
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.write_u8(TAG_STATE_CHANGE);
        self.write_u64(e.epoch);
        self.write_u32(e.gear_index);
        self.write_state(e.from);
        self.write_state(e.to);
    }

    fn on_hook(&mut self, e: &HookEvent) {
        self.write_u8(TAG_HOOK);
        self.write_u64(e.epoch);
        self.write_u32(e.gear_index);
        self.write_hook(e.hook);
        self.write_u32(e.phase);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`GearTickEvent`].
    GearTick(GearTickEvent),
    /// A [`StateChangeEvent`].
    StateChange(StateChangeEvent),
    /// A [`HookEvent`].
    Hook(HookEvent),
}

impl RecordedEvent {
    /// Returns the drive tick during which the event was recorded.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        match self {
            Self::GearTick(e) => e.epoch,
            Self::StateChange(e) => e.epoch,
            Self::Hook(e) => e.epoch,
        }
    }

    /// Returns the slot index of the gear the event belongs to.
    #[must_use]
    pub fn gear_index(&self) -> u32 {
        match self {
            Self::GearTick(e) => e.gear_index,
            Self::StateChange(e) => e.gear_index,
            Self::Hook(e) => e.gear_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_state(&mut self) -> Option<EngagementState> {
        Some(match self.read_u8()? {
            0 => EngagementState::Disengaged,
            1 => EngagementState::Engaging,
            2 => EngagementState::Engaged,
            3 => EngagementState::Disengaging,
            _ => return None,
        })
    }

    fn read_hook(&mut self) -> Option<Hook> {
        Some(match self.read_u8()? {
            0 => Hook::Engaged,
            1 => Hook::Tick,
            2 => Hook::Rotation,
            3 => Hook::Disengaged,
            _ => return None,
        })
    }

    fn decode_gear_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::GearTick(GearTickEvent {
            epoch: self.read_u64()?,
            gear_index: self.read_u32()?,
            depth: self.read_u32()?,
            phase: self.read_u32()?,
            ratio: self.read_u16()?,
            rotated: self.read_u8()? != 0,
        }))
    }

    fn decode_state_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StateChange(StateChangeEvent {
            epoch: self.read_u64()?,
            gear_index: self.read_u32()?,
            from: self.read_state()?,
            to: self.read_state()?,
        }))
    }

    fn decode_hook(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Hook(HookEvent {
            epoch: self.read_u64()?,
            gear_index: self.read_u32()?,
            hook: self.read_hook()?,
            phase: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_GEAR_TICK => self.decode_gear_tick(),
            TAG_STATE_CHANGE => self.decode_state_change(),
            TAG_HOOK => self.decode_hook(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use gearbox_core::gear::GearTrain;
    use gearbox_core::mesh::Mesh;
    use gearbox_core::trace::Tracer;

    use super::*;

    fn sample_tick() -> GearTickEvent {
        GearTickEvent {
            epoch: 12_500,
            gear_index: 2,
            depth: 1,
            phase: 1_040,
            ratio: 1_000,
            rotated: true,
        }
    }

    #[test]
    fn records_are_fixed_size() {
        let mut rec = RecorderSink::new();
        rec.on_gear_tick(&sample_tick());
        assert_eq!(rec.as_bytes().len(), 1 + 8 + 4 + 4 + 4 + 2 + 1);

        rec.clear();
        rec.on_state_change(&StateChangeEvent {
            epoch: 1,
            gear_index: 0,
            from: EngagementState::Engaging,
            to: EngagementState::Engaged,
        });
        assert_eq!(rec.as_bytes().len(), 1 + 8 + 4 + 1 + 1);

        rec.clear();
        rec.on_hook(&HookEvent {
            epoch: 1,
            gear_index: 0,
            hook: Hook::Rotation,
            phase: 4,
        });
        assert_eq!(rec.as_bytes().len(), 1 + 8 + 4 + 1 + 4);
    }

    #[test]
    fn decodes_mixed_stream_in_order() {
        let change = StateChangeEvent {
            epoch: 12_500,
            gear_index: 2,
            from: EngagementState::Disengaging,
            to: EngagementState::Disengaged,
        };
        let hook = HookEvent {
            epoch: 12_500,
            gear_index: 2,
            hook: Hook::Disengaged,
            phase: 1_040,
        };

        let mut rec = RecorderSink::new();
        rec.on_gear_tick(&sample_tick());
        rec.on_state_change(&change);
        rec.on_hook(&hook);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::GearTick(sample_tick()),
                RecordedEvent::StateChange(change),
                RecordedEvent::Hook(hook),
            ]
        );
        assert!(events.iter().all(|e| e.epoch() == 12_500 && e.gear_index() == 2));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_gear_tick(&sample_tick());
        rec.on_gear_tick(&sample_tick());
        let bytes = rec.into_bytes();

        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_gear_tick(&sample_tick());
        let mut bytes = rec.into_bytes();
        bytes.push(0xff);
        bytes.extend_from_slice(&[0; 32]);

        assert_eq!(decode(&bytes).count(), 1);
    }

    #[test]
    fn records_a_live_train() {
        let mut train = GearTrain::new();
        let drive = train.add_bare_gear();
        let half = train.add_bare_gear();
        train.connect(drive, half, Mesh::new(2));

        let mut rec = RecorderSink::new();
        {
            let mut tracer = Tracer::new(&mut rec);
            for _ in 0..4 {
                train.tick_with(drive, &mut tracer);
            }
        }

        let rotations = decode(rec.as_bytes())
            .filter(|e| matches!(e, RecordedEvent::GearTick(t) if t.gear_index == half.index() && t.rotated))
            .count();
        assert_eq!(rotations, 2);

        // Bare gears still report the hooks they would have fired.
        let hooks = decode(rec.as_bytes())
            .filter(|e| matches!(e, RecordedEvent::Hook(_)))
            .count();
        assert_eq!(hooks, 4 * 2 + 4 + 2);
    }
}
