// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for tick propagation.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls while a tick propagates through the gear tree. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//! Pass a tracer to [`GearTrain::tick_with`](crate::gear::GearTrain::tick_with).
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): additionally emits a [`HookEvent`] for
//!   every hook dispatch. This is one event per callback, so expect a lot of
//!   them on fast trees.

use crate::gear::EngagementState;
use crate::observer::Hook;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted every time a gear is ticked, before any of its hooks fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GearTickEvent {
    /// Number of drive ticks delivered to the train so far (1-based).
    pub epoch: u64,
    /// Slot index of the ticked gear.
    pub gear_index: u32,
    /// Distance from the drive gear that started this tick.
    pub depth: u32,
    /// Phase after the step was applied (pre-wrap on rotation).
    pub phase: u32,
    /// Configured ratio.
    pub ratio: u16,
    /// Whether this tick completes a rotation.
    pub rotated: bool,
}

/// Emitted when a pending engagement or disengagement completes, and when
/// an `on_engaged` hook takes the gear out of the engaged state it was just
/// given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChangeEvent {
    /// Drive tick during which the change happened.
    pub epoch: u64,
    /// Slot index of the gear.
    pub gear_index: u32,
    /// State before the change.
    pub from: EngagementState,
    /// State after the change.
    pub to: EngagementState,
}

/// Emitted for every hook the engine dispatches (requires `trace-rich` to be
/// delivered).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookEvent {
    /// Drive tick during which the hook fired.
    pub epoch: u64,
    /// Slot index of the gear.
    pub gear_index: u32,
    /// Which hook.
    pub hook: Hook,
    /// Phase observed by the hook.
    pub phase: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a gear is ticked.
    fn on_gear_tick(&mut self, e: &GearTickEvent) {
        _ = e;
    }

    /// Called when a gear finishes engaging or disengaging.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called when a hook is dispatched (only with `trace-rich`).
    fn on_hook(&mut self, e: &HookEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`GearTickEvent`].
    #[inline]
    pub fn gear_tick(&mut self, e: &GearTickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_gear_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StateChangeEvent`].
    #[inline]
    pub fn state_change(&mut self, e: &StateChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HookEvent`] (requires `trace-rich` feature).
    #[inline]
    pub fn hook(&mut self, e: &HookEvent) {
        #[cfg(feature = "trace-rich")]
        if let Some(s) = &mut self.sink {
            s.on_hook(e);
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> GearTickEvent {
        GearTickEvent {
            epoch: 42,
            gear_index: 3,
            depth: 1,
            phase: 1000,
            ratio: 1000,
            rotated: true,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_gear_tick(&sample_tick());
        sink.on_state_change(&StateChangeEvent {
            epoch: 1,
            gear_index: 0,
            from: EngagementState::Engaging,
            to: EngagementState::Engaged,
        });
        sink.on_hook(&HookEvent {
            epoch: 1,
            gear_index: 0,
            hook: Hook::Rotation,
            phase: 1,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.gear_tick(&sample_tick());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            ticks: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_gear_tick(&mut self, e: &GearTickEvent) {
                self.ticks.push(e.epoch);
            }
        }

        let mut sink = RecordingSink { ticks: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.gear_tick(&sample_tick());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.ticks, &[42]);
    }
}
