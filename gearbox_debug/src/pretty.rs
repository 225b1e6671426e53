// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Epochs are
//! converted to milliseconds since the first drive tick using a
//! [`TickRate`], and lines are indented by tree depth.

use std::io::Write;

use gearbox_core::gear::EngagementState;
use gearbox_core::observer::Hook;
use gearbox_core::rate::TickRate;
use gearbox_core::trace::{GearTickEvent, HookEvent, StateChangeEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    rate: TickRate,
    rotations_only: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("rate", &self.rate)
            .field("rotations_only", &self.rotations_only)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(rate: TickRate) -> Self {
        Self::new(Box::new(std::io::stderr()), rate)
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, rate: TickRate) -> Self {
        Self::with_writer(writer, rate)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, rate: TickRate) -> Self {
        Self {
            writer,
            rate,
            rotations_only: false,
        }
    }

    /// Suppresses tick lines that do not complete a rotation, and `on_tick`
    /// hook lines.
    ///
    /// On fast trees this cuts the output by roughly the ratio of each gear.
    #[must_use]
    pub fn rotations_only(mut self) -> Self {
        self.rotations_only = true;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn epoch_ms(&self, epoch: u64) -> f64 {
        // Epoch 1 is the first drive tick, placed at t = 0.
        self.rate.ticks_to_nanos(epoch.saturating_sub(1)) as f64 / 1_000_000.0
    }
}

fn state_name(state: EngagementState) -> &'static str {
    match state {
        EngagementState::Disengaged => "disengaged",
        EngagementState::Engaging => "engaging",
        EngagementState::Engaged => "engaged",
        EngagementState::Disengaging => "disengaging",
    }
}

fn hook_name(hook: Hook) -> &'static str {
    match hook {
        Hook::Engaged => "on_engaged",
        Hook::Tick => "on_tick",
        Hook::Rotation => "on_rotation",
        Hook::Disengaged => "on_disengaged",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_gear_tick(&mut self, e: &GearTickEvent) {
        if self.rotations_only && !e.rotated {
            return;
        }
        let indent = e.depth as usize * 2;
        let rotated = if e.rotated { " ROTATION" } else { "" };
        let _ = writeln!(
            self.writer,
            "[tick] epoch={} t={:.3}ms {:indent$}gear={} phase={}/{}{rotated}",
            e.epoch,
            self.epoch_ms(e.epoch),
            "",
            e.gear_index,
            e.phase,
            e.ratio,
        );
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] epoch={} t={:.3}ms gear={} {} -> {}",
            e.epoch,
            self.epoch_ms(e.epoch),
            e.gear_index,
            state_name(e.from),
            state_name(e.to),
        );
    }

    fn on_hook(&mut self, e: &HookEvent) {
        if self.rotations_only && e.hook == Hook::Tick {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[hook] epoch={} gear={} {} phase={}",
            e.epoch,
            e.gear_index,
            hook_name(e.hook),
            e.phase,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(epoch: u64, depth: u32, rotated: bool) -> GearTickEvent {
        GearTickEvent {
            epoch,
            gear_index: 3,
            depth,
            phase: if rotated { 1_040 } else { 960 },
            ratio: 1_000,
            rotated,
        }
    }

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), TickRate::from_hz(12_500));
        sink.on_gear_tick(&tick(12_501, 2, true));
        let output = output(sink);
        assert!(output.starts_with("[tick] epoch=12501"), "got: {output}");
        assert!(output.contains("t=1000.000ms"), "got: {output}");
        assert!(output.contains("    gear=3 phase=1040/1000 ROTATION"), "got: {output}");
    }

    #[test]
    fn pretty_print_state_change_and_hook() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), TickRate::HZ);
        sink.on_state_change(&StateChangeEvent {
            epoch: 4,
            gear_index: 1,
            from: EngagementState::Engaging,
            to: EngagementState::Engaged,
        });
        sink.on_hook(&HookEvent {
            epoch: 4,
            gear_index: 1,
            hook: Hook::Engaged,
            phase: 4,
        });
        let output = output(sink);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[state] epoch=4 t=3000.000ms gear=1 engaging -> engaged",
                "[hook] epoch=4 gear=1 on_engaged phase=4",
            ]
        );
    }

    #[test]
    fn rotations_only_filters_plain_ticks() {
        let mut sink =
            PrettyPrintSink::with_writer(Vec::<u8>::new(), TickRate::HZ).rotations_only();
        sink.on_gear_tick(&tick(1, 0, false));
        sink.on_hook(&HookEvent {
            epoch: 1,
            gear_index: 3,
            hook: Hook::Tick,
            phase: 960,
        });
        sink.on_gear_tick(&tick(2, 0, true));
        sink.on_hook(&HookEvent {
            epoch: 2,
            gear_index: 3,
            hook: Hook::Rotation,
            phase: 1_040,
        });
        let output = output(sink);
        assert_eq!(output.lines().count(), 2, "got: {output}");
        assert!(output.contains("on_rotation"), "got: {output}");
    }
}
