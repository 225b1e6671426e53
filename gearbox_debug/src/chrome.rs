// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each gear gets its own track (`tid` is the gear's slot index):
//!
//! - Engaged periods become `B`/`E` duration spans named `engaged`.
//! - Completed rotations become thread-scoped instant events.
//! - Hook dispatches become instant events named after the hook. `on_tick`
//!   is left out since it fires on every tick of an engaged gear.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde_json::{Value, json};

use gearbox_core::gear::EngagementState;
use gearbox_core::observer::Hook;
use gearbox_core::rate::TickRate;

use crate::recorder::{RecordedEvent, decode};

const PID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Epochs are converted to microseconds using the provided [`TickRate`], with
/// the first drive tick at zero.
///
/// A gear whose first recorded state change leaves `Disengaging`, or which
/// never changes state, is taken to be engaged from its first event. Spans
/// still open at the end of the recording are closed at the last epoch.
///
/// An engagement that is cancelled before it completes settles as
/// `Disengaging → Disengaged`, exactly like a gear that was engaged. If that
/// is the first change recorded for a gear, it is drawn as engaged from its
/// first event until the disengagement.
pub fn export(bytes: &[u8], rate: TickRate, writer: &mut dyn Write) -> io::Result<()> {
    // First pass: one track per gear, and whether it starts engaged.
    let mut tracks: BTreeMap<u32, Track> = BTreeMap::new();
    let mut last_epoch = 1;
    for recorded in decode(bytes) {
        last_epoch = recorded.epoch();
        let track = tracks.entry(recorded.gear_index()).or_insert(Track {
            first_epoch: recorded.epoch(),
            initially_engaged: None,
            open_since: None,
        });
        if let RecordedEvent::StateChange(e) = recorded
            && track.initially_engaged.is_none()
        {
            track.initially_engaged = Some(e.from == EngagementState::Disengaging);
        }
    }

    let mut events: Vec<Value> = Vec::new();
    for (&gear, track) in &mut tracks {
        events.push(json!({
            "ph": "M",
            "name": "thread_name",
            "pid": PID,
            "tid": gear,
            "args": { "name": format!("gear {gear}") }
        }));
        if track.initially_engaged.unwrap_or(true) {
            events.push(span("B", gear, track.first_epoch, rate));
            track.open_since = Some(track.first_epoch);
        }
    }

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::GearTick(e) => {
                if !e.rotated {
                    continue;
                }
                events.push(json!({
                    "ph": "i",
                    "name": "rotation",
                    "cat": "Tick",
                    "ts": epoch_to_us(e.epoch, rate),
                    "pid": PID,
                    "tid": e.gear_index,
                    "s": "t",
                    "args": {
                        "epoch": e.epoch,
                        "depth": e.depth,
                        "phase": e.phase,
                        "ratio": e.ratio,
                    }
                }));
            }
            RecordedEvent::StateChange(e) => {
                let Some(track) = tracks.get_mut(&e.gear_index) else {
                    continue;
                };
                match e.to {
                    EngagementState::Engaged if track.open_since.is_none() => {
                        events.push(span("B", e.gear_index, e.epoch, rate));
                        track.open_since = Some(e.epoch);
                    }
                    EngagementState::Engaging | EngagementState::Disengaged
                        if track.open_since.is_some() =>
                    {
                        events.push(span("E", e.gear_index, e.epoch, rate));
                        track.open_since = None;
                    }
                    _ => {}
                }
            }
            RecordedEvent::Hook(e) => {
                if e.hook == Hook::Tick {
                    continue;
                }
                events.push(json!({
                    "ph": "i",
                    "name": hook_name(e.hook),
                    "cat": "Hook",
                    "ts": epoch_to_us(e.epoch, rate),
                    "pid": PID,
                    "tid": e.gear_index,
                    "s": "t",
                    "args": {
                        "epoch": e.epoch,
                        "phase": e.phase,
                    }
                }));
            }
        }
    }

    for (&gear, track) in &tracks {
        if track.open_since.is_some() {
            events.push(span("E", gear, last_epoch, rate));
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[derive(Debug)]
struct Track {
    first_epoch: u64,
    initially_engaged: Option<bool>,
    open_since: Option<u64>,
}

fn span(ph: &str, gear: u32, epoch: u64, rate: TickRate) -> Value {
    json!({
        "ph": ph,
        "name": "engaged",
        "cat": "Engagement",
        "ts": epoch_to_us(epoch, rate),
        "pid": PID,
        "tid": gear,
    })
}

fn hook_name(hook: Hook) -> &'static str {
    match hook {
        Hook::Engaged => "on_engaged",
        Hook::Tick => "on_tick",
        Hook::Rotation => "on_rotation",
        Hook::Disengaged => "on_disengaged",
    }
}

fn epoch_to_us(epoch: u64, rate: TickRate) -> f64 {
    rate.ticks_to_nanos(epoch.saturating_sub(1)) as f64 / 1000.0
}
