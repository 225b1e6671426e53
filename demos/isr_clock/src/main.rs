// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated 12.5 kHz timer interrupt driving a millisecond clock.
//!
//! Builds the classic firmware clock tree:
//!
//! ```text
//!   isr (ratio 1)
//!    └─ tick_counter (ratio 1)
//!        └─ ms_counter (ratio 25, step 2)   80 µs in, 1 ms out
//!            ├─ run_time (ratio 1000)       seconds of uptime
//!            └─ led      (ratio 250)        2 Hz blink, paused for a second
//! ```
//!
//! Runs 24 999 interrupts (just under two seconds), printing a window of
//! events around the one-second mark with a
//! [`PrettyPrintSink`](gearbox_debug::pretty::PrettyPrintSink) and recording
//! everything below the millisecond counter to a
//! [`RecorderSink`](gearbox_debug::recorder::RecorderSink), then exports a
//! Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;
use std::ops::RangeInclusive;

use gearbox_core::gear::GearTrain;
use gearbox_core::mesh::Mesh;
use gearbox_core::observer::{Binding, Counter, GearContext};
use gearbox_core::rate::TickRate;
use gearbox_core::trace::{GearTickEvent, HookEvent, StateChangeEvent, TraceSink, Tracer};

use gearbox_debug::pretty::PrettyPrintSink;
use gearbox_debug::recorder::RecorderSink;

const ISR_HZ: u32 = 12_500;
const INTERRUPTS: u64 = 24_999;
/// Epochs printed by the pretty sink.
const PRINT_WINDOW: RangeInclusive<u64> = 12_499..=12_501;
/// The LED is paused between these epochs.
const LED_OFF_AT: u64 = 6_250;
const LED_ON_AT: u64 = 18_750;

#[derive(Debug, Default)]
struct Uptime {
    seconds: u32,
}

fn second_elapsed(uptime: &mut Uptime, _gear: &mut GearContext<'_>) {
    uptime.seconds += 1;
}

#[derive(Debug, Default)]
struct Led {
    lit: bool,
    toggles: u32,
}

fn toggle(led: &mut Led, _gear: &mut GearContext<'_>) {
    led.lit = !led.lit;
    led.toggles += 1;
}

fn led_off(led: &mut Led, _gear: &mut GearContext<'_>) {
    led.lit = false;
}

/// Forwards to the recorder for gears at or after `first_recorded`, and to
/// the pretty printer when it is attached.
struct Tee<'a> {
    recorder: &'a mut RecorderSink,
    first_recorded: u32,
    pretty: Option<&'a mut PrettyPrintSink>,
}

impl TraceSink for Tee<'_> {
    fn on_gear_tick(&mut self, e: &GearTickEvent) {
        if e.gear_index >= self.first_recorded {
            self.recorder.on_gear_tick(e);
        }
        if let Some(pretty) = &mut self.pretty {
            pretty.on_gear_tick(e);
        }
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        if e.gear_index >= self.first_recorded {
            self.recorder.on_state_change(e);
        }
        if let Some(pretty) = &mut self.pretty {
            pretty.on_state_change(e);
        }
    }

    fn on_hook(&mut self, e: &HookEvent) {
        if e.gear_index >= self.first_recorded {
            self.recorder.on_hook(e);
        }
        if let Some(pretty) = &mut self.pretty {
            pretty.on_hook(e);
        }
    }
}

fn main() {
    let rate = TickRate::from_hz(ISR_HZ);
    let ms_mesh = rate
        .mesh_for_period(1_000_000)
        .expect("1 ms is a whole number of 80 µs steps");

    // -- gear tree ---------------------------------------------------------
    let mut train = GearTrain::with_capacity(5);
    let isr = train.add_gear(Counter::new());
    let tick_counter = train.add_gear(Counter::new());
    let ms_counter = train.add_gear(Counter::new());
    let run_time = train.add_gear(Binding::new(Uptime::default()).with_rotation(second_elapsed));
    let led = train.add_gear(
        Binding::new(Led::default())
            .with_rotation(toggle)
            .with_disengaged(led_off),
    );

    train.connect(isr, tick_counter, Mesh::DIRECT);
    train.connect(tick_counter, ms_counter, ms_mesh);
    train.connect(ms_counter, run_time, Mesh::new(1000));
    train.connect(ms_counter, led, Mesh::new(250).with_priority(1));

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), rate).rotations_only();
    let mut recorder = RecorderSink::new();

    // -- simulated interrupts ----------------------------------------------
    for epoch in 1..=INTERRUPTS {
        match epoch {
            LED_OFF_AT => train.engage(led, false),
            LED_ON_AT => train.engage(led, true),
            _ => {}
        }

        let mut tee = Tee {
            recorder: &mut recorder,
            first_recorded: ms_counter.index(),
            pretty: PRINT_WINDOW.contains(&epoch).then_some(&mut pretty),
        };
        train.tick_with(isr, &mut Tracer::new(&mut tee));
    }

    let count = |id| train.observer::<Counter>(id).map_or(0, Counter::count);
    let uptime = train
        .observer::<Binding<Uptime>>(run_time)
        .map_or(0, |b| b.owner().seconds);
    let led_state = train
        .observer::<Binding<Led>>(led)
        .map(Binding::owner)
        .expect("led gear has a Binding<Led> observer");

    println!();
    println!("interrupts:   {}", count(isr));
    println!("ticks:        {}", count(tick_counter));
    println!("milliseconds: {}", count(ms_counter));
    println!("seconds:      {uptime}");
    println!(
        "led:          {} toggles, {}",
        led_state.toggles,
        if led_state.lit { "lit" } else { "dark" }
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "isr_clock.json";
    let file = File::create(path).expect("failed to create isr_clock.json");
    let mut writer = BufWriter::new(file);
    gearbox_debug::chrome::export(recorder.as_bytes(), rate, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} bytes recorded)", recorder.as_bytes().len());
}
