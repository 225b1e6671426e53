// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical tick dividers for clock-driven firmware and simulations.
//!
//! `gearbox_core` turns one fast periodic tick (a timer interrupt, a frame
//! callback, a simulation step) into a tree of slower derived events. Each
//! node of the tree is a *gear*: it accumulates a fixed step per tick from
//! its driver and completes a rotation whenever the accumulated phase
//! reaches its ratio. Rotations drive the gear's own children, so a 12.5 kHz
//! interrupt can feed a millisecond gear that in turn feeds a seconds gear,
//! all in integer arithmetic with no drift.
//!
//! The crate is `no_std` (with `alloc`) and stores gears in struct-of-arrays
//! layout with index handles.
//!
//! # Architecture
//!
//! ```text
//!   Clock source (ISR, frame loop, test)
//!       │
//!       ▼
//!   GearTrain::tick(root) ──► phase += step ──► rotation?
//!                                                 │
//!                  ┌──────────────────────────────┘
//!                  ▼
//!   engagement state machine ──► GearObserver hooks
//!                  │
//!                  ▼
//!   children, in priority order (depth first)
//! ```
//!
//! **[`gear`]**: the [`GearTrain`](gear::GearTrain) store, the
//! [`EngagementState`](gear::EngagementState) machine and tick
//! propagation.
//!
//! **[`mesh`]**: [`Mesh`](mesh::Mesh), the ratio/step/phase/priority
//! parameters of a driver-to-driven connection, with exact period
//! reduction.
//!
//! **[`observer`]**: the [`GearObserver`](observer::GearObserver) trait
//! through which gears deliver their events, plus the
//! [`Binding`](observer::Binding) and [`Counter`](observer::Counter)
//! observers.
//!
//! **[`rate`]**: [`TickRate`](rate::TickRate), a rational tick frequency
//! for converting between ticks and wall-clock time.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! propagation instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Example
//!
//! ```
//! use gearbox_core::gear::GearTrain;
//! use gearbox_core::mesh::Mesh;
//! use gearbox_core::observer::Counter;
//!
//! let mut train = GearTrain::new();
//! let isr = train.add_bare_gear();
//! let millis = train.add_gear(Counter::new());
//! // 12.5 kHz input: 80 µs per tick, 1000 µs per rotation.
//! train.connect(isr, millis, Mesh::new(1000).with_step(80));
//!
//! for _ in 0..125 {
//!     train.tick(isr);
//! }
//! assert_eq!(train.observer::<Counter>(millis).map(Counter::count), Some(10));
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-hook
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod gear;
pub mod mesh;
pub mod observer;
pub mod rate;
pub mod trace;
