// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for gearbox
//! diagnostics.
//!
//! This crate provides [`TraceSink`](gearbox_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes, one track per gear.
//!
//! Events carry the drive tick count (`epoch`) rather than a timestamp. The
//! pretty printer and the Chrome exporter take a
//! [`TickRate`](gearbox_core::rate::TickRate) to place them on a wall-clock
//! axis.

pub mod chrome;
pub mod pretty;
pub mod recorder;
