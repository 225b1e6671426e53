// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gear tree data model and tick propagation.
//!
//! A *gear* is a node in a propagation tree. Each gear has:
//!
//! - An identity ([`GearId`]), an index handle into its [`GearTrain`].
//! - Topology: a parent (its driver) and an ordered list of driven gears,
//!   sorted ascending by priority and stable among equal priorities.
//! - **Mesh parameters** set by [`connect`](GearTrain::connect): ratio,
//!   step, starting phase and priority (see [`Mesh`](crate::mesh::Mesh)).
//! - **Runtime state** advanced by [`tick`](GearTrain::tick): the current
//!   phase and the [`EngagementState`].
//!
//! Gears are stored in struct-of-arrays layout with index-based handles.
//!
//! # Propagation
//!
//! Each call to [`tick`](GearTrain::tick) on a drive gear adds its step to
//! its phase. When the phase reaches the ratio, the gear completes a
//! rotation: its own hooks fire first, the phase wraps by subtracting the
//! ratio, and then every driven gear is ticked in priority order, depth
//! first. A gear keeps driving its children while disengaged; only its own
//! hooks are suppressed.

mod engagement;
mod id;
mod store;
mod tick;
mod traverse;

pub use engagement::EngagementState;
pub use id::{GearId, INVALID};
pub use store::GearTrain;
pub use traverse::Children;
