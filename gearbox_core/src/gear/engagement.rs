// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engagement state machine.
//!
//! A gear is *engaged* when its hooks fire. Engagement is synchronized with
//! rotation: a request to engage completes only when a rotation completes,
//! so an observer never sees a gear become active partway through a period.
//! A request to disengage completes on the gear's very next tick.
//!
//! ```text
//!              engage(true)             rotation
//!  Disengaged ─────────────► Engaging ───────────► Engaged
//!      ▲                        │                   │  ▲
//!      │ next tick              │ engage(false)     │  │ engage(true)
//!      │                        ▼                   ▼  │
//!      └──────────────────── Disengaging ◄──────────┘  │
//!                                 └────────────────────┘
//! ```
//!
//! The transitions are pure functions on [`EngagementState`] so the table
//! can be exercised without a gear tree.

/// Engagement state of a gear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EngagementState {
    /// Hooks are suppressed.
    Disengaged,
    /// Engagement requested; completes at the next rotation boundary.
    Engaging,
    /// Hooks fire. Every gear starts here.
    #[default]
    Engaged,
    /// Disengagement requested; completes on the next tick.
    Disengaging,
}

impl EngagementState {
    /// Returns the state after an `engage(engaged)` request.
    ///
    /// Repeating a request is a no-op. Asking to engage while disengaging
    /// aborts the disengagement and returns straight to [`Engaged`], so no
    /// disengaged hook fires for that cycle.
    ///
    /// [`Engaged`]: Self::Engaged
    #[inline]
    #[must_use]
    pub const fn request(self, engaged: bool) -> Self {
        match (self, engaged) {
            (Self::Disengaged, true) => Self::Engaging,
            (Self::Disengaging, true) => Self::Engaged,
            (Self::Engaging | Self::Engaged, false) => Self::Disengaging,
            (state, _) => state,
        }
    }

    /// Returns `true` if the gear is fully engaged.
    #[inline]
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        matches!(self, Self::Engaged)
    }

    /// Returns `true` if the gear is fully disengaged.
    #[inline]
    #[must_use]
    pub const fn is_disengaged(self) -> bool {
        matches!(self, Self::Disengaged)
    }

    /// Returns `true` while a request is still pending.
    #[inline]
    #[must_use]
    pub const fn is_transitioning(self) -> bool {
        matches!(self, Self::Engaging | Self::Disengaging)
    }
}
