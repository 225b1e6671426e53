// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gear identity.

use core::fmt;

/// Sentinel value indicating "no gear" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a gear in a [`GearTrain`](super::GearTrain).
///
/// Gears are never destroyed, so a handle stays valid for the lifetime of
/// the train that issued it. Handles from a different train are detected
/// only when their slot index is out of range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GearId {
    /// Slot index into the train's arrays.
    pub(crate) idx: u32,
}

impl GearId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for GearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GearId({})", self.idx)
    }
}
