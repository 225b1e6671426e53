// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive tick rate and conversion to wall time.
//!
//! The engine itself only counts ticks. [`TickRate`] carries the rational
//! rate of the external tick source (`numer / denom` ticks per second) so
//! that diagnostics can place events on a time axis and so that meshes can be
//! derived from wall-clock periods with [`Mesh::from_periods`].
//! All arithmetic uses `u128` intermediates to avoid overflow.

use core::fmt;

use crate::mesh::Mesh;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Rational rate of a tick source, in ticks per second.
///
/// `hz = numer / denom`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickRate {
    /// Numerator of the ticks-per-second ratio.
    pub numer: u32,
    /// Denominator of the ticks-per-second ratio.
    pub denom: u32,
}

impl TickRate {
    /// One tick per second.
    pub const HZ: Self = Self { numer: 1, denom: 1 };

    /// Creates a new rate with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if either term is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(numer != 0, "tick rate must not be zero");
        assert!(denom != 0, "tick rate denominator must not be zero");
        Self { numer, denom }
    }

    /// Creates an integral rate.
    ///
    /// # Panics
    ///
    /// Panics if `hz` is zero.
    #[inline]
    #[must_use]
    pub const fn from_hz(hz: u32) -> Self {
        Self::new(hz, 1)
    }

    /// Returns the tick period in nanoseconds, rounded down.
    #[inline]
    #[must_use]
    pub const fn period_nanos(self) -> u64 {
        self.ticks_to_nanos(1)
    }

    /// Converts a tick count to nanoseconds, rounded down.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * NANOS_PER_SEC * self.denom as u128 / self.numer as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count, rounded down.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.numer as u128 / (NANOS_PER_SEC * self.denom as u128);
        wide as u64
    }

    /// Returns the mesh for a gear driven directly by this tick source that
    /// rotates once every `period_nanos`.
    ///
    /// See [`Mesh::from_periods`].
    #[inline]
    #[must_use]
    pub const fn mesh_for_period(self, period_nanos: u64) -> Option<Mesh> {
        Mesh::from_periods(self.period_nanos(), period_nanos)
    }
}

impl fmt::Debug for TickRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TickRate({}/{} Hz)", self.numer, self.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_of_isr_rate() {
        let rate = TickRate::from_hz(12_500);
        assert_eq!(rate.period_nanos(), 80_000, "12.5 kHz → 80 µs");
        assert_eq!(rate.ticks_to_nanos(12_500), 1_000_000_000);
        assert_eq!(rate.nanos_to_ticks(1_000_000_000), 12_500);
    }

    #[test]
    fn fractional_rate() {
        // 32768 / 1000 Hz ≈ 32.768 Hz
        let rate = TickRate::new(32_768, 1000);
        assert_eq!(rate.ticks_to_nanos(32_768), 1_000_000_000_000);
    }

    #[test]
    fn overflow_safe_conversion() {
        let rate = TickRate::new(3, 125);
        // Should not panic; result is approximate but deterministic.
        let _nanos = rate.ticks_to_nanos(u64::MAX / 2);
    }

    #[test]
    fn mesh_for_millisecond_gear() {
        let mesh = TickRate::from_hz(12_500).mesh_for_period(1_000_000).unwrap();
        assert_eq!((mesh.ratio, mesh.step), (25, 2));
    }

    #[test]
    #[should_panic(expected = "tick rate must not be zero")]
    fn zero_rate_panics() {
        let _ = TickRate::from_hz(0);
    }
}
