// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection parameters for driven gears.
//!
//! A [`Mesh`] describes how a driven gear meshes with its driver: how many
//! steps make one rotation ([`ratio`](Mesh::ratio)), how far each driver
//! rotation advances it ([`step`](Mesh::step)), where it starts
//! ([`phase`](Mesh::phase)), and where it sits among its siblings
//! ([`priority`](Mesh::priority)).
//!
//! Fractional ratios are expressed with integers only. A gear with
//! `ratio = 25, step = 2` rotates once every 12.5 driver rotations and
//! carries the remainder exactly from one rotation to the next, so it never
//! drifts.

/// Parameters applied to a gear when it is connected to its driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mesh {
    /// Phase units per rotation of the driven gear.
    pub ratio: u16,
    /// Phase already elapsed when the gear is connected.
    pub phase: u16,
    /// Phase increment per rotation of the driver.
    pub step: u16,
    /// Order among siblings; lower values tick first.
    pub priority: u16,
}

impl Mesh {
    /// A 1:1 mesh: the driven gear rotates on every driver rotation.
    pub const DIRECT: Self = Self::new(1);

    /// Creates a mesh with the given ratio, zero phase, unit step and
    /// priority zero.
    #[inline]
    #[must_use]
    pub const fn new(ratio: u16) -> Self {
        Self {
            ratio,
            phase: 0,
            step: 1,
            priority: 0,
        }
    }

    /// Sets the starting phase.
    #[inline]
    #[must_use]
    pub const fn with_phase(mut self, phase: u16) -> Self {
        self.phase = phase;
        self
    }

    /// Sets the phase increment per driver rotation.
    #[inline]
    #[must_use]
    pub const fn with_step(mut self, step: u16) -> Self {
        self.step = step;
        self
    }

    /// Sets the sibling priority.
    #[inline]
    #[must_use]
    pub const fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }

    /// Derives a mesh from the rotation period of the driver and the desired
    /// rotation period of the driven gear.
    ///
    /// The period ratio is reduced by its greatest common divisor, so an
    /// 80 µs driver and a 1 ms gear give `ratio = 25, step = 2`. Returns
    /// `None` if either period is zero or a reduced term does not fit `u16`.
    #[must_use]
    pub const fn from_periods(driver_period: u64, gear_period: u64) -> Option<Self> {
        if driver_period == 0 || gear_period == 0 {
            return None;
        }
        let g = gcd(driver_period, gear_period);
        let ratio = gear_period / g;
        let step = driver_period / g;
        if ratio > u16::MAX as u64 || step > u16::MAX as u64 {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "both terms were checked against u16::MAX above"
        )]
        let mesh = Self::new(ratio as u16).with_step(step as u16);
        Some(mesh)
    }

    /// Returns a copy that satisfies the engine's invariants.
    ///
    /// Zero ratio and step are coerced to one, and a step larger than the
    /// ratio is clamped to the ratio (one rotation per driver rotation at
    /// most). The starting phase is kept as given: a phase of `ratio` or more
    /// completes a rotation on the next tick and carries the excess.
    #[inline]
    #[must_use]
    pub(crate) const fn normalized(self) -> Self {
        let ratio = if self.ratio == 0 { 1 } else { self.ratio };
        let step = if self.step == 0 {
            1
        } else if self.step > ratio {
            ratio
        } else {
            self.step
        };
        Self {
            ratio,
            phase: self.phase,
            step,
            priority: self.priority,
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::DIRECT
    }
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let mesh = Mesh::new(1000).with_phase(3).with_step(80).with_priority(2);
        assert_eq!(mesh.ratio, 1000);
        assert_eq!(mesh.phase, 3);
        assert_eq!(mesh.step, 80);
        assert_eq!(mesh.priority, 2);
    }

    #[test]
    fn zero_terms_are_coerced() {
        let mesh = Mesh::new(0).with_step(0).normalized();
        assert_eq!(mesh.ratio, 1);
        assert_eq!(mesh.step, 1);
    }

    #[test]
    fn oversized_step_is_clamped_and_phase_kept() {
        let mesh = Mesh::new(10).with_step(25).with_phase(23).normalized();
        assert_eq!(mesh.step, 10);
        assert_eq!(mesh.phase, 23);

        let mesh = Mesh::new(1000).with_step(80).with_phase(999).normalized();
        assert_eq!(mesh, Mesh::new(1000).with_step(80).with_phase(999));
    }

    #[test]
    fn from_periods_reduces() {
        // 12.5 kHz interrupt driving a millisecond gear.
        let mesh = Mesh::from_periods(80_000, 1_000_000).unwrap();
        assert_eq!((mesh.ratio, mesh.step), (25, 2));

        // Milliseconds to seconds.
        let mesh = Mesh::from_periods(1_000_000, 1_000_000_000).unwrap();
        assert_eq!((mesh.ratio, mesh.step), (1000, 1));
    }

    #[test]
    fn from_periods_rejects_unrepresentable() {
        assert_eq!(Mesh::from_periods(0, 10), None);
        assert_eq!(Mesh::from_periods(10, 0), None);
        // 1 ns driver, 1 s gear: ratio far beyond u16.
        assert_eq!(Mesh::from_periods(1, 1_000_000_000), None);
    }

    #[test]
    fn default_is_direct() {
        assert_eq!(Mesh::default(), Mesh::new(1));
    }
}
