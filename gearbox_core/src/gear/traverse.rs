// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::slice;

use super::id::GearId;

/// An iterator over the gears directly driven by a gear, in tick order.
///
/// Created by [`GearTrain::children`](super::GearTrain::children).
#[derive(Debug, Clone)]
pub struct Children<'a> {
    inner: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(slots: &'a [u32]) -> Self {
        Self {
            inner: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = GearId;

    fn next(&mut self) -> Option<GearId> {
        self.inner.next().map(|&idx| GearId { idx })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}
