// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays gear storage with allocation, topology, and engagement
//! control.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::mesh::Mesh;
use crate::observer::GearObserver;

use super::engagement::EngagementState;
use super::id::{GearId, INVALID};
use super::traverse::Children;

/// Struct-of-arrays storage for a forest of gears.
///
/// Gears are addressed by [`GearId`] handles. Each gear occupies a slot in
/// parallel arrays; slots are never freed, so the topology is built once
/// during initialization and then driven with [`tick`](Self::tick).
///
/// All allocation happens in [`add_gear`](Self::add_gear) and
/// [`connect`](Self::connect). Ticking never allocates.
pub struct GearTrain {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Mesh parameters (set by connect) --
    pub(crate) ratio: Vec<u16>,
    pub(crate) step: Vec<u16>,
    pub(crate) priority: Vec<u16>,

    // -- Runtime state (advanced by tick) --
    pub(crate) phase: Vec<u32>,
    pub(crate) state: Vec<EngagementState>,
    pub(crate) epoch: u64,

    // -- Observers --
    pub(crate) observers: Vec<Option<Box<dyn GearObserver>>>,

    pub(crate) len: u32,
}

impl Default for GearTrain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GearTrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GearTrain")
            .field("len", &self.len)
            .field("epoch", &self.epoch)
            .field("ratio", &self.ratio)
            .field("step", &self.step)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl GearTrain {
    /// Creates an empty train.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty train with room for `capacity` gears.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity),
            ratio: Vec::with_capacity(capacity),
            step: Vec::with_capacity(capacity),
            priority: Vec::with_capacity(capacity),
            phase: Vec::with_capacity(capacity),
            state: Vec::with_capacity(capacity),
            epoch: 0,
            observers: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Creates a gear that reports its events to `observer`.
    ///
    /// The gear starts engaged, with ratio 1, step 1, phase 0 and no parent.
    /// It becomes meaningful once it is [connected](Self::connect) to a
    /// driver, or once it is ticked directly as a drive gear.
    pub fn add_gear<O: GearObserver>(&mut self, observer: O) -> GearId {
        self.alloc(Some(Box::new(observer)), Mesh::DIRECT)
    }

    /// Creates a gear with no observer.
    ///
    /// Useful for drive gears and intermediate reduction stages whose events
    /// nobody listens to.
    pub fn add_bare_gear(&mut self) -> GearId {
        self.alloc(None, Mesh::DIRECT)
    }

    /// Creates a drive gear with its own ratio, starting phase and step.
    ///
    /// A drive gear is not connected to a parent; the application ticks it
    /// directly. Its [`priority`](Mesh::priority) is ignored.
    pub fn add_drive_gear<O: GearObserver>(&mut self, observer: O, mesh: Mesh) -> GearId {
        self.alloc(Some(Box::new(observer)), mesh)
    }

    /// Replaces the observer attached to `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this train.
    pub fn set_observer<O: GearObserver>(&mut self, id: GearId, observer: O) {
        self.validate(id);
        self.observers[id.idx as usize] = Some(Box::new(observer));
    }

    /// Returns the observer attached to `id` if it has type `O`.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this train.
    #[must_use]
    pub fn observer<O: GearObserver>(&self, id: GearId) -> Option<&O> {
        self.validate(id);
        let observer: &dyn Any = self.observers[id.idx as usize].as_deref()?;
        observer.downcast_ref::<O>()
    }

    /// Returns the observer attached to `id` mutably if it has type `O`.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this train.
    #[must_use]
    pub fn observer_mut<O: GearObserver>(&mut self, id: GearId) -> Option<&mut O> {
        self.validate(id);
        let observer: &mut dyn Any = self.observers[id.idx as usize].as_deref_mut()?;
        observer.downcast_mut::<O>()
    }

    // -- Topology API --

    /// Connects `child` so that it is driven by `parent`.
    ///
    /// Applies `mesh` to `child` (zero ratio or step is coerced to one, see
    /// [`Mesh`]) and inserts it into `parent`'s children after every
    /// existing child whose priority is lower than or equal to
    /// `mesh.priority`, so equal priorities tick in connection order.
    ///
    /// Topology is meant to be built before the tick source is armed. The
    /// borrow checker already rules out connecting from inside a hook.
    ///
    /// # Panics
    ///
    /// Panics if either handle does not belong to this train, if `parent` and
    /// `child` are the same gear, if `child` already has a parent, or if the
    /// connection would form a cycle.
    pub fn connect(&mut self, parent: GearId, child: GearId, mesh: Mesh) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(p != c, "cannot connect a gear to itself");
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            !self.is_ancestor(c, p),
            "connecting {child:?} under {parent:?} would form a cycle"
        );

        let mesh = mesh.normalized();
        self.ratio[c as usize] = mesh.ratio;
        self.step[c as usize] = mesh.step;
        self.phase[c as usize] = u32::from(mesh.phase);
        self.priority[c as usize] = mesh.priority;
        self.parent[c as usize] = p;

        let priority = &self.priority;
        let siblings = &mut self.children[p as usize];
        let at = siblings.partition_point(|&s| priority[s as usize] <= mesh.priority);
        siblings.insert(at, c);
    }

    /// Returns the driver of a gear, if any.
    #[must_use]
    pub fn parent(&self, id: GearId) -> Option<GearId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then_some(GearId { idx: p })
    }

    /// Returns an iterator over the gears driven by `id`, in tick order.
    #[must_use]
    pub fn children(&self, id: GearId) -> Children<'_> {
        self.validate(id);
        Children::new(&self.children[id.idx as usize])
    }

    /// Returns the drive gears (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<GearId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID)
            .map(|idx| GearId { idx })
            .collect()
    }

    /// Returns the number of gears.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if the train has no gears.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of drive ticks delivered so far.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -- Engagement API --

    /// Begins engaging or disengaging a gear.
    ///
    /// Engagement completes at the end of the gear's next rotation.
    /// Disengagement completes on its next tick. Requesting engagement while
    /// a disengagement is pending cancels it. Repeated requests are no-ops.
    /// See [`EngagementState::request`].
    pub fn engage(&mut self, id: GearId, engaged: bool) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        *state = state.request(engaged);
    }

    /// Returns the engagement state of a gear.
    #[must_use]
    pub fn state(&self, id: GearId) -> EngagementState {
        self.validate(id);
        self.state[id.idx as usize]
    }

    /// Returns `true` when the gear is fully engaged.
    #[must_use]
    pub fn is_engaged(&self, id: GearId) -> bool {
        self.state(id).is_engaged()
    }

    /// Returns `true` when the gear is fully disengaged.
    #[must_use]
    pub fn is_disengaged(&self, id: GearId) -> bool {
        self.state(id).is_disengaged()
    }

    // -- Mesh and phase getters --

    /// Returns the current phase of a gear.
    ///
    /// Between ticks this is in `0..ratio`, unless the gear was connected
    /// with a starting phase of `ratio` or more and that excess has not yet
    /// been worked off.
    #[must_use]
    pub fn phase(&self, id: GearId) -> u32 {
        self.validate(id);
        self.phase[id.idx as usize]
    }

    /// Returns the ratio configured when the gear was connected.
    #[must_use]
    pub fn ratio(&self, id: GearId) -> u16 {
        self.validate(id);
        self.ratio[id.idx as usize]
    }

    /// Returns the step configured when the gear was connected.
    #[must_use]
    pub fn step(&self, id: GearId) -> u16 {
        self.validate(id);
        self.step[id.idx as usize]
    }

    /// Returns the sibling priority configured when the gear was connected.
    #[must_use]
    pub fn priority(&self, id: GearId) -> u16 {
        self.validate(id);
        self.priority[id.idx as usize]
    }

    // -- Internal helpers --

    fn alloc(&mut self, observer: Option<Box<dyn GearObserver>>, mesh: Mesh) -> GearId {
        let idx = self.len;
        assert!(idx != INVALID, "gear train is full");
        let mesh = mesh.normalized();
        self.len += 1;
        self.parent.push(INVALID);
        self.children.push(Vec::new());
        self.ratio.push(mesh.ratio);
        self.step.push(mesh.step);
        self.priority.push(mesh.priority);
        self.phase.push(u32::from(mesh.phase));
        self.state.push(EngagementState::Engaged);
        self.observers.push(observer);
        GearId { idx }
    }

    /// Panics if the handle does not belong to this train.
    pub(crate) fn validate(&self, id: GearId) {
        assert!(
            id.idx < self.len,
            "unknown GearId: {id:?} (train has {} gears)",
            self.len
        );
    }

    /// Returns `true` if `ancestor` is `idx` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::observer::Counter;

    #[test]
    fn new_gear_defaults() {
        let mut train = GearTrain::new();
        let id = train.add_bare_gear();
        assert_eq!(train.ratio(id), 1);
        assert_eq!(train.step(id), 1);
        assert_eq!(train.phase(id), 0);
        assert_eq!(train.priority(id), 0);
        assert!(train.is_engaged(id));
        assert_eq!(train.parent(id), None);
        assert_eq!(train.len(), 1);
        assert!(!train.is_empty());
    }

    #[test]
    fn connect_applies_mesh() {
        let mut train = GearTrain::new();
        let drive = train.add_bare_gear();
        let ms = train.add_gear(Counter::new());
        train.connect(drive, ms, Mesh::new(1000).with_phase(5).with_step(80));

        assert_eq!(train.ratio(ms), 1000);
        assert_eq!(train.step(ms), 80);
        assert_eq!(train.phase(ms), 5);
        assert_eq!(train.parent(ms), Some(drive));
        assert_eq!(train.children(drive).collect::<Vec<_>>(), vec![ms]);
    }

    #[test]
    fn zero_ratio_and_step_are_coerced() {
        let mut train = GearTrain::new();
        let drive = train.add_bare_gear();
        let g = train.add_bare_gear();
        train.connect(drive, g, Mesh::new(0).with_step(0));
        assert_eq!(train.ratio(g), 1);
        assert_eq!(train.step(g), 1);
    }

    #[test]
    fn children_sorted_by_priority_stable() {
        let mut train = GearTrain::new();
        let drive = train.add_bare_gear();
        let a = train.add_bare_gear();
        let b = train.add_bare_gear();
        let c = train.add_bare_gear();
        let d = train.add_bare_gear();
        let e = train.add_bare_gear();

        train.connect(drive, a, Mesh::new(1).with_priority(5));
        train.connect(drive, b, Mesh::new(1).with_priority(1));
        train.connect(drive, c, Mesh::new(1).with_priority(5));
        train.connect(drive, d, Mesh::new(1).with_priority(0));
        train.connect(drive, e, Mesh::new(1).with_priority(1));

        let kids: Vec<_> = train.children(drive).collect();
        assert_eq!(kids, vec![d, b, e, a, c]);
        assert_eq!(train.children(drive).len(), 5);
    }

    #[test]
    fn roots_returns_parentless_gears() {
        let mut train = GearTrain::new();
        let a = train.add_bare_gear();
        let b = train.add_bare_gear();
        let c = train.add_bare_gear();

        train.connect(a, c, Mesh::DIRECT);

        let roots = train.roots();
        assert!(roots.contains(&a));
        assert!(roots.contains(&b));
        assert!(!roots.contains(&c));
    }

    #[test]
    fn observer_downcasts_by_type() {
        let mut train = GearTrain::new();
        let counted = train.add_gear(Counter::new());
        let bare = train.add_bare_gear();

        assert_eq!(train.observer::<Counter>(counted).map(Counter::count), Some(0));
        assert!(train.observer::<Counter>(bare).is_none());

        train.set_observer(bare, Counter::new());
        assert!(train.observer_mut::<Counter>(bare).is_some());
    }

    #[test]
    fn engage_requests_follow_state_machine() {
        let mut train = GearTrain::new();
        let id = train.add_bare_gear();

        train.engage(id, true);
        assert!(train.is_engaged(id), "already engaged");

        train.engage(id, false);
        assert_eq!(train.state(id), EngagementState::Disengaging);
        train.engage(id, true);
        assert!(train.is_engaged(id), "disengagement aborted");
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn connect_twice_panics() {
        let mut train = GearTrain::new();
        let p1 = train.add_bare_gear();
        let p2 = train.add_bare_gear();
        let child = train.add_bare_gear();
        train.connect(p1, child, Mesh::DIRECT);
        train.connect(p2, child, Mesh::DIRECT);
    }

    #[test]
    #[should_panic(expected = "cannot connect a gear to itself")]
    fn connect_to_self_panics() {
        let mut train = GearTrain::new();
        let g = train.add_bare_gear();
        train.connect(g, g, Mesh::DIRECT);
    }

    #[test]
    #[should_panic(expected = "would form a cycle")]
    fn connect_cycle_panics() {
        let mut train = GearTrain::new();
        let a = train.add_bare_gear();
        let b = train.add_bare_gear();
        let c = train.add_bare_gear();
        train.connect(a, b, Mesh::DIRECT);
        train.connect(b, c, Mesh::DIRECT);
        train.connect(c, a, Mesh::DIRECT);
    }

    #[test]
    #[should_panic(expected = "unknown GearId")]
    fn foreign_handle_panics() {
        let mut other = GearTrain::new();
        other.add_bare_gear();
        let foreign = other.add_bare_gear();

        let train = GearTrain::new();
        let _ = train.phase(foreign);
    }
}
