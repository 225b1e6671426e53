// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observer binding layer.
//!
//! The engine knows nothing about what a gear *means*. When a gear's state
//! machine decides a hook should fire, it calls through the
//! [`GearObserver`] attached to that gear, if any. Observers come in three
//! flavors:
//!
//! - [`Binding`]: an owner value plus up to four handler functions, one per
//!   hook. Unbound hooks are no-ops.
//! - [`Counter`]: counts completed rotations.
//! - Any custom type implementing [`GearObserver`] directly.
//!
//! Hooks receive a [`GearContext`] for the gear that fired. It exposes the
//! gear's phase, ratio and step, and lets the handler request engagement
//! changes. It deliberately does not expose topology or ticking, so the tree
//! cannot be restructured while a tick is propagating.

use core::any::Any;
use core::fmt;

use crate::gear::{EngagementState, GearId};

/// The four events a gear can deliver to its observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hook {
    /// The gear finished engaging at a rotation boundary.
    Engaged,
    /// The gear was ticked while engaged.
    Tick,
    /// The gear completed a rotation while engaged (always after [`Tick`]).
    ///
    /// [`Tick`]: Self::Tick
    Rotation,
    /// The gear finished disengaging.
    Disengaged,
}

/// Receives a gear's events.
///
/// All methods have default no-op implementations. Observers are stored as
/// `Box<dyn GearObserver>` inside the [`GearTrain`](crate::gear::GearTrain)
/// and can be recovered by type with
/// [`GearTrain::observer`](crate::gear::GearTrain::observer).
pub trait GearObserver: Any {
    /// Called when the gear becomes engaged at the end of a rotation, just
    /// before [`on_tick`](Self::on_tick) and
    /// [`on_rotation`](Self::on_rotation).
    ///
    /// This is the only hook from which
    /// [`GearContext::delay_engagement`] may be called.
    fn on_engaged(&mut self, gear: &mut GearContext<'_>) {
        _ = gear;
    }

    /// Called on each tick while the gear is engaged.
    fn on_tick(&mut self, gear: &mut GearContext<'_>) {
        _ = gear;
    }

    /// Called on each completed rotation while the gear is engaged, just
    /// after [`on_tick`](Self::on_tick).
    fn on_rotation(&mut self, gear: &mut GearContext<'_>) {
        _ = gear;
    }

    /// Called when the gear becomes disengaged.
    ///
    /// Fires once per disengagement, even if the gear was still engaging and
    /// never reached the engaged state.
    fn on_disengaged(&mut self, gear: &mut GearContext<'_>) {
        _ = gear;
    }
}

/// Routes `hook` to the matching observer method.
pub(crate) fn dispatch(observer: &mut dyn GearObserver, gear: &mut GearContext<'_>) {
    match gear.hook {
        Hook::Engaged => observer.on_engaged(gear),
        Hook::Tick => observer.on_tick(gear),
        Hook::Rotation => observer.on_rotation(gear),
        Hook::Disengaged => observer.on_disengaged(gear),
    }
}

// ---------------------------------------------------------------------------
// GearContext
// ---------------------------------------------------------------------------

/// View of the firing gear handed to every hook.
pub struct GearContext<'a> {
    pub(crate) id: GearId,
    pub(crate) hook: Hook,
    pub(crate) phase: u32,
    pub(crate) ratio: u16,
    pub(crate) step: u16,
    pub(crate) states: &'a mut [EngagementState],
}

impl fmt::Debug for GearContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GearContext")
            .field("id", &self.id)
            .field("hook", &self.hook)
            .field("phase", &self.phase)
            .field("ratio", &self.ratio)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl GearContext<'_> {
    /// Returns the handle of the gear that fired.
    #[inline]
    #[must_use]
    pub fn id(&self) -> GearId {
        self.id
    }

    /// Returns which hook is running.
    #[inline]
    #[must_use]
    pub fn hook(&self) -> Hook {
        self.hook
    }

    /// Returns the current phase.
    ///
    /// During a rotation-completing tick this is the value before wraparound,
    /// so it is at least [`ratio`](Self::ratio) and, with a step greater
    /// than one, may exceed it by up to `step - 1`.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Returns the configured ratio.
    #[inline]
    #[must_use]
    pub fn ratio(&self) -> u16 {
        self.ratio
    }

    /// Returns the configured step.
    #[inline]
    #[must_use]
    pub fn step(&self) -> u16 {
        self.step
    }

    /// Returns the gear's current engagement state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> EngagementState {
        self.states[self.id.idx as usize]
    }

    /// Returns `true` if the gear is fully engaged.
    #[inline]
    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.state().is_engaged()
    }

    /// Requests engagement or disengagement of the firing gear.
    ///
    /// Takes effect under the normal rules: a disengagement requested from a
    /// tick or rotation hook completes later in the same tick.
    pub fn engage(&mut self, engaged: bool) {
        let id = self.id;
        self.engage_gear(id, engaged);
    }

    /// Requests engagement or disengagement of any gear in the same train.
    ///
    /// # Panics
    ///
    /// Panics if `gear` does not belong to this train.
    pub fn engage_gear(&mut self, gear: GearId, engaged: bool) {
        let Some(state) = self.states.get_mut(gear.idx as usize) else {
            panic!("unknown GearId: {gear:?}");
        };
        *state = state.request(engaged);
    }

    /// Defers completion of engagement by one more rotation.
    ///
    /// Only meaningful from [`GearObserver::on_engaged`]: it puts the gear
    /// back into the engaging state, suppressing the tick and rotation hooks
    /// that would otherwise follow. Calling it from any other hook is a
    /// contract violation (checked in debug builds).
    pub fn delay_engagement(&mut self) {
        debug_assert!(
            self.hook == Hook::Engaged,
            "delay_engagement called outside on_engaged ({:?})",
            self.hook
        );
        let state = &mut self.states[self.id.idx as usize];
        if *state == EngagementState::Engaged {
            *state = EngagementState::Engaging;
        }
    }
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// A hook handler: a function invoked on the owner with the firing gear.
pub type Handler<T> = fn(&mut T, &mut GearContext<'_>);

/// Binds a gear's hooks to handler functions on an owner value.
///
/// The binding owns `T`, so the owner lives exactly as long as the gear's
/// observer slot. Owners that must be shared with code outside the train can
/// be recovered with [`GearTrain::observer`](crate::gear::GearTrain::observer),
/// or can themselves be a shared handle.
///
/// ```
/// use gearbox_core::gear::GearTrain;
/// use gearbox_core::mesh::Mesh;
/// use gearbox_core::observer::{Binding, GearContext};
///
/// #[derive(Default)]
/// struct Uptime {
///     seconds: u32,
/// }
///
/// impl Uptime {
///     fn increment(&mut self, _gear: &mut GearContext<'_>) {
///         self.seconds += 1;
///     }
/// }
///
/// let mut train = GearTrain::new();
/// let drive = train.add_bare_gear();
/// let seconds = train.add_gear(Binding::new(Uptime::default()).with_rotation(Uptime::increment));
/// train.connect(drive, seconds, Mesh::new(10));
///
/// for _ in 0..25 {
///     train.tick(drive);
/// }
/// let uptime = train.observer::<Binding<Uptime>>(seconds).unwrap();
/// assert_eq!(uptime.owner().seconds, 2);
/// ```
pub struct Binding<T> {
    owner: T,
    engaged: Option<Handler<T>>,
    tick: Option<Handler<T>>,
    rotation: Option<Handler<T>>,
    disengaged: Option<Handler<T>>,
}

impl<T> Binding<T> {
    /// Creates a binding with no handlers.
    #[must_use]
    pub fn new(owner: T) -> Self {
        Self {
            owner,
            engaged: None,
            tick: None,
            rotation: None,
            disengaged: None,
        }
    }

    /// Binds the engaged hook.
    #[must_use]
    pub fn with_engaged(mut self, handler: Handler<T>) -> Self {
        self.engaged = Some(handler);
        self
    }

    /// Binds the tick hook.
    #[must_use]
    pub fn with_tick(mut self, handler: Handler<T>) -> Self {
        self.tick = Some(handler);
        self
    }

    /// Binds the rotation hook.
    #[must_use]
    pub fn with_rotation(mut self, handler: Handler<T>) -> Self {
        self.rotation = Some(handler);
        self
    }

    /// Binds the disengaged hook.
    #[must_use]
    pub fn with_disengaged(mut self, handler: Handler<T>) -> Self {
        self.disengaged = Some(handler);
        self
    }

    /// Replaces (or clears) the handler for `hook`.
    pub fn set_handler(&mut self, hook: Hook, handler: Option<Handler<T>>) {
        match hook {
            Hook::Engaged => self.engaged = handler,
            Hook::Tick => self.tick = handler,
            Hook::Rotation => self.rotation = handler,
            Hook::Disengaged => self.disengaged = handler,
        }
    }

    /// Returns `true` if a handler is bound for `hook`.
    #[must_use]
    pub fn is_bound(&self, hook: Hook) -> bool {
        match hook {
            Hook::Engaged => self.engaged.is_some(),
            Hook::Tick => self.tick.is_some(),
            Hook::Rotation => self.rotation.is_some(),
            Hook::Disengaged => self.disengaged.is_some(),
        }
    }

    /// Returns the owner.
    #[must_use]
    pub fn owner(&self) -> &T {
        &self.owner
    }

    /// Returns the owner mutably.
    #[must_use]
    pub fn owner_mut(&mut self) -> &mut T {
        &mut self.owner
    }

    /// Consumes the binding and returns the owner.
    #[must_use]
    pub fn into_owner(self) -> T {
        self.owner
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("owner", &self.owner)
            .field("engaged", &self.engaged.is_some())
            .field("tick", &self.tick.is_some())
            .field("rotation", &self.rotation.is_some())
            .field("disengaged", &self.disengaged.is_some())
            .finish()
    }
}

impl<T: 'static> GearObserver for Binding<T> {
    fn on_engaged(&mut self, gear: &mut GearContext<'_>) {
        if let Some(handler) = self.engaged {
            handler(&mut self.owner, gear);
        }
    }

    fn on_tick(&mut self, gear: &mut GearContext<'_>) {
        if let Some(handler) = self.tick {
            handler(&mut self.owner, gear);
        }
    }

    fn on_rotation(&mut self, gear: &mut GearContext<'_>) {
        if let Some(handler) = self.rotation {
            handler(&mut self.owner, gear);
        }
    }

    fn on_disengaged(&mut self, gear: &mut GearContext<'_>) {
        if let Some(handler) = self.disengaged {
            handler(&mut self.owner, gear);
        }
    }
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// Counts completed rotations while the gear is engaged.
///
/// The count wraps on overflow, which no realistic tick rate reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Counter {
    total: u64,
}

impl Counter {
    /// Creates a counter starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { total: 0 }
    }

    /// Returns the number of rotations counted.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.total
    }
}

impl GearObserver for Counter {
    fn on_rotation(&mut self, gear: &mut GearContext<'_>) {
        _ = gear;
        self.total = self.total.wrapping_add(1);
    }
}
