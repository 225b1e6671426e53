// Copyright 2026 the Gearbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick propagation.
//!
//! One drive tick walks the tree depth first. For each gear it reaches:
//!
//! 1. The step is added to the phase. Hooks observe this new value.
//! 2. Without a completed rotation, an engaged gear fires its tick hook and
//!    a disengaging gear finishes disengaging. Its children are not ticked.
//! 3. With a completed rotation, in order: an engaging gear finishes
//!    engaging, an engaged gear fires its tick and rotation hooks, and a
//!    disengaging gear finishes disengaging. Only then does the phase wrap,
//!    and every child is ticked in priority order, whatever this gear's own
//!    state.

use crate::observer::{self, GearContext, Hook};
use crate::trace::{GearTickEvent, HookEvent, StateChangeEvent, Tracer};

use super::engagement::EngagementState;
use super::id::{GearId, INVALID};
use super::store::GearTrain;

impl GearTrain {
    /// Delivers one tick from the external clock source to a drive gear.
    ///
    /// Returns after every affected descendant has been processed.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this train. In debug builds,
    /// also panics if `root` is driven by another gear.
    pub fn tick(&mut self, root: GearId) {
        self.tick_with(root, &mut Tracer::none());
    }

    /// Like [`tick`](Self::tick), reporting propagation to `tracer`.
    ///
    /// # Panics
    ///
    /// Same as [`tick`](Self::tick).
    pub fn tick_with(&mut self, root: GearId, tracer: &mut Tracer<'_>) {
        self.validate(root);
        debug_assert!(
            self.parent[root.idx as usize] == INVALID,
            "{root:?} is driven by another gear and must not be ticked directly"
        );
        self.epoch = self.epoch.wrapping_add(1);
        self.tick_gear(root.idx, 0, tracer);
    }

    fn tick_gear(&mut self, idx: u32, depth: u32, tracer: &mut Tracer<'_>) {
        let i = idx as usize;
        let ratio = u32::from(self.ratio[i]);
        self.phase[i] += u32::from(self.step[i]);
        let rotated = self.phase[i] >= ratio;

        tracer.gear_tick(&GearTickEvent {
            epoch: self.epoch,
            gear_index: idx,
            depth,
            phase: self.phase[i],
            ratio: self.ratio[i],
            rotated,
        });

        if !rotated {
            match self.state[i] {
                EngagementState::Engaged => self.fire(idx, Hook::Tick, tracer),
                EngagementState::Disengaging => {
                    self.settle(idx, EngagementState::Disengaged, tracer);
                    self.fire(idx, Hook::Disengaged, tracer);
                }
                EngagementState::Engaging | EngagementState::Disengaged => {}
            }
            return;
        }

        if self.state[i] == EngagementState::Engaging {
            self.settle(idx, EngagementState::Engaged, tracer);
            self.fire(idx, Hook::Engaged, tracer);
            // on_engaged may have delayed or cancelled the engagement.
            if self.state[i] != EngagementState::Engaged {
                self.report(idx, EngagementState::Engaged, self.state[i], tracer);
            }
        }
        if self.state[i] == EngagementState::Engaged {
            self.fire(idx, Hook::Tick, tracer);
            self.fire(idx, Hook::Rotation, tracer);
        }
        if self.state[i] == EngagementState::Disengaging {
            self.settle(idx, EngagementState::Disengaged, tracer);
            self.fire(idx, Hook::Disengaged, tracer);
        }

        // Hooks above read the pre-wrap phase.
        self.phase[i] -= ratio;

        for n in 0..self.children[i].len() {
            let child = self.children[i][n];
            self.tick_gear(child, depth + 1, tracer);
        }
    }

    /// Completes a pending transition.
    fn settle(&mut self, idx: u32, to: EngagementState, tracer: &mut Tracer<'_>) {
        let from = core::mem::replace(&mut self.state[idx as usize], to);
        self.report(idx, from, to, tracer);
    }

    fn report(
        &self,
        idx: u32,
        from: EngagementState,
        to: EngagementState,
        tracer: &mut Tracer<'_>,
    ) {
        tracer.state_change(&StateChangeEvent {
            epoch: self.epoch,
            gear_index: idx,
            from,
            to,
        });
    }

    /// Invokes `hook` on the gear's observer, if it has one.
    fn fire(&mut self, idx: u32, hook: Hook, tracer: &mut Tracer<'_>) {
        let i = idx as usize;
        tracer.hook(&HookEvent {
            epoch: self.epoch,
            gear_index: idx,
            hook,
            phase: self.phase[i],
        });

        let Some(observer) = self.observers[i].as_deref_mut() else {
            return;
        };
        let mut gear = GearContext {
            id: GearId { idx },
            hook,
            phase: self.phase[i],
            ratio: self.ratio[i],
            step: self.step[i],
            states: &mut self.state,
        };
        observer::dispatch(observer, &mut gear);
    }
}
