//! Deferred Actions
//!
//! Timed effects (boost windows, post-death deactivation) are queued in a
//! min-heap keyed by simulation time. Each tick the due entries are popped
//! and applied if their owner still exists. Despawning an owner cancels
//! everything it had pending.

use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::components::{Deactivated, Motor};
use super::weapons::Combat;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimedAction {
    /// Remove a speed bonus granted earlier
    EndSpeedBoost(f32),
    /// Remove a damage bonus granted earlier
    EndDamageBoost(f32),
    /// Take a dead bot out of the world
    Deactivate,
}

#[derive(Clone, Debug)]
struct Scheduled {
    at: f32,
    sequence: u64,
    owner: Entity,
    action: TimedAction,
}

// Reversed so BinaryHeap pops the earliest entry; sequence keeps FIFO order
// between entries due at the same time.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

#[derive(Resource, Default, Debug)]
pub struct DeferredActions {
    queue: BinaryHeap<Scheduled>,
    next_sequence: u64,
}

impl DeferredActions {
    pub fn schedule(&mut self, now: f32, delay: f32, owner: Entity, action: TimedAction) {
        self.queue.push(Scheduled {
            at: now + delay.max(0.0),
            sequence: self.next_sequence,
            owner,
            action,
        });
        self.next_sequence += 1;
    }

    /// Remove and return every action due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: f32) -> Vec<(Entity, TimedAction)> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|next| next.at <= now) {
            if let Some(entry) = self.queue.pop() {
                due.push((entry.owner, entry.action));
            }
        }
        due
    }

    pub fn cancel_owner(&mut self, owner: Entity) {
        self.queue.retain(|entry| entry.owner != owner);
    }

    pub fn pending_for(&self, owner: Entity) -> usize {
        self.queue.iter().filter(|entry| entry.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Apply every deferred action that has come due.
pub fn run_deferred_actions(
    time: Res<Time>,
    mut commands: Commands,
    mut deferred: ResMut<DeferredActions>,
    mut owners: Query<(&mut Motor, &mut Combat)>,
) {
    for (owner, action) in deferred.pop_due(time.elapsed_secs()) {
        let Ok((mut motor, mut combat)) = owners.get_mut(owner) else {
            continue;
        };

        match action {
            TimedAction::EndSpeedBoost(value) => {
                motor.speed_bonus = (motor.speed_bonus - value).max(0.0);
            }
            TimedAction::EndDamageBoost(value) => {
                combat.damage_bonus = (combat.damage_bonus - value).max(0.0);
            }
            TimedAction::Deactivate => {
                motor.halt();
                commands.entity(owner).insert(Deactivated);
                debug!("{:?} deactivated", owner);
            }
        }
    }
}
