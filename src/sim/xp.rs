//! XP and Leveling
//!
//! `XpService` tracks level and XP per registered entity against that
//! entity's race. Notifications are queued inside the service and turned
//! into events by `flush_xp_notifications`, so callers outside a system
//! (tests, the `Simulation` facade) produce the same events as gameplay.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::combat::events::{LeveledUpEvent, XpProgressChangedEvent};
use crate::data::RaceDefinition;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: u32,
    pub current_xp: f32,
    /// XP needed to reach the next level
    pub xp_to_next: f32,
}

#[derive(Clone, Debug)]
struct XpEntry {
    race: Arc<RaceDefinition>,
    level: u32,
    xp: f32,
}

impl XpEntry {
    fn progress(&self) -> LevelProgress {
        LevelProgress {
            level: self.level,
            current_xp: self.xp,
            xp_to_next: self.race.xp_to_reach_level(self.level + 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum XpNotification {
    ProgressChanged(Entity, LevelProgress),
    LeveledUp(Entity, LevelProgress),
}

/// Outcome of an XP award.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XpUpdate {
    pub levels_gained: u32,
    pub progress: LevelProgress,
}

#[derive(Resource, Default, Debug)]
pub struct XpService {
    entries: HashMap<Entity, XpEntry>,
    outbox: Vec<XpNotification>,
}

impl XpService {
    /// Start tracking `entity` at level 1, or switch the race of a tracked
    /// entity while keeping its progress.
    pub fn register(&mut self, entity: Entity, race: Arc<RaceDefinition>) -> LevelProgress {
        let entry = self
            .entries
            .entry(entity)
            .and_modify(|entry| entry.race = Arc::clone(&race))
            .or_insert_with(|| XpEntry {
                race,
                level: 1,
                xp: 0.0,
            });
        let progress = entry.progress();
        self.outbox.push(XpNotification::ProgressChanged(entity, progress));
        progress
    }

    pub fn unregister(&mut self, entity: Entity) {
        if self.entries.remove(&entity).is_some() {
            self.outbox
                .push(XpNotification::ProgressChanged(entity, LevelProgress::default()));
        }
    }

    pub fn is_registered(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    /// Add XP and level up as many times as the total allows. Ignores
    /// non-positive amounts and unknown entities.
    pub fn award_xp(&mut self, entity: Entity, amount: f32) -> Option<XpUpdate> {
        if amount <= 0.0 {
            return None;
        }
        let entry = self.entries.get_mut(&entity)?;

        entry.xp += amount;
        let mut levels_gained = 0;
        loop {
            let threshold = entry.race.xp_to_reach_level(entry.level + 1);
            if threshold <= 0.0 || entry.xp < threshold {
                break;
            }
            entry.xp -= threshold;
            entry.level += 1;
            levels_gained += 1;
            self.outbox
                .push(XpNotification::LeveledUp(entity, entry.progress()));
        }

        let progress = entry.progress();
        self.outbox.push(XpNotification::ProgressChanged(entity, progress));
        Some(XpUpdate {
            levels_gained,
            progress,
        })
    }

    /// Current progress; `(0, 0, 0)` for unregistered entities.
    pub fn progress(&self, entity: Entity) -> LevelProgress {
        self.entries
            .get(&entity)
            .map(XpEntry::progress)
            .unwrap_or_default()
    }

    pub fn drain_notifications(&mut self) -> Vec<XpNotification> {
        std::mem::take(&mut self.outbox)
    }
}

/// Turn queued XP notifications into events.
pub fn flush_xp_notifications(
    mut xp: ResMut<XpService>,
    mut progress_events: EventWriter<XpProgressChangedEvent>,
    mut level_events: EventWriter<LeveledUpEvent>,
) {
    for notification in xp.drain_notifications() {
        match notification {
            XpNotification::ProgressChanged(entity, progress) => {
                progress_events.send(XpProgressChangedEvent { entity, progress });
            }
            XpNotification::LeveledUp(entity, progress) => {
                info!("{:?} reached level {}", entity, progress.level);
                level_events.send(LeveledUpEvent { entity, progress });
            }
        }
    }
}
