//! Match logging
//!
//! Records gameplay events for post-match analysis and the headless report:
//! a chronological entry list plus per-bot stats, phase history and round
//! results.
//!
//! Entries and bot records are bounded by `LogLimits`. Past a limit the
//! oldest are dropped and counted, so a long run keeps its most recent
//! rounds.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

use crate::combat::events::{
    AbilityReadyEvent, AbilityTriggeredEvent, DamageEvent, DeathEvent, LeveledUpEvent,
    MatchCompletedEvent, PhaseChangedEvent, ProjectileImpactEvent, ReloadStartedEvent,
    RoundEndedEvent, WeaponFiredEvent,
};
use crate::data::Team;
use crate::sim::match_flow::MatchPhase;

/// A single entry in the match log
#[derive(Debug, Clone, Serialize)]
pub struct MatchLogEntry {
    /// Timestamp in simulation time (seconds)
    pub timestamp: f32,
    pub event_type: MatchLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchLogEventType {
    Damage,
    Death,
    Reload,
    AbilityUsed,
    AbilityReady,
    LevelUp,
    /// Phase changes, round results, match end
    MatchEvent,
}

/// Running totals for one spawned bot
#[derive(Debug, Clone, Default, Serialize)]
pub struct BotStats {
    pub name: String,
    pub team: Team,
    pub kills: u32,
    pub deaths: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub abilities_used: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundResult {
    pub round: u32,
    pub winner: Team,
    /// Simulation time the round ended at
    pub ended_at: f32,
}

/// How much history the log keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLimits {
    pub max_entries: usize,
    pub max_bots: usize,
}

impl Default for LogLimits {
    fn default() -> Self {
        Self {
            max_entries: 20_000,
            max_bots: 1_024,
        }
    }
}

/// The match log resource
#[derive(Resource, Default, Debug)]
pub struct MatchLog {
    /// Retained log entries in chronological order
    pub entries: VecDeque<MatchLogEntry>,
    /// Current simulation time
    pub match_time: f32,
    pub phase_history: Vec<(f32, MatchPhase)>,
    pub rounds: Vec<RoundResult>,
    pub winner: Option<Team>,
    bots: Vec<BotStats>,
    index: HashMap<Entity, usize>,
    limits: LogLimits,
    dropped_entries: usize,
    dropped_bots: usize,
}

impl MatchLog {
    pub fn with_limits(limits: LogLimits) -> Self {
        Self {
            limits,
            ..default()
        }
    }

    /// Clear the log for a new match. Limits are kept.
    pub fn clear(&mut self) {
        *self = Self::with_limits(self.limits);
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: MatchLogEventType, message: String) {
        self.entries.push_back(MatchLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
        });
        while self.entries.len() > self.limits.max_entries {
            self.entries.pop_front();
            self.dropped_entries += 1;
        }
    }

    /// Entries discarded to stay within the limit.
    pub fn dropped_entries(&self) -> usize {
        self.dropped_entries
    }

    /// Bot records discarded to stay within the limit.
    pub fn dropped_bots(&self) -> usize {
        self.dropped_bots
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: MatchLogEventType) -> Vec<&MatchLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&MatchLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Start tracking stats for a freshly spawned bot. The oldest record is
    /// forgotten once the limit is reached.
    pub fn register_bot(&mut self, entity: Entity, team: Team, name: &str) {
        self.index.insert(entity, self.bots.len());
        self.bots.push(BotStats {
            name: name.to_string(),
            team,
            level: 1,
            ..default()
        });

        let excess = self.bots.len().saturating_sub(self.limits.max_bots);
        if excess > 0 {
            self.bots.drain(..excess);
            self.index.retain(|_, position| *position >= excess);
            for position in self.index.values_mut() {
                *position -= excess;
            }
            self.dropped_bots += excess;
        }
    }

    /// Stats for the retained bots, in spawn order.
    pub fn bots(&self) -> &[BotStats] {
        &self.bots
    }

    pub fn bot_stats(&self, entity: Entity) -> Option<&BotStats> {
        self.index.get(&entity).map(|&i| &self.bots[i])
    }

    fn stats_mut(&mut self, entity: Entity) -> Option<&mut BotStats> {
        self.index.get(&entity).map(|&i| &mut self.bots[i])
    }

    /// Display name for `entity`, or its debug id if it was never registered.
    pub fn name_of(&self, entity: Entity) -> String {
        self.bot_stats(entity)
            .map(|stats| stats.name.clone())
            .unwrap_or_else(|| format!("{:?}", entity))
    }

    /// Record a landed hit and update both sides' totals.
    pub fn log_damage(&mut self, source: Option<Entity>, target: Entity, amount: f32, killing_blow: bool) {
        if let Some(stats) = source.and_then(|source| self.stats_mut(source)) {
            stats.damage_dealt += amount;
        }
        if let Some(stats) = self.stats_mut(target) {
            stats.damage_taken += amount;
        }

        let attacker = source
            .map(|source| self.name_of(source))
            .unwrap_or_else(|| "Unknown".to_string());
        let suffix = if killing_blow { " (killing blow)" } else { "" };
        let message = format!("{} hit {} for {:.0}{}", attacker, self.name_of(target), amount, suffix);
        self.log(MatchLogEventType::Damage, message);
    }

    /// Record a death. Only kills on the other team count toward the
    /// killer's total, the same rule kill XP follows.
    pub fn log_death(&mut self, entity: Entity, killer: Option<Entity>) {
        let victim_team = self.bot_stats(entity).map(|stats| stats.team);
        if let Some(stats) = self.stats_mut(entity) {
            stats.deaths += 1;
        }
        let killer = killer.filter(|killer| *killer != entity);
        if let Some(stats) = killer.and_then(|killer| self.stats_mut(killer)) {
            if Some(stats.team) != victim_team {
                stats.kills += 1;
            }
        }

        let message = match killer {
            Some(killer) => format!("{} was killed by {}", self.name_of(entity), self.name_of(killer)),
            None => format!("{} died", self.name_of(entity)),
        };
        self.log(MatchLogEventType::Death, message);
    }

    pub fn log_phase(&mut self, phase: MatchPhase, duration: f32) {
        self.phase_history.push((self.match_time, phase));
        self.log(
            MatchLogEventType::MatchEvent,
            format!("Phase {} ({:.0}s)", phase.name(), duration),
        );
    }

    pub fn log_round(&mut self, round: u32, winner: Team) {
        self.rounds.push(RoundResult {
            round,
            winner,
            ended_at: self.match_time,
        });
        let message = match winner {
            Team::None => format!("Round {} ended in a draw", round),
            team => format!("Round {} won by {}", round, team),
        };
        self.log(MatchLogEventType::MatchEvent, message);
    }

    /// Damage dealt by `name`, summed over every bot with that name.
    pub fn damage_dealt_by(&self, name: &str) -> f32 {
        self.bots
            .iter()
            .filter(|stats| stats.name == name)
            .map(|stats| stats.damage_dealt)
            .sum()
    }

    /// Total kills per team.
    pub fn kills_by_team(&self) -> HashMap<Team, u32> {
        let mut kills = HashMap::new();
        for stats in &self.bots {
            *kills.entry(stats.team).or_insert(0) += stats.kills;
        }
        kills
    }
}

/// Copy this tick's events into the match log.
#[allow(clippy::too_many_arguments)]
pub fn record_notifications(
    time: Res<Time>,
    mut log: ResMut<MatchLog>,
    mut damage: EventReader<DamageEvent>,
    mut deaths: EventReader<DeathEvent>,
    mut fired: EventReader<WeaponFiredEvent>,
    mut impacts: EventReader<ProjectileImpactEvent>,
    mut reloads: EventReader<ReloadStartedEvent>,
    mut triggered: EventReader<AbilityTriggeredEvent>,
    mut ready: EventReader<AbilityReadyEvent>,
    mut level_ups: EventReader<LeveledUpEvent>,
    mut phases: EventReader<PhaseChangedEvent>,
    mut rounds: EventReader<RoundEndedEvent>,
    mut completed: EventReader<MatchCompletedEvent>,
) {
    log.match_time = time.elapsed_secs();

    for shot in fired.read() {
        if let Some(stats) = log.stats_mut(shot.shooter) {
            stats.shots_fired += 1;
            if shot.hit.is_some() {
                stats.shots_hit += 1;
            }
        }
    }

    for impact in impacts.read() {
        if let Some(stats) = impact.source.and_then(|source| log.stats_mut(source)) {
            stats.shots_hit += 1;
        }
    }

    for event in damage.read() {
        log.log_damage(event.source, event.target, event.amount, event.killed);
    }

    for event in deaths.read() {
        log.log_death(event.entity, event.killer);
    }

    for event in reloads.read() {
        let message = format!("{} reloading ({:.1}s)", log.name_of(event.entity), event.duration);
        log.log(MatchLogEventType::Reload, message);
    }

    for event in triggered.read() {
        if let Some(stats) = log.stats_mut(event.entity) {
            stats.abilities_used += 1;
        }
        let target = match event.target {
            Some(target) if target != event.entity => format!(" on {}", log.name_of(target)),
            _ => String::new(),
        };
        let message = format!(
            "{} used {}{} ({:.0})",
            log.name_of(event.entity),
            event.ability_id,
            target,
            event.value
        );
        log.log(MatchLogEventType::AbilityUsed, message);
    }

    for event in ready.read() {
        let message = format!("{}: {} ready", log.name_of(event.entity), event.ability_id);
        log.log(MatchLogEventType::AbilityReady, message);
    }

    for event in level_ups.read() {
        if let Some(stats) = log.stats_mut(event.entity) {
            stats.level = stats.level.max(event.progress.level);
        }
        let message = format!("{} reached level {}", log.name_of(event.entity), event.progress.level);
        log.log(MatchLogEventType::LevelUp, message);
    }

    for event in phases.read() {
        log.log_phase(event.phase, event.duration);
    }

    for event in rounds.read() {
        log.log_round(event.round, event.winner);
    }

    for event in completed.read() {
        log.winner = Some(event.winner);
        let message = format!(
            "Match complete. {} wins ({} - {})",
            event.winner, event.team_a_wins, event.team_b_wins
        );
        log.log(MatchLogEventType::MatchEvent, message);
    }
}
