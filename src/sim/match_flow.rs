//! Match Phase State Machine
//!
//! ```text
//! Bootstrapping -> Warmup -> Active -> RoundEnd -> Intermission -> Warmup ...
//! ```
//!
//! Each phase runs for its configured duration; when the countdown reaches
//! zero during a tick the machine moves to the next phase (one transition
//! per tick). Entering Active respawns both teams. Leaving Active scores the
//! round for the team with more living bots. The loop keeps going after a
//! team reaches `rounds_to_win`; completion is reported once.
//!
//! `MatchState` itself is plain data that returns `MatchSignal`s, and the
//! `advance_match` system turns those into events.

use bevy::prelude::*;
use serde::Serialize;

use crate::combat::events::{
    MatchCompletedEvent, PhaseChangedEvent, RoundEndedEvent, ScoreChangedEvent, SpawnTeamsRequest,
};
use crate::data::{MatchSettings, Team};

use super::components::Deactivated;
use super::constants::ROUND_END_DURATION;
use super::health::Health;
use super::roster::BotRoster;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum MatchPhase {
    #[default]
    Bootstrapping,
    Warmup,
    Active,
    RoundEnd,
    Intermission,
}

impl MatchPhase {
    pub fn name(&self) -> &'static str {
        match self {
            MatchPhase::Bootstrapping => "Bootstrapping",
            MatchPhase::Warmup => "Warmup",
            MatchPhase::Active => "Active",
            MatchPhase::RoundEnd => "RoundEnd",
            MatchPhase::Intermission => "Intermission",
        }
    }
}

/// Something observers need to hear about after a state change.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchSignal {
    PhaseChanged { phase: MatchPhase, duration: f32 },
    SpawnTeams,
    RoundEnded { round: u32, winner: Team },
    ScoreChanged { team_a_wins: u32, team_b_wins: u32 },
    MatchCompleted { winner: Team, team_a_wins: u32, team_b_wins: u32 },
}

#[derive(Resource, Clone, Debug, Default)]
pub struct MatchState {
    phase: MatchPhase,
    time_remaining: f32,
    team_a_wins: u32,
    team_b_wins: u32,
    rounds_played: u32,
    complete: bool,
    winner: Team,
}

impl MatchState {
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn team_a_wins(&self) -> u32 {
        self.team_a_wins
    }

    pub fn team_b_wins(&self) -> u32 {
        self.team_b_wins
    }

    pub fn wins(&self, team: Team) -> u32 {
        match team {
            Team::A => self.team_a_wins,
            Team::B => self.team_b_wins,
            Team::None => 0,
        }
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Team that first reached `rounds_to_win`; `Team::None` until then.
    pub fn winner(&self) -> Team {
        self.winner
    }

    /// Leave Bootstrapping for Warmup. Without settings the machine stays
    /// where it is.
    pub fn initialize(&mut self, settings: Option<&MatchSettings>) -> Vec<MatchSignal> {
        let Some(settings) = settings else {
            error!("Match flow needs match settings to start");
            return Vec::new();
        };
        if self.phase != MatchPhase::Bootstrapping {
            return Vec::new();
        }

        let mut signals = Vec::new();
        self.enter(MatchPhase::Warmup, settings.warmup_duration, &mut signals);
        signals
    }

    /// Count down and take at most one transition. `leading_team` is only
    /// asked when an Active round ends.
    pub fn tick(
        &mut self,
        dt: f32,
        settings: &MatchSettings,
        leading_team: impl FnOnce() -> Team,
    ) -> Vec<MatchSignal> {
        let mut signals = Vec::new();
        if self.phase == MatchPhase::Bootstrapping {
            return signals;
        }

        self.time_remaining -= dt;
        if self.time_remaining > 0.0 {
            return signals;
        }

        match self.phase {
            MatchPhase::Bootstrapping => {}
            MatchPhase::Warmup => {
                signals.push(MatchSignal::SpawnTeams);
                self.enter(MatchPhase::Active, settings.round_duration, &mut signals);
            }
            MatchPhase::Active => {
                self.end_round(leading_team(), settings, &mut signals);
                self.enter(MatchPhase::RoundEnd, ROUND_END_DURATION, &mut signals);
            }
            MatchPhase::RoundEnd => {
                self.enter(MatchPhase::Intermission, settings.intermission_duration, &mut signals);
            }
            MatchPhase::Intermission => {
                self.enter(MatchPhase::Warmup, settings.warmup_duration, &mut signals);
            }
        }
        signals
    }

    fn end_round(&mut self, winner: Team, settings: &MatchSettings, signals: &mut Vec<MatchSignal>) {
        match winner {
            Team::A => self.team_a_wins += 1,
            Team::B => self.team_b_wins += 1,
            Team::None => {}
        }
        self.rounds_played += 1;

        signals.push(MatchSignal::RoundEnded {
            round: self.rounds_played,
            winner,
        });
        signals.push(MatchSignal::ScoreChanged {
            team_a_wins: self.team_a_wins,
            team_b_wins: self.team_b_wins,
        });

        if self.complete {
            return;
        }
        let reached = |wins: u32| wins >= settings.rounds_to_win;
        if reached(self.team_a_wins) || reached(self.team_b_wins) {
            self.complete = true;
            self.winner = if reached(self.team_a_wins) { Team::A } else { Team::B };
            signals.push(MatchSignal::MatchCompleted {
                winner: self.winner,
                team_a_wins: self.team_a_wins,
                team_b_wins: self.team_b_wins,
            });
        }
    }

    fn enter(&mut self, phase: MatchPhase, duration: f32, signals: &mut Vec<MatchSignal>) {
        self.phase = phase;
        self.time_remaining = duration;
        signals.push(MatchSignal::PhaseChanged { phase, duration });
    }
}

/// Drive the phase machine and announce what happened.
#[allow(clippy::too_many_arguments)]
pub fn advance_match(
    time: Res<Time>,
    settings: Option<Res<MatchSettings>>,
    mut state: ResMut<MatchState>,
    roster: Res<BotRoster>,
    bots: Query<&Health, Without<Deactivated>>,
    mut phase_events: EventWriter<PhaseChangedEvent>,
    mut round_events: EventWriter<RoundEndedEvent>,
    mut score_events: EventWriter<ScoreChangedEvent>,
    mut completed_events: EventWriter<MatchCompletedEvent>,
    mut spawn_requests: EventWriter<SpawnTeamsRequest>,
) {
    let Some(settings) = settings else {
        return;
    };

    let leading_team = || {
        roster.leading_team(|entity| bots.get(entity).is_ok_and(Health::is_alive))
    };
    let signals = state.tick(time.delta_secs(), &settings, leading_team);

    for signal in signals {
        match signal {
            MatchSignal::PhaseChanged { phase, duration } => {
                info!("Match phase: {} ({:.0}s)", phase.name(), duration);
                phase_events.send(PhaseChangedEvent { phase, duration });
            }
            MatchSignal::SpawnTeams => {
                spawn_requests.send(SpawnTeamsRequest);
            }
            MatchSignal::RoundEnded { round, winner } => {
                info!("Round {} ended, winner: {}", round, winner);
                round_events.send(RoundEndedEvent { round, winner });
            }
            MatchSignal::ScoreChanged {
                team_a_wins,
                team_b_wins,
            } => {
                score_events.send(ScoreChangedEvent {
                    team_a_wins,
                    team_b_wins,
                });
            }
            MatchSignal::MatchCompleted {
                winner,
                team_a_wins,
                team_b_wins,
            } => {
                info!("Match complete. {} wins ({} - {})", winner, team_a_wins, team_b_wins);
                completed_events.send(MatchCompletedEvent {
                    winner,
                    team_a_wins,
                    team_b_wins,
                });
            }
        }
    }
}
