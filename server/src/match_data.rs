//! Match-scoped state owned by one source's state machine.
//!
//! The accumulator is created once per source and reused across matches:
//! [`MatchAccumulator::flush`] clears the match-scoped fields at match end
//! while the source identity stays fixed.

use crate::config::Source;
use chrono::NaiveDateTime;
use shared::stats::{self, CombatEvent};
use shared::{parse_timestamp, StatTable, SteamId, Team};
use std::fmt;
use std::time::Duration;

/// A player taking part in the current match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    /// Id used by the match roster API
    pub player_id: String,
    /// Resolved log identity, filled in after the roster lookup
    pub steam_id: Option<SteamId>,
    pub class: String,
    pub team: String,
}

impl PlayerIdentity {
    pub fn new(player_id: impl Into<String>, class: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            steam_id: None,
            class: class.into(),
            team: team.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub red: u32,
    pub blue: u32,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.red, self.blue)
    }
}

#[derive(Debug)]
pub struct MatchAccumulator {
    source: Source,
    map: String,
    match_id: u64,
    roster: Vec<PlayerIdentity>,
    stats: StatTable,
    launched_at: Option<NaiveDateTime>,
    duration: Duration,
    score: Score,
}

impl MatchAccumulator {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            map: String::new(),
            match_id: 0,
            roster: Vec::new(),
            stats: StatTable::new(),
            launched_at: None,
            duration: Duration::ZERO,
            score: Score::default(),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn domain(&self) -> &str {
        &self.source.domain
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn set_map(&mut self, map: impl Into<String>) {
        self.map = map.into();
    }

    /// External match id, `0` while unresolved.
    pub fn match_id(&self) -> u64 {
        self.match_id
    }

    pub fn set_match_id(&mut self, id: u64) {
        self.match_id = id;
    }

    pub fn roster(&self) -> &[PlayerIdentity] {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut [PlayerIdentity] {
        &mut self.roster
    }

    /// Replaces the roster wholesale. Only done at match start.
    pub fn set_roster(&mut self, roster: Vec<PlayerIdentity>) {
        self.roster = roster;
    }

    pub fn stats(&self) -> &StatTable {
        &self.stats
    }

    /// Runs the stats extractor over `line` and merges the result.
    pub fn record_line(&mut self, line: &str) -> Option<CombatEvent> {
        stats::apply(line, &mut self.stats)
    }

    /// Takes the match start time from the timestamp of `line`.
    pub fn set_start_time(&mut self, line: &str) {
        self.launched_at = parse_timestamp(line);
    }

    /// Measures the match from its start to the timestamp of `line`.
    ///
    /// Missing timestamps or a clock running backwards yield a zero duration.
    pub fn set_duration_until(&mut self, line: &str) {
        self.duration = match (self.launched_at, parse_timestamp(line)) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        };
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration.as_secs()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn set_team_score(&mut self, team: Team, score: u32) {
        match team {
            Team::Red => self.score.red = score,
            Team::Blue => self.score.blue = score,
        }
    }

    /// Resets map, match id, stat table and score for the next match.
    pub fn flush(&mut self) {
        self.map.clear();
        self.match_id = 0;
        self.stats.clear();
        self.score = Score::default();
    }
}

impl fmt::Display for MatchAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
