//! Per-source match lifecycle.
//!
//! Each configured source owns exactly one [`StateMachine`]. The machine is
//! driven by a single worker task that drains the source's queue in arrival
//! order, so all match state is mutated from one place and needs no locking.
//! The only value shared with other tasks is a [`StatusSnapshot`] published
//! through an `ArcSwap` after every line, read by the router for logging.
//!
//! Transitions are data driven. [`shared::classify`] maps a line to a marker and
//! [`plan`] looks the marker up in the current state's rule table.

use crate::collaborators::{backfill_roster, extract_records, select_started, ArchiveRequest, Collaborators};
use crate::config::Source;
use crate::line_buffer::{LineBuffer, LineSink};
use crate::match_data::MatchAccumulator;
use arc_swap::ArcSwap;
use log::{debug, error, info, warn};
use shared::{classify, LogEvent, Marker};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchState {
    Pregame,
    Game,
    RoundReset,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchState::Pregame => write!(f, "pregame"),
            MatchState::Game => write!(f, "game"),
            MatchState::RoundReset => write!(f, "round reset"),
        }
    }
}

/// What a state machine does with one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remember the map name announced before the match.
    RecordMap,
    /// Round started from pregame: resolve the match and begin accumulating.
    StartMatch,
    /// Keep the line and fold it into the stat table.
    Accumulate,
    /// A round was won; wait for scores and the next round.
    EnterRoundReset,
    /// Keep a team score reported between rounds.
    UpdateScore,
    /// Next round of the same match.
    ResumeGame,
    /// Keep the line without touching any state.
    Retain,
    /// Match is over: archive, persist and flush.
    EndMatch,
    /// A new log stream began mid-match: flush without archiving.
    Discard,
    Ignore,
}

const PREGAME_RULES: &[(Marker, Action)] = &[
    (Marker::MapLoaded, Action::RecordMap),
    (Marker::RoundStart, Action::StartMatch),
];

const GAME_RULES: &[(Marker, Action)] = &[
    (Marker::RoundWin, Action::EnterRoundReset),
    (Marker::LogClosed, Action::EndMatch),
    (Marker::GameOver, Action::EndMatch),
];

const ROUND_RESET_RULES: &[(Marker, Action)] = &[
    (Marker::TeamScore, Action::UpdateScore),
    (Marker::RoundStart, Action::ResumeGame),
    (Marker::LogClosed, Action::EndMatch),
    (Marker::GameOver, Action::EndMatch),
    (Marker::PlayersRemoved, Action::EndMatch),
    (Marker::LogStarted, Action::Discard),
    (Marker::RoundLength, Action::Retain),
];

/// Rule table and fallback action for `state`.
fn rules(state: MatchState) -> (&'static [(Marker, Action)], Action) {
    match state {
        MatchState::Pregame => (PREGAME_RULES, Action::Ignore),
        MatchState::Game => (GAME_RULES, Action::Accumulate),
        MatchState::RoundReset => (ROUND_RESET_RULES, Action::Ignore),
    }
}

/// Decides the action for a line carrying `marker` while in `state`.
pub fn plan(state: MatchState, marker: Option<Marker>) -> Action {
    let (table, fallback) = rules(state);

    marker
        .and_then(|marker| {
            table
                .iter()
                .find(|(candidate, _)| *candidate == marker)
                .map(|(_, action)| *action)
        })
        .unwrap_or(fallback)
}

/// Coarse view of a state machine for readers outside its worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: MatchState,
    pub match_id: u64,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            state: MatchState::Pregame,
            match_id: 0,
        }
    }
}

pub type SharedStatus = Arc<ArcSwap<StatusSnapshot>>;

pub struct StateMachine {
    state: MatchState,
    accumulator: MatchAccumulator,
    buffer: Box<dyn LineSink>,
    collaborators: Collaborators,
    status: SharedStatus,
}

impl StateMachine {
    pub fn new(source: Source, collaborators: Collaborators) -> Self {
        Self::with_sink(source, collaborators, Box::new(LineBuffer::new()))
    }

    pub fn with_sink(source: Source, collaborators: Collaborators, buffer: Box<dyn LineSink>) -> Self {
        Self {
            state: MatchState::Pregame,
            accumulator: MatchAccumulator::new(source),
            buffer,
            collaborators,
            status: Arc::new(ArcSwap::from_pointee(StatusSnapshot::default())),
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn accumulator(&self) -> &MatchAccumulator {
        &self.accumulator
    }

    pub fn buffered_log(&self) -> &str {
        self.buffer.contents()
    }

    /// Handle for reading this machine's status from other tasks.
    pub fn status_handle(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// Drains `lines` until every sender is gone.
    pub async fn run(mut self, mut lines: mpsc::UnboundedReceiver<String>) {
        debug!("{}: worker started", self.accumulator);

        while let Some(line) = lines.recv().await {
            self.process_line(&line).await;
        }

        info!("{}: line queue closed, worker stopping", self.accumulator);
    }

    /// Applies one line. The state change always completes, even when a
    /// collaborator call made along the way fails.
    pub async fn process_line(&mut self, line: &str) {
        let event = classify(line);
        let action = plan(self.state, event.as_ref().map(LogEvent::marker));

        match action {
            Action::RecordMap => {
                if let Some(LogEvent::MapLoaded { map }) = event {
                    debug!("{}: map loaded {}", self.accumulator, map);
                    self.accumulator.set_map(map);
                }
            }
            Action::StartMatch => {
                self.state = MatchState::Game;
                self.start_match(line).await;
            }
            Action::Accumulate => {
                self.buffer.write_line(line);
                self.accumulator.record_line(line);
            }
            Action::EnterRoundReset => {
                self.buffer.write_line(line);
                self.state = MatchState::RoundReset;
            }
            Action::UpdateScore => {
                self.buffer.write_line(line);
                if let Some(LogEvent::TeamScore { team, score }) = event {
                    self.accumulator.set_team_score(team, score);
                    debug!("{}: {} score is {}", self.accumulator, team, score);
                }
            }
            Action::ResumeGame => {
                self.buffer.write_line(line);
                self.state = MatchState::Game;
            }
            Action::Retain => {
                self.buffer.write_line(line);
            }
            Action::EndMatch => {
                if self.state == MatchState::Game {
                    self.accumulator.record_line(line);
                }
                self.buffer.write_line(line);
                self.state = MatchState::Pregame;
                self.end_match(line).await;
            }
            Action::Discard => {
                warn!(
                    "{}: new log started during match {}, discarding it",
                    self.accumulator,
                    self.accumulator.match_id()
                );
                self.state = MatchState::Pregame;
                self.flush();
            }
            Action::Ignore => {}
        }

        self.publish_status();
    }

    async fn start_match(&mut self, line: &str) {
        self.accumulator.set_start_time(line);
        self.buffer.write_line(line);

        self.resolve_match().await;

        info!(
            "{}: match {} has started on {}",
            self.accumulator,
            self.accumulator.match_id(),
            self.accumulator.map()
        );
    }

    /// Looks up the match id and roster. Failures are logged and leave the
    /// previous values in place.
    async fn resolve_match(&mut self) {
        let resolver = Arc::clone(&self.collaborators.resolver);
        let domain = self.accumulator.domain().to_string();

        match resolver.list_matches(&domain).await {
            Ok(listings) => match select_started(&listings, self.accumulator.map()) {
                Some(listing) => {
                    self.accumulator.set_roster(listing.roster());
                    self.accumulator.set_match_id(listing.number);
                }
                None => warn!(
                    "{}: no started match found on map '{}'",
                    self.accumulator,
                    self.accumulator.map()
                ),
            },
            Err(e) => {
                error!(
                    "{}: failed to get match id on map '{}': {}",
                    self.accumulator,
                    self.accumulator.map(),
                    e
                );
            }
        }

        if self.accumulator.roster().is_empty() {
            return;
        }

        match resolver.fetch_roster(&domain).await {
            Ok(entries) => {
                let resolved = backfill_roster(self.accumulator.roster_mut(), &entries);
                debug!(
                    "{}: resolved {}/{} players",
                    self.accumulator,
                    resolved,
                    self.accumulator.roster().len()
                );
            }
            Err(e) => {
                error!(
                    "{}: failed to resolve player ids for match {}: {}",
                    self.accumulator,
                    self.accumulator.match_id(),
                    e
                );
            }
        }
    }

    async fn end_match(&mut self, line: &str) {
        self.accumulator.set_duration_until(line);

        let request = ArchiveRequest {
            map: self.accumulator.map(),
            domain: self.accumulator.domain(),
            match_id: self.accumulator.match_id(),
            log: self.buffer.contents(),
        };
        if let Err(e) = self.collaborators.archiver.archive(request).await {
            error!(
                "{}: failed to archive log of match {} on {}: {}",
                self.accumulator,
                self.accumulator.match_id(),
                self.accumulator.map(),
                e
            );
        }

        let records = extract_records(&self.accumulator);
        let count = records.len();
        if let Err(e) = self.collaborators.persister.persist(records).await {
            error!(
                "{}: failed to persist {} player records of match {}: {}",
                self.accumulator,
                count,
                self.accumulator.match_id(),
                e
            );
        }

        info!(
            "{}: match {} has ended on {} after {}s (score {})",
            self.accumulator,
            self.accumulator.match_id(),
            self.accumulator.map(),
            self.accumulator.duration_secs(),
            self.accumulator.score()
        );

        self.flush();
    }

    fn flush(&mut self) {
        self.buffer.clear();
        self.accumulator.flush();
    }

    fn publish_status(&self) {
        let snapshot = StatusSnapshot {
            state: self.state,
            match_id: self.accumulator.match_id(),
        };

        if **self.status.load() != snapshot {
            self.status.store(Arc::new(snapshot));
        }
    }
}
