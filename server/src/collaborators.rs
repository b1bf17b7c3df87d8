//! Capabilities the state machine depends on at match boundaries.
//!
//! The state machine only sees these traits. Production wiring uses the HTTP
//! clients in [`crate::requests`] and the SQLite store in [`crate::store`];
//! tests substitute in-memory doubles.

use crate::error::CollaboratorError;
use crate::match_data::{MatchAccumulator, PlayerIdentity};
use async_trait::async_trait;
use serde::Deserialize;
use shared::{PlayerStats, SteamId};
use std::sync::Arc;

/// State the roster API reports for a match that is being played.
pub const STARTED_STATE: &str = "started";

/// Version stamped on every persisted record.
pub const SCHEMA_VERSION: u32 = 1;

/// One player slot of a listed match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slot {
    pub player: String,
    #[serde(rename = "gameClass")]
    pub class: String,
    pub team: String,
}

/// A match as reported by the roster API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchListing {
    pub state: String,
    pub map: String,
    pub number: u64,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl MatchListing {
    /// Roster built from the listing's slots, external ids still unresolved.
    pub fn roster(&self) -> Vec<PlayerIdentity> {
        self.slots
            .iter()
            .map(|slot| PlayerIdentity::new(&slot.player, &slot.class, &slot.team))
            .collect()
    }
}

/// Player id to log identity mapping from the roster API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    #[serde(rename = "steamId")]
    pub steam_id: String,
}

/// Everything the archiver needs to publish one match log.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRequest<'a> {
    pub map: &'a str,
    pub domain: &'a str,
    pub match_id: u64,
    pub log: &'a str,
}

impl ArchiveRequest<'_> {
    pub fn title(&self) -> String {
        format!("{} #{}", self.domain, self.match_id)
    }
}

/// One player's result for one match, as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMatchRecord {
    pub player: PlayerIdentity,
    pub steam_id: SteamId,
    pub stats: PlayerStats,
    pub domain: String,
    pub match_id: u64,
    pub duration_secs: u64,
    pub schema_version: u32,
}

#[async_trait]
pub trait MatchResolver: Send + Sync {
    /// Matches currently known for `domain`.
    async fn list_matches(&self, domain: &str) -> Result<Vec<MatchListing>, CollaboratorError>;

    /// Player id to log identity mapping for `domain`.
    async fn fetch_roster(&self, domain: &str) -> Result<Vec<RosterEntry>, CollaboratorError>;
}

#[async_trait]
pub trait LogArchiver: Send + Sync {
    async fn archive(&self, request: ArchiveRequest<'_>) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait StatsPersister: Send + Sync {
    async fn persist(&self, records: Vec<PlayerMatchRecord>) -> Result<(), CollaboratorError>;
}

/// The set of collaborators shared by every state machine.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn MatchResolver>,
    pub archiver: Arc<dyn LogArchiver>,
    pub persister: Arc<dyn StatsPersister>,
}

/// Picks the match being played on `map`.
pub fn select_started<'a>(listings: &'a [MatchListing], map: &str) -> Option<&'a MatchListing> {
    listings
        .iter()
        .find(|listing| listing.state == STARTED_STATE && listing.map == map)
}

/// Fills in each player's log identity from `entries`. Players without a
/// matching entry, or with an unparsable id, keep what they had.
pub fn backfill_roster(roster: &mut [PlayerIdentity], entries: &[RosterEntry]) -> usize {
    let mut resolved = 0;

    for player in roster.iter_mut() {
        let found = entries
            .iter()
            .find(|entry| entry.id == player.player_id)
            .and_then(|entry| entry.steam_id.parse::<SteamId>().ok());

        if let Some(steam_id) = found {
            player.steam_id = Some(steam_id);
            resolved += 1;
        }
    }

    resolved
}

/// One record per roster player that also appears in the stat table.
pub fn extract_records(acc: &MatchAccumulator) -> Vec<PlayerMatchRecord> {
    acc.roster()
        .iter()
        .filter_map(|player| {
            let steam_id = player.steam_id?;
            let stats = acc.stats().get(&steam_id)?;

            Some(PlayerMatchRecord {
                player: player.clone(),
                steam_id,
                stats: *stats,
                domain: acc.domain().to_string(),
                match_id: acc.match_id(),
                duration_secs: acc.duration_secs(),
                schema_version: SCHEMA_VERSION,
            })
        })
        .collect()
}
