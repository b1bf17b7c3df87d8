pub mod events;
pub mod stats;
pub mod steam_id;
pub mod timestamp;

pub use events::{classify, LogEvent, Marker, Team, MARKERS};
pub use stats::{parse_event, update, CombatEvent, PlayerStats, StatTable};
pub use steam_id::SteamId;
pub use timestamp::{extract_log_line, parse_timestamp};

/// Largest datagram the game server emits for a single log line.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

