//! Lifecycle markers recognised in game-server logs.
//!
//! Classification is table driven: [`MARKERS`] is scanned top to bottom and the
//! first matching entry decides the event. Adding a marker means adding a row.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Red" => Some(Team::Red),
            "Blue" => Some(Team::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "Red"),
            Team::Blue => write!(f, "Blue"),
        }
    }
}

/// Kind of lifecycle marker, without captured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    MapLoaded,
    RoundStart,
    RoundWin,
    RoundLength,
    GameOver,
    LogClosed,
    LogStarted,
    TeamScore,
    PlayersRemoved,
}

/// A classified log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    MapLoaded { map: String },
    RoundStart,
    RoundWin,
    RoundLength,
    GameOver,
    LogClosed,
    LogStarted,
    TeamScore { team: Team, score: u32 },
    PlayersRemoved,
}

impl LogEvent {
    pub fn marker(&self) -> Marker {
        match self {
            LogEvent::MapLoaded { .. } => Marker::MapLoaded,
            LogEvent::RoundStart => Marker::RoundStart,
            LogEvent::RoundWin => Marker::RoundWin,
            LogEvent::RoundLength => Marker::RoundLength,
            LogEvent::GameOver => Marker::GameOver,
            LogEvent::LogClosed => Marker::LogClosed,
            LogEvent::LogStarted => Marker::LogStarted,
            LogEvent::TeamScore { .. } => Marker::TeamScore,
            LogEvent::PlayersRemoved => Marker::PlayersRemoved,
        }
    }
}

/// How a table row recognises its marker.
#[derive(Clone, Copy)]
pub enum Pattern {
    /// Line contains the literal text.
    Contains(&'static str),
    /// Line contains any of the literal texts.
    AnyOf(&'static [&'static str]),
    /// Line needs captures; the parser both matches and extracts.
    Parsed(fn(&str) -> Option<LogEvent>),
}

impl Pattern {
    fn matches(&self, line: &str, marker: Marker) -> Option<LogEvent> {
        let hit = match self {
            Pattern::Contains(text) => line.contains(text),
            Pattern::AnyOf(texts) => texts.iter().any(|text| line.contains(text)),
            Pattern::Parsed(parse) => return parse(line),
        };

        if hit {
            unit_event(marker)
        } else {
            None
        }
    }
}

/// Ordered marker table.
pub const MARKERS: &[(Pattern, Marker)] = &[
    (Pattern::Contains(r#": World triggered "Round_Start""#), Marker::RoundStart),
    (Pattern::Contains(r#": World triggered "Round_Win""#), Marker::RoundWin),
    (
        Pattern::Contains(r#": World triggered "Round_Length" (seconds"#),
        Marker::RoundLength,
    ),
    (
        Pattern::Contains(r#": World triggered "Game_Over" reason ""#),
        Marker::GameOver,
    ),
    (
        Pattern::AnyOf(&[": Log file closed", ": Log File closed"]),
        Marker::LogClosed,
    ),
    (Pattern::Contains(": Log file started"), Marker::LogStarted),
    (Pattern::Parsed(parse_team_score), Marker::TeamScore),
    (Pattern::Parsed(parse_players_removed), Marker::PlayersRemoved),
    (Pattern::Parsed(parse_map_loaded), Marker::MapLoaded),
];

/// Returns the first marker in [`MARKERS`] that matches `line`.
pub fn classify(line: &str) -> Option<LogEvent> {
    MARKERS
        .iter()
        .find_map(|(pattern, marker)| pattern.matches(line, *marker))
}

fn unit_event(marker: Marker) -> Option<LogEvent> {
    match marker {
        Marker::RoundStart => Some(LogEvent::RoundStart),
        Marker::RoundWin => Some(LogEvent::RoundWin),
        Marker::RoundLength => Some(LogEvent::RoundLength),
        Marker::GameOver => Some(LogEvent::GameOver),
        Marker::LogClosed => Some(LogEvent::LogClosed),
        Marker::LogStarted => Some(LogEvent::LogStarted),
        Marker::PlayersRemoved => Some(LogEvent::PlayersRemoved),
        // These carry captures and are produced by their parsers.
        Marker::MapLoaded | Marker::TeamScore => None,
    }
}

/// `: Loading map "<name>"`
fn parse_map_loaded(line: &str) -> Option<LogEvent> {
    const PREFIX: &str = r#": Loading map ""#;
    let start = line.find(PREFIX)? + PREFIX.len();
    let rest = &line[start..];
    let map = &rest[..rest.find('"')?];

    if map.is_empty() {
        return None;
    }

    Some(LogEvent::MapLoaded {
        map: map.to_string(),
    })
}

/// `: Team "Red" current score "3" with "6" players`
fn parse_team_score(line: &str) -> Option<LogEvent> {
    const PREFIX: &str = r#": Team ""#;
    const SCORE: &str = r#"" current score ""#;
    const PLAYERS: &str = r#"" with ""#;

    let start = line.find(PREFIX)? + PREFIX.len();
    let rest = &line[start..];

    let team_end = rest.find(SCORE)?;
    let team = Team::from_name(&rest[..team_end])?;

    let rest = &rest[team_end + SCORE.len()..];
    let score_end = rest.find(PLAYERS)?;
    let score = parse_digits(&rest[..score_end])?;

    let rest = &rest[score_end + PLAYERS.len()..];
    let count_end = rest.find('"')?;
    parse_digits(&rest[..count_end])?;
    if !rest[count_end + 1..].starts_with(" players") {
        return None;
    }

    Some(LogEvent::TeamScore { team, score })
}

/// `rcon from "1.2.3.4:27015": command "sm_game_player_delall"`
fn parse_players_removed(line: &str) -> Option<LogEvent> {
    const PREFIX: &str = r#"rcon from ""#;
    const COMMAND: &str = r#"": command "sm_game_player_delall""#;

    let start = line.find(PREFIX)? + PREFIX.len();
    let rest = &line[start..];
    let end = rest.find(COMMAND)?;
    let (host, port) = rest[..end].rsplit_once(':')?;

    let octets: Vec<&str> = host.split('.').collect();
    let valid_host = octets.len() == 4
        && octets
            .iter()
            .all(|o| (1..=3).contains(&o.len()) && o.bytes().all(|b| b.is_ascii_digit()));

    if !valid_host || parse_digits(port).is_none() {
        return None;
    }

    Some(LogEvent::PlayersRemoved)
}

fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_triggers() {
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:00:00: World triggered "Round_Start""#),
            Some(LogEvent::RoundStart)
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:10:00: World triggered "Round_Win" (winner "Red")"#),
            Some(LogEvent::RoundWin)
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:10:00: World triggered "Round_Length" (seconds "334.50")"#),
            Some(LogEvent::RoundLength)
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:30:00: World triggered "Game_Over" reason "Reached Win Limit""#),
            Some(LogEvent::GameOver)
        );
    }

    #[test]
    fn test_log_file_markers() {
        assert_eq!(
            classify("L 10/02/2021 - 23:30:01: Log file closed."),
            Some(LogEvent::LogClosed)
        );
        assert_eq!(
            classify("L 10/02/2021 - 23:30:01: Log File closed."),
            Some(LogEvent::LogClosed)
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:30:02: Log file started (file "logs/L1002001.log") (game "/tf") (version "7370160")"#),
            Some(LogEvent::LogStarted)
        );
    }

    #[test]
    fn test_map_loaded_capture() {
        assert_eq!(
            classify(r#"L 10/02/2021 - 22:59:00: Loading map "cp_granary_pro_rc8""#),
            Some(LogEvent::MapLoaded {
                map: "cp_granary_pro_rc8".to_string()
            })
        );
        assert_eq!(classify(r#"L 10/02/2021 - 22:59:00: Loading map """#), None);
    }

    #[test]
    fn test_team_score_capture() {
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:10:00: Team "Red" current score "1" with "6" players"#),
            Some(LogEvent::TeamScore {
                team: Team::Red,
                score: 1
            })
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:10:00: Team "Blue" current score "4" with "6" players"#),
            Some(LogEvent::TeamScore {
                team: Team::Blue,
                score: 4
            })
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:10:00: Team "Green" current score "4" with "6" players"#),
            None
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:10:00: Team "Red" final score "4" with "6" players"#),
            None
        );
    }

    #[test]
    fn test_players_removed() {
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:31:00: rcon from "10.0.0.15:51234": command "sm_game_player_delall""#),
            Some(LogEvent::PlayersRemoved)
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:31:00: rcon from "somehost:51234": command "sm_game_player_delall""#),
            None
        );
        assert_eq!(
            classify(r#"L 10/02/2021 - 23:31:00: rcon from "10.0.0.15:51234": command "status""#),
            None
        );
    }

    #[test]
    fn test_unrecognised_lines() {
        for line in [
            "",
            "garbage",
            r#"L 10/02/2021 - 23:31:56: "jel<62><[U:1:479446967]><Blue>" killed "KEYREAL<65><[U:1:861133286]><Red>" with "sniperrifle""#,
            r#"L 10/02/2021 - 23:31:56: World triggered "Round_Setup_Begin""#,
        ] {
            assert_eq!(classify(line), None, "line: {line}");
        }
    }

    #[test]
    fn test_marker_kinds_match_table() {
        let event = classify(r#"L 10/02/2021 - 23:10:00: Team "Red" current score "2" with "6" players"#)
            .unwrap();
        assert_eq!(event.marker(), Marker::TeamScore);

        let kinds: Vec<Marker> = MARKERS.iter().map(|(_, marker)| *marker).collect();
        assert_eq!(kinds.len(), 9);
        assert_eq!(kinds[0], Marker::RoundStart);
    }
}
