use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Offset between a 32-bit account number and its 64-bit individual-account id.
pub const ACCOUNT_ID_BASE: u64 = 76_561_197_960_265_728;

const MAX_ACCOUNT_DIGITS: usize = 10;

/// Stable player identity as it appears in server logs (`[U:1:123]`)
/// normalised to the 64-bit form the roster API reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(pub u64);

impl SteamId {
    /// Parses a bracketed id such as `[U:1:479446967]`.
    ///
    /// The text must be exactly one bracketed id; use [`find_all`] to pull ids
    /// out of a full log line.
    pub fn from_bracketed(text: &str) -> Option<Self> {
        let inner = text.strip_prefix("[U:")?.strip_suffix(']')?;
        let (universe, account) = inner.split_once(':')?;

        if universe.len() != 1 || !universe.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if account.is_empty()
            || account.len() > MAX_ACCOUNT_DIGITS
            || !account.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let account: u64 = account.parse().ok()?;
        Some(SteamId(ACCOUNT_ID_BASE + account))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(SteamId)
    }
}

/// A bracketed id located inside a line. `start..end` is its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMatch {
    pub id: SteamId,
    pub start: usize,
    pub end: usize,
}

/// Returns every bracketed id embedded in `line`, in order of appearance.
pub fn find_all(line: &str) -> Vec<IdMatch> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(pos) = line[offset..].find("[U:") {
        let start = offset + pos;
        let Some(close) = line[start..].find(']') else {
            break;
        };
        let end = start + close + 1;

        if let Some(id) = SteamId::from_bracketed(&line[start..end]) {
            found.push(IdMatch { id, start, end });
            offset = end;
        } else {
            offset = start + 3;
        }
    }

    found
}
