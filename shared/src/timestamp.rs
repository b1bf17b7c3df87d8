use chrono::NaiveDateTime;

/// Layout of the timestamp in every log line: `10/02/2021 - 23:31:56`.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y - %H:%M:%S";

const TIMESTAMP_LEN: usize = 21;
const ENVELOPE_PREFIX_LEN: usize = 2;

/// Finds the first `MM/DD/YYYY - HH:MM:SS` in `line` and parses it.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let start = find_timestamp(line.as_bytes())?;
    NaiveDateTime::parse_from_str(&line[start..start + TIMESTAMP_LEN], TIMESTAMP_FORMAT).ok()
}

/// Pulls the log line out of a raw datagram.
///
/// Game servers prefix each datagram with a binary header and may pad it with
/// NUL bytes. When the `L MM/DD/YYYY - HH:MM:SS: <payload>` envelope is found
/// the envelope and everything after it is returned; otherwise the whole text
/// is returned so the caller can still forward it.
pub fn extract_log_line(datagram: &str) -> &str {
    let bytes = datagram.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = find_timestamp(&bytes[search_from..]) {
        let ts = search_from + offset;
        let has_prefix = ts >= ENVELOPE_PREFIX_LEN && &bytes[ts - ENVELOPE_PREFIX_LEN..ts] == b"L ";
        let payload_at = ts + TIMESTAMP_LEN;
        let has_separator = bytes.get(payload_at..payload_at + 2) == Some(b": ".as_slice());
        let has_payload = bytes.len() > payload_at + 2;

        if has_prefix && has_separator && has_payload {
            return trim_line(&datagram[ts - ENVELOPE_PREFIX_LEN..]);
        }
        search_from = ts + 1;
    }

    trim_line(datagram)
}

fn trim_line(text: &str) -> &str {
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
}

/// Byte offset of the first timestamp-shaped run in `bytes`.
fn find_timestamp(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < TIMESTAMP_LEN {
        return None;
    }
    (0..=bytes.len() - TIMESTAMP_LEN).find(|&i| is_timestamp(&bytes[i..i + TIMESTAMP_LEN]))
}

fn is_timestamp(window: &[u8]) -> bool {
    // "MM/DD/YYYY - HH:MM:SS"
    const SHAPE: &[u8; TIMESTAMP_LEN] = b"dd/dd/dddd - dd:dd:dd";

    window.iter().zip(SHAPE.iter()).all(|(b, s)| match s {
        b'd' => b.is_ascii_digit(),
        other => b == other,
    })
}
