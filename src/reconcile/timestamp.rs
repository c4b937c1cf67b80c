use chrono::NaiveDateTime;

use crate::error::TimestampError;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
pub const TIMESTAMP_WIDTH: usize = 14;

/// Parse the leading fixed-width `YYYYMMDDHHMMSS` prefix of a migration
/// filename. The prefix must be exactly 14 ASCII digits forming a valid
/// calendar date/time; anything else rejects the whole filename.
pub fn parse_prefix(file_name: &str) -> Result<NaiveDateTime, TimestampError> {
    let Some(prefix) = file_name.get(..TIMESTAMP_WIDTH) else {
        return Err(TimestampError::TooShort);
    };
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::NotDigits);
    }
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT)
        .map_err(|_| TimestampError::InvalidDate)
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Everything after the first underscore. The timestamp token is discarded,
/// later underscores are preserved. A filename with no underscore degrades
/// to using the whole name as the suffix.
pub fn descriptive_suffix(file_name: &str) -> &str {
    match file_name.split_once('_') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => file_name,
    }
}
