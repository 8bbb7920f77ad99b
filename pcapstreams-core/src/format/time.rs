//! Capture timestamp formatting.

use chrono::{TimeZone, Utc};

/// Render a capture timestamp (nanoseconds since the Unix epoch).
///
/// The fractional part is omitted when zero and otherwise printed with
/// trailing zeros trimmed, e.g. `2024-03-01 12:00:00.25 +0000 UTC`.
pub fn format_timestamp(timestamp_ns: i64) -> String {
    let secs = timestamp_ns.div_euclid(1_000_000_000);
    let nanos = timestamp_ns.rem_euclid(1_000_000_000) as u32;

    match Utc.timestamp_opt(secs, nanos).single() {
        Some(dt) => {
            let mut text = dt.format("%Y-%m-%d %H:%M:%S").to_string();
            if nanos != 0 {
                let fraction = format!("{nanos:09}");
                text.push('.');
                text.push_str(fraction.trim_end_matches('0'));
            }
            text.push_str(" +0000 UTC");
            text
        }
        None => format!("{secs}.{nanos:09}"),
    }
}
