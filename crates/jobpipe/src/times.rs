//! Timestamp helpers for path naming.
//!
//! Artifact file names carry ISO-8601-like timestamps, except that `:` is
//! not path-friendly, so the time separator may be `-` instead. The matcher
//! here accepts both forms.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{PipelineError, Result};

/// ISO-8601-like timestamps, `:` or `-` as the time separator.
pub static ISOLIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})[T ](?P<hour>\d{2})[:-](?P<minute>\d{2})[:-](?P<second>\d{2})",
    )
    .unwrap()
});

/// Parse the first ISO-like timestamp in `string`.
pub fn parse_isolike(string: &str) -> Result<NaiveDateTime> {
    let err = || PipelineError::Format(string.to_owned());
    let caps = ISOLIKE.captures(string).ok_or_else(err)?;
    let field = |name: &str| caps[name].parse::<u32>().map_err(|_| err());
    NaiveDate::from_ymd_opt(
        caps["year"].parse().map_err(|_| err())?,
        field("month")?,
        field("day")?,
    )
    .and_then(|date| date.and_hms_opt(field("hour").ok()?, field("minute").ok()?, field("second").ok()?))
    .ok_or_else(err)
}

/// The timestamp portion of a path's file stem, empty when absent.
pub fn time_of(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    ISOLIKE
        .find(&stem)
        .map(|found| found.as_str().to_owned())
        .unwrap_or_default()
}

/// The path-friendly form of a timestamp.
pub fn path_time(time: &str) -> String {
    time.replace(':', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_and_dash_separated_times() {
        let colon = parse_isolike("2026-02-03T04:05:06").unwrap();
        let dash = parse_isolike("2026-02-03T04-05-06").unwrap();
        assert_eq!(colon, dash);
        assert_eq!(colon.to_string(), "2026-02-03 04:05:06");
    }

    #[test]
    fn parses_embedded_timestamps() {
        let parsed = parse_isolike("mail 2026-02-03 04:05:06 dump").unwrap();
        assert_eq!(parsed.to_string(), "2026-02-03 04:05:06");
    }

    #[test]
    fn rejects_non_timestamps() {
        let err = parse_isolike("not a time").unwrap_err();
        assert!(err.to_string().contains("ISO 8601"));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(parse_isolike("2026-13-03T04:05:06").is_err());
    }

    #[test]
    fn time_of_reads_the_file_stem() {
        let path = Path::new("data/mail 2026-02-03T04-05-06.json");
        assert_eq!(time_of(path), "2026-02-03T04-05-06");
        assert_eq!(time_of(Path::new("data/mail.json")), "");
    }

    #[test]
    fn path_time_replaces_colons() {
        assert_eq!(path_time("2026-02-03T04:05:06"), "2026-02-03T04-05-06");
    }
}
