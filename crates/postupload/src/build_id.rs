//! Build identifiers
//!
//! A build id is a `YYYYMMDDHHMMSS` timestamp, optionally followed by extra
//! characters which are ignored. It is always read in the release time zone
//! so dated paths do not depend on the clock of the machine uploading.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

use crate::error::{ReleaseError, Result};

/// Zone every build id is interpreted in
pub const BUILD_TIMEZONE: Tz = chrono_tz::US::Pacific;

/// Standard (non daylight) offset of [`BUILD_TIMEZONE`], in hours west of UTC
const STANDARD_OFFSET_HOURS: i64 = 8;

const STAMP_LEN: usize = 14;
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A validated build identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildId {
    raw: String,
    instant: DateTime<Tz>,
}

impl BuildId {
    /// Parse and validate a build id
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| ReleaseError::InvalidFormat {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.len() < STAMP_LEN {
            return Err(invalid("must be at least 14 characters long"));
        }

        let stamp = &raw.as_bytes()[..STAMP_LEN];
        if !stamp.iter().all(u8::is_ascii_digit) {
            return Err(invalid("must start with YYYYMMDDHHMMSS"));
        }

        let naive = NaiveDateTime::parse_from_str(&raw[..STAMP_LEN], STAMP_FORMAT)
            .map_err(|e| invalid(&e.to_string()))?;

        let instant = match BUILD_TIMEZONE.from_local_datetime(&naive) {
            LocalResult::Single(instant) => instant,
            LocalResult::Ambiguous(earliest, _) => earliest,
            // Wall clock skipped this time when daylight saving began
            LocalResult::None => BUILD_TIMEZONE
                .from_utc_datetime(&(naive + Duration::hours(STANDARD_OFFSET_HOURS))),
        };

        Ok(Self {
            raw: raw.to_string(),
            instant,
        })
    }

    /// The string the id was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn year(&self) -> &str {
        &self.raw[0..4]
    }

    pub fn month(&self) -> &str {
        &self.raw[4..6]
    }

    pub fn day(&self) -> &str {
        &self.raw[6..8]
    }

    pub fn hour(&self) -> &str {
        &self.raw[8..10]
    }

    pub fn minute(&self) -> &str {
        &self.raw[10..12]
    }

    pub fn second(&self) -> &str {
        &self.raw[12..14]
    }

    /// The absolute instant the id names
    pub fn instant(&self) -> DateTime<Tz> {
        self.instant
    }

    /// Seconds since the Unix epoch
    pub fn epoch_seconds(&self) -> i64 {
        self.instant.timestamp()
    }

    /// `YYYY-MM-DD-HH-MM-SS`, the stamp used in dated nightly directories
    pub fn dated_stamp(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl FromStr for BuildId {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let id = BuildId::parse("20150101223305").unwrap();

        assert_eq!(id.year(), "2015");
        assert_eq!(id.month(), "01");
        assert_eq!(id.day(), "01");
        assert_eq!(id.hour(), "22");
        assert_eq!(id.minute(), "33");
        assert_eq!(id.second(), "05");
        assert_eq!(id.dated_stamp(), "2015-01-01-22-33-05");
    }

    #[test]
    fn test_epoch_uses_pacific_time() {
        // PDT, seven hours behind UTC
        let summer = BuildId::parse("20150513000000").unwrap();
        assert_eq!(summer.epoch_seconds(), 1431500400);

        // PST, eight hours behind UTC
        let winter = BuildId::parse("20150101000000").unwrap();
        assert_eq!(winter.epoch_seconds(), 1420099200);
    }

    #[test]
    fn test_trailing_characters_are_kept_but_ignored() {
        let id = BuildId::parse("20150101223305-extra").unwrap();
        assert_eq!(id.as_str(), "20150101223305-extra");
        assert_eq!(id.second(), "05");
        assert_eq!(id.to_string(), "20150101223305-extra");
    }

    #[test]
    fn test_rejects_short_ids() {
        let err = BuildId::parse("2015010122330").unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidFormat { .. }));
        assert!(BuildId::parse("").is_err());
    }

    #[test]
    fn test_rejects_non_timestamps() {
        assert!(BuildId::parse("2015x101223305").is_err());
        assert!(BuildId::parse("+0150101223305").is_err());
        // Month 13 never parses
        assert!(BuildId::parse("20151301223305").is_err());
        // Multi-byte characters inside the stamp
        assert!(BuildId::parse("2015010122330é").is_err());
    }

    #[test]
    fn test_ambiguous_hour_takes_earliest_instant() {
        // 2015-11-01 01:30 happens twice in US/Pacific; the PDT reading is first
        let id = BuildId::parse("20151101013000").unwrap();
        assert_eq!(id.epoch_seconds(), 1446366600);
    }

    #[test]
    fn test_skipped_hour_reads_standard_offset() {
        // 2015-03-08 02:30 does not exist in US/Pacific
        let id = BuildId::parse("20150308023000").unwrap();
        assert_eq!(id.epoch_seconds(), 1425810600);
    }

    #[test]
    fn test_from_str() {
        let id: BuildId = "20150101223305".parse().unwrap();
        assert_eq!(id.year(), "2015");
    }
}
