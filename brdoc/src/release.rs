// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Release time extraction from registry throttling responses.
//!
//! A 429 body carries its resume time inside free text, e.g.
//! `"Tente novamente após Mon Oct 27 2025 14:30:00 GMT-0300"`.

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// `<weekday> <month> <day> <year> <HH:MM:SS> GMT<±HHMM>`
const RELEASE_PATTERN: &str = r"[A-Z][a-z]{2}\s+([A-Z][a-z]{2})\s+(\d{2})\s+(\d{4})\s+(\d{2}:\d{2}:\d{2})\s+GMT([+-]\d{4})";

fn release_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(RELEASE_PATTERN).expect("invalid regex"))
}

/// Find and parse the release instant embedded in `text`.
///
/// The weekday token must be present but is not checked against the date.
pub fn parse_release_time(text: &str) -> Option<DateTime<FixedOffset>> {
    let caps = release_regex().captures(text)?;
    let stamp = format!(
        "{} {} {} {} {}",
        &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]
    );
    DateTime::parse_from_str(&stamp, "%b %d %Y %H:%M:%S %z").ok()
}

/// Time left until `release`, zero when it has already passed.
pub fn wait_until(release: DateTime<FixedOffset>, now: DateTime<Utc>) -> Duration {
    (release.with_timezone(&Utc) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
