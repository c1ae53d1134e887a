//! Trigger scanning (input pre-classification).
//!
//! Inspects the raw input once and produces coarse signals that let the
//! parser skip rules that cannot possibly fire. A rule declares the buckets
//! it needs; it only activates when the input has all of them.
//!
//! This is a heuristic scan: false positives are fine because the parser
//! still has to match full rule patterns. Keep it cheap.

use bitflags::bitflags;

use crate::tables;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct BucketMask: u32 {
        const HAS_DIGITS = 1 << 0;
        const HAS_COLON = 1 << 1;
        /// A slash, dot, or dash that could separate numeric date parts.
        const HAS_SEPARATOR = 1 << 2;
        const MERIDIEMISH = 1 << 3;
        const WEEKDAYISH = 1 << 4;
        const MONTHISH = 1 << 5;
        /// Vernacular words: today, noon, tonight, o'clock, ...
        const NAMEDISH = 1 << 6;
        /// Duration unit words (minutes, hrs, ...).
        const DURATIONISH = 1 << 7;
        /// Spelled-out numbers (five, thirty, ...).
        const WORDNUMISH = 1 << 8;
        /// A timezone abbreviation or name from the lookup table.
        const ZONEISH = 1 << 9;
    }
}

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue",
    "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun",
];

const NAMED: &[&str] = &[
    "today",
    "tomorrow",
    "tmw",
    "yesterday",
    "tonight",
    "noon",
    "midday",
    "midnight",
    "morning",
    "afternoon",
    "evening",
    "night",
    "o'clock",
    "oclock",
];

/// Input characteristics detected from the raw input.
#[derive(Debug, Clone)]
pub(crate) struct TriggerInfo {
    pub buckets: BucketMask,
}

impl TriggerInfo {
    /// Scan `input` for coarse buckets.
    ///
    /// Uses ASCII lowercasing since all current terminals are ASCII English.
    pub fn scan(input: &str) -> Self {
        let mut buckets = BucketMask::empty();
        let lower = input.to_ascii_lowercase();

        if input.bytes().any(|b| b.is_ascii_digit()) {
            buckets |= BucketMask::HAS_DIGITS;
        }
        if input.contains(':') {
            buckets |= BucketMask::HAS_COLON;
        }
        if input.contains('/') || input.contains('.') || input.contains('-') {
            buckets |= BucketMask::HAS_SEPARATOR;
        }
        // Crude substring check; "5p" and "a.m." both land here.
        if lower.contains('a') || lower.contains('p') {
            buckets |= BucketMask::MERIDIEMISH;
        }

        for word in lower.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '\'');
            if word.is_empty() {
                continue;
            }
            if WEEKDAYS.contains(&word) {
                buckets |= BucketMask::WEEKDAYISH;
            }
            if NAMED.contains(&word) {
                buckets |= BucketMask::NAMEDISH;
            }
            if tables::month_number(word).is_some() {
                buckets |= BucketMask::MONTHISH;
            }
            if tables::duration_unit(word).is_some() {
                buckets |= BucketMask::DURATIONISH;
            }
            if tables::ones_number(word).is_some() || tables::tens_number(word).is_some() {
                buckets |= BucketMask::WORDNUMISH;
            }
        }

        // Multi-word zone names ("pacific standard time") need the full
        // pattern, not per-word lookups.
        if tables::timezone_regex().is_match(input) {
            buckets |= BucketMask::ZONEISH;
        }

        TriggerInfo { buckets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_flags_terminal_families() {
        let info = TriggerInfo::scan("next Wed 3:30pm PST");
        assert!(info.buckets.contains(BucketMask::HAS_DIGITS));
        assert!(info.buckets.contains(BucketMask::HAS_COLON));
        assert!(info.buckets.contains(BucketMask::WEEKDAYISH));
        assert!(info.buckets.contains(BucketMask::ZONEISH));
        assert!(!info.buckets.contains(BucketMask::MONTHISH));
    }

    #[test]
    fn scan_flags_spelled_numbers_and_units() {
        let info = TriggerInfo::scan("thirty two minutes");
        assert!(info.buckets.contains(BucketMask::WORDNUMISH));
        assert!(info.buckets.contains(BucketMask::DURATIONISH));
        assert!(!info.buckets.contains(BucketMask::HAS_DIGITS));
    }
}
