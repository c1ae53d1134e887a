//! Lookup tables the grammar queries by string key.
//!
//! These are data, not logic: month names, spelled-out numbers, duration unit
//! aliases, and the timezone abbreviation/name table. The timezone table is a
//! precomputed snapshot derived from the IANA database (abbreviations and
//! common English zone names mapped to one canonical zone each) rather than
//! something computed at runtime.

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::model::DeltaUnit;

/// Month name (full or 3-letter) to month number, case-insensitive.
/// Callers strip trailing dots before lookup ("jul." style abbreviations).
static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
        ("jan", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("sep", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ])
});

pub(crate) fn month_number(name: &str) -> Option<u32> {
    let key = name.trim().trim_end_matches('.').to_lowercase();
    MONTHS.get(key.as_str()).copied()
}

/// Words for the numbers 0..19.
static ONES: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
    HashMap::from([
        ("zero", 0),
        ("one", 1),
        ("two", 2),
        ("three", 3),
        ("four", 4),
        ("five", 5),
        ("six", 6),
        ("seven", 7),
        ("eight", 8),
        ("nine", 9),
        ("ten", 10),
        ("eleven", 11),
        ("twelve", 12),
        ("thirteen", 13),
        ("fourteen", 14),
        ("fifteen", 15),
        ("sixteen", 16),
        ("seventeen", 17),
        ("eighteen", 18),
        ("nineteen", 19),
    ])
});

/// Words for the tens (twenty, thirty, ...), including the common
/// "fourty" misspelling.
static TENS: Lazy<HashMap<&'static str, i64>> = Lazy::new(|| {
    HashMap::from([
        ("twenty", 20),
        ("thirty", 30),
        ("forty", 40),
        ("fourty", 40),
        ("fifty", 50),
        ("sixty", 60),
        ("seventy", 70),
        ("eighty", 80),
        ("ninety", 90),
    ])
});

pub(crate) fn ones_number(word: &str) -> Option<i64> {
    ONES.get(word.trim().to_lowercase().as_str()).copied()
}

pub(crate) fn tens_number(word: &str) -> Option<i64> {
    TENS.get(word.trim().to_lowercase().as_str()).copied()
}

/// Map a duration unit alias to its canonical unit.
pub(crate) fn duration_unit(text: &str) -> Option<DeltaUnit> {
    let alias = text.trim().trim_end_matches('.').to_lowercase();
    let unit = match alias.as_str() {
        "second" | "seconds" | "sec" | "secs" | "s" => DeltaUnit::Second,
        "minute" | "minutes" | "min" | "mins" | "m" => DeltaUnit::Minute,
        "hour" | "hours" | "hr" | "hrs" | "h" => DeltaUnit::Hour,
        "day" | "days" | "d" => DeltaUnit::Day,
        "week" | "weeks" | "wk" | "wks" | "w" => DeltaUnit::Week,
        "month" | "months" | "mo" | "mos" => DeltaUnit::Month,
        "year" | "years" | "yr" | "yrs" | "y" => DeltaUnit::Year,
        _ => return None,
    };
    Some(unit)
}

/// Timezone abbreviations and English names, mapped to one canonical IANA
/// zone each. Ambiguous abbreviations (IST, CST, ...) resolve to the zone
/// most common in English-language scheduling text.
static TIMEZONES: Lazy<HashMap<&'static str, Tz>> = Lazy::new(|| {
    HashMap::from([
        ("utc", chrono_tz::UTC),
        ("gmt", chrono_tz::Etc::GMT),
        ("est", chrono_tz::America::New_York),
        ("edt", chrono_tz::America::New_York),
        ("et", chrono_tz::America::New_York),
        ("eastern time", chrono_tz::America::New_York),
        ("eastern standard time", chrono_tz::America::New_York),
        ("eastern daylight time", chrono_tz::America::New_York),
        ("cst", chrono_tz::America::Chicago),
        ("cdt", chrono_tz::America::Chicago),
        ("ct", chrono_tz::America::Chicago),
        ("central time", chrono_tz::America::Chicago),
        ("central standard time", chrono_tz::America::Chicago),
        ("central daylight time", chrono_tz::America::Chicago),
        ("mst", chrono_tz::America::Denver),
        ("mdt", chrono_tz::America::Denver),
        ("mt", chrono_tz::America::Denver),
        ("mountain time", chrono_tz::America::Denver),
        ("mountain standard time", chrono_tz::America::Denver),
        ("mountain daylight time", chrono_tz::America::Denver),
        ("pst", chrono_tz::America::Los_Angeles),
        ("pdt", chrono_tz::America::Los_Angeles),
        ("pt", chrono_tz::America::Los_Angeles),
        ("pacific time", chrono_tz::America::Los_Angeles),
        ("pacific standard time", chrono_tz::America::Los_Angeles),
        ("pacific daylight time", chrono_tz::America::Los_Angeles),
        ("akst", chrono_tz::America::Anchorage),
        ("akdt", chrono_tz::America::Anchorage),
        ("hst", chrono_tz::Pacific::Honolulu),
        ("ast", chrono_tz::America::Halifax),
        ("adt", chrono_tz::America::Halifax),
        ("bst", chrono_tz::Europe::London),
        ("wet", chrono_tz::Europe::Lisbon),
        ("west", chrono_tz::Europe::Lisbon),
        ("cet", chrono_tz::Europe::Paris),
        ("cest", chrono_tz::Europe::Paris),
        ("eet", chrono_tz::Europe::Athens),
        ("eest", chrono_tz::Europe::Athens),
        ("msk", chrono_tz::Europe::Moscow),
        ("ist", chrono_tz::Asia::Kolkata),
        ("jst", chrono_tz::Asia::Tokyo),
        ("kst", chrono_tz::Asia::Seoul),
        ("hkt", chrono_tz::Asia::Hong_Kong),
        ("sgt", chrono_tz::Asia::Singapore),
        ("awst", chrono_tz::Australia::Perth),
        ("acst", chrono_tz::Australia::Adelaide),
        ("aest", chrono_tz::Australia::Sydney),
        ("aedt", chrono_tz::Australia::Sydney),
        ("nzst", chrono_tz::Pacific::Auckland),
        ("nzdt", chrono_tz::Pacific::Auckland),
    ])
});

pub(crate) fn timezone(name: &str) -> Option<Tz> {
    TIMEZONES.get(name.trim().to_lowercase().as_str()).copied()
}

/// A single alternation over every timezone key, longest key first so that
/// "eastern standard time" is not split at "eastern".
static TIMEZONE_RE: Lazy<Regex> = Lazy::new(|| {
    let mut keys: Vec<&str> = TIMEZONES.keys().copied().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation =
        keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b")).unwrap()
});

pub(crate) fn timezone_regex() -> &'static Regex {
    &TIMEZONE_RE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lookup_tolerates_case_and_dots() {
        assert_eq!(month_number("July"), Some(7));
        assert_eq!(month_number("JUL"), Some(7));
        assert_eq!(month_number("jul."), Some(7));
        assert_eq!(month_number("sept"), None);
    }

    #[test]
    fn timezone_lookup_and_pattern_agree() {
        for key in ["EST", "pst", "Pacific Standard Time", "nzdt"] {
            assert!(timezone(key).is_some(), "missing zone for {key}");
            assert!(timezone_regex().is_match(key), "pattern misses {key}");
        }
        assert_eq!(timezone("EST"), Some(chrono_tz::America::New_York));
        assert_eq!(timezone("gibberish"), None);
    }

    #[test]
    fn duration_unit_aliases_collapse() {
        assert_eq!(duration_unit("mins"), Some(DeltaUnit::Minute));
        assert_eq!(duration_unit("h"), Some(DeltaUnit::Hour),);
        assert_eq!(duration_unit("wks"), Some(DeltaUnit::Week));
        assert_eq!(duration_unit("lightyears"), None);
    }
}
