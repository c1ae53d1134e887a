//! Clock-time terminals: `3:30pm`, `5p`, `15:00`, `5 o'clock`, named times
//! ("noon", "tonight"), and timezone attachment.

use crate::engine::BucketMask;
use crate::model::{DateRef, Meridiem, Moment, PartialTime, Phrase};
use crate::rules::{is_moment, moment, regex_group};
use crate::{Rule, Token, tables};

fn meridiem_from_text(text: &str) -> Option<Meridiem> {
    match text.trim().chars().next()? {
        'a' => Some(Meridiem::Am),
        'p' => Some(Meridiem::Pm),
        _ => None,
    }
}

fn time_moment(time: PartialTime) -> Phrase {
    Phrase::Moment(Moment::from_time(time))
}

/// Colon times with optional seconds, milliseconds, and meridiem:
/// `3:30`, `15:00`, `3:30:15.250 pm`. Hours above 12 simply pass through the
/// meridiem conversion untouched, so 24-hour input needs no special casing.
fn rule_clock() -> Rule {
    rule! {
        name: "clock time",
        pattern: [
            re!(r"(?i)\b(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,3}))?)?(?:\s*(a\.m\.|p\.m\.|(?:a\.m|p\.m|am|pm|a|p)\b))?")
        ],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::HAS_COLON).bits(),
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let token = tokens.first()?;
            Some(time_moment(PartialTime {
                hour: Some(regex_group(token, 1)?.parse().ok()?),
                minute: Some(regex_group(token, 2)?.parse().ok()?),
                second: regex_group(token, 3).and_then(|s| s.parse().ok()),
                millisecond: regex_group(token, 4).and_then(|s| s.parse().ok()),
                meridiem: regex_group(token, 5).and_then(meridiem_from_text),
            }))
        },
    }
}

/// Hour with a meridiem and nothing else: `5p`, `4 PM`, `11 a.m.`.
fn rule_hour_meridiem() -> Rule {
    rule! {
        name: "hour meridiem",
        pattern: [re!(r"(?i)\b(\d{1,2})\s*(a\.m\.|p\.m\.|(?:a\.m|p\.m|am|pm|a|p)\b)")],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::MERIDIEMISH).bits(),
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let token = tokens.first()?;
            let hour = regex_group(token, 1)?.parse().ok()?;
            let meridiem = meridiem_from_text(regex_group(token, 2)?)?;
            Some(time_moment(PartialTime::hour_meridiem(hour, meridiem)))
        },
    }
}

/// "5 o'clock", optionally with a meridiem.
fn rule_oclock() -> Rule {
    rule! {
        name: "o'clock",
        pattern: [
            re!(r"(?i)\b(\d{1,2})\s*o'?clock\b(?:\s*(a\.m\.|p\.m\.|(?:a\.m|p\.m|am|pm|a|p)\b))?")
        ],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::NAMEDISH).bits(),
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let token = tokens.first()?;
            let hour = regex_group(token, 1)?.parse().ok()?;
            let mut time = PartialTime::hour(hour);
            time.meridiem = regex_group(token, 2).and_then(meridiem_from_text);
            Some(time_moment(time))
        },
    }
}

/// Named times of day. Stored in relative-hour form with an explicit
/// meridiem so that neighbor inference cannot flip them across noon.
fn rule_timename() -> Rule {
    rule! {
        name: "timename",
        pattern: [re!(r"(?i)\b(noon|midday|midnight|morning|afternoon|evening|night)\b")],
        buckets: BucketMask::NAMEDISH.bits(),
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let (hour, meridiem) = match regex_group(tokens.first()?, 1)? {
                "noon" | "midday" => (12, Meridiem::Pm),
                "midnight" => (12, Meridiem::Am),
                "morning" => (6, Meridiem::Am),
                "afternoon" => (3, Meridiem::Pm),
                "evening" => (6, Meridiem::Pm),
                "night" => (8, Meridiem::Pm),
                _ => return None,
            };
            Some(time_moment(PartialTime::hour_meridiem(hour, meridiem)))
        },
    }
}

/// "tonight" carries both halves: today's date at 8 PM.
fn rule_tonight() -> Rule {
    rule! {
        name: "tonight",
        pattern: [re!(r"(?i)\btonight\b")],
        buckets: BucketMask::NAMEDISH.bits(),
        prod: |_tokens: &[Token]| -> Option<Phrase> {
            Some(Phrase::Moment(Moment {
                date: Some(DateRef::DaysFromNow(0)),
                time: Some(PartialTime::hour_meridiem(8, Meridiem::Pm)),
                tz: None,
            }))
        },
    }
}

/// Attach a timezone written after any date/time expression: "5p EST",
/// "Wed EST", "3:30 Pacific Standard Time". The token set comes from the
/// precomputed abbreviation/name table.
fn rule_zone() -> Rule {
    Rule {
        name: "timezone suffix",
        pattern: vec![
            pred!(is_moment),
            re!(r"\s+"),
            crate::Pattern::Regex(tables::timezone_regex()),
        ],
        production: Box::new(|tokens: &[Token]| {
            use crate::IntoToken;
            let base = moment(tokens.first()?)?.clone();
            let tz = tables::timezone(regex_group(tokens.get(2)?, 1)?)?;
            Phrase::Moment(Moment { tz: Some(tz), ..base }).into_token()
        }),
        buckets: BucketMask::ZONEISH.bits(),
        priority: 10,
    }
}

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        rule_clock(),
        rule_hour_meridiem(),
        rule_oclock(),
        rule_timename(),
        rule_tonight(),
        rule_zone(),
    ]
}
