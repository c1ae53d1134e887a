//! Date terminals and date-shaped compositions: numeric dates, month names,
//! weekday references with directional modifiers, vernacular day names, and
//! "nth weekday of month" selectors.

use chrono::Weekday;

use crate::api::Direction;
use crate::engine::BucketMask;
use crate::model::{DateRef, Moment, PartialDate, Phrase, WeekdayRef, expand_year};
use crate::rules::{is_month_bearing, is_month_day, is_month_only, is_number, is_weekday_moment};
use crate::rules::{moment, number_value, phrase, regex_group};
use crate::{Rule, Token, tables};

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let day = match name.trim().to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tues" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thurs" | "thur" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn date_moment(fields: PartialDate) -> Phrase {
    Phrase::Moment(Moment::from_date(DateRef::Fields(fields)))
}

/// Numeric dates: `7/17`, `7.17.18`, `10/01/2024`. Month first, US style.
/// A two-part dash ("3-4") stays a range, but the full three-part form
/// (`7-17-18`) is unambiguous enough to read as a date.
fn rule_numeric_date() -> Rule {
    rule! {
        name: "numeric date",
        pattern: [re!(r"\b(\d{1,2})[/.](\d{1,2})(?:[/.](\d{2,4}))?\b")],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::HAS_SEPARATOR).bits(),
        priority: 20,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let token = tokens.first()?;
            build_numeric_date(
                regex_group(token, 1)?.parse().ok()?,
                regex_group(token, 2)?.parse().ok()?,
                regex_group(token, 3).and_then(|y| y.parse().ok()),
            )
        },
    }
}

fn rule_dashed_date() -> Rule {
    rule! {
        name: "numeric date (dashed)",
        pattern: [re!(r"\b(\d{1,2})-(\d{1,2})-(\d{2,4})\b")],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::HAS_SEPARATOR).bits(),
        priority: 20,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let token = tokens.first()?;
            build_numeric_date(
                regex_group(token, 1)?.parse().ok()?,
                regex_group(token, 2)?.parse().ok()?,
                Some(regex_group(token, 3)?.parse().ok()?),
            )
        },
    }
}

fn build_numeric_date(month: u32, day: i64, year: Option<i64>) -> Option<Phrase> {
    let mut fields = PartialDate {
        month: Some(month),
        year: year.map(|y| expand_year(y) as i32),
        ..Default::default()
    };
    // A "day" too large to be one is really a two-digit year ("7/45" reads
    // as July 2045). With an explicit year present it stays a day and fails
    // validation downstream.
    if day > 31 && fields.year.is_none() {
        fields.year = Some(expand_year(day) as i32);
    } else {
        fields.day = Some(day as u32);
    }
    Some(date_moment(fields))
}

/// A month name on its own ("July", "jul."). Defaults for day and year are
/// filled at render time.
fn rule_monthname() -> Rule {
    rule! {
        name: "monthname",
        pattern: [
            re!(r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\b\.?")
        ],
        buckets: BucketMask::MONTHISH.bits(),
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let month = tables::month_number(regex_group(tokens.first()?, 1)?)?;
            Some(date_moment(PartialDate { month: Some(month), ..Default::default() }))
        },
    }
}

/// "<monthname> <integer>": the integer is a day if it can be one, else a
/// year ("May 17" vs "May 2024", "July 2019").
fn rule_monthname_number() -> Rule {
    rule! {
        name: "monthname day-or-year",
        pattern: [pred!(is_month_only), re!(r"\s+"), pred!(is_number)],
        buckets: BucketMask::MONTHISH.bits(),
        priority: 20,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let m = moment(tokens.first()?)?;
            let Some(DateRef::Fields(base)) = &m.date else { return None };
            let n = number_value(tokens.get(2)?)?;
            if n < 0 {
                return None;
            }
            let mut fields = base.clone();
            if n < 32 {
                fields.day = Some(n as u32);
            } else {
                fields.year = Some(expand_year(n) as i32);
            }
            Some(date_moment(fields))
        },
    }
}

/// "<monthname day>, <year>" ("July 17, 2018", "July 17, '18").
fn rule_monthname_day_comma_year() -> Rule {
    rule! {
        name: "monthname day, year",
        pattern: [pred!(is_month_day), re!(r"\s*,\s*'?"), pred!(is_number)],
        buckets: BucketMask::MONTHISH.bits(),
        priority: 20,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let m = moment(tokens.first()?)?;
            let Some(DateRef::Fields(base)) = &m.date else { return None };
            let year = number_value(tokens.get(2)?)?;
            if year < 0 {
                return None;
            }
            let mut fields = base.clone();
            fields.year = Some(expand_year(year) as i32);
            Some(date_moment(fields))
        },
    }
}

/// "<monthname day> <4-digit year>" without the comma ("July 17 2018").
fn rule_monthname_day_year() -> Rule {
    rule! {
        name: "monthname day year",
        pattern: [pred!(is_month_day), re!(r"\s+(\d{4})\b")],
        buckets: BucketMask::MONTHISH.bits(),
        priority: 20,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let m = moment(tokens.first()?)?;
            let Some(DateRef::Fields(base)) = &m.date else { return None };
            let year = regex_group(tokens.get(1)?, 1)?.parse().ok()?;
            let mut fields = base.clone();
            fields.year = Some(year);
            Some(date_moment(fields))
        },
    }
}

/// A weekday name with no modifier; which occurrence it means is decided at
/// render time from the configured direction.
fn rule_weekday() -> Rule {
    rule! {
        name: "weekday",
        pattern: [
            re!(r"(?i)\b(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun)\b")
        ],
        buckets: BucketMask::WEEKDAYISH.bits(),
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let weekday = weekday_from_name(regex_group(tokens.first()?, 1)?)?;
            Some(Phrase::Moment(Moment::from_date(DateRef::Weekday(WeekdayRef {
                weekday,
                week_offset: 0,
                base: None,
            }))))
        },
    }
}

/// Directional modifiers before a weekday, possibly repeated: "next Monday",
/// "next next Monday", "past Wed". Each "next" adds a week, each
/// "last"/"past"/"previous"/"preceding" subtracts one; "this" pins the
/// anchor to the nearest occurrence; "upcoming"/"coming"/"following" anchor
/// at the upcoming occurrence without adding a week.
fn rule_weekday_modified() -> Rule {
    rule! {
        name: "modified weekday",
        pattern: [
            re!(r"(?i)\b((?:(?:next|last|past|previous|prev|preceding|this|upcoming|coming|following)\s+)+)"),
            pred!(is_weekday_moment)
        ],
        buckets: BucketMask::WEEKDAYISH.bits(),
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let chain = regex_group(tokens.first()?, 1)?.to_lowercase();
            let m = moment(tokens.get(1)?)?;
            let Some(DateRef::Weekday(base_ref)) = &m.date else { return None };

            let mut week_offset = 0;
            let mut base = Some(Direction::Next);
            for word in chain.split_whitespace() {
                match word {
                    "next" => week_offset += 1,
                    "last" | "past" | "previous" | "prev" | "preceding" => week_offset -= 1,
                    "this" => base = Some(Direction::This),
                    "upcoming" | "coming" | "following" => {}
                    _ => return None,
                }
            }

            Some(Phrase::Moment(Moment::from_date(DateRef::Weekday(WeekdayRef {
                weekday: base_ref.weekday,
                week_offset,
                base,
            }))))
        },
    }
}

/// Vernacular day names resolved as day offsets from the reference instant.
fn rule_datename() -> Rule {
    rule! {
        name: "datename",
        pattern: [re!(r"(?i)\b(today|tomorrow|tmw|yesterday)\b")],
        buckets: BucketMask::NAMEDISH.bits(),
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let offset = match regex_group(tokens.first()?, 1)? {
                "today" => 0,
                "tomorrow" | "tmw" => 1,
                "yesterday" => -1,
                _ => return None,
            };
            Some(Phrase::Moment(Moment::from_date(DateRef::DaysFromNow(offset))))
        },
    }
}

/// "first Wednesday of December", "last Fri in July 2024". Stored as a
/// deferred selector on the month and resolved against the calendar at
/// render time.
fn rule_nth_weekday_of_month() -> Rule {
    rule! {
        name: "nth weekday of month",
        pattern: [
            re!(r"(?i)\b(first|1st|second|2nd|third|3rd|fourth|4th|fifth|5th|last)\s+"),
            pred!(is_weekday_moment),
            re!(r"(?i)\s+(?:of|in)\s+"),
            pred!(is_month_bearing)
        ],
        buckets: (BucketMask::WEEKDAYISH | BucketMask::MONTHISH).bits(),
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let n: i8 = match regex_group(tokens.first()?, 1)? {
                "first" | "1st" => 1,
                "second" | "2nd" => 2,
                "third" | "3rd" => 3,
                "fourth" | "4th" => 4,
                "fifth" | "5th" => 5,
                "last" => -1,
                _ => return None,
            };
            let weekday = match phrase(tokens.get(1)?)? {
                Phrase::Moment(Moment { date: Some(DateRef::Weekday(w)), .. }) => w.weekday,
                _ => return None,
            };
            let m = moment(tokens.get(3)?)?;
            let Some(DateRef::Fields(month_fields)) = &m.date else { return None };

            let mut fields = month_fields.clone();
            fields.nth_weekday = Some((n, weekday));
            Some(date_moment(fields))
        },
    }
}

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        rule_numeric_date(),
        rule_dashed_date(),
        rule_monthname(),
        rule_monthname_number(),
        rule_monthname_day_comma_year(),
        rule_monthname_day_year(),
        rule_weekday(),
        rule_weekday_modified(),
        rule_datename(),
        rule_nth_weekday_of_month(),
    ]
}
