//! Partial semantic values built by the grammar rules.
//!
//! Every field is optional until rendering: "5pm" is a `Moment` with a time
//! and no date, "July" is a `Moment` with a month and nothing else. The
//! inference pass (`infer.rs`) moves fields between neighboring values, and
//! the renderer (`render.rs`) fills whatever is still missing from the
//! reference instant.

use chrono::Weekday;
use chrono_tz::Tz;

use crate::api::Direction;
use crate::error::ParseError;

/// AM/PM designator. Applied during the 12- to 24-hour conversion when a
/// value is rendered; until then hours stay in the 1-12 form they were
/// written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Canonical duration unit after alias folding (min/mins/m => Minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeltaUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// First-non-null-wins combinator used when grammar rules merge the partial
/// records of their children.
pub(crate) fn merge<T>(first: Option<T>, second: Option<T>) -> Option<T> {
    first.or(second)
}

/// Expand a two-digit year the way people write them: `'55` is 1955, `'07`
/// is 2007. Values of 100 or more pass through untouched.
pub(crate) fn expand_year(year: i64) -> i64 {
    if (50..100).contains(&year) {
        1900 + year
    } else if (0..50).contains(&year) {
        2000 + year
    } else {
        year
    }
}

// --- Dates -------------------------------------------------------------------

/// Numeric calendar fields, each optional. `nth_weekday` is the deferred
/// "first Wednesday of ..." selector: positive n counts from the start of the
/// month, negative n from the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PartialDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub nth_weekday: Option<(i8, Weekday)>,
}

/// A weekday name plus the directional modifiers that preceded it.
///
/// `week_offset` accumulates one week per "next" and minus one per
/// "last"/"past"/"previous"/"preceding". `base` is `Some` when a modifier
/// fixed the anchor ("this Monday"); `None` leaves the anchor to the
/// caller's configured direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WeekdayRef {
    pub weekday: Weekday,
    pub week_offset: i32,
    pub base: Option<Direction>,
}

/// A date as written: either explicit fields, a day offset from the
/// reference instant ("tomorrow" is +1), or a weekday reference. All three
/// become a concrete `NaiveDate` only at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DateRef {
    Fields(PartialDate),
    DaysFromNow(i64),
    Weekday(WeekdayRef),
}

impl DateRef {
    fn month(&self) -> Option<u32> {
        match self {
            DateRef::Fields(f) => f.month,
            _ => None,
        }
    }

    fn year(&self) -> Option<i32> {
        match self {
            DateRef::Fields(f) => f.year,
            _ => None,
        }
    }
}

// --- Times -------------------------------------------------------------------

/// Clock fields as written. `hour` stays in the relative 1-12 form (or an
/// explicit 24-hour value); the meridiem is applied at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PartialTime {
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub millisecond: Option<u32>,
    pub meridiem: Option<Meridiem>,
}

impl PartialTime {
    pub fn hour(hour: u32) -> Self {
        PartialTime { hour: Some(hour), ..Default::default() }
    }

    pub fn hour_meridiem(hour: u32, meridiem: Meridiem) -> Self {
        PartialTime { hour: Some(hour), meridiem: Some(meridiem), ..Default::default() }
    }
}

// --- Moments -----------------------------------------------------------------

/// A datetime with optional halves: a bare date, a bare time, or both.
/// The timezone is owned here so that date-only expressions ("Wed EST") can
/// carry one even though no clock time was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Moment {
    pub date: Option<DateRef>,
    pub time: Option<PartialTime>,
    pub tz: Option<Tz>,
}

impl Moment {
    pub fn from_date(date: DateRef) -> Self {
        Moment { date: Some(date), time: None, tz: None }
    }

    pub fn from_time(time: PartialTime) -> Self {
        Moment { date: None, time: Some(time), tz: None }
    }

    pub fn has_date(&self) -> bool {
        self.date.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Combine a date-bearing moment with a time-bearing one, first
    /// non-null winning per field.
    pub fn merged(self, other: Moment) -> Moment {
        Moment {
            date: merge(self.date, other.date),
            time: merge(self.time, other.time),
            tz: merge(self.tz, other.tz),
        }
    }
}

// --- Durations ---------------------------------------------------------------

/// A signed duration in day/second magnitude plus the unit it was last
/// written in, kept so a bare neighboring integer ("30-40 mins") can be read
/// in the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Delta {
    pub days: i64,
    pub seconds: i64,
    pub unit: Option<DeltaUnit>,
}

impl Delta {
    /// Build a delta of `amount` in `unit`. Calendar units use fixed
    /// magnitudes: a month is 30 days and a year 365.
    pub fn from_unit(amount: i64, unit: DeltaUnit) -> Self {
        let (days, seconds) = match unit {
            DeltaUnit::Second => (0, amount),
            DeltaUnit::Minute => (0, amount * 60),
            DeltaUnit::Hour => (0, amount * 3600),
            DeltaUnit::Day => (amount, 0),
            DeltaUnit::Week => (amount * 7, 0),
            DeltaUnit::Month => (amount * 30, 0),
            DeltaUnit::Year => (amount * 365, 0),
        };
        Delta { days, seconds, unit: Some(unit) }
    }

    /// Sum two duration parts; the right-hand (usually finer) unit is kept.
    pub fn plus(self, other: Delta) -> Delta {
        Delta {
            days: self.days + other.days,
            seconds: self.seconds + other.seconds,
            unit: merge(other.unit, self.unit),
        }
    }

    pub fn negated(self) -> Delta {
        Delta { days: -self.days, seconds: -self.seconds, unit: self.unit }
    }
}

// --- The semantic value ------------------------------------------------------

/// A parsed expression before inference and rendering.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Phrase {
    Moment(Moment),
    Delta(Delta),
    /// A bare integer that could still be an hour, day, month, year, or
    /// quantity. Carries no fields of its own.
    Ambiguous(i64),
    /// Ordered start/end pair (always exactly two items).
    Range(Vec<Phrase>),
    /// Comma/"or"-delimited alternatives.
    List(Vec<Phrase>),
}

/// The fields the inference engine is allowed to move between neighbors, in
/// the order they are tried. Time precedes date so that a bare integer next
/// to a time-bearing neighbor is read as an hour, not a day.
pub(crate) const INFER_FIELDS: [Field; 6] =
    [Field::Time, Field::Date, Field::Month, Field::Year, Field::Meridiem, Field::Tz];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Time,
    Date,
    Month,
    Year,
    Meridiem,
    Tz,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Time(PartialTime),
    Date(DateRef),
    Month(u32),
    Year(i32),
    Meridiem(Meridiem),
    Tz(Tz),
}

impl Phrase {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Phrase::Ambiguous(_))
    }

    /// Read a field. Collections answer with the first non-null value any
    /// item holds.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match self {
            Phrase::Moment(m) => match field {
                Field::Time => m.time.clone().map(FieldValue::Time),
                Field::Date => m.date.clone().map(FieldValue::Date),
                Field::Month => m.date.as_ref().and_then(|d| d.month()).map(FieldValue::Month),
                Field::Year => m.date.as_ref().and_then(|d| d.year()).map(FieldValue::Year),
                Field::Meridiem => m.time.as_ref().and_then(|t| t.meridiem).map(FieldValue::Meridiem),
                Field::Tz => m.tz.map(FieldValue::Tz),
            },
            Phrase::Delta(_) | Phrase::Ambiguous(_) => None,
            Phrase::Range(items) | Phrase::List(items) => {
                items.iter().find_map(|item| item.get(field))
            }
        }
    }

    /// Write a field. Collections broadcast to every item. Writing a time,
    /// date, or meridiem to an `Ambiguous` integer reinterprets it using the
    /// incoming value's shape (hour next to a time, day-or-year next to a
    /// date); other writes to non-datelike values are ignored.
    pub fn set(&mut self, field: Field, value: FieldValue) {
        match self {
            Phrase::Moment(m) => match (field, value) {
                (Field::Time, FieldValue::Time(t)) => m.time = Some(t),
                (Field::Date, FieldValue::Date(d)) => m.date = Some(d),
                (Field::Month, FieldValue::Month(month)) => {
                    if let Some(DateRef::Fields(f)) = &mut m.date {
                        f.month = Some(month);
                    }
                }
                (Field::Year, FieldValue::Year(year)) => {
                    if let Some(DateRef::Fields(f)) = &mut m.date {
                        f.year = Some(year);
                    }
                }
                (Field::Meridiem, FieldValue::Meridiem(meridiem)) => {
                    if let Some(t) = &mut m.time {
                        t.meridiem = Some(meridiem);
                    }
                }
                (Field::Tz, FieldValue::Tz(tz)) => m.tz = Some(tz),
                _ => {}
            },
            Phrase::Ambiguous(raw) => {
                let raw = *raw;
                if raw < 0 {
                    return;
                }
                match (field, value) {
                    // An integer next to a clock time is an hour in the same
                    // half of the day.
                    (Field::Time, FieldValue::Time(t)) => {
                        let mut time = PartialTime::hour(raw as u32);
                        time.meridiem = t.meridiem;
                        *self = Phrase::Moment(Moment::from_time(time));
                    }
                    (Field::Meridiem, FieldValue::Meridiem(meridiem)) => {
                        *self = Phrase::Moment(Moment::from_time(PartialTime::hour_meridiem(
                            raw as u32, meridiem,
                        )));
                    }
                    // Day if it could be one, else a year ("May 2024").
                    (Field::Date, FieldValue::Date(_)) => {
                        let fields = if raw < 32 {
                            PartialDate { day: Some(raw as u32), ..Default::default() }
                        } else {
                            PartialDate {
                                year: Some(expand_year(raw) as i32),
                                ..Default::default()
                            }
                        };
                        *self = Phrase::Moment(Moment::from_date(DateRef::Fields(fields)));
                    }
                    _ => {}
                }
            }
            Phrase::Delta(_) => {}
            Phrase::Range(items) | Phrase::List(items) => {
                for item in items {
                    item.set(field, value.clone());
                }
            }
        }
    }

    /// Check ranges of every numeric field that the grammar could not
    /// constrain on its own. Runs once per selected expression before
    /// inference.
    pub fn validate(&self, rule: &'static str) -> Result<(), ParseError> {
        match self {
            Phrase::Moment(m) => {
                if let Some(DateRef::Fields(f)) = &m.date {
                    if let Some(month) = f.month {
                        if !(1..=12).contains(&month) {
                            return Err(ParseError::InconsistentField {
                                rule,
                                field: "month",
                                value: month as i64,
                            });
                        }
                    }
                    if let Some(day) = f.day {
                        if !(1..=31).contains(&day) {
                            return Err(ParseError::InconsistentField {
                                rule,
                                field: "day",
                                value: day as i64,
                            });
                        }
                    }
                }
                if let Some(t) = &m.time {
                    if let Some(hour) = t.hour {
                        if hour > 24 {
                            return Err(ParseError::InconsistentField {
                                rule,
                                field: "hour",
                                value: hour as i64,
                            });
                        }
                    }
                    if let Some(minute) = t.minute {
                        if minute > 59 {
                            return Err(ParseError::InconsistentField {
                                rule,
                                field: "minute",
                                value: minute as i64,
                            });
                        }
                    }
                    if let Some(second) = t.second {
                        if second > 59 {
                            return Err(ParseError::InconsistentField {
                                rule,
                                field: "second",
                                value: second as i64,
                            });
                        }
                    }
                }
                Ok(())
            }
            Phrase::Delta(_) | Phrase::Ambiguous(_) => Ok(()),
            Phrase::Range(items) | Phrase::List(items) => {
                items.iter().try_for_each(|item| item.validate(rule))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_years_expand() {
        assert_eq!(expand_year(55), 1955);
        assert_eq!(expand_year(99), 1999);
        assert_eq!(expand_year(0), 2000);
        assert_eq!(expand_year(18), 2018);
        assert_eq!(expand_year(49), 2049);
        assert_eq!(expand_year(50), 1950);
        assert_eq!(expand_year(100), 100);
        assert_eq!(expand_year(2024), 2024);
    }

    #[test]
    fn collection_reads_first_non_null() {
        let list = Phrase::List(vec![
            Phrase::Moment(Moment::from_time(PartialTime::hour(4))),
            Phrase::Moment(Moment::from_time(PartialTime::hour_meridiem(5, Meridiem::Pm))),
        ]);
        assert_eq!(list.get(Field::Meridiem), Some(FieldValue::Meridiem(Meridiem::Pm)));
        assert_eq!(list.get(Field::Date), None);
    }

    #[test]
    fn time_write_reinterprets_bare_integer_as_hour() {
        let mut phrase = Phrase::Ambiguous(3);
        phrase.set(Field::Time, FieldValue::Time(PartialTime::hour_meridiem(4, Meridiem::Pm)));
        match phrase {
            Phrase::Moment(m) => {
                let t = m.time.expect("time");
                assert_eq!(t.hour, Some(3), "the integer stays the hour");
                assert_eq!(t.meridiem, Some(Meridiem::Pm), "the neighbor's meridiem transfers");
            }
            other => panic!("expected a moment, got {other:?}"),
        }
    }

    #[test]
    fn date_write_reinterprets_bare_integer_day_or_year() {
        let mut day = Phrase::Ambiguous(17);
        day.set(Field::Date, FieldValue::Date(DateRef::Fields(PartialDate::default())));
        assert_eq!(day.get(Field::Date), Some(FieldValue::Date(DateRef::Fields(PartialDate {
            day: Some(17),
            ..Default::default()
        }))));

        let mut year = Phrase::Ambiguous(2024);
        year.set(Field::Date, FieldValue::Date(DateRef::Fields(PartialDate::default())));
        assert_eq!(year.get(Field::Year), Some(FieldValue::Year(2024)));
    }

    #[test]
    fn out_of_range_day_is_inconsistent() {
        let phrase = Phrase::Moment(Moment::from_date(DateRef::Fields(PartialDate {
            day: Some(45),
            year: Some(2020),
            month: Some(7),
            ..Default::default()
        })));
        assert_eq!(
            phrase.validate("date"),
            Err(ParseError::InconsistentField { rule: "date", field: "day", value: 45 })
        );
    }
}
