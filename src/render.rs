//! Rendering: turn inferred partial values into concrete chrono values under
//! the caller's configuration.
//!
//! This is where `now` enters. Missing date fields default to the reference
//! instant (day defaults to 1), relative hours go through the 12/24-hour
//! conversion, weekday references and "nth weekday of month" selectors hit
//! the calendar, and time-only values are pushed onto the right day by the
//! configured direction. Rendering never mutates its input; every resolved
//! value is built fresh.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

use crate::api::{Config, Direction, Value};
use crate::error::ParseError;
use crate::model::{DateRef, Delta, Meridiem, Moment, PartialTime, Phrase, WeekdayRef};

pub(crate) fn render(
    phrase: &Phrase,
    config: &Config,
    now: NaiveDateTime,
) -> Result<Value, ParseError> {
    match phrase {
        Phrase::Moment(m) => render_moment(m, config, now),
        Phrase::Delta(d) => Ok(render_delta(d, config, now)),
        Phrase::Ambiguous(value) => Err(ParseError::UnresolvedAmbiguity { value: *value }),
        Phrase::Range(items) => render_range(items, config, now),
        Phrase::List(items) => {
            let values = items
                .iter()
                .map(|item| render(item, config, now))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::List(values))
        }
    }
}

fn render_delta(delta: &Delta, config: &Config, now: NaiveDateTime) -> Value {
    let duration = TimeDelta::days(delta.days) + TimeDelta::seconds(delta.seconds);
    if config.infer_datetimes {
        Value::DateTime { value: now + duration, tz: config.tz }
    } else {
        Value::Duration(duration)
    }
}

fn render_range(
    items: &[Phrase],
    config: &Config,
    now: NaiveDateTime,
) -> Result<Value, ParseError> {
    let start = render(&items[0], config, now)?;
    let mut end = render(&items[1], config, now)?;

    // "11 PM to 1 AM" crosses midnight: when the end carries no date of its
    // own and lands before the start, it means the next day.
    let mut rollover = None;
    if let (Value::DateTime { value: s, .. }, Value::DateTime { value: e, tz }) = (&start, &end) {
        let end_has_own_date = matches!(&items[1], Phrase::Moment(m) if m.has_date());
        if !end_has_own_date && e < s {
            rollover = Some((*e, *tz));
        }
    }
    if let Some((e, tz)) = rollover {
        let bumped = e
            .checked_add_days(Days::new(1))
            .ok_or(ParseError::InvalidDate { year: e.year(), month: e.month(), day: e.day() })?;
        end = Value::DateTime { value: bumped, tz };
    }

    Ok(Value::Range(Box::new(start), Box::new(end)))
}

fn render_moment(
    moment: &Moment,
    config: &Config,
    now: NaiveDateTime,
) -> Result<Value, ParseError> {
    // Timezone precedence: one written in the text beats the zone of `now`;
    // with neither, the value stays zoneless.
    let tz = moment.tz.or(config.tz);

    match (&moment.date, &moment.time) {
        (Some(date), Some(time)) => {
            let date = resolve_date(date, config, now)?;
            let time = resolve_time(time)?;
            Ok(Value::DateTime { value: date.and_time(time), tz })
        }
        (Some(date), None) => {
            let date = resolve_date(date, config, now)?;
            if config.infer_datetimes {
                Ok(Value::DateTime { value: date.and_time(NaiveTime::MIN), tz })
            } else {
                // A bare date cannot carry a zone.
                Ok(Value::Date(date))
            }
        }
        (None, Some(time)) => {
            let time = resolve_time(time)?;
            if config.infer_datetimes {
                let mut candidate = now.date().and_time(time);
                match config.direction {
                    Direction::Next if candidate < now => {
                        candidate = bump_days(candidate, 1)?;
                    }
                    Direction::Previous if candidate > now => {
                        candidate = bump_days(candidate, -1)?;
                    }
                    _ => {}
                }
                Ok(Value::DateTime { value: candidate, tz })
            } else {
                Ok(Value::Time { value: time, tz })
            }
        }
        (None, None) => unreachable!("moment with neither date nor time"),
    }
}

fn bump_days(value: NaiveDateTime, days: i64) -> Result<NaiveDateTime, ParseError> {
    value
        .checked_add_signed(TimeDelta::days(days))
        .ok_or(ParseError::InvalidDate { year: value.year(), month: value.month(), day: value.day() })
}

fn resolve_date(
    date: &DateRef,
    config: &Config,
    now: NaiveDateTime,
) -> Result<NaiveDate, ParseError> {
    match date {
        DateRef::Fields(fields) => {
            let year = fields.year.unwrap_or_else(|| now.year());
            let month = fields.month.unwrap_or_else(|| now.month());
            if let Some((n, weekday)) = fields.nth_weekday {
                return nth_weekday_of_month(year, month, n, weekday);
            }
            let day = fields.day.unwrap_or(1);
            NaiveDate::from_ymd_opt(year, month, day)
                .ok_or(ParseError::InvalidDate { year, month, day })
        }
        DateRef::DaysFromNow(offset) => now
            .date()
            .checked_add_signed(TimeDelta::days(*offset))
            .ok_or(ParseError::InvalidDate { year: now.year(), month: now.month(), day: now.day() }),
        DateRef::Weekday(weekday) => resolve_weekday(weekday, config, now),
    }
}

fn resolve_weekday(
    wref: &WeekdayRef,
    config: &Config,
    now: NaiveDateTime,
) -> Result<NaiveDate, ParseError> {
    let today = now.date();
    let ahead = i64::from(wref.weekday.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday());
    let ahead = ahead.rem_euclid(7); // 0 when today already matches
    let behind = (-ahead).rem_euclid(7);

    // An explicit modifier pinned the anchor; otherwise the caller's
    // configured direction decides which occurrence a bare "Monday" means.
    let direction = wref.base.unwrap_or(config.direction);
    let days = match direction {
        Direction::Next => ahead,
        Direction::Previous => -behind,
        // Nearest occurrence including today, ties going forward. What
        // "this Monday" should mean is genuinely unsettled; nearest is the
        // least surprising reading.
        Direction::This => {
            if ahead <= 3 {
                ahead
            } else {
                ahead - 7
            }
        }
    };

    today
        .checked_add_signed(TimeDelta::days(days + 7 * i64::from(wref.week_offset)))
        .ok_or(ParseError::InvalidDate { year: now.year(), month: now.month(), day: now.day() })
}

/// Resolve "first Wednesday of <month>" style selectors. Positive `n`
/// counts from the start of the month, negative from the end. Selecting an
/// occurrence the month does not have (a fifth Friday in a four-Friday
/// month) is a render error, not a clamp.
fn nth_weekday_of_month(
    year: i32,
    month: u32,
    n: i8,
    weekday: Weekday,
) -> Result<NaiveDate, ParseError> {
    let invalid = ParseError::InvalidDate { year, month, day: 1 };

    let date = if n > 0 {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
        let offset = i64::from(weekday.num_days_from_monday())
            - i64::from(first.weekday().num_days_from_monday());
        first
            .checked_add_signed(TimeDelta::days(offset.rem_euclid(7) + 7 * i64::from(n - 1)))
            .ok_or(invalid.clone())?
    } else {
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let last = next_month.ok_or(invalid.clone())?.pred_opt().ok_or(invalid.clone())?;
        let offset = i64::from(last.weekday().num_days_from_monday())
            - i64::from(weekday.num_days_from_monday());
        last.checked_sub_signed(TimeDelta::days(offset.rem_euclid(7) + 7 * i64::from(-n - 1)))
            .ok_or(invalid.clone())?
    };

    if date.month() != month || date.year() != year {
        return Err(ParseError::InvalidDate { year, month, day: date.day() });
    }
    Ok(date)
}

/// Apply the 12-hour to 24-hour conversion and build a concrete time.
/// Hours are kept in their written 1-12 relative form until this point.
fn resolve_time(time: &PartialTime) -> Result<NaiveTime, ParseError> {
    let mut hour = time.hour.unwrap_or(0);
    match time.meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        _ => {}
    }
    let minute = time.minute.unwrap_or(0);
    NaiveTime::from_hms_milli_opt(
        hour,
        minute,
        time.second.unwrap_or(0),
        time.millisecond.unwrap_or(0),
    )
    .ok_or(ParseError::InvalidTime { hour, minute })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PartialDate;

    fn cfg() -> Config {
        Config::default()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 8, 4).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn twelve_hour_conversion() {
        for (hour, meridiem, expect) in [
            (1, Meridiem::Pm, 13),
            (11, Meridiem::Pm, 23),
            (12, Meridiem::Pm, 12),
            (12, Meridiem::Am, 0),
            (1, Meridiem::Am, 1),
            (11, Meridiem::Am, 11),
        ] {
            let time = PartialTime::hour_meridiem(hour, meridiem);
            assert_eq!(
                resolve_time(&time).unwrap(),
                NaiveTime::from_hms_opt(expect, 0, 0).unwrap(),
                "{hour} {meridiem:?}"
            );
        }
    }

    #[test]
    fn twenty_four_hour_input_passes_through() {
        let time = PartialTime { hour: Some(15), minute: Some(30), ..Default::default() };
        assert_eq!(resolve_time(&time).unwrap(), NaiveTime::from_hms_opt(15, 30, 0).unwrap());
    }

    #[test]
    fn date_defaults_come_from_now() {
        // Bare "July": day defaults to 1, year to now's.
        let date = DateRef::Fields(PartialDate { month: Some(7), ..Default::default() });
        assert_eq!(
            resolve_date(&date, &cfg(), at(14, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2018, 7, 1).unwrap()
        );
    }

    #[test]
    fn invalid_calendar_dates_error_rather_than_clamp() {
        let date = DateRef::Fields(PartialDate {
            year: Some(2018),
            month: Some(2),
            day: Some(30),
            ..Default::default()
        });
        assert_eq!(
            resolve_date(&date, &cfg(), at(14, 0)),
            Err(ParseError::InvalidDate { year: 2018, month: 2, day: 30 })
        );
    }

    #[test]
    fn weekday_direction_default_is_upcoming() {
        // 2018-08-04 is a Saturday.
        let wref = WeekdayRef { weekday: Weekday::Wed, week_offset: 0, base: None };
        assert_eq!(
            resolve_weekday(&wref, &cfg(), at(14, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2018, 8, 8).unwrap()
        );
        // Same weekday as today stays today.
        let sat = WeekdayRef { weekday: Weekday::Sat, week_offset: 0, base: None };
        assert_eq!(
            resolve_weekday(&sat, &cfg(), at(14, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2018, 8, 4).unwrap()
        );
    }

    #[test]
    fn weekday_offsets_compose() {
        // "next Monday" from Saturday 8/4 is 8/13; "past Monday" is 7/30.
        let next = WeekdayRef {
            weekday: Weekday::Mon,
            week_offset: 1,
            base: Some(Direction::Next),
        };
        assert_eq!(
            resolve_weekday(&next, &cfg(), at(14, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2018, 8, 13).unwrap()
        );
        let past = WeekdayRef {
            weekday: Weekday::Mon,
            week_offset: -1,
            base: Some(Direction::Next),
        };
        assert_eq!(
            resolve_weekday(&past, &cfg(), at(14, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2018, 7, 30).unwrap()
        );
    }

    #[test]
    fn nth_weekday_selectors() {
        // December 2018: first Wednesday is the 5th, last the 26th.
        assert_eq!(
            nth_weekday_of_month(2018, 12, 1, Weekday::Wed).unwrap(),
            NaiveDate::from_ymd_opt(2018, 12, 5).unwrap()
        );
        assert_eq!(
            nth_weekday_of_month(2018, 12, -1, Weekday::Wed).unwrap(),
            NaiveDate::from_ymd_opt(2018, 12, 26).unwrap()
        );
        // February 2018 has no fifth Friday.
        assert!(nth_weekday_of_month(2018, 2, 5, Weekday::Fri).is_err());
    }
}
