use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;

use crate::api::{Config, Direction, Value, parse_with};
use crate::error::ParseError;

/// Saturday, August 4th 2018, 2 PM.
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 8, 4).unwrap().and_hms_opt(14, 0, 0).unwrap()
}

fn config() -> Config {
    Config { now: Some(now()), ..Config::default() }
}

fn bare_config() -> Config {
    Config { infer_datetimes: false, ..config() }
}

fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Value {
    Value::DateTime {
        value: NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, 0).unwrap(),
        tz: None,
    }
}

fn dt_in(y: i32, mo: u32, d: u32, h: u32, mi: u32, tz: Tz) -> Value {
    let Value::DateTime { value, .. } = dt(y, mo, d, h, mi) else { unreachable!() };
    Value::DateTime { value, tz: Some(tz) }
}

fn range(start: Value, end: Value) -> Value {
    Value::Range(Box::new(start), Box::new(end))
}

fn values(text: &str, config: &Config) -> Vec<Value> {
    parse_with(text, config).unwrap_or_else(|e| panic!("`{text}` failed: {e}")).values
}

fn one(text: &str, config: &Config) -> Value {
    let mut vs = values(text, config);
    assert_eq!(vs.len(), 1, "`{text}` yielded {vs:?}");
    vs.pop().unwrap()
}

#[test]
fn single_datetimes() {
    // Array of (input, expected) against the fixed reference instant.
    let cases: Vec<(&str, Value)> = vec![
        ("5pm", dt(2018, 8, 4, 17, 0)),
        ("5p", dt(2018, 8, 4, 17, 0)),
        ("5 PM", dt(2018, 8, 4, 17, 0)),
        ("7/17/18", dt(2018, 7, 17, 0, 0)),
        ("7.17.18", dt(2018, 7, 17, 0, 0)),
        ("7-17-18", dt(2018, 7, 17, 0, 0)),
        ("7/17", dt(2018, 7, 17, 0, 0)),
        ("July 17, 2018", dt(2018, 7, 17, 0, 0)),
        ("July 17, 2018 at 3pm", dt(2018, 7, 17, 15, 0)),
        ("July 17, 2018 at 3p.m.", dt(2018, 7, 17, 15, 0)),
        ("July 17, 2018 3 p.m.", dt(2018, 7, 17, 15, 0)),
        ("July 17 2018", dt(2018, 7, 17, 0, 0)),
        ("3PM on July 17", dt(2018, 7, 17, 15, 0)),
        ("July 17 at 3", dt(2018, 7, 17, 3, 0)),
        ("7/17/18 3:00 p.m.", dt(2018, 7, 17, 15, 0)),
        ("7/17/18 15:00", dt(2018, 7, 17, 15, 0)),
        ("July 17", dt(2018, 7, 17, 0, 0)),
        ("July 2019", dt(2019, 7, 1, 0, 0)),
        ("May 2024", dt(2024, 5, 1, 0, 0)),
        ("May 17", dt(2018, 5, 17, 0, 0)),
        ("July", dt(2018, 7, 1, 0, 0)),
        ("jul. 17", dt(2018, 7, 17, 0, 0)),
        ("December 3rd", dt(2018, 12, 3, 0, 0)),
        ("5 o'clock pm", dt(2018, 8, 4, 17, 0)),
        // A "day" too large to be a day is a year.
        ("7/45", dt(2045, 7, 1, 0, 0)),
    ];

    let config = config();
    for (text, expected) in cases {
        assert_eq!(one(text, &config), expected, "{text}");
    }
}

#[test]
fn vernacular_names() {
    let cases: Vec<(&str, Value)> = vec![
        ("today", dt(2018, 8, 4, 0, 0)),
        ("tomorrow", dt(2018, 8, 5, 0, 0)),
        ("tmw", dt(2018, 8, 5, 0, 0)),
        ("yesterday", dt(2018, 8, 3, 0, 0)),
        ("tonight", dt(2018, 8, 4, 20, 0)),
        ("tomorrow noon", dt(2018, 8, 5, 12, 0)),
        ("Monday morning", dt(2018, 8, 6, 6, 0)),
        ("Thu midnight", dt(2018, 8, 9, 0, 0)),
        ("Tue evening", dt(2018, 8, 7, 18, 0)),
    ];

    let config = config();
    for (text, expected) in cases {
        assert_eq!(one(text, &config), expected, "{text}");
    }
}

#[test]
fn weekday_modifiers_compose() {
    // The reference instant is a Saturday.
    let cases: Vec<(&str, Value)> = vec![
        ("Monday", dt(2018, 8, 6, 0, 0)),
        ("mon", dt(2018, 8, 6, 0, 0)),
        ("sat", dt(2018, 8, 4, 0, 0)),
        ("next Monday", dt(2018, 8, 13, 0, 0)),
        ("next next Monday", dt(2018, 8, 20, 0, 0)),
        ("past Monday", dt(2018, 7, 30, 0, 0)),
        ("previous Monday", dt(2018, 7, 30, 0, 0)),
        ("upcoming Monday", dt(2018, 8, 6, 0, 0)),
        ("this Saturday", dt(2018, 8, 4, 0, 0)),
        ("next Monday at 3", dt(2018, 8, 13, 3, 0)),
    ];

    let config = config();
    for (text, expected) in cases {
        assert_eq!(one(text, &config), expected, "{text}");
    }

    let backwards = Config { direction: Direction::Previous, ..config };
    assert_eq!(one("Monday", &backwards), dt(2018, 7, 30, 0, 0));
}

#[test]
fn nth_weekday_selectors_resolve_on_the_calendar() {
    let config = config();
    assert_eq!(one("last Wednesday of December", &config), dt(2018, 12, 26, 0, 0));
    assert_eq!(one("first Wednesday of December", &config), dt(2018, 12, 5, 0, 0));
    assert_eq!(one("first Wednesday of December 2024", &config), dt(2024, 12, 4, 0, 0));
    assert_eq!(one("last Fri in July", &config), dt(2018, 7, 27, 0, 0));
}

#[test]
fn choices_propagate_date_and_meridiem() {
    let config = config();

    // Date flows forward into the second choice, meridiem flows backward
    // into the first.
    assert_eq!(
        one("7/17 4 or 5 PM", &config),
        Value::List(vec![dt(2018, 7, 17, 16, 0), dt(2018, 7, 17, 17, 0)])
    );

    assert_eq!(
        one("today or tomorrow noon", &config),
        Value::List(vec![dt(2018, 8, 4, 12, 0), dt(2018, 8, 5, 12, 0)])
    );

    assert_eq!(
        one("7/17, 7/18, 7/19", &config),
        Value::List(vec![
            dt(2018, 7, 17, 0, 0),
            dt(2018, 7, 18, 0, 0),
            dt(2018, 7, 19, 0, 0),
        ])
    );
}

#[test]
fn ranges_infer_between_endpoints() {
    let config = config();

    assert_eq!(
        one("3-4 pm", &config),
        range(dt(2018, 8, 4, 15, 0), dt(2018, 8, 4, 16, 0))
    );
    assert_eq!(
        one("3 p.m. - 4 p.m.", &config),
        range(dt(2018, 8, 4, 15, 0), dt(2018, 8, 4, 16, 0))
    );
    assert_eq!(
        one("7/4 - 7/6", &config),
        range(dt(2018, 7, 4, 0, 0), dt(2018, 7, 6, 0, 0))
    );
    assert_eq!(
        one("7/17 3 pm - 7/19 2 pm", &config),
        range(dt(2018, 7, 17, 15, 0), dt(2018, 7, 19, 14, 0))
    );
}

#[test]
fn range_end_rolls_over_midnight() {
    // The end has no date of its own and lands before the start, so it means
    // the next calendar day.
    let config = config();
    assert_eq!(
        one("11PM to 1AM", &config),
        range(dt(2018, 8, 4, 23, 0), dt(2018, 8, 5, 1, 0))
    );
}

#[test]
fn choices_of_ranges() {
    let config = config();
    assert_eq!(
        one("7/17 4-5 or 5-6 PM", &config),
        Value::List(vec![
            range(dt(2018, 7, 17, 16, 0), dt(2018, 7, 17, 17, 0)),
            range(dt(2018, 7, 17, 17, 0), dt(2018, 7, 17, 18, 0)),
        ])
    );
}

#[test]
fn durations() {
    let minutes = |m: i64| Value::Duration(TimeDelta::minutes(m));

    let bare = bare_config();
    assert_eq!(one("30 minutes", &bare), minutes(30));
    assert_eq!(one("thirty two minutes", &bare), minutes(32));
    assert_eq!(one("2h30m", &bare), minutes(150));
    assert_eq!(one("1 hour and 20 mins", &bare), minutes(80));
    assert_eq!(one("2h30m ago", &bare), minutes(-150));
    assert_eq!(one("2 weeks", &bare), Value::Duration(TimeDelta::days(14)));

    let config = config();
    assert_eq!(one("in 30 minutes", &config), dt(2018, 8, 4, 14, 30));
    assert_eq!(one("2h30m ago", &config), dt(2018, 8, 4, 11, 30));
}

#[test]
fn duration_ranges_borrow_the_unit() {
    let config = config();
    assert_eq!(
        one("30-40 mins", &config),
        range(dt(2018, 8, 4, 14, 30), dt(2018, 8, 4, 14, 40))
    );

    let bare = bare_config();
    assert_eq!(
        one("30-40 mins", &bare),
        range(
            Value::Duration(TimeDelta::minutes(30)),
            Value::Duration(TimeDelta::minutes(40)),
        )
    );
}

#[test]
fn bare_values_without_datetime_inference() {
    let bare = bare_config();
    assert_eq!(
        one("5p", &bare),
        Value::Time { value: NaiveTime::from_hms_opt(17, 0, 0).unwrap(), tz: None }
    );
    assert_eq!(one("7/17/18", &bare), Value::Date(NaiveDate::from_ymd_opt(2018, 7, 17).unwrap()));
}

#[test]
fn time_only_direction() {
    // 9 AM is already past at the 2 PM reference: Next rolls it forward,
    // Previous pulls a future time back, This leaves both in place.
    let next = config();
    assert_eq!(one("9am", &next), dt(2018, 8, 5, 9, 0));
    assert_eq!(one("5pm", &next), dt(2018, 8, 4, 17, 0));

    let previous = Config { direction: Direction::Previous, ..config() };
    assert_eq!(one("9am", &previous), dt(2018, 8, 4, 9, 0));
    assert_eq!(one("5pm", &previous), dt(2018, 8, 3, 17, 0));

    let this = Config { direction: Direction::This, ..config() };
    assert_eq!(one("9am", &this), dt(2018, 8, 4, 9, 0));
    assert_eq!(one("5pm", &this), dt(2018, 8, 4, 17, 0));
}

#[test]
fn timezones_from_text_win_over_now() {
    let eastern = chrono_tz::America::New_York;
    let pacific = chrono_tz::America::Los_Angeles;
    let with_pacific_now = Config { tz: Some(pacific), ..config() };

    // 1. A zone written in the text is honored first.
    assert_eq!(one("Wed EST", &with_pacific_now), dt_in(2018, 8, 8, 0, 0, eastern));
    assert_eq!(one("Wed 5p EST", &with_pacific_now), dt_in(2018, 8, 8, 17, 0, eastern));
    assert_eq!(one("5p EST", &with_pacific_now), dt_in(2018, 8, 4, 17, 0, eastern));
    assert_eq!(one("9a EST", &with_pacific_now), dt_in(2018, 8, 5, 9, 0, eastern));

    let previous =
        Config { direction: Direction::Previous, ..with_pacific_now.clone() };
    assert_eq!(one("5p EST", &previous), dt_in(2018, 8, 3, 17, 0, eastern));

    let bare = Config { infer_datetimes: false, ..with_pacific_now.clone() };
    assert_eq!(
        one("9a EST", &bare),
        Value::Time { value: NaiveTime::from_hms_opt(9, 0, 0).unwrap(), tz: Some(eastern) }
    );

    // 2. Otherwise the zone of `now` applies.
    assert_eq!(one("Wed", &with_pacific_now), dt_in(2018, 8, 8, 0, 0, pacific));
    // 3. With neither, values stay zoneless.
    assert_eq!(one("Wed", &config()), dt(2018, 8, 8, 0, 0));

    // Full zone names come from the same table.
    assert_eq!(
        one("5p Pacific Standard Time", &config()),
        dt_in(2018, 8, 4, 17, 0, pacific)
    );
}

#[test]
fn unparseable_text_is_not_an_error() {
    let config = config();
    assert_eq!(values("", &config), Vec::<Value>::new());
    assert_eq!(values("completely unrelated text", &config), Vec::<Value>::new());
    // A bare integer has no calendar meaning on its own.
    assert_eq!(values("5", &config), Vec::<Value>::new());
    // But recognized islands still come through.
    assert_eq!(values("how does 5p sound?", &config), vec![dt(2018, 8, 4, 17, 0)]);
}

#[test]
fn inconsistent_fields_are_errors() {
    let config = config();
    assert_eq!(
        parse_with("7/45/20", &config).unwrap_err(),
        ParseError::InconsistentField { rule: "numeric date", field: "day", value: 45 }
    );
}

#[test]
fn ambiguity_without_context_is_an_error() {
    let config = config();
    assert_eq!(
        parse_with("5 or 7", &config).unwrap_err(),
        ParseError::UnresolvedAmbiguity { value: 5 }
    );
}

#[test]
fn invalid_calendar_dates_are_render_errors() {
    let config = config();
    assert_eq!(
        parse_with("2/30/2018", &config).unwrap_err(),
        ParseError::InvalidDate { year: 2018, month: 2, day: 30 }
    );
}

#[test]
fn canonical_strings_round_trip() {
    let config = config();
    let original = one("July 17, 2018 3:30 pm", &config);
    let Value::DateTime { value, .. } = &original else { panic!("expected datetime") };

    let canonical = value.format("%-m/%-d/%Y %H:%M").to_string();
    assert_eq!(canonical, "7/17/2018 15:30");
    assert_eq!(one(&canonical, &config), original);
}

#[test]
fn two_digit_years_expand_in_context() {
    let config = config();
    assert_eq!(one("7/17/55", &config), dt(1955, 7, 17, 0, 0));
    assert_eq!(one("7/17/07", &config), dt(2007, 7, 17, 0, 0));
    assert_eq!(one("July 17, 55", &config), dt(1955, 7, 17, 0, 0));
}
