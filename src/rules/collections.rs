//! Composition rules: joining dates with times into datetimes, and singles
//! into ranges and comma/"or" lists.

use crate::model::{Moment, PartialTime, Phrase};
use crate::rules::{is_date_only, is_list, is_listable, is_number, is_rangeable, is_time_only};
use crate::rules::{moment, number_value, phrase};
use crate::{Rule, Token};

/// "<date> <time>", "<date> at <time>", "<date>, <time>".
fn rule_date_time() -> Rule {
    rule! {
        name: "date time",
        pattern: [
            pred!(is_date_only),
            re!(r"(?i)\s*(?:,\s*)?(?:at\s+)?"),
            pred!(is_time_only)
        ],
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let date = moment(tokens.first()?)?.clone();
            let time = moment(tokens.get(2)?)?.clone();
            Some(Phrase::Moment(date.merged(time)))
        },
    }
}

/// "<time> on <date>" ("3 PM on July 17").
fn rule_time_on_date() -> Rule {
    rule! {
        name: "time on date",
        pattern: [pred!(is_time_only), re!(r"(?i)\s+on\s+"), pred!(is_date_only)],
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let time = moment(tokens.first()?)?.clone();
            let date = moment(tokens.get(2)?)?.clone();
            Some(Phrase::Moment(date.merged(time)))
        },
    }
}

/// "<date> at <integer>" reads the integer as an hour ("July 17 at 3").
fn rule_date_at_hour() -> Rule {
    rule! {
        name: "date at hour",
        pattern: [pred!(is_date_only), re!(r"(?i)\s+at\s+"), pred!(is_number)],
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            date_with_hour(tokens.first()?, tokens.get(2)?)
        },
    }
}

/// "<date> <integer>" with a plausible hour ("7/17 4"). Low priority: when
/// the integer could instead complete the date ("May 17"), the date rules
/// win the span.
fn rule_date_hour() -> Rule {
    rule! {
        name: "date hour",
        pattern: [pred!(is_date_only), re!(r"\s+"), pred!(is_number)],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            date_with_hour(tokens.first()?, tokens.get(2)?)
        },
    }
}

fn date_with_hour(date_token: &Token, hour_token: &Token) -> Option<Phrase> {
    let hour = number_value(hour_token)?;
    if !(1..=24).contains(&hour) {
        return None;
    }
    let date = moment(date_token)?.clone();
    let time = Moment::from_time(PartialTime::hour(hour as u32));
    Some(Phrase::Moment(date.merged(time)))
}

/// "<single> to <single>" / "<single>-<single>".
fn rule_range() -> Rule {
    rule! {
        name: "range",
        pattern: [
            pred!(is_rangeable),
            re!(r"(?i)\s*(?:to\b|[-–])\s*"),
            pred!(is_rangeable)
        ],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let start = phrase(tokens.first()?)?.clone();
            let end = phrase(tokens.get(2)?)?.clone();
            Some(Phrase::Range(vec![start, end]))
        },
    }
}

/// Two alternatives joined by a comma or "or".
fn rule_list_pair() -> Rule {
    rule! {
        name: "list",
        pattern: [
            pred!(is_listable),
            re!(r"(?i)\s*,\s*(?:or\s+)?|\s+or\s+"),
            pred!(is_listable)
        ],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let first = phrase(tokens.first()?)?.clone();
            let second = phrase(tokens.get(2)?)?.clone();
            Some(Phrase::List(vec![first, second]))
        },
    }
}

/// Grow an existing list by one more alternative ("a, b or c").
fn rule_list_extend() -> Rule {
    rule! {
        name: "list extend",
        pattern: [
            pred!(is_list),
            re!(r"(?i)\s*,\s*(?:or\s+)?|\s+or\s+"),
            pred!(is_listable)
        ],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let Phrase::List(items) = phrase(tokens.first()?)? else { return None };
            let mut items = items.clone();
            items.push(phrase(tokens.get(2)?)?.clone());
            Some(Phrase::List(items))
        },
    }
}

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        rule_date_time(),
        rule_time_on_date(),
        rule_date_at_hour(),
        rule_date_hour(),
        rule_range(),
        rule_list_pair(),
        rule_list_extend(),
    ]
}
