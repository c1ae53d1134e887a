//! Grammar rules: one module per terminal family plus the composition rules
//! that join phrases into datetimes, ranges, and lists.
//!
//! Rules come in two shapes. Regex-first rules recognize terminals straight
//! from the input (month names, clock times, spelled numbers). Predicate-first
//! rules combine phrases already in the stash ("<date> at <time>",
//! "<single> or <single>"), which is how the grammar composes bottom-up
//! during saturation.

#[path = "rules/collections.rs"]
pub(crate) mod collections;
#[path = "rules/dates.rs"]
pub(crate) mod dates;
#[path = "rules/durations.rs"]
pub(crate) mod durations;
#[path = "rules/numbers.rs"]
pub(crate) mod numbers;
#[path = "rules/times.rs"]
pub(crate) mod times;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;

use crate::model::{DateRef, Delta, Moment, Phrase};
use crate::{Rule, Token, TokenKind};

/// The full default ruleset, in no particular order (saturation does not
/// depend on rule order; selection ties are broken by priority).
pub(crate) fn get() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend(numbers::rules());
    rules.extend(dates::rules());
    rules.extend(times::rules());
    rules.extend(durations::rules());
    rules.extend(collections::rules());
    rules
}

// --- Shared extractors -------------------------------------------------------

/// Extract the integer value from a number token.
pub(crate) fn number_value(token: &Token) -> Option<i64> {
    match &token.kind {
        TokenKind::Number(n) => Some(n.value),
        _ => None,
    }
}

pub(crate) fn phrase(token: &Token) -> Option<&Phrase> {
    match &token.kind {
        TokenKind::Phrase(p) => Some(p),
        _ => None,
    }
}

pub(crate) fn moment(token: &Token) -> Option<&Moment> {
    match phrase(token)? {
        Phrase::Moment(m) => Some(m),
        _ => None,
    }
}

pub(crate) fn delta(token: &Token) -> Option<&Delta> {
    match phrase(token)? {
        Phrase::Delta(d) => Some(d),
        _ => None,
    }
}

/// Extract a capture group of a regex-match token. `None` when the group is
/// out of range or did not participate in the match.
pub(crate) fn regex_group(token: &Token, idx: usize) -> Option<&str> {
    match &token.kind {
        TokenKind::RegexMatch(groups) => groups.get(idx)?.as_deref(),
        _ => None,
    }
}

// --- Shared predicates -------------------------------------------------------

pub(crate) fn is_number(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Number(_))
}

pub(crate) fn is_moment(token: &Token) -> bool {
    moment(token).is_some()
}

/// A date with no time attached yet ("7/17", "tomorrow", "next Wed").
pub(crate) fn is_date_only(token: &Token) -> bool {
    moment(token).is_some_and(|m| m.has_date() && !m.has_time())
}

/// A time with no date attached yet ("5pm", "noon", "3:30 EST").
pub(crate) fn is_time_only(token: &Token) -> bool {
    moment(token).is_some_and(|m| m.has_time() && !m.has_date())
}

/// A bare month, possibly with a year, but no day ("December",
/// "December 2024"). These are what "first <weekday> of ..." selectors bind.
pub(crate) fn is_month_bearing(token: &Token) -> bool {
    moment(token).is_some_and(|m| {
        !m.has_time()
            && matches!(
                &m.date,
                Some(DateRef::Fields(f))
                    if f.month.is_some() && f.day.is_none() && f.nth_weekday.is_none()
            )
    })
}

/// A bare month with nothing else ("July") — the left half of "July 17".
pub(crate) fn is_month_only(token: &Token) -> bool {
    moment(token).is_some_and(|m| {
        !m.has_time()
            && matches!(
                &m.date,
                Some(DateRef::Fields(f))
                    if f.month.is_some()
                        && f.day.is_none()
                        && f.year.is_none()
                        && f.nth_weekday.is_none()
            )
    })
}

/// A month-and-day date that could still take a year ("July 17").
pub(crate) fn is_month_day(token: &Token) -> bool {
    moment(token).is_some_and(|m| {
        !m.has_time()
            && matches!(
                &m.date,
                Some(DateRef::Fields(f))
                    if f.month.is_some() && f.day.is_some() && f.year.is_none()
            )
    })
}

pub(crate) fn is_weekday_moment(token: &Token) -> bool {
    moment(token).is_some_and(|m| !m.has_time() && matches!(&m.date, Some(DateRef::Weekday(_))))
}

pub(crate) fn is_delta(token: &Token) -> bool {
    matches!(phrase(token), Some(Phrase::Delta(_)))
}

pub(crate) fn is_list(token: &Token) -> bool {
    matches!(phrase(token), Some(Phrase::List(_)))
}

/// Anything that can sit on either side of "to"/"-".
pub(crate) fn is_rangeable(token: &Token) -> bool {
    matches!(
        phrase(token),
        Some(Phrase::Moment(_) | Phrase::Delta(_) | Phrase::Ambiguous(_))
    )
}

/// Anything that can be a comma/"or" alternative, including whole ranges
/// ("4-5 or 5-6 PM").
pub(crate) fn is_listable(token: &Token) -> bool {
    matches!(
        phrase(token),
        Some(Phrase::Moment(_) | Phrase::Delta(_) | Phrase::Ambiguous(_) | Phrase::Range(_))
    )
}
