//! Duration phrases: "<number> <unit>" parts, compact clock-style forms
//! ("2h30m"), their sums, and the "in ..."/"... ago" sign markers.

use crate::model::{Delta, Phrase};
use crate::rules::{delta, is_delta, is_number, number_value, regex_group};
use crate::{Rule, Token, tables};

// Unit alternations below keep longest aliases first so "mo" is not eaten by
// "m" or "min" by "minute".

/// One duration part: a number token followed by a unit alias. Spelled-out
/// numbers ("thirty two minutes") arrive here as ordinary number tokens.
fn rule_duration_part() -> Rule {
    rule! {
        name: "duration part",
        pattern: [
            pred!(is_number),
            re!(r"(?i)\s*(years?|yrs?|y|months?|mos?|weeks?|wks?|w|days?|d|hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)\b")
        ],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let amount = number_value(tokens.first()?)?;
            if amount < 0 {
                return None;
            }
            let unit = tables::duration_unit(regex_group(tokens.get(1)?, 1)?)?;
            Some(Phrase::Delta(Delta::from_unit(amount, unit)))
        },
    }
}

/// Compact run-together parts: "2h", "2h30m", "2h30m15s". These never
/// tokenize as separate numbers because a digit glued to a letter has no
/// word boundary between them.
fn rule_duration_compact() -> Rule {
    rule! {
        name: "duration compact",
        pattern: [
            re!(r"(?i)\b(\d+)(years?|yrs?|y|months?|mos?|weeks?|wks?|w|days?|d|hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)(?:(\d+)(minutes?|mins?|m|seconds?|secs?|s))?(?:(\d+)(seconds?|secs?|s))?\b")
        ],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let token = tokens.first()?;
            let mut total: Option<Delta> = None;
            for (amount_idx, unit_idx) in [(1, 2), (3, 4), (5, 6)] {
                let Some(amount) = regex_group(token, amount_idx) else { break };
                let amount: i64 = amount.parse().ok()?;
                let unit = tables::duration_unit(regex_group(token, unit_idx)?)?;
                let part = Delta::from_unit(amount, unit);
                total = Some(match total {
                    Some(sum) => sum.plus(part),
                    None => part,
                });
            }
            total.map(Phrase::Delta)
        },
    }
}

/// Adjacent duration parts sum: "2h 30m", "1 hour, 20 minutes",
/// "2 hours and 15 mins". The finer (right-hand) unit is kept for later
/// quantity inference.
fn rule_duration_sum() -> Rule {
    rule! {
        name: "duration sum",
        pattern: [
            pred!(is_delta),
            re!(r"(?i)\s*(?:,\s*)?(?:and\s+)?"),
            pred!(is_delta)
        ],
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            let left = delta(tokens.first()?)?;
            let right = delta(tokens.get(2)?)?;
            Some(Phrase::Delta(left.plus(*right)))
        },
    }
}

/// "<duration> ago" flips the sign.
fn rule_duration_ago() -> Rule {
    rule! {
        name: "duration ago",
        pattern: [pred!(is_delta), re!(r"(?i)\s+ago\b")],
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            Some(Phrase::Delta(delta(tokens.first()?)?.negated()))
        },
    }
}

/// "in <duration>" consumes the preposition so the whole phrase is one span.
fn rule_duration_in() -> Rule {
    rule! {
        name: "in duration",
        pattern: [re!(r"(?i)\bin\s+"), pred!(is_delta)],
        priority: 10,
        prod: |tokens: &[Token]| -> Option<Phrase> {
            Some(Phrase::Delta(*delta(tokens.get(1)?)?))
        },
    }
}

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        rule_duration_part(),
        rule_duration_compact(),
        rule_duration_sum(),
        rule_duration_ago(),
        rule_duration_in(),
    ]
}
