//! Integer terminals: digit sequences, day-suffix ordinals, and spelled-out
//! numbers up to ninety-nine ("thirty two").
//!
//! Numbers are not yet temporal: a bare "4" could be an hour, a day, a year,
//! or a duration quantity. They enter the semantic layer through the
//! promotion rule at the bottom, which wraps any standalone number as an
//! ambiguous phrase for the inference pass to type later.

use crate::engine::BucketMask;
use crate::model::Phrase;
use crate::rules::{is_number, number_value, regex_group};
use crate::{NumberData, Rule, Token, tables};

/// Plain digit sequences like `4`, `17`, `2018`.
fn rule_integer_digits() -> Rule {
    rule! {
        name: "integer digits",
        pattern: [re!(r"\b(\d+)\b")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        prod: |tokens: &[Token]| -> Option<NumberData> {
            let value = regex_group(tokens.first()?, 1)?.parse().ok()?;
            Some(NumberData { value })
        },
    }
}

/// Day-suffix ordinals like `1st`, `3rd`, `17th`.
fn rule_ordinal_digits() -> Rule {
    rule! {
        name: "ordinal digits",
        pattern: [re!(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        prod: |tokens: &[Token]| -> Option<NumberData> {
            let value = regex_group(tokens.first()?, 1)?.parse().ok()?;
            Some(NumberData { value })
        },
    }
}

/// Words for 0..19.
fn rule_spelled_ones() -> Rule {
    rule! {
        name: "integer (0..19 words)",
        pattern: [
            re!(r"(?i)\b(zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen)\b")
        ],
        buckets: BucketMask::WORDNUMISH.bits(),
        prod: |tokens: &[Token]| -> Option<NumberData> {
            let value = tables::ones_number(regex_group(tokens.first()?, 1)?)?;
            Some(NumberData { value })
        },
    }
}

/// Words for the tens.
fn rule_spelled_tens() -> Rule {
    rule! {
        name: "integer (20..90 words)",
        pattern: [re!(r"(?i)\b(twenty|thirty|fou?rty|fifty|sixty|seventy|eighty|ninety)\b")],
        buckets: BucketMask::WORDNUMISH.bits(),
        prod: |tokens: &[Token]| -> Option<NumberData> {
            let value = tables::tens_number(regex_group(tokens.first()?, 1)?)?;
            Some(NumberData { value })
        },
    }
}

/// Compound forms: "thirty two" = 30 + 2, "forty-five" = 40 + 5.
fn rule_spelled_composite() -> Rule {
    rule! {
        name: "integer (21..99 words)",
        pattern: [
            pred!(|t: &Token| crate::rules::number_value(t).is_some_and(|n| (20..=90).contains(&n) && n % 10 == 0)),
            re!(r"[\s\-]+"),
            pred!(|t: &Token| crate::rules::number_value(t).is_some_and(|n| (1..=9).contains(&n))),
        ],
        buckets: BucketMask::WORDNUMISH.bits(),
        prod: |tokens: &[Token]| -> Option<NumberData> {
            let tens = number_value(tokens.first()?)?;
            let units = number_value(tokens.get(2)?)?;
            Some(NumberData { value: tens + units })
        },
    }
}

/// Lift any recognized number into the semantic layer as an untyped integer.
fn rule_ambiguous_integer() -> Rule {
    rule! {
        name: "ambiguous integer",
        pattern: [pred!(is_number)],
        prod: |tokens: &[Token]| -> Option<Phrase> {
            Some(Phrase::Ambiguous(number_value(tokens.first()?)?))
        },
    }
}

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        rule_integer_digits(),
        rule_ordinal_digits(),
        rule_spelled_ones(),
        rule_spelled_tens(),
        rule_spelled_composite(),
        rule_ambiguous_integer(),
    ]
}
