//! Cross-element inference for ranges and lists.
//!
//! "7/17 4 or 5 PM" parses into two half-specified values: one with a date
//! and a bare hour, one with an hour and a meridiem. Neither is renderable
//! alone. This pass moves fields between neighbors so both become
//! `2018-07-17 4 PM`-shaped before rendering:
//!
//! 1. Bare integers next to a duration take the duration's unit
//!    ("30-40 mins").
//! 2. A forward pass copies each missing field from the first element into
//!    the rest.
//! 3. A backward pass copies from the last element into the rest, so the
//!    last element wins when both ends could supply a field.
//!
//! Bare integers are typed through the field writes themselves: writing a
//! time onto an `Ambiguous` turns it into an hour, writing a date turns it
//! into a day or year (see `Phrase::set`). Whatever is still ambiguous once
//! the passes finish had no context to borrow from, which is an error.

use crate::error::ParseError;
use crate::model::{Delta, INFER_FIELDS, Phrase};

/// Run inference on a selected top-level phrase. Only ranges and lists have
/// neighbors to propagate between; everything else passes through untouched.
pub(crate) fn infer(phrase: &mut Phrase) -> Result<(), ParseError> {
    if let Phrase::Range(items) | Phrase::List(items) = phrase {
        propagate(items);
        if let Some(value) = first_unresolved(items) {
            return Err(ParseError::UnresolvedAmbiguity { value });
        }
    }
    Ok(())
}

fn propagate(items: &mut [Phrase]) {
    // Nested collections first: the inner "5-6 PM" of "4-5 or 5-6 PM" must
    // settle before it can lend fields at the outer level.
    for item in items.iter_mut() {
        if let Phrase::Range(inner) | Phrase::List(inner) = item {
            propagate(inner);
        }
    }

    if items.len() < 2 {
        return;
    }

    // A duration neighbor types bare integers as quantities in its unit.
    if let Some(unit) = items.iter().find_map(|item| match item {
        Phrase::Delta(Delta { unit: Some(unit), .. }) => Some(*unit),
        _ => None,
    }) {
        for item in items.iter_mut() {
            if let Phrase::Ambiguous(value) = item {
                if *value >= 0 {
                    *item = Phrase::Delta(Delta::from_unit(*value, unit));
                }
            }
        }
    }

    // Forward: first element fills everyone behind it.
    let source = items[0].clone();
    for target in items[1..].iter_mut() {
        copy_missing(&source, target);
    }

    // Backward: the (possibly just-updated) last element takes precedence.
    let source = items[items.len() - 1].clone();
    let last = items.len() - 1;
    for target in items[..last].iter_mut() {
        copy_missing(&source, target);
    }
}

fn copy_missing(source: &Phrase, target: &mut Phrase) {
    for field in INFER_FIELDS {
        if let Some(value) = source.get(field) {
            if target.get(field).is_none() {
                target.set(field, value);
            }
        }
    }
}

fn first_unresolved(items: &[Phrase]) -> Option<i64> {
    items.iter().find_map(|item| match item {
        Phrase::Ambiguous(value) => Some(*value),
        Phrase::Range(inner) | Phrase::List(inner) => first_unresolved(inner),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateRef, Meridiem, Moment, PartialDate, PartialTime};

    fn time(hour: u32, meridiem: Option<Meridiem>) -> Phrase {
        Phrase::Moment(Moment::from_time(PartialTime {
            hour: Some(hour),
            meridiem,
            ..Default::default()
        }))
    }

    fn date(month: u32, day: u32) -> DateRef {
        DateRef::Fields(PartialDate { month: Some(month), day: Some(day), ..Default::default() })
    }

    #[test]
    fn single_element_is_untouched() {
        let mut phrase = Phrase::List(vec![time(4, None)]);
        let before = phrase.clone();
        infer(&mut phrase).unwrap();
        assert_eq!(phrase, before);
    }

    #[test]
    fn meridiem_flows_backward_through_a_range() {
        let mut phrase =
            Phrase::Range(vec![Phrase::Ambiguous(3), time(4, Some(Meridiem::Pm))]);
        infer(&mut phrase).unwrap();
        let Phrase::Range(items) = phrase else { unreachable!() };
        assert_eq!(items[0], time(3, Some(Meridiem::Pm)));
    }

    #[test]
    fn date_flows_forward_and_meridiem_backward_in_a_list() {
        let start = Phrase::Moment(Moment {
            date: Some(date(7, 17)),
            time: Some(PartialTime::hour(4)),
            tz: None,
        });
        let mut phrase = Phrase::List(vec![start, time(5, Some(Meridiem::Pm))]);
        infer(&mut phrase).unwrap();

        let Phrase::List(items) = phrase else { unreachable!() };
        for item in &items {
            let Phrase::Moment(m) = item else { panic!("expected moment") };
            assert_eq!(m.date, Some(date(7, 17)));
            assert_eq!(m.time.as_ref().unwrap().meridiem, Some(Meridiem::Pm));
        }
    }

    #[test]
    fn duration_unit_types_a_bare_integer() {
        let mut phrase = Phrase::Range(vec![
            Phrase::Ambiguous(30),
            Phrase::Delta(Delta::from_unit(40, crate::model::DeltaUnit::Minute)),
        ]);
        infer(&mut phrase).unwrap();
        let Phrase::Range(items) = phrase else { unreachable!() };
        assert_eq!(
            items[0],
            Phrase::Delta(Delta::from_unit(30, crate::model::DeltaUnit::Minute))
        );
    }

    #[test]
    fn no_context_is_an_error() {
        let mut phrase = Phrase::List(vec![Phrase::Ambiguous(5), Phrase::Ambiguous(7)]);
        assert_eq!(
            infer(&mut phrase),
            Err(ParseError::UnresolvedAmbiguity { value: 5 })
        );
    }

    #[test]
    fn nested_ranges_borrow_from_list_neighbors() {
        // "4-5 or 5-6 PM" shaped input: the first range has no meridiem of
        // its own and both its items are bare integers.
        let range1 = Phrase::Range(vec![Phrase::Ambiguous(4), Phrase::Ambiguous(5)]);
        let range2 = Phrase::Range(vec![Phrase::Ambiguous(5), time(6, Some(Meridiem::Pm))]);
        let mut phrase = Phrase::List(vec![range1, range2]);
        infer(&mut phrase).unwrap();

        let Phrase::List(items) = phrase else { unreachable!() };
        let Phrase::Range(first) = &items[0] else { panic!("expected range") };
        assert_eq!(first[0], time(4, Some(Meridiem::Pm)));
        assert_eq!(first[1], time(5, Some(Meridiem::Pm)));
    }
}
