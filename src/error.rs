use thiserror::Error;

/// Errors surfaced by [`parse`](crate::parse) and [`parse_with`](crate::parse_with).
///
/// Text that simply matches no rule is not an error; it is reported back as
/// unparsed spans on the result. These variants cover text that *did* match a
/// rule but carries values no calendar can hold, or that cannot be typed even
/// with neighbor context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A grammar rule matched but produced a field outside its legal range,
    /// e.g. a day of 45 that could not be reinterpreted as a year.
    #[error("rule `{rule}` produced an inconsistent {field}: {value}")]
    InconsistentField {
        rule: &'static str,
        field: &'static str,
        value: i64,
    },

    /// A bare integer in a range or list with no neighbor to borrow a type
    /// from (hour, day, month, year, or quantity).
    #[error("cannot tell what the bare integer `{value}` refers to")]
    UnresolvedAmbiguity { value: i64 },

    /// A rendered date does not exist on the calendar (e.g. February 30, or a
    /// fifth Friday in a month that has four).
    #[error("no such calendar date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// A rendered time of day is out of range after 12/24-hour conversion.
    #[error("no such time of day: {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
}
