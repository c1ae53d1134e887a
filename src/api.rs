use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use once_cell::sync::Lazy;

use crate::error::ParseError;
use crate::{Rule, TokenKind, engine, infer, render};

static DEFAULT_RULES: Lazy<Vec<Rule>> = Lazy::new(crate::rules::get);

/// Which occurrence an underspecified expression refers to: "5pm" when it is
/// already 6pm, or a bare "Monday".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// The next occurrence (the default): a time already past today rolls to
    /// tomorrow, a weekday means the upcoming one.
    #[default]
    Next,
    /// The most recent occurrence.
    Previous,
    /// Leave it where it falls; weekdays resolve to the nearest occurrence.
    This,
}

/// Parsing configuration. Input-only: the parser never mutates a caller's
/// config, and a missing `now` is sampled fresh on every call.
#[derive(Debug, Clone)]
pub struct Config {
    /// When true (the default), partial values are completed into full
    /// datetimes: bare dates get midnight, bare times get a day picked by
    /// `direction`, durations become offsets from `now`. When false they
    /// render as bare [`Value::Date`], [`Value::Time`], and
    /// [`Value::Duration`].
    pub infer_datetimes: bool,
    /// Governs weekday resolution and day rollover for bare times.
    pub direction: Direction,
    /// The reference instant. `None` means "sample the wall clock at call
    /// time" — never at configuration time.
    pub now: Option<NaiveDateTime>,
    /// The timezone `now` is in, attached to rendered values that name no
    /// zone of their own. A zone written in the text always wins.
    pub tz: Option<Tz>,
    /// Populate [`ParseResult::matches`] and [`ParseResult::unparsed`] with
    /// per-expression character spans.
    pub return_matched_text: bool,
    /// Signal that the caller expects exactly one expression and will unwrap
    /// it with [`ParseResult::single`].
    pub return_single_object: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            infer_datetimes: true,
            direction: Direction::default(),
            now: None,
            tz: None,
            return_matched_text: false,
            return_single_object: false,
        }
    }
}

impl Config {
    fn effective_now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// A concrete parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A full datetime, with the zone it was given (from the text or from
    /// the config), if any.
    DateTime { value: NaiveDateTime, tz: Option<Tz> },
    /// A bare calendar date (only produced with `infer_datetimes` off).
    Date(NaiveDate),
    /// A bare clock time (only produced with `infer_datetimes` off).
    Time { value: NaiveTime, tz: Option<Tz> },
    /// A signed duration (only produced with `infer_datetimes` off).
    Duration(TimeDelta),
    /// An ordered start/end pair.
    Range(Box<Value>, Box<Value>),
    /// Comma/"or"-delimited alternatives, possibly of ranges.
    List(Vec<Value>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::DateTime { value, tz: None } => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Value::DateTime { value, tz: Some(tz) } => {
                write!(f, "{} {}", value.format("%Y-%m-%d %H:%M:%S"), tz)
            }
            Value::Date(date) => write!(f, "{date}"),
            Value::Time { value, tz: None } => write!(f, "{value}"),
            Value::Time { value, tz: Some(tz) } => write!(f, "{value} {tz}"),
            Value::Duration(delta) => {
                let total = delta.num_seconds();
                let sign = if total < 0 { "-" } else { "" };
                let total = total.unsigned_abs();
                let (d, h, m, s) =
                    (total / 86_400, total / 3_600 % 24, total / 60 % 60, total % 60);
                write!(f, "{sign}")?;
                let mut wrote = false;
                for (amount, unit) in [(d, "d"), (h, "h"), (m, "m"), (s, "s")] {
                    if amount > 0 || (unit == "s" && !wrote) {
                        write!(f, "{amount}{unit}")?;
                        wrote = true;
                    }
                }
                Ok(())
            }
            Value::Range(start, end) => write!(f, "{start} to {end}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// One recognized expression paired with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    /// Slice of the original input that matched.
    pub text: String,
    /// Start byte index of the match.
    pub start: usize,
    /// End byte index of the match (exclusive).
    pub end: usize,
    pub value: Value,
}

/// A span of input no rule recognized, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Result from [`parse`] and [`parse_with`].
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed input text.
    pub text: String,
    /// Rendered values, one per recognized top-level expression, in input
    /// order. Unrecognized spans are dropped.
    pub values: Vec<Value>,
    /// Per-expression spans; populated when `return_matched_text` is set.
    pub matches: Vec<Matched>,
    /// Unrecognized spans; populated when `return_matched_text` is set.
    pub unparsed: Vec<TextSpan>,
    /// Total elapsed time spent parsing and rendering.
    pub elapsed: Duration,
}

impl ParseResult {
    /// Unwrap a one-expression result to its bare value. The typed
    /// counterpart of `return_single_object`.
    pub fn single(mut self) -> Option<Value> {
        if self.values.len() == 1 { self.values.pop() } else { None }
    }
}

/// Parse `text` with the default configuration.
///
/// # Example
/// ```
/// use horae::parse;
///
/// let out = parse("today at noon").unwrap();
/// assert_eq!(out.values.len(), 1);
/// ```
pub fn parse(text: &str) -> Result<ParseResult, ParseError> {
    parse_with(text, &Config::default())
}

/// Parse `text` under `config`.
///
/// Use this for deterministic output by supplying `now`. The ruleset is
/// compiled once per process and shared read-only across calls; each call
/// allocates its own parse state.
pub fn parse_with(text: &str, config: &Config) -> Result<ParseResult, ParseError> {
    let started = Instant::now();
    let now = config.effective_now();

    let mut parser = engine::Parser::new(text, &DEFAULT_RULES);
    parser.saturate();
    let selected = parser.select();

    let mut values = Vec::new();
    let mut matches = Vec::new();
    let mut covered: Vec<(usize, usize)> = Vec::new();

    for node in &selected {
        let TokenKind::Phrase(phrase) = &node.token.kind else { continue };
        covered.push((node.span.start, node.span.end));
        phrase.validate(node.rule_name)?;

        // A lone untyped integer carries no calendar meaning; inside a range
        // or list it would have been typed (or rejected) by inference.
        if phrase.is_ambiguous() {
            continue;
        }

        let mut phrase = phrase.clone();
        infer::infer(&mut phrase)?;
        let value = render::render(&phrase, config, now)?;

        if config.return_matched_text {
            matches.push(Matched {
                text: text[node.span.start..node.span.end].to_string(),
                start: node.span.start,
                end: node.span.end,
                value: value.clone(),
            });
        }
        values.push(value);
    }

    let unparsed = if config.return_matched_text { gaps(text, &covered) } else { Vec::new() };

    Ok(ParseResult {
        text: text.to_string(),
        values,
        matches,
        unparsed,
        elapsed: started.elapsed(),
    })
}

/// Complement of the covered spans, whitespace-trimmed, in input order.
fn gaps(text: &str, covered: &[(usize, usize)]) -> Vec<TextSpan> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for &(start, end) in covered {
        if start > cursor {
            push_trimmed(text, cursor, start, &mut out);
        }
        cursor = cursor.max(end);
    }
    if cursor < text.len() {
        push_trimmed(text, cursor, text.len(), &mut out);
    }
    out
}

fn push_trimmed(text: &str, start: usize, end: usize, out: &mut Vec<TextSpan>) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let offset = raw.find(trimmed).unwrap_or(0);
    out.push(TextSpan {
        text: trimmed.to_string(),
        start: start + offset,
        end: start + offset + trimmed.len(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> Config {
        let date = NaiveDate::from_ymd_opt(2018, 8, 4).unwrap();
        let time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        Config {
            infer_datetimes: true,
            now: Some(NaiveDateTime::new(date, time)),
            ..Config::default()
        }
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Value {
        Value::DateTime {
            value: NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, 0).unwrap(),
            tz: None,
        }
    }

    #[test]
    fn parse_with_returns_values() {
        let res = parse_with("5pm", &reference_config()).unwrap();
        assert_eq!(res.text, "5pm");
        assert_eq!(res.values, vec![dt(2018, 8, 4, 17, 0)]);
        assert!(res.elapsed >= Duration::ZERO);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let res = parse_with("", &reference_config()).unwrap();
        assert!(res.values.is_empty());
        assert!(res.matches.is_empty());
    }

    #[test]
    fn matched_text_mode_pairs_spans_with_values() {
        let config = Config { return_matched_text: true, ..reference_config() };
        let res = parse_with("how does 5p sound?", &config).unwrap();

        assert_eq!(res.values, vec![dt(2018, 8, 4, 17, 0)]);
        assert_eq!(res.matches.len(), 1);
        let m = &res.matches[0];
        assert_eq!(m.text, "5p");
        assert_eq!(&res.text[m.start..m.end], "5p");

        let leftovers: Vec<&str> = res.unparsed.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(leftovers, vec!["how does", "sound?"]);
    }

    #[test]
    fn single_unwraps_exactly_one_value() {
        let config = Config { return_single_object: true, ..reference_config() };
        let res = parse_with("5pm", &config).unwrap();
        assert_eq!(res.single(), Some(dt(2018, 8, 4, 17, 0)));

        let res = parse_with("", &reference_config()).unwrap();
        assert_eq!(res.single(), None);
    }

    #[test]
    fn caller_config_is_never_mutated() {
        let config = reference_config();
        let before = config.now;
        parse_with("5p", &config).unwrap();
        assert_eq!(config.now, before);

        // With `now` unset, two calls observe different instants rather than
        // one memoized at construction time; we can at least assert the
        // config stays untouched.
        let config = Config { infer_datetimes: true, ..Config::default() };
        parse_with("5p", &config).unwrap();
        assert_eq!(config.now, None);
    }
}
