// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time windows and their resolution into concrete bounds.
//!
//! A window is either *moving* (relative to the moment it is resolved, e.g.
//! "last 30 days", "today", "all time") or *fixed* (explicit start and end).
//! Moving windows with a numeric span are resolved without truncation:
//! `to` is exactly the resolution instant and `from` is exactly N units
//! earlier. Only `today` is aligned to midnight UTC.

use std::fmt;

use chrono::{DateTime, Days, Duration, Months, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use chatlytics_core::ValidationError;

/// Upper bound on the numeric part of a moving window.
///
/// Keeps `now - value * unit` inside chrono's representable range for every unit.
pub const MAX_WINDOW_VALUE: u32 = 100_000;

/// Calendar unit of a numeric moving window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Year,
}

impl CalendarUnit {
    fn suffix(self) -> char {
        match self {
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'm',
            Self::Year => 'y',
        }
    }

    fn parse(unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "d" | "day" | "days" => Some(Self::Day),
            "w" | "week" | "weeks" => Some(Self::Week),
            "m" | "month" | "months" => Some(Self::Month),
            "y" | "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    /// Step `value` units back from `instant`, saturating at the earliest
    /// representable instant.
    fn subtract_from(self, instant: DateTime<Utc>, value: u32) -> DateTime<Utc> {
        let stepped = match self {
            Self::Day => instant.checked_sub_signed(Duration::days(i64::from(value))),
            Self::Week => instant.checked_sub_signed(Duration::weeks(i64::from(value))),
            Self::Month => instant.checked_sub_months(Months::new(value)),
            Self::Year => value
                .checked_mul(12)
                .and_then(|months| instant.checked_sub_months(Months::new(months))),
        };
        stepped.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// The relative part of a moving window.
///
/// `Today` and `All` carry no numeric value; `Last` always carries a
/// positive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovingSpan {
    Last { value: u32, unit: CalendarUnit },
    Today,
    All,
}

impl fmt::Display for MovingSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Last { value, unit } => write!(f, "{value}{}", unit.suffix()),
            Self::Today => f.write_str("today"),
            Self::All => f.write_str("all"),
        }
    }
}

/// The time span an analytic covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindow {
    Moving(MovingSpan),
    Fixed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Concrete bounds produced by [`TimeWindow::resolve`].
///
/// `from` is `None` when the window has no lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// A moving window covering the last `value` units.
    pub fn last(value: u32, unit: CalendarUnit) -> Result<Self, ValidationError> {
        if value == 0 || value > MAX_WINDOW_VALUE {
            return Err(ValidationError::InvalidField {
                field: "timespan.value",
                reason: format!("must be between 1 and {MAX_WINDOW_VALUE}, got {value}"),
            });
        }
        Ok(Self::Moving(MovingSpan::Last { value, unit }))
    }

    pub fn today() -> Self {
        Self::Moving(MovingSpan::Today)
    }

    pub fn all() -> Self {
        Self::Moving(MovingSpan::All)
    }

    /// A fixed window. Ordering of `start` and `end` is not checked.
    pub fn fixed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::Fixed { start, end }
    }

    /// Whether the window's meaning shifts with the clock.
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::Moving(_))
    }

    /// Resolve the window against `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> ResolvedWindow {
        match self {
            Self::Moving(MovingSpan::Last { value, unit }) => ResolvedWindow {
                from: Some(unit.subtract_from(now, *value)),
                to: now,
            },
            Self::Moving(MovingSpan::Today) => {
                let midnight = start_of_day(now);
                ResolvedWindow {
                    from: Some(midnight),
                    to: midnight
                        .checked_add_days(Days::new(1))
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                }
            }
            Self::Moving(MovingSpan::All) => ResolvedWindow { from: None, to: now },
            Self::Fixed { start, end } => ResolvedWindow {
                from: Some(*start),
                to: *end,
            },
        }
    }

    /// Parse the `timespan` object of a descriptor document.
    ///
    /// Moving windows accept either a compact value (`"30d"`, `"today"`,
    /// `"all"`) or an explicit `value` + `unit` pair. Fixed windows carry
    /// RFC 3339 `start` and `end` instants.
    pub fn from_repr(raw: &Value) -> Result<Self, ValidationError> {
        let obj = raw.as_object().ok_or_else(|| ValidationError::InvalidField {
            field: "timespan",
            reason: "expected an object".to_string(),
        })?;

        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ValidationError::MissingField("timespan.type"))?;

        match kind.to_ascii_lowercase().as_str() {
            "moving" => parse_moving(obj),
            "fixed" => {
                let start = parse_instant(obj, "start", "timespan.start")?;
                let end = parse_instant(obj, "end", "timespan.end")?;
                Ok(Self::fixed(start, end))
            }
            other => Err(ValidationError::InvalidField {
                field: "timespan.type",
                reason: format!("expected `moving` or `fixed`, got `{other}`"),
            }),
        }
    }

    /// The canonical document form of this window.
    pub fn to_repr(&self) -> Value {
        match self {
            Self::Moving(span) => json!({ "type": "moving", "value": span.to_string() }),
            Self::Fixed { start, end } => json!({
                "type": "fixed",
                "start": start.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                "end": end.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            }),
        }
    }
}

fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn parse_moving(obj: &Map<String, Value>) -> Result<TimeWindow, ValidationError> {
    let value = obj.get("value").filter(|v| !v.is_null());

    match obj.get("unit").and_then(Value::as_str) {
        Some(unit) => match unit.to_ascii_lowercase().as_str() {
            "today" | "all" if value.is_some() => Err(ValidationError::InvalidField {
                field: "timespan.value",
                reason: format!("unit `{unit}` takes no value"),
            }),
            "today" => Ok(TimeWindow::today()),
            "all" => Ok(TimeWindow::all()),
            _ => {
                let unit = CalendarUnit::parse(unit)
                    .ok_or_else(|| ValidationError::UnsupportedTimeUnit(unit.to_string()))?;
                let value = value.ok_or(ValidationError::MissingField("timespan.value"))?;
                TimeWindow::last(parse_count(value)?, unit)
            }
        },
        None => {
            let compact = value
                .ok_or(ValidationError::MissingField("timespan.value"))?
                .as_str()
                .ok_or_else(|| ValidationError::InvalidField {
                    field: "timespan.value",
                    reason: "expected a span such as `30d`, `today` or `all`".to_string(),
                })?;
            parse_compact(compact)
        }
    }
}

/// Parse `"30d"`, `"2w"`, `"today"`, `"all"`.
fn parse_compact(compact: &str) -> Result<TimeWindow, ValidationError> {
    let compact = compact.trim();
    match compact.to_ascii_lowercase().as_str() {
        "today" => return Ok(TimeWindow::today()),
        "all" => return Ok(TimeWindow::all()),
        _ => {}
    }

    let split = compact
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(compact.len());
    let (digits, unit) = compact.split_at(split);

    let unit = CalendarUnit::parse(unit)
        .ok_or_else(|| ValidationError::UnsupportedTimeUnit(unit.to_string()))?;
    let value = digits
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidField {
            field: "timespan.value",
            reason: format!("`{compact}` does not start with a positive integer"),
        })?;
    TimeWindow::last(value, unit)
}

fn parse_count(value: &Value) -> Result<u32, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::InvalidField {
        field: "timespan.value",
        reason: format!("expected a positive integer, got {value}"),
    })
}

fn parse_instant(
    obj: &Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<DateTime<Utc>, ValidationError> {
    let raw = obj
        .get(key)
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField(field))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidField {
            field,
            reason: format!("`{raw}` is not an RFC 3339 instant: {e}"),
        })
}
