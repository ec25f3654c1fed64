//! Recurrence rule (RRULE) grammar.
//!
//! Parses RFC 5545 `RRULE` text into a [`RecurrenceDescriptor`] and renders a
//! descriptor back into canonical rule text. Date semantics (expanding a rule
//! into concrete occurrences) are left to the calendar renderer.

mod recurrence_format;
mod recurrence_parser;
mod recurrence_types;

pub use recurrence_format::*;
pub use recurrence_parser::*;
pub use recurrence_types::*;

/// Errors produced while parsing rule text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    #[error("recurrence rule is empty")]
    Empty,
    #[error("recurrence rule has no FREQ component")]
    MissingFrequency,
    #[error("unsupported frequency '{0}' (expected DAILY, WEEKLY, MONTHLY or YEARLY)")]
    UnsupportedFrequency(String),
    #[error("{key} must be a whole number, got '{value}'")]
    MalformedNumber { key: String, value: String },
    #[error("{key} must be greater than zero")]
    NotPositive { key: String },
    #[error("unknown weekday '{0}' (expected one of MO, TU, WE, TH, FR, SA, SU)")]
    UnknownWeekday(String),
    #[error("{key} value {value} is out of range {min}-{max}")]
    OutOfRange { key: String, value: u32, min: u8, max: u8 },
    #[error("UNTIL must be a compact date or date-time like 20260131T235959Z, got '{0}'")]
    MalformedUntil(String),
    #[error("component '{0}' is not of the form KEY=VALUE")]
    MalformedComponent(String),
    #[error("unsupported component {0}")]
    UnknownKey(String),
    #[error("component {0} appears more than once")]
    DuplicateKey(String),
    #[error("unsupported property line {0}")]
    UnsupportedProperty(String),
    #[error("rule text contains more than one RRULE line")]
    MultipleRules,
}
