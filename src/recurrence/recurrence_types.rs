//! Data types for parsed recurrence rules.
//
// The descriptor mirrors the vocabulary calendar renderers expect: lower-case
// frequency names and two-letter weekday codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recurrence frequency (the FREQ component)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Upper-case token used inside RRULE text
    pub fn as_rrule_token(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_rrule_token())
    }
}

/// Two-letter RFC 5545 weekday code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mo,
        Weekday::Tu,
        Weekday::We,
        Weekday::Th,
        Weekday::Fr,
        Weekday::Sa,
        Weekday::Su,
    ];

    pub fn as_rrule_code(&self) -> &'static str {
        match self {
            Weekday::Mo => "MO",
            Weekday::Tu => "TU",
            Weekday::We => "WE",
            Weekday::Th => "TH",
            Weekday::Fr => "FR",
            Weekday::Sa => "SA",
            Weekday::Su => "SU",
        }
    }
}

impl FromStr for Weekday {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Weekday::ALL
            .iter()
            .copied()
            .find(|day| day.as_rrule_code() == code)
            .ok_or(())
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_rrule_code())
    }
}

/// Structured form of a single RRULE.
///
/// `dtstart` is only set when the rule text embeds a `DTSTART` line, or when
/// the normalizer anchors the rule to an explicit start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceDescriptor {
    pub freq: Frequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtstart: Option<String>,
    pub interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byweekday: Option<Vec<Weekday>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bymonthday: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bymonth: Option<Vec<u8>>,
    pub wkst: Weekday,
}

impl RecurrenceDescriptor {
    /// Descriptor with only a frequency set; every modifier at its default.
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            dtstart: None,
            interval: 1,
            count: None,
            until: None,
            byweekday: None,
            bymonthday: None,
            bymonth: None,
            wkst: Weekday::Mo,
        }
    }
}

/// How forgiving the parser is with rule text it does not fully understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Missing FREQ defaults to WEEKLY; unknown and repeated keys and
    /// non-rule property lines are noted and skipped.
    #[default]
    Lenient,
    /// Every leniency above becomes an error.
    Strict,
}

/// Something the lenient parser tolerated instead of rejecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RuleNote {
    DefaultedFrequency,
    IgnoredKey { key: String },
    DuplicateKey { key: String },
    /// A fragment line such as `EXDATE:...` that is not part of the rule
    IgnoredLine { name: String },
}

impl fmt::Display for RuleNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNote::DefaultedFrequency => write!(f, "no FREQ component; defaulted to WEEKLY"),
            RuleNote::IgnoredKey { key } => write!(f, "ignored unsupported component {}", key),
            RuleNote::DuplicateKey { key } => {
                write!(f, "component {} repeated; kept the first value", key)
            }
            RuleNote::IgnoredLine { name } => write!(f, "ignored {} line", name),
        }
    }
}

/// A parsed rule together with the leniencies applied while parsing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub rule: RecurrenceDescriptor,
    pub notes: Vec<RuleNote>,
}
