//! Conversion of validated import records into renderer-facing events.
//!
//! One-off events come first in source order, then recurring events in source
//! order. Nothing is expanded into concrete occurrences here; recurring events
//! carry an anchored [`RecurrenceDescriptor`] for the renderer to expand.

use super::schedule_types::{ImportDocument, Metadata, OneOffEvent, RecurringEvent};
use crate::recurrence::RecurrenceDescriptor;
use serde::{Serialize, Serializer};

/// Timing of a normalized event: a fixed slot or a recurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Occurrence {
    Single {
        start: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<String>,
        #[serde(rename = "allDay")]
        all_day: bool,
    },
    Recurring {
        rrule: RecurrenceDescriptor,
        #[serde(rename = "durationMinutes", skip_serializing_if = "Option::is_none")]
        duration_minutes: Option<u32>,
        #[serde(rename = "excludedDates", skip_serializing_if = "Vec::is_empty")]
        excluded_dates: Vec<String>,
    },
}

impl Occurrence {
    pub fn is_recurring(&self) -> bool {
        matches!(self, Occurrence::Recurring { .. })
    }
}

/// One event ready for a calendar renderer
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
    pub occurrence: Occurrence,
}

impl NormalizedEvent {
    /// Derived from the occurrence shape, so the flag can never disagree with it
    pub fn is_recurring(&self) -> bool {
        self.occurrence.is_recurring()
    }

    pub fn recurrence(&self) -> Option<&RecurrenceDescriptor> {
        match &self.occurrence {
            Occurrence::Recurring { rrule, .. } => Some(rrule),
            Occurrence::Single { .. } => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent<'a> {
    id: &'a str,
    title: &'a str,
    is_recurring: bool,
    #[serde(flatten)]
    occurrence: &'a Occurrence,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Metadata>,
}

impl Serialize for NormalizedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEvent {
            id: &self.id,
            title: &self.title,
            is_recurring: self.is_recurring(),
            occurrence: &self.occurrence,
            location: self.location.as_deref(),
            description: self.description.as_deref(),
            metadata: self.metadata.as_ref(),
        }
        .serialize(serializer)
    }
}

/// Normalize every event of a validated document
pub fn normalize(document: &ImportDocument) -> Vec<NormalizedEvent> {
    document
        .events
        .iter()
        .map(normalize_one_off)
        .chain(document.recurring.iter().map(normalize_recurring))
        .collect()
}

pub fn normalize_one_off(event: &OneOffEvent) -> NormalizedEvent {
    NormalizedEvent {
        id: event.id.clone(),
        title: event.title.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        metadata: event.metadata.clone(),
        occurrence: Occurrence::Single {
            start: event.start.clone(),
            end: event.end.clone(),
            all_day: event.all_day,
        },
    }
}

/// An explicit `dtstart` on the record replaces any anchor embedded in the rule text
pub fn normalize_recurring(event: &RecurringEvent) -> NormalizedEvent {
    let mut rrule = event.rule.clone();
    if let Some(dtstart) = &event.dtstart {
        rrule.dtstart = Some(dtstart.clone());
    }

    NormalizedEvent {
        id: event.id.clone(),
        title: event.title.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        metadata: event.metadata.clone(),
        occurrence: Occurrence::Recurring {
            rrule,
            duration_minutes: event.duration_minutes,
            excluded_dates: event.exdate.clone().unwrap_or_default(),
        },
    }
}
