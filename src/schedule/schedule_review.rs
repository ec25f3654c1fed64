//! Non-fatal diagnostics for a validated document.
//
// Warnings never block an import and never change the normalized output.

use super::schedule_types::ImportDocument;
use crate::recurrence::RuleNote;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImportWarning {
    /// The same id is used by more than one record
    DuplicateId { id: String, paths: Vec<String> },
    /// Rule had no FREQ and was treated as WEEKLY
    DefaultedFrequency { path: String },
    IgnoredRuleKey { path: String, key: String },
    DuplicateRuleKey { path: String, key: String },
    /// Fragment line such as EXDATE skipped by the rule parser
    IgnoredRuleLine { path: String, name: String },
    /// Rule sets both COUNT and UNTIL; which one wins is up to the renderer
    CountAndUntil { path: String },
    /// Neither `dtstart` nor an embedded DTSTART anchors the rule
    MissingAnchor { path: String },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::DuplicateId { id, paths } => {
                write!(f, "id '{}' is used by {}", id, paths.join(", "))
            }
            ImportWarning::DefaultedFrequency { path } => {
                write!(f, "{}: no FREQ component; treated as WEEKLY", path)
            }
            ImportWarning::IgnoredRuleKey { path, key } => {
                write!(f, "{}: ignored unsupported component {}", path, key)
            }
            ImportWarning::DuplicateRuleKey { path, key } => {
                write!(f, "{}: component {} repeated; kept the first value", path, key)
            }
            ImportWarning::IgnoredRuleLine { path, name } => {
                write!(f, "{}: ignored {} line; use exdate for exclusions", path, name)
            }
            ImportWarning::CountAndUntil { path } => {
                write!(f, "{}: both COUNT and UNTIL are set", path)
            }
            ImportWarning::MissingAnchor { path } => {
                write!(f, "{}: no dtstart; the renderer will pick the anchor", path)
            }
        }
    }
}

/// Collect warnings for a validated document, in source order
pub fn review(document: &ImportDocument) -> Vec<ImportWarning> {
    let mut warnings = Vec::new();

    for (index, event) in document.recurring.iter().enumerate() {
        let rrule_path = format!("recurring.{}.rrule", index);
        for note in &event.rule_notes {
            warnings.push(match note {
                RuleNote::DefaultedFrequency => {
                    ImportWarning::DefaultedFrequency { path: rrule_path.clone() }
                }
                RuleNote::IgnoredKey { key } => {
                    ImportWarning::IgnoredRuleKey { path: rrule_path.clone(), key: key.clone() }
                }
                RuleNote::DuplicateKey { key } => {
                    ImportWarning::DuplicateRuleKey { path: rrule_path.clone(), key: key.clone() }
                }
                RuleNote::IgnoredLine { name } => {
                    ImportWarning::IgnoredRuleLine { path: rrule_path.clone(), name: name.clone() }
                }
            });
        }
        if event.rule.count.is_some() && event.rule.until.is_some() {
            warnings.push(ImportWarning::CountAndUntil { path: rrule_path.clone() });
        }
        if event.dtstart.is_none() && event.rule.dtstart.is_none() {
            warnings.push(ImportWarning::MissingAnchor { path: format!("recurring.{}", index) });
        }
    }

    warnings.extend(duplicate_ids(document));
    warnings
}

fn duplicate_ids(document: &ImportDocument) -> Vec<ImportWarning> {
    let records = document
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| (event.id.as_str(), format!("events.{}", index)))
        .chain(
            document
                .recurring
                .iter()
                .enumerate()
                .map(|(index, event)| (event.id.as_str(), format!("recurring.{}", index))),
        );

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for (id, path) in records {
        match first_seen.get(id) {
            Some(&slot) => groups[slot].1.push(path),
            None => {
                first_seen.insert(id, groups.len());
                groups.push((id, vec![path]));
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(id, paths)| ImportWarning::DuplicateId { id: id.to_string(), paths })
        .collect()
}
