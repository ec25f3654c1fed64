//! Import pipeline: text → JSON → validated document → normalized events.
//
// Each run is independent and performs no I/O. Failures are returned as data;
// no partial output is ever produced.

use super::schedule_normalize::{normalize, NormalizedEvent};
use super::schedule_review::{review, ImportWarning};
use super::schedule_types::{ImportDocument, DEFAULT_TIMEZONE};
use super::schedule_validation::{ScheduleValidator, UnknownTimezone, ValidationIssue};
use crate::recurrence::ParsePolicy;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

/// Raw text that is not a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl SyntaxError {
    fn empty_input() -> Self {
        Self { message: "JSON input is empty".to_string(), line: None, column: None }
    }
}

impl From<serde_json::Error> for SyntaxError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: format!("Invalid JSON: {}", err),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    Syntax,
    Validation,
}

/// Why an import run produced no events
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportFailure {
    #[error("{0}")]
    Syntax(SyntaxError),
    #[error("schedule has {} validation error(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
}

impl ImportFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ImportFailure::Syntax(_) => FailureKind::Syntax,
            ImportFailure::Validation(_) => FailureKind::Validation,
        }
    }

    /// Field-level issues; empty for syntax failures
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ImportFailure::Syntax(_) => &[],
            ImportFailure::Validation(issues) => issues,
        }
    }
}

/// Event counts by shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub one_off: usize,
    pub recurring: usize,
    pub total: usize,
}

/// Output of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSchedule {
    pub document: ImportDocument,
    pub events: Vec<NormalizedEvent>,
    pub warnings: Vec<ImportWarning>,
}

impl ImportedSchedule {
    pub fn summary(&self) -> ScheduleSummary {
        let recurring = self.events.iter().filter(|event| event.is_recurring()).count();
        ScheduleSummary {
            one_off: self.events.len() - recurring,
            recurring,
            total: self.events.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub default_timezone: String,
    pub rrule_policy: ParsePolicy,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { default_timezone: DEFAULT_TIMEZONE.to_string(), rrule_policy: ParsePolicy::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportPipeline {
    validator: ScheduleValidator,
}

impl ImportPipeline {
    pub fn new(options: ImportOptions) -> Result<Self, UnknownTimezone> {
        let validator = ScheduleValidator::new(options.default_timezone, options.rrule_policy)?;
        Ok(Self { validator })
    }

    pub fn validator(&self) -> &ScheduleValidator {
        &self.validator
    }

    /// Run one import from already-loaded text
    pub fn run(&self, text: &str) -> Result<ImportedSchedule, ImportFailure> {
        debug!("Import: parsing {} bytes", text.len());
        let value = parse_json(text).map_err(|err| {
            debug!("Import: parse failed: {}", err);
            ImportFailure::Syntax(err)
        })?;

        debug!("Import: validating");
        let document = self.validator.validate(&value).map_err(|issues| {
            debug!("Import: validation failed with {} issue(s)", issues.len());
            ImportFailure::Validation(issues)
        })?;

        debug!("Import: normalizing");
        let events = normalize(&document);
        let warnings = review(&document);
        info!(
            "Imported {} event(s) ({} one-off, {} recurring) with {} warning(s)",
            events.len(),
            document.events.len(),
            document.recurring.len(),
            warnings.len()
        );

        Ok(ImportedSchedule { document, events, warnings })
    }
}

/// Machine-readable outcome of one run, for callers that want JSON instead
/// of printed messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport<'a> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScheduleSummary>,
    #[serde(skip_serializing_if = "is_empty")]
    pub warnings: &'a [ImportWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_error: Option<&'a SyntaxError>,
    #[serde(skip_serializing_if = "is_empty")]
    pub issues: &'a [ValidationIssue],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl<'a> ImportReport<'a> {
    pub fn new(outcome: &'a Result<ImportedSchedule, ImportFailure>) -> Self {
        match outcome {
            Ok(imported) => Self {
                valid: true,
                summary: Some(imported.summary()),
                warnings: &imported.warnings,
                failure: None,
                syntax_error: None,
                issues: &[],
            },
            Err(failure) => Self {
                valid: false,
                summary: None,
                warnings: &[],
                failure: Some(failure.kind()),
                syntax_error: match failure {
                    ImportFailure::Syntax(err) => Some(err),
                    ImportFailure::Validation(_) => None,
                },
                issues: failure.issues(),
            },
        }
    }
}

/// Parse raw text as JSON; whitespace-only text counts as a syntax failure
pub fn parse_json(text: &str) -> Result<Value, SyntaxError> {
    if text.trim().is_empty() {
        return Err(SyntaxError::empty_input());
    }
    Ok(serde_json::from_str(text)?)
}

/// Run the pipeline with default options
pub fn import_schedule(text: &str) -> Result<ImportedSchedule, ImportFailure> {
    ImportPipeline::default().run(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_text_is_syntax_failure() {
        let failure = import_schedule("  \n ").unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Syntax);
        assert_eq!(failure.to_string(), "JSON input is empty");
        assert!(failure.issues().is_empty());
    }

    #[test]
    fn test_malformed_json_reports_position() {
        match import_schedule("{ events: [ }") {
            Err(ImportFailure::Syntax(err)) => {
                assert!(err.message.starts_with("Invalid JSON: "), "{}", err.message);
                assert_eq!(err.line, Some(1));
                assert!(err.column.is_some());
            }
            other => panic!("expected syntax failure, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_counts() {
        let imported = import_schedule(
            r#"{
                "events": [{ "id": "a", "title": "t", "start": "2026-01-20" }],
                "recurring": [
                    { "id": "b", "title": "t", "rrule": "FREQ=DAILY", "dtstart": "2026-01-20" },
                    { "id": "c", "title": "t", "rrule": "FREQ=WEEKLY", "dtstart": "2026-01-20" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(imported.summary(), ScheduleSummary { one_off: 1, recurring: 2, total: 3 });
    }

    #[test]
    fn test_options_reach_validator() {
        let pipeline = ImportPipeline::new(ImportOptions {
            default_timezone: "Europe/Helsinki".to_string(),
            rrule_policy: ParsePolicy::Strict,
        })
        .unwrap();
        assert_eq!(pipeline.validator().rrule_policy(), ParsePolicy::Strict);
        assert_eq!(pipeline.run("{}").unwrap().document.timezone, "Europe/Helsinki");

        let failure = pipeline
            .run(r#"{ "recurring": [{ "id": "r", "title": "t", "rrule": "FREQ=DAILY;BYHOUR=9" }] }"#)
            .unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Validation);
        assert_eq!(failure.issues()[0].path, "recurring.0.rrule");
    }

    #[test]
    fn test_unknown_default_timezone_fails_construction() {
        let err = ImportPipeline::new(ImportOptions {
            default_timezone: "Not/AZone".to_string(),
            ..ImportOptions::default()
        })
        .unwrap_err();
        assert_eq!(err, UnknownTimezone("Not/AZone".to_string()));
    }

    #[test]
    fn test_report_for_success_lists_warnings() {
        let outcome = import_schedule(
            r#"{ "recurring": [{ "id": "r", "title": "t", "rrule": "FREQ=DAILY" }] }"#,
        );
        let json = serde_json::to_value(ImportReport::new(&outcome)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "valid": true,
                "summary": { "oneOff": 0, "recurring": 1, "total": 1 },
                "warnings": [{ "kind": "missingAnchor", "path": "recurring.0" }]
            })
        );
    }

    #[test]
    fn test_report_for_failures() {
        let outcome = import_schedule(r#"{ "events": [{ "id": "e", "title": "t" }] }"#);
        let json = serde_json::to_value(ImportReport::new(&outcome)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "valid": false,
                "failure": "validation",
                "issues": [{ "path": "events.0.start", "message": "Required", "kind": "required" }]
            })
        );

        let outcome = import_schedule("");
        let json = serde_json::to_value(ImportReport::new(&outcome)).unwrap();
        assert_eq!(json["failure"], "syntax");
        assert_eq!(json["syntaxError"]["message"], "JSON input is empty");
        assert!(json.get("issues").is_none());
    }
}
