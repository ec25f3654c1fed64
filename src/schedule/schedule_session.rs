//! Holder for the "current" import result of an editing surface.
//
// Every submit is a fresh pipeline run that replaces the previous result. A
// failed run clears previously imported events so stale data is never shown.

use super::schedule_example::example_schedule_text;
use super::schedule_import::{ImportFailure, ImportPipeline, ImportedSchedule};
use super::schedule_normalize::NormalizedEvent;
use log::debug;

#[derive(Debug, Clone, Default)]
pub struct ScheduleSession {
    pipeline: ImportPipeline,
    text: String,
    /// Outcome of the last submit; `None` before the first one
    outcome: Option<Result<ImportedSchedule, ImportFailure>>,
    /// Text changed since the last submit
    dirty: bool,
}

impl ScheduleSession {
    pub fn new(pipeline: ImportPipeline) -> Self {
        Self { pipeline, ..Self::default() }
    }

    /// Replace the text and run a fresh import
    pub fn submit(&mut self, text: impl Into<String>) -> Result<&ImportedSchedule, &ImportFailure> {
        self.text = text.into();
        self.dirty = false;
        let outcome = self.outcome.insert(self.pipeline.run(&self.text));
        if let Err(failure) = outcome.as_ref() {
            debug!("Cleared imported events after failed run: {}", failure);
        }
        outcome.as_ref()
    }

    /// Re-run the current text
    pub fn revalidate(&mut self) -> Result<&ImportedSchedule, &ImportFailure> {
        let text = std::mem::take(&mut self.text);
        self.submit(text)
    }

    pub fn reset_to_example(&mut self) -> Result<&ImportedSchedule, &ImportFailure> {
        self.submit(example_schedule_text())
    }

    /// Change the text without running an import.
    ///
    /// Displayed events stay until the next submit, but the session is no
    /// longer considered valid.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        self.imported().map_or(&[], |imported| imported.events.as_slice())
    }

    pub fn imported(&self) -> Option<&ImportedSchedule> {
        self.outcome.as_ref()?.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&ImportFailure> {
        self.outcome.as_ref()?.as_ref().err()
    }

    /// Whether the current text is known to import cleanly (gates saving)
    pub fn is_valid(&self) -> bool {
        !self.dirty && self.imported().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::FailureKind;

    #[test]
    fn test_failed_submit_clears_previous_events() {
        let mut session = ScheduleSession::default();
        assert!(session.reset_to_example().is_ok());
        assert_eq!(session.events().len(), 4);
        assert!(session.is_valid());

        let kind = session.submit(r#"{ "events": [{ "id": "" }] }"#).unwrap_err().kind();
        assert_eq!(kind, FailureKind::Validation);
        assert!(session.events().is_empty());
        assert!(!session.is_valid());
        assert!(session.failure().is_some());
    }

    #[test]
    fn test_edit_invalidates_without_clearing() {
        let mut session = ScheduleSession::default();
        session.reset_to_example().unwrap();
        session.edit("{ not json");
        assert!(!session.is_valid());
        assert_eq!(session.events().len(), 4);

        let kind = session.revalidate().unwrap_err().kind();
        assert_eq!(kind, FailureKind::Syntax);
        assert!(session.events().is_empty());
        assert_eq!(session.text(), "{ not json");
    }
}
