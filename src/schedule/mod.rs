//! Schedule import: validation, normalization and the import pipeline.
//
// Flow: raw text → `parse_json` → `ScheduleValidator` → `normalize` → events.

mod schedule_example;
mod schedule_import;
mod schedule_normalize;
mod schedule_review;
mod schedule_session;
mod schedule_types;
mod schedule_validation;

pub use schedule_example::*;
pub use schedule_import::*;
pub use schedule_normalize::*;
pub use schedule_review::*;
pub use schedule_session::*;
pub use schedule_types::*;
pub use schedule_validation::*;
