pub mod cli;
pub mod config;
pub mod recurrence; // RRULE grammar
pub mod schedule;

use std::io::Write;

/// Initialize stderr logging; `RUST_LOG` overrides the default `info` filter
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use recurrence::{parse as parse_rrule, to_rrule_string, RecurrenceDescriptor};
pub use schedule::{
    import_schedule, ImportFailure, ImportPipeline, ImportedSchedule, NormalizedEvent,
};
