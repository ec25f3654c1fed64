use crate::recurrence::Frequency;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// schedule-import - validate and normalize cleaning-service schedules
#[derive(Debug, Parser)]
#[command(name = "schedule-import")]
#[command(about = "Validate and normalize cleaning-service schedule imports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Use this configuration file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a schedule file ("-" reads stdin)
    #[command(alias = "check")]
    Validate {
        #[arg(required = true)]
        file: PathBuf,

        /// Reject recurrence rules the lenient parser would tolerate
        #[arg(long)]
        strict: bool,

        /// Print the outcome, warnings and issues as a JSON report
        #[arg(long)]
        json: bool,
    },

    /// Print the normalized events of a schedule as JSON
    Normalize {
        #[arg(required = true)]
        file: PathBuf,

        /// Single-line JSON regardless of configuration
        #[arg(long)]
        compact: bool,

        #[arg(long)]
        strict: bool,
    },

    /// List the events of a schedule in readable form
    #[command(alias = "ls")]
    List {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Print the built-in example schedule
    Example,

    /// Recurrence rule helpers
    Rrule {
        #[command(subcommand)]
        action: RruleActions,
    },

    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Subcommand)]
pub enum RruleActions {
    /// Parse RRULE text and print the descriptor
    Parse {
        #[arg(required = true)]
        text: String,

        #[arg(long)]
        strict: bool,
    },

    /// Build canonical RRULE text from components
    Build {
        #[arg(long, value_enum)]
        freq: RecurrenceFreq,

        /// Repeat every N periods
        #[arg(long)]
        interval: Option<u32>,

        /// Number of occurrences
        #[arg(long)]
        count: Option<u32>,

        /// End date-time (ISO 8601 or compact RRULE form)
        #[arg(long)]
        until: Option<String>,

        /// Weekday codes, e.g. MO,WE,FR
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<String>>,

        /// Days of the month (1-31)
        #[arg(long, value_delimiter = ',')]
        month_days: Option<Vec<u8>>,

        /// Months (1-12)
        #[arg(long, value_delimiter = ',')]
        months: Option<Vec<u8>>,

        /// First day of the week
        #[arg(long)]
        wkst: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RecurrenceFreq {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<RecurrenceFreq> for Frequency {
    fn from(freq: RecurrenceFreq) -> Self {
        match freq {
            RecurrenceFreq::Daily => Frequency::Daily,
            RecurrenceFreq::Weekly => Frequency::Weekly,
            RecurrenceFreq::Monthly => Frequency::Monthly,
            RecurrenceFreq::Yearly => Frequency::Yearly,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show the effective configuration
    #[command(aliases = ["list", "get"])]
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate_with_global_config() {
        let cli = Cli::try_parse_from([
            "schedule-import",
            "validate",
            "schedule.json",
            "--strict",
            "--config",
            "/tmp/alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/alt.toml")));
        match cli.command {
            Commands::Validate { file, strict, json } => {
                assert_eq!(file, PathBuf::from("schedule.json"));
                assert!(strict);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rrule_build() {
        let cli = Cli::try_parse_from([
            "schedule-import",
            "rrule",
            "build",
            "--freq",
            "weekly",
            "--days",
            "MO,WE",
            "--interval",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Rrule { action: RruleActions::Build { freq, days, interval, .. } } => {
                assert_eq!(Frequency::from(freq), Frequency::Weekly);
                assert_eq!(days, Some(vec!["MO".to_string(), "WE".to_string()]));
                assert_eq!(interval, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_json_report_flag() {
        let cli = Cli::try_parse_from(["schedule-import", "validate", "-", "--json"]).unwrap();
        match cli.command {
            Commands::Validate { file, strict, json } => {
                assert_eq!(file, PathBuf::from("-"));
                assert!(!strict);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_rejected() {
        assert!(Cli::try_parse_from(["schedule-import", "normalize"]).is_err());
    }
}
