use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use log::{error, info, warn};
use schedule_import::cli::{Cli, Commands, ConfigActions, RruleActions};
use schedule_import::config::{self, Config};
use schedule_import::recurrence::{self, ParsePolicy, RecurrenceDescriptor, Weekday};
use schedule_import::schedule::{
    parse_date_value, DateValue, ImportPipeline, ImportReport, ImportedSchedule, NormalizedEvent,
    Occurrence, EXAMPLE_SCHEDULE_JSON,
};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

fn main() {
    schedule_import::init_logger();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Validate { file, strict, json: true } => {
            let outcome = pipeline_for(&config, strict)?.run(&read_input(&file)?);
            print_json(&ImportReport::new(&outcome), config.output.pretty)?;
            match outcome {
                Ok(_) => Ok(()),
                Err(failure) => Err(anyhow!(failure)),
            }
        }
        Commands::Validate { file, strict, json: false } => {
            let imported = import_file(&config, &file, strict)?;
            let summary = imported.summary();
            println!(
                "✅ Schedule is valid: {} event(s) ({} one-off, {} recurring)",
                summary.total, summary.one_off, summary.recurring
            );
            for warning in &imported.warnings {
                println!("⚠️  {}", warning);
            }
            Ok(())
        }
        Commands::Normalize { file, compact, strict } => {
            let imported = import_file(&config, &file, strict)?;
            print_json(&imported.events, config.output.pretty && !compact)
        }
        Commands::List { file } => {
            let imported = import_file(&config, &file, false)?;
            list_events(&imported)
        }
        Commands::Example => {
            print!("{}", EXAMPLE_SCHEDULE_JSON);
            Ok(())
        }
        Commands::Rrule { action } => handle_rrule(action, &config),
        Commands::Config { action } => handle_config(action, &config, cli.config.as_deref()),
    }
}

fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn pipeline_for(config: &Config, strict: bool) -> Result<ImportPipeline> {
    if !strict {
        return config.pipeline();
    }
    let mut options = config.import_options();
    options.rrule_policy = ParsePolicy::Strict;
    Ok(ImportPipeline::new(options)?)
}

fn import_file(config: &Config, file: &Path, strict: bool) -> Result<ImportedSchedule> {
    let text = read_input(file)?;
    let pipeline = pipeline_for(config, strict)?;

    info!("Importing schedule from {}", file.display());
    pipeline.run(&text).map_err(|failure| {
        for issue in failure.issues() {
            eprintln!("  ❌ {}: {}", issue.path, issue.message);
        }
        anyhow!(failure)
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn list_events(imported: &ImportedSchedule) -> Result<()> {
    let tz: Tz = imported
        .document
        .timezone
        .parse()
        .map_err(|_| anyhow!("Unknown timezone '{}'", imported.document.timezone))?;

    if imported.events.is_empty() {
        println!("No events in schedule.");
        return Ok(());
    }

    println!("Events ({}):", tz);
    for (index, event) in imported.events.iter().enumerate() {
        println!("{}. {}", index + 1, describe_event(event, tz));
    }
    Ok(())
}

fn describe_event(event: &NormalizedEvent, tz: Tz) -> String {
    let mut output = event.title.clone();
    match &event.occurrence {
        Occurrence::Single { start, end, all_day } => {
            output.push_str(&format!("\n   When: {}", format_when(start, tz, *all_day)));
            if let Some(end) = end {
                output.push_str(&format!(" until {}", format_when(end, tz, *all_day)));
            }
        }
        Occurrence::Recurring { rrule, duration_minutes, excluded_dates } => {
            output.push_str(&format!("\n   Repeats: {}", recurrence::to_rrule_string(rrule)));
            if let Some(dtstart) = &rrule.dtstart {
                output.push_str(&format!("\n   Starting: {}", format_when(dtstart, tz, false)));
            }
            if let Some(minutes) = duration_minutes {
                output.push_str(&format!("\n   Duration: {} min", minutes));
            }
            if !excluded_dates.is_empty() {
                output.push_str(&format!("\n   Skips: {}", excluded_dates.join(", ")));
            }
        }
    }
    if let Some(location) = &event.location {
        output.push_str(&format!("\n   Location: {}", location));
    }
    output
}

fn format_when(value: &str, tz: Tz, all_day: bool) -> String {
    match parse_date_value(value) {
        Some(DateValue::Instant(instant)) if !all_day => {
            instant.with_timezone(&tz).format("%a, %b %-d, %Y %-I:%M %p %Z").to_string()
        }
        Some(DateValue::Instant(instant)) => instant.format("%a, %b %-d, %Y").to_string(),
        Some(DateValue::Floating(local)) if !all_day => {
            local.format("%a, %b %-d, %Y %-I:%M %p").to_string()
        }
        Some(DateValue::Floating(local)) => local.format("%a, %b %-d, %Y").to_string(),
        Some(DateValue::Date(date)) => date.format("%a, %b %-d, %Y").to_string(),
        // embedded DTSTART values are in compact form
        None => value.to_string(),
    }
}

fn handle_rrule(action: RruleActions, config: &Config) -> Result<()> {
    match action {
        RruleActions::Parse { text, strict } => {
            let policy = if strict { ParsePolicy::Strict } else { config.import.rrule_policy };
            let parsed = recurrence::parse_with_notes(&text, policy)?;
            for note in &parsed.notes {
                warn!("{}", note);
            }
            print_json(&parsed.rule, config.output.pretty)
        }
        RruleActions::Build { freq, interval, count, until, days, month_days, months, wkst } => {
            let mut rule = RecurrenceDescriptor::new(freq.into());
            rule.interval = interval.unwrap_or(1);
            rule.count = count;
            rule.until = until;
            rule.byweekday = days.as_deref().map(parse_weekdays).transpose()?;
            rule.bymonthday = month_days;
            rule.bymonth = months;
            if let Some(code) = wkst {
                rule.wkst = parse_weekday(&code)?;
            }

            let text = recurrence::to_rrule_string(&rule);
            // building must never produce text the parser rejects
            recurrence::parse_with_notes(&text, ParsePolicy::Strict)
                .with_context(|| format!("Built rule '{}' is not valid", text))?;
            println!("{}", text);
            Ok(())
        }
    }
}

fn parse_weekday(code: &str) -> Result<Weekday> {
    code.parse().map_err(|_| anyhow!("Unknown weekday '{}' (expected MO..SU)", code))
}

fn parse_weekdays(codes: &[String]) -> Result<Vec<Weekday>> {
    codes.iter().map(|code| parse_weekday(code)).collect()
}

fn handle_config(action: ConfigActions, config: &Config, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigActions::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigActions::Init { force } => {
            let path = match path {
                Some(path) => path.to_path_buf(),
                None => config::get_config_path()?,
            };
            if path.exists() && !force {
                return Err(anyhow!(
                    "Config file {} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            Config::default().save_to(&path)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}
