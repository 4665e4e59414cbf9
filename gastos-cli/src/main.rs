//! gastos: Spanish bank notifications in, expense records out
//!
//! Usage:
//!   gastos parse --text "..."      Parse one notification (or --file, or stdin)
//!   gastos batch --file inbox.txt  Parse blank-line separated notifications
//!   gastos summary --file inbox.txt [--by category] [--from D] [--to D]
//!   gastos rules test|suggest      Try merchant rules before saving them
//!   gastos config init|show

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use gastos_core::{SystemClock, local_now};
use gastos_finance::{BillingSummary, CategorySummary, Expense};
use gastos_ingest::{TransactionRecord, parse_notification, parse_spanish_bank_text, split_messages};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod output;
mod state;

use config::{Config, default_config_path, init_config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "gastos",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GASTOS_BUILD_SHA"), ")"),
    about = "Turn Spanish bank notifications into expense records"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.gastos/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a single notification and print it as JSON
    Parse {
        /// Notification body
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the notification body from a file (stdin if neither is given)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Emit the enriched expense (billing date, category) instead of the raw record
        #[arg(long)]
        expense: bool,
    },

    /// Parse every notification in a file (separated by blank lines)
    Batch {
        #[arg(long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Spending summary for a file of notifications
    Summary {
        #[arg(long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = SummaryBy::PaymentMethod)]
        by: SummaryBy,

        /// Earliest transaction date, inclusive (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long, value_parser = parse_from_bound)]
        from: Option<NaiveDateTime>,

        /// Latest transaction date, inclusive; a bare date covers the whole day
        #[arg(long, value_parser = parse_to_bound)]
        to: Option<NaiveDateTime>,
    },

    /// Check merchant rules against a merchant name
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Manage ~/.gastos/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Score a pattern against a merchant without saving it
    Test {
        #[arg(long)]
        merchant: String,
        #[arg(long)]
        pattern: String,
        /// Treat the pattern as a case-insensitive regex
        #[arg(long)]
        regex: bool,
    },
    /// Configured rules that resemble a merchant, most similar first
    Suggest {
        #[arg(long)]
        merchant: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SummaryBy {
    PaymentMethod,
    Category,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(io::stderr))
        .init();

    let config_path = cli.config;

    match cli.command {
        Command::Parse {
            text,
            file,
            pretty,
            expense,
        } => {
            let body = read_body(text, file.as_deref())?;
            let record = parse_notification(body.as_deref(), &SystemClock)?;

            let json = if expense {
                let cfg = load_config(&resolve_config(config_path)?)?;
                let e = Expense::from_record(
                    &record,
                    &cfg.billing_cycle()?,
                    &cfg.categorizer(),
                    &cfg.billing.timezone,
                )?;
                to_json(&e, pretty)?
            } else {
                to_json(&record, pretty)?
            };
            println!("{json}");
        }

        Command::Batch { file, format } => {
            let records = parse_file(&file)?;
            let stdout = io::stdout().lock();
            match format {
                OutputFormat::Json => output::write_json_lines(&records, stdout)?,
                OutputFormat::Csv => output::write_csv(&records, stdout)?,
            }
        }

        Command::Summary { file, by, from, to } => {
            let cfg = load_config(&resolve_config(config_path)?)?;
            let summary = summarize(&file, &cfg, by, from, to)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Rules { command } => {
            let cfg = load_config(&resolve_config(config_path)?)?;
            println!("{}", serde_json::to_string_pretty(&run_rules(&command, &cfg)?)?);
        }

        Command::Config { command } => {
            let config_path = resolve_config(config_path)?;
            match command {
                ConfigCommand::Init => {
                    if init_config(&config_path)? {
                        println!("Wrote {}", config_path.display());
                    } else {
                        println!("Config already exists: {}", config_path.display());
                    }
                }
                ConfigCommand::Show => {
                    let cfg = load_config(&config_path)?;
                    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                }
            }
        }
    }

    Ok(())
}

fn resolve_config(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => default_config_path(),
    }
}

/// Notification body from `--text`, `--file`, or stdin, passed through
/// unchanged. A body that is empty apart from line endings is reported as
/// absent.
fn read_body(text: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    let raw = match (text, file) {
        (Some(t), _) => t,
        (None, Some(p)) => state::read_text(p)?,
        (None, None) => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read notification from stdin")?;
            buf
        }
    };

    let blank = raw.trim_end_matches(['\r', '\n']).is_empty();
    Ok((!blank).then_some(raw))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(s)
}

fn parse_file(path: &Path) -> Result<Vec<TransactionRecord>> {
    let text = state::read_text(path)?;
    let records: Vec<_> = split_messages(&text)
        .iter()
        .map(|m| parse_spanish_bank_text(m))
        .collect();
    info!(count = records.len(), file = %path.display(), "parsed notifications");
    Ok(records)
}

fn parse_from_bound(s: &str) -> Result<NaiveDateTime, String> {
    parse_bound(s, |d| d.and_hms_opt(0, 0, 0))
}

fn parse_to_bound(s: &str) -> Result<NaiveDateTime, String> {
    parse_bound(s, |d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
}

fn parse_bound(s: &str, whole_day: fn(NaiveDate) -> Option<NaiveDateTime>) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(whole_day)
        .ok_or_else(|| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got {s:?}"))
}

fn load_expenses(path: &Path, cfg: &Config) -> Result<Vec<Expense>> {
    let cycle = cfg.billing_cycle()?;
    let categorizer = cfg.categorizer();
    debug!(rules = categorizer.rule_count(), "loaded merchant rules");

    let mut expenses = Vec::new();
    for (i, record) in parse_file(path)?.iter().enumerate() {
        match Expense::from_record(record, &cycle, &categorizer, &cfg.billing.timezone) {
            Ok(e) => expenses.push(e),
            Err(err) => warn!(index = i + 1, "skipping notification: {err:#}"),
        }
    }
    Ok(expenses)
}

fn summarize(
    path: &Path,
    cfg: &Config,
    by: SummaryBy,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
) -> Result<serde_json::Value> {
    let expenses = load_expenses(path, cfg)?;

    let value = match by {
        SummaryBy::Category => {
            info!(expenses = expenses.len(), "building category summary");
            serde_json::to_value(CategorySummary::from_expenses(&expenses, from, to))?
        }
        SummaryBy::PaymentMethod => {
            let in_window: Vec<_> = expenses
                .into_iter()
                .filter(|e| from.is_none_or(|f| e.transaction_date >= f))
                .filter(|e| to.is_none_or(|t| e.transaction_date <= t))
                .collect();
            let now = local_now(&SystemClock, &cfg.billing.timezone)?;
            info!(expenses = in_window.len(), %now, "building billing summary");
            serde_json::to_value(BillingSummary::from_expenses(&in_window, now))?
        }
    };
    Ok(value)
}

fn run_rules(command: &RulesCommand, cfg: &Config) -> Result<serde_json::Value> {
    let categorizer = cfg.categorizer();
    let value = match command {
        RulesCommand::Test {
            merchant,
            pattern,
            regex,
        } => serde_json::to_value(categorizer.score_pattern(merchant, pattern, *regex))?,
        RulesCommand::Suggest { merchant } => serde_json::to_value(categorizer.suggest(merchant))?,
    };
    Ok(value)
}
