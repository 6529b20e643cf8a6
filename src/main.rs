use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::warn;
use usage_ledger::config::Config;
use usage_ledger::display::ReportDisplay;
use usage_ledger::logging::init_logging;
use usage_ledger::timestamp_parser::TimestampParser;
use usage_ledger::{ReportKind, ReportOptions, UsageAnalyzer};

#[derive(Parser)]
#[command(name = "usage-ledger")]
#[command(about = "Token usage and cost reports from local Claude Code JSONL logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Show usage aggregated by day
    Daily,
    /// Show usage aggregated by month
    Monthly,
    /// Show usage aggregated by conversation session
    Session,
    /// Show usage aggregated by model, most expensive first
    Models,
}

#[derive(Args, Debug, Clone)]
struct ReportArgs {
    /// Start date, inclusive (YYYYMMDD or YYYY-MM-DD)
    #[arg(long, global = true)]
    since: Option<String>,
    /// End date, inclusive through the end of the day (YYYYMMDD or YYYY-MM-DD)
    #[arg(long, global = true)]
    until: Option<String>,
    /// Only count these models (comma separated, case-insensitive)
    #[arg(long, global = true, value_delimiter = ',')]
    models: Vec<String>,
    /// Show a per-model breakdown for each row
    #[arg(long, global = true)]
    breakdown: bool,
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
    /// List sessions oldest first (daily and monthly tables are always oldest first)
    #[arg(long, global = true)]
    asc: bool,
    /// Log directory to read instead of ~/.claude/projects
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
}

impl ReportArgs {
    fn to_options(&self) -> Result<ReportOptions> {
        let since = self
            .since
            .as_deref()
            .map(TimestampParser::parse_date)
            .transpose()?;
        let until = self
            .until
            .as_deref()
            .map(TimestampParser::parse_date)
            .transpose()?;

        Ok(ReportOptions {
            since,
            until,
            models: self
                .models
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            breakdown: self.breakdown,
            json_output: self.json,
            ascending: self.asc,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    let json = cli.report.json;

    if let Err(e) = run(cli) {
        handle_error(e, json);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let _log_guard = init_logging(&config.logging, &config.paths.log_directory)?;
    for notice in config.notices() {
        warn!("{}", notice);
    }

    let kind = match cli.command.unwrap_or(Commands::Daily) {
        Commands::Daily => ReportKind::Daily,
        Commands::Monthly => ReportKind::Monthly,
        Commands::Session => ReportKind::Session,
        Commands::Models => ReportKind::Models,
    };
    let options = cli.report.to_options()?;
    let root = match cli.report.dir.clone() {
        Some(dir) => dir,
        None => config.projects_dir()?,
    };

    let analyzer = UsageAnalyzer::from_config(&config);
    let report = analyzer.run(kind, &root, &options)?;

    ReportDisplay::new(config.output.json_pretty).display(kind, &report, &options)
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
