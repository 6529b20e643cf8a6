//! Usage Ledger Library
//!
//! Reads the JSONL conversation logs that Claude Code writes under
//! `~/.claude/projects`, extracts billable assistant turns, and reports token
//! usage and estimated cost by day, month, session or model.
//!
//! ## Architecture Overview
//!
//! Data flows strictly left to right: directory → events → filtered events →
//! grouped, costed results → rendering.
//!
//! - [`file_discovery`] - Recursive discovery of log files under a root directory
//! - [`parser`] - Streaming, line-bounded JSONL decoding into [`UsageEvent`]s
//! - [`filter`] - Inclusive date range and case-insensitive model allow-list
//! - [`pricing`] - Per-model rates, built once and injected
//! - [`calculator`] - Cost of a single event against the pricing table
//! - [`aggregator`] - Daily, monthly, session and model aggregation
//! - [`analyzer`] - Orchestrates a full report run
//! - [`display`] - Colored text and JSON rendering
//! - [`config`] - Configuration from TOML files and environment variables
//! - [`logging`] - Structured logging setup
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use usage_ledger::{ReportKind, ReportOptions, UsageAnalyzer};
//! use usage_ledger::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let analyzer = UsageAnalyzer::from_config(&config);
//! let report = analyzer.run(ReportKind::Monthly, &config.projects_dir()?, &ReportOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod calculator;
pub mod config;
pub mod display;
pub mod file_discovery;
pub mod filter;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pricing;
pub mod timestamp_parser;

pub use analyzer::UsageAnalyzer;
pub use models::*;
