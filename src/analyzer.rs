//! Usage Analysis Engine
//!
//! This module wires the pipeline together and is the main entry point for
//! report runs:
//!
//! 1. **Discovery**: finds log files under the projects directory
//! 2. **Parsing**: streams each file into [`UsageEvent`]s
//! 3. **Filtering**: applies the date range and model allow-list
//! 4. **Aggregation**: groups and prices events for the requested report
//!
//! Reports come back in aggregation order (oldest first, models by cost);
//! presentation order is left to [`crate::display`].
//!
//! Any I/O failure during discovery or parsing aborts the run before
//! aggregation starts; no partial report is produced.
//!
//! ```rust,no_run
//! use usage_ledger::{ReportKind, ReportOptions, UsageAnalyzer};
//! use usage_ledger::pricing::PricingTable;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let analyzer = UsageAnalyzer::new(PricingTable::builtin());
//! let report = analyzer.run(
//!     ReportKind::Daily,
//!     Path::new("/home/me/.claude/projects"),
//!     &ReportOptions::default(),
//! )?;
//! println!("{} days", report.len());
//! # Ok(())
//! # }
//! ```

use crate::aggregator::Aggregator;
use crate::calculator::CostCalculator;
use crate::config::Config;
use crate::file_discovery::FileDiscovery;
use crate::filter::EventFilter;
use crate::models::*;
use crate::parser::FileParser;
use crate::pricing::PricingTable;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, info_span};
use uuid::Uuid;

pub struct UsageAnalyzer {
    parser: FileParser,
    discovery: FileDiscovery,
    pricing: PricingTable,
}

impl UsageAnalyzer {
    pub fn new(pricing: PricingTable) -> Self {
        Self {
            parser: FileParser::new(),
            discovery: FileDiscovery::default(),
            pricing,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            parser: FileParser::new()
                .with_max_line_bytes(config.ingest.max_line_bytes)
                .with_parallel(config.ingest.parallel),
            discovery: FileDiscovery::new(config.ingest.file_extension.clone()),
            pricing: PricingTable::with_overrides(&config.pricing),
        }
    }

    /// Discover and parse every usage event under `root`.
    pub fn load_events(&self, root: &Path) -> Result<Vec<UsageEvent>> {
        let events = self.parser.parse_directory(root, &self.discovery)?;
        info!(root = %root.display(), events = events.len(), "Loaded usage events");
        Ok(events)
    }

    /// Filter and aggregate already loaded events.
    pub fn build_report(
        &self,
        kind: ReportKind,
        events: &[UsageEvent],
        options: &ReportOptions,
    ) -> Report {
        let filter = EventFilter::from_options(options);
        let filtered;
        let events = if filter.is_identity() {
            events
        } else {
            filtered = filter.apply(events);
            debug!(before = events.len(), after = filtered.len(), "Applied event filters");
            &filtered
        };

        let aggregator = Aggregator::new(CostCalculator::new(&self.pricing));
        match (kind, options.breakdown) {
            (ReportKind::Daily, false) => Report::Daily(aggregator.aggregate_daily(events)),
            (ReportKind::Daily, true) => Report::DailyBreakdown(aggregator.daily_breakdown(events)),
            (ReportKind::Monthly, false) => Report::Monthly(aggregator.aggregate_monthly(events)),
            (ReportKind::Monthly, true) => {
                Report::MonthlyBreakdown(aggregator.monthly_breakdown(events))
            }
            (ReportKind::Session, false) => {
                Report::Session(aggregator.aggregate_by_session(events))
            }
            (ReportKind::Session, true) => {
                Report::SessionBreakdown(aggregator.session_breakdown(events))
            }
            (ReportKind::Models, _) => Report::Models(aggregator.aggregate_by_model(events)),
        }
    }

    pub fn run(&self, kind: ReportKind, root: &Path, options: &ReportOptions) -> Result<Report> {
        let span = info_span!("report", run_id = %Uuid::new_v4(), kind = %kind);
        let _enter = span.enter();

        let events = self.load_events(root)?;
        let report = self.build_report(kind, &events, options);
        info!(rows = report.len(), "Report ready");
        Ok(report)
    }
}
