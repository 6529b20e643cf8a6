//! Core Data Models
//!
//! This module defines the data structures that flow through the usage pipeline,
//! from raw usage events extracted out of JSONL logs to the aggregated reports
//! handed to the display layer.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`UsageEvent`] - One billable assistant turn parsed from a log line
//! 2. **Aggregation**: [`DailyUsage`], [`MonthlyUsage`], [`SessionUsage`], [`ModelBreakdown`]
//! 3. **Breakdown**: [`GroupBreakdown`] - A primary group paired with its per-model split
//! 4. **Options**: [`ReportOptions`] - Filters and presentation flags for one run
//!
//! All aggregate types serialize with camelCase keys for JSON output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Token counters carried by every usage event and every aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheCreationTokens")]
    pub cache_creation_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64, cache_creation: u64, cache_read: u64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            cache_creation_tokens: cache_creation,
            cache_read_tokens: cache_read,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_creation_tokens + self.cache_read_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_creation_tokens += other.cache_creation_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
    }
}

/// A single billable assistant turn.
///
/// The estimated cost is not stored here; it is derived by
/// [`CostCalculator`](crate::calculator::CostCalculator) whenever an
/// aggregation needs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEvent {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    #[serde(flatten)]
    pub tokens: TokenUsage,
}

/// Composite grouping key for monthly aggregation.
///
/// Field order matters: the derived ordering compares year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub models: Vec<String>,
    #[serde(flatten)]
    pub tokens: TokenUsage,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyUsage {
    pub year: i32,
    pub month: u32,
    pub models: Vec<String>,
    #[serde(flatten)]
    pub tokens: TokenUsage,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
}

impl MonthlyUsage {
    pub fn key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUsage {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    pub models: Vec<String>,
    #[serde(flatten)]
    pub tokens: TokenUsage,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBreakdown {
    pub model: String,
    #[serde(flatten)]
    pub tokens: TokenUsage,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
}

/// A primary aggregate together with the per-model split of its events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown<T> {
    #[serde(flatten)]
    pub usage: T,
    pub breakdown: Vec<ModelBreakdown>,
}

/// Which aggregation a report run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Daily,
    Monthly,
    Session,
    Models,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Monthly => "monthly",
            ReportKind::Session => "session",
            ReportKind::Models => "models",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully computed report, ready to render or serialize as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Daily(Vec<DailyUsage>),
    DailyBreakdown(Vec<GroupBreakdown<DailyUsage>>),
    Monthly(Vec<MonthlyUsage>),
    MonthlyBreakdown(Vec<GroupBreakdown<MonthlyUsage>>),
    Session(Vec<SessionUsage>),
    SessionBreakdown(Vec<GroupBreakdown<SessionUsage>>),
    Models(Vec<ModelBreakdown>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::Daily(rows) => rows.len(),
            Report::DailyBreakdown(rows) => rows.len(),
            Report::Monthly(rows) => rows.len(),
            Report::MonthlyBreakdown(rows) => rows.len(),
            Report::Session(rows) => rows.len(),
            Report::SessionBreakdown(rows) => rows.len(),
            Report::Models(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reverse the row order of time-keyed reports. The model report keeps
    /// its cost-descending order.
    pub fn reverse(&mut self) {
        match self {
            Report::Daily(rows) => rows.reverse(),
            Report::DailyBreakdown(rows) => rows.reverse(),
            Report::Monthly(rows) => rows.reverse(),
            Report::MonthlyBreakdown(rows) => rows.reverse(),
            Report::Session(rows) => rows.reverse(),
            Report::SessionBreakdown(rows) => rows.reverse(),
            Report::Models(_) => {}
        }
    }
}

/// Filters and presentation flags for a single report run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOptions {
    /// Inclusive lower bound, from midnight UTC.
    pub since: Option<NaiveDate>,
    /// Inclusive upper bound, through the end of the day UTC.
    pub until: Option<NaiveDate>,
    /// Case-insensitive model allow-list. Empty means every model.
    pub models: Vec<String>,
    pub breakdown: bool,
    pub json_output: bool,
    /// Text output only: list sessions oldest first instead of newest first.
    /// Daily and monthly tables are always oldest first, and JSON keeps the
    /// aggregation order.
    pub ascending: bool,
}
