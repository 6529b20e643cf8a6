//! Aggregation Engine
//!
//! Groups filtered [`UsageEvent`]s along one dimension and accumulates token
//! totals and estimated cost per group. Every aggregation is a single pass in
//! input order followed by a deterministic sort:
//!
//! | Operation                          | Key              | Order                                  |
//! |------------------------------------|------------------|----------------------------------------|
//! | [`Aggregator::aggregate_daily`]    | UTC calendar day | ascending date                         |
//! | [`Aggregator::aggregate_monthly`]  | [`MonthKey`]     | ascending (year, month)                |
//! | [`Aggregator::aggregate_by_session`] | session id     | ascending start time, then session id  |
//! | [`Aggregator::aggregate_by_model`] | model id         | descending cost, then model id         |
//!
//! Token totals and cost are conserved: summing any field over the groups
//! gives the same value as summing it over the input events. Models missing
//! from the pricing table are grouped like any other model and contribute
//! zero cost.
//!
//! The `*_breakdown` operations pair each primary group with the per-model
//! aggregation of that group's events.

use crate::calculator::CostCalculator;
use crate::models::*;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

#[derive(Debug, Clone)]
struct Accumulator {
    tokens: TokenUsage,
    cost_usd: f64,
    models: Vec<String>,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl Accumulator {
    fn seeded(event: &UsageEvent) -> Self {
        Self {
            tokens: TokenUsage::default(),
            cost_usd: 0.0,
            models: Vec::new(),
            first_seen: event.timestamp,
            last_seen: event.timestamp,
        }
    }

    fn add(&mut self, event: &UsageEvent, cost: f64) {
        self.tokens += event.tokens;
        self.cost_usd += cost;

        if !self.models.iter().any(|m| m == &event.model) {
            self.models.push(event.model.clone());
        }

        if event.timestamp < self.first_seen {
            self.first_seen = event.timestamp;
        }
        if event.timestamp > self.last_seen {
            self.last_seen = event.timestamp;
        }
    }
}

fn day_key(event: &UsageEvent) -> NaiveDate {
    event.timestamp.date_naive()
}

fn month_key(event: &UsageEvent) -> MonthKey {
    MonthKey::new(event.timestamp.year(), event.timestamp.month())
}

fn session_key(event: &UsageEvent) -> String {
    event.session_id.clone()
}

fn model_key(event: &UsageEvent) -> String {
    event.model.clone()
}

// Bucket events by key, keeping input order within each bucket.
fn group_events<'e, K, F>(events: &'e [UsageEvent], key_of: F) -> HashMap<K, Vec<&'e UsageEvent>>
where
    K: Eq + Hash,
    F: Fn(&UsageEvent) -> K,
{
    let mut groups: HashMap<K, Vec<&UsageEvent>> = HashMap::new();
    for event in events {
        groups.entry(key_of(event)).or_default().push(event);
    }
    groups
}

pub struct Aggregator<'a> {
    calculator: CostCalculator<'a>,
}

impl<'a> Aggregator<'a> {
    pub fn new(calculator: CostCalculator<'a>) -> Self {
        Self { calculator }
    }

    fn accumulate<'e, K, I, F>(&self, events: I, key_of: F) -> HashMap<K, Accumulator>
    where
        K: Eq + Hash,
        I: IntoIterator<Item = &'e UsageEvent>,
        F: Fn(&UsageEvent) -> K,
    {
        let mut groups: HashMap<K, Accumulator> = HashMap::new();
        for event in events {
            let cost = self.calculator.event_cost(event);
            groups
                .entry(key_of(event))
                .or_insert_with(|| Accumulator::seeded(event))
                .add(event, cost);
        }
        groups
    }

    pub fn aggregate_daily(&self, events: &[UsageEvent]) -> Vec<DailyUsage> {
        let mut result: Vec<DailyUsage> = self
            .accumulate(events, day_key)
            .into_iter()
            .map(|(date, acc)| DailyUsage {
                date,
                models: acc.models,
                total_tokens: acc.tokens.total(),
                tokens: acc.tokens,
                cost_usd: acc.cost_usd,
            })
            .collect();

        result.sort_by_key(|day| day.date);
        debug!(events = events.len(), groups = result.len(), "Aggregated daily usage");
        result
    }

    pub fn aggregate_monthly(&self, events: &[UsageEvent]) -> Vec<MonthlyUsage> {
        let mut result: Vec<MonthlyUsage> = self
            .accumulate(events, month_key)
            .into_iter()
            .map(|(key, acc)| MonthlyUsage {
                year: key.year,
                month: key.month,
                models: acc.models,
                total_tokens: acc.tokens.total(),
                tokens: acc.tokens,
                cost_usd: acc.cost_usd,
            })
            .collect();

        result.sort_by_key(MonthlyUsage::key);
        debug!(events = events.len(), groups = result.len(), "Aggregated monthly usage");
        result
    }

    pub fn aggregate_by_session(&self, events: &[UsageEvent]) -> Vec<SessionUsage> {
        let mut result: Vec<SessionUsage> = self
            .accumulate(events, session_key)
            .into_iter()
            .map(|(session_id, acc)| SessionUsage {
                session_id,
                start_time: acc.first_seen,
                end_time: acc.last_seen,
                models: acc.models,
                total_tokens: acc.tokens.total(),
                tokens: acc.tokens,
                cost_usd: acc.cost_usd,
            })
            .collect();

        result.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        debug!(events = events.len(), groups = result.len(), "Aggregated session usage");
        result
    }

    pub fn aggregate_by_model(&self, events: &[UsageEvent]) -> Vec<ModelBreakdown> {
        self.model_rows(events)
    }

    fn model_rows<'e, I>(&self, events: I) -> Vec<ModelBreakdown>
    where
        I: IntoIterator<Item = &'e UsageEvent>,
    {
        let mut result: Vec<ModelBreakdown> = self
            .accumulate(events, model_key)
            .into_iter()
            .map(|(model, acc)| ModelBreakdown {
                model,
                total_tokens: acc.tokens.total(),
                tokens: acc.tokens,
                cost_usd: acc.cost_usd,
            })
            .collect();

        result.sort_by(|a, b| {
            b.cost_usd
                .total_cmp(&a.cost_usd)
                .then_with(|| a.model.cmp(&b.model))
        });
        result
    }

    pub fn daily_breakdown(&self, events: &[UsageEvent]) -> Vec<GroupBreakdown<DailyUsage>> {
        let mut groups = group_events(events, day_key);
        self.aggregate_daily(events)
            .into_iter()
            .map(|usage| GroupBreakdown {
                breakdown: self.model_rows(groups.remove(&usage.date).unwrap_or_default()),
                usage,
            })
            .collect()
    }

    pub fn monthly_breakdown(&self, events: &[UsageEvent]) -> Vec<GroupBreakdown<MonthlyUsage>> {
        let mut groups = group_events(events, month_key);
        self.aggregate_monthly(events)
            .into_iter()
            .map(|usage| GroupBreakdown {
                breakdown: self.model_rows(groups.remove(&usage.key()).unwrap_or_default()),
                usage,
            })
            .collect()
    }

    pub fn session_breakdown(&self, events: &[UsageEvent]) -> Vec<GroupBreakdown<SessionUsage>> {
        let mut groups = group_events(events, session_key);
        self.aggregate_by_session(events)
            .into_iter()
            .map(|usage| GroupBreakdown {
                breakdown: self.model_rows(groups.remove(&usage.session_id).unwrap_or_default()),
                usage,
            })
            .collect()
    }
}
