//! Cost estimation for individual usage events.

use crate::models::{TokenUsage, UsageEvent};
use crate::pricing::PricingTable;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Prices token usage against an injected [`PricingTable`].
#[derive(Debug, Clone, Copy)]
pub struct CostCalculator<'a> {
    pricing: &'a PricingTable,
}

impl<'a> CostCalculator<'a> {
    pub fn new(pricing: &'a PricingTable) -> Self {
        Self { pricing }
    }

    /// Estimated USD cost. Models missing from the table cost exactly zero.
    pub fn calculate(&self, tokens: &TokenUsage, model: &str) -> f64 {
        let rate = match self.pricing.get(model) {
            Some(rate) => rate,
            None => return 0.0,
        };

        let mut cost = 0.0;
        cost += tokens.input_tokens as f64 / TOKENS_PER_MILLION * rate.input_per_million;
        cost += tokens.output_tokens as f64 / TOKENS_PER_MILLION * rate.output_per_million;
        cost += tokens.cache_creation_tokens as f64 / TOKENS_PER_MILLION
            * rate.cache_creation_per_million;
        cost += tokens.cache_read_tokens as f64 / TOKENS_PER_MILLION * rate.cache_read_per_million;
        cost
    }

    pub fn event_cost(&self, event: &UsageEvent) -> f64 {
        self.calculate(&event.tokens, &event.model)
    }
}
