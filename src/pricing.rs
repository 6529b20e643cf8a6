use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-million-token USD rates for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
    pub cache_creation_per_million: f64,
    pub cache_read_per_million: f64,
}

impl PricingRate {
    pub const fn new(input: f64, output: f64, cache_creation: f64, cache_read: f64) -> Self {
        Self {
            input_per_million: input,
            output_per_million: output,
            cache_creation_per_million: cache_creation,
            cache_read_per_million: cache_read,
        }
    }

    pub fn is_valid(&self) -> bool {
        [
            self.input_per_million,
            self.output_per_million,
            self.cache_creation_per_million,
            self.cache_read_per_million,
        ]
        .iter()
        .all(|rate| rate.is_finite() && *rate >= 0.0)
    }
}

const OPUS: PricingRate = PricingRate::new(15.00, 75.00, 18.75, 1.50);
const SONNET: PricingRate = PricingRate::new(3.00, 15.00, 3.75, 0.30);

// (model id, rate, short display name)
const BUILTIN_MODELS: &[(&str, PricingRate, &str)] = &[
    ("claude-opus-4-20250514", OPUS, "Opus 4"),
    ("claude-sonnet-4-20250514", SONNET, "Sonnet 4"),
    ("claude-3-5-sonnet-20241022", SONNET, "Sonnet 3.5"),
    ("claude-3-5-sonnet-20240620", SONNET, "Sonnet 3.5"),
    ("claude-3-5-haiku-20241022", PricingRate::new(0.80, 4.00, 1.00, 0.08), "Haiku 3.5"),
    ("claude-3-opus-20240229", OPUS, "Opus 3"),
    ("claude-3-sonnet-20240229", SONNET, "Sonnet 3"),
    ("claude-3-haiku-20240307", PricingRate::new(0.25, 1.25, 0.30, 0.03), "Haiku 3"),
];

/// Exact-match lookup from model identifier to [`PricingRate`].
///
/// Built once at startup and handed to the cost calculator; never mutated
/// after the report run begins.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    rates: HashMap<String, PricingRate>,
}

impl PricingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rates shipped with the binary.
    pub fn builtin() -> Self {
        let rates = BUILTIN_MODELS
            .iter()
            .map(|(model, rate, _)| (model.to_string(), *rate))
            .collect();
        Self { rates }
    }

    /// Built-in rates with configured entries layered on top.
    pub fn with_overrides(overrides: &HashMap<String, PricingRate>) -> Self {
        let mut table = Self::builtin();
        for (model, rate) in overrides {
            table.insert(model.clone(), *rate);
        }
        table
    }

    pub fn insert(&mut self, model: impl Into<String>, rate: PricingRate) {
        self.rates.insert(model.into(), rate);
    }

    pub fn get(&self, model: &str) -> Option<&PricingRate> {
        self.rates.get(model)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Short human name for a known model, or the identifier itself.
pub fn display_name(model: &str) -> &str {
    BUILTIN_MODELS
        .iter()
        .find(|(id, _, _)| *id == model)
        .map(|(_, _, name)| *name)
        .unwrap_or(model)
}
