//! Engine pipeline and memo cache
//!
//! [`compute`] is the explicit call graph: ICMS and PIS/COFINS are leaves,
//! IRPJ/CSLL consumes their payables, and the DRE composes all three.
//! [`TaxCalculator`] wraps it with a cache keyed on the structure of the
//! configuration, never on its identity.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

use super::{calculate_icms, calculate_income_taxes, calculate_pis_cofins};
use super::{IcmsResult, IncomeTaxResult, PisCofinsResult};
use crate::config::TaxConfiguration;
use crate::reports::{build_dre, DreResult};

/// Every engine output for one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxComputation {
    pub icms: IcmsResult,
    pub pis_cofins: PisCofinsResult,
    pub income_taxes: IncomeTaxResult,
    pub dre: DreResult,
}

/// Run all engines in dependency order
pub fn compute(config: &TaxConfiguration) -> TaxComputation {
    let icms = calculate_icms(config);
    let pis_cofins = calculate_pis_cofins(config);
    let income_taxes = calculate_income_taxes(
        config,
        icms.settlement.amount_payable,
        pis_cofins.pis.settlement.amount_payable,
        pis_cofins.cofins.settlement.amount_payable,
    );
    let dre = build_dre(config, &icms, &pis_cofins, &income_taxes);

    TaxComputation {
        icms,
        pis_cofins,
        income_taxes,
        dre,
    }
}

/// Structural digest of a configuration.
///
/// Decimals are compared by value, so `1.5` and `1.50` must hash the same;
/// numeric fields are rewritten without trailing zeros before hashing.
/// Free-text fields are hashed verbatim.
pub fn fingerprint(config: &TaxConfiguration) -> blake3::Hash {
    let mut value = serde_json::to_value(config).unwrap_or(Value::Null);
    normalize_numbers(&mut value);
    blake3::hash(value.to_string().as_bytes())
}

/// Serialized fields of [`TaxConfiguration`] that hold text, never amounts
const TEXT_FIELDS: [&str; 5] = [
    "id",
    "description",
    "category",
    "classification",
    "credit_eligibility",
];

fn normalize_numbers(value: &mut Value) {
    match value {
        Value::String(text) => {
            if let Ok(number) = text.parse::<Decimal>() {
                *text = number.normalize().to_string();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(fields) => {
            for (key, field) in fields.iter_mut() {
                if !TEXT_FIELDS.contains(&key.as_str()) {
                    normalize_numbers(field);
                }
            }
        }
        _ => {}
    }
}

/// Entries kept by [`TaxCalculator::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

struct CacheEntry {
    config: TaxConfiguration,
    computation: Arc<TaxComputation>,
}

/// Memoizing front-end over [`compute`].
///
/// Holds at most `capacity` computations; the oldest one is evicted first.
pub struct TaxCalculator {
    cache: HashMap<blake3::Hash, CacheEntry>,
    order: VecDeque<blake3::Hash>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl TaxCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator that keeps at most `capacity` computations (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the computation for `config`, reusing a cached one when an
    /// equal configuration was computed before
    pub fn compute(&mut self, config: &TaxConfiguration) -> Arc<TaxComputation> {
        let key = fingerprint(config);

        if let Some(entry) = self.cache.get(&key) {
            if entry.config == *config {
                self.hits += 1;
                debug!("Tax computation cache hit ({})", key.to_hex());
                return Arc::clone(&entry.computation);
            }
        }

        self.misses += 1;
        debug!("Tax computation cache miss ({})", key.to_hex());
        let computation = Arc::new(compute(config));

        if !self.cache.contains_key(&key) {
            while self.cache.len() >= self.capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.cache.remove(&oldest);
                    }
                    None => break,
                }
            }
            self.order.push_back(key);
        }
        self.cache.insert(
            key,
            CacheEntry {
                config: config.clone(),
                computation: Arc::clone(&computation),
            },
        );
        computation
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_income_taxes_see_upstream_payables() {
        let config = TaxConfiguration::sample();
        let result = compute(&config);
        assert_eq!(
            result.income_taxes.icms_payable,
            result.icms.settlement.amount_payable
        );
        assert_eq!(
            result.income_taxes.pis_payable,
            result.pis_cofins.pis.settlement.amount_payable
        );
        assert_eq!(
            result.income_taxes.cofins_payable,
            result.pis_cofins.cofins.settlement.amount_payable
        );
    }

    #[test]
    fn test_fingerprint_ignores_decimal_scale() {
        let mut a = TaxConfiguration::sample();
        let mut b = TaxConfiguration::sample();
        a.rates.cofins = dec!(7.6);
        b.rates.cofins = dec!(7.60);
        assert_eq!(a, b);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_any_field() {
        let a = TaxConfiguration::sample();
        let mut b = a.clone();
        b.expenses[0].value += dec!(0.01);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_cache_hits_for_rebuilt_configuration() {
        let mut calculator = TaxCalculator::new();

        let first = calculator.compute(&TaxConfiguration::sample());
        let second = calculator.compute(&TaxConfiguration::sample());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calculator.hits(), 1);
        assert_eq!(calculator.misses(), 1);
        assert_eq!(calculator.len(), 1);
    }

    #[test]
    fn test_cache_misses_on_change() {
        let mut calculator = TaxCalculator::new();
        let mut config = TaxConfiguration::sample();

        let before = calculator.compute(&config);
        config.regimes.percent_monofasico = dec!(10);
        let after = calculator.compute(&config);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_ne!(before.pis_cofins.pis.debit, after.pis_cofins.pis.debit);
        assert_eq!(calculator.misses(), 2);
        assert_eq!(calculator.len(), 2);

        calculator.clear();
        assert!(calculator.is_empty());
    }

    #[test]
    fn test_fingerprint_keeps_text_verbatim() {
        let a = TaxConfiguration::sample();
        let mut b = a.clone();
        b.expenses[0].id = "007".to_string();
        let mut c = a.clone();
        c.expenses[0].id = "7".to_string();
        assert_ne!(fingerprint(&b), fingerprint(&c));

        let mut d = a.clone();
        d.expenses[1].description = "10.0".to_string();
        let mut e = a.clone();
        e.expenses[1].description = "10".to_string();
        assert_ne!(fingerprint(&d), fingerprint(&e));
    }

    #[test]
    fn test_cache_evicts_oldest_entry() {
        let mut calculator = TaxCalculator::with_capacity(2);
        let configs: Vec<TaxConfiguration> = [dec!(100), dec!(200), dec!(300)]
            .into_iter()
            .map(|gross| {
                let mut config = TaxConfiguration::sample();
                config.revenue.gross_revenue = gross;
                config
            })
            .collect();

        for config in &configs {
            calculator.compute(config);
        }
        assert_eq!(calculator.len(), 2);

        // newest two are still cached, the first one was evicted
        calculator.compute(&configs[2]);
        calculator.compute(&configs[1]);
        assert_eq!(calculator.hits(), 2);
        calculator.compute(&configs[0]);
        assert_eq!(calculator.misses(), 4);
        assert_eq!(calculator.len(), 2);
    }
}
