// Tax module - Lucro Real engines (ICMS, PIS/COFINS, IRPJ/CSLL) and their pipeline

pub mod icms;
pub mod irpj_csll;
pub mod pipeline;
pub mod pis_cofins;

use rust_decimal::Decimal;
use serde::Serialize;

pub use icms::{calculate_icms, IcmsCredits, IcmsDebits, IcmsResult};
pub use irpj_csll::{calculate_income_taxes, IncomeTaxResult};
pub use pipeline::{compute, TaxCalculator, TaxComputation};
pub use pis_cofins::{calculate_pis_cofins, ContributionLedger, PisCofinsResult};

// Engine arithmetic saturates at Decimal::MAX / Decimal::MIN instead of
// panicking, so out-of-range inputs still produce a result.

/// `base × rate / 100`
pub fn percent_of(base: Decimal, rate: Decimal) -> Decimal {
    match base.checked_mul(rate) {
        Some(product) => product / Decimal::ONE_HUNDRED,
        None => (base / Decimal::ONE_HUNDRED).saturating_mul(rate),
    }
}

/// Sum that sticks at the representable bounds
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

/// Share of a base left after removing `percent` of it, as a factor
pub fn remaining_factor(percent: Decimal) -> Decimal {
    Decimal::ONE_HUNDRED.saturating_sub(percent) / Decimal::ONE_HUNDRED
}

/// One debit or credit row of an assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub label: String,
    pub base: Decimal,
    /// Percent
    pub rate: Decimal,
    pub value: Decimal,
}

impl LineItem {
    pub fn new(label: impl Into<String>, base: Decimal, rate: Decimal) -> Self {
        Self {
            label: label.into(),
            base,
            rate,
            value: percent_of(base, rate),
        }
    }

    /// Row whose value is already a computed credit; base carries the value at 100%
    pub fn flat(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            base: value,
            rate: Decimal::ONE_HUNDRED,
            value,
        }
    }
}

/// Sum the values of a set of rows
pub fn total<'a>(rows: impl IntoIterator<Item = &'a LineItem>) -> Decimal {
    saturating_sum(rows.into_iter().map(|row| row.value))
}

/// Debit/credit netting of one tax
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    /// `max(0, debits - credits)`
    pub amount_payable: Decimal,
}

impl Settlement {
    pub fn net(total_debits: Decimal, total_credits: Decimal) -> Self {
        Self {
            total_debits,
            total_credits,
            amount_payable: total_debits.saturating_sub(total_credits).max(Decimal::ZERO),
        }
    }

    /// Credit left over after offsetting all debits
    pub fn excess_credit(&self) -> Decimal {
        self.total_credits
            .saturating_sub(self.total_debits)
            .max(Decimal::ZERO)
    }
}

/// Common view over the debit/credit engines, used by the renderers
pub trait EngineResult {
    /// Short tax name ("ICMS", "PIS", "COFINS")
    fn tax_name(&self) -> &'static str;
    fn debit_rows(&self) -> Vec<&LineItem>;
    fn credit_rows(&self) -> Vec<&LineItem>;
    fn settlement(&self) -> &Settlement;

    fn amount_payable(&self) -> Decimal {
        self.settlement().amount_payable
    }
}
