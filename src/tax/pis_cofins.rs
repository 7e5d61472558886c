//! PIS and COFINS assessment (non-cumulative regime)
//!
//! Both contributions share one structure: a single debit on gross revenue
//! reduced by the monofásico share, and credits on purchases, on the named
//! credit-eligible expense buckets and on every eligible expense item. Each
//! contribution is settled on its own; there is no netting between them.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::{remaining_factor, saturating_sum, total, EngineResult, LineItem, Settlement};
use crate::config::TaxConfiguration;

/// Debit, credits and settlement of one contribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionLedger {
    pub name: &'static str,
    pub rate: Decimal,
    pub debit: LineItem,
    pub purchases_credit: LineItem,
    /// One row per named expense bucket
    pub expense_credits: Vec<LineItem>,
    /// One row per eligible expense item
    pub item_credits: Vec<LineItem>,
    pub settlement: Settlement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PisCofinsResult {
    pub pis: ContributionLedger,
    pub cofins: ContributionLedger,
}

impl PisCofinsResult {
    pub fn total_payable(&self) -> Decimal {
        self.pis
            .settlement
            .amount_payable
            .saturating_add(self.cofins.settlement.amount_payable)
    }
}

/// Assess PIS and COFINS for a configuration
pub fn calculate_pis_cofins(config: &TaxConfiguration) -> PisCofinsResult {
    let result = PisCofinsResult {
        pis: assess("PIS", config.rates.pis, config),
        cofins: assess("COFINS", config.rates.cofins, config),
    };

    debug!(
        "PIS payable {} / COFINS payable {}",
        result.pis.settlement.amount_payable, result.cofins.settlement.amount_payable
    );

    result
}

fn assess(name: &'static str, rate: Decimal, config: &TaxConfiguration) -> ContributionLedger {
    let taxable_factor = remaining_factor(config.regimes.percent_monofasico);
    let debit_base = config.revenue.gross_revenue.saturating_mul(taxable_factor);
    let debit = LineItem::new("Receita bruta", debit_base, rate);

    let purchases = &config.purchases;
    let purchases_credit = LineItem::new(
        "Compras para revenda",
        purchases
            .internal_purchases
            .saturating_add(purchases.interstate_purchases),
        rate,
    );

    let expense_credits: Vec<LineItem> = config
        .credit_expenses
        .buckets()
        .into_iter()
        .map(|(label, base)| LineItem::new(label, base, rate))
        .collect();

    let item_credits: Vec<LineItem> = config
        .expenses
        .iter()
        .filter(|item| item.is_credit_eligible())
        .map(|item| LineItem::new(item.label(), item.value, rate))
        .collect();

    let total_credits = saturating_sum([
        purchases_credit.value,
        total(&expense_credits),
        total(&item_credits),
    ]);

    ContributionLedger {
        name,
        rate,
        settlement: Settlement::net(debit.value, total_credits),
        debit,
        purchases_credit,
        expense_credits,
        item_credits,
    }
}

impl EngineResult for ContributionLedger {
    fn tax_name(&self) -> &'static str {
        self.name
    }

    fn debit_rows(&self) -> Vec<&LineItem> {
        vec![&self.debit]
    }

    fn credit_rows(&self) -> Vec<&LineItem> {
        std::iter::once(&self.purchases_credit)
            .chain(&self.expense_credits)
            .chain(&self.item_credits)
            .collect()
    }

    fn settlement(&self) -> &Settlement {
        &self.settlement
    }
}
