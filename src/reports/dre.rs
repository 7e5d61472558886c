//! Demonstração do Resultado do Exercício
//!
//! Pure composition of the engine outputs. Every figure here already exists
//! in one of the engines; a mismatch between the DRE and the engines is a
//! wiring bug, not a different formula.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::TaxConfiguration;
use crate::tax::{saturating_sum, IcmsResult, IncomeTaxResult, PisCofinsResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deductions {
    pub icms: Decimal,
    pub pis: Decimal,
    pub cofins: Decimal,
    pub iss: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeTaxes {
    pub irpj: Decimal,
    pub csll: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreResult {
    pub gross_revenue: Decimal,
    pub deductions: Deductions,
    pub net_revenue: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses: Decimal,
    pub profit_before_tax: Decimal,
    pub income_taxes: IncomeTaxes,
    pub net_profit: Decimal,
    /// Percent of gross revenue
    pub gross_margin: Decimal,
    /// Percent of gross revenue
    pub net_margin: Decimal,
}

/// `part / whole × 100`, or zero when `whole` is zero.
///
/// A ratio beyond the representable range saturates with the sign of the quotient.
pub fn margin(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    match part.checked_div(whole) {
        Some(ratio) => ratio.saturating_mul(Decimal::ONE_HUNDRED),
        None if part.is_sign_negative() != whole.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    }
}

/// Assemble the income statement
pub fn build_dre(
    config: &TaxConfiguration,
    icms: &IcmsResult,
    pis_cofins: &PisCofinsResult,
    income_taxes: &IncomeTaxResult,
) -> DreResult {
    let gross_revenue = config.revenue.gross_revenue;

    let icms_payable = icms.settlement.amount_payable;
    let pis = pis_cofins.pis.settlement.amount_payable;
    let cofins = pis_cofins.cofins.settlement.amount_payable;
    let iss = income_taxes.iss_payable;
    let deductions = Deductions {
        icms: icms_payable,
        pis,
        cofins,
        iss,
        total: saturating_sum([icms_payable, pis, cofins, iss]),
    };

    let net_revenue = gross_revenue.saturating_sub(deductions.total);
    let cogs = config.purchases.cost_of_goods_sold;
    let gross_profit = net_revenue.saturating_sub(cogs);
    let operating_expenses = income_taxes.operating_expenses_total;
    let profit_before_tax = gross_profit.saturating_sub(operating_expenses);

    let taxes = IncomeTaxes {
        irpj: income_taxes.total_irpj,
        csll: income_taxes.csll.value,
        total: income_taxes.total_income_tax,
    };
    let net_profit = profit_before_tax.saturating_sub(taxes.total);

    DreResult {
        gross_revenue,
        net_revenue,
        cogs,
        gross_profit,
        operating_expenses,
        profit_before_tax,
        net_profit,
        gross_margin: margin(gross_profit, gross_revenue),
        net_margin: margin(net_profit, gross_revenue),
        deductions,
        income_taxes: taxes,
    }
}
