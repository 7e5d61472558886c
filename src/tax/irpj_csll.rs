//! IRPJ and CSLL under Lucro Real
//!
//! Taxable profit is derived from gross revenue minus the consumption taxes
//! assessed upstream (ICMS, PIS, COFINS) and ISS, minus CMV and operating
//! expenses, adjusted by LALUR additions and exclusions. IRPJ applies a base
//! rate on all of it plus the surtax on the part above the period threshold;
//! CSLL has no surtax.
//!
//! A negative taxable profit is not floored: IRPJ base and CSLL come out
//! negative, and only the surtax base is clamped at zero.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::{percent_of, saturating_sum, LineItem};
use crate::config::TaxConfiguration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeTaxResult {
    pub icms_payable: Decimal,
    pub pis_payable: Decimal,
    pub cofins_payable: Decimal,
    pub iss_payable: Decimal,
    pub total_deductions: Decimal,
    pub net_revenue: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses_total: Decimal,
    pub profit_before_tax: Decimal,
    pub taxable_profit: Decimal,
    /// Surtax threshold for the configured period
    pub threshold: Decimal,
    pub irpj_base: LineItem,
    pub irpj_surtax: LineItem,
    pub total_irpj: Decimal,
    pub csll: LineItem,
    pub total_income_tax: Decimal,
}

/// Assess IRPJ and CSLL from the configuration and the upstream payables
pub fn calculate_income_taxes(
    config: &TaxConfiguration,
    icms_payable: Decimal,
    pis_payable: Decimal,
    cofins_payable: Decimal,
) -> IncomeTaxResult {
    let gross_revenue = config.revenue.gross_revenue;
    let rates = &config.rates;

    let iss_payable = percent_of(gross_revenue, rates.iss);
    let total_deductions = saturating_sum([icms_payable, pis_payable, cofins_payable, iss_payable]);
    let net_revenue = gross_revenue.saturating_sub(total_deductions);
    let gross_profit = net_revenue.saturating_sub(config.purchases.cost_of_goods_sold);

    let operating_expenses_total = saturating_sum(
        config
            .expenses
            .iter()
            .filter(|item| item.is_operating_expense())
            .map(|item| item.value),
    );

    let profit_before_tax = gross_profit.saturating_sub(operating_expenses_total);
    let taxable_profit = profit_before_tax
        .saturating_add(config.adjustments.additions)
        .saturating_sub(config.adjustments.exclusions);

    let irpj_base = LineItem::new("IRPJ", taxable_profit, rates.irpj_base);

    let threshold = config
        .monthly_surtax_limit()
        .saturating_mul(Decimal::from(config.period.months()));
    let surtax_base = taxable_profit.saturating_sub(threshold).max(Decimal::ZERO);
    let irpj_surtax = LineItem::new("Adicional de IRPJ", surtax_base, rates.irpj_surtax);

    let total_irpj = irpj_base.value.saturating_add(irpj_surtax.value);
    let csll = LineItem::new("CSLL", taxable_profit, rates.csll);
    let total_income_tax = total_irpj.saturating_add(csll.value);

    debug!(
        "Lucro real {} ({} period, threshold {}): IRPJ {} CSLL {}",
        taxable_profit,
        config.period.as_str(),
        threshold,
        total_irpj,
        csll.value
    );

    IncomeTaxResult {
        icms_payable,
        pis_payable,
        cofins_payable,
        iss_payable,
        total_deductions,
        net_revenue,
        gross_profit,
        operating_expenses_total,
        profit_before_tax,
        taxable_profit,
        threshold,
        irpj_base,
        irpj_surtax,
        total_irpj,
        csll,
        total_income_tax,
    }
}
