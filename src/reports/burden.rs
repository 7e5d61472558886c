//! Tax burden ("carga tributária") of a computation

use rust_decimal::Decimal;
use serde::Serialize;

use super::dre::margin;
use crate::tax::{saturating_sum, TaxComputation};

/// Amount due for one tax and its weight on gross revenue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxShare {
    pub tax: &'static str,
    pub amount: Decimal,
    /// Percent of gross revenue
    pub share_of_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxBurden {
    pub shares: Vec<TaxShare>,
    pub total: Decimal,
    /// Total taxes as a percent of gross revenue
    pub effective_rate: Decimal,
}

/// Summarize what each tax takes out of gross revenue.
///
/// Negative income taxes (a loss period) are reported as computed.
pub fn summarize_burden(computation: &TaxComputation) -> TaxBurden {
    let dre = &computation.dre;
    let gross = dre.gross_revenue;

    let amounts = [
        ("ICMS", dre.deductions.icms),
        ("PIS", dre.deductions.pis),
        ("COFINS", dre.deductions.cofins),
        ("ISS", dre.deductions.iss),
        ("IRPJ", dre.income_taxes.irpj),
        ("CSLL", dre.income_taxes.csll),
    ];

    let shares: Vec<TaxShare> = amounts
        .into_iter()
        .map(|(tax, amount)| TaxShare {
            tax,
            amount,
            share_of_revenue: margin(amount, gross),
        })
        .collect();

    let total = saturating_sum(shares.iter().map(|share| share.amount));

    TaxBurden {
        effective_rate: margin(total, gross),
        shares,
        total,
    }
}
