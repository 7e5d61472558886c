//! ICMS assessment
//!
//! Debits come from revenue apportioned by sales channel, reduced by the
//! share sold under substituição tributária. Credits come from purchases at
//! the matching rate plus the already-computed credits supplied in
//! [`IcmsExtraCredits`](crate::config::IcmsExtraCredits).

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::{percent_of, remaining_factor, total, EngineResult, LineItem, Settlement};
use crate::config::TaxConfiguration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcmsDebits {
    pub internal_sales: LineItem,
    pub interstate_sales: LineItem,
    pub difal: LineItem,
    pub fcp: LineItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcmsCredits {
    pub internal_purchases: LineItem,
    pub interstate_purchases: LineItem,
    pub opening_inventory: LineItem,
    pub fixed_assets: LineItem,
    pub industrial_energy: LineItem,
    pub substitution_entry: LineItem,
    pub other: LineItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcmsResult {
    pub debits: IcmsDebits,
    pub credits: IcmsCredits,
    pub settlement: Settlement,
    /// Excess credit over debits; reported only, never chained into another period
    pub carryover_credit: Decimal,
}

/// Assess ICMS for a configuration
pub fn calculate_icms(config: &TaxConfiguration) -> IcmsResult {
    let revenue = &config.revenue;
    let rates = &config.rates;
    let interstate_rate = config.interstate_rate();

    let taxable_factor = remaining_factor(config.regimes.percent_substituicao_tributaria);

    let internal_base = percent_of(revenue.gross_revenue, revenue.percent_internal_sales)
        .saturating_mul(taxable_factor);
    let interstate_base = percent_of(revenue.gross_revenue, revenue.percent_interstate_sales)
        .saturating_mul(taxable_factor);
    let final_consumer_base = percent_of(interstate_base, revenue.percent_final_consumer);

    let debits = IcmsDebits {
        internal_sales: LineItem::new("Vendas internas", internal_base, rates.icms_interno),
        interstate_sales: LineItem::new(
            "Vendas interestaduais",
            interstate_base,
            interstate_rate,
        ),
        difal: LineItem::new("DIFAL", final_consumer_base, rates.difal),
        fcp: LineItem::new("FCP", final_consumer_base, rates.fcp),
    };

    let extra = &config.icms_credits;
    let credits = IcmsCredits {
        internal_purchases: LineItem::new(
            "Compras internas",
            config.purchases.internal_purchases,
            rates.icms_interno,
        ),
        interstate_purchases: LineItem::new(
            "Compras interestaduais",
            config.purchases.interstate_purchases,
            interstate_rate,
        ),
        opening_inventory: LineItem::flat("Estoque inicial", extra.opening_inventory),
        fixed_assets: LineItem::flat("Ativo imobilizado (CIAP)", extra.fixed_assets),
        industrial_energy: LineItem::flat("Energia industrial", extra.industrial_energy),
        substitution_entry: LineItem::flat("Entradas com ST", extra.substitution_entry),
        other: LineItem::flat("Outros créditos", extra.other),
    };

    let mut result = IcmsResult {
        debits,
        credits,
        settlement: Settlement::net(Decimal::ZERO, Decimal::ZERO),
        carryover_credit: Decimal::ZERO,
    };
    result.settlement = Settlement::net(
        total(result.debit_rows()),
        total(result.credit_rows()),
    );
    result.carryover_credit = result.settlement.excess_credit();

    debug!(
        "ICMS: debits {} credits {} payable {} carryover {}",
        result.settlement.total_debits,
        result.settlement.total_credits,
        result.settlement.amount_payable,
        result.carryover_credit
    );

    result
}

impl EngineResult for IcmsResult {
    fn tax_name(&self) -> &'static str {
        "ICMS"
    }

    fn debit_rows(&self) -> Vec<&LineItem> {
        let d = &self.debits;
        vec![&d.internal_sales, &d.interstate_sales, &d.difal, &d.fcp]
    }

    fn credit_rows(&self) -> Vec<&LineItem> {
        let c = &self.credits;
        vec![
            &c.internal_purchases,
            &c.interstate_purchases,
            &c.opening_inventory,
            &c.fixed_assets,
            &c.industrial_energy,
            &c.substitution_entry,
            &c.other,
        ]
    }

    fn settlement(&self) -> &Settlement {
        &self.settlement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InterstateBracket, InterstateRates};
    use rust_decimal_macros::dec;

    fn base_config() -> TaxConfiguration {
        let mut config = TaxConfiguration::default();
        config.revenue.gross_revenue = dec!(1000000);
        config.revenue.percent_internal_sales = dec!(70);
        config.revenue.percent_interstate_sales = dec!(30);
        config.revenue.percent_final_consumer = dec!(50);
        config.rates.icms_interno = dec!(18);
        config.rates.icms_interstate = InterstateRates::statutory();
        config.rates.difal = dec!(6);
        config.rates.fcp = dec!(2);
        config
    }

    #[test]
    fn test_internal_sales_debit() {
        let result = calculate_icms(&base_config());
        assert_eq!(result.debits.internal_sales.base, dec!(700000));
        assert_eq!(result.debits.internal_sales.value, dec!(126000));
    }

    #[test]
    fn test_interstate_difal_and_fcp() {
        let result = calculate_icms(&base_config());
        // 300.000 at 12%
        assert_eq!(result.debits.interstate_sales.value, dec!(36000));
        // half of the interstate sales go to final consumers
        assert_eq!(result.debits.difal.base, dec!(150000));
        assert_eq!(result.debits.difal.value, dec!(9000));
        assert_eq!(result.debits.fcp.value, dec!(3000));
        assert_eq!(result.settlement.total_debits, dec!(174000));
    }

    #[test]
    fn test_bracket_changes_interstate_rate() {
        let mut config = base_config();
        config.revenue.interstate_bracket = InterstateBracket::OtherRegions;
        config.purchases.interstate_purchases = dec!(10000);
        let result = calculate_icms(&config);
        assert_eq!(result.debits.interstate_sales.rate, dec!(7));
        assert_eq!(result.debits.interstate_sales.value, dec!(21000));
        assert_eq!(result.credits.interstate_purchases.value, dec!(700));
    }

    #[test]
    fn test_substitution_reduces_debit_base() {
        let mut config = base_config();
        config.regimes.percent_substituicao_tributaria = dec!(40);
        let result = calculate_icms(&config);
        assert_eq!(result.debits.internal_sales.base, dec!(420000));
        assert_eq!(result.debits.internal_sales.value, dec!(75600));
    }

    #[test]
    fn test_full_substitution_zeroes_every_debit() {
        let mut config = base_config();
        config.regimes.percent_substituicao_tributaria = dec!(100);
        let result = calculate_icms(&config);
        for row in result.debit_rows() {
            assert_eq!(row.value, Decimal::ZERO, "{} should be zero", row.label);
        }
        assert_eq!(result.settlement.total_debits, Decimal::ZERO);
    }

    #[test]
    fn test_credits_and_payable() {
        let mut config = base_config();
        config.purchases.internal_purchases = dec!(300000);
        config.purchases.interstate_purchases = dec!(100000);
        config.icms_credits.fixed_assets = dec!(1500);
        config.icms_credits.other = dec!(500);

        let result = calculate_icms(&config);
        assert_eq!(result.credits.internal_purchases.value, dec!(54000));
        assert_eq!(result.credits.interstate_purchases.value, dec!(12000));
        assert_eq!(result.credits.fixed_assets.value, dec!(1500));
        assert_eq!(result.settlement.total_credits, dec!(68000));
        assert_eq!(result.settlement.amount_payable, dec!(106000));
        assert_eq!(result.carryover_credit, Decimal::ZERO);
    }

    #[test]
    fn test_excess_credit_becomes_carryover() {
        let mut config = base_config();
        config.regimes.percent_substituicao_tributaria = dec!(100);
        config.purchases.internal_purchases = dec!(10000);
        config.icms_credits.opening_inventory = dec!(200);

        let result = calculate_icms(&config);
        assert_eq!(result.settlement.amount_payable, Decimal::ZERO);
        assert_eq!(result.carryover_credit, dec!(2000));
    }

    #[test]
    fn test_empty_configuration() {
        let result = calculate_icms(&TaxConfiguration::default());
        assert_eq!(result.settlement.total_debits, Decimal::ZERO);
        assert_eq!(result.settlement.amount_payable, Decimal::ZERO);
        assert_eq!(result.carryover_credit, Decimal::ZERO);
    }
}
