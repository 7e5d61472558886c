//! Configuration validation
//!
//! The engines accept any configuration and compute whatever the arithmetic
//! yields. This module is the caller-side check that runs before them: it
//! collects every issue instead of failing on the first one, and never
//! blocks a computation.

use rust_decimal::Decimal;
use std::collections::HashSet;

use super::TaxConfiguration;

/// A problem found in a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (e.g. "rates.pis")
    pub field: String,
    pub value: String,
    pub reason: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// R$ 1 quadrillion; anything larger is treated as a typo
pub const MAX_PLAUSIBLE_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Check a configuration and return every issue found
pub fn validate(config: &TaxConfiguration) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let rates = &config.rates;
    let rate_fields = [
        ("rates.icms_interno", rates.icms_interno),
        ("rates.difal", rates.difal),
        ("rates.fcp", rates.fcp),
        ("rates.pis", rates.pis),
        ("rates.cofins", rates.cofins),
        ("rates.irpj_base", rates.irpj_base),
        ("rates.irpj_surtax", rates.irpj_surtax),
        ("rates.csll", rates.csll),
        ("rates.iss", rates.iss),
        ("rates.icms_interstate.imported", rates.icms_interstate.imported),
        ("rates.icms_interstate.other_regions", rates.icms_interstate.other_regions),
        ("rates.icms_interstate.south_southeast", rates.icms_interstate.south_southeast),
    ];
    for (field, value) in rate_fields {
        check_percentage(&mut issues, field, value);
    }

    let revenue = &config.revenue;
    let percentage_fields = [
        ("revenue.percent_internal_sales", revenue.percent_internal_sales),
        ("revenue.percent_interstate_sales", revenue.percent_interstate_sales),
        ("revenue.percent_final_consumer", revenue.percent_final_consumer),
        (
            "regimes.percent_substituicao_tributaria",
            config.regimes.percent_substituicao_tributaria,
        ),
        ("regimes.percent_monofasico", config.regimes.percent_monofasico),
    ];
    for (field, value) in percentage_fields {
        check_percentage(&mut issues, field, value);
    }

    let channel_total = revenue
        .percent_internal_sales
        .saturating_add(revenue.percent_interstate_sales);
    if channel_total > HUNDRED {
        issues.push(
            ValidationIssue::new(
                "revenue",
                channel_total,
                format!("internal + interstate sales add up to {}%", channel_total),
            )
            .with_suggestion("The two sales channels together must not exceed 100%"),
        );
    }

    let purchases = &config.purchases;
    let credits = &config.icms_credits;
    let mut amount_fields = vec![
        ("revenue.gross_revenue", revenue.gross_revenue),
        ("purchases.internal_purchases", purchases.internal_purchases),
        ("purchases.interstate_purchases", purchases.interstate_purchases),
        ("purchases.cost_of_goods_sold", purchases.cost_of_goods_sold),
        ("icms_credits.opening_inventory", credits.opening_inventory),
        ("icms_credits.fixed_assets", credits.fixed_assets),
        ("icms_credits.industrial_energy", credits.industrial_energy),
        ("icms_credits.substitution_entry", credits.substitution_entry),
        ("icms_credits.other", credits.other),
        ("adjustments.additions", config.adjustments.additions),
        ("adjustments.exclusions", config.adjustments.exclusions),
    ];
    if let Some(limit) = config.irpj_surtax_monthly_limit {
        amount_fields.push(("irpj_surtax_monthly_limit", limit));
    }
    for (field, value) in amount_fields {
        check_non_negative(&mut issues, field, value);
    }

    let expenses = &config.credit_expenses;
    let bucket_fields = [
        ("credit_expenses.energy", expenses.energy),
        ("credit_expenses.rent", expenses.rent),
        ("credit_expenses.leasing", expenses.leasing),
        ("credit_expenses.freight", expenses.freight),
        ("credit_expenses.depreciation", expenses.depreciation),
        ("credit_expenses.fuel", expenses.fuel),
        ("credit_expenses.transit_voucher", expenses.transit_voucher),
    ];
    for (field, value) in bucket_fields {
        check_non_negative(&mut issues, field, value);
    }

    let mut seen_ids = HashSet::new();
    for item in &config.expenses {
        let field = format!("expenses[{}]", item.id);
        if item.value < Decimal::ZERO {
            issues.push(
                ValidationIssue::new(&field, item.value, "expense value is negative")
                    .with_suggestion("Expense values must be zero or positive"),
            );
        } else if item.value > MAX_PLAUSIBLE_AMOUNT {
            issues.push(implausible(&field, item.value));
        }
        if !seen_ids.insert(item.id.as_str()) {
            issues.push(ValidationIssue::new(
                &field,
                &item.id,
                "duplicate expense id",
            ));
        }
    }

    issues
}

fn check_percentage(issues: &mut Vec<ValidationIssue>, field: &str, value: Decimal) {
    if value < Decimal::ZERO || value > HUNDRED {
        issues.push(
            ValidationIssue::new(field, value, format!("{}% is outside 0-100", value))
                .with_suggestion("Percentages are entered as 0 to 100 (18 means 18%)"),
        );
    }
}

fn check_non_negative(issues: &mut Vec<ValidationIssue>, field: &str, value: Decimal) {
    if value < Decimal::ZERO {
        issues.push(ValidationIssue::new(field, value, "amount is negative"));
    } else if value > MAX_PLAUSIBLE_AMOUNT {
        issues.push(implausible(field, value));
    }
}

fn implausible(field: &str, value: Decimal) -> ValidationIssue {
    ValidationIssue::new(field, value, "amount is implausibly large")
        .with_suggestion("Amounts are entered in reais; results this large saturate")
}
