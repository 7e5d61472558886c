//! Tax configuration model and loading boundary
//!
//! [`TaxConfiguration`] is the fully-typed, fully-populated input every
//! engine receives. Scenario files are decoded into the lenient
//! [`ConfigInput`] shape first (every number defaults to zero whether it is
//! missing or `null`, the expense list defaults to empty, each expense record
//! is decoded on its own) and then normalized exactly once, so the engines
//! never deal with missing data.

pub mod validation;

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ConfigError;

pub use validation::{validate, ValidationIssue};

/// R$ 20.000,00 per month, the statutory IRPJ surtax limit
pub const DEFAULT_MONTHLY_SURTAX_LIMIT: Decimal = Decimal::from_parts(20_000, 0, 0, false, 0);

/// Explicit `null` reads the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fiscal period granularity of a computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl Period {
    /// Number of months covered; scales the IRPJ surtax threshold
    pub fn months(&self) -> u32 {
        match self {
            Period::Monthly => 1,
            Period::Quarterly => 3,
            Period::Annual => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Annual => "annual",
        }
    }
}

/// Destination bracket that selects the interstate ICMS rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterstateBracket {
    /// Imported goods (Resolução do Senado 13/2012)
    Imported,
    /// Destinations in the North, Northeast, Center-West and Espírito Santo
    OtherRegions,
    /// Destinations in the South and Southeast
    #[default]
    SouthSoutheast,
}

/// Interstate ICMS rate for each destination bracket, in percent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterstateRates {
    #[serde(deserialize_with = "null_as_default")]
    pub imported: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub other_regions: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub south_southeast: Decimal,
}

impl InterstateRates {
    /// 4% / 7% / 12%
    pub fn statutory() -> Self {
        Self {
            imported: Decimal::from(4),
            other_regions: Decimal::from(7),
            south_southeast: Decimal::from(12),
        }
    }

    pub fn rate_for(&self, bracket: InterstateBracket) -> Decimal {
        match bracket {
            InterstateBracket::Imported => self.imported,
            InterstateBracket::OtherRegions => self.other_regions,
            InterstateBracket::SouthSoutheast => self.south_southeast,
        }
    }
}

/// Every rate is expressed in percent (18 means 18%)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rates {
    #[serde(deserialize_with = "null_as_default")]
    pub icms_interno: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub difal: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub fcp: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub pis: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub cofins: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub irpj_base: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub irpj_surtax: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub csll: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub iss: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub icms_interstate: InterstateRates,
}

/// Gross revenue and how it splits across sales channels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueMix {
    #[serde(deserialize_with = "null_as_default")]
    pub gross_revenue: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub percent_internal_sales: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub percent_interstate_sales: Decimal,
    /// Share of interstate sales made to non-contributing final consumers (DIFAL base)
    #[serde(deserialize_with = "null_as_default")]
    pub percent_final_consumer: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub interstate_bracket: InterstateBracket,
}

/// Shares of revenue removed from the ICMS and PIS/COFINS debit bases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeReductions {
    #[serde(deserialize_with = "null_as_default")]
    pub percent_substituicao_tributaria: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub percent_monofasico: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Purchases {
    #[serde(deserialize_with = "null_as_default")]
    pub internal_purchases: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub interstate_purchases: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub cost_of_goods_sold: Decimal,
}

/// ICMS credits that arrive already computed (monetary values, not bases)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmsExtraCredits {
    #[serde(deserialize_with = "null_as_default")]
    pub opening_inventory: Decimal,
    /// CIAP installment for the period
    #[serde(deserialize_with = "null_as_default")]
    pub fixed_assets: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub industrial_energy: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub substitution_entry: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub other: Decimal,
}

/// Expense buckets that generate PIS/COFINS credits in the non-cumulative regime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditEligibleExpenses {
    #[serde(deserialize_with = "null_as_default")]
    pub energy: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub rent: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub leasing: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub freight: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub depreciation: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub fuel: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub transit_voucher: Decimal,
}

impl CreditEligibleExpenses {
    /// Buckets paired with their display label, in presentation order
    pub fn buckets(&self) -> [(&'static str, Decimal); 7] {
        [
            ("Energia elétrica", self.energy),
            ("Aluguéis", self.rent),
            ("Arrendamento mercantil", self.leasing),
            ("Fretes", self.freight),
            ("Depreciação", self.depreciation),
            ("Combustíveis", self.fuel),
            ("Vale-transporte", self.transit_voucher),
        ]
    }
}

/// Lucro Real adjustments (LALUR part A)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitAdjustments {
    #[serde(deserialize_with = "null_as_default")]
    pub additions: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub exclusions: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseClassification {
    Cost,
    OperatingExpense,
}

impl std::str::FromStr for ExpenseClassification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" | "custo" => Ok(ExpenseClassification::Cost),
            "operating_expense" | "despesa" => Ok(ExpenseClassification::OperatingExpense),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditEligibility {
    Eligible,
    #[default]
    Ineligible,
}

impl std::str::FromStr for CreditEligibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eligible" => Ok(CreditEligibility::Eligible),
            "ineligible" => Ok(CreditEligibility::Ineligible),
            _ => Err(()),
        }
    }
}

/// A user-entered expense line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseItem {
    pub id: String,
    pub description: String,
    pub value: Decimal,
    pub classification: ExpenseClassification,
    pub credit_eligibility: CreditEligibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ExpenseItem {
    pub fn is_operating_expense(&self) -> bool {
        self.classification == ExpenseClassification::OperatingExpense
    }

    pub fn is_credit_eligible(&self) -> bool {
        self.credit_eligibility == CreditEligibility::Eligible
    }

    /// Category when present, otherwise the description
    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.description)
    }
}

/// Complete, normalized input of one computation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxConfiguration {
    pub period: Period,
    /// Overrides [`DEFAULT_MONTHLY_SURTAX_LIMIT`] when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irpj_surtax_monthly_limit: Option<Decimal>,
    pub rates: Rates,
    pub revenue: RevenueMix,
    pub regimes: RegimeReductions,
    pub purchases: Purchases,
    pub icms_credits: IcmsExtraCredits,
    pub credit_expenses: CreditEligibleExpenses,
    pub adjustments: ProfitAdjustments,
    pub expenses: Vec<ExpenseItem>,
}

impl TaxConfiguration {
    /// Monthly IRPJ surtax limit in effect for this configuration
    pub fn monthly_surtax_limit(&self) -> Decimal {
        self.irpj_surtax_monthly_limit
            .unwrap_or(DEFAULT_MONTHLY_SURTAX_LIMIT)
    }

    /// Interstate ICMS rate for the configured destination bracket
    pub fn interstate_rate(&self) -> Decimal {
        self.rates
            .icms_interstate
            .rate_for(self.revenue.interstate_bracket)
    }

    /// Reference trading company used by `apuracao sample` and the docs
    pub fn sample() -> Self {
        Self {
            period: Period::Monthly,
            irpj_surtax_monthly_limit: None,
            rates: Rates {
                icms_interno: Decimal::from(18),
                difal: Decimal::from(6),
                fcp: Decimal::from(2),
                pis: Decimal::new(165, 2),
                cofins: Decimal::new(76, 1),
                irpj_base: Decimal::from(15),
                irpj_surtax: Decimal::from(10),
                csll: Decimal::from(9),
                iss: Decimal::ZERO,
                icms_interstate: InterstateRates::statutory(),
            },
            revenue: RevenueMix {
                gross_revenue: Decimal::from(1_000_000),
                percent_internal_sales: Decimal::from(70),
                percent_interstate_sales: Decimal::from(30),
                percent_final_consumer: Decimal::from(20),
                interstate_bracket: InterstateBracket::SouthSoutheast,
            },
            regimes: RegimeReductions::default(),
            purchases: Purchases {
                internal_purchases: Decimal::from(300_000),
                interstate_purchases: Decimal::from(100_000),
                cost_of_goods_sold: Decimal::from(450_000),
            },
            icms_credits: IcmsExtraCredits::default(),
            credit_expenses: CreditEligibleExpenses {
                energy: Decimal::from(8_000),
                rent: Decimal::from(15_000),
                freight: Decimal::from(12_000),
                depreciation: Decimal::from(5_000),
                ..Default::default()
            },
            adjustments: ProfitAdjustments::default(),
            expenses: vec![
                ExpenseItem {
                    id: "salarios".to_string(),
                    description: "Salários e encargos".to_string(),
                    value: Decimal::from(120_000),
                    classification: ExpenseClassification::OperatingExpense,
                    credit_eligibility: CreditEligibility::Ineligible,
                    category: Some("Pessoal".to_string()),
                },
                ExpenseItem {
                    id: "embalagens".to_string(),
                    description: "Embalagens".to_string(),
                    value: Decimal::from(10_000),
                    classification: ExpenseClassification::Cost,
                    credit_eligibility: CreditEligibility::Eligible,
                    category: Some("Insumos".to_string()),
                },
                ExpenseItem {
                    id: "marketing".to_string(),
                    description: "Marketing digital".to_string(),
                    value: Decimal::from(25_000),
                    classification: ExpenseClassification::OperatingExpense,
                    credit_eligibility: CreditEligibility::Ineligible,
                    category: None,
                },
            ],
        }
    }
}

/// Expense line as it arrives from a scenario file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpenseItemInput {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: Decimal,
    /// Parsed during normalization so an unknown value only drops this item
    pub classification: Option<String>,
    pub credit_eligibility: Option<String>,
    pub category: Option<String>,
}

/// One element of the `expenses` list; anything that is not an expense
/// record is kept as a placeholder so it can be reported and skipped
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpenseEntry {
    Item(ExpenseItemInput),
    Malformed(IgnoredAny),
}

/// Lenient, file-facing shape of [`TaxConfiguration`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigInput {
    #[serde(deserialize_with = "null_as_default")]
    pub period: Period,
    pub irpj_surtax_monthly_limit: Option<Decimal>,
    #[serde(deserialize_with = "null_as_default")]
    pub rates: Rates,
    #[serde(deserialize_with = "null_as_default")]
    pub revenue: RevenueMix,
    #[serde(deserialize_with = "null_as_default")]
    pub regimes: RegimeReductions,
    #[serde(deserialize_with = "null_as_default")]
    pub purchases: Purchases,
    #[serde(deserialize_with = "null_as_default")]
    pub icms_credits: IcmsExtraCredits,
    #[serde(deserialize_with = "null_as_default")]
    pub credit_expenses: CreditEligibleExpenses,
    #[serde(deserialize_with = "null_as_default")]
    pub adjustments: ProfitAdjustments,
    #[serde(deserialize_with = "null_as_default")]
    pub expenses: Vec<ExpenseEntry>,
}

/// Expense line dropped during normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedExpense {
    /// Position in the input list (0-indexed)
    pub index: usize,
    pub reason: String,
}

/// Output of [`ConfigInput::normalize`]
#[derive(Debug, Clone)]
pub struct Normalized {
    pub config: TaxConfiguration,
    pub skipped: Vec<SkippedExpense>,
}

impl ExpenseItemInput {
    /// Build the typed item, or explain why this record cannot be used
    fn into_item(self) -> Result<ExpenseItem, String> {
        let id = self.id.filter(|id| !id.trim().is_empty());
        let classification = self.classification.filter(|c| !c.trim().is_empty());

        let (id, classification) = match (id, classification) {
            (Some(id), Some(classification)) => (id, classification),
            (None, None) => return Err("missing id and classification".to_string()),
            (None, _) => return Err("missing id".to_string()),
            (_, None) => return Err("missing classification".to_string()),
        };

        let classification = classification
            .parse::<ExpenseClassification>()
            .map_err(|_| format!("unknown classification '{}'", classification))?;

        let credit_eligibility = match self.credit_eligibility {
            None => CreditEligibility::default(),
            Some(raw) => raw
                .parse::<CreditEligibility>()
                .map_err(|_| format!("unknown credit eligibility '{}'", raw))?,
        };

        Ok(ExpenseItem {
            id,
            description: self.description,
            value: self.value,
            classification,
            credit_eligibility,
            category: self.category,
        })
    }
}

impl ConfigInput {
    /// Turn the lenient input into a [`TaxConfiguration`].
    ///
    /// Expense records that are not usable (no id, no or unknown
    /// classification, wrong shape) are excluded from the configuration and
    /// reported in [`Normalized::skipped`]; every other field is already
    /// defaulted by serde.
    pub fn normalize(self) -> Normalized {
        let mut expenses = Vec::with_capacity(self.expenses.len());
        let mut skipped = Vec::new();

        for (index, entry) in self.expenses.into_iter().enumerate() {
            let (description, outcome) = match entry {
                ExpenseEntry::Item(item) => (item.description.clone(), item.into_item()),
                ExpenseEntry::Malformed(_) => {
                    (String::new(), Err("malformed expense record".to_string()))
                }
            };

            match outcome {
                Ok(item) => expenses.push(item),
                Err(reason) => {
                    warn!(
                        "Skipping expense #{} ('{}'): {}",
                        index + 1,
                        description,
                        reason
                    );
                    skipped.push(SkippedExpense { index, reason });
                }
            }
        }

        Normalized {
            config: TaxConfiguration {
                period: self.period,
                irpj_surtax_monthly_limit: self.irpj_surtax_monthly_limit,
                rates: self.rates,
                revenue: self.revenue,
                regimes: self.regimes,
                purchases: self.purchases,
                icms_credits: self.icms_credits,
                credit_expenses: self.credit_expenses,
                adjustments: self.adjustments,
                expenses,
            },
            skipped,
        }
    }
}

/// Decode a JSON scenario
pub fn parse_json(data: &str) -> Result<ConfigInput, ConfigError> {
    Ok(serde_json::from_str(data)?)
}

/// Decode a TOML scenario
pub fn parse_toml(data: &str) -> Result<ConfigInput, ConfigError> {
    Ok(toml::from_str(data)?)
}

/// Load and normalize a scenario file, picking the decoder by extension
pub fn load_config(path: &Path) -> Result<Normalized, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let input = match extension.as_str() {
        "json" => parse_json(&data)?,
        "toml" => parse_toml(&data)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };

    debug!(
        "Loaded {} with {} expense item(s)",
        path.display(),
        input.expenses.len()
    );

    Ok(input.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let input = parse_json("{}").unwrap();
        let normalized = input.normalize();
        assert_eq!(normalized.config, TaxConfiguration::default());
        assert!(normalized.config.expenses.is_empty());
        assert!(normalized.skipped.is_empty());
    }

    #[test]
    fn test_partial_sections_keep_other_fields_zero() {
        let input = parse_json(r#"{"rates": {"pis": 1.65}, "revenue": {"gross_revenue": 100000}}"#)
            .unwrap();
        let config = input.normalize().config;
        assert_eq!(config.rates.pis, dec!(1.65));
        assert_eq!(config.rates.cofins, Decimal::ZERO);
        assert_eq!(config.revenue.gross_revenue, dec!(100000));
        assert_eq!(config.revenue.percent_internal_sales, Decimal::ZERO);
        assert_eq!(config.period, Period::Monthly);
    }

    #[test]
    fn test_malformed_expenses_are_skipped() {
        let input = parse_json(
            r#"{"expenses": [
                {"id": "a", "description": "Aluguel loja", "value": 100, "classification": "operating_expense"},
                {"description": "sem id", "value": 50, "classification": "cost"},
                {"id": "c", "description": "sem classificação", "value": 70},
                {"id": "  ", "description": "id vazio", "value": 10}
            ]}"#,
        )
        .unwrap();
        let normalized = input.normalize();

        assert_eq!(normalized.config.expenses.len(), 1);
        assert_eq!(normalized.config.expenses[0].id, "a");
        assert_eq!(
            normalized.config.expenses[0].credit_eligibility,
            CreditEligibility::Ineligible
        );

        let reasons: Vec<_> = normalized
            .skipped
            .iter()
            .map(|s| (s.index, s.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, "missing id"),
                (2, "missing classification"),
                (3, "missing id and classification"),
            ]
        );
    }

    #[test]
    fn test_toml_scenario() {
        let input = parse_toml(
            r#"
            period = "quarterly"

            [rates]
            icms_interno = 18
            pis = 1.65

            [revenue]
            gross_revenue = 250000
            interstate_bracket = "other_regions"

            [[expenses]]
            id = "frete"
            description = "Frete sobre vendas"
            value = 3000
            classification = "operating_expense"
            credit_eligibility = "eligible"
            "#,
        )
        .unwrap();
        let config = input.normalize().config;
        assert_eq!(config.period, Period::Quarterly);
        assert_eq!(config.rates.pis, dec!(1.65));
        assert_eq!(config.revenue.interstate_bracket, InterstateBracket::OtherRegions);
        assert_eq!(config.expenses.len(), 1);
        assert!(config.expenses[0].is_credit_eligible());
    }

    #[test]
    fn test_period_months() {
        assert_eq!(Period::Monthly.months(), 1);
        assert_eq!(Period::Quarterly.months(), 3);
        assert_eq!(Period::Annual.months(), 12);
    }

    #[test]
    fn test_surtax_limit_override() {
        let mut config = TaxConfiguration::default();
        assert_eq!(config.monthly_surtax_limit(), dec!(20000));
        config.irpj_surtax_monthly_limit = Some(dec!(25000));
        assert_eq!(config.monthly_surtax_limit(), dec!(25000));
    }

    #[test]
    fn test_interstate_rate_follows_bracket() {
        let mut config = TaxConfiguration::sample();
        assert_eq!(config.interstate_rate(), dec!(12));
        config.revenue.interstate_bracket = InterstateBracket::Imported;
        assert_eq!(config.interstate_rate(), dec!(4));
    }

    #[test]
    fn test_sample_survives_serialization() {
        let sample = TaxConfiguration::sample();
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(parse_json(&json).unwrap().normalize().config, sample);

        let toml_text = toml::to_string_pretty(&sample).unwrap();
        assert_eq!(parse_toml(&toml_text).unwrap().normalize().config, sample);
    }

    #[test]
    fn test_load_config_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"revenue": {{"gross_revenue": 42}}}}"#).unwrap();
        let normalized = load_config(file.path()).unwrap();
        assert_eq!(normalized.config.revenue.gross_revenue, dec!(42));

        let other = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = load_config(other.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }

    #[test]
    fn test_unknown_classification_only_drops_that_item() {
        let input = parse_json(
            r#"{"expenses": [
                {"id": "a", "description": "Aluguel", "value": 100, "classification": "operating_expense"},
                {"id": "b", "description": "Máquina", "value": 900, "classification": "capex"},
                {"id": "c", "description": "Frete", "value": 40, "classification": "cost", "credit_eligibility": "maybe"},
                {"id": "d", "description": "Insumo", "value": 60, "classification": "Custo"}
            ]}"#,
        )
        .unwrap();
        let normalized = input.normalize();

        let ids: Vec<_> = normalized.config.expenses.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(
            normalized.config.expenses[1].classification,
            ExpenseClassification::Cost
        );
        assert_eq!(
            normalized.skipped,
            vec![
                SkippedExpense {
                    index: 1,
                    reason: "unknown classification 'capex'".to_string(),
                },
                SkippedExpense {
                    index: 2,
                    reason: "unknown credit eligibility 'maybe'".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_null_values_read_as_zero() {
        let input = parse_json(
            r#"{
                "rates": {"icms_interno": 18, "fcp": null},
                "purchases": null,
                "expenses": [
                    {"id": "a", "description": null, "value": null, "classification": "cost"}
                ]
            }"#,
        )
        .unwrap();
        let normalized = input.normalize();

        assert_eq!(normalized.config.rates.icms_interno, dec!(18));
        assert_eq!(normalized.config.rates.fcp, Decimal::ZERO);
        assert_eq!(normalized.config.purchases, Purchases::default());
        assert_eq!(normalized.config.expenses.len(), 1);
        assert_eq!(normalized.config.expenses[0].value, Decimal::ZERO);
        assert!(normalized.skipped.is_empty());
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let input = parse_json(
            r#"{
                "revenue": {"gross_revenue": 1000},
                "expenses": [
                    42,
                    {"id": "b", "value": "not a number", "classification": "cost"},
                    {"id": "c", "value": 10, "classification": "cost"}
                ]
            }"#,
        )
        .unwrap();
        let normalized = input.normalize();

        assert_eq!(normalized.config.revenue.gross_revenue, dec!(1000));
        assert_eq!(normalized.config.expenses.len(), 1);
        assert_eq!(normalized.config.expenses[0].id, "c");
        let reasons: Vec<_> = normalized
            .skipped
            .iter()
            .map(|s| (s.index, s.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![(0, "malformed expense record"), (1, "malformed expense record")]
        );
    }
}
