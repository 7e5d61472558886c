//! Output formatting module for CLI display
//!
//! Terminal tables and JSON documents for the engine results. Nothing here
//! computes a figure; everything comes from the engines and reports.

use apuracao::config::{SkippedExpense, ValidationIssue};
use apuracao::reports::{DreResult, TaxBurden};
use apuracao::tax::{EngineResult, IncomeTaxResult, TaxComputation};
use apuracao::utils::{format_brl, format_percent};
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

fn signed_brl(value: Decimal) -> String {
    if value < Decimal::ZERO {
        format_brl(value).red().to_string()
    } else {
        format_brl(value)
    }
}

/// Debit/credit table of one engine followed by its settlement
pub fn format_engine_table(result: &dyn EngineResult) -> String {
    #[derive(Tabled)]
    struct LedgerRow {
        #[tabled(rename = "Tipo")]
        kind: &'static str,
        #[tabled(rename = "Descrição")]
        label: String,
        #[tabled(rename = "Base")]
        base: String,
        #[tabled(rename = "Alíquota")]
        rate: String,
        #[tabled(rename = "Valor")]
        value: String,
    }

    let debit_rows = result.debit_rows().into_iter().map(|row| (row, "Débito"));
    let credit_rows = result.credit_rows().into_iter().map(|row| (row, "Crédito"));

    let rows: Vec<LedgerRow> = debit_rows
        .chain(credit_rows)
        .map(|(row, kind)| LedgerRow {
            kind,
            label: row.label.clone(),
            base: format_brl(row.base),
            rate: format_percent(row.rate),
            value: format_brl(row.value),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(2..), Alignment::right());

    let settlement = result.settlement();
    let mut output = format!("\n{} {}\n\n", "■".cyan().bold(), result.tax_name().bold());
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n{:<20} {}",
        "Total débitos:",
        format_brl(settlement.total_debits)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Total créditos:",
        format_brl(settlement.total_credits)
    ));
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "A recolher:",
        format_brl(settlement.amount_payable).bold()
    ));
    output
}

/// Step-by-step Lucro Real computation
pub fn format_income_tax_table(result: &IncomeTaxResult) -> String {
    #[derive(Tabled)]
    struct StepRow {
        #[tabled(rename = "Etapa")]
        step: String,
        #[tabled(rename = "Valor")]
        value: String,
    }

    let steps = [
        ("(-) ICMS a recolher", result.icms_payable),
        ("(-) PIS a recolher", result.pis_payable),
        ("(-) COFINS a recolher", result.cofins_payable),
        ("(-) ISS", result.iss_payable),
        ("Total de deduções", result.total_deductions),
        ("Receita líquida", result.net_revenue),
        ("Lucro bruto", result.gross_profit),
        ("(-) Despesas operacionais", result.operating_expenses_total),
        ("Lucro antes dos tributos", result.profit_before_tax),
        ("Lucro real", result.taxable_profit),
        ("Limite do adicional", result.threshold),
    ];

    let mut rows: Vec<StepRow> = steps
        .into_iter()
        .map(|(step, value)| StepRow {
            step: step.to_string(),
            value: signed_brl(value),
        })
        .collect();

    for line in [&result.irpj_base, &result.irpj_surtax, &result.csll] {
        rows.push(StepRow {
            step: format!(
                "{} ({} de {})",
                line.label,
                format_percent(line.rate),
                format_brl(line.base)
            ),
            value: signed_brl(line.value),
        });
    }
    rows.push(StepRow {
        step: "Total IRPJ + CSLL".to_string(),
        value: signed_brl(result.total_income_tax),
    });

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "\n{} {}\n\n{}\n",
        "■".cyan().bold(),
        "IRPJ / CSLL (Lucro Real)".bold(),
        table
    )
}

/// Income statement
pub fn format_dre_table(dre: &DreResult) -> String {
    #[derive(Tabled)]
    struct DreRow {
        #[tabled(rename = "Conta")]
        account: &'static str,
        #[tabled(rename = "Valor")]
        value: String,
        #[tabled(rename = "% Receita")]
        share: String,
    }

    let lines = [
        ("Receita bruta", dre.gross_revenue),
        ("(-) ICMS", dre.deductions.icms),
        ("(-) PIS", dre.deductions.pis),
        ("(-) COFINS", dre.deductions.cofins),
        ("(-) ISS", dre.deductions.iss),
        ("Receita líquida", dre.net_revenue),
        ("(-) CMV", dre.cogs),
        ("Lucro bruto", dre.gross_profit),
        ("(-) Despesas operacionais", dre.operating_expenses),
        ("Lucro antes do IR/CSLL", dre.profit_before_tax),
        ("(-) IRPJ", dre.income_taxes.irpj),
        ("(-) CSLL", dre.income_taxes.csll),
        ("Lucro líquido", dre.net_profit),
    ];

    let rows: Vec<DreRow> = lines
        .into_iter()
        .map(|(account, value)| DreRow {
            account,
            value: signed_brl(value),
            share: format_percent(apuracao::reports::dre::margin(value, dre.gross_revenue)),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    let mut output = format!("\n{} {}\n\n", "■".cyan().bold(), "DRE".bold());
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n{:<20} {}",
        "Margem bruta:",
        format_percent(dre.gross_margin)
    ));
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Margem líquida:",
        format_percent(dre.net_margin)
    ));
    output
}

/// Tax burden per tax and effective rate
pub fn format_burden_table(burden: &TaxBurden) -> String {
    #[derive(Tabled)]
    struct ShareRow {
        #[tabled(rename = "Tributo")]
        tax: &'static str,
        #[tabled(rename = "Valor")]
        amount: String,
        #[tabled(rename = "% Receita")]
        share: String,
    }

    let rows: Vec<ShareRow> = burden
        .shares
        .iter()
        .map(|share| ShareRow {
            tax: share.tax,
            amount: signed_brl(share.amount),
            share: format_percent(share.share_of_revenue),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "\n{} {}\n\n{}\n{:<20} {} ({})\n",
        "■".cyan().bold(),
        "Carga tributária".bold(),
        table,
        "Total:",
        format_brl(burden.total).bold(),
        format_percent(burden.effective_rate)
    )
}

/// Full terminal report for `calculate`
pub fn format_computation(computation: &TaxComputation, burden: &TaxBurden) -> String {
    let mut output = String::new();
    output.push_str(&format_engine_table(&computation.icms));
    if computation.icms.carryover_credit > Decimal::ZERO {
        output.push_str(&format!(
            "{:<20} {}\n",
            "Saldo credor:",
            format_brl(computation.icms.carryover_credit).green()
        ));
    }
    output.push_str(&format_engine_table(&computation.pis_cofins.pis));
    output.push_str(&format_engine_table(&computation.pis_cofins.cofins));
    output.push_str(&format_income_tax_table(&computation.income_taxes));
    output.push_str(&format_dre_table(&computation.dre));
    output.push_str(&format_burden_table(burden));
    output
}

/// JSON document for `calculate --json`
pub fn format_computation_json(
    computation: &TaxComputation,
    burden: &TaxBurden,
    issues: &[ValidationIssue],
    skipped: &[SkippedExpense],
) -> String {
    #[derive(Serialize)]
    struct JsonIssue<'a> {
        field: &'a str,
        value: &'a str,
        reason: &'a str,
    }

    #[derive(Serialize)]
    struct JsonSkipped<'a> {
        index: usize,
        reason: &'a str,
    }

    #[derive(Serialize)]
    struct JsonReport<'a> {
        #[serde(flatten)]
        computation: &'a TaxComputation,
        burden: &'a TaxBurden,
        issues: Vec<JsonIssue<'a>>,
        skipped_expenses: Vec<JsonSkipped<'a>>,
    }

    let report = JsonReport {
        computation,
        burden,
        issues: issues
            .iter()
            .map(|issue| JsonIssue {
                field: &issue.field,
                value: &issue.value,
                reason: &issue.reason,
            })
            .collect(),
        skipped_expenses: skipped
            .iter()
            .map(|skip| JsonSkipped {
                index: skip.index,
                reason: &skip.reason,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Generic JSON rendering for single results (`dre --json`)
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Warnings printed before a report
pub fn format_issues(issues: &[ValidationIssue], skipped: &[SkippedExpense]) -> String {
    let mut output = String::new();
    for skip in skipped {
        output.push_str(&format!(
            "{} Expense #{} ignored: {}\n",
            "⚠".yellow().bold(),
            skip.index + 1,
            skip.reason
        ));
    }
    for issue in issues {
        output.push_str(&format!(
            "{} {}: {}\n",
            "⚠".yellow().bold(),
            issue.field.bold(),
            issue.reason
        ));
        if let Some(ref suggestion) = issue.suggestion {
            output.push_str(&format!("    {}\n", suggestion.bright_black()));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use apuracao::config::TaxConfiguration;
    use apuracao::reports::summarize_burden;
    use apuracao::tax::compute;

    fn sample() -> (TaxComputation, TaxBurden) {
        colored::control::set_override(false);
        let computation = compute(&TaxConfiguration::sample());
        let burden = summarize_burden(&computation);
        (computation, burden)
    }

    #[test]
    fn test_engine_table_lists_rows_and_total() {
        let (computation, _) = sample();
        let output = format_engine_table(&computation.icms);
        assert!(output.contains("ICMS"));
        assert!(output.contains("Vendas internas"));
        assert!(output.contains("R$ 126.000,00"));
        assert!(output.contains("R$ 100.800,00"));
    }

    #[test]
    fn test_dre_table() {
        let (computation, _) = sample();
        let output = format_dre_table(&computation.dre);
        assert!(output.contains("Lucro líquido"));
        assert!(output.contains("R$ 169.194,50"));
        assert!(output.contains("39,83%"));
    }

    #[test]
    fn test_full_report_sections() {
        let (computation, burden) = sample();
        let output = format_computation(&computation, &burden);
        for section in ["ICMS", "PIS", "COFINS", "IRPJ / CSLL", "DRE", "Carga tributária"] {
            assert!(output.contains(section), "missing section {}", section);
        }
    }

    #[test]
    fn test_json_report_is_valid() {
        let (computation, burden) = sample();
        let issues = vec![ValidationIssue::new("rates.pis", "-1", "negative")];
        let text = format_computation_json(&computation, &burden, &issues, &[]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let decimal_at = |v: &serde_json::Value| v.as_str().unwrap().parse::<Decimal>().unwrap();
        assert_eq!(decimal_at(&value["dre"]["net_profit"]), Decimal::new(1691945, 1));
        assert_eq!(
            decimal_at(&value["icms"]["debits"]["internal_sales"]["value"]),
            Decimal::from(126000)
        );
        assert_eq!(value["issues"][0]["field"], "rates.pis");
        assert!(value["skipped_expenses"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_issue_listing() {
        colored::control::set_override(false);
        let issues = vec![ValidationIssue::new("revenue", "110", "too much")
            .with_suggestion("lower it")];
        let skipped = vec![SkippedExpense {
            index: 2,
            reason: "missing id".to_string(),
        }];
        let output = format_issues(&issues, &skipped);
        assert!(output.contains("Expense #3 ignored: missing id"));
        assert!(output.contains("revenue: too much"));
        assert!(output.contains("lower it"));
    }
}
