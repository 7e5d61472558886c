//! Command dispatcher that routes parsed clap commands to their handlers.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::info;

use crate::cli::{formatters, Commands, SampleFormat};
use apuracao::config::{self, Normalized, TaxConfiguration};
use apuracao::reports::summarize_burden;
use apuracao::tax::compute;

/// Route a parsed command to its handler
pub fn dispatch_command(command: &Commands, json_output: bool) -> Result<()> {
    match command {
        Commands::Calculate { file } => dispatch_calculate(file, json_output),
        Commands::Dre { file } => dispatch_dre(file, json_output),
        Commands::Validate { file } => dispatch_validate(file, json_output),
        Commands::Sample { format } => dispatch_sample(*format),
    }
}

fn load(file: &Path) -> Result<Normalized> {
    info!("Loading scenario from {}", file.display());
    config::load_config(file).with_context(|| format!("failed to load scenario {}", file.display()))
}

fn dispatch_calculate(file: &Path, json_output: bool) -> Result<()> {
    let Normalized { config, skipped } = load(file)?;
    let issues = config::validate(&config);

    info!(
        "Computing {} period with {} expense item(s)",
        config.period.as_str(),
        config.expenses.len()
    );
    let computation = compute(&config);
    let burden = summarize_burden(&computation);

    if json_output {
        println!(
            "{}",
            formatters::format_computation_json(&computation, &burden, &issues, &skipped)
        );
    } else {
        eprint!("{}", formatters::format_issues(&issues, &skipped));
        println!("{}", formatters::format_computation(&computation, &burden));
    }

    Ok(())
}

fn dispatch_dre(file: &Path, json_output: bool) -> Result<()> {
    let Normalized { config, skipped } = load(file)?;
    let issues = config::validate(&config);
    let dre = compute(&config).dre;

    if json_output {
        println!("{}", formatters::format_json(&dre));
    } else {
        eprint!("{}", formatters::format_issues(&issues, &skipped));
        println!("{}", formatters::format_dre_table(&dre));
    }

    Ok(())
}

fn dispatch_validate(file: &Path, json_output: bool) -> Result<()> {
    let Normalized { config, skipped } = load(file)?;
    let issues = config::validate(&config);
    let problems = issues.len() + skipped.len();

    if json_output {
        #[derive(serde::Serialize)]
        struct JsonValidation {
            valid: bool,
            issues: Vec<String>,
        }
        let report = JsonValidation {
            valid: problems == 0,
            issues: skipped
                .iter()
                .map(|skip| format!("expenses[{}]: {}", skip.index, skip.reason))
                .chain(
                    issues
                        .iter()
                        .map(|issue| format!("{}: {}", issue.field, issue.reason)),
                )
                .collect(),
        };
        println!("{}", formatters::format_json(&report));
    } else if problems == 0 {
        println!("{} {} is valid", "✓".green().bold(), file.display());
    } else {
        print!("{}", formatters::format_issues(&issues, &skipped));
    }

    if problems > 0 {
        bail!("{} validation issue(s) found in {}", problems, file.display());
    }
    Ok(())
}

fn dispatch_sample(format: SampleFormat) -> Result<()> {
    let sample = TaxConfiguration::sample();
    let text = match format {
        SampleFormat::Json => {
            serde_json::to_string_pretty(&sample).context("failed to render sample as JSON")?
        }
        SampleFormat::Toml => {
            toml::to_string_pretty(&sample).context("failed to render sample as TOML")?
        }
    };
    println!("{}", text);
    Ok(())
}
