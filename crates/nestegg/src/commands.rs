//! Subcommand execution
//!
//! Every command reads a `HouseholdInput` JSON document and produces a JSON
//! value. Engine failures are part of the output, not CLI errors, so callers
//! always receive a response envelope.

use std::fs;
use std::io::Read;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use nestegg_core::model::{HouseholdInput, MarketProfiles, MonteCarloConfig, SimulationResponse};
use nestegg_core::{WhatIfAdjustments, compare_what_if, monte_carlo_simulate, simulate};
use nestegg_core::what_if::simulate_what_if;
use serde_json::{Value, json};

use crate::cli::Command;

/// JSON produced by a command, and whether the engine succeeded
#[derive(Debug)]
pub struct CommandOutput {
    pub value: Value,
    pub success: bool,
}

impl CommandOutput {
    fn ok(value: Value) -> Self {
        Self {
            value,
            success: true,
        }
    }

    fn from_response(response: &SimulationResponse) -> Result<Self> {
        Ok(Self {
            value: serde_json::to_value(response)?,
            success: response.success,
        })
    }

    fn failure(err: &nestegg_core::SimulationError) -> Self {
        Self {
            value: json!({
                "success": false,
                "error": err.to_string(),
                "error_details": err.details(),
            }),
            success: false,
        }
    }
}

/// Read a JSON document from `path`, or from stdin when `path` is `-`
pub fn read_json(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .wrap_err("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

pub fn load_input(path: &Path) -> Result<HouseholdInput> {
    let text = read_json(path)?;
    let input: HouseholdInput = serde_json::from_str(&text)
        .wrap_err_with(|| format!("{} is not a valid household document", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        couple = input.is_couple(),
        strategy = %input.strategy,
        "loaded household"
    );
    Ok(input)
}

fn load_profiles(path: Option<&Path>) -> Result<MarketProfiles> {
    match path {
        Some(path) => {
            let text = read_json(path)?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("{} is not a valid profile document", path.display()))
        }
        None => Ok(MarketProfiles::default()),
    }
}

pub fn execute(command: &Command) -> Result<CommandOutput> {
    match command {
        Command::Simulate { input } => {
            let input = load_input(input)?;
            CommandOutput::from_response(&simulate(&input))
        }
        Command::Validate { input } => {
            let input = load_input(input)?;
            Ok(match input.validate() {
                Ok(()) => CommandOutput::ok(json!({ "valid": true })),
                Err(errors) => CommandOutput {
                    value: json!({ "valid": false, "errors": errors.0 }),
                    success: false,
                },
            })
        }
        Command::WhatIf {
            input,
            adjustments,
            compare,
        } => {
            let input = load_input(input)?;
            let adjustments = WhatIfAdjustments::from(*adjustments);
            if !compare {
                return CommandOutput::from_response(&simulate_what_if(&input, &adjustments));
            }
            Ok(match compare_what_if(&input, &adjustments) {
                Ok(comparison) => CommandOutput::ok(serde_json::to_value(&comparison)?),
                Err(err) => CommandOutput::failure(&err),
            })
        }
        Command::MonteCarlo {
            input,
            trials,
            seed,
            profiles,
            summary_only,
        } => {
            let input = load_input(input)?;
            let config = MonteCarloConfig {
                trials: *trials,
                seed: *seed,
                profiles: load_profiles(profiles.as_deref())?,
            };
            Ok(match monte_carlo_simulate(&input, &config) {
                Ok(mut summary) => {
                    if *summary_only {
                        summary.outcomes.clear();
                    }
                    CommandOutput::ok(serde_json::to_value(&summary)?)
                }
                Err(err) => CommandOutput::failure(&err),
            })
        }
    }
}

/// Write `value` to `path`, or stdout when no path is given
pub fn write_output(value: &Value, pretty: bool, path: Option<&Path>) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match path {
        Some(path) => fs::write(path, text + "\n")
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::cli::AdjustmentArgs;

    const HOUSEHOLD: &str = r#"{
        "person1": {
            "start_age": 65,
            "cpp_annual_at_start": 10000,
            "oas_annual_at_start": 8000,
            "rrif_balance": 100000,
            "pension_incomes": [{ "name": "Employer", "amount": 24000, "start_age": 65 }]
        },
        "start_year": 2025,
        "spending_go_go": 60000
    }"#;

    fn household_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn path(file: &NamedTempFile) -> PathBuf {
        file.path().to_path_buf()
    }

    #[test]
    fn simulate_emits_response_envelope() {
        let file = household_file(HOUSEHOLD);
        let out = execute(&Command::Simulate { input: path(&file) }).unwrap();

        assert!(out.success);
        assert_eq!(out.value["success"], true);
        assert_eq!(out.value["year_by_year"].as_array().unwrap().len(), 31);
        assert_eq!(out.value["year_by_year"][0]["person1"]["pension"], 24000.0);
    }

    #[test]
    fn validation_failure_is_reported_in_output() {
        let file = household_file(r#"{ "person1": { "start_age": 65 }, "spending_go_go": -5 }"#);
        let out = execute(&Command::Simulate { input: path(&file) }).unwrap();

        assert!(!out.success);
        assert_eq!(out.value["error_details"]["code"], "VALIDATION_ERROR");

        let out = execute(&Command::Validate { input: path(&file) }).unwrap();
        assert_eq!(out.value["valid"], false);
        assert_eq!(out.value["errors"][0]["field"], "spending_go_go");
    }

    #[test]
    fn unknown_fields_are_cli_errors() {
        let file = household_file(r#"{ "person1": { "start_age": 65, "rrsp": 1 } }"#);
        assert!(execute(&Command::Simulate { input: path(&file) }).is_err());
    }

    #[test]
    fn what_if_compare_includes_diff() {
        let file = household_file(HOUSEHOLD);
        let command = Command::WhatIf {
            input: path(&file),
            adjustments: AdjustmentArgs {
                spending_multiplier: 1.2,
                retirement_age_shift: 0,
                cpp_start_age_shift: 0,
                oas_start_age_shift: 0,
            },
            compare: true,
        };
        let out = execute(&command).unwrap();

        assert!(out.success);
        assert_eq!(out.value["adjusted"]["years"][0]["spending_need"], 72000.0);
        assert!(out.value["diff"]["total_shortfall"].as_f64().unwrap() >= 0.0);
    }

    #[test]
    fn monte_carlo_summary_only_drops_outcomes() {
        let file = household_file(HOUSEHOLD);
        let command = Command::MonteCarlo {
            input: path(&file),
            trials: 12,
            seed: 5,
            profiles: None,
            summary_only: true,
        };
        let out = execute(&command).unwrap();

        assert!(out.success);
        assert_eq!(out.value["trials"], 12);
        assert!(out.value["outcomes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn output_is_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");
        write_output(&json!({ "ok": true }), true, Some(&target)).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(written["ok"], true);
    }
}
