//! File-based configuration loaders
//!
//! Engine configuration is read from JSON; stress libraries can also be kept
//! as CSV so analysts can edit them in a spreadsheet.

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context};

use super::stress::{ParameterOverrides, Severity, StressLibrary, StressTestScenario};
use super::EngineConfig;

/// Raw CSV row for a stress scenario
///
/// Columns: name, description, annual_return_rate, inflation_rate,
/// monthly_contribution, contribution_growth_rate, probability, severity.
/// Empty rate cells keep the base value.
#[derive(Debug, serde::Deserialize)]
struct StressRow {
    name: String,
    description: String,
    annual_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    #[serde(default)]
    monthly_contribution: Option<f64>,
    #[serde(default)]
    contribution_growth_rate: Option<f64>,
    probability: f64,
    severity: String,
}

impl StressRow {
    fn into_scenario(self) -> anyhow::Result<StressTestScenario> {
        let severity: Severity = self.severity.parse().map_err(anyhow::Error::msg)?;
        if !(0.0..=100.0).contains(&self.probability) {
            bail!("probability {} for '{}' is outside 0-100", self.probability, self.name);
        }

        Ok(StressTestScenario {
            name: self.name,
            description: self.description,
            overrides: ParameterOverrides {
                annual_return_rate: self.annual_return_rate,
                inflation_rate: self.inflation_rate,
                monthly_contribution: self.monthly_contribution,
                contribution_growth_rate: self.contribution_growth_rate,
            },
            probability: self.probability,
            severity,
        })
    }
}

/// Load a stress library from a CSV file
pub fn load_stress_library(path: &Path) -> anyhow::Result<StressLibrary> {
    let file = File::open(path)
        .with_context(|| format!("opening stress library {}", path.display()))?;
    read_stress_library(file).with_context(|| format!("parsing {}", path.display()))
}

/// Parse a stress library from any CSV reader
pub fn read_stress_library<R: std::io::Read>(reader: R) -> anyhow::Result<StressLibrary> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut scenarios = Vec::new();

    for result in reader.deserialize() {
        let row: StressRow = result?;
        scenarios.push(row.into_scenario()?);
    }

    if scenarios.is_empty() {
        bail!("stress library contains no scenarios");
    }

    Ok(StressLibrary { scenarios })
}

/// Load engine configuration from a JSON file; omitted sections keep defaults
pub fn load_engine_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading engine config {}", path.display()))?;
    parse_engine_config(&raw).with_context(|| format!("parsing engine config {}", path.display()))
}

/// Parse and validate engine configuration JSON
pub fn parse_engine_config(raw: &str) -> anyhow::Result<EngineConfig> {
    let config: EngineConfig = serde_json::from_str(raw)?;
    config.adjuster.validate()?;
    Ok(config)
}
