//! Persistence sinks for analysis results

use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::projection::ProjectionResult;
use crate::risk::{MonteCarloResult, SensitivityAnalysis};

/// Row key for a stored result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisKey {
    pub goal_id: String,
    pub scenario_name: String,
    pub analysis_date: NaiveDate,
}

impl AnalysisKey {
    pub fn new(goal_id: &str, scenario_name: &str, analysis_date: NaiveDate) -> Self {
        Self {
            goal_id: goal_id.to_string(),
            scenario_name: scenario_name.to_string(),
            analysis_date,
        }
    }
}

/// Consumer of analysis results
pub trait ProjectionSink {
    fn store_projection(&mut self, key: &AnalysisKey, result: &ProjectionResult) -> anyhow::Result<()>;
    fn store_sensitivity(&mut self, key: &AnalysisKey, analysis: &SensitivityAnalysis) -> anyhow::Result<()>;
    fn store_monte_carlo(&mut self, key: &AnalysisKey, result: &MonteCarloResult) -> anyhow::Result<()>;
}

/// Keeps everything in memory; used by tests and the CLI
#[derive(Debug, Default)]
pub struct MemorySink {
    pub projections: Vec<(AnalysisKey, ProjectionResult)>,
    pub sensitivities: Vec<(AnalysisKey, SensitivityAnalysis)>,
    pub monte_carlo: Vec<(AnalysisKey, MonteCarloResult)>,
}

impl ProjectionSink for MemorySink {
    fn store_projection(&mut self, key: &AnalysisKey, result: &ProjectionResult) -> anyhow::Result<()> {
        self.projections.push((key.clone(), result.clone()));
        Ok(())
    }

    fn store_sensitivity(&mut self, key: &AnalysisKey, analysis: &SensitivityAnalysis) -> anyhow::Result<()> {
        self.sensitivities.push((key.clone(), analysis.clone()));
        Ok(())
    }

    fn store_monte_carlo(&mut self, key: &AnalysisKey, result: &MonteCarloResult) -> anyhow::Result<()> {
        self.monte_carlo.push((key.clone(), result.clone()));
        Ok(())
    }
}

#[derive(Serialize)]
struct Record<'a, T: Serialize> {
    kind: &'static str,
    #[serde(flatten)]
    key: &'a AnalysisKey,
    payload: &'a T,
}

/// Writes one JSON object per stored result
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write<T: Serialize>(&mut self, kind: &'static str, key: &AnalysisKey, payload: &T) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, &Record { kind, key, payload })
            .with_context(|| format!("Failed to serialize {} for {}/{}", kind, key.goal_id, key.scenario_name))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ProjectionSink for JsonLinesSink<W> {
    fn store_projection(&mut self, key: &AnalysisKey, result: &ProjectionResult) -> anyhow::Result<()> {
        self.write("projection", key, result)
    }

    fn store_sensitivity(&mut self, key: &AnalysisKey, analysis: &SensitivityAnalysis) -> anyhow::Result<()> {
        self.write("sensitivity", key, analysis)
    }

    fn store_monte_carlo(&mut self, key: &AnalysisKey, result: &MonteCarloResult) -> anyhow::Result<()> {
        self.write("monte_carlo", key, result)
    }
}
