use crate::error::CpmError;
use crate::task::DEFAULT_HOURS_PER_DAY;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Thresholds used to classify a project's risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// More overrunning tasks than this is high risk.
    pub high_overrun_count: usize,
    /// More overrunning tasks than this is medium risk.
    pub medium_overrun_count: usize,
    /// Any overrun while critical completion sits below this percentage is medium risk.
    pub min_critical_completion_pct: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_overrun_count: 3,
            medium_overrun_count: 1,
            min_critical_completion_pct: 50.0,
        }
    }
}

/// Where the backward pass pins tasks that nothing depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkAnchor {
    /// Each sink finishes no later than its own earliest finish.
    #[default]
    OwnFinish,
    /// Every sink may slide up to the overall project duration.
    ProjectFinish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub hours_per_day: f64,
    pub sink_anchor: SinkAnchor,
    pub risk: RiskThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            sink_anchor: SinkAnchor::default(),
            risk: RiskThresholds::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), CpmError> {
        if !self.hours_per_day.is_finite() || self.hours_per_day <= 0.0 {
            return Err(CpmError::InvalidConfig(format!(
                "hours_per_day must be positive (got {})",
                self.hours_per_day
            )));
        }
        let pct = self.risk.min_critical_completion_pct;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(CpmError::InvalidConfig(format!(
                "min_critical_completion_pct must be between 0 and 100 (got {pct})"
            )));
        }
        if self.risk.medium_overrun_count > self.risk.high_overrun_count {
            return Err(CpmError::InvalidConfig(
                "medium_overrun_count must not exceed high_overrun_count".into(),
            ));
        }
        Ok(())
    }

    /// Reads a JSON config file. Missing fields fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CpmError> {
        let file = File::open(path.as_ref()).map_err(|err| {
            CpmError::InvalidConfig(format!(
                "cannot open {}: {err}",
                path.as_ref().display()
            ))
        })?;
        let config: AnalyzerConfig = serde_json::from_reader(file)
            .map_err(|err| CpmError::InvalidConfig(format!("invalid config json: {err}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hours_per_day": 6}}"#).unwrap();
        let config = AnalyzerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.hours_per_day, 6.0);
        assert_eq!(config.sink_anchor, SinkAnchor::OwnFinish);
        assert_eq!(config.risk, RiskThresholds::default());
    }

    #[test]
    fn sink_anchor_reads_snake_case() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{"sink_anchor": "project_finish"}"#).unwrap();
        assert_eq!(config.sink_anchor, SinkAnchor::ProjectFinish);
        assert_eq!(config.hours_per_day, 8.0);
    }

    #[test]
    fn zero_hours_per_day_is_rejected() {
        let config = AnalyzerConfig {
            hours_per_day: 0.0,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(config.validate(), Err(CpmError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_overrun_thresholds_are_rejected() {
        let mut config = AnalyzerConfig::default();
        config.risk.medium_overrun_count = 5;
        assert!(config.validate().is_err());
    }
}
