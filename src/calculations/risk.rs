use super::CpmNode;
use crate::config::RiskThresholds;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive schedule-health figures layered over a CPM result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub critical_task_count: usize,
    pub critical_completed_count: usize,
    pub critical_completion_pct: f64,
    /// Tasks whose actual hours exceed the estimate by more than 10%.
    pub overrun_count: usize,
    pub risk_level: RiskLevel,
}

impl RiskMetrics {
    /// `nodes` must be aligned with `tasks` by position.
    pub fn compute(tasks: &[Task], nodes: &[CpmNode], thresholds: &RiskThresholds) -> Self {
        let mut critical_task_count = 0usize;
        let mut critical_completed_count = 0usize;
        for (task, node) in tasks.iter().zip(nodes) {
            if node.is_critical {
                critical_task_count += 1;
                if task.status.is_completed() {
                    critical_completed_count += 1;
                }
            }
        }

        let critical_completion_pct = if critical_task_count == 0 {
            0.0
        } else {
            critical_completed_count as f64 * 100.0 / critical_task_count as f64
        };

        let overrun_count = tasks.iter().filter(|task| task.is_over_estimate()).count();

        let risk_level = classify(
            overrun_count,
            critical_task_count,
            critical_completion_pct,
            thresholds,
        );

        Self {
            critical_task_count,
            critical_completed_count,
            critical_completion_pct,
            overrun_count,
            risk_level,
        }
    }
}

fn classify(
    overrun_count: usize,
    critical_task_count: usize,
    critical_completion_pct: f64,
    thresholds: &RiskThresholds,
) -> RiskLevel {
    if overrun_count > thresholds.high_overrun_count {
        return RiskLevel::High;
    }
    let lagging = critical_task_count > 0
        && critical_completion_pct < thresholds.min_critical_completion_pct;
    if overrun_count > thresholds.medium_overrun_count || (overrun_count > 0 && lagging) {
        return RiskLevel::Medium;
    }
    RiskLevel::Low
}
