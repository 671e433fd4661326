use crate::config::SinkAnchor;
use crate::error::CpmError;
use crate::graph::TaskDag;

pub struct BackwardPass<'a> {
    dag: &'a TaskDag,
    durations: &'a [i64],
    anchor: SinkAnchor,
}

impl<'a> BackwardPass<'a> {
    pub fn new(dag: &'a TaskDag, durations: &'a [i64]) -> Self {
        Self {
            dag,
            durations,
            anchor: SinkAnchor::OwnFinish,
        }
    }

    pub fn with_anchor(mut self, anchor: SinkAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Returns `(latest_start, latest_finish)` per task position.
    ///
    /// With [`SinkAnchor::OwnFinish`] sinks are pinned to their own earliest
    /// finish, so each independent chain anchors to its own length.
    pub fn execute(
        &self,
        order: &[usize],
        early: &[(i64, i64)],
    ) -> Result<Vec<(i64, i64)>, CpmError> {
        let mut late = vec![(0i64, 0i64); self.durations.len()];
        let project_finish = early.iter().map(|&(_, ef)| ef).max().unwrap_or(0);

        for &position in order.iter().rev() {
            let sink_finish = match self.anchor {
                SinkAnchor::OwnFinish => early[position].1,
                SinkAnchor::ProjectFinish => project_finish,
            };
            let latest_finish = self
                .dag
                .dependents_of(position)
                .map(|succ| late[succ].0)
                .min()
                .unwrap_or(sink_finish);
            let latest_start = latest_finish
                .checked_sub(self.durations[position])
                .ok_or_else(|| CpmError::ScheduleOverflow {
                    task_id: self.dag.task_id(position).to_string(),
                })?;
            late[position] = (latest_start, latest_finish);
        }

        Ok(late)
    }
}
