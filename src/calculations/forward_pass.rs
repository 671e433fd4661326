use crate::error::CpmError;
use crate::graph::TaskDag;

pub struct ForwardPass<'a> {
    dag: &'a TaskDag,
    durations: &'a [i64],
}

impl<'a> ForwardPass<'a> {
    pub fn new(dag: &'a TaskDag, durations: &'a [i64]) -> Self {
        Self { dag, durations }
    }

    /// Returns `(earliest_start, earliest_finish)` per task position.
    ///
    /// `order` must list every position with dependencies ahead of dependents.
    pub fn execute(&self, order: &[usize]) -> Result<Vec<(i64, i64)>, CpmError> {
        let mut early = vec![(0i64, 0i64); self.durations.len()];

        for &position in order {
            // Early start is max of all dependency finishes; roots start at day 0
            let earliest_start = self
                .dag
                .dependencies_of(position)
                .map(|dep| early[dep].1)
                .max()
                .unwrap_or(0);
            let earliest_finish = earliest_start
                .checked_add(self.durations[position])
                .ok_or_else(|| CpmError::ScheduleOverflow {
                    task_id: self.dag.task_id(position).to_string(),
                })?;
            early[position] = (earliest_start, earliest_finish);
        }

        Ok(early)
    }
}
