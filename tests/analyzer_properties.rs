use std::collections::{HashMap, HashSet};

use project_cpm::{
    AnalyzerConfig, CpmError, CriticalPathAnalysis, MAX_DURATION_DAYS, SinkAnchor, Task,
    compute_critical_path, compute_critical_path_with,
};
use proptest::prelude::*;
use proptest::sample::Index;

fn project_finish() -> AnalyzerConfig {
    AnalyzerConfig {
        sink_anchor: SinkAnchor::ProjectFinish,
        ..AnalyzerConfig::default()
    }
}

fn fork() -> Vec<Task> {
    vec![
        Task::new("A", "Design", 8.0),
        Task::new("B", "Build", 16.0).with_dependencies(["A"]),
        Task::new("C", "Docs", 8.0).with_dependencies(["A"]),
    ]
}

fn timing(analysis: &CriticalPathAnalysis, id: &str) -> (i64, i64, i64, i64, i64) {
    let node = analysis.node(id).unwrap();
    (
        node.earliest_start,
        node.earliest_finish,
        node.latest_start,
        node.latest_finish,
        node.slack,
    )
}

#[test]
fn fork_measured_against_project_finish() {
    let analysis = compute_critical_path_with(&fork(), &project_finish()).unwrap();
    assert_eq!(timing(&analysis, "A"), (0, 1, 0, 1, 0));
    assert_eq!(timing(&analysis, "B"), (1, 3, 1, 3, 0));
    assert_eq!(timing(&analysis, "C"), (1, 2, 2, 3, 1));
    assert_eq!(analysis.project_duration_days, 3);
    assert!(analysis.node("A").unwrap().is_critical);
    assert!(analysis.node("B").unwrap().is_critical);
    assert!(!analysis.node("C").unwrap().is_critical);
    assert_eq!(analysis.critical_path, vec!["A", "B"]);
}

#[test]
fn fork_measured_against_own_finish() {
    let analysis = compute_critical_path(&fork()).unwrap();
    assert_eq!(timing(&analysis, "C"), (1, 2, 1, 2, 0));
    assert_eq!(analysis.project_duration_days, 3);
    assert_eq!(analysis.critical_path, vec!["A", "B"]);
}

#[test]
fn single_task() {
    let tasks = vec![Task::new("only", "Only", 8.0)];
    let analysis = compute_critical_path(&tasks).unwrap();
    assert_eq!(timing(&analysis, "only"), (0, 1, 0, 1, 0));
    assert!(analysis.node("only").unwrap().is_critical);
    assert_eq!(analysis.project_duration_days, 1);
    assert_eq!(analysis.critical_path, vec!["only"]);
}

#[test]
fn ghost_dependency_is_ignored() {
    let tasks = vec![Task::new("a", "A", 12.0).with_dependencies(["ghost"])];
    let analysis = compute_critical_path(&tasks).unwrap();
    let node = analysis.node("a").unwrap();
    assert_eq!(node.earliest_start, 0);
    assert_eq!(node.duration_days, 2);
    assert_eq!(analysis.critical_path, vec!["a"]);
}

#[test]
fn empty_task_list() {
    let analysis = compute_critical_path(&[]).unwrap();
    assert!(analysis.nodes.is_empty());
    assert_eq!(analysis.project_duration_days, 0);
    assert!(analysis.critical_path.is_empty());
}

#[test]
fn zero_hour_task_is_a_milestone() {
    let tasks = vec![
        Task::new("work", "Work", 20.0),
        Task::new("done", "Done", 0.0).with_dependencies(["work"]),
    ];
    let analysis = compute_critical_path(&tasks).unwrap();
    assert_eq!(timing(&analysis, "done"), (3, 3, 3, 3, 0));
    assert_eq!(analysis.critical_path, vec!["work", "done"]);
}

#[test]
fn disconnected_groups_share_one_project_duration() {
    let tasks = vec![
        Task::new("a1", "A1", 8.0),
        Task::new("a2", "A2", 8.0).with_dependencies(["a1"]),
        Task::new("b1", "B1", 40.0),
    ];
    let analysis = compute_critical_path_with(&tasks, &project_finish()).unwrap();
    assert_eq!(analysis.project_duration_days, 5);
    assert_eq!(analysis.node("a2").unwrap().slack, 3);
    assert_eq!(analysis.critical_path, vec!["b1"]);
}

#[test]
fn cycle_is_rejected() {
    let tasks = vec![
        Task::new("a", "A", 8.0).with_dependencies(["c"]),
        Task::new("b", "B", 8.0).with_dependencies(["a"]),
        Task::new("c", "C", 8.0).with_dependencies(["b"]),
    ];
    assert!(matches!(
        compute_critical_path(&tasks),
        Err(CpmError::CyclicDependency { .. })
    ));
}

#[test]
fn self_dependency_is_rejected() {
    let tasks = vec![Task::new("a", "A", 8.0).with_dependencies(["a"])];
    assert_eq!(
        compute_critical_path(&tasks),
        Err(CpmError::CyclicDependency {
            task_id: "a".to_string()
        })
    );
}

#[test]
fn duplicate_dependency_ids_are_harmless() {
    let once = vec![
        Task::new("a", "A", 8.0),
        Task::new("b", "B", 8.0).with_dependencies(["a"]),
    ];
    let twice = vec![
        Task::new("a", "A", 8.0),
        Task::new("b", "B", 8.0).with_dependencies(["a", "a"]),
    ];
    assert_eq!(
        compute_critical_path(&once).unwrap(),
        compute_critical_path(&twice).unwrap()
    );
}

#[test]
fn huge_estimate_in_a_chain_is_rejected() {
    let tasks = vec![
        Task::new("a", "A", 1e300),
        Task::new("b", "B", 8.0).with_dependencies(["a"]),
    ];
    match compute_critical_path(&tasks) {
        Err(CpmError::DurationTooLong { task_id, max, .. }) => {
            assert_eq!(task_id, "a");
            assert_eq!(max, MAX_DURATION_DAYS);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn tiny_working_day_can_push_estimates_past_the_limit() {
    let config = AnalyzerConfig {
        hours_per_day: 1e-9,
        ..AnalyzerConfig::default()
    };
    let tasks = vec![Task::new("a", "A", 8.0)];
    assert!(matches!(
        compute_critical_path_with(&tasks, &config),
        Err(CpmError::DurationTooLong { .. })
    ));
}

#[test]
fn chain_of_maximal_tasks_still_schedules() {
    let tasks = vec![
        Task::new("a", "A", 8.0 * MAX_DURATION_DAYS as f64),
        Task::new("b", "B", 8.0 * MAX_DURATION_DAYS as f64).with_dependencies(["a"]),
        Task::new("c", "C", 8.0 * MAX_DURATION_DAYS as f64).with_dependencies(["b"]),
    ];
    let analysis = compute_critical_path(&tasks).unwrap();
    assert_eq!(analysis.project_duration_days, 3 * MAX_DURATION_DAYS);
    assert_eq!(analysis.critical_path, vec!["a", "b", "c"]);
}

/// Acyclic task lists: task `i` may only depend on tasks `0..i`, plus an
/// optional reference to a task that does not exist.
fn acyclic_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (0u32..=400, prop::collection::vec(any::<Index>(), 0..3), any::<bool>()),
        0..14,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (tenths, picks, ghost))| {
                let mut deps: Vec<String> = if i == 0 {
                    Vec::new()
                } else {
                    picks.iter().map(|p| format!("t{}", p.index(i))).collect()
                };
                if ghost {
                    deps.push("ghost".to_string());
                }
                Task::new(format!("t{i}"), format!("Task {i}"), f64::from(tenths) / 10.0)
                    .with_dependencies(deps)
            })
            .collect()
    })
}

fn present_deps<'a>(task: &'a Task, ids: &'a HashSet<&str>) -> impl Iterator<Item = &'a String> {
    task.dependencies
        .iter()
        .filter(move |dep| ids.contains(dep.as_str()))
}

proptest! {
    #[test]
    fn durations_round_partial_days_up(tasks in acyclic_tasks()) {
        let analysis = compute_critical_path(&tasks).unwrap();
        for (task, node) in tasks.iter().zip(&analysis.nodes) {
            if task.estimated_hours == 0.0 {
                prop_assert_eq!(node.duration_days, 0);
            } else {
                prop_assert!((node.duration_days as f64) * 8.0 >= task.estimated_hours);
                prop_assert!(((node.duration_days - 1) as f64) * 8.0 < task.estimated_hours);
            }
        }
    }

    #[test]
    fn forward_pass_respects_dependencies(tasks in acyclic_tasks()) {
        let analysis = compute_critical_path(&tasks).unwrap();
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let by_id: HashMap<&str, _> =
            analysis.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        for (task, node) in tasks.iter().zip(&analysis.nodes) {
            prop_assert_eq!(node.earliest_finish, node.earliest_start + node.duration_days);
            let expected_start = present_deps(task, &ids)
                .map(|dep| by_id[dep.as_str()].earliest_finish)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(node.earliest_start, expected_start);
        }
    }

    #[test]
    fn sinks_finish_at_their_own_earliest_finish(tasks in acyclic_tasks()) {
        let analysis = compute_critical_path(&tasks).unwrap();
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        for node in &analysis.nodes {
            let is_sink = !tasks
                .iter()
                .any(|t| present_deps(t, &ids).any(|dep| *dep == node.id));
            if is_sink {
                prop_assert_eq!(node.latest_finish, node.earliest_finish);
            }
        }
    }

    #[test]
    fn critical_means_zero_slack(tasks in acyclic_tasks()) {
        for config in [AnalyzerConfig::default(), project_finish()] {
            let analysis = compute_critical_path_with(&tasks, &config).unwrap();
            for node in &analysis.nodes {
                prop_assert!(node.slack >= 0);
                prop_assert_eq!(node.slack, node.latest_start - node.earliest_start);
                prop_assert_eq!(node.is_critical, node.slack == 0);
            }
            let mut seen = HashSet::new();
            for id in &analysis.critical_path {
                prop_assert!(analysis.node(id).unwrap().is_critical);
                prop_assert!(seen.insert(id.clone()));
            }
        }
    }

    #[test]
    fn project_duration_is_latest_finish(tasks in acyclic_tasks()) {
        let analysis = compute_critical_path(&tasks).unwrap();
        let max_ef = analysis.nodes.iter().map(|n| n.earliest_finish).max().unwrap_or(0);
        prop_assert_eq!(analysis.project_duration_days, max_ef);
    }

    #[test]
    fn dangling_dependencies_change_nothing(tasks in acyclic_tasks()) {
        let cleaned: Vec<Task> = tasks
            .iter()
            .cloned()
            .map(|mut t| {
                t.dependencies.retain(|dep| dep != "ghost");
                t
            })
            .collect();
        prop_assert_eq!(
            compute_critical_path(&tasks).unwrap(),
            compute_critical_path(&cleaned).unwrap()
        );
    }
}
