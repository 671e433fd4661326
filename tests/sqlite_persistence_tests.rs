#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use project_cpm::{
    AnalyzerConfig, PersistenceError, Project, ProjectMetadata, ProjectStore, SqliteProjectStore,
    Task, TaskStatus, WorkCalendar,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_project(id: &str) -> Project {
    let mut metadata = ProjectMetadata::default();
    metadata.name = "SQLite Project".into();
    metadata.start_date = d(2025, 1, 6);

    let mut calendar = WorkCalendar::default();
    calendar.add_holiday(d(2025, 1, 20));

    let mut project = Project::new(id, metadata).with_calendar(calendar);
    project.upsert_task("design", "Design", 16.0, None).unwrap();
    project
        .upsert_task("build", "Build", 36.0, Some(vec!["design".into()]))
        .unwrap();
    project
        .upsert_task_record(
            Task::new("review", "Review", 4.0)
                .with_dependencies(["build"])
                .with_status(TaskStatus::Review)
                .with_actual_hours(6.0),
        )
        .unwrap();
    project
}

#[test]
fn sqlite_store_round_trip_project() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteProjectStore::new(file.path()).unwrap();
    let project = sample_project("alpha");

    store.save_project(&project).unwrap();
    let loaded = store.load_project("alpha").unwrap().expect("stored project");
    assert_eq!(loaded, project);

    let config = AnalyzerConfig::default();
    assert_eq!(
        loaded.analyze(&config).unwrap(),
        project.analyze(&config).unwrap()
    );
}

#[test]
fn sqlite_store_persists_across_connections() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteProjectStore::new(file.path()).unwrap();
        store.save_project(&sample_project("alpha")).unwrap();
    }
    let store = SqliteProjectStore::new(file.path()).unwrap();
    assert_eq!(store.list_project_ids().unwrap(), vec!["alpha"]);
}

#[test]
fn sqlite_store_overwrites_tasks_on_save() {
    let store = SqliteProjectStore::in_memory().unwrap();
    let mut project = sample_project("alpha");
    store.save_project(&project).unwrap();

    assert!(project.delete_task("review"));
    project.set_name("Renamed");
    store.save_project(&project).unwrap();

    let loaded = store.load_project("alpha").unwrap().unwrap();
    assert_eq!(loaded.tasks().len(), 2);
    assert_eq!(loaded.metadata().name, "Renamed");
}

#[test]
fn sqlite_store_lists_and_deletes_projects() {
    let store = SqliteProjectStore::in_memory().unwrap();
    store.save_project(&sample_project("beta")).unwrap();
    store.save_project(&sample_project("alpha")).unwrap();
    assert_eq!(store.list_project_ids().unwrap(), vec!["alpha", "beta"]);

    assert!(store.delete_project("alpha").unwrap());
    assert!(!store.delete_project("alpha").unwrap());
    assert!(store.load_project("alpha").unwrap().is_none());
    assert_eq!(store.list_project_ids().unwrap(), vec!["beta"]);
}

#[test]
fn sqlite_store_rejects_corrupt_task_rows() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteProjectStore::new(file.path()).unwrap();
    store.save_project(&sample_project("alpha")).unwrap();
    drop(store);

    let conn = rusqlite::Connection::open(file.path()).unwrap();
    conn.execute(
        "UPDATE tasks SET task_json = ?1 WHERE project_id = 'alpha' AND position = 1",
        [r#"{"id":"design","estimated_hours":8}"#],
    )
    .unwrap();
    drop(conn);

    let store = SqliteProjectStore::new(file.path()).unwrap();
    assert!(matches!(
        store.load_project("alpha"),
        Err(PersistenceError::InvalidData(_))
    ));
}
