use std::io::{self, Write};

use chrono::{NaiveDate, Weekday};
use polars::prelude::{AnyValue, DataFrame};
use project_cpm::{
    AnalyzerConfig, Project, ProjectAnalysis, ProjectMetadata, TaskStatus, WorkCalendar,
    WorkCalendarConfig, load_project_from_json, load_tasks_from_csv, save_analysis_to_csv,
    save_project_to_json, save_tasks_to_csv,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn parse_id_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, values: &[String]| {
        out.push('|');
        for (ci, s) in values.iter().enumerate() {
            out.push(' ');
            out.push_str(s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_tasks(project: &Project) -> String {
    match project.tasks_frame() {
        Ok(df) => render_df_as_text_table(&df),
        Err(e) => format!("Render error: {e}"),
    }
}

fn render_analysis(analysis: &ProjectAnalysis) -> String {
    match analysis.to_dataframe() {
        Ok(df) => render_df_as_text_table(&df),
        Err(e) => format!("Render error: {e}"),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current tasks\n  add <id> <name> <hours> [deps_csv] Upsert a task (deps like a,b,c)\n  delete   <id>                      Delete a task and references to it\n  status   <id> <status>             todo|in_progress|review|completed|blocked\n  actual   <id> <hours>              Set actual hours\n  assignee <id> <name...>            Set assignee (rest of line)\n  progress <id> <0-100>              Set progress percent\n  meta show                          Show project metadata\n  meta name <text...>                Set project name\n  meta desc <text...>                Set project description\n  meta start <YYYY-MM-DD>            Set project start date\n  calendar show                      Show working days and holidays\n  calendar default                   Reset to Mon-Fri, no holidays\n  calendar set <days_csv> [holidays_csv]\n                                     e.g. Mon,Tue,Wed 2025-01-01,2025-12-25\n  calendar save <path>               Write calendar config as JSON\n  compute                            Run critical path analysis\n  path                               Show the critical path\n  risk                               Show risk metrics\n  timeline                           Show calendar dates per task\n  save json|csv <path>               Save project (json) or tasks (csv)\n  load json|csv <path>               Load project (json) or tasks (csv)\n  export <path>                      Write analysis nodes as CSV\n  quit|exit                          Exit"
    );
}

fn load_config() -> AnalyzerConfig {
    match std::env::var("PROJECT_CPM_CONFIG") {
        Ok(path) => match AnalyzerConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(%path, error = %e, "falling back to default analyzer config");
                AnalyzerConfig::default()
            }
        },
        Err(_) => AnalyzerConfig::default(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = load_config();
    let mut project = Project::new("cli", ProjectMetadata::default());

    println!("Project CPM (CLI) - type 'help' for commands\n");
    println!("{}", render_tasks(&project));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_tasks(&project)),
            "add" => {
                let id_s = parts.next();
                let name_s = parts.next();
                let hours_s = parts.next();
                let deps_s = parts.next();
                match (id_s, name_s, hours_s) {
                    (Some(id), Some(name), Some(hours_s)) => {
                        let hours: f64 = match hours_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid hours"); continue; } };
                        let deps = deps_s.map(parse_id_list);
                        match project.upsert_task(id, name, hours, deps) {
                            Ok(_) => println!("Task upserted.\n{}", render_tasks(&project)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: add <id> <name> <hours> [deps_csv]"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    if project.delete_task(id) {
                        println!("Task deleted.\n{}", render_tasks(&project));
                    } else {
                        println!("Error: task {id} not found");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "status" => {
                let id_s = parts.next();
                let val_s = parts.next();
                match (id_s, val_s) {
                    (Some(id), Some(val_s)) => {
                        let status: TaskStatus = match val_s.parse() { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        match project.set_status(id, status) {
                            Ok(_) => println!("status set.\n{}", render_tasks(&project)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: status <id> <status>"),
                }
            }
            "actual" | "progress" => {
                let id_s = parts.next();
                let val_s = parts.next();
                match (id_s, val_s) {
                    (Some(id), Some(val_s)) => {
                        let val: f64 = match val_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid float"); continue; } };
                        let res = if cmd == "actual" {
                            project.set_actual_hours(id, val)
                        } else {
                            project.set_progress(id, val)
                        };
                        match res {
                            Ok(_) => println!("{cmd} set.\n{}", render_tasks(&project)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: {cmd} <id> <float>"),
                }
            }
            "assignee" => {
                let id_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (id_s, !rest.is_empty()) {
                    (Some(id), true) => match project.set_assignee(id, &rest.join(" ")) {
                        Ok(_) => println!("assignee set.\n{}", render_tasks(&project)),
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: assignee <id> <name...>"),
                }
            }
            "meta" => {
                let sub = parts.next().unwrap_or("show");
                let rest: Vec<&str> = parts.collect();
                match (sub, rest.is_empty()) {
                    ("show", _) => {}
                    ("name", false) => project.set_name(rest.join(" ")),
                    ("desc", false) => project.set_description(rest.join(" ")),
                    ("start", false) => match parse_date(rest[0]) {
                        Some(date) => project.set_start_date(date),
                        None => { println!("Invalid date (YYYY-MM-DD)"); continue; }
                    },
                    _ => { println!("Usage: meta show|name <text>|desc <text>|start <YYYY-MM-DD>"); continue; }
                }
                let meta = project.metadata();
                println!(
                    "name: {}\ndescription: {}\nstart_date: {}",
                    meta.name, meta.description, meta.start_date
                );
            }
            "calendar" => {
                let sub = parts.next().unwrap_or("show");
                match sub {
                    "show" => {}
                    "default" => project.set_calendar(WorkCalendar::default()),
                    "set" => {
                        let Some(days_s) = parts.next() else {
                            println!("Usage: calendar set <days_csv> [holidays_csv]");
                            continue;
                        };
                        let days: Result<Vec<Weekday>, _> =
                            parse_id_list(days_s).iter().map(|d| d.parse::<Weekday>()).collect();
                        let Ok(days) = days else {
                            println!("Invalid weekday list (e.g. Mon,Tue,Wed)");
                            continue;
                        };
                        let holidays: Option<Vec<NaiveDate>> = parts
                            .next()
                            .map(|s| parse_id_list(s).iter().map(|d| parse_date(d)).collect())
                            .unwrap_or_else(|| Some(Vec::new()));
                        let Some(holidays) = holidays else {
                            println!("Invalid holiday list (YYYY-MM-DD,...)");
                            continue;
                        };
                        let res = WorkCalendarConfig::new(days, holidays)
                            .map_err(project_cpm::ProjectError::from)
                            .and_then(|cfg| project.set_calendar_from_config(&cfg));
                        if let Err(e) = res {
                            println!("Error: {e}");
                            continue;
                        }
                    }
                    "save" => {
                        let Some(path) = parts.next() else {
                            println!("Usage: calendar save <path>");
                            continue;
                        };
                        let res = serde_json::to_string_pretty(&project.calendar_config())
                            .map_err(|e| e.to_string())
                            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
                        match res {
                            Ok(_) => println!("Calendar saved to {path}"),
                            Err(e) => println!("Error: {e}"),
                        }
                        continue;
                    }
                    _ => { println!("Usage: calendar show|default|set|save"); continue; }
                }
                let cfg = project.calendar_config();
                let days: Vec<String> = cfg.working_days().iter().map(|d| d.to_string()).collect();
                let holidays: Vec<String> = cfg.holidays().iter().map(|d| d.to_string()).collect();
                println!("working_days: {}\nholidays: {}", days.join(","), holidays.join(","));
            }
            "compute" | "path" | "risk" | "timeline" | "export" => {
                let analysis = match project.analyze(&config) {
                    Ok(a) => a,
                    Err(e) => { println!("Analysis error: {e}"); continue; }
                };
                match cmd {
                    "compute" => println!(
                        "Computed ({})\n{}",
                        analysis.to_cli_summary(),
                        render_analysis(&analysis)
                    ),
                    "path" => {
                        if analysis.cpm.critical_path.is_empty() {
                            println!("Critical path: (none)");
                        } else {
                            println!("Critical path: {}", analysis.cpm.critical_path.join(" -> "));
                        }
                        for chain in &analysis.cpm.critical_chains {
                            println!("  chain: {}", chain.join(" -> "));
                        }
                    }
                    "risk" => {
                        let r = &analysis.risk;
                        println!(
                            "risk_level: {}\ncritical_tasks: {}\ncritical_completed: {}\ncritical_completion_pct: {:.1}\noverruns: {}",
                            r.risk_level,
                            r.critical_task_count,
                            r.critical_completed_count,
                            r.critical_completion_pct,
                            r.overrun_count
                        );
                    }
                    "timeline" => {
                        for e in &analysis.timeline.entries {
                            println!(
                                "{} {} .. {}{}",
                                e.id,
                                e.start_date,
                                e.finish_date,
                                if e.is_critical { " *" } else { "" }
                            );
                        }
                        match analysis.timeline.project_finish {
                            Some(date) => println!("project finish: {date}"),
                            None => println!("project finish: -"),
                        }
                    }
                    _ => match parts.next() {
                        Some(path) => match save_analysis_to_csv(&analysis, path) {
                            Ok(_) => println!("Analysis exported to {path}"),
                            Err(e) => println!("Error: {e}"),
                        },
                        None => println!("Usage: export <path>"),
                    },
                }
            }
            "save" | "load" => {
                let kind = parts.next();
                let path = parts.next();
                let (Some(kind), Some(path)) = (kind, path) else {
                    println!("Usage: {cmd} json|csv <path>");
                    continue;
                };
                match (cmd, kind) {
                    ("save", "json") => match save_project_to_json(&project, path) {
                        Ok(_) => println!("Project saved to {path}"),
                        Err(e) => println!("Error: {e}"),
                    },
                    ("save", "csv") => match save_tasks_to_csv(project.tasks(), path) {
                        Ok(_) => println!("Tasks saved to {path}"),
                        Err(e) => println!("Error: {e}"),
                    },
                    ("load", "json") => match load_project_from_json(path) {
                        Ok(loaded) => {
                            project = loaded;
                            println!("Project loaded.\n{}", render_tasks(&project));
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    ("load", "csv") => {
                        let res = load_tasks_from_csv(path)
                            .map_err(|e| e.to_string())
                            .and_then(|tasks| project.replace_tasks(tasks).map_err(|e| e.to_string()));
                        match res {
                            Ok(_) => println!("Tasks loaded.\n{}", render_tasks(&project)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: {cmd} json|csv <path>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
