use chrono::NaiveDate;
use evm_report::{
    EngineConfig, EngineError, EvmEngine, PersistenceError, ProjectSnapshot, TaskStatus,
    ViolationKind, export_chart_data, load_milestones_from_json, load_snapshot,
    load_tasks_from_csv,
    persistence::{read_tasks_csv, save_risk_matrix_csv},
};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const TASK_SHEET: &str = "\
Task_Name,Department,Resource_Name,Planned_Value,Actual_Cost,Earned_Value,Status,Risk_Level,Estimated_Completion_Date
API Gateway,Engineering,Alice,50000,55000,40000,In Progress,4,2025-03-15
Test Plan,QA,Bob,12000,10000,12000,Completed,2,2025-02-01
Brand Refresh,Design,Carol,8000,0,0,Not Started,1,
Bad Row,DevOps,Dan,-100,0,0,Paused,9,2025-04-01
";

const MILESTONES: &str = r#"{
  "milestones": [
    {
      "name": "Architecture Sign-off",
      "owner": "Alice",
      "target_date": "2025-01-31",
      "completion_date": "2025-01-29",
      "status": "Completed",
      "dependencies": []
    },
    {
      "name": "Beta Release",
      "owner": "Bob",
      "target_date": "2025-04-30",
      "completion_date": null,
      "status": "In Progress",
      "dependencies": ["Architecture Sign-off"]
    }
  ]
}"#;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn csv_rows_become_typed_tasks_without_range_checks() {
    let file = write_temp(TASK_SHEET);
    let tasks = load_tasks_from_csv(file.path()).unwrap();

    assert_eq!(tasks.len(), 4);
    let api = &tasks[0];
    assert_eq!(api.name, "API Gateway");
    assert_eq!(api.department, "Engineering");
    assert_eq!(api.resource_name, "Alice");
    assert_eq!(api.planned_value, 50000.0);
    assert_eq!(api.actual_cost, 55000.0);
    assert_eq!(api.earned_value, 40000.0);
    assert_eq!(api.status, TaskStatus::InProgress);
    assert_eq!(api.risk_level, 4);
    assert_eq!(api.estimated_completion_date, Some(d(2025, 3, 15)));

    assert_eq!(tasks[2].estimated_completion_date, None);

    // Out-of-range values pass through; the engine decides what to do with them.
    let bad = &tasks[3];
    assert_eq!(bad.planned_value, -100.0);
    assert_eq!(bad.risk_level, 9);
    assert_eq!(bad.status, TaskStatus::Unrecognized("Paused".into()));
}

#[test]
fn unparseable_number_is_a_load_error() {
    let sheet = "\
Task_Name,Department,Resource_Name,Planned_Value,Actual_Cost,Earned_Value,Status,Risk_Level
API,Engineering,Alice,lots,10,10,In Progress,2
";
    match read_tasks_csv(sheet.as_bytes()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("row 1"), "unexpected message: {msg}");
            assert!(msg.contains("Planned_Value"), "unexpected message: {msg}");
        }
        other => panic!("expected InvalidData error, got {other:?}"),
    }
}

#[test]
fn status_synonyms_are_not_coerced_and_fail_strict_analysis() {
    let sheet = "\
Task_Name,Department,Resource_Name,Planned_Value,Actual_Cost,Earned_Value,Status,Risk_Level
Release Notes,Docs,Eve,100,100,100,Done,2
";
    let tasks = read_tasks_csv(sheet.as_bytes()).unwrap();
    assert_eq!(tasks[0].status, TaskStatus::Unrecognized("Done".into()));

    let snapshot = ProjectSnapshot::new(tasks, Vec::new());
    let engine = EvmEngine::new(EngineConfig::default()).unwrap();
    match engine.analyze(&snapshot) {
        Err(EngineError::DataQuality { violations }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].task, "Release Notes");
            assert_eq!(
                violations[0].kind,
                ViolationKind::UnrecognizedStatus {
                    value: "Done".into()
                }
            );
        }
        other => panic!("expected data quality failure, got {other:?}"),
    }
}

#[test]
fn empty_sheet_is_rejected() {
    let sheet = "Task_Name,Department,Resource_Name,Planned_Value,Actual_Cost,Earned_Value,Status,Risk_Level\n";
    match read_tasks_csv(sheet.as_bytes()) {
        Err(PersistenceError::InvalidData(msg)) => assert!(msg.contains("no tasks")),
        other => panic!("expected InvalidData error, got {other:?}"),
    }
}

#[test]
fn milestone_document_loads_optional_fields() {
    let file = write_temp(MILESTONES);
    let milestones = load_milestones_from_json(file.path()).unwrap();

    assert_eq!(milestones.len(), 2);
    assert_eq!(milestones[0].owner.as_deref(), Some("Alice"));
    assert_eq!(milestones[0].completion_date, Some(d(2025, 1, 29)));
    assert_eq!(milestones[1].status, TaskStatus::InProgress);
    assert_eq!(milestones[1].completion_date, None);
    assert_eq!(milestones[1].dependencies, vec!["Architecture Sign-off".to_string()]);
}

#[test]
fn snapshot_from_files_feeds_lenient_engine() {
    let tasks = write_temp(TASK_SHEET);
    let milestones = write_temp(MILESTONES);
    let snapshot = load_snapshot(tasks.path(), Some(milestones.path())).unwrap();

    let engine = EvmEngine::new(EngineConfig::lenient()).unwrap();
    let report = engine.analyze(&snapshot).unwrap();

    assert_eq!(report.excluded_tasks(), ["Bad Row".to_string()]);
    assert_eq!(report.tasks().len(), 3);
    assert_eq!(report.milestones().counts.completed, 1);
    assert_eq!(report.milestones().counts.in_progress, 1);
}

#[test]
fn chart_data_export_writes_budget_series_and_dense_grid() {
    let tasks = write_temp(TASK_SHEET);
    let snapshot = load_snapshot(tasks.path(), None::<&str>).unwrap();
    let report = EvmEngine::new(EngineConfig::lenient())
        .unwrap()
        .analyze(&snapshot)
        .unwrap();

    let dir = TempDir::new().unwrap();
    let written = export_chart_data(&report, dir.path().join("charts")).unwrap();
    assert_eq!(written.len(), 2);

    let budget = fs::read_to_string(&written[0]).unwrap();
    let lines: Vec<&str> = budget.lines().collect();
    assert_eq!(lines[0], "task,planned_value,actual_cost,earned_value");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("API Gateway,50000"));

    let heatmap = fs::read_to_string(&written[1]).unwrap();
    let lines: Vec<&str> = heatmap.lines().collect();
    assert_eq!(
        lines,
        vec![
            "department,risk_1,risk_2,risk_4",
            "Design,1,0,0",
            "Engineering,0,0,1",
            "QA,0,1,0",
        ]
    );
}

#[test]
fn risk_matrix_export_of_empty_report_has_header_only() {
    let sheet = write_temp(
        "Task_Name,Department,Resource_Name,Planned_Value,Actual_Cost,Earned_Value,Status,Risk_Level\n\
         Only,QA,Bob,1,1,1,Completed,0\n",
    );
    let snapshot = load_snapshot(sheet.path(), None::<&str>).unwrap();
    let report = EvmEngine::new(EngineConfig::lenient())
        .unwrap()
        .analyze(&snapshot)
        .unwrap();
    assert!(report.risk_matrix().is_empty());

    let out = NamedTempFile::new().unwrap();
    save_risk_matrix_csv(report.risk_matrix(), out.path()).unwrap();
    assert_eq!(fs::read_to_string(out.path()).unwrap().trim(), "department");
}
