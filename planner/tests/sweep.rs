#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]

mod common;

use common::{fenced, CallLog, MarkerValidator, ScriptedClient, VALID_MARK};
use mission_planner::prelude::*;
use mission_planner::runlog::RunLog;
use mission_planner::settings::PlannerConfig;
use mission_planner::summary::summarize;
use mission_planner::sweep::run_sweep;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn write_config(dir: &Path, extra: &str) -> PlannerConfig {
    std::fs::write(dir.join("mission.xsd"), "<xs:schema/>").unwrap();
    std::fs::write(dir.join("layout.txt"), "Rows 1-8 run north to south.").unwrap();
    std::fs::write(dir.join("farm.png"), [0x89, b'P', b'N', b'G']).unwrap();
    let yaml = format!(
        "schema: {d}/mission.xsd
farm_layout: {d}/layout.txt
farm_image: {d}/farm.png
log_directory: {d}/out
inputs: {d}/inputs.txt
{extra}",
        d = dir.display()
    );
    PlannerConfig::from_yaml_str(&yaml).unwrap()
}

#[tokio::test]
async fn sweep_logs_completed_queries_and_skips_failures() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "models:
  - name: llama3
    backend: ollama
  - name: offline
    backend: ollama
temperatures: [0.0, 0.5]
max_retries: 2
",
    );
    let inputs = vec!["inspect row 1".to_string(), "inspect row 2".to_string()];
    let run_log = RunLog::new(config.run_log_path());
    let mut logs: Vec<Arc<Mutex<CallLog>>> = Vec::new();

    let report = run_sweep(
        &config,
        &inputs,
        Arc::new(MarkerValidator::default()),
        &run_log,
        |spec, temperature| {
            if spec.name == "offline" {
                return Err(BackendError::Unsupported("daemon not running".into()));
            }
            let (client, log) = if temperature == 0.0 {
                ScriptedClient::new([fenced(VALID_MARK), fenced("<plan/>"), fenced(VALID_MARK)])
            } else {
                let (client, log) = ScriptedClient::new([fenced(VALID_MARK)]);
                (client.then_fail("model crashed"), log)
            };
            logs.push(log);
            Ok(Box::new(client.named(&spec.name)))
        },
    )
    .await
    .unwrap();

    assert_eq!(report.cells, 2);
    assert_eq!(report.failed_cells, 2);
    assert_eq!(report.completed, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.aborted, 1);

    for log in &logs {
        let log = log.lock().unwrap();
        assert_eq!(log.primers.len(), 1);
        assert!(log.primers[0].contains("<xs:schema/>"));
        assert!(log.primers[0].contains("Rows 1-8"));
        assert_eq!(log.resets, 2);
        assert_eq!(log.released, 1);
        assert_eq!(log.images, 0);
    }

    let (records, skipped) = RunLog::read(run_log.path()).unwrap();
    assert_eq!(skipped, 0);
    let cells: Vec<(usize, f64, usize)> = records
        .iter()
        .map(|r| (r.input, r.temperature, r.retries.len()))
        .collect();
    assert_eq!(cells, vec![(0, 0.0, 0), (1, 0.0, 1), (0, 0.5, 0)]);
    assert!(records.iter().all(|r| r.model == "llama3" && r.succeeded));
    assert!(records.iter().all(|r| r.answer.exists()));

    let summaries = summarize(&records);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].queries, 2);
    assert_eq!(summaries[0].mean_retries, 0.5);
}

#[tokio::test]
async fn multimodal_models_are_primed_with_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "models:
  - name: llava
    backend: ollama
    multimodal: true
",
    );
    let run_log = RunLog::new(config.run_log_path());
    let mut logs = Vec::new();

    let report = run_sweep(
        &config,
        &["land at the barn".to_string()],
        Arc::new(MarkerValidator::default()),
        &run_log,
        |spec, _| {
            let (client, log) = ScriptedClient::new([fenced(VALID_MARK)]);
            logs.push(log);
            Ok(Box::new(client.named(&spec.name).with_images()))
        },
    )
    .await
    .unwrap();

    assert_eq!(report.completed, 1);
    assert_eq!(logs[0].lock().unwrap().images, 1);

    let (records, _) = RunLog::read(run_log.path()).unwrap();
    assert!(records[0].multimodal);
}

#[tokio::test]
async fn image_priming_a_text_only_backend_fails_the_cell() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "models:
  - name: llava
    backend: ollama
    multimodal: true
",
    );
    let run_log = RunLog::new(config.run_log_path());

    let report = run_sweep(
        &config,
        &["q".to_string()],
        Arc::new(MarkerValidator::default()),
        &run_log,
        |_, _| {
            let (client, _) = ScriptedClient::new([fenced(VALID_MARK)]);
            Ok(Box::new(client))
        },
    )
    .await
    .unwrap();

    assert_eq!(report.cells, 0);
    assert_eq!(report.failed_cells, 1);
    assert!(!run_log.path().exists());
}

#[tokio::test]
async fn unwritable_run_log_skips_the_line_and_still_releases() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("blocker"), "not a directory").unwrap();
    let run_log_path = dir.path().join("blocker").join("log.txt");
    let config = write_config(
        dir.path(),
        &format!(
            "run_log: {}
models:
  - name: llama3
    backend: ollama
  - name: mistral
    backend: ollama
",
            run_log_path.display()
        ),
    );
    let run_log = RunLog::new(config.run_log_path());
    let mut logs = Vec::new();

    let report = run_sweep(
        &config,
        &["first".to_string(), "second".to_string()],
        Arc::new(MarkerValidator::default()),
        &run_log,
        |spec, _| {
            let (client, log) = ScriptedClient::new([fenced(VALID_MARK), fenced(VALID_MARK)]);
            logs.push(log);
            Ok(Box::new(client.named(&spec.name)))
        },
    )
    .await
    .unwrap();

    assert_eq!(report.cells, 2);
    assert_eq!(report.completed, 0);
    assert_eq!(report.aborted, 4);
    assert_eq!(logs.len(), 2);
    for log in &logs {
        let log = log.lock().unwrap();
        assert_eq!(log.prompts.len(), 2);
        assert_eq!(log.released, 1);
    }
}
