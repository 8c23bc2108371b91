//! End-to-end job evaluation: gating, sequential evaluation, results
//! artifact, and the failure-envelope log.

use simverify_core::engine::{history_file_name, job_file_name, run_job_from_files};
use simverify_core::report::results_file_name;
use simverify_core::{ResultCollection, VerifyErrorCategory};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_history(dir: &Path, job_name: &str, diagnostics: &str) {
    let mut force = Vec::new();
    let mut disp = Vec::new();
    for index in 0..=50 {
        let t = index as f64 / 50.0;
        force.push([t, 100.0 * t * (2.0 - t)]);
        disp.push([t, 0.05 * t]);
    }
    let archive = serde_json::json!({
        "diagnostics": serde_json::from_str::<serde_json::Value>(diagnostics).unwrap(),
        "steps": [
            {
                "name": "Step-1",
                "regions": [
                    {
                        "label": "Node PART-1-1.9",
                        "outputs": [
                            {
                                "symbol": "RF1",
                                "name": "Reaction force: RF1 at Node 9 in NSET LOADAPP",
                                "data": force
                            },
                            {
                                "symbol": "U1",
                                "name": "Spatial displacement: U1 at Node 9 in NSET LOADAPP",
                                "data": disp
                            }
                        ]
                    }
                ]
            }
        ]
    });
    fs::write(
        dir.join(history_file_name(job_name)),
        archive.to_string(),
    )
    .expect("history archive should write");
}

const JOB: &str = r#"
{
  "results": [
    {
      "type": "max",
      "identifier": { "symbol": "RF1", "nset": "LOADAPP" },
      "referenceValue": 100.0,
      "tolerance": 5.0
    },
    {
      "type": "finalValue",
      "identifier": { "symbol": "U1", "nset": "LOADAPP" },
      "referenceValue": 0.05,
      "tolerance": 0.001
    },
    {
      "type": "slope",
      "identifier": [
        { "symbol": "U1", "nset": "LOADAPP" },
        { "symbol": "RF1", "nset": "LOADAPP" }
      ],
      "window": [0.0, 0.0045],
      "referenceValue": 4000.0,
      "tolerance": 200.0
    },
    {
      "type": "tabular",
      "identifier": [
        { "symbol": "U1", "nset": "LOADAPP" },
        { "symbol": "U1", "nset": "LOADAPP" }
      ],
      "referenceValue": [[0.01, 0.01], [0.02, 0.02]],
      "tolerance": 0.001
    }
  ]
}
"#;

#[test]
fn a_clean_run_writes_an_ordered_results_artifact() {
    let temp = TempDir::new().expect("tempdir should be created");
    let job_name = "tension_rate_1";
    write_history(temp.path(), job_name, r#"{}"#);
    fs::write(temp.path().join(job_file_name(job_name)), JOB).unwrap();

    // a stale artifact from an earlier run must not survive
    let results_path = temp.path().join(results_file_name(job_name));
    fs::write(&results_path, "stale contents").unwrap();

    let written = run_job_from_files(job_name, temp.path()).expect("job should evaluate");
    assert_eq!(written, results_path);

    let content = fs::read_to_string(&results_path).unwrap();
    assert!(!content.contains("stale contents"));

    let collection = ResultCollection::from_json(&content).expect("results should re-read");
    assert_eq!(collection.len(), 4);

    // entries keep the input order and their original key order
    let types: Vec<&str> = collection
        .entries()
        .iter()
        .map(|entry| entry["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["max", "finalValue", "slope", "tabular"]);
    let first_keys: Vec<&String> = collection.entries()[0]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(
        first_keys,
        ["type", "identifier", "referenceValue", "tolerance", "computedValue"]
    );

    // peak of 100 t (2 - t) over t in [0, 1] is at t = 1
    let max_value = collection.entries()[0]["computedValue"].as_f64().unwrap();
    assert!((max_value - 100.0).abs() < 1e-9, "max was {max_value}");

    let final_value = collection.entries()[1]["computedValue"].as_f64().unwrap();
    assert!(
        (final_value - 0.05).abs() < 1e-12,
        "final value was {final_value}"
    );

    // force is 100 t (2 - t), displacement 0.05 t; the window keeps
    // u in {0.001 .. 0.004}, so the secant slopes are 4000 - 2000 (t1 + t2)
    // for the pairs (0.02, 0.04), (0.04, 0.06), (0.06, 0.08): mean 3800
    let slope_value = collection.entries()[2]["computedValue"].as_f64().unwrap();
    assert!(
        (slope_value - 3800.0).abs() < 1e-6,
        "slope was {slope_value}"
    );

    // identity curve: interpolated y equals the reference x
    let tabular = collection.entries()[3]["computedValue"].as_array().unwrap();
    assert_eq!(tabular.len(), 2);
    assert!((tabular[0][1].as_f64().unwrap() - 0.01).abs() < 1e-12);
    assert!((tabular[1][1].as_f64().unwrap() - 0.02).abs() < 1e-12);
}

#[test]
fn analysis_errors_gate_the_run_and_leave_no_results_file() {
    let temp = TempDir::new().expect("tempdir should be created");
    let job_name = "tension_rate_1";
    write_history(
        temp.path(),
        job_name,
        r#"{ "analysisErrors": ["Solver diverged"] }"#,
    );
    fs::write(temp.path().join(job_file_name(job_name)), JOB).unwrap();
    let results_path = temp.path().join(results_file_name(job_name));
    fs::write(&results_path, "stale contents").unwrap();

    let error = run_job_from_files(job_name, temp.path()).expect_err("gating should fail");
    assert_eq!(error.category(), VerifyErrorCategory::AnalysisFailed);
    assert!(
        !results_path.exists(),
        "stale results must be removed even when the run aborts"
    );
}

#[test]
fn envelope_jobs_append_to_the_log_and_store_no_computed_value() {
    let temp = TempDir::new().expect("tempdir should be created");
    let job_name = "envelope_loadRatio_30";

    let archive = serde_json::json!({
        "diagnostics": { "analysisErrors": ["Excessively distorted elements"] },
        "steps": [
            {
                "name": "Step-1",
                "regions": [
                    {
                        "label": "Element 1 Int Point 1",
                        "outputs": [
                            {
                                "symbol": "SDV_FM1",
                                "name": "Solution dependent state variables: SDV_FM1 at Element 1 Int Point 1 in ELSET DAMAGE",
                                "data": [[0.0, 0.0], [1.0, 0.6], [2.0, 1.2]]
                            },
                            {
                                "symbol": "S11",
                                "name": "Stress components: S11 at Element 1 Int Point 1 in ELSET DAMAGE",
                                "data": [[0.0, 0.0], [1.0, 90.0], [2.0, 140.0]]
                            },
                            {
                                "symbol": "S22",
                                "name": "Stress components: S22 at Element 1 Int Point 1 in ELSET DAMAGE",
                                "data": [[0.0, 0.0], [1.0, 35.0], [2.0, 60.0]]
                            }
                        ]
                    }
                ]
            }
        ]
    });
    fs::write(
        temp.path().join(history_file_name(job_name)),
        archive.to_string(),
    )
    .unwrap();

    let job = r#"
    {
      "results": [
        {
          "type": "log_stress_at_failure_init",
          "failureIndices": [
            { "symbol": "SDV_FM1", "position": "Element 1 Int Point 1", "elset": "DAMAGE" }
          ],
          "stressComponents": [
            { "symbol": "S22", "position": "Element 1 Int Point 1", "elset": "DAMAGE" },
            { "symbol": "S11", "position": "Element 1 Int Point 1", "elset": "DAMAGE" }
          ]
        }
      ]
    }
    "#;
    fs::write(temp.path().join(job_file_name(job_name)), job).unwrap();

    run_job_from_files(job_name, temp.path()).expect("envelope job should evaluate");

    // the distortion errors were tolerated because the job is envelope-only;
    // the results artifact exists but carries no entries
    let results =
        fs::read_to_string(temp.path().join(results_file_name(job_name))).unwrap();
    let collection = ResultCollection::from_json(&results).unwrap();
    assert!(collection.is_empty());

    let log = fs::read_to_string(temp.path().join("envelope_failure_envelope.txt")).unwrap();
    assert_eq!(log, "Load Ratio, S11, S22\n30, 140, 60\n");

    // a second run with a different load ratio appends without a new header
    let job_name_2 = "envelope_loadRatio_45";
    fs::write(
        temp.path().join(history_file_name(job_name_2)),
        archive.to_string(),
    )
    .unwrap();
    fs::write(temp.path().join(job_file_name(job_name_2)), job).unwrap();
    run_job_from_files(job_name_2, temp.path()).expect("second envelope job should evaluate");

    let log = fs::read_to_string(temp.path().join("envelope_failure_envelope.txt")).unwrap();
    assert_eq!(log, "Load Ratio, S11, S22\n30, 140, 60\n45, 140, 60\n");
}
