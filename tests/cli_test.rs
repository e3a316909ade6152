//! 命令列測試

use std::process::Command;

use delivery_mrp::{AlertLevel, DeliveryReport};

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_dataset.json");

fn delivery_mrp() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_delivery-mrp"));
    cmd.env("RUST_LOG", "debug");
    cmd
}

#[test]
fn test_stdout_report_is_valid_json() {
    let output = delivery_mrp()
        .args(["--dataset", SAMPLE])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: DeliveryReport = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report.plan.verdicts.len(), 4);
    assert_eq!(report.metadata.order_count, 4);

    // 日誌只寫到標準錯誤
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INFO"));
}

#[test]
fn test_output_file_leaves_stdout_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");

    let output = delivery_mrp()
        .args(["--dataset", SAMPLE, "--top", "2", "--output"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let report: DeliveryReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(report.plan.top_bottlenecks.len() <= 2);
    assert!(report
        .plan
        .verdicts
        .iter()
        .any(|v| v.alert_level == AlertLevel::Unschedulable));
}

#[test]
fn test_missing_dataset_fails() {
    let output = delivery_mrp()
        .args(["--dataset", "no-such-dataset.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
