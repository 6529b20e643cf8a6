//! End-to-end tests: fixture directory through the analyzer and the CLI binary

use assert_cmd::Command;
use chrono::NaiveDate;
use predicates::prelude::*;
use usage_ledger::pricing::PricingTable;
use usage_ledger::{Report, ReportKind, ReportOptions, UsageAnalyzer};

mod common;

use common::{setup_projects_dir, OPUS, SONNET};

fn ascending() -> ReportOptions {
    ReportOptions {
        ascending: true,
        ..Default::default()
    }
}

fn cli(root: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("usage-ledger").unwrap();
    cmd.current_dir(root)
        .env_remove("RUST_LOG")
        .env_remove("LOG_OUTPUT")
        .env_remove("CLAUDE_PROJECTS_DIR")
        .env("USAGE_LEDGER_JSON_PRETTY", "false")
        .arg("--dir")
        .arg(root);
    cmd
}

#[test]
fn test_e2e_daily_report() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;
    let analyzer = UsageAnalyzer::new(PricingTable::builtin());

    let report = analyzer.run(ReportKind::Daily, temp_dir.path(), &ascending())?;
    let days = match report {
        Report::Daily(days) => days,
        other => panic!("unexpected report {:?}", other),
    };

    assert_eq!(days.len(), 3);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    assert_eq!(days[0].tokens.input_tokens, 1500);
    assert_eq!(days[0].models, vec![OPUS.to_string(), SONNET.to_string()]);
    assert_eq!(days[1].tokens.input_tokens, 2000);
    assert_eq!(days[2].models, vec!["unknown-model".to_string()]);
    assert_eq!(days[2].cost_usd, 0.0);

    // 1000/100 opus + 500/50 sonnet
    let expected = 1000.0 / 1e6 * 15.0 + 100.0 / 1e6 * 75.0 + 500.0 / 1e6 * 3.0 + 50.0 / 1e6 * 15.0;
    assert!((days[0].cost_usd - expected).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_e2e_filters_apply_before_aggregation() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;
    let analyzer = UsageAnalyzer::new(PricingTable::builtin());
    let options = ReportOptions {
        since: NaiveDate::from_ymd_opt(2025, 1, 15),
        until: NaiveDate::from_ymd_opt(2025, 1, 16),
        models: vec!["Claude-Sonnet-4-20250514".to_string()],
        ascending: true,
        ..Default::default()
    };

    match analyzer.run(ReportKind::Session, temp_dir.path(), &options)? {
        Report::Session(sessions) => {
            assert_eq!(sessions.len(), 2);
            assert_eq!(sessions[0].session_id, "session-a");
            assert_eq!(sessions[0].tokens.input_tokens, 500);
            assert_eq!(sessions[1].session_id, "session-b");
        }
        other => panic!("unexpected report {:?}", other),
    }
    Ok(())
}

#[test]
fn test_e2e_monthly_breakdown() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;
    let analyzer = UsageAnalyzer::new(PricingTable::builtin());
    let options = ReportOptions {
        breakdown: true,
        ..Default::default()
    };

    match analyzer.run(ReportKind::Monthly, temp_dir.path(), &options)? {
        Report::MonthlyBreakdown(months) => {
            // oldest first
            assert_eq!((months[0].usage.year, months[0].usage.month), (2025, 1));
            assert_eq!((months[1].usage.year, months[1].usage.month), (2025, 2));
            assert_eq!(months[0].usage.tokens.input_tokens, 3500);
            assert_eq!(months[0].breakdown.len(), 2);
            // most expensive model first
            assert_eq!(months[0].breakdown[0].model, OPUS);
            assert_eq!(months[0].breakdown[1].model, SONNET);
        }
        other => panic!("unexpected report {:?}", other),
    }
    Ok(())
}

#[test]
fn test_cli_json_daily() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;

    let output = cli(temp_dir.path())
        .args(["daily", "--json", "--asc"])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let days = value.as_array().expect("array of days");
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["date"], "2025-01-15");
    assert_eq!(days[0]["inputTokens"], 1500);
    Ok(())
}

#[test]
fn test_cli_json_keeps_aggregation_order_without_asc() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;

    for report in ["daily", "session"] {
        let output = cli(temp_dir.path()).args([report, "--json"]).output()?;
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        let rows = value.as_array().expect("array of rows");
        assert_eq!(rows.len(), 3);
        let key = if report == "daily" { "date" } else { "startTime" };
        let keys: Vec<&str> = rows.iter().filter_map(|r| r[key].as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted, "{} rows out of order", report);
    }
    Ok(())
}

#[test]
fn test_cli_text_order_defaults() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;

    let daily = cli(temp_dir.path()).env("NO_COLOR", "1").arg("daily").output()?;
    let text = String::from_utf8(daily.stdout)?;
    assert!(text.find("2025-01-15").unwrap() < text.find("2025-02-01").unwrap());

    let sessions = cli(temp_dir.path()).env("NO_COLOR", "1").arg("session").output()?;
    let text = String::from_utf8(sessions.stdout)?;
    assert!(text.find("2025-02-01 00:00").unwrap() < text.find("2025-01-15 10:00").unwrap());

    let sessions = cli(temp_dir.path())
        .env("NO_COLOR", "1")
        .args(["session", "--asc"])
        .output()?;
    let text = String::from_utf8(sessions.stdout)?;
    assert!(text.find("2025-01-15 10:00").unwrap() < text.find("2025-02-01 00:00").unwrap());
    Ok(())
}

#[test]
fn test_cli_models_text_report() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;

    cli(temp_dir.path())
        .arg("models")
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Opus 4"))
        .stdout(predicate::str::contains("unknown-model"))
        .stdout(predicate::str::contains("TOTAL"));
    Ok(())
}

#[test]
fn test_cli_until_date_formats() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;

    let output = cli(temp_dir.path())
        .args(["monthly", "--json", "--until", "20250131"])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["month"], 1);
    Ok(())
}

#[test]
fn test_cli_missing_directory_fails() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let missing = temp_dir.path().join("nowhere");

    Command::cargo_bin("usage-ledger")?
        .current_dir(temp_dir.path())
        .arg("--dir")
        .arg(&missing)
        .arg("session")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("nowhere"));
    Ok(())
}

#[test]
fn test_cli_invalid_date_reports_json_error() -> anyhow::Result<()> {
    let temp_dir = setup_projects_dir()?;

    cli(temp_dir.path())
        .args(["daily", "--json", "--since", "2025-13-40"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error\""));
    Ok(())
}
