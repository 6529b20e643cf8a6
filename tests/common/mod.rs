#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const OPUS: &str = "claude-opus-4-20250514";
pub const SONNET: &str = "claude-sonnet-4-20250514";

pub fn create_test_jsonl(dir: &Path, filename: &str, content: &str) -> Result<()> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(())
}

/// One billable assistant line in the on-disk log format.
pub fn assistant_line(session: &str, timestamp: &str, model: &str, input: u64, output: u64) -> String {
    format!(
        r#"{{"parentUuid":null,"sessionId":"{}","timestamp":"{}","type":"assistant","message":{{"id":"msg","role":"assistant","model":"{}","content":[],"usage":{{"input_tokens":{},"output_tokens":{},"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}}}}"#,
        session, timestamp, model, input, output
    )
}

pub fn user_line(session: &str, timestamp: &str) -> String {
    format!(
        r#"{{"sessionId":"{}","timestamp":"{}","type":"user","message":{{"role":"user","content":"hello"}}}}"#,
        session, timestamp
    )
}

pub fn summary_line() -> String {
    r#"{"type":"summary","summary":"Refactor session","leafUuid":"abc"}"#.to_string()
}

/// A projects directory with two projects, noise lines, and a non-log file.
///
/// Billable events:
/// - session-a: 2025-01-15 10:00 opus 1000/100, 2025-01-15 18:30 sonnet 500/50
/// - session-b: 2025-01-16 09:00 sonnet 2000/200
/// - session-c: 2025-02-01 00:00 unknown-model 400/40
pub fn setup_projects_dir() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let project_a = [
        summary_line(),
        user_line("session-a", "2025-01-15T09:59:00.000Z"),
        assistant_line("session-a", "2025-01-15T10:00:00.000Z", OPUS, 1000, 100),
        "{not json at all".to_string(),
        assistant_line("session-a", "2025-01-15T18:30:00.000Z", SONNET, 500, 50),
    ]
    .join("\n");
    create_test_jsonl(root, "-home-me-project-a/session-a.jsonl", &project_a)?;

    let project_b = [
        assistant_line("session-b", "2025-01-16T09:00:00.000Z", SONNET, 2000, 200),
        user_line("session-b", "2025-01-16T09:01:00.000Z"),
    ]
    .join("\n");
    create_test_jsonl(root, "-home-me-project-b/session-b.jsonl", &project_b)?;

    let nested = assistant_line("session-c", "2025-02-01T00:00:00.000Z", "unknown-model", 400, 40);
    create_test_jsonl(root, "-home-me-project-b/archive/2025/session-c.jsonl", &nested)?;

    create_test_jsonl(
        root,
        "-home-me-project-b/notes.txt",
        &assistant_line("ignored", "2025-01-16T09:00:00.000Z", OPUS, 9, 9),
    )?;

    Ok(temp_dir)
}
