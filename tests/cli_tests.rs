//! CLI interface tests

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn linguality(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_linguality"));
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("LINGUALITY_API_BASE")
        .env_remove("LINGUALITY_USER_ID");
    cmd
}

fn run_with_input(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("Failed to wait")
}

#[test]
fn test_help_command() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .arg("--help")
        .output()
        .expect("Failed to run help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    for command in ["read", "words", "library", "practice", "cache", "config"] {
        assert!(stdout.contains(command), "Should list {} command", command);
    }
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .arg("--version")
        .output()
        .expect("Failed to run version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("linguality"), "Should show program name");
}

#[test]
fn test_read_help() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["read", "--help"])
        .output()
        .expect("Failed to run read help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--file"), "Should have file option");
    assert!(stdout.contains("--chapter"), "Should have chapter option");
    assert!(stdout.contains("--no-cache"), "Should have no-cache option");
}

#[test]
fn test_invalid_command() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .arg("invalid_command")
        .output()
        .expect("Failed to run invalid command");

    assert!(!output.status.success(), "Should fail on invalid command");
}

#[test]
fn test_read_requires_a_book() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .arg("read")
        .output()
        .expect("Failed to run read without a book");

    assert!(!output.status.success(), "Should fail without a book");
}

#[test]
fn test_read_local_file() {
    let home = TempDir::new().unwrap();
    let book = home.path().join("story.txt");
    std::fs::write(&book, "we sat down to listen").unwrap();

    let mut cmd = linguality(home.path());
    cmd.args(["read", "--file", book.to_str().unwrap()]);
    let output = run_with_input(cmd, "n\nn\nj 99\np\nq\n");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[1/5 0.0%]"), "Should start at the first word");
    assert!(
        stdout.contains("Stopped at word 4 (60.0%)"),
        "Should report the final position, got:\n{}",
        stdout
    );
}

#[test]
fn test_read_jump_uses_displayed_numbers() {
    let home = TempDir::new().unwrap();
    let book = home.path().join("story.txt");
    std::fs::write(&book, "we sat down to listen").unwrap();

    let mut cmd = linguality(home.path());
    cmd.args(["read", "--file", book.to_str().unwrap()]);
    let output = run_with_input(cmd, "j 3\nj 0\nq\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[3/5 40.0%]"), "got:\n{}", stdout);
    assert!(stdout.contains("counting from 1"), "Should reject word 0");
    assert!(stdout.contains("Stopped at word 3 (40.0%)"));
}

#[test]
fn test_read_local_file_end_of_input_closes_session() {
    let home = TempDir::new().unwrap();
    let book = home.path().join("story.txt");
    std::fs::write(&book, "one two three").unwrap();

    let mut cmd = linguality(home.path());
    cmd.args(["read", "--file", book.to_str().unwrap(), "--word", "1"]);
    let output = run_with_input(cmd, "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stopped at word 1"));
}

#[test]
fn test_read_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["read", "--file", "/nonexistent/book.txt"])
        .output()
        .expect("Failed to run read");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read book file"));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();

    let output = linguality(home.path())
        .args(["config", "set", "reader.font_size", "20"])
        .output()
        .expect("Failed to run config set");
    assert!(output.status.success());

    let output = linguality(home.path())
        .args(["config", "get", "reader.font_size"])
        .output()
        .expect("Failed to run config get");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reader.font_size = 20"));
}

#[test]
fn test_config_unknown_key() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["config", "get", "reader.colour"])
        .output()
        .expect("Failed to run config get");

    assert!(!output.status.success());
}

#[test]
fn test_env_overrides_user() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .env("LINGUALITY_USER_ID", "reader-7")
        .args(["config", "get", "api.user_id"])
        .output()
        .expect("Failed to run config get");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("api.user_id = reader-7"));
}

#[test]
fn test_words_requires_user() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["words", "stats"])
        .output()
        .expect("Failed to run words");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No user configured"));
}

#[test]
fn test_cache_list_empty() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["cache", "list"])
        .output()
        .expect("Failed to run cache list");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Cache] 0 books"));
}

#[test]
fn test_practice_history_empty() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["practice", "--history"])
        .output()
        .expect("Failed to run practice history");

    assert!(output.status.success(), "History needs no user");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No practice sessions yet"));
}

#[test]
fn test_practice_history_lists_sessions() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("data").join("linguality");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("practice_history.json"),
        r#"{"sessions":[{"timestamp":"2026-03-02T10:30:00Z","gameType":"spelling","wordCount":4,"correctCount":3,"totalTime":42}]}"#,
    )
    .unwrap();

    let output = linguality(home.path())
        .args(["practice", "--history"])
        .output()
        .expect("Failed to run practice history");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Last 1 sessions"));
    assert!(stdout.contains("2026-03-02 10:30"));
    assert!(stdout.contains("3/4 (75%) in 42s"), "got:\n{}", stdout);
}

#[test]
fn test_unknown_option_values_rejected() {
    let home = TempDir::new().unwrap();
    let output = linguality(home.path())
        .args(["practice", "--difficulty", "extreme"])
        .output()
        .expect("Failed to run practice");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown difficulty"), "got:\n{}", stderr);

    let output = linguality(home.path())
        .args(["library", "--format", "pdf"])
        .output()
        .expect("Failed to run library");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown format"));
}
