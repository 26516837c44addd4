use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// `aidentify` with an empty config file, no inherited environment and a
/// working directory without `.env`
fn aidentify(dir: &TempDir) -> Command {
    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();

    let mut cmd = Command::cargo_bin("aidentify").unwrap();
    cmd.env_clear()
        .env("RUST_LOG", "error")
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config);
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("aidentify")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("recognize")
                .and(predicate::str::contains("import"))
                .and(predicate::str::contains("voice"))
                .and(predicate::str::contains("init-storage"))
                .and(predicate::str::contains("add-photo")),
        );
}

#[test]
fn test_list_without_supabase_config_fails() {
    let dir = TempDir::new().unwrap();
    aidentify(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SUPABASE_URL"));
}

#[test]
fn test_recognize_reports_unreadable_image() {
    let dir = TempDir::new().unwrap();
    aidentify(&dir)
        .args(["recognize", "missing.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.jpg"));
}

#[test]
fn test_unknown_color_is_rejected() {
    let dir = TempDir::new().unwrap();
    aidentify(&dir)
        .args([
            "add",
            "--number",
            "A-1",
            "--name",
            "Bracket",
            "--workstation",
            "WS-1",
            "--color",
            "Purple",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown part color"));
}

#[test]
fn test_invalid_log_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    aidentify(&dir)
        .args(["--log-format", "xml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pretty|json"));
}

#[test]
fn test_voice_rejects_empty_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("silence.pcm");
    fs::write(&input, []).unwrap();

    aidentify(&dir)
        .arg("voice")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("reply.pcm"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_chat_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    aidentify(&dir)
        .args(["chat", "which parts go to WS-1?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}
