mod common;

use assert_cmd::Command;
use common::temp_config_file;
use predicates::prelude::*;
use tempfile::TempDir;

fn saanra() -> Command {
    let mut cmd = Command::cargo_bin("saanra").unwrap();
    cmd.env_remove("SAANRA_DB")
        .env_remove("SAANRA_PROVIDER")
        .env_remove("GOOGLE_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    saanra()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init-db"))
        .stdout(predicate::str::contains("chat"));
}

#[test]
fn test_init_db_creates_database_at_storage_path() {
    let (_config_dir, config_path) = temp_config_file("provider:\n  type: ollama\n");
    let data_dir = TempDir::new().unwrap();
    let db_path = data_dir.path().join("nested").join("saanra.db");

    saanra()
        .arg("--config")
        .arg(&config_path)
        .arg("--storage-path")
        .arg(&db_path)
        .arg("init-db")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database ready"))
        .stdout(predicate::str::contains("Accounts: 0"));

    assert!(db_path.exists());
}

#[test]
fn test_invalid_provider_in_config_fails() {
    let (_config_dir, config_path) = temp_config_file("provider:\n  type: openai\n");
    let data_dir = TempDir::new().unwrap();

    saanra()
        .arg("--config")
        .arg(&config_path)
        .arg("--storage-path")
        .arg(data_dir.path().join("saanra.db"))
        .arg("init-db")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid provider type"));
}

#[test]
fn test_chat_without_gemini_key_fails() {
    let (_config_dir, config_path) = temp_config_file("provider:\n  type: gemini\n");
    let data_dir = TempDir::new().unwrap();

    saanra()
        .arg("--config")
        .arg(&config_path)
        .arg("--storage-path")
        .arg(data_dir.path().join("saanra.db"))
        .arg("chat")
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));
}
