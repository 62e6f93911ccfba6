//! Black-box tests for the `lessonplan` binary. None of these need a
//! database or network access.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the binary with an isolated config directory and no inherited
/// lessonplan/Gemini settings.
fn lessonplan(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lessonplan"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("LESSONPLAN_DATABASE_URL")
        .env_remove("LESSONPLAN_OWNER_ID")
        .env_remove("GEMINI_API_KEY")
        .env_remove("GEMINI_MODEL")
        .output()
        .expect("failed to run lessonplan binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn init_writes_config_and_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();

    let first = lessonplan(
        home.path(),
        &["init", "--db-url", "postgresql://db:5432/plans", "--gemini-api-key", "k-123"],
    );
    assert!(first.status.success(), "stderr: {}", stderr(&first));

    let path = home.path().join("lessonplan").join("config.toml");
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("postgresql://db:5432/plans"));
    assert!(text.contains("k-123"));
    assert!(text.contains("[owner]"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    let second = lessonplan(home.path(), &["init"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already exists"));

    let forced = lessonplan(home.path(), &["init", "--force"]);
    assert!(forced.status.success(), "stderr: {}", stderr(&forced));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("k-123"));
}

#[test]
fn generate_rejects_invalid_request_before_connecting() {
    let home = TempDir::new().unwrap();

    let output = lessonplan(
        home.path(),
        &[
            "generate",
            "--topic",
            "Frações",
            "--grade-level",
            "elementary_early",
            "--duration",
            "0",
        ],
    );

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("invalid generation request"), "stderr: {err}");
}

#[test]
fn plan_commands_require_an_owner() {
    let home = TempDir::new().unwrap();

    let output = lessonplan(home.path(), &["plan", "list"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("owner id not found"), "stderr: {err}");
}

#[test]
fn generate_requires_api_key() {
    let home = TempDir::new().unwrap();

    let output = lessonplan(
        home.path(),
        &[
            "--owner",
            "00000000-0000-0000-0000-000000000001",
            "generate",
            "--topic",
            "Frações",
            "--grade-level",
            "elementary_early",
            "--duration",
            "50",
        ],
    );

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Gemini API key not found"), "stderr: {err}");
}
