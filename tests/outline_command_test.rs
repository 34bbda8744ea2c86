use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(args: &[&str]) -> Output {
    Command::new("cargo")
        .arg("run")
        .arg("--quiet")
        .arg("--")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_outline_command_prints_script() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("reply.txt");
    let reply = "Sure! [{\"title\":\"S1\"},{\"title\":\"S2\",\"points\":[\"a\",\"b\"]}] Hope this helps!";
    fs::write(&input_path, reply).expect("Failed to write model reply");

    let output = run_command(&[
        "outline",
        "-i",
        input_path.to_str().unwrap(),
        "--default-slide-id",
        "g_default",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let script: serde_json::Value =
        serde_json::from_str(&stdout).expect("Command should print the script as JSON");
    let operations = script.as_array().expect("script is a JSON array");

    let creates = operations
        .iter()
        .filter(|op| op["op"] == "create_slide")
        .count();
    assert_eq!(creates, 2, "Expected one create_slide per slide");
    assert_eq!(operations.last().unwrap()["op"], "delete_object");
    assert_eq!(operations.last().unwrap()["object_id"], "g_default");
    assert!(operations
        .iter()
        .any(|op| op["op"] == "insert_text" && op["text"] == "• a\n• b"));
}

#[test]
fn test_outline_command_rejects_reply_without_array() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("reply.txt");
    fs::write(&input_path, "I cannot make slides.").expect("Failed to write model reply");

    let output = run_command(&["outline", "-i", input_path.to_str().unwrap()]);

    assert!(!output.status.success(), "Command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No slide outline array found"),
        "Unexpected error output: {}",
        stderr
    );
}

#[test]
fn test_run_command_requires_google_credentials() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--", "run"])
        .args(["--course", "Compilers", "--members", "f74122030"])
        .args(["--assignment", "/nonexistent/assignment.pdf"])
        .env("API_KEY", "key")
        .env("API_URL", "http://localhost:11434/api/chat")
        .env_remove("GOOGLE_ACCESS_TOKEN")
        .env_remove("GOOGLE_SERVICE_ACCOUNT_KEY")
        .env_remove("GOOGLE_SERVICE_ACCOUNT_JSON")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No Google credentials configured"),
        "Unexpected error output: {}",
        stderr
    );
}
