use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn devdeck_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_devdeck").expect("devdeck test binary not built")
}

#[test]
fn devdeck_help_lists_flags() {
    let output = Command::new(devdeck_bin())
        .arg("--help")
        .output()
        .expect("run devdeck --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("devdeck"));
    assert!(combined.contains("--kill-on-close"));
    assert!(combined.contains("--claude-cmd"));
}

#[test]
fn devdeck_version_matches_package() {
    let output = Command::new(devdeck_bin())
        .arg("--version")
        .output()
        .expect("run devdeck --version");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn devdeck_rejects_invalid_tick() {
    let output = Command::new(devdeck_bin())
        .args(["--tick-ms", "5"])
        .output()
        .expect("run devdeck --tick-ms 5");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--tick-ms must be between"));
}

#[test]
fn devdeck_todo_view_outside_repo_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = Command::new(devdeck_bin())
        .arg("todo")
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .current_dir(dir.path())
        .output()
        .expect("run devdeck todo");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("needs a git repository"));
}
