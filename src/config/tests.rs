use super::validation::sanitize_binary;
use super::*;
use crate::modal::ModalAction;
use crate::store::Store;
use clap::Parser;

fn parse(args: &[&str]) -> AppConfig {
    let mut argv = vec!["devdeck"];
    argv.extend_from_slice(args);
    AppConfig::parse_from(argv)
}

#[test]
fn defaults_validate() {
    let mut cfg = parse(&[]);
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.view, StartView::Menu);
    assert_eq!(cfg.tick_ms, DEFAULT_TICK_MS);
    assert_eq!(cfg.max_lines, 1000);
    assert_eq!(cfg.close_behavior(), crate::modal::CloseBehavior::Detach);
}

#[test]
fn positional_view_accepts_todo_alias() {
    assert_eq!(parse(&["todo"]).view, StartView::Todo);
    assert_eq!(parse(&["todos"]).view, StartView::Todo);
    assert!(AppConfig::try_parse_from(["devdeck", "branches"]).is_err());
}

#[test]
fn rejects_tick_out_of_bounds() {
    assert!(parse(&["--tick-ms", "5"]).validate().is_err());
    assert!(parse(&["--tick-ms", "1001"]).validate().is_err());
    assert!(parse(&["--tick-ms", "10"]).validate().is_ok());
}

#[test]
fn rejects_max_lines_out_of_bounds() {
    assert!(parse(&["--max-lines", "9"]).validate().is_err());
    assert!(parse(&["--max-lines", "100001"]).validate().is_err());
    assert!(parse(&["--max-lines", "10"]).validate().is_ok());
}

#[test]
fn kill_on_close_selects_terminate() {
    let cfg = parse(&["--kill-on-close", "--tick-ms", "100", "--max-lines", "50"]);
    let settings = cfg.modal_settings();
    assert_eq!(settings.close_behavior, crate::modal::CloseBehavior::Terminate);
    assert_eq!(settings.tick_interval, std::time::Duration::from_millis(100));
    assert_eq!(settings.max_lines, 50);
}

#[test]
fn no_logs_overrides_logs() {
    assert!(parse(&["--logs"]).logging_enabled());
    assert!(!parse(&["--logs", "--no-logs"]).logging_enabled());
    assert!(!parse(&[]).logging_enabled());
}

#[test]
fn sanitize_binary_rejects_shell_syntax() {
    assert_eq!(sanitize_binary(" claude ", "--claude-cmd").unwrap(), "claude");
    assert!(sanitize_binary("", "--git-cmd").is_err());
    assert!(sanitize_binary("git status", "--git-cmd").is_err());
    assert!(sanitize_binary("git;rm", "--git-cmd").is_err());
    assert!(sanitize_binary("$(evil)", "--git-cmd").is_err());
    assert!(sanitize_binary("/definitely/not/here/git", "--git-cmd").is_err());
}

#[test]
fn sanitize_binary_canonicalizes_paths() {
    let resolved = sanitize_binary("/bin/sh", "--shell-cmd").unwrap();
    assert!(resolved.starts_with('/'));
}

#[cfg(unix)]
#[test]
fn sanitize_binary_rejects_non_executable_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not-exec");
    std::fs::write(&file, "#!/bin/sh\n").unwrap();
    let err = sanitize_binary(file.to_str().unwrap(), "--git-cmd").unwrap_err();
    assert!(err.to_string().contains("not executable"));
}

#[test]
fn data_dir_pointing_at_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("file");
    std::fs::write(&file, "").unwrap();
    let mut cfg = parse(&["--data-dir", file.to_str().unwrap()]);
    assert!(cfg.validate().is_err());
}

#[test]
fn shift_letter_matches_uppercase() {
    assert!(matches("G", "shift+g"));
    assert!(matches("shift+g", "G"));
    assert!(matches("G", "G"));
    assert!(!matches("g", "G"));
    assert!(matches("shift+tab", "shift+tab"));
    assert!(!matches("tab", "shift+tab"));
    assert!(!matches("x", ""));
    assert_eq!(normalize_binding("shift+a"), "A");
    assert_eq!(normalize_binding("shift+1"), "shift+1");
    assert_eq!(normalize_binding("ctrl+a"), "ctrl+a");
}

#[test]
fn matches_any_checks_every_binding() {
    assert!(matches_any("q", &["esc", "q"]));
    assert!(!matches_any("x", &["esc", "q"]));
    assert!(!matches_any("x", &[]));
}

#[test]
fn merge_fills_only_empty_fields() {
    let mut custom = Keybindings::default();
    custom.global.quit = "x".into();
    custom.global.move_up = String::new();
    custom.editor.save = " ".into();
    let merged = custom.merged_with_defaults();
    assert_eq!(merged.global.quit, "x");
    assert_eq!(merged.global.move_up, "k");
    assert_eq!(merged.editor.save, "ctrl+s");
}

#[test]
fn load_creates_defaults_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let loaded = Keybindings::load(&store).unwrap();
    assert_eq!(loaded, Keybindings::default());
    assert!(store.exists(KEYBINDINGS_FILE));
}

#[test]
fn load_fills_missing_groups_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store
        .write(
            KEYBINDINGS_FILE,
            br#"{ "global": { "quit": "ctrl+q", "move_down": "" } }"#,
        )
        .unwrap();
    let loaded = Keybindings::load(&store).unwrap();
    assert_eq!(loaded.global.quit, "ctrl+q");
    assert_eq!(loaded.global.move_down, "j");
    assert_eq!(loaded.global.quit_alt, "q");
    assert_eq!(loaded.list, ListKeys::default());
}

#[test]
fn load_reports_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.write(KEYBINDINGS_FILE, b"[").unwrap();
    assert!(Keybindings::load(&store).is_err());
}

#[test]
fn modal_actions_follow_bindings() {
    let keys = Keybindings::default();
    assert_eq!(keys.modal_action("esc"), Some(ModalAction::Close));
    assert_eq!(keys.modal_action("q"), Some(ModalAction::Close));
    assert_eq!(keys.modal_action("up"), Some(ModalAction::ScrollUp));
    assert_eq!(keys.modal_action("j"), Some(ModalAction::ScrollDown));
    assert_eq!(keys.modal_action("ctrl+u"), Some(ModalAction::PageUp));
    assert_eq!(keys.modal_action("pgdown"), Some(ModalAction::PageDown));
    assert_eq!(keys.modal_action("home"), Some(ModalAction::Top));
    assert_eq!(keys.modal_action("shift+g"), Some(ModalAction::Bottom));
    assert_eq!(keys.modal_action("z"), None);
}
