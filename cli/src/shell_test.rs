use std::io::Cursor;

use orgchart::EmployeeRecord;

use super::*;

fn chart() -> Hierarchy {
    Hierarchy::from(vec![
        EmployeeRecord::new("Alice", "CEO", None),
        EmployeeRecord::new("Bob", "VP of Sales", Some("Alice")),
        EmployeeRecord::new("Dana", "Regional Manager", Some("Bob")),
    ])
}

fn run(shell: &mut Shell, script: &str) -> String {
    let mut out = Vec::new();
    shell.run(Cursor::new(script), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn commands_report_feedback() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    let output = run(
        &mut shell,
        "Move dana under Alice\nRemove Ethan\nAdd Frank as Director reporting to Bob\nPromote Alice\n",
    );
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        [
            "Moved 1 employee under Alice.",
            "No employee named 'Ethan'; nothing changed.",
            "Added Frank.",
            "Command not recognized: unknown command `Promote`; expected Move, Add, or Remove.",
        ]
    );
    assert_eq!(shell.hierarchy.len(), 4);
}

#[test]
fn blank_lines_are_skipped() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    assert_eq!(run(&mut shell, "\n   \n"), "");
}

#[test]
fn quit_stops_reading() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    run(&mut shell, ":quit\nRemove Bob\n");
    assert_eq!(shell.hierarchy.len(), 3);
}

#[test]
fn mermaid_prints_diagram() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    let output = run(&mut shell, ":mermaid\n");
    assert!(output.starts_with("graph TD\n"));
    assert!(output.contains("    Bob --> Dana\n"));
}

#[test]
fn live_mode_prints_diagram_after_changes_only() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    shell.live = true;
    let output = run(&mut shell, "Remove Nobody\nRemove Dana\n");
    assert_eq!(output.matches("graph TD").count(), 1);
}

#[test]
fn list_shows_managers() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    let output = run(&mut shell, ":list\n");
    assert_eq!(output, "Alice (CEO)\nBob (VP of Sales) -> Alice\nDana (Regional Manager) -> Bob\n");
}

#[test]
fn list_empty_chart() {
    let mut shell = Shell::new(Hierarchy::new(), DiagramOptions::default());
    assert_eq!(run(&mut shell, ":list\n"), "(no employees)\n");
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.csv");
    let path = path.to_str().unwrap();

    let mut shell = Shell::new(chart(), DiagramOptions::default());
    let output = run(&mut shell, &format!(":save {path}\n"));
    assert_eq!(output, format!("Saved 3 employees to {path}.\n"));

    let mut fresh = Shell::new(Hierarchy::new(), DiagramOptions::default());
    let output = run(&mut fresh, &format!(":load {path}\n"));
    assert_eq!(output, "Chart loaded successfully (3 employees).\n");
    assert_eq!(fresh.hierarchy, chart());
}

#[test]
fn failed_load_keeps_chart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Employee,Role\nAlice,CEO\n").unwrap();

    let mut shell = Shell::new(chart(), DiagramOptions::default());
    let output = run(&mut shell, &format!(":load {}\n", path.display()));
    assert!(output.starts_with("Error loading CSV: missing required column `Name`"));
    assert_eq!(shell.hierarchy, chart());
}

#[test]
fn missing_argument_prints_usage() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    assert_eq!(run(&mut shell, ":load\n"), "Usage: :load <file>\n");
}

#[test]
fn unknown_shell_command() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    assert_eq!(run(&mut shell, ":frobnicate\n"), "Unknown shell command `:frobnicate`; try :help\n");
}

#[test]
fn prompt_is_written_when_enabled() {
    let mut shell = Shell::new(chart(), DiagramOptions::default());
    shell.prompt = true;
    assert_eq!(run(&mut shell, "Remove Dana\n"), "> Removed 1 employee.\n> ");
}

#[test]
fn ambiguous_commands_are_flagged() {
    let mut shell = Shell::new(Hierarchy::new(), DiagramOptions::default());
    let output = run(&mut shell, "Add Frank as Head as Needed reporting to Bob\n");
    assert_eq!(output, "Added Frank as Head. (ambiguous command: split on the last keyword)\n");
}
