use std::process::{Command, Output};

const DEMO_MAZES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/mazes.toml");

fn explorer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_maze-explorer"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to start maze-explorer")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn demo_maze_is_solved_by_name() {
    let output = explorer(&["--mazes", DEMO_MAZES, "--maze", "plus"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("reward 5/5"));
    assert!(text.contains("1 of 1 mazes solved, 5 reward banked"));
}

#[test]
fn portal_maze_reports_its_portal() {
    let output = explorer(&["--mazes", DEMO_MAZES, "--maze", "wrap"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("portals 1"));
}

#[test]
fn unknown_demo_maze_fails_with_known_names() {
    let output = explorer(&["--mazes", DEMO_MAZES, "--maze", "spiral"]);

    assert!(!output.status.success());
    let errors = String::from_utf8_lossy(&output.stderr);
    assert!(errors.contains("no maze `spiral`"));
    assert!(errors.contains("corridor, plus"));
}

#[test]
fn generated_maze_is_solved() {
    let output = explorer(&["--generate", "6x5", "--seed", "3"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("1 of 1 mazes solved"));
}
