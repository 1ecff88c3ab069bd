// Exit status of the command line tool

use std::fs::OpenOptions;
use std::process::{Command, Output, Stdio};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/raylib_subset.json");

fn raybind(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_raybind"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("raybind should start")
}

#[test]
fn test_layout_succeeds_on_a_complete_description() {
    let output = raybind(&["-q", "layout", FIXTURE]);

    assert!(output.status.success(), "{:?}", output);
    let table = String::from_utf8_lossy(&output.stdout);
    assert!(table.contains("Camera3D (44 bytes)"));
}

#[test]
fn test_failures_set_the_exit_status() {
    let output = raybind(&["-q", "layout", "--keep-order", FIXTURE]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Model"));

    let output = raybind(&["-q", "layout", "--keep-order", "--keep-going", FIXTURE]);
    assert!(output.status.success(), "{:?}", output);
}

#[test]
fn test_inspect_without_a_terminal_fails() {
    // with a controlling terminal the inspector would wait for keys
    if OpenOptions::new().read(true).write(true).open("/dev/tty").is_ok() {
        return;
    }
    let output = raybind(&["-q", "inspect", FIXTURE]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}
