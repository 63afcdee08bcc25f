//! End-to-end CLI tests, run against the built `vela` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn vela_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vela"))
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp source file");
    write!(file, "{contents}").expect("failed to write temp source file");
    file
}

#[test]
fn help_output_mentions_usage() {
    vela_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("vela")));
}

#[test]
fn arithmetic_and_assignment_prints_final_state() {
    let file = source_file("x = 2 + 3 * 4;");
    vela_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("x = 14"));
}

#[test]
fn conditional_branch_runs_the_taken_arm() {
    let file = source_file("x = 10; if (x > 5) { y = 1; } else { y = 0; }");
    vela_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("y = 1"));
}

#[test]
fn while_loop_sums_one_to_five() {
    let file = source_file("s = 0; i = 1; while (i <= 5) { s = s + i; i = i + 1; }");
    vela_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("s = 15"));
}

#[test]
fn for_loop_with_break_stops_early() {
    let file = source_file("for (i = 0; i < 10; i = i + 1) { if (i == 3) { break; } } r = i;");
    vela_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("r = 3"));
}

#[test]
fn function_call_returns_sum_of_parameters() {
    let file = source_file("func add(a, b) { return a + b; } z = add(7, 35);");
    vela_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("z = 42"));
}

#[test]
fn emit_bytecode_prints_textual_instructions() {
    let file = source_file("x = 1 + 2;");
    vela_bin()
        .arg(file.path())
        .arg("--emit")
        .arg("bytecode")
        .assert()
        .success()
        .stdout(predicate::str::contains("PUSH 1"));
}

#[test]
fn modulo_on_a_string_is_rejected_with_a_nonzero_exit() {
    let file = source_file(r#"x = "foo"; y = x % 2;"#);
    vela_bin()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("integer operands"));
}
