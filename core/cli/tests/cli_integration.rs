//! Integration tests for the `dbc` compiler CLI.
//!
//! Spawns the built binary and asserts on stdout/stderr/exit code and the
//! files it writes, mirroring the teacher's `cli_integration.rs` structure:
//! input-validation tests, phase-execution tests, error-message tests.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn fixture(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn dbc() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dbc"))
}

#[test]
fn fails_when_file_missing() {
    dbc()
        .arg("this-file-does-not-exist.dbasic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn requires_extension_without_outfile() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let infile = tmp.child("noext");
    infile.write_str("FUNC main()\nRETURN 0\nEND\n").unwrap();

    dbc()
        .arg(infile.path())
        .arg("-t")
        .arg("c")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file-extension"));
}

#[test]
fn emits_c_for_hello() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let outfile = tmp.child("hello.c");

    dbc()
        .arg(fixture("hello.dbasic"))
        .arg("-t")
        .arg("c")
        .arg("-o")
        .arg(outfile.path())
        .assert()
        .success();

    outfile.assert(predicate::str::contains("int main()"));
    outfile.assert(predicate::str::contains("print("));
}

#[test]
fn emits_asm_for_hello() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let outfile = tmp.child("hello.asm");

    dbc()
        .arg(fixture("hello.dbasic"))
        .arg("-t")
        .arg("asm")
        .arg("-o")
        .arg(outfile.path())
        .assert()
        .success();

    outfile.assert(predicate::str::contains(".globl main"));
    outfile.assert(predicate::str::contains("main:"));
    // Prettified: instruction lines are indented, label lines are not.
    outfile.assert(predicate::str::contains("\n    mov"));
}

#[test]
fn recursive_function_compiles_to_c() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let outfile = tmp.child("fib.c");

    dbc()
        .arg(fixture("fib.dbasic"))
        .arg("-t")
        .arg("c")
        .arg("-o")
        .arg(outfile.path())
        .assert()
        .success();

    outfile.assert(predicate::str::contains("int fib(int n)"));
}

#[test]
fn default_outfile_derives_from_infile_stem() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let infile = tmp.child("prog.dbasic");
    infile.write_str("FUNC main()\nRETURN 0\nEND\n").unwrap();

    dbc()
        .current_dir(tmp.path())
        .arg(infile.path())
        .arg("-t")
        .arg("asm")
        .assert()
        .success();

    tmp.child("prog.asm").assert(predicate::path::exists());
}

#[test]
fn read_loop_compiles_while_and_reassignment() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let outfile = tmp.child("read_loop.c");

    dbc()
        .arg(fixture("read_loop.dbasic"))
        .arg("-t")
        .arg("c")
        .arg("-o")
        .arg(outfile.path())
        .assert()
        .success();

    outfile.assert(predicate::str::contains("while ((x > 0)) {"));
    outfile.assert(predicate::str::contains("x = (x - 1);"));
    outfile.assert(predicate::str::contains("int input(void)"));
}

#[test]
fn global_counter_shares_state_across_calls() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let outfile = tmp.child("global_counter.c");

    dbc()
        .arg(fixture("global_counter.dbasic"))
        .arg("-t")
        .arg("c")
        .arg("-o")
        .arg(outfile.path())
        .assert()
        .success();

    outfile.assert(predicate::str::contains("int n = 0;"));
    outfile.assert(predicate::str::contains("int bump() {"));
    outfile.assert(predicate::str::contains("n = (n + 1);"));
    outfile.assert(predicate::str::contains("return n;"));
}

#[test]
fn semantic_error_reports_line_and_exits_nonzero() {
    dbc()
        .arg(fixture("undeclared.dbasic"))
        .arg("-t")
        .arg("c")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn parse_error_exits_nonzero() {
    dbc()
        .arg(fixture("missing_then_newline.dbasic"))
        .arg("-t")
        .arg("c")
        .assert()
        .failure();
}

#[test]
fn version_flag_prints_version() {
    dbc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbc"));
}
