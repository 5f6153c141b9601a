// Integration tests
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use uutests::util::TestScenario;
use uutests::{at_and_ucmd, new_ucmd, util_name};

const LINES: &str = "l1\nl2\nl3\nl4\nl5\n";

// Test application's invocation
#[test]
fn test_invalid_arg() {
    new_ucmd!().arg("--definitely-invalid").fails().code_is(1);
}

#[test]
fn test_debug() {
    new_ucmd!()
        .args(&["--debug", "s/a/b/"])
        .pipe_in("a\n")
        .succeeds()
        .stdout_is("b\n")
        .stderr_contains("compiled script");
}

#[test]
fn test_silent_alias() {
    new_ucmd!()
        .args(&["--silent", "2p"])
        .pipe_in(LINES)
        .succeeds()
        .stdout_is("l2\n");
}

#[test]
fn test_missing_script_argument() {
    new_ucmd!()
        .fails()
        .code_is(1)
        .stderr_contains("missing script");
}

#[test]
fn test_empty_positional_script() {
    new_ucmd!()
        .arg("")
        .pipe_in(LINES)
        .succeeds()
        .stdout_is(LINES);
}

#[test]
fn test_f_script() {
    let mut temp = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(temp, "# comment\n1d").expect("Failed to write to temp file");

    new_ucmd!()
        .arg("-f")
        .arg(temp.path())
        .pipe_in("a\nb\n")
        .succeeds()
        .stdout_is("b\n");
}

#[test]
fn test_script_fragments_in_order() {
    new_ucmd!()
        .args(&["-e", "s/l/L/", "-e", "s/L/M/"])
        .pipe_in("l1\n")
        .succeeds()
        .stdout_is("M1\n");
}

#[test]
fn test_substitute_first() {
    new_ucmd!()
        .arg("s/a/b/")
        .pipe_in("banana\n")
        .succeeds()
        .stdout_is("bbnana\n");
}

#[test]
fn test_substitute_global() {
    new_ucmd!()
        .arg("s/a/b/g")
        .pipe_in("banana\n")
        .succeeds()
        .stdout_is("bbnbnb\n");
}

#[test]
fn test_delete_range() {
    new_ucmd!()
        .arg("2,4d")
        .pipe_in("1\n2\n3\n4\n5\n")
        .succeeds()
        .stdout_is("1\n5\n");
}

#[test]
fn test_last_line_substitution() {
    new_ucmd!()
        .arg("$s/$/END/")
        .pipe_in("x\ny\nz\n")
        .succeeds()
        .stdout_is("x\ny\nzEND\n");
}

#[test]
fn test_empty_regex_reuse() {
    new_ucmd!()
        .arg("/abc/s//X/")
        .pipe_in("xabcz\n")
        .succeeds()
        .stdout_is("xXz\n");
}

#[test]
fn test_missing_delimiter() {
    new_ucmd!()
        .arg("s/a/b")
        .pipe_in("a\n")
        .ignore_stdin_write_error()
        .fails()
        .code_is(1)
        .no_stdout()
        .stderr_contains("-e #1:1:")
        .stderr_contains("error: unterminated `s' command: missing delimiter `/'");
}

#[test]
fn test_undefined_label() {
    new_ucmd!()
        .arg("b nowhere")
        .pipe_in("a\n")
        .ignore_stdin_write_error()
        .fails()
        .code_is(1)
        .stderr_contains("can't find label for jump to `nowhere'");
}

#[test]
fn test_unknown_command() {
    new_ucmd!()
        .arg("k")
        .pipe_in("a\n")
        .ignore_stdin_write_error()
        .fails()
        .code_is(1)
        .stderr_contains("unknown command: `k'");
}

#[test]
fn test_quit_exit_code() {
    new_ucmd!()
        .arg("2q5")
        .pipe_in(LINES)
        .fails()
        .code_is(5)
        .stdout_is("l1\nl2\n");
}

#[test]
fn test_quit_silent() {
    new_ucmd!()
        .arg("3Q")
        .pipe_in(LINES)
        .succeeds()
        .stdout_is("l1\nl2\n");
}

#[test]
fn test_no_new_line_preserved() {
    new_ucmd!()
        .arg("s/l/L/g")
        .pipe_in("l1\nl2")
        .succeeds()
        .stdout_is("L1\nL2");
}

#[test]
fn test_extended_groups() {
    new_ucmd!()
        .args(&["-E", r"s/(.)(.)/\2\1/"])
        .pipe_in("ab\n")
        .succeeds()
        .stdout_is("ba\n");
}

#[test]
fn test_basic_groups() {
    new_ucmd!()
        .arg(r"s/\(.\)\(.\)/\2\1/")
        .pipe_in("ab\n")
        .succeeds()
        .stdout_is("ba\n");
}

#[test]
fn test_native_syntax() {
    new_ucmd!()
        .args(&["-E", "-p", r"s/(\d+)/<\1>/g"])
        .pipe_in("a1b22\n")
        .succeeds()
        .stdout_is("a<1>b<22>\n");
}

#[test]
fn test_dash_range_end_point() {
    new_ucmd!()
        .arg("s/[+--]/X/g")
        .pipe_in("a+b-c,d\n")
        .succeeds()
        .stdout_is("aXbXcXd\n");
}

#[test]
fn test_multiple_range_from_a_multiple() {
    new_ucmd!()
        .args(&["-n", "4,~4p"])
        .pipe_in("1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n")
        .succeeds()
        .stdout_is("4\n5\n6\n7\n8\n");
}

#[test]
fn test_posix_class_rejected() {
    new_ucmd!()
        .arg("s/[[:digit:]]/x/")
        .pipe_in("1\n")
        .ignore_stdin_write_error()
        .fails()
        .code_is(1)
        .stderr_contains("not supported");
}

#[test]
fn test_blocks_and_branches() {
    new_ucmd!()
        .args(&["-n", "/l[24]/{s/l/L/;p}"])
        .pipe_in(LINES)
        .succeeds()
        .stdout_is("L2\nL4\n");
    new_ucmd!()
        .arg(":a;N;$!ba;s/\\n/,/g")
        .pipe_in(LINES)
        .succeeds()
        .stdout_is("l1,l2,l3,l4,l5\n");
}

#[test]
fn test_line_wrap_length() {
    new_ucmd!()
        .args(&["-n", "-l", "4", "l"])
        .pipe_in("abcdef\n")
        .succeeds()
        .stdout_is("abc\\\ndef$\n");
}

#[test]
fn test_line_length_one_disables_wrap() {
    new_ucmd!()
        .args(&["-n", "-l", "1", "l"])
        .pipe_in("abcdef\n")
        .succeeds()
        .stdout_is("abcdef$\n");
    new_ucmd!()
        .args(&["-n", "l 1"])
        .pipe_in("abc\n")
        .succeeds()
        .stdout_is("abc$\n");
}

#[test]
fn test_null_data() {
    new_ucmd!()
        .args(&["-z", "s/^/>/"])
        .pipe_in("a\0b\0")
        .succeeds()
        .stdout_is(">a\0>b\0");
}

#[test]
fn test_files_and_separate() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("one", "a\nb\n");
    at.write("two", "c\nd\n");
    ucmd.args(&["-n", "-s", "$p;1F", "one", "two"])
        .succeeds()
        .stdout_is("one\nb\ntwo\nd\n");
}

#[test]
fn test_continuous_stream() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("one", "a\nb\n");
    at.write("two", "c\nd\n");
    ucmd.args(&["-n", "$=", "one", "two"])
        .succeeds()
        .stdout_is("4\n");
}

#[test]
fn test_missing_input_file() {
    new_ucmd!()
        .args(&["p", "/nonexistent/input"])
        .fails()
        .code_is(1)
        .stderr_contains("can't read");
}

#[test]
fn test_in_place_with_backup() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("file", "hello\nworld\n");
    ucmd.args(&["-i.orig", "s/o/0/g", "file"])
        .succeeds()
        .no_stdout();
    assert_eq!(at.read("file"), "hell0\nw0rld\n");
    assert_eq!(at.read("file.orig"), "hello\nworld\n");
}

#[test]
fn test_in_place_backup_pattern() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("data", "x\n");
    ucmd.args(&["--in-place=saved_*", "s/x/y/", "data"])
        .succeeds();
    assert_eq!(at.read("data"), "y\n");
    assert_eq!(at.read("saved_data"), "x\n");
}

#[test]
fn test_in_place_without_suffix() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("one", "1\n2\n");
    at.write("two", "3\n");
    ucmd.args(&["-i", "1d", "one", "two"]).succeeds();
    assert_eq!(at.read("one"), "2\n");
    assert_eq!(at.read("two"), "");
}

#[test]
fn test_write_file() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("input", LINES);
    ucmd.args(&["-n", "/l[13]/w out", "input"]).succeeds().no_stdout();
    assert_eq!(at.read("out"), "l1\nl3\n");
}

#[test]
fn test_read_file() {
    let (at, mut ucmd) = at_and_ucmd!();
    at.write("input", "a\nb\n");
    at.write("extra", "inserted\n");
    ucmd.args(&["1r extra", "input"])
        .succeeds()
        .stdout_is("a\ninserted\nb\n");
}

#[test]
fn test_sandbox_rejects_write() {
    new_ucmd!()
        .args(&["--sandbox", "w out"])
        .pipe_in("a\n")
        .ignore_stdin_write_error()
        .fails()
        .code_is(1)
        .stderr_contains("disabled in sandbox mode");
}

#[test]
fn test_text_commands() {
    new_ucmd!()
        .arg("1i\\\nfirst\n$a\\\nlast\n2c\\\nchanged")
        .pipe_in("a\nb\nc\n")
        .succeeds()
        .stdout_is("first\na\nchanged\nc\nlast\n");
}

#[test]
fn test_version_requirement() {
    new_ucmd!().arg("v 4.2").pipe_in("a\n").succeeds().stdout_is("a\n");
    new_ucmd!()
        .arg("v 9.0")
        .pipe_in("a\n")
        .ignore_stdin_write_error()
        .fails()
        .code_is(1)
        .stderr_contains("expected newer version of sed");
}

#[test]
fn test_script_flag_quiet() {
    new_ucmd!()
        .arg("#n\n2p")
        .pipe_in(LINES)
        .succeeds()
        .stdout_is("l2\n");
}
