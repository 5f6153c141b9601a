// Program entry point and CLI processing
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

pub mod address;
pub mod command;
pub mod compiler;
pub mod delimited_parser;
pub mod error_handling;
pub mod escape_compiler;
pub mod fast_regex;
pub mod in_place;
pub mod multi_io;
pub mod named_writer;
pub mod processor;
pub mod script_char_provider;
pub mod script_line_provider;

use crate::command::{DEFAULT_LINE_LENGTH, ProcessingContext, ScriptValue};
use crate::compiler::compile;
use crate::escape_compiler::Dialect;
use crate::processor::process;
use clap::{Arg, ArgMatches, Command, arg};
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};
use uucore::error::{UResult, UUsageError, set_exit_code};
use uucore::format_usage;

const ABOUT: &str = "Stream editor for filtering and transforming text";
const USAGE: &str = "sed [OPTION]... [script] [file]...";

#[uucore::main]
pub fn uumain(args: impl uucore::Args) -> UResult<()> {
    let matches = uu_app().try_get_matches_from(normalize_in_place(args))?;
    let Sources { scripts, files } = collect_sources(&matches)?;
    let mut context = build_context(&matches);
    if context.debug {
        init_logging();
    }

    let script = compile(scripts, &mut context)?;
    if !context.unbuffered && io::stdout().is_terminal() {
        context.unbuffered = true;
    }
    debug!(files = ?files, "processing");

    let stdout = io::stdout();
    let mut output = io::BufWriter::new(stdout.lock());
    let code = process(&script, files, &context, &mut output)?;
    if code != 0 {
        set_exit_code(code);
    }
    Ok(())
}

/// Send the diagnostic events to standard error, filtered through
/// RUST_LOG when it is set.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    // A subscriber installed by an embedding program stays in place.
    let _ = registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

/// Turn `-iSUFFIX` into `--in-place=SUFFIX`, so that a separate
/// argument after `-i` is never taken as its suffix.
fn normalize_in_place(args: impl Iterator<Item = OsString>) -> Vec<OsString> {
    let mut options_done = false;
    args.map(|arg| {
        if options_done {
            return arg;
        }
        if arg == "--" {
            options_done = true;
            return arg;
        }
        match arg.to_str().and_then(|s| s.strip_prefix("-i")) {
            Some(suffix) if !suffix.is_empty() => OsString::from(format!("--in-place={suffix}")),
            _ => arg,
        }
    })
    .collect()
}

#[allow(clippy::cognitive_complexity)]
pub fn uu_app() -> Command {
    Command::new(uucore::util_name())
        .about(ABOUT)
        .override_usage(format_usage(USAGE))
        .infer_long_args(true)
        .args([
            arg!([script] "Script to execute if not otherwise provided."),
            Arg::new("file")
                .help("Input files")
                .value_parser(clap::value_parser!(PathBuf))
                .num_args(0..),
            arg!(--debug "Log the compiled script and its execution to standard error."),
            Arg::new("regexp-extended")
                .short('E')
                .long("regexp-extended")
                .short_alias('r')
                .help("Use extended regular expressions.")
                .action(clap::ArgAction::SetTrue),
            arg!(-e --expression <SCRIPT> "Add script to executed commands.")
                .action(clap::ArgAction::Append),
            // Access with .get_many::<PathBuf>("script-file")
            Arg::new("script-file")
                .short('f')
                .long("file")
                .value_name("SCRIPT_FILE")
                .help("Add the contents of SCRIPT_FILE to executed commands.")
                .value_parser(clap::value_parser!(PathBuf))
                .action(clap::ArgAction::Append),
            Arg::new("follow-symlinks")
                .long("follow-symlinks")
                .help("Follow symlinks when processing in place.")
                .action(clap::ArgAction::SetTrue),
            // Access with .get_one::<String>("in-place")
            Arg::new("in-place")
                .short('i')
                .long("in-place")
                .value_name("SUFFIX")
                .help("Edit files in place, making a backup if SUFFIX is supplied.")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value(""),
            // Access with .get_one::<usize>("line-length")
            Arg::new("line-length")
                .short('l')
                .long("line-length")
                .value_name("N")
                .help("Specify the desired line-wrap length for the 'l' command.")
                .value_parser(clap::value_parser!(usize)),
            Arg::new("native-syntax")
                .short('p')
                .long("native-syntax")
                .help("Use the regex engine's escape conventions.")
                .action(clap::ArgAction::SetTrue),
            arg!(-n --quiet "Suppress automatic printing of pattern space.").aliases(["silent"]),
            arg!(-s --separate "Consider files as separate rather than as a long stream."),
            arg!(--sandbox "Operate in a sandbox by disabling r/w commands."),
            arg!(-u --unbuffered "Load minimal input data and flush output buffers regularly."),
            Arg::new("null-data")
                .short('z')
                .long("null-data")
                .help("Separate lines by NUL characters.")
                .action(clap::ArgAction::SetTrue),
        ])
}

/// Script fragments and input files named on the command line
#[derive(Debug, PartialEq)]
struct Sources {
    scripts: Vec<ScriptValue>,
    files: Vec<PathBuf>,
}

/// Pair each value of a repeatable option with its argument position.
fn positioned<'a, T: Clone + Send + Sync + 'static>(
    matches: &'a ArgMatches,
    id: &str,
    wrap: impl Fn(T) -> ScriptValue + 'a,
) -> impl Iterator<Item = (usize, ScriptValue)> + 'a {
    let indices = matches.indices_of(id).into_iter().flatten();
    let values = matches.get_many::<T>(id).into_iter().flatten();
    indices.zip(values.cloned().map(wrap))
}

/// Collect the script fragments in command-line order together with
/// the input files. With neither `-e` nor `-f` the first operand is
/// the script; otherwise it is the first input file.
fn collect_sources(matches: &ArgMatches) -> UResult<Sources> {
    let operand = matches.get_one::<String>("script").cloned();
    let mut files = Vec::new();
    let mut fragments: Vec<(usize, ScriptValue)> =
        positioned(matches, "expression", ScriptValue::StringVal)
            .chain(positioned(matches, "script-file", ScriptValue::PathVal))
            .collect();

    if fragments.is_empty() {
        let Some(script) = operand else {
            return Err(UUsageError::new(1, "missing script"));
        };
        fragments.push((0, ScriptValue::StringVal(script)));
    } else if let Some(file) = operand {
        files.push(PathBuf::from(file));
    }
    fragments.sort_by_key(|(position, _)| *position);

    files.extend(matches.get_many::<PathBuf>("file").into_iter().flatten().cloned());
    if files.is_empty() {
        files.push(PathBuf::from("-"));
    }

    Ok(Sources {
        scripts: fragments.into_iter().map(|(_, script)| script).collect(),
        files,
    })
}

/// Gather the option flags that steer compilation and execution.
fn build_context(matches: &ArgMatches) -> ProcessingContext {
    ProcessingContext {
        debug: matches.get_flag("debug"),
        dialect: if matches.get_flag("native-syntax") {
            Dialect::Native
        } else {
            Dialect::Sed
        },
        follow_symlinks: matches.get_flag("follow-symlinks"),
        in_place: matches.contains_id("in-place"),
        in_place_suffix: matches
            .get_one::<String>("in-place")
            .filter(|s| !s.is_empty())
            .cloned(),
        length: matches
            .get_one::<usize>("line-length")
            .copied()
            .unwrap_or(DEFAULT_LINE_LENGTH),
        null_data: matches.get_flag("null-data"),
        quiet: matches.get_flag("quiet"),
        regex_extended: matches.get_flag("regexp-extended"),
        sandbox: matches.get_flag("sandbox"),
        separate: matches.get_flag("separate"),
        unbuffered: matches.get_flag("unbuffered"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_for(args: &[&str]) -> ArgMatches {
        let args = std::iter::once("sed").chain(args.iter().copied()).map(OsString::from);
        uu_app().get_matches_from(normalize_in_place(args))
    }

    fn sources_for(args: &[&str]) -> Sources {
        collect_sources(&matches_for(args)).unwrap()
    }

    fn text(script: &str) -> ScriptValue {
        ScriptValue::StringVal(script.to_string())
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_operand_script() {
        assert_eq!(
            sources_for(&["1d", "a.txt", "b.txt"]),
            Sources {
                scripts: vec![text("1d")],
                files: paths(&["a.txt", "b.txt"]),
            }
        );
    }

    #[test]
    fn test_operand_becomes_file_with_options() {
        let sources = sources_for(&["-e", "p", "a.txt", "b.txt"]);
        assert_eq!(sources.scripts, vec![text("p")]);
        assert_eq!(sources.files, paths(&["a.txt", "b.txt"]));

        let sources = sources_for(&["-f", "edit.sed", "in"]);
        assert_eq!(
            sources.scripts,
            vec![ScriptValue::PathVal(PathBuf::from("edit.sed"))]
        );
        assert_eq!(sources.files, paths(&["in"]));
    }

    #[test]
    fn test_fragments_keep_argument_order() {
        let sources = sources_for(&["-e", "1d", "-f", "two.sed", "-e", "3d"]);
        assert_eq!(
            sources.scripts,
            vec![
                text("1d"),
                ScriptValue::PathVal(PathBuf::from("two.sed")),
                text("3d"),
            ]
        );
        assert_eq!(sources.files, paths(&["-"]));
    }

    #[test]
    fn test_stdin_when_no_files() {
        assert_eq!(sources_for(&["s/x/y/"]).files, paths(&["-"]));
    }

    #[test]
    fn test_missing_script() {
        let err = collect_sources(&matches_for(&["-n"])).unwrap_err();
        assert!(err.to_string().contains("missing script"));
    }

    #[test]
    fn test_defaults() {
        let ctx = build_context(&matches_for(&[]));
        assert_eq!(ctx.dialect, Dialect::Sed);
        assert_eq!(ctx.length, DEFAULT_LINE_LENGTH);
        assert_eq!(ctx.in_place_suffix, None);
        for flag in [
            ctx.debug,
            ctx.regex_extended,
            ctx.follow_symlinks,
            ctx.in_place,
            ctx.quiet,
            ctx.separate,
            ctx.sandbox,
            ctx.unbuffered,
            ctx.null_data,
        ] {
            assert!(!flag);
        }
    }

    #[test]
    fn test_every_flag_set() {
        let ctx = build_context(&matches_for(&[
            "--debug",
            "-E",
            "--follow-symlinks",
            "-i",
            "-l",
            "80",
            "-n",
            "-p",
            "-s",
            "--sandbox",
            "-u",
            "-z",
        ]));
        assert_eq!(ctx.dialect, Dialect::Native);
        assert_eq!(ctx.length, 80);
        assert!(ctx.in_place_suffix.is_none());
        for flag in [
            ctx.debug,
            ctx.regex_extended,
            ctx.follow_symlinks,
            ctx.in_place,
            ctx.quiet,
            ctx.separate,
            ctx.sandbox,
            ctx.unbuffered,
            ctx.null_data,
        ] {
            assert!(flag);
        }
    }

    #[test]
    fn test_silent_and_r_aliases() {
        let ctx = build_context(&matches_for(&["--silent", "-r"]));
        assert!(ctx.quiet);
        assert!(ctx.regex_extended);
    }

    #[test]
    fn test_in_place_with_suffix() {
        let matches = matches_for(&["-i.bak", "s/a/b/", "file"]);
        let ctx = build_context(&matches);
        assert!(ctx.in_place);
        assert_eq!(ctx.in_place_suffix.as_deref(), Some(".bak"));
        assert_eq!(
            collect_sources(&matches).unwrap(),
            Sources {
                scripts: vec![text("s/a/b/")],
                files: paths(&["file"]),
            }
        );

        let ctx = build_context(&matches_for(&["--in-place=old_*", "p"]));
        assert_eq!(ctx.in_place_suffix.as_deref(), Some("old_*"));
    }

    #[test]
    fn test_in_place_without_suffix_keeps_script() {
        let matches = matches_for(&["-i", "s/a/b/", "file"]);
        assert!(build_context(&matches).in_place_suffix.is_none());
        assert_eq!(collect_sources(&matches).unwrap().scripts, vec![text("s/a/b/")]);
    }

    #[test]
    fn test_normalize_stops_at_double_dash() {
        let args = ["sed", "-i.x", "--", "-iy"].map(OsString::from);
        assert_eq!(
            normalize_in_place(args.into_iter()),
            ["sed", "--in-place=.x", "--", "-iy"].map(OsString::from).to_vec()
        );
    }
}
