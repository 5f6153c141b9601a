// Executable wrapper around the stream editor library
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use std::ffi::OsString;
use std::process;

/// Drop a leading `sed` word so that `stream-sed sed SCRIPT` behaves
/// like `sed SCRIPT`, and strip a Windows `.exe` from the program name.
fn program_args(mut args: Vec<OsString>) -> Vec<OsString> {
    if args.get(1).is_some_and(|arg| arg == "sed") {
        args.remove(1);
    }

    #[cfg(windows)]
    if let Some(program) = args.first_mut() {
        if let Some(stripped) = program.to_string_lossy().strip_suffix(".exe") {
            *program = OsString::from(stripped);
        }
    }

    args
}

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    // Must precede any uucore call that derives the utility name.
    if args.get(1).is_some_and(|arg| arg == "sed") {
        uucore::set_utility_is_second_arg();
    }
    uucore::panic::mute_sigpipe_panic();

    process::exit(sed::uumain(program_args(args).into_iter()));
}
