// Script locations and the errors reported against them
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use std::fmt;
use std::rc::Rc;

use uucore::error::{UResult, USimpleError};

/// Exit code for any compilation or processing failure.
pub const ERROR_EXIT_CODE: i32 = 1;

/// Where in the script something was read: the fragment's name
/// (`-e #N` or a file path), the line within that fragment, and the
/// 1-based character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLocation {
    pub input_name: Rc<str>,
    pub line_number: usize,
    pub column_number: usize,
}

impl Default for ScriptLocation {
    fn default() -> Self {
        ScriptLocation {
            input_name: Rc::from(""),
            line_number: 0,
            column_number: 0,
        }
    }
}

impl fmt::Display for ScriptLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.input_name, self.line_number, self.column_number
        )
    }
}

/// Fail with msg as a compile error at the specified location.
pub fn compilation_error<T>(location: &ScriptLocation, msg: impl ToString) -> UResult<T> {
    Err(USimpleError::new(
        ERROR_EXIT_CODE,
        format!("{}: error: {}", location, msg.to_string()),
    ))
}

/// Fail with msg as a runtime error raised by the command defined
/// at the specified location.
pub fn runtime_error<T>(location: &ScriptLocation, code: char, msg: impl ToString) -> UResult<T> {
    Err(USimpleError::new(
        ERROR_EXIT_CODE,
        format!(
            "{}: command `{}': error: {}",
            location,
            code,
            msg.to_string()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> ScriptLocation {
        ScriptLocation {
            input_name: Rc::from("-e #2"),
            line_number: 3,
            column_number: 7,
        }
    }

    #[test]
    fn test_location_display() {
        assert_eq!(location().to_string(), "-e #2:3:7");
    }

    #[test]
    fn test_compilation_error_message() {
        let err = compilation_error::<()>(&location(), "unknown command `k'").unwrap_err();
        assert_eq!(err.code(), 1);
        assert_eq!(err.to_string(), "-e #2:3:7: error: unknown command `k'");
    }

    #[test]
    fn test_runtime_error_names_command() {
        let err = runtime_error::<()>(&location(), 's', "no previous regular expression")
            .unwrap_err();
        assert_eq!(err.code(), 1);
        assert!(err.to_string().contains("command `s'"));
        assert!(err.to_string().ends_with("no previous regular expression"));
    }
}
