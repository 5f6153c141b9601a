// Output files created on entry and flushed on exit
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::command::{CommandKind, Script};
use crate::error_handling::{ScriptLocation, runtime_error};

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uucore::display::Quotable;
use uucore::error::UResult;

/// Name under which `w` writes to the run's own output.
pub const STDOUT_PATH: &str = "/dev/stdout";
const STDERR_PATH: &str = "/dev/stderr";

/// Writer that tracks its file name for better error messages
pub struct NamedWriter {
    pub path: PathBuf,
    writer: Box<dyn Write>,
    location: ScriptLocation,
}

impl NamedWriter {
    /// Create a new writer, truncating the file.
    pub fn new(path: PathBuf, location: ScriptLocation) -> UResult<Self> {
        let writer: Box<dyn Write> = if path.as_os_str() == STDERR_PATH {
            Box::new(io::stderr())
        } else {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path);
            match file {
                Ok(file) => Box::new(BufWriter::new(file)),
                Err(e) => {
                    return runtime_error(
                        &location,
                        'w',
                        format!("couldn't open file {}: {e}", path.quote()),
                    );
                }
            }
        };

        Ok(NamedWriter {
            path,
            writer,
            location,
        })
    }

    /// Write a line to the file with a newline, returning descriptive errors.
    pub fn write_line(&mut self, line: &str) -> UResult<()> {
        match writeln!(self.writer, "{line}") {
            Ok(()) => Ok(()),
            Err(e) => runtime_error(
                &self.location,
                'w',
                format!("couldn't write to {}: {e}", self.path.quote()),
            ),
        }
    }

    /// Flush the writer, returning a descriptive error.
    pub fn flush(&mut self) -> UResult<()> {
        match self.writer.flush() {
            Ok(()) => Ok(()),
            Err(e) => runtime_error(
                &self.location,
                'w',
                format!("couldn't flush {}: {e}", self.path.quote()),
            ),
        }
    }
}

/// All files written by a run's `w`, `W` and `s///w` commands.
/// Commands naming the same path share one writer.
#[derive(Default)]
pub struct OutputFiles {
    writers: HashMap<PathBuf, NamedWriter>,
}

impl OutputFiles {
    /// Create or truncate every output file the script names.
    pub fn open_all(script: &Script) -> UResult<Self> {
        let mut files = OutputFiles::default();
        for command in &script.commands {
            let path = match &command.kind {
                CommandKind::Write(path) | CommandKind::WriteFirstLine(path) => path,
                CommandKind::Substitute(subst) => match &subst.write_file {
                    Some(path) => path,
                    None => continue,
                },
                _ => continue,
            };
            if path.as_os_str() == STDOUT_PATH || files.writers.contains_key(path) {
                continue;
            }
            debug!(file = %path.display(), "opening output file");
            let writer = NamedWriter::new(path.clone(), command.location.clone())?;
            files.writers.insert(path.clone(), writer);
        }
        Ok(files)
    }

    /// Write a line to the named file, which must have been opened.
    pub fn write_line(&mut self, path: &Path, line: &str) -> UResult<()> {
        match self.writers.get_mut(path) {
            Some(writer) => writer.write_line(line),
            None => runtime_error(
                &ScriptLocation::default(),
                'w',
                format!("file {} was not opened", path.quote()),
            ),
        }
    }

    /// Flush buffered content to the files, returning descriptive errors.
    pub fn flush_all(&mut self) -> UResult<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ProcessingContext, ScriptValue};
    use crate::compiler::compile;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use predicates::prelude::*;
    use std::fs;

    fn compile_str(script: &str) -> Script {
        compile(
            vec![ScriptValue::StringVal(script.to_string())],
            &mut ProcessingContext::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_files_truncated_at_open() {
        let temp = TempDir::new().unwrap();
        let out = temp.child("out.txt");
        out.write_str("old contents\n").unwrap();

        let script = compile_str(&format!("w {}", out.path().display()));
        let mut files = OutputFiles::open_all(&script).unwrap();
        files.flush_all().unwrap();
        out.assert("");
    }

    #[test]
    fn test_shared_writer() {
        let temp = TempDir::new().unwrap();
        let out = temp.child("shared.txt");
        let name = out.path().display().to_string();

        let script = compile_str(&format!("w {name}\ns/a/b/w {name}"));
        let mut files = OutputFiles::open_all(&script).unwrap();
        assert_eq!(files.writers.len(), 1);

        files.write_line(out.path(), "one").unwrap();
        files.write_line(out.path(), "two").unwrap();
        files.flush_all().unwrap();
        assert_eq!(fs::read_to_string(out.path()).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_stdout_not_opened() {
        let script = compile_str("w /dev/stdout");
        let files = OutputFiles::open_all(&script).unwrap();
        assert!(files.writers.is_empty());
    }

    #[test]
    fn test_open_failure_reports_command() {
        let location = ScriptLocation::default();
        let err = NamedWriter::new(PathBuf::from("/nonexistent/dir/file"), location)
            .err()
            .unwrap();
        assert!(predicate::str::contains("couldn't open file").eval(&err.to_string()));
    }

    #[test]
    fn test_unopened_file() {
        let mut files = OutputFiles::default();
        assert!(files.write_line(Path::new("nowhere"), "x").is_err());
    }
}
