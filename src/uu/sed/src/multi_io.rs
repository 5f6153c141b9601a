// Line-based I/O from multiple input files to multiple output files
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::command::ProcessingContext;

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::trace;
use uucore::display::Quotable;
use uucore::error::{FromIo, UResult, USimpleError};

use crate::error_handling::ERROR_EXIT_CODE;

/// Return true if path names the standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-" || path.as_os_str() == "/dev/stdin"
}

/// A line read from an input, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// False for a final line that lacks a terminator.
    pub has_newline: bool,
}

/// Buffered line reader over a single source.
pub struct LineReader {
    reader: Box<dyn BufRead>,
    separator: u8,
    buffer: Vec<u8>,
}

impl LineReader {
    /// Construct from anything that implements `Read`.
    pub fn new<R: Read + 'static>(r: R, separator: u8) -> Self {
        Self {
            reader: Box::new(BufReader::new(r)),
            separator,
            buffer: Vec::new(),
        }
    }

    /// Open the named file, or the standard input for `-`.
    pub fn open(path: &Path, separator: u8) -> UResult<Self> {
        if is_stdin(path) {
            return Ok(Self::new(io::stdin(), separator));
        }
        let file = File::open(path).map_err_context(|| format!("can't read {}", path.quote()))?;
        Ok(Self::new(file, separator))
    }

    /// Return the next line, if available, or None.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn get_line(&mut self) -> io::Result<Option<Line>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_until(self.separator, &mut self.buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        let has_newline = self.buffer.last() == Some(&self.separator);
        if has_newline {
            self.buffer.pop();
        }
        Ok(Some(Line {
            text: String::from_utf8_lossy(&self.buffer).into_owned(),
            has_newline,
        }))
    }
}

/// The stream of input lines over all input files, with the
/// look-ahead needed to recognize the last line.
pub struct InputReader {
    files: Vec<PathBuf>,
    next_index: usize,
    reader: Option<LineReader>,
    reader_name: PathBuf,
    // Next line and the file it came from
    lookahead: Option<(Line, PathBuf)>,
    look_ahead: bool,
    separate: bool,
    separator: u8,
    current_name: PathBuf,
    line_number: usize,
    last_line: bool,
    missing_newline: bool,
}

impl InputReader {
    /// Create a reader over files. With look_ahead false the last line
    /// is never recognized, so that no input is read before needed.
    pub fn new(files: Vec<PathBuf>, context: &ProcessingContext, look_ahead: bool) -> Self {
        InputReader {
            files,
            next_index: 0,
            reader: None,
            reader_name: PathBuf::new(),
            lookahead: None,
            look_ahead,
            separate: context.separate || context.in_place,
            separator: if context.null_data { b'\0' } else { b'\n' },
            current_name: PathBuf::from("-"),
            line_number: 0,
            last_line: false,
            missing_newline: false,
        }
    }

    /// Move to the next input file. In separate mode every file is a
    /// stream of its own; otherwise all files form a single stream
    /// that is returned once, named after its first file.
    pub fn next_file(&mut self) -> UResult<Option<PathBuf>> {
        if self.next_index >= self.files.len() {
            return Ok(None);
        }
        let path = self.files[self.next_index].clone();
        if self.separate {
            self.line_number = 0;
            self.last_line = false;
            self.lookahead = None;
            self.open_next()?;
        }
        Ok(Some(path))
    }

    fn open_next(&mut self) -> UResult<()> {
        let path = self.files[self.next_index].clone();
        self.next_index += 1;
        trace!(file = %path.display(), "opening input");
        self.reader = Some(LineReader::open(&path, self.separator)?);
        self.reader_name = path;
        Ok(())
    }

    /// Read the next line of the stream into the look-ahead slot.
    fn fill(&mut self) -> UResult<()> {
        loop {
            if let Some(reader) = self.reader.as_mut() {
                let line = reader
                    .get_line()
                    .map_err_context(|| format!("read error on {}", self.reader_name.quote()))?;
                if let Some(line) = line {
                    self.lookahead = Some((line, self.reader_name.clone()));
                    return Ok(());
                }
                self.reader = None;
            }
            // A separate stream ends with its file.
            if (self.separate && self.next_index > 0) || self.next_index >= self.files.len() {
                self.lookahead = None;
                return Ok(());
            }
            self.open_next()?;
        }
    }

    /// Return the next input line, or None at the end of the stream.
    pub fn next_line(&mut self) -> UResult<Option<String>> {
        if self.lookahead.is_none() {
            self.fill()?;
        }
        let Some((line, name)) = self.lookahead.take() else {
            return Ok(None);
        };
        self.line_number += 1;
        self.current_name = name;
        self.missing_newline = !line.has_newline;
        if self.look_ahead {
            self.fill()?;
            self.last_line = self.lookahead.is_none();
        }
        Ok(Some(line.text))
    }

    /// Number of the line most recently returned.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// True if the line most recently returned is the stream's last.
    pub fn is_last_line(&self) -> bool {
        self.last_line
    }

    /// True if the line most recently returned had no terminator.
    pub fn missing_newline(&self) -> bool {
        self.missing_newline
    }

    /// Name of the file of the line most recently returned.
    pub fn file_name(&self) -> String {
        if is_stdin(&self.current_name) {
            "-".to_string()
        } else {
            self.current_name.display().to_string()
        }
    }
}

/// Destination of the edited output, which remembers an omitted
/// final terminator so that it can be restored before further output.
pub struct OutputSink<'w> {
    writer: Box<dyn Write + 'w>,
    separator: u8,
    unbuffered: bool,
    missing_newline: bool,
}

impl<'w> OutputSink<'w> {
    pub fn new(writer: Box<dyn Write + 'w>, context: &ProcessingContext) -> Self {
        OutputSink {
            writer,
            separator: if context.null_data { b'\0' } else { b'\n' },
            unbuffered: context.unbuffered,
            missing_newline: false,
        }
    }

    fn restore_newline(&mut self) -> io::Result<()> {
        if self.missing_newline {
            self.writer.write_all(&[self.separator])?;
            self.missing_newline = false;
        }
        Ok(())
    }

    /// Write text as a line; without terminate the terminator is
    /// written only if more output follows.
    pub fn write_line(&mut self, text: &str, terminate: bool) -> io::Result<()> {
        self.restore_newline()?;
        self.writer.write_all(text.as_bytes())?;
        if terminate {
            self.writer.write_all(&[self.separator])?;
        } else {
            self.missing_newline = true;
        }
        if self.unbuffered {
            self.writer.flush()?;
        }
        Ok(())
    }

    /// Write text exactly as given.
    pub fn write_raw(&mut self, text: &[u8]) -> io::Result<()> {
        self.restore_newline()?;
        self.writer.write_all(text)?;
        if self.unbuffered {
            self.writer.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Read the whole named file for `r`; a file that cannot be read
/// counts as empty.
pub fn read_whole_file(path: &Path) -> Vec<u8> {
    let contents = if is_stdin(path) {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).map(|_| buffer)
    } else {
        fs::read(path)
    };
    contents.unwrap_or_default()
}

/// The files read line by line through `R`, which stay open for the
/// whole run.
#[derive(Default)]
pub struct LineFiles {
    // None for files that could not be opened
    readers: HashMap<PathBuf, Option<LineReader>>,
}

impl LineFiles {
    /// Return the next line of the named file, or None when it is
    /// exhausted or missing.
    pub fn next_line(&mut self, path: &Path) -> UResult<Option<String>> {
        let reader = self
            .readers
            .entry(path.to_path_buf())
            .or_insert_with(|| LineReader::open(path, b'\n').ok());
        let Some(reader) = reader else {
            return Ok(None);
        };
        match reader.get_line() {
            Ok(line) => Ok(line.map(|l| l.text)),
            Err(e) => Err(USimpleError::new(
                ERROR_EXIT_CODE,
                format!("read error on {}: {e}", path.quote()),
            )),
        }
    }
}
