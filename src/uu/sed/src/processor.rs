// Process the files with the compiled scripts
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::address::{MatchContext, RangeState};
use crate::command::{
    Command, CommandKind, LastRegex, ProcessingContext, Script, Substitution,
};
use crate::error_handling::runtime_error;
use crate::escape_compiler::Dialect;
use crate::in_place::InPlace;
use crate::multi_io::{InputReader, LineFiles, OutputSink, read_whole_file};
use crate::named_writer::{OutputFiles, STDOUT_PATH};

use memchr::memchr;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::trace;
use uucore::error::{FromIo, UResult};

/// How a cycle ended before or at the end of the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleEnd {
    /// End of script: autoprint and read the next line.
    Normal,
    /// `d`, `c`: no autoprint.
    Delete,
    /// `D` with an embedded newline: rerun without reading.
    Restart,
    /// `q` (autoprint and appends) or `Q` (neither).
    Quit { code: i32, silent: bool },
    /// `n` or `N` ran out of input.
    EndOfInput { autoprint: bool },
}

/// The outcome of applying a single command.
enum Step {
    Goto(Option<usize>),
    Halt(CycleEnd),
}

/// Output queued for the end of the cycle.
enum Appended {
    Text(String),
    File(PathBuf),
}

/// The mutable state of one run over the input.
struct Processor<'s, 'w> {
    script: &'s Script,
    context: &'s ProcessingContext,
    input: InputReader,
    output: OutputSink<'w>,
    // Replaces output while a file is edited in place
    in_place_output: Option<OutputSink<'w>>,
    pattern: String,
    hold: String,
    append: Vec<Appended>,
    last_regex: LastRegex<'s>,
    ranges: Vec<RangeState>,
    // Set by a successful substitution, tested by t and T
    replaced: bool,
    files: OutputFiles,
    line_files: LineFiles,
}

/// Run the script over the files, writing to output.
/// Return the exit code requested by `q` or `Q`, or 0.
pub fn process(
    script: &Script,
    files: Vec<PathBuf>,
    context: &ProcessingContext,
    output: &mut dyn Write,
) -> UResult<i32> {
    let mut ranges = vec![RangeState::default(); script.range_count];
    for command in &script.commands {
        if let Some(range) = &command.address {
            ranges[range.id] = range.initial_state();
        }
    }

    let mut processor = Processor {
        script,
        context,
        input: InputReader::new(files, context, script.needs_last_line),
        output: OutputSink::new(Box::new(output), context),
        in_place_output: None,
        pattern: String::new(),
        hold: String::new(),
        append: Vec::new(),
        last_regex: LastRegex::default(),
        ranges,
        replaced: false,
        files: OutputFiles::open_all(script)?,
        line_files: LineFiles::default(),
    };
    let result = processor.process_all_files();
    let flushed = processor.flush_all();
    let code = result?;
    flushed?;
    Ok(code)
}

impl<'s, 'w> Processor<'s, 'w> {
    /// Process every input stream, editing files in place if asked.
    fn process_all_files(&mut self) -> UResult<i32> {
        let mut in_place = self.context.in_place.then(|| InPlace::new(self.context));

        while let Some(path) = self.input.next_file()? {
            if let Some(in_place) = in_place.as_mut() {
                let file = in_place.begin(&path)?;
                self.in_place_output = Some(OutputSink::new(
                    Box::new(BufWriter::new(file)),
                    self.context,
                ));
            }

            let quit = self.process_stream()?;

            if let (Some(in_place), Some(mut sink)) = (in_place.as_mut(), self.in_place_output.take()) {
                sink.flush()
                    .map_err_context(|| format!("couldn't write {}", path.display()))?;
                drop(sink);
                in_place.end()?;
            }
            if let Some(code) = quit {
                return Ok(code);
            }
        }
        Ok(0)
    }

    /// Run cycles until the current stream ends or a quit fires.
    fn process_stream(&mut self) -> UResult<Option<i32>> {
        let mut restart = false;
        loop {
            if !restart {
                let Some(line) = self.input.next_line()? else {
                    return Ok(None);
                };
                self.pattern = line;
                self.replaced = false;
            }
            trace!(line = self.input.line_number(), pattern = %self.pattern, "cycle");

            let end = self.run_script()?;
            restart = end == CycleEnd::Restart;

            match end {
                CycleEnd::Quit { code, silent: true } => return Ok(Some(code)),
                CycleEnd::Normal
                | CycleEnd::Quit { .. }
                | CycleEnd::EndOfInput { autoprint: true } => {
                    if !self.context.quiet {
                        self.print_pattern()?;
                    }
                }
                _ => {}
            }
            self.flush_appends()?;

            match end {
                CycleEnd::Quit { code, .. } => return Ok(Some(code)),
                CycleEnd::EndOfInput { .. } => return Ok(None),
                _ => {}
            }
        }
    }

    /// Walk the command graph over the pattern space.
    fn run_script(&mut self) -> UResult<CycleEnd> {
        let script = self.script;
        let mut current = script.first();
        while let Some(index) = current {
            let command = &script.commands[index];
            trace!(index, command = %command.kind, "apply");
            match self.apply(command)? {
                Step::Goto(next) => current = next,
                Step::Halt(end) => return Ok(end),
            }
        }
        Ok(CycleEnd::Normal)
    }

    /// Return true if the command's address selects the current line.
    fn selected(&mut self, command: &'s Command) -> UResult<bool> {
        let Some(range) = &command.address else {
            return Ok(true);
        };
        let mut ctx = MatchContext {
            line_number: self.input.line_number(),
            last_line: self.input.is_last_line(),
            pattern: &self.pattern,
            last_regex: &mut self.last_regex,
            location: &command.location,
            code: command.kind.code(),
        };
        range.is_active(&mut self.ranges[range.id], &mut ctx)
    }

    /// Apply a command to the pattern space and return what follows.
    fn apply(&mut self, command: &'s Command) -> UResult<Step> {
        if !self.selected(command)? {
            return Ok(Step::Goto(command.next));
        }

        let next = Step::Goto(command.next);
        match &command.kind {
            CommandKind::BlockStart => return Ok(Step::Goto(command.branch)),
            CommandKind::BlockEnd | CommandKind::Label(_) | CommandKind::Version(_) => {}

            CommandKind::Append(text) => self.append.push(Appended::Text(text.clone())),
            CommandKind::Insert(text) => self.write_output(text, true)?,
            CommandKind::Change(text) => {
                let first = command
                    .address
                    .as_ref()
                    .is_none_or(|range| self.ranges[range.id].first_line());
                if first {
                    self.write_output(text, true)?;
                }
                return Ok(Step::Halt(CycleEnd::Delete));
            }
            CommandKind::ReadFile(path) => self.append.push(Appended::File(path.clone())),
            CommandKind::ReadLine(path) => {
                if let Some(line) = self.line_files.next_line(path)? {
                    self.append.push(Appended::Text(line));
                }
            }

            CommandKind::Delete => return Ok(Step::Halt(CycleEnd::Delete)),
            CommandKind::DeleteFirstLine => match memchr(b'\n', self.pattern.as_bytes()) {
                Some(pos) => {
                    self.pattern.drain(..=pos);
                    return Ok(Step::Halt(CycleEnd::Restart));
                }
                None => return Ok(Step::Halt(CycleEnd::Delete)),
            },
            CommandKind::Zap => self.pattern.clear(),

            CommandKind::PrintLineNumber => {
                let number = self.input.line_number().to_string();
                self.write_output(&number, true)?;
            }
            CommandKind::PrintFileName => {
                let name = self.input.file_name();
                self.write_output(&name, true)?;
            }
            CommandKind::Print => self.print_pattern()?,
            CommandKind::PrintFirstLine => {
                let first = self.first_line().to_string();
                self.write_output(&first, true)?;
            }
            CommandKind::List(width) => {
                let width = width.unwrap_or(self.context.length);
                for line in list_lines(&self.pattern, width) {
                    self.write_output(&line, true)?;
                }
            }

            CommandKind::ReplaceWithHold => self.pattern.clone_from(&self.hold),
            CommandKind::AppendHold => {
                self.pattern.push('\n');
                self.pattern.push_str(&self.hold);
            }
            CommandKind::ReplaceHold => self.hold.clone_from(&self.pattern),
            CommandKind::AppendToHold => {
                self.hold.push('\n');
                self.hold.push_str(&self.pattern);
            }
            CommandKind::Exchange => std::mem::swap(&mut self.pattern, &mut self.hold),

            CommandKind::Next => {
                if !self.context.quiet {
                    self.print_pattern()?;
                }
                match self.input.next_line()? {
                    Some(line) => {
                        self.flush_appends()?;
                        self.pattern = line;
                        self.replaced = false;
                    }
                    None => return Ok(Step::Halt(CycleEnd::EndOfInput { autoprint: false })),
                }
            }
            CommandKind::AppendNext => match self.input.next_line()? {
                Some(line) => {
                    self.flush_appends()?;
                    self.pattern.push('\n');
                    self.pattern.push_str(&line);
                    self.replaced = false;
                }
                None => return Ok(Step::Halt(CycleEnd::EndOfInput { autoprint: true })),
            },

            CommandKind::Quit(code) => {
                return Ok(Step::Halt(CycleEnd::Quit {
                    code: *code,
                    silent: false,
                }));
            }
            CommandKind::QuitSilent(code) => {
                return Ok(Step::Halt(CycleEnd::Quit {
                    code: *code,
                    silent: true,
                }));
            }

            CommandKind::Substitute(subst) => {
                if self.substitute(subst, command)? {
                    self.replaced = true;
                    if subst.print {
                        self.print_pattern()?;
                    }
                    if let Some(path) = &subst.write_file {
                        let pattern = self.pattern.clone();
                        self.write_to(path, &pattern)?;
                    }
                }
            }
            CommandKind::Transliterate(trans) => self.pattern = trans.apply(&self.pattern),

            CommandKind::Branch(_) => return Ok(Step::Goto(command.branch)),
            CommandKind::Test(_) => {
                if self.replaced {
                    self.replaced = false;
                    return Ok(Step::Goto(command.branch));
                }
            }
            CommandKind::TestNot(_) => {
                if self.replaced {
                    self.replaced = false;
                } else {
                    return Ok(Step::Goto(command.branch));
                }
            }

            CommandKind::Write(path) => {
                let pattern = self.pattern.clone();
                self.write_to(path, &pattern)?;
            }
            CommandKind::WriteFirstLine(path) => {
                let first = self.first_line().to_string();
                self.write_to(path, &first)?;
            }
        }
        Ok(next)
    }

    /// Replace the selected matches of the substitution's regex.
    /// Return true if anything was replaced.
    fn substitute(&mut self, subst: &'s Substitution, command: &'s Command) -> UResult<bool> {
        let regex = self
            .last_regex
            .resolve(subst.regex.as_ref(), &command.location, 's')?;
        if subst.regex.is_none() {
            let wanted = subst.replacement.max_group();
            if wanted > regex.group_count() {
                return runtime_error(
                    &command.location,
                    's',
                    format!("invalid reference \\{wanted} on `s' command's RHS"),
                );
            }
        }

        let skip_adjacent_empty = self.context.dialect == Dialect::Sed;
        let mut result = String::new();
        let mut copied_to = 0;
        let mut count = 0;
        let mut previous_end = None;
        for caps in regex.regex.captures_iter(&self.pattern) {
            let caps = caps?;
            let (start, end) = (caps.start(), caps.end());
            if skip_adjacent_empty && start == end && previous_end == Some(start) {
                continue;
            }
            previous_end = Some(end);
            count += 1;
            if count < subst.occurrence {
                continue;
            }
            result.push_str(&self.pattern[copied_to..start]);
            result.push_str(&subst.replacement.expand(&self.pattern, &caps));
            copied_to = end;
            if !subst.global {
                break;
            }
        }

        if count < subst.occurrence {
            return Ok(false);
        }
        result.push_str(&self.pattern[copied_to..]);
        self.pattern = result;
        Ok(true)
    }

    /// The pattern space up to its first newline.
    fn first_line(&self) -> &str {
        match memchr(b'\n', self.pattern.as_bytes()) {
            Some(pos) => &self.pattern[..pos],
            None => &self.pattern,
        }
    }

    /// The sink receiving the edited text.
    fn sink(&mut self) -> &mut OutputSink<'w> {
        self.in_place_output.as_mut().unwrap_or(&mut self.output)
    }

    fn write_output(&mut self, text: &str, terminate: bool) -> UResult<()> {
        self.sink()
            .write_line(text, terminate)
            .map_err_context(|| "couldn't write output".to_string())
    }

    /// Write the pattern space, omitting the terminator if the input
    /// line lacked one.
    fn print_pattern(&mut self) -> UResult<()> {
        let terminate = !self.input.missing_newline();
        let sink = self.in_place_output.as_mut().unwrap_or(&mut self.output);
        sink.write_line(&self.pattern, terminate)
            .map_err_context(|| "couldn't write output".to_string())
    }

    /// Write a line to a `w` file; `/dev/stdout` is the run's own output.
    fn write_to(&mut self, path: &Path, line: &str) -> UResult<()> {
        if path.as_os_str() == STDOUT_PATH {
            return self
                .output
                .write_line(line, true)
                .map_err_context(|| "couldn't write output".to_string());
        }
        self.files.write_line(path, line)
    }

    /// Output and clear the text queued by `a`, `r` and `R`.
    fn flush_appends(&mut self) -> UResult<()> {
        for appended in std::mem::take(&mut self.append) {
            let written = match appended {
                Appended::Text(text) => self.sink().write_line(&text, true),
                Appended::File(path) => {
                    let contents = read_whole_file(&path);
                    self.sink().write_raw(&contents)
                }
            };
            written.map_err_context(|| "couldn't write output".to_string())?;
        }
        Ok(())
    }

    fn flush_all(&mut self) -> UResult<()> {
        self.files.flush_all()?;
        self.output
            .flush()
            .map_err_context(|| "couldn't flush output".to_string())
    }
}

/// Render text the way `l` shows it, as output lines of at most
/// width characters including the continuation backslash.
/// A width of 0 or 1 disables wrapping.
pub fn list_lines(text: &str, width: usize) -> Vec<String> {
    let limit = width.saturating_sub(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    let mut buf = [0; 4];
    for c in text.chars() {
        let rendered = match c {
            '\\' => "\\\\".to_string(),
            '\x07' => "\\a".to_string(),
            '\x08' => "\\b".to_string(),
            '\x0c' => "\\f".to_string(),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            '\x0b' => "\\v".to_string(),
            c if c.is_control() => c
                .encode_utf8(&mut buf)
                .bytes()
                .map(|b| format!("\\{b:03o}"))
                .collect(),
            c => c.to_string(),
        };
        let rendered_width = rendered.chars().count();
        if limit > 0 && line_width + rendered_width > limit {
            line.push('\\');
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        line.push_str(&rendered);
        line_width += rendered_width;
    }
    line.push('$');
    lines.push(line);
    lines
}
