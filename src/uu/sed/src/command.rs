// Definitions for the compiled code data structures
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::address::AddressRange;
use crate::error_handling::{ScriptLocation, runtime_error};
use crate::escape_compiler::{CaseDirective, Dialect};
use crate::fast_regex::{Captures, Regex};

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use uucore::error::UResult;

/// Default wrapping width of the `l` command.
pub const DEFAULT_LINE_LENGTH: usize = 70;

// Compilation and processing options provided mostly through the
// command-line interface
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    // Command-line flags with corresponding names
    pub debug: bool,
    pub dialect: Dialect,
    pub follow_symlinks: bool,
    pub in_place: bool,
    pub in_place_suffix: Option<String>,
    pub length: usize,
    pub null_data: bool,
    pub quiet: bool,
    pub regex_extended: bool,
    pub sandbox: bool,
    pub separate: bool,
    pub unbuffered: bool,
}

impl Default for ProcessingContext {
    fn default() -> Self {
        ProcessingContext {
            debug: false,
            dialect: Dialect::Sed,
            follow_symlinks: false,
            in_place: false,
            in_place_suffix: None,
            length: DEFAULT_LINE_LENGTH,
            null_data: false,
            quiet: false,
            regex_extended: false,
            sandbox: false,
            separate: false,
            unbuffered: false,
        }
    }
}

#[derive(Debug, PartialEq)]
/// The specification of a script: through a string or a file
pub enum ScriptValue {
    StringVal(String),
    PathVal(PathBuf),
}

/// A compiled regular expression together with its script text.
#[derive(Debug, Clone)]
pub struct SedRegex {
    pub delimiter: char,
    /// The pattern exactly as written between the delimiters.
    pub source: String,
    /// The pattern in the matching engine's syntax, flags included.
    pub host: String,
    pub multi_line: bool,
    pub ignore_case: bool,
    pub regex: Regex,
}

impl SedRegex {
    pub fn is_match(&self, text: &str) -> UResult<bool> {
        self.regex.is_match(text)
    }

    /// Number of capture groups, excluding the whole match.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }
}

impl fmt::Display for SedRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.delimiter != '/' {
            f.write_str("\\")?;
        }
        write!(f, "{0}{1}{0}", self.delimiter, self.source)
    }
}

/// The regex most recently used for matching during a run.
///
/// An empty regex in the script stands for this one. Every run owns
/// its own slot, so separate runs never see each other's regexes.
#[derive(Debug, Default)]
pub struct LastRegex<'s> {
    regex: Option<&'s SedRegex>,
}

impl<'s> LastRegex<'s> {
    /// Return the regex to use for a (possibly empty) script regex,
    /// remembering it as the last one used.
    pub fn resolve(
        &mut self,
        regex: Option<&'s SedRegex>,
        location: &ScriptLocation,
        code: char,
    ) -> UResult<&'s SedRegex> {
        match regex.or(self.regex) {
            Some(re) => {
                self.regex = Some(re);
                Ok(re)
            }
            None => runtime_error(location, code, "no previous regular expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single part of an RE replacement
pub enum ReplacementPart {
    Literal(String), // Normal text
    Group(usize),    // & and \0 to \99
}

/// Case conversion applied to replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseConversion {
    AsIs,
    Lower,
    Upper,
}

impl CaseConversion {
    fn apply_all(self, text: String) -> String {
        match self {
            CaseConversion::AsIs => text,
            CaseConversion::Lower => text.to_lowercase(),
            CaseConversion::Upper => text.to_uppercase(),
        }
    }

    fn apply_first(self, text: String) -> String {
        let mut chars = text.chars();
        let first = match (self, chars.next()) {
            (CaseConversion::AsIs, _) | (_, None) => return text,
            (CaseConversion::Lower, Some(c)) => c.to_lowercase().collect::<String>(),
            (CaseConversion::Upper, Some(c)) => c.to_uppercase().collect::<String>(),
        };
        first + chars.as_str()
    }
}

/// Replacement parts sharing the same case conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSegment {
    /// Conversion of the whole segment.
    pub case_set: CaseConversion,
    /// Conversion of the segment's first character, applied last.
    pub case_flip: CaseConversion,
    pub parts: Vec<ReplacementPart>,
}

impl CaseSegment {
    fn new(case_set: CaseConversion, case_flip: CaseConversion) -> Self {
        CaseSegment {
            case_set,
            case_flip,
            parts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A broken-down RE replacement
pub struct Replacement {
    /// The replacement exactly as written.
    pub source: String,
    pub segments: Vec<CaseSegment>,
}

impl Default for Replacement {
    /// Create an empty replacement.
    fn default() -> Self {
        Replacement {
            source: String::new(),
            segments: vec![CaseSegment::new(CaseConversion::AsIs, CaseConversion::AsIs)],
        }
    }
}

impl Replacement {
    fn current(&mut self) -> &mut CaseSegment {
        if self.segments.is_empty() {
            self.segments
                .push(CaseSegment::new(CaseConversion::AsIs, CaseConversion::AsIs));
        }
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    /// Add literal text, written in the script as source.
    pub fn push_literal(&mut self, source: &str, text: &str) {
        self.source.push_str(source);
        let segment = self.current();
        if let Some(ReplacementPart::Literal(s)) = segment.parts.last_mut() {
            s.push_str(text);
        } else {
            segment.parts.push(ReplacementPart::Literal(text.to_string()));
        }
    }

    /// Add a reference to capture group n.
    pub fn push_group(&mut self, source: &str, n: usize) {
        self.source.push_str(source);
        self.current().parts.push(ReplacementPart::Group(n));
    }

    /// Start a new segment for a case conversion directive.
    pub fn push_case(&mut self, source: &str, directive: CaseDirective) {
        self.source.push_str(source);
        let current_set = self.current().case_set;
        let (case_set, case_flip) = match directive {
            CaseDirective::Lower => (CaseConversion::Lower, CaseConversion::AsIs),
            CaseDirective::Upper => (CaseConversion::Upper, CaseConversion::AsIs),
            CaseDirective::End => (CaseConversion::AsIs, CaseConversion::AsIs),
            CaseDirective::LowerNext => (current_set, CaseConversion::Lower),
            CaseDirective::UpperNext => (current_set, CaseConversion::Upper),
        };
        if self.current().parts.is_empty() {
            self.segments.pop();
        }
        self.segments.push(CaseSegment::new(case_set, case_flip));
    }

    /// The largest group number referenced.
    pub fn max_group(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|s| s.parts.iter())
            .filter_map(|p| match p {
                ReplacementPart::Group(n) => Some(*n),
                ReplacementPart::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Expand the replacement for a match within text.
    /// Groups that did not participate in the match expand to nothing.
    pub fn expand(&self, text: &str, caps: &Captures) -> String {
        let mut result = String::new();
        for segment in &self.segments {
            let mut expanded = String::new();
            for part in &segment.parts {
                match part {
                    ReplacementPart::Literal(s) => expanded.push_str(s),
                    ReplacementPart::Group(n) => {
                        if let Some((start, end)) = caps.span(*n) {
                            expanded.push_str(&text[start..end]);
                        }
                    }
                }
            }
            let converted = segment.case_set.apply_all(expanded);
            result.push_str(&segment.case_flip.apply_first(converted));
        }
        result
    }
}

#[derive(Debug, Clone)]
/// Substitution command
pub struct Substitution {
    pub regex: Option<SedRegex>, // None for the empty regex
    pub delimiter: char,
    pub replacement: Replacement,
    pub occurrence: usize,          // Which occurrence to substitute
    pub global: bool,               // True if 'g' flag
    pub print: bool,                // True if 'p' flag
    pub ignore_case: bool,          // True if 'i' flag
    pub multi_line: bool,           // True if 'm' flag
    pub write_file: Option<PathBuf>, // File for the 'w' flag
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = self.regex.as_ref().map_or("", |r| r.source.as_str());
        write!(
            f,
            "{0}{1}{0}{2}{0}",
            self.delimiter, pattern, self.replacement.source
        )?;
        if self.global {
            f.write_str("g")?;
        }
        if self.occurrence > 1 {
            write!(f, "{}", self.occurrence)?;
        }
        if self.print {
            f.write_str("p")?;
        }
        if self.ignore_case {
            f.write_str("i")?;
        }
        if self.multi_line {
            f.write_str("m")?;
        }
        if let Some(path) = &self.write_file {
            write!(f, "w {}", path.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Transliteration command (y)
pub struct Transliteration {
    pub delimiter: char,
    pub source: String, // Left side as written
    pub target: String, // Right side as written
    pub map: HashMap<char, char>,
}

impl Transliteration {
    /// Build the mapping from two equal-length character sequences.
    pub fn new(delimiter: char, source: String, target: String, from: &[char], to: &[char]) -> Self {
        let mut map = HashMap::new();
        for (&a, &b) in from.iter().zip(to) {
            // The first mapping of a character wins.
            map.entry(a).or_insert(b);
        }
        Transliteration {
            delimiter,
            source,
            target,
            map,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.map.get(&c).copied().unwrap_or(c))
            .collect()
    }
}

#[derive(Debug, Clone)]
/// What a command does, with its arguments
pub enum CommandKind {
    BlockStart,                            // {
    BlockEnd,                              // }
    Label(String),                         // :
    Append(String),                        // a
    Insert(String),                        // i
    Change(String),                        // c
    Delete,                                // d
    DeleteFirstLine,                       // D
    PrintLineNumber,                       // =
    PrintFileName,                         // F
    ReplaceWithHold,                       // g
    AppendHold,                            // G
    ReplaceHold,                           // h
    AppendToHold,                          // H
    Exchange,                              // x
    List(Option<usize>),                   // l
    Next,                                  // n
    AppendNext,                            // N
    Print,                                 // p
    PrintFirstLine,                        // P
    Quit(i32),                             // q
    QuitSilent(i32),                       // Q
    ReadFile(PathBuf),                     // r
    ReadLine(PathBuf),                     // R
    Substitute(Box<Substitution>),         // s
    Branch(Option<String>),                // b
    Test(Option<String>),                  // t
    TestNot(Option<String>),               // T
    Write(PathBuf),                        // w
    WriteFirstLine(PathBuf),               // W
    Transliterate(Box<Transliteration>),   // y
    Version(String),                       // v
    Zap,                                   // z
}

impl CommandKind {
    /// The command's letter in the script.
    pub fn code(&self) -> char {
        match self {
            CommandKind::BlockStart => '{',
            CommandKind::BlockEnd => '}',
            CommandKind::Label(_) => ':',
            CommandKind::Append(_) => 'a',
            CommandKind::Insert(_) => 'i',
            CommandKind::Change(_) => 'c',
            CommandKind::Delete => 'd',
            CommandKind::DeleteFirstLine => 'D',
            CommandKind::PrintLineNumber => '=',
            CommandKind::PrintFileName => 'F',
            CommandKind::ReplaceWithHold => 'g',
            CommandKind::AppendHold => 'G',
            CommandKind::ReplaceHold => 'h',
            CommandKind::AppendToHold => 'H',
            CommandKind::Exchange => 'x',
            CommandKind::List(_) => 'l',
            CommandKind::Next => 'n',
            CommandKind::AppendNext => 'N',
            CommandKind::Print => 'p',
            CommandKind::PrintFirstLine => 'P',
            CommandKind::Quit(_) => 'q',
            CommandKind::QuitSilent(_) => 'Q',
            CommandKind::ReadFile(_) => 'r',
            CommandKind::ReadLine(_) => 'R',
            CommandKind::Substitute(_) => 's',
            CommandKind::Branch(_) => 'b',
            CommandKind::Test(_) => 't',
            CommandKind::TestNot(_) => 'T',
            CommandKind::Write(_) => 'w',
            CommandKind::WriteFirstLine(_) => 'W',
            CommandKind::Transliterate(_) => 'y',
            CommandKind::Version(_) => 'v',
            CommandKind::Zap => 'z',
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())?;
        match self {
            CommandKind::Label(label) => write!(f, "{label}"),
            CommandKind::Append(text) | CommandKind::Insert(text) | CommandKind::Change(text) => {
                write!(f, "\\\n{text}")
            }
            CommandKind::List(Some(n)) => write!(f, " {n}"),
            CommandKind::Quit(n) | CommandKind::QuitSilent(n) => write!(f, " {n}"),
            CommandKind::ReadFile(p)
            | CommandKind::ReadLine(p)
            | CommandKind::Write(p)
            | CommandKind::WriteFirstLine(p) => write!(f, " {}", p.display()),
            CommandKind::Substitute(s) => write!(f, "{s}"),
            CommandKind::Branch(Some(l)) | CommandKind::Test(Some(l)) | CommandKind::TestNot(Some(l)) => {
                write!(f, " {l}")
            }
            CommandKind::Transliterate(t) => {
                write!(f, "{0}{1}{0}{2}{0}", t.delimiter, t.source, t.target)
            }
            CommandKind::Version(v) => write!(f, " {v}"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
/// An internally compiled command.
pub struct Command {
    pub kind: CommandKind,
    pub address: Option<AddressRange>, // None applies to every line
    pub next: Option<usize>,           // Sequential successor
    pub branch: Option<usize>,         // Block body or branch target
    pub location: ScriptLocation,      // Where the command was defined
}

/// A compiled script: commands linked through their indices.
#[derive(Debug, Default)]
pub struct Script {
    pub commands: Vec<Command>,
    /// True if some address needs to know the last input line.
    pub needs_last_line: bool,
    /// Number of addresses that carry range state.
    pub range_count: usize,
}

impl Script {
    /// The command executed first, if any.
    pub fn first(&self) -> Option<usize> {
        if self.commands.is_empty() { None } else { Some(0) }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let link = |l: Option<usize>| l.map_or(" - ".to_string(), |n| format!("{n:03}"));
        for (i, cmd) in self.commands.iter().enumerate() {
            let address = cmd.address.as_ref().map_or(String::new(), |a| a.to_string());
            writeln!(
                f,
                "|{:03}|{}|{}| {:<20} {}",
                i,
                link(cmd.next),
                link(cmd.branch),
                address,
                cmd.kind
            )?;
        }
        Ok(())
    }
}
