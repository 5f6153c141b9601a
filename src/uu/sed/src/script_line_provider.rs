// Provide the script contents as logical lines
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::command::ScriptValue;
use crate::error_handling::{ScriptLocation, compilation_error};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::rc::Rc;
use uucore::display::Quotable;
use uucore::error::{FromIo, UResult};

/// A script line ready for tokenizing, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// The line's characters. A trailing continuation backslash is
    /// removed and every line ends with '\n'.
    pub text: Vec<char>,
    /// True if the line ended with an unescaped backslash, so that
    /// tokens may run on into the following line.
    pub continued: bool,
    pub input_name: Rc<str>,
    pub line_number: usize,
}

impl ScriptLine {
    /// Build a line from its raw text, without the line terminator.
    pub fn new(raw: &str, input_name: Rc<str>, line_number: usize) -> Self {
        let trailing = raw.chars().rev().take_while(|&c| c == '\\').count();
        let continued = trailing % 2 == 1;
        let body = if continued { &raw[..raw.len() - 1] } else { raw };
        let mut text: Vec<char> = body.chars().collect();
        text.push('\n');
        ScriptLine {
            text,
            continued,
            input_name,
            line_number,
        }
    }

    /// Return true for lines holding only spaces or a comment.
    fn is_empty(&self) -> bool {
        let first = self.text.iter().find(|c| !c.is_whitespace());
        matches!(first, None | Some('#'))
    }

    /// Location of the character at the 0-based position pos.
    pub fn location(&self, pos: usize) -> ScriptLocation {
        ScriptLocation {
            input_name: self.input_name.clone(),
            line_number: self.line_number,
            column_number: pos + 1,
        }
    }
}

/// Reader of the `-e` and `-f` script fragments, in the order given
pub struct ScriptLineProvider {
    sources: Vec<ScriptValue>,
}

impl ScriptLineProvider {
    pub fn new(sources: Vec<ScriptValue>) -> Self {
        Self { sources }
    }

    /// Open a fragment, returning the name under which errors in it
    /// are reported. Strings are numbered among strings only.
    fn open(
        source: &ScriptValue,
        strings_seen: &mut usize,
    ) -> UResult<(Rc<str>, Box<dyn BufRead>)> {
        match source {
            ScriptValue::StringVal(text) => {
                *strings_seen += 1;
                let reader = BufReader::new(io::Cursor::new(text.clone().into_bytes()));
                Ok((Rc::from(format!("-e #{strings_seen}")), Box::new(reader)))
            }
            ScriptValue::PathVal(path) => {
                let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
                    Box::new(BufReader::new(io::stdin()))
                } else {
                    let file = File::open(path)
                        .map_err_context(|| format!("couldn't open script file {}", path.quote()))?;
                    Box::new(BufReader::new(file))
                };
                Ok((Rc::from(path.to_string_lossy().as_ref()), reader))
            }
        }
    }

    /// Return the raw lines of every fragment, without terminators,
    /// each with its fragment name and 1-based line number.
    fn raw_lines(&self) -> UResult<Vec<(String, Rc<str>, usize)>> {
        let mut raw = Vec::new();
        let mut strings_seen = 0;
        for source in &self.sources {
            let (name, mut reader) = Self::open(source, &mut strings_seen)?;
            let mut line_number = 0;
            loop {
                let mut line = String::new();
                let bytes = reader
                    .read_line(&mut line)
                    .map_err_context(|| format!("reading script {}", name.quote()))?;
                if bytes == 0 {
                    break;
                }
                line_number += 1;
                if line.ends_with('\n') {
                    line.pop();
                }
                raw.push((line, name.clone(), line_number));
            }
        }
        Ok(raw)
    }

    /// Read all sources and chain them into the script's logical lines.
    /// Empty and comment-only lines are dropped, unless they follow a
    /// continued line or open the script.
    pub fn read_all(self) -> UResult<Vec<ScriptLine>> {
        let mut lines: Vec<ScriptLine> = Vec::new();
        for (raw, name, line_number) in self.raw_lines()? {
            let line = ScriptLine::new(&raw, name, line_number);
            let after_continued = lines.last().is_some_and(|l| l.continued);
            if !lines.is_empty() && !after_continued && !line.continued && line.is_empty() {
                continue;
            }
            lines.push(line);
        }

        if let Some(last) = lines.last() {
            if last.continued {
                return compilation_error(
                    &last.location(last.text.len()),
                    "incomplete command: line continuation at end of script",
                );
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn texts(lines: &[ScriptLine]) -> Vec<String> {
        lines.iter().map(|l| l.text.iter().collect()).collect()
    }

    #[test]
    fn test_string_sources() {
        let input = vec![
            ScriptValue::StringVal("s/a/b/\ny".to_string()),
            ScriptValue::StringVal("p".to_string()),
        ];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        assert_eq!(texts(&lines), vec!["s/a/b/\n", "y\n", "p\n"]);
    }

    #[test]
    fn test_file_source() {
        let mut script = NamedTempFile::new().unwrap();
        write!(script, "1d\n$p\n").unwrap();

        let input = vec![ScriptValue::PathVal(script.path().to_path_buf())];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        assert_eq!(texts(&lines), vec!["1d\n", "$p\n"]);
        assert_eq!(lines[1].line_number, 2);
    }

    #[test]
    fn test_missing_file_source() {
        let input = vec![ScriptValue::PathVal("/nonexistent/script.sed".into())];
        let err = ScriptLineProvider::new(input).read_all().unwrap_err();
        assert!(err.to_string().contains("couldn't open script file"));
    }

    #[test]
    fn test_fragment_names() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        std::fs::write(&path, "p\n").unwrap();

        let input = vec![
            ScriptValue::StringVal("l1\nl2".to_string()),
            ScriptValue::PathVal(path.clone()),
            ScriptValue::StringVal("l3".to_string()),
        ];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        let origins: Vec<(String, usize)> = lines
            .iter()
            .map(|l| (l.input_name.to_string(), l.line_number))
            .collect();
        assert_eq!(
            origins,
            vec![
                ("-e #1".to_string(), 1),
                ("-e #1".to_string(), 2),
                (path.to_string_lossy().to_string(), 1),
                ("-e #2".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_continuation() {
        let input = vec![ScriptValue::StringVal("a\\\nhello\\\nworld".to_string())];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        assert_eq!(texts(&lines), vec!["a\n", "hello\n", "world\n"]);
        assert!(lines[0].continued);
        assert!(lines[1].continued);
        assert!(!lines[2].continued);
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let line = ScriptLine::new("s/x/\\\\", Rc::from("-e #1"), 1);
        assert!(!line.continued);
        assert_eq!(line.text.iter().collect::<String>(), "s/x/\\\\\n");
    }

    #[test]
    fn test_continuation_across_fragments() {
        let input = vec![
            ScriptValue::StringVal("a\\".to_string()),
            ScriptValue::StringVal("text".to_string()),
        ];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        assert_eq!(texts(&lines), vec!["a\n", "text\n"]);
        assert_eq!(&*lines[1].input_name, "-e #2");
    }

    #[test]
    fn test_empty_and_comment_lines_dropped() {
        let input = vec![ScriptValue::StringVal(
            "#n\np\n\n   \n# comment\nq".to_string(),
        )];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        assert_eq!(texts(&lines), vec!["#n\n", "p\n", "q\n"]);
        assert_eq!(lines[2].line_number, 6);
    }

    #[test]
    fn test_empty_line_kept_after_continuation() {
        let input = vec![ScriptValue::StringVal("a\\\n\nx".to_string())];
        let lines = ScriptLineProvider::new(input).read_all().unwrap();

        assert_eq!(texts(&lines), vec!["a\n", "\n", "x\n"]);
    }

    #[test]
    fn test_trailing_continuation_is_error() {
        let input = vec![ScriptValue::StringVal("p\na\\".to_string())];
        let err = ScriptLineProvider::new(input).read_all().unwrap_err();

        assert!(err.to_string().starts_with("-e #1:2:"));
        assert!(err.to_string().contains("incomplete command"));
    }
}
