// Provide the script contents character by character
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::error_handling::ScriptLocation;
use crate::script_line_provider::ScriptLine;

/// Returned at the end of a line that is not continued.
pub const END: char = '\0';

/// Pull-based reader over the script's logical lines.
///
/// The cursor works on the most recently consumed character: parsing
/// functions receive it through `last_char()` after a `next_char()`.
/// Reading past the end of a continued line moves transparently into
/// the following line; other lines end with `END`.
pub struct ScriptCharProvider {
    lines: Vec<ScriptLine>,
    index: usize,
    pos: usize,
    last_char: char,
    last_index: usize,
    last_pos: usize,
}

impl ScriptCharProvider {
    pub fn new(lines: Vec<ScriptLine>) -> Self {
        Self {
            lines,
            index: 0,
            pos: 0,
            last_char: END,
            last_index: 0,
            last_pos: 0,
        }
    }

    fn current_line(&self) -> Option<&ScriptLine> {
        self.lines.get(self.index)
    }

    fn has_next_line(&self) -> bool {
        self.index + 1 < self.lines.len()
    }

    fn line_len(&self) -> usize {
        self.current_line().map_or(0, |l| l.text.len())
    }

    fn move_to_next_line(&mut self) {
        self.index += 1;
        self.pos = 0;
    }

    /// Consume and return the next character, or END.
    pub fn next_char(&mut self) -> char {
        self.last_index = self.index;
        self.last_pos = self.pos;
        let Some(line) = self.current_line() else {
            self.last_char = END;
            return END;
        };
        if self.pos < line.text.len() {
            let ch = line.text[self.pos];
            let continued = line.continued;
            self.pos += 1;
            self.last_char = ch;
            if self.pos == self.line_len() && continued && self.has_next_line() {
                self.move_to_next_line();
            }
            return ch;
        }
        self.last_char = END;
        END
    }

    /// Return the next character without consuming it, or END.
    pub fn peek(&self) -> char {
        self.current_line()
            .and_then(|l| l.text.get(self.pos).copied())
            .unwrap_or(END)
    }

    /// Return the most recently consumed character.
    pub fn last_char(&self) -> char {
        self.last_char
    }

    /// When the current line is exhausted, continue reading from the
    /// next one even if the line was not continued.
    pub fn continue_on_next_line(&mut self) {
        if self.pos == self.line_len() && self.has_next_line() {
            self.move_to_next_line();
        }
    }

    /// Consume spaces and tabs up to the end of the current line;
    /// return the first other character.
    pub fn next_non_space_in_line(&mut self) -> char {
        let mut ch = self.next_char();
        while ch != '\n' && ch.is_whitespace() {
            ch = self.next_char();
        }
        ch
    }

    /// Consume whitespace, including newlines of continued lines;
    /// return the first other character.
    pub fn next_non_space(&mut self) -> char {
        let mut ch = self.next_char();
        while ch.is_whitespace() {
            ch = self.next_char();
        }
        ch
    }

    /// Like next_non_space, but starting from the last consumed
    /// character.
    pub fn skip_space(&mut self) -> char {
        let mut ch = self.last_char;
        while ch.is_whitespace() {
            ch = self.next_char();
        }
        ch
    }

    /// Skip whitespace, comments, and `;` separators across lines.
    /// Return the first character of the next command, or END when the
    /// script is exhausted.
    pub fn skip_to_command_boundary(&mut self) -> char {
        let mut ch = self.last_char;
        if ch == END || ch.is_whitespace() {
            ch = self.next_non_space();
        }
        while matches!(ch, END | '#' | ';') {
            match ch {
                END => {
                    if self.has_next_line() {
                        self.move_to_next_line();
                    } else {
                        return END;
                    }
                }
                '#' => {
                    while self.current_line().is_some_and(|l| l.continued) && self.has_next_line() {
                        self.move_to_next_line();
                    }
                    self.pos = self.line_len();
                }
                _ => {}
            }
            ch = self.next_non_space();
        }
        ch
    }

    /// Return true if the last consumed character, after skipping any
    /// whitespace, terminates a command.
    pub fn at_command_end(&mut self) -> bool {
        let ch = self.skip_space();
        matches!(ch, ';' | '#' | '}' | END)
    }

    /// Location of the most recently consumed character.
    pub fn location(&self) -> ScriptLocation {
        match self.lines.get(self.last_index) {
            Some(line) => line.location(self.last_pos),
            None => ScriptLocation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ScriptValue;
    use crate::script_line_provider::ScriptLineProvider;

    fn provider(script: &str) -> ScriptCharProvider {
        let lines = ScriptLineProvider::new(vec![ScriptValue::StringVal(script.to_string())])
            .read_all()
            .unwrap();
        ScriptCharProvider::new(lines)
    }

    #[test]
    fn test_basic_navigation() {
        let mut chars = provider("abc");
        assert_eq!(chars.peek(), 'a');
        assert_eq!(chars.next_char(), 'a');
        assert_eq!(chars.last_char(), 'a');
        assert_eq!(chars.next_char(), 'b');
        assert_eq!(chars.next_char(), 'c');
        assert_eq!(chars.next_char(), '\n');
        assert_eq!(chars.peek(), END);
        assert_eq!(chars.next_char(), END);
        assert_eq!(chars.next_char(), END);
    }

    #[test]
    fn test_lines_not_joined_without_continuation() {
        let mut chars = provider("a\nb");
        assert_eq!(chars.next_char(), 'a');
        assert_eq!(chars.next_char(), '\n');
        assert_eq!(chars.next_char(), END);
    }

    #[test]
    fn test_continuation_is_transparent() {
        let mut chars = provider("a\\\nb");
        assert_eq!(chars.next_char(), 'a');
        assert_eq!(chars.next_char(), '\n');
        assert_eq!(chars.next_char(), 'b');
        assert_eq!(chars.location().line_number, 2);
    }

    #[test]
    fn test_continue_on_next_line() {
        let mut chars = provider("s\nxy");
        assert_eq!(chars.next_char(), 's');
        assert_eq!(chars.next_char(), '\n');
        chars.continue_on_next_line();
        assert_eq!(chars.next_char(), 'x');
    }

    #[test]
    fn test_non_space_in_line_stops_at_newline() {
        let mut chars = provider("a  \t\nb");
        chars.next_char();
        assert_eq!(chars.next_non_space_in_line(), '\n');
    }

    #[test]
    fn test_skip_to_command_boundary() {
        let mut chars = provider("  ;; p ; # comment\n\n  x");
        assert_eq!(chars.skip_to_command_boundary(), 'p');
        chars.next_char();
        assert!(chars.at_command_end());
        assert_eq!(chars.skip_to_command_boundary(), 'x');
        assert_eq!(chars.location().line_number, 3);
        chars.next_char();
        assert!(chars.at_command_end());
        assert_eq!(chars.skip_to_command_boundary(), END);
    }

    #[test]
    fn test_comment_spans_continued_lines() {
        let mut chars = provider("# one\\\ntwo\np");
        assert_eq!(chars.skip_to_command_boundary(), 'p');
    }

    #[test]
    fn test_at_command_end() {
        let mut chars = provider("p}");
        chars.next_char();
        chars.next_char();
        assert!(chars.at_command_end());

        let mut chars = provider("px");
        chars.next_char();
        chars.next_char();
        assert!(!chars.at_command_end());
    }

    #[test]
    fn test_location() {
        let mut chars = provider("1,3p");
        chars.next_char();
        chars.next_char();
        let location = chars.location();
        assert_eq!(&*location.input_name, "-e #1");
        assert_eq!(location.line_number, 1);
        assert_eq!(location.column_number, 2);
    }

    #[test]
    fn test_empty_script() {
        let mut chars = ScriptCharProvider::new(vec![]);
        assert_eq!(chars.peek(), END);
        assert_eq!(chars.skip_to_command_boundary(), END);
    }
}
