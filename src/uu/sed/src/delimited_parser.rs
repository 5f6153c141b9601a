// Parse delimited regular expressions, replacements and character lists
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::command::{ProcessingContext, Replacement, SedRegex};
use crate::error_handling::{ScriptLocation, compilation_error};
use crate::escape_compiler::{Dialect, EscapeContext, EscapeKind, compile_escape, escape_literal};
use crate::fast_regex::Regex;
use crate::script_char_provider::{END, ScriptCharProvider};

use tracing::trace;
use uucore::error::UResult;

/// A regular expression read up to its closing delimiter, whose
/// flags are not yet known.
#[derive(Debug)]
pub struct ParsedRegex {
    pub delimiter: char,
    /// The pattern as written.
    pub source: String,
    /// The pattern translated to the engine's syntax.
    host: String,
    /// Offsets in host of `$` characters whose meaning depends on
    /// their position and the multi-line flag.
    dollars: Vec<usize>,
    location: ScriptLocation,
}

fn missing_delimiter<T>(chars: &ScriptCharProvider, what: &str, delimiter: char) -> UResult<T> {
    compilation_error(
        &chars.location(),
        format!(
            "unterminated {what}: missing delimiter {}",
            display_delimiter(delimiter)
        ),
    )
}

fn display_delimiter(delimiter: char) -> String {
    if delimiter == '\n' {
        "newline".to_string()
    } else {
        format!("`{delimiter}'")
    }
}

/// Parse the regular expression following its already consumed
/// opening delimiter. Return None for the empty regular expression.
/// On return the closing delimiter is the last consumed character.
pub fn parse_regex(
    chars: &mut ScriptCharProvider,
    delimiter: char,
    context: &ProcessingContext,
) -> UResult<Option<ParsedRegex>> {
    let location = chars.location();
    let basic = !context.regex_extended;
    let sed_dialect = context.dialect == Dialect::Sed;

    let mut ch = chars.next_char();
    if ch == delimiter {
        return Ok(None);
    }

    let mut source = String::new();
    let mut host = String::new();
    let mut dollars = Vec::new();
    let mut last_source = String::new();
    let mut last_host = String::new();

    while ch != delimiter {
        if ch == END {
            return missing_delimiter(chars, "regular expression", delimiter);
        }

        let (src, translated): (String, String) = match ch {
            '\\' if chars.peek() == delimiter => {
                let d = chars.next_char();
                (format!("\\{d}"), escape_literal(d, false))
            }
            '\\' if basic && "(){}|+?".contains(chars.peek()) => {
                let c = chars.next_char();
                (format!("\\{c}"), c.to_string())
            }
            '\\' => {
                let escape = compile_escape(chars, EscapeContext::Regex, context.dialect)?;
                (escape.source, escape.host)
            }
            '[' => parse_charset(chars, context.dialect)?,
            '(' | ')' | '{' | '}' | '|' | '+' | '?' if basic => (ch.to_string(), format!("\\{ch}")),
            '*' if basic && matches!(last_host.as_str(), "" | "(" | "|" | "^") => {
                (ch.to_string(), "\\*".to_string())
            }
            ']' => (ch.to_string(), "\\]".to_string()),
            '^' if sed_dialect && !matches!(last_host.as_str(), "" | "(" | "|") => {
                (ch.to_string(), "\\^".to_string())
            }
            '$' if sed_dialect => {
                dollars.push(host.len());
                (ch.to_string(), ch.to_string())
            }
            _ => (ch.to_string(), ch.to_string()),
        };

        let repeats_repetition = matches!(translated.as_str(), "*" | "+" | "?")
            && matches!(last_host.as_str(), "*" | "+" | "?");
        if sed_dialect && (repeats_repetition || translated == "?" && last_host == "(") {
            return compilation_error(
                &chars.location(),
                format!("invalid regular expression: {last_source}{src} is not allowed"),
            );
        }

        source.push_str(&src);
        host.push_str(&translated);
        last_source = src;
        last_host = translated;
        ch = chars.next_char();
    }

    Ok(Some(ParsedRegex {
        delimiter,
        source,
        host,
        dollars,
        location,
    }))
}

impl ParsedRegex {
    /// Resolve the meaning of `$` characters and compile the regex
    /// with its now known flags.
    pub fn finalize(self, multi_line: bool, ignore_case: bool) -> UResult<SedRegex> {
        let mut host = self.host;
        // From the end, so that earlier offsets stay valid.
        for &dollar in self.dollars.iter().rev() {
            let literal = host[dollar + 1..]
                .chars()
                .next()
                .is_some_and(|c| c != '|' && c != ')');
            if literal {
                host.insert(dollar, '\\');
            } else if !multi_line {
                host.replace_range(dollar..dollar + 1, "\\z");
            }
        }

        let mut flags = String::from("(?");
        flags.push(if multi_line { 'm' } else { 's' });
        if ignore_case {
            flags.push('i');
        }
        flags.push(')');
        let host = flags + &host;

        match Regex::new(&host) {
            Ok(regex) => {
                trace!(source = %self.source, %host, fast = regex.is_fast(), "compiled regex");
                Ok(SedRegex {
                    delimiter: self.delimiter,
                    source: self.source,
                    host,
                    multi_line,
                    ignore_case,
                    regex,
                })
            }
            Err(e) => compilation_error(
                &self.location,
                format!(
                    "invalid regular expression {0}{1}{0} (translated to {2}): {3}",
                    self.delimiter, self.source, host, e
                ),
            ),
        }
    }
}

/// Parse a bracket expression whose `[` has been consumed.
/// Return its source text and its translation.
fn parse_charset(chars: &mut ScriptCharProvider, dialect: Dialect) -> UResult<(String, String)> {
    let mut source = String::from("[");
    let mut host = String::from("[");

    // The previous member can open a range, or a range operator awaits
    // its end point.
    let mut range_start = false;
    let mut range_end = false;

    let mut ch = chars.next_char();
    if ch == '^' {
        source.push(ch);
        host.push(ch);
        ch = chars.next_char();
    }
    if ch == ']' {
        source.push(ch);
        host.push_str("\\]");
        range_start = true;
        ch = chars.next_char();
    }

    while ch != ']' {
        let opens_range = range_start;
        range_start = !range_end;
        range_end = false;
        match ch {
            // A dash is a range operator only after a possible end point;
            // elsewhere it is escaped so that `--` is not a set difference.
            '-' if opens_range && chars.peek() != ']' => {
                source.push(ch);
                host.push(ch);
                range_start = false;
                range_end = true;
            }
            '-' => {
                source.push(ch);
                host.push_str("\\-");
            }
            END => {
                return compilation_error(&chars.location(), "unterminated character set");
            }
            '[' if matches!(chars.peek(), ':' | '=' | '.') => {
                let location = chars.location();
                let marker = chars.next_char();
                let kind = match marker {
                    ':' => "character class",
                    '=' => "equivalence class",
                    _ => "collating symbol",
                };
                let mut name = String::new();
                let mut c = chars.next_char();
                while c != marker && c != END && c != ']' {
                    name.push(c);
                    c = chars.next_char();
                }
                let spec = format!("[{marker}{name}{marker}]");
                if c != marker || chars.peek() != ']' {
                    return compilation_error(
                        &location,
                        format!("[{marker}{name} in character set is not a proper {kind} specification"),
                    );
                }
                return compilation_error(
                    &location,
                    format!("the {kind} specification {spec} is not supported"),
                );
            }
            '\\' => {
                let escape = compile_escape(chars, EscapeContext::CharSet, dialect)?;
                source.push_str(&escape.source);
                host.push_str(&escape.host);
            }
            // Set operators and nested classes of the engine
            '[' | '&' | '~' => {
                source.push(ch);
                host.push('\\');
                host.push(ch);
            }
            _ => {
                source.push(ch);
                host.push(ch);
            }
        }
        ch = chars.next_char();
    }

    source.push(']');
    host.push(']');
    Ok((source, host))
}

/// Parse the replacement of an `s` command up to its closing delimiter.
/// On return the closing delimiter is the last consumed character.
pub fn parse_replacement(
    chars: &mut ScriptCharProvider,
    delimiter: char,
    dialect: Dialect,
) -> UResult<Replacement> {
    let mut replacement = Replacement::default();

    let mut ch = chars.next_char();
    while ch != delimiter {
        match ch {
            END => return missing_delimiter(chars, "`s' command", delimiter),
            '\\' if chars.peek() == delimiter => {
                let d = chars.next_char();
                replacement.push_literal(&format!("\\{d}"), &d.to_string());
            }
            '\\' => {
                let escape = compile_escape(chars, EscapeContext::Replacement, dialect)?;
                match escape.kind {
                    EscapeKind::Literal(c) => replacement.push_literal(&escape.source, &c.to_string()),
                    EscapeKind::BackReference(n) => replacement.push_group(&escape.source, n),
                    EscapeKind::Case(directive) => replacement.push_case(&escape.source, directive),
                    EscapeKind::Functional | EscapeKind::LookAround => {
                        return compilation_error(
                            &chars.location(),
                            format!("{} is not valid in a replacement", escape.source),
                        );
                    }
                }
            }
            '&' if dialect == Dialect::Sed => replacement.push_group("&", 0),
            _ => replacement.push_literal(&ch.to_string(), &ch.to_string()),
        }
        ch = chars.next_char();
    }

    Ok(replacement)
}

/// Parse one character list of a `y` command up to its closing
/// delimiter. Return the list as written and its characters.
pub fn parse_transliteration(
    chars: &mut ScriptCharProvider,
    delimiter: char,
    dialect: Dialect,
) -> UResult<(String, Vec<char>)> {
    let mut source = String::new();
    let mut list = Vec::new();

    let mut ch = chars.next_char();
    while ch != delimiter {
        match ch {
            END => return missing_delimiter(chars, "`y' command", delimiter),
            '\\' if chars.peek() == delimiter => {
                let d = chars.next_char();
                source.push('\\');
                source.push(d);
                list.push(d);
            }
            '\\' => {
                let escape = compile_escape(chars, EscapeContext::Text, dialect)?;
                match escape.literal_char() {
                    Some(c) => list.push(c),
                    None => {
                        return compilation_error(
                            &chars.location(),
                            format!("{} is not valid in a `y' command", escape.source),
                        );
                    }
                }
                source.push_str(&escape.source);
            }
            _ => {
                source.push(ch);
                list.push(ch);
            }
        }
        ch = chars.next_char();
    }

    Ok((source, list))
}
