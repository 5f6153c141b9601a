// Compile escaped character sequences
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::error_handling::compilation_error;
use crate::script_char_provider::{END, ScriptCharProvider};

use std::char;
use std::fmt;
use uucore::error::UResult;

/// The syntactic place where an escape appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeContext {
    Text,
    Replacement,
    Regex,
    CharSet,
}

impl fmt::Display for EscapeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscapeContext::Text => "normal text",
            EscapeContext::Replacement => "replacement",
            EscapeContext::Regex => "regular expression",
            EscapeContext::CharSet => "character set",
        };
        f.write_str(name)
    }
}

/// Which escape conventions apply to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Follow the traditional stream editor conventions.
    #[default]
    Sed,
    /// Follow the conventions of the underlying regex engine.
    Native,
}

/// Case conversion requested inside a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseDirective {
    /// `\L`: lowercase until `\U` or `\E`.
    Lower,
    /// `\U`: uppercase until `\L` or `\E`.
    Upper,
    /// `\l`: lowercase the next character.
    LowerNext,
    /// `\u`: uppercase the next character.
    UpperNext,
    /// `\E`: stop case conversion.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// Denotes a single character.
    Literal(char),
    /// Handled by the regex engine, e.g. `\w` or `\b`.
    Functional,
    /// An assertion that requires look-around support.
    LookAround,
    /// Numbered capture group.
    BackReference(usize),
    Case(CaseDirective),
}

/// A compiled escape sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escape {
    /// The escape as written in the script, including the backslash.
    pub source: String,
    /// The equivalent text in the regex engine's syntax.
    pub host: String,
    pub kind: EscapeKind,
}

impl Escape {
    fn literal(source: String, ch: char, context: EscapeContext) -> Self {
        Escape {
            source,
            host: host_literal(ch, context),
            kind: EscapeKind::Literal(ch),
        }
    }

    fn functional(source: String, host: &str) -> Self {
        Escape {
            source,
            host: host.to_string(),
            kind: EscapeKind::Functional,
        }
    }

    /// The character the escape stands for, if it is a literal.
    pub fn literal_char(&self) -> Option<char> {
        match self.kind {
            EscapeKind::Literal(ch) => Some(ch),
            _ => None,
        }
    }
}

/// Return ch as regex text that matches it literally.
/// Characters outside a character set are escaped if they are regex
/// metacharacters; inside a set only those special within sets are.
pub fn escape_literal(ch: char, in_set: bool) -> String {
    let special = if in_set {
        matches!(ch, '\\' | '[' | ']' | '^' | '-')
    } else {
        matches!(
            ch,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        )
    };
    if special {
        format!("\\{ch}")
    } else {
        ch.to_string()
    }
}

fn host_literal(ch: char, context: EscapeContext) -> String {
    match context {
        EscapeContext::Regex => escape_literal(ch, false),
        EscapeContext::CharSet => escape_literal(ch, true),
        EscapeContext::Text | EscapeContext::Replacement => ch.to_string(),
    }
}

/// Return true if c is a valid octal digit
fn is_ascii_octal_digit(c: char) -> bool {
    matches!(c, '0'..='7')
}

/// Compile a numeric character escape and return the corresponding char.
/// Consume at most max_digits digits, and at least min_digits.
/// radix is the value's radix (e.g. 8, 10, 16 for octal, decimal, and
/// hex escapes). Digits read are appended to source.
/// Return `None` if no valid character has been specified.
fn compile_numeric_escape(
    chars: &mut ScriptCharProvider,
    source: &mut String,
    min_digits: usize,
    max_digits: usize,
    radix: u32,
) -> Option<char> {
    let mut digits = String::new();

    while digits.len() < max_digits && chars.peek().is_digit(radix) {
        digits.push(chars.next_char());
    }
    source.push_str(&digits);

    if digits.len() < min_digits.max(1) {
        return None;
    }

    u32::from_str_radix(&digits, radix)
        .ok()
        .filter(|&value| radix != 10 || value <= 0xff)
        .and_then(char::from_u32)
}

/// Transforms the specified character into the corresponding ASCII
/// control character as follows.
/// - Convert lowercase letters to uppercase
/// - XOR the ASCII value with 0x40 (inverts bit 6)
///
/// Return `None` if the result is not a valid Unicode scalar.
fn create_control_char(x: char) -> Option<char> {
    if !x.is_ascii() {
        return None;
    }

    let transformed = (x.to_ascii_uppercase() as u8) ^ 0x40;
    char::from_u32(transformed as u32)
}

/// Compile the escape sequence following a consumed backslash.
///
/// The characters forming the escape are consumed. The result carries
/// the text as written, its translation to the regex engine's syntax,
/// and its meaning in the given context.
pub fn compile_escape(
    chars: &mut ScriptCharProvider,
    context: EscapeContext,
    dialect: Dialect,
) -> UResult<Escape> {
    use EscapeContext::*;

    // In a bracket expression a backslash is normally itself.
    if context == CharSet && dialect == Dialect::Sed && !"afnrtvsSwWcdox".contains(chars.peek()) {
        return Ok(Escape::literal("\\".to_string(), '\\', context));
    }

    let ch = chars.next_char();
    if ch == END {
        return compilation_error(&chars.location(), "unterminated escape sequence");
    }
    let source = format!("\\{ch}");

    let escape = match (context, ch) {
        (_, 'a') => Escape::literal(source, '\x07', context),
        (_, 'f') => Escape::literal(source, '\x0c', context),
        (_, 'n') => Escape::literal(source, '\n', context),
        (_, 'r') => Escape::literal(source, '\r', context),
        (_, 't') => Escape::literal(source, '\t', context),
        (_, 'v') => Escape::literal(source, '\x0b', context),
        (_, '\\') => Escape::literal(source, '\\', context),
        (Regex | CharSet, 's' | 'S' | 'w' | 'W') | (Regex, 'b' | 'B') => {
            Escape::functional(source.clone(), &source)
        }
        (Replacement, 'L' | 'U' | 'l' | 'u' | 'E') => {
            let directive = match ch {
                'L' => CaseDirective::Lower,
                'U' => CaseDirective::Upper,
                'l' => CaseDirective::LowerNext,
                'u' => CaseDirective::UpperNext,
                _ => CaseDirective::End,
            };
            Escape {
                source,
                host: String::new(),
                kind: EscapeKind::Case(directive),
            }
        }
        _ => match dialect {
            Dialect::Sed => compile_sed_escape(chars, context, ch, source)?,
            Dialect::Native => compile_native_escape(chars, context, ch, source)?,
        },
    };
    Ok(escape)
}

/// Escapes specific to the traditional stream editor conventions.
fn compile_sed_escape(
    chars: &mut ScriptCharProvider,
    context: EscapeContext,
    ch: char,
    mut source: String,
) -> UResult<Escape> {
    use EscapeContext::*;

    let escape = match (context, ch) {
        (Replacement, '0') => back_reference(source, 0, context),
        (_, '0') => Escape::literal(source, '\0', context),
        (Regex, '`') => Escape::functional(source, "\\A"),
        (Regex, '\'') => Escape::functional(source, "\\z"),
        (Regex, '<') => Escape {
            source,
            host: "\\b(?=\\w)".to_string(),
            kind: EscapeKind::LookAround,
        },
        (Regex, '>') => Escape {
            source,
            host: "\\b(?<=\\w)".to_string(),
            kind: EscapeKind::LookAround,
        },
        (Regex | Replacement, '1'..='9') => {
            back_reference(source, ch as usize - '0' as usize, context)
        }
        (_, 'c') => {
            let target = chars.next_char();
            if target == '\\' {
                return compilation_error(
                    &chars.location(),
                    "recursive escaping after \\c not allowed",
                );
            }
            match create_control_char(target).filter(|_| target != END) {
                Some(decoded) => {
                    source.push(target);
                    Escape::literal(source, decoded, context)
                }
                None => {
                    return compilation_error(&chars.location(), "stray \\c");
                }
            }
        }
        (_, 'd' | 'o' | 'x') => {
            let (radix, max_digits) = match ch {
                'd' => (10, 3),
                'o' => (8, 3),
                _ => (16, 2),
            };
            match compile_numeric_escape(chars, &mut source, 1, max_digits, radix) {
                Some(decoded) => Escape::literal(source, decoded, context),
                None => return invalid_escape(chars, &source, context),
            }
        }
        _ => verbatim(chars, context, ch, source)?,
    };
    Ok(escape)
}

/// Escapes following the regex engine's own conventions.
fn compile_native_escape(
    chars: &mut ScriptCharProvider,
    context: EscapeContext,
    ch: char,
    mut source: String,
) -> UResult<Escape> {
    use EscapeContext::*;

    let escape = match (context, ch) {
        (Regex, 'A') => Escape::functional(source, "\\A"),
        (Regex, 'Z') => Escape::functional(source, "\\z"),
        (Regex | CharSet, 'd' | 'D') => Escape::functional(source.clone(), &source),
        (_, '0'..='9') => {
            let first = ch;
            if chars.peek().is_ascii_digit() {
                let second = chars.next_char();
                source.push(second);
                if is_ascii_octal_digit(chars.peek()) && first != '0' {
                    // Three-digit octal value
                    let third = chars.next_char();
                    source.push(third);
                    if first > '3' || second > '7' {
                        return invalid_escape(chars, &source, context);
                    }
                    let value = u32::from_str_radix(&source[1..], 8).unwrap_or(0);
                    let decoded = char::from_u32(value).unwrap_or('\0');
                    Escape::literal(source, decoded, context)
                } else if first == '0' {
                    if !is_ascii_octal_digit(second) {
                        return invalid_escape(chars, &source, context);
                    }
                    let decoded = char::from_u32(second as u32 - '0' as u32).unwrap_or('\0');
                    Escape::literal(source, decoded, context)
                } else if matches!(context, Regex | Replacement) {
                    let group = (first as usize - '0' as usize) * 10 + second as usize
                        - '0' as usize;
                    back_reference(source, group, context)
                } else {
                    return outside_group_context(chars);
                }
            } else if first == '0' {
                Escape::literal(source, '\0', context)
            } else if matches!(context, Regex | Replacement) {
                back_reference(source, first as usize - '0' as usize, context)
            } else {
                return outside_group_context(chars);
            }
        }
        (_, 'x' | 'u' | 'U') => {
            let digits = match ch {
                'x' => 2,
                'u' => 4,
                _ => 8,
            };
            match compile_numeric_escape(chars, &mut source, digits, digits, 16) {
                Some(decoded) => Escape::literal(source, decoded, context),
                None => return invalid_escape(chars, &source, context),
            }
        }
        _ => verbatim(chars, context, ch, source)?,
    };
    Ok(escape)
}

fn back_reference(source: String, group: usize, context: EscapeContext) -> Escape {
    let host = match context {
        EscapeContext::Regex => format!("(?:\\{group})"),
        _ => String::new(),
    };
    Escape {
        source,
        host,
        kind: EscapeKind::BackReference(group),
    }
}

/// Any other escaped character stands for itself; letters and digits
/// are reserved outside plain text.
fn verbatim(
    chars: &ScriptCharProvider,
    context: EscapeContext,
    ch: char,
    source: String,
) -> UResult<Escape> {
    if ch.is_alphanumeric() && context != EscapeContext::Text {
        return compilation_error(
            &chars.location(),
            format!("\\{ch} is not a valid escape in a {context}"),
        );
    }
    Ok(Escape::literal(source, ch, context))
}

fn invalid_escape<T>(chars: &ScriptCharProvider, source: &str, context: EscapeContext) -> UResult<T> {
    compilation_error(
        &chars.location(),
        format!("{source} is an invalid escape in a {context}"),
    )
}

fn outside_group_context<T>(chars: &ScriptCharProvider) -> UResult<T> {
    compilation_error(
        &chars.location(),
        "group back-reference outside of a regular expression or replacement",
    )
}
