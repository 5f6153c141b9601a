// Compile the scripts into the internal representation of commands
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::address::{Address, AddressRange, RangeEnd};
use crate::command::{
    Command, CommandKind, ProcessingContext, Script, ScriptValue, SedRegex, Substitution,
    Transliteration,
};
use crate::delimited_parser::{parse_regex, parse_replacement, parse_transliteration};
use crate::error_handling::{ScriptLocation, compilation_error};
use crate::escape_compiler::{EscapeContext, compile_escape};
use crate::script_char_provider::{END, ScriptCharProvider};
use crate::script_line_provider::{ScriptLine, ScriptLineProvider};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use uucore::error::UResult;

// A global, immutable map of command properties, initialized on first access
static CMD_MAP: Lazy<HashMap<char, CommandSpec>> = Lazy::new(build_command_map);

// The most recent editor version whose scripts are accepted by `v`
const SUPPORTED_VERSION: (u32, u32, u32) = (4, 8, 0);

// Types of command arguments recognized by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandArgs {
    Empty,         // d D F g G h H n N p P x z =
    Text,          // a c i
    Group,         // {
    EndGroup,      // }
    Branch,        // b t T
    Label,         // :
    Number,        // l q Q
    ReadFile,      // r R
    WriteFile,     // w W
    Substitute,    // s
    Transliterate, // y
    Version,       // v
}

// Command specification
#[derive(Debug, Clone, Copy)]
struct CommandSpec {
    code: char,        // Command letter used by sed
    n_addr: usize,     // Number of supported addresses
    args: CommandArgs, // Type of command arguments
}

// Build the command specification map (char -> CommandSpec)
fn build_command_map() -> HashMap<char, CommandSpec> {
    use CommandArgs::*;

    let formats = [
        ('{', 2, Group),
        ('}', 0, EndGroup),
        (':', 0, Label),
        ('=', 2, Empty),
        ('a', 2, Text),
        ('b', 2, Branch),
        ('c', 2, Text),
        ('d', 2, Empty),
        ('D', 2, Empty),
        ('F', 2, Empty),
        ('g', 2, Empty),
        ('G', 2, Empty),
        ('h', 2, Empty),
        ('H', 2, Empty),
        ('i', 2, Text),
        ('l', 2, Number),
        ('n', 2, Empty),
        ('N', 2, Empty),
        ('p', 2, Empty),
        ('P', 2, Empty),
        ('q', 1, Number),
        ('Q', 1, Number),
        ('r', 2, ReadFile),
        ('R', 2, ReadFile),
        ('s', 2, Substitute),
        ('t', 2, Branch),
        ('T', 2, Branch),
        ('v', 0, Version),
        ('w', 2, WriteFile),
        ('W', 2, WriteFile),
        ('x', 2, Empty),
        ('y', 2, Transliterate),
        ('z', 2, Empty),
    ];

    formats
        .into_iter()
        .map(|(code, n_addr, args)| (code, CommandSpec { code, n_addr, args }))
        .collect()
}

/// Compile the specified scripts into a linked command graph.
/// Flags on the script's first line (`#n`, `#r`) update the context.
pub fn compile(scripts: Vec<ScriptValue>, context: &mut ProcessingContext) -> UResult<Script> {
    let lines = ScriptLineProvider::new(scripts).read_all()?;
    if let Some(first) = lines.first() {
        apply_script_flags(first, context);
    }

    let mut chars = ScriptCharProvider::new(lines);
    let mut builder = ScriptBuilder::default();
    while chars.skip_to_command_boundary() != END {
        compile_command(&mut chars, &mut builder, context)?;
    }

    let script = builder.finish()?;
    debug!("compiled script\n{script}");
    Ok(script)
}

/// Apply `#n`, `#r`, `#nr` or `#rn` given as a script's first line.
fn apply_script_flags(first: &ScriptLine, context: &mut ProcessingContext) {
    let text: String = first.text.iter().collect();
    match text.trim_end_matches('\n') {
        "#n" => context.quiet = true,
        "#r" => context.regex_extended = true,
        "#nr" | "#rn" => {
            context.quiet = true;
            context.regex_extended = true;
        }
        _ => {}
    }
}

/// A reference to a label that may be defined later in the script.
#[derive(Debug)]
struct PendingBranch {
    command: usize,
    label: String,
}

/// Collects commands in script order; links them once all are known.
#[derive(Debug, Default)]
struct ScriptBuilder {
    commands: Vec<Command>,
    open_blocks: Vec<usize>,
    // (opener, closer) pairs
    blocks: Vec<(usize, usize)>,
    labels: HashMap<String, usize>,
    pending: Vec<PendingBranch>,
    needs_last_line: bool,
    range_count: usize,
}

impl ScriptBuilder {
    fn next_range_id(&mut self) -> usize {
        self.range_count += 1;
        self.range_count - 1
    }

    /// Append a command, tracking blocks and labels.
    fn add(&mut self, command: Command) -> UResult<()> {
        let id = self.commands.len();

        if let Some(range) = &command.address {
            if matches!(range.start, Address::Last) || matches!(range.end, Some(RangeEnd::Last)) {
                self.needs_last_line = true;
            }
        }

        match &command.kind {
            CommandKind::BlockStart => self.open_blocks.push(id),
            CommandKind::BlockEnd => match self.open_blocks.pop() {
                Some(opener) => self.blocks.push((opener, id)),
                None => return compilation_error(&command.location, "unexpected `}'"),
            },
            CommandKind::Label(name) => {
                if let Some(&previous) = self.labels.get(name) {
                    return compilation_error(
                        &command.location,
                        format!(
                            "duplicate label `{name}' (previously defined at {})",
                            self.commands[previous].location
                        ),
                    );
                }
                self.labels.insert(name.clone(), id);
            }
            CommandKind::Branch(Some(label))
            | CommandKind::Test(Some(label))
            | CommandKind::TestNot(Some(label)) => self.pending.push(PendingBranch {
                command: id,
                label: label.clone(),
            }),
            _ => {}
        }

        self.commands.push(command);
        Ok(())
    }

    /// Link the commands, close blocks and resolve label references.
    fn finish(mut self) -> UResult<Script> {
        if let Some(&first) = self.open_blocks.first() {
            let locations: Vec<String> = self
                .open_blocks
                .iter()
                .map(|&id| self.commands[id].location.to_string())
                .collect();
            return compilation_error(
                &self.commands[first].location,
                format!("unmatched `{{' (opened at {})", locations.join(", ")),
            );
        }

        let unresolved: Vec<&PendingBranch> = self
            .pending
            .iter()
            .filter(|p| !self.labels.contains_key(&p.label))
            .collect();
        if let Some(first) = unresolved.first() {
            let references: Vec<String> = unresolved
                .iter()
                .map(|p| format!("`{}' at {}", p.label, self.commands[p.command].location))
                .collect();
            return compilation_error(
                &self.commands[first.command].location,
                format!("can't find label for jump to {}", references.join(", ")),
            );
        }

        // Quit commands keep their link too: an unselected q continues.
        let count = self.commands.len();
        for (i, command) in self.commands.iter_mut().enumerate() {
            command.next = (i + 1 < count).then_some(i + 1);
        }

        for &(opener, closer) in &self.blocks {
            let after = self.commands[closer].next;
            let command = &mut self.commands[opener];
            command.branch = Some(opener + 1);
            command.next = after;
        }

        for pending in &self.pending {
            self.commands[pending.command].branch = self.labels.get(&pending.label).copied();
        }

        Ok(Script {
            commands: self.commands,
            needs_last_line: self.needs_last_line,
            range_count: self.range_count,
        })
    }
}

/// Compile the command starting at the last consumed character.
fn compile_command(
    chars: &mut ScriptCharProvider,
    builder: &mut ScriptBuilder,
    context: &ProcessingContext,
) -> UResult<()> {
    let mut address = compile_address_range(chars, context)?;
    let n_addr = match &address {
        None => 0,
        Some(range) if range.end.is_none() => 1,
        Some(_) => 2,
    };

    let mut ch = if address.is_some() {
        chars.next_non_space_in_line()
    } else {
        chars.last_char()
    };

    if ch == '!' {
        let Some(range) = address.as_mut() else {
            return compilation_error(&chars.location(), "missing address before `!'");
        };
        range.negate = true;
        ch = chars.next_non_space_in_line();
        if ch == '!' {
            return compilation_error(&chars.location(), "multiple `!'s");
        }
    }

    let location = chars.location();
    let spec = get_cmd_spec(chars, ch, n_addr)?;

    let kind = match spec.args {
        CommandArgs::Empty => {
            end_command(chars, spec.code)?;
            match spec.code {
                '=' => CommandKind::PrintLineNumber,
                'd' => CommandKind::Delete,
                'D' => CommandKind::DeleteFirstLine,
                'F' => CommandKind::PrintFileName,
                'g' => CommandKind::ReplaceWithHold,
                'G' => CommandKind::AppendHold,
                'h' => CommandKind::ReplaceHold,
                'H' => CommandKind::AppendToHold,
                'n' => CommandKind::Next,
                'N' => CommandKind::AppendNext,
                'p' => CommandKind::Print,
                'P' => CommandKind::PrintFirstLine,
                'x' => CommandKind::Exchange,
                _ => CommandKind::Zap,
            }
        }
        CommandArgs::Text => {
            let text = compile_text(chars, spec.code, context)?;
            match spec.code {
                'a' => CommandKind::Append(text),
                'i' => CommandKind::Insert(text),
                _ => CommandKind::Change(text),
            }
        }
        CommandArgs::Group => {
            // A command may follow the brace directly.
            chars.next_char();
            CommandKind::BlockStart
        }
        CommandArgs::EndGroup => {
            end_command(chars, spec.code)?;
            CommandKind::BlockEnd
        }
        CommandArgs::Label => {
            chars.next_non_space_in_line();
            let label = read_label(chars);
            if label.is_empty() {
                return compilation_error(&location, "\":\" lacks a label");
            }
            check_command_end(chars, spec.code)?;
            CommandKind::Label(label)
        }
        CommandArgs::Branch => {
            chars.next_non_space_in_line();
            let label = read_label(chars);
            check_command_end(chars, spec.code)?;
            let label = (!label.is_empty()).then_some(label);
            match spec.code {
                'b' => CommandKind::Branch(label),
                't' => CommandKind::Test(label),
                _ => CommandKind::TestNot(label),
            }
        }
        CommandArgs::Number => {
            let ch = chars.next_non_space_in_line();
            let number = if ch.is_ascii_digit() {
                let n = parse_number(chars)?;
                chars.next_char();
                Some(n)
            } else {
                None
            };
            check_command_end(chars, spec.code)?;
            match spec.code {
                'l' => CommandKind::List(number),
                code => {
                    let status = match number.map(i32::try_from).transpose() {
                        Ok(status) => status.unwrap_or(0),
                        Err(_) => {
                            return compilation_error(&location, "exit code out of range");
                        }
                    };
                    if code == 'q' {
                        CommandKind::Quit(status)
                    } else {
                        CommandKind::QuitSilent(status)
                    }
                }
            }
        }
        CommandArgs::ReadFile | CommandArgs::WriteFile => {
            check_sandbox(&location, context)?;
            let path = read_file_name(chars)?;
            match spec.code {
                'r' => CommandKind::ReadFile(path),
                'R' => CommandKind::ReadLine(path),
                'w' => CommandKind::Write(path),
                _ => CommandKind::WriteFirstLine(path),
            }
        }
        CommandArgs::Substitute => {
            CommandKind::Substitute(Box::new(compile_substitution(chars, context)?))
        }
        CommandArgs::Transliterate => {
            CommandKind::Transliterate(Box::new(compile_transliteration(chars, context)?))
        }
        CommandArgs::Version => compile_version(chars, &location)?,
    };

    if let Some(range) = address.as_mut() {
        range.id = builder.next_range_id();
    }

    builder.add(Command {
        kind,
        address,
        next: None,
        branch: None,
        location,
    })
}

// Return the specification for the command letter ch,
// checking for diverse errors.
fn get_cmd_spec(
    chars: &ScriptCharProvider,
    ch: char,
    n_addr: usize,
) -> UResult<&'static CommandSpec> {
    if ch == END || ch == '\n' || ch == ';' {
        return compilation_error(&chars.location(), "missing command");
    }

    let Some(spec) = CMD_MAP.get(&ch) else {
        return compilation_error(&chars.location(), format!("unknown command: `{ch}'"));
    };

    if n_addr > spec.n_addr {
        let msg = match spec.n_addr {
            0 => format!("{ch} doesn't want any addresses"),
            _ => "command only uses one address".to_string(),
        };
        return compilation_error(&chars.location(), msg);
    }

    Ok(spec)
}

/// Fail unless the command's letter is followed by its terminator.
fn end_command(chars: &mut ScriptCharProvider, code: char) -> UResult<()> {
    chars.next_char();
    check_command_end(chars, code)
}

/// Fail unless the last consumed character, after any whitespace,
/// terminates a command.
fn check_command_end(chars: &mut ScriptCharProvider, code: char) -> UResult<()> {
    if chars.at_command_end() {
        Ok(())
    } else {
        compilation_error(
            &chars.location(),
            format!("extra characters after command `{code}'"),
        )
    }
}

/// Parse the decimal number whose first digit was just consumed.
/// The last digit is the last consumed character on return.
fn parse_number(chars: &mut ScriptCharProvider) -> UResult<usize> {
    let mut value = chars.last_char().to_digit(10).unwrap_or(0) as usize;
    while let Some(digit) = chars.peek().to_digit(10) {
        chars.next_char();
        value = match value.checked_mul(10).and_then(|v| v.checked_add(digit as usize)) {
            Some(v) => v,
            None => return compilation_error(&chars.location(), "number too large"),
        };
    }
    Ok(value)
}

/// Read a label starting at the last consumed character.
fn read_label(chars: &mut ScriptCharProvider) -> String {
    let mut label = String::new();
    let mut ch = chars.last_char();
    while !ch.is_whitespace() && !matches!(ch, END | ';' | '}') {
        label.push(ch);
        ch = chars.next_char();
    }
    label
}

/// Read a file name: the rest of the line after any leading spaces.
fn read_file_name(chars: &mut ScriptCharProvider) -> UResult<PathBuf> {
    let mut name = String::new();
    let mut ch = chars.next_non_space_in_line();
    while ch != '\n' && ch != END {
        name.push(ch);
        ch = chars.next_char();
    }
    if name.is_empty() {
        return compilation_error(&chars.location(), "missing filename in r/R/w/W commands");
    }
    Ok(PathBuf::from(name))
}

fn check_sandbox(location: &ScriptLocation, context: &ProcessingContext) -> UResult<()> {
    if context.sandbox {
        compilation_error(location, "e/r/w commands disabled in sandbox mode")
    } else {
        Ok(())
    }
}

/// Compile the text argument of `a`, `i` or `c`, in its one-line
/// (`a text`) or its classic (`a\` newline text) form.
fn compile_text(
    chars: &mut ScriptCharProvider,
    code: char,
    context: &ProcessingContext,
) -> UResult<String> {
    let mut ch = chars.next_non_space_in_line();
    if ch == '\\' {
        ch = chars.next_char();
    }
    if ch == '\n' {
        // Only a continued line carries on into the text.
        if chars.peek() == END {
            return compilation_error(
                &chars.location(),
                format!("expected \\ after `a', `c' or `i' (in `{code}')"),
            );
        }
        ch = chars.next_char();
    }

    let mut text = String::new();
    while ch != END {
        if ch == '\\' {
            let escape = compile_escape(chars, EscapeContext::Text, context.dialect)?;
            match escape.literal_char() {
                Some(c) => text.push(c),
                None => text.push_str(&escape.source),
            }
        } else {
            text.push(ch);
        }
        ch = chars.next_char();
    }
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Read the delimiter of an `s` or `y` command.
fn read_delimiter(chars: &mut ScriptCharProvider, code: char) -> UResult<char> {
    let delimiter = chars.next_char();
    match delimiter {
        END | '\\' => compilation_error(
            &chars.location(),
            format!("unterminated `{code}' command: missing delimiter"),
        ),
        '\n' => {
            chars.continue_on_next_line();
            Ok(delimiter)
        }
        _ => Ok(delimiter),
    }
}

fn compile_substitution(
    chars: &mut ScriptCharProvider,
    context: &ProcessingContext,
) -> UResult<Substitution> {
    let delimiter = read_delimiter(chars, 's')?;
    let pattern = parse_regex(chars, delimiter, context)?;
    if delimiter == '\n' {
        chars.continue_on_next_line();
    }
    let replacement = parse_replacement(chars, delimiter, context.dialect)?;

    let mut subst = Substitution {
        regex: None,
        delimiter,
        replacement,
        occurrence: 1,
        global: false,
        print: false,
        ignore_case: false,
        multi_line: false,
        write_file: None,
    };
    compile_subst_flags(chars, &mut subst, context)?;

    subst.regex = match pattern {
        Some(parsed) => Some(parsed.finalize(subst.multi_line, subst.ignore_case)?),
        None if subst.ignore_case || subst.multi_line => {
            return compilation_error(&chars.location(), "cannot specify modifiers on empty regexp");
        }
        None => None,
    };

    if let Some(re) = &subst.regex {
        let max_group = subst.replacement.max_group();
        if max_group > re.group_count() {
            return compilation_error(
                &chars.location(),
                format!("invalid reference \\{max_group} on `s' command's RHS"),
            );
        }
    }

    Ok(subst)
}

/// Parse the substitution command's optional flags
fn compile_subst_flags(
    chars: &mut ScriptCharProvider,
    subst: &mut Substitution,
    context: &ProcessingContext,
) -> UResult<()> {
    let mut seen_number = false;

    loop {
        let ch = chars.next_char();
        let duplicate = match ch {
            'g' => std::mem::replace(&mut subst.global, true),
            'p' => std::mem::replace(&mut subst.print, true),
            'i' | 'I' => std::mem::replace(&mut subst.ignore_case, true),
            'm' | 'M' => std::mem::replace(&mut subst.multi_line, true),
            '0'..='9' => {
                let location = chars.location();
                let n = parse_number(chars)?;
                if n == 0 {
                    return compilation_error(
                        &location,
                        "number option to `s' command may not be zero",
                    );
                }
                subst.occurrence = n;
                std::mem::replace(&mut seen_number, true)
            }
            'w' => {
                check_sandbox(&chars.location(), context)?;
                subst.write_file = Some(read_file_name(chars)?);
                return Ok(());
            }
            _ => {
                if chars.at_command_end() {
                    return Ok(());
                }
                return compilation_error(&chars.location(), "unknown option to `s'");
            }
        };
        if duplicate {
            let msg = if ch.is_ascii_digit() {
                "multiple number options to `s' command".to_string()
            } else {
                format!("multiple `{ch}' options to `s' command")
            };
            return compilation_error(&chars.location(), msg);
        }
    }
}

fn compile_transliteration(
    chars: &mut ScriptCharProvider,
    context: &ProcessingContext,
) -> UResult<Transliteration> {
    let delimiter = read_delimiter(chars, 'y')?;
    let (source, from) = parse_transliteration(chars, delimiter, context.dialect)?;
    let (target, to) = parse_transliteration(chars, delimiter, context.dialect)?;
    if from.len() != to.len() {
        return compilation_error(
            &chars.location(),
            "strings for `y' command are different lengths",
        );
    }
    end_command(chars, 'y')?;
    Ok(Transliteration::new(delimiter, source, target, &from, &to))
}

/// Compile `v`, failing if the script requires a newer version.
fn compile_version(chars: &mut ScriptCharProvider, location: &ScriptLocation) -> UResult<CommandKind> {
    chars.next_non_space_in_line();
    let version = read_label(chars);
    check_command_end(chars, 'v')?;
    if version.is_empty() {
        return Ok(CommandKind::Version(version));
    }

    let parts: Option<Vec<u32>> = version
        .split('.')
        .map(|part| {
            part.bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| part.parse().ok())
                .flatten()
        })
        .collect();
    let requested = match parts.as_deref() {
        Some([major]) => (*major, 0, 0),
        Some([major, minor]) => (*major, *minor, 0),
        Some([major, minor, patch]) => (*major, *minor, *patch),
        _ => {
            return compilation_error(location, format!("invalid version string `{version}'"));
        }
    };
    if requested > SUPPORTED_VERSION {
        return compilation_error(location, "expected newer version of sed");
    }
    Ok(CommandKind::Version(version))
}

/// Compile the delimited regex of an address whose opening `/` or `\`
/// is the last consumed character, with its `I` and `M` flags.
fn compile_address_regex(
    chars: &mut ScriptCharProvider,
    context: &ProcessingContext,
) -> UResult<Option<SedRegex>> {
    let mut delimiter = chars.last_char();
    if delimiter == '\\' {
        delimiter = chars.next_char();
        if matches!(delimiter, END | '\n' | '\\') {
            return compilation_error(&chars.location(), "unexpected end of address regex");
        }
    }

    let parsed = parse_regex(chars, delimiter, context)?;

    let mut ignore_case = false;
    let mut multi_line = false;
    loop {
        let flag = match chars.peek() {
            'I' => &mut ignore_case,
            'M' => &mut multi_line,
            _ => break,
        };
        let ch = chars.next_char();
        if std::mem::replace(flag, true) {
            return compilation_error(&chars.location(), format!("multiple `{ch}' flags"));
        }
    }

    match parsed {
        Some(parsed) => Ok(Some(parsed.finalize(multi_line, ignore_case)?)),
        None if ignore_case || multi_line => {
            compilation_error(&chars.location(), "cannot specify modifiers on empty regexp")
        }
        None => Ok(None),
    }
}

/// Compile the address starting at the last consumed character, if any.
fn compile_address(
    chars: &mut ScriptCharProvider,
    context: &ProcessingContext,
) -> UResult<Option<Address>> {
    let address = match chars.last_char() {
        '/' | '\\' => Address::Regex(compile_address_regex(chars, context)?),
        '0'..='9' => {
            let first = parse_number(chars)?;
            if chars.peek() == '~' {
                chars.next_char();
                let step = if chars.peek().is_ascii_digit() {
                    chars.next_char();
                    parse_number(chars)?
                } else {
                    0
                };
                match (first, step) {
                    (0, 0) => Address::Zero,
                    (_, 0) => Address::Line(first),
                    _ => Address::Step { first, step },
                }
            } else if first == 0 {
                Address::Zero
            } else {
                Address::Line(first)
            }
        }
        '$' => Address::Last,
        _ => return Ok(None),
    };
    Ok(Some(address))
}

fn zero_address_error<T>(chars: &ScriptCharProvider) -> UResult<T> {
    compilation_error(&chars.location(), "invalid usage of line address 0")
}

/// Compile a command's optional address or address range.
fn compile_address_range(
    chars: &mut ScriptCharProvider,
    context: &ProcessingContext,
) -> UResult<Option<AddressRange>> {
    let Some(start) = compile_address(chars, context)? else {
        return Ok(None);
    };

    let mut range = AddressRange {
        id: 0,
        start,
        end: None,
        exclude: false,
        negate: false,
    };

    if chars.peek() != ',' {
        if let Address::Zero = range.start {
            return zero_address_error(chars);
        }
        return Ok(Some(range));
    }
    chars.next_char();

    let mut ch = chars.next_non_space_in_line();
    if ch == '-' {
        range.exclude = true;
        ch = chars.next_char();
    }

    range.end = match ch {
        '/' | '\\' => Some(RangeEnd::Regex(compile_address_regex(chars, context)?)),
        '0'..='9' => match parse_number(chars)? {
            0 => return zero_address_error(chars),
            n => Some(RangeEnd::Line(n)),
        },
        '+' | '~' => {
            if !chars.next_char().is_ascii_digit() {
                return compilation_error(&chars.location(), format!("expected number after `{ch}'"));
            }
            match parse_number(chars)? {
                // A zero count or multiple selects just the first line.
                0 => None,
                n if ch == '+' => Some(RangeEnd::Count(n)),
                n => Some(RangeEnd::Multiple(n)),
            }
        }
        '$' => Some(RangeEnd::Last),
        _ => return compilation_error(&chars.location(), "unexpected `,'"),
    };

    if range.end.is_none() && range.exclude {
        return compilation_error(
            &chars.location(),
            "an excluded range end must not be +0 or ~0",
        );
    }

    match (&range.start, &range.end) {
        (Address::Zero, Some(RangeEnd::Regex(_))) => {}
        (Address::Zero, _) => return zero_address_error(chars),
        _ => {}
    }

    Ok(Some(range))
}
