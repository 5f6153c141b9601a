// Line selection through addresses and address ranges
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::command::{LastRegex, SedRegex};
use crate::error_handling::ScriptLocation;

use std::fmt;
use uucore::error::UResult;

#[derive(Debug, Clone)]
/// A single address
pub enum Address {
    Line(usize),                         // N
    Step { first: usize, step: usize },  // first~step
    Last,                                // $
    Zero,                                // 0, only before a regex end
    Regex(Option<SedRegex>),             // /re/, None for the empty regex
}

#[derive(Debug, Clone)]
/// The closing address of a range
pub enum RangeEnd {
    Line(usize),             // addr1,N
    Count(usize),            // addr1,+N
    Multiple(usize),         // addr1,~N
    Last,                    // addr1,$
    Regex(Option<SedRegex>), // addr1,/re/
}

#[derive(Debug, Clone)]
/// The address part of a command
pub struct AddressRange {
    /// Index of the range's run-time state.
    pub id: usize,
    pub start: Address,
    pub end: Option<RangeEnd>,
    /// True if the closing line is not part of the range (`addr1,-addr2`).
    pub exclude: bool,
    /// True if the selection is inverted (`!`).
    pub negate: bool,
}

/// Mutable state of an address range during a run.
#[derive(Debug, Clone, Default)]
pub struct RangeState {
    active: bool,
    first_line: bool,
    next_first_line: bool,
    last_line_no: usize,
}

impl RangeState {
    /// True on the first line of a contiguous selection.
    pub fn first_line(&self) -> bool {
        self.first_line
    }
}

/// What an address is matched against.
pub struct MatchContext<'a, 's> {
    pub line_number: usize,
    pub last_line: bool,
    pub pattern: &'a str,
    pub last_regex: &'a mut LastRegex<'s>,
    /// Where the command using the address was defined, for errors.
    pub location: &'a ScriptLocation,
    pub code: char,
}

impl<'s> MatchContext<'_, 's> {
    fn regex_matches(&mut self, regex: &'s Option<SedRegex>) -> UResult<bool> {
        let re = self
            .last_regex
            .resolve(regex.as_ref(), self.location, self.code)?;
        re.is_match(self.pattern)
    }
}

impl Address {
    fn matches<'s>(&'s self, ctx: &mut MatchContext<'_, 's>) -> UResult<bool> {
        Ok(match self {
            Address::Line(n) => ctx.line_number == *n,
            Address::Step { first, step } => {
                ctx.line_number >= *first && (ctx.line_number - first) % step == 0
            }
            Address::Last => ctx.last_line,
            Address::Zero => true,
            Address::Regex(re) => ctx.regex_matches(re)?,
        })
    }
}

impl AddressRange {
    /// Return the state a run starts with.
    pub fn initial_state(&self) -> RangeState {
        match (&self.start, &self.end) {
            (_, None) => RangeState {
                first_line: true,
                ..Default::default()
            },
            (Address::Zero, Some(_)) => RangeState {
                active: true,
                first_line: self.negate,
                next_first_line: true,
                last_line_no: 0,
            },
            _ => RangeState {
                first_line: self.negate,
                ..Default::default()
            },
        }
    }

    /// Return true if the command should run for the current line,
    /// updating the range's state.
    pub fn is_active<'s>(
        &'s self,
        state: &mut RangeState,
        ctx: &mut MatchContext<'_, 's>,
    ) -> UResult<bool> {
        // Negation flips the verdict, never the state transitions.
        let active_return = !self.negate;
        let inactive_return = self.negate;
        let exclude_return = self.exclude == self.negate;

        let Some(end) = &self.end else {
            return Ok(if self.start.matches(ctx)? {
                active_return
            } else {
                inactive_return
            });
        };

        if let Address::Zero = self.start {
            if !state.active {
                state.first_line = true;
                return Ok(inactive_return);
            }
            state.first_line = state.next_first_line;
            state.next_first_line = false;
            return self.close_on(end, state, ctx, active_return, exclude_return);
        }

        if state.active {
            state.first_line = self.negate;
            return self.close_on(end, state, ctx, active_return, exclude_return);
        }

        if !self.start.matches(ctx)? {
            return Ok(inactive_return);
        }
        state.first_line = true;
        state.active = true;
        state.last_line_no = match end {
            RangeEnd::Line(n) => *n,
            RangeEnd::Count(n) => ctx.line_number + n,
            // The next multiple strictly after the current line
            RangeEnd::Multiple(n) => ctx.line_number + n - ctx.line_number % n,
            RangeEnd::Last | RangeEnd::Regex(_) => 0,
        };
        Ok(active_return)
    }

    /// Evaluate an active range's closing condition.
    fn close_on<'s>(
        &'s self,
        end: &'s RangeEnd,
        state: &mut RangeState,
        ctx: &mut MatchContext<'_, 's>,
        active_return: bool,
        exclude_return: bool,
    ) -> UResult<bool> {
        match end {
            RangeEnd::Line(_) | RangeEnd::Count(_) | RangeEnd::Multiple(_) => {
                if state.last_line_no < ctx.line_number {
                    state.active = false;
                    Ok(!active_return)
                } else if state.last_line_no == ctx.line_number {
                    state.active = false;
                    Ok(exclude_return)
                } else {
                    Ok(active_return)
                }
            }
            RangeEnd::Last => {
                if ctx.last_line {
                    state.active = false;
                    Ok(exclude_return)
                } else {
                    Ok(active_return)
                }
            }
            RangeEnd::Regex(re) => {
                if ctx.regex_matches(re)? {
                    state.active = false;
                    Ok(exclude_return)
                } else {
                    Ok(active_return)
                }
            }
        }
    }
}

fn fmt_regex(f: &mut fmt::Formatter<'_>, re: &Option<SedRegex>) -> fmt::Result {
    match re {
        None => f.write_str("//"),
        Some(re) => {
            write!(f, "{re}")?;
            if re.ignore_case {
                f.write_str("I")?;
            }
            if re.multi_line {
                f.write_str("M")?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Line(n) => write!(f, "{n}"),
            Address::Step { first, step } => write!(f, "{first}~{step}"),
            Address::Last => f.write_str("$"),
            Address::Zero => f.write_str("0"),
            Address::Regex(re) => fmt_regex(f, re),
        }
    }
}

impl fmt::Display for RangeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeEnd::Line(n) => write!(f, "{n}"),
            RangeEnd::Count(n) => write!(f, "+{n}"),
            RangeEnd::Multiple(n) => write!(f, "~{n}"),
            RangeEnd::Last => f.write_str("$"),
            RangeEnd::Regex(re) => fmt_regex(f, re),
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if let Some(end) = &self.end {
            f.write_str(",")?;
            if self.exclude {
                f.write_str("-")?;
            }
            write!(f, "{end}")?;
        }
        if self.negate {
            f.write_str("!")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fast_regex::Regex;

    fn regex(pattern: &str) -> SedRegex {
        SedRegex {
            delimiter: '/',
            source: pattern.to_string(),
            host: format!("(?s){pattern}"),
            multi_line: false,
            ignore_case: false,
            regex: Regex::new(&format!("(?s){pattern}")).unwrap(),
        }
    }

    fn range(start: Address, end: Option<RangeEnd>, exclude: bool, negate: bool) -> AddressRange {
        AddressRange {
            id: 0,
            start,
            end,
            exclude,
            negate,
        }
    }

    /// Run the range over the given lines; return the selected line
    /// numbers and the first-line flags of the selected lines.
    fn select(range: &AddressRange, lines: &[&str]) -> (Vec<usize>, Vec<bool>) {
        let location = ScriptLocation::default();
        let mut last_regex = LastRegex::default();
        let mut state = range.initial_state();
        let mut selected = Vec::new();
        let mut first = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let mut ctx = MatchContext {
                line_number: i + 1,
                last_line: i + 1 == lines.len(),
                pattern: line,
                last_regex: &mut last_regex,
                location: &location,
                code: 'p',
            };
            if range.is_active(&mut state, &mut ctx).unwrap() {
                selected.push(i + 1);
                first.push(state.first_line());
            }
        }
        (selected, first)
    }

    const FIVE: [&str; 5] = ["1", "2", "3", "4", "5"];

    #[test]
    fn test_single_line() {
        let r = range(Address::Line(2), None, false, false);
        assert_eq!(select(&r, &FIVE).0, vec![2]);
    }

    #[test]
    fn test_single_line_negated() {
        let r = range(Address::Line(2), None, false, true);
        assert_eq!(select(&r, &FIVE).0, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_step() {
        let r = range(Address::Step { first: 1, step: 2 }, None, false, false);
        assert_eq!(select(&r, &FIVE).0, vec![1, 3, 5]);
        let r = range(Address::Step { first: 0, step: 2 }, None, false, false);
        assert_eq!(select(&r, &FIVE).0, vec![2, 4]);
    }

    #[test]
    fn test_last() {
        let r = range(Address::Last, None, false, false);
        assert_eq!(select(&r, &FIVE).0, vec![5]);
    }

    #[test]
    fn test_line_range() {
        let r = range(Address::Line(2), Some(RangeEnd::Line(4)), false, false);
        let (selected, first) = select(&r, &FIVE);
        assert_eq!(selected, vec![2, 3, 4]);
        assert_eq!(first, vec![true, false, false]);
    }

    #[test]
    fn test_line_range_backwards() {
        let r = range(Address::Line(4), Some(RangeEnd::Line(2)), false, false);
        assert_eq!(select(&r, &FIVE).0, vec![4]);
    }

    #[test]
    fn test_line_range_exclude() {
        let r = range(Address::Line(2), Some(RangeEnd::Line(4)), true, false);
        assert_eq!(select(&r, &FIVE).0, vec![2, 3]);
    }

    #[test]
    fn test_line_range_negated() {
        let r = range(Address::Line(2), Some(RangeEnd::Line(4)), false, true);
        let (selected, first) = select(&r, &FIVE);
        assert_eq!(selected, vec![1, 5]);
        assert_eq!(first, vec![true, true]);
    }

    #[test]
    fn test_count_range() {
        let r = range(Address::Line(2), Some(RangeEnd::Count(2)), false, false);
        assert_eq!(select(&r, &FIVE).0, vec![2, 3, 4]);
    }

    #[test]
    fn test_multiple_range() {
        let r = range(Address::Line(2), Some(RangeEnd::Multiple(4)), false, false);
        assert_eq!(select(&r, &FIVE).0, vec![2, 3, 4]);
    }

    #[test]
    fn test_multiple_range_from_a_multiple() {
        let ten: Vec<String> = (1..=10).map(|n| n.to_string()).collect();
        let ten: Vec<&str> = ten.iter().map(String::as_str).collect();
        let r = range(Address::Line(4), Some(RangeEnd::Multiple(4)), false, false);
        assert_eq!(select(&r, &ten).0, vec![4, 5, 6, 7, 8]);
        let r = range(Address::Line(4), Some(RangeEnd::Multiple(4)), true, false);
        assert_eq!(select(&r, &ten).0, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_multiple_range_exclude() {
        let r = range(Address::Line(2), Some(RangeEnd::Multiple(4)), true, false);
        assert_eq!(select(&r, &FIVE).0, vec![2, 3]);
    }

    #[test]
    fn test_last_range() {
        let r = range(Address::Line(3), Some(RangeEnd::Last), false, false);
        assert_eq!(select(&r, &FIVE).0, vec![3, 4, 5]);
        let r = range(Address::Line(3), Some(RangeEnd::Last), true, false);
        assert_eq!(select(&r, &FIVE).0, vec![3, 4]);
    }

    #[test]
    fn test_regex_range() {
        let lines = ["a", "start", "b", "end", "c", "start", "d"];
        let r = range(
            Address::Regex(Some(regex("start"))),
            Some(RangeEnd::Regex(Some(regex("end")))),
            false,
            false,
        );
        assert_eq!(select(&r, &lines).0, vec![2, 3, 4, 6, 7]);
    }

    #[test]
    fn test_regex_range_end_not_checked_on_start_line() {
        let lines = ["x", "x", "x"];
        let r = range(
            Address::Regex(Some(regex("x"))),
            Some(RangeEnd::Regex(Some(regex("x")))),
            false,
            false,
        );
        assert_eq!(select(&r, &lines).0, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_to_regex() {
        let lines = ["x", "y", "x"];
        let r = range(
            Address::Zero,
            Some(RangeEnd::Regex(Some(regex("x")))),
            false,
            false,
        );
        let (selected, first) = select(&r, &lines);
        assert_eq!(selected, vec![1]);
        assert_eq!(first, vec![true]);

        let r = range(
            Address::Line(1),
            Some(RangeEnd::Regex(Some(regex("x")))),
            false,
            false,
        );
        assert_eq!(select(&r, &lines).0, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_regex_without_previous_fails() {
        let r = range(Address::Regex(None), None, false, false);
        let location = ScriptLocation::default();
        let mut last_regex = LastRegex::default();
        let mut state = r.initial_state();
        let mut ctx = MatchContext {
            line_number: 1,
            last_line: true,
            pattern: "abc",
            last_regex: &mut last_regex,
            location: &location,
            code: 'p',
        };
        let err = r.is_active(&mut state, &mut ctx).unwrap_err();
        assert!(err.to_string().contains("no previous regular expression"));
    }

    #[test]
    fn test_display() {
        let r = range(Address::Line(2), Some(RangeEnd::Count(3)), true, true);
        assert_eq!(r.to_string(), "2,-+3!");
        let r = range(Address::Step { first: 1, step: 2 }, None, false, false);
        assert_eq!(r.to_string(), "1~2");
        let r = range(
            Address::Zero,
            Some(RangeEnd::Regex(Some(regex("a/b")))),
            false,
            false,
        );
        assert_eq!(r.to_string(), "0,/a/b/");
    }
}
