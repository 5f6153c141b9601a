// A unified interface to the regex and fancy-regex engines
//
// This allows using the regex crate when possible, resorting to the
// slower fancy_regex crate for back-references and look-around.
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use fancy_regex::{CaptureMatches as FancyCaptureMatches, Regex as FancyRegex};
use regex::{CaptureMatches as FastCaptureMatches, Regex as FastRegex};
use uucore::error::{UResult, USimpleError};

use crate::error_handling::ERROR_EXIT_CODE;

#[derive(Clone, Debug)]
/// A regular expression implemented through regex or fancy-regex
pub enum Regex {
    Fast(FastRegex),
    Fancy(FancyRegex),
}

impl Regex {
    /// Construct the most efficient engine possible.
    /// The regex crate rejects back-references and look-around, which
    /// are then handled by fancy_regex.
    pub fn new(pattern: &str) -> Result<Self, String> {
        match FastRegex::new(pattern) {
            Ok(re) => Ok(Self::Fast(re)),
            Err(fast_err) => match FancyRegex::new(pattern) {
                Ok(re) => Ok(Self::Fancy(re)),
                Err(fancy_err) => Err(match fast_err {
                    regex::Error::Syntax(_) => fancy_err.to_string(),
                    other => other.to_string(),
                }),
            },
        }
    }

    /// Return true if this is a regex-crate regex.
    pub fn is_fast(&self) -> bool {
        matches!(self, Regex::Fast(_))
    }

    /// Check if the regex matches somewhere in text.
    pub fn is_match(&self, text: &str) -> UResult<bool> {
        match self {
            Regex::Fast(re) => Ok(re.is_match(text)),
            Regex::Fancy(re) => re.is_match(text).map_err(match_error),
        }
    }

    /// Return an iterator over successive non-overlapping matches.
    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> CaptureMatches<'r, 't> {
        match self {
            Regex::Fast(re) => CaptureMatches::Fast(re.captures_iter(text)),
            Regex::Fancy(re) => CaptureMatches::Fancy(re.captures_iter(text)),
        }
    }

    /// Return the number of capture groups, including group 0.
    pub fn captures_len(&self) -> usize {
        match self {
            Regex::Fast(re) => re.captures_len(),
            Regex::Fancy(re) => re.captures_len(),
        }
    }
}

fn match_error(e: fancy_regex::Error) -> Box<dyn uucore::error::UError> {
    USimpleError::new(ERROR_EXIT_CODE, format!("error matching regex: {e}"))
}

/// Unified enum for holding either engine's capture iterator.
pub enum CaptureMatches<'r, 't> {
    Fast(FastCaptureMatches<'r, 't>),
    Fancy(FancyCaptureMatches<'r, 't>),
}

impl<'t> Iterator for CaptureMatches<'_, 't> {
    type Item = UResult<Captures<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            CaptureMatches::Fast(iter) => iter.next().map(|caps| {
                let groups = (0..caps.len())
                    .map(|i| caps.get(i).map(|m| (m.start(), m.end())))
                    .collect();
                Ok(Captures {
                    text: caps.get(0).map_or("", |m| m.as_str()),
                    haystack_offset: caps.get(0).map_or(0, |m| m.start()),
                    groups,
                })
            }),
            CaptureMatches::Fancy(iter) => iter.next().map(|result| {
                let caps = result.map_err(match_error)?;
                let groups = (0..caps.len())
                    .map(|i| caps.get(i).map(|m| (m.start(), m.end())))
                    .collect();
                Ok(Captures {
                    text: caps.get(0).map_or("", |m| m.as_str()),
                    haystack_offset: caps.get(0).map_or(0, |m| m.start()),
                    groups,
                })
            }),
        }
    }
}

/// The groups of one match, as positions in the searched text.
#[derive(Debug, Clone)]
pub struct Captures<'t> {
    text: &'t str,
    haystack_offset: usize,
    groups: Vec<Option<(usize, usize)>>,
}

impl<'t> Captures<'t> {
    /// Start of the whole match.
    pub fn start(&self) -> usize {
        self.haystack_offset
    }

    /// End of the whole match.
    pub fn end(&self) -> usize {
        self.haystack_offset + self.text.len()
    }

    /// Span of group i, or None if it did not participate.
    pub fn span(&self, i: usize) -> Option<(usize, usize)> {
        self.groups.get(i).copied().flatten()
    }

    /// Return the number of capture groups (including group 0).
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Return true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
