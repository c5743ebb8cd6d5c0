//! Natural ordering of names.
//!
//! Names are split into alternating runs of ASCII digits and other
//! characters. Digit runs compare by numeric magnitude, so `file2` sorts
//! before `file10`. Text runs compare with a case-folded alphabetic key in
//! which Cyrillic `ё` sits right after `е` instead of at its codepoint.
//!
//! Every run carries its raw text as a tiebreaker, so two names compare
//! equal only when they are identical. That keeps the order total and
//! usable with `sort_by`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How text runs are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Collation {
    /// Case-folded alphabetic order, Cyrillic letters by alphabet position.
    #[default]
    Alphabetic,
    /// Raw codepoint order.
    Codepoint,
}

/// Compare two names with the default [`Collation::Alphabetic`] rules.
pub fn compare(a: &str, b: &str) -> Ordering {
    compare_with(a, b, Collation::Alphabetic)
}

/// Compare two names with the given collation.
pub fn compare_with(a: &str, b: &str, collation: Collation) -> Ordering {
    let mut left = Runs::new(a);
    let mut right = Runs::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_runs(x, y, collation);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Run<'a> {
    Digits(&'a str),
    Text(&'a str),
}

/// Iterator over the digit and non-digit runs of a string.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Runs<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits { Run::Digits(run) } else { Run::Text(run) })
    }
}

fn compare_runs(a: Run<'_>, b: Run<'_>, collation: Collation) -> Ordering {
    match (a, b) {
        (Run::Digits(x), Run::Digits(y)) => compare_digits(x, y),
        (Run::Text(x), Run::Text(y)) => compare_text(x, y, collation),
        // Numbers sort ahead of words.
        (Run::Digits(_), Run::Text(_)) => Ordering::Less,
        (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let x = a.trim_start_matches('0');
    let y = b.trim_start_matches('0');

    x.len()
        .cmp(&y.len())
        .then_with(|| x.cmp(y))
        .then_with(|| a.cmp(b))
}

fn compare_text(a: &str, b: &str, collation: Collation) -> Ordering {
    match collation {
        Collation::Codepoint => a.cmp(b),
        Collation::Alphabetic => a
            .chars()
            .map(alphabetic_weight)
            .cmp(b.chars().map(alphabetic_weight))
            .then_with(|| a.cmp(b)),
    }
}

/// Primary sort weight of a character.
///
/// Weights are doubled codepoints of the lowercase form, leaving odd slots
/// free for letters that sit between two codepoints in their alphabet.
fn alphabetic_weight(c: char) -> u64 {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'ё' => u64::from('е') * 2 + 1,
        other => u64::from(other) * 2,
    }
}
