//! Ordered search & replace over whole texts
//!
//! Each rule sees the output of the previous one and replaces every match
//! once (no iteration until a fixpoint).

use regex::Regex;
use std::borrow::Cow;

/// One search & replace rule
pub trait Rewrite: Send + Sync {
    fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str>;
}

/// Regex substitution, replacement may reference groups as `${1}`
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    pub fn new(pattern: Regex, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
        }
    }

    /// Compiles `pattern`, mainly for rule tables built at startup
    pub fn compile(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::new(Regex::new(pattern)?, replacement))
    }
}

impl Rewrite for Substitution {
    fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

/// Applies `rules` in order to `text`
pub fn transform(text: &str, rules: &[Box<dyn Rewrite>]) -> String {
    let mut value = text.to_string();
    for rule in rules {
        if let Cow::Owned(rewritten) = rule.rewrite(&value) {
            value = rewritten;
        }
    }
    value
}

/// Collapses `for X and Y for the world outside X` into `/ Y`
///
/// Region-specific grants keep only the worldwide holder, marked as a
/// co-owner alternative. `X` must repeat verbatim, which needs a
/// backreference the regex engine does not offer, hence the manual scan.
/// Candidates are tried shortest `X` first, then shortest `Y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerritoryRewrite;

const FOR: &str = "for ";
const AND: &str = " and ";
const OUTSIDE: &str = " for the world outside ";

impl TerritoryRewrite {
    /// Match starting at `start` (which begins with `for `): end offset and `Y`
    fn match_at<'t>(text: &'t str, start: usize) -> Option<(usize, &'t str)> {
        let x_start = start + FOR.len();
        // None of the parts may cross a line terminator
        let line_end = text[x_start..]
            .find(is_line_terminator)
            .map_or(text.len(), |i| x_start + i);
        let line = &text[..line_end];

        for x_end in occurrences(line, AND, x_start) {
            if x_end == x_start {
                continue;
            }
            let x = &line[x_start..x_end];
            let y_start = x_end + AND.len();

            for y_end in occurrences(line, OUTSIDE, y_start) {
                if y_end == y_start {
                    continue;
                }
                let tail = y_end + OUTSIDE.len();
                if line[tail..].starts_with(x) {
                    return Some((tail + x.len(), &line[y_start..y_end]));
                }
            }
        }
        None
    }
}

impl Rewrite for TerritoryRewrite {
    fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut output = String::new();
        let mut copied = 0;
        let mut pos = 0;

        while let Some(found) = text[pos..].find(FOR) {
            let start = pos + found;
            match Self::match_at(text, start) {
                Some((end, worldwide)) => {
                    output.push_str(&text[copied..start]);
                    output.push_str("/ ");
                    output.push_str(worldwide);
                    copied = end;
                    pos = end;
                }
                None => pos = start + 1, // "f" is one byte
            }
        }

        if copied == 0 {
            Cow::Borrowed(text)
        } else {
            output.push_str(&text[copied..]);
            Cow::Owned(output)
        }
    }
}

/// Line terminators as understood by `.` in the notice patterns
pub(crate) fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Start offsets of `needle` in `haystack` at or after `from`, overlaps included
fn occurrences<'a>(haystack: &'a str, needle: &'a str, from: usize) -> impl Iterator<Item = usize> + 'a {
    let mut next = from;
    std::iter::from_fn(move || {
        let found = next + haystack.get(next..)?.find(needle)?;
        // needles start with an ASCII space, so +1 stays on a char boundary
        next = found + 1;
        Some(found)
    })
}
