//! Owner name boundaries
//!
//! Both notice passes share one rule for where an owner name ends:
//! the shortest run of characters on the current line, optionally extended
//! by a legal suffix (`LLC`, `LLP`, `Inc`, `Ltd`, the latter two with an
//! optional trailing period, all optionally preceded by a comma), that is
//! followed by a boundary:
//!
//! - the name ends with a period,
//! - end of line or text,
//! - the next character is a comma or a period,
//! - the next word is ` under `.

use crate::transform::is_line_terminator;

const UNDER: &str = " under ";

/// Name boundary matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBoundary {
    case_insensitive: bool,
}

impl NameBoundary {
    /// Suffixes and `under` must match case exactly
    pub const STRICT: NameBoundary = NameBoundary {
        case_insensitive: false,
    };

    /// Suffixes and `under` match in any case
    pub const IGNORE_CASE: NameBoundary = NameBoundary {
        case_insensitive: true,
    };

    /// Byte length of the owner name at the start of `text`
    ///
    /// Returns 0 only if `text` is empty or starts with a line terminator.
    pub fn name_len(&self, text: &str) -> usize {
        let mut chars = text.char_indices();
        match chars.next() {
            Some((_, c)) if !is_line_terminator(c) => {}
            _ => return 0,
        }

        // Candidate ends after each further character, shortest first
        let ends = text
            .char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()));

        for end in ends {
            for suffix_len in self.suffix_lengths(&text[end..]) {
                if self.is_boundary(text, end + suffix_len) {
                    return end + suffix_len;
                }
            }
            if self.is_boundary(text, end) {
                return end;
            }
        }
        text.len()
    }

    /// Legal suffix lengths that can start at `rest`, in preference order
    pub fn suffix_lengths(&self, rest: &str) -> Vec<usize> {
        let mut lengths = Vec::new();
        let comma_options: &[usize] = if rest.starts_with(',') { &[1, 0] } else { &[0] };

        for &comma in comma_options {
            let after_comma = &rest[comma..];
            if !after_comma.starts_with(' ') {
                continue;
            }
            let word_start = comma + 1;
            let word = &rest[word_start..];

            if self.starts_with(word, "LLC") || self.starts_with(word, "LLP") {
                lengths.push(word_start + 3);
            } else if self.starts_with(word, "Inc") || self.starts_with(word, "Ltd") {
                if word[3..].starts_with('.') {
                    lengths.push(word_start + 4);
                }
                lengths.push(word_start + 3);
            }
        }
        lengths
    }

    /// Whether a name may end at byte offset `end` of `text`
    pub fn is_boundary(&self, text: &str, end: usize) -> bool {
        if text[..end].ends_with('.') {
            return true;
        }
        let rest = &text[end..];
        match rest.chars().next() {
            None => true,
            Some(c) if is_line_terminator(c) => true,
            Some(',') | Some('.') => true,
            Some(_) => self.starts_with(rest, UNDER),
        }
    }

    fn starts_with(&self, text: &str, prefix: &str) -> bool {
        match text.get(..prefix.len()) {
            Some(head) if self.case_insensitive => head.eq_ignore_ascii_case(prefix),
            Some(head) => head == prefix,
            None => false,
        }
    }
}

/// Splits a name span into co-owners at slashes
///
/// A slash separates owners when followed by whitespace or by a word of two
/// or more characters. A single capital letter followed by a capitalized
/// word (`A/B Records`) also splits, unless it completes a known
/// abbreviation (`A/S`, `c/o`, `w/o`). Fragments are trimmed and empty
/// fragments dropped.
pub fn split_co_owners(name: &str) -> Vec<&str> {
    let mut owners = Vec::new();
    let mut fragment_start = 0;

    for (i, c) in name.char_indices() {
        if c == '/' && splits_at(name, i) {
            owners.push(&name[fragment_start..i]);
            fragment_start = i + 1;
        }
    }
    owners.push(&name[fragment_start..]);

    owners
        .into_iter()
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .collect()
}

/// Slash-joined abbreviations that never separate owners
const SLASH_ABBREVIATIONS: &[&str] = &["a/s", "c/o", "w/o"];

fn splits_at(name: &str, slash: usize) -> bool {
    let mut chars = name[slash + 1..].chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), _, _) if c.is_whitespace() => true,
        (Some(first), Some(second), _) if is_word_char(first) && is_word_char(second) => true,
        (Some(letter), Some(gap), Some(next)) => {
            letter.is_uppercase()
                && gap.is_whitespace()
                && next.is_uppercase()
                && !is_abbreviation(&name[..slash], letter)
        }
        _ => false,
    }
}

fn is_abbreviation(before: &str, letter: char) -> bool {
    let word = before.rsplit(char::is_whitespace).next().unwrap_or_default();
    let joined = format!("{}/{}", word, letter).to_lowercase();
    SLASH_ABBREVIATIONS.contains(&joined.as_str())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
