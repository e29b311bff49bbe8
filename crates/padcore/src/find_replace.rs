//! Literal, case-sensitive substring search and substitution.
//!
//! All offsets are byte offsets into the haystack and always fall on
//! `char` boundaries. An empty needle never matches anything.

/// A located occurrence of the needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub len: usize,
}

impl MatchSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Find the first occurrence of `needle` at or after `from`.
///
/// When nothing matches after `from` the search wraps and restarts from the
/// beginning of the document. `None` means a full pass found nothing.
pub fn find_next(haystack: &str, needle: &str, from: usize) -> Option<MatchSpan> {
    if needle.is_empty() {
        return None;
    }

    let from = next_char_boundary(haystack, from);
    let span = |start: usize| MatchSpan {
        start,
        len: needle.len(),
    };

    if let Some(pos) = haystack[from..].find(needle) {
        return Some(span(from + pos));
    }

    // Wrap around to the top of the document
    haystack.find(needle).map(span)
}

/// Replace the first occurrence of `needle` in the whole document.
///
/// This is the first match of the document, not the match at the caret.
pub fn replace_one(haystack: &str, needle: &str, replacement: &str) -> (String, usize) {
    if needle.is_empty() || !haystack.contains(needle) {
        return (haystack.to_string(), 0);
    }
    (haystack.replacen(needle, replacement, 1), 1)
}

/// Replace every non-overlapping occurrence of `needle`, left to right.
pub fn replace_all(haystack: &str, needle: &str, replacement: &str) -> (String, usize) {
    let count = count_matches(haystack, needle);
    if count == 0 {
        return (haystack.to_string(), 0);
    }
    (haystack.replace(needle, replacement), count)
}

/// Number of non-overlapping occurrences of `needle`.
pub fn count_matches(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn next_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}
