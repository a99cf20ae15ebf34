//! Character offset handling for annotation spans.
//!
//! Annotation spans are **character-based**, half-open `[begin, end)` ranges
//! into the original input string. Rust string search returns byte offsets,
//! so every span that leaves this crate goes through a byte→char conversion
//! here. For pure-ASCII text the two coordinate systems coincide and the
//! conversion is skipped.

/// Check whether a text is pure ASCII (byte offsets == char offsets).
#[inline]
#[must_use]
pub fn is_ascii(text: &str) -> bool {
    text.is_ascii()
}

/// Convert a byte offset into a character offset.
///
/// `byte_offset` must lie on a character boundary of `text`; offsets past the
/// end clamp to the character length.
#[must_use]
pub fn byte_to_char(text: &str, byte_offset: usize) -> usize {
    if is_ascii(text) {
        return byte_offset.min(text.len());
    }
    text[..byte_offset.min(text.len())].chars().count()
}

/// Convert a character offset into a byte offset.
///
/// Offsets past the end clamp to the byte length.
#[must_use]
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    if is_ascii(text) {
        return char_offset.min(text.len());
    }
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(i, _)| i)
}

/// Locate the **first** occurrence of `needle` in `text` as a character span.
///
/// Returns `(begin, end)` with `end = begin + needle.chars().count()`, or
/// `None` if `needle` does not occur in `text`. Always the first occurrence:
/// repeated calls with the same inputs are deterministic.
#[must_use]
pub fn first_char_span(text: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let byte_begin = text.find(needle)?;
    let begin = byte_to_char(text, byte_begin);
    Some((begin, begin + needle.chars().count()))
}

/// Extract the substring at a character span.
///
/// Returns `None` if the span exceeds the text.
#[must_use]
pub fn char_slice(text: &str, begin: usize, end: usize) -> Option<&str> {
    if begin > end {
        return None;
    }
    let b = char_to_byte(text, begin);
    let e = char_to_byte(text, end);
    if end > text.chars().count() {
        return None;
    }
    text.get(b..e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_spans_match_byte_offsets() {
        let text = "fishery : an emerging market?";
        assert_eq!(first_char_span(text, "fishery"), Some((0, 7)));
        assert_eq!(first_char_span(text, "market"), Some((21, 27)));
        assert_eq!(char_slice(text, 21, 27), Some("market"));
    }

    #[test]
    fn multibyte_spans_count_chars_not_bytes() {
        // "Außenhandel" after a two-byte char in the prefix
        let text = "Zölle und Außenhandel";
        let (begin, end) = first_char_span(text, "Außenhandel").unwrap();
        assert_eq!(begin, 10);
        assert_eq!(end, 21);
        assert_eq!(char_slice(text, begin, end), Some("Außenhandel"));
    }

    #[test]
    fn first_occurrence_wins() {
        let text = "tax and tax reform";
        assert_eq!(first_char_span(text, "tax"), Some((0, 3)));
    }

    #[test]
    fn missing_needle_is_none() {
        assert_eq!(first_char_span("some title", "absent"), None);
        assert_eq!(first_char_span("some title", ""), None);
    }

    #[test]
    fn char_slice_rejects_out_of_range() {
        assert_eq!(char_slice("abc", 1, 9), None);
        assert_eq!(char_slice("abc", 2, 1), None);
    }
}
