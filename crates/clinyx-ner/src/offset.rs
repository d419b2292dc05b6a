//! Byte/character offset conversion.
//!
//! `regex` reports byte offsets; entity spans and context windows are measured
//! in characters. A converter is built once per document and shared by every lookup.

/// Converts between byte and character offsets for one text.
#[derive(Debug, Clone)]
pub struct SpanConverter {
    is_ascii: bool,
    /// Byte offset of every char boundary, plus `text.len()` at the end.
    char_to_byte: Vec<usize>,
    char_len: usize,
}

impl SpanConverter {
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                is_ascii: true,
                char_to_byte: Vec::new(),
                char_len: text.len(),
            };
        }

        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let char_len = char_to_byte.len();
        char_to_byte.push(text.len());

        Self {
            is_ascii: false,
            char_to_byte,
            char_len,
        }
    }

    /// Number of characters in the text.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Convert a byte offset on a char boundary to a char offset.
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx.min(self.char_len);
        }
        match self.char_to_byte.binary_search(&byte_idx) {
            Ok(idx) => idx,
            // Mid-char offsets snap to the char containing them
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Convert a char offset to a byte offset; clamps past the end.
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            return char_idx.min(self.char_len);
        }
        let idx = char_idx.min(self.char_len);
        self.char_to_byte[idx]
    }

    /// Slice `text` by a half-open char range.
    pub fn slice<'a>(&self, text: &'a str, char_start: usize, char_end: usize) -> &'a str {
        let start = self.char_to_byte(char_start);
        let end = self.char_to_byte(char_end.max(char_start));
        &text[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_identity() {
        let conv = SpanConverter::new("chest pain");
        assert_eq!(conv.char_len(), 10);
        assert_eq!(conv.byte_to_char(6), 6);
        assert_eq!(conv.char_to_byte(6), 6);
        assert_eq!(conv.char_to_byte(99), 10);
    }

    #[test]
    fn test_multibyte_roundtrip() {
        // "é" is 2 bytes, "°" is 2 bytes
        let text = "fiévre 38°C";
        let conv = SpanConverter::new(text);
        assert_eq!(conv.char_len(), 11);
        let byte = text.find("38").unwrap();
        let ch = conv.byte_to_char(byte);
        assert_eq!(ch, 7);
        assert_eq!(conv.char_to_byte(ch), byte);
        assert_eq!(conv.slice(text, 7, 11), "38°C");
    }

    #[test]
    fn test_slice_empty_and_clamped() {
        let text = "naïve";
        let conv = SpanConverter::new(text);
        assert_eq!(conv.slice(text, 3, 3), "");
        assert_eq!(conv.slice(text, 0, 100), "naïve");
    }
}
