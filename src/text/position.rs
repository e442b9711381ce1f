use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Index space used by the host text view for selections.
///
/// Syntax trees are addressed in UTF-8 bytes; text views usually are not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexEncoding {
    /// UTF-8 bytes (same space as the tree)
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-16 code units (AppKit/UIKit text views, LSP)
    #[default]
    #[serde(rename = "utf-16")]
    Utf16,
    /// Unicode scalar values
    #[serde(rename = "utf-32")]
    Utf32,
}

impl IndexEncoding {
    /// Units `ch` occupies in this encoding
    #[inline(always)]
    pub fn unit_len(self, ch: char) -> usize {
        match self {
            IndexEncoding::Utf8 => ch.len_utf8(),
            IndexEncoding::Utf16 => ch.len_utf16(),
            IndexEncoding::Utf32 => 1,
        }
    }
}

/// Converts between byte offsets and the host's native text indices.
#[derive(Debug, Clone, Copy)]
pub struct TextMapper<'a> {
    text: &'a str,
    encoding: IndexEncoding,
}

impl<'a> TextMapper<'a> {
    pub fn new(text: &'a str, encoding: IndexEncoding) -> Self {
        Self { text, encoding }
    }

    pub fn encoding(&self) -> IndexEncoding {
        self.encoding
    }

    /// Length of the text in native units
    pub fn native_len(&self) -> usize {
        match self.encoding {
            IndexEncoding::Utf8 => self.text.len(),
            IndexEncoding::Utf16 => self.text.encode_utf16().count(),
            IndexEncoding::Utf32 => self.text.chars().count(),
        }
    }

    /// Convert a native index to a byte offset
    ///
    /// # Returns
    /// `None` if the index falls inside a character or beyond the end
    pub fn to_byte(&self, native: usize) -> Option<usize> {
        if self.encoding == IndexEncoding::Utf8 {
            return self.text.is_char_boundary(native).then_some(native);
        }

        let mut byte_offset = 0;
        let mut native_offset = 0;

        for ch in self.text.chars() {
            if native_offset == native {
                return Some(byte_offset);
            }
            if native_offset > native {
                // Inside a surrogate pair
                return None;
            }
            native_offset += self.encoding.unit_len(ch);
            byte_offset += ch.len_utf8();
        }

        (native_offset == native).then_some(byte_offset)
    }

    /// Convert a byte offset to a native index
    ///
    /// # Returns
    /// `None` if the offset is in the middle of a multi-byte character or
    /// beyond the end
    pub fn to_native(&self, byte: usize) -> Option<usize> {
        if !self.text.is_char_boundary(byte) {
            return None;
        }
        if self.encoding == IndexEncoding::Utf8 {
            return Some(byte);
        }

        Some(
            self.text[..byte]
                .chars()
                .map(|ch| self.encoding.unit_len(ch))
                .sum(),
        )
    }

    pub fn range_to_bytes(&self, range: Range<usize>) -> Option<Range<usize>> {
        Some(self.to_byte(range.start)?..self.to_byte(range.end)?)
    }

    pub fn range_to_native(&self, range: Range<usize>) -> Option<Range<usize>> {
        Some(self.to_native(range.start)?..self.to_native(range.end)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IndexEncoding::Utf8, 0, Some(0))]
    #[case(IndexEncoding::Utf8, 4, Some(4))]
    #[case(IndexEncoding::Utf8, 5, None)] // inside "é"
    #[case(IndexEncoding::Utf16, 5, Some(6))]
    #[case(IndexEncoding::Utf32, 5, Some(6))]
    #[case(IndexEncoding::Utf16, 9, Some(10))] // end of text
    #[case(IndexEncoding::Utf16, 10, None)] // beyond end
    fn test_to_byte(
        #[case] encoding: IndexEncoding,
        #[case] native: usize,
        #[case] expected: Option<usize>,
    ) {
        // "let é" : "é" is 2 bytes, 1 UTF-16 unit
        let mapper = TextMapper::new("let é = 1", encoding);
        assert_eq!(mapper.to_byte(native), expected);
    }

    #[test]
    fn test_surrogate_pairs_in_utf16() {
        // "😀" is 4 bytes, 2 UTF-16 units, 1 scalar
        let text = "a😀b";
        let utf16 = TextMapper::new(text, IndexEncoding::Utf16);
        let utf32 = TextMapper::new(text, IndexEncoding::Utf32);

        assert_eq!(utf16.to_byte(1), Some(1));
        assert_eq!(utf16.to_byte(2), None, "middle of surrogate pair");
        assert_eq!(utf16.to_byte(3), Some(5));
        assert_eq!(utf32.to_byte(2), Some(5));

        assert_eq!(utf16.to_native(5), Some(3));
        assert_eq!(utf32.to_native(5), Some(2));
        assert_eq!(utf16.to_native(3), None, "middle of a multi-byte char");
    }

    #[test]
    fn test_native_len() {
        let text = "a😀é";
        assert_eq!(TextMapper::new(text, IndexEncoding::Utf8).native_len(), 7);
        assert_eq!(TextMapper::new(text, IndexEncoding::Utf16).native_len(), 4);
        assert_eq!(TextMapper::new(text, IndexEncoding::Utf32).native_len(), 3);
    }

    #[test]
    fn test_range_round_trip() {
        let text = "fn é() {}";
        let mapper = TextMapper::new(text, IndexEncoding::Utf16);

        let bytes = 3..5;
        let native = mapper.range_to_native(bytes.clone()).unwrap();
        assert_eq!(native, 3..4);
        assert_eq!(mapper.range_to_bytes(native), Some(bytes));
    }

    #[test]
    fn test_end_of_text_is_addressable() {
        let text = "héllo";
        let mapper = TextMapper::new(text, IndexEncoding::Utf16);
        assert_eq!(mapper.to_byte(5), Some(6));
        assert_eq!(mapper.to_native(6), Some(5));
    }
}
