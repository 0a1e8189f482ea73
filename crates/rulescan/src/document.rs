//! Read-only text buffers addressed by absolute character offset.
//!
//! The scanner never sees bytes: every offset in this crate counts Unicode
//! scalar values, and lines are split on `\n` (a trailing `\r` belongs to the
//! line break, not the line text).

use alloc::{borrow::Cow, vec::Vec};

use bstr::ByteSlice;

/// A zero-based line/column pair. `column` counts characters.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based character column within the line.
    pub column: usize,
}

impl Position {
    /// Creates a position from a line and a column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One line of a [`TextSource`], without its line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine<'a> {
    /// Line number.
    pub line: usize,
    /// Absolute offset of the first character of the line.
    pub start: usize,
    /// The line text, excluding `\r\n` / `\n`.
    pub text: Cow<'a, str>,
    /// Column of the first non-whitespace character, or the line length when
    /// the line is blank.
    pub first_non_whitespace: usize,
}

impl TextLine<'_> {
    /// Column of the first occurrence of `needle` in this line.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<usize> {
        let byte = self.text.find(needle)?;
        Some(self.text[..byte].chars().count())
    }
}

/// The host document abstraction the scanner consumes.
///
/// Implementations must be immutable for the duration of a scan. Offsets past
/// the end are clamped rather than rejected.
pub trait TextSource {
    /// Number of characters in the document.
    fn len(&self) -> usize;

    /// Whether the document has no characters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Character at `offset`, or `None` past the end.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Text of the half-open character range `[start, end)`, clamped to the
    /// document.
    fn slice(&self, start: usize, end: usize) -> Cow<'_, str>;

    /// Entire document text.
    fn text(&self) -> Cow<'_, str> {
        self.slice(0, self.len())
    }

    /// Number of lines. An empty document has one (empty) line.
    fn line_count(&self) -> usize;

    /// Absolute offset of `position`. Lines past the end map to the document
    /// length; columns past the end of the line map to the end of the line.
    fn offset_at(&self, position: Position) -> usize;

    /// Line/column of `offset`, clamped to the document.
    fn position_at(&self, offset: usize) -> Position;

    /// The given line, or `None` past the last line.
    fn line_at(&self, line: usize) -> Option<TextLine<'_>>;
}

/// A [`TextSource`] over a borrowed string.
///
/// Character access is O(1): ASCII text is indexed directly, other text keeps
/// a table of byte offsets per character.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: Cow<'a, str>,
    // Byte offset of each character plus a trailing `text.len()`; `None` when
    // the text is ASCII and char offsets equal byte offsets.
    char_bytes: Option<Vec<usize>>,
    // Char offset at which each line starts.
    line_starts: Vec<usize>,
    len: usize,
}

impl<'a> Document<'a> {
    /// Indexes `text` for character and line access.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self::index(Cow::Borrowed(text))
    }

    /// Indexes raw file contents. Invalid UTF-8 sequences become U+FFFD, one
    /// replacement character per maximal invalid subsequence; valid input is
    /// borrowed, not copied.
    ///
    /// ```rust
    /// use rulescan::{Document, TextSource};
    ///
    /// let doc = Document::from_bytes(b"a { content: \"\xFF\" }");
    /// assert_eq!(doc.char_at(14), Some('\u{FFFD}'));
    /// assert_eq!(doc.len(), 18);
    /// ```
    #[must_use]
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::index(bytes.to_str_lossy())
    }

    fn index(text: Cow<'a, str>) -> Self {
        let mut line_starts = alloc::vec![0];
        let (char_bytes, len) = if text.is_ascii() {
            for (idx, byte) in text.bytes().enumerate() {
                if byte == b'\n' {
                    line_starts.push(idx + 1);
                }
            }
            (None, text.len())
        } else {
            let mut bytes = Vec::with_capacity(text.len() + 1);
            for (idx, (byte, ch)) in text.char_indices().enumerate() {
                bytes.push(byte);
                if ch == '\n' {
                    line_starts.push(idx + 1);
                }
            }
            let len = bytes.len();
            bytes.push(text.len());
            (Some(bytes), len)
        };

        Self {
            text,
            char_bytes,
            line_starts,
            len,
        }
    }

    /// The underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn byte_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        match &self.char_bytes {
            Some(table) => table[offset],
            None => offset,
        }
    }

    // Char offset just past the last character of `line`, excluding the break.
    fn line_end(&self, line: usize) -> usize {
        let next = self
            .line_starts
            .get(line + 1)
            .map_or(self.len, |&start| start - 1);
        if next > self.line_starts[line] && self.char_at(next - 1) == Some('\r') {
            next - 1
        } else {
            next
        }
    }
}

impl TextSource for Document<'_> {
    fn len(&self) -> usize {
        self.len
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len {
            return None;
        }
        self.text[self.byte_offset(offset)..].chars().next()
    }

    fn slice(&self, start: usize, end: usize) -> Cow<'_, str> {
        let end = end.min(self.len);
        let start = start.min(end);
        Cow::Borrowed(&self.text[self.byte_offset(start)..self.byte_offset(end)])
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn offset_at(&self, position: Position) -> usize {
        let Some(&start) = self.line_starts.get(position.line) else {
            return self.len;
        };
        (start + position.column).min(self.line_end(position.line))
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Position::new(line, offset - self.line_starts[line])
    }

    fn line_at(&self, line: usize) -> Option<TextLine<'_>> {
        let start = *self.line_starts.get(line)?;
        let text = self.slice(start, self.line_end(line));
        let first_non_whitespace = text
            .chars()
            .position(|ch| !ch.is_whitespace())
            .unwrap_or_else(|| text.chars().count());
        Some(TextLine {
            line,
            start,
            text,
            first_non_whitespace,
        })
    }
}
