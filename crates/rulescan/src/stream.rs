//! Bidirectional character cursor over a [`TextSource`].
//!
//! Every movement clamps at the stream limits and reports the edge with a
//! `None` sentinel instead of failing, so scanning loops can run into either
//! end of the buffer without special-casing each call site.

use alloc::borrow::Cow;

use crate::document::TextSource;

/// A cursor over a document, indexed by absolute character offset.
///
/// Invariant: `sof <= pos <= eof`.
#[derive(Debug)]
pub struct BufferStream<'d, S: TextSource + ?Sized> {
    source: &'d S,
    start: usize,
    sof: usize,
    eof: usize,
    pos: usize,
}

// Manual impls: the derive would require `S: Clone`.
impl<S: TextSource + ?Sized> Clone for BufferStream<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: TextSource + ?Sized> Copy for BufferStream<'_, S> {}

impl<'d, S: TextSource + ?Sized> BufferStream<'d, S> {
    /// Creates a stream over the whole document, positioned at `pos`.
    pub fn new(source: &'d S, pos: usize) -> Self {
        let eof = source.len();
        let pos = pos.min(eof);
        Self {
            source,
            start: pos,
            sof: 0,
            eof,
            pos,
        }
    }

    /// Creates a stream restricted to `[start, end)`, positioned at `start`.
    #[must_use]
    pub fn limit(&self, start: usize, end: usize) -> Self {
        let eof = end.min(self.source.len());
        let sof = start.min(eof);
        Self {
            source: self.source,
            start: sof,
            sof,
            eof,
            pos: sof,
        }
    }

    /// The document this stream reads.
    pub fn source(&self) -> &'d S {
        self.source
    }

    /// Current absolute offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Jumps to `pos`, clamped to the stream limits.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.clamp(self.sof, self.eof);
    }

    /// Whether the cursor is at or before the start limit.
    pub fn sof(&self) -> bool {
        self.pos <= self.sof
    }

    /// Whether the cursor is at or past the end limit.
    pub fn eof(&self) -> bool {
        self.pos >= self.eof
    }

    /// Character under the cursor, `None` at the end.
    pub fn peek(&self) -> Option<char> {
        if self.eof() {
            return None;
        }
        self.source.char_at(self.pos)
    }

    /// Returns the character under the cursor and advances past it. At the
    /// end, returns `None` and stays put.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    /// Moves back `n` characters and returns the character now under the
    /// cursor. Backing up past the start limit clamps to it and returns
    /// `None`.
    pub fn back_up(&mut self, n: usize) -> Option<char> {
        match self.pos.checked_sub(n) {
            Some(pos) if pos >= self.sof => {
                self.pos = pos;
                self.peek()
            }
            _ => {
                self.pos = self.sof;
                None
            }
        }
    }

    /// Consumes `expected` if it is under the cursor.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes characters while `predicate` holds. Returns whether anything
    /// was consumed.
    pub fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> bool {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.pos += 1;
        }
        self.pos != start
    }

    /// Consumes `first` followed by `second`, or nothing.
    pub fn eat_pair(&mut self, first: char, second: char) -> bool {
        let start = self.pos;
        if self.eat(first) && self.eat(second) {
            return true;
        }
        self.pos = start;
        false
    }

    /// Whether a `//` line comment starts at the cursor: the `//` opens the
    /// document or follows whitespace, `;`, `{` or `}`.
    pub fn at_line_comment(&self) -> bool {
        !self.eof() && line_comment_at(self.source, self.pos)
    }

    /// Text from the stream's starting position to the cursor.
    pub fn current(&self) -> Cow<'d, str> {
        self.substring(self.start, self.pos)
    }

    /// Text of `[from, to)`.
    pub fn substring(&self, from: usize, to: usize) -> Cow<'d, str> {
        self.source.slice(from, to)
    }
}

/// Whether a `//` at `offset` starts a line comment.
///
/// It must open the document or follow whitespace, `;`, `{` or `}`, so the
/// `//` in `url(http://host/a.png)` or `a//b` is plain text.
pub(crate) fn line_comment_at<S: TextSource + ?Sized>(source: &S, offset: usize) -> bool {
    source.char_at(offset) == Some('/')
        && source.char_at(offset + 1) == Some('/')
        && offset
            .checked_sub(1)
            .and_then(|prev| source.char_at(prev))
            .is_none_or(|prev| prev.is_whitespace() || matches!(prev, ';' | '{' | '}'))
}
