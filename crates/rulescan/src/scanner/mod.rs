//! Partial scanner: recover the rule around a cursor without parsing the
//! whole document.
//!
//! What it does
//! - Walks forward from the target to the first `}` outside comments; that
//!   closes the window.
//! - Walks backward to the `{` that matches it, counting nested `}{` pairs
//!   (or, in plain CSS, stopping at the previous rule's `}`).
//! - Walks further back over the selector.
//! - Hands `start` spaces followed by `text[start..end]` to a
//!   [`FragmentParser`], so offsets inside the fragment stay absolute.
//!
//! Invariants
//! - The backward searches never travel further than
//!   [`ScanOptions::max_char_distance`] characters or
//!   [`ScanOptions::max_line_distance`] lines; exceeding either yields a
//!   [`ScanOutcome::Bounded`] window instead of an error.
//! - Nothing here fails. A fragment the parser rejects becomes `None`.
//! - Scans share no state: each query builds its own cursor over the
//!   read-only document.

use alloc::string::String;
use core::fmt;

use crate::{
    document::{Position, TextSource},
    options::ScanOptions,
    stream::{BufferStream, line_comment_at},
};

#[cfg(test)]
mod tests;

/// Parses the padded text of a [`ScanWindow`].
///
/// The input has as many leading spaces as the window's start offset, so any
/// offsets the parser records line up with the original document. Errors are
/// reported, never propagated: the scanner turns them into `None`.
pub trait FragmentParser {
    /// The parsed result.
    type Fragment;
    /// Why a fragment was rejected.
    type Error: fmt::Display;

    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns an error when `source` is not a well-formed fragment.
    fn parse(&self, source: &str) -> Result<Self::Fragment, Self::Error>;
}

impl<F, T, E> FragmentParser for F
where
    F: Fn(&str) -> Result<T, E>,
    E: fmt::Display,
{
    type Fragment = T;
    type Error = E;

    fn parse(&self, source: &str) -> Result<T, E> {
        self(source)
    }
}

/// How the backward scan ended.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanOutcome {
    /// The opening brace (and selector, if any) around the target was found.
    Enclosed,
    /// No opening brace encloses the target: the scan reached the start of the
    /// document, or in CSS the end of the previous rule.
    Unenclosed,
    /// The backward scan ran out of its line or character budget; the window
    /// starts where it gave up.
    Bounded,
}

/// The span `[start, end)` believed to hold one complete rule.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanWindow {
    /// First character of the fragment.
    pub start: usize,
    /// One past the last character of the fragment.
    pub end: usize,
    /// The offset the scan started from.
    pub target: usize,
    /// How the backward scan ended.
    pub outcome: ScanOutcome,
}

impl ScanWindow {
    /// Number of characters in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `offset` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// `start..end`.
    #[must_use]
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    /// The window text padded with `start` spaces, as handed to the parser.
    #[must_use]
    pub fn padded_text<S: TextSource + ?Sized>(&self, document: &S) -> String {
        let text = document.slice(self.start, self.end);
        let mut buffer = String::with_capacity(self.start + text.len());
        buffer.extend(core::iter::repeat_n(' ', self.start));
        buffer.push_str(&text);
        buffer
    }
}

/// Finds the rule enclosing a cursor and parses just that.
///
/// The parser and options are injected at construction; a scanner holds no
/// per-query state and can serve concurrent queries.
///
/// # Examples
///
/// ```rust
/// use rulescan::{Document, PartialScanner, ScanOptions, StylesheetParser};
///
/// let doc = Document::new(".a { color: red; } .b { color: blue; }");
/// let scanner = PartialScanner::new(StylesheetParser::default(), ScanOptions::default());
///
/// let window = scanner.scan_window(&doc, 27);
/// assert_eq!(&doc.as_str()[window.range()], ".b { color: blue; }");
///
/// let sheet = scanner.scan(&doc, 27).expect("fragment parses");
/// assert_eq!(sheet.children.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PartialScanner<P> {
    parser: P,
    options: ScanOptions,
}

impl<P> PartialScanner<P> {
    /// Creates a scanner that hands fragments to `parser`.
    pub fn new(parser: P, options: ScanOptions) -> Self {
        Self { parser, options }
    }

    /// The scan configuration.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// The fragment parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Computes the fragment window around `target` without parsing it.
    ///
    /// `target` is clamped to the document length.
    pub fn scan_window<S: TextSource + ?Sized>(&self, document: &S, target: usize) -> ScanWindow {
        Scan::new(document, target, self.options).run()
    }
}

impl<P: FragmentParser> PartialScanner<P> {
    /// Scans around `target` and parses the recovered fragment.
    ///
    /// Returns `None` when the parser rejects the fragment.
    pub fn scan<S: TextSource + ?Sized>(&self, document: &S, target: usize) -> Option<P::Fragment> {
        let window = self.scan_window(document, target);
        self.parse_window(document, &window)
    }

    /// Parses a window previously computed by [`scan_window`](Self::scan_window).
    pub fn parse_window<S: TextSource + ?Sized>(
        &self,
        document: &S,
        window: &ScanWindow,
    ) -> Option<P::Fragment> {
        match self.parser.parse(&window.padded_text(document)) {
            Ok(fragment) => Some(fragment),
            Err(error) => {
                tracing::debug!(
                    start = window.start,
                    end = window.end,
                    cursor = window.target,
                    %error,
                    "fragment rejected"
                );
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ScanningForward,
    ScanningBackwardForOpenBrace,
    ScanningBackwardForSelector,
    Done(ScanOutcome),
    Aborted,
}

/// One query: the cursor and the bounds computed so far.
struct Scan<'d, S: TextSource + ?Sized> {
    document: &'d S,
    stream: BufferStream<'d, S>,
    options: ScanOptions,
    target: usize,
    target_line: usize,
    // Lowest offset the backward searches may reach.
    floor: usize,
    // Line whose `//` comment was last considered.
    current_line: usize,
    start: usize,
    end: usize,
}

impl<'d, S: TextSource + ?Sized> Scan<'d, S> {
    fn new(document: &'d S, target: usize, options: ScanOptions) -> Self {
        let stream = BufferStream::new(document, target);
        let target = stream.pos();
        let target_line = document.position_at(target).line;
        Self {
            document,
            stream,
            options,
            target,
            target_line,
            floor: target.saturating_sub(options.max_char_distance),
            current_line: target_line,
            start: 0,
            end: document.len(),
        }
    }

    fn run(mut self) -> ScanWindow {
        let mut state = State::ScanningForward;
        loop {
            state = match state {
                State::ScanningForward => self.scan_forward(),
                State::ScanningBackwardForOpenBrace => self.scan_backward_for_open_brace(),
                State::ScanningBackwardForSelector => self.scan_backward_for_selector(),
                State::Aborted => {
                    tracing::debug!(
                        cursor = self.target,
                        stopped_at = self.start,
                        "backward scan exceeded its budget"
                    );
                    return self.window(ScanOutcome::Bounded);
                }
                State::Done(outcome) => return self.window(outcome),
            };
            tracing::trace!(?state, pos = self.stream.pos(), "scan transition");
        }
    }

    fn window(&self, outcome: ScanOutcome) -> ScanWindow {
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            self.start <= self.target && self.target <= self.end && self.end <= self.document.len(),
            "window {}..{} does not cover cursor {} in a document of {} characters",
            self.start,
            self.end,
            self.target,
            self.document.len(),
        );
        ScanWindow {
            start: self.start,
            end: self.end,
            target: self.target,
            outcome,
        }
    }

    fn scan_forward(&mut self) -> State {
        while !self.stream.eof() && !self.stream.eat('}') {
            match self.stream.peek() {
                Some('/') => self.consume_comment_forwards(),
                Some('#') if self.options.dialect.allows_interpolation() => {
                    self.consume_interpolation_forwards();
                }
                _ => {
                    self.stream.next();
                }
            }
        }
        self.end = self.stream.pos();
        State::ScanningBackwardForOpenBrace
    }

    fn scan_backward_for_open_brace(&mut self) -> State {
        self.stream.set_pos(self.target);
        self.current_line = self.target_line;
        let mut open_braces_to_find = 1usize;

        while open_braces_to_find > 0 && !self.stream.sof() {
            self.consume_line_comment_backwards();
            match self.stream.back_up(1) {
                Some('{') => open_braces_to_find -= 1,
                Some('}') if self.options.dialect.is_css() => {
                    self.stream.next();
                    self.start = self.stream.pos();
                    return State::Done(ScanOutcome::Unenclosed);
                }
                Some('}') => open_braces_to_find += 1,
                Some('/') => {
                    self.consume_block_comment_backwards();
                }
                _ => {}
            }
            if open_braces_to_find > 0 && self.exceeded_budget() {
                self.start = self.stream.pos();
                return State::Aborted;
            }
        }

        if open_braces_to_find > 0 {
            self.start = 0;
            return State::Done(ScanOutcome::Unenclosed);
        }
        State::ScanningBackwardForSelector
    }

    fn scan_backward_for_selector(&mut self) -> State {
        let brace = self.stream.pos();
        self.start = brace;
        self.current_line = self.document.position_at(brace).line;
        let mut nested = 0usize;
        let mut found_selector = false;

        while !self.stream.sof() && self.stream.pos() > self.floor {
            self.consume_line_comment_backwards();
            let Some(ch) = self.stream.back_up(1) else {
                break;
            };
            // `#{...}` belongs to the selector around it.
            if ch == '}' && self.options.dialect.allows_interpolation() {
                if let Some(hash) = self.interpolation_closed_at(self.stream.pos()) {
                    self.stream.set_pos(hash);
                    if nested == 0 {
                        found_selector = true;
                        self.start = hash;
                    }
                    continue;
                }
            }
            match ch {
                ch if ch.is_whitespace() => {}
                '/' if self.consume_block_comment_backwards() => {}
                '}' if !found_selector => nested += 1,
                '{' if !found_selector && nested > 0 => nested -= 1,
                // The previous rule, the enclosing block, or a declaration.
                '{' | '}' | ';' if nested == 0 => break,
                _ if nested == 0 => {
                    found_selector = true;
                    self.start = self.stream.pos();
                }
                _ => {}
            }
        }

        State::Done(ScanOutcome::Enclosed)
    }

    fn exceeded_budget(&self) -> bool {
        let pos = self.stream.pos();
        let line = self.document.position_at(pos).line;
        self.target_line.saturating_sub(line) > self.options.max_line_distance
            || (self.floor > 0 && pos <= self.floor)
    }

    fn consume_comment_forwards(&mut self) {
        if self.options.dialect.allows_line_comments() && self.stream.at_line_comment() {
            let line = self.document.position_at(self.stream.pos()).line;
            let next_line = self.document.offset_at(Position::new(line + 1, 0));
            self.stream.set_pos(next_line);
            return;
        }
        if !self.stream.eat('/') {
            return;
        }
        if self.stream.eat('*') {
            let close = self
                .find_closing_comment_after(self.stream.pos())
                .unwrap_or(self.document.len());
            self.stream.set_pos(close);
        }
    }

    /// With the cursor on `#`, skips a `#{...}` interpolation that closes on
    /// the same line. Otherwise only the `#` is consumed.
    fn consume_interpolation_forwards(&mut self) {
        let hash = self.stream.pos();
        self.stream.next();
        if !self.stream.eat('{') {
            return;
        }
        let mut depth = 1usize;
        while let Some(ch) = self.stream.next() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                '\n' | ';' => break,
                _ => {}
            }
        }
        self.stream.set_pos(hash + 1);
    }

    /// Offset of the `#` opening the interpolation whose `}` is at `close`,
    /// if it opens on the same line.
    fn interpolation_closed_at(&self, close: usize) -> Option<usize> {
        let mut depth = 1usize;
        for offset in (self.floor..close).rev() {
            match self.document.char_at(offset)? {
                '}' => depth += 1,
                '{' => {
                    depth -= 1;
                    if depth == 0 {
                        let hash = offset.checked_sub(1)?;
                        return (self.document.char_at(hash) == Some('#')).then_some(hash);
                    }
                }
                '\n' | ';' => return None,
                _ => {}
            }
        }
        None
    }

    /// In dialects with line comments, jumps to the `//` of a line the cursor
    /// has just entered.
    fn consume_line_comment_backwards(&mut self) {
        if !self.options.dialect.allows_line_comments() {
            return;
        }
        let pos = self.stream.pos();
        let line = self.document.position_at(pos).line;
        if line == self.current_line {
            return;
        }
        self.current_line = line;
        let line_start = self.document.offset_at(Position::new(line, 0));
        if let Some(comment) =
            (line_start..pos).find(|&offset| line_comment_at(self.document, offset))
        {
            self.stream.set_pos(comment);
        }
    }

    /// With the cursor on a `/`, skips back over a block comment ending in
    /// it. Returns whether a comment was skipped; otherwise the cursor stays
    /// on the `/`.
    fn consume_block_comment_backwards(&mut self) -> bool {
        if self.stream.peek() != Some('/') {
            return false;
        }
        let slash = self.stream.pos();
        if self.stream.back_up(1) == Some('*') {
            let open = self
                .find_opening_comment_before(self.stream.pos())
                .unwrap_or(self.floor);
            self.stream.set_pos(open);
            true
        } else {
            self.stream.set_pos(slash);
            false
        }
    }

    /// Offset of the last `/*` that ends before `pos`, searching no lower
    /// than the floor.
    fn find_opening_comment_before(&self, pos: usize) -> Option<usize> {
        (self.floor..pos.saturating_sub(1)).rev().find(|&offset| {
            self.document.char_at(offset) == Some('/')
                && self.document.char_at(offset + 1) == Some('*')
        })
    }

    /// Offset just past the first `*/` at or after `pos`.
    fn find_closing_comment_after(&self, pos: usize) -> Option<usize> {
        let mut prev = None;
        for offset in pos..self.document.len() {
            let ch = self.document.char_at(offset);
            if prev == Some('*') && ch == Some('/') {
                return Some(offset + 1);
            }
            prev = ch;
        }
        None
    }
}
