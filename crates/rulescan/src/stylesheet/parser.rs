use alloc::{borrow::Cow, string::String, vec::Vec};

use super::{Node, NodeKind, Span, Stylesheet};
use crate::{
    document::{Document, TextSource},
    error::ParseError,
    options::StylesheetOptions,
    scanner::FragmentParser,
    stream::BufferStream,
};

/// A tolerant parser for stylesheet fragments.
///
/// It models block structure only: rules, at-rules, declarations and
/// comments. Selectors and values are kept as text. Unclosed blocks and
/// comments end at the end of the input; a stray `}` or an unterminated
/// string rejects the whole fragment.
///
/// # Examples
///
/// ```rust
/// use rulescan::{NodeKind, StylesheetParser};
///
/// let sheet = StylesheetParser::default().parse_str("a { color: red }").unwrap();
/// let rule = &sheet.children[0];
/// assert_eq!(rule.selector(), Some("a"));
/// assert!(matches!(
///     &rule.property("color").unwrap().kind,
///     NodeKind::Property { value, .. } if value == "red"
/// ));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetParser {
    options: StylesheetOptions,
}

impl StylesheetParser {
    /// Creates a parser.
    #[must_use]
    pub fn new(options: StylesheetOptions) -> Self {
        Self { options }
    }

    /// Parses `source` into a tree of nodes with character offsets.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on an unmatched `}` or an unterminated string.
    pub fn parse_str(&self, source: &str) -> Result<Stylesheet, ParseError> {
        let document = Document::new(source);
        let mut parser = Parser {
            stream: BufferStream::new(&document, 0),
            options: self.options,
        };
        let (children, _) = parser.items(false)?;
        Ok(Stylesheet {
            children,
            len: document.len(),
        })
    }
}

impl FragmentParser for StylesheetParser {
    type Fragment = Stylesheet;
    type Error = ParseError;

    fn parse(&self, source: &str) -> Result<Stylesheet, ParseError> {
        self.parse_str(source)
    }
}

enum Terminator {
    Block,
    Semicolon,
    Close,
    Eof,
}

struct Parser<'d> {
    stream: BufferStream<'d, Document<'d>>,
    options: StylesheetOptions,
}

impl<'d> Parser<'d> {
    /// Parses items up to the `}` closing the current block (when `nested`)
    /// or the end of input. Returns the items and the offset of the `}`.
    fn items(&mut self, nested: bool) -> Result<(Vec<Node>, Option<usize>), ParseError> {
        let mut items = Vec::new();
        loop {
            self.stream.eat_while(char::is_whitespace);
            match self.stream.peek() {
                None => return Ok((items, None)),
                Some('}') => {
                    let offset = self.stream.pos();
                    if !nested {
                        return Err(ParseError::UnexpectedCloseBrace { offset });
                    }
                    self.stream.next();
                    return Ok((items, Some(offset)));
                }
                Some(';') => {
                    self.stream.next();
                }
                _ => {
                    if let Some(comment) = self.comment() {
                        items.push(comment);
                    } else if !self.skip_line_comment() {
                        items.extend(self.statement()?);
                    }
                }
            }
        }
    }

    fn comment(&mut self) -> Option<Node> {
        let start = self.stream.pos();
        if !self.stream.eat_pair('/', '*') {
            return None;
        }
        while !self.stream.eof() && !self.stream.eat_pair('*', '/') {
            self.stream.next();
        }
        Some(Node {
            kind: NodeKind::Comment,
            span: Span::new(start, self.stream.pos()),
            block: None,
            children: Vec::new(),
        })
    }

    fn skip_line_comment(&mut self) -> bool {
        if !self.options.dialect.allows_line_comments() || !self.stream.at_line_comment() {
            return false;
        }
        self.stream.eat_while(|ch| ch != '\n');
        true
    }

    /// Skips a `#{...}` interpolation that closes on the same line. Returns
    /// whether one was skipped; otherwise nothing is consumed.
    fn interpolation(&mut self) -> bool {
        if !self.options.dialect.allows_interpolation() {
            return false;
        }
        let start = self.stream.pos();
        if !self.stream.eat_pair('#', '{') {
            return false;
        }
        let mut depth = 1usize;
        while let Some(ch) = self.stream.next() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                '\n' | ';' => break,
                _ => {}
            }
        }
        self.stream.set_pos(start);
        false
    }

    fn statement(&mut self) -> Result<Option<Node>, ParseError> {
        let start = self.stream.pos();
        // Just past the last significant prelude character.
        let mut last = start;
        let terminator = loop {
            match self.stream.peek() {
                None => break Terminator::Eof,
                Some('{') => break Terminator::Block,
                Some(';') => break Terminator::Semicolon,
                Some('}') => break Terminator::Close,
                Some(quote @ ('"' | '\'')) => {
                    self.string(quote)?;
                    last = self.stream.pos();
                }
                Some('(') => {
                    self.group()?;
                    last = self.stream.pos();
                }
                Some('/') if self.comment().is_some() || self.skip_line_comment() => {}
                Some('#') if self.interpolation() => last = self.stream.pos(),
                Some(ch) => {
                    self.stream.next();
                    if !ch.is_whitespace() {
                        last = self.stream.pos();
                    }
                }
            }
        };
        let prelude = self.stream.substring(start, last);

        match terminator {
            Terminator::Block => {
                let open = self.stream.pos();
                self.stream.next();
                let (children, close) = self.items(true)?;
                let inner_end = close.unwrap_or_else(|| self.stream.pos());
                Ok(Some(Node {
                    kind: block_kind(&prelude),
                    span: Span::new(start, self.stream.pos()),
                    block: Some(Span::new(open + 1, inner_end)),
                    children,
                }))
            }
            _ if prelude.is_empty() => Ok(None),
            Terminator::Semicolon => {
                self.stream.next();
                Ok(Some(declaration(&prelude, start, self.stream.pos())))
            }
            Terminator::Close | Terminator::Eof => Ok(Some(declaration(&prelude, start, last))),
        }
    }

    fn string(&mut self, quote: char) -> Result<(), ParseError> {
        let offset = self.stream.pos();
        self.stream.next();
        loop {
            match self.stream.next() {
                None => return Err(ParseError::UnterminatedString { offset }),
                Some('\\') => {
                    self.stream.next();
                }
                Some(ch) if ch == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Skips a parenthesised group, e.g. `url(...)`. An unclosed group runs
    /// to the end of input.
    fn group(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        while let Some(ch) = self.stream.peek() {
            match ch {
                '"' | '\'' => {
                    self.string(ch)?;
                    continue;
                }
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.stream.next();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.stream.next();
        }
        Ok(())
    }
}

fn block_kind(prelude: &str) -> NodeKind {
    match prelude.strip_prefix('@') {
        Some(rest) => at_rule(rest),
        None => NodeKind::Rule {
            selector: String::from(prelude),
        },
    }
}

fn at_rule(rest: &str) -> NodeKind {
    let name_len = rest
        .find(|ch: char| ch.is_whitespace() || ch == '(')
        .unwrap_or(rest.len());
    NodeKind::AtRule {
        name: String::from(&rest[..name_len]),
        expression: String::from(rest[name_len..].trim()),
    }
}

/// A statement without a block: an at-rule such as `@import` or a
/// declaration. Text without a `:` becomes a property with an empty value.
fn declaration(prelude: &Cow<'_, str>, start: usize, end: usize) -> Node {
    let kind = if let Some(rest) = prelude.strip_prefix('@') {
        at_rule(rest)
    } else if let Some((name, value)) = prelude.split_once(':') {
        let leading = value.chars().take_while(|ch| ch.is_whitespace()).count();
        let value = value.trim();
        let value_start = start + name.chars().count() + 1 + leading;
        NodeKind::Property {
            name: String::from(name.trim()),
            value: String::from(value),
            value_span: Span::new(value_start, value_start + value.chars().count()),
        }
    } else {
        let prelude_end = start + prelude.chars().count();
        NodeKind::Property {
            name: String::from(prelude.as_ref()),
            value: String::new(),
            value_span: Span::new(prelude_end, prelude_end),
        }
    };
    Node {
        kind,
        span: Span::new(start, end),
        block: None,
        children: Vec::new(),
    }
}
