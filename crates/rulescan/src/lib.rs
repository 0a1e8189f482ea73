//! Bounded partial scanning of stylesheets.
//!
//! Editor commands often need the rule around the cursor, not the whole
//! stylesheet. [`PartialScanner`] walks outward from a cursor over a
//! [`TextSource`] to find the smallest span holding one complete rule, pads it
//! so offsets stay absolute, and hands it to a [`FragmentParser`]. The built-in
//! [`StylesheetParser`] turns the fragment into a [`Stylesheet`] of flat
//! [`Node`]s.
//!
//! ```rust
//! use rulescan::{Dialect, Document, StylesheetScanner};
//!
//! let doc = Document::new(".outer {\n  .inner { color: red; }\n  margin: 0;\n}");
//! let scanner = StylesheetScanner::for_dialect(Dialect::Scss);
//!
//! let rule = scanner.enclosing_rule(&doc, 28).unwrap();
//! assert_eq!(rule.selector(), Some(".inner"));
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod document;
mod error;
mod options;
mod scanner;
mod stream;
mod stylesheet;
mod syntax;
mod words;

#[cfg(test)]
mod tests;

pub use document::{Document, Position, TextLine, TextSource};
pub use error::ParseError;
pub use options::{ScanOptions, StylesheetOptions};
pub use scanner::{FragmentParser, PartialScanner, ScanOutcome, ScanWindow};
pub use stream::BufferStream;
pub use stylesheet::{Node, NodeKind, Span, Stylesheet, StylesheetParser, StylesheetScanner};
pub use syntax::{
    Dialect, MARKUP_SYNTAXES, STYLESHEET_SYNTAXES, emmet_mode, is_style_sheet, trigger_characters,
};
pub use words::{find_next_word, find_prev_word};
