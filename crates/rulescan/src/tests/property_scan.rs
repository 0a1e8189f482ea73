use quickcheck::QuickCheck;

use super::arbitrary::{FlatSheet, StyleText};
use crate::{
    Dialect, Document, PartialScanner, ScanOptions, StylesheetParser, StylesheetScanner,
};

fn test_count() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: on any input and any cursor, the window covers the cursor and
/// stays inside the document, and scanning twice gives the same answer.
#[test]
fn window_covers_cursor_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: StyleText, cursor: usize, budget: usize) -> bool {
        let doc = Document::new(&text.0);
        let len = text.0.chars().count();
        let target = cursor % (len + 1);
        [Dialect::Css, Dialect::Scss].into_iter().all(|dialect| {
            let scanner = PartialScanner::new(
                StylesheetParser::default(),
                ScanOptions {
                    dialect,
                    max_line_distance: budget % 8,
                    max_char_distance: budget % 64,
                },
            );
            let window = scanner.scan_window(&doc, target);
            window.start <= target
                && target <= window.end
                && window.end <= len
                && window == scanner.scan_window(&doc, target)
                && scanner.scan(&doc, target) == scanner.scan(&doc, target)
        })
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(StyleText, usize, usize) -> bool);
}

/// Property: a cursor on a declaration value finds the rule it sits in, with
/// or without an enclosing at-rule, in either dialect.
#[test]
fn enclosing_rule_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(sheet: FlatSheet) -> bool {
        let (wrapped, wrapped_cursors) = sheet.wrapped();
        [
            (sheet.text.as_str(), &sheet.cursors),
            (wrapped.as_str(), &wrapped_cursors),
        ]
        .into_iter()
        .all(|(text, cursors)| {
            let doc = Document::new(text);
            [Dialect::Css, Dialect::Scss].into_iter().all(|dialect| {
                let scanner = StylesheetScanner::for_dialect(dialect);
                cursors.iter().all(|(cursor, selector)| {
                    scanner
                        .enclosing_rule(&doc, *cursor)
                        .is_some_and(|rule| rule.selector() == Some(selector.as_str()))
                })
            })
        })
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(FlatSheet) -> bool);
}
