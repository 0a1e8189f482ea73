use alloc::{format, string::String};
use core::convert::Infallible;

use rstest::rstest;

use super::*;
use crate::{
    document::Document,
    stylesheet::{StylesheetParser, StylesheetScanner},
    syntax::Dialect,
};

fn css() -> StylesheetScanner {
    StylesheetScanner::for_dialect(Dialect::Css)
}

fn scss() -> StylesheetScanner {
    StylesheetScanner::for_dialect(Dialect::Scss)
}

fn window_text(doc: &Document<'_>, window: &ScanWindow) -> String {
    String::from(&doc.as_str()[window.range()])
}

#[test]
fn cursor_in_second_rule_recovers_only_that_rule() {
    let doc = Document::new(".a { color: red; } .b { color: blue; }");
    let window = css().scan_window(&doc, 27);
    assert_eq!(window_text(&doc, &window), ".b { color: blue; }");
    assert_eq!(window.outcome, ScanOutcome::Enclosed);
    assert!(window.contains(27));

    let rule = css().enclosing_rule(&doc, 27).unwrap();
    assert_eq!(rule.selector(), Some(".b"));
    assert_eq!(rule.span.start, 19);
}

#[rstest]
#[case(Dialect::Css)]
#[case(Dialect::Scss)]
fn block_comment_is_skipped_atomically(#[case] dialect: Dialect) {
    let source = ".a { /* comment { nested-looking } */ color: red; }";
    let doc = Document::new(source);
    let target = source.find("red").unwrap();
    let scanner = StylesheetScanner::for_dialect(dialect);

    let window = scanner.scan_window(&doc, target);
    assert_eq!(window.range(), 0..source.len());
    let rule = scanner.enclosing_rule(&doc, target).unwrap();
    assert_eq!(rule.selector(), Some(".a"));
}

#[test]
fn comment_between_rules_hides_its_braces() {
    let doc = Document::new("a { color: red; } /* } */ b { color: blue; }");
    let window = css().scan_window(&doc, 40);
    assert_eq!(window_text(&doc, &window), "b { color: blue; }");
}

#[test]
fn innermost_rule_inside_media_query() {
    let source = "@media print { .a { color: red; } }";
    let doc = Document::new(source);
    let target = source.find("red").unwrap();
    for scanner in [css(), scss()] {
        let rule = scanner.enclosing_rule(&doc, target).unwrap();
        assert_eq!(rule.selector(), Some(".a"));
    }
}

#[test]
fn cursor_between_rules_has_no_enclosing_rule() {
    let doc = Document::new(".a { color: red; }  .b { color: blue; }");
    let window = css().scan_window(&doc, 19);
    assert_eq!(window.outcome, ScanOutcome::Unenclosed);
    assert_eq!(window.start, 18);

    let sheet = css().scan(&doc, 19).unwrap();
    assert!(sheet.enclosing_block(19).is_none());
    assert!(sheet.flat_node(19, false).is_none());
    assert!(css().enclosing_rule(&doc, 19).is_none());
    assert!(css().node_at(&doc, 19, false).is_none());
}

#[test]
fn node_at_reaches_declarations() {
    let doc = Document::new(".a { color: red; } .b { color: blue; }");
    let node = css().node_at(&doc, 32, false).unwrap();
    assert!(matches!(
        &node.kind,
        crate::stylesheet::NodeKind::Property { value, .. } if value == "blue"
    ));
}

#[test]
fn repeated_scans_agree() {
    let source = ".a { color: red; }\n.b { /* x */ margin: 0 }";
    let doc = Document::new(source);
    let scanner = css();
    for target in 0..=source.len() {
        assert_eq!(
            scanner.scan_window(&doc, target),
            scanner.scan_window(&doc, target)
        );
        assert_eq!(scanner.scan(&doc, target), scanner.scan(&doc, target));
    }
}

#[rstest]
#[case("{", 0, ScanOutcome::Unenclosed)]
#[case("{", 1, ScanOutcome::Enclosed)]
#[case("/x", 0, ScanOutcome::Unenclosed)]
#[case("/x", 2, ScanOutcome::Unenclosed)]
#[case("/", 1, ScanOutcome::Unenclosed)]
#[case("", 0, ScanOutcome::Unenclosed)]
fn degenerate_input_terminates(
    #[case] source: &str,
    #[case] target: usize,
    #[case] outcome: ScanOutcome,
) {
    let doc = Document::new(source);
    for scanner in [css(), scss()] {
        let window = scanner.scan_window(&doc, target);
        assert_eq!(window.outcome, outcome);
        assert_eq!(window.end, source.len());
        assert_eq!(window.start, 0);
    }
}

#[test]
fn lone_open_brace_yields_a_fragment() {
    let doc = Document::new("{");
    let sheet = css().scan(&doc, 1).unwrap();
    assert_eq!(sheet.children.len(), 1);
    assert_eq!(sheet.children[0].block, Some(crate::stylesheet::Span::new(1, 1)));
}

#[test]
fn target_is_clamped_to_document() {
    let doc = Document::new("a { color: red; }");
    let window = css().scan_window(&doc, 1_000);
    assert_eq!(window.target, 17);
    assert_eq!(window.range(), 17..17);
}

#[test]
fn character_budget_bounds_backward_scan() {
    let source = format!(".x {{ a: 1; {}b: 2 }}", " ".repeat(6_000));
    let doc = Document::new(&source);
    let target = source.len() - 3;
    let window = css().scan_window(&doc, target);
    assert_eq!(window.outcome, ScanOutcome::Bounded);
    assert_eq!(window.start, target - 5_000);
    assert_eq!(window.end, source.len());
}

#[test]
fn line_budget_bounds_backward_scan() {
    let source = format!(".x {{\n{}b: 2 }}", "a: 1;\n".repeat(150));
    let doc = Document::new(&source);
    let target = source.len() - 3;
    let window = css().scan_window(&doc, target);
    assert_eq!(window.outcome, ScanOutcome::Bounded);
    // Stopped on the last character of line 50, 101 lines above the target.
    assert_eq!(window.start, 304);
    assert_eq!(doc.position_at(window.start).line, 50);
}

#[test]
fn budgets_come_from_options() {
    let source = format!(".x {{ {}b: 2 }}", " ".repeat(100));
    let doc = Document::new(&source);
    let target = source.len() - 3;
    let scanner = PartialScanner::new(
        StylesheetParser::default(),
        ScanOptions {
            max_char_distance: 10,
            ..ScanOptions::default()
        },
    );
    let window = scanner.scan_window(&doc, target);
    assert_eq!(window.outcome, ScanOutcome::Bounded);
    assert_eq!(window.start, target - 10);

    assert_eq!(css().scan_window(&doc, target).outcome, ScanOutcome::Enclosed);
}

#[test]
fn scss_nested_rules() {
    let source = ".outer { .inner { color: red; } margin: 0; }";
    let doc = Document::new(source);

    let inner = source.find("red").unwrap();
    let window = scss().scan_window(&doc, inner);
    assert_eq!(window_text(&doc, &window), ".inner { color: red; }");
    assert_eq!(
        scss().enclosing_rule(&doc, inner).unwrap().selector(),
        Some(".inner")
    );

    let outer = source.find("margin").unwrap();
    let window = scss().scan_window(&doc, outer);
    assert_eq!(window.range(), 0..source.len());
    assert_eq!(
        scss().enclosing_rule(&doc, outer).unwrap().selector(),
        Some(".outer")
    );
}

#[test]
fn css_stops_at_previous_close_brace() {
    let source = ".outer { .inner { color: red; } margin: 0; }";
    let doc = Document::new(source);
    let outer = source.find("margin").unwrap();

    let window = css().scan_window(&doc, outer);
    assert_eq!(window.outcome, ScanOutcome::Unenclosed);
    assert_eq!(window_text(&doc, &window), " margin: 0; }");
    // The trailing `}` has no opener in the fragment.
    assert!(css().scan(&doc, outer).is_none());
}

#[test]
fn line_comments_only_in_preprocessor_dialects() {
    let source = ".a {\n  // } not a brace\n  color: red;\n}";
    let doc = Document::new(source);
    let target = source.find("red").unwrap();

    let window = scss().scan_window(&doc, target);
    assert_eq!(window.range(), 0..source.len());
    assert_eq!(
        scss().enclosing_rule(&doc, target).unwrap().selector(),
        Some(".a")
    );

    let window = css().scan_window(&doc, target);
    assert_eq!(window.outcome, ScanOutcome::Unenclosed);
    assert_eq!(window.start, 11);
}

#[test]
fn forward_scan_skips_line_comments() {
    let source = ".a { color: red; // }\n  margin: 0 }";
    let doc = Document::new(source);
    let target = source.find("red").unwrap();
    assert_eq!(scss().scan_window(&doc, target).end, source.len());
    assert_eq!(css().scan_window(&doc, target).end, 21);
}

#[test]
fn double_slash_inside_a_value_is_not_a_comment() {
    let source = ".a { color: blue; }\n.b { background: url(http://x/y.png); }\n.c {\n  color: red;\n}";
    let doc = Document::new(source);
    let target = source.find("red").unwrap();

    let window = scss().scan_window(&doc, target);
    assert_eq!(window.start, source.find(".c").unwrap());
    assert_eq!(window.outcome, ScanOutcome::Enclosed);
    assert_eq!(
        scss().enclosing_rule(&doc, target).unwrap().selector(),
        Some(".c")
    );

    let source = ".a { background: url(http://x/y.png); color: red; }\n.b { margin: 0; }";
    let doc = Document::new(source);
    let target = source.find("background").unwrap();
    let window = scss().scan_window(&doc, target);
    assert_eq!(window.range(), 0..source.find('\n').unwrap());
    assert_eq!(
        scss().enclosing_rule(&doc, target).unwrap().selector(),
        Some(".a")
    );
}

#[test]
fn line_comment_after_semicolon_hides_its_brace() {
    let source = ".a {\n  color: blue;// }\n  margin: 0;\n}";
    let doc = Document::new(source);
    let target = source.find("margin").unwrap();
    assert_eq!(scss().scan_window(&doc, target).range(), 0..source.len());
    assert_eq!(
        scss().enclosing_rule(&doc, target).unwrap().selector(),
        Some(".a")
    );
}

#[rstest]
#[case(".a-#{$x} { color: red; }", ".a-#{$x}")]
#[case(".a-#{$x}-b { color: red; }", ".a-#{$x}-b")]
#[case(".x { }\n#{$sel} .b { color: red; }", "#{$sel} .b")]
fn interpolated_selectors_are_recovered(#[case] source: &str, #[case] selector: &str) {
    let doc = Document::new(source);
    let target = source.find("red").unwrap();
    let window = scss().scan_window(&doc, target);
    assert_eq!(window.start, source.find(selector).unwrap());
    assert_eq!(
        scss().enclosing_rule(&doc, target).unwrap().selector(),
        Some(selector)
    );
}

#[test]
fn interpolated_values_stay_inside_their_rule() {
    let source = ".a { width: #{$w}px; color: red; }";
    let doc = Document::new(source);

    let node = scss().node_at(&doc, source.find("px").unwrap(), false).unwrap();
    assert!(matches!(
        &node.kind,
        crate::stylesheet::NodeKind::Property { name, value, .. }
            if name == "width" && value == "#{$w}px"
    ));

    let before = source.find("width").unwrap();
    assert_eq!(scss().scan_window(&doc, before).range(), 0..source.len());
    // CSS has no interpolation: its `}` closes the window.
    assert_eq!(
        css().scan_window(&doc, before).end,
        source.find('}').unwrap() + 1
    );
}

#[test]
fn inverted_window_is_empty() {
    let window = ScanWindow {
        start: 5,
        end: 2,
        target: 3,
        outcome: ScanOutcome::Bounded,
    };
    assert_eq!(window.len(), 0);
    assert!(window.is_empty());
}

#[test]
fn padding_keeps_offsets_absolute() {
    let doc = Document::new("a { } b { x: 1 }");
    let echo = |source: &str| -> Result<String, Infallible> { Ok(String::from(source)) };
    let scanner = PartialScanner::new(echo, ScanOptions::default());
    let padded = scanner.scan(&doc, 12).unwrap();
    assert_eq!(padded, "      b { x: 1 }");
}

#[test]
fn rejected_fragment_is_none() {
    let doc = Document::new("a { color: red }");
    let reject = |_: &str| -> Result<(), &'static str> { Err("nope") };
    let scanner = PartialScanner::new(reject, ScanOptions::default());
    assert_eq!(scanner.scan(&doc, 6), None);
    assert_eq!(scanner.scan_window(&doc, 6).range(), 0..16);
}

#[test]
fn multibyte_documents_use_character_offsets() {
    let source = ".é { content: \"ü\"; } .ß { color: blue; }";
    let doc = Document::new(source);
    let target = source.chars().position(|ch| ch == 'b').unwrap();
    let window = css().scan_window(&doc, target);
    assert_eq!(doc.slice(window.start, window.end), ".ß { color: blue; }");
    let rule = css().enclosing_rule(&doc, target).unwrap();
    assert_eq!(rule.selector(), Some(".ß"));
    assert_eq!(rule.start(), window.start);
}
