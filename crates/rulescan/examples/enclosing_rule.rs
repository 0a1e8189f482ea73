//! Prints the rule enclosing a cursor in a stylesheet.
//!
//! Run with
//!
//! ```bash
//! cargo run -p rulescan --example enclosing_rule -- path/to/style.scss 12 4
//! ```
//!
//! where `12 4` is the zero-based line and column of the cursor. The dialect
//! follows the file extension.

use std::{env, fs, path::Path, process::ExitCode};

use rulescan::{Dialect, Document, Node, NodeKind, Position, StylesheetScanner, TextSource};

fn describe(node: &Node) -> String {
    match &node.kind {
        NodeKind::Rule { selector } => format!("rule `{selector}`"),
        NodeKind::AtRule { name, expression } => format!("@{name} {expression}"),
        NodeKind::Property { name, value, .. } => format!("{name}: {value}"),
        NodeKind::Comment => "comment".to_string(),
    }
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let (Some(path), Some(line), Some(column)) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: enclosing_rule <file> <line> <column>");
        return ExitCode::FAILURE;
    };
    let (Ok(line), Ok(column)) = (line.parse(), column.parse()) else {
        eprintln!("line and column must be numbers");
        return ExitCode::FAILURE;
    };
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("cannot read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let dialect = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(Dialect::Css, Dialect::from_language_id);
    let doc = Document::from_bytes(&bytes);
    let target = doc.offset_at(Position::new(line, column));
    let scanner = StylesheetScanner::for_dialect(dialect);

    let window = scanner.scan_window(&doc, target);
    println!(
        "window {}..{} ({:?}, {} characters of {})",
        window.start,
        window.end,
        window.outcome,
        window.len(),
        doc.len()
    );

    match scanner.enclosing_rule(&doc, target) {
        Some(rule) => {
            println!("{}", describe(&rule));
            for child in &rule.children {
                println!("  {}", describe(child));
            }
        }
        None => println!("no enclosing rule"),
    }
    if let Some(node) = scanner.node_at(&doc, target, true) {
        println!("at cursor: {}", describe(&node));
    }
    ExitCode::SUCCESS
}
