#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rulescan::{
    Dialect, Document, PartialScanner, ScanOptions, StylesheetOptions, StylesheetParser, TextSource,
};

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

// Fragments the scanner branches on.
static TOKENS: &[&[u8]] = &[
    b"{",
    b"}",
    b";",
    b"/*",
    b"*/",
    b"//",
    b"url(http://x)",
    b"#{",
    b"\n",
    b"\r\n",
    b"\"",
    b"'",
    b"(",
    b")",
    b" ",
    b".a",
    b"@media x",
    b"color: red",
    "\u{e9}".as_bytes(),
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Splices a token at a random position, or defers to libFuzzer.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if seed % 4 != 0 {
        return fuzzer_mutate(data, size, max_size);
    }
    with_rng(|rng| {
        let token = TOKENS[rng.random_range(0..TOKENS.len())];
        if size + token.len() > max_size {
            return fuzzer_mutate(data, size, max_size);
        }
        let at = rng.random_range(0..=size);
        data.copy_within(at..size, at + token.len());
        data[at..at + token.len()].copy_from_slice(token);
        size + token.len()
    })
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug, Arbitrary)]
struct Query {
    dialect: u8,
    cursor: u16,
    max_line_distance: u8,
    max_char_distance: u16,
}

fn scan(data: &[u8]) {
    let mut input = Unstructured::new(data);
    let Ok(query) = Query::arbitrary(&mut input) else {
        return;
    };
    let doc = Document::from_bytes(input.take_rest());

    let dialect = match query.dialect % 3 {
        0 => Dialect::Css,
        1 => Dialect::Scss,
        _ => Dialect::Less,
    };
    let options = ScanOptions {
        dialect,
        max_line_distance: usize::from(query.max_line_distance),
        max_char_distance: usize::from(query.max_char_distance),
    };
    let scanner = PartialScanner::new(StylesheetParser::new(StylesheetOptions { dialect }), options);

    let target = usize::from(query.cursor) % (doc.len() + 1);
    let window = scanner.scan_window(&doc, target);
    assert!(window.contains(target));
    if let Some(sheet) = scanner.parse_window(&doc, &window) {
        assert_eq!(sheet.len, window.end);
        for node in &sheet.children {
            assert!(window.start <= node.start() && node.end() <= window.end);
        }
    }
}

fuzz_target!(|data: &[u8]| scan(data));
