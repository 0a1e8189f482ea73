//! Space-separated word selection inside property values, e.g. stepping
//! through `1px solid red` one part at a time.

use alloc::vec::Vec;

/// The character range of the word after the one at `pos`.
///
/// `pos = None` means "before the first character", in which case the first
/// word is returned. Returns `None` when there is no next word.
///
/// ```rust
/// use rulescan::find_next_word;
///
/// assert_eq!(find_next_word("1px solid red", None), Some((0, 3)));
/// assert_eq!(find_next_word("1px solid red", Some(1)), Some((4, 9)));
/// assert_eq!(find_next_word("1px solid red", Some(10)), None);
/// ```
#[must_use]
pub fn find_next_word(value: &str, pos: Option<usize>) -> Option<(usize, usize)> {
    let chars: Vec<char> = value.chars().collect();
    let mut found_space = pos.is_none();
    let mut start = None;

    for (idx, &ch) in chars.iter().enumerate().skip(pos.map_or(0, |p| p + 1)) {
        if !found_space {
            found_space = ch == ' ';
            continue;
        }
        match (start, ch) {
            (None, ' ') => {}
            (None, _) => start = Some(idx),
            (Some(start), ' ') => return Some((start, idx)),
            (Some(_), _) => {}
        }
    }
    start.map(|start| (start, chars.len()))
}

/// The character range of the word before the one at `pos`.
///
/// `pos` equal to the value length means "after the last character", in
/// which case the last word is returned. Returns `None` when there is no
/// previous word.
///
/// ```rust
/// use rulescan::find_prev_word;
///
/// assert_eq!(find_prev_word("1px solid red", 13), Some((10, 13)));
/// assert_eq!(find_prev_word("1px solid red", 11), Some((4, 9)));
/// assert_eq!(find_prev_word("1px solid red", 2), None);
/// ```
#[must_use]
pub fn find_prev_word(value: &str, pos: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = value.chars().collect();
    let pos = pos.min(chars.len());
    let mut found_space = pos == chars.len();
    let mut end = None;

    for idx in (0..pos).rev() {
        let ch = chars[idx];
        if !found_space {
            found_space = ch == ' ';
            continue;
        }
        match (end, ch) {
            (None, ' ') => {}
            (None, _) => end = Some(idx + 1),
            (Some(end), ' ') => return Some((idx + 1, end)),
            (Some(_), _) => {}
        }
    }
    end.map(|end| (0, end))
}
