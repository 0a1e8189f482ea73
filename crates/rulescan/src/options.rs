use crate::syntax::Dialect;

/// Configuration for a [`PartialScanner`](crate::PartialScanner).
///
/// # Examples
///
/// ```rust
/// use rulescan::{Dialect, ScanOptions};
///
/// let options = ScanOptions {
///     dialect: Dialect::Scss,
///     ..Default::default()
/// };
/// assert_eq!(options.max_line_distance, 100);
/// ```
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Stylesheet syntax of the document.
    ///
    /// Selects whether `//` line comments are skipped and whether a stray `}`
    /// ends the backward search (CSS) or counts as a nested block (every
    /// other dialect).
    ///
    /// # Default
    ///
    /// `Dialect::Css`
    pub dialect: Dialect,

    /// How many lines above the target the backward search for the opening
    /// brace may travel before giving up.
    ///
    /// # Default
    ///
    /// `100`
    pub max_line_distance: usize,

    /// How many characters before the target the backward searches may
    /// travel before giving up. This also bounds the search for the start of
    /// a block comment.
    ///
    /// # Default
    ///
    /// `5000`
    pub max_char_distance: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Css,
            max_line_distance: 100,
            max_char_distance: 5000,
        }
    }
}

impl ScanOptions {
    /// Default limits for `dialect`.
    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }
}

/// Configuration for the built-in [`StylesheetParser`](crate::StylesheetParser).
///
/// # Default
///
/// Plain CSS.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StylesheetOptions {
    /// Whether `//` line comments are recognised.
    pub dialect: Dialect,
}
