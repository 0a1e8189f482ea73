use thiserror::Error;

/// Reasons the built-in stylesheet parser rejects a fragment.
///
/// Offsets are absolute character offsets into the parsed (padded) text,
/// which equal offsets into the original document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `}` with no matching `{` in the fragment.
    #[error("unexpected close brace at {offset}")]
    UnexpectedCloseBrace {
        /// Offset of the brace.
        offset: usize,
    },
    /// A quoted string that runs to the end of the fragment.
    #[error("unterminated string starting at {offset}")]
    UnterminatedString {
        /// Offset of the opening quote.
        offset: usize,
    },
}
