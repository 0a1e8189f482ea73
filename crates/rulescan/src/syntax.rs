//! Language ids, emmet modes and stylesheet dialects.

/// Markup syntaxes known to emmet.
pub const MARKUP_SYNTAXES: &[&str] = &["html", "xml", "xsl", "jsx", "js", "pug", "slim", "haml"];

/// Stylesheet syntaxes known to emmet.
pub const STYLESHEET_SYNTAXES: &[&str] = &["css", "sass", "scss", "less", "sss", "stylus"];

/// The stylesheet syntax in effect while scanning.
///
/// Only plain CSS lacks `//` line comments, and only plain CSS treats a stray
/// `}` met while looking for the opening brace as the end of the previous
/// rule. Every other dialect counts it as a nested block to skip.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Plain CSS.
    #[default]
    Css,
    /// SCSS.
    Scss,
    /// Less.
    Less,
    /// Indented Sass.
    Sass,
    /// Stylus.
    Stylus,
    /// `SugarSS`.
    Sss,
    /// Styles embedded in another language, e.g. an HTML `<style>` block.
    Embedded,
}

impl Dialect {
    /// Maps an editor language id to a dialect. Unknown ids are treated as
    /// embedded styles.
    #[must_use]
    pub fn from_language_id(language_id: &str) -> Self {
        match language_id {
            "css" => Self::Css,
            "scss" => Self::Scss,
            "less" => Self::Less,
            "sass" | "sass-indented" => Self::Sass,
            "stylus" => Self::Stylus,
            "sss" => Self::Sss,
            _ => Self::Embedded,
        }
    }

    /// Whether this is plain CSS.
    #[must_use]
    pub fn is_css(self) -> bool {
        self == Self::Css
    }

    /// Whether `//` starts a comment that runs to the end of the line.
    #[must_use]
    pub fn allows_line_comments(self) -> bool {
        !self.is_css()
    }

    /// Whether `#{...}` interpolation may appear in selectors and values.
    #[must_use]
    pub fn allows_interpolation(self) -> bool {
        !self.is_css()
    }
}

/// Whether `syntax` is a stylesheet syntax.
#[must_use]
pub fn is_style_sheet(syntax: &str) -> bool {
    matches!(syntax, "css" | "scss" | "sass" | "less" | "stylus")
}

/// Maps an editor language id to the emmet mode that serves it.
///
/// Returns `None` for languages emmet does not know and for languages listed
/// in `excluded`.
#[must_use]
pub fn emmet_mode<'a>(language_id: &'a str, excluded: &[&str]) -> Option<&'a str> {
    if language_id.is_empty() || excluded.contains(&language_id) {
        return None;
    }
    match language_id {
        "typescriptreact" | "javascriptreact" | "jsx-tags" => Some("jsx"),
        "sass-indented" => Some("sass"),
        "jade" => Some("pug"),
        id if MARKUP_SYNTAXES.contains(&id) || STYLESHEET_SYNTAXES.contains(&id) => Some(id),
        _ => None,
    }
}

/// Characters that trigger abbreviation completion in `language_id`.
#[must_use]
pub fn trigger_characters(language_id: &str) -> &'static [char] {
    const MARKUP: &[char] = &[
        '!', '.', '}', ':', '*', '$', ']', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    ];
    const XML: &[char] = &[
        '.', '}', '*', '$', ']', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    ];
    const XSL_AND_JSX: &[char] = &[
        '!', '.', '}', '*', '$', ']', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    ];
    const DASHED: &[char] = &[':', '-', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];
    const INDENTED: &[char] = &[':', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

    match language_id {
        "html" | "jade" | "slim" | "haml" => MARKUP,
        "xml" => XML,
        "xsl" | "javascriptreact" | "typescriptreact" => XSL_AND_JSX,
        "css" | "scss" | "less" => DASHED,
        "sass" | "stylus" => INDENTED,
        _ => &[],
    }
}
