//! A flat-node model of stylesheet fragments and the lookups editor commands
//! run on it.

use alloc::{string::String, vec::Vec};

use crate::{
    document::TextSource,
    options::{ScanOptions, StylesheetOptions},
    scanner::PartialScanner,
    syntax::Dialect,
};

mod parser;

pub use parser::StylesheetParser;

/// A [`PartialScanner`] paired with the built-in [`StylesheetParser`].
pub type StylesheetScanner = PartialScanner<StylesheetParser>;

impl PartialScanner<StylesheetParser> {
    /// A scanner whose scan and parse both follow `dialect`.
    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(
            StylesheetParser::new(StylesheetOptions { dialect }),
            ScanOptions::for_dialect(dialect),
        )
    }

    /// The innermost rule or block at-rule whose braces contain `target`.
    ///
    /// Returns `None` when the cursor is outside every block, e.g. between two
    /// top-level rules or on a selector, and when the fragment does not parse.
    pub fn enclosing_rule<S: TextSource + ?Sized>(
        &self,
        document: &S,
        target: usize,
    ) -> Option<Node> {
        self.scan(document, target)?
            .enclosing_block(target)
            .cloned()
    }

    /// The deepest node at `target`; see [`Stylesheet::flat_node`].
    pub fn node_at<S: TextSource + ?Sized>(
        &self,
        document: &S,
        target: usize,
        include_boundary: bool,
    ) -> Option<Node> {
        self.scan(document, target)?
            .flat_node(target, include_boundary)
            .cloned()
    }
}

/// A half-open character range.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First character.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether `offset` lies within `[start, end]`.
    #[must_use]
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// What a [`Node`] is.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "type"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `selector { ... }`.
    Rule {
        /// The selector text, trimmed.
        selector: String,
    },
    /// `@name expression { ... }` or `@name expression;`.
    AtRule {
        /// Name without the `@`.
        name: String,
        /// Everything after the name, trimmed.
        expression: String,
    },
    /// `name: value`.
    Property {
        /// The property name, trimmed.
        name: String,
        /// The value, trimmed. Empty when there is no `:`.
        value: String,
        /// Where `value` sits in the document.
        value_span: Span,
    },
    /// `/* ... */`.
    Comment,
}

/// One parsed construct with absolute offsets.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// What this node is.
    #[cfg_attr(any(test, feature = "serde"), serde(flatten))]
    pub kind: NodeKind,
    /// From the first character of the node to just past its terminator.
    pub span: Span,
    /// The inside of the braces, for rules and block at-rules. Runs to the end
    /// of the fragment when the block is never closed.
    #[cfg_attr(
        any(test, feature = "serde"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub block: Option<Span>,
    /// Nested nodes.
    #[cfg_attr(
        any(test, feature = "serde"),
        serde(skip_serializing_if = "Vec::is_empty", default)
    )]
    pub children: Vec<Node>,
}

impl Node {
    /// First character of the node.
    #[must_use]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// One past the last character of the node.
    #[must_use]
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Whether this is a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment)
    }

    /// The selector of a rule.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Rule { selector } => Some(selector),
            _ => None,
        }
    }

    /// The direct child property called `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|child| matches!(&child.kind, NodeKind::Property { name: n, .. } if n == name))
    }

    /// Follows the last non-comment child down as far as it goes.
    #[must_use]
    pub fn deepest(&self) -> &Node {
        match self.children.iter().rev().find(|child| !child.is_comment()) {
            Some(child) => child.deepest(),
            None => self,
        }
    }

    /// Whether the node's braces contain `offset`.
    #[must_use]
    pub fn block_contains(&self, offset: usize) -> bool {
        self.block.is_some_and(|block| block.contains_inclusive(offset))
    }

    /// Whether two optional nodes cover the same range. Two absent nodes are
    /// the same.
    #[must_use]
    pub fn same(a: Option<&Node>, b: Option<&Node>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.span == b.span,
            _ => false,
        }
    }
}

/// The root of a parsed fragment.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    /// Top-level nodes.
    pub children: Vec<Node>,
    /// Length of the parsed input, padding included.
    pub len: usize,
}

impl Stylesheet {
    /// The deepest node around `offset`.
    ///
    /// A node matches when `start < offset < end`, or with
    /// `include_boundary` when `start <= offset <= end`.
    #[must_use]
    pub fn flat_node(&self, offset: usize, include_boundary: bool) -> Option<&Node> {
        fn find(children: &[Node], offset: usize, include_boundary: bool) -> Option<&Node> {
            children.iter().find_map(|child| {
                let inside = (child.start() < offset && offset < child.end())
                    || (include_boundary && child.start() <= offset && offset <= child.end());
                inside.then(|| find(&child.children, offset, include_boundary).unwrap_or(child))
            })
        }
        find(&self.children, offset, include_boundary)
    }

    /// The innermost rule or block at-rule whose braces contain `offset`.
    #[must_use]
    pub fn enclosing_block(&self, offset: usize) -> Option<&Node> {
        let mut found = None;
        let mut children = self.children.as_slice();
        while let Some(node) = children.iter().find(|child| child.block_contains(offset)) {
            found = Some(node);
            children = &node.children;
        }
        found
    }

    /// The siblings to act on when a selection runs from `first` to `second`,
    /// e.g. to comment them out together.
    ///
    /// Nodes that are not siblings are lifted to the highest ancestors that
    /// still keep them apart. Returns an empty list when either node is not
    /// part of this stylesheet.
    #[must_use]
    pub fn nodes_between<'s>(&'s self, first: &Node, second: &Node) -> Vec<&'s Node> {
        let (Some(mut first), Some(mut second)) = (self.path_to(first), self.path_to(second))
        else {
            return Vec::new();
        };
        if first == second {
            return self.node_at_path(&first).into_iter().collect();
        }

        let (Some(a), Some(b)) = (self.node_at_path(&first), self.node_at_path(&second)) else {
            return Vec::new();
        };
        if first[..first.len() - 1] != second[..second.len() - 1] {
            if b.start() < a.start() {
                return alloc::vec![b];
            }
            if b.start() < a.end() {
                return alloc::vec![a];
            }
            while first.len() > 1
                && self
                    .node_at_path(&first[..first.len() - 1])
                    .is_some_and(|parent| parent.end() < b.start())
            {
                first.pop();
            }
            let a_start = self.node_at_path(&first).map_or(0, Node::start);
            while second.len() > 1
                && self
                    .node_at_path(&second[..second.len() - 1])
                    .is_some_and(|parent| parent.start() > a_start)
            {
                second.pop();
            }
        }

        let Some((&index, parent)) = first.split_last() else {
            return Vec::new();
        };
        let siblings = match self.node_at_path(parent) {
            Some(node) => node.children.as_slice(),
            None => self.children.as_slice(),
        };
        let limit = self.node_at_path(&second).map_or(0, Node::end);
        siblings[index..]
            .iter()
            .take_while(|node| limit > node.start())
            .collect()
    }

    fn path_to(&self, target: &Node) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut children = self.children.as_slice();
        loop {
            let index = children
                .iter()
                .position(|child| child.start() <= target.start() && target.end() <= child.end())?;
            path.push(index);
            let child = &children[index];
            if child.span == target.span && child.kind == target.kind {
                return Some(path);
            }
            children = &child.children;
        }
    }

    fn node_at_path(&self, path: &[usize]) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get(first)?;
        for &index in rest {
            node = node.children.get(index)?;
        }
        Some(node)
    }
}
