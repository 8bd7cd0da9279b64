//! Raw parse tree
//!
//! The grammar does not build typed nodes. It tags what it matched with the
//! name of the rule that matched it, producing a tree of [`RawNode`]s that
//! mirrors the grammar. The normalizer (`crate::desugar`) turns that tree into
//! the typed AST.

use crate::location::Location;

use super::combinators::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    /// Name of the grammar rule that produced this node.
    pub label: &'static str,
    pub location: Location,
    /// Matched text, present on leaves only.
    pub text: Option<String>,
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn leaf(label: &'static str, span: Span) -> Self {
        Self {
            label,
            location: span.location,
            text: Some(span.text),
            children: vec![],
        }
    }

    pub fn branch(label: &'static str, location: Location, children: Vec<RawNode>) -> Self {
        Self {
            label,
            location,
            text: None,
            children,
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn child(&self, label: &str) -> Option<&RawNode> {
        self.children.iter().find(|child| child.label == label)
    }

    pub fn to_debug(&self, level: usize) -> Vec<(usize, String)> {
        let head = match &self.text {
            Some(text) => format!("{}@{} {:?}", self.label, self.location.to_debug(), text),
            None => format!("{}@{}", self.label, self.location.to_debug()),
        };

        let mut lines = vec![(level, head)];
        for child in &self.children {
            lines.extend(child.to_debug(level + 1));
        }
        lines
    }
}
