//! Typed syntax tree
//!
//! Produced by the normalizer (`crate::desugar`) from the raw parse tree.
//! Surface sugar is already gone by the time a tree exists: infix operators
//! are property invocations, `unless` is an [`If`] and interpolated strings are
//! concatenations. Every node carries the [`Location`] of its first character,
//! except for desugared operator calls which sit at their operator token.
//!
//! Trees compare structurally (locations included), so parsing the same
//! source twice yields equal trees.

pub mod debug;
pub mod expression;
pub mod statement;

pub use expression::*;
pub use statement::*;

use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Comment(Comment),
    Reference(Reference),
    Integer(Integer),
    Decimal(Decimal),
    Character(Character),
    String(StringLiteral),
    RegularExpression(RegularExpression),
    Interpolation(Interpolation),
    KeyValue(KeyValue),
    Range(Range),
    List(List),
    Map(Map),
    Assignment(Assignment),
    Property(Property),
    Invocation(Invocation),
    Lambda(Lambda),
    Overloads(Overloads),
    Class(Class),
    BlockBody(BlockBody),
    If(If),
    Switch(Switch),
    Try(Try),
    Throw(Throw),
    Return(Return),
    Exit(Exit),
}

impl Node {
    pub fn location(&self) -> &Location {
        match self {
            Node::Comment(node) => &node.location,
            Node::Reference(node) => &node.location,
            Node::Integer(node) => &node.location,
            Node::Decimal(node) => &node.location,
            Node::Character(node) => &node.location,
            Node::String(node) => &node.location,
            Node::RegularExpression(node) => &node.location,
            Node::Interpolation(node) => &node.location,
            Node::KeyValue(node) => &node.location,
            Node::Range(node) => &node.location,
            Node::List(node) => &node.location,
            Node::Map(node) => &node.location,
            Node::Assignment(node) => &node.location,
            Node::Property(node) => &node.location,
            Node::Invocation(node) => &node.location,
            Node::Lambda(node) => &node.location,
            Node::Overloads(node) => &node.location,
            Node::Class(node) => &node.location,
            Node::BlockBody(node) => &node.location,
            Node::If(node) => &node.location,
            Node::Switch(node) => &node.location,
            Node::Try(node) => &node.location,
            Node::Throw(node) => &node.location,
            Node::Return(node) => &node.location,
            Node::Exit(node) => &node.location,
        }
    }

    /// Short kind name used in debug traces and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Comment(_) => "Comment",
            Node::Reference(_) => "Reference",
            Node::Integer(_) => "Integer",
            Node::Decimal(_) => "Decimal",
            Node::Character(_) => "Character",
            Node::String(_) => "String",
            Node::RegularExpression(_) => "RegularExpression",
            Node::Interpolation(_) => "Interpolation",
            Node::KeyValue(_) => "KeyValue",
            Node::Range(_) => "Range",
            Node::List(_) => "List",
            Node::Map(_) => "Map",
            Node::Assignment(_) => "Assignment",
            Node::Property(_) => "Property",
            Node::Invocation(_) => "Invocation",
            Node::Lambda(_) => "Lambda",
            Node::Overloads(_) => "Overloads",
            Node::Class(_) => "Class",
            Node::BlockBody(_) => "BlockBody",
            Node::If(_) => "If",
            Node::Switch(_) => "Switch",
            Node::Try(_) => "Try",
            Node::Throw(_) => "Throw",
            Node::Return(_) => "Return",
            Node::Exit(_) => "Exit",
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Comment(_))
    }
}

/// A whole source file: the top-level statements in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub statements: Vec<Node>,
    pub location: Location,
}

/// The statements between a pair of braces.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockBody {
    pub statements: Vec<Node>,
    pub location: Location,
}

impl BlockBody {
    pub fn empty(location: Location) -> Self {
        Self {
            statements: vec![],
            location,
        }
    }
}
