use crate::location::Location;

use super::{BlockBody, Node};

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: String,
    pub location: Location,
}

/// Integer literal as written, sign and `_` grouping included.
#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    pub data: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decimal {
    pub data: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub data: char,
    pub location: Location,
}

/// A string is a sequence of characters, each with its own location.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub characters: Vec<Character>,
    pub location: Location,
}

impl StringLiteral {
    pub fn text(&self) -> String {
        self.characters.iter().map(|c| c.data).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegularExpression {
    pub pattern: Vec<Character>,
    pub location: Location,
}

impl RegularExpression {
    pub fn text(&self) -> String {
        self.pattern.iter().map(|c| c.data).collect()
    }
}

/// `#{...}` inside a string or regular expression: evaluates its body and
/// yields the last value converted with `to_string`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    pub body: Vec<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: Box<Node>,
    pub value: Box<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Box<Node>,
    pub end: Box<Node>,
    pub exclusive: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub items: Vec<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub pairs: Vec<KeyValue>,
    pub location: Location,
}

/// `object.name`
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub object: Box<Node>,
    pub name: String,
    pub location: Location,
}

/// `callable(arguments...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub callable: Box<Node>,
    pub arguments: Vec<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LambdaKeyword {
    /// `->`
    DashRocket,
    /// `lambda` or `λ`
    Lambda,
}

/// A single-overload lambda literal.
///
/// Parameters are references (bindings) or literals (matchers compared by
/// value equality at dispatch time).
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub keyword: LambdaKeyword,
    pub parameters: Vec<Node>,
    pub body: BlockBody,
    pub location: Location,
}

/// `=> { -> (a) {...} -> (b) {...} }`: one lambda with several overloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Overloads {
    pub overloads: Vec<Lambda>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub ancestors: Vec<Node>,
    pub body: BlockBody,
    pub location: Location,
}
