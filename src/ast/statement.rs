use crate::location::Location;

use super::{BlockBody, Node, Reference};

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub location: Location,
}

/// `target = value`, where target is a reference or a property.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Box<Node>,
    pub value: Box<Node>,
    pub location: Location,
}

/// Both `if` and `unless`; the latter arrives with its branches swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Box<Node>,
    pub true_body: BlockBody,
    pub false_body: BlockBody,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub subject: Box<Node>,
    pub cases: Vec<Case>,
    pub else_block: Option<Else>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub matchers: Vec<Node>,
    pub body: BlockBody,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub body: BlockBody,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Try {
    pub body: BlockBody,
    pub catches: Vec<Catch>,
    pub finally: Option<Finally>,
    pub location: Location,
}

/// `catch (e) {...}` catches anything; `catch (Type e) {...}` only values
/// of that class (or equal to that value).
#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub matcher: Option<Reference>,
    pub binding: Reference,
    pub body: BlockBody,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finally {
    pub body: BlockBody,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Throw {
    pub payload: Box<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub payload: Option<Box<Node>>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    pub payload: Option<Box<Node>>,
    pub location: Location,
}
