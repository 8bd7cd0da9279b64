//! Debug traces
//!
//! Every node renders to an ordered list of `(level, line)` pairs, one line
//! per node, children one level deeper than their parent. [`render`] turns
//! such a trace into text indented with one tab per level.

use super::*;

pub type Trace = Vec<(usize, String)>;

/// Indent every line by `level` tabs.
pub fn render(trace: &[(usize, String)]) -> String {
    trace
        .iter()
        .map(|(level, line)| format!("{}{line}\n", "\t".repeat(*level)))
        .collect()
}

fn head(kind: &str, location: &Location) -> String {
    format!("{kind}@{}", location.to_debug())
}

fn with_payload(kind: &str, location: &Location, payload: impl std::fmt::Display) -> String {
    format!("{} ({payload})", head(kind, location))
}

fn nested(level: usize, nodes: &[Node]) -> Trace {
    nodes.iter().flat_map(|node| node.debug_trace(level)).collect()
}

fn characters(characters: &[Character]) -> String {
    characters.iter().map(|c| c.data).collect()
}

impl Module {
    pub fn debug_trace(&self, level: usize) -> Trace {
        let mut trace = vec![(level, head("Module", &self.location))];
        trace.extend(nested(level + 1, &self.statements));
        trace
    }
}

impl BlockBody {
    pub fn debug_trace(&self, level: usize) -> Trace {
        let mut trace = vec![(level, head("BlockBody", &self.location))];
        trace.extend(nested(level + 1, &self.statements));
        trace
    }
}

impl Lambda {
    pub fn debug_trace(&self, level: usize) -> Trace {
        let keyword = match self.keyword {
            LambdaKeyword::DashRocket => "->",
            LambdaKeyword::Lambda => "lambda",
        };
        let mut trace = vec![(level, with_payload("Lambda", &self.location, keyword))];
        trace.extend(nested(level + 1, &self.parameters));
        trace.extend(self.body.debug_trace(level + 1));
        trace
    }
}

impl KeyValue {
    pub fn debug_trace(&self, level: usize) -> Trace {
        let mut trace = vec![(level, head("KeyValue", &self.location))];
        trace.extend(self.key.debug_trace(level + 1));
        trace.extend(self.value.debug_trace(level + 1));
        trace
    }
}

impl Node {
    pub fn debug_trace(&self, level: usize) -> Trace {
        let kind = self.kind();
        let location = self.location();

        match self {
            Node::Comment(node) => vec![(level, with_payload(kind, location, &node.text))],
            Node::Reference(node) => vec![(level, with_payload(kind, location, &node.name))],
            Node::Integer(node) => vec![(level, with_payload(kind, location, &node.data))],
            Node::Decimal(node) => vec![(level, with_payload(kind, location, &node.data))],
            Node::Character(node) => vec![(level, with_payload(kind, location, node.data))],
            Node::String(node) => vec![(
                level,
                with_payload(kind, location, characters(&node.characters)),
            )],
            Node::RegularExpression(node) => vec![(
                level,
                with_payload(kind, location, characters(&node.pattern)),
            )],
            Node::Interpolation(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(nested(level + 1, &node.body));
                trace
            }
            Node::KeyValue(node) => node.debug_trace(level),
            Node::Range(node) => {
                let payload = if node.exclusive { "..." } else { ".." };
                let mut trace = vec![(level, with_payload(kind, location, payload))];
                trace.extend(node.start.debug_trace(level + 1));
                trace.extend(node.end.debug_trace(level + 1));
                trace
            }
            Node::List(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(nested(level + 1, &node.items));
                trace
            }
            Node::Map(node) => {
                let mut trace = vec![(level, head(kind, location))];
                for pair in &node.pairs {
                    trace.extend(pair.debug_trace(level + 1));
                }
                trace
            }
            Node::Assignment(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(node.target.debug_trace(level + 1));
                trace.extend(node.value.debug_trace(level + 1));
                trace
            }
            Node::Property(node) => {
                let mut trace = vec![(level, with_payload(kind, location, &node.name))];
                trace.extend(node.object.debug_trace(level + 1));
                trace
            }
            Node::Invocation(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(node.callable.debug_trace(level + 1));
                trace.extend(nested(level + 1, &node.arguments));
                trace
            }
            Node::Lambda(node) => node.debug_trace(level),
            Node::Overloads(node) => {
                let mut trace = vec![(level, head(kind, location))];
                for overload in &node.overloads {
                    trace.extend(overload.debug_trace(level + 1));
                }
                trace
            }
            Node::Class(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(nested(level + 1, &node.ancestors));
                trace.extend(node.body.debug_trace(level + 1));
                trace
            }
            Node::BlockBody(node) => node.debug_trace(level),
            Node::If(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(node.condition.debug_trace(level + 1));
                trace.extend(node.true_body.debug_trace(level + 1));
                trace.extend(node.false_body.debug_trace(level + 1));
                trace
            }
            Node::Switch(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(node.subject.debug_trace(level + 1));
                for case in &node.cases {
                    trace.push((level + 1, head("Case", &case.location)));
                    trace.extend(nested(level + 2, &case.matchers));
                    trace.extend(case.body.debug_trace(level + 2));
                }
                if let Some(else_block) = &node.else_block {
                    trace.push((level + 1, head("Else", &else_block.location)));
                    trace.extend(else_block.body.debug_trace(level + 2));
                }
                trace
            }
            Node::Try(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(node.body.debug_trace(level + 1));
                for catch in &node.catches {
                    let payload = match &catch.matcher {
                        Some(matcher) => format!("{} {}", matcher.name, catch.binding.name),
                        None => catch.binding.name.clone(),
                    };
                    trace.push((level + 1, with_payload("Catch", &catch.location, payload)));
                    trace.extend(catch.body.debug_trace(level + 2));
                }
                if let Some(finally) = &node.finally {
                    trace.push((level + 1, head("Finally", &finally.location)));
                    trace.extend(finally.body.debug_trace(level + 2));
                }
                trace
            }
            Node::Throw(node) => {
                let mut trace = vec![(level, head(kind, location))];
                trace.extend(node.payload.debug_trace(level + 1));
                trace
            }
            Node::Return(Return { payload, .. }) | Node::Exit(Exit { payload, .. }) => {
                let mut trace = vec![(level, head(kind, location))];
                if let Some(payload) = payload {
                    trace.extend(payload.debug_trace(level + 1));
                }
                trace
            }
        }
    }
}
