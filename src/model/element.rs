//! Identity and the shared element contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Edge, PropertyMap, Value, Vertex};

/// Opaque, backend-assigned element identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Anything that carries an identity, a label and properties.
pub trait GraphElement {
    fn id(&self) -> &ElementId;
    fn label(&self) -> &str;
    fn properties(&self) -> &PropertyMap;

    fn get(&self, key: &str) -> Option<&Value> {
        self.properties().get(key)
    }
}

/// One item flowing through a traversal pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Vertex(Vertex),
    Edge(Edge),
    Value(Value),
}

impl Item {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Item::Vertex(_) => "vertex",
            Item::Edge(_) => "edge",
            Item::Value(_) => "value",
        }
    }

    /// The element view of this item, if it is a vertex or an edge.
    pub fn as_element(&self) -> Option<&dyn GraphElement> {
        match self {
            Item::Vertex(v) => Some(v),
            Item::Edge(e) => Some(e),
            Item::Value(_) => None,
        }
    }
}
