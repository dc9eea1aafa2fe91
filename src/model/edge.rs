//! Edge in the property graph.

use serde::{Deserialize, Serialize};
use super::{property_map, ElementId, GraphElement, PropertyMap, Value};

/// A directed, labelled edge between two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub label: String,
    pub from: ElementId,
    pub to: ElementId,
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(id: ElementId, label: impl Into<String>, from: ElementId, to: ElementId) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert(property_map::ID.to_string(), Value::String(id.0.clone()));
        Self { id, label: label.into(), from, to, properties }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The "other" end of the edge from the given vertex.
    pub fn other_vertex(&self, from: &ElementId) -> Option<&ElementId> {
        if *from == self.from { Some(&self.to) }
        else if *from == self.to { Some(&self.from) }
        else { None }
    }
}

impl GraphElement for Edge {
    fn id(&self) -> &ElementId { &self.id }
    fn label(&self) -> &str { &self.label }
    fn properties(&self) -> &PropertyMap { &self.properties }
}
