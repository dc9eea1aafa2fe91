//! Vertex in the property graph.

use serde::{Deserialize, Serialize};
use super::{property_map, ElementId, GraphElement, PropertyMap, Value};

/// A freestanding vertex. The identity is mirrored in `properties["_id"]`
/// so identity lookups go through the same path as any property lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: ElementId,
    pub label: String,
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(id: ElementId, label: impl Into<String>) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert(property_map::ID.to_string(), Value::String(id.0.clone()));
        Self { id, label: label.into(), properties }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl GraphElement for Vertex {
    fn id(&self) -> &ElementId { &self.id }
    fn label(&self) -> &str { &self.label }
    fn properties(&self) -> &PropertyMap { &self.properties }
}
