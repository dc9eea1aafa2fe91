//! Model descriptors: label, field table and indexes of one domain type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::index::{IndexSpec, IndexType};
use crate::mapping::{Mapping, Signature};
use crate::model::property_map;
use crate::{Error, Result};

// ============================================================================
// FieldMapping
// ============================================================================

/// A field's mapping with its domain type erased.
///
/// The concrete mapping is kept as `Arc<dyn Mapping<Domain = D>>` and
/// recovered by [`FieldMapping::typed`] for the matching `D`.
#[derive(Clone)]
pub struct FieldMapping {
    signature: Signature,
    erased: Arc<dyn Any + Send + Sync>,
}

impl FieldMapping {
    pub fn new<M: Mapping>(mapping: M) -> Self {
        let signature = mapping.signature();
        let typed: Arc<dyn Mapping<Domain = M::Domain>> = Arc::new(mapping);
        Self { signature, erased: Arc::new(typed) }
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// The mapping, if its domain type is `D`.
    pub fn typed<D: 'static>(&self) -> Option<&dyn Mapping<Domain = D>> {
        self.erased
            .downcast_ref::<Arc<dyn Mapping<Domain = D>>>()
            .map(|m| &**m)
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldMapping({})", self.signature)
    }
}

// ============================================================================
// Model
// ============================================================================

/// Vertex or edge; edges carry the labels of their endpoint models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKind {
    Vertex,
    Edge { from_label: String, to_label: String },
}

/// Static descriptor of one domain type. Built once, never mutated.
#[derive(Debug)]
pub struct Model {
    label: String,
    kind: ModelKind,
    fields: Vec<(String, FieldMapping)>,
    indexes: Vec<IndexSpec>,
}

impl Model {
    /// Start a freestanding vertex model.
    pub fn vertex(label: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(label.into(), ModelKind::Vertex)
    }

    /// Start an edge model connecting two vertex models.
    pub fn edge(label: impl Into<String>, from: &Model, to: &Model) -> ModelBuilder {
        let mut builder = ModelBuilder::new(
            label.into(),
            ModelKind::Edge {
                from_label: from.label.clone(),
                to_label: to.label.clone(),
            },
        );
        for endpoint in [from, to] {
            if !endpoint.is_vertex() {
                builder.problems.push(format!("endpoint {} is not a vertex model", endpoint.label));
            }
        }
        builder
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self.kind, ModelKind::Vertex)
    }

    pub fn is_edge(&self) -> bool {
        !self.is_vertex()
    }

    pub fn from_label(&self) -> Option<&str> {
        match &self.kind {
            ModelKind::Edge { from_label, .. } => Some(from_label),
            ModelKind::Vertex => None,
        }
    }

    pub fn to_label(&self) -> Option<&str> {
        match &self.kind {
            ModelKind::Edge { to_label, .. } => Some(to_label),
            ModelKind::Vertex => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldMapping)> {
        self.fields.iter().map(|(name, mapping)| (name.as_str(), mapping))
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }

    pub fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }

    /// Mapping of `field`, checked against the requested domain type.
    pub(crate) fn typed_field<D: 'static>(&self, field: &str) -> Result<&dyn Mapping<Domain = D>> {
        let mapping = self.field(field).ok_or_else(|| {
            Error::Conversion(format!("{} has no field {field}", self.label))
        })?;
        mapping.typed::<D>().ok_or_else(|| {
            Error::Conversion(format!(
                "{}.{field} is declared as {}, not {}",
                self.label,
                mapping.signature(),
                std::any::type_name::<D>()
            ))
        })
    }
}

// ============================================================================
// ModelBuilder
// ============================================================================

/// Collects a model declaration; `build()` validates it.
#[derive(Debug)]
pub struct ModelBuilder {
    label: String,
    kind: ModelKind,
    fields: Vec<(String, FieldMapping)>,
    indexes: Vec<IndexSpec>,
    problems: Vec<String>,
}

impl ModelBuilder {
    fn new(label: String, kind: ModelKind) -> Self {
        Self { label, kind, fields: Vec::new(), indexes: Vec::new(), problems: Vec::new() }
    }

    pub fn field<M: Mapping>(mut self, name: impl Into<String>, mapping: M) -> Self {
        self.fields.push((name.into(), FieldMapping::new(mapping)));
        self
    }

    pub fn index<I, S>(mut self, index_type: IndexType, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.push(IndexSpec::new(index_type, properties));
        self
    }

    /// Validate and freeze the model.
    ///
    /// Rejects empty labels, duplicate or reserved field names, indexes over
    /// undeclared properties and edges whose endpoints are not vertex models.
    pub fn build(self) -> Result<Model> {
        let mut problems = self.problems;

        if self.label.is_empty() {
            problems.push("label must not be empty".into());
        }
        for (i, (name, _)) in self.fields.iter().enumerate() {
            if property_map::is_reserved(name) {
                problems.push(format!("field {name} uses a reserved property name"));
            }
            if self.fields[..i].iter().any(|(other, _)| other == name) {
                problems.push(format!("field {name} declared twice"));
            }
        }
        for index in &self.indexes {
            if index.properties.is_empty() {
                problems.push(format!("{:?} index without properties", index.index_type));
            }
            for property in &index.properties {
                let declared = property == property_map::ID
                    || self.fields.iter().any(|(name, _)| name == property);
                if !declared {
                    problems.push(format!("index on undeclared field {property}"));
                }
            }
        }

        if !problems.is_empty() {
            return Err(Error::Config(format!(
                "invalid model {}: {}",
                self.label,
                problems.join("; ")
            )));
        }

        Ok(Model {
            label: self.label,
            kind: self.kind,
            fields: self.fields,
            indexes: self.indexes,
        })
    }
}
