//! Typed field access on raw properties, driven by a model's field table.

use std::collections::HashMap;

use crate::attachment::AttachmentStore;
use crate::mapping::FixupRegistry;
use crate::model::{PropertyMap, Value};
use crate::{Error, Result};
use super::Model;

fn in_field(model: &Model, field: &str, error: Error) -> Error {
    match error {
        Error::Conversion(msg) => Error::Conversion(format!("{}.{field}: {msg}", model.label())),
        other => other,
    }
}

/// Reads declared fields out of an element's properties.
pub struct FieldReader<'a> {
    model: &'a Model,
    properties: &'a PropertyMap,
    fixups: &'a FixupRegistry,
}

impl<'a> FieldReader<'a> {
    pub fn new(model: &'a Model, properties: &'a PropertyMap, fixups: &'a FixupRegistry) -> Self {
        Self { model, properties, fixups }
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    /// Decode `field` as `D`, which must be the field's declared domain type
    /// (`Option<T>`, `Vec<T>`, `HashSet<T>` for non-single cardinalities).
    pub fn get<D: 'static>(&self, field: &str) -> Result<D> {
        let declared = self.model.typed_field::<D>(field)?;
        self.fixups
            .resolve(declared)
            .to_domain(self.properties.get(field))
            .map_err(|e| in_field(self.model, field, e))
    }
}

/// Collects encoded field values for a create or a partial update.
///
/// A field whose value encodes to nothing (an empty optional) is recorded
/// as a removal.
pub struct FieldWriter<'a> {
    model: &'a Model,
    fixups: &'a FixupRegistry,
    attachments: Option<&'a dyn AttachmentStore>,
    entries: HashMap<String, Option<Value>>,
}

impl<'a> FieldWriter<'a> {
    pub fn new(model: &'a Model, fixups: &'a FixupRegistry) -> Self {
        Self { model, fixups, attachments: None, entries: HashMap::new() }
    }

    pub fn with_attachments(mut self, store: Option<&'a dyn AttachmentStore>) -> Self {
        self.attachments = store;
        self
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    pub fn set<D: 'static>(&mut self, field: &str, value: &D) -> Result<()> {
        let declared = self.model.typed_field::<D>(field)?;
        let encoded = self.fixups.resolve(declared).to_graph_opt(value);
        self.entries.insert(field.to_string(), encoded);
        Ok(())
    }

    /// Hand `content` to the attachment store and set `field` to the
    /// reference it returns, encoded through the field's declared mapping.
    ///
    /// `field` must be declared as `String` or `Option<String>`; nothing is
    /// stored otherwise.
    pub fn attach(&mut self, field: &str, content: &[u8]) -> Result<()> {
        let optional = self.model.typed_field::<Option<String>>(field).is_ok();
        if !optional {
            self.model.typed_field::<String>(field)?;
        }
        let store = self.attachments.ok_or_else(|| {
            Error::Config(format!("{}.{field}: no attachment store configured", self.model.label()))
        })?;
        let reference = store.store(content)?;
        if optional {
            self.set(field, &Some(reference))
        } else {
            self.set(field, &reference)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Properties to write; removals are dropped.
    pub fn into_properties(self) -> PropertyMap {
        self.entries
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }

    /// Split into properties to write and property names to remove.
    pub fn into_changes(self) -> (PropertyMap, Vec<String>) {
        let mut set = PropertyMap::new();
        let mut removed = Vec::new();
        for (key, value) in self.entries {
            match value {
                Some(value) => {
                    set.insert(key, value);
                }
                None => removed.push(key),
            }
        }
        (set, removed)
    }
}
