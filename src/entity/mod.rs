//! # Entities
//!
//! A [`Model`] describes how one domain type is laid out in the graph; a
//! [`Persisted`] type ties itself to its model and reads/writes its fields.
//! [`Entity`] is what reads produce: the domain value plus the identity and
//! provenance the backend and database assigned.
//!
//! ```text
//! Vertex { _id, _createdBy, _createdAt, name, tags }
//!     │ entity_converter::<Person>
//!     ▼
//! Entity<Person> { id, created_by, created_at, value: Person { name, tags } }
//! ```

pub mod model;
pub mod fields;

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::attachment::AttachmentStore;
use crate::mapping::{self, FixupRegistry, ScalarMapping};
use crate::model::{property_map, ElementId, GraphElement, Item};
use crate::traversal::Converter;
use crate::{Error, Result};

pub use model::{Model, ModelKind, ModelBuilder, FieldMapping};
pub use fields::{FieldReader, FieldWriter};

/// A domain type stored as one vertex or edge.
///
/// Implemented by hand or by generated code; the model is created once and
/// shared (`static` + `LazyLock` is the usual shape).
pub trait Persisted: Sized + Send + Sync + 'static {
    fn model() -> &'static Model;

    fn from_fields(fields: &FieldReader<'_>) -> Result<Self>;

    fn to_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()>;

    /// Move large binary content out to `store` before the value is mapped.
    fn externalize(self, _store: &dyn AttachmentStore) -> Result<Self> {
        Ok(self)
    }
}

/// A persisted domain value with its system-assigned identity and provenance.
#[derive(Debug, Clone)]
pub struct Entity<E> {
    id: ElementId,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_by: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    model: &'static Model,
    value: E,
}

impl<E> Entity<E> {
    pub fn id(&self) -> &ElementId { &self.id }
    pub fn created_by(&self) -> &str { &self.created_by }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_by(&self) -> Option<&str> { self.updated_by.as_deref() }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }
    pub fn model(&self) -> &'static Model { self.model }
    pub fn value(&self) -> &E { &self.value }
    pub fn into_inner(self) -> E { self.value }
}

impl<E> Deref for Entity<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.value
    }
}

impl<E: PartialEq> PartialEq for Entity<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.created_by == other.created_by
            && self.created_at == other.created_at
            && self.updated_by == other.updated_by
            && self.updated_at == other.updated_at
            && std::ptr::eq(self.model, other.model)
            && self.value == other.value
    }
}

impl<E: Persisted> Entity<E> {
    /// Materialize an entity from a graph element of `E`'s model.
    pub fn from_element(element: &dyn GraphElement, fixups: &FixupRegistry) -> Result<Self> {
        let model = E::model();
        if element.label() != model.label() {
            return Err(Error::Conversion(format!(
                "element {} is a {}, not a {}",
                element.id(),
                element.label(),
                model.label()
            )));
        }

        let props = element.properties();
        let created_by = fixups
            .resolve(&mapping::string())
            .to_domain(props.get(property_map::CREATED_BY))?;
        let created_at = fixups
            .resolve(&mapping::date())
            .to_domain(props.get(property_map::CREATED_AT))?;
        let updated_by = fixups
            .resolve(&mapping::StringMapping.optional())
            .to_domain(props.get(property_map::UPDATED_BY))?;
        let updated_at = fixups
            .resolve(&mapping::DateMapping.optional())
            .to_domain(props.get(property_map::UPDATED_AT))?;

        let value = E::from_fields(&FieldReader::new(model, props, fixups))?;

        Ok(Self {
            id: element.id().clone(),
            created_by,
            created_at,
            updated_by,
            updated_at,
            model,
            value,
        })
    }
}

/// Converter turning traversal items of `E`'s model into entities.
pub fn entity_converter<E: Persisted>(fixups: Arc<FixupRegistry>) -> Converter<Entity<E>> {
    Arc::new(move |item: Item| match item.as_element() {
        Some(element) => Entity::<E>::from_element(element, &fixups),
        None => Err(Error::Conversion(format!(
            "expected a {} element, got a {}",
            E::model().label(),
            item.kind_name()
        ))),
    })
}
