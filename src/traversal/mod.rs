//! # Traversals
//!
//! A [`Traversal`] pairs a [`Pipeline`] (what to fetch) with a [`Converter`]
//! (how to turn each raw [`Item`] into a domain value). Nothing touches the
//! backend until a terminal operation runs; every terminal re-runs the
//! pipeline from its start, so a traversal can be read any number of times.
//!
//! ```text
//! db.vertices::<Person>(&tx)        Start::Vertices(Some("Person"))
//!     .has("name", "Ada")           + Step::Has
//!     .out_vertices::<Company>(..)  + Step::Out, Step::HasLabel   (retyped)
//!     .get_at_most_one()            ── execute ── convert ──▶ Option<Entity<Company>>
//! ```

pub mod pipeline;

use std::fmt;
use std::sync::Arc;

use crate::entity::{entity_converter, Entity, Persisted};
use crate::mapping::{FixupRegistry, Mapping, Signature};
use crate::model::{ElementId, Item, Value};
use crate::storage::StorageBackend;
use crate::{Error, Result};

pub use pipeline::{Pipeline, Start, Step};

/// Turns one raw traversal item into a domain value. Shared by every fork of
/// a traversal.
pub type Converter<D> = Arc<dyn Fn(Item) -> Result<D> + Send + Sync>;

// ============================================================================
// Result cardinality
// ============================================================================

/// The single element of `items`.
///
/// Zero or several elements mean the query was wrong, not that data is
/// missing, so both are `Error::Internal`.
pub fn only_one_of<T>(items: impl IntoIterator<Item = T>) -> Result<T> {
    let mut iter = items.into_iter();
    match (iter.next(), iter.next()) {
        (Some(item), None) => Ok(item),
        (None, _) => Err(Error::Internal("no element found".into())),
        (Some(_), Some(_)) => Err(Error::Internal("too many elements".into())),
    }
}

/// The element of `items`, if any. Several elements are `Error::Internal`.
pub fn at_most_one_of<T>(items: impl IntoIterator<Item = T>) -> Result<Option<T>> {
    let mut iter = items.into_iter();
    match (iter.next(), iter.next()) {
        (item, None) => Ok(item),
        (Some(_), Some(_)) | (None, Some(_)) => {
            Err(Error::Internal("too many elements".into()))
        }
    }
}

fn value_converter<M: Mapping>(mapping: M, fixups: Arc<FixupRegistry>) -> Converter<M::Domain> {
    Arc::new(move |item: Item| match item {
        Item::Value(value) => fixups.resolve(&mapping).to_domain(Some(&value)),
        other => Err(Error::Conversion(format!(
            "expected a property value, got a {}",
            other.kind_name()
        ))),
    })
}

// ============================================================================
// Traversal
// ============================================================================

/// A lazy query bound to one open transaction.
///
/// Not meant to be shared between threads; fork it with `clone()` instead.
pub struct Traversal<'a, B: StorageBackend, D> {
    backend: &'a B,
    tx: &'a B::Tx,
    fixups: Arc<FixupRegistry>,
    pipeline: Pipeline,
    converter: Converter<D>,
    /// Set when the output was produced by a declared mapping (see `values`).
    signature: Option<Signature>,
}

impl<B: StorageBackend, D> Clone for Traversal<'_, B, D> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend,
            tx: self.tx,
            fixups: Arc::clone(&self.fixups),
            pipeline: self.pipeline.clone(),
            converter: Arc::clone(&self.converter),
            signature: self.signature,
        }
    }
}

impl<B: StorageBackend, D> fmt::Debug for Traversal<'_, B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("pipeline", &self.pipeline)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<'a, B: StorageBackend> Traversal<'a, B, Item> {
    /// Untyped traversal yielding raw items.
    pub fn items(backend: &'a B, tx: &'a B::Tx, fixups: Arc<FixupRegistry>, start: Start) -> Self {
        let identity: Converter<Item> = Arc::new(|item: Item| -> Result<Item> { Ok(item) });
        Self::new(backend, tx, fixups, Pipeline::new(start), identity)
    }
}

impl<'a, B: StorageBackend, E: Persisted> Traversal<'a, B, Entity<E>> {
    /// Traversal materializing the results of `pipeline` as entities of `E`.
    pub fn entities(backend: &'a B, tx: &'a B::Tx, fixups: Arc<FixupRegistry>, pipeline: Pipeline) -> Self {
        let converter = entity_converter::<E>(Arc::clone(&fixups));
        Self::new(backend, tx, fixups, pipeline, converter)
    }
}

impl<'a, B: StorageBackend, D: 'static> Traversal<'a, B, D> {
    pub fn new(
        backend: &'a B,
        tx: &'a B::Tx,
        fixups: Arc<FixupRegistry>,
        pipeline: Pipeline,
        converter: Converter<D>,
    ) -> Self {
        Self { backend, tx, fixups, pipeline, converter, signature: None }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Signature of the mapping that produces this traversal's output, if any.
    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    /// Same converter over a different pipeline.
    pub fn new_instance(&self, pipeline: Pipeline) -> Self {
        Self { pipeline, ..self.clone() }
    }

    fn then(mut self, step: Step) -> Self {
        self.pipeline = self.pipeline.then(step);
        self
    }

    fn retyped<D2: 'static>(
        self,
        steps: impl IntoIterator<Item = Step>,
        converter: Converter<D2>,
        signature: Option<Signature>,
    ) -> Traversal<'a, B, D2> {
        let pipeline = steps.into_iter().fold(self.pipeline, Pipeline::then);
        Traversal {
            backend: self.backend,
            tx: self.tx,
            fixups: self.fixups,
            pipeline,
            converter,
            signature,
        }
    }

    fn into_entities<E: Persisted>(self, steps: impl IntoIterator<Item = Step>) -> Traversal<'a, B, Entity<E>> {
        let converter = entity_converter::<E>(Arc::clone(&self.fixups));
        self.retyped(steps, converter, None)
    }

    // ========================================================================
    // Converter-preserving steps
    // ========================================================================

    /// Keep elements whose `key` equals the stored primitive `value`.
    ///
    /// No mapping or fix-up is applied; use [`has_mapped`](Self::has_mapped)
    /// to filter on domain values.
    pub fn has(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.then(Step::Has(key.into(), value.into()))
    }

    /// Keep elements whose `key` holds `value` as `mapping` stores it on this
    /// backend. A value that encodes to nothing matches elements without `key`.
    pub fn has_mapped<M: Mapping>(self, key: impl Into<String>, value: &M::Domain, mapping: M) -> Self {
        let key = key.into();
        let encoded = self.fixups.resolve(&mapping).to_graph_opt(value);
        match encoded {
            Some(encoded) => self.then(Step::Has(key, encoded)),
            None => self.then(Step::HasNot(key)),
        }
    }

    pub fn has_not(self, key: impl Into<String>) -> Self {
        self.then(Step::HasNot(key.into()))
    }

    pub fn has_id(self, id: &ElementId) -> Self {
        self.then(Step::HasId(id.clone()))
    }

    pub fn has_label(self, label: impl Into<String>) -> Self {
        self.then(Step::HasLabel(label.into()))
    }

    pub fn dedup(self) -> Self {
        self.then(Step::Dedup)
    }

    pub fn limit(self, n: usize) -> Self {
        self.then(Step::Range(0, n))
    }

    pub fn range(self, low: usize, high: usize) -> Self {
        self.then(Step::Range(low, high))
    }

    // ========================================================================
    // Type-changing steps
    // ========================================================================

    /// Vertices of `E` reached over outgoing edges (optionally of one label).
    pub fn out_vertices<E: Persisted>(self, edge_label: Option<&str>) -> Traversal<'a, B, Entity<E>> {
        let target = E::model().label().to_string();
        self.into_entities([Step::Out(edge_label.map(str::to_string)), Step::HasLabel(target)])
    }

    /// Vertices of `E` reached over incoming edges.
    pub fn in_vertices<E: Persisted>(self, edge_label: Option<&str>) -> Traversal<'a, B, Entity<E>> {
        let target = E::model().label().to_string();
        self.into_entities([Step::In(edge_label.map(str::to_string)), Step::HasLabel(target)])
    }

    /// Outgoing edges of model `E`.
    pub fn out_edges<E: Persisted>(self) -> Traversal<'a, B, Entity<E>> {
        let label = E::model().label().to_string();
        self.into_entities([Step::OutE(Some(label))])
    }

    /// Incoming edges of model `E`.
    pub fn in_edges<E: Persisted>(self) -> Traversal<'a, B, Entity<E>> {
        let label = E::model().label().to_string();
        self.into_entities([Step::InE(Some(label))])
    }

    /// Source vertex of each edge, kept if it is an `E`.
    pub fn from_vertex<E: Persisted>(self) -> Traversal<'a, B, Entity<E>> {
        let label = E::model().label().to_string();
        self.into_entities([Step::OutV, Step::HasLabel(label)])
    }

    /// Target vertex of each edge, kept if it is an `E`.
    pub fn to_vertex<E: Persisted>(self) -> Traversal<'a, B, Entity<E>> {
        let label = E::model().label().to_string();
        self.into_entities([Step::InV, Step::HasLabel(label)])
    }

    /// Property values decoded with `mapping`. Elements without the property
    /// are skipped.
    pub fn values<M: Mapping>(self, key: impl Into<String>, mapping: M) -> Traversal<'a, B, M::Domain> {
        let signature = mapping.signature();
        let converter = value_converter(mapping, Arc::clone(&self.fixups));
        self.retyped([Step::Values(key.into())], converter, Some(signature))
    }

    /// Reinterpret the output through `mapping`.
    ///
    /// `None` unless this traversal's output came from a mapping compatible
    /// with `mapping`.
    pub fn cast<M: Mapping>(&self, mapping: M) -> Option<Traversal<'a, B, M::Domain>> {
        let current = self.signature?;
        if !mapping.is_compatible_with(&current) {
            return None;
        }
        let signature = mapping.signature();
        let converter = value_converter(mapping, Arc::clone(&self.fixups));
        Some(self.clone().retyped([], converter, Some(signature)))
    }

    // ========================================================================
    // Terminals
    // ========================================================================

    fn matches(&self) -> Result<Vec<Item>> {
        let items = self.pipeline.execute(self.backend, self.tx)?;
        tracing::trace!(steps = self.pipeline.steps().len(), matches = items.len(), "traversal executed");
        Ok(items)
    }

    fn convert(&self, item: Item) -> Result<D> {
        (self.converter)(item)
    }

    pub fn to_list(&self) -> Result<Vec<D>> {
        self.matches()?.into_iter().map(|item| self.convert(item)).collect()
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.matches()?.len())
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.clone().limit(1).count()? > 0)
    }

    pub fn head_option(&self) -> Result<Option<D>> {
        self.matches()?.into_iter().next().map(|item| self.convert(item)).transpose()
    }

    /// Exactly one result; see [`only_one_of`].
    pub fn get_only_one(&self) -> Result<D> {
        self.convert(only_one_of(self.matches()?)?)
    }

    /// Zero or one result; see [`at_most_one_of`].
    pub fn get_at_most_one(&self) -> Result<Option<D>> {
        at_most_one_of(self.matches()?)?.map(|item| self.convert(item)).transpose()
    }
}
