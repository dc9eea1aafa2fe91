//! # Database
//!
//! Owns one storage backend and serializes every access to it through a
//! single reentrant lock. Transactions are retried according to
//! [`DatabaseConfig`]; each attempt runs in a fresh storage transaction.
//!
//! ```text
//! transaction(body)
//!   lock ─▶ attempt 1: begin ─ body ─ commit ──ok──▶ return
//!                        └── err ─ rollback (logged) ─┐
//!           attempt 2 ◀──── retryable and not exhausted
//!           ...
//!           last error ──────────────────────────────▶ return unchanged
//! ```
//!
//! Transactions do not nest: a body that calls `transaction` again on the
//! same thread gets `Error::Tx` and should use the `tx` it was handed.

mod property;
mod schema;

use std::cell::Cell;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::ReentrantMutex;

use crate::attachment::AttachmentStore;
use crate::config::DatabaseConfig;
use crate::entity::{Entity, FieldWriter, Persisted};
use crate::mapping::{self, FixupRegistry, Mapping};
use crate::model::{property_map, ElementId, Item, PropertyMap, Value};
use crate::storage::{MemoryBackend, StorageBackend};
use crate::traversal::{Pipeline, Start, Step, Traversal};
use crate::tx::{Transaction, TxMode};
use crate::{Error, Result};

pub use schema::SchemaReport;

// ============================================================================
// Transaction guard
// ============================================================================

/// A storage transaction that is rolled back unless committed.
struct TxGuard<'a, B: StorageBackend> {
    backend: &'a B,
    tx: Option<B::Tx>,
}

impl<'a, B: StorageBackend> TxGuard<'a, B> {
    fn begin(backend: &'a B, mode: TxMode) -> Result<Self> {
        let tx = backend.begin_tx(mode)?;
        Ok(Self { backend, tx: Some(tx) })
    }

    fn tx(&mut self) -> Result<&mut B::Tx> {
        self.tx.as_mut().ok_or_else(|| Error::Tx("transaction already finished".into()))
    }

    fn commit(mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => self.backend.commit_tx(tx),
            None => Err(Error::Tx("transaction already finished".into())),
        }
    }
}

impl<B: StorageBackend> Drop for TxGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let id = tx.id();
            if let Err(e) = self.backend.rollback_tx(tx) {
                tracing::error!(tx = %id, error = %e, "rollback failed");
            }
        }
    }
}

/// Marks the locking thread as inside a transaction until dropped.
struct InTransaction<'a>(&'a Cell<bool>);

impl<'a> InTransaction<'a> {
    fn enter(flag: &'a Cell<bool>) -> Result<Self> {
        if flag.replace(true) {
            return Err(Error::Tx(
                "transaction already open on this thread; use the enclosing transaction".into(),
            ));
        }
        Ok(Self(flag))
    }
}

impl Drop for InTransaction<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// ============================================================================
// Database
// ============================================================================

/// Entry point: transactions, schema provisioning and typed entity access
/// over one backend.
pub struct Database<B: StorageBackend> {
    backend: B,
    /// Handle lock; the cell is set while the holder runs a transaction.
    lock: ReentrantMutex<Cell<bool>>,
    config: DatabaseConfig,
    fixups: Arc<FixupRegistry>,
    attachments: Option<Arc<dyn AttachmentStore>>,
}

impl Database<MemoryBackend> {
    /// Database over a fresh in-memory backend built from `config.backend`.
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        let backend = MemoryBackend::from_config(&config.backend);
        Ok(Self::new(backend, config))
    }
}

impl<B: StorageBackend> Database<B> {
    pub fn new(backend: B, config: DatabaseConfig) -> Self {
        let fixups = Arc::new(backend.mapping_fixups());
        tracing::debug!(
            attempts = config.attempts(),
            retry_scope = ?config.retry_scope,
            fixups = fixups.len(),
            "database opened"
        );
        Self {
            backend,
            lock: ReentrantMutex::new(Cell::new(false)),
            config,
            fixups,
            attachments: None,
        }
    }

    pub fn with_attachment_store(mut self, store: Arc<dyn AttachmentStore>) -> Self {
        self.attachments = Some(store);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Mapping substitutions published by the backend.
    pub fn fixups(&self) -> &Arc<FixupRegistry> {
        &self.fixups
    }

    pub fn shutdown(&self) -> Result<()> {
        self.no_transaction(|backend| backend.shutdown())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run `body` against the backend under the lock, outside any transaction.
    pub fn no_transaction<R>(&self, body: impl FnOnce(&B) -> Result<R>) -> Result<R> {
        let _lock = self.lock.lock();
        body(&self.backend)
    }

    /// Run `body` in a read-write transaction, retrying per the configured
    /// policy. The error of the final attempt is returned as is.
    ///
    /// Calling `transaction` from inside `body` fails with `Error::Tx`
    /// without touching the backend; the enclosing attempt is unaffected
    /// unless `body` propagates that error.
    pub fn transaction<R>(&self, mut body: impl FnMut(&mut B::Tx) -> Result<R>) -> Result<R> {
        let lock = self.lock.lock();
        let _active = InTransaction::enter(&lock)?;
        let attempts = self.config.attempts();
        let mut attempt = 1;
        loop {
            tracing::debug!(attempt, attempts, "transaction attempt");
            match self.attempt(&mut body) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && self.config.retry_scope.should_retry(&e) => {
                    tracing::warn!(attempt, attempts, error = %e, "transaction failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "transaction failed");
                    return Err(e);
                }
            }
        }
    }

    fn attempt<R>(&self, body: &mut impl FnMut(&mut B::Tx) -> Result<R>) -> Result<R> {
        let mut guard = TxGuard::begin(&self.backend, TxMode::ReadWrite)?;
        let value = body(guard.tx()?)?;
        guard.commit()?;
        Ok(value)
    }

    // ========================================================================
    // Traversal entry points
    // ========================================================================

    /// Untyped traversal from `start`.
    pub fn traversal<'a>(&'a self, tx: &'a B::Tx, start: Start) -> Traversal<'a, B, Item> {
        Traversal::items(&self.backend, tx, Arc::clone(&self.fixups), start)
    }

    /// All vertices of `E`'s model.
    pub fn vertices<'a, E: Persisted>(&'a self, tx: &'a B::Tx) -> Traversal<'a, B, Entity<E>> {
        let label = E::model().label().to_string();
        Traversal::entities(&self.backend, tx, Arc::clone(&self.fixups), Pipeline::new(Start::Vertices(Some(label))))
    }

    /// All edges of `E`'s model.
    pub fn edges<'a, E: Persisted>(&'a self, tx: &'a B::Tx) -> Traversal<'a, B, Entity<E>> {
        let label = E::model().label().to_string();
        Traversal::entities(&self.backend, tx, Arc::clone(&self.fixups), Pipeline::new(Start::Edges(Some(label))))
    }

    // ========================================================================
    // Entity CRUD
    // ========================================================================

    /// The element of `E`'s model with identity `id`, or `Error::NotFound`.
    pub fn get<E: Persisted>(&self, tx: &B::Tx, id: &ElementId) -> Result<Entity<E>> {
        let label = E::model().label();
        let pipeline = Pipeline::new(Start::Ids(vec![id.clone()])).then(Step::HasLabel(label.to_string()));
        Traversal::<B, Entity<E>>::entities(&self.backend, tx, Arc::clone(&self.fixups), pipeline)
            .get_at_most_one()?
            .ok_or_else(|| Error::NotFound(format!("{label} {id}")))
    }

    pub fn get_vertex<E: Persisted>(&self, tx: &B::Tx, id: &ElementId) -> Result<Entity<E>> {
        require_kind::<E>(true)?;
        self.get(tx, id)
    }

    pub fn get_edge<E: Persisted>(&self, tx: &B::Tx, id: &ElementId) -> Result<Entity<E>> {
        require_kind::<E>(false)?;
        self.get(tx, id)
    }

    /// Persist `value` as a new vertex created by `actor`.
    pub fn create_vertex<E: Persisted>(&self, tx: &mut B::Tx, actor: &str, value: E) -> Result<Entity<E>> {
        require_kind::<E>(true)?;
        let props = self.creation_properties(actor, value)?;
        let id = self.backend.create_vertex(tx, E::model().label(), props)?;
        self.get(tx, &id)
    }

    /// Persist `value` as a new edge `from → to` created by `actor`.
    ///
    /// The endpoints must be vertices of the labels the edge model declares.
    pub fn create_edge<E: Persisted>(
        &self,
        tx: &mut B::Tx,
        actor: &str,
        from: &ElementId,
        to: &ElementId,
        value: E,
    ) -> Result<Entity<E>> {
        require_kind::<E>(false)?;
        let model = E::model();
        let expected = [(from, model.from_label()), (to, model.to_label())];
        for (id, label) in expected {
            let vertex = self
                .backend
                .get_vertex(tx, id)?
                .ok_or_else(|| Error::NotFound(format!("vertex {id}")))?;
            if Some(vertex.label.as_str()) != label {
                return Err(Error::ConstraintViolation(format!(
                    "{} cannot connect {} {id}",
                    model.label(),
                    vertex.label
                )));
            }
        }

        let props = self.creation_properties(actor, value)?;
        let id = self.backend.create_edge(tx, model.label(), from, to, props)?;
        self.get(tx, &id)
    }

    fn creation_properties<E: Persisted>(&self, actor: &str, value: E) -> Result<PropertyMap> {
        let value = match &self.attachments {
            Some(store) => value.externalize(store.as_ref())?,
            None => value,
        };
        let mut writer = FieldWriter::new(E::model(), &self.fixups).with_attachments(self.attachments.as_deref());
        value.to_fields(&mut writer)?;
        let mut props = writer.into_properties();
        props.extend(self.provenance(property_map::CREATED_BY, property_map::CREATED_AT, actor));
        Ok(props)
    }

    fn provenance(&self, by_key: &str, at_key: &str, actor: &str) -> PropertyMap {
        let mut props = PropertyMap::new();
        if let Some(by) = self.fixups.resolve(&mapping::string()).to_graph_opt(&actor.to_string()) {
            props.insert(by_key.to_string(), by);
        }
        if let Some(at) = self.fixups.resolve(&mapping::date()).to_graph_opt(&Utc::now()) {
            props.insert(at_key.to_string(), at);
        }
        props
    }

    /// Partially update the `E` with identity `id`: only the fields `change`
    /// sets are written; empty optionals are removed.
    ///
    /// Binary payloads go through [`FieldWriter::attach`], which stores them
    /// in the attachment store before the reference is mapped.
    pub fn update<E: Persisted>(
        &self,
        tx: &mut B::Tx,
        actor: &str,
        id: &ElementId,
        change: impl FnOnce(&mut FieldWriter<'_>) -> Result<()>,
    ) -> Result<()> {
        self.get::<E>(tx, id)?;

        let mut writer = FieldWriter::new(E::model(), &self.fixups).with_attachments(self.attachments.as_deref());
        change(&mut writer)?;
        let (mut set, removed) = writer.into_changes();
        set.extend(self.provenance(property_map::UPDATED_BY, property_map::UPDATED_AT, actor));

        for (key, value) in set {
            self.backend.set_property(tx, id, &key, value)?;
        }
        for key in removed {
            self.backend.remove_property(tx, id, &key)?;
        }
        tracing::debug!(label = E::model().label(), id = %id, actor, "entity updated");
        Ok(())
    }

    /// Delete the `E` with identity `id`; a vertex takes its edges with it.
    pub fn delete<E: Persisted>(&self, tx: &mut B::Tx, id: &ElementId) -> Result<()> {
        self.get::<E>(tx, id)?;
        let existed = if E::model().is_vertex() {
            self.backend.detach_delete_vertex(tx, id)?
        } else {
            self.backend.delete_edge(tx, id)?
        };
        if existed {
            Ok(())
        } else {
            Err(Error::NotFound(format!("{} {id}", E::model().label())))
        }
    }

    /// Write one encoded value, or remove the property when there is none.
    fn write_property<M: Mapping>(
        &self,
        tx: &mut B::Tx,
        id: &ElementId,
        key: &str,
        value: &M::Domain,
        mapping: &M,
    ) -> Result<()> {
        if property_map::is_reserved(key) {
            return Err(Error::ConstraintViolation(format!("{key} is a reserved property")));
        }
        match self.fixups.resolve(mapping).to_graph_opt(value) {
            Some(encoded) => self.backend.set_property(tx, id, key, encoded),
            None => self.backend.remove_property(tx, id, key),
        }
    }

    fn read_property<M: Mapping>(&self, properties: &PropertyMap, key: &str, mapping: &M) -> Result<M::Domain> {
        let value: Option<&Value> = properties.get(key);
        self.fixups.resolve(mapping).to_domain(value)
    }
}

fn require_kind<E: Persisted>(vertex: bool) -> Result<()> {
    let model = E::model();
    if model.is_vertex() == vertex {
        return Ok(());
    }
    let expected = if vertex { "vertex" } else { "edge" };
    Err(Error::Config(format!("{} is not a {expected} model", model.label())))
}
