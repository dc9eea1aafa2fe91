//! In-memory storage backend.
//!
//! This is the reference implementation of `StorageBackend`.
//! The committed graph sits behind one `RwLock`; every transaction works on
//! a private copy of it (snapshot isolation).
//!
//! ## Transactions
//!
//! - **Optimistic**: `commit_tx()` fails with `Error::Conflict` when another
//!   transaction committed writes after this one began. Read-only or
//!   write-free transactions never conflict.
//! - **Real rollback**: `rollback_tx()` drops the private copy, so nothing
//!   written in the transaction becomes visible.
//!
//! ## Limitations
//!
//! - **Copy per transaction**: beginning a transaction clones the whole
//!   graph. Fine for tests and small embedded graphs, not for large ones.
//! - **No property indexes**: `create_index()` records the declaration; all
//!   property lookups still do a full scan.
//! - **No full-text**: full-text index requests are refused.
//! - **Dates**: unless built with native dates, `Value::Date` is rejected
//!   and epoch-millisecond fix-ups are published instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::index::IndexType;
use crate::mapping::FixupRegistry;
use crate::model::*;
use crate::model::property_map;
use crate::tx::{Transaction, TxId, TxMode};
use crate::{Error, Result};
use super::{
    BackendCapabilities, BackendConfig, ConstraintDescriptor, ConstraintType, IndexDescriptor,
    StorageBackend,
};

// ============================================================================
// Graph state
// ============================================================================

#[derive(Debug, Clone, Default)]
struct GraphState {
    vertices: HashMap<ElementId, Vertex>,
    edges: HashMap<ElementId, Edge>,
    /// vertex id → ids of incident edges
    adjacency: HashMap<ElementId, Vec<ElementId>>,
    constraints: Vec<ConstraintDescriptor>,
    indexes: Vec<IndexDescriptor>,
}

impl GraphState {
    fn element(&self, id: &ElementId) -> Option<(&str, &PropertyMap)> {
        if let Some(v) = self.vertices.get(id) {
            return Some((v.label.as_str(), &v.properties));
        }
        self.edges.get(id).map(|e| (e.label.as_str(), &e.properties))
    }

    fn element_mut(&mut self, id: &ElementId) -> Option<(&str, &mut PropertyMap)> {
        if let Some(v) = self.vertices.get_mut(id) {
            return Some((v.label.as_str(), &mut v.properties));
        }
        self.edges.get_mut(id).map(|e| (e.label.as_str(), &mut e.properties))
    }

    fn elements_labelled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = (&'a ElementId, &'a PropertyMap)> + 'a {
        let vertices = self.vertices.values()
            .filter(move |v| v.label == label)
            .map(|v| (&v.id, &v.properties));
        let edges = self.edges.values()
            .filter(move |e| e.label == label)
            .map(|e| (&e.id, &e.properties));
        vertices.chain(edges)
    }

    /// Fails if setting `key = value` on element `id` would break a unique constraint.
    fn check_unique(&self, label: &str, id: &ElementId, key: &str, value: &Value) -> Result<()> {
        let constrained = self.constraints.iter().any(|c| {
            c.constraint_type == ConstraintType::Unique && c.label == label && c.property == key
        });
        if !constrained {
            return Ok(());
        }
        let clash = self
            .elements_labelled(label)
            .any(|(other, props)| other != id && props.get(key) == Some(value));
        if clash {
            return Err(Error::ConstraintViolation(format!(
                "{label}.{key} = {value} already exists"
            )));
        }
        Ok(())
    }

    fn check_all_unique(&self, label: &str, id: &ElementId, props: &PropertyMap) -> Result<()> {
        for (key, value) in props {
            self.check_unique(label, id, key, value)?;
        }
        Ok(())
    }
}

struct Committed {
    version: u64,
    graph: GraphState,
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory property graph storage.
///
/// Cloning yields another handle onto the same store.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    committed: RwLock<Committed>,
    native_dates: bool,
    next_element_id: AtomicU64,
    next_tx_id: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// A store that persists `Value::Date` natively (no fix-ups).
    pub fn with_native_dates() -> Self {
        Self::build(true)
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        match config {
            BackendConfig::Memory { native_dates } => Self::build(*native_dates),
        }
    }

    fn build(native_dates: bool) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                committed: RwLock::new(Committed { version: 0, graph: GraphState::default() }),
                native_dates,
                next_element_id: AtomicU64::new(1),
                next_tx_id: AtomicU64::new(1),
            }),
        }
    }

    /// Number of commits that changed the store.
    pub fn version(&self) -> u64 {
        self.inner.committed.read().version
    }

    fn next_id(&self) -> ElementId {
        ElementId(self.inner.next_element_id.fetch_add(1, Ordering::Relaxed).to_string())
    }

    fn check_value(&self, key: &str, value: &Value) -> Result<()> {
        if !value.is_homogeneous() {
            return Err(Error::Storage(format!("property {key}: lists must be homogeneous")));
        }
        if !self.inner.native_dates && value.contains_date() {
            return Err(Error::Storage(format!(
                "property {key}: date values are not supported by this backend"
            )));
        }
        Ok(())
    }

    fn check_props(&self, props: &PropertyMap) -> Result<()> {
        for (key, value) in props {
            if key == property_map::ID {
                return Err(Error::Storage("identity property is assigned by the backend".into()));
            }
            self.check_value(key, value)?;
        }
        Ok(())
    }
}

/// Ids are decimal counters, so shorter ids are older.
fn creation_order(a: &ElementId, b: &ElementId) -> std::cmp::Ordering {
    (a.0.len(), &a.0).cmp(&(b.0.len(), &b.0))
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MemoryTx
// ============================================================================

/// In-memory transaction: a private copy of the graph plus the version it
/// was taken at.
pub struct MemoryTx {
    id: TxId,
    mode: TxMode,
    base_version: u64,
    graph: GraphState,
    dirty: bool,
}

impl MemoryTx {
    fn writable(&mut self) -> Result<&mut GraphState> {
        if self.mode == TxMode::ReadOnly {
            return Err(Error::Tx(format!("{} is read-only", self.id)));
        }
        self.dirty = true;
        Ok(&mut self.graph)
    }
}

impl Transaction for MemoryTx {
    fn mode(&self) -> TxMode { self.mode }
    fn id(&self) -> TxId { self.id }
}

// ============================================================================
// StorageBackend impl
// ============================================================================

impl StorageBackend for MemoryBackend {
    type Tx = MemoryTx;

    fn shutdown(&self) -> Result<()> { Ok(()) }

    fn begin_tx(&self, mode: TxMode) -> Result<MemoryTx> {
        let id = TxId(self.inner.next_tx_id.fetch_add(1, Ordering::Relaxed));
        let committed = self.inner.committed.read();
        Ok(MemoryTx {
            id,
            mode,
            base_version: committed.version,
            graph: committed.graph.clone(),
            dirty: false,
        })
    }

    fn commit_tx(&self, tx: MemoryTx) -> Result<()> {
        if !tx.dirty {
            return Ok(());
        }
        let mut committed = self.inner.committed.write();
        if committed.version != tx.base_version {
            return Err(Error::Conflict(format!(
                "{} started at version {} but the store is at version {}",
                tx.id, tx.base_version, committed.version
            )));
        }
        committed.graph = tx.graph;
        committed.version += 1;
        tracing::debug!(tx = %tx.id, version = committed.version, "memory commit");
        Ok(())
    }

    fn rollback_tx(&self, tx: MemoryTx) -> Result<()> {
        tracing::debug!(tx = %tx.id, dirty = tx.dirty, "memory rollback");
        Ok(())
    }

    // ========================================================================
    // Vertex / edge CRUD
    // ========================================================================

    fn create_vertex(&self, tx: &mut MemoryTx, label: &str, props: PropertyMap) -> Result<ElementId> {
        self.check_props(&props)?;
        let id = self.next_id();
        let graph = tx.writable()?;
        graph.check_all_unique(label, &id, &props)?;

        let mut vertex = Vertex::new(id.clone(), label);
        vertex.properties.extend(props);
        graph.vertices.insert(id.clone(), vertex);
        graph.adjacency.insert(id.clone(), Vec::new());
        Ok(id)
    }

    fn create_edge(
        &self,
        tx: &mut MemoryTx,
        label: &str,
        from: &ElementId,
        to: &ElementId,
        props: PropertyMap,
    ) -> Result<ElementId> {
        self.check_props(&props)?;
        let id = self.next_id();
        let graph = tx.writable()?;
        if !graph.vertices.contains_key(from) {
            return Err(Error::NotFound(format!("Source vertex {from}")));
        }
        if !graph.vertices.contains_key(to) {
            return Err(Error::NotFound(format!("Target vertex {to}")));
        }
        graph.check_all_unique(label, &id, &props)?;

        let mut edge = Edge::new(id.clone(), label, from.clone(), to.clone());
        edge.properties.extend(props);
        graph.edges.insert(id.clone(), edge);

        graph.adjacency.entry(from.clone()).or_default().push(id.clone());
        if from != to {
            graph.adjacency.entry(to.clone()).or_default().push(id.clone());
        }
        Ok(id)
    }

    fn get_vertex(&self, tx: &MemoryTx, id: &ElementId) -> Result<Option<Vertex>> {
        Ok(tx.graph.vertices.get(id).cloned())
    }

    fn get_edge(&self, tx: &MemoryTx, id: &ElementId) -> Result<Option<Edge>> {
        Ok(tx.graph.edges.get(id).cloned())
    }

    fn delete_vertex(&self, tx: &mut MemoryTx, id: &ElementId) -> Result<bool> {
        let graph = tx.writable()?;
        if let Some(edges) = graph.adjacency.get(id) {
            if !edges.is_empty() {
                return Err(Error::ConstraintViolation(format!(
                    "Cannot delete vertex {id} with {} edges. Delete edges first.",
                    edges.len()
                )));
            }
        }
        graph.adjacency.remove(id);
        Ok(graph.vertices.remove(id).is_some())
    }

    fn delete_edge(&self, tx: &mut MemoryTx, id: &ElementId) -> Result<bool> {
        let graph = tx.writable()?;
        let removed = graph.edges.remove(id);
        if let Some(edge) = &removed {
            for end in [&edge.from, &edge.to] {
                if let Some(edges) = graph.adjacency.get_mut(end) {
                    edges.retain(|eid| eid != id);
                }
            }
        }
        Ok(removed.is_some())
    }

    fn set_property(&self, tx: &mut MemoryTx, id: &ElementId, key: &str, val: Value) -> Result<()> {
        if key == property_map::ID {
            return Err(Error::Storage("identity property is read-only".into()));
        }
        self.check_value(key, &val)?;
        let graph = tx.writable()?;
        let label = graph
            .element(id)
            .map(|(label, _)| label.to_string())
            .ok_or_else(|| Error::NotFound(format!("Element {id}")))?;
        graph.check_unique(&label, id, key, &val)?;
        if let Some((_, props)) = graph.element_mut(id) {
            props.insert(key.to_string(), val);
        }
        Ok(())
    }

    fn remove_property(&self, tx: &mut MemoryTx, id: &ElementId, key: &str) -> Result<()> {
        if key == property_map::ID {
            return Err(Error::Storage("identity property is read-only".into()));
        }
        let graph = tx.writable()?;
        let (_, props) = graph
            .element_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Element {id}")))?;
        props.remove(key);
        Ok(())
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    fn edges_of(
        &self,
        tx: &MemoryTx,
        vertex: &ElementId,
        dir: Direction,
        label: Option<&str>,
    ) -> Result<Vec<Edge>> {
        let ids = tx.graph.adjacency.get(vertex).map(Vec::as_slice).unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|eid| tx.graph.edges.get(eid))
            .filter(|edge| match dir {
                Direction::Outgoing => edge.from == *vertex,
                Direction::Incoming => edge.to == *vertex,
                Direction::Both => true,
            })
            .filter(|edge| label.is_none_or(|l| edge.label == l))
            .cloned()
            .collect())
    }

    // ========================================================================
    // Scan
    // ========================================================================

    fn all_vertices(&self, tx: &MemoryTx) -> Result<Vec<Vertex>> {
        let mut vertices: Vec<Vertex> = tx.graph.vertices.values().cloned().collect();
        vertices.sort_by(|a, b| creation_order(&a.id, &b.id));
        Ok(vertices)
    }

    fn all_edges(&self, tx: &MemoryTx) -> Result<Vec<Edge>> {
        let mut edges: Vec<Edge> = tx.graph.edges.values().cloned().collect();
        edges.sort_by(|a, b| creation_order(&a.id, &b.id));
        Ok(edges)
    }

    fn vertex_count(&self, tx: &MemoryTx) -> Result<u64> {
        Ok(tx.graph.vertices.len() as u64)
    }

    fn edge_count(&self, tx: &MemoryTx) -> Result<u64> {
        Ok(tx.graph.edges.len() as u64)
    }

    // ========================================================================
    // Schema
    // ========================================================================

    fn create_constraint(
        &self,
        tx: &mut MemoryTx,
        label: &str,
        property: &str,
        constraint_type: ConstraintType,
    ) -> Result<()> {
        let graph = tx.writable()?;
        let descriptor = ConstraintDescriptor {
            label: label.to_string(),
            property: property.to_string(),
            constraint_type,
        };
        if graph.constraints.contains(&descriptor) {
            return Ok(());
        }

        let mut seen: Vec<&Value> = Vec::new();
        for (_, props) in graph.elements_labelled(label) {
            if let Some(value) = props.get(property) {
                if seen.contains(&value) {
                    return Err(Error::ConstraintViolation(format!(
                        "cannot create unique constraint on {label}.{property}: duplicate {value}"
                    )));
                }
                seen.push(value);
            }
        }
        graph.constraints.push(descriptor);
        Ok(())
    }

    fn create_index(
        &self,
        tx: &mut MemoryTx,
        label: &str,
        property: &str,
        index_type: IndexType,
    ) -> Result<()> {
        match index_type {
            IndexType::FullText => Err(Error::Schema(format!(
                "full-text index on {label}.{property} not supported by the memory backend"
            ))),
            IndexType::Unique => self.create_constraint(tx, label, property, ConstraintType::Unique),
            IndexType::Standard => {
                let graph = tx.writable()?;
                let descriptor = IndexDescriptor {
                    label: label.to_string(),
                    property: property.to_string(),
                    index_type,
                };
                if !graph.indexes.contains(&descriptor) {
                    graph.indexes.push(descriptor);
                }
                Ok(())
            }
        }
    }

    fn constraints(&self, tx: &MemoryTx) -> Result<Vec<ConstraintDescriptor>> {
        Ok(tx.graph.constraints.clone())
    }

    fn indexes(&self, tx: &MemoryTx) -> Result<Vec<IndexDescriptor>> {
        Ok(tx.graph.indexes.clone())
    }

    // ========================================================================
    // Capability negotiation
    // ========================================================================

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_fulltext_index: false,
            supports_native_dates: self.inner.native_dates,
            supports_unique_constraints: true,
        }
    }

    fn mapping_fixups(&self) -> FixupRegistry {
        if self.inner.native_dates {
            FixupRegistry::default()
        } else {
            FixupRegistry::epoch_millis_dates()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn props(pairs: &[(&str, Value)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_create_and_get_vertex() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();

        let id = db.create_vertex(&mut tx, "Person", props(&[("name", Value::from("Ada"))])).unwrap();
        let vertex = db.get_vertex(&tx, &id).unwrap().unwrap();

        assert_eq!(vertex.label, "Person");
        assert_eq!(vertex.get("name"), Some(&Value::from("Ada")));
        assert_eq!(vertex.get(property_map::ID), Some(&Value::String(id.0.clone())));
    }

    #[test]
    fn test_ids_unique_across_vertices_and_edges() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();

        let a = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        let b = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        let e = db.create_edge(&mut tx, "KNOWS", &a, &b, PropertyMap::new()).unwrap();

        assert_ne!(a, b);
        assert_ne!(e, a);
        assert_ne!(e, b);
        assert!(matches!(db.get_element(&tx, &e).unwrap(), Some(Item::Edge(_))));
        assert!(matches!(db.get_element(&tx, &a).unwrap(), Some(Item::Vertex(_))));
    }

    #[test]
    fn test_writes_invisible_until_commit() {
        let db = MemoryBackend::new();
        let mut writer = db.begin_tx(TxMode::ReadWrite).unwrap();
        let id = db.create_vertex(&mut writer, "Person", PropertyMap::new()).unwrap();

        let reader = db.begin_tx(TxMode::ReadOnly).unwrap();
        assert!(db.get_vertex(&reader, &id).unwrap().is_none());

        db.commit_tx(writer).unwrap();
        let reader = db.begin_tx(TxMode::ReadOnly).unwrap();
        assert!(db.get_vertex(&reader, &id).unwrap().is_some());
    }

    #[test]
    fn test_rollback_discards_writes() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        db.rollback_tx(tx).unwrap();

        let tx = db.begin_tx(TxMode::ReadOnly).unwrap();
        assert_eq!(db.vertex_count(&tx).unwrap(), 0);
        assert_eq!(db.version(), 0);
    }

    #[test]
    fn test_concurrent_commit_conflicts() {
        let db = MemoryBackend::new();
        let mut first = db.begin_tx(TxMode::ReadWrite).unwrap();
        let mut second = db.begin_tx(TxMode::ReadWrite).unwrap();

        db.create_vertex(&mut first, "Person", PropertyMap::new()).unwrap();
        db.create_vertex(&mut second, "Person", PropertyMap::new()).unwrap();

        db.commit_tx(first).unwrap();
        let err = db.commit_tx(second).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_read_only_tx_never_conflicts() {
        let db = MemoryBackend::new();
        let reader = db.begin_tx(TxMode::ReadOnly).unwrap();
        let mut writer = db.begin_tx(TxMode::ReadWrite).unwrap();
        db.create_vertex(&mut writer, "Person", PropertyMap::new()).unwrap();
        db.commit_tx(writer).unwrap();
        db.commit_tx(reader).unwrap();
    }

    #[test]
    fn test_read_only_tx_rejects_writes() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadOnly).unwrap();
        let err = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap_err();
        assert!(matches!(err, Error::Tx(_)));
    }

    #[test]
    fn test_cannot_delete_connected_vertex() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();

        let a = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        let b = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        db.create_edge(&mut tx, "KNOWS", &a, &b, PropertyMap::new()).unwrap();

        assert!(db.delete_vertex(&mut tx, &a).is_err());
        assert!(db.detach_delete_vertex(&mut tx, &a).unwrap());
        assert!(db.get_vertex(&tx, &a).unwrap().is_none());
        assert_eq!(db.edge_count(&tx).unwrap(), 0);
    }

    #[test]
    fn test_edges_of_direction_and_label() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();

        let a = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        let b = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        let c = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        db.create_edge(&mut tx, "KNOWS", &a, &b, PropertyMap::new()).unwrap();
        db.create_edge(&mut tx, "LIKES", &a, &c, PropertyMap::new()).unwrap();
        db.create_edge(&mut tx, "KNOWS", &c, &a, PropertyMap::new()).unwrap();

        assert_eq!(db.edges_of(&tx, &a, Direction::Outgoing, None).unwrap().len(), 2);
        assert_eq!(db.edges_of(&tx, &a, Direction::Incoming, None).unwrap().len(), 1);
        assert_eq!(db.edges_of(&tx, &a, Direction::Both, Some("KNOWS")).unwrap().len(), 2);
        assert_eq!(db.edges_by_label(&tx, "LIKES").unwrap().len(), 1);
    }

    #[test]
    fn test_unique_constraint_enforced() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        db.create_constraint(&mut tx, "Person", "email", ConstraintType::Unique).unwrap();

        db.create_vertex(&mut tx, "Person", props(&[("email", Value::from("a@x"))])).unwrap();
        let err = db.create_vertex(&mut tx, "Person", props(&[("email", Value::from("a@x"))])).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        // Other labels are unconstrained.
        db.create_vertex(&mut tx, "Company", props(&[("email", Value::from("a@x"))])).unwrap();
    }

    #[test]
    fn test_constraint_on_duplicate_data_fails() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        db.create_vertex(&mut tx, "Person", props(&[("name", Value::from("x"))])).unwrap();
        db.create_vertex(&mut tx, "Person", props(&[("name", Value::from("x"))])).unwrap();
        assert!(db.create_constraint(&mut tx, "Person", "name", ConstraintType::Unique).is_err());
    }

    #[test]
    fn test_dates_and_mixed_lists_rejected() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let id = db.create_vertex(&mut tx, "Event", PropertyMap::new()).unwrap();

        let err = db.set_property(&mut tx, &id, "at", Value::Date(Utc::now())).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        let mixed = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert!(db.set_property(&mut tx, &id, "mixed", mixed).is_err());

        let native = MemoryBackend::with_native_dates();
        let mut tx = native.begin_tx(TxMode::ReadWrite).unwrap();
        let id = native.create_vertex(&mut tx, "Event", PropertyMap::new()).unwrap();
        native.set_property(&mut tx, &id, "at", Value::Date(Utc::now())).unwrap();
    }

    #[test]
    fn test_identity_is_read_only() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let id = db.create_vertex(&mut tx, "Person", PropertyMap::new()).unwrap();
        assert!(db.set_property(&mut tx, &id, property_map::ID, Value::from("forged")).is_err());
        assert!(db.create_vertex(&mut tx, "Person", props(&[(property_map::ID, Value::from("x"))])).is_err());
    }

    #[test]
    fn test_fulltext_refused() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let err = db.create_index(&mut tx, "Doc", "body", IndexType::FullText).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(!db.capabilities().supports_fulltext_index);
    }
}
