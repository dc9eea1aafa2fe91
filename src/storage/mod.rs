//! # Storage Backend Trait
//!
//! This is THE contract between graph-ogm and any storage engine.
//! The mapping layer never touches an engine except through it.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryBackend` | `memory` | Snapshot-isolated in-memory graph for testing/embedding |

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::index::IndexType;
use crate::mapping::FixupRegistry;
use crate::model::*;
use crate::tx::{Transaction, TxMode};
use crate::{Error, Result};

pub use memory::{MemoryBackend, MemoryTx};

// ============================================================================
// Backend Configuration
// ============================================================================

/// Backend-specific options, passed through untouched at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// In-memory (no persistence)
    Memory {
        /// Store `Value::Date` as-is instead of installing epoch-millis fix-ups.
        #[serde(default)]
        native_dates: bool,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory { native_dates: false }
    }
}

// ============================================================================
// Constraint types
// ============================================================================

/// Type of constraint to create on a label+property pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Property value must be unique among elements with this label.
    Unique,
}

/// A provisioned constraint, as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    pub label: String,
    pub property: String,
    pub constraint_type: ConstraintType,
}

/// A provisioned index, as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub label: String,
    pub property: String,
    pub index_type: IndexType,
}

// ============================================================================
// Backend capabilities
// ============================================================================

/// What a backend can do. Consulted by schema provisioning.
///
/// All fields default to false. Backends override via `capabilities()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub supports_fulltext_index: bool,
    pub supports_native_dates: bool,
    pub supports_unique_constraints: bool,
}

// ============================================================================
// StorageBackend Trait
// ============================================================================

/// The universal storage contract.
///
/// Every call runs on the caller's thread. Element identities are unique
/// across vertices and edges of one store.
pub trait StorageBackend: Send + Sync + 'static {
    /// The transaction type for this backend.
    type Tx: Transaction;

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut down the backend, flushing any pending writes.
    fn shutdown(&self) -> Result<()>;

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Begin a new transaction.
    fn begin_tx(&self, mode: TxMode) -> Result<Self::Tx>;

    /// Commit a transaction. Fails with `Error::Conflict` when a concurrent
    /// commit invalidated it.
    fn commit_tx(&self, tx: Self::Tx) -> Result<()>;

    /// Roll back a transaction, discarding its writes.
    fn rollback_tx(&self, tx: Self::Tx) -> Result<()>;

    // ========================================================================
    // Vertex / edge CRUD
    // ========================================================================

    /// Create a vertex and return its backend-assigned identity.
    fn create_vertex(&self, tx: &mut Self::Tx, label: &str, props: PropertyMap) -> Result<ElementId>;

    /// Create a directed edge between two existing vertices.
    fn create_edge(
        &self,
        tx: &mut Self::Tx,
        label: &str,
        from: &ElementId,
        to: &ElementId,
        props: PropertyMap,
    ) -> Result<ElementId>;

    /// Vertex whose identity property equals `id`.
    fn get_vertex(&self, tx: &Self::Tx, id: &ElementId) -> Result<Option<Vertex>>;

    /// Edge whose identity property equals `id`.
    fn get_edge(&self, tx: &Self::Tx, id: &ElementId) -> Result<Option<Edge>>;

    /// Element (vertex or edge) with the given identity.
    fn get_element(&self, tx: &Self::Tx, id: &ElementId) -> Result<Option<Item>> {
        if let Some(vertex) = self.get_vertex(tx, id)? {
            return Ok(Some(Item::Vertex(vertex)));
        }
        Ok(self.get_edge(tx, id)?.map(Item::Edge))
    }

    /// Delete a vertex. Returns true if it existed.
    /// Fails if the vertex still has edges.
    fn delete_vertex(&self, tx: &mut Self::Tx, id: &ElementId) -> Result<bool>;

    /// Delete an edge. Returns true if it existed.
    fn delete_edge(&self, tx: &mut Self::Tx, id: &ElementId) -> Result<bool>;

    /// Delete a vertex and all its edges in one operation.
    ///
    /// Default: get all edges, delete each, then delete the vertex.
    fn detach_delete_vertex(&self, tx: &mut Self::Tx, id: &ElementId) -> Result<bool> {
        let edges = self.edges_of(tx, id, Direction::Both, None)?;
        for edge in &edges {
            self.delete_edge(tx, &edge.id)?;
        }
        self.delete_vertex(tx, id)
    }

    /// Set a property on a vertex or edge (upsert).
    fn set_property(&self, tx: &mut Self::Tx, id: &ElementId, key: &str, val: Value) -> Result<()>;

    /// Remove a property from a vertex or edge.
    fn remove_property(&self, tx: &mut Self::Tx, id: &ElementId, key: &str) -> Result<()>;

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Edges of a vertex, optionally filtered by direction and label.
    fn edges_of(
        &self,
        tx: &Self::Tx,
        vertex: &ElementId,
        dir: Direction,
        label: Option<&str>,
    ) -> Result<Vec<Edge>>;

    // ========================================================================
    // Scan
    // ========================================================================

    fn all_vertices(&self, tx: &Self::Tx) -> Result<Vec<Vertex>>;

    fn vertices_by_label(&self, tx: &Self::Tx, label: &str) -> Result<Vec<Vertex>> {
        Ok(self.all_vertices(tx)?.into_iter().filter(|v| v.label == label).collect())
    }

    /// Vertices by label + property value (index-backed if available).
    fn vertices_by_property(
        &self,
        tx: &Self::Tx,
        label: &str,
        key: &str,
        value: &Value,
    ) -> Result<Vec<Vertex>> {
        Ok(self
            .vertices_by_label(tx, label)?
            .into_iter()
            .filter(|v| v.get(key) == Some(value))
            .collect())
    }

    fn all_edges(&self, tx: &Self::Tx) -> Result<Vec<Edge>>;

    fn edges_by_label(&self, tx: &Self::Tx, label: &str) -> Result<Vec<Edge>> {
        Ok(self.all_edges(tx)?.into_iter().filter(|e| e.label == label).collect())
    }

    fn vertex_count(&self, tx: &Self::Tx) -> Result<u64> {
        Ok(self.all_vertices(tx)?.len() as u64)
    }

    fn edge_count(&self, tx: &Self::Tx) -> Result<u64> {
        Ok(self.all_edges(tx)?.len() as u64)
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Create a schema constraint on a label+property pair.
    ///
    /// Default returns "not supported".
    fn create_constraint(
        &self,
        _tx: &mut Self::Tx,
        _label: &str,
        _property: &str,
        _constraint_type: ConstraintType,
    ) -> Result<()> {
        Err(Error::Schema("constraints not supported".into()))
    }

    /// Create an index on a label+property combination.
    fn create_index(
        &self,
        tx: &mut Self::Tx,
        label: &str,
        property: &str,
        index_type: IndexType,
    ) -> Result<()>;

    fn constraints(&self, tx: &Self::Tx) -> Result<Vec<ConstraintDescriptor>>;

    fn indexes(&self, tx: &Self::Tx) -> Result<Vec<IndexDescriptor>>;

    // ========================================================================
    // Capability negotiation
    // ========================================================================

    /// Report what this backend can do.
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }

    /// Mapping substitutions this backend needs, resolved once per operation.
    fn mapping_fixups(&self) -> FixupRegistry {
        FixupRegistry::default()
    }
}
