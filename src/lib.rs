//! # graph-ogm: typed object-graph mapping
//!
//! Declare typed domain entities (vertices and edges with named fields of
//! single, optional, list or set cardinality), persist them into a pluggable
//! property graph backend, and read them back through lazy traversals.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `StorageBackend` is the contract between the mapping layer and storage
//! 2. **Pure mappings**: a `Mapping` converts domain values to primitives and back, nothing else
//! 3. **One lock, many retries**: every transaction goes through `Database`, serialized and retried
//! 4. **Lazy traversals**: a `Traversal` is a descriptor until a terminal read runs it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::LazyLock;
//! use graph_ogm::{Database, DatabaseConfig, FieldReader, FieldWriter, Model, Persisted};
//! use graph_ogm::mapping;
//!
//! struct Person { name: String }
//!
//! static PERSON: LazyLock<Model> = LazyLock::new(|| {
//!     Model::vertex("Person")
//!         .field("name", mapping::string())
//!         .build()
//!         .expect("valid model")
//! });
//!
//! impl Persisted for Person {
//!     fn model() -> &'static Model { &PERSON }
//!     fn from_fields(fields: &FieldReader<'_>) -> graph_ogm::Result<Self> {
//!         Ok(Self { name: fields.get("name")? })
//!     }
//!     fn to_fields(&self, fields: &mut FieldWriter<'_>) -> graph_ogm::Result<()> {
//!         fields.set("name", &self.name)
//!     }
//! }
//!
//! # fn example() -> graph_ogm::Result<()> {
//! let db = Database::open(DatabaseConfig::default())?;
//! db.create_schema(&[Person::model()])?;
//!
//! let ada = db.transaction(|tx| {
//!     db.create_vertex(tx, "admin", Person { name: "Ada".into() })
//! })?;
//!
//! let found = db.transaction(|tx| db.get_vertex::<Person>(tx, ada.id()))?;
//! assert_eq!(found.name, "Ada");
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | (default) | Snapshot-isolated in-memory graph for testing/embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod mapping;
pub mod entity;
pub mod index;
pub mod storage;
pub mod tx;
pub mod database;
pub mod traversal;
pub mod config;
pub mod attachment;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Vertex, Edge, Value, PropertyMap, ElementId, Direction, GraphElement, Item,
};

// ============================================================================
// Re-exports: Mapping
// ============================================================================

pub use mapping::{
    Mapping, ScalarMapping, Cardinality, PrimitiveKind, Signature, DomainType,
    FixupRegistry,
};

// ============================================================================
// Re-exports: Entity descriptors
// ============================================================================

pub use entity::{
    Model, ModelKind, ModelBuilder, Entity, Persisted, FieldReader, FieldWriter,
    FieldMapping, entity_converter,
};
pub use index::{IndexType, IndexSpec};

// ============================================================================
// Re-exports: Storage, transactions, database
// ============================================================================

pub use storage::{StorageBackend, BackendConfig, ConstraintType, BackendCapabilities, MemoryBackend};
pub use tx::{Transaction, TxMode, TxId};
pub use database::{Database, SchemaReport};
pub use config::{DatabaseConfig, RetryScope};
pub use attachment::AttachmentStore;

// ============================================================================
// Re-exports: Traversal
// ============================================================================

pub use traversal::{Traversal, Converter, Pipeline, Step, Start, only_one_of, at_most_one_of};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stored primitive could not be turned back into its declared domain type.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// An identity lookup found no matching element.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A result-cardinality invariant was violated by the query itself.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Optimistic-concurrency conflict detected at commit.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// An index declaration the backend cannot honor.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transaction error: {0}")]
    Tx(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for commit-time conflicts, the only errors retried by default.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
