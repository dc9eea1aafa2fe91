//! Index declarations.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Type of index to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    /// Equality lookup index on exactly one property.
    Standard,
    /// Full-text search index. Degrades to a unique constraint on backends
    /// without full-text support.
    FullText,
    /// Unique constraint (implies a standard index).
    Unique,
}

/// One declared index: a kind and the properties it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub index_type: IndexType,
    pub properties: SmallVec<[String; 2]>,
}

impl IndexSpec {
    pub fn new<I, S>(index_type: IndexType, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_type,
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    /// The only property, if the index covers exactly one.
    pub fn single_property(&self) -> Option<&str> {
        match self.properties.as_slice() {
            [property] => Some(property),
            _ => None,
        }
    }
}
