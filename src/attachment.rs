//! External blob persistence hook.
//!
//! Large binary content is not stored inline. Before a value reaches the
//! field mappings, its binary content is handed to an [`AttachmentStore`]
//! and replaced with the reference it returns: whole entities through
//! [`Persisted::externalize`](crate::Persisted::externalize), partial
//! updates through [`FieldWriter::attach`](crate::FieldWriter::attach).

use crate::Result;

/// Stores binary content outside the graph.
pub trait AttachmentStore: Send + Sync {
    /// Persist `content` and return a storage-safe reference to it.
    fn store(&self, content: &[u8]) -> Result<String>;
}
