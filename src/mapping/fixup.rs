//! Backend fix-ups: per-backend substitution of well-known mappings.
//!
//! Some backends cannot persist (or index) a primitive kind natively. They
//! publish a [`FixupRegistry`] at construction that swaps the standard
//! mapping for a structurally equivalent one: same domain type, same
//! cardinality, different primitive representation.
//!
//! ```text
//! Single<DateMapping>   DateTime<Utc> ↔ Value::Date
//!        │ fix-up
//!        ▼
//! Single<EpochMillis>   DateTime<Utc> ↔ Value::Long
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::{Error, Result};
use super::{DateMapping, EpochMillisMapping, Mapping, ScalarMapping, Signature};

/// A replacement, type-erased as `Arc<dyn Mapping<Domain = D>>`.
type ErasedMapping = Arc<dyn Any + Send + Sync>;

/// Source signature → replacement mapping. Unmatched mappings pass through.
#[derive(Clone, Default)]
pub struct FixupRegistry {
    entries: HashMap<Signature, (Signature, ErasedMapping)>,
}

impl FixupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Date fix-ups for backends that store timestamps as epoch milliseconds.
    pub fn epoch_millis_dates() -> Self {
        let mut registry = Self::new();
        registry.insert(DateMapping.single().signature(), EpochMillisMapping.single());
        registry.insert(DateMapping.optional().signature(), EpochMillisMapping.optional());
        registry.insert(DateMapping.list().signature(), EpochMillisMapping.list());
        registry.insert(DateMapping.set().signature(), EpochMillisMapping.set());
        registry
    }

    /// Register `replacement` for mappings whose signature equals `source`.
    ///
    /// The replacement must keep the source's domain type and cardinality.
    pub fn register<M: Mapping>(&mut self, source: Signature, replacement: M) -> Result<()> {
        let target = replacement.signature();
        if !source.same_shape(&target) {
            return Err(Error::Config(format!(
                "fix-up {target} does not have the shape of {source}"
            )));
        }
        self.insert(source, replacement);
        Ok(())
    }

    fn insert<M: Mapping>(&mut self, source: Signature, replacement: M) {
        let target = replacement.signature();
        let typed: Arc<dyn Mapping<Domain = M::Domain>> = Arc::new(replacement);
        let erased: ErasedMapping = Arc::new(typed);
        self.entries.insert(source, (target, erased));
    }

    /// The mapping to use on this backend: the registered replacement for
    /// `mapping`'s signature, or `mapping` itself.
    pub fn resolve<'a, D: 'static>(
        &'a self,
        mapping: &'a dyn Mapping<Domain = D>,
    ) -> &'a dyn Mapping<Domain = D> {
        let fixed = self
            .entries
            .get(&mapping.signature())
            .and_then(|(_, erased)| erased.downcast_ref::<Arc<dyn Mapping<Domain = D>>>());
        match fixed {
            Some(fixed) => &**fixed,
            None => mapping,
        }
    }

    /// Signature a mapping with `source` signature is stored under.
    pub fn resolve_signature(&self, source: Signature) -> Signature {
        self.entries.get(&source).map(|(target, _)| *target).unwrap_or(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FixupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(source, (target, _))| {
                (source.to_string(), target.to_string())
            }))
            .finish()
    }
}
