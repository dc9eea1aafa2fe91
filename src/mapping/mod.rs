//! # Mapping
//!
//! Pure value conversion between domain types and storage primitives.
//!
//! A mapping is built in two layers:
//!
//! - [`ScalarMapping`]: one domain scalar ↔ one primitive [`Value`]
//! - a cardinality wrapper ([`Single`], [`Optional`], [`ListOf`], [`SetOf`])
//!   that implements the full [`Mapping`] contract
//!
//! ```text
//! DateMapping.single()   DateTime<Utc>          ↔ Value::Date
//! DateMapping.optional() Option<DateTime<Utc>>  ↔ Value::Date | absent
//! StringMapping.list()   Vec<String>            ↔ Value::List([String..])
//! StringMapping.set()    HashSet<String>        ↔ Value::List([String..])
//! ```
//!
//! Cardinality is intrinsic to the mapping value; there is no separate
//! cardinality parameter anywhere in the API.

pub mod scalar;
pub mod cardinality;
pub mod fixup;

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::model::Value;
use crate::Result;

pub use scalar::{
    BoolMapping, IntMapping, LongMapping, DoubleMapping, StringMapping, BytesMapping,
    DateMapping, EpochMillisMapping, Converted,
};
pub use cardinality::{Single, Optional, ListOf, SetOf};
pub use fixup::FixupRegistry;

// ============================================================================
// Structural signature
// ============================================================================

/// How many primitive slots a field occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exactly one value; absence is an error on read.
    Single,
    /// Zero or one value; absence is "no value".
    Optional,
    /// Ordered, duplicates allowed, stored as one array property.
    List,
    /// Unordered, duplicates collapsed on read, stored as one array property.
    Set,
}

/// Scalar primitive kinds a backend can persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Long,
    Double,
    String,
    Bytes,
    Date,
}

/// Domain type tag. Compares by `TypeId`; the name is for diagnostics only.
#[derive(Debug, Clone, Copy)]
pub struct DomainType {
    id: TypeId,
    name: &'static str,
}

impl DomainType {
    pub fn of<T: 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for DomainType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DomainType {}

impl Hash for DomainType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Structural identity of a mapping: element domain type, cardinality and
/// the primitive kind used at the storage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub domain: DomainType,
    pub cardinality: Cardinality,
    pub primitive: PrimitiveKind,
}

impl Signature {
    pub fn new(domain: DomainType, cardinality: Cardinality, primitive: PrimitiveKind) -> Self {
        Self { domain, cardinality, primitive }
    }

    /// Same domain type and cardinality, primitive representation ignored.
    pub fn same_shape(&self, other: &Signature) -> bool {
        self.domain == other.domain && self.cardinality == other.cardinality
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}<{}> as {:?}", self.cardinality, self.domain.name, self.primitive)
    }
}

// ============================================================================
// Mapping contract
// ============================================================================

/// Conversion rule between a (cardinality-wrapped) domain type and the
/// primitive stored for one property.
///
/// Implementations hold no hidden state; both directions are pure.
pub trait Mapping: Send + Sync + 'static {
    /// Full domain type, cardinality included (`Option<D>`, `Vec<D>`, ...).
    type Domain: 'static;

    fn signature(&self) -> Signature;

    /// Convert a stored property, `None` when the property is absent.
    fn to_domain(&self, value: Option<&Value>) -> Result<Self::Domain>;

    /// Convert a domain value, `None` when nothing must be persisted.
    fn to_graph_opt(&self, value: &Self::Domain) -> Option<Value>;

    /// Structural equality of domain type, cardinality and primitive kind.
    fn is_compatible_with(&self, other: &Signature) -> bool {
        self.signature() == *other
    }
}

/// One domain scalar ↔ one primitive value.
pub trait ScalarMapping: Send + Sync + 'static {
    type Domain: Clone + Send + Sync + 'static;

    /// Primitive kind written by `encode`.
    fn kind(&self) -> PrimitiveKind;

    fn decode(&self, value: &Value) -> Result<Self::Domain>;

    /// `None` means the value has no storable form and is skipped.
    fn encode(&self, value: &Self::Domain) -> Option<Value>;

    fn single(self) -> Single<Self> where Self: Sized { Single(self) }
    fn optional(self) -> Optional<Self> where Self: Sized { Optional(self) }
    fn list(self) -> ListOf<Self> where Self: Sized { ListOf(self) }
    fn set(self) -> SetOf<Self> where Self: Sized { SetOf(self) }
}

// ============================================================================
// Shorthand constructors
// ============================================================================

pub fn boolean() -> Single<BoolMapping> { Single(BoolMapping) }
pub fn int() -> Single<IntMapping> { Single(IntMapping) }
pub fn long() -> Single<LongMapping> { Single(LongMapping) }
pub fn double() -> Single<DoubleMapping> { Single(DoubleMapping) }
pub fn string() -> Single<StringMapping> { Single(StringMapping) }
pub fn bytes() -> Single<BytesMapping> { Single(BytesMapping) }
pub fn date() -> Single<DateMapping> { Single(DateMapping) }

/// Scalar mapping for an arbitrary domain type stored through `base`.
pub fn convert<S, D>(
    base: S,
    decode: fn(S::Domain) -> Option<D>,
    encode: fn(&D) -> Option<S::Domain>,
) -> Converted<S, D>
where
    S: ScalarMapping,
    D: Clone + Send + Sync + 'static,
{
    Converted::new(base, decode, encode)
}
