//! Scalar mappings: one domain value ↔ one primitive value.

use chrono::{DateTime, SubsecRound, Utc};

use crate::model::Value;
use crate::{Error, Result};
use super::{PrimitiveKind, ScalarMapping};

fn mismatch(expected: &str, got: &Value) -> Error {
    Error::Conversion(format!("expected {expected}, got {}", got.type_name()))
}

macro_rules! primitive_mapping {
    ($(#[$doc:meta])* $name:ident, $domain:ty, $kind:ident, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl ScalarMapping for $name {
            type Domain = $domain;

            fn kind(&self) -> PrimitiveKind { PrimitiveKind::$kind }

            fn decode(&self, value: &Value) -> Result<$domain> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch(stringify!($kind), other)),
                }
            }

            fn encode(&self, value: &$domain) -> Option<Value> {
                Some(Value::$variant(value.clone()))
            }
        }
    };
}

primitive_mapping!(
    /// `bool` ↔ `Value::Bool`.
    BoolMapping, bool, Bool, Bool
);
primitive_mapping!(
    /// `i32` ↔ `Value::Int`.
    IntMapping, i32, Int, Int
);
primitive_mapping!(DoubleMapping, f64, Double, Double);
primitive_mapping!(StringMapping, String, String, String);
primitive_mapping!(BytesMapping, Vec<u8>, Bytes, Bytes);

/// `i64` ↔ `Value::Long`. Narrower `Int` values are widened on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LongMapping;

impl ScalarMapping for LongMapping {
    type Domain = i64;

    fn kind(&self) -> PrimitiveKind { PrimitiveKind::Long }

    fn decode(&self, value: &Value) -> Result<i64> {
        value.as_long().ok_or_else(|| mismatch("Long", value))
    }

    fn encode(&self, value: &i64) -> Option<Value> {
        Some(Value::Long(*value))
    }
}

// ============================================================================
// Dates
// ============================================================================

/// `DateTime<Utc>` ↔ native `Value::Date`, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateMapping;

impl ScalarMapping for DateMapping {
    type Domain = DateTime<Utc>;

    fn kind(&self) -> PrimitiveKind { PrimitiveKind::Date }

    fn decode(&self, value: &Value) -> Result<DateTime<Utc>> {
        match value {
            Value::Date(d) => Ok(d.trunc_subsecs(3)),
            other => Err(mismatch("Date", other)),
        }
    }

    fn encode(&self, value: &DateTime<Utc>) -> Option<Value> {
        Some(Value::Date(value.trunc_subsecs(3)))
    }
}

/// `DateTime<Utc>` ↔ `Value::Long` milliseconds since the Unix epoch.
///
/// Substituted for [`DateMapping`] on backends without native dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochMillisMapping;

impl ScalarMapping for EpochMillisMapping {
    type Domain = DateTime<Utc>;

    fn kind(&self) -> PrimitiveKind { PrimitiveKind::Long }

    fn decode(&self, value: &Value) -> Result<DateTime<Utc>> {
        let millis = value.as_long().ok_or_else(|| mismatch("Long", value))?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| Error::Conversion(format!("timestamp {millis} out of range")))
    }

    fn encode(&self, value: &DateTime<Utc>) -> Option<Value> {
        Some(Value::Long(value.timestamp_millis()))
    }
}

// ============================================================================
// Arbitrary scalar types
// ============================================================================

/// A user domain type stored through a base scalar mapping.
///
/// `encode` may decline a value (`None`): single fields then persist nothing
/// and list/set fields drop the element.
pub struct Converted<S: ScalarMapping, D> {
    base: S,
    decode: fn(S::Domain) -> Option<D>,
    encode: fn(&D) -> Option<S::Domain>,
}

impl<S, D> Converted<S, D>
where
    S: ScalarMapping,
    D: Clone + Send + Sync + 'static,
{
    pub fn new(
        base: S,
        decode: fn(S::Domain) -> Option<D>,
        encode: fn(&D) -> Option<S::Domain>,
    ) -> Self {
        Self { base, decode, encode }
    }
}

impl<S: ScalarMapping + Clone, D> Clone for Converted<S, D> {
    fn clone(&self) -> Self {
        Self { base: self.base.clone(), decode: self.decode, encode: self.encode }
    }
}

impl<S, D> ScalarMapping for Converted<S, D>
where
    S: ScalarMapping,
    D: Clone + Send + Sync + 'static,
{
    type Domain = D;

    fn kind(&self) -> PrimitiveKind {
        self.base.kind()
    }

    fn decode(&self, value: &Value) -> Result<D> {
        let raw = self.base.decode(value)?;
        (self.decode)(raw).ok_or_else(|| {
            Error::Conversion(format!(
                "{value} is not a valid {}",
                std::any::type_name::<D>()
            ))
        })
    }

    fn encode(&self, value: &D) -> Option<Value> {
        (self.encode)(value).and_then(|raw| self.base.encode(&raw))
    }
}
