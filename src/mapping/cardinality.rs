//! Cardinality wrappers turning a scalar mapping into a field mapping.

use std::collections::HashSet;
use std::hash::Hash;

use crate::model::Value;
use crate::{Error, Result};
use super::{Cardinality, DomainType, Mapping, ScalarMapping, Signature};

fn signature_of<S: ScalarMapping>(scalar: &S, cardinality: Cardinality) -> Signature {
    Signature::new(DomainType::of::<S::Domain>(), cardinality, scalar.kind())
}

/// Element-wise decode of an array property. Absent reads as empty.
fn decode_all<S: ScalarMapping>(scalar: &S, value: Option<&Value>) -> Result<Vec<S::Domain>> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items.iter().map(|v| scalar.decode(v)).collect(),
        Some(other) => Err(Error::Conversion(format!(
            "expected LIST of {}, got {}",
            std::any::type_name::<S::Domain>(),
            other.type_name()
        ))),
    }
}

/// Element-wise encode; elements without a storable form are dropped.
fn encode_all<'a, S, I>(scalar: &S, values: I) -> Value
where
    S: ScalarMapping,
    I: IntoIterator<Item = &'a S::Domain>,
{
    Value::List(values.into_iter().filter_map(|v| scalar.encode(v)).collect())
}

/// Exactly one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Single<S>(pub S);

impl<S: ScalarMapping> Mapping for Single<S> {
    type Domain = S::Domain;

    fn signature(&self) -> Signature {
        signature_of(&self.0, Cardinality::Single)
    }

    fn to_domain(&self, value: Option<&Value>) -> Result<S::Domain> {
        match value {
            Some(v) => self.0.decode(v),
            None => Err(Error::Conversion(format!(
                "missing required {} value",
                std::any::type_name::<S::Domain>()
            ))),
        }
    }

    fn to_graph_opt(&self, value: &S::Domain) -> Option<Value> {
        self.0.encode(value)
    }
}

/// Zero or one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Optional<S>(pub S);

impl<S: ScalarMapping> Mapping for Optional<S> {
    type Domain = Option<S::Domain>;

    fn signature(&self) -> Signature {
        signature_of(&self.0, Cardinality::Optional)
    }

    fn to_domain(&self, value: Option<&Value>) -> Result<Option<S::Domain>> {
        value.map(|v| self.0.decode(v)).transpose()
    }

    fn to_graph_opt(&self, value: &Option<S::Domain>) -> Option<Value> {
        value.as_ref().and_then(|v| self.0.encode(v))
    }
}

/// Ordered values, duplicates kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOf<S>(pub S);

impl<S: ScalarMapping> Mapping for ListOf<S> {
    type Domain = Vec<S::Domain>;

    fn signature(&self) -> Signature {
        signature_of(&self.0, Cardinality::List)
    }

    fn to_domain(&self, value: Option<&Value>) -> Result<Vec<S::Domain>> {
        decode_all(&self.0, value)
    }

    fn to_graph_opt(&self, value: &Vec<S::Domain>) -> Option<Value> {
        Some(encode_all(&self.0, value))
    }
}

/// Unordered distinct values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOf<S>(pub S);

impl<S> Mapping for SetOf<S>
where
    S: ScalarMapping,
    S::Domain: Eq + Hash,
{
    type Domain = HashSet<S::Domain>;

    fn signature(&self) -> Signature {
        signature_of(&self.0, Cardinality::Set)
    }

    fn to_domain(&self, value: Option<&Value>) -> Result<HashSet<S::Domain>> {
        Ok(decode_all(&self.0, value)?.into_iter().collect())
    }

    fn to_graph_opt(&self, value: &HashSet<S::Domain>) -> Option<Value> {
        Some(encode_all(&self.0, value))
    }
}
