//! Typed single-property access by cardinality.
//!
//! Each accessor wraps the scalar mapping in the matching cardinality and
//! applies the backend's fix-ups before converting.

use std::collections::HashSet;
use std::hash::Hash;

use crate::mapping::{ListOf, Optional, ScalarMapping, SetOf, Single};
use crate::model::{ElementId, GraphElement};
use crate::storage::StorageBackend;
use crate::Result;
use super::Database;

impl<B: StorageBackend> Database<B> {
    /// Required property; absence is a conversion error.
    pub fn get_single<S: ScalarMapping>(&self, element: &dyn GraphElement, key: &str, scalar: S) -> Result<S::Domain> {
        self.read_property(element.properties(), key, &Single(scalar))
    }

    pub fn get_option<S: ScalarMapping>(
        &self,
        element: &dyn GraphElement,
        key: &str,
        scalar: S,
    ) -> Result<Option<S::Domain>> {
        self.read_property(element.properties(), key, &Optional(scalar))
    }

    /// Array property as a list; absence reads as empty.
    pub fn get_list<S: ScalarMapping>(&self, element: &dyn GraphElement, key: &str, scalar: S) -> Result<Vec<S::Domain>> {
        self.read_property(element.properties(), key, &ListOf(scalar))
    }

    /// Array property as a set; duplicates collapse.
    pub fn get_set<S>(&self, element: &dyn GraphElement, key: &str, scalar: S) -> Result<HashSet<S::Domain>>
    where
        S: ScalarMapping,
        S::Domain: Eq + Hash,
    {
        self.read_property(element.properties(), key, &SetOf(scalar))
    }

    pub fn set_single<S: ScalarMapping>(
        &self,
        tx: &mut B::Tx,
        id: &ElementId,
        key: &str,
        value: &S::Domain,
        scalar: S,
    ) -> Result<()> {
        self.write_property(tx, id, key, value, &Single(scalar))
    }

    /// `None` removes the property.
    pub fn set_option<S: ScalarMapping>(
        &self,
        tx: &mut B::Tx,
        id: &ElementId,
        key: &str,
        value: &Option<S::Domain>,
        scalar: S,
    ) -> Result<()> {
        self.write_property(tx, id, key, value, &Optional(scalar))
    }

    /// Stored as one array property. Elements without an encoding are dropped.
    pub fn set_list<S: ScalarMapping>(
        &self,
        tx: &mut B::Tx,
        id: &ElementId,
        key: &str,
        value: &Vec<S::Domain>,
        scalar: S,
    ) -> Result<()> {
        self.write_property(tx, id, key, value, &ListOf(scalar))
    }

    pub fn set_set<S>(
        &self,
        tx: &mut B::Tx,
        id: &ElementId,
        key: &str,
        value: &HashSet<S::Domain>,
        scalar: S,
    ) -> Result<()>
    where
        S: ScalarMapping,
        S::Domain: Eq + Hash,
    {
        self.write_property(tx, id, key, value, &SetOf(scalar))
    }
}
