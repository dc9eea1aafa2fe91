//! PropertyMap: the key-value store on vertices and edges.

use std::collections::HashMap;
use super::Value;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Identity property, assigned by the backend and unique across the store.
pub const ID: &str = "_id";
/// Actor that created the element.
pub const CREATED_BY: &str = "_createdBy";
/// Creation timestamp.
pub const CREATED_AT: &str = "_createdAt";
/// Actor of the most recent update, absent until the first update.
pub const UPDATED_BY: &str = "_updatedBy";
/// Timestamp of the most recent update.
pub const UPDATED_AT: &str = "_updatedAt";
/// Label stored alongside the element by some backends.
pub const LABEL: &str = "_label";

/// Property names no model field may use.
pub const RESERVED: [&str; 6] = [ID, CREATED_BY, CREATED_AT, UPDATED_BY, UPDATED_AT, LABEL];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}
