//! # Property Graph Model
//!
//! Plain DTOs that cross every boundary: storage ↔ database ↔ traversal ↔ user.
//!
//! Design rule: this module is pure data with no I/O and no locks.

pub mod element;
pub mod vertex;
pub mod edge;
pub mod value;
pub mod property_map;

pub use element::{ElementId, Direction, GraphElement, Item};
pub use vertex::Vertex;
pub use edge::Edge;
pub use value::Value;
pub use property_map::PropertyMap;
