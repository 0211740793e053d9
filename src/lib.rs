//! # CityJSON
//!
//! Rust implementation of the CityJSON city-model exchange format.
//!
//! CityJSON and the CityGML data model it encodes are developed by the OGC.
//! This is an independent Rust implementation of the 1.0 wire format: a
//! document model plus a bidirectional mapping to the JSON encoding.
//!
//! ## Modules
//!
//! - [`util`] - Errors and date handling
//! - [`registry`] - Runtime-extensible discriminator registry
//! - [`model`] - The document aggregate (city model, vertices, metadata)
//! - [`object`] - City objects and their attribute bags
//! - [`geom`] - Geometry kinds, boundaries, semantics, templates
//! - [`appearance`] - Materials, textures and per-theme value arrays
//! - [`codec`] - Decode/encode between model and wire format
//!
//! ## Example
//!
//! ```ignore
//! use cityjson::prelude::*;
//!
//! let codec = CityJsonCodec::new();
//! let model = codec.read(std::fs::File::open("city.json")?)?;
//!
//! for object in model.city_objects() {
//!     println!("{} ({})", object.id(), object.type_name());
//! }
//! ```

pub mod appearance;
pub mod codec;
pub mod geom;
pub mod model;
pub mod object;
pub mod registry;
pub mod util;

// Re-export commonly used types
pub use codec::CityJsonCodec;
pub use model::{CityModel, Transform, VerticesList};
pub use object::CityObject;
pub use util::{Error, RegistrationError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::appearance::Appearance;
    pub use crate::codec::CityJsonCodec;
    pub use crate::geom::*;
    pub use crate::model::{CityModel, Extension, Metadata, Transform, VerticesList};
    pub use crate::object::{Address, Attributes, CityObject, UNKNOWN_EXTENSION};
    pub use crate::registry::{registry, AttributeType, ExtensionTarget};
    pub use crate::util::{Error, RegistrationError, Result};
}
