//! Decode and encode between [`CityModel`] and the CityJSON wire format.
//!
//! The codec works on `serde_json::Value` trees: the low-level tokenizer and
//! writer are serde_json's, consumed wholesale; this module implements the
//! polymorphic dispatch on top, resolving discriminators through the
//! [registry](crate::registry) and splitting declared members from extension
//! properties.

use std::io;
use std::sync::Arc;

use serde_json::Value;

use crate::model::CityModel;
use crate::util::Result;

mod decode;
mod encode;

/// Predicate over city object discriminators.
pub type TypeFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Configurable CityJSON codec.
///
/// A single codec value is cheap to clone and can be reused across
/// documents; each decode or encode call runs to completion on its own
/// document and shares nothing but the process-wide registry.
#[derive(Clone, Default)]
pub struct CityJsonCodec {
    type_filter: Option<TypeFilter>,
    process_unknown_extensions: bool,
    vertices_as_integer: bool,
}

impl CityJsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only decode and encode city objects whose discriminator passes the
    /// filter. Rejected objects are omitted entirely; references to them are
    /// not repaired.
    pub fn with_type_filter(
        mut self,
        filter: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.type_filter = Some(Arc::new(filter));
        self
    }

    /// Decode records with unknown discriminators into generic city objects
    /// flagged [`UNKNOWN_EXTENSION`](crate::object::UNKNOWN_EXTENSION)
    /// instead of dropping them.
    pub fn process_unknown_extensions(mut self, process: bool) -> Self {
        self.process_unknown_extensions = process;
        self
    }

    /// Emit vertex coordinates truncated to integers instead of as floats.
    pub fn serialize_vertices_as_integer(mut self, as_integer: bool) -> Self {
        self.vertices_as_integer = as_integer;
        self
    }

    pub(crate) fn accepts_type(&self, type_name: &str) -> bool {
        self.type_filter.as_ref().map_or(true, |f| f(type_name))
    }

    pub(crate) fn fallback_enabled(&self) -> bool {
        self.process_unknown_extensions
    }

    pub(crate) fn integer_vertices(&self) -> bool {
        self.vertices_as_integer
    }

    /// Decode a document from a parsed JSON tree.
    pub fn from_value(&self, value: Value) -> Result<CityModel> {
        decode::document(self, value)
    }

    /// Decode a document from a reader.
    pub fn read(&self, reader: impl io::Read) -> Result<CityModel> {
        self.from_value(serde_json::from_reader(reader)?)
    }

    /// Decode a document from a string.
    pub fn read_str(&self, json: &str) -> Result<CityModel> {
        self.from_value(serde_json::from_str(json)?)
    }

    /// Encode a document to a JSON tree.
    pub fn to_value(&self, model: &CityModel) -> Result<Value> {
        encode::document(self, model)
    }

    /// Encode a document to a writer.
    pub fn write(&self, model: &CityModel, writer: impl io::Write) -> Result<()> {
        serde_json::to_writer(writer, &self.to_value(model)?)?;
        Ok(())
    }

    /// Encode a document to a string.
    pub fn to_string(&self, model: &CityModel) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value(model)?)?)
    }
}

impl std::fmt::Debug for CityJsonCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CityJsonCodec")
            .field("has_type_filter", &self.type_filter.is_some())
            .field("process_unknown_extensions", &self.process_unknown_extensions)
            .field("vertices_as_integer", &self.vertices_as_integer)
            .finish()
    }
}
