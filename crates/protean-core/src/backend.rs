//! Format backend boundary
//!
//! The byte-level codecs live outside this engine. [`FormatBackend`] is the
//! seam they plug into: the facade validates, the backend encodes/decodes,
//! and the backend's own configurations use the registration hooks for any
//! per-format bookkeeping (converter tables, hierarchy tagging).

use crate::error::BackendError;
use crate::profile::WireFormat;
use protean_registry::ConfigInstance;
use protean_types::{GraphValue, TypeKey};
use std::any::Any;

/// A value decoded by a backend, type-erased at the boundary
pub type DecodedValue = Box<dyn Any + Send>;

/// One wire format's codec
pub trait FormatBackend: Send + Sync {
    /// The wire format this backend produces and consumes
    fn format(&self) -> WireFormat;

    /// Encode a validated object graph
    ///
    /// # Errors
    /// Returns a [`BackendError`] on any codec-level failure.
    fn encode(
        &self,
        value: &dyn GraphValue,
        config: &ConfigInstance,
    ) -> Result<Vec<u8>, BackendError>;

    /// Decode bytes into the declared type
    ///
    /// # Errors
    /// Returns a [`BackendError`] on any codec-level failure.
    fn decode(
        &self,
        bytes: &[u8],
        declared: &TypeKey,
        config: &ConfigInstance,
    ) -> Result<DecodedValue, BackendError>;
}
