//! Serializer profiles
//!
//! A [`SerializerProfile`] is the self-describing triple that accompanies
//! every payload: wire format, configuration identity, compression kind. A
//! receiver holding only this triple and the same configuration library can
//! reconstruct an equivalent serializer; two serializers with equal
//! profiles are interchangeable.

use protean_registry::{ConfigId, FormatFamily};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Wire format of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireFormat {
    /// Document-object codec
    Document,

    /// Text / object-notation codec
    Text,

    /// Key-value string codec
    KeyValue,

    /// Binary codec
    Binary,
}

impl WireFormat {
    /// Structural family this format's configurations must belong to
    #[must_use]
    pub fn family(self) -> FormatFamily {
        match self {
            WireFormat::Document => FormatFamily::Document,
            WireFormat::Text => FormatFamily::Text,
            WireFormat::KeyValue => FormatFamily::KeyValue,
            WireFormat::Binary => FormatFamily::Binary,
        }
    }
}

/// Compression applied around the codec's output
///
/// The engine only records the kind; wrapping itself belongs to the codec
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Compression {
    /// No compression
    #[default]
    None,

    /// Deflate-compressed payload
    Deflate,
}

/// The (format, configuration, compression) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializerProfile {
    /// Wire format
    pub format: WireFormat,

    /// Identity of the registration configuration
    pub config: ConfigId,

    /// Compression kind
    pub compression: Compression,
}

impl SerializerProfile {
    /// Create a profile with no compression
    #[must_use]
    pub fn new(format: WireFormat, config: ConfigId) -> Self {
        Self {
            format,
            config,
            compression: Compression::None,
        }
    }

    /// Replace the compression kind
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

impl Display for SerializerProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{}/{:?}",
            self.format, self.config, self.compression
        )
    }
}
