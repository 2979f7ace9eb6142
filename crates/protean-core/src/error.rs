//! Error types for validation, resolution, and the serializer facade
//!
//! Every error here is fatal to the current serialize/deserialize call and
//! never retried: registration state is deterministic, so repetition without
//! a declaration change reproduces the same failure. The one deliberate
//! exception, the swallowed per-candidate trial failure, lives inside the
//! resolver and never surfaces as an error at all.

use crate::profile::{SerializerProfile, WireFormat};
use protean_registry::{ConfigId, RegistryError};
use protean_types::TypeKey;

/// Unregistered-type failures raised by the validator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The type under serialization/deserialization is not registered
    #[error("type {outer} is not registered with configuration {config}")]
    Unregistered {
        /// Offending type
        outer: TypeKey,
        /// Configuration consulted
        config: ConfigId,
    },

    /// A type nested inside the outer object graph is not registered
    #[error("type {nested}, contained in {outer}, is not registered with configuration {config}")]
    UnregisteredNested {
        /// Type being serialized/deserialized
        outer: TypeKey,
        /// The specific contained type that failed
        nested: TypeKey,
        /// Configuration consulted
        config: ConfigId,
    },

    /// A closed generic whose open definition nobody registered
    #[error(
        "cannot bind {closed}: open definition {template} is not registered \
         with configuration {config}"
    )]
    OpenDefinitionUnregistered {
        /// The closed instantiation that was requested
        closed: TypeKey,
        /// Its open definition
        template: TypeKey,
        /// Configuration consulted
        config: ConfigId,
    },
}

/// Untagged polymorphic resolution failures
///
/// Each variant carries the declared type, the payload's top-level keys,
/// and the candidates considered, so a failure can be diagnosed without
/// re-running the decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Declared type is the untyped placeholder: nothing to narrow from
    #[error("declared type is the untyped object root; payload is too ambiguous to resolve")]
    UntypedTarget,

    /// No assignable candidate covers the payload's keys
    #[error(
        "no candidate assignable to {declared} matches payload keys \
         [{}]; considered: [{}]", keys.join(", "), candidates.join(", ")
    )]
    NoCandidates {
        /// Declared (abstract) type
        declared: TypeKey,
        /// Payload's top-level keys
        keys: Vec<String>,
        /// Candidate type names that were considered
        candidates: Vec<String>,
    },

    /// Every loosely-matching candidate failed trial deserialization
    #[error(
        "every candidate for {declared} failed trial deserialization \
         against payload keys [{}]; tried: [{}]", keys.join(", "), candidates.join(", ")
    )]
    AllTrialsFailed {
        /// Declared (abstract) type
        declared: TypeKey,
        /// Payload's top-level keys
        keys: Vec<String>,
        /// Candidates whose trials were attempted
        candidates: Vec<String>,
    },

    /// Strict filtering eliminated every surviving candidate
    #[error(
        "no candidate for {declared} is fully covered by payload keys \
         [{}]; survivors were: [{}]", keys.join(", "), candidates.join(", ")
    )]
    NoStrictMatch {
        /// Declared (abstract) type
        declared: TypeKey,
        /// Payload's top-level keys
        keys: Vec<String>,
        /// Candidates that survived trial deserialization
        candidates: Vec<String>,
    },

    /// More than one candidate survived strict filtering
    #[error(
        "payload keys [{}] match multiple candidates for {declared}: [{}]; \
         refusing to guess", keys.join(", "), candidates.join(", ")
    )]
    Ambiguous {
        /// Declared (abstract) type
        declared: TypeKey,
        /// Payload's top-level keys
        keys: Vec<String>,
        /// The irreducible candidate set
        candidates: Vec<String>,
    },

    /// An explicitly tagged type failed registration validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Codec-boundary failures
///
/// The engine treats backend errors as opaque: what failed inside the codec
/// is the codec's story.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Encoding failed inside the codec
    #[error("encode failed: {0}")]
    Encode(String),

    /// Decoding failed inside the codec
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Serializer facade failures
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    /// The facade holds no backend for the requested format
    ///
    /// Defensive signal: a format variant was added without updating the
    /// facade's construction.
    #[error("no backend available for wire format {0:?}")]
    UnsupportedFormat(WireFormat),

    /// A payload stamped with a different profile was handed to this
    /// serializer
    #[error("payload profile {found} does not match serializer profile {expected}")]
    ProfileMismatch {
        /// This serializer's profile
        expected: SerializerProfile,
        /// The payload's profile
        found: SerializerProfile,
    },

    /// Validation rejected the call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backing codec failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration resolution failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
