//! Configurations
//!
//! A configuration is a named, reusable bundle of registration declarations:
//! its identity, the configurations it depends on, and the origin requests
//! it contributes. Authors implement [`RegistrationConfig`]; the registry
//! turns each declared configuration into an initialized, immutable
//! [`ConfigInstance`] exactly once per process.

use crate::index::{RegisteredTypes, RegistrationRecord};
use crate::request::RegistrationRequest;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Identity of a configuration
///
/// Structural equality; this is the value that crosses the wire inside a
/// serializer profile, so a receiver with the same configuration library can
/// reconstruct an equivalent serializer from it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(String);

impl ConfigId {
    /// Create an identity from a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity as a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConfigId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigId {
    fn from(name: &str) -> Self {
        ConfigId::new(name)
    }
}

/// Structural family a configuration belongs to
///
/// The format convention: every dependency of a configuration must be
/// [`FormatFamily::Neutral`] or declare the same family as the root.
/// Format-specific configurations cannot be mixed across families, and a
/// neutral root cannot absorb a format-specific dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormatFamily {
    /// Usable under any root
    #[default]
    Neutral,

    /// Document-object formats
    Document,

    /// Text / object-notation formats
    Text,

    /// Key-value string formats
    KeyValue,

    /// Binary formats
    Binary,
}

impl FormatFamily {
    /// Whether a dependency of this family may appear under `root`
    #[inline]
    #[must_use]
    pub fn compatible_with(self, root: FormatFamily) -> bool {
        self == FormatFamily::Neutral || self == root
    }
}

/// A declared configuration
///
/// Implementations are registered with the configuration registry and
/// initialized at most once per process. The two hooks let a format backend
/// attach per-type bookkeeping at registration time (`on_record`) and run
/// one-time post-registration work (`on_finalize`), such as computing which
/// registered types participate in an inheritance hierarchy.
pub trait RegistrationConfig: Send + Sync {
    /// Identity of this configuration
    fn identity(&self) -> ConfigId;

    /// Structural family (format convention)
    fn family(&self) -> FormatFamily {
        FormatFamily::Neutral
    }

    /// Identities of the configurations this one depends on
    fn dependencies(&self) -> Vec<ConfigId> {
        Vec::new()
    }

    /// Origin registration requests contributed by this configuration
    fn requests(&self) -> Vec<RegistrationRequest>;

    /// Whether this is a permissive null/no-op configuration
    ///
    /// Permissive configurations resolve the default unregistered-type
    /// policy to no enforcement.
    fn permissive(&self) -> bool {
        false
    }

    /// Called as each of this configuration's own records is registered
    fn on_record(&self, record: &RegistrationRecord) {
        let _ = record;
    }

    /// Called once after every record (own and inherited) is in place
    fn on_finalize(&self, index: &RegisteredTypes) {
        let _ = index;
    }
}

/// An initialized configuration
///
/// Immutable after initialization except for the append-only just-in-time
/// closed-generic path. Owned by the registry for the life of the process.
pub struct ConfigInstance {
    identity: ConfigId,
    family: FormatFamily,
    permissive: bool,
    index: RegisteredTypes,
    own_records: Vec<RegistrationRecord>,
}

impl ConfigInstance {
    pub(crate) fn new(
        identity: ConfigId,
        family: FormatFamily,
        permissive: bool,
        index: RegisteredTypes,
        own_records: Vec<RegistrationRecord>,
    ) -> Self {
        Self {
            identity,
            family,
            permissive,
            index,
            own_records,
        }
    }

    /// Identity of the configuration
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &ConfigId {
        &self.identity
    }

    /// Structural family
    #[inline]
    #[must_use]
    pub fn family(&self) -> FormatFamily {
        self.family
    }

    /// Whether the configuration is permissive (null/no-op)
    #[inline]
    #[must_use]
    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// The full registered-type index of this configuration's closure
    #[inline]
    #[must_use]
    pub fn index(&self) -> &RegisteredTypes {
        &self.index
    }

    /// Records this configuration registered itself (non-inherited)
    #[inline]
    #[must_use]
    pub fn own_records(&self) -> &[RegistrationRecord] {
        &self.own_records
    }

    /// Whether `key` is registered anywhere in the closure
    #[must_use]
    pub fn is_registered(&self, key: &protean_types::TypeKey) -> bool {
        self.index.is_registered(key)
    }

    /// Owning configuration of `key`, if registered
    #[must_use]
    pub fn owner_of(&self, key: &protean_types::TypeKey) -> Option<ConfigId> {
        self.index.owner_of(key)
    }

    /// Append a just-in-time closed-generic instantiation
    ///
    /// Invoked by the validator when it proves a closed instantiation of a
    /// registered open definition; also directly invokable by a codec's own
    /// generic handling. Idempotent.
    pub fn register_closed_generic(&self, closed: protean_types::TypeKey, owner: ConfigId) {
        self.index.register_closed_generic(closed, owner);
    }
}

impl fmt::Debug for ConfigInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigInstance")
            .field("identity", &self.identity)
            .field("family", &self.family)
            .field("permissive", &self.permissive)
            .field("registered", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// Convenience alias for shared configuration declarations
pub type SharedConfig = Arc<dyn RegistrationConfig>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_id_round_trips_through_serde() {
        let id = ConfigId::new("geometry");
        let text = serde_json::to_string(&id).unwrap();
        assert_eq!(text, "\"geometry\"");
        let back: ConfigId = serde_json::from_str(&text).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn family_compatibility() {
        use FormatFamily::{Binary, Document, Neutral};
        assert!(Neutral.compatible_with(Document));
        assert!(Document.compatible_with(Document));
        assert!(!Binary.compatible_with(Document));
        assert!(!Document.compatible_with(Neutral));
    }
}
