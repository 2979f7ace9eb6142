//! Registered-type index
//!
//! [`RegisteredTypes`] maps each concrete type to the configuration that
//! owns it. Within one dependency closure every type has exactly one owner;
//! a second claim is a hard construction-time error, never silently
//! resolved.
//!
//! The index is write-once-then-read-only per configuration instance, with
//! one exception: the just-in-time closed-generic path appends concurrently
//! and idempotently after initialization.

use crate::config::ConfigId;
use crate::error::RegistrationError;
use indexmap::IndexMap;
use parking_lot::RwLock;
use protean_types::TypeKey;
use tracing::trace;

/// Binding of one concrete type to its owning configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    /// Registered type
    pub key: TypeKey,

    /// Owning configuration
    pub owner: ConfigId,

    /// Whether the registration was author-declared (vs. spawned/JIT)
    pub origin: bool,
}

/// Map from concrete type to owning configuration
///
/// Iteration order is insertion order, so a closure built from the same
/// declarations always reports its records in the same order.
#[derive(Debug, Default)]
pub struct RegisteredTypes {
    records: RwLock<IndexMap<TypeKey, RegistrationRecord>>,
}

impl RegisteredTypes {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, failing on any existing owner
    ///
    /// # Errors
    /// Returns [`RegistrationError::Duplicate`] naming both owners when the
    /// type is already registered, by the same configuration or another.
    pub fn try_register(&self, record: RegistrationRecord) -> Result<(), RegistrationError> {
        let mut records = self.records.write();
        if let Some(existing) = records.get(&record.key) {
            return Err(RegistrationError::Duplicate {
                key: record.key,
                existing: existing.owner.clone(),
                claimant: record.owner,
            });
        }
        trace!(key = %record.key, owner = %record.owner, origin = record.origin, "registered");
        records.insert(record.key.clone(), record);
        Ok(())
    }

    /// Register a type unless it already has an owner
    ///
    /// The spawned-request path: an existing owner is not an error, the
    /// request is simply dropped. Returns whether the record was inserted.
    pub fn register_if_absent(&self, record: RegistrationRecord) -> bool {
        let mut records = self.records.write();
        if records.contains_key(&record.key) {
            return false;
        }
        trace!(key = %record.key, owner = %record.owner, "registered (spawned)");
        records.insert(record.key.clone(), record);
        true
    }

    /// Append a just-in-time closed-generic instantiation
    ///
    /// Idempotent under concurrency: an insert racing an existing entry for
    /// the same closed key is a no-op, not an error.
    pub fn register_closed_generic(&self, closed: TypeKey, owner: ConfigId) {
        let inserted = self.register_if_absent(RegistrationRecord {
            key: closed.clone(),
            owner,
            origin: false,
        });
        if inserted {
            trace!(key = %closed, "closed generic appended");
        }
    }

    /// Whether a type is registered
    #[must_use]
    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.records.read().contains_key(key)
    }

    /// Owning configuration of a type, if registered
    #[must_use]
    pub fn owner_of(&self, key: &TypeKey) -> Option<ConfigId> {
        self.records.read().get(key).map(|r| r.owner.clone())
    }

    /// Snapshot of every record, in registration order
    #[must_use]
    pub fn records(&self) -> Vec<RegistrationRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(name: &str, owner: &str) -> RegistrationRecord {
        RegistrationRecord {
            key: TypeKey::new(name),
            owner: ConfigId::new(owner),
            origin: true,
        }
    }

    #[test]
    fn register_and_query() {
        let index = RegisteredTypes::new();
        index.try_register(record("geometry.Square", "geometry")).unwrap();

        assert!(index.is_registered(&TypeKey::new("geometry.Square")));
        assert_eq!(
            index.owner_of(&TypeKey::new("geometry.Square")),
            Some(ConfigId::new("geometry"))
        );
        assert!(!index.is_registered(&TypeKey::new("geometry.Circle")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn duplicate_is_hard_error() {
        let index = RegisteredTypes::new();
        index.try_register(record("geometry.Square", "geometry")).unwrap();
        let err = index
            .try_register(record("geometry.Square", "drawing"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Duplicate { existing, claimant, .. }
                if existing == ConfigId::new("geometry") && claimant == ConfigId::new("drawing")
        ));
    }

    #[test]
    fn spawned_registration_skips_silently() {
        let index = RegisteredTypes::new();
        index.try_register(record("geometry.Square", "geometry")).unwrap();
        assert!(!index.register_if_absent(record("geometry.Square", "drawing")));
        // First owner wins.
        assert_eq!(
            index.owner_of(&TypeKey::new("geometry.Square")),
            Some(ConfigId::new("geometry"))
        );
    }

    #[test]
    fn closed_generic_append_is_idempotent() {
        let index = RegisteredTypes::new();
        let closed = TypeKey::generic("containers.Wrapper", [TypeKey::new("geometry.Square")]);
        index.register_closed_generic(closed.clone(), ConfigId::new("containers"));
        index.register_closed_generic(closed.clone(), ConfigId::new("containers"));

        assert!(index.is_registered(&closed));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn records_preserve_insertion_order() {
        let index = RegisteredTypes::new();
        index.try_register(record("b.B", "cfg")).unwrap();
        index.try_register(record("a.A", "cfg")).unwrap();
        let names: Vec<_> = index.records().iter().map(|r| r.key.to_string()).collect();
        assert_eq!(names, vec!["b.B", "a.A"]);
    }
}
