//! Serializer facade
//!
//! [`Serializer`] binds a profile, an initialized configuration, a resolved
//! unregistered-type policy, and one format backend. Every serialize call
//! validates the runtime object graph before the backend sees it; every
//! deserialize call validates the declared target type before the backend
//! decodes. Payloads are stamped with the profile so any receiver holding
//! the same configuration library can rebuild an equivalent serializer.

use crate::backend::{DecodedValue, FormatBackend};
use crate::error::SerializerError;
use crate::policy::UnregisteredTypePolicy;
use crate::profile::SerializerProfile;
use crate::resolver::UntaggedResolver;
use crate::validator::GraphValidator;
use protean_registry::{ConfigInstance, ConfigRegistry};
use protean_types::{GraphValue, TypeKey, TypeUniverse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A profile-stamped serialized payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// The triple describing the serializer that produced these bytes
    pub profile: SerializerProfile,

    /// Codec output
    pub bytes: Vec<u8>,
}

/// A configured serializer for one wire format
pub struct Serializer {
    profile: SerializerProfile,
    instance: Arc<ConfigInstance>,
    universe: Arc<TypeUniverse>,
    validator: GraphValidator,
    policy: UnregisteredTypePolicy,
    backend: Arc<dyn FormatBackend>,
}

impl Serializer {
    /// Build a serializer from its profile
    ///
    /// The policy resolves against the configuration's permissive flag here,
    /// at construction, and is fixed for the life of the instance.
    ///
    /// # Errors
    /// Fails when the backend's format disagrees with the profile or when
    /// the profile's configuration cannot be initialized.
    pub fn new(
        registry: &ConfigRegistry,
        profile: SerializerProfile,
        policy: UnregisteredTypePolicy,
        backend: Arc<dyn FormatBackend>,
    ) -> Result<Self, SerializerError> {
        if backend.format() != profile.format {
            return Err(SerializerError::UnsupportedFormat(profile.format));
        }
        let instance = registry.get_or_initialize(&profile.config)?;
        let universe = registry.universe().clone();
        let policy = policy.resolve(instance.is_permissive());
        let validator = GraphValidator::new(instance.clone(), universe.clone());
        debug!(%profile, ?policy, "serializer constructed");
        Ok(Self {
            profile,
            instance,
            universe,
            validator,
            policy,
            backend,
        })
    }

    /// The profile stamped onto every payload
    #[inline]
    #[must_use]
    pub fn profile(&self) -> &SerializerProfile {
        &self.profile
    }

    /// The initialized configuration backing this serializer
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Arc<ConfigInstance> {
        &self.instance
    }

    /// The effective unregistered-type policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> UnregisteredTypePolicy {
        self.policy
    }

    /// Validate and encode an object graph
    ///
    /// # Errors
    /// Fails when the graph contains an unregistered runtime type (under an
    /// enforcing policy) or when the backend fails to encode.
    pub fn serialize(&self, value: &dyn GraphValue) -> Result<Payload, SerializerError> {
        self.validator.check_serialize(value, self.policy)?;
        let bytes = self.backend.encode(value, &self.instance)?;
        Ok(Payload {
            profile: self.profile.clone(),
            bytes,
        })
    }

    /// Validate and decode a payload into the declared type
    ///
    /// # Errors
    /// Fails when the payload was stamped by a different profile, when the
    /// declared type fails validation, or when the backend fails to decode.
    pub fn deserialize(
        &self,
        payload: &Payload,
        declared: &TypeKey,
    ) -> Result<DecodedValue, SerializerError> {
        if payload.profile != self.profile {
            return Err(SerializerError::ProfileMismatch {
                expected: self.profile.clone(),
                found: payload.profile.clone(),
            });
        }
        self.validator.check_deserialize(declared, self.policy)?;
        Ok(self.backend.decode(&payload.bytes, declared, &self.instance)?)
    }

    /// An untagged resolver over this serializer's configuration
    ///
    /// Used by codecs for legacy payloads that carry no concrete-type tag.
    #[must_use]
    pub fn resolver(&self) -> UntaggedResolver {
        UntaggedResolver::new(self.instance.clone(), self.universe.clone())
    }
}

impl std::fmt::Debug for Serializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer")
            .field("profile", &self.profile)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
