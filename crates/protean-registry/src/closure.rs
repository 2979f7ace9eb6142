//! Transitive closure expansion
//!
//! [`ClosureBuilder`] turns a configuration's origin requests into the full
//! set of types that configuration owns. Expansion is breadth-first over a
//! FIFO queue: relation matches come from the universe, member matches from
//! the request key's arguments and its descriptor's declared members, and
//! every discovered type re-enters the queue as a spawned request.
//!
//! Each (type, member policy, relation policy) key is expanded at most
//! once. The seen-set is finite (bounded by the universe) and grows
//! monotonically, so expansion terminates even on cyclic type graphs such
//! as a node type containing a list of itself.

use crate::config::ConfigId;
use crate::error::RegistrationError;
use crate::index::{RegisteredTypes, RegistrationRecord};
use crate::request::{RegistrationRequest, RequestKey};
use indexmap::IndexSet;
use protean_types::{builtin, Registrability, TypeKey, TypeUniverse};
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Per-record callback fired as each owned record lands
pub type RecordHook<'a> = &'a dyn Fn(&RegistrationRecord);

/// Expands registration requests into an owned closure
pub struct ClosureBuilder<'a> {
    universe: &'a TypeUniverse,
    index: &'a RegisteredTypes,
    owner: ConfigId,
    hook: Option<RecordHook<'a>>,
}

impl<'a> ClosureBuilder<'a> {
    /// Create a builder registering on behalf of `owner`
    #[must_use]
    pub fn new(universe: &'a TypeUniverse, index: &'a RegisteredTypes, owner: ConfigId) -> Self {
        Self {
            universe,
            index,
            owner,
            hook: None,
        }
    }

    /// Attach a callback fired for every record this expansion adds
    #[must_use]
    pub fn with_hook(mut self, hook: RecordHook<'a>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Expand `initial` requests into the owned closure
    ///
    /// Origin requests are validated and registered first, unconditionally;
    /// spawned requests register only when their type is registrable and not
    /// already owned. Returns the records added by this expansion, in
    /// registration order.
    ///
    /// # Errors
    /// Fails on an origin request for an open, blacklisted, synthesized, or
    /// undeclared type, and on any duplicate origin registration.
    pub fn expand(
        &self,
        initial: Vec<RegistrationRequest>,
    ) -> Result<Vec<RegistrationRecord>, RegistrationError> {
        let mut added = Vec::new();

        for request in initial.iter().filter(|r| r.origin) {
            self.check_origin(&request.target)?;
            let record = RegistrationRecord {
                key: request.target.clone(),
                owner: self.owner.clone(),
                origin: true,
            };
            self.index.try_register(record.clone())?;
            self.emit(&record, &mut added);
        }

        let mut queue: VecDeque<RegistrationRequest> = initial.into();
        let mut seen: HashSet<RequestKey> = HashSet::new();

        while let Some(request) = queue.pop_front() {
            if !request.origin && !self.index.is_registered(&request.target) {
                if self.universe.registrability(&request.target).is_registrable() {
                    let record = RegistrationRecord {
                        key: request.target.clone(),
                        owner: self.owner.clone(),
                        origin: false,
                    };
                    if self.index.register_if_absent(record.clone()) {
                        self.emit(&record, &mut added);
                    }
                } else {
                    trace!(key = %request.target, "spawned request skipped: not registrable");
                }
            }

            if !seen.insert(request.key()) {
                continue;
            }

            for key in self.types_of_interest(&request) {
                let spawned =
                    RegistrationRequest::spawned(key, request.members, request.relations);
                if !seen.contains(&spawned.key()) {
                    queue.push_back(spawned);
                }
            }
        }

        Ok(added)
    }

    /// Additional types one request pulls in, target itself excluded
    fn types_of_interest(&self, request: &RegistrationRequest) -> IndexSet<TypeKey> {
        let target = &request.target;
        let mut found = IndexSet::new();

        if request.relations.includes_ancestors() {
            found.extend(self.universe.ancestors_of(target));
        }
        if request.relations.includes_descendants() {
            found.extend(self.universe.descendants_of(target));
        }

        if request.members.type_arguments {
            found.extend(target.args().iter().cloned());
        }
        if request.members.elements && builtin::is_container(target) {
            found.extend(target.args().iter().cloned());
        }
        if request.members.properties || request.members.fields {
            if let Some(descriptor) = self.universe.descriptor(target) {
                for member in descriptor.members().iter().filter(|m| !m.synthesized) {
                    let wanted = match member.kind {
                        protean_types::MemberKind::Property => request.members.properties,
                        protean_types::MemberKind::Field => request.members.fields,
                    };
                    if !wanted {
                        continue;
                    }
                    if let Some(key) = member.ty.resolve(target.args()) {
                        found.insert(key);
                    }
                }
            }
        }

        found.shift_remove(target);
        found
    }

    /// Strict registrability check for origin requests
    fn check_origin(&self, key: &TypeKey) -> Result<(), RegistrationError> {
        match self.universe.registrability(key) {
            Registrability::Registrable => Ok(()),
            Registrability::OpenGeneric => Err(RegistrationError::OpenType { key: key.clone() }),
            Registrability::Blacklisted { reason } => Err(RegistrationError::NotRegistrable {
                key: key.clone(),
                reason,
            }),
            Registrability::Synthesized => Err(RegistrationError::NotRegistrable {
                key: key.clone(),
                reason: "compiler-synthesized type".to_string(),
            }),
            Registrability::Unknown => Err(RegistrationError::NotRegistrable {
                key: key.clone(),
                reason: "no descriptor installed for this name".to_string(),
            }),
        }
    }

    fn emit(&self, record: &RegistrationRecord, added: &mut Vec<RegistrationRecord>) {
        if let Some(hook) = self.hook {
            hook(record);
        }
        added.push(record.clone());
    }
}
