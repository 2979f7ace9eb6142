//! Registration requests and expansion policies
//!
//! A [`RegistrationRequest`] asks for one type to be registered and says how
//! far to look for further types of interest: which *members* to pull in
//! (generic arguments, container elements, declared properties and fields)
//! and which *relations* to search the universe for (ancestors,
//! descendants).
//!
//! Requests come in two flavors. An **origin** request is declared by a
//! configuration author and must succeed; a collision is a hard error. A
//! **spawned** request was discovered by expansion and is silently skipped
//! when its type is already owned or not registrable.

use protean_types::TypeKey;

/// Which declared members of a type spawn further registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemberExpansion {
    /// Bound generic arguments of the request's key
    pub type_arguments: bool,

    /// Element/argument types of builtin container keys
    pub elements: bool,

    /// Declared property members
    pub properties: bool,

    /// Declared field members
    pub fields: bool,
}

impl MemberExpansion {
    /// Expand nothing
    pub const NONE: MemberExpansion = MemberExpansion {
        type_arguments: false,
        elements: false,
        properties: false,
        fields: false,
    };

    /// Expand everything
    pub const ALL: MemberExpansion = MemberExpansion {
        type_arguments: true,
        elements: true,
        properties: true,
        fields: true,
    };

    /// Whether any member expansion is enabled
    #[inline]
    #[must_use]
    pub fn is_any(self) -> bool {
        self.type_arguments || self.elements || self.properties || self.fields
    }
}

/// Which related types the universe is searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelationExpansion {
    /// No relation search
    #[default]
    None,

    /// Transitive ancestors of the request's key
    Ancestors,

    /// Every registrable type descending from the request's key
    Descendants,

    /// Ancestors and descendants
    Both,
}

impl RelationExpansion {
    /// Whether ancestors are included
    #[inline]
    #[must_use]
    pub fn includes_ancestors(self) -> bool {
        matches!(self, RelationExpansion::Ancestors | RelationExpansion::Both)
    }

    /// Whether descendants are included
    #[inline]
    #[must_use]
    pub fn includes_descendants(self) -> bool {
        matches!(self, RelationExpansion::Descendants | RelationExpansion::Both)
    }
}

/// A request to register one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// The type to register
    pub target: TypeKey,

    /// Member-expansion policy
    pub members: MemberExpansion,

    /// Relation-expansion policy
    pub relations: RelationExpansion,

    /// Whether this request was declared by an author (true) or spawned by
    /// expansion (false)
    pub origin: bool,
}

impl RegistrationRequest {
    /// An author-declared request; collisions are hard errors
    #[must_use]
    pub fn origin(target: TypeKey) -> Self {
        Self {
            target,
            members: MemberExpansion::ALL,
            relations: RelationExpansion::None,
            origin: true,
        }
    }

    /// An expansion-discovered request; collisions are silently skipped
    #[must_use]
    pub fn spawned(target: TypeKey, members: MemberExpansion, relations: RelationExpansion) -> Self {
        Self {
            target,
            members,
            relations,
            origin: false,
        }
    }

    /// Replace the member-expansion policy
    #[must_use]
    pub fn with_members(mut self, members: MemberExpansion) -> Self {
        self.members = members;
        self
    }

    /// Replace the relation-expansion policy
    #[must_use]
    pub fn with_relations(mut self, relations: RelationExpansion) -> Self {
        self.relations = relations;
        self
    }

    /// Idempotency key: target and policies, origin flag excluded
    ///
    /// Two requests with the same key expand identically, so only the first
    /// is ever expanded. This is what bounds expansion on cyclic type
    /// graphs.
    #[must_use]
    pub fn key(&self) -> RequestKey {
        RequestKey {
            target: self.target.clone(),
            members: self.members,
            relations: self.relations,
        }
    }
}

/// Idempotency key of a request (origin flag deliberately excluded)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    /// Requested type
    pub target: TypeKey,

    /// Member-expansion policy
    pub members: MemberExpansion,

    /// Relation-expansion policy
    pub relations: RelationExpansion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_defaults_to_full_member_expansion() {
        let request = RegistrationRequest::origin(TypeKey::new("geometry.Square"));
        assert!(request.origin);
        assert_eq!(request.members, MemberExpansion::ALL);
        assert_eq!(request.relations, RelationExpansion::None);
    }

    #[test]
    fn key_ignores_origin_flag() {
        let origin = RegistrationRequest::origin(TypeKey::new("geometry.Square"));
        let spawned = RegistrationRequest::spawned(
            TypeKey::new("geometry.Square"),
            MemberExpansion::ALL,
            RelationExpansion::None,
        );
        assert_eq!(origin.key(), spawned.key());
    }

    #[test]
    fn key_distinguishes_policies() {
        let a = RegistrationRequest::origin(TypeKey::new("geometry.Square"));
        let b = a.clone().with_relations(RelationExpansion::Descendants);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn relation_flags() {
        assert!(RelationExpansion::Both.includes_ancestors());
        assert!(RelationExpansion::Both.includes_descendants());
        assert!(!RelationExpansion::Descendants.includes_ancestors());
        assert!(!RelationExpansion::None.includes_descendants());
    }
}
