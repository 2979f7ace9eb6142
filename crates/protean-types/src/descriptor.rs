//! Type descriptors
//!
//! A [`TypeDescriptor`] is the explicit, declared shape of a type: its kind,
//! generic arity, members, and ancestors. Descriptors replace runtime
//! reflection: every fact the engine needs about a type is stated up front
//! in a manifest and validated once at install time.

use crate::builtin;
use crate::key::TypeKey;
use serde::{Deserialize, Serialize};

/// Classification of a described type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Concrete data-carrying type
    Struct,

    /// Closed set of named variants
    Enum,

    /// Interface or abstract-class analogue; never instantiated directly
    Abstract,
}

/// Declared type of a member
///
/// Members of generic templates may reference the template's parameters by
/// position; the reference is resolved against a closed key's bound
/// arguments during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberType {
    /// A fully-named type
    Concrete(TypeKey),

    /// The enclosing template's `n`-th type parameter
    Param(usize),
}

impl MemberType {
    /// Resolve against the bound arguments of a closed key
    ///
    /// Returns `None` for a parameter reference the key does not bind
    /// (i.e. the enclosing key is still open).
    #[must_use]
    pub fn resolve(&self, args: &[TypeKey]) -> Option<TypeKey> {
        match self {
            MemberType::Concrete(key) => Some(key.clone()),
            MemberType::Param(index) => args.get(*index).cloned(),
        }
    }
}

/// How a member is declared on its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    /// Property with accessor semantics
    Property,

    /// Plain field
    Field,
}

/// A declared field or property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member name as written by the type's author
    pub name: String,

    /// Property or field
    pub kind: MemberKind,

    /// Declared type
    pub ty: MemberType,

    /// Compiler-synthesized members are invisible to expansion and matching
    pub synthesized: bool,
}

impl MemberDescriptor {
    /// Case-insensitive name match, as used by payload-shape comparison
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Declared shape of one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    arity: usize,
    members: Vec<MemberDescriptor>,
    ancestors: Vec<TypeKey>,
    instantiable: bool,
    synthesized: bool,
}

impl TypeDescriptor {
    /// Start building a descriptor for `name`
    #[must_use]
    pub fn builder(name: impl Into<String>, kind: TypeKind) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            key: TypeKey::new(name),
            kind,
            arity: 0,
            members: Vec::new(),
            ancestors: Vec::new(),
            instantiable: kind != TypeKind::Abstract,
            synthesized: false,
        }
    }

    /// Base key (never carries bound arguments)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Kind classification
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Number of generic parameters (0 for non-generic types)
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Declared members, synthesized ones included
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Explicitly declared ancestors (direct only)
    #[inline]
    #[must_use]
    pub fn ancestors(&self) -> &[TypeKey] {
        &self.ancestors
    }

    /// Whether the type can be constructed directly
    #[inline]
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    /// Whether the type is compiler-synthesized
    #[inline]
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// Whether the type is abstract
    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    /// Public member names, synthesized members excluded, original casing
    #[must_use]
    pub fn member_names(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| !m.synthesized)
            .map(|m| m.name.as_str())
            .collect()
    }

    /// Whether every name in `names` has a same-named member (loose match)
    #[must_use]
    pub fn covers_names<'a>(&self, mut names: impl Iterator<Item = &'a str>) -> bool {
        names.all(|name| self.members.iter().any(|m| !m.synthesized && m.matches(name)))
    }
}

/// Builder for [`TypeDescriptor`]
#[derive(Debug, Clone)]
pub struct TypeDescriptorBuilder {
    key: TypeKey,
    kind: TypeKind,
    arity: usize,
    members: Vec<MemberDescriptor>,
    ancestors: Vec<TypeKey>,
    instantiable: bool,
    synthesized: bool,
}

impl TypeDescriptorBuilder {
    /// Name the declaration was started with
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Declare the number of generic parameters
    #[must_use]
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Declare a property member with a concrete type
    #[must_use]
    pub fn property(self, name: impl Into<String>, ty: TypeKey) -> Self {
        self.member(name, MemberKind::Property, MemberType::Concrete(ty))
    }

    /// Declare a field member with a concrete type
    #[must_use]
    pub fn field(self, name: impl Into<String>, ty: TypeKey) -> Self {
        self.member(name, MemberKind::Field, MemberType::Concrete(ty))
    }

    /// Declare a property typed by the template's `index`-th parameter
    #[must_use]
    pub fn param_property(self, name: impl Into<String>, index: usize) -> Self {
        self.member(name, MemberKind::Property, MemberType::Param(index))
    }

    /// Declare a member with full control
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, kind: MemberKind, ty: MemberType) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            kind,
            ty,
            synthesized: false,
        });
        self
    }

    /// Declare a compiler-synthesized member (ignored by expansion/matching)
    #[must_use]
    pub fn synthesized_member(mut self, name: impl Into<String>, ty: TypeKey) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            kind: MemberKind::Field,
            ty: MemberType::Concrete(ty),
            synthesized: true,
        });
        self
    }

    /// Declare a direct ancestor
    #[must_use]
    pub fn ancestor(mut self, key: TypeKey) -> Self {
        self.ancestors.push(key);
        self
    }

    /// Mark the type itself as compiler-synthesized
    #[must_use]
    pub fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }

    /// Mark the type as not directly constructible
    #[must_use]
    pub fn not_instantiable(mut self) -> Self {
        self.instantiable = false;
        self
    }

    /// Validate and produce the descriptor
    ///
    /// # Errors
    /// Returns a [`DescriptorError`] for an empty name, a builtin-namespace
    /// name, duplicate member names, or a parameter reference outside the
    /// declared arity.
    pub fn build(self) -> Result<TypeDescriptor, DescriptorError> {
        if self.key.name().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if builtin::is_builtin(&self.key) {
            return Err(DescriptorError::BuiltinNamespace {
                name: self.key.name().to_string(),
            });
        }
        for (i, member) in self.members.iter().enumerate() {
            if member.name.is_empty() {
                return Err(DescriptorError::EmptyMemberName {
                    ty: self.key.name().to_string(),
                });
            }
            if self.members[..i].iter().any(|m| m.matches(&member.name)) {
                return Err(DescriptorError::DuplicateMember {
                    ty: self.key.name().to_string(),
                    member: member.name.clone(),
                });
            }
            if let MemberType::Param(index) = member.ty {
                if index >= self.arity {
                    return Err(DescriptorError::ParamOutOfRange {
                        ty: self.key.name().to_string(),
                        member: member.name.clone(),
                        index,
                        arity: self.arity,
                    });
                }
            }
        }
        Ok(TypeDescriptor {
            key: self.key,
            kind: self.kind,
            arity: self.arity,
            members: self.members,
            ancestors: self.ancestors,
            instantiable: self.instantiable,
            synthesized: self.synthesized,
        })
    }
}

/// Structural problems in a declared descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// Descriptor with no name
    #[error("descriptor has an empty type name")]
    EmptyName,

    /// User descriptors may not claim the builtin namespace
    #[error("type {name} claims the builtin namespace")]
    BuiltinNamespace {
        /// Offending name
        name: String,
    },

    /// Member with no name
    #[error("type {ty} declares a member with an empty name")]
    EmptyMemberName {
        /// Declaring type
        ty: String,
    },

    /// Two members with the same (case-insensitive) name
    #[error("type {ty} declares member {member} twice")]
    DuplicateMember {
        /// Declaring type
        ty: String,
        /// Duplicated member name
        member: String,
    },

    /// Parameter reference beyond the declared arity
    #[error("type {ty} member {member} references parameter {index}, arity is {arity}")]
    ParamOutOfRange {
        /// Declaring type
        ty: String,
        /// Offending member
        member: String,
        /// Referenced parameter position
        index: usize,
        /// Declared arity
        arity: usize,
    },
}
