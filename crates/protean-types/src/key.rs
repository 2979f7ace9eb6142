//! Stable type identity
//!
//! Provides [`TypeKey`], the process-stable identifier for a possibly-generic
//! type. A key is a fully-qualified base name plus its bound generic
//! arguments; structural equality makes two keys interchangeable wherever
//! they compare equal.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Identity of a type, independent of any runtime handle
///
/// A key is *closed* when it binds as many arguments as its descriptor
/// declares parameters, and denotes the *open definition* (template) when it
/// binds none. Keys for non-generic types simply carry no arguments.
///
/// # Examples
/// - `geometry.Square` → non-generic type
/// - `containers.Wrapper<geometry.Square>` → closed generic
/// - `containers.Wrapper` → open definition of the same template
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<TypeKey>,
}

impl TypeKey {
    /// Create a key for a non-generic type (or an open definition)
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a key with bound generic arguments
    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeKey>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Fully-qualified base name, without arguments
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound generic arguments (empty for non-generic keys and templates)
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[TypeKey] {
        &self.args
    }

    /// Whether this key binds any generic arguments
    #[inline]
    #[must_use]
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }

    /// The open definition of this key: same base name, no arguments
    ///
    /// For a non-generic key this is a clone of the key itself.
    #[must_use]
    pub fn template(&self) -> TypeKey {
        TypeKey::new(self.name.clone())
    }

    /// Module prefix of the base name (`geometry.Square` → `geometry`)
    ///
    /// Empty for unqualified names.
    #[must_use]
    pub fn module(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(module, _)| module)
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                Display::fmt(arg, f)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        TypeKey::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_key_display() {
        let key = TypeKey::new("geometry.Square");
        assert_eq!(key.to_string(), "geometry.Square");
        assert!(!key.has_args());
    }

    #[test]
    fn generic_key_display() {
        let key = TypeKey::generic(
            "containers.Wrapper",
            [TypeKey::new("geometry.Square"), TypeKey::new("std.String")],
        );
        assert_eq!(
            key.to_string(),
            "containers.Wrapper<geometry.Square, std.String>"
        );
    }

    #[test]
    fn template_strips_arguments() {
        let key = TypeKey::generic("containers.Wrapper", [TypeKey::new("geometry.Square")]);
        assert_eq!(key.template(), TypeKey::new("containers.Wrapper"));
    }

    #[test]
    fn module_prefix() {
        assert_eq!(TypeKey::new("geometry.shapes.Square").module(), "geometry.shapes");
        assert_eq!(TypeKey::new("Square").module(), "");
    }

    #[test]
    fn structural_equality() {
        let a = TypeKey::generic("containers.Wrapper", [TypeKey::new("geometry.Square")]);
        let b = TypeKey::generic("containers.Wrapper", [TypeKey::new("geometry.Square")]);
        let c = TypeKey::generic("containers.Wrapper", [TypeKey::new("geometry.Circle")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serde_round_trip() {
        let key = TypeKey::generic("containers.Wrapper", [TypeKey::new("geometry.Square")]);
        let text = serde_json::to_string(&key).unwrap();
        let back: TypeKey = serde_json::from_str(&text).unwrap();
        assert_eq!(key, back);
    }
}
