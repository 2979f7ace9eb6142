//! Well-known builtin type keys
//!
//! The `std.*` namespace covers everything the engine never registers:
//! scalar primitives, the untyped object root, strings, and the structural
//! container generics. Containers are transparent: validation and expansion
//! look through them at their arguments.

use crate::key::TypeKey;

/// Namespace prefix shared by every builtin key
pub const NAMESPACE: &str = "std";

const OBJECT: &str = "std.Object";
const STRING: &str = "std.String";
const BOOL: &str = "std.Bool";
const INT32: &str = "std.Int32";
const INT64: &str = "std.Int64";
const FLOAT64: &str = "std.Float64";
const BYTES: &str = "std.Bytes";
const ARRAY: &str = "std.Array";
const LIST: &str = "std.List";
const MAP: &str = "std.Map";
const OPTION: &str = "std.Option";

/// The untyped placeholder root, too ambiguous to resolve against
#[must_use]
pub fn object() -> TypeKey {
    TypeKey::new(OBJECT)
}

/// String scalar
#[must_use]
pub fn string() -> TypeKey {
    TypeKey::new(STRING)
}

/// Boolean scalar
#[must_use]
pub fn boolean() -> TypeKey {
    TypeKey::new(BOOL)
}

/// 32-bit integer scalar
#[must_use]
pub fn int32() -> TypeKey {
    TypeKey::new(INT32)
}

/// 64-bit integer scalar
#[must_use]
pub fn int64() -> TypeKey {
    TypeKey::new(INT64)
}

/// 64-bit float scalar
#[must_use]
pub fn float64() -> TypeKey {
    TypeKey::new(FLOAT64)
}

/// Raw byte buffer
#[must_use]
pub fn bytes() -> TypeKey {
    TypeKey::new(BYTES)
}

/// Fixed array of `element`
#[must_use]
pub fn array(element: TypeKey) -> TypeKey {
    TypeKey::generic(ARRAY, [element])
}

/// Growable list of `element`
#[must_use]
pub fn list(element: TypeKey) -> TypeKey {
    TypeKey::generic(LIST, [element])
}

/// Dictionary from `key` to `value`
#[must_use]
pub fn map(key: TypeKey, value: TypeKey) -> TypeKey {
    TypeKey::generic(MAP, [key, value])
}

/// Optional `inner`
#[must_use]
pub fn option(inner: TypeKey) -> TypeKey {
    TypeKey::generic(OPTION, [inner])
}

/// Whether the key lives in the builtin namespace
#[must_use]
pub fn is_builtin(key: &TypeKey) -> bool {
    key.name() == NAMESPACE || key.name().starts_with("std.")
}

/// Whether the key is one of the transparent container generics
#[must_use]
pub fn is_container(key: &TypeKey) -> bool {
    matches!(key.name(), ARRAY | LIST | MAP | OPTION)
}

/// Whether the key is the untyped object root
#[must_use]
pub fn is_object(key: &TypeKey) -> bool {
    key.name() == OBJECT
}

/// Whether the key is a builtin scalar (non-container, non-object builtin)
#[must_use]
pub fn is_scalar(key: &TypeKey) -> bool {
    is_builtin(key) && !is_container(key) && !is_object(key)
}
