//! Native type descriptors used in declarations.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use bindery_core::{Environment, Memory, TraceInfo, TypeHash, TypeName};

/// Name of the runtime-value array type accepted by a vararg tail.
pub const VALUE_ARRAY: &str = "Vec<Memory>";

/// A native type as it appears in a declaration.
///
/// Identity is the hash of the name. Two descriptors with the same name are
/// the same type regardless of how they were constructed.
#[derive(Clone)]
pub struct NativeType {
    name: Cow<'static, str>,
    hash: TypeHash,
}

impl NativeType {
    /// Describe a type by its registration name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let hash = TypeHash::from_name(&name);
        Self { name, hash }
    }

    /// Describe the Rust type `T`.
    pub fn of<T: TypeName>() -> Self {
        Self::named(T::NAME)
    }

    /// The runtime value type itself.
    pub fn value() -> Self {
        Self::of::<Memory>()
    }

    /// Array of runtime values, used for vararg tails.
    pub fn value_array() -> Self {
        Self::named(VALUE_ARRAY)
    }

    pub fn environment() -> Self {
        Self::of::<Environment>()
    }

    pub fn trace() -> Self {
        Self::of::<TraceInfo>()
    }

    /// No value.
    pub fn void() -> Self {
        Self::of::<()>()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_hash(&self) -> TypeHash {
        self.hash
    }

    pub fn is_value(&self) -> bool {
        self.hash == TypeHash::from_name(Memory::NAME)
    }

    pub fn is_value_array(&self) -> bool {
        self.hash == TypeHash::from_name(VALUE_ARRAY)
    }

    pub fn is_environment(&self) -> bool {
        self.hash == TypeHash::from_name(Environment::NAME)
    }

    pub fn is_trace(&self) -> bool {
        self.hash == TypeHash::from_name(TraceInfo::NAME)
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for NativeType {}

impl Hash for NativeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeType({})", self.name)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
