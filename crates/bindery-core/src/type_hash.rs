//! Deterministic 64-bit identities for native types and bound overloads.
//!
//! Native parameter and return types are described by name at registration
//! time rather than discovered through reflection. [`TypeHash`] turns those
//! names into stable keys so the conversion registry can be a single hash map
//! lookup, and so every bound overload gets a reproducible linkage id.
//!
//! # Examples
//!
//! ```
//! use bindery_core::TypeHash;
//!
//! let int = TypeHash::from_name("i64");
//! assert_eq!(int, TypeHash::from_name("i64"));
//!
//! let vec = TypeHash::from_name("Vec");
//! let vec_of_int = TypeHash::from_generic(vec, &[int]);
//! assert_ne!(vec, vec_of_int);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain mixing constants.
///
/// Type names and overload linkage ids are hashed in different domains so a
/// type called `len` never collides with a method called `len`.
pub mod hash_constants {
    /// Separator mixed in between successive components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type names.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for bound overloads.
    pub const OVERLOAD: u64 = 0x7d3c8b4a92e15f6d;

    /// Per-position markers so that component order matters.
    pub const POSITION_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

/// A deterministic 64-bit hash identifying a native type or a bound overload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash a native type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash a generic type applied to element types, e.g. `Vec` of `i64`.
    ///
    /// Argument order matters.
    #[inline]
    pub fn from_generic(base: TypeHash, args: &[TypeHash]) -> Self {
        TypeHash(mix(base.0, args))
    }

    /// Linkage id of one overload: owner, member name and native parameter types.
    ///
    /// Two overloads of the same member differ by their parameter list, so
    /// each arity variant of a callable gets its own id.
    #[inline]
    pub fn from_overload(owner: &str, name: &str, params: &[TypeHash]) -> Self {
        let seed = hash_constants::OVERLOAD
            ^ xxh64(owner.as_bytes(), 0)
            ^ xxh64(name.as_bytes(), hash_constants::SEP);
        TypeHash(mix(seed, params))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix(seed: u64, parts: &[TypeHash]) -> u64 {
    let mut hash = seed;
    for (i, part) in parts.iter().enumerate() {
        let marker = hash_constants::POSITION_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::POSITION_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the combination order-sensitive
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ part.0);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
