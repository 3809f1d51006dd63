//! Conversion traits between native Rust values and runtime values.
//!
//! - [`FromDynamic`]: extract a Rust value from a [`Dynamic`]
//! - [`IntoDynamic`]: turn a Rust value into a [`Dynamic`]
//! - [`TypeName`]: the name a native type is registered under
//!
//! Conversions are strict: a string never silently becomes an integer.
//! Integers widen to floats, and narrowing integer conversions are bounds
//! checked.

use crate::error::ConversionError;
use crate::runtime::{Dynamic, Environment, Instance, Memory, TraceInfo};

/// Extract a value from a runtime value.
pub trait FromDynamic: Sized {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError>;
}

/// Convert a value into a runtime value.
pub trait IntoDynamic {
    fn into_dynamic(self) -> Dynamic;
}

/// Registration name of a native type.
///
/// This is what declarations use instead of reflection: a parameter of Rust
/// type `T` is described as `NativeType::of::<T>()`, which hashes `T::NAME`.
pub trait TypeName {
    const NAME: &'static str;
}

macro_rules! type_names {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl TypeName for $ty {
                const NAME: &'static str = $name;
            }
        )*
    };
}

type_names! {
    () => "void",
    bool => "bool",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    f32 => "f32",
    f64 => "f64",
    String => "String",
    Instance => "Instance",
    Memory => "Memory",
    Vec<Memory> => "Vec<Memory>",
    Environment => "Environment",
    TraceInfo => "TraceInfo",
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    match value {
                        Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: i128::from(*v),
                                target_type: stringify!($ty),
                            }
                        }),
                        Dynamic::Null => Err(ConversionError::NullValue {
                            target_type: stringify!($ty),
                        }),
                        other => Err(ConversionError::TypeMismatch {
                            expected: "int",
                            actual: other.type_name(),
                        }),
                    }
                }
            }

            impl IntoDynamic for $ty {
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::Int(self as i64)
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

// u64 has no IntoDynamic impl: values above i64::MAX have no runtime
// representation, so returning one must be able to fail.
impl FromDynamic for u64 {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Int(v) => u64::try_from(*v).map_err(|_| ConversionError::IntegerOverflow {
                value: i128::from(*v),
                target_type: "u64",
            }),
            Dynamic::Null => Err(ConversionError::NullValue { target_type: "u64" }),
            other => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }
}

// ============================================================================
// Float implementations
// ============================================================================

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    match value {
                        Dynamic::Float(v) => Ok(*v as $ty),
                        Dynamic::Int(v) => Ok(*v as $ty),
                        Dynamic::Null => Err(ConversionError::NullValue {
                            target_type: stringify!($ty),
                        }),
                        other => Err(ConversionError::TypeMismatch {
                            expected: "float",
                            actual: other.type_name(),
                        }),
                    }
                }
            }

            impl IntoDynamic for $ty {
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::Float(self as f64)
                }
            }
        )*
    };
}

impl_float!(f32, f64);

// ============================================================================
// Bool, String, Instance, unit
// ============================================================================

impl FromDynamic for bool {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Bool(v) => Ok(*v),
            Dynamic::Null => Err(ConversionError::NullValue { target_type: "bool" }),
            other => Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: other.type_name(),
            }),
        }
    }
}

impl IntoDynamic for bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(self)
    }
}

impl FromDynamic for String {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            Dynamic::Null => Err(ConversionError::NullValue {
                target_type: "String",
            }),
            other => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl FromDynamic for Instance {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Object(obj) => Ok(obj.clone()),
            Dynamic::Null => Err(ConversionError::NullValue {
                target_type: "Instance",
            }),
            other => Err(ConversionError::TypeMismatch {
                expected: "object",
                actual: other.type_name(),
            }),
        }
    }
}

impl IntoDynamic for Instance {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Object(self)
    }
}

impl FromDynamic for () {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Null => Ok(()),
            other => Err(ConversionError::TypeMismatch {
                expected: "void",
                actual: other.type_name(),
            }),
        }
    }
}

impl IntoDynamic for () {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Null
    }
}

// ============================================================================
// Arrays
// ============================================================================

impl<T: FromDynamic> FromDynamic for Vec<T> {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Array(items) => items.iter().map(|m| m.with(T::from_dynamic)).collect(),
            Dynamic::Null => Err(ConversionError::NullValue { target_type: "Vec" }),
            other => Err(ConversionError::TypeMismatch {
                expected: "array",
                actual: other.type_name(),
            }),
        }
    }
}

impl<T: IntoDynamic> IntoDynamic for Vec<T> {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Array(
            self.into_iter()
                .map(|item| Memory::new(item.into_dynamic()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_conversions() {
        assert_eq!(i32::from_dynamic(&Dynamic::Int(42)), Ok(42));
        assert_eq!(u8::from_dynamic(&Dynamic::Int(255)), Ok(255));
        assert!(matches!(
            u8::from_dynamic(&Dynamic::Int(256)),
            Err(ConversionError::IntegerOverflow { value: 256, .. })
        ));
        assert!(matches!(
            u32::from_dynamic(&Dynamic::Int(-1)),
            Err(ConversionError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            i64::from_dynamic(&Dynamic::String("1".into())),
            Err(ConversionError::TypeMismatch { expected: "int", actual: "string" })
        ));
    }

    #[test]
    fn null_is_rejected_by_value_types() {
        assert!(matches!(
            i64::from_dynamic(&Dynamic::Null),
            Err(ConversionError::NullValue { target_type: "i64" })
        ));
        assert!(matches!(
            String::from_dynamic(&Dynamic::Null),
            Err(ConversionError::NullValue { .. })
        ));
    }

    #[test]
    fn u64_rejects_negative() {
        assert_eq!(u64::from_dynamic(&Dynamic::Int(7)).unwrap(), 7);
        assert!(matches!(
            u64::from_dynamic(&Dynamic::Int(-5)),
            Err(ConversionError::IntegerOverflow {
                value: -5,
                target_type: "u64"
            })
        ));
    }

    #[test]
    fn float_accepts_int() {
        assert_eq!(f64::from_dynamic(&Dynamic::Int(3)), Ok(3.0));
        assert_eq!(f32::from_dynamic(&Dynamic::Float(1.5)), Ok(1.5));
    }

    #[test]
    fn vec_conversion() {
        let array = Dynamic::Array(vec![Memory::from(1i64), Memory::from(2i64)]);
        assert_eq!(Vec::<i64>::from_dynamic(&array), Ok(vec![1, 2]));

        let mixed = Dynamic::Array(vec![Memory::from(1i64), Memory::from("x")]);
        assert!(Vec::<i64>::from_dynamic(&mixed).is_err());

        assert_eq!(
            vec![true].into_dynamic(),
            Dynamic::Array(vec![Memory::from(true)])
        );
    }

    #[test]
    fn unit_is_null() {
        assert_eq!(().into_dynamic(), Dynamic::Null);
        assert_eq!(<()>::from_dynamic(&Dynamic::Null), Ok(()));
    }

    #[test]
    fn type_names() {
        assert_eq!(<i64 as TypeName>::NAME, "i64");
        assert_eq!(<Memory as TypeName>::NAME, "Memory");
        assert_eq!(<() as TypeName>::NAME, "void");
    }
}
