//! Conversion strategies between runtime values and native values.
//!
//! A [`ConversionStrategy`] knows how to turn a [`Memory`] into the argument
//! a native implementation expects and how to turn what the implementation
//! returned back into a [`Memory`]. The [`ConversionRegistry`] resolves a
//! declared [`NativeType`] (plus an optional element hint for generic
//! containers) to a strategy.

mod registry;

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use bindery_core::{ConversionError, FromDynamic, IntoDynamic, Memory};

use crate::native::{NativeArg, NativeReturn};

pub use registry::{ConversionRegistry, default_registry};

/// Per-parameter information a strategy may consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub nullable: bool,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            nullable,
        }
    }
}

type ToNative = dyn Fn(&Memory, &ParameterDescriptor) -> Result<NativeArg, ConversionError>
    + Send
    + Sync;
type FromNative = dyn Fn(NativeReturn) -> Result<Memory, ConversionError> + Send + Sync;

/// Bidirectional conversion for one native type.
pub struct ConversionStrategy {
    type_name: &'static str,
    to_native: Box<ToNative>,
    from_native: Box<FromNative>,
}

impl ConversionStrategy {
    pub fn new<A, R>(type_name: &'static str, to_native: A, from_native: R) -> Self
    where
        A: Fn(&Memory, &ParameterDescriptor) -> Result<NativeArg, ConversionError>
            + Send
            + Sync
            + 'static,
        R: Fn(NativeReturn) -> Result<Memory, ConversionError> + Send + Sync + 'static,
    {
        Self {
            type_name,
            to_native: Box::new(to_native),
            from_native: Box::new(from_native),
        }
    }

    /// Strategy for a Rust type with `FromDynamic`/`IntoDynamic` impls.
    ///
    /// Null is handed to nullable parameters as [`NativeArg::Null`] and
    /// rejected for everything else by the type's own conversion. A missing
    /// return value becomes null.
    pub fn of<T>() -> Self
    where
        T: FromDynamic + IntoDynamic + Any + Send,
    {
        Self::new(
            type_name::<T>(),
            Self::of_arguments::<T>(),
            |ret| match ret {
                None => Ok(Memory::null()),
                Some(boxed) => boxed
                    .downcast::<T>()
                    .map(|v| Memory::new(v.into_dynamic()))
                    .map_err(|_| ConversionError::TypeMismatch {
                        expected: type_name::<T>(),
                        actual: "native value of another type",
                    }),
            },
        )
    }

    /// Strategy for `u64`. Returned values above `i64::MAX` fail with
    /// [`ConversionError::IntegerOverflow`].
    pub fn checked_u64() -> Self {
        Self::new("u64", Self::of_arguments::<u64>(), |ret| match ret {
            None => Ok(Memory::null()),
            Some(boxed) => {
                let value = boxed
                    .downcast::<u64>()
                    .map_err(|_| ConversionError::TypeMismatch {
                        expected: "u64",
                        actual: "native value of another type",
                    })?;
                i64::try_from(*value).map(Memory::from).map_err(|_| {
                    ConversionError::IntegerOverflow {
                        value: i128::from(*value),
                        target_type: "i64",
                    }
                })
            }
        })
    }

    /// Strategy for members declared to return nothing. Whatever the
    /// implementation set is discarded.
    pub fn void() -> Self {
        Self::new(
            "void",
            |value, _| {
                Err(ConversionError::TypeMismatch {
                    expected: "void",
                    actual: value.type_name(),
                })
            },
            |_| Ok(Memory::null()),
        )
    }

    /// Strategy for raw runtime values. Arguments are passed as-is and a
    /// returned [`Memory`] is handed back unchanged.
    pub fn passthrough() -> Self {
        Self::new(
            "Memory",
            |value, _| Ok(NativeArg::Value(value.clone())),
            |ret| match ret {
                None => Ok(Memory::null()),
                Some(boxed) => boxed.downcast::<Memory>().map(|m| *m).map_err(|_| {
                    ConversionError::TypeMismatch {
                        expected: "Memory",
                        actual: "native value of another type",
                    }
                }),
            },
        )
    }

    fn of_arguments<T>()
    -> impl Fn(&Memory, &ParameterDescriptor) -> Result<NativeArg, ConversionError>
    + Send
    + Sync
    + 'static
    where
        T: FromDynamic + Any + Send,
    {
        |value, param| {
            if param.nullable && value.is_null() {
                return Ok(NativeArg::Null);
            }
            let native = value.with(T::from_dynamic)?;
            Ok(NativeArg::Native(Box::new(native)))
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn to_native(
        &self,
        value: &Memory,
        param: &ParameterDescriptor,
    ) -> Result<NativeArg, ConversionError> {
        (self.to_native)(value, param)
    }

    pub fn from_native(&self, value: NativeReturn) -> Result<Memory, ConversionError> {
        (self.from_native)(value)
    }
}

impl fmt::Debug for ConversionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionStrategy")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A strategy bound to one parameter (or the return value) of an overload.
#[derive(Debug, Clone)]
pub struct BoundConversion {
    strategy: Arc<ConversionStrategy>,
    param: ParameterDescriptor,
}

impl BoundConversion {
    pub fn new(strategy: Arc<ConversionStrategy>, param: ParameterDescriptor) -> Self {
        Self { strategy, param }
    }

    pub fn strategy(&self) -> &ConversionStrategy {
        &self.strategy
    }

    pub fn param(&self) -> &ParameterDescriptor {
        &self.param
    }

    pub fn to_native(&self, value: &Memory) -> Result<NativeArg, ConversionError> {
        self.strategy.to_native(value, &self.param)
    }

    pub fn from_native(&self, value: NativeReturn) -> Result<Memory, ConversionError> {
        self.strategy.from_native(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(nullable: bool) -> ParameterDescriptor {
        ParameterDescriptor::new("arg0", nullable)
    }

    #[test]
    fn typed_strategy_converts_both_ways() {
        let strategy = ConversionStrategy::of::<i64>();
        let arg = strategy.to_native(&Memory::from(4i64), &param(false)).unwrap();
        let NativeArg::Native(boxed) = arg else {
            panic!("expected native arg");
        };
        assert_eq!(*boxed.downcast::<i64>().unwrap(), 4);

        let back = strategy.from_native(Some(Box::new(9i64))).unwrap();
        assert_eq!(back, Memory::from(9i64));
    }

    #[test]
    fn null_handling_depends_on_nullability() {
        let strategy = ConversionStrategy::of::<String>();
        assert!(matches!(
            strategy.to_native(&Memory::null(), &param(true)),
            Ok(NativeArg::Null)
        ));
        assert!(matches!(
            strategy.to_native(&Memory::null(), &param(false)),
            Err(ConversionError::NullValue { .. })
        ));
    }

    #[test]
    fn wrong_return_type_is_a_mismatch() {
        let strategy = ConversionStrategy::of::<i64>();
        assert!(strategy.from_native(Some(Box::new("x"))).is_err());
        assert!(strategy.from_native(None).unwrap().is_null());
    }

    #[test]
    fn passthrough_shares_the_cell() {
        let strategy = ConversionStrategy::passthrough();
        let m = Memory::from(1i64);
        let NativeArg::Value(passed) = strategy.to_native(&m, &param(false)).unwrap() else {
            panic!("expected value arg");
        };
        assert!(Memory::ptr_eq(&passed, &m));
        let back = strategy.from_native(Some(Box::new(m.clone()))).unwrap();
        assert!(Memory::ptr_eq(&back, &m));
    }

    #[test]
    fn void_discards_return() {
        let strategy = ConversionStrategy::void();
        assert!(strategy.from_native(Some(Box::new(1i64))).unwrap().is_null());
    }
}
