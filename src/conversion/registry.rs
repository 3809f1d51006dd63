//! Lookup of conversion strategies by native type.

use std::sync::Arc;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use bindery_core::{FromDynamic, Instance, IntoDynamic, TypeHash, TypeName};

use super::ConversionStrategy;
use crate::native::NativeType;

/// Name generic containers are registered under; the element hint selects
/// the concrete strategy.
pub const VEC: &str = "Vec";

lazy_static! {
    static ref DEFAULT_REGISTRY: ConversionRegistry = ConversionRegistry::with_builtins();
}

/// Shared registry holding the built-in strategies.
pub fn default_registry() -> &'static ConversionRegistry {
    &DEFAULT_REGISTRY
}

/// Maps `(type, element hint)` to a conversion strategy.
///
/// Lookups with a hint fall back to the unhinted entry, so a hint on a
/// non-generic type is ignored.
#[derive(Debug, Default, Clone)]
pub struct ConversionRegistry {
    strategies: FxHashMap<(TypeHash, Option<TypeHash>), Arc<ConversionStrategy>>,
}

impl ConversionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with strategies for the primitive types, `String`,
    /// `Instance`, `Memory`, `void` and `Vec` of the scalar types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(&NativeType::void(), ConversionStrategy::void());
        registry.register(&NativeType::value(), ConversionStrategy::passthrough());

        registry.register_type::<bool>();
        registry.register_type::<i8>();
        registry.register_type::<i16>();
        registry.register_type::<i32>();
        registry.register_type::<i64>();
        registry.register_type::<u8>();
        registry.register_type::<u16>();
        registry.register_type::<u32>();
        registry.register(&NativeType::of::<u64>(), ConversionStrategy::checked_u64());
        registry.register_type::<f32>();
        registry.register_type::<f64>();
        registry.register_type::<String>();
        registry.register_type::<Instance>();

        registry.register_vec::<bool>();
        registry.register_vec::<i64>();
        registry.register_vec::<f64>();
        registry.register_vec::<String>();
        registry.register_vec::<Instance>();
        registry
    }

    /// Register (or replace) the strategy for a type.
    pub fn register(&mut self, ty: &NativeType, strategy: ConversionStrategy) {
        tracing::trace!(ty = %ty, "registering conversion strategy");
        self.strategies.insert((ty.type_hash(), None), Arc::new(strategy));
    }

    /// Register (or replace) the strategy for a generic type with a given
    /// element type.
    pub fn register_generic(
        &mut self,
        ty: &NativeType,
        element: &NativeType,
        strategy: ConversionStrategy,
    ) {
        tracing::trace!(ty = %ty, element = %element, "registering generic conversion strategy");
        self.strategies
            .insert((ty.type_hash(), Some(element.type_hash())), Arc::new(strategy));
    }

    /// Register the strategy for `T` derived from its conversion impls.
    pub fn register_type<T>(&mut self)
    where
        T: TypeName + FromDynamic + IntoDynamic + std::any::Any + Send,
    {
        self.register(&NativeType::of::<T>(), ConversionStrategy::of::<T>());
    }

    /// Register the strategy for `Vec<T>`, hinted by `T`.
    pub fn register_vec<T>(&mut self)
    where
        T: TypeName + FromDynamic + IntoDynamic + std::any::Any + Send,
    {
        self.register_generic(
            &NativeType::named(VEC),
            &NativeType::of::<T>(),
            ConversionStrategy::of::<Vec<T>>(),
        );
    }

    /// Find the strategy for a type, or `None` when the type is unsupported.
    pub fn resolve(
        &self,
        ty: &NativeType,
        element: Option<&NativeType>,
    ) -> Option<Arc<ConversionStrategy>> {
        let hint = element.map(NativeType::type_hash);
        self.strategies
            .get(&(ty.type_hash(), hint))
            .or_else(|| hint.and_then(|_| self.strategies.get(&(ty.type_hash(), None))))
            .cloned()
    }

    pub fn contains(&self, ty: &NativeType) -> bool {
        self.resolve(ty, None).is_some()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{ConversionError, Memory};

    use crate::conversion::ParameterDescriptor;
    use crate::native::NativeArg;

    fn is_passthrough(strategy: &ConversionStrategy) -> bool {
        strategy.type_name() == Memory::NAME
    }

    #[test]
    fn builtins_resolve() {
        let registry = ConversionRegistry::with_builtins();
        for ty in [
            NativeType::of::<i64>(),
            NativeType::of::<u8>(),
            NativeType::of::<String>(),
            NativeType::of::<bool>(),
            NativeType::void(),
            NativeType::value(),
        ] {
            assert!(registry.contains(&ty), "missing {}", ty);
        }
        assert!(is_passthrough(&registry.resolve(&NativeType::value(), None).unwrap()));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let registry = ConversionRegistry::with_builtins();
        assert!(registry.resolve(&NativeType::named("HashMap"), None).is_none());
        assert!(registry.resolve(&NativeType::environment(), None).is_none());
        assert!(registry.resolve(&NativeType::value_array(), None).is_none());
    }

    #[test]
    fn element_hint_selects_generic_strategy() {
        let registry = ConversionRegistry::with_builtins();
        let vec = NativeType::named(VEC);
        assert!(registry.resolve(&vec, None).is_none());

        let strategy = registry
            .resolve(&vec, Some(&NativeType::of::<i64>()))
            .unwrap();
        let array = Memory::from(vec![Memory::from(1i64), Memory::from(2i64)]);
        let NativeArg::Native(boxed) = strategy
            .to_native(&array, &ParameterDescriptor::new("arg0", false))
            .unwrap()
        else {
            panic!("expected native arg");
        };
        assert_eq!(*boxed.downcast::<Vec<i64>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn hint_on_plain_type_falls_back() {
        let registry = ConversionRegistry::with_builtins();
        assert!(
            registry
                .resolve(&NativeType::of::<i64>(), Some(&NativeType::of::<bool>()))
                .is_some()
        );
    }

    #[test]
    fn custom_registration_replaces() {
        let mut registry = ConversionRegistry::new();
        assert!(registry.is_empty());
        registry.register_type::<i64>();
        registry.register(&NativeType::of::<i64>(), ConversionStrategy::passthrough());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry
                .resolve(&NativeType::of::<i64>(), None)
                .unwrap()
                .type_name(),
            "Memory"
        );
    }

    #[test]
    fn u64_return_above_i64_max_overflows() {
        let registry = ConversionRegistry::with_builtins();
        let strategy = registry.resolve(&NativeType::of::<u64>(), None).unwrap();
        assert_eq!(
            strategy.from_native(Some(Box::new(42u64))).unwrap(),
            Memory::from(42i64)
        );
        assert!(matches!(
            strategy.from_native(Some(Box::new(u64::MAX))),
            Err(ConversionError::IntegerOverflow { target_type: "i64", .. })
        ));
    }

    #[test]
    fn default_registry_is_shared() {
        assert!(std::ptr::eq(default_registry(), default_registry()));
        assert!(default_registry().contains(&NativeType::of::<f64>()));
    }
}
