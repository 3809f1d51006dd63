//! Overloads of a callable, keyed by the number of arguments they consume.

mod slot;
mod table;

use bindery_core::{BindingError, TypeHash};

use crate::conversion::{BoundConversion, ConversionRegistry, ParameterDescriptor};
use crate::native::{NativeFn, NativeMethod};

pub use slot::{ContextKind, Slot};
pub use table::OverloadTable;

/// One bound native implementation.
///
/// Everything a call needs is resolved here at binding time: the slot for
/// every native parameter, the return conversion and the parameter
/// descriptors. An `Overload` is immutable once built.
#[derive(Debug)]
pub struct Overload {
    name: String,
    slots: Vec<Slot>,
    return_conversion: BoundConversion,
    arity: usize,
    parameters: Vec<ParameterDescriptor>,
    function: NativeFn,
    linkage: TypeHash,
}

impl Overload {
    /// Classify a declaration into an overload.
    ///
    /// `owner` is the declaring type's name (empty for free functions) and
    /// only feeds the linkage id.
    pub fn bind(
        owner: &str,
        method: &NativeMethod,
        registry: &ConversionRegistry,
    ) -> Result<Self, BindingError> {
        let classified = slot::classify(method, registry)?;
        let arity = classified
            .slots
            .iter()
            .filter(|s| s.consumes_argument())
            .count();
        let param_hashes: Vec<TypeHash> = method.params.iter().map(|p| p.ty.type_hash()).collect();
        let linkage = TypeHash::from_overload(owner, &method.name, &param_hashes);

        tracing::debug!(
            owner,
            name = %method.name,
            arity,
            vararg = classified.slots.last().is_some_and(Slot::is_vararg),
            "bound native overload"
        );

        Ok(Self {
            name: method.name.clone(),
            slots: classified.slots,
            return_conversion: classified.return_conversion,
            arity,
            parameters: classified.parameters,
            function: method.function.clone(),
            linkage,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One slot per native parameter, in declared order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of argument-consuming slots, vararg tail included.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_vararg(&self) -> bool {
        self.slots.last().is_some_and(Slot::is_vararg)
    }

    /// Fewest arguments this overload accepts.
    pub fn min_args(&self) -> usize {
        if self.is_vararg() {
            self.arity - 1
        } else {
            self.arity
        }
    }

    /// Most arguments this overload accepts; `None` when unbounded.
    pub fn max_args(&self) -> Option<usize> {
        if self.is_vararg() {
            None
        } else {
            Some(self.arity)
        }
    }

    /// Whether a call with `argc` arguments fits this overload.
    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min_args() && self.max_args().is_none_or(|max| argc <= max)
    }

    /// Descriptors of the argument-consuming parameters.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn return_conversion(&self) -> &BoundConversion {
        &self.return_conversion
    }

    pub fn function(&self) -> &NativeFn {
        &self.function
    }

    /// Internal linkage id derived from owner, name and parameter types.
    pub fn linkage(&self) -> TypeHash {
        self.linkage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{CallContext, NativeParam};

    fn decl(params: Vec<NativeParam>) -> NativeMethod {
        NativeMethod::new("f", NativeFn::new(|_: &mut CallContext<'_>| Ok(()))).params(params)
    }

    #[test]
    fn arity_excludes_injected_slots() {
        let registry = ConversionRegistry::with_builtins();
        let overload = Overload::bind(
            "",
            &decl(vec![NativeParam::environment(), NativeParam::of::<i64>(), NativeParam::trace()]),
            &registry,
        )
        .unwrap();
        assert_eq!(overload.arity(), 1);
        assert_eq!(overload.slots().len(), 3);
        assert_eq!(overload.min_args(), 1);
        assert_eq!(overload.max_args(), Some(1));
        assert!(!overload.is_vararg());
    }

    #[test]
    fn vararg_bounds() {
        let registry = ConversionRegistry::with_builtins();
        let overload = Overload::bind(
            "",
            &decl(vec![NativeParam::of::<i64>(), NativeParam::varargs()]),
            &registry,
        )
        .unwrap();
        assert_eq!(overload.arity(), 2);
        assert_eq!(overload.min_args(), 1);
        assert_eq!(overload.max_args(), None);
        assert!(overload.accepts(1));
        assert!(overload.accepts(9));
        assert!(!overload.accepts(0));
    }

    #[test]
    fn linkage_depends_on_owner_and_params() {
        let registry = ConversionRegistry::with_builtins();
        let one = decl(vec![NativeParam::of::<i64>()]);
        let two = decl(vec![NativeParam::of::<i64>(), NativeParam::of::<i64>()]);
        let a = Overload::bind("Math", &one, &registry).unwrap();
        let b = Overload::bind("Math", &two, &registry).unwrap();
        let c = Overload::bind("Other", &one, &registry).unwrap();
        assert_ne!(a.linkage(), b.linkage());
        assert_ne!(a.linkage(), c.linkage());
        assert_eq!(a.linkage(), Overload::bind("Math", &one, &registry).unwrap().linkage());
    }
}
