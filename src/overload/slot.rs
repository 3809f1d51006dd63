//! Parameter slot classification.

use bindery_core::BindingError;

use crate::conversion::{BoundConversion, ConversionRegistry, ParameterDescriptor};
use crate::native::{NativeMethod, NativeParam};

/// Values the binding layer supplies itself instead of taking them from the
/// caller's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Environment,
    Trace,
}

/// How one native parameter is filled at call time.
#[derive(Debug, Clone)]
pub enum Slot {
    /// The runtime value is passed through without conversion.
    ///
    /// By reference the caller's cell is shared; otherwise a fresh copy is
    /// made, mutable only when `mutable` is set.
    Passthrough { by_ref: bool, mutable: bool },
    /// The runtime value goes through a conversion strategy.
    Converted(BoundConversion),
    /// Filled from the call context. Consumes no argument.
    Injected(ContextKind),
    /// Collects every remaining argument. Always the last slot.
    ///
    /// Elements follow the same copy rules as [`Slot::Passthrough`].
    VarargTail { by_ref: bool, mutable: bool },
}

impl Slot {
    /// Whether this slot takes (at least one) argument from the caller.
    pub fn consumes_argument(&self) -> bool {
        !matches!(self, Slot::Injected(_))
    }

    pub fn is_vararg(&self) -> bool {
        matches!(self, Slot::VarargTail { .. })
    }
}

/// Result of classifying a declaration's parameters and return type.
#[derive(Debug)]
pub(crate) struct Classified {
    pub slots: Vec<Slot>,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_conversion: BoundConversion,
}

/// Classify every parameter of `method`, then its return type.
///
/// Order per parameter: raw runtime value, registered conversion, context
/// injection, trailing vararg tail. Anything else is unsupported. The first
/// failure aborts the whole declaration.
pub(crate) fn classify(
    method: &NativeMethod,
    registry: &ConversionRegistry,
) -> Result<Classified, BindingError> {
    let last = method.params.len().saturating_sub(1);
    let mut slots = Vec::with_capacity(method.params.len());
    let mut parameters = Vec::new();

    for (position, param) in method.params.iter().enumerate() {
        let descriptor =
            ParameterDescriptor::new(format!("arg{}", parameters.len()), param.is_nullable());
        let slot = classify_param(
            method,
            position,
            position == last,
            param,
            registry,
            descriptor.clone(),
        )?;
        if slot.consumes_argument() {
            parameters.push(descriptor);
        }
        slots.push(slot);
    }

    let strategy = registry
        .resolve(&method.return_type, method.return_element.as_ref())
        .ok_or_else(|| BindingError::UnsupportedReturnType {
            type_name: method.return_type.name().to_string(),
        })?;
    let return_conversion =
        BoundConversion::new(strategy, ParameterDescriptor::new("return", true));

    Ok(Classified {
        slots,
        parameters,
        return_conversion,
    })
}

fn classify_param(
    method: &NativeMethod,
    position: usize,
    is_last: bool,
    param: &NativeParam,
    registry: &ConversionRegistry,
    descriptor: ParameterDescriptor,
) -> Result<Slot, BindingError> {
    if param.ty.is_value() {
        return Ok(Slot::Passthrough {
            by_ref: param.is_reference(),
            mutable: param.is_mutable(),
        });
    }

    if let Some(strategy) = registry.resolve(&param.ty, param.element.as_ref()) {
        return Ok(Slot::Converted(BoundConversion::new(strategy, descriptor)));
    }

    if param.ty.is_environment() {
        return Ok(Slot::Injected(ContextKind::Environment));
    }
    if param.ty.is_trace() {
        return Ok(Slot::Injected(ContextKind::Trace));
    }

    if param.ty.is_value_array() {
        if is_last {
            return Ok(Slot::VarargTail {
                by_ref: param.is_reference(),
                mutable: param.is_mutable(),
            });
        }
        return Err(BindingError::MisplacedVararg {
            name: method.name.clone(),
            position,
        });
    }

    Err(BindingError::UnsupportedType {
        type_name: param.ty.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{CallContext, NativeFn, NativeType};

    fn method(params: Vec<NativeParam>) -> NativeMethod {
        NativeMethod::new("m", NativeFn::new(|_: &mut CallContext<'_>| Ok(()))).params(params)
    }

    fn registry() -> ConversionRegistry {
        ConversionRegistry::with_builtins()
    }

    #[test]
    fn mutable_vararg_tail_keeps_its_flag() {
        let classified =
            classify(&method(vec![NativeParam::varargs().mutable()]), &registry()).unwrap();
        assert!(matches!(
            classified.slots[0],
            Slot::VarargTail {
                by_ref: false,
                mutable: true
            }
        ));
    }

    #[test]
    fn classifies_each_kind() {
        let classified = classify(
            &method(vec![
                NativeParam::value().reference(),
                NativeParam::of::<i64>(),
                NativeParam::environment(),
                NativeParam::trace(),
                NativeParam::varargs(),
            ]),
            &registry(),
        )
        .unwrap();

        let slots = &classified.slots;
        assert!(matches!(
            slots[0],
            Slot::Passthrough {
                by_ref: true,
                mutable: false
            }
        ));
        assert!(matches!(slots[1], Slot::Converted(_)));
        assert!(matches!(slots[2], Slot::Injected(ContextKind::Environment)));
        assert!(matches!(slots[3], Slot::Injected(ContextKind::Trace)));
        assert!(matches!(
            slots[4],
            Slot::VarargTail {
                by_ref: false,
                mutable: false
            }
        ));
    }

    #[test]
    fn parameter_names_count_consuming_slots() {
        let classified = classify(
            &method(vec![
                NativeParam::environment(),
                NativeParam::of::<String>().nullable(),
                NativeParam::of::<i64>(),
            ]),
            &registry(),
        )
        .unwrap();

        assert_eq!(
            classified.parameters,
            vec![
                ParameterDescriptor::new("arg0", true),
                ParameterDescriptor::new("arg1", false),
            ]
        );
        let Slot::Converted(conversion) = &classified.slots[1] else {
            panic!("expected converted slot");
        };
        assert_eq!(conversion.param(), &ParameterDescriptor::new("arg0", true));
    }

    #[test]
    fn unsupported_parameter_type() {
        let err = classify(
            &method(vec![NativeParam::new(NativeType::named("Socket"))]),
            &registry(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindingError::UnsupportedType {
                type_name: "Socket".into()
            }
        );
    }

    #[test]
    fn vararg_must_be_last() {
        let err = classify(
            &method(vec![NativeParam::varargs(), NativeParam::of::<i64>()]),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BindingError::MisplacedVararg { position: 0, .. }));
    }

    #[test]
    fn unsupported_return_type() {
        let decl = method(vec![]).returns(NativeType::named("Socket"));
        assert!(matches!(
            classify(&decl, &registry()),
            Err(BindingError::UnsupportedReturnType { .. })
        ));
    }

    #[test]
    fn registered_strategy_wins_over_injection() {
        let mut registry = registry();
        registry.register(
            &NativeType::environment(),
            crate::conversion::ConversionStrategy::passthrough(),
        );
        let classified = classify(&method(vec![NativeParam::environment()]), &registry).unwrap();
        assert!(matches!(classified.slots[0], Slot::Converted(_)));
        assert_eq!(classified.parameters.len(), 1);
    }
}
