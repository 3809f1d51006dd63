//! Call context bridging marshalled arguments and native implementations.

use std::any::{Any, type_name};
use std::fmt;

use bindery_core::{ConversionError, Environment, Instance, Memory, NativeError, TraceInfo};

/// One marshalled argument, in native parameter order.
pub enum NativeArg {
    /// Null accepted by a nullable parameter.
    Null,
    /// Output of a conversion strategy.
    Native(Box<dyn Any + Send>),
    /// A runtime value passed through, shared or copied per the parameter.
    Value(Memory),
    /// The vararg tail.
    Varargs(Vec<Memory>),
    /// Placeholder for the calling environment; read it with
    /// [`CallContext::environment`].
    Environment,
    Trace(TraceInfo),
}

impl NativeArg {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeArg::Null => "null",
            NativeArg::Native(_) => "native value",
            NativeArg::Value(_) => "runtime value",
            NativeArg::Varargs(_) => "vararg tail",
            NativeArg::Environment => "environment",
            NativeArg::Trace(_) => "trace",
        }
    }
}

impl fmt::Debug for NativeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeArg::Value(m) => f.debug_tuple("Value").field(m).finish(),
            NativeArg::Varargs(v) => f.debug_tuple("Varargs").field(v).finish(),
            NativeArg::Trace(t) => f.debug_tuple("Trace").field(t).finish(),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// What a native implementation produced. `None` means nothing was set.
pub type NativeReturn = Option<Box<dyn Any + Send>>;

/// Context for native calls.
///
/// Arguments are indexed by native parameter position, including injected
/// parameters. Typed accessors check the slot kind:
///
/// ```ignore
/// let count: i64 = ctx.arg(0)?;
/// let rest = ctx.varargs(1)?;
/// ctx.set_return(count + rest.len() as i64);
/// ```
pub struct CallContext<'a> {
    this: Option<&'a Instance>,
    args: Vec<NativeArg>,
    env: &'a Environment,
    return_value: NativeReturn,
}

impl<'a> CallContext<'a> {
    pub fn new(this: Option<&'a Instance>, args: Vec<NativeArg>, env: &'a Environment) -> Self {
        Self {
            this,
            args,
            env,
            return_value: None,
        }
    }

    /// Number of native parameters.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Raw access to a marshalled argument.
    pub fn arg_slot(&self, index: usize) -> Result<&NativeArg, NativeError> {
        self.args
            .get(index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    /// A converted argument, cloned out of its slot.
    ///
    /// A runtime value slot is accepted when `T` is [`Memory`].
    pub fn arg<T: Any + Clone>(&self, index: usize) -> Result<T, NativeError> {
        match self.arg_slot(index)? {
            NativeArg::Native(boxed) => boxed.downcast_ref::<T>().cloned().ok_or_else(|| {
                NativeError::Conversion(ConversionError::TypeMismatch {
                    expected: type_name::<T>(),
                    actual: "native value of another type",
                })
            }),
            NativeArg::Value(memory) => (memory as &dyn Any)
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| self.mismatch::<T>(index)),
            NativeArg::Null => Err(NativeError::Conversion(ConversionError::NullValue {
                target_type: type_name::<T>(),
            })),
            _ => Err(self.mismatch::<T>(index)),
        }
    }

    /// A converted argument of a nullable parameter. Null becomes `None`.
    pub fn opt_arg<T: Any + Clone>(&self, index: usize) -> Result<Option<T>, NativeError> {
        match self.arg_slot(index)? {
            NativeArg::Null => Ok(None),
            _ => self.arg(index).map(Some),
        }
    }

    /// Move a converted argument out of its slot, leaving null behind.
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, NativeError> {
        let count = self.args.len();
        let slot = self
            .args
            .get_mut(index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds { index, count })?;
        match std::mem::replace(slot, NativeArg::Null) {
            NativeArg::Native(boxed) => match boxed.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(boxed) => {
                    *slot = NativeArg::Native(boxed);
                    Err(NativeError::Conversion(ConversionError::TypeMismatch {
                        expected: type_name::<T>(),
                        actual: "native value of another type",
                    }))
                }
            },
            other => {
                let actual = other.kind_name();
                *slot = other;
                Err(NativeError::SlotKindMismatch {
                    index,
                    expected: type_name::<T>(),
                    actual,
                })
            }
        }
    }

    /// A runtime value parameter. Shares the caller's cell when the
    /// parameter is by reference.
    pub fn value(&self, index: usize) -> Result<&Memory, NativeError> {
        match self.arg_slot(index)? {
            NativeArg::Value(memory) => Ok(memory),
            other => Err(NativeError::SlotKindMismatch {
                index,
                expected: "runtime value",
                actual: other.kind_name(),
            }),
        }
    }

    /// The vararg tail. Empty when the caller passed no extra arguments.
    pub fn varargs(&self, index: usize) -> Result<&[Memory], NativeError> {
        match self.arg_slot(index)? {
            NativeArg::Varargs(values) => Ok(values),
            other => Err(NativeError::SlotKindMismatch {
                index,
                expected: "vararg tail",
                actual: other.kind_name(),
            }),
        }
    }

    /// The calling environment from an injected parameter.
    pub fn environment(&self, index: usize) -> Result<&'a Environment, NativeError> {
        match self.arg_slot(index)? {
            NativeArg::Environment => Ok(self.env),
            other => Err(NativeError::SlotKindMismatch {
                index,
                expected: "environment",
                actual: other.kind_name(),
            }),
        }
    }

    /// The call-site location from an injected parameter.
    pub fn trace(&self, index: usize) -> Result<&TraceInfo, NativeError> {
        match self.arg_slot(index)? {
            NativeArg::Trace(trace) => Ok(trace),
            other => Err(NativeError::SlotKindMismatch {
                index,
                expected: "trace",
                actual: other.kind_name(),
            }),
        }
    }

    /// The receiver, downcast to its native payload type.
    pub fn this<T: Any>(&self) -> Result<&'a T, NativeError> {
        let this = self
            .this
            .ok_or_else(|| NativeError::invalid_this("called without a receiver"))?;
        this.downcast_ref::<T>().ok_or_else(|| {
            NativeError::invalid_this(format!(
                "type mismatch: expected {}, got {}",
                type_name::<T>(),
                this.class_name()
            ))
        })
    }

    /// The receiver itself, when the call has one.
    pub fn receiver(&self) -> Option<&'a Instance> {
        self.this
    }

    /// Set a typed return value.
    ///
    /// The type must match what the member's return conversion expects.
    pub fn set_return<T: Any + Send>(&mut self, value: T) {
        self.return_value = Some(Box::new(value));
    }

    pub fn has_return(&self) -> bool {
        self.return_value.is_some()
    }

    pub(crate) fn into_return(self) -> NativeReturn {
        self.return_value
    }

    fn mismatch<T>(&self, index: usize) -> NativeError {
        NativeError::SlotKindMismatch {
            index,
            expected: type_name::<T>(),
            actual: self
                .args
                .get(index)
                .map(NativeArg::kind_name)
                .unwrap_or("missing"),
        }
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("arg_count", &self.arg_count())
            .field("has_receiver", &self.this.is_some())
            .finish()
    }
}
