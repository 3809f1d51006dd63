//! Binding layer for native callables in a dynamic runtime.
//!
//! Natively implemented functions and methods are declared with
//! [`NativeMethod`], bound into a [`CallableEntity`] and then invoked with
//! runtime values:
//!
//! ```
//! use bindery::{
//!     CallContext, CallableEntity, ConversionRegistry, Environment, Memory, NativeFn,
//!     NativeMethod, NativeParam, NativeType,
//! };
//!
//! let registry = ConversionRegistry::with_builtins();
//! let mut max = CallableEntity::new("max");
//! max.add_method(
//!     NativeMethod::new(
//!         "max",
//!         NativeFn::new(|ctx: &mut CallContext<'_>| {
//!             let a: i64 = ctx.arg(0)?;
//!             let b: i64 = ctx.arg(1)?;
//!             ctx.set_return(a.max(b));
//!             Ok(())
//!         }),
//!     )
//!     .params([NativeParam::of::<i64>(), NativeParam::of::<i64>()])
//!     .returns(NativeType::of::<i64>()),
//!     &registry,
//!     false,
//! )
//! .unwrap();
//!
//! let env = Environment::new();
//! let result = max.invoke(None, &env, &[Memory::from(3i64), Memory::from(8i64)]).unwrap();
//! assert_eq!(result, Memory::from(8i64));
//! ```
//!
//! Everything that can be resolved ahead of time is resolved when a
//! declaration is bound: each parameter gets a [`Slot`] describing how it is
//! filled, and the overload is stored under the number of arguments it
//! consumes. A call only looks up the overload and walks its slots.

pub mod conversion;
pub mod entity;
mod invoke;
pub mod native;
pub mod overload;

pub use bindery_core::{
    BindingError, CallError, Checkout, ConversionError, Diagnostic, DiagnosticKind, Diagnostics,
    Dynamic, Environment, EnvironmentBuilder, ErrorType, FromDynamic, Instance, InternalError,
    IntoDynamic, Memory, NativeError, TraceInfo, TranslatedException, TypeHash, TypeName,
    ValueError, Visibility,
};

pub use conversion::{
    BoundConversion, ConversionRegistry, ConversionStrategy, ParameterDescriptor,
    default_registry,
};
pub use entity::{CallableEntity, ClassInfo, DeclaringType};
pub use native::{
    CallContext, Modifiers, NativeArg, NativeCallable, NativeFn, NativeMethod, NativeParam,
    NativeReturn, NativeType, ParamFlags,
};
pub use overload::{ContextKind, Overload, OverloadTable, Slot};
