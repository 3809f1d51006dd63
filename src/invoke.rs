//! Dynamic invocation of a callable entity.
//!
//! A call goes through these stages:
//!
//! 1. structural guards (abstract member, missing receiver)
//! 2. overload resolution by argument count, warning when no overload
//!    takes that many arguments
//! 3. marshalling: one [`NativeArg`] per slot, consuming arguments in order
//! 4. the native call
//! 5. return conversion
//!
//! Structural problems are reported to the environment and the call returns
//! null. Native failures become [`CallError::Exception`]; defects in the
//! binding itself become [`CallError::Fatal`]. By-reference bindings are
//! held as [`Checkout`] guards and released on every exit path.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bindery_core::{
    CallError, Checkout, Environment, ErrorType, Instance, InternalError, Memory, NativeError,
};

use crate::entity::CallableEntity;
use crate::native::{CallContext, NativeArg};
use crate::overload::{ContextKind, Overload, Slot};

impl CallableEntity {
    /// Call this entity with runtime arguments.
    ///
    /// `receiver` is the object a method is called on. A non-static method
    /// called without one asks its declaring type for a placeholder.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(
        &self,
        receiver: Option<Instance>,
        env: &Environment,
        args: &[Memory],
    ) -> Result<Memory, CallError> {
        let trace = env.trace();
        tracing::trace!(callable = %self.signature_string(), argc = args.len(), "invoke");

        if self.is_abstract {
            env.error(
                trace,
                ErrorType::Error,
                format!("Cannot call abstract method {}", self.signature_string()),
            );
            return Ok(Memory::null());
        }

        let receiver = match (receiver, &self.declaring_type) {
            (None, Some(declaring_type)) if !self.is_static => {
                let mock = declaring_type.new_mock(env);
                if mock.is_none() {
                    env.error(
                        trace,
                        ErrorType::Error,
                        format!(
                            "Non-static method {}() cannot be called statically",
                            self.signature_string()
                        ),
                    );
                }
                mock
            }
            (receiver, _) => receiver,
        };

        let argc = args.len();
        let Some(overload) = self.table.find(argc) else {
            let message = match self.table.max_args().filter(|&max| argc > max) {
                Some(max) => format!(
                    "{}() expects exactly {} parameter(s), {} given",
                    self.name, max, argc
                ),
                None => format!(
                    "{}() expects at least {} parameter(s), {} given",
                    self.name,
                    self.table.min_args(),
                    argc
                ),
            };
            env.warning(trace, message);
            return Ok(Memory::null());
        };

        let (native_args, _checkouts) = self.marshal(overload, env, args)?;

        let mut ctx = CallContext::new(receiver.as_ref(), native_args, env);
        let outcome = if env.translate_panics() {
            panic::catch_unwind(AssertUnwindSafe(|| overload.function().call(&mut ctx)))
                .unwrap_or_else(|payload| {
                    Err(NativeError::Panic {
                        message: panic_message(payload.as_ref()),
                    })
                })
        } else {
            overload.function().call(&mut ctx)
        };

        if let Err(err) = outcome {
            return Err(env.throw_from_native(err, trace).into());
        }

        overload
            .return_conversion()
            .from_native(ctx.into_return())
            .map_err(|source| {
                InternalError::ReturnConversion {
                    name: self.signature_string(),
                    source,
                }
                .into()
            })
    }

    /// Build the native argument list for `overload`.
    ///
    /// The returned guards keep by-reference arguments checked out and must
    /// outlive the native call.
    fn marshal(
        &self,
        overload: &Overload,
        env: &Environment,
        args: &[Memory],
    ) -> Result<(Vec<NativeArg>, Vec<Checkout>), CallError> {
        let mut native_args = Vec::with_capacity(overload.slots().len());
        let mut checkouts = Vec::new();
        let mut cursor = 0;

        for (index, slot) in overload.slots().iter().enumerate() {
            let arg = match slot {
                Slot::Passthrough { by_ref, mutable } => {
                    let value = self.next_arg(args, &mut cursor, index)?;
                    if *by_ref {
                        checkouts.push(value.check_out());
                        NativeArg::Value(value.clone())
                    } else if *mutable {
                        NativeArg::Value(value.mutable_copy())
                    } else {
                        NativeArg::Value(value.immutable_copy())
                    }
                }
                Slot::Converted(conversion) => {
                    let value = self.next_arg(args, &mut cursor, index)?;
                    conversion.to_native(value).map_err(|err| {
                        CallError::from(env.throw_from_native(NativeError::from(err), env.trace()))
                    })?
                }
                Slot::Injected(ContextKind::Environment) => NativeArg::Environment,
                Slot::Injected(ContextKind::Trace) => NativeArg::Trace(env.trace().clone()),
                Slot::VarargTail { by_ref, mutable } => {
                    let rest = args.get(cursor..).unwrap_or_default();
                    if *by_ref {
                        checkouts.extend(rest.iter().map(Memory::check_out));
                        NativeArg::Varargs(rest.to_vec())
                    } else if *mutable {
                        NativeArg::Varargs(rest.iter().map(Memory::mutable_copy).collect())
                    } else {
                        NativeArg::Varargs(rest.iter().map(Memory::immutable_copy).collect())
                    }
                }
            };
            native_args.push(arg);
        }

        Ok((native_args, checkouts))
    }

    fn next_arg<'m>(
        &self,
        args: &'m [Memory],
        cursor: &mut usize,
        slot: usize,
    ) -> Result<&'m Memory, InternalError> {
        let value = args
            .get(*cursor)
            .ok_or_else(|| InternalError::ArgumentsExhausted {
                name: self.signature_string(),
                slot,
                available: args.len(),
            })?;
        *cursor += 1;
        Ok(value)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
