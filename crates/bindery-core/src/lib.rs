//! Core types shared by the bindery binding layer.
//!
//! This crate holds everything the binding layer needs from the surrounding
//! runtime, reduced to the parts the binding layer actually touches:
//!
//! - [`Memory`] / [`Dynamic`]: the dynamic value model with explicit
//!   shared-reference, mutable-copy and immutable-copy operations
//! - [`Instance`]: receiver objects handed to bound methods
//! - [`Environment`] / [`TraceInfo`]: the per-call context that collects
//!   diagnostics and turns native failures into catchable exceptions
//! - [`TypeHash`]: deterministic identity for native types and overloads
//! - error types for binding time and call time

pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod runtime;
pub mod type_hash;
pub mod visibility;

pub use convert::{FromDynamic, IntoDynamic, TypeName};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, ErrorType};
pub use error::{
    BindingError, CallError, ConversionError, InternalError, NativeError, TranslatedException,
    ValueError,
};
pub use runtime::{
    Checkout, Dynamic, Environment, EnvironmentBuilder, Instance, Memory, TraceInfo,
};
pub use type_hash::TypeHash;
pub use visibility::Visibility;
