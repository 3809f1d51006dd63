//! Error types for binding time and call time.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BindingError          - registration of a native declaration failed (fatal
//!                         for that declaration, returned as Result)
//! CallError             - outcome of a failed invocation
//! ├── Exception(TranslatedException) - catchable by interpreted code
//! └── Fatal(InternalError)           - defect in the binding layer itself
//! NativeError           - raised by native implementations; becomes a
//!                         TranslatedException
//! ├── ConversionError   - argument/return value conversion failed
//! └── ValueError        - assignment to an immutable value
//! ```
//!
//! Call-time structural problems (wrong argument count, calling an abstract
//! member) are not errors at all: they are reported as diagnostics and the
//! call returns null.

use thiserror::Error;

use crate::runtime::{Memory, TraceInfo};

// ============================================================================
// Binding Errors
// ============================================================================

/// Errors raised while registering a native declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// An overload with the same argument-consuming arity already exists.
    #[error("overload conflict: {name} already has an overload taking {arity} argument(s)")]
    Conflict {
        /// The member name.
        name: String,
        /// The occupied arity.
        arity: usize,
    },

    /// A parameter type has no conversion strategy and is not a context or
    /// vararg type.
    #[error("unsupported type for binding - {type_name}")]
    UnsupportedType {
        /// The native parameter type.
        type_name: String,
    },

    /// The return type has no conversion strategy.
    #[error("unsupported return type for binding - {type_name}")]
    UnsupportedReturnType {
        /// The native return type.
        type_name: String,
    },

    /// A vararg parameter that is not the last parameter.
    #[error("vararg parameter must be last, found at position {position} of {name}")]
    MisplacedVararg {
        /// The member name.
        name: String,
        /// Zero-based native parameter position.
        position: usize,
    },
}

// ============================================================================
// Value / Conversion Errors
// ============================================================================

/// Errors raised when modifying a runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value was passed as an immutable copy.
    #[error("cannot modify an immutable value")]
    Immutable,
}

/// Errors that can occur when converting between native and runtime values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Null passed to a parameter that is not nullable
    #[error("null cannot be converted to {target_type}")]
    NullValue { target_type: &'static str },

    /// Integer overflow during conversion
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i128, target_type: &'static str },

    /// Generic conversion failure
    #[error("conversion failed: {message}")]
    Failed { message: String },
}

// ============================================================================
// Native Errors
// ============================================================================

/// Errors raised by native implementations during a call.
///
/// Every `NativeError` is translated into a [`TranslatedException`] that
/// interpreted code can catch.
#[derive(Debug, Clone, Error)]
pub enum NativeError {
    /// Error converting an argument
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error modifying an argument
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Argument index out of bounds
    #[error("argument index {index} out of bounds (function has {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// The native read a slot as the wrong kind (e.g. a converted value as a vararg tail)
    #[error("argument {index} is {actual}, not {expected}")]
    SlotKindMismatch {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Invalid `this` reference for method call
    #[error("invalid 'this' reference: {message}")]
    InvalidThis { message: String },

    /// Native function panicked
    #[error("native function panicked: {message}")]
    Panic { message: String },

    /// The native threw a language-level exception value directly
    #[error("exception thrown: {0:?}")]
    Thrown(Memory),

    /// Generic native error
    #[error("{message}")]
    Other { message: String },
}

impl NativeError {
    /// Create an "invalid this" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create a generic native error.
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }

    /// Name of the exception class interpreted code sees for this failure.
    pub fn exception_class(&self) -> &'static str {
        match self {
            NativeError::Conversion(_) | NativeError::SlotKindMismatch { .. } => "TypeError",
            NativeError::Value(_) => "ValueError",
            NativeError::ArgumentIndexOutOfBounds { .. } => "ArgumentCountError",
            NativeError::InvalidThis { .. } | NativeError::Panic { .. } => "Error",
            NativeError::Thrown(_) | NativeError::Other { .. } => "Exception",
        }
    }
}

// ============================================================================
// Call Errors
// ============================================================================

/// A native failure re-raised through the language's exception channel.
#[derive(Debug, Clone, Error)]
#[error("{class_name}: {message} at {trace}")]
pub struct TranslatedException {
    /// Exception class interpreted code can match in a catch clause.
    pub class_name: String,
    /// Human-readable message.
    pub message: String,
    /// The thrown value when the native threw one itself.
    pub value: Option<Memory>,
    /// Where the failing call happened.
    pub trace: TraceInfo,
}

/// Failures inside the binding layer itself. Never catchable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    /// The marshaller ran out of incoming arguments.
    #[error("{name}: ran out of arguments at slot {slot} ({available} available)")]
    ArgumentsExhausted {
        name: String,
        slot: usize,
        available: usize,
    },

    /// The native produced a return value its return strategy cannot convert.
    #[error("{name}: return value conversion failed: {source}")]
    ReturnConversion {
        name: String,
        #[source]
        source: ConversionError,
    },
}

/// Outcome of a failed invocation.
///
/// Keeps "interpreted code may catch this" separate from "this call is
/// unrecoverable".
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error(transparent)]
    Exception(#[from] TranslatedException),

    #[error("internal failure: {0}")]
    Fatal(#[from] InternalError),
}

impl CallError {
    pub fn is_catchable(&self) -> bool {
        matches!(self, CallError::Exception(_))
    }

    pub fn exception(&self) -> Option<&TranslatedException> {
        match self {
            CallError::Exception(e) => Some(e),
            CallError::Fatal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_error_messages() {
        let err = BindingError::UnsupportedType {
            type_name: "HashMap".into(),
        };
        assert_eq!(err.to_string(), "unsupported type for binding - HashMap");

        let err = BindingError::Conflict {
            name: "max".into(),
            arity: 2,
        };
        assert!(err.to_string().contains("max"));
        assert!(err.to_string().contains("2"));
    }

    #[test]
    fn conversion_error_type_mismatch() {
        let err = ConversionError::TypeMismatch {
            expected: "int",
            actual: "string",
        };
        assert!(err.to_string().contains("type mismatch"));
        assert!(err.to_string().contains("int"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn conversion_error_integer_overflow() {
        let err = ConversionError::IntegerOverflow {
            value: 256,
            target_type: "u8",
        };
        assert!(err.to_string().contains("256"));
        assert!(err.to_string().contains("u8"));
    }

    #[test]
    fn native_error_from_conversion() {
        let native: NativeError = ConversionError::NullValue { target_type: "i64" }.into();
        assert!(matches!(native, NativeError::Conversion(_)));
        assert_eq!(native.exception_class(), "TypeError");
    }

    #[test]
    fn native_error_from_value() {
        let native: NativeError = ValueError::Immutable.into();
        assert_eq!(native.exception_class(), "ValueError");
    }

    #[test]
    fn native_error_other() {
        let err = NativeError::other("disk full");
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.exception_class(), "Exception");
    }

    #[test]
    fn call_error_catchability() {
        let exception = TranslatedException {
            class_name: "Exception".into(),
            message: "nope".into(),
            value: None,
            trace: TraceInfo::unknown(),
        };
        let err = CallError::from(exception);
        assert!(err.is_catchable());
        assert!(err.exception().is_some());

        let fatal = CallError::from(InternalError::ArgumentsExhausted {
            name: "f".into(),
            slot: 1,
            available: 0,
        });
        assert!(!fatal.is_catchable());
        assert!(fatal.exception().is_none());
    }
}
