//! Per-caller environment: diagnostics sink and exception channel.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::diagnostics::{Diagnostic, Diagnostics, ErrorType};
use crate::error::{NativeError, TranslatedException};
use crate::runtime::{Dynamic, TraceInfo};

/// The calling environment handed to every invocation.
///
/// Reporting never fails and never blocks the call that reports: diagnostics
/// are appended to an internal collection and mirrored to `tracing`.
pub struct Environment {
    trace: TraceInfo,
    diagnostics: Mutex<Diagnostics>,
    translate_panics: bool,
}

impl Environment {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    /// Location of the call currently being executed.
    pub fn trace(&self) -> &TraceInfo {
        &self.trace
    }

    /// Move the current location, e.g. when the interpreter steps to a new line.
    pub fn set_trace(&mut self, trace: TraceInfo) {
        self.trace = trace;
    }

    /// Whether panics inside native code become catchable exceptions.
    pub fn translate_panics(&self) -> bool {
        self.translate_panics
    }

    /// Report a recoverable warning.
    pub fn warning(&self, trace: &TraceInfo, message: impl Into<String>) {
        self.report(trace, ErrorType::Warning, message.into());
    }

    /// Report an error with the given severity. Execution continues.
    pub fn error(&self, trace: &TraceInfo, error_type: ErrorType, message: impl Into<String>) {
        self.report(trace, error_type, message.into());
    }

    fn report(&self, trace: &TraceInfo, error_type: ErrorType, message: String) {
        match error_type {
            ErrorType::Warning | ErrorType::Notice | ErrorType::Deprecated => {
                tracing::warn!(%trace, %error_type, "{}", message)
            }
            _ => tracing::error!(%trace, %error_type, "{}", message),
        }
        self.lock().add_diagnostic(Diagnostic {
            error_type,
            message,
            trace: trace.clone(),
        });
    }

    /// Wrap a native failure into a catchable exception.
    pub fn throw_from_native(&self, error: NativeError, trace: &TraceInfo) -> TranslatedException {
        let class_name = match &error {
            NativeError::Thrown(value) => value.with(|v| match v {
                Dynamic::Object(obj) => obj.class_name().to_string(),
                _ => error.exception_class().to_string(),
            }),
            _ => error.exception_class().to_string(),
        };
        let (message, value) = match error {
            NativeError::Thrown(value) => {
                let message = value.with(|v| match v {
                    Dynamic::String(s) => s.clone(),
                    other => format!("{:?}", other),
                });
                (message, Some(value))
            }
            other => (other.to_string(), None),
        };
        tracing::debug!(%trace, %class_name, "translated native failure: {}", message);
        TranslatedException {
            class_name,
            message,
            value,
            trace: trace.clone(),
        }
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Diagnostics {
        self.lock().clone()
    }

    /// Remove and return everything reported so far.
    pub fn take_diagnostics(&self) -> Diagnostics {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Diagnostics> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("trace", &self.trace)
            .field("diagnostics", &self.lock().len())
            .field("translate_panics", &self.translate_panics)
            .finish()
    }
}

/// Configures an [`Environment`].
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder {
    trace: TraceInfo,
    translate_panics: bool,
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self {
            trace: TraceInfo::unknown(),
            translate_panics: true,
        }
    }
}

impl EnvironmentBuilder {
    /// Initial call-site location.
    pub fn trace(mut self, trace: TraceInfo) -> Self {
        self.trace = trace;
        self
    }

    /// Whether a panic inside a native implementation is caught and
    /// translated (default) or left to unwind through the caller.
    pub fn translate_panics(mut self, enabled: bool) -> Self {
        self.translate_panics = enabled;
        self
    }

    pub fn build(self) -> Environment {
        Environment {
            trace: self.trace,
            diagnostics: Mutex::new(Diagnostics::new()),
            translate_panics: self.translate_panics,
        }
    }
}
