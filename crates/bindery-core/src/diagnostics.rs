use std::collections::VecDeque;
use std::fmt;

use crate::runtime::TraceInfo;

/// Severity code attached to a reported runtime problem.
///
/// The binding layer only ever reports recoverable conditions: the call that
/// produced the diagnostic still returns normally (with a null result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A structural violation (calling an abstract member, missing receiver).
    Error,
    /// A defect in how a member was bound.
    CoreError,
    /// An error the caller is expected to recover from.
    RecoverableError,
    /// Suspicious but legal usage, e.g. a wrong argument count.
    Warning,
    Notice,
    Deprecated,
}

impl ErrorType {
    /// Coarse classification used for counting and display.
    pub fn kind(self) -> DiagnosticKind {
        match self {
            ErrorType::Error | ErrorType::CoreError | ErrorType::RecoverableError => {
                DiagnosticKind::Error
            }
            ErrorType::Warning => DiagnosticKind::Warning,
            ErrorType::Notice | ErrorType::Deprecated => DiagnosticKind::Info,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorType::Error => "fatal error",
            ErrorType::CoreError => "core error",
            ErrorType::RecoverableError => "recoverable error",
            ErrorType::Warning => "warning",
            ErrorType::Notice => "notice",
            ErrorType::Deprecated => "deprecated",
        };
        f.write_str(name)
    }
}

/// A single reported runtime problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The severity code
    pub error_type: ErrorType,
    /// The message text
    pub message: String,
    /// Where the offending call happened
    pub trace: TraceInfo,
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        self.error_type.kind()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.trace, self.error_type, self.message)
    }
}

/// Coarse severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

/// Diagnostics collected by an [`Environment`](crate::Environment), in
/// report order.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: VecDeque<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic to the collection.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind() == DiagnosticKind::Error {
            self.has_errors = true;
        }
        self.diagnostics.push_back(diagnostic);
    }

    /// Returns `true` if any error diagnostic was added. Tracked on insert.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind() == DiagnosticKind::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind() == DiagnosticKind::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.has_errors = false;
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::collections::vec_deque::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(error_type: ErrorType, message: &str) -> Diagnostic {
        Diagnostic {
            error_type,
            message: message.to_string(),
            trace: TraceInfo::new("test.src", 4, 2),
        }
    }

    #[test]
    fn counts_by_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_diagnostic(diag(ErrorType::Warning, "w"));
        diagnostics.add_diagnostic(diag(ErrorType::Error, "e"));
        diagnostics.add_diagnostic(diag(ErrorType::Notice, "n"));

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn clear_resets_error_flag() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_diagnostic(diag(ErrorType::CoreError, "boom"));
        diagnostics.clear();
        assert!(diagnostics.is_empty());
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn display_includes_trace_and_severity() {
        let d = diag(ErrorType::Warning, "f() expects exactly 1 parameter(s), 2 given");
        assert_eq!(
            d.to_string(),
            "test.src:4:2: warning: f() expects exactly 1 parameter(s), 2 given"
        );
    }

    #[test]
    fn display_joins_lines() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_diagnostic(diag(ErrorType::Warning, "a"));
        diagnostics.add_diagnostic(diag(ErrorType::Warning, "b"));
        assert_eq!(diagnostics.to_string().lines().count(), 2);
    }
}
