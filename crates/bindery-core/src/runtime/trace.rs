//! Call-site location tokens.

use std::fmt;
use std::sync::Arc;

/// Where in interpreted source a call happened.
///
/// Cheap to clone; the file name is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceInfo {
    file: Arc<str>,
    /// 1-based line, 0 when unknown
    pub line: u32,
    /// 1-based column, 0 when unknown
    pub col: u32,
}

impl TraceInfo {
    pub fn new(file: impl Into<Arc<str>>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            line,
            col,
        }
    }

    /// Trace for calls that do not originate from source code.
    pub fn unknown() -> Self {
        Self::new("<unknown>", 0, 0)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.col == 0
    }
}

impl Default for TraceInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for TraceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(TraceInfo::new("main.src", 3, 9).to_string(), "main.src:3:9");
    }

    #[test]
    fn unknown() {
        assert!(TraceInfo::default().is_unknown());
        assert!(!TraceInfo::new("a", 1, 1).is_unknown());
    }
}
