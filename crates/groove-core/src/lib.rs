//! Core shared types for Groove.
//!
//! This crate is intentionally small: spans, diagnostics, cancellation, and
//! the recursion/memoization primitives the analysis crates share.

mod cancel;
mod memo;
mod recursion;

pub use crate::cancel::{CancelToken, Cancelled};
pub use crate::memo::MemoMap;
pub use crate::recursion::{RecursionGuard, MAX_TYPE_RECURSION_DEPTH};

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier name.
pub type Name = smol_str::SmolStr;

/// A byte-span into a source string, half-open.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span that points nowhere; used for synthetic declarations.
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    WeakWarning,
    Info,
}

/// An opaque tag describing the quick fix a host could attach to a
/// diagnostic. The fixes themselves live host-side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixKind {
    RemoveModifier,
    AddNoArgConstructor,
    RemoveReturnValue,
    ChangeReturnType,
    RemoveDuplicate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    pub fix: Option<FixKind>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
            fix: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
            fix: None,
        }
    }

    pub fn weak_warning(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::WeakWarning,
            code,
            message: message.into(),
            span,
            fix: None,
        }
    }

    #[must_use]
    pub fn with_fix(mut self, fix: FixKind) -> Self {
        self.fix = Some(fix);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn span_debug_and_len() {
        let span = Span::new(3, 9);
        assert_eq!(format!("{span:?}"), "Span(3..9)");
        assert_eq!(span.len(), 6);
        assert!(span.contains(3));
        assert!(!span.contains(9));
    }

    #[test]
    fn diagnostic_constructors_set_severity() {
        let err = Diagnostic::error("X", "boom", Span::new(0, 1));
        assert_eq!(err.severity, Severity::Error);
        let warn = Diagnostic::warning("X", "hm", Span::new(0, 1)).with_fix(FixKind::RemoveModifier);
        assert_eq!(warn.severity, Severity::Warning);
        assert_eq!(warn.fix, Some(FixKind::RemoveModifier));
    }
}
