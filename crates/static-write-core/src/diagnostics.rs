//! Diagnostic collection for the static-write pass.
//!
//! [`Diagnostics`] is the explicit reporting channel threaded through every
//! extraction step. It replaces the host compiler's global diagnostics
//! engine, so the pass stays testable without a running compiler; a host
//! integration forwards the collected messages with [`Diagnostics::emit`].

use std::fmt;

use crate::error::{Failure, FailureKind};
use crate::Span;

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub kind: DiagnosticKind,
    /// The failure category, for diagnostics produced by a [`Failure`].
    pub code: Option<FailureKind>,
    /// The diagnostic message text.
    pub message: String,
    /// The node the diagnostic points at.
    pub span: Span,
}

/// The severity level of a diagnostic message.
///
/// None of them stop the host compilation; an error only suppresses the
/// write of the sentinel call it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A sentinel call could not be carried out.
    Error,
    /// A sentinel call was carried out with a lossy or best-effort result.
    Warning,
    /// Informational message about what the pass did.
    Info,
}

impl DiagnosticKind {
    fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        }
    }
}

/// Position in a [`Diagnostics`] collection, returned by
/// [`Diagnostics::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// A collection of diagnostic messages, in the order they were reported.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates a new, empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a failure as an error at the failure's location.
    pub fn report(&mut self, failure: &Failure) {
        self.diagnostics.push(Diagnostic {
            kind: DiagnosticKind::Error,
            code: Some(failure.kind),
            message: failure.message.clone(),
            span: failure.span,
        });
    }

    /// Add a warning that is not tied to a failure.
    pub fn warn(&mut self, span: Span, message: impl Into<String>) {
        self.push(DiagnosticKind::Warning, span, message);
    }

    /// Add an informational note.
    pub fn note(&mut self, span: Span, message: impl Into<String>) {
        self.push(DiagnosticKind::Info, span, message);
    }

    fn push(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            kind,
            code: None,
            message: message.into(),
            span,
        });
    }

    /// Mark the current end of the collection.
    ///
    /// Everything reported after the mark can be withdrawn with
    /// [`rollback`](Self::rollback), which is how speculative resolution
    /// attempts keep their failures from reaching the user.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.diagnostics.len())
    }

    /// Withdraw every diagnostic reported since `mark`.
    pub fn rollback(&mut self, mark: Checkpoint) {
        self.diagnostics.truncate(mark.0);
    }

    /// Returns `true` if the collection contains any error diagnostics.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Returns `true` if the collection contains no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Total number of diagnostics.
    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Iterate over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Iterate over the error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Error)
    }

    /// Failure kinds of all reported errors, in report order.
    pub fn failure_kinds(&self) -> Vec<FailureKind> {
        self.diagnostics.iter().filter_map(|d| d.code).collect()
    }

    /// Removes all diagnostics from the collection.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Writes all diagnostics to `writer`, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the writer fails.
    pub fn emit<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(writer, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    /// Formats as `line:col: kind[code]: message`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(
                f,
                "{}: {}[{}]: {}",
                self.span,
                self.kind.as_str(),
                code.code(),
                self.message
            ),
            None => write!(f, "{}: {}: {}", self.span, self.kind.as_str(), self.message),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
