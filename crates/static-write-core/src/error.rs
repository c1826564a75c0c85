//! Error types for the static-write pass.
//!
//! ## Error Hierarchy
//!
//! ```text
//! Failure          - one reportable problem with a sentinel call
//! └── FailureKind  - the category (stable numeric code per kind)
//! OptionsError     - invalid pass configuration, rejected up front
//! ```
//!
//! A [`Failure`] never aborts the host compilation. It is reported once,
//! at the level that detected it, and suppresses the file write for the
//! call it belongs to.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

use crate::Span;

// ============================================================================
// Failures
// ============================================================================

/// Categories of extraction and write failures.
///
/// The discriminants are the stable diagnostic codes printed as `SWnnnn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum FailureKind {
    /// Argument 0 did not reduce to a string-producing reference.
    UnresolvedFilename = 1,
    /// A brace-list element was neither an integer, a character nor a nested list.
    UnsupportedExpressionKind = 2,
    /// Constant folding produced no value, or not the shape that was required.
    EvaluationFailure = 3,
    /// A reference pointed at something that holds no data.
    UnknownReferenceTarget = 4,
    /// A static member is not nested in any class-template specialization.
    TemplateContextNotFound = 5,
    /// The resolved file could not be opened or written.
    FileOpenFailure = 6,
    /// Reference chains nested deeper than the configured limit.
    RecursionLimit = 7,
}

impl FailureKind {
    /// Returns a human-readable name for this failure kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnresolvedFilename => "unresolved filename",
            FailureKind::UnsupportedExpressionKind => "unsupported expression kind",
            FailureKind::EvaluationFailure => "evaluation failure",
            FailureKind::UnknownReferenceTarget => "unknown reference target",
            FailureKind::TemplateContextNotFound => "template context not found",
            FailureKind::FileOpenFailure => "file open failure",
            FailureKind::RecursionLimit => "recursion limit reached",
        }
    }

    /// The diagnostic code, e.g. `SW0003`.
    pub fn code(&self) -> String {
        format!("SW{:04}", u16::from(*self))
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct Failure {
    /// The category of this failure.
    pub kind: FailureKind,
    /// The node the failure is reported against.
    pub span: Span,
    /// A detailed message.
    pub message: String,
}

impl Failure {
    /// Create a new failure.
    pub fn new(kind: FailureKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Argument 0 of a sentinel call could not be turned into a filename.
    pub fn unresolved_filename(span: Span) -> Self {
        Self::new(
            FailureKind::UnresolvedFilename,
            span,
            "filename is not a constant string or could not be resolved",
        )
    }

    /// A brace-list element of an unsupported syntactic class.
    pub fn unsupported_expression(span: Span, class_name: &str) -> Self {
        Self::new(
            FailureKind::UnsupportedExpressionKind,
            span,
            format!("unsupported element in initializer list: {class_name}"),
        )
    }

    /// The constant folder produced nothing usable.
    pub fn evaluation(span: Span, detail: impl Into<String>) -> Self {
        Self::new(FailureKind::EvaluationFailure, span, detail)
    }

    /// A reference whose target holds no data.
    pub fn unknown_target(span: Span, target: &str) -> Self {
        Self::new(
            FailureKind::UnknownReferenceTarget,
            span,
            format!("reference target is a {target}, not a variable or expression"),
        )
    }

    /// A static member outside any class-template specialization.
    pub fn template_context_not_found(span: Span, member: &str) -> Self {
        Self::new(
            FailureKind::TemplateContextNotFound,
            span,
            format!("static member '{member}' is not inside a class template specialization"),
        )
    }

    /// The target file could not be opened for appending.
    pub fn file_open(span: Span, path: &str, cause: &std::io::Error) -> Self {
        Self::new(
            FailureKind::FileOpenFailure,
            span,
            format!("could not open '{path}' for appending: {cause}"),
        )
    }

    /// Reference resolution nested too deeply.
    pub fn recursion_limit(span: Span, limit: usize) -> Self {
        Self::new(
            FailureKind::RecursionLimit,
            span,
            format!("constant resolution exceeded the depth limit of {limit}"),
        )
    }
}

// ============================================================================
// Options Errors
// ============================================================================

/// Invalid [`PassOptions`](crate::PassOptions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// The sentinel function name is empty.
    #[error("sentinel function name must not be empty")]
    EmptySentinel,

    /// A depth limit of zero would reject every call.
    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display() {
        let failure = Failure::unsupported_expression(Span::new(4, 12, 3), "CallExpr");
        assert_eq!(
            failure.to_string(),
            "unsupported expression kind at 4:12: unsupported element in initializer list: CallExpr"
        );
    }

    #[test]
    fn failure_codes_are_stable() {
        assert_eq!(FailureKind::UnresolvedFilename.code(), "SW0001");
        assert_eq!(FailureKind::FileOpenFailure.code(), "SW0006");
        assert_eq!(
            FailureKind::try_from(3u16).unwrap(),
            FailureKind::EvaluationFailure
        );
        assert!(FailureKind::try_from(0u16).is_err());
    }

    #[test]
    fn options_error_display() {
        assert_eq!(
            OptionsError::ZeroDepth.to_string(),
            "max_depth must be at least 1"
        );
    }
}
