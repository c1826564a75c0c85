//! Shared building blocks of the static-write pass.
//!
//! - [`Span`]: node locations
//! - [`Failure`] / [`FailureKind`]: the failure taxonomy
//! - [`Diagnostics`]: the reporting channel threaded through extraction
//! - [`PassOptions`]: pass configuration

pub mod diagnostics;
pub mod error;
pub mod options;
mod span;

pub use diagnostics::{Checkpoint, Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Failure, FailureKind, OptionsError};
pub use options::{DEFAULT_MAX_DEPTH, DEFAULT_SENTINEL, PassOptions};
pub use span::Span;
