//! The pass driver.
//!
//! For each located sentinel call, in source order:
//!
//! 1. argument 0 is resolved to a filename; on failure the call is
//!    abandoned before its data is looked at;
//! 2. argument 1 is extracted to bytes;
//! 3. non-empty bytes are appended to the resolved file.
//!
//! Failures are reported to the run's [`Diagnostics`] and only suppress the
//! write of the call they belong to.

use std::path::PathBuf;

use static_write_ast::TranslationUnit;
use static_write_core::{Diagnostics, Failure, FailureKind, OptionsError, PassOptions, Span};
use tracing::{debug, warn};

use crate::extract::Extractor;
use crate::filename::FilenameResolver;
use crate::fold::{ConstantFolder, TreeFolder};
use crate::locator::{SentinelCall, SentinelLocator};
use crate::writer::{ByteSink, FileAppender};

/// What happened to one sentinel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The bytes were appended to `path`.
    Written { path: PathBuf, bytes: usize },
    /// Dry run: the bytes would have been appended to `path`.
    DryRun { path: PathBuf, bytes: usize },
    /// The data resolved to no bytes; nothing was written.
    Empty,
    /// The call was abandoned.
    Failed(FailureKind),
}

impl CallOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, CallOutcome::Written { .. })
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            CallOutcome::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Outcome of one sentinel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport {
    /// Location of the call.
    pub span: Span,
    pub outcome: CallOutcome,
}

/// Result of running the pass over a translation unit.
#[derive(Debug, Default)]
pub struct PassReport {
    /// One entry per located call, in source order.
    pub calls: Vec<CallReport>,
    /// Everything reported while processing the calls.
    pub diagnostics: Diagnostics,
}

impl PassReport {
    /// Check if every call was carried out (no errors).
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &CallOutcome> {
        self.calls.iter().map(|call| &call.outcome)
    }

    /// Total number of bytes written (or, in a dry run, that would be).
    pub fn bytes_written(&self) -> usize {
        self.outcomes()
            .map(|outcome| match outcome {
                CallOutcome::Written { bytes, .. } | CallOutcome::DryRun { bytes, .. } => *bytes,
                CallOutcome::Empty | CallOutcome::Failed(_) => 0,
            })
            .sum()
    }
}

/// Consumes sentinel calls of a translation unit.
#[derive(Debug, Clone)]
pub struct StaticWritePass {
    options: PassOptions,
}

impl StaticWritePass {
    /// Create a pass with validated options.
    pub fn new(options: PassOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &PassOptions {
        &self.options
    }

    /// Run over `unit`, folding with a [`TreeFolder`] and appending to files
    /// on disk.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self, unit: &TranslationUnit<'_>) -> PassReport {
        let folder = TreeFolder::new(unit, self.options.max_depth);
        self.run_with(unit, &folder, &mut FileAppender)
    }

    /// Run over `unit` with a caller-supplied folder and sink.
    pub fn run_with<'ast, F, S>(
        &self,
        unit: &TranslationUnit<'ast>,
        folder: &F,
        sink: &mut S,
    ) -> PassReport
    where
        F: ConstantFolder<'ast>,
        S: ByteSink + ?Sized,
    {
        let calls = SentinelLocator::new(&self.options.sentinel).locate(unit);
        let mut report = PassReport::default();

        for call in calls {
            let outcome = match self.process(unit, folder, sink, &call, &mut report.diagnostics) {
                Ok(outcome) => outcome,
                Err(failure) => {
                    warn!(span = %call.span(), kind = %failure.kind, "sentinel call abandoned");
                    CallOutcome::Failed(failure.kind)
                }
            };
            report.calls.push(CallReport {
                span: call.span(),
                outcome,
            });
        }

        debug!(
            calls = report.calls.len(),
            bytes = report.bytes_written(),
            errors = report.diagnostics.error_count(),
            "static write pass finished"
        );
        report
    }

    fn process<'ast, F, S>(
        &self,
        unit: &TranslationUnit<'ast>,
        folder: &F,
        sink: &mut S,
        call: &SentinelCall<'ast>,
        diagnostics: &mut Diagnostics,
    ) -> Result<CallOutcome, Failure>
    where
        F: ConstantFolder<'ast>,
        S: ByteSink + ?Sized,
    {
        let filename = FilenameResolver::new(unit, folder).resolve(call.filename, diagnostics)?;

        let bytes = Extractor::new(unit, folder, diagnostics, self.options.max_depth)
            .extract(call.data)?;
        if bytes.is_empty() {
            diagnostics.note(call.data.span(), "data holds no bytes; nothing written");
            return Ok(CallOutcome::Empty);
        }

        let path = self.options.target_path(&filename);
        debug!(path = %path.display(), len = bytes.len(), "resolved sentinel call");
        if self.options.dry_run {
            return Ok(CallOutcome::DryRun {
                path,
                bytes: bytes.len(),
            });
        }

        if let Err(err) = sink.append(&path, &bytes) {
            let failure = Failure::file_open(call.data.span(), &path.display().to_string(), &err);
            diagnostics.report(&failure);
            return Err(failure);
        }
        Ok(CallOutcome::Written {
            path,
            bytes: bytes.len(),
        })
    }
}
