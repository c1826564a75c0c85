//! Pass configuration.

use std::path::{Path, PathBuf};

use crate::error::OptionsError;

/// Default name of the sentinel function.
pub const DEFAULT_SENTINEL: &str = "static_write";

/// Default bound on nested reference resolution.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for one run of the static-write pass.
///
/// # Example
///
/// ```
/// use static_write_core::PassOptions;
///
/// let options = PassOptions::default()
///     .with_sentinel("emit_bytes")
///     .with_base_dir("/tmp/out")
///     .with_dry_run(true);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOptions {
    /// Name of the sentinel function whose calls are consumed.
    pub sentinel: String,
    /// Directory relative filenames are resolved against.
    ///
    /// `None` means the working directory of the compiler process.
    pub base_dir: Option<PathBuf>,
    /// Maximum nesting of reference and folding steps per call.
    pub max_depth: usize,
    /// Resolve and report every call but never touch the filesystem.
    pub dry_run: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            base_dir: None,
            max_depth: DEFAULT_MAX_DEPTH,
            dry_run: false,
        }
    }
}

impl PassOptions {
    /// Use a different sentinel function name.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Resolve relative filenames against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Bound nested resolution at `depth` levels.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check the options before a run.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.sentinel.is_empty() {
            return Err(OptionsError::EmptySentinel);
        }
        if self.max_depth == 0 {
            return Err(OptionsError::ZeroDepth);
        }
        Ok(())
    }

    /// The path a resolved filename refers to.
    ///
    /// Absolute filenames are used as-is.
    pub fn target_path(&self, filename: impl AsRef<Path>) -> PathBuf {
        let path = filename.as_ref();
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
