//! Static-write pass
//!
//! Consumes calls to a two-argument sentinel function at compile time: the
//! first argument is resolved to a filename, the second to bytes through
//! constant folding, and the bytes are appended to the file.
//!
//! ## Modules
//!
//! - [`locator`]: finds sentinel calls
//! - [`filename`]: resolves argument 0 to a filename
//! - [`extract`]: resolves argument 1 to bytes
//! - [`fold`]: constant folding seam and the tree folder
//! - [`value`]: folded constant values
//! - [`writer`]: byte sinks
//! - [`pass`]: the driver tying them together

pub mod extract;
pub mod filename;
pub mod fold;
pub mod locator;
pub mod pass;
pub mod value;
pub mod writer;

pub use extract::{ExtractionOutcome, Extractor, render_value};
pub use filename::FilenameResolver;
pub use fold::{ConstantFolder, TreeFolder};
pub use locator::{SentinelCall, SentinelLocator};
pub use pass::{CallOutcome, CallReport, PassReport, StaticWritePass};
pub use value::{ArrayValue, ConstantValue, FloatValue, LValueBase};
pub use writer::{ByteSink, FileAppender, MemorySink};

// Re-export the shared types for convenience
pub use static_write_core::{Diagnostics, Failure, FailureKind, PassOptions};
