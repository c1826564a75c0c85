//! static-write
//!
//! A compile-time side-effect pass: calls to the sentinel function
//! `static_write(filename, data)` are found in a translation unit, both
//! arguments are resolved through constant folding, and the data bytes are
//! appended to the named file.
//!
//! ```no_run
//! use bumpalo::Bump;
//! use static_write::prelude::*;
//!
//! let arena = Bump::new();
//! let mut b = UnitBuilder::new(&arena);
//! let sentinel = b.function("static_write", Type::Void, FunctionFlags::CONSTEXPR);
//! let name = b.string("out.bin");
//! let data = b.string("hello\n");
//! let call = b.call(sentinel, &[name, data]);
//! let stmt = b.expr_stmt(call);
//! let main = b.function("main", Type::Void, FunctionFlags::empty());
//! b.set_body(main, &[stmt]);
//! let unit = b.finish();
//!
//! let report = static_write::run(&unit, PassOptions::default()).unwrap();
//! assert!(report.is_success());
//! ```
//!
//! ## Crates
//!
//! - [`core`]: spans, failures, diagnostics and options
//! - [`ast`]: the syntax tree model of the host program
//! - [`compiler`]: folding, extraction and the pass driver

pub use static_write_ast as ast;
pub use static_write_compiler as compiler;
pub use static_write_core as core;

use static_write_ast::TranslationUnit;
use static_write_compiler::{PassReport, StaticWritePass};
use static_write_core::{OptionsError, PassOptions};

/// Run the pass over `unit` with `options`, writing to disk.
pub fn run(unit: &TranslationUnit<'_>, options: PassOptions) -> Result<PassReport, OptionsError> {
    Ok(StaticWritePass::new(options)?.run(unit))
}

// Re-export main types
pub mod prelude {
    pub use static_write_ast::{
        CastKind, Expr, FloatKind, FunctionFlags, IntType, IntValue, TemplateArgument,
        TranslationUnit, Type, UnitBuilder, VarFlags,
    };
    pub use static_write_compiler::{
        ByteSink, CallOutcome, ConstantFolder, FileAppender, MemorySink, PassReport,
        StaticWritePass, TreeFolder,
    };
    pub use static_write_core::{
        Diagnostic, DiagnosticKind, Diagnostics, Failure, FailureKind, PassOptions, Span,
    };
}
