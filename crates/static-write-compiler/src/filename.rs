//! Filename resolution for the first sentinel argument.
//!
//! A filename is flat text. Unlike data extraction, resolution never walks
//! lists or arrays and follows a variable's initializer at most once.
//!
//! The text is read as a C string: it ends at the first NUL. The remaining
//! bytes become the path unchanged, so on Unix a name need not be UTF-8.

use std::path::PathBuf;

use static_write_ast::{Expr, TranslationUnit};
use static_write_core::{Diagnostics, Failure};
use tracing::{debug, trace};

use crate::fold::ConstantFolder;
use crate::value::{ConstantValue, LValueBase};

/// Resolves filename arguments of one translation unit.
pub struct FilenameResolver<'a, 'ast, F> {
    unit: &'a TranslationUnit<'ast>,
    folder: &'a F,
}

impl<'a, 'ast, F: ConstantFolder<'ast>> FilenameResolver<'a, 'ast, F> {
    pub fn new(unit: &'a TranslationUnit<'ast>, folder: &'a F) -> Self {
        Self { unit, folder }
    }

    /// Resolve `expr` to a filename.
    ///
    /// Any failure is reported to `diagnostics` as
    /// [`UnresolvedFilename`](static_write_core::FailureKind::UnresolvedFilename)
    /// against the argument's span.
    pub fn resolve(
        &self,
        expr: &'ast Expr<'ast>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PathBuf, Failure> {
        let expr = expr.ignore_wrappers();
        let resolved = self
            .literal_bytes(expr)
            .filter(|bytes| !bytes.is_empty())
            .map(path_from_bytes);

        match resolved {
            Some(name) => {
                debug!(filename = %name.display(), "resolved filename");
                Ok(name)
            }
            None => {
                let failure = Failure::unresolved_filename(expr.span());
                debug!(span = %failure.span, class = expr.class_name(), "filename did not resolve");
                diagnostics.report(&failure);
                Err(failure)
            }
        }
    }

    /// The text bytes `expr` refers to, up to the first NUL.
    fn literal_bytes(&self, expr: &'ast Expr<'ast>) -> Option<&'ast [u8]> {
        let base = match self.folder.evaluate(expr)? {
            ConstantValue::LValue(base) => base,
            other => {
                trace!(value = other.kind_name(), "filename is not a reference");
                return None;
            }
        };

        let bytes = match base {
            LValueBase::Expr(target) => string_literal(target)?,
            LValueBase::Decl(id) => {
                let init = self.unit.get(id)?.as_var()?.init?;
                match string_literal(init) {
                    Some(bytes) => bytes,
                    // one step through a pointer-valued initializer
                    None => match self.folder.evaluate(init)? {
                        ConstantValue::LValue(LValueBase::Expr(target)) => string_literal(target)?,
                        _ => return None,
                    },
                }
            }
        };
        Some(trim_terminators(bytes))
    }
}

fn string_literal<'ast>(expr: &'ast Expr<'ast>) -> Option<&'ast [u8]> {
    match expr.ignore_wrappers() {
        Expr::StringLiteral(lit) => Some(lit.bytes),
        _ => None,
    }
}

fn trim_terminators(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
