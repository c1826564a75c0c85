//! Fixed-size arrays folded as a whole.

use static_write_ast::DeclId;
use static_write_core::{Failure, Span};
use tracing::trace;

use super::{ExtractionOutcome, Extractor};
use crate::fold::ConstantFolder;
use crate::value::ConstantValue;

/// Fold the array variable `id` and emit the low byte of each of its first
/// `len` elements.
///
/// Elements that are not integers are skipped without failing, unlike the
/// elements of a brace list.
pub(super) fn extract_array<'a, 'ast, F: ConstantFolder<'ast>>(
    ex: &mut Extractor<'a, 'ast, F>,
    id: DeclId,
    len: u64,
    span: Span,
) -> ExtractionOutcome {
    let unit = ex.unit;
    let name = unit.get(id).map_or("<unknown>", |decl| decl.name());

    let array = match ex.folder.evaluate_decl(id) {
        Some(ConstantValue::Array(array)) => array,
        Some(other) => {
            return Err(ex.fail(Failure::evaluation(
                span,
                format!(
                    "array '{name}' evaluated to {} value instead of an array",
                    other.kind_name()
                ),
            )));
        }
        None => {
            return Err(ex.fail(Failure::evaluation(
                span,
                format!("array '{name}' could not be evaluated as a constant expression"),
            )));
        }
    };

    let mut bytes = Vec::new();
    let mut skipped = 0usize;
    for index in 0..len {
        let Ok(index) = usize::try_from(index) else {
            break;
        };
        match array.element(index) {
            Some(ConstantValue::Int(value)) => bytes.push(value.low_byte()),
            Some(_) => skipped += 1,
            None => break,
        }
    }
    trace!(name, len, emitted = bytes.len(), skipped, "array folded");

    Ok(bytes)
}
