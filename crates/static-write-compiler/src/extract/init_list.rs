//! Brace-initializer lists.

use static_write_ast::{Expr, InitListExpr};
use static_write_core::Failure;
use tracing::trace;

use super::{ExtractionOutcome, Extractor};
use crate::fold::ConstantFolder;

/// One byte per element, in order.
///
/// Integer and character literals contribute their low byte. A nested list
/// is extracted on its own and its bytes become the whole result: elements
/// before it are dropped and elements after it are never looked at. Any
/// other element aborts the list.
pub(super) fn extract_init_list<'a, 'ast, F: ConstantFolder<'ast>>(
    ex: &mut Extractor<'a, 'ast, F>,
    list: &'ast InitListExpr<'ast>,
) -> ExtractionOutcome {
    let mut bytes = Vec::with_capacity(list.elements.len());

    for element in list.elements {
        let element = element.ignore_wrappers();
        match element {
            Expr::IntegerLiteral(lit) => bytes.push(lit.value.low_byte()),
            Expr::CharacterLiteral(lit) => bytes.push(lit.value as u8),
            Expr::InitList(_) => {
                trace!(dropped = bytes.len(), "nested list replaces accumulated bytes");
                return ex.extract(element);
            }
            other => {
                return Err(ex.fail(Failure::unsupported_expression(
                    other.span(),
                    other.class_name(),
                )));
            }
        }
    }

    Ok(bytes)
}
