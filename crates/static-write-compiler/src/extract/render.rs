//! Bytes of an already folded value.

use static_write_core::Span;

use super::{ExtractionOutcome, Extractor};
use crate::fold::ConstantFolder;
use crate::value::ConstantValue;

/// Text form of a scalar: decimal integers (signed or unsigned as typed)
/// and shortest round-trip floats. `None` for arrays and references.
pub fn render_value(value: &ConstantValue<'_>) -> Option<String> {
    match value {
        ConstantValue::Int(v) => Some(v.to_string()),
        ConstantValue::Float(f) => Some(f.to_string()),
        ConstantValue::Array(_) | ConstantValue::LValue(_) => None,
    }
}

/// Bytes for a value the folder produced directly.
///
/// Scalars are emitted as their ASCII text, not their in-memory layout.
/// References are resolved like any other reference; arrays contribute the
/// low byte of each written integer element.
pub(super) fn value_bytes<'a, 'ast, F: ConstantFolder<'ast>>(
    ex: &mut Extractor<'a, 'ast, F>,
    value: ConstantValue<'ast>,
    span: Span,
) -> ExtractionOutcome {
    match value {
        ConstantValue::Int(v) => Ok(v.to_string().into_bytes()),
        ConstantValue::Float(f) => Ok(f.to_string().into_bytes()),
        ConstantValue::LValue(base) => ex.resolve_target(base, span),
        ConstantValue::Array(array) => Ok(array
            .elements()
            .iter()
            .filter_map(ConstantValue::as_int)
            .map(|v| v.low_byte())
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FloatValue;
    use static_write_ast::{FloatKind, IntType, IntValue};

    #[test]
    fn integers_render_in_decimal() {
        let signed = ConstantValue::Int(IntValue::new(-42, IntType::INT));
        let unsigned = ConstantValue::Int(IntValue::new(-1, IntType::UINT));

        assert_eq!(render_value(&signed).as_deref(), Some("-42"));
        assert_eq!(render_value(&unsigned).as_deref(), Some("4294967295"));
    }

    #[test]
    fn floats_render_shortest() {
        let third = ConstantValue::Float(FloatValue::new(1.0 / 3.0, FloatKind::Float));
        assert_eq!(render_value(&third).as_deref(), Some("0.33333334"));
    }

    #[test]
    fn aggregates_have_no_text() {
        let array = ConstantValue::Array(Default::default());
        assert_eq!(render_value(&array), None);
    }
}
