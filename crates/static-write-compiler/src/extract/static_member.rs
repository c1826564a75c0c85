//! Static data members of class-template specializations.
//!
//! A static member is first resolved through its initializer like any
//! variable. When that yields nothing, the member is assumed to encode a
//! value of its enclosing specialization:
//!
//! 1. the nearest enclosing class-template specialization is located, or
//!    the member fails with `TemplateContextNotFound`;
//! 2. the member's initializer is folded directly, and a scalar result is
//!    emitted as text;
//! 3. otherwise the specialization's integral template arguments are
//!    emitted in decimal, one after the other. This is a best-effort
//!    approximation and is reported as a warning, as is a specialization
//!    with no integral arguments at all.

use static_write_ast::{DeclId, TemplateArgument, VarDecl};
use static_write_core::{Failure, Span};
use tracing::{debug, trace};

use super::render::value_bytes;
use super::{ExtractionOutcome, Extractor};
use crate::fold::ConstantFolder;

pub(super) fn extract_static_member<'a, 'ast, F: ConstantFolder<'ast>>(
    ex: &mut Extractor<'a, 'ast, F>,
    id: DeclId,
    var: &'a VarDecl<'ast>,
    span: Span,
) -> ExtractionOutcome {
    if let Some(init) = var.init {
        // Failures here are expected for scalar members; keep them quiet.
        let mark = ex.diagnostics.checkpoint();
        match ex.extract(init) {
            Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
            Ok(_) => trace!(name = var.name, "initializer holds no bytes"),
            Err(failure) => {
                trace!(name = var.name, kind = %failure.kind, "initializer did not resolve");
            }
        }
        ex.diagnostics.rollback(mark);
    }

    let unit = ex.unit;
    let Some(specialization) = unit
        .ancestors(id)
        .find_map(|(_, decl)| decl.as_record().filter(|record| record.is_specialization()))
    else {
        return Err(ex.fail(Failure::template_context_not_found(span, var.name)));
    };
    debug!(
        member = var.name,
        specialization = specialization.name,
        "found enclosing specialization"
    );

    if let Some(value) = var.init.and_then(|init| ex.folder.evaluate(init)) {
        debug!(member = var.name, value = value.kind_name(), "member initializer folded");
        return value_bytes(ex, value, span);
    }

    let args = specialization.template_args.unwrap_or_default();
    let mut bytes = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        match arg {
            TemplateArgument::Integral(value) => {
                bytes.extend_from_slice(value.to_string().as_bytes());
            }
            other => trace!(index, kind = other.kind_name(), "skipping template argument"),
        }
    }

    let message = if bytes.is_empty() {
        format!(
            "value of '{}' not recovered: '{}' has no integral template arguments",
            var.name, specialization.name
        )
    } else {
        format!(
            "value of '{}' approximated from the template arguments of '{}'",
            var.name, specialization.name
        )
    };
    ex.diagnostics.warn(span, message);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use static_write_ast::{
        BinaryOp, IntType, IntValue, TemplateArgument, Type, UnitBuilder, VarFlags,
    };
    use static_write_core::{DiagnosticKind, FailureKind};

    use crate::extract::run;

    fn integral(value: i128) -> TemplateArgument<'static> {
        TemplateArgument::Integral(IntValue::new(value, IntType::INT))
    }

    #[test]
    fn member_with_string_initializer_resolves_directly() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let holder = b.specialization("Holder", &[integral(1)]);
        let ty = b.array_of(Type::Int(IntType::CHAR), 4);
        let text = b.string("abc");
        let member = b.static_member(holder, "text", ty, Some(text));
        let arg = b.decayed_ref(member);
        let unit = b.finish();

        let (outcome, diagnostics) = run(&unit, arg);
        assert_eq!(outcome.unwrap(), b"abc");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn scalar_member_is_rendered_from_its_folded_initializer() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let num = b.specialization("Num", &[integral(42)]);
        let forty = b.int(40);
        let two = b.int(2);
        let sum = b.binary(forty, BinaryOp::Add, two);
        let member = b.static_member(num, "value", Type::Int(IntType::INT), Some(sum));
        let arg = b.decl_ref(member);
        let unit = b.finish();

        let (outcome, diagnostics) = run(&unit, arg);
        assert_eq!(outcome.unwrap(), b"42");
        // the speculative attempt through the initializer left no trace
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn member_without_foldable_initializer_uses_template_arguments() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let pair = b.specialization(
            "Pair",
            &[
                integral(12),
                TemplateArgument::Type(Type::Int(IntType::CHAR)),
                TemplateArgument::Integral(IntValue::new(-3, IntType::LONG)),
            ],
        );
        let member = b.static_member(pair, "value", Type::Int(IntType::INT), None);
        let arg = b.decl_ref(member);
        let unit = b.finish();

        let (outcome, diagnostics) = run(&unit, arg);
        assert_eq!(outcome.unwrap(), b"12-3");
        assert!(!diagnostics.has_errors());
        let warning = diagnostics.iter().next().unwrap();
        assert_eq!(warning.kind, DiagnosticKind::Warning);
        assert!(warning.message.contains("'Pair'"));
    }

    #[test]
    fn runtime_initializer_falls_back_to_template_arguments() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let one = b.int(1);
        let runtime = b.var("runtime", Type::Int(IntType::INT), Some(one), VarFlags::empty());
        let fixed = b.specialization("Fixed", &[integral(7)]);
        let init = b.load(runtime);
        let member = b.static_member(fixed, "value", Type::Int(IntType::INT), Some(init));
        let arg = b.decl_ref(member);
        let unit = b.finish();

        let (outcome, diagnostics) = run(&unit, arg);
        assert_eq!(outcome.unwrap(), b"7");
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn nested_class_finds_outer_specialization() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let outer = b.specialization("Outer", &[integral(5)]);
        let inner = b.record_in(Some(outer), "Inner", None);
        let member = b.static_member(inner, "value", Type::Int(IntType::INT), None);
        let arg = b.decl_ref(member);
        let unit = b.finish();

        assert_eq!(run(&unit, arg).0.unwrap(), b"5");
    }

    #[test]
    fn plain_class_member_has_no_template_context() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let plain = b.record("Plain");
        let seven = b.int(7);
        let member = b.static_member(plain, "value", Type::Int(IntType::INT), Some(seven));
        let arg = b.decl_ref(member);
        let unit = b.finish();

        let (outcome, diagnostics) = run(&unit, arg);
        assert_eq!(outcome.unwrap_err().kind, FailureKind::TemplateContextNotFound);
        assert_eq!(
            diagnostics.failure_kinds(),
            vec![FailureKind::TemplateContextNotFound]
        );
    }

    #[test]
    fn no_integral_arguments_yields_empty_with_a_warning() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let typed = b.specialization("Typed", &[TemplateArgument::NullPtr]);
        let member = b.static_member(typed, "value", Type::Int(IntType::INT), None);
        let arg = b.decl_ref(member);
        let unit = b.finish();

        let (outcome, diagnostics) = run(&unit, arg);
        assert_eq!(outcome, Ok(Vec::new()));
        assert!(!diagnostics.has_errors());
        let warning = diagnostics.iter().next().unwrap();
        assert_eq!(warning.kind, DiagnosticKind::Warning);
        assert!(warning.message.contains("'Typed'"));
    }
}
