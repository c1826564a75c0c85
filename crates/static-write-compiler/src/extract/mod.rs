//! Constant byte extraction.
//!
//! The [`Extractor`] turns an expression that denotes compile-time constant
//! data into bytes. Node shapes are tried in a fixed order:
//!
//! 1. string literal: its encoded contents, verbatim;
//! 2. brace list: one byte per integer or character element, where a
//!    nested list replaces everything before it;
//! 3. anything else is folded and must yield a reference, whose target is
//!    then resolved: a variable's initializer or a referenced expression is
//!    extracted again;
//! 4. a fixed-size array variable without a literal initializer is folded
//!    as a whole (see `array`);
//! 5. static members of class-template specializations fall back to their
//!    folded initializer or the specialization's integral template
//!    arguments (see `static_member`).
//!
//! Every failure is reported to the [`Diagnostics`] once, where it is
//! detected, and then propagated with `?`.

mod array;
mod init_list;
mod render;
mod static_member;

use static_write_ast::{Decl, DeclId, Expr, TranslationUnit, Type, VarDecl};
use static_write_core::{Diagnostics, Failure, FailureKind, Span};
use tracing::{debug, trace};

use crate::fold::ConstantFolder;
use crate::value::{ConstantValue, LValueBase};

pub use render::render_value;

/// Bytes extracted from a constant, or the failure that stopped extraction.
///
/// `Ok` with an empty vector is a constant that legitimately holds no
/// bytes; it is distinct from `Err` but equally suppresses the write.
pub type ExtractionOutcome = Result<Vec<u8>, Failure>;

/// Extracts bytes from constant expressions of one translation unit.
pub struct Extractor<'a, 'ast, F> {
    unit: &'a TranslationUnit<'ast>,
    folder: &'a F,
    diagnostics: &'a mut Diagnostics,
    depth: usize,
    max_depth: usize,
}

impl<'a, 'ast, F: ConstantFolder<'ast>> Extractor<'a, 'ast, F> {
    /// Create an extractor that reports into `diagnostics`.
    ///
    /// Reference chains nested deeper than `max_depth` fail with
    /// [`FailureKind::RecursionLimit`].
    pub fn new(
        unit: &'a TranslationUnit<'ast>,
        folder: &'a F,
        diagnostics: &'a mut Diagnostics,
        max_depth: usize,
    ) -> Self {
        Self {
            unit,
            folder,
            diagnostics,
            depth: 0,
            max_depth,
        }
    }

    /// Extract the bytes `expr` denotes.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn extract(&mut self, expr: &'ast Expr<'ast>) -> ExtractionOutcome {
        if self.depth >= self.max_depth {
            return Err(self.fail(Failure::recursion_limit(expr.span(), self.max_depth)));
        }
        self.depth += 1;
        let outcome = self.dispatch(expr);
        self.depth -= 1;
        outcome
    }

    fn dispatch(&mut self, expr: &'ast Expr<'ast>) -> ExtractionOutcome {
        let expr = expr.ignore_wrappers();
        trace!(class = expr.class_name(), span = %expr.span(), depth = self.depth, "extracting");

        match expr {
            Expr::StringLiteral(lit) => Ok(lit.bytes.to_vec()),
            Expr::InitList(list) => init_list::extract_init_list(self, list),
            _ => self.extract_reference(expr),
        }
    }

    fn extract_reference(&mut self, expr: &'ast Expr<'ast>) -> ExtractionOutcome {
        let span = expr.span();
        match self.folder.evaluate(expr) {
            Some(ConstantValue::LValue(base)) => self.resolve_target(base, span),
            Some(value) => Err(self.fail(Failure::evaluation(
                span,
                format!(
                    "expected a reference to constant data, found {} value",
                    value.kind_name()
                ),
            ))),
            None => Err(self.fail(Failure::evaluation(
                span,
                format!(
                    "{} could not be evaluated as a constant expression",
                    expr.class_name()
                ),
            ))),
        }
    }

    /// Resolve what a folded reference points at.
    pub(crate) fn resolve_target(
        &mut self,
        base: LValueBase<'ast>,
        span: Span,
    ) -> ExtractionOutcome {
        let unit = self.unit;
        match base {
            LValueBase::Expr(target) => self.extract(target),
            LValueBase::Decl(id) => match unit.get(id) {
                Some(Decl::Var(var)) => self.extract_var(id, var, span),
                Some(other) => Err(self.fail(Failure::unknown_target(span, other.kind_name()))),
                None => Err(self.fail(Failure::unknown_target(span, "missing declaration"))),
            },
        }
    }

    fn extract_var(&mut self, id: DeclId, var: &'a VarDecl<'ast>, span: Span) -> ExtractionOutcome {
        debug!(name = var.name, "resolving variable");

        if var.is_static_member() {
            return static_member::extract_static_member(self, id, var, span);
        }

        let literal_init = var.init.filter(|init| {
            matches!(
                init.ignore_wrappers(),
                Expr::StringLiteral(_) | Expr::InitList(_)
            )
        });
        match (literal_init, var.init, var.ty) {
            (Some(init), _, _) => self.extract(init),
            (None, _, Type::ConstantArray { len, .. }) => array::extract_array(self, id, len, span),
            (None, Some(init), _) => self.extract(init),
            (None, None, _) => Err(self.fail(Failure::new(
                FailureKind::UnknownReferenceTarget,
                span,
                format!("variable '{}' has no initializer", var.name),
            ))),
        }
    }

    /// Report `failure` and hand it back for propagation.
    fn fail(&mut self, failure: Failure) -> Failure {
        debug!(kind = %failure.kind, span = %failure.span, "{}", failure.message);
        self.diagnostics.report(&failure);
        failure
    }
}

/// Extract `expr` with a fresh [`TreeFolder`](crate::fold::TreeFolder) and
/// diagnostics collection.
#[cfg(test)]
pub(crate) fn run<'ast>(
    unit: &TranslationUnit<'ast>,
    expr: &'ast Expr<'ast>,
) -> (ExtractionOutcome, Diagnostics) {
    let folder = crate::fold::TreeFolder::new(unit, 64);
    let mut diagnostics = Diagnostics::new();
    let outcome = Extractor::new(unit, &folder, &mut diagnostics, 64).extract(expr);
    (outcome, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::TreeFolder;
    use bumpalo::Bump;
    use static_write_ast::{FunctionFlags, IntType, UnitBuilder, VarFlags};

    use super::run as extract;

    #[test]
    fn string_literal_yields_raw_bytes() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let s = b.string("this is a test\n");
        let unit = b.finish();

        let (outcome, diagnostics) = extract(&unit, s);
        assert_eq!(outcome.unwrap(), b"this is a test\n");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn string_literal_keeps_embedded_nul() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let s = b.string_bytes(b"a\0b");
        let unit = b.finish();

        assert_eq!(extract(&unit, s).0.unwrap(), vec![b'a', 0, b'b']);
    }

    #[test]
    fn decayed_array_resolves_through_initializer() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let ty = b.array_of(Type::Int(IntType::CHAR), 3);
        let elems = [b.int(100), b.int(100), b.int(100)];
        let init = b.init_list_typed(&elems, ty);
        let data = b.constexpr_var("data", ty, init);
        let arg = b.decayed_ref(data);
        let unit = b.finish();

        assert_eq!(extract(&unit, arg).0.unwrap(), vec![100, 100, 100]);
    }

    #[test]
    fn literal_initializer_wins_over_declared_length() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let text_ty = b.array_of(Type::Int(IntType::CHAR), 6);
        let hello = b.string("hello");
        let text = b.constexpr_var("s", text_ty, hello);
        let text_ref = b.decayed_ref(text);
        let list_ty = b.array_of(Type::Int(IntType::CHAR), 5);
        let elems = [b.int(1), b.int(2)];
        let init = b.init_list_typed(&elems, list_ty);
        let list = b.constexpr_var("a", list_ty, init);
        let list_ref = b.decayed_ref(list);
        let unit = b.finish();

        // no padding to the declared length, and no terminator
        assert_eq!(extract(&unit, text_ref).0.unwrap(), b"hello");
        assert_eq!(extract(&unit, list_ref).0.unwrap(), vec![1, 2]);
    }

    #[test]
    fn pointer_variable_chains_to_string() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let char_ptr = b.pointer_to(Type::Int(IntType::CHAR));
        let s = b.string("chained");
        let p = b.constexpr_var("p", char_ptr, s);
        let q_init = b.load(p);
        let q = b.constexpr_var("q", char_ptr, q_init);
        let arg = b.load(q);
        let unit = b.finish();

        assert_eq!(extract(&unit, arg).0.unwrap(), b"chained");
    }

    #[test]
    fn integer_literal_is_an_evaluation_failure() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let one = b.int(1);
        let unit = b.finish();

        let (outcome, diagnostics) = extract(&unit, one);
        assert_eq!(outcome.unwrap_err().kind, FailureKind::EvaluationFailure);
        assert_eq!(diagnostics.failure_kinds(), vec![FailureKind::EvaluationFailure]);
    }

    #[test]
    fn runtime_call_is_an_evaluation_failure() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let char_ptr = b.pointer_to(Type::Int(IntType::CHAR));
        let f = b.function("arr2", char_ptr, FunctionFlags::empty());
        let s = b.string("x");
        let ret = b.return_stmt(Some(s));
        b.set_body(f, &[ret]);
        let call = b.call(f, &[]);
        let unit = b.finish();

        let failure = extract(&unit, call).0.unwrap_err();
        assert_eq!(failure.kind, FailureKind::EvaluationFailure);
        assert!(failure.message.contains("CallExpr"), "{}", failure.message);
    }

    #[test]
    fn function_reference_is_an_unknown_target() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let f = b.function("f", Type::Void, FunctionFlags::empty());
        let reference = b.decl_ref(f);
        let unit = b.finish();

        let (outcome, diagnostics) = extract(&unit, reference);
        assert_eq!(outcome.unwrap_err().kind, FailureKind::UnknownReferenceTarget);
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn scalar_variable_without_initializer_is_an_unknown_target() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let x = b.var("x", Type::Int(IntType::INT), None, VarFlags::CONST);
        let reference = b.decl_ref(x);
        let unit = b.finish();

        let failure = extract(&unit, reference).0.unwrap_err();
        assert_eq!(failure.kind, FailureKind::UnknownReferenceTarget);
        assert!(failure.message.contains("'x'"));
    }

    #[test]
    fn self_referential_chain_hits_depth_limit() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let char_ptr = b.pointer_to(Type::Int(IntType::CHAR));
        let a = b.var("a", char_ptr, None, VarFlags::CONSTEXPR);
        let c_init = b.load(a);
        let c = b.constexpr_var("c", char_ptr, c_init);
        let back = b.load(c);
        b.set_init(a, back);
        let arg = b.load(c);
        let unit = b.finish();

        let folder = TreeFolder::new(&unit, 64);
        let mut diagnostics = Diagnostics::new();
        let failure = Extractor::new(&unit, &folder, &mut diagnostics, 8)
            .extract(arg)
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RecursionLimit);
        assert_eq!(diagnostics.failure_kinds(), vec![FailureKind::RecursionLimit]);
    }
}
