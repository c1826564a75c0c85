//! Discovery of sentinel calls.

use static_write_ast::{CallExpr, Decl, Expr, TranslationUnit, Visitor, walk_call_expr};
use static_write_core::Span;
use tracing::{debug, trace};

/// A located call to the sentinel function.
#[derive(Debug, Clone, Copy)]
pub struct SentinelCall<'ast> {
    /// The call itself.
    pub call: &'ast CallExpr<'ast>,
    /// Argument 0.
    pub filename: &'ast Expr<'ast>,
    /// Argument 1.
    pub data: &'ast Expr<'ast>,
}

impl SentinelCall<'_> {
    pub fn span(&self) -> Span {
        self.call.span
    }
}

/// Collects sentinel calls in source order.
///
/// A call matches when its callee names a function called `sentinel`
/// directly and it has exactly two arguments. Calls of any other arity are
/// skipped without a diagnostic.
///
/// ```
/// use bumpalo::Bump;
/// use static_write_ast::{FunctionFlags, Type, UnitBuilder};
/// use static_write_compiler::SentinelLocator;
///
/// let arena = Bump::new();
/// let mut b = UnitBuilder::new(&arena);
/// let sentinel = b.function("static_write", Type::Void, FunctionFlags::CONSTEXPR);
/// let name = b.string("out.bin");
/// let data = b.string("payload");
/// let call = b.call(sentinel, &[name, data]);
/// let stmt = b.expr_stmt(call);
/// let main = b.function("main", Type::Void, FunctionFlags::empty());
/// b.set_body(main, &[stmt]);
/// let unit = b.finish();
///
/// let calls = SentinelLocator::new("static_write").locate(&unit);
/// assert_eq!(calls.len(), 1);
/// ```
pub struct SentinelLocator<'s, 'ast> {
    sentinel: &'s str,
    calls: Vec<SentinelCall<'ast>>,
}

impl<'s, 'ast> SentinelLocator<'s, 'ast> {
    pub fn new(sentinel: &'s str) -> Self {
        Self {
            sentinel,
            calls: Vec::new(),
        }
    }

    /// Walk `unit` and return every matching call.
    pub fn locate(mut self, unit: &TranslationUnit<'ast>) -> Vec<SentinelCall<'ast>> {
        self.visit_unit(unit);
        debug!(sentinel = self.sentinel, count = self.calls.len(), "located sentinel calls");
        self.calls
    }

    fn names_sentinel(&self, unit: &TranslationUnit<'ast>, call: &CallExpr<'ast>) -> bool {
        matches!(
            call.direct_callee().and_then(|id| unit.get(id)),
            Some(Decl::Function(function)) if function.name == self.sentinel
        )
    }
}

impl<'s, 'ast> Visitor<'ast> for SentinelLocator<'s, 'ast> {
    fn visit_call_expr(&mut self, unit: &TranslationUnit<'ast>, call: &'ast CallExpr<'ast>) {
        if self.names_sentinel(unit, call) {
            match call.args {
                [filename, data] => {
                    trace!(span = %call.span, "sentinel call");
                    self.calls.push(SentinelCall {
                        call,
                        filename,
                        data,
                    });
                }
                args => trace!(span = %call.span, arity = args.len(), "ignoring sentinel call"),
            }
        }
        walk_call_expr(self, unit, call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use static_write_ast::{FunctionFlags, IntType, Type, UnitBuilder, VarFlags};

    #[test]
    fn finds_calls_in_source_order() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let sentinel = b.function("static_write", Type::Void, FunctionFlags::CONSTEXPR);
        let main = b.function("main", Type::Int(IntType::INT), FunctionFlags::empty());

        let name = b.string("a");
        let first_data = b.string("1");
        b.line(2);
        let first = b.call(sentinel, &[name, first_data]);
        let second_data = b.string("2");
        b.line(3);
        let second = b.call(sentinel, &[name, second_data]);
        let body = [b.expr_stmt(first), b.expr_stmt(second)];
        b.set_body(main, &body);
        let unit = b.finish();

        let calls = SentinelLocator::new("static_write").locate(&unit);
        let lines: Vec<u32> = calls.iter().map(|c| c.span().line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(matches!(calls[1].data, Expr::StringLiteral(lit) if lit.bytes == b"2"));
    }

    #[test]
    fn other_arities_and_names_are_ignored() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let sentinel = b.function("static_write", Type::Void, FunctionFlags::CONSTEXPR);
        let other = b.function("dynamic_write", Type::Void, FunctionFlags::empty());
        let main = b.function("main", Type::Void, FunctionFlags::empty());

        let name = b.string("a");
        let data = b.string("b");
        let extra = b.string("c");
        let one = b.call(sentinel, &[name]);
        let three = b.call(sentinel, &[name, data, extra]);
        let renamed = b.call(other, &[name, data]);
        let body = [b.expr_stmt(one), b.expr_stmt(three), b.expr_stmt(renamed)];
        b.set_body(main, &body);
        let unit = b.finish();

        assert!(SentinelLocator::new("static_write").locate(&unit).is_empty());
    }

    #[test]
    fn reaches_nested_statements_and_initializers() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let sentinel = b.function("emit", Type::Void, FunctionFlags::CONSTEXPR);
        let main = b.function("main", Type::Void, FunctionFlags::empty());

        let name = b.string("a");
        let data = b.string("b");
        let in_loop = b.call(sentinel, &[name, data]);
        let loop_body = b.expr_stmt(in_loop);
        let loop_body = b.block(&[loop_body]);
        let for_loop = b.for_stmt(None, None, None, loop_body);

        let cond = b.boolean(true);
        let in_branch = b.call(sentinel, &[name, data]);
        let then_branch = b.expr_stmt(in_branch);
        let branch = b.if_stmt(cond, then_branch, None);

        let in_init = b.call(sentinel, &[name, data]);
        let local = b.var_in(Some(main), "r", Type::Void, Some(in_init), VarFlags::empty());
        let local = b.decl_stmt(local);

        b.set_body(main, &[for_loop, branch, local]);
        let unit = b.finish();

        assert_eq!(SentinelLocator::new("emit").locate(&unit).len(), 3);
    }

    #[test]
    fn calls_inside_arguments_are_found() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let sentinel = b.function("static_write", Type::Void, FunctionFlags::CONSTEXPR);
        let name = b.string("a");
        let data = b.string("b");
        let inner = b.call(sentinel, &[name, data]);
        let outer = b.call(sentinel, &[name, inner]);
        b.var("v", Type::Void, Some(outer), VarFlags::empty());
        let unit = b.finish();

        let calls = SentinelLocator::new("static_write").locate(&unit);
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0].data, Expr::Call(_)));
    }
}
