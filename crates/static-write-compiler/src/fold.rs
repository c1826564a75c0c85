//! Constant folding.
//!
//! [`ConstantFolder`] is the seam to the host compiler's own constant
//! evaluator: the extractor only ever asks it for a [`ConstantValue`].
//! [`TreeFolder`] implements it over the tree model with the host's rules
//! for the subset of the language the tree can express.
//!
//! A reference to a constant variable folds to an lvalue naming the
//! variable. Its value is loaded only where the tree asks for it, through an
//! lvalue-to-rvalue conversion or an arithmetic operand. Variables that are
//! not `const` or `constexpr` hold runtime values and never fold.

use std::cell::Cell;

use static_write_ast::{
    BinaryExpr, BinaryOp, CallExpr, CastKind, Decl, DeclId, Expr, FloatKind, FunctionDecl,
    FunctionFlags, ImplicitCastExpr, InitListExpr, IntType, IntValue, MemberCallExpr,
    TranslationUnit, Type, UnaryExpr, UnaryOp,
};
use tracing::trace;

use crate::value::{ArrayValue, ConstantValue, FloatValue, LValueBase};

/// Compile-time evaluation of expressions and declarations.
pub trait ConstantFolder<'ast> {
    /// Fold `expr`, or `None` if it is not a constant expression.
    fn evaluate(&self, expr: &'ast Expr<'ast>) -> Option<ConstantValue<'ast>>;

    /// Fold the value of a variable from its initializer, converted to the
    /// variable's declared type.
    fn evaluate_decl(&self, decl: DeclId) -> Option<ConstantValue<'ast>>;
}

/// Folds expressions by walking the tree.
pub struct TreeFolder<'u, 'ast> {
    unit: &'u TranslationUnit<'ast>,
    max_depth: usize,
    depth: Cell<usize>,
}

impl<'u, 'ast> TreeFolder<'u, 'ast> {
    /// Create a folder over `unit`. Folding nested deeper than `max_depth`
    /// gives up.
    pub fn new(unit: &'u TranslationUnit<'ast>, max_depth: usize) -> Self {
        Self {
            unit,
            max_depth,
            depth: Cell::new(0),
        }
    }

    fn guarded<T>(&self, fold: impl FnOnce() -> Option<T>) -> Option<T> {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            trace!(max_depth = self.max_depth, "folding depth exhausted");
            return None;
        }
        self.depth.set(depth + 1);
        let result = fold();
        self.depth.set(depth);
        result
    }

    fn fold(&self, expr: &'ast Expr<'ast>) -> Option<ConstantValue<'ast>> {
        match expr {
            Expr::StringLiteral(_) => Some(ConstantValue::LValue(LValueBase::Expr(expr))),
            Expr::IntegerLiteral(lit) => Some(ConstantValue::Int(lit.value)),
            Expr::CharacterLiteral(lit) => Some(ConstantValue::Int(IntValue::new(
                i128::from(lit.value),
                lit.ty,
            ))),
            Expr::FloatingLiteral(lit) => {
                Some(ConstantValue::Float(FloatValue::new(lit.value, lit.kind)))
            }
            Expr::BoolLiteral(lit) => Some(ConstantValue::Int(IntValue::new(
                i128::from(lit.value),
                IntType::BOOL,
            ))),
            Expr::InitList(list) => self.fold_init_list(list),
            Expr::DeclRef(decl_ref) => self.fold_decl_ref(decl_ref.decl),
            Expr::ImplicitCast(cast) => self.fold_cast(cast),
            Expr::Paren(paren) => self.evaluate(paren.expr),
            Expr::Call(call) => self.fold_call(call),
            Expr::MemberCall(call) => self.fold_member_call(call),
            Expr::Binary(binary) => self.fold_binary(binary),
            Expr::Unary(unary) => self.fold_unary(unary),
        }
    }

    fn fold_init_list(&self, list: &'ast InitListExpr<'ast>) -> Option<ConstantValue<'ast>> {
        let elements = list
            .elements
            .iter()
            .map(|element| self.evaluate(element))
            .collect::<Option<Vec<_>>>()?;
        let array = ArrayValue::new(elements, None);
        let array = match list.ty {
            Some(Type::ConstantArray { element, len }) => {
                array.fit(len, ConstantValue::zero_of(*element))
            }
            _ => array,
        };
        Some(ConstantValue::Array(array))
    }

    fn fold_decl_ref(&self, id: DeclId) -> Option<ConstantValue<'ast>> {
        match self.unit.get(id)? {
            Decl::Var(var) if var.is_constant() => {
                Some(ConstantValue::LValue(LValueBase::Decl(id)))
            }
            Decl::Var(var) => {
                trace!(name = var.name, "reference to a runtime variable");
                None
            }
            Decl::Function(_) => Some(ConstantValue::LValue(LValueBase::Decl(id))),
            Decl::Record(_) | Decl::Namespace(_) => None,
        }
    }

    /// Read the value behind a reference to a scalar variable. Anything
    /// else is returned unchanged.
    fn load(&self, value: ConstantValue<'ast>) -> Option<ConstantValue<'ast>> {
        match value {
            ConstantValue::LValue(LValueBase::Decl(id)) => match self.unit.get(id)? {
                Decl::Var(var) if !var.ty.is_aggregate() => self.evaluate_decl(id),
                _ => Some(value),
            },
            other => Some(other),
        }
    }

    fn fold_cast(&self, cast: &'ast ImplicitCastExpr<'ast>) -> Option<ConstantValue<'ast>> {
        let value = self.evaluate(cast.expr)?;
        match cast.kind {
            CastKind::LValueToRValue => self.load(value),
            CastKind::ArrayToPointerDecay | CastKind::FunctionToPointerDecay | CastKind::NoOp => {
                Some(value)
            }
            CastKind::IntegralCast | CastKind::FloatingToIntegral => {
                to_int(self.load(value)?, cast.ty.as_int()?)
            }
            CastKind::IntegralToFloating | CastKind::FloatingCast => match cast.ty {
                Type::Float(kind) => to_float(self.load(value)?, kind),
                _ => None,
            },
        }
    }

    fn fold_call(&self, call: &'ast CallExpr<'ast>) -> Option<ConstantValue<'ast>> {
        let callee = call.direct_callee()?;
        let function = self.unit.get(callee)?.as_function()?;
        // Parameters are not bound, so only calls without arguments fold.
        if !call.args.is_empty() {
            trace!(name = function.name, "call with arguments is not folded");
            return None;
        }
        self.fold_function_result(function)
    }

    fn fold_member_call(&self, call: &'ast MemberCallExpr<'ast>) -> Option<ConstantValue<'ast>> {
        let method = self.unit.get(call.method)?.as_function()?;
        if !method.is_constexpr() || !call.args.is_empty() {
            return None;
        }
        if method.flags.contains(FunctionFlags::STORAGE_ACCESSOR) {
            return match self.evaluate(call.object)? {
                value @ ConstantValue::LValue(_) => Some(value),
                _ => None,
            };
        }
        self.fold_function_result(method)
    }

    fn fold_function_result(&self, function: &FunctionDecl<'ast>) -> Option<ConstantValue<'ast>> {
        if !function.is_constexpr() {
            trace!(name = function.name, "call to a non-constexpr function");
            return None;
        }
        self.evaluate(function.returned_expr()?)
    }

    fn fold_binary(&self, binary: &'ast BinaryExpr<'ast>) -> Option<ConstantValue<'ast>> {
        let left = self.load(self.evaluate(binary.left)?)?;
        let right = self.load(self.evaluate(binary.right)?)?;
        match (left, right) {
            (ConstantValue::Int(l), ConstantValue::Int(r)) => {
                fold_int_binary(binary.op, l, r).map(ConstantValue::Int)
            }
            (l, r) => {
                let kind = float_kind(&l).max(float_kind(&r))?;
                let l = as_f64(&l)?;
                let r = as_f64(&r)?;
                let value = match binary.op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div if r != 0.0 => l / r,
                    _ => return None,
                };
                Some(ConstantValue::Float(FloatValue::new(value, kind_from_rank(kind))))
            }
        }
    }

    fn fold_unary(&self, unary: &'ast UnaryExpr<'ast>) -> Option<ConstantValue<'ast>> {
        let value = self.evaluate(unary.operand)?;
        if unary.op == UnaryOp::AddrOf {
            return match value {
                ConstantValue::LValue(_) => Some(value),
                _ => None,
            };
        }
        match (unary.op, self.load(value)?) {
            (UnaryOp::Neg, ConstantValue::Int(v)) => {
                Some(ConstantValue::Int(IntValue::new(-v.get(), promote(v.ty()))))
            }
            (UnaryOp::Neg, ConstantValue::Float(f)) => {
                Some(ConstantValue::Float(FloatValue::new(-f.get(), f.kind())))
            }
            (UnaryOp::BitNot, ConstantValue::Int(v)) => {
                Some(ConstantValue::Int(IntValue::new(!v.get(), promote(v.ty()))))
            }
            (UnaryOp::LogicalNot, ConstantValue::Int(v)) => Some(ConstantValue::Int(
                IntValue::new(i128::from(!v.is_truthy()), IntType::BOOL),
            )),
            (UnaryOp::LogicalNot, ConstantValue::Float(f)) => Some(ConstantValue::Int(
                IntValue::new(i128::from(f.get() == 0.0), IntType::BOOL),
            )),
            _ => None,
        }
    }

    fn fold_var(&self, id: DeclId) -> Option<ConstantValue<'ast>> {
        let Decl::Var(var) = self.unit.get(id)? else {
            return None;
        };
        if !var.is_constant() {
            return None;
        }
        let value = self.evaluate(var.init?)?;
        match var.ty {
            Type::Int(int) => to_int(self.load(value)?, int),
            Type::Float(kind) => to_float(self.load(value)?, kind),
            Type::ConstantArray { element, len } => {
                let array = match value {
                    ConstantValue::Array(array) => array,
                    ConstantValue::LValue(LValueBase::Expr(Expr::StringLiteral(lit))) => {
                        let ty = element.as_int().unwrap_or(IntType::CHAR);
                        let chars = lit
                            .bytes
                            .iter()
                            .chain(std::iter::once(&0))
                            .map(|&b| ConstantValue::Int(IntValue::new(i128::from(b), ty)))
                            .collect();
                        ArrayValue::new(chars, None)
                    }
                    // A reference bound to another array.
                    ConstantValue::LValue(LValueBase::Decl(other)) if other != id => {
                        match self.evaluate_decl(other)? {
                            ConstantValue::Array(array) => array,
                            _ => return None,
                        }
                    }
                    _ => return None,
                };
                Some(ConstantValue::Array(array.fit(len, ConstantValue::zero_of(*element))))
            }
            Type::Void | Type::Pointer(_) | Type::Record(_) => Some(value),
        }
    }
}

impl<'u, 'ast> ConstantFolder<'ast> for TreeFolder<'u, 'ast> {
    fn evaluate(&self, expr: &'ast Expr<'ast>) -> Option<ConstantValue<'ast>> {
        self.guarded(|| self.fold(expr))
    }

    fn evaluate_decl(&self, decl: DeclId) -> Option<ConstantValue<'ast>> {
        self.guarded(|| self.fold_var(decl))
    }
}

fn to_int<'ast>(value: ConstantValue<'ast>, ty: IntType) -> Option<ConstantValue<'ast>> {
    match value {
        ConstantValue::Int(v) => Some(ConstantValue::Int(v.cast(ty))),
        ConstantValue::Float(f) if f.get().is_finite() => Some(ConstantValue::Int(IntValue::new(
            f.get().trunc() as i128,
            ty,
        ))),
        _ => None,
    }
}

fn to_float<'ast>(value: ConstantValue<'ast>, kind: FloatKind) -> Option<ConstantValue<'ast>> {
    match value {
        ConstantValue::Int(v) => Some(ConstantValue::Float(FloatValue::new(v.get() as f64, kind))),
        ConstantValue::Float(f) => Some(ConstantValue::Float(FloatValue::new(f.get(), kind))),
        _ => None,
    }
}

/// Integer promotion: anything narrower than `int` computes as `int`.
fn promote(ty: IntType) -> IntType {
    if ty.bits < IntType::INT.bits {
        IntType::INT
    } else {
        ty
    }
}

/// The type both operands of an arithmetic operator are converted to.
fn common_type(left: IntType, right: IntType) -> IntType {
    let left = promote(left);
    let right = promote(right);
    match left.bits.cmp(&right.bits) {
        std::cmp::Ordering::Greater => left,
        std::cmp::Ordering::Less => right,
        std::cmp::Ordering::Equal => IntType::new(left.bits, left.signed && right.signed),
    }
}

fn fold_int_binary(op: BinaryOp, left: IntValue, right: IntValue) -> Option<IntValue> {
    let ty = common_type(left.ty(), right.ty());
    let l = left.cast(ty).get();
    let r = right.cast(ty).get();
    let value = match op {
        BinaryOp::Add => l.checked_add(r)?,
        BinaryOp::Sub => l.checked_sub(r)?,
        BinaryOp::Mul => l.checked_mul(r)?,
        BinaryOp::Div => l.checked_div(r)?,
        BinaryOp::Rem => l.checked_rem(r)?,
        BinaryOp::BitAnd => l & r,
        BinaryOp::BitOr => l | r,
        BinaryOp::BitXor => l ^ r,
        BinaryOp::Shl => return fold_shift(left, right, |v, n| v << n),
        BinaryOp::Shr => return fold_shift(left, right, |v, n| v >> n),
    };
    Some(IntValue::new(value, ty))
}

/// Shifts take the promoted type of the left operand; out-of-range amounts
/// do not fold.
fn fold_shift(
    left: IntValue,
    right: IntValue,
    apply: fn(i128, u32) -> i128,
) -> Option<IntValue> {
    let ty = promote(left.ty());
    let amount = u32::try_from(right.get())
        .ok()
        .filter(|&n| n < u32::from(ty.bits))?;
    Some(IntValue::new(apply(left.cast(ty).get(), amount), ty))
}

/// Rank of an operand in mixed arithmetic: integers 0, `float` 1,
/// `double` 2. `None` for operands that are not numbers.
fn float_kind(value: &ConstantValue<'_>) -> Option<u8> {
    match value {
        ConstantValue::Int(_) => Some(0),
        ConstantValue::Float(f) => Some(match f.kind() {
            FloatKind::Float => 1,
            FloatKind::Double => 2,
        }),
        _ => None,
    }
}

fn kind_from_rank(rank: u8) -> FloatKind {
    if rank >= 2 {
        FloatKind::Double
    } else {
        FloatKind::Float
    }
}

fn as_f64(value: &ConstantValue<'_>) -> Option<f64> {
    match value {
        ConstantValue::Int(v) => Some(v.get() as f64),
        ConstantValue::Float(f) => Some(f.get()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use static_write_ast::{UnitBuilder, VarFlags};

    fn int_of(value: Option<ConstantValue<'_>>) -> Option<i128> {
        value.and_then(|v| v.as_int()).map(|v| v.get())
    }

    #[test]
    fn literals_fold_to_scalars() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let int = b.int(42);
        let ch = b.char_lit('A');
        let yes = b.boolean(true);
        let float = b.float(1.5, FloatKind::Double);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        assert_eq!(int_of(folder.evaluate(int)), Some(42));
        assert_eq!(int_of(folder.evaluate(ch)), Some(65));
        assert_eq!(int_of(folder.evaluate(yes)), Some(1));
        assert_eq!(
            folder.evaluate(float),
            Some(ConstantValue::Float(FloatValue::new(1.5, FloatKind::Double)))
        );
    }

    #[test]
    fn string_literal_folds_to_itself() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let s = b.string("hi");
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        match folder.evaluate(s) {
            Some(ConstantValue::LValue(LValueBase::Expr(e))) => assert!(std::ptr::eq(e, s)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn constant_variable_is_loaded_through_cast() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let seven = b.int(7);
        let n = b.constexpr_var("n", Type::Int(IntType::UCHAR), seven);
        let reference = b.decl_ref(n);
        let loaded = b.load(n);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        assert_eq!(
            folder.evaluate(reference),
            Some(ConstantValue::LValue(LValueBase::Decl(n)))
        );
        let value = folder.evaluate(loaded).unwrap().as_int().unwrap();
        assert_eq!(value.get(), 7);
        assert_eq!(value.ty(), IntType::UCHAR);
    }

    #[test]
    fn runtime_variable_does_not_fold() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let one = b.int(1);
        let x = b.var("x", Type::Int(IntType::INT), Some(one), VarFlags::empty());
        let reference = b.load(x);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        assert_eq!(folder.evaluate(reference), None);
        assert_eq!(folder.evaluate_decl(x), None);
    }

    #[test]
    fn array_declaration_fills_unwritten_tail() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let ty = b.array_of(Type::Int(IntType::CHAR), 4);
        let one = b.int(1);
        let two = b.int(2);
        let init = b.init_list_typed(&[one, two], ty);
        let padded = b.constexpr_var("padded", ty, init);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        let value = folder.evaluate_decl(padded).unwrap();
        let array = value.as_array().unwrap();
        let bytes: Vec<_> = (0..4)
            .map(|i| array.element(i).and_then(ConstantValue::as_int).map(|v| v.get()))
            .collect();
        assert_eq!(bytes, vec![Some(1), Some(2), Some(0), Some(0)]);
    }

    #[test]
    fn char_array_from_string_includes_terminator() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let ty = b.array_of(Type::Int(IntType::CHAR), 3);
        let s = b.string("ab");
        let text = b.constexpr_var("text", ty, s);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        let value = folder.evaluate_decl(text).unwrap();
        let array = value.as_array().unwrap();
        let chars: Vec<_> = array
            .elements()
            .iter()
            .filter_map(|v| v.as_int())
            .map(|v| v.get())
            .collect();
        assert_eq!(chars, vec![97, 98, 0]);
    }

    #[test]
    fn constexpr_call_folds_return_value() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let answer = b.function("answer", Type::Int(IntType::INT), FunctionFlags::CONSTEXPR);
        let runtime = b.function("runtime", Type::Int(IntType::INT), FunctionFlags::empty());
        let forty = b.int(40);
        let two = b.int(2);
        let sum = b.binary(forty, BinaryOp::Add, two);
        let ret = b.return_stmt(Some(sum));
        b.set_body(answer, &[ret]);
        b.set_body(runtime, &[ret]);
        let good = b.call(answer, &[]);
        let bad = b.call(runtime, &[]);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        assert_eq!(int_of(folder.evaluate(good)), Some(42));
        assert_eq!(folder.evaluate(bad), None);
    }

    #[test]
    fn storage_accessor_folds_to_object() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let class = b.record("array");
        let data = b.function_in(
            Some(class),
            "data",
            Type::Void,
            FunctionFlags::CONSTEXPR | FunctionFlags::METHOD | FunctionFlags::STORAGE_ACCESSOR,
        );
        let one = b.int(1);
        let init = b.init_list(&[one]);
        let object = b.constexpr_var("bytes", Type::Record(class), init);
        let receiver = b.decl_ref(object);
        let call = b.member_call(receiver, data, &[]);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        assert_eq!(
            folder.evaluate(call),
            Some(ConstantValue::LValue(LValueBase::Decl(object)))
        );
    }

    #[test]
    fn integer_arithmetic_follows_host_rules() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let big = b.int_typed(200, IntType::UCHAR);
        let also_big = b.int_typed(100, IntType::UCHAR);
        let sum = b.binary(big, BinaryOp::Add, also_big);
        let one = b.int(1);
        let zero = b.int(0);
        let div = b.binary(one, BinaryOp::Div, zero);
        let thirty_two = b.int(32);
        let shl = b.binary(one, BinaryOp::Shl, thirty_two);
        let minus_one = b.int_typed(-1, IntType::INT);
        let unsigned = b.int_typed(1, IntType::UINT);
        let mixed = b.binary(minus_one, BinaryOp::Add, unsigned);
        let neg = b.unary(UnaryOp::Neg, one);
        let not = b.unary(UnaryOp::LogicalNot, zero);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        // unsigned char operands promote to int, so no wrap at 256
        assert_eq!(int_of(folder.evaluate(sum)), Some(300));
        assert_eq!(folder.evaluate(div), None);
        assert_eq!(folder.evaluate(shl), None);
        assert_eq!(int_of(folder.evaluate(mixed)), Some(0));
        assert_eq!(int_of(folder.evaluate(neg)), Some(-1));
        assert_eq!(int_of(folder.evaluate(not)), Some(1));
    }

    #[test]
    fn shifts_take_the_left_operand_type() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let byte = b.int_typed(1, IntType::UCHAR);
        let eight = b.int_typed(8, IntType::LONG);
        let widened = b.binary(byte, BinaryOp::Shl, eight);
        let sixty_four = b.int(64);
        let one = b.int(1);
        let halved = b.binary(sixty_four, BinaryOp::Shr, one);
        let minus_one = b.int(-1);
        let negative = b.binary(sixty_four, BinaryOp::Shl, minus_one);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        match folder.evaluate(widened) {
            Some(ConstantValue::Int(v)) => {
                assert_eq!(v.get(), 256);
                assert_eq!(v.ty(), IntType::INT);
            }
            other => panic!("expected an int, got {other:?}"),
        }
        assert_eq!(int_of(folder.evaluate(halved)), Some(32));
        assert_eq!(folder.evaluate(negative), None);
    }

    #[test]
    fn mixed_arithmetic_uses_floating_point() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let half = b.float(0.5, FloatKind::Double);
        let two = b.int(2);
        let product = b.binary(half, BinaryOp::Mul, two);
        let unit = b.finish();
        let folder = TreeFolder::new(&unit, 16);

        assert_eq!(
            folder.evaluate(product),
            Some(ConstantValue::Float(FloatValue::new(1.0, FloatKind::Double)))
        );
    }

    #[test]
    fn folding_stops_at_depth_limit() {
        let arena = Bump::new();
        let mut b = UnitBuilder::new(&arena);
        let mut expr = b.int(1);
        for _ in 0..8 {
            expr = b.paren(expr);
        }
        let unit = b.finish();

        assert_eq!(int_of(TreeFolder::new(&unit, 16).evaluate(expr)), Some(1));
        assert_eq!(TreeFolder::new(&unit, 4).evaluate(expr), None);
    }
}
