//! Expression nodes of the host program.
//!
//! These mirror the shapes a C++ front end hands to a semantic-analysis
//! hook: literals, brace-initializer lists, references to declarations,
//! implicit conversions, calls, and the small amount of arithmetic that
//! constant folding needs. Node classes are named after the host compiler's
//! own class names so diagnostics read the way users expect.

use static_write_core::Span;

use crate::decl::DeclId;
use crate::types::{FloatKind, IntType, IntValue, Type};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// String literal
    StringLiteral(StringLiteral<'ast>),
    /// Integer literal
    IntegerLiteral(IntegerLiteral),
    /// Character literal
    CharacterLiteral(CharacterLiteral),
    /// Floating-point literal
    FloatingLiteral(FloatingLiteral),
    /// `true` / `false`
    BoolLiteral(BoolLiteral),
    /// Brace-initializer list
    InitList(InitListExpr<'ast>),
    /// Reference to a declaration by name
    DeclRef(DeclRefExpr),
    /// Conversion inserted by the host compiler
    ImplicitCast(&'ast ImplicitCastExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Method call on an object
    MemberCall(&'ast MemberCallExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::StringLiteral(e) => e.span,
            Self::IntegerLiteral(e) => e.span,
            Self::CharacterLiteral(e) => e.span,
            Self::FloatingLiteral(e) => e.span,
            Self::BoolLiteral(e) => e.span,
            Self::InitList(e) => e.span,
            Self::DeclRef(e) => e.span,
            Self::ImplicitCast(e) => e.span,
            Self::Paren(e) => e.span,
            Self::Call(e) => e.span,
            Self::MemberCall(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
        }
    }

    /// The host compiler's class name for this node, used in diagnostics.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::StringLiteral(_) => "StringLiteral",
            Self::IntegerLiteral(_) => "IntegerLiteral",
            Self::CharacterLiteral(_) => "CharacterLiteral",
            Self::FloatingLiteral(_) => "FloatingLiteral",
            Self::BoolLiteral(_) => "CXXBoolLiteralExpr",
            Self::InitList(_) => "InitListExpr",
            Self::DeclRef(_) => "DeclRefExpr",
            Self::ImplicitCast(_) => "ImplicitCastExpr",
            Self::Paren(_) => "ParenExpr",
            Self::Call(_) => "CallExpr",
            Self::MemberCall(_) => "CXXMemberCallExpr",
            Self::Binary(_) => "BinaryOperator",
            Self::Unary(_) => "UnaryOperator",
        }
    }

    /// Strip parentheses and implicit conversions.
    ///
    /// Neither changes which constant an expression denotes, only how the
    /// host compiler types it.
    pub fn ignore_wrappers(&self) -> &Expr<'ast> {
        let mut expr = self;
        loop {
            expr = match expr {
                Expr::Paren(paren) => paren.expr,
                Expr::ImplicitCast(cast) => cast.expr,
                _ => return expr,
            };
        }
    }
}

/// A string literal. `bytes` holds the encoded contents exactly as written,
/// without the terminator the host program stores after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringLiteral<'ast> {
    /// Encoded contents
    pub bytes: &'ast [u8],
    /// Source location
    pub span: Span,
}

/// An integer literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerLiteral {
    /// The value, typed
    pub value: IntValue,
    /// Source location
    pub span: Span,
}

/// A character literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterLiteral {
    /// Code point (or code unit for narrow literals)
    pub value: u32,
    /// The literal's type (`char`, `char16_t`, ...)
    pub ty: IntType,
    /// Source location
    pub span: Span,
}

/// A floating-point literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingLiteral {
    /// The value
    pub value: f64,
    /// `float` or `double`
    pub kind: FloatKind,
    /// Source location
    pub span: Span,
}

/// A boolean literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoolLiteral {
    /// The value
    pub value: bool,
    /// Source location
    pub span: Span,
}

/// A brace-initializer list: `{1, 2, {3, 4}}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitListExpr<'ast> {
    /// Elements in source order
    pub elements: &'ast [Expr<'ast>],
    /// The type being initialized, when the host compiler knows it
    pub ty: Option<Type<'ast>>,
    /// Source location
    pub span: Span,
}

/// A reference to a named declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclRefExpr {
    /// The referenced declaration
    pub decl: DeclId,
    /// Source location
    pub span: Span,
}

/// The conversions a host compiler inserts implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// Load of a value from an lvalue
    LValueToRValue,
    /// Array decays to a pointer to its first element
    ArrayToPointerDecay,
    /// Function designator decays to a function pointer
    FunctionToPointerDecay,
    /// Integer to integer of another width or signedness
    IntegralCast,
    /// Integer to floating point
    IntegralToFloating,
    /// Floating point to integer
    FloatingToIntegral,
    /// Floating point to floating point of another width
    FloatingCast,
    /// Qualification change only
    NoOp,
}

/// An implicit conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImplicitCastExpr<'ast> {
    /// Conversion kind
    pub kind: CastKind,
    /// Converted-to type
    pub ty: Type<'ast>,
    /// Operand
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    /// Inner expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// The function being called
    pub callee: &'ast Expr<'ast>,
    /// Arguments
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> CallExpr<'ast> {
    /// The called declaration, when the callee names it directly.
    pub fn direct_callee(&self) -> Option<DeclId> {
        match self.callee.ignore_wrappers() {
            Expr::DeclRef(decl_ref) => Some(decl_ref.decl),
            _ => None,
        }
    }
}

/// A method call: `object.method(args)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberCallExpr<'ast> {
    /// The object the method is called on
    pub object: &'ast Expr<'ast>,
    /// The method declaration
    pub method: DeclId,
    /// Arguments
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// Binary operators the constant folder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `~x`
    BitNot,
    /// `!x`
    LogicalNot,
    /// `&x`
    AddrOf,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}
