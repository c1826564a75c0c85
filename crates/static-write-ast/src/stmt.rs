//! Statement nodes of function bodies.

use static_write_core::Span;

use crate::decl::DeclId;
use crate::expr::Expr;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement: `f(x);`
    Expr(&'ast Expr<'ast>),
    /// Local declaration: `constexpr char buf[] = {...};`
    Decl(DeclId),
    /// `return value;`
    Return(ReturnStmt<'ast>),
    /// `{ ... }`
    Block(&'ast [Stmt<'ast>]),
    /// `if (cond) then else otherwise`
    If(&'ast IfStmt<'ast>),
    /// `for (init; cond; step) body`
    For(&'ast ForStmt<'ast>),
}

/// A return statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Returned value
    pub value: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Then branch
    pub then_branch: Stmt<'ast>,
    /// Else branch
    pub else_branch: Option<Stmt<'ast>>,
}

/// A for loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Init statement
    pub init: Option<Stmt<'ast>>,
    /// Loop condition
    pub condition: Option<&'ast Expr<'ast>>,
    /// Step expression
    pub step: Option<&'ast Expr<'ast>>,
    /// Loop body
    pub body: Stmt<'ast>,
}
