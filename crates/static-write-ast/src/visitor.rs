//! Visitor pattern for traversing a translation unit.
//!
//! Every `visit_*` method has a default implementation that calls the
//! matching `walk_*` function, which in turn visits the node's children.
//! Override only the methods you care about and call the `walk_*` function
//! from your override to keep descending.
//!
//! Declarations are visited in source order: the unit's top-level
//! declarations, namespace contents, record members, variable initializers
//! and function bodies. Locals declared inside a function body are reached
//! through their declaration statement.
//!
//! # Example
//!
//! ```
//! use static_write_ast::{CallExpr, TranslationUnit, Visitor, walk_call_expr};
//!
//! struct CallCounter {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for CallCounter {
//!     fn visit_call_expr(&mut self, unit: &TranslationUnit<'ast>, call: &'ast CallExpr<'ast>) {
//!         self.count += 1;
//!         walk_call_expr(self, unit, call);
//!     }
//! }
//!
//! let unit = TranslationUnit::new();
//! let mut counter = CallCounter { count: 0 };
//! counter.visit_unit(&unit);
//! assert_eq!(counter.count, 0);
//! ```

use crate::decl::{Decl, DeclId, FunctionDecl, NamespaceDecl, RecordDecl, TranslationUnit, VarDecl};
use crate::expr::{CallExpr, Expr, InitListExpr, MemberCallExpr};
use crate::stmt::{ForStmt, IfStmt, Stmt};

/// Visitor over declarations, statements and expressions.
pub trait Visitor<'ast>: Sized {
    /// Visit every top-level declaration of the unit.
    fn visit_unit(&mut self, unit: &TranslationUnit<'ast>) {
        walk_unit(self, unit);
    }

    // === Declarations ===

    /// Visit a declaration.
    fn visit_decl(&mut self, unit: &TranslationUnit<'ast>, id: DeclId) {
        walk_decl(self, unit, id);
    }

    /// Visit a variable declaration.
    fn visit_var_decl(&mut self, unit: &TranslationUnit<'ast>, _id: DeclId, var: &VarDecl<'ast>) {
        walk_var_decl(self, unit, var);
    }

    /// Visit a function declaration.
    fn visit_function_decl(
        &mut self,
        unit: &TranslationUnit<'ast>,
        _id: DeclId,
        func: &FunctionDecl<'ast>,
    ) {
        walk_function_decl(self, unit, func);
    }

    /// Visit a class, struct or specialization.
    fn visit_record_decl(
        &mut self,
        unit: &TranslationUnit<'ast>,
        _id: DeclId,
        record: &RecordDecl<'ast>,
    ) {
        walk_record_decl(self, unit, record);
    }

    /// Visit a namespace.
    fn visit_namespace_decl(
        &mut self,
        unit: &TranslationUnit<'ast>,
        _id: DeclId,
        namespace: &NamespaceDecl<'ast>,
    ) {
        walk_namespace_decl(self, unit, namespace);
    }

    // === Statements ===

    /// Visit a statement.
    fn visit_stmt(&mut self, unit: &TranslationUnit<'ast>, stmt: &Stmt<'ast>) {
        walk_stmt(self, unit, stmt);
    }

    /// Visit an if statement.
    fn visit_if_stmt(&mut self, unit: &TranslationUnit<'ast>, stmt: &'ast IfStmt<'ast>) {
        walk_if_stmt(self, unit, stmt);
    }

    /// Visit a for statement.
    fn visit_for_stmt(&mut self, unit: &TranslationUnit<'ast>, stmt: &'ast ForStmt<'ast>) {
        walk_for_stmt(self, unit, stmt);
    }

    // === Expressions ===

    /// Visit an expression.
    fn visit_expr(&mut self, unit: &TranslationUnit<'ast>, expr: &Expr<'ast>) {
        walk_expr(self, unit, expr);
    }

    /// Visit a call expression.
    fn visit_call_expr(&mut self, unit: &TranslationUnit<'ast>, call: &'ast CallExpr<'ast>) {
        walk_call_expr(self, unit, call);
    }

    /// Visit a method call expression.
    fn visit_member_call_expr(
        &mut self,
        unit: &TranslationUnit<'ast>,
        call: &'ast MemberCallExpr<'ast>,
    ) {
        walk_member_call_expr(self, unit, call);
    }

    /// Visit an initializer list expression.
    fn visit_init_list_expr(&mut self, unit: &TranslationUnit<'ast>, list: &InitListExpr<'ast>) {
        walk_init_list_expr(self, unit, list);
    }
}

// === Walk Functions ===
// These provide default traversal logic for each node type.

/// Walk the unit's top-level declarations.
pub fn walk_unit<'ast, V: Visitor<'ast>>(visitor: &mut V, unit: &TranslationUnit<'ast>) {
    for &id in unit.top_level() {
        visitor.visit_decl(unit, id);
    }
}

/// Walk a declaration by dispatching on its kind.
pub fn walk_decl<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    id: DeclId,
) {
    let Some(decl) = unit.get(id) else {
        return;
    };
    match decl {
        Decl::Var(var) => visitor.visit_var_decl(unit, id, var),
        Decl::Function(func) => visitor.visit_function_decl(unit, id, func),
        Decl::Record(record) => visitor.visit_record_decl(unit, id, record),
        Decl::Namespace(namespace) => visitor.visit_namespace_decl(unit, id, namespace),
    }
}

/// Walk a variable's initializer.
pub fn walk_var_decl<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    var: &VarDecl<'ast>,
) {
    if let Some(init) = var.init {
        visitor.visit_expr(unit, init);
    }
}

/// Walk a function body.
pub fn walk_function_decl<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    func: &FunctionDecl<'ast>,
) {
    for stmt in func.body {
        visitor.visit_stmt(unit, stmt);
    }
}

/// Walk a record's members.
pub fn walk_record_decl<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    record: &RecordDecl<'ast>,
) {
    for &member in &record.members {
        visitor.visit_decl(unit, member);
    }
}

/// Walk a namespace's declarations.
pub fn walk_namespace_decl<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    namespace: &NamespaceDecl<'ast>,
) {
    for &decl in &namespace.decls {
        visitor.visit_decl(unit, decl);
    }
}

/// Walk a statement.
pub fn walk_stmt<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    stmt: &Stmt<'ast>,
) {
    match *stmt {
        Stmt::Expr(expr) => visitor.visit_expr(unit, expr),
        Stmt::Decl(id) => visitor.visit_decl(unit, id),
        Stmt::Return(ret) => {
            if let Some(value) = ret.value {
                visitor.visit_expr(unit, value);
            }
        }
        Stmt::Block(stmts) => {
            for stmt in stmts {
                visitor.visit_stmt(unit, stmt);
            }
        }
        Stmt::If(stmt) => visitor.visit_if_stmt(unit, stmt),
        Stmt::For(stmt) => visitor.visit_for_stmt(unit, stmt),
    }
}

/// Walk an if statement.
pub fn walk_if_stmt<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    stmt: &'ast IfStmt<'ast>,
) {
    visitor.visit_expr(unit, stmt.condition);
    visitor.visit_stmt(unit, &stmt.then_branch);
    if let Some(else_branch) = &stmt.else_branch {
        visitor.visit_stmt(unit, else_branch);
    }
}

/// Walk a for statement.
pub fn walk_for_stmt<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    stmt: &'ast ForStmt<'ast>,
) {
    if let Some(init) = &stmt.init {
        visitor.visit_stmt(unit, init);
    }
    if let Some(condition) = stmt.condition {
        visitor.visit_expr(unit, condition);
    }
    if let Some(step) = stmt.step {
        visitor.visit_expr(unit, step);
    }
    visitor.visit_stmt(unit, &stmt.body);
}

/// Walk an expression's children.
pub fn walk_expr<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    expr: &Expr<'ast>,
) {
    match *expr {
        Expr::StringLiteral(_)
        | Expr::IntegerLiteral(_)
        | Expr::CharacterLiteral(_)
        | Expr::FloatingLiteral(_)
        | Expr::BoolLiteral(_)
        | Expr::DeclRef(_) => {}
        Expr::InitList(ref list) => visitor.visit_init_list_expr(unit, list),
        Expr::ImplicitCast(cast) => visitor.visit_expr(unit, cast.expr),
        Expr::Paren(paren) => visitor.visit_expr(unit, paren.expr),
        Expr::Call(call) => visitor.visit_call_expr(unit, call),
        Expr::MemberCall(call) => visitor.visit_member_call_expr(unit, call),
        Expr::Binary(binary) => {
            visitor.visit_expr(unit, binary.left);
            visitor.visit_expr(unit, binary.right);
        }
        Expr::Unary(unary) => visitor.visit_expr(unit, unary.operand),
    }
}

/// Walk a call's callee and arguments.
pub fn walk_call_expr<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    call: &'ast CallExpr<'ast>,
) {
    visitor.visit_expr(unit, call.callee);
    for arg in call.args {
        visitor.visit_expr(unit, arg);
    }
}

/// Walk a method call's object and arguments.
pub fn walk_member_call_expr<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    call: &'ast MemberCallExpr<'ast>,
) {
    visitor.visit_expr(unit, call.object);
    for arg in call.args {
        visitor.visit_expr(unit, arg);
    }
}

/// Walk an initializer list's elements.
pub fn walk_init_list_expr<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    unit: &TranslationUnit<'ast>,
    list: &InitListExpr<'ast>,
) {
    for element in list.elements {
        visitor.visit_expr(unit, element);
    }
}
