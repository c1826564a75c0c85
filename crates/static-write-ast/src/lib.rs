//! Syntax tree model of the host program.
//!
//! Expressions and statements are allocated in a `bumpalo` arena and borrow
//! from it for `'ast`; declarations live in a [`TranslationUnit`] and are
//! addressed by [`DeclId`].
//!
//! - [`expr`]: expression nodes
//! - [`decl`]: declarations and the translation unit
//! - [`stmt`]: function body statements
//! - [`types`]: types, integer values, template arguments
//! - [`visitor`]: traversal
//! - [`builder`]: construction

pub mod builder;
pub mod decl;
pub mod expr;
pub mod stmt;
pub mod types;
pub mod visitor;

pub use builder::UnitBuilder;
pub use decl::{
    Ancestors, Decl, DeclId, FunctionDecl, FunctionFlags, NamespaceDecl, RecordDecl,
    TranslationUnit, VarDecl, VarFlags,
};
pub use expr::{
    BinaryExpr, BinaryOp, BoolLiteral, CallExpr, CastKind, CharacterLiteral, DeclRefExpr, Expr,
    FloatingLiteral, ImplicitCastExpr, InitListExpr, IntegerLiteral, MemberCallExpr, ParenExpr,
    StringLiteral, UnaryExpr, UnaryOp,
};
pub use stmt::{ForStmt, IfStmt, ReturnStmt, Stmt};
pub use types::{FloatKind, IntType, IntValue, TemplateArgument, Type};
pub use visitor::{
    Visitor, walk_call_expr, walk_decl, walk_expr, walk_for_stmt, walk_function_decl,
    walk_if_stmt, walk_init_list_expr, walk_member_call_expr, walk_namespace_decl,
    walk_record_decl, walk_stmt, walk_unit, walk_var_decl,
};
