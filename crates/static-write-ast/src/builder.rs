//! Construction of translation units.
//!
//! [`UnitBuilder`] is what a host integration lowers its own tree into, and
//! what tests use to describe small programs. Nodes are allocated in the
//! caller's arena; declarations go straight into the unit being built.
//!
//! Spans are assigned from a cursor: [`UnitBuilder::at`] moves it, and every
//! node created afterwards takes the next column on that line.
//!
//! ```
//! use bumpalo::Bump;
//! use static_write_ast::{FunctionFlags, Type, UnitBuilder};
//!
//! let arena = Bump::new();
//! let mut b = UnitBuilder::new(&arena);
//! let sink = b.function("static_write", Type::Void, FunctionFlags::CONSTEXPR);
//! let main = b.function("main", Type::Void, FunctionFlags::empty());
//! let fname = b.string("out.bin");
//! let data = b.string("hello");
//! let call = b.call(sink, &[fname, data]);
//! let body = [b.expr_stmt(call)];
//! b.set_body(main, &body);
//!
//! let unit = b.finish();
//! assert_eq!(unit.top_level().len(), 2);
//! ```

use bumpalo::Bump;
use static_write_core::Span;

use crate::decl::{
    Decl, DeclId, FunctionDecl, FunctionFlags, NamespaceDecl, RecordDecl, TranslationUnit, VarDecl,
    VarFlags,
};
use crate::expr::{
    BinaryExpr, BinaryOp, BoolLiteral, CallExpr, CastKind, CharacterLiteral, DeclRefExpr, Expr,
    FloatingLiteral, ImplicitCastExpr, InitListExpr, IntegerLiteral, MemberCallExpr, ParenExpr,
    StringLiteral, UnaryExpr, UnaryOp,
};
use crate::stmt::{ForStmt, IfStmt, ReturnStmt, Stmt};
use crate::types::{FloatKind, IntType, IntValue, TemplateArgument, Type};

/// Builds a [`TranslationUnit`] in an arena.
pub struct UnitBuilder<'ast> {
    arena: &'ast Bump,
    unit: TranslationUnit<'ast>,
    line: u32,
    col: u32,
}

impl<'ast> UnitBuilder<'ast> {
    /// Start an empty unit. The span cursor starts at `1:1`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            unit: TranslationUnit::new(),
            line: 1,
            col: 1,
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// The unit built so far.
    pub fn unit(&self) -> &TranslationUnit<'ast> {
        &self.unit
    }

    /// Move the span cursor.
    pub fn at(&mut self, line: u32, col: u32) -> &mut Self {
        self.line = line;
        self.col = col;
        self
    }

    /// Move the span cursor to the start of `line`.
    pub fn line(&mut self, line: u32) -> &mut Self {
        self.at(line, 1)
    }

    fn span(&mut self, len: u32) -> Span {
        let span = Span::new(self.line, self.col, len);
        self.col += len.max(1);
        span
    }

    fn alloc(&self, expr: Expr<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(expr)
    }

    fn copy_exprs(&self, exprs: &[&'ast Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_fill_iter(exprs.iter().map(|expr| **expr))
    }

    // === Types ===

    /// `element[len]`
    pub fn array_of(&self, element: Type<'ast>, len: u64) -> Type<'ast> {
        Type::ConstantArray {
            element: self.arena.alloc(element),
            len,
        }
    }

    /// `pointee*`
    pub fn pointer_to(&self, pointee: Type<'ast>) -> Type<'ast> {
        Type::Pointer(self.arena.alloc(pointee))
    }

    /// Copy template arguments into the arena.
    pub fn template_args(&self, args: &[TemplateArgument<'ast>]) -> &'ast [TemplateArgument<'ast>] {
        self.arena.alloc_slice_copy(args)
    }

    // === Expressions ===

    /// A narrow string literal.
    pub fn string(&mut self, text: &str) -> &'ast Expr<'ast> {
        self.string_bytes(text.as_bytes())
    }

    /// A string literal with arbitrary encoded contents.
    pub fn string_bytes(&mut self, bytes: &[u8]) -> &'ast Expr<'ast> {
        let span = self.span(bytes.len() as u32 + 2);
        let bytes = self.arena.alloc_slice_copy(bytes);
        self.alloc(Expr::StringLiteral(StringLiteral { bytes, span }))
    }

    /// An `int` literal.
    pub fn int(&mut self, value: i128) -> &'ast Expr<'ast> {
        self.int_typed(value, IntType::INT)
    }

    /// An integer literal of the given type.
    pub fn int_typed(&mut self, value: i128, ty: IntType) -> &'ast Expr<'ast> {
        let span = self.span(1);
        self.alloc(Expr::IntegerLiteral(IntegerLiteral {
            value: IntValue::new(value, ty),
            span,
        }))
    }

    /// A `char` literal.
    pub fn char_lit(&mut self, c: char) -> &'ast Expr<'ast> {
        let span = self.span(3);
        self.alloc(Expr::CharacterLiteral(CharacterLiteral {
            value: c as u32,
            ty: IntType::CHAR,
            span,
        }))
    }

    pub fn float(&mut self, value: f64, kind: FloatKind) -> &'ast Expr<'ast> {
        let span = self.span(1);
        self.alloc(Expr::FloatingLiteral(FloatingLiteral { value, kind, span }))
    }

    pub fn boolean(&mut self, value: bool) -> &'ast Expr<'ast> {
        let span = self.span(if value { 4 } else { 5 });
        self.alloc(Expr::BoolLiteral(BoolLiteral { value, span }))
    }

    /// A brace list whose type is left to the context.
    pub fn init_list(&mut self, elements: &[&'ast Expr<'ast>]) -> &'ast Expr<'ast> {
        self.make_init_list(elements, None)
    }

    /// A brace list initializing a value of type `ty`.
    pub fn init_list_typed(
        &mut self,
        elements: &[&'ast Expr<'ast>],
        ty: Type<'ast>,
    ) -> &'ast Expr<'ast> {
        self.make_init_list(elements, Some(ty))
    }

    fn make_init_list(
        &mut self,
        elements: &[&'ast Expr<'ast>],
        ty: Option<Type<'ast>>,
    ) -> &'ast Expr<'ast> {
        let span = self.span(2);
        let elements = self.copy_exprs(elements);
        self.alloc(Expr::InitList(InitListExpr { elements, ty, span }))
    }

    /// A plain reference to a declaration.
    pub fn decl_ref(&mut self, decl: DeclId) -> &'ast Expr<'ast> {
        let span = self.span(self.unit.get(decl).map_or(1, |d| d.name().len() as u32));
        self.alloc(Expr::DeclRef(DeclRefExpr { decl, span }))
    }

    pub fn implicit_cast(
        &mut self,
        kind: CastKind,
        ty: Type<'ast>,
        expr: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = expr.span();
        self.alloc(Expr::ImplicitCast(self.arena.alloc(ImplicitCastExpr {
            kind,
            ty,
            expr,
            span,
        })))
    }

    /// A reference to an array variable as it appears in argument position:
    /// decayed to a pointer to its first element.
    pub fn decayed_ref(&mut self, decl: DeclId) -> &'ast Expr<'ast> {
        let element = match self.unit.get(decl) {
            Some(Decl::Var(var)) => var.ty.array_element().copied().unwrap_or(Type::Void),
            _ => Type::Void,
        };
        let ty = self.pointer_to(element);
        let reference = self.decl_ref(decl);
        self.implicit_cast(CastKind::ArrayToPointerDecay, ty, reference)
    }

    /// A reference to a scalar variable loaded as a value.
    pub fn load(&mut self, decl: DeclId) -> &'ast Expr<'ast> {
        let ty = match self.unit.get(decl) {
            Some(Decl::Var(var)) => var.ty,
            _ => Type::Void,
        };
        let reference = self.decl_ref(decl);
        self.implicit_cast(CastKind::LValueToRValue, ty, reference)
    }

    pub fn paren(&mut self, expr: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span(expr.span().len + 2);
        self.alloc(Expr::Paren(self.arena.alloc(ParenExpr { expr, span })))
    }

    /// A direct call to `function`.
    pub fn call(&mut self, function: DeclId, args: &[&'ast Expr<'ast>]) -> &'ast Expr<'ast> {
        let callee = self.decl_ref(function);
        let callee_ty = self.pointer_to(Type::Void);
        let callee = self.implicit_cast(CastKind::FunctionToPointerDecay, callee_ty, callee);
        let args = self.copy_exprs(args);
        self.alloc(Expr::Call(self.arena.alloc(CallExpr {
            callee,
            args,
            span: callee.span(),
        })))
    }

    /// `object.method(args)`
    pub fn member_call(
        &mut self,
        object: &'ast Expr<'ast>,
        method: DeclId,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Expr<'ast> {
        let span = self.span(1);
        let args = self.copy_exprs(args);
        self.alloc(Expr::MemberCall(self.arena.alloc(MemberCallExpr {
            object,
            method,
            args,
            span,
        })))
    }

    pub fn binary(
        &mut self,
        left: &'ast Expr<'ast>,
        op: BinaryOp,
        right: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = self.span(1);
        self.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
            left,
            op,
            right,
            span,
        })))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span(1);
        self.alloc(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span })))
    }

    // === Declarations ===

    /// A variable at translation-unit scope.
    pub fn var(
        &mut self,
        name: &str,
        ty: Type<'ast>,
        init: Option<&'ast Expr<'ast>>,
        flags: VarFlags,
    ) -> DeclId {
        self.var_in(None, name, ty, init, flags)
    }

    /// A variable in the given context. A function parent makes it a local.
    pub fn var_in(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        ty: Type<'ast>,
        init: Option<&'ast Expr<'ast>>,
        flags: VarFlags,
    ) -> DeclId {
        let span = self.span(name.len() as u32);
        let name = self.arena.alloc_str(name);
        self.unit.add(Decl::Var(VarDecl {
            name,
            ty,
            init,
            flags,
            parent,
            span,
        }))
    }

    /// `constexpr ty name = init;` at translation-unit scope.
    pub fn constexpr_var(&mut self, name: &str, ty: Type<'ast>, init: &'ast Expr<'ast>) -> DeclId {
        self.var(name, ty, Some(init), VarFlags::CONSTEXPR)
    }

    /// `static const ty name = init;` inside `record`.
    pub fn static_member(
        &mut self,
        record: DeclId,
        name: &str,
        ty: Type<'ast>,
        init: Option<&'ast Expr<'ast>>,
    ) -> DeclId {
        self.var_in(
            Some(record),
            name,
            ty,
            init,
            VarFlags::STATIC_MEMBER | VarFlags::CONST,
        )
    }

    /// Attach an initializer to a variable declared without one.
    pub fn set_init(&mut self, var: DeclId, init: &'ast Expr<'ast>) -> bool {
        self.unit.set_init(var, init)
    }

    /// A function at translation-unit scope, without a body yet.
    pub fn function(
        &mut self,
        name: &str,
        return_type: Type<'ast>,
        flags: FunctionFlags,
    ) -> DeclId {
        self.function_in(None, name, return_type, flags)
    }

    pub fn function_in(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        return_type: Type<'ast>,
        flags: FunctionFlags,
    ) -> DeclId {
        let span = self.span(name.len() as u32);
        let name = self.arena.alloc_str(name);
        self.unit.add(Decl::Function(FunctionDecl {
            name,
            return_type,
            flags,
            body: &[],
            parent,
            span,
        }))
    }

    /// Give `function` a body. Returns `false` if it is not a function.
    pub fn set_body(&mut self, function: DeclId, body: &[Stmt<'ast>]) -> bool {
        let body = self.arena.alloc_slice_copy(body);
        self.unit.set_body(function, body)
    }

    /// A plain class at translation-unit scope.
    pub fn record(&mut self, name: &str) -> DeclId {
        self.record_in(None, name, None)
    }

    /// A class-template specialization at translation-unit scope.
    pub fn specialization(&mut self, name: &str, args: &[TemplateArgument<'ast>]) -> DeclId {
        let args = self.template_args(args);
        self.record_in(None, name, Some(args))
    }

    pub fn record_in(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        template_args: Option<&'ast [TemplateArgument<'ast>]>,
    ) -> DeclId {
        let span = self.span(name.len() as u32);
        let name = self.arena.alloc_str(name);
        self.unit.add(Decl::Record(RecordDecl {
            name,
            template_args,
            members: Vec::new(),
            parent,
            span,
        }))
    }

    pub fn namespace(&mut self, name: &str) -> DeclId {
        self.namespace_in(None, name)
    }

    pub fn namespace_in(&mut self, parent: Option<DeclId>, name: &str) -> DeclId {
        let span = self.span(name.len() as u32);
        let name = self.arena.alloc_str(name);
        self.unit.add(Decl::Namespace(NamespaceDecl {
            name,
            decls: Vec::new(),
            parent,
            span,
        }))
    }

    // === Statements ===

    pub fn expr_stmt(&self, expr: &'ast Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(expr)
    }

    pub fn decl_stmt(&self, decl: DeclId) -> Stmt<'ast> {
        Stmt::Decl(decl)
    }

    pub fn return_stmt(&mut self, value: Option<&'ast Expr<'ast>>) -> Stmt<'ast> {
        let span = self.span(6);
        Stmt::Return(ReturnStmt { value, span })
    }

    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(self.arena.alloc_slice_copy(stmts))
    }

    pub fn if_stmt(
        &self,
        condition: &'ast Expr<'ast>,
        then_branch: Stmt<'ast>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_branch,
            else_branch,
        }))
    }

    pub fn for_stmt(
        &self,
        init: Option<Stmt<'ast>>,
        condition: Option<&'ast Expr<'ast>>,
        step: Option<&'ast Expr<'ast>>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            step,
            body,
        }))
    }

    /// Finish building and hand over the unit.
    pub fn finish(self) -> TranslationUnit<'ast> {
        self.unit
    }
}
