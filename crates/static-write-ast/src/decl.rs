//! Declarations and the translation unit that owns them.
//!
//! Declarations are stored in a flat table inside [`TranslationUnit`] and
//! referred to by [`DeclId`]. Each declaration records the declaration
//! context it lives in, so lookups can walk outward from a static member to
//! the class-template specialization that encloses it.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use static_write_core::Span;

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::{TemplateArgument, Type};

/// Index of a declaration in its [`TranslationUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

bitflags! {
    /// Qualifiers and storage of a variable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VarFlags: u8 {
        /// Declared `const`.
        const CONST = 1 << 0;
        /// Declared `constexpr` (implies usable in constant expressions).
        const CONSTEXPR = 1 << 1;
        /// A `static` data member of a class.
        const STATIC_MEMBER = 1 << 2;
    }
}

bitflags! {
    /// Properties of a function that matter to constant folding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionFlags: u8 {
        /// Declared `constexpr`.
        const CONSTEXPR = 1 << 0;
        /// A non-static member function.
        const METHOD = 1 << 1;
        /// Returns a pointer to the object's own storage, like
        /// `std::array::data()`.
        const STORAGE_ACCESSOR = 1 << 2;
    }
}

/// A declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl<'ast> {
    /// Variable or static data member
    Var(VarDecl<'ast>),
    /// Function or method
    Function(FunctionDecl<'ast>),
    /// Class, struct or union, including template specializations
    Record(RecordDecl<'ast>),
    /// Namespace
    Namespace(NamespaceDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    /// The declared name.
    pub fn name(&self) -> &'ast str {
        match self {
            Decl::Var(d) => d.name,
            Decl::Function(d) => d.name,
            Decl::Record(d) => d.name,
            Decl::Namespace(d) => d.name,
        }
    }

    /// The enclosing declaration context, `None` at translation-unit scope.
    pub fn parent(&self) -> Option<DeclId> {
        match self {
            Decl::Var(d) => d.parent,
            Decl::Function(d) => d.parent,
            Decl::Record(d) => d.parent,
            Decl::Namespace(d) => d.parent,
        }
    }

    /// Get the span of this declaration.
    pub fn span(&self) -> Span {
        match self {
            Decl::Var(d) => d.span,
            Decl::Function(d) => d.span,
            Decl::Record(d) => d.span,
            Decl::Namespace(d) => d.span,
        }
    }

    /// Short description of the declaration kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Var(_) => "variable",
            Decl::Function(_) => "function",
            Decl::Record(r) if r.is_specialization() => "class template specialization",
            Decl::Record(_) => "class",
            Decl::Namespace(_) => "namespace",
        }
    }

    pub fn as_var(&self) -> Option<&VarDecl<'ast>> {
        match self {
            Decl::Var(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl<'ast>> {
        match self {
            Decl::Function(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordDecl<'ast>> {
        match self {
            Decl::Record(d) => Some(d),
            _ => None,
        }
    }
}

/// A variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    /// Variable name
    pub name: &'ast str,
    /// Declared type
    pub ty: Type<'ast>,
    /// Initializer, if any
    pub init: Option<&'ast Expr<'ast>>,
    /// Qualifiers and storage
    pub flags: VarFlags,
    /// Enclosing context
    pub parent: Option<DeclId>,
    /// Source location
    pub span: Span,
}

impl<'ast> VarDecl<'ast> {
    /// Whether the variable's value is fixed at compile time.
    pub fn is_constant(&self) -> bool {
        self.flags.intersects(VarFlags::CONST | VarFlags::CONSTEXPR)
    }

    /// Whether this is a static data member.
    pub fn is_static_member(&self) -> bool {
        self.flags.contains(VarFlags::STATIC_MEMBER)
    }
}

/// A function declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    /// Function name
    pub name: &'ast str,
    /// Return type
    pub return_type: Type<'ast>,
    /// Folding-relevant properties
    pub flags: FunctionFlags,
    /// Body statements (empty for declarations without a definition)
    pub body: &'ast [Stmt<'ast>],
    /// Enclosing context
    pub parent: Option<DeclId>,
    /// Source location
    pub span: Span,
}

impl<'ast> FunctionDecl<'ast> {
    pub fn is_constexpr(&self) -> bool {
        self.flags.contains(FunctionFlags::CONSTEXPR)
    }

    /// The expression of the first top-level `return` in the body.
    pub fn returned_expr(&self) -> Option<&'ast Expr<'ast>> {
        self.body.iter().find_map(|stmt| match stmt {
            Stmt::Return(ret) => ret.value,
            _ => None,
        })
    }
}

/// A class, struct or union.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl<'ast> {
    /// Class name
    pub name: &'ast str,
    /// Arguments, when this record is a class-template specialization
    pub template_args: Option<&'ast [TemplateArgument<'ast>]>,
    /// Members in declaration order
    pub members: Vec<DeclId>,
    /// Enclosing context
    pub parent: Option<DeclId>,
    /// Source location
    pub span: Span,
}

impl<'ast> RecordDecl<'ast> {
    /// Whether this record is a class-template specialization.
    pub fn is_specialization(&self) -> bool {
        self.template_args.is_some()
    }
}

/// A namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl<'ast> {
    /// Namespace name
    pub name: &'ast str,
    /// Declarations in order
    pub decls: Vec<DeclId>,
    /// Enclosing context
    pub parent: Option<DeclId>,
    /// Source location
    pub span: Span,
}

/// A translation unit: every declaration of one compilation.
#[derive(Debug, Default)]
pub struct TranslationUnit<'ast> {
    decls: Vec<Decl<'ast>>,
    top_level: Vec<DeclId>,
    names: FxHashMap<&'ast str, Vec<DeclId>>,
}

impl<'ast> TranslationUnit<'ast> {
    /// Create an empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration and link it into its parent context.
    ///
    /// Declarations whose parent is a function are locals: they are reached
    /// through the function body's declaration statements, not listed in a
    /// context.
    pub fn add(&mut self, decl: Decl<'ast>) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        let parent = decl.parent();
        self.names.entry(decl.name()).or_default().push(id);
        self.decls.push(decl);

        match parent.map(|p| &mut self.decls[p.0 as usize]) {
            None => self.top_level.push(id),
            Some(Decl::Record(record)) => record.members.push(id),
            Some(Decl::Namespace(namespace)) => namespace.decls.push(id),
            Some(Decl::Function(_) | Decl::Var(_)) => {}
        }
        id
    }

    /// Get a declaration by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this unit.
    pub fn decl(&self, id: DeclId) -> &Decl<'ast> {
        &self.decls[id.0 as usize]
    }

    /// Get a declaration by id, if it belongs to this unit.
    pub fn get(&self, id: DeclId) -> Option<&Decl<'ast>> {
        self.decls.get(id.0 as usize)
    }

    /// Replace a function's body.
    ///
    /// Returns `false` if `id` is not a function.
    pub fn set_body(&mut self, id: DeclId, body: &'ast [Stmt<'ast>]) -> bool {
        match self.decls.get_mut(id.0 as usize) {
            Some(Decl::Function(func)) => {
                func.body = body;
                true
            }
            _ => false,
        }
    }

    /// Attach an initializer to a variable declared earlier.
    ///
    /// Returns `false` if `id` is not a variable.
    pub fn set_init(&mut self, id: DeclId, init: &'ast Expr<'ast>) -> bool {
        match self.decls.get_mut(id.0 as usize) {
            Some(Decl::Var(var)) => {
                var.init = Some(init);
                true
            }
            _ => false,
        }
    }

    /// Top-level declarations in source order.
    pub fn top_level(&self) -> &[DeclId] {
        &self.top_level
    }

    /// All declarations with the given name, in declaration order.
    pub fn lookup(&self, name: &str) -> &[DeclId] {
        self.names.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// The enclosing contexts of `id`, innermost first.
    pub fn ancestors(&self, id: DeclId) -> Ancestors<'_, 'ast> {
        Ancestors {
            unit: self,
            next: self.get(id).and_then(Decl::parent),
        }
    }
}

/// Iterator over enclosing declaration contexts, see
/// [`TranslationUnit::ancestors`].
pub struct Ancestors<'u, 'ast> {
    unit: &'u TranslationUnit<'ast>,
    next: Option<DeclId>,
}

impl<'u, 'ast> Iterator for Ancestors<'u, 'ast> {
    type Item = (DeclId, &'u Decl<'ast>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let decl = self.unit.get(id)?;
        self.next = decl.parent();
        Some((id, decl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntType, IntValue};

    fn record(name: &'static str, parent: Option<DeclId>) -> Decl<'static> {
        Decl::Record(RecordDecl {
            name,
            template_args: None,
            members: Vec::new(),
            parent,
            span: Span::default(),
        })
    }

    fn var(name: &'static str, parent: Option<DeclId>, flags: VarFlags) -> Decl<'static> {
        Decl::Var(VarDecl {
            name,
            ty: Type::Int(IntType::INT),
            init: None,
            flags,
            parent,
            span: Span::default(),
        })
    }

    #[test]
    fn add_links_members_into_parent() {
        let mut unit = TranslationUnit::new();
        let ns = unit.add(Decl::Namespace(NamespaceDecl {
            name: "io",
            decls: Vec::new(),
            parent: None,
            span: Span::default(),
        }));
        let class = unit.add(record("Holder", Some(ns)));
        let member = unit.add(var("value", Some(class), VarFlags::STATIC_MEMBER));

        assert_eq!(unit.top_level(), &[ns]);
        assert_eq!(unit.decl(class).as_record().unwrap().members, vec![member]);
        assert_eq!(unit.lookup("value"), &[member]);
        assert!(unit.lookup("missing").is_empty());
        assert_eq!(unit.len(), 3);
    }

    #[test]
    fn ancestors_walk_outward() {
        let mut unit = TranslationUnit::new();
        let outer = unit.add(record("Outer", None));
        let inner = unit.add(record("Inner", Some(outer)));
        let member = unit.add(var("x", Some(inner), VarFlags::STATIC_MEMBER));

        let chain: Vec<_> = unit.ancestors(member).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![inner, outer]);
        assert_eq!(unit.ancestors(outer).count(), 0);
    }

    #[test]
    fn specialization_kind_name() {
        let args = [TemplateArgument::Integral(IntValue::new(3, IntType::INT))];
        let spec = Decl::Record(RecordDecl {
            name: "Fixed",
            template_args: Some(&args),
            members: Vec::new(),
            parent: None,
            span: Span::default(),
        });
        assert_eq!(spec.kind_name(), "class template specialization");
        assert_eq!(record("Plain", None).kind_name(), "class");
    }

    #[test]
    fn var_flags() {
        let Decl::Var(v) = var("c", None, VarFlags::CONSTEXPR) else {
            unreachable!()
        };
        assert!(v.is_constant());
        assert!(!v.is_static_member());
    }
}
