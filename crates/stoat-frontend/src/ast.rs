// ast.rs

use stoat_identity::{Span, TypeDefId, TypeId};

/// Unique identifier for symbols (interned strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// True when a name lexes as an operator rather than an identifier.
pub fn is_operator_name(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| "/=-+*%<>!&|^~.".contains(c))
}

/// Associativity of an infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    #[default]
    None,
    Left,
    Right,
}

/// Fixity data carried by the infix attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfixData {
    pub associativity: Associativity,
    pub precedence: u8,
}

/// Attributes written on a declaration. The checker neutralises flags that
/// violate the structural rules; see the attribute validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclAttributes {
    pub infix: Option<InfixData>,
    pub postfix: bool,
    pub assignment: bool,
    pub conversion: bool,
    pub byref: bool,
    pub auto_closure: bool,
}

impl DeclAttributes {
    pub fn is_infix(&self) -> bool {
        self.infix.is_some()
    }
}

/// The kind of lexical scope a declaration appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclContext {
    Module,
    Struct,
    Class,
    OneOf,
    Protocol,
    Extension,
    Func,
}

impl DeclContext {
    pub fn is_module(self) -> bool {
        matches!(self, DeclContext::Module)
    }

    /// True inside a nominal type, protocol, or extension body.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            DeclContext::Struct
                | DeclContext::Class
                | DeclContext::OneOf
                | DeclContext::Protocol
                | DeclContext::Extension
        )
    }
}

/// Syntactic type expression, resolved by the type reference validator.
#[derive(Debug, Clone)]
pub enum TypeRepr {
    Named(Symbol),
    Tuple(Vec<TupleTypeReprField>),
    Function {
        input: Box<TypeRepr>,
        result: Box<TypeRepr>,
    },
    /// A reference annotation; resolves to an l-value layer.
    Byref(Box<TypeRepr>),
    /// Protocol composition: each operand must resolve to an existential.
    Composition(Vec<TypeRepr>),
}

#[derive(Debug, Clone)]
pub struct TupleTypeReprField {
    pub label: Option<Symbol>,
    pub repr: TypeRepr,
    pub has_default: bool,
}

impl TupleTypeReprField {
    pub fn new(label: Option<Symbol>, repr: TypeRepr) -> Self {
        Self {
            label,
            repr,
            has_default: false,
        }
    }
}

/// A syntactic type expression paired with its resolved type slot.
#[derive(Debug, Clone)]
pub struct TypeLoc {
    pub repr: Option<TypeRepr>,
    pub ty: Option<TypeId>,
    pub span: Span,
}

impl TypeLoc {
    pub fn new(repr: TypeRepr, span: Span) -> Self {
        Self {
            repr: Some(repr),
            ty: None,
            span,
        }
    }

    /// A loc constructed directly from a semantic type; already valid.
    pub fn resolved(ty: TypeId) -> Self {
        Self {
            repr: None,
            ty: Some(ty),
            span: Span::default(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.ty.is_some()
    }

    pub fn set_invalid(&mut self) {
        self.ty = Some(TypeId::ERROR);
    }
}

/// A binding pattern. The type slot is computed from the pattern's structure
/// by the pattern checker.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub ty: Option<TypeId>,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self {
            kind,
            ty: None,
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Binds one variable declaration.
    Named(VarDecl),
    Typed {
        sub: Box<Pattern>,
        annotation: TypeLoc,
    },
    Tuple(Vec<TuplePatternField>),
    Paren(Box<Pattern>),
    /// Wildcard; binds nothing.
    Any,
}

#[derive(Debug, Clone)]
pub struct TuplePatternField {
    pub label: Option<Symbol>,
    pub pattern: Pattern,
}

/// One generic type parameter: `T` or `T : P`. The archetype slot is filled
/// by the archetype builder.
#[derive(Debug, Clone)]
pub struct GenericParam {
    pub name: Symbol,
    pub inherited: Vec<TypeLoc>,
    pub archetype: Option<TypeId>,
    pub span: Span,
}

impl GenericParam {
    pub fn new(name: Symbol, inherited: Vec<TypeLoc>, span: Span) -> Self {
        Self {
            name,
            inherited,
            archetype: None,
            span,
        }
    }
}

/// One clause of a generic requirements list.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// `T : P` — subject must conform to a protocol.
    Conformance { subject: TypeLoc, protocol: TypeLoc },
    /// `T == U`
    SameType { first: TypeLoc, second: TypeLoc },
}

/// Ordered generic parameters plus the requirements clause.
#[derive(Debug, Clone)]
pub struct GenericParamList {
    pub params: Vec<GenericParam>,
    pub requirements: Vec<Requirement>,
    pub span: Span,
}

/// A minimal initializer expression. Elaboration beyond literal shapes is the
/// expression checker's concern.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Option<TypeId>,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            ty: None,
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    StringLit(String),
    Tuple(Vec<Expr>),
    AddressOf(Box<Expr>),
}

/// A function signature and body: one pattern per parameter clause (curried),
/// an optional result annotation (empty tuple when absent), and the computed
/// function type.
#[derive(Debug, Clone)]
pub struct FuncExpr {
    pub params: Vec<Pattern>,
    pub result: Option<TypeLoc>,
    pub ty: Option<TypeId>,
}

impl FuncExpr {
    pub fn new(params: Vec<Pattern>, result: Option<TypeLoc>) -> Self {
        Self {
            params,
            result,
            ty: None,
        }
    }
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Import(ImportDecl),
    PatternBinding(PatternBindingDecl),
    Var(VarDecl),
    Func(FuncDecl),
    Constructor(ConstructorDecl),
    Destructor(DestructorDecl),
    Subscript(SubscriptDecl),
    TypeAlias(TypeAliasDecl),
    OneOf(OneOfDecl),
    OneOfElement(OneOfElementDecl),
    Struct(StructDecl),
    Class(ClassDecl),
    Protocol(ProtocolDecl),
    Extension(ExtensionDecl),
    TopLevelCode(TopLevelCodeDecl),
}

impl Decl {
    pub fn context(&self) -> DeclContext {
        match self {
            Decl::Import(d) => d.context,
            Decl::PatternBinding(d) => d.context,
            Decl::Var(d) => d.context,
            Decl::Func(d) => d.context,
            Decl::Constructor(d) => d.context,
            Decl::Destructor(d) => d.context,
            Decl::Subscript(d) => d.context,
            Decl::TypeAlias(d) => d.context,
            Decl::OneOf(d) => d.context,
            Decl::OneOfElement(d) => d.context,
            Decl::Struct(d) => d.context,
            Decl::Class(d) => d.context,
            Decl::Protocol(d) => d.context,
            Decl::Extension(d) => d.context,
            Decl::TopLevelCode(d) => d.context,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Import(d) => d.span,
            Decl::PatternBinding(d) => d.span,
            Decl::Var(d) => d.span,
            Decl::Func(d) => d.span,
            Decl::Constructor(d) => d.span,
            Decl::Destructor(d) => d.span,
            Decl::Subscript(d) => d.span,
            Decl::TypeAlias(d) => d.span,
            Decl::OneOf(d) => d.span,
            Decl::OneOfElement(d) => d.span,
            Decl::Struct(d) => d.span,
            Decl::Class(d) => d.span,
            Decl::Protocol(d) => d.span,
            Decl::Extension(d) => d.span,
            Decl::TopLevelCode(d) => d.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub module: Symbol,
    pub context: DeclContext,
    pub span: Span,
}

/// A variable declaration. Always bound through a pattern; the checker
/// reaches vars by walking the binding pattern, never directly.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Symbol,
    pub attrs: DeclAttributes,
    /// Computed property (getter/setter), not a stored field.
    pub is_property: bool,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: Symbol, context: DeclContext, span: Span) -> Self {
        Self {
            name,
            attrs: DeclAttributes::default(),
            is_property: false,
            ty: None,
            context,
            span,
        }
    }
}

/// Binds a pattern, optionally with an initializer expression.
#[derive(Debug, Clone)]
pub struct PatternBindingDecl {
    pub pattern: Pattern,
    pub init: Option<Expr>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Symbol,
    pub attrs: DeclAttributes,
    pub is_static: bool,
    pub generic_params: Option<GenericParamList>,
    pub body: FuncExpr,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub generic_params: Option<GenericParamList>,
    pub arguments: Pattern,
    /// The implicit receiver decl; its type is seeded by the checker.
    pub implicit_this: VarDecl,
    pub attrs: DeclAttributes,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DestructorDecl {
    pub implicit_this: VarDecl,
    pub attrs: DeclAttributes,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SubscriptDecl {
    pub indices: Pattern,
    pub element: TypeLoc,
    pub attrs: DeclAttributes,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

/// A type alias. Inside a protocol this is an associated type: the checker
/// synthesises an archetype as its underlying type.
#[derive(Debug, Clone)]
pub struct TypeAliasDecl {
    pub name: Symbol,
    pub underlying: TypeLoc,
    pub inherited: Vec<TypeLoc>,
    pub def: Option<TypeDefId>,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct OneOfDecl {
    pub name: Symbol,
    pub generic_params: Option<GenericParamList>,
    pub inherited: Vec<TypeLoc>,
    pub members: Vec<Decl>,
    pub def: Option<TypeDefId>,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

/// One case of a oneof. A synthesized instance doubles as a struct's
/// elementwise constructor; the checker locates it by the implicit flag.
#[derive(Debug, Clone)]
pub struct OneOfElementDecl {
    pub name: Symbol,
    pub argument: Option<TypeLoc>,
    pub is_implicit: bool,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub generic_params: Option<GenericParamList>,
    pub inherited: Vec<TypeLoc>,
    pub members: Vec<Decl>,
    pub def: Option<TypeDefId>,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Symbol,
    pub generic_params: Option<GenericParamList>,
    pub inherited: Vec<TypeLoc>,
    pub members: Vec<Decl>,
    pub def: Option<TypeDefId>,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ProtocolDecl {
    pub name: Symbol,
    pub inherited: Vec<TypeLoc>,
    pub members: Vec<Decl>,
    pub def: Option<TypeDefId>,
    pub ty: Option<TypeId>,
    pub context: DeclContext,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExtensionDecl {
    pub extended: TypeLoc,
    pub inherited: Vec<TypeLoc>,
    pub members: Vec<Decl>,
    pub context: DeclContext,
    pub span: Span,
}

/// Executable statements at file scope. The compiler driver routes these to
/// the statement checker, not through declaration checking.
#[derive(Debug, Clone)]
pub struct TopLevelCodeDecl {
    pub body: Vec<Expr>,
    pub context: DeclContext,
    pub span: Span,
}

/// How pattern bindings at module scope are scheduled across the two passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationUnitKind {
    /// Pattern bindings are checked eagerly in the first pass.
    Library,
    /// Script/main file: module-scope pattern bindings defer to the second
    /// pass.
    Main,
}

/// A single source file's declarations.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub kind: TranslationUnitKind,
    pub decls: Vec<Decl>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names() {
        assert!(is_operator_name("+"));
        assert!(is_operator_name("=="));
        assert!(is_operator_name("&"));
        assert!(!is_operator_name("map"));
        assert!(!is_operator_name("_x"));
    }
}
