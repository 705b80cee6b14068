// checker/mod.rs
//! The two-pass declaration checker.
//!
//! Module-scope declarations are checked twice: pass 1 elaborates every
//! signature so the whole unit is name-resolvable, pass 2 checks initializer
//! bodies and explicit conformances against those signatures. A declaration
//! in any other context is visited exactly once, as a child of its container,
//! and runs both windows in that single visit.

mod declarations;

use rustc_hash::FxHashMap;

use stoat_frontend::{
    Decl, Expr, FuncExpr, GenericParamList, InfixData, Interner, Pattern, Requirement, Span,
    Symbol, TranslationUnit, TranslationUnitKind, TypeLoc, TypeRepr,
};
use stoat_identity::{TypeDefId, TypeId};

use crate::entity_registry::EntityRegistry;
use crate::errors::SemanticError;
use crate::expr::{sema_func_expr, type_check_expression};
use crate::generics::{ArchetypeBuilder, GenericScope};
use crate::module::Module;
use crate::patterns::{coerce_to_type, type_check_pattern};
use crate::resolve::{TypeResolutionContext, validate_type};
use crate::type_arena::TypeArena;
use crate::type_display::display_type;

/// A type error wrapping a miette-enabled SemanticError
#[derive(Debug, Clone)]
pub struct TypeError {
    pub error: SemanticError,
    pub span: Span,
}

impl TypeError {
    pub fn new(error: SemanticError, span: Span) -> Self {
        Self { error, span }
    }
}

/// Pass configuration for one visit. `first` and `second` are both false for
/// declarations outside module scope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pass {
    pub first: bool,
    pub second: bool,
}

/// The enclosing container while visiting members: its registry entry and
/// the type its instances have inside the declaration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContainerCtx {
    pub def: Option<TypeDefId>,
    pub declared_ty: TypeId,
}

/// Everything the checker accumulated, handed back once checking is done.
#[derive(Debug)]
pub struct CheckOutput {
    pub arena: TypeArena,
    pub registry: EntityRegistry,
    pub errors: Vec<TypeError>,
}

pub struct Checker<'a> {
    pub(crate) interner: &'a Interner,
    pub(crate) arena: TypeArena,
    pub(crate) registry: EntityRegistry,
    pub(crate) tu_kind: TranslationUnitKind,
    pub(crate) imports: &'a [Module],
    /// Infix operators seen so far in this translation unit, in source
    /// order; feeds infix inheritance.
    pub(crate) tu_operators: FxHashMap<Symbol, InfixData>,
    /// Generic scopes currently active, innermost last.
    pub(crate) scopes: Vec<GenericScope>,
    /// Container stack while visiting members.
    pub(crate) containers: Vec<ContainerCtx>,
    pub(crate) errors: Vec<TypeError>,
}

impl<'a> Checker<'a> {
    pub fn new(
        interner: &'a Interner,
        arena: TypeArena,
        registry: EntityRegistry,
        imports: &'a [Module],
    ) -> Self {
        Self {
            interner,
            arena,
            registry,
            tu_kind: TranslationUnitKind::Main,
            imports,
            tu_operators: FxHashMap::default(),
            scopes: Vec::new(),
            containers: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Drive a whole translation unit through both passes. Registers type
    /// shells first so forward references resolve regardless of order.
    pub fn check_translation_unit(&mut self, unit: &mut TranslationUnit) {
        self.tu_kind = unit.kind;
        self.registry.register_shells(&mut unit.decls, &mut self.arena);
        for decl in &mut unit.decls {
            // Top-level code is routed to the statement checker by the
            // driver, not through declaration checking.
            if matches!(decl, Decl::TopLevelCode(_)) {
                continue;
            }
            self.type_check_decl(decl, true);
        }
        for decl in &mut unit.decls {
            if matches!(decl, Decl::TopLevelCode(_)) {
                continue;
            }
            self.type_check_decl(decl, false);
        }
    }

    /// The single entry point. `is_first_pass = false` is only legal for a
    /// module-scope declaration after the first pass already ran on it.
    pub fn type_check_decl(&mut self, decl: &mut Decl, is_first_pass: bool) {
        let is_second_pass = !is_first_pass && decl.context().is_module();
        tracing::trace!(is_first_pass, is_second_pass, "type_check_decl");
        self.visit_decl(
            decl,
            Pass {
                first: is_first_pass,
                second: is_second_pass,
            },
        );
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn finish(self) -> CheckOutput {
        CheckOutput {
            arena: self.arena,
            registry: self.registry,
            errors: self.errors,
        }
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn add_error(&mut self, error: SemanticError, span: Span) {
        self.errors.push(TypeError::new(error, span));
    }

    pub(crate) fn display(&self, ty: TypeId) -> String {
        display_type(&self.arena, &self.registry, self.interner, ty)
    }

    fn resolve_ctx(&mut self) -> TypeResolutionContext<'_> {
        TypeResolutionContext {
            registry: &self.registry,
            arena: &mut self.arena,
            interner: self.interner,
            scopes: &self.scopes,
            errors: &mut self.errors,
        }
    }

    pub(crate) fn validate_loc(&mut self, loc: &mut TypeLoc, is_first_pass: bool) -> bool {
        let mut ctx = self.resolve_ctx();
        validate_type(loc, is_first_pass, &mut ctx)
    }

    pub(crate) fn check_pattern(&mut self, pattern: &mut Pattern, is_first_pass: bool) -> bool {
        let mut ctx = self.resolve_ctx();
        type_check_pattern(pattern, is_first_pass, &mut ctx)
    }

    pub(crate) fn coerce_pattern(
        &mut self,
        pattern: &mut Pattern,
        ty: TypeId,
        is_first_pass: bool,
    ) -> bool {
        let mut ctx = self.resolve_ctx();
        coerce_to_type(pattern, ty, is_first_pass, &mut ctx)
    }

    pub(crate) fn check_expr(&mut self, expr: &mut Expr, dest: Option<TypeId>) -> bool {
        let mut ctx = self.resolve_ctx();
        type_check_expression(expr, dest, &mut ctx)
    }

    pub(crate) fn elaborate_func(&mut self, func: &mut FuncExpr, is_first_pass: bool) {
        let mut ctx = self.resolve_ctx();
        sema_func_expr(func, is_first_pass, &mut ctx);
    }

    /// The type of `this` in the current container, or the error type when
    /// there is none (a structural diagnostic has already fired by then).
    pub(crate) fn this_type(&self) -> TypeId {
        self.containers
            .last()
            .map(|c| c.declared_ty)
            .unwrap_or(TypeId::ERROR)
    }

    pub(crate) fn type_def_of(&self, ty: TypeId) -> Option<TypeDefId> {
        use crate::type_arena::SemaType;
        match self.arena.get(ty) {
            SemaType::Nominal { def, .. } | SemaType::UnboundGeneric { def } => Some(*def),
            _ => None,
        }
    }

    /// Make a parameter list's archetypes visible for name resolution.
    /// Returns whether a scope was pushed; pair with `pop_scope`.
    pub(crate) fn push_scope_for(&mut self, generic_params: Option<&GenericParamList>) -> bool {
        match generic_params {
            Some(list) => {
                self.scopes.push(GenericScope::from_params(&list.params));
                true
            }
            None => false,
        }
    }

    pub(crate) fn pop_scope(&mut self, pushed: bool) {
        if pushed {
            self.scopes.pop();
        }
    }

    /// Check a generic parameter list: validate parameter constraints,
    /// assign archetypes, then validate the requirements clause.
    ///
    /// The protocol operand of each conformance requirement is validated
    /// before archetype assignment because the conformance sets need it;
    /// subjects and same-type operands wait until after, since they may refer
    /// to the archetypes just created.
    pub(crate) fn check_generic_params(
        &mut self,
        generic_params: Option<&mut GenericParamList>,
        pass: Pass,
    ) {
        let Some(list) = generic_params else { return };

        // Parameter intake, in declaration order.
        let mut builder = ArchetypeBuilder::new();
        for (index, param) in list.params.iter_mut().enumerate() {
            self.check_inherited(&mut param.inherited, pass);
            builder.add_generic_parameter(param, index as u32, &self.arena);
        }

        // First requirements scan: protocol operands only.
        for requirement in list.requirements.iter_mut() {
            if let Requirement::Conformance { subject, protocol } = requirement {
                if self.validate_loc(protocol, pass.first) {
                    continue;
                }
                let protocol_ty = protocol.ty.expect("validated loc has a type");
                if !self.arena.is_existential(protocol_ty) {
                    let subject = self.repr_name(subject);
                    let found = self.display(protocol_ty);
                    self.add_error(
                        SemanticError::RequirementNonProtocol {
                            subject,
                            found,
                            span: protocol.span.into(),
                        },
                        protocol.span,
                    );
                    protocol.set_invalid();
                    continue;
                }
            }
            builder.add_requirement(requirement, &self.arena);
        }

        // Wire up the archetypes.
        builder.assign_archetypes(&mut list.params, &mut self.arena);

        // Second requirements scan: subjects and same-type operands, with the
        // archetypes in scope.
        self.scopes.push(GenericScope::from_params(&list.params));
        for requirement in list.requirements.iter_mut() {
            match requirement {
                Requirement::Conformance { subject, .. } => {
                    if self.validate_loc(subject, pass.first) {
                        continue;
                    }
                    let subject_ty = subject.ty.expect("validated loc has a type");
                    if !self.arena.is_archetype(subject_ty) && !subject_ty.is_error() {
                        let found = self.display(subject_ty);
                        self.add_error(
                            SemanticError::RequirementSubjectNotGeneric {
                                found,
                                span: subject.span.into(),
                            },
                            subject.span,
                        );
                        subject.set_invalid();
                        continue;
                    }
                }
                Requirement::SameType { first, second } => {
                    if self.validate_loc(first, pass.first) {
                        continue;
                    }
                    if self.validate_loc(second, pass.first) {
                        continue;
                    }
                }
            }
            builder.add_requirement(requirement, &self.arena);
        }
        self.scopes.pop();
    }

    /// Render a requirement operand for diagnostics before it is resolvable.
    fn repr_name(&self, loc: &TypeLoc) -> String {
        match &loc.repr {
            Some(TypeRepr::Named(sym)) => self.interner.resolve(*sym).to_string(),
            _ => "<type>".to_string(),
        }
    }
}
