// resolve.rs
//
// Type reference validation: converts TypeRepr (syntactic representation)
// into an interned TypeId, writing the result into the TypeLoc's slot.

use stoat_frontend::{Interner, Span, Symbol, TypeLoc, TypeRepr};
use stoat_identity::TypeId;

use crate::checker::TypeError;
use crate::entity_registry::{EntityRegistry, TypeDefKind};
use crate::errors::SemanticError;
use crate::generics::GenericScope;
use crate::type_arena::{ProtocolVec, TupleField, TypeArena};
use crate::type_display::display_type;

/// Context needed for type resolution
pub struct TypeResolutionContext<'a> {
    pub registry: &'a EntityRegistry,
    pub arena: &'a mut TypeArena,
    pub interner: &'a Interner,
    /// Generic scopes currently active, innermost last.
    pub scopes: &'a [GenericScope],
    pub errors: &'a mut Vec<TypeError>,
}

impl TypeResolutionContext<'_> {
    pub fn add_error(&mut self, error: SemanticError, span: Span) {
        self.errors.push(TypeError::new(error, span));
    }

    fn lookup_generic_param(&self, name: Symbol) -> Option<TypeId> {
        self.scopes.iter().rev().find_map(|s| s.lookup(name))
    }
}

/// Resolve the syntactic type inside `loc` and fill its slot. Returns true on
/// failure; the caller is expected to poison the containing declaration.
///
/// Idempotent: a loc whose slot is already filled returns success untouched.
pub fn validate_type(loc: &mut TypeLoc, is_first_pass: bool, ctx: &mut TypeResolutionContext<'_>) -> bool {
    if loc.ty.is_some() {
        return false;
    }
    let Some(repr) = loc.repr.take() else {
        loc.set_invalid();
        return true;
    };
    let ty = resolve_type_repr(&repr, loc.span, is_first_pass, ctx);
    loc.repr = Some(repr);
    loc.ty = Some(ty);
    ty.is_error()
}

pub fn resolve_type_repr(
    repr: &TypeRepr,
    span: Span,
    is_first_pass: bool,
    ctx: &mut TypeResolutionContext<'_>,
) -> TypeId {
    match repr {
        TypeRepr::Named(sym) => resolve_named_type(*sym, span, is_first_pass, ctx),
        TypeRepr::Tuple(fields) => {
            let resolved: Vec<TupleField> = fields
                .iter()
                .map(|f| TupleField {
                    label: f.label,
                    ty: resolve_type_repr(&f.repr, span, is_first_pass, ctx),
                    has_default: f.has_default,
                })
                .collect();
            ctx.arena.tuple(resolved)
        }
        TypeRepr::Function { input, result } => {
            let input_ty = resolve_type_repr(input, span, is_first_pass, ctx);
            let result_ty = resolve_type_repr(result, span, is_first_pass, ctx);
            ctx.arena.function(input_ty, result_ty)
        }
        TypeRepr::Byref(inner) => {
            let object = resolve_type_repr(inner, span, is_first_pass, ctx);
            ctx.arena.lvalue(object)
        }
        TypeRepr::Composition(parts) => resolve_composition(parts, span, is_first_pass, ctx),
    }
}

fn resolve_named_type(
    sym: Symbol,
    span: Span,
    is_first_pass: bool,
    ctx: &mut TypeResolutionContext<'_>,
) -> TypeId {
    // Generic parameters shadow module-level names.
    if let Some(archetype) = ctx.lookup_generic_param(sym) {
        return archetype;
    }

    let name = ctx.interner.resolve(sym);
    tracing::trace!(name, is_first_pass, "resolve_named_type");
    let Some(def_id) = ctx.registry.type_by_name(sym) else {
        ctx.add_error(
            SemanticError::UnknownType {
                name: name.to_string(),
                span: span.into(),
            },
            span,
        );
        return TypeId::ERROR;
    };

    let def = ctx.registry.get(def_id);
    match def.kind {
        TypeDefKind::Alias => def.alias_target.unwrap_or_else(|| {
            ctx.add_error(
                SemanticError::UnresolvedTypeAlias {
                    name: name.to_string(),
                    span: span.into(),
                },
                span,
            );
            TypeId::ERROR
        }),
        _ => def.reference_ty,
    }
}

/// Protocol compositions flatten to a single existential carrying the union
/// of the member protocols.
fn resolve_composition(
    parts: &[TypeRepr],
    span: Span,
    is_first_pass: bool,
    ctx: &mut TypeResolutionContext<'_>,
) -> TypeId {
    let mut protocols = ProtocolVec::new();
    let mut failed = false;
    for part in parts {
        let part_ty = resolve_type_repr(part, span, is_first_pass, ctx);
        if part_ty.is_error() {
            failed = true;
            continue;
        }
        match ctx.arena.existential_protocols(part_ty) {
            Some(members) => {
                for &p in members {
                    if !protocols.contains(&p) {
                        protocols.push(p);
                    }
                }
            }
            None => {
                let found = display_type(ctx.arena, ctx.registry, ctx.interner, part_ty);
                ctx.add_error(
                    SemanticError::NonProtocolComposition {
                        found,
                        span: span.into(),
                    },
                    span,
                );
                failed = true;
            }
        }
    }
    if failed {
        return TypeId::ERROR;
    }
    ctx.arena.protocol(protocols)
}
