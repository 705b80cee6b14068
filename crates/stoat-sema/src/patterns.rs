// patterns.rs
//
// Pattern checking: computes a pattern's type from its structure, or pushes
// an expression-derived type down through it. Invoked by the declaration
// checker for bindings, subscript indices, and function parameters.

use stoat_frontend::{Pattern, PatternKind};
use stoat_identity::TypeId;

use crate::errors::SemanticError;
use crate::resolve::{TypeResolutionContext, validate_type};
use crate::type_arena::TupleField;
use crate::type_display::display_type;

/// Compute the pattern's type bottom-up. Returns true on failure; the
/// pattern's slot is poisoned so enclosing checks see a type either way.
/// Idempotent on already-typed patterns.
pub fn type_check_pattern(
    pattern: &mut Pattern,
    is_first_pass: bool,
    ctx: &mut TypeResolutionContext<'_>,
) -> bool {
    if pattern.ty.is_some() {
        return false;
    }
    match &mut pattern.kind {
        PatternKind::Named(var) => match var.ty {
            Some(ty) => {
                pattern.ty = Some(ty);
                false
            }
            None => {
                ctx.add_error(
                    SemanticError::CannotInferPatternType {
                        span: pattern.span.into(),
                    },
                    pattern.span,
                );
                pattern.ty = Some(TypeId::ERROR);
                true
            }
        },
        PatternKind::Typed { sub, annotation } => {
            if validate_type(annotation, is_first_pass, ctx) {
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            let ty = annotation.ty.expect("validated annotation has a type");
            if coerce_to_type(sub, ty, is_first_pass, ctx) {
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            pattern.ty = Some(ty);
            false
        }
        PatternKind::Tuple(fields) => {
            let mut failed = false;
            let mut elements = Vec::with_capacity(fields.len());
            for field in fields.iter_mut() {
                failed |= type_check_pattern(&mut field.pattern, is_first_pass, ctx);
                let label = field.label.or_else(|| bound_var_name(&field.pattern));
                elements.push(TupleField::new(
                    label,
                    field.pattern.ty.unwrap_or(TypeId::ERROR),
                ));
            }
            if failed {
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            pattern.ty = Some(ctx.arena.tuple(elements));
            false
        }
        PatternKind::Paren(sub) => {
            let failed = type_check_pattern(sub, is_first_pass, ctx);
            pattern.ty = Some(sub.ty.unwrap_or(TypeId::ERROR));
            failed
        }
        PatternKind::Any => {
            ctx.add_error(
                SemanticError::CannotInferPatternType {
                    span: pattern.span.into(),
                },
                pattern.span,
            );
            pattern.ty = Some(TypeId::ERROR);
            true
        }
    }
}

/// Push an expression-derived type down the pattern, assigning var types as
/// it goes. Returns true on failure.
pub fn coerce_to_type(
    pattern: &mut Pattern,
    ty: TypeId,
    is_first_pass: bool,
    ctx: &mut TypeResolutionContext<'_>,
) -> bool {
    if let Some(existing) = pattern.ty {
        if existing == ty {
            return false;
        }
        diagnose_mismatch(existing, ty, pattern, ctx);
        return true;
    }
    match &mut pattern.kind {
        PatternKind::Named(var) => match var.ty {
            None => {
                var.ty = Some(ty);
                pattern.ty = Some(ty);
                false
            }
            Some(existing) if existing == ty => {
                pattern.ty = Some(ty);
                false
            }
            Some(existing) => {
                diagnose_mismatch(existing, ty, pattern, ctx);
                pattern.ty = Some(TypeId::ERROR);
                true
            }
        },
        PatternKind::Any => {
            pattern.ty = Some(ty);
            false
        }
        PatternKind::Paren(sub) => {
            if coerce_to_type(sub, ty, is_first_pass, ctx) {
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            pattern.ty = Some(ty);
            false
        }
        PatternKind::Typed { sub, annotation } => {
            if validate_type(annotation, is_first_pass, ctx) {
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            let annotated = annotation.ty.expect("validated annotation has a type");
            if annotated != ty {
                diagnose_mismatch(annotated, ty, pattern, ctx);
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            if coerce_to_type(sub, ty, is_first_pass, ctx) {
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            pattern.ty = Some(ty);
            false
        }
        PatternKind::Tuple(fields) => {
            let element_tys: Option<Vec<TypeId>> = ctx
                .arena
                .tuple_fields(ty)
                .map(|fs| fs.iter().map(|f| f.ty).collect());
            let Some(element_tys) = element_tys else {
                let expected = display_type(ctx.arena, ctx.registry, ctx.interner, ty);
                ctx.add_error(
                    SemanticError::PatternTypeMismatch {
                        expected,
                        found: "tuple pattern".to_string(),
                        span: pattern.span.into(),
                    },
                    pattern.span,
                );
                pattern.ty = Some(TypeId::ERROR);
                return true;
            };
            if element_tys.len() != fields.len() {
                ctx.add_error(
                    SemanticError::TuplePatternArityMismatch {
                        expected: element_tys.len(),
                        found: fields.len(),
                        span: pattern.span.into(),
                    },
                    pattern.span,
                );
                pattern.ty = Some(TypeId::ERROR);
                return true;
            }
            let mut failed = false;
            for (field, element_ty) in fields.iter_mut().zip(element_tys) {
                failed |= coerce_to_type(&mut field.pattern, element_ty, is_first_pass, ctx);
            }
            pattern.ty = Some(if failed { TypeId::ERROR } else { ty });
            failed
        }
    }
}

/// The name a pattern would bind, looking through parens and annotations.
/// Used to label tuple elements after their vars.
fn bound_var_name(pattern: &Pattern) -> Option<stoat_frontend::Symbol> {
    match &pattern.kind {
        PatternKind::Named(var) => Some(var.name),
        PatternKind::Paren(sub) | PatternKind::Typed { sub, .. } => bound_var_name(sub),
        _ => None,
    }
}

fn diagnose_mismatch(
    expected: TypeId,
    found: TypeId,
    pattern: &Pattern,
    ctx: &mut TypeResolutionContext<'_>,
) {
    let expected = display_type(ctx.arena, ctx.registry, ctx.interner, expected);
    let found = display_type(ctx.arena, ctx.registry, ctx.interner, found);
    ctx.add_error(
        SemanticError::PatternTypeMismatch {
            expected,
            found,
            span: pattern.span.into(),
        },
        pattern.span,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_registry::EntityRegistry;
    use crate::type_arena::TypeArena;
    use stoat_frontend::{
        DeclContext, Interner, Span, TuplePatternField, TypeLoc, TypeRepr, VarDecl,
    };

    fn named(interner: &mut Interner, name: &str) -> Pattern {
        let sym = interner.intern(name);
        Pattern::new(
            PatternKind::Named(VarDecl::new(sym, DeclContext::Module, Span::default())),
            Span::default(),
        )
    }

    #[test]
    fn typed_pattern_flows_annotation_to_var() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let registry = EntityRegistry::new(&mut interner, &mut arena);
        let int = interner.intern("Int");
        let sub = named(&mut interner, "x");
        let mut errors = Vec::new();
        let mut ctx = TypeResolutionContext {
            registry: &registry,
            arena: &mut arena,
            interner: &interner,
            scopes: &[],
            errors: &mut errors,
        };

        let mut pattern = Pattern::new(
            PatternKind::Typed {
                sub: Box::new(sub),
                annotation: TypeLoc::new(TypeRepr::Named(int), Span::default()),
            },
            Span::default(),
        );
        assert!(!type_check_pattern(&mut pattern, true, &mut ctx));
        let int_ty = ctx.registry.well_known().int_ty;
        assert_eq!(pattern.ty, Some(int_ty));
        let PatternKind::Typed { sub, .. } = &pattern.kind else {
            unreachable!()
        };
        let PatternKind::Named(var) = &sub.kind else {
            unreachable!()
        };
        assert_eq!(var.ty, Some(int_ty));
    }

    #[test]
    fn bare_named_pattern_cannot_infer() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let registry = EntityRegistry::new(&mut interner, &mut arena);
        let mut pattern = named(&mut interner, "x");
        let mut errors = Vec::new();
        let mut ctx = TypeResolutionContext {
            registry: &registry,
            arena: &mut arena,
            interner: &interner,
            scopes: &[],
            errors: &mut errors,
        };

        assert!(type_check_pattern(&mut pattern, true, &mut ctx));
        assert_eq!(pattern.ty, Some(TypeId::ERROR));
        assert!(matches!(
            ctx.errors[0].error,
            SemanticError::CannotInferPatternType { .. }
        ));
    }

    #[test]
    fn tuple_coercion_is_fieldwise() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let registry = EntityRegistry::new(&mut interner, &mut arena);
        let a = named(&mut interner, "a");
        let b = named(&mut interner, "b");
        let wk = *registry.well_known();
        let pair = arena.tuple(vec![
            TupleField::new(None, wk.int_ty),
            TupleField::new(None, wk.bool_ty),
        ]);
        let mut errors = Vec::new();
        let mut ctx = TypeResolutionContext {
            registry: &registry,
            arena: &mut arena,
            interner: &interner,
            scopes: &[],
            errors: &mut errors,
        };

        let mut pattern = Pattern::new(
            PatternKind::Tuple(vec![
                TuplePatternField {
                    label: None,
                    pattern: a,
                },
                TuplePatternField {
                    label: None,
                    pattern: b,
                },
            ]),
            Span::default(),
        );
        assert!(!coerce_to_type(&mut pattern, pair, false, &mut ctx));
        assert_eq!(pattern.ty, Some(pair));
    }

    #[test]
    fn tuple_coercion_arity_mismatch() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let registry = EntityRegistry::new(&mut interner, &mut arena);
        let a = named(&mut interner, "a");
        let wk = *registry.well_known();
        let pair = arena.tuple(vec![
            TupleField::new(None, wk.int_ty),
            TupleField::new(None, wk.bool_ty),
        ]);
        let mut errors = Vec::new();
        let mut ctx = TypeResolutionContext {
            registry: &registry,
            arena: &mut arena,
            interner: &interner,
            scopes: &[],
            errors: &mut errors,
        };

        let mut pattern = Pattern::new(
            PatternKind::Tuple(vec![TuplePatternField {
                label: None,
                pattern: a,
            }]),
            Span::default(),
        );
        assert!(coerce_to_type(&mut pattern, pair, false, &mut ctx));
        assert!(matches!(
            ctx.errors[0].error,
            SemanticError::TuplePatternArityMismatch { .. }
        ));
    }
}
