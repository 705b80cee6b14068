// expr.rs
//
// The expression-checker surface the declaration checker consumes:
// initializer elaboration against a destination type, materialisable
// conversion, and function-signature elaboration. Full expression inference
// lives with the statement checker; declaration checking only ever sees the
// literal shapes below.

use stoat_frontend::{Expr, ExprKind, FuncExpr};
use stoat_identity::TypeId;

use crate::patterns::type_check_pattern;
use crate::resolve::{TypeResolutionContext, validate_type};
use crate::type_arena::{TupleField, TypeArena};

/// Elaborate an initializer, checking it against `dest` when one is known.
/// Returns true on failure; the caller owns the diagnostic, since only it
/// knows the destination's provenance.
pub fn type_check_expression(
    expr: &mut Expr,
    dest: Option<TypeId>,
    ctx: &mut TypeResolutionContext<'_>,
) -> bool {
    let ty = infer_expr(expr, ctx);
    match dest {
        None => ty.is_error(),
        // A poisoned destination absorbs the initializer silently.
        Some(dest) if dest.is_error() => false,
        Some(dest) => ty != dest,
    }
}

fn infer_expr(expr: &mut Expr, ctx: &mut TypeResolutionContext<'_>) -> TypeId {
    let wk = *ctx.registry.well_known();
    let ty = match &mut expr.kind {
        ExprKind::IntLit(_) => wk.int_ty,
        ExprKind::FloatLit(_) => wk.float_ty,
        ExprKind::BoolLit(_) => wk.bool_ty,
        ExprKind::StringLit(_) => wk.string_ty,
        ExprKind::Tuple(elements) => {
            let fields: Vec<TupleField> = elements
                .iter_mut()
                .map(|e| TupleField::new(None, infer_expr(e, ctx)))
                .collect();
            ctx.arena.tuple(fields)
        }
        ExprKind::AddressOf(inner) => {
            let object = infer_expr(inner, ctx);
            ctx.arena.lvalue(object)
        }
    };
    expr.ty = Some(ty);
    ty
}

/// Strip reference layers from an elaborated initializer so its value can be
/// stored.
pub fn convert_to_materializable(expr: &mut Expr, arena: &TypeArena) {
    if let Some(ty) = expr.ty
        && let Some(object) = arena.lvalue_object(ty)
    {
        expr.ty = Some(object);
    }
}

/// Elaborate a function signature: check each parameter pattern, validate the
/// result annotation (the empty tuple when absent), and fold right-to-left
/// into a curried function type. Idempotent on an already-typed signature.
pub fn sema_func_expr(
    func: &mut FuncExpr,
    is_first_pass: bool,
    ctx: &mut TypeResolutionContext<'_>,
) {
    if func.ty.is_some() {
        return;
    }
    let mut failed = false;
    for param in &mut func.params {
        failed |= type_check_pattern(param, is_first_pass, ctx);
    }
    let result_ty = match &mut func.result {
        Some(loc) => {
            if validate_type(loc, is_first_pass, ctx) {
                failed = true;
                TypeId::ERROR
            } else {
                loc.ty.expect("validated result annotation has a type")
            }
        }
        None => ctx.arena.unit(),
    };
    if failed {
        func.ty = Some(TypeId::ERROR);
        return;
    }
    let mut ty = result_ty;
    for param in func.params.iter().rev() {
        let input = param.ty.expect("checked parameter pattern has a type");
        ty = ctx.arena.function(input, ty);
    }
    func.ty = Some(ty);
}
