// well_known.rs
//! Builtin type definitions seeded into every registry.

use stoat_frontend::Interner;
use stoat_identity::{TypeDefId, TypeId};

use crate::entity_registry::{EntityRegistry, TypeDefKind};
use crate::type_arena::TypeArena;

/// Handles to the builtin types the expression collaborators produce for
/// literals.
#[derive(Debug, Clone, Copy)]
pub struct WellKnown {
    pub int_def: TypeDefId,
    pub float_def: TypeDefId,
    pub bool_def: TypeDefId,
    pub string_def: TypeDefId,
    pub int_ty: TypeId,
    pub float_ty: TypeId,
    pub bool_ty: TypeId,
    pub string_ty: TypeId,
}

impl WellKnown {
    pub(crate) fn seed(
        registry: &mut EntityRegistry,
        interner: &mut Interner,
        arena: &mut TypeArena,
    ) -> Self {
        let mut builtin = |registry: &mut EntityRegistry, name: &str| {
            let sym = interner.intern(name);
            registry.register_type(sym, TypeDefKind::Builtin, false, arena)
        };
        let int_def = builtin(registry, "Int");
        let float_def = builtin(registry, "Float");
        let bool_def = builtin(registry, "Bool");
        let string_def = builtin(registry, "String");
        Self {
            int_def,
            float_def,
            bool_def,
            string_def,
            int_ty: registry.get(int_def).declared_ty,
            float_ty: registry.get(float_def).declared_ty,
            bool_ty: registry.get(bool_def).declared_ty,
            string_ty: registry.get(string_def).declared_ty,
        }
    }
}
