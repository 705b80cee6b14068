// type_display.rs
//
// Human-readable rendering of semantic types for diagnostics.

use stoat_frontend::Interner;
use stoat_identity::TypeId;

use crate::entity_registry::EntityRegistry;
use crate::type_arena::{SemaType, TypeArena};

pub fn display_type(
    arena: &TypeArena,
    registry: &EntityRegistry,
    interner: &Interner,
    ty: TypeId,
) -> String {
    match arena.get(ty) {
        SemaType::Error => "<error>".to_string(),
        SemaType::Nominal { def, .. } | SemaType::UnboundGeneric { def } => {
            interner.resolve(registry.get(*def).name).to_string()
        }
        SemaType::Protocol { protocols } => match protocols.as_slice() {
            [single] => interner.resolve(registry.get(*single).name).to_string(),
            many => {
                let names: Vec<&str> = many
                    .iter()
                    .map(|p| interner.resolve(registry.get(*p).name))
                    .collect();
                format!("protocol<{}>", names.join(", "))
            }
        },
        SemaType::Tuple { fields } => {
            let parts: Vec<String> = fields
                .iter()
                .map(|f| {
                    let elem = display_type(arena, registry, interner, f.ty);
                    match f.label {
                        Some(label) => format!("{}: {}", interner.resolve(label), elem),
                        None => elem,
                    }
                })
                .collect();
            format!("({})", parts.join(", "))
        }
        SemaType::Function { input, result } => format!(
            "{} -> {}",
            display_type(arena, registry, interner, *input),
            display_type(arena, registry, interner, *result)
        ),
        SemaType::Polymorphic {
            input,
            result,
            params,
        } => {
            let names: Vec<String> = params
                .iter()
                .map(|&p| display_type(arena, registry, interner, p))
                .collect();
            format!(
                "<{}> {} -> {}",
                names.join(", "),
                display_type(arena, registry, interner, *input),
                display_type(arena, registry, interner, *result)
            )
        }
        SemaType::LValue { object } => format!(
            "@byref {}",
            display_type(arena, registry, interner, *object)
        ),
        SemaType::Archetype { name, .. } => interner.resolve(*name).to_string(),
    }
}
