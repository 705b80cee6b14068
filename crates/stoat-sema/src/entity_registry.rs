// entity_registry.rs
//
// Side table of type definitions. Shells for every nominal declaration are
// registered before the first pass so forward references resolve regardless
// of declaration order; alias targets, claimed conformances, and value
// members are recorded as declarations are checked.

use rustc_hash::FxHashMap;

use stoat_frontend::{Decl, Interner, Symbol};
use stoat_identity::{TypeDefId, TypeId};

use crate::type_arena::{NominalKind, ProtocolVec, TypeArena};
use crate::well_known::WellKnown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    Struct,
    Class,
    OneOf,
    Protocol,
    Alias,
    Builtin,
}

/// A value member recorded on a type definition, consulted by the
/// conformance oracle.
#[derive(Debug, Clone)]
pub struct MemberSig {
    pub name: Symbol,
    pub ty: TypeId,
}

#[derive(Debug)]
pub struct TypeDef {
    pub name: Symbol,
    pub kind: TypeDefKind,
    /// The type of instances within the declaration's own context.
    pub declared_ty: TypeId,
    /// What a bare name reference elaborates to; differs from `declared_ty`
    /// for generic nominals, which reference as unbound generics.
    pub reference_ty: TypeId,
    pub is_generic: bool,
    /// Resolved underlying type, once the alias declaration has checked.
    pub alias_target: Option<TypeId>,
    /// Protocols claimed in inheritance clauses.
    pub implements: Vec<TypeDefId>,
    pub members: Vec<MemberSig>,
}

#[derive(Debug)]
pub struct EntityRegistry {
    defs: Vec<TypeDef>,
    by_name: FxHashMap<Symbol, TypeDefId>,
    well_known: Option<WellKnown>,
}

impl EntityRegistry {
    pub fn new(interner: &mut Interner, arena: &mut TypeArena) -> Self {
        let mut registry = Self {
            defs: Vec::new(),
            by_name: FxHashMap::default(),
            well_known: None,
        };
        let wk = WellKnown::seed(&mut registry, interner, arena);
        registry.well_known = Some(wk);
        registry
    }

    pub fn well_known(&self) -> &WellKnown {
        self.well_known
            .as_ref()
            .expect("well-known types seeded at construction")
    }

    pub fn get(&self, id: TypeDefId) -> &TypeDef {
        &self.defs[id.index() as usize]
    }

    fn get_mut(&mut self, id: TypeDefId) -> &mut TypeDef {
        &mut self.defs[id.index() as usize]
    }

    pub fn type_by_name(&self, name: Symbol) -> Option<TypeDefId> {
        self.by_name.get(&name).copied()
    }

    /// Register a type shell (name and kind only, no members yet). Computes
    /// the declared and reference types up front so forward references have
    /// something to resolve to.
    pub fn register_type(
        &mut self,
        name: Symbol,
        kind: TypeDefKind,
        is_generic: bool,
        arena: &mut TypeArena,
    ) -> TypeDefId {
        let def = TypeDefId::new(self.defs.len() as u32);
        let declared_ty = match kind {
            TypeDefKind::Struct | TypeDefKind::Builtin => arena.nominal(def, NominalKind::Struct),
            TypeDefKind::Class => arena.nominal(def, NominalKind::Class),
            TypeDefKind::OneOf => arena.nominal(def, NominalKind::OneOf),
            TypeDefKind::Protocol => {
                let mut protocols = ProtocolVec::new();
                protocols.push(def);
                arena.protocol(protocols)
            }
            // An alias has no type of its own until its declaration checks.
            TypeDefKind::Alias => TypeId::ERROR,
        };
        let reference_ty = if is_generic {
            arena.unbound_generic(def)
        } else {
            declared_ty
        };
        self.defs.push(TypeDef {
            name,
            kind,
            declared_ty,
            reference_ty,
            is_generic,
            alias_target: None,
            implements: Vec::new(),
            members: Vec::new(),
        });
        self.by_name.insert(name, def);
        def
    }

    /// Register shells for every nominal declaration in the slice, writing
    /// the assigned id and declared type back onto each declaration. Recurses
    /// into container members so nested types resolve too.
    pub fn register_shells(&mut self, decls: &mut [Decl], arena: &mut TypeArena) {
        for decl in decls {
            match decl {
                Decl::Struct(d) => {
                    let def = self.register_type(
                        d.name,
                        TypeDefKind::Struct,
                        d.generic_params.is_some(),
                        arena,
                    );
                    d.def = Some(def);
                    d.ty = Some(self.get(def).declared_ty);
                    self.register_shells(&mut d.members, arena);
                }
                Decl::Class(d) => {
                    let def = self.register_type(
                        d.name,
                        TypeDefKind::Class,
                        d.generic_params.is_some(),
                        arena,
                    );
                    d.def = Some(def);
                    d.ty = Some(self.get(def).declared_ty);
                    self.register_shells(&mut d.members, arena);
                }
                Decl::OneOf(d) => {
                    let def = self.register_type(
                        d.name,
                        TypeDefKind::OneOf,
                        d.generic_params.is_some(),
                        arena,
                    );
                    d.def = Some(def);
                    d.ty = Some(self.get(def).declared_ty);
                    self.register_shells(&mut d.members, arena);
                }
                Decl::Protocol(d) => {
                    let def = self.register_type(d.name, TypeDefKind::Protocol, false, arena);
                    d.def = Some(def);
                    d.ty = Some(self.get(def).declared_ty);
                    self.register_shells(&mut d.members, arena);
                }
                Decl::TypeAlias(d) => {
                    let def = self.register_type(d.name, TypeDefKind::Alias, false, arena);
                    d.def = Some(def);
                }
                Decl::Extension(d) => {
                    self.register_shells(&mut d.members, arena);
                }
                _ => {}
            }
        }
    }

    pub fn set_alias_target(&mut self, id: TypeDefId, ty: TypeId) {
        let def = self.get_mut(id);
        def.alias_target = Some(ty);
        def.declared_ty = ty;
    }

    pub fn add_conformance(&mut self, id: TypeDefId, protocol: TypeDefId) {
        let def = self.get_mut(id);
        if !def.implements.contains(&protocol) {
            def.implements.push(protocol);
        }
    }

    pub fn record_member(&mut self, id: TypeDefId, name: Symbol, ty: TypeId) {
        self.get_mut(id).members.push(MemberSig { name, ty });
    }

    pub fn member_named(&self, id: TypeDefId, name: Symbol) -> Option<&MemberSig> {
        self.get(id).members.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shells_resolve_by_name() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let mut registry = EntityRegistry::new(&mut interner, &mut arena);

        let name = interner.intern("Point");
        let def = registry.register_type(name, TypeDefKind::Struct, false, &mut arena);
        assert_eq!(registry.type_by_name(name), Some(def));
        assert_eq!(registry.get(def).declared_ty, registry.get(def).reference_ty);
    }

    #[test]
    fn generic_shells_reference_as_unbound() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let mut registry = EntityRegistry::new(&mut interner, &mut arena);

        let name = interner.intern("Box");
        let def = registry.register_type(name, TypeDefKind::Struct, true, &mut arena);
        let td = registry.get(def);
        assert_ne!(td.declared_ty, td.reference_ty);
        assert!(matches!(
            arena.get(td.reference_ty),
            crate::type_arena::SemaType::UnboundGeneric { .. }
        ));
    }

    #[test]
    fn builtins_are_seeded() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let registry = EntityRegistry::new(&mut interner, &mut arena);

        let int = interner.intern("Int");
        assert!(registry.type_by_name(int).is_some());
    }
}
