// generics.rs
//
// Generic parameter handling: the archetype builder that assigns each
// parameter a fresh abstract type, and the scope used to resolve parameter
// names while the enclosing declaration is being checked.
//
// The builder runs in phases. Parameters are taken in declaration order and
// given indices; the protocol operand of each conformance requirement is
// validated before archetype assignment (the conformance sets need it), while
// requirement subjects and same-type operands wait until after assignment,
// because they may refer to the archetypes just created.

use rustc_hash::FxHashMap;

use stoat_frontend::{GenericParam, GenericParamList, Requirement, Symbol, TypeRepr};
use stoat_identity::TypeId;

use crate::type_arena::{ProtocolVec, TypeArena};

/// Maps generic parameter names to their archetypes for name resolution.
#[derive(Debug, Default)]
pub struct GenericScope {
    params: FxHashMap<Symbol, TypeId>,
}

impl GenericScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope from a parameter list whose archetypes are assigned.
    /// Parameters still lacking one (poisoned requirements, re-entry) are
    /// skipped.
    pub fn from_params(params: &[GenericParam]) -> Self {
        let mut scope = Self::new();
        for gp in params {
            if let Some(archetype) = gp.archetype {
                scope.add(gp.name, archetype);
            }
        }
        scope
    }

    pub fn add(&mut self, name: Symbol, archetype: TypeId) {
        self.params.insert(name, archetype);
    }

    pub fn lookup(&self, name: Symbol) -> Option<TypeId> {
        self.params.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Transient table that accumulates parameters and requirements, then
/// computes each parameter's conformance set and synthesises its archetype.
/// Discarded at the end of generic-parameter checking; the bindings persist
/// in each parameter's archetype slot.
#[derive(Debug, Default)]
pub struct ArchetypeBuilder {
    params: Vec<BuilderParam>,
    /// Conformance requirements keyed syntactically by subject name; the
    /// subject is not resolvable until archetypes exist.
    conformances: Vec<(Symbol, ProtocolVec)>,
}

#[derive(Debug)]
struct BuilderParam {
    name: Symbol,
    index: u32,
    inherited: ProtocolVec,
}

impl ArchetypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter under its declaration-order index. The
    /// parameter's inheritance clause must already be validated; non-protocol
    /// entries were diagnosed there and contribute nothing here.
    pub fn add_generic_parameter(&mut self, param: &GenericParam, index: u32, arena: &TypeArena) {
        let mut inherited = ProtocolVec::new();
        for loc in &param.inherited {
            let Some(ty) = loc.ty else { continue };
            if let Some(protocols) = arena.existential_protocols(ty) {
                for &p in protocols {
                    if !inherited.contains(&p) {
                        inherited.push(p);
                    }
                }
            }
        }
        self.params.push(BuilderParam {
            name: param.name,
            index,
            inherited,
        });
    }

    /// Record a requirement. Conformance requirements contribute to the
    /// subject parameter's conformance set; same-type requirements carry no
    /// archetype-level information at this stage.
    pub fn add_requirement(&mut self, requirement: &Requirement, arena: &TypeArena) {
        let Requirement::Conformance { subject, protocol } = requirement else {
            return;
        };
        let Some(TypeRepr::Named(subject_name)) = &subject.repr else {
            return;
        };
        let Some(protocol_ty) = protocol.ty else {
            return;
        };
        let Some(protocols) = arena.existential_protocols(protocol_ty) else {
            return;
        };
        self.conformances
            .push((*subject_name, protocols.iter().copied().collect()));
    }

    /// Synthesise a fresh archetype for every registered parameter and write
    /// it into the parameter's slot. The conformance set is the union of the
    /// parameter's declared inherited protocols and every conformance
    /// requirement naming it.
    pub fn assign_archetypes(&self, params: &mut [GenericParam], arena: &mut TypeArena) {
        for bp in &self.params {
            let target = params
                .iter_mut()
                .find(|p| p.name == bp.name)
                .expect("builder parameters come from this list");
            if target.archetype.is_some() {
                continue;
            }
            let mut protocols = bp.inherited.clone();
            for (subject, required) in &self.conformances {
                if *subject != bp.name {
                    continue;
                }
                for &p in required {
                    if !protocols.contains(&p) {
                        protocols.push(p);
                    }
                }
            }
            let archetype = arena.archetype(bp.name, protocols, Some(bp.index));
            target.archetype = Some(archetype);
        }
    }
}

/// Archetypes of an assigned parameter list, in declaration order.
pub fn archetypes_of(list: &GenericParamList) -> Vec<TypeId> {
    list.params.iter().filter_map(|p| p.archetype).collect()
}
