// type_arena.rs
//
// Interned type system using TypeId handles for O(1) equality and minimal
// allocations.
//
// Structural types are deduplicated through an intern map. Archetypes are the
// one exception: every allocation is fresh, because an archetype stands for a
// particular generic-parameter occurrence and must not unify with a
// same-shaped archetype from another declaration.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use stoat_frontend::Symbol;
use stoat_identity::{ArchetypeId, TypeDefId, TypeId};

pub type TypeIdVec = SmallVec<[TypeId; 4]>;
pub type ProtocolVec = SmallVec<[TypeDefId; 2]>;

/// Which flavor of nominal declaration a nominal type refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Struct,
    Class,
    OneOf,
}

/// One element of a tuple type: optional label, element type, and whether the
/// corresponding field carries a default initializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleField {
    pub label: Option<Symbol>,
    pub ty: TypeId,
    pub has_default: bool,
}

impl TupleField {
    pub fn new(label: Option<Symbol>, ty: TypeId) -> Self {
        Self {
            label,
            ty,
            has_default: false,
        }
    }
}

/// The canonical semantic type representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemaType {
    /// Poisoned; absorbs all further checking.
    Error,
    Nominal {
        def: TypeDefId,
        kind: NominalKind,
    },
    /// Existential: some value conforming to every listed protocol.
    Protocol {
        protocols: ProtocolVec,
    },
    Tuple {
        fields: Vec<TupleField>,
    },
    Function {
        input: TypeId,
        result: TypeId,
    },
    /// A function type parameterised by generic parameters; `params` holds
    /// the parameters' archetypes in declaration order.
    Polymorphic {
        input: TypeId,
        result: TypeId,
        params: TypeIdVec,
    },
    /// A mutable reference layer.
    LValue {
        object: TypeId,
    },
    /// A generic nominal referenced without type arguments.
    UnboundGeneric {
        def: TypeDefId,
    },
    /// Abstract type standing for a generic parameter, carrying the set of
    /// protocols it is known to conform to.
    Archetype {
        id: ArchetypeId,
        name: Symbol,
        protocols: ProtocolVec,
        index: Option<u32>,
    },
}

/// Per-compilation type storage with automatic deduplication.
#[derive(Debug)]
pub struct TypeArena {
    types: Vec<SemaType>,
    dedup: FxHashMap<SemaType, TypeId>,
    next_archetype: u32,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            dedup: FxHashMap::default(),
            next_archetype: 0,
        };
        // Reserve index 0 for the error type; TypeId::ERROR relies on it.
        let error = arena.intern(SemaType::Error);
        debug_assert!(error.is_error());
        arena
    }

    fn intern(&mut self, ty: SemaType) -> TypeId {
        if let Some(&id) = self.dedup.get(&ty) {
            return id;
        }
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(ty.clone());
        self.dedup.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &SemaType {
        &self.types[id.index() as usize]
    }

    pub fn error(&self) -> TypeId {
        TypeId::ERROR
    }

    pub fn nominal(&mut self, def: TypeDefId, kind: NominalKind) -> TypeId {
        self.intern(SemaType::Nominal { def, kind })
    }

    pub fn protocol(&mut self, protocols: ProtocolVec) -> TypeId {
        self.intern(SemaType::Protocol { protocols })
    }

    pub fn tuple(&mut self, fields: Vec<TupleField>) -> TypeId {
        self.intern(SemaType::Tuple { fields })
    }

    /// The empty tuple.
    pub fn unit(&mut self) -> TypeId {
        self.tuple(Vec::new())
    }

    pub fn function(&mut self, input: TypeId, result: TypeId) -> TypeId {
        self.intern(SemaType::Function { input, result })
    }

    pub fn polymorphic(&mut self, input: TypeId, result: TypeId, params: TypeIdVec) -> TypeId {
        self.intern(SemaType::Polymorphic {
            input,
            result,
            params,
        })
    }

    pub fn lvalue(&mut self, object: TypeId) -> TypeId {
        self.intern(SemaType::LValue { object })
    }

    pub fn unbound_generic(&mut self, def: TypeDefId) -> TypeId {
        self.intern(SemaType::UnboundGeneric { def })
    }

    /// Allocate a fresh archetype. Never deduplicated.
    pub fn archetype(
        &mut self,
        name: Symbol,
        protocols: ProtocolVec,
        index: Option<u32>,
    ) -> TypeId {
        let arch_id = ArchetypeId::new(self.next_archetype);
        self.next_archetype += 1;
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(SemaType::Archetype {
            id: arch_id,
            name,
            protocols,
            index,
        });
        id
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_existential(&self, id: TypeId) -> bool {
        matches!(self.get(id), SemaType::Protocol { .. })
    }

    /// The protocols of an existential type, or `None` for anything else.
    pub fn existential_protocols(&self, id: TypeId) -> Option<&[TypeDefId]> {
        match self.get(id) {
            SemaType::Protocol { protocols } => Some(protocols),
            _ => None,
        }
    }

    pub fn is_archetype(&self, id: TypeId) -> bool {
        matches!(self.get(id), SemaType::Archetype { .. })
    }

    pub fn archetype_protocols(&self, id: TypeId) -> Option<&[TypeDefId]> {
        match self.get(id) {
            SemaType::Archetype { protocols, .. } => Some(protocols),
            _ => None,
        }
    }

    pub fn archetype_index(&self, id: TypeId) -> Option<u32> {
        match self.get(id) {
            SemaType::Archetype { index, .. } => *index,
            _ => None,
        }
    }

    /// Input and result of a function or polymorphic function type.
    pub fn as_function(&self, id: TypeId) -> Option<(TypeId, TypeId)> {
        match self.get(id) {
            SemaType::Function { input, result }
            | SemaType::Polymorphic { input, result, .. } => Some((*input, *result)),
            _ => None,
        }
    }

    pub fn tuple_fields(&self, id: TypeId) -> Option<&[TupleField]> {
        match self.get(id) {
            SemaType::Tuple { fields } => Some(fields),
            _ => None,
        }
    }

    pub fn is_empty_tuple(&self, id: TypeId) -> bool {
        matches!(self.get(id), SemaType::Tuple { fields } if fields.is_empty())
    }

    pub fn is_lvalue(&self, id: TypeId) -> bool {
        matches!(self.get(id), SemaType::LValue { .. })
    }

    pub fn lvalue_object(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            SemaType::LValue { object } => Some(*object),
            _ => None,
        }
    }

    /// Nominal, unbound-generic, or error: the shapes an extension may extend.
    pub fn is_extendable(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            SemaType::Error | SemaType::Nominal { .. } | SemaType::UnboundGeneric { .. }
        )
    }

    /// A type with a concrete in-memory representation: no reference layers
    /// and no unresolved generics, directly or through tuple elements.
    pub fn is_materializable(&self, id: TypeId) -> bool {
        match self.get(id) {
            SemaType::LValue { .. } | SemaType::UnboundGeneric { .. } => false,
            SemaType::Tuple { fields } => fields.iter().all(|f| self.is_materializable(f.ty)),
            _ => true,
        }
    }

    /// True when the type carries a reference layer, directly or through
    /// tuple elements. The variable storability rule rejects exactly this.
    pub fn contains_reference(&self, id: TypeId) -> bool {
        match self.get(id) {
            SemaType::LValue { .. } => true,
            SemaType::Tuple { fields } => fields.iter().any(|f| self.contains_reference(f.ty)),
            _ => false,
        }
    }

    /// Number of interned types, including the reserved error slot.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
