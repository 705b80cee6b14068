//! Declaration type-checking for the Stoat language.
//!
//! Given a parsed translation unit, the checker resolves every type reference
//! in declaration signatures, assigns archetypes to generic parameters,
//! computes the type of every named entity, verifies claimed protocol
//! conformances, and enforces the structural attribute rules — across a
//! two-pass schedule that lets mutually recursive module-scope declarations
//! see each other's signatures.

pub mod attrs;
pub mod checker;
pub mod conformance;
pub mod entity_registry;
pub mod errors;
pub mod expr;
pub mod generics;
pub mod module;
pub mod patterns;
pub mod resolve;
pub mod type_arena;
pub mod type_display;
pub mod well_known;

pub use checker::{CheckOutput, Checker, TypeError};
pub use entity_registry::{EntityRegistry, MemberSig, TypeDef, TypeDefKind};
pub use errors::SemanticError;
pub use generics::{ArchetypeBuilder, GenericScope};
pub use module::{Module, ModuleValue};
pub use resolve::{TypeResolutionContext, validate_type};
pub use type_arena::{NominalKind, ProtocolVec, SemaType, TupleField, TypeArena, TypeIdVec};
pub use type_display::display_type;
pub use well_known::WellKnown;
