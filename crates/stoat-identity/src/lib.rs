//! First-class identity types for language entities.
//!
//! These types provide type-safe identifiers shared by the frontend and the
//! semantic analyzer, so AST nodes can carry resolved type handles without
//! depending on the analyzer crate.

mod entities;
mod span;

pub use entities::{ArchetypeId, TypeDefId, TypeId};
pub use span::Span;
