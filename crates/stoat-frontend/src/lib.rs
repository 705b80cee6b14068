//! Stoat frontend: the declaration tree the checker consumes.

pub mod ast;
pub mod intern;

pub use ast::*;
pub use intern::Interner;
pub use stoat_identity::Span;
