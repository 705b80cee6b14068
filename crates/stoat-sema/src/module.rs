// module.rs
//
// Imported-module point lookup. Cross-module name resolution is the loader's
// concern; the declaration checker only ever asks an imported module for the
// values sharing a name, which feeds the infix-inheritance scan.

use stoat_frontend::{DeclAttributes, Symbol};

/// An exported value's signature as seen from outside the module.
#[derive(Debug, Clone)]
pub struct ModuleValue {
    pub name: Symbol,
    pub attrs: DeclAttributes,
}

/// A previously compiled module visible through an import.
#[derive(Debug)]
pub struct Module {
    pub name: Symbol,
    values: Vec<ModuleValue>,
}

impl Module {
    pub fn new(name: Symbol) -> Self {
        Self {
            name,
            values: Vec::new(),
        }
    }

    pub fn export_value(&mut self, name: Symbol, attrs: DeclAttributes) {
        self.values.push(ModuleValue { name, attrs });
    }

    /// All exported values with the given name, in export order.
    pub fn lookup_value(&self, name: Symbol) -> impl Iterator<Item = &ModuleValue> {
        self.values.iter().filter(move |v| v.name == name)
    }
}
