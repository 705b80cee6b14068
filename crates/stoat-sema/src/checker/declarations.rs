// checker/declarations.rs
//! Per-kind visit methods of the declaration checker.

use super::*;
use crate::attrs::ValueDeclView;
use crate::expr::convert_to_materializable;
use crate::generics::archetypes_of;
use crate::type_arena::{ProtocolVec, TupleField};
use stoat_frontend::{
    ClassDecl, ConstructorDecl, DeclContext, DestructorDecl, ExtensionDecl, FuncDecl, OneOfDecl,
    OneOfElementDecl, PatternBindingDecl, PatternKind, ProtocolDecl, StructDecl, SubscriptDecl,
    TypeAliasDecl,
};

/// Seed the implicit receiver pattern (and the var it binds) with the
/// enclosing container's declared type, before signature elaboration.
fn seed_this_pattern(pattern: &mut Pattern, ty: TypeId) {
    if pattern.ty.is_none() {
        pattern.ty = Some(ty);
    }
    match &mut pattern.kind {
        PatternKind::Named(var) => {
            if var.ty.is_none() {
                var.ty = Some(ty);
            }
        }
        PatternKind::Paren(sub) | PatternKind::Typed { sub, .. } => seed_this_pattern(sub, ty),
        _ => {}
    }
}

/// The non-property vars a binding pattern stores, in source order.
fn collect_stored_vars(pattern: &Pattern, fields: &mut Vec<TupleField>) {
    match &pattern.kind {
        PatternKind::Named(var) => {
            if !var.is_property {
                fields.push(TupleField::new(
                    Some(var.name),
                    var.ty.unwrap_or(TypeId::ERROR),
                ));
            }
        }
        PatternKind::Paren(sub) | PatternKind::Typed { sub, .. } => {
            collect_stored_vars(sub, fields)
        }
        PatternKind::Tuple(elements) => {
            for element in elements {
                collect_stored_vars(&element.pattern, fields);
            }
        }
        PatternKind::Any => {}
    }
}

fn collect_bound_members(pattern: &Pattern, out: &mut Vec<(Symbol, TypeId)>) {
    match &pattern.kind {
        PatternKind::Named(var) => {
            if let Some(ty) = var.ty {
                out.push((var.name, ty));
            }
        }
        PatternKind::Paren(sub) | PatternKind::Typed { sub, .. } => collect_bound_members(sub, out),
        PatternKind::Tuple(elements) => {
            for element in elements {
                collect_bound_members(&element.pattern, out);
            }
        }
        PatternKind::Any => {}
    }
}

impl Checker<'_> {
    pub(crate) fn visit_decl(&mut self, decl: &mut Decl, pass: Pass) {
        match decl {
            Decl::Import(_) => {
                // Nothing to do.
            }
            Decl::PatternBinding(d) => self.visit_pattern_binding(d, pass),
            Decl::Var(_) => {
                // Vars are checked through the pattern binding that binds
                // them.
            }
            Decl::Func(d) => self.visit_func(d, pass),
            Decl::Constructor(d) => self.visit_constructor(d, pass),
            Decl::Destructor(d) => self.visit_destructor(d, pass),
            Decl::Subscript(d) => self.visit_subscript(d, pass),
            Decl::TypeAlias(d) => self.visit_type_alias(d, pass),
            Decl::OneOf(d) => self.visit_oneof(d, pass),
            Decl::OneOfElement(d) => self.visit_oneof_element(d, pass),
            Decl::Struct(d) => self.visit_struct(d, pass),
            Decl::Class(d) => self.visit_class(d, pass),
            Decl::Protocol(d) => self.visit_protocol(d, pass),
            Decl::Extension(d) => self.visit_extension(d, pass),
            Decl::TopLevelCode(_) => {
                unreachable!("top-level code is routed to the statement checker")
            }
        }
    }

    fn visit_pattern_binding(&mut self, decl: &mut PatternBindingDecl, pass: Pass) {
        let delay_checking_pattern =
            self.tu_kind != TranslationUnitKind::Library && decl.context.is_module();

        if pass.second && !delay_checking_pattern {
            if decl.init.is_some() && decl.pattern.ty.is_some() {
                let dest = decl.pattern.ty;
                let init = decl.init.as_mut().expect("checked above");
                if self.check_expr(init, dest) {
                    let dest = self.display(dest.expect("checked above"));
                    self.add_error(
                        SemanticError::InitializerConversion {
                            dest,
                            span: decl.span.into(),
                        },
                        decl.span,
                    );
                }
                // On success the elaborated initializer stays in place.
            }
            return;
        }

        if decl.init.is_some() && !pass.first {
            let mut dest: Option<TypeId> = None;
            if matches!(decl.pattern.kind, PatternKind::Typed { .. }) {
                if self.check_pattern(&mut decl.pattern, false) {
                    return;
                }
                dest = decl.pattern.ty;
            }
            let init = decl.init.as_mut().expect("checked above");
            if self.check_expr(init, dest) {
                if let Some(dest) = dest {
                    let dest = self.display(dest);
                    self.add_error(
                        SemanticError::InitializerConversion {
                            dest,
                            span: decl.span.into(),
                        },
                        decl.span,
                    );
                }
                return;
            }
            if dest.is_none() {
                convert_to_materializable(init, &self.arena);
                let init_ty = init.ty.unwrap_or(TypeId::ERROR);
                if self.coerce_pattern(&mut decl.pattern, init_ty, false) {
                    return;
                }
            }
        } else if !pass.first || !delay_checking_pattern {
            if self.check_pattern(&mut decl.pattern, pass.first) {
                return;
            }
        }

        self.visit_bound_vars(&mut decl.pattern);
    }

    /// Validate every var a checked pattern binds: its type must be
    /// materializable, and its attributes must hold up.
    pub(crate) fn visit_bound_vars(&mut self, pattern: &mut Pattern) {
        match &mut pattern.kind {
            PatternKind::Tuple(fields) => {
                for field in fields {
                    self.visit_bound_vars(&mut field.pattern);
                }
            }
            PatternKind::Paren(sub) | PatternKind::Typed { sub, .. } => self.visit_bound_vars(sub),
            PatternKind::Named(var) => {
                // A delayed binding's vars have no type yet; the second pass
                // comes back for them.
                let Some(ty) = var.ty else { return };

                if self.arena.contains_reference(ty) {
                    let found = self.display(ty);
                    self.add_error(
                        SemanticError::VarTypeNotMaterializable {
                            found,
                            span: var.span.into(),
                        },
                        var.span,
                    );
                    var.ty = Some(TypeId::ERROR);
                }

                let ty = var.ty.expect("set above");
                self.validate_attributes(ValueDeclView {
                    name: Some(var.name),
                    is_func: false,
                    is_instance_member: var.context.is_type(),
                    ty,
                    attrs: &mut var.attrs,
                    context: var.context,
                    span: var.span,
                });
            }
            PatternKind::Any => {}
        }
    }

    fn visit_subscript(&mut self, decl: &mut SubscriptDecl, pass: Pass) {
        if pass.second {
            return;
        }

        // The getter and setter are type-checked separately.
        if !decl.context.is_type() {
            self.add_error(
                SemanticError::SubscriptNotMember {
                    span: decl.span.into(),
                },
                decl.span,
            );
        }

        self.validate_loc(&mut decl.element, pass.first);

        if self.check_pattern(&mut decl.indices, pass.first) {
            decl.ty = Some(TypeId::ERROR);
        } else {
            let input = decl.indices.ty.expect("checked pattern has a type");
            let element = decl.element.ty.unwrap_or(TypeId::ERROR);
            decl.ty = Some(self.arena.function(input, element));
        }
    }

    fn visit_type_alias(&mut self, decl: &mut TypeAliasDecl, pass: Pass) {
        if !pass.second {
            // Associated types had their archetype installed by the protocol
            // visitor; validation is a no-op for them.
            if self.validate_loc(&mut decl.underlying, pass.first) {
                decl.ty = Some(TypeId::ERROR);
            } else {
                let underlying = decl.underlying.ty.expect("validated loc has a type");
                decl.ty = Some(underlying);
                if let Some(def) = decl.def {
                    self.registry.set_alias_target(def, underlying);
                }
            }
            if decl.context != DeclContext::Protocol {
                self.check_inherited(&mut decl.inherited, pass);
            }
        }

        if !pass.first {
            let aliased = decl.underlying.ty.unwrap_or(TypeId::ERROR);
            self.check_explicit_conformance(decl.span, aliased, &decl.inherited);
        }
    }

    fn visit_oneof(&mut self, decl: &mut OneOfDecl, pass: Pass) {
        if !pass.second {
            self.check_inherited(&mut decl.inherited, pass);
            self.record_conformances(decl.def, &decl.inherited);
            self.check_generic_params(decl.generic_params.as_mut(), pass);
        }

        let declared_ty = decl.ty.unwrap_or(TypeId::ERROR);
        let pushed = self.push_scope_for(decl.generic_params.as_ref());
        self.containers.push(ContainerCtx {
            def: decl.def,
            declared_ty,
        });
        for member in &mut decl.members {
            self.visit_decl(member, pass);
        }
        if !pass.second {
            self.record_members(decl.def, &decl.members);
        }
        self.containers.pop();
        self.pop_scope(pushed);

        if !pass.first {
            self.check_explicit_conformance(decl.span, declared_ty, &decl.inherited);
        }
    }

    fn visit_struct(&mut self, decl: &mut StructDecl, pass: Pass) {
        if !pass.second {
            self.check_inherited(&mut decl.inherited, pass);
            self.record_conformances(decl.def, &decl.inherited);
            self.check_generic_params(decl.generic_params.as_mut(), pass);
        }

        let declared_ty = decl.ty.unwrap_or(TypeId::ERROR);
        let pushed = self.push_scope_for(decl.generic_params.as_ref());
        self.containers.push(ContainerCtx {
            def: decl.def,
            declared_ty,
        });
        for member in &mut decl.members {
            self.visit_decl(member, pass);
        }

        if !pass.second {
            // The implied elementwise constructor: the stored fields, in
            // source order, labeled after their vars.
            let mut fields = Vec::new();
            for member in &decl.members {
                match member {
                    Decl::PatternBinding(binding) => {
                        collect_stored_vars(&binding.pattern, &mut fields);
                    }
                    Decl::Var(var) if !var.is_property => {
                        fields.push(TupleField::new(
                            Some(var.name),
                            var.ty.unwrap_or(TypeId::ERROR),
                        ));
                    }
                    _ => {}
                }
            }
            let input = self.arena.tuple(fields);
            let ctor_ty = self.arena.function(input, declared_ty);
            let ctor = decl.members.iter_mut().find_map(|m| match m {
                Decl::OneOfElement(element) if element.is_implicit => Some(element),
                _ => None,
            });
            if let Some(ctor) = ctor
                && ctor.ty.is_none()
            {
                ctor.ty = Some(ctor_ty);
                ctor.argument = Some(TypeLoc::resolved(input));
            }

            self.record_members(decl.def, &decl.members);
        }

        self.containers.pop();
        self.pop_scope(pushed);

        if !pass.first {
            self.check_explicit_conformance(decl.span, declared_ty, &decl.inherited);
        }
    }

    fn visit_class(&mut self, decl: &mut ClassDecl, pass: Pass) {
        if !pass.second {
            self.check_inherited(&mut decl.inherited, pass);
            self.record_conformances(decl.def, &decl.inherited);
            self.check_generic_params(decl.generic_params.as_mut(), pass);
        }

        let declared_ty = decl.ty.unwrap_or(TypeId::ERROR);
        let pushed = self.push_scope_for(decl.generic_params.as_ref());
        self.containers.push(ContainerCtx {
            def: decl.def,
            declared_ty,
        });
        for member in &mut decl.members {
            self.visit_decl(member, pass);
        }
        if !pass.second {
            self.record_members(decl.def, &decl.members);
        }
        self.containers.pop();
        self.pop_scope(pushed);

        if !pass.first {
            self.check_explicit_conformance(decl.span, declared_ty, &decl.inherited);
        }
    }

    fn visit_protocol(&mut self, decl: &mut ProtocolDecl, pass: Pass) {
        if pass.second {
            return;
        }

        self.check_inherited(&mut decl.inherited, pass);

        // Give every associated type an archetype before member checking, so
        // the alias declarations validate against it. An alias named `This`
        // stands for the conforming type itself and takes position zero.
        for member in &mut decl.members {
            let Decl::TypeAlias(alias) = member else {
                continue;
            };
            self.check_inherited(&mut alias.inherited, pass);
            let mut protocols = ProtocolVec::new();
            for loc in &alias.inherited {
                let Some(ty) = loc.ty else { continue };
                if let Some(inherited) = self.arena.existential_protocols(ty) {
                    for &p in inherited {
                        if !protocols.contains(&p) {
                            protocols.push(p);
                        }
                    }
                }
            }
            let index = (self.interner.resolve(alias.name) == "This").then_some(0);
            let archetype = self.arena.archetype(alias.name, protocols, index);
            alias.underlying = TypeLoc::resolved(archetype);
        }

        let declared_ty = decl.ty.unwrap_or(TypeId::ERROR);
        self.containers.push(ContainerCtx {
            def: decl.def,
            declared_ty,
        });
        for member in &mut decl.members {
            self.visit_decl(member, pass);
        }
        self.record_members(decl.def, &decl.members);
        self.containers.pop();
    }

    fn visit_func(&mut self, decl: &mut FuncDecl, pass: Pass) {
        if pass.second {
            return;
        }

        // Before anything else, set up the receiver so the signature folds
        // over its type.
        let is_instance = decl.context.is_type() && !decl.is_static;
        if is_instance {
            let this_ty = self.this_type();
            if let Some(first) = decl.body.params.first_mut() {
                seed_this_pattern(first, this_ty);
            }
        }

        self.check_generic_params(decl.generic_params.as_mut(), pass);
        let pushed = self.push_scope_for(decl.generic_params.as_ref());
        self.elaborate_func(&mut decl.body, pass.first);
        let mut ty = decl.body.ty.unwrap_or(TypeId::ERROR);
        if let Some(list) = &decl.generic_params
            && let Some((input, result)) = self.arena.as_function(ty)
        {
            let params = archetypes_of(list);
            ty = self
                .arena
                .polymorphic(input, result, params.into_iter().collect());
        }
        decl.ty = Some(ty);
        self.pop_scope(pushed);

        self.validate_attributes(ValueDeclView {
            name: Some(decl.name),
            is_func: true,
            is_instance_member: is_instance,
            ty,
            attrs: &mut decl.attrs,
            context: decl.context,
            span: decl.span,
        });
    }

    fn visit_oneof_element(&mut self, decl: &mut OneOfElementDecl, pass: Pass) {
        if pass.second {
            return;
        }

        // A struct's synthesized element constructor is typed by the struct
        // visitor; only real oneof cases are handled here.
        if decl.context != DeclContext::OneOf {
            return;
        }
        let element_ty = self.this_type();

        let Some(argument) = &mut decl.argument else {
            decl.ty = Some(element_ty);
            return;
        };

        // A case with a payload: validate it, then compute a function type.
        if self.validate_loc(argument, pass.first) {
            decl.ty = Some(TypeId::ERROR);
            return;
        }
        let payload = argument.ty.expect("validated loc has a type");
        decl.ty = Some(self.arena.function(payload, element_ty));

        // Require the carried type to be materializable.
        if !self.arena.is_materializable(payload) {
            let found = self.display(payload);
            self.add_error(
                SemanticError::PayloadNotMaterializable {
                    found,
                    span: decl.span.into(),
                },
                decl.span,
            );
        }
    }

    fn visit_extension(&mut self, decl: &mut ExtensionDecl, pass: Pass) {
        if !pass.second {
            self.validate_loc(&mut decl.extended, pass.first);

            let extended_ty = decl.extended.ty.unwrap_or(TypeId::ERROR);
            if !self.arena.is_extendable(extended_ty) {
                let found = self.display(extended_ty);
                if self.arena.is_existential(extended_ty) {
                    self.add_error(
                        SemanticError::ProtocolExtension {
                            found,
                            span: decl.span.into(),
                        },
                        decl.span,
                    );
                } else {
                    self.add_error(
                        SemanticError::NonNominalExtension {
                            found,
                            span: decl.span.into(),
                        },
                        decl.span,
                    );
                }
            }

            self.check_inherited(&mut decl.inherited, pass);
            let def = self.type_def_of(extended_ty);
            self.record_conformances(def, &decl.inherited);
        }

        let extended_ty = decl.extended.ty.unwrap_or(TypeId::ERROR);
        let def = self.type_def_of(extended_ty);
        // Members see the extended type itself, not the unbound reference.
        let declared_ty = def
            .map(|d| self.registry.get(d).declared_ty)
            .unwrap_or(extended_ty);
        self.containers.push(ContainerCtx { def, declared_ty });
        for member in &mut decl.members {
            self.visit_decl(member, pass);
        }
        if !pass.second {
            self.record_members(def, &decl.members);
        }
        self.containers.pop();

        if !pass.first {
            self.check_explicit_conformance(decl.span, extended_ty, &decl.inherited);
        }
    }

    fn visit_constructor(&mut self, decl: &mut ConstructorDecl, pass: Pass) {
        if pass.second {
            return;
        }

        if !decl.context.is_type() {
            self.add_error(
                SemanticError::ConstructorNotMember {
                    span: decl.span.into(),
                },
                decl.span,
            );
        }

        self.check_generic_params(decl.generic_params.as_mut(), pass);
        let pushed = self.push_scope_for(decl.generic_params.as_ref());

        let this_ty = self.this_type();
        decl.implicit_this.ty = Some(this_ty);

        if self.check_pattern(&mut decl.arguments, pass.first) {
            decl.ty = Some(TypeId::ERROR);
        } else {
            let input = decl.arguments.ty.expect("checked pattern has a type");
            let ty = match &decl.generic_params {
                Some(list) => {
                    let params = archetypes_of(list);
                    self.arena
                        .polymorphic(input, this_ty, params.into_iter().collect())
                }
                None => self.arena.function(input, this_ty),
            };
            decl.ty = Some(ty);
        }
        self.pop_scope(pushed);

        self.validate_attributes(ValueDeclView {
            name: None,
            is_func: false,
            is_instance_member: false,
            ty: decl.ty.expect("set above"),
            attrs: &mut decl.attrs,
            context: decl.context,
            span: decl.span,
        });
    }

    fn visit_destructor(&mut self, decl: &mut DestructorDecl, pass: Pass) {
        if pass.second {
            return;
        }

        if decl.context != DeclContext::Class {
            self.add_error(
                SemanticError::DestructorNotClassMember {
                    span: decl.span.into(),
                },
                decl.span,
            );
        }

        let this_ty = self.this_type();
        let unit = self.arena.unit();
        let ty = self.arena.function(this_ty, unit);
        decl.ty = Some(ty);
        decl.implicit_this.ty = Some(this_ty);

        self.validate_attributes(ValueDeclView {
            name: None,
            is_func: false,
            is_instance_member: false,
            ty,
            attrs: &mut decl.attrs,
            context: decl.context,
            span: decl.span,
        });
    }

    /// Record a container's value members on its registry entry for the
    /// conformance oracle. Synthesized members stay out of the record.
    fn record_members(&mut self, def: Option<TypeDefId>, members: &[Decl]) {
        let Some(def) = def else { return };
        let mut recorded: Vec<(Symbol, TypeId)> = Vec::new();
        for member in members {
            match member {
                Decl::Func(func) => {
                    if let Some(ty) = func.ty {
                        recorded.push((func.name, ty));
                    }
                }
                Decl::Var(var) => {
                    if let Some(ty) = var.ty {
                        recorded.push((var.name, ty));
                    }
                }
                Decl::OneOfElement(element) if !element.is_implicit => {
                    if let Some(ty) = element.ty {
                        recorded.push((element.name, ty));
                    }
                }
                Decl::PatternBinding(binding) => {
                    collect_bound_members(&binding.pattern, &mut recorded);
                }
                _ => {}
            }
        }
        for (name, ty) in recorded {
            if self.registry.member_named(def, name).is_none() {
                self.registry.record_member(def, name, ty);
            }
        }
    }
}
