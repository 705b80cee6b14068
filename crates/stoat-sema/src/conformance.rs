// conformance.rs
//
// Inheritance-clause validation and protocol conformance checking. The
// inheritance clause is taken verbatim: superprotocol conformance is a
// downstream concern, and nothing here is transitive.

use stoat_frontend::{Span, TypeLoc};
use stoat_identity::{TypeDefId, TypeId};

use crate::checker::{Checker, Pass};
use crate::errors::SemanticError;
use crate::type_arena::{ProtocolVec, SemaType};

enum Subject {
    /// Poisoned types absorb conformance checks silently.
    Poisoned,
    /// Conformance is settled by the type's own protocol list.
    Settled(bool),
    /// A nominal definition whose recorded members answer the question.
    Members(TypeDefId),
    Never,
}

impl Checker<'_> {
    /// Validate each type in an inheritance clause. Every type that resolves
    /// must be an existential; anything else is diagnosed and left in place.
    pub(crate) fn check_inherited(&mut self, inherited: &mut [TypeLoc], pass: Pass) {
        for loc in inherited.iter_mut() {
            if self.validate_loc(loc, pass.first) {
                continue;
            }

            let ty = loc.ty.expect("validated loc has a type");
            if !self.arena.is_existential(ty) && !ty.is_error() {
                let found = self.display(ty);
                self.add_error(
                    SemanticError::NonProtocolInheritance {
                        found,
                        span: loc.span.into(),
                    },
                    loc.span,
                );
            }
        }
    }

    /// Record the protocols a declaration claims through its inheritance
    /// clause on its registry entry.
    pub(crate) fn record_conformances(&mut self, def: Option<TypeDefId>, inherited: &[TypeLoc]) {
        let Some(def) = def else { return };
        let mut claimed = ProtocolVec::new();
        for loc in inherited {
            let Some(ty) = loc.ty else { continue };
            if let Some(protocols) = self.arena.existential_protocols(ty) {
                claimed.extend_from_slice(protocols);
            }
        }
        for protocol in claimed {
            self.registry.add_conformance(def, protocol);
        }
    }

    /// Second-pass verification that `ty` actually satisfies every protocol
    /// in its inheritance clause. Non-existential entries were diagnosed in
    /// the first pass and are skipped here.
    pub(crate) fn check_explicit_conformance(
        &mut self,
        decl_span: Span,
        ty: TypeId,
        inherited: &[TypeLoc],
    ) {
        for loc in inherited {
            let Some(inherited_ty) = loc.ty else { continue };
            let protocols: ProtocolVec = match self.arena.existential_protocols(inherited_ty) {
                Some(protocols) => protocols.iter().copied().collect(),
                None => continue,
            };
            for protocol in protocols {
                self.conforms_to_protocol(ty, protocol, decl_span);
            }
        }
    }

    /// The conformance oracle: a registry-backed witness check. Every member
    /// requirement recorded for the protocol must have a same-named member on
    /// the conforming type. Witness type matching after receiver substitution
    /// is the expression checker's concern.
    pub(crate) fn conforms_to_protocol(
        &mut self,
        ty: TypeId,
        protocol: TypeDefId,
        span: Span,
    ) -> bool {
        let subject = match self.arena.get(ty) {
            SemaType::Error => Subject::Poisoned,
            SemaType::Nominal { def, .. } | SemaType::UnboundGeneric { def } => {
                Subject::Members(*def)
            }
            SemaType::Archetype { protocols, .. } | SemaType::Protocol { protocols } => {
                Subject::Settled(protocols.contains(&protocol))
            }
            _ => Subject::Never,
        };

        match subject {
            Subject::Poisoned | Subject::Settled(true) => true,
            Subject::Settled(false) | Subject::Never => {
                let ty = self.display(ty);
                let protocol = self.protocol_name(protocol);
                self.add_error(
                    SemanticError::DoesNotConform {
                        ty,
                        protocol,
                        span: span.into(),
                    },
                    span,
                );
                false
            }
            Subject::Members(def) => {
                let missing: Vec<_> = self
                    .registry
                    .get(protocol)
                    .members
                    .iter()
                    .filter(|req| self.registry.member_named(def, req.name).is_none())
                    .map(|req| req.name)
                    .collect();
                if missing.is_empty() {
                    return true;
                }
                let ty = self.display(ty);
                let protocol = self.protocol_name(protocol);
                for member in missing {
                    let member = self.interner.resolve(member).to_string();
                    self.add_error(
                        SemanticError::MissingWitness {
                            ty: ty.clone(),
                            protocol: protocol.clone(),
                            member,
                            span: span.into(),
                        },
                        span,
                    );
                }
                false
            }
        }
    }

    fn protocol_name(&self, protocol: TypeDefId) -> String {
        self.interner
            .resolve(self.registry.get(protocol).name)
            .to_string()
    }
}
