// attrs.rs
//
// Structural attribute rules for value declarations, applied after the
// declaration's type is computed. Each rule is independent: a violation
// neutralises only the offending flag and checking continues.

use stoat_frontend::{DeclAttributes, DeclContext, Span, Symbol, is_operator_name};
use stoat_identity::TypeId;

use crate::checker::Checker;
use crate::errors::SemanticError;

/// The slice of a declaration the attribute validator operates on. Funcs,
/// vars, constructors, and destructors all present themselves through this.
pub(crate) struct ValueDeclView<'d> {
    /// `None` for unnamed declarations (constructors, destructors).
    pub name: Option<Symbol>,
    pub is_func: bool,
    pub is_instance_member: bool,
    pub ty: TypeId,
    pub attrs: &'d mut DeclAttributes,
    pub context: DeclContext,
    pub span: Span,
}

impl Checker<'_> {
    pub(crate) fn validate_attributes(&mut self, view: ValueDeclView<'_>) {
        let ValueDeclView {
            name,
            is_func,
            is_instance_member,
            ty,
            attrs,
            context,
            span,
        } = view;

        // Lexical argument count: the arity of the function's input tuple.
        // None when the type is not a function or takes a non-tuple input
        // (the receiver clause of instance methods).
        let num_args = self
            .arena
            .as_function(ty)
            .and_then(|(input, _)| self.arena.tuple_fields(input).map(<[_]>::len));

        let is_operator = name.is_some_and(|n| is_operator_name(self.interner.resolve(n)));

        // Operators must be declared with 'func', not 'var'.
        if is_operator {
            if !is_func {
                self.add_error(SemanticError::OperatorNotFunc { span: span.into() }, span);
                return;
            }

            if num_args == Some(0) || num_args.is_some_and(|n| n > 2) {
                self.add_error(
                    SemanticError::InvalidOperatorArgCount { span: span.into() },
                    span,
                );
                attrs.infix = None;
                return;
            }

            // The unary operator '&' cannot be overloaded. In an expression
            // the parser never interprets it as a normal unary operator
            // anyway.
            if num_args == Some(1)
                && let Some(name) = name
                && self.interner.resolve(name) == "&"
            {
                self.add_error(
                    SemanticError::ReservedAddressOfOperator { span: span.into() },
                    span,
                );
                return;
            }
        }

        if attrs.is_infix() {
            // Only operator functions can be infix.
            if !is_operator {
                self.add_error(SemanticError::InfixNotOperator { span: span.into() }, span);
                attrs.infix = None;
                return;
            }

            // Only binary operators can be infix.
            if num_args != Some(2) {
                self.add_error(SemanticError::InfixNotBinary { span: span.into() }, span);
                attrs.infix = None;
                return;
            }
        }

        if attrs.postfix {
            if !is_operator {
                self.add_error(
                    SemanticError::PostfixNotOperator { span: span.into() },
                    span,
                );
                attrs.postfix = false;
                return;
            }

            if num_args != Some(1) {
                self.add_error(SemanticError::PostfixNotUnary { span: span.into() }, span);
                attrs.postfix = false;
                return;
            }
        }

        if attrs.assignment {
            // Only operator functions can be assignments.
            if !is_func || !is_operator {
                self.add_error(
                    SemanticError::InvalidDeclAttribute {
                        name: "assignment",
                        span: span.into(),
                    },
                    span,
                );
                attrs.assignment = false;
            } else if num_args.is_none_or(|n| n < 1) {
                self.add_error(
                    SemanticError::AssignmentFirstArgNotReference { span: span.into() },
                    span,
                );
                attrs.assignment = false;
            } else {
                let (input, result) = self
                    .arena
                    .as_function(ty)
                    .expect("operator functions have function type");
                let first = self
                    .arena
                    .tuple_fields(input)
                    .map(|fields| fields[0].ty)
                    .unwrap_or(input);

                if !self.arena.is_lvalue(first) {
                    self.add_error(
                        SemanticError::AssignmentFirstArgNotReference { span: span.into() },
                        span,
                    );
                    attrs.assignment = false;
                } else if !self.arena.is_empty_tuple(result) {
                    // Diagnosed, but the attribute stands.
                    let found = self.display(result);
                    self.add_error(
                        SemanticError::AssignmentNonVoidResult {
                            found,
                            span: span.into(),
                        },
                        span,
                    );
                }
            }
        }

        if attrs.conversion {
            // Only instance members whose bound-method type accepts the empty
            // parameter list can be conversions.
            if !is_func || !is_instance_member {
                self.add_error(
                    SemanticError::ConversionNotInstanceMethod { span: span.into() },
                    span,
                );
                attrs.conversion = false;
            } else if !ty.is_error() {
                let bound_method = self
                    .arena
                    .as_function(ty)
                    .and_then(|(_, result)| self.arena.as_function(result));
                let accepts_empty_params = bound_method
                    .and_then(|(input, _)| self.arena.tuple_fields(input))
                    .is_some_and(|fields| fields.iter().all(|f| f.has_default));

                if !accepts_empty_params {
                    self.add_error(
                        SemanticError::ConversionTakesParameters { span: span.into() },
                        span,
                    );
                    attrs.conversion = false;
                }
            }
        }

        // A binary operator lacking fixity inherits it from an earlier
        // operator of the same name: this translation unit's declarations in
        // source order first, then the imported modules in import order.
        // First hit wins across the whole scan.
        if is_operator && attrs.infix.is_none() && num_args != Some(1) {
            let name = name.expect("operators are named");
            if context.is_module() {
                if let Some(&data) = self.tu_operators.get(&name) {
                    attrs.infix = Some(data);
                } else {
                    for module in self.imports {
                        let found = module.lookup_value(name).find_map(|v| v.attrs.infix);
                        if let Some(data) = found {
                            attrs.infix = Some(data);
                            break;
                        }
                    }
                }
            }

            if attrs.infix.is_none() {
                self.add_error(SemanticError::NoInfixDeclaration { span: span.into() }, span);
            }
        }

        if attrs.byref {
            self.add_error(
                SemanticError::InvalidDeclAttribute {
                    name: "byref",
                    span: span.into(),
                },
                span,
            );
            attrs.byref = false;
        }

        if attrs.auto_closure {
            self.add_error(
                SemanticError::InvalidDeclAttribute {
                    name: "auto_closure",
                    span: span.into(),
                },
                span,
            );
            attrs.auto_closure = false;
        }

        // Keep the translation unit's operator table current so later
        // same-name operators can inherit this one's fixity.
        if context.is_module()
            && is_operator
            && let Some(name) = name
            && let Some(data) = attrs.infix
        {
            self.tu_operators.entry(name).or_insert(data);
        }
    }
}
