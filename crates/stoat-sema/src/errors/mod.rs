// errors/mod.rs
//! Declaration checking errors (E2xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("unknown type '{name}'")]
    #[diagnostic(code(E2001))]
    UnknownType {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("type alias '{name}' used before its underlying type is known")]
    #[diagnostic(code(E2002))]
    UnresolvedTypeAlias {
        name: String,
        #[label("alias not yet resolved")]
        span: SourceSpan,
    },

    #[error("inheritance from non-protocol type {found}")]
    #[diagnostic(code(E2003))]
    NonProtocolInheritance {
        found: String,
        #[label("not a protocol")]
        span: SourceSpan,
    },

    #[error("{found} is not a protocol and cannot appear in a composition")]
    #[diagnostic(code(E2004))]
    NonProtocolComposition {
        found: String,
        #[label("not a protocol")]
        span: SourceSpan,
    },

    #[error("requirement constrains '{subject}' to {found}, which is not a protocol")]
    #[diagnostic(code(E2005))]
    RequirementNonProtocol {
        subject: String,
        found: String,
        #[label("not a protocol")]
        span: SourceSpan,
    },

    #[error("conformance requirement subject {found} is not a generic parameter")]
    #[diagnostic(code(E2006))]
    RequirementSubjectNotGeneric {
        found: String,
        #[label("expected a generic parameter")]
        span: SourceSpan,
    },

    #[error("operators must be declared with 'func'")]
    #[diagnostic(code(E2007))]
    OperatorNotFunc {
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("operators must take one or two arguments")]
    #[diagnostic(code(E2008))]
    InvalidOperatorArgCount {
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("the unary operator '&' is reserved and cannot be overloaded")]
    #[diagnostic(code(E2009))]
    ReservedAddressOfOperator {
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("'infix' requires an operator function")]
    #[diagnostic(code(E2010))]
    InfixNotOperator {
        #[label("not an operator")]
        span: SourceSpan,
    },

    #[error("'infix' requires a function with two arguments")]
    #[diagnostic(code(E2011))]
    InfixNotBinary {
        #[label("not a binary operator")]
        span: SourceSpan,
    },

    #[error("'postfix' requires an operator function")]
    #[diagnostic(code(E2012))]
    PostfixNotOperator {
        #[label("not an operator")]
        span: SourceSpan,
    },

    #[error("'postfix' requires a function with one argument")]
    #[diagnostic(code(E2013))]
    PostfixNotUnary {
        #[label("not a unary operator")]
        span: SourceSpan,
    },

    #[error("'{name}' attribute is not valid on this declaration")]
    #[diagnostic(code(E2014))]
    InvalidDeclAttribute {
        name: &'static str,
        #[label("attribute ignored")]
        span: SourceSpan,
    },

    #[error("assignment operator must take its first argument by reference")]
    #[diagnostic(code(E2015))]
    AssignmentFirstArgNotReference {
        #[label("first argument is not a reference")]
        span: SourceSpan,
    },

    #[error("assignment operator must return (), found {found}")]
    #[diagnostic(code(E2016))]
    AssignmentNonVoidResult {
        found: String,
        #[label("non-void result")]
        span: SourceSpan,
    },

    #[error("'conversion' requires an instance method")]
    #[diagnostic(code(E2017))]
    ConversionNotInstanceMethod {
        #[label("not an instance method")]
        span: SourceSpan,
    },

    #[error("conversion function cannot require parameters")]
    #[diagnostic(
        code(E2018),
        help("give every parameter a default value, or take none")
    )]
    ConversionTakesParameters {
        #[label("requires parameters")]
        span: SourceSpan,
    },

    #[error("binary operator has no matching infix declaration")]
    #[diagnostic(
        code(E2019),
        help("declare the operator infix, or import a module that does")
    )]
    NoInfixDeclaration {
        #[label("no infix declaration found")]
        span: SourceSpan,
    },

    #[error("subscripts may only be declared inside a type")]
    #[diagnostic(code(E2020))]
    SubscriptNotMember {
        #[label("not inside a type")]
        span: SourceSpan,
    },

    #[error("constructors may only be declared inside a type")]
    #[diagnostic(code(E2021))]
    ConstructorNotMember {
        #[label("not inside a type")]
        span: SourceSpan,
    },

    #[error("destructors may only be declared inside a class")]
    #[diagnostic(code(E2022))]
    DestructorNotClassMember {
        #[label("not inside a class")]
        span: SourceSpan,
    },

    #[error("protocol {found} cannot be extended")]
    #[diagnostic(code(E2023))]
    ProtocolExtension {
        found: String,
        #[label("protocols cannot be extended")]
        span: SourceSpan,
    },

    #[error("non-nominal type {found} cannot be extended")]
    #[diagnostic(code(E2024))]
    NonNominalExtension {
        found: String,
        #[label("not a nominal type")]
        span: SourceSpan,
    },

    #[error("variable has non-materializable type {found}")]
    #[diagnostic(code(E2025))]
    VarTypeNotMaterializable {
        found: String,
        #[label("cannot be stored")]
        span: SourceSpan,
    },

    #[error("case payload type {found} is not materializable")]
    #[diagnostic(code(E2026))]
    PayloadNotMaterializable {
        found: String,
        #[label("cannot be stored")]
        span: SourceSpan,
    },

    #[error("cannot convert initializer to type {dest}")]
    #[diagnostic(code(E2027))]
    InitializerConversion {
        dest: String,
        #[label("initializer has the wrong type")]
        span: SourceSpan,
    },

    #[error("cannot infer a type for this pattern")]
    #[diagnostic(code(E2028), help("add a type annotation"))]
    CannotInferPatternType {
        #[label("no type information")]
        span: SourceSpan,
    },

    #[error("pattern type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(E2029))]
    PatternTypeMismatch {
        expected: String,
        found: String,
        #[label("pattern doesn't match")]
        span: SourceSpan,
    },

    #[error("tuple pattern has {found} elements, but the value has {expected}")]
    #[diagnostic(code(E2030))]
    TuplePatternArityMismatch {
        expected: usize,
        found: usize,
        #[label("wrong number of elements")]
        span: SourceSpan,
    },

    #[error("type {ty} does not conform to protocol {protocol}: missing member '{member}'")]
    #[diagnostic(code(E2031))]
    MissingWitness {
        ty: String,
        protocol: String,
        member: String,
        #[label("conformance declared here")]
        span: SourceSpan,
    },

    #[error("type {ty} cannot conform to protocol {protocol}")]
    #[diagnostic(code(E2032))]
    DoesNotConform {
        ty: String,
        protocol: String,
        #[label("conformance declared here")]
        span: SourceSpan,
    },
}
