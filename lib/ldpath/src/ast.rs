//! The syntax tree of a parsed path-query program.

use rdf_transform_model::{Literal, NamedNode, Term};

/// A parsed path-query program.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// A test the topic must pass for any field to be evaluated.
    pub filter: Option<NodeTest>,
    /// The fields in declaration order.
    pub fields: Vec<FieldMapping>,
}

/// `name = selector :: type ;`
#[derive(Clone, Debug, PartialEq)]
pub struct FieldMapping {
    pub name: String,
    pub selector: Selector,
    pub field_type: Option<FieldType>,
}

/// Selects a list of nodes starting from a context node.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    /// `.`
    SelfNode,
    /// `*`: the objects of all outgoing triples.
    Wildcard,
    /// The objects of the outgoing triples with the given predicate.
    Property(NamedNode),
    /// `^p`: the subjects of the incoming triples with the given predicate.
    ReverseProperty(NamedNode),
    /// `^*`: the subjects of all incoming triples.
    ReverseWildcard,
    /// `a / b`
    Path(Box<Selector>, Box<Selector>),
    /// `a | b`
    Union(Box<Selector>, Box<Selector>),
    /// `a & b`
    Intersection(Box<Selector>, Box<Selector>),
    /// `(a)+` and `(a)*`. Nodes reachable in at least `min` steps.
    Recursive { inner: Box<Selector>, min: usize },
    /// `a[test]`
    Tested(Box<Selector>, NodeTest),
    /// A constant string.
    Literal(Literal),
    /// `fn:name(args)`
    Function(Function, Vec<Selector>),
}

/// A predicate over a single node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeTest {
    Not(Box<NodeTest>),
    And(Box<NodeTest>, Box<NodeTest>),
    Or(Box<NodeTest>, Box<NodeTest>),
    /// `@en` or, for `None`, `@none`.
    Language(Option<String>),
    /// `^^xsd:int`
    Datatype(NamedNode),
    /// `is-a type`
    IsA(Term),
    /// `selector is node`
    PathValue(Selector, Term),
    /// `selector`: the selector yields at least one node.
    PathExists(Selector),
}

/// The built-in function library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Concat,
    First,
    Last,
    Count,
    Str,
}

impl Function {
    pub(crate) fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "concat" => Some(Self::Concat),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "count" => Some(Self::Count),
            "str" => Some(Self::Str),
            _ => None,
        }
    }
}

/// The conversion applied to the values of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Double,
    Boolean,
    Uri,
    /// Date and time types, kept as their lexical form.
    Temporal,
}
