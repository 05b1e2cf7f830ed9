//! Typed views of RDF terms, used for comparisons and the effective boolean value.

use crate::error::{ThinError, ThinResult};
use crate::numeric::Numeric;
use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use oxsdatatypes::{Date, DateTime};
use std::cmp::Ordering;
use std::str::FromStr;

/// A term interpreted according to its datatype.
#[derive(Debug)]
pub(crate) enum TypedValue<'a> {
    Iri(&'a NamedNode),
    Blank(&'a BlankNode),
    SimpleString(&'a str),
    LangString { value: &'a str, language: &'a str },
    Boolean(bool),
    Numeric(Numeric),
    DateTime(DateTime),
    Date(Date),
    /// A literal with an unsupported datatype or an invalid lexical form.
    Other(&'a Literal),
}

impl<'a> TypedValue<'a> {
    pub(crate) fn from_term(term: &'a Term) -> Self {
        match term {
            Term::NamedNode(node) => Self::Iri(node),
            Term::BlankNode(node) => Self::Blank(node),
            Term::Literal(literal) => Self::from_literal(literal),
        }
    }

    pub(crate) fn from_literal(literal: &'a Literal) -> Self {
        if let Some(language) = literal.language() {
            return Self::LangString {
                value: literal.value(),
                language,
            };
        }

        let value = literal.value();
        match literal.datatype() {
            xsd::STRING => Self::SimpleString(value),
            xsd::BOOLEAN => match value {
                "true" | "1" => Self::Boolean(true),
                "false" | "0" => Self::Boolean(false),
                _ => Self::Other(literal),
            },
            xsd::DATE_TIME => DateTime::from_str(value).map_or(Self::Other(literal), Self::DateTime),
            xsd::DATE => Date::from_str(value).map_or(Self::Other(literal), Self::Date),
            datatype if Numeric::is_numeric_datatype(datatype) => {
                Numeric::from_literal(literal).map_or(Self::Other(literal), Self::Numeric)
            }
            _ => Self::Other(literal),
        }
    }

    fn is_literal(&self) -> bool {
        !matches!(self, Self::Iri(_) | Self::Blank(_))
    }
}

/// The `=` operator (RDFterm-equal extended to the supported datatypes).
pub(crate) fn equals(lhs: &Term, rhs: &Term) -> ThinResult<bool> {
    if lhs == rhs {
        return Ok(true);
    }

    let lhs = TypedValue::from_term(lhs);
    let rhs = TypedValue::from_term(rhs);
    let result = match (&lhs, &rhs) {
        (TypedValue::Numeric(lhs), TypedValue::Numeric(rhs)) => lhs == rhs,
        (TypedValue::SimpleString(lhs), TypedValue::SimpleString(rhs)) => lhs == rhs,
        (
            TypedValue::LangString {
                value: lhs,
                language: lhs_language,
            },
            TypedValue::LangString {
                value: rhs,
                language: rhs_language,
            },
        ) => lhs == rhs && lhs_language.eq_ignore_ascii_case(rhs_language),
        (TypedValue::Boolean(lhs), TypedValue::Boolean(rhs)) => lhs == rhs,
        (TypedValue::DateTime(lhs), TypedValue::DateTime(rhs)) => lhs == rhs,
        (TypedValue::Date(lhs), TypedValue::Date(rhs)) => lhs == rhs,
        // Literals of unknown datatypes are only known to be equal if they are the same term.
        (TypedValue::Other(_), other) | (other, TypedValue::Other(_)) if other.is_literal() => {
            return ThinError::expected();
        }
        _ => false,
    };
    Ok(result)
}

/// The `<` family of operators.
pub(crate) fn compare(lhs: &Term, rhs: &Term) -> ThinResult<Ordering> {
    match (TypedValue::from_term(lhs), TypedValue::from_term(rhs)) {
        (TypedValue::Numeric(lhs), TypedValue::Numeric(rhs)) => {
            lhs.partial_cmp(&rhs).ok_or(ThinError::default())
        }
        (TypedValue::SimpleString(lhs), TypedValue::SimpleString(rhs)) => Ok(lhs.cmp(rhs)),
        (TypedValue::Boolean(lhs), TypedValue::Boolean(rhs)) => Ok(lhs.cmp(&rhs)),
        (TypedValue::DateTime(lhs), TypedValue::DateTime(rhs)) => {
            lhs.partial_cmp(&rhs).ok_or(ThinError::default())
        }
        (TypedValue::Date(lhs), TypedValue::Date(rhs)) => {
            lhs.partial_cmp(&rhs).ok_or(ThinError::default())
        }
        _ => ThinError::expected(),
    }
}

/// Computes the [effective boolean value](https://www.w3.org/TR/sparql11-query/#ebv) of a term.
pub(crate) fn effective_boolean_value(term: &Term) -> ThinResult<bool> {
    match TypedValue::from_term(term) {
        TypedValue::Boolean(value) => Ok(value),
        TypedValue::Numeric(value) => Ok(!value.is_zero() && !value.is_nan()),
        TypedValue::SimpleString(value) => Ok(!value.is_empty()),
        TypedValue::Other(literal)
            if literal.datatype() == xsd::BOOLEAN
                || Numeric::is_numeric_datatype(literal.datatype()) =>
        {
            Ok(false)
        }
        _ => ThinError::expected(),
    }
}

/// The total order used by `ORDER BY`: unbound, blank nodes, IRIs, literals.
pub(crate) fn order_terms(lhs: Option<&Term>, rhs: Option<&Term>) -> Ordering {
    let (lhs, rhs) = match (lhs, rhs) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(lhs), Some(rhs)) => (lhs, rhs),
    };

    match (lhs, rhs) {
        (Term::BlankNode(lhs), Term::BlankNode(rhs)) => lhs.as_str().cmp(rhs.as_str()),
        (Term::BlankNode(_), _) => Ordering::Less,
        (_, Term::BlankNode(_)) => Ordering::Greater,
        (Term::NamedNode(lhs), Term::NamedNode(rhs)) => lhs.as_str().cmp(rhs.as_str()),
        (Term::NamedNode(_), _) => Ordering::Less,
        (_, Term::NamedNode(_)) => Ordering::Greater,
        (Term::Literal(lhs_literal), Term::Literal(rhs_literal)) => {
            compare(lhs, rhs).unwrap_or_else(|_| {
                lhs_literal
                    .value()
                    .cmp(rhs_literal.value())
                    .then_with(|| {
                        lhs_literal
                            .datatype()
                            .as_str()
                            .cmp(rhs_literal.datatype().as_str())
                    })
                    .then_with(|| lhs_literal.language().cmp(&rhs_literal.language()))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(value: &str, datatype: oxrdf::NamedNodeRef<'_>) -> Term {
        Literal::new_typed_literal(value, datatype).into()
    }

    #[test]
    fn test_numeric_equality_across_types() {
        assert_eq!(
            equals(&typed("1", xsd::INTEGER), &typed("1.0", xsd::DECIMAL)),
            Ok(true)
        );
        assert_eq!(
            equals(&typed("1", xsd::INTEGER), &Literal::new_simple_literal("1").into()),
            Ok(false)
        );
    }

    #[test]
    fn test_unknown_datatypes_are_not_comparable() {
        let custom = oxrdf::NamedNodeRef::new_unchecked("http://example.com/type");
        assert!(equals(&typed("a", custom), &typed("b", custom)).is_err());
        assert_eq!(equals(&typed("a", custom), &typed("a", custom)), Ok(true));
    }

    #[test]
    fn test_effective_boolean_value() {
        assert_eq!(effective_boolean_value(&typed("0", xsd::INTEGER)), Ok(false));
        assert_eq!(effective_boolean_value(&typed("true", xsd::BOOLEAN)), Ok(true));
        assert_eq!(
            effective_boolean_value(&Literal::new_simple_literal("").into()),
            Ok(false)
        );
        assert!(effective_boolean_value(&NamedNode::new_unchecked("http://a").into()).is_err());
    }

    #[test]
    fn test_order_terms() {
        let iri = Term::from(NamedNode::new_unchecked("http://example.com/a"));
        let two = typed("2", xsd::INTEGER);
        let ten = typed("10", xsd::INTEGER);
        assert_eq!(order_terms(None, Some(&iri)), Ordering::Less);
        assert_eq!(order_terms(Some(&iri), Some(&two)), Ordering::Less);
        assert_eq!(order_terms(Some(&two), Some(&ten)), Ordering::Less);
    }
}
