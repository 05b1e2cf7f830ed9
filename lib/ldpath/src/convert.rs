use crate::ast::FieldType;
use oxiri::Iri;
use rdf_transform_model::vocab::xsd;
use rdf_transform_model::{NamedNodeRef, Term, TransformValue};

impl FieldType {
    /// Maps a datatype IRI of a field declaration to the conversion it requests.
    pub fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        let field_type = match iri {
            xsd::STRING | xsd::NORMALIZED_STRING | xsd::TOKEN | xsd::LANGUAGE => Self::String,
            xsd::INT
            | xsd::INTEGER
            | xsd::LONG
            | xsd::SHORT
            | xsd::BYTE
            | xsd::NON_NEGATIVE_INTEGER
            | xsd::POSITIVE_INTEGER
            | xsd::NON_POSITIVE_INTEGER
            | xsd::NEGATIVE_INTEGER
            | xsd::UNSIGNED_INT
            | xsd::UNSIGNED_LONG
            | xsd::UNSIGNED_SHORT
            | xsd::UNSIGNED_BYTE => Self::Integer,
            xsd::DOUBLE | xsd::FLOAT | xsd::DECIMAL => Self::Double,
            xsd::BOOLEAN => Self::Boolean,
            xsd::ANY_URI => Self::Uri,
            xsd::DATE | xsd::DATE_TIME | xsd::TIME | xsd::G_YEAR | xsd::G_YEAR_MONTH => {
                Self::Temporal
            }
            _ => return None,
        };
        Some(field_type)
    }
}

/// Converts a selected node into a field value.
///
/// Returns `None` if the node has no representation in the requested type.
pub(crate) fn convert(node: &Term, field_type: Option<&FieldType>) -> Option<TransformValue> {
    let Some(field_type) = field_type else {
        return Some(match node {
            Term::NamedNode(node) => TransformValue::Uri(node.as_str().to_owned()),
            _ => TransformValue::String(lexical_form(node)),
        });
    };

    match field_type {
        FieldType::String | FieldType::Temporal => Some(TransformValue::String(lexical_form(node))),
        FieldType::Integer => literal_value(node)?
            .trim()
            .parse::<i64>()
            .ok()
            .map(TransformValue::Integer),
        FieldType::Double => parse_double(literal_value(node)?.trim()).map(TransformValue::Double),
        FieldType::Boolean => match literal_value(node)?.trim() {
            "true" | "1" => Some(TransformValue::Boolean(true)),
            "false" | "0" => Some(TransformValue::Boolean(false)),
            _ => None,
        },
        FieldType::Uri => match node {
            Term::NamedNode(node) => Some(TransformValue::Uri(node.as_str().to_owned())),
            Term::Literal(literal) => Iri::parse(literal.value())
                .ok()
                .map(|iri| TransformValue::Uri(iri.into_inner().to_owned())),
            _ => None,
        },
    }
}

/// The string form of a node: IRIs without brackets, literals without quotes and tags.
pub(crate) fn lexical_form(node: &Term) -> String {
    match node {
        Term::NamedNode(node) => node.as_str().to_owned(),
        Term::BlankNode(node) => node.to_string(),
        Term::Literal(literal) => literal.value().to_owned(),
    }
}

fn literal_value(node: &Term) -> Option<&str> {
    match node {
        Term::Literal(literal) => Some(literal.value()),
        _ => None,
    }
}

fn parse_double(value: &str) -> Option<f64> {
    match value {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        // Rust also accepts "inf" and "infinity", which are not valid XSD lexical forms.
        _ if value.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
        _ => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_transform_model::{Literal, NamedNode};

    fn literal(value: &str) -> Term {
        Literal::new_simple_literal(value).into()
    }

    #[test]
    fn test_field_type_from_iri() {
        assert_eq!(FieldType::from_iri(xsd::INT), Some(FieldType::Integer));
        assert_eq!(FieldType::from_iri(xsd::DECIMAL), Some(FieldType::Double));
        assert_eq!(FieldType::from_iri(xsd::DATE_TIME), Some(FieldType::Temporal));
        assert_eq!(FieldType::from_iri(xsd::HEX_BINARY), None);
    }

    #[test]
    fn test_convert_without_type_hint() {
        let iri = Term::from(NamedNode::new_unchecked("http://example.com/a"));
        assert_eq!(
            convert(&iri, None),
            Some(TransformValue::Uri("http://example.com/a".to_owned()))
        );
        assert_eq!(convert(&literal("a"), None), Some("a".into()));
    }

    #[test]
    fn test_convert_numbers() {
        assert_eq!(
            convert(&literal(" 42 "), Some(&FieldType::Integer)),
            Some(TransformValue::Integer(42))
        );
        assert_eq!(convert(&literal("4.2"), Some(&FieldType::Integer)), None);
        assert_eq!(
            convert(&literal("-INF"), Some(&FieldType::Double)),
            Some(TransformValue::Double(f64::NEG_INFINITY))
        );
        assert_eq!(convert(&literal("infinity"), Some(&FieldType::Double)), None);
        assert_eq!(
            convert(&literal("1.5e2"), Some(&FieldType::Double)),
            Some(TransformValue::Double(150.0))
        );
    }

    #[test]
    fn test_convert_uri() {
        assert_eq!(
            convert(&literal("http://example.com/b"), Some(&FieldType::Uri)),
            Some(TransformValue::Uri("http://example.com/b".to_owned()))
        );
        assert_eq!(convert(&literal("not an iri"), Some(&FieldType::Uri)), None);
    }
}
