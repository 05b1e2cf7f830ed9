use crate::error::TransformError;
use rdf_transform_ldpath::{LinkedDataResolver, PathQueryEvaluator};
use rdf_transform_model::{ContentKind, FieldMap, TransformProgram, TripleStream};
use rdf_transform_sparql::{QueryResults, StructuredQueryEvaluator};
use std::sync::Arc;

/// The outcome of applying a transform program.
#[derive(Debug)]
pub enum TransformResult {
    /// The fields selected by a path query.
    Fields(FieldMap),
    /// The results of a structured query.
    Query(QueryResults),
}

/// One evaluator per program language.
#[derive(Clone)]
pub enum TransformEvaluator {
    PathQuery(PathQueryEvaluator),
    StructuredQuery(StructuredQueryEvaluator),
}

impl TransformEvaluator {
    /// Creates the evaluator for programs of `kind`.
    ///
    /// `linked_data` is only used by path queries.
    pub fn for_kind(kind: ContentKind, linked_data: Arc<dyn LinkedDataResolver>) -> Self {
        match kind {
            ContentKind::PathQuery => Self::PathQuery(PathQueryEvaluator::new(linked_data)),
            ContentKind::StructuredQuery => Self::StructuredQuery(StructuredQueryEvaluator::new()),
        }
    }

    /// Applies `program` to the triples describing a single topic.
    ///
    /// The kind declared by `program` is not consulted; the evaluator decides how the body is
    /// read.
    pub fn evaluate(
        &self,
        triples: TripleStream,
        program: &TransformProgram,
    ) -> Result<TransformResult, TransformError> {
        let text = program.text()?;
        Ok(match self {
            Self::PathQuery(evaluator) => TransformResult::Fields(evaluator.evaluate(triples, text)?),
            Self::StructuredQuery(evaluator) => {
                TransformResult::Query(evaluator.evaluate(triples, text)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationCause;
    use rdf_transform_ldpath::NoLinkedData;
    use rdf_transform_model::vocab::rdfs;
    use rdf_transform_model::{Literal, NamedNode, Triple};

    fn contributor() -> TripleStream {
        let topic = NamedNode::new_unchecked("http://localhost/contributor");
        TripleStream::new(
            topic.clone(),
            [Triple::new(
                topic,
                rdfs::LABEL,
                Literal::new_simple_literal("Contributor"),
            )],
        )
    }

    #[test]
    fn test_path_query_program() {
        let evaluator = TransformEvaluator::for_kind(ContentKind::PathQuery, Arc::new(NoLinkedData));
        let program = TransformProgram::path_query(b"title = rdfs:label :: xsd:string ;".as_slice());

        let Ok(TransformResult::Fields(fields)) = evaluator.evaluate(contributor(), &program) else {
            panic!("expected fields");
        };
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"title":["Contributor"]}"#
        );
    }

    #[test]
    fn test_structured_query_program() {
        let evaluator =
            TransformEvaluator::for_kind(ContentKind::StructuredQuery, Arc::new(NoLinkedData));
        let program = TransformProgram::structured_query(
            b"ASK { <> <http://www.w3.org/2000/01/rdf-schema#label> \"Contributor\" }".as_slice(),
        );

        assert!(matches!(
            evaluator.evaluate(contributor(), &program),
            Ok(TransformResult::Query(QueryResults::Boolean(true)))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_a_client_error() {
        let evaluator = TransformEvaluator::for_kind(ContentKind::PathQuery, Arc::new(NoLinkedData));
        let program = TransformProgram::path_query(vec![0xFF_u8, 0xFE]);

        let error = evaluator.evaluate(contributor(), &program).unwrap_err();
        assert!(matches!(
            error,
            TransformError::EvaluationFailed {
                cause: EvaluationCause::ProgramEncoding(_)
            }
        ));
        assert!(error.is_client_error());
    }
}
