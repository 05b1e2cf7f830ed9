#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use oxrdfio::{RdfFormat, RdfParser};
use rdf_transform_model::{Literal, NamedNode, Term, Triple, TripleStream};
use rdf_transform_sparql::{
    QueryEvaluationError, QueryResults, QueryResultsFormat, QuerySolutions,
    StructuredQueryEvaluator,
};
use std::error::Error;

const DATA: &str = r#"
@prefix ex: <http://example.com/> .
@prefix dc: <http://purl.org/dc/elements/1.1/> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:book rdfs:label "Book"@en , "Buch"@de ;
    dc:creator ex:alice , ex:bob ;
    ex:pages 42 ;
    ex:price "12.5"^^xsd:decimal ;
    ex:hasPart ex:chapter1 ;
    ex:publisher [ foaf:name "ACME" ] .
ex:chapter1 ex:hasPart ex:chapter2 ; ex:pages 10 .
ex:chapter2 ex:hasPart ex:chapter1 ; ex:pages 20 .
ex:alice foaf:name "Alice" .
ex:bob foaf:name "Bob" .
ex:review dc:subject ex:book .
"#;

fn book() -> NamedNode {
    NamedNode::new_unchecked("http://example.com/book")
}

fn ex(local: &str) -> Term {
    NamedNode::new_unchecked(format!("http://example.com/{local}")).into()
}

fn stream() -> Result<TripleStream, Box<dyn Error>> {
    let triples = RdfParser::from_format(RdfFormat::Turtle)
        .for_reader(DATA.as_bytes())
        .map(|quad| quad.map(Triple::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TripleStream::new(book(), triples))
}

fn evaluate(query: &str) -> Result<QueryResults, Box<dyn Error>> {
    Ok(StructuredQueryEvaluator::new().evaluate(stream()?, query)?)
}

fn select(query: &str) -> Result<QuerySolutions, Box<dyn Error>> {
    match evaluate(query)? {
        QueryResults::Solutions(solutions) => Ok(solutions),
        other => Err(format!("expected solutions, got {other:?}").into()),
    }
}

/// Returns the values of `variable` in solution order.
fn column(solutions: &QuerySolutions, variable: &str) -> Vec<Option<Term>> {
    solutions
        .iter()
        .map(|solution| solution.get(variable).cloned())
        .collect()
}

#[test]
fn test_select_with_relative_topic() -> Result<(), Box<dyn Error>> {
    let solutions = select(
        "PREFIX dc: <http://purl.org/dc/elements/1.1/>
         SELECT ?creator WHERE { <> dc:creator ?creator } ORDER BY ?creator",
    )?;
    assert_eq!(solutions.variables().len(), 1);
    assert_eq!(
        column(&solutions, "creator"),
        vec![Some(ex("alice")), Some(ex("bob"))]
    );
    Ok(())
}

#[test]
fn test_optional_filter_and_order() -> Result<(), Box<dyn Error>> {
    let solutions = select(
        "PREFIX ex: <http://example.com/>
         SELECT ?part ?pages WHERE {
             <> ex:hasPart+ ?part .
             OPTIONAL { ?part ex:pages ?pages FILTER(?pages > 15) }
         } ORDER BY DESC(?part)",
    )?;
    assert_eq!(
        column(&solutions, "part"),
        vec![Some(ex("chapter2")), Some(ex("chapter1"))]
    );
    assert_eq!(
        column(&solutions, "pages"),
        vec![Some(Literal::from(20_i64).into()), None]
    );
    Ok(())
}

#[test]
fn test_property_paths_terminate_on_cycles() -> Result<(), Box<dyn Error>> {
    let solutions = select(
        "PREFIX ex: <http://example.com/>
         SELECT ?part WHERE { <> ex:hasPart+ ?part }",
    )?;
    assert_eq!(
        column(&solutions, "part"),
        vec![Some(ex("chapter1")), Some(ex("chapter2"))]
    );

    let solutions = select(
        "PREFIX ex: <http://example.com/>
         SELECT ?part WHERE { <> ex:hasPart* ?part }",
    )?;
    assert_eq!(solutions.len(), 3);
    Ok(())
}

#[test]
fn test_aggregates() -> Result<(), Box<dyn Error>> {
    let solutions = select(
        "PREFIX ex: <http://example.com/>
         SELECT (COUNT(*) AS ?count) (SUM(?pages) AS ?sum) (MAX(?pages) AS ?max)
         WHERE { ?part ex:pages ?pages }",
    )?;
    assert_eq!(
        column(&solutions, "count"),
        vec![Some(Literal::from(3_i64).into())]
    );
    assert_eq!(
        column(&solutions, "sum"),
        vec![Some(Literal::from(72_i64).into())]
    );
    assert_eq!(
        column(&solutions, "max"),
        vec![Some(Literal::from(42_i64).into())]
    );

    let solutions = select(
        "PREFIX foaf: <http://xmlns.com/foaf/0.1/>
         PREFIX dc: <http://purl.org/dc/elements/1.1/>
         SELECT (GROUP_CONCAT(?name; SEPARATOR=\", \") AS ?names)
         WHERE { <> dc:creator/foaf:name ?name }",
    )?;
    assert_eq!(
        column(&solutions, "names"),
        vec![Some(Literal::new_simple_literal("Alice, Bob").into())]
    );
    Ok(())
}

#[test]
fn test_count_over_nothing_is_zero() -> Result<(), Box<dyn Error>> {
    let solutions = select("SELECT (COUNT(?x) AS ?count) WHERE { ?x <http://example.com/none> ?y }")?;
    assert_eq!(
        column(&solutions, "count"),
        vec![Some(Literal::from(0_i64).into())]
    );
    Ok(())
}

#[test]
fn test_functions_in_bind() -> Result<(), Box<dyn Error>> {
    let solutions = select(
        "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
         SELECT ?upper WHERE {
             <> rdfs:label ?label FILTER(LANGMATCHES(LANG(?label), \"en\"))
             BIND(CONCAT(UCASE(?label), \"!\") AS ?upper)
         }",
    )?;
    assert_eq!(
        column(&solutions, "upper"),
        vec![Some(Literal::new_simple_literal("BOOK!").into())]
    );
    Ok(())
}

#[test]
fn test_ask() -> Result<(), Box<dyn Error>> {
    assert!(matches!(
        evaluate("ASK { <> <http://example.com/pages> 42 }")?,
        QueryResults::Boolean(true)
    ));
    assert!(matches!(
        evaluate("ASK { <> <http://example.com/pages> 43 }")?,
        QueryResults::Boolean(false)
    ));
    Ok(())
}

#[test]
fn test_exists_sees_outer_bindings() -> Result<(), Box<dyn Error>> {
    assert!(matches!(
        evaluate(
            "PREFIX ex: <http://example.com/>
             ASK {
                 <> ex:pages ?pages
                 FILTER EXISTS { <> ex:hasPart ?part . ?part ex:pages ?partPages FILTER(?partPages < ?pages) }
             }"
        )?,
        QueryResults::Boolean(true)
    ));
    assert!(matches!(
        evaluate(
            "PREFIX ex: <http://example.com/>
             ASK {
                 <> ex:pages ?pages
                 FILTER NOT EXISTS { <> ex:hasPart ?part . ?part ex:pages ?partPages FILTER(?partPages > ?pages) }
             }"
        )?,
        QueryResults::Boolean(true)
    ));
    Ok(())
}

#[test]
fn test_not_exists_filters_per_solution() -> Result<(), Box<dyn Error>> {
    let solutions = select(
        "PREFIX ex: <http://example.com/>
         SELECT ?part WHERE {
             ?part ex:pages ?pages
             FILTER NOT EXISTS { ?part ex:pages ?other FILTER(?other > 15) }
         }",
    )?;
    assert_eq!(column(&solutions, "part"), vec![Some(ex("chapter1"))]);
    Ok(())
}

#[test]
fn test_construct_skips_unbound_triples() -> Result<(), Box<dyn Error>> {
    let QueryResults::Graph(graph) = evaluate(
        "PREFIX ex: <http://example.com/>
         PREFIX dc: <http://purl.org/dc/elements/1.1/>
         CONSTRUCT { ?creator ex:wrote <> . ?creator ex:missing ?nothing }
         WHERE { <> dc:creator ?creator }",
    )?
    else {
        return Err("expected a graph".into());
    };
    assert_eq!(graph.len(), 2);
    Ok(())
}

#[test]
fn test_describe_follows_blank_nodes() -> Result<(), Box<dyn Error>> {
    let QueryResults::Graph(graph) = evaluate("DESCRIBE <>")? else {
        return Err("expected a graph".into());
    };
    // The eight triples of the book plus the name of the anonymous publisher.
    assert_eq!(graph.len(), 9);
    Ok(())
}

#[test]
fn test_graph_patterns_are_not_implemented() -> Result<(), Box<dyn Error>> {
    let result = StructuredQueryEvaluator::new().evaluate(
        TripleStream::new(
            book(),
            std::iter::from_fn(|| panic!("the stream must not be read")),
        ),
        "SELECT * WHERE { GRAPH ?g { ?s ?p ?o } }",
    );
    assert!(matches!(result, Err(QueryEvaluationError::NotImplemented(_))));
    Ok(())
}

#[test]
fn test_syntax_errors() {
    let result = StructuredQueryEvaluator::new().evaluate(TripleStream::empty(book()), "SELECT WHERE");
    assert!(result.is_err_and(|e| e.is_syntax_error()));
}

#[test]
fn test_write_solutions_as_json() -> Result<(), Box<dyn Error>> {
    let results = evaluate("SELECT ?pages WHERE { <> <http://example.com/pages> ?pages }")?;
    let json = String::from_utf8(results.write(Vec::new(), QueryResultsFormat::Json)?)?;
    assert!(json.starts_with(r#"{"head":{"vars":["pages"]}"#), "{json}");
    assert!(json.contains(r#""value":"42""#), "{json}");
    Ok(())
}

#[test]
fn test_write_graph_rejects_solutions() -> Result<(), Box<dyn Error>> {
    let results = evaluate("ASK {}")?;
    assert!(matches!(
        results.write_graph(Vec::new(), RdfFormat::NTriples),
        Err(QueryEvaluationError::NotAGraph)
    ));
    Ok(())
}
