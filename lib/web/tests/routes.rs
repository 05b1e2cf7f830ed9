#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use axum::body::Bytes;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use rdf_transform_web::{create_router, AppState, ServerConfig};
use serde_json::json;
use std::error::Error;

const RESOURCE: &str = r#"
@prefix dc: <http://purl.org/dc/elements/1.1/> .
@prefix pcdm: <http://pcdm.org/models#> .

<> a pcdm:Object ;
    dc:title "A title" .
"#;

const TOPIC: &str = "http://localhost:8080/rest/collection/a";
const PROGRAMS: &str = "/fedora:system/fedora:transform/fedora:ldpath";

fn server() -> Result<TestServer, Box<dyn Error>> {
    let mut config = ServerConfig::new("127.0.0.1:8080");
    config.base_url = Some("http://localhost:8080/rest/".to_owned());
    config.transform.linked_data.enabled = false;
    Ok(TestServer::new(create_router(AppState::new(&config)?))?)
}

async fn server_with_resource() -> Result<TestServer, Box<dyn Error>> {
    let server = server()?;
    server
        .put("/collection/a")
        .bytes(Bytes::from_static(RESOURCE.as_bytes()))
        .content_type("text/turtle")
        .await
        .assert_status(StatusCode::CREATED);
    Ok(server)
}

async fn post_program(
    server: &TestServer,
    program: &'static str,
    content_type: &str,
) -> axum_test::TestResponse {
    server
        .post("/collection/a/fcr:transform")
        .bytes(Bytes::from_static(program.as_bytes()))
        .content_type(content_type)
        .await
}

#[tokio::test]
async fn test_put_resource_twice() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;
    server
        .put("/collection/a")
        .bytes(Bytes::from_static(RESOURCE.as_bytes()))
        .content_type("text/turtle")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn test_put_resource_requires_rdf() -> Result<(), Box<dyn Error>> {
    server()?
        .put("/collection/a")
        .bytes(Bytes::from_static(b"A title"))
        .content_type("text/plain")
        .await
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    Ok(())
}

#[tokio::test]
async fn test_put_resource_as_n_triples() -> Result<(), Box<dyn Error>> {
    let server = server()?;
    server
        .put("/collection/a")
        .bytes(Bytes::from_static(
            b"<http://localhost:8080/rest/collection/a> <http://purl.org/dc/elements/1.1/title> \"A title\" .\n",
        ))
        .content_type("application/n-triples")
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/collection/a/fcr:transform/default").await;
    response.assert_status_ok();
    response.assert_json(&json!([{ "id": [TOPIC], "title": ["A title"] }]));
    Ok(())
}

#[tokio::test]
async fn test_put_malformed_resource() -> Result<(), Box<dyn Error>> {
    server()?
        .put("/collection/a")
        .bytes(Bytes::from_static(b"<> <"))
        .content_type("text/turtle")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_default_transform() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    let response = server.get("/collection/a/fcr:transform/default").await;
    response.assert_status_ok();
    response.assert_json(&json!([{ "id": [TOPIC], "title": ["A title"] }]));
    Ok(())
}

#[tokio::test]
async fn test_stored_program_for_resource_type() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;
    server
        .put(&format!("{PROGRAMS}/custom/pcdm:Object"))
        .bytes(Bytes::from_static(b"label = dc:title :: xsd:string ;"))
        .content_type("application/rdf+ldpath")
        .await
        .assert_status(StatusCode::CREATED);

    let program = server.get(&format!("{PROGRAMS}/custom/pcdm:Object")).await;
    program.assert_status_ok();
    program.assert_text("label = dc:title :: xsd:string ;");

    let response = server.get("/collection/a/fcr:transform/custom").await;
    response.assert_status_ok();
    response.assert_json(&json!([{ "label": ["A title"] }]));
    Ok(())
}

#[tokio::test]
async fn test_default_programs_are_listed() -> Result<(), Box<dyn Error>> {
    let response = server()?.get(&format!("{PROGRAMS}/deluxe")).await;
    response.assert_status_ok();
    response.assert_text(format!("{PROGRAMS}/deluxe/fedora:Resource\n"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_key_and_resource() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;
    server
        .get("/collection/a/fcr:transform/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/collection/b/fcr:transform/default")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_transform_without_key_must_be_posted() -> Result<(), Box<dyn Error>> {
    server_with_resource()
        .await?
        .get("/collection/a/fcr:transform")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn test_inline_path_query() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    let response = post_program(
        &server,
        "title = dc:title :: xsd:string ; type = rdf:type :: xsd:anyURI ;",
        "application/rdf+ldpath",
    )
    .await;
    response.assert_status_ok();
    response.assert_json(&json!([{
        "title": ["A title"],
        "type": ["http://pcdm.org/models#Object"]
    }]));
    Ok(())
}

#[tokio::test]
async fn test_inline_select_as_csv() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    let response = server
        .post("/collection/a/fcr:transform")
        .bytes(Bytes::from_static(
            b"SELECT ?title WHERE { <> <http://purl.org/dc/elements/1.1/title> ?title }",
        ))
        .content_type("application/sparql-query")
        .add_header(ACCEPT, HeaderValue::from_static("text/csv"))
        .await;
    response.assert_status_ok();
    assert!(response.header(CONTENT_TYPE).to_str()?.starts_with("text/csv"));
    assert_eq!(response.text(), "title\r\nA title\r\n");
    Ok(())
}

#[tokio::test]
async fn test_inline_ask_defaults_to_json() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    let response = post_program(
        &server,
        "ASK { <> a <http://pcdm.org/models#Object> }",
        "application/sparql-query",
    )
    .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "head": {}, "boolean": true }));
    Ok(())
}

#[tokio::test]
async fn test_inline_construct_as_turtle() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    let response = post_program(
        &server,
        "CONSTRUCT { <> <http://example.com/label> ?t } \
         WHERE { <> <http://purl.org/dc/elements/1.1/title> ?t }",
        "application/sparql-query",
    )
    .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "text/turtle");
    assert!(
        response.text().contains("\"A title\""),
        "unexpected body {}",
        response.text()
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_negotiation() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    server
        .post("/collection/a/fcr:transform")
        .bytes(Bytes::from_static(b"ASK { ?s ?p ?o }"))
        .content_type("application/sparql-query")
        .add_header(ACCEPT, HeaderValue::from_static("image/png"))
        .await
        .assert_status(StatusCode::NOT_ACCEPTABLE);
    Ok(())
}

#[tokio::test]
async fn test_inline_error_statuses() -> Result<(), Box<dyn Error>> {
    let server = server_with_resource().await?;

    post_program(&server, "title = dc:title ;", "text/plain")
        .await
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    post_program(&server, "SELEC ?s", "application/sparql-query")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    post_program(&server, "title = dc:title", "application/rdf+ldpath")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    post_program(
        &server,
        "SELECT * WHERE { GRAPH ?g { ?s ?p ?o } }",
        "application/sparql-query",
    )
    .await
    .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
