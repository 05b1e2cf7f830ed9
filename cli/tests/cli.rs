#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::NamedTempFile;
use predicates::prelude::*;

const DESCRIPTION: &str = "@prefix dc: <http://purl.org/dc/elements/1.1/> .\n<> a <http://pcdm.org/models#Object> ;\n\tdc:title \"A title\" .\n";

fn cli_command() -> Command {
    let mut command = Command::cargo_bin("rdf-transform").unwrap();
    command.env("RUST_LOG", "off");
    command
}

fn description_file() -> Result<NamedTempFile> {
    let file = NamedTempFile::new("resource.ttl")?;
    file.write_str(DESCRIPTION)?;
    Ok(file)
}

#[test]
fn cli_help() {
    cli_command()
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("rdf-transform"));
}

#[test]
fn cli_apply_default_key() -> Result<()> {
    let input_file = description_file()?;
    cli_command()
        .arg("apply")
        .arg("--file")
        .arg(input_file.path())
        .arg("--topic")
        .arg("http://example.com/rest/a")
        .arg("--key")
        .arg("default")
        .arg("--no-linked-data")
        .assert()
        .stdout("[{\"id\":[\"http://example.com/rest/a\"],\"title\":[\"A title\"]}]\n")
        .success();
    Ok(())
}

#[test]
fn cli_apply_path_query_program() -> Result<()> {
    let program = NamedTempFile::new("program.ldpath")?;
    program.write_str("type = rdf:type :: xsd:anyURI ;")?;
    cli_command()
        .arg("apply")
        .arg("--format")
        .arg("ttl")
        .arg("--topic")
        .arg("http://example.com/rest/a")
        .arg("--program")
        .arg(program.path())
        .arg("--no-linked-data")
        .write_stdin(DESCRIPTION)
        .assert()
        .stdout("[{\"type\":[\"http://pcdm.org/models#Object\"]}]\n")
        .success();
    Ok(())
}

#[test]
fn cli_apply_select_as_csv() -> Result<()> {
    let input_file = description_file()?;
    let program = NamedTempFile::new("program.rq")?;
    program.write_str("SELECT ?title WHERE { <> <http://purl.org/dc/elements/1.1/title> ?title }")?;
    cli_command()
        .arg("apply")
        .arg("--file")
        .arg(input_file.path())
        .arg("--topic")
        .arg("http://example.com/rest/a")
        .arg("--program")
        .arg(program.path())
        .arg("--results-format")
        .arg("csv")
        .assert()
        .stdout("title\r\nA title\r\n")
        .success();
    Ok(())
}

#[test]
fn cli_apply_unknown_program_type() -> Result<()> {
    let input_file = description_file()?;
    let program = NamedTempFile::new("program.txt")?;
    program.write_str("title = dc:title ;")?;
    cli_command()
        .arg("apply")
        .arg("--file")
        .arg(input_file.path())
        .arg("--topic")
        .arg("http://example.com/rest/a")
        .arg("--program")
        .arg(program.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("program extension 'txt' is unknown"));
    Ok(())
}

#[test]
fn cli_apply_unsupported_program_type() -> Result<()> {
    let input_file = description_file()?;
    let program = NamedTempFile::new("program.txt")?;
    program.write_str("title = dc:title ;")?;
    cli_command()
        .arg("apply")
        .arg("--file")
        .arg(input_file.path())
        .arg("--topic")
        .arg("http://example.com/rest/a")
        .arg("--program")
        .arg(program.path())
        .arg("--program-type")
        .arg("text/plain")
        .assert()
        .failure()
        .stderr(predicate::str::contains("text/plain"));
    Ok(())
}
