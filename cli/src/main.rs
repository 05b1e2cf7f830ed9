use crate::cli::{Args, Command, LinkedDataArgs};
use anyhow::{bail, Context};
use clap::Parser;
use oxrdfio::{RdfFormat, RdfParser};
use rdf_transform::config::{Credentials, LinkedDataConfig, LinkedDataEndpoint};
use rdf_transform::linked_data::linked_data_resolver;
use rdf_transform::{
    ensure_defaults, MemProgramStore, TransformConfig, TransformDispatcher, TransformRequest,
    TransformResult, TransformTarget,
};
use rdf_transform_model::{
    Iri, NamedNode, NamespaceTable, ProgramKey, ResourcePath, Triple, PATH_QUERY_MEDIA_TYPE,
    STRUCTURED_QUERY_MEDIA_TYPE,
};
use rdf_transform_sparql::QueryResultsFormat;
use rdf_transform_web::{ServerConfig, StoredResource};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{stdin, stdout, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    init_tracing();
    let matches = Args::parse();
    match matches.command {
        Command::Serve {
            bind,
            cors,
            base_url,
            configuration_root,
            linked_data,
        } => {
            let mut config = ServerConfig::new(bind);
            config.cors = cors;
            config.base_url = base_url;
            config.transform.configuration_root = ResourcePath::new(configuration_root);
            config.transform.linked_data = linked_data_config(linked_data);
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(rdf_transform_web::serve(config))
        }
        Command::Apply {
            file,
            format,
            topic,
            program,
            program_type,
            key,
            results_format,
            linked_data,
        } => {
            let topic = NamedNode::new(&topic)
                .with_context(|| format!("The topic {topic} is not a valid IRI"))?;
            let format = if let Some(format) = format {
                rdf_format_from_name(&format)?
            } else if let Some(file) = &file {
                rdf_format_from_path(file)?
            } else {
                bail!("The --format option must be set when reading from stdin")
            };
            let parser = RdfParser::from_format(format)
                .with_base_iri(topic.as_str())
                .with_context(|| format!("Invalid base IRI {topic}"))?;
            let triples = if let Some(file) = &file {
                read_triples(parser, File::open(file).with_context(|| {
                    format!("Could not open the file {}", file.display())
                })?)?
            } else {
                read_triples(parser, stdin().lock())?
            };

            let request = if let Some(key) = key {
                TransformRequest::Stored {
                    key: ProgramKey::new(key)?,
                }
            } else if let Some(program) = program {
                let content_type = match program_type {
                    Some(program_type) => program_type,
                    None => program_type_from_path(&program)?.to_owned(),
                };
                let body = fs::read(&program).with_context(|| {
                    format!("Could not read the program {}", program.display())
                })?;
                TransformRequest::Inline {
                    program: body.into(),
                    content_type,
                }
            } else {
                bail!("Either --program or --key must be set")
            };

            let config = TransformConfig {
                linked_data: linked_data_config(linked_data),
                ..TransformConfig::default()
            };
            let resource = StoredResource {
                topic,
                triples: triples.into(),
            };
            apply(&config, &resource, request, results_format.as_deref())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,rdf_transform=info,tower_http=info")),
        )
        .init();
}

fn linked_data_config(args: LinkedDataArgs) -> LinkedDataConfig {
    let credentials = args.linked_data_user.map(|username| Credentials {
        username,
        password: args.linked_data_password,
    });
    LinkedDataConfig {
        enabled: !args.no_linked_data,
        endpoints: args
            .linked_data_endpoint
            .into_iter()
            .map(|prefix| {
                let endpoint = LinkedDataEndpoint::new(prefix);
                match &credentials {
                    Some(credentials) => endpoint.with_credentials(credentials.clone()),
                    None => endpoint,
                }
            })
            .collect(),
        timeout: Duration::from_secs(args.linked_data_timeout),
        cache_ttl: args.linked_data_cache_ttl.map(Duration::from_secs),
    }
}

/// Runs one transform over `resource` and writes its result to stdout.
fn apply(
    config: &TransformConfig,
    resource: &StoredResource,
    request: TransformRequest,
    results_format: Option<&str>,
) -> anyhow::Result<()> {
    let store = Arc::new(MemProgramStore::new());
    ensure_defaults(store.as_ref(), &config.configuration_root)?;
    let dispatcher = TransformDispatcher::new(
        config,
        store,
        Arc::new(NamespaceTable::repository_defaults()),
        linked_data_resolver(&config.linked_data),
    );

    let target = TransformTarget {
        path: ResourcePath::new(Iri::parse(resource.topic.as_str())?.path()),
        types: resource.types(),
        triples: resource.stream(),
    };
    let mut out = stdout().lock();
    match dispatcher.dispatch(target, request)? {
        TransformResult::Fields(fields) => {
            serde_json::to_writer(&mut out, &[fields])?;
            writeln!(out)?;
        }
        TransformResult::Query(results) if results.is_graph() => {
            let format = match results_format {
                Some(name) => rdf_format_from_name(name)?,
                None => RdfFormat::Turtle,
            };
            results.write_graph(&mut out, format)?;
        }
        TransformResult::Query(results) => {
            let format = match results_format {
                Some(name) => query_results_format_from_name(name)?,
                None => QueryResultsFormat::Json,
            };
            results.write(&mut out, format)?;
        }
    }
    Ok(out.flush()?)
}

fn read_triples(parser: RdfParser, reader: impl Read) -> anyhow::Result<Vec<Triple>> {
    Ok(parser
        .for_reader(reader)
        .map(|quad| quad.map(Triple::from))
        .collect::<Result<_, _>>()?)
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    format_from_path(path, |ext| {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    })
}

fn program_type_from_path(path: &Path) -> anyhow::Result<&'static str> {
    format_from_path(path, |ext| match ext {
        "ldpath" => Ok(PATH_QUERY_MEDIA_TYPE),
        "rq" | "sparql" => Ok(STRUCTURED_QUERY_MEDIA_TYPE),
        _ => bail!("The program extension '{ext}' is unknown, use --program-type"),
    })
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}

fn query_results_format_from_name(name: &str) -> anyhow::Result<QueryResultsFormat> {
    if let Some(t) = QueryResultsFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = QueryResultsFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The query results format '{name}' is unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_type_from_path() {
        assert_eq!(
            program_type_from_path(Path::new("a.ldpath")).ok(),
            Some(PATH_QUERY_MEDIA_TYPE)
        );
        assert_eq!(
            program_type_from_path(Path::new("a.rq")).ok(),
            Some(STRUCTURED_QUERY_MEDIA_TYPE)
        );
        assert!(program_type_from_path(Path::new("a")).is_err());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(rdf_format_from_name("ttl").ok(), Some(RdfFormat::Turtle));
        assert_eq!(
            rdf_format_from_name("application/n-triples").ok(),
            Some(RdfFormat::NTriples)
        );
        assert_eq!(
            query_results_format_from_name("csv").ok(),
            Some(QueryResultsFormat::Csv)
        );
        assert!(query_results_format_from_name("png").is_err());
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
