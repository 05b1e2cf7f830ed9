use clap::{Args as ClapArgs, Parser, Subcommand, ValueHint};
use rdf_transform::config::{DEFAULT_CONFIGURATION_ROOT, LINKED_DATA_TIMEOUT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "rdf-transform")]
/// Applies LDPath and SPARQL transform programs to RDF resource descriptions
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a transform HTTP server backed by in-memory resources and programs
    Serve {
        /// Host and port to listen to
        #[arg(short, long, default_value = "127.0.0.1:7878", value_hint = ValueHint::Hostname)]
        bind: String,
        /// Allows cross-origin requests
        #[arg(long)]
        cors: bool,
        /// The IRI prefix of the served resources
        ///
        /// By default `http://<bind>` is used.
        #[arg(long, value_hint = ValueHint::Url)]
        base_url: Option<String>,
        /// The container below which programs are stored
        #[arg(long, default_value = DEFAULT_CONFIGURATION_ROOT)]
        configuration_root: String,
        #[command(flatten)]
        linked_data: LinkedDataArgs,
    },
    /// Apply a transform program to the description of a resource
    Apply {
        /// File with the description of the resource
        ///
        /// If no file is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// The format of the description
        ///
        /// It can be an extension like "ttl" or a MIME type like "text/turtle".
        ///
        /// By default the format is guessed from the file extension.
        #[arg(long, required_unless_present = "file")]
        format: Option<String>,
        /// The IRI of the described resource
        ///
        /// It is also the base IRI of the description and of SPARQL programs.
        #[arg(short, long, value_hint = ValueHint::Url)]
        topic: String,
        /// File with the program to apply
        #[arg(
            short,
            long,
            value_hint = ValueHint::FilePath,
            required_unless_present = "key",
            conflicts_with = "key"
        )]
        program: Option<PathBuf>,
        /// The media type of the program
        ///
        /// By default it is guessed from the program file extension ("ldpath" or "rq").
        #[arg(long, requires = "program")]
        program_type: Option<String>,
        /// Apply the built-in program of this key (e.g. "default" or "deluxe")
        #[arg(short, long)]
        key: Option<String>,
        /// The format of structured query results
        ///
        /// It can be an extension like "csv" or a MIME type like "application/sparql-results+json".
        #[arg(long)]
        results_format: Option<String>,
        #[command(flatten)]
        linked_data: LinkedDataArgs,
    },
}

#[derive(ClapArgs)]
pub struct LinkedDataArgs {
    /// Never fetch resources that are not part of the description
    #[arg(long)]
    pub no_linked_data: bool,
    /// IRI prefix of a server that requires credentials
    #[arg(long, value_hint = ValueHint::Url, requires = "linked_data_user")]
    pub linked_data_endpoint: Vec<String>,
    /// User name sent to the linked-data endpoints
    #[arg(long, requires = "linked_data_endpoint")]
    pub linked_data_user: Option<String>,
    /// Password sent to the linked-data endpoints
    #[arg(long, env = "RDF_TRANSFORM_LINKED_DATA_PASSWORD", requires = "linked_data_user")]
    pub linked_data_password: Option<String>,
    /// Timeout of linked-data requests, in seconds
    #[arg(long, default_value_t = LINKED_DATA_TIMEOUT.as_secs())]
    pub linked_data_timeout: u64,
    /// How long fetched resources are cached, in seconds
    ///
    /// By default nothing is cached.
    #[arg(long)]
    pub linked_data_cache_ttl: Option<u64>,
}
