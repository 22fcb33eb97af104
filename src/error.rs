//! Rich diagnostic error types for renku-aqs.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know what went wrong and how to
//! fix it. Data-sparsity conditions (a query matching zero or several nodes) are
//! never errors; only structural problems and malformed literals end up here.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for renku-aqs.
#[derive(Debug, Error, Diagnostic)]
pub enum AqsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Annotate(#[from] AnnotateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Astro(#[from] AstroError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Command(#[from] CommandError),
}

/// Result type for top-level operations.
pub type AqsResult<T> = std::result::Result<T, AqsError>;

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("provenance graph has not been generated: {path}")]
    #[diagnostic(
        code(aqs::graph::provenance_missing),
        help(
            "Please run 'renku graph generate' to create the project's provenance graph, \
             or pass the graph file explicitly as a path argument."
        )
    )]
    ProvenanceGraphMissing { path: String },

    #[error("unsupported RDF file format: {path}")]
    #[diagnostic(
        code(aqs::graph::unsupported_format),
        help("Use a file with a .ttl, .nt, .nq, .trig, .rdf, .n3, .jsonld or .json extension.")
    )]
    UnsupportedFormat { path: String },

    #[error("failed to load RDF data from {path}: {message}")]
    #[diagnostic(
        code(aqs::graph::load),
        help("Check that the file is well-formed for the format implied by its extension.")
    )]
    Load { path: String, message: String },

    #[error("SPARQL query error: {message}")]
    #[diagnostic(
        code(aqs::graph::sparql),
        help(
            "The SPARQL query failed. Check the query syntax and ensure \
             the oxigraph store is initialized."
        )
    )]
    Sparql { message: String },

    #[error("invalid IRI or blank node identifier: {value}")]
    #[diagnostic(
        code(aqs::graph::invalid_term),
        help("Terms handed to the RDF serializer must be absolute IRIs or valid blank node ids.")
    )]
    InvalidTerm { value: String },

    #[error("literal cannot be used as a subject: {value}")]
    #[diagnostic(
        code(aqs::graph::literal_subject),
        help("RDF subjects must be IRIs or blank nodes.")
    )]
    LiteralSubject { value: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(aqs::graph::serialize),
        help("The graph could not be written in the requested RDF syntax.")
    )]
    Serialize { message: String },

    #[error("I/O error on {path}")]
    #[diagnostic(
        code(aqs::graph::io),
        help("Check that the file exists and that you have the required permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

// ---------------------------------------------------------------------------
// Annotation pipeline errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnnotateError {
    #[error("malformed {what} literal on {node}: \"{value}\"")]
    #[diagnostic(
        code(aqs::annotate::malformed_literal),
        help("The provenance graph holds a value that cannot be interpreted. Regenerate the graph.")
    )]
    MalformedLiteral {
        what: String,
        node: String,
        value: String,
    },

    #[error("stage {stage} was added out of order (after {previous})")]
    #[diagnostic(
        code(aqs::annotate::stage_order),
        help(
            "Annotation stages consume triples that later stages rely on; \
             add them in the fixed order types, outputs, arguments, inputs, \
             activity-time, oda."
        )
    )]
    StageOrder { stage: String, previous: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Astro(#[from] AstroError),
}

/// Result type for annotation passes.
pub type AnnotateResult<T> = std::result::Result<T, AnnotateError>;

// ---------------------------------------------------------------------------
// Astronomy parsing errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AstroError {
    #[error("cannot parse angle: \"{input}\"")]
    #[diagnostic(
        code(aqs::astro::invalid_angle),
        help("Angles are written like \"5 arcmin\", \"0.1 deg\", \"10h20m30s\" or \"-12d30m\".")
    )]
    InvalidAngle { input: String },

    #[error("no unit specified for angle: \"{input}\"")]
    #[diagnostic(
        code(aqs::astro::missing_unit),
        help("Bare numbers are only accepted where a default unit applies; append a unit such as \"deg\".")
    )]
    MissingUnit { input: String },

    #[error("declination {degrees} deg is outside [-90, 90]")]
    #[diagnostic(
        code(aqs::astro::declination_range),
        help("Sky coordinates are read as \"<ra> <dec>\"; check the order of the two values.")
    )]
    DeclinationOutOfRange { degrees: f64 },

    #[error("expected two coordinate components, got \"{input}\"")]
    #[diagnostic(
        code(aqs::astro::coordinate_arity),
        help("Sky coordinates start with two whitespace-separated values: right ascension then declination.")
    )]
    CoordinateArity { input: String },
}

/// Result type for astronomy parsing.
pub type AstroResult<T> = std::result::Result<T, AstroError>;

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("malformed label markup: {message}")]
    #[diagnostic(
        code(aqs::render::label),
        help("Node and edge labels must be well-formed HTML-like Graphviz labels.")
    )]
    Label { message: String },

    #[error("node label has no title row: {node}")]
    #[diagnostic(
        code(aqs::render::title_row),
        help("Node labels are expected to start with a title row and an identifier row.")
    )]
    MissingTitleRow { node: String },

    #[error("cannot parse timestamp \"{value}\"")]
    #[diagnostic(
        code(aqs::render::timestamp),
        help("startedAtTime values must be ISO 8601 date-times, e.g. 2021-01-01T00:00:00.")
    )]
    Timestamp { value: String },

    #[error("failed to run graphviz binary `{binary}`")]
    #[diagnostic(
        code(aqs::render::graphviz_spawn),
        help("Install Graphviz or set `graphviz_binary` in the configuration.")
    )]
    GraphvizSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("graphviz exited with {status}: {stderr}")]
    #[diagnostic(
        code(aqs::render::graphviz_failed),
        help("Inspect the DOT text with RUST_LOG=debug to find the offending node.")
    )]
    GraphvizFailed { status: String, stderr: String },
}

/// Result type for rendering.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

// ---------------------------------------------------------------------------
// Run annotation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnnotationError {
    #[error("failed to read annotation file: {path}")]
    #[diagnostic(
        code(aqs::annotation::io),
        help("Check the permissions of the AQS metadata directory.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("annotation file is not valid JSON: {path}: {message}")]
    #[diagnostic(
        code(aqs::annotation::json),
        help("The astroquery hook writes JSON-LD documents; remove the corrupted file and rerun.")
    )]
    Json { path: String, message: String },

    #[error("annotation file has no \"@id\": {path}")]
    #[diagnostic(
        code(aqs::annotation::missing_id),
        help("Every JSON-LD annotation needs a top-level \"@id\" string.")
    )]
    MissingId { path: String },
}

/// Result type for run annotation collection.
pub type AnnotationResult<T> = std::result::Result<T, AnnotationError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(aqs::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(aqs::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(aqs::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for configuration.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Command output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    #[error("failed to render {what} as JSON: {message}")]
    #[diagnostic(
        code(aqs::command::json),
        help("Use --format ascii to print the table instead.")
    )]
    Json { what: String, message: String },
}

/// Result type for command output formatting.
pub type CommandResult<T> = std::result::Result<T, CommandError>;
