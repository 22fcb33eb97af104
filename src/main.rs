//! renku-aqs CLI: astroquery requests in the Renku provenance graph.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use renku_aqs::annotations::collect_run_annotations;
use renku_aqs::commands::{self, DisplayOptions, OutputFormat};
use renku_aqs::config::AqsConfig;

#[derive(Parser)]
#[command(name = "renku-aqs", version, about = "Astroquery provenance for Renku projects")]
struct Cli {
    /// Configuration file (default: .renku/aqs.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log per-node decisions.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Leaderboard of astroquery requests per module and object.
    Leaderboard {
        /// Git revision (accepted, not used for filtering).
        #[arg(long, default_value = "HEAD")]
        revision: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
        format: OutputFormat,

        /// Provenance graph files to load instead of the project's.
        paths: Vec<PathBuf>,
    },

    /// List the parameters of astroquery requests.
    Params {
        /// Git revision (accepted, not used for filtering).
        #[arg(long, default_value = "HEAD")]
        revision: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
        format: OutputFormat,

        /// Provenance graph files to load instead of the project's.
        paths: Vec<PathBuf>,
    },

    /// Render the annotated workflow graph to an image.
    Display {
        /// Git revision (accepted, not used for filtering).
        #[arg(long, default_value = "HEAD")]
        revision: String,

        /// Output image file; its extension selects the format.
        #[arg(long)]
        filename: Option<String>,

        /// Only workflows reading this input (e.g. a notebook name).
        #[arg(long)]
        input_notebook: Option<String>,

        /// Leave out astroquery request information.
        #[arg(long)]
        no_oda_info: bool,

        /// Provenance graph files to load instead of the project's.
        paths: Vec<PathBuf>,
    },

    /// Collect the JSON-LD annotations recorded for a run.
    Annotations {
        /// Run (activity) identifier.
        run_id: String,
    },
}

fn warn_revision(revision: &str) {
    if revision != "HEAD" {
        tracing::warn!(%revision, "revision filtering is not supported, using the full graph");
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().into_diagnostic()?;
    let config = AqsConfig::discover(cli.config.as_deref(), &cwd)?;
    let namespaces = config.namespaces();

    match cli.command {
        Commands::Leaderboard {
            revision,
            format,
            paths,
        } => {
            warn_revision(&revision);
            let store = commands::open_provenance(&config, &paths)?;
            let entries = commands::leaderboard(&store, &namespaces)?;
            println!("{}", commands::format_leaderboard(&entries, format)?);
        }

        Commands::Params {
            revision,
            format,
            paths,
        } => {
            warn_revision(&revision);
            let store = commands::open_provenance(&config, &paths)?;
            let report = commands::params(&store, &namespaces)?;
            println!("{}", commands::format_params(&report.rows, format)?);
            if report.invalid > 0 {
                println!(
                    "Some entries within the graph are not valid and therefore the store should be recreated\n"
                );
            }
            let text = commands::write_subgraph(&report.subgraph, &config.subgraph_path())?;
            println!("{text}");
        }

        Commands::Display {
            revision,
            filename,
            input_notebook,
            no_oda_info,
            paths,
        } => {
            warn_revision(&revision);
            let store = commands::open_provenance(&config, &paths)?;
            let options = DisplayOptions {
                input_notebook,
                no_oda_info,
            };
            let outcome = commands::display(&store, &namespaces, &options)?;
            let text = commands::write_subgraph(&outcome.graph, &config.subgraph_path())?;
            println!("{text}");
            let image = config.image_path(filename.as_deref());
            outcome
                .diagram
                .write_image(&image, &config.graphviz_binary)?;
            println!("Graph written to {}", image.display());
        }

        Commands::Annotations { run_id } => {
            let annotations = collect_run_annotations(&config.metadata_dir, &run_id)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&annotations).into_diagnostic()?
            );
        }
    }

    Ok(())
}
