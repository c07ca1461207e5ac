//! tastegraph: cluster anime viewers by taste and recommend unadapted works.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tastegraph_cli::commands::{graph_cmd, profile_cmd, recommend_cmd};
use tastegraph_cli::config::{self, Overrides};
use tastegraph_cli::output;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tastegraph")]
#[command(about = "Taste communities from anime ratings, with manga and novel recommendations")]
#[command(version)]
struct Cli {
    /// JSON file with pipeline parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress and summary lines
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the user-feature table from watch history
    Profile {
        /// Rated history CSV (username, anime_id, score)
        #[arg(long)]
        history: PathBuf,

        /// Anime catalogue CSV (id, nome, generos, source)
        #[arg(long)]
        catalogue: PathBuf,

        /// Where to write the profile table
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Build the similarity graph and describe its communities
    Graph {
        /// Profile table written by `tastegraph profile`
        #[arg(long)]
        profiles: PathBuf,

        /// Minimum cosine similarity for an edge
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Genres per community label
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Run the full pipeline and rank candidate works for each community
    Recommend {
        /// Profile table written by `tastegraph profile`
        #[arg(long)]
        profiles: PathBuf,

        /// Candidate works CSV (id, nome, score, tipo, generos)
        #[arg(long)]
        works: PathBuf,

        /// Minimum cosine similarity for an edge
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Recommendations per community
        #[arg(long)]
        top: Option<usize>,

        /// Genres per community label
        #[arg(long)]
        top_k: Option<usize>,

        /// Also write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    if cli.no_color {
        std::env::set_var(output::NO_COLOR_ENV, "1");
    }

    init_tracing(output::is_quiet());

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "tastegraph=warn" } else { "tastegraph=info" };
    let mut filter = EnvFilter::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        if let Ok(directive) = default.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(output::color_enabled())
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Profile {
            history,
            catalogue,
            out,
        } => {
            let config = config::resolve(config_path, &Overrides::default())?;
            profile_cmd::run(&history, &catalogue, &out, &config)
        }
        Commands::Graph {
            profiles,
            threshold,
            top_k,
        } => {
            let overrides = Overrides {
                threshold,
                top_k,
                ..Default::default()
            };
            graph_cmd::run(&profiles, config::resolve(config_path, &overrides)?)
        }
        Commands::Recommend {
            profiles,
            works,
            threshold,
            top,
            top_k,
            output,
        } => {
            let overrides = Overrides {
                threshold,
                top_n: top,
                top_k,
            };
            recommend_cmd::run(
                &profiles,
                &works,
                output.as_deref(),
                config::resolve(config_path, &overrides)?,
            )
        }
    }
}
