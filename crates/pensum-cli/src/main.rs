#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use pensum_core::config::{PensumConfig, ViewMode, resolve_config};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pensum: curriculum prerequisite graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `FORMAT`).
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Config file (default: `.pensum/config.toml`, then the user config).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Diagram orientation (overrides `render.view`).
    #[arg(long, value_enum, global = true)]
    view: Option<View>,

    #[command(subcommand)]
    command: Commands,
}

/// Command-line spelling of [`ViewMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum View {
    Tree,
    Horizontal,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Tree => Self::Tree,
            View::Horizontal => Self::Horizontal,
        }
    }
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph",
        about = "Build and project a graph payload",
        long_about = "Build the graph of one target course from a payload, detect cycles, \
                      assign levels and print the render-ready projection.",
        after_help = "EXAMPLES:\n    # Project a payload\n    pensum build payload.json\n\n    # Read from stdin, emit JSON for the renderer\n    cat payload.json | pensum build - --json"
    )]
    Build(cmd::build::BuildArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Project the route to a course of a catalog",
        long_about = "Extract every prerequisite of a course from a whole catalog, then build \
                      and project that sub-graph.",
        after_help = "EXAMPLES:\n    # Route to course 42\n    pensum route catalog.json 42\n\n    # Route by course code, left to right\n    pensum route catalog.json MAT-201 --view horizontal"
    )]
    Route(cmd::route::RouteArgs),

    #[command(
        next_help_heading = "Catalog",
        about = "List what a course requires",
        after_help = "EXAMPLES:\n    pensum requires catalog.json MAT-201"
    )]
    Requires(cmd::requires::RequiresArgs),

    #[command(
        next_help_heading = "Catalog",
        about = "List prerequisite cycles",
        after_help = "EXAMPLES:\n    pensum cycles catalog.json --json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Catalog",
        about = "Layer every course of a catalog",
        long_about = "Assign a level to every course of a catalog. Courses on or behind a \
                      prerequisite cycle are reported as unassigned.",
        after_help = "EXAMPLES:\n    pensum levels catalog.json"
    )]
    Levels(cmd::levels::LevelsArgs),

    #[command(about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

impl Commands {
    const fn needs_config(&self) -> bool {
        matches!(self, Self::Build(_) | Self::Route(_))
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PENSUM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "pensum_core=debug,pensum_graph=debug,pensum_cli=debug,info"
        } else {
            "pensum_graph=info,pensum_cli=info,warn"
        })
    });

    let format = env::var("PENSUM_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(cli: &Cli, output: OutputMode) -> anyhow::Result<PensumConfig> {
    let project_root = env::current_dir().context("failed to resolve working directory")?;
    let mut config = match resolve_config(cli.config.as_deref(), &project_root) {
        Ok(config) => config,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    if let Some(view) = cli.view {
        config.render.view = view.into();
    }
    debug!(?config, "config resolved");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    let config = if cli.command.needs_config() {
        load_config(&cli, output)?
    } else {
        PensumConfig::default()
    };

    match &cli.command {
        Commands::Build(args) => cmd::build::run_build(args, &config, output),
        Commands::Route(args) => cmd::route::run_route(args, &config, output),
        Commands::Requires(args) => cmd::requires::run_requires(args, output),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, output),
        Commands::Levels(args) => cmd::levels::run_levels(args, output),
        Commands::Completions(args) => cmd::completions::run_completions(args, Cli::command()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["pensum", "--json", "cycles", "catalog.json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["pensum", "build", "payload.json", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["pensum", "--json", "--format", "text", "levels", "c.json"]);
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn view_flag_maps_to_view_mode() {
        let cli = Cli::parse_from(["pensum", "route", "c.json", "1", "--view", "horizontal"]);
        assert_eq!(cli.view.map(ViewMode::from), Some(ViewMode::Horizontal));
    }

    #[test]
    fn only_graph_commands_read_config() {
        let cli = Cli::parse_from(["pensum", "build", "payload.json"]);
        assert!(cli.command.needs_config());
        let cli = Cli::parse_from(["pensum", "cycles", "catalog.json"]);
        assert!(!cli.command.needs_config());
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["pensum", "build", "p.json"],
            vec!["pensum", "route", "c.json", "MAT-101"],
            vec!["pensum", "requires", "c.json", "7"],
            vec!["pensum", "cycles", "c.json"],
            vec!["pensum", "levels", "c.json"],
            vec!["pensum", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
