//! Adapt CLI - run finite-state and adaptive automata from the terminal.
//!
//! Devices come from a builtin sample or a JSON description file.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{config as config_cmd, run::RunOptions};
use config::{Config, LogFormat};

/// Adapt CLI - evaluate inputs against adaptive automata.
#[derive(Parser, Debug)]
#[command(
    name = "adapt",
    author,
    version,
    about = "Adapt: run finite-state and adaptive automata",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Builtin sample devices.
#[derive(ValueEnum, Debug, Clone, Copy)]
enum Builtin {
    /// Plain a*b+ automaton.
    Ab,
    /// Adaptive aⁿbⁿcⁿ recognizer.
    Anbncn,
}

impl Builtin {
    fn name(self) -> &'static str {
        match self {
            Builtin::Ab => "ab",
            Builtin::Anbncn => "anbncn",
        }
    }
}

/// Where the device comes from.
#[derive(clap::Args, Debug)]
struct DeviceSource {
    /// Builtin sample device.
    #[arg(short, long, value_enum, conflicts_with = "device")]
    builtin: Option<Builtin>,

    /// JSON device description file.
    #[arg(short, long)]
    device: Option<PathBuf>,
}

/// Execution options shared by `run` and `repl`.
#[derive(clap::Args, Debug)]
struct ExecutionArgs {
    /// Input symbol separator; empty splits into characters.
    #[arg(short, long)]
    separator: Option<String>,

    /// Rebuild the device before every input.
    #[arg(long)]
    fresh: bool,

    /// Maximum rule applications per input.
    #[arg(long)]
    max_steps: Option<usize>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run inputs against a device, in order.
    ///
    /// Adaptive changes made by one input persist into the next
    /// unless `--fresh` is given.
    Run {
        #[command(flatten)]
        source: DeviceSource,

        #[command(flatten)]
        execution: ExecutionArgs,

        /// Inputs to evaluate.
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Read inputs line by line and evaluate each against the same device.
    Repl {
        #[command(flatten)]
        source: DeviceSource,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// List the states, functions and rules of a device.
    Show {
        #[command(flatten)]
        source: DeviceSource,
    },

    /// Print a builtin device as a JSON description.
    Example {
        /// Builtin sample to export.
        #[arg(value_enum)]
        name: Builtin,

        /// Output file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Show path to config file.
    Path,
}

fn init_tracing(cli: &Cli, format: LogFormat) {
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init(),
    }
}

impl DeviceSource {
    fn load(&self) -> Result<adaptive_automaton::DeviceDescription> {
        commands::load_description(self.builtin.map(Builtin::name), self.device.as_deref())
    }
}

impl ExecutionArgs {
    fn options(
        &self,
        description: &adaptive_automaton::DeviceDescription,
        config: &Config,
    ) -> RunOptions {
        RunOptions {
            separator: commands::resolve_separator(self.separator.as_deref(), description, config),
            fresh: self.fresh,
            max_steps: self.max_steps.or(config.max_steps),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config decides the log format, so it loads first.
    let config = Config::load()?;
    init_tracing(&cli, config.log_format);

    match &cli.command {
        Commands::Run {
            source,
            execution,
            inputs,
        } => {
            let description = source.load()?;
            let options = execution.options(&description, &config);
            commands::run::execute(&description, inputs, options)?;
        }

        Commands::Repl { source, execution } => {
            let description = source.load()?;
            let options = execution.options(&description, &config);
            let stdin = io::stdin();
            commands::repl::execute(&description, options, stdin.lock(), io::stdout())?;
        }

        Commands::Show { source } => {
            let description = source.load()?;
            commands::show::execute(&description)?;
        }

        Commands::Example { name, output } => {
            commands::example::execute(name.name(), output.as_deref())?;
        }

        Commands::Config(config_cmd_inner) => match config_cmd_inner {
            ConfigCommands::Show => {
                config_cmd::show(&config)?;
            }
            ConfigCommands::Path => {
                if let Some(path) = Config::config_file_path() {
                    println!("{}", path.display());
                } else {
                    println!("(no config file path available)");
                }
            }
        },
    }

    Ok(())
}
