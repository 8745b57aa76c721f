use std::path::{Path, PathBuf};

mod flatten;
mod list;
mod ssh_to_https;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use requirement_walker::Config;

/// The configuration file looked up in the working directory when
/// `--config` is not given.
const DEFAULT_CONFIG: &str = "requirement-walker.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Loads an explicitly requested configuration file, or the default one if it
/// exists.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::load_or_default(Path::new(DEFAULT_CONFIG))),
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List the entries of a requirements file
    List(list::Command),

    /// Write a requirements file and everything it includes to a single file
    Flatten(flatten::Command),

    /// Swap SSH git URLs for HTTPS where the SSH host is not reachable
    ///
    /// The result is written to a single flattened file.
    SshToHttps(ssh_to_https::Command),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(config)?,
            Self::Flatten(command) => command.run(config)?,
            Self::SshToHttps(command) => command.run(config)?,
        }
        Ok(())
    }
}
