//! Command-line argument parsing for csql.

use clap::{Parser, Subcommand};
use csql_client::config::{Config, EngineConfig};
use csql_client::error::Result;
use std::path::PathBuf;

/// Client for the CSQL engine.
#[derive(Parser, Debug)]
#[command(name = "csql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Engine endpoint (e.g., csql://127.0.0.1:9000)
    #[arg(short = 'e', long, value_name = "URL", global = true)]
    pub endpoint: Option<String>,

    /// Engine host
    #[arg(short = 'H', long, value_name = "HOST", global = true)]
    pub host: Option<String>,

    /// Engine port
    #[arg(short = 'p', long, value_name = "PORT", global = true)]
    pub port: Option<u16>,

    /// Exchange timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive prompt (default)
    Repl,

    /// Send one statement and print the reply
    Exec {
        /// Statement text, sent as is
        sql: String,

        /// Decode the reply into rows
        #[arg(long)]
        rows: bool,

        /// Print decoded rows as JSON (implies --rows)
        #[arg(long)]
        json: bool,
    },

    /// List users
    Users {
        #[arg(long)]
        json: bool,
    },

    /// List orders joined with their users
    Orders {
        #[arg(long)]
        json: bool,
    },

    /// Create the demo schema and seed rows
    Seed,

    /// Bulk-insert users and orders and report what the engine did
    Stress {
        /// Users (and orders) to insert
        #[arg(long, default_value_t = 500)]
        count: u32,

        /// Inserts in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run; the REPL when none is given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Repl)
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Resolves the engine endpoint.
    ///
    /// Precedence: individual flags, then `--endpoint`, then the config
    /// file, then environment variables (`CSQL_ENDPOINT` and friends), then
    /// built-in defaults.
    pub fn resolve_engine(&self, config: &Config) -> Result<EngineConfig> {
        let mut engine = config.engine.clone();
        engine.apply_env_defaults()?;

        if let Some(endpoint) = &self.endpoint {
            let parsed = EngineConfig::from_endpoint(endpoint)?;
            engine.host = parsed.host;
            engine.port = parsed.port;
        }
        if let Some(host) = &self.host {
            engine.host = host.clone();
        }
        if let Some(port) = self.port {
            engine.port = port;
        }
        if let Some(ms) = self.timeout_ms {
            engine.timeout_ms = ms;
        }

        engine.validate()?;
        Ok(engine)
    }
}
