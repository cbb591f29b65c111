use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the sopforge binary.
#[derive(Debug, Parser)]
#[command(
    name = "sopforge",
    version,
    about = "Incident-to-SOP generation and export server"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "SOPFORGE_CONFIG_FILE",
        value_name = "PATH"
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the sopforge HTTP service.
    Serve(Box<ServeArgs>),
    /// Export a saved SOP JSON file to a document without starting the server.
    #[command(name = "export")]
    Export(ExportArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the generative API key.
    #[arg(long = "llm-api-key", value_name = "KEY")]
    pub llm_api_key: Option<String>,

    /// Override the ordered model fallback list; repeat the flag per model.
    #[arg(long = "llm-model", value_name = "MODEL", action = clap::ArgAction::Append)]
    pub llm_models: Vec<String>,

    /// Override the generative API base endpoint.
    #[arg(long = "llm-endpoint", value_name = "URL")]
    pub llm_endpoint: Option<String>,

    /// Override the outbound request timeout.
    #[arg(long = "llm-timeout-seconds", value_name = "SECONDS")]
    pub llm_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Path to the SOP JSON file to export.
    #[arg(value_name = "SOP_JSON", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Target format (pdf|docx|html|clipboard).
    #[arg(long, value_name = "FORMAT", default_value = "pdf")]
    pub format: String,

    /// Path of the document to write; defaults to the sanitized SOP title
    /// in the current directory.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Step ids to mark completed; repeat the flag per step.
    #[arg(long = "completed", value_name = "STEP_ID", action = clap::ArgAction::Append)]
    pub completed: Vec<String>,
}
