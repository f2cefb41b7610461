use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cosign_client::Client;
use cosign_log::LogFormat;
use cosign_server::Server;
use cosign_types::{Config, ProposalDraft, SequenceNumber};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "cosign",
    about = "Proposal and signature coordination for multisig wallets",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Write a default configuration to the home directory")]
    Init {
        #[arg(long, env = "COSIGN_HOME", value_name = "DIR", help = "Home directory for configuration")]
        home: Option<PathBuf>,

        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },

    #[command(about = "Start the coordination service")]
    Start {
        #[arg(long, env = "COSIGN_HOME", value_name = "DIR", help = "Home directory for configuration")]
        home: Option<PathBuf>,

        #[arg(long, value_name = "FILE", help = "Configuration file path")]
        config: Option<PathBuf>,

        #[arg(long, env = "COSIGN_LISTEN", value_name = "ADDR", help = "Listen address, e.g. 0.0.0.0:5000")]
        listen: Option<SocketAddr>,

        #[arg(long, env = "PORT", value_name = "PORT", help = "Listen port, keeping the configured host")]
        port: Option<u16>,

        #[arg(long, value_name = "LEVEL", help = "Log level (trace, debug, info, warn, error)")]
        log_level: Option<String>,

        #[arg(long, value_name = "FORMAT", help = "Log format (json, text)")]
        log_format: Option<LogFormat>,
    },

    #[command(about = "Display version information")]
    Version,

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    #[command(about = "Drive a running coordination service")]
    Proposal {
        #[arg(
            long,
            global = true,
            env = "COSIGN_NODE",
            default_value = "http://localhost:5000",
            value_name = "URL",
            help = "Coordination service URL"
        )]
        node: String,

        #[command(subcommand)]
        command: ProposalCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(long, env = "COSIGN_HOME", value_name = "DIR", help = "Home directory")]
        home: Option<PathBuf>,
    },

    #[command(about = "Validate configuration")]
    Validate {
        #[arg(value_name = "FILE", help = "Configuration file path")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProposalCommands {
    #[command(about = "List all proposals")]
    List,

    #[command(about = "Show one proposal")]
    Get {
        #[arg(value_name = "SEQ", help = "Sequence number")]
        sequence_number: SequenceNumber,

        #[arg(long, value_name = "N", help = "Contract threshold, reported as a quorum hint")]
        required: Option<u32>,
    },

    #[command(about = "Publish a proposal with the creator's signature")]
    Create {
        #[arg(long, value_name = "SEQ", help = "Contract sequence counter")]
        sequence_number: SequenceNumber,

        #[arg(long, value_name = "ADDRESS")]
        creator: String,

        #[arg(long, value_name = "ADDRESS")]
        target: String,

        #[arg(long = "call", value_name = "DESCRIPTION", help = "Human readable call, e.g. addSigner(address)")]
        human_readable_call: String,

        #[arg(long = "call-data", value_name = "HEX", help = "Encoded call data")]
        call_data: String,

        #[arg(long, value_name = "WEI", help = "Value in base units, defaults to 0")]
        value: Option<String>,

        #[arg(long, value_name = "SIG")]
        signature: String,
    },

    #[command(about = "Append a signature")]
    Sign {
        #[arg(value_name = "SEQ", help = "Sequence number")]
        sequence_number: SequenceNumber,

        #[arg(long, value_name = "SIG")]
        signature: String,
    },

    #[command(about = "Record on-chain execution")]
    Execute {
        #[arg(value_name = "SEQ", help = "Sequence number")]
        sequence_number: SequenceNumber,
    },

    #[command(about = "Drop every proposal on the service")]
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { home, force } => init_command(home, force),
        Commands::Start {
            home,
            config,
            listen,
            port,
            log_level,
            log_format,
        } => start_command(home, config, listen, port, log_level, log_format).await,
        Commands::Version => version_command(),
        Commands::Config { command } => config_command(command),
        Commands::Proposal { node, command } => proposal_command(&node, command).await,
    }
}

fn init_command(home: Option<PathBuf>, force: bool) -> Result<()> {
    setup_cli_logging()?;

    let home_dir = get_home_dir(home)?;
    let config_path = Config::config_path(&home_dir);

    if config_path.exists() && !force {
        anyhow::bail!(
            "configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    Config::default().save_to_file(&config_path)?;
    tracing::info!(path = %config_path.display(), "configuration written");
    println!("Initialized cosign home at {}", home_dir.display());
    Ok(())
}

async fn start_command(
    home: Option<PathBuf>,
    config_file: Option<PathBuf>,
    listen: Option<SocketAddr>,
    port: Option<u16>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
) -> Result<()> {
    let home_dir = get_home_dir(home)?;
    let mut config = match &config_file {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load(&home_dir)?,
    };

    // Command line overrides the file: --listen, then PORT
    if let Some(address) = listen {
        config.server.listen_address = address.to_string();
    } else if let Some(port) = port {
        let mut address = config.listen_address()?;
        address.set_port(port);
        config.server.listen_address = address.to_string();
    }
    if let Some(level) = log_level {
        config.log.level = level;
    }
    if let Some(format) = log_format {
        config.log.format = format;
    }
    config.validate()?;

    cosign_log::init_tracing_with_level(&config.log.level, config.log.format)
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(home = %home_dir.display(), "starting cosign");

    let server = Server::new(config)?;
    server.start().await?;
    Ok(())
}

fn version_command() -> Result<()> {
    println!("cosign {}", env!("CARGO_PKG_VERSION"));
    println!("build: {}", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn config_command(command: ConfigCommands) -> Result<()> {
    setup_cli_logging()?;

    match command {
        ConfigCommands::Show { home } => {
            let home_dir = get_home_dir(home)?;
            let config = Config::load(&home_dir)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Validate { file } => {
            validate_config(&file)?;
            println!("Configuration is valid");
        }
    }
    Ok(())
}

async fn proposal_command(node: &str, command: ProposalCommands) -> Result<()> {
    setup_cli_logging()?;

    let client = Client::connect(node).with_context(|| format!("invalid node url {node}"))?;

    let output = match command {
        ProposalCommands::List => serde_json::to_value(client.list_proposals().await?)?,
        ProposalCommands::Get {
            sequence_number,
            required,
        } => serde_json::to_value(client.get_proposal(sequence_number, required).await?)?,
        ProposalCommands::Create {
            sequence_number,
            creator,
            target,
            human_readable_call,
            call_data,
            value,
            signature,
        } => {
            let draft = ProposalDraft {
                sequence_number,
                creator,
                target,
                human_readable_call,
                call_data_selector: call_data,
                value,
                signature,
            };
            serde_json::to_value(client.create_proposal(&draft).await?)?
        }
        ProposalCommands::Sign {
            sequence_number,
            signature,
        } => serde_json::to_value(client.append_signature(sequence_number, &signature).await?)?,
        ProposalCommands::Execute { sequence_number } => {
            serde_json::to_value(client.mark_executed(sequence_number).await?)?
        }
        ProposalCommands::Reset => serde_json::to_value(client.reset().await?)?,
    };

    print_json(&output)
}

// Helper functions

/// Quiet logging for one-shot commands so stdout stays machine readable
fn setup_cli_logging() -> Result<()> {
    cosign_log::init_tracing_with_level("warn", LogFormat::Text).map_err(|e| anyhow::anyhow!(e))
}

fn get_home_dir(home: Option<PathBuf>) -> Result<PathBuf> {
    match home {
        Some(home) => Ok(home),
        None => Ok(Config::default_home()?),
    }
}

fn validate_config(path: &Path) -> Result<()> {
    Config::load_from_file(path)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
