//! ai-services MCP - tool servers and one-shot commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_services_mcp::chat::{ChatClient, CompletionOptions};
use ai_services_mcp::cli::AiServicesCli;
use ai_services_mcp::config::{AppConfig, ConfigLoader};
use ai_services_mcp::mcp::{serve_stdio, McpHttpServer, ServerKind, Toolset};
use ai_services_mcp::reference::{ReferenceClient, ReferenceQuery};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ServerArg {
    AiServices,
    Chat,
    Reference,
    All,
}

impl From<ServerArg> for ServerKind {
    fn from(arg: ServerArg) -> Self {
        match arg {
            ServerArg::AiServices => ServerKind::AiServices,
            ServerArg::Chat => ServerKind::Chat,
            ServerArg::Reference => ServerKind::Reference,
            ServerArg::All => ServerKind::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportArg {
    Stdio,
    Http,
}

#[derive(Parser)]
#[command(
    name = "ai-services-mcp",
    about = "MCP tools for the ai-services CLI, chat completions and reference documents",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file to use instead of the default search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an MCP server.
    Serve {
        /// Which tools to expose.
        #[arg(long, value_enum, default_value_t = ServerArg::All)]
        server: ServerArg,
        #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
        transport: TransportArg,
        /// Bind address for the HTTP transport.
        #[arg(long)]
        host: Option<String>,
        /// Port for the HTTP transport. Defaults per server.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print ai-services version information.
    Version {
        #[arg(long)]
        binary: Option<String>,
    },
    /// List ai-services application templates.
    Templates {
        #[arg(long)]
        binary: Option<String>,
    },
    /// List the container images of an application template.
    Images {
        template: String,
        #[arg(long)]
        binary: Option<String>,
    },
    /// Send a single chat completion request.
    Chat {
        input: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f64>,
        /// Request a single JSON response instead of a stream.
        #[arg(long)]
        no_stream: bool,
    },
    /// Look up reference documents for a prompt.
    Reference {
        prompt: String,
        #[arg(long)]
        num_chunks: Option<u32>,
        #[arg(long)]
        num_docs: Option<u32>,
        #[arg(long)]
        no_reranker: bool,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout carries the stdio transport
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    loader
        .load_with_env()
        .context("Failed to load configuration")
}

fn cli_for(config: &AppConfig, binary: Option<String>) -> AiServicesCli {
    AiServicesCli::new(binary.unwrap_or_else(|| config.ai_services.binary_path.clone()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(
    config: &AppConfig,
    kind: ServerKind,
    transport: TransportArg,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let toolset = Arc::new(Toolset::build(kind, config)?);

    match transport {
        TransportArg::Stdio => {
            tokio::select! {
                result = serve_stdio(toolset) => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, stopping"),
            }
        }
        TransportArg::Http => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port
                .or(config.server.port)
                .unwrap_or_else(|| kind.default_port());

            let cancel = CancellationToken::new();
            let shutdown = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    shutdown.cancel();
                }
            });

            McpHttpServer::new(toolset, host, port).run(cancel).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Serve {
            server,
            transport,
            host,
            port,
        } => serve(&config, server.into(), transport, host, port).await?,
        Commands::Version { binary } => {
            print_json(&cli_for(&config, binary).version().await?)?;
        }
        Commands::Templates { binary } => {
            print_json(&cli_for(&config, binary).templates().await?)?;
        }
        Commands::Images { template, binary } => {
            print_json(&cli_for(&config, binary).template_images(&template).await?)?;
        }
        Commands::Chat {
            input,
            model,
            max_tokens,
            temperature,
            no_stream,
        } => {
            let client = ChatClient::new(config.chat)?;
            let options = CompletionOptions {
                model,
                max_tokens,
                temperature,
                stream: Some(!no_stream),
                ..CompletionOptions::default()
            };
            println!("{}", client.complete(&input, options).await?);
        }
        Commands::Reference {
            prompt,
            num_chunks,
            num_docs,
            no_reranker,
        } => {
            let client = ReferenceClient::new(config.reference)?;
            let query = ReferenceQuery {
                prompt,
                num_chunks_post_rrf: num_chunks,
                num_docs_reranker: num_docs,
                use_reranker: no_reranker.then_some(false),
            };
            print_json(&client.lookup(query).await?)?;
        }
    }

    Ok(())
}
