//! Exa MCP server entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use exa_mcp::config::{resolve_api_key, resolve_base_url, resolve_timeout};
use exa_mcp::protocol::ProtocolHandler;
use exa_mcp::session::CapabilitySession;
use exa_mcp::tools::ToolRegistry;
use exa_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "exa-mcp",
    about = "MCP server for Exa semantic web search",
    version
)]
struct Cli {
    /// Exa API key. Also reads EXA_API_KEY. Without one, clients must send `auth`.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Exa API root. Also reads EXA_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Upstream request timeout in seconds (0 = none). Also reads EXA_TIMEOUT_SECS.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3100")]
        addr: String,

        /// Bearer token required on /mcp.
        /// Also reads from EXA_MCP_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print server capabilities and tool schemas as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   exa-mcp completions bash > ~/.local/share/bash-completion/completions/exa-mcp
    ///   exa-mcp completions zsh > ~/.zfunc/_exa-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

/// Build the session and handler, pre-authenticating when a key is configured.
async fn build_handler(cli: &Cli) -> ProtocolHandler {
    let base_url = resolve_base_url(cli.base_url.as_deref());
    let timeout = resolve_timeout(cli.timeout);
    let session = Arc::new(CapabilitySession::with_exa(&base_url, timeout));

    tracing::info!("Upstream: {base_url}");

    match resolve_api_key(cli.api_key.as_deref()) {
        Some(key) => {
            session.authenticate(&key).await;
            tracing::info!("Pre-authenticated from configuration");
        }
        None => tracing::info!("No API key configured; waiting for `auth` request"),
    }

    ProtocolHandler::new(session)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => {
            let handler = build_handler(&cli).await;
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        #[cfg(feature = "sse")]
        Commands::ServeHttp { addr, token } => {
            use exa_mcp::transport::SseTransport;

            // Resolve token: CLI flag > env var
            let effective_token = token
                .clone()
                .or_else(|| std::env::var("EXA_MCP_TOKEN").ok());

            if effective_token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let handler = build_handler(&cli).await;
            let transport = SseTransport::new(handler, effective_token);
            transport.run(addr).await?;
        }

        Commands::Info => {
            let capabilities = exa_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools,
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "exa-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            let handler = build_handler(&cli).await;
            let session = handler.session().clone();
            let runtime = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || exa_mcp::repl::run(runtime, session)).await??;
        }
    }

    Ok(())
}
