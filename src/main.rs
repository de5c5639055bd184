//! LinkedIn MCP Server - profile optimization tools for AI agents.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use linkedin_agent_mcp::config::Config;
use linkedin_agent_mcp::generate::{OpenAiGenerator, TextGenerator};
use linkedin_agent_mcp::{http, ProfileMcpServer, ProfileOrchestrator};

/// LinkedIn MCP Server - headline and summary optimization for AI agents.
#[derive(Parser, Debug)]
#[command(name = "linkedin-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serve the secondary HTTP interface instead of MCP stdio.
    #[arg(long, default_value = "false")]
    http: bool,

    /// HTTP listen port (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON.
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    // Initialize logging - output to stderr to avoid interfering with the
    // MCP protocol on stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("LinkedIn MCP Server starting");

    let generator: Option<Arc<dyn TextGenerator>> = match &config.openai_api_key {
        Some(key) => {
            info!("LLM generation enabled (model: {})", config.openai_model);
            Some(Arc::new(OpenAiGenerator::new(
                key.clone(),
                config.openai_model.clone(),
                std::time::Duration::from_secs(config.llm_timeout_secs),
            )?))
        }
        None => {
            info!("No LLM configured; tools run in rule-based fallback mode");
            None
        }
    };

    let orchestrator = Arc::new(ProfileOrchestrator::new(generator));

    if args.http {
        let port = args.port.unwrap_or(config.port);
        http::serve(orchestrator, port).await?;
    } else {
        let mut server = ProfileMcpServer::new(orchestrator);
        server.run_stdio().await?;
    }

    Ok(())
}
