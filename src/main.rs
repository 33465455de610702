use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use clap::{Parser, ValueEnum};
use mcp_mealie::{ClientConfig, MealieClient, MealieMcpServer};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Sse,
}

/// MCP server for the Mealie recipe manager.
///
/// Credentials come from MEALIE_URL, MEALIE_USERNAME and MEALIE_PASSWORD.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Transport used to talk to the MCP client
    #[arg(long, value_enum, default_value = "sse")]
    transport: Transport,

    /// Address the SSE transport listens on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3001")]
    bind: SocketAddr,
}

fn init_tracing() -> anyhow::Result<()> {
    // stdout carries the stdio transport, so logs always go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("MEALIE_MCP_LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase();
        let level = match level.as_str() {
            "warning" => "warn",
            "critical" => "error",
            other => other,
        };
        EnvFilter::new(level)
    });

    let file_layer = match std::env::var("MEALIE_MCP_LOG_FILE") {
        Ok(path) if !path.is_empty() => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            )
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

async fn serve(client: Arc<MealieClient>, args: &Args) -> anyhow::Result<()> {
    match args.transport {
        Transport::Stdio => {
            tracing::info!("Serving Mealie MCP over stdio");
            let service = MealieMcpServer::new(client)
                .serve(rmcp::transport::stdio())
                .await?;
            service.waiting().await?;
        }
        Transport::Sse => {
            let config = SseServerConfig {
                bind: args.bind,
                sse_path: "/sse".to_string(),
                post_path: "/message".to_string(),
                ct: tokio_util::sync::CancellationToken::new(),
                sse_keep_alive: None,
            };

            tracing::info!("Mealie MCP Server listening on {}", config.bind);

            // serve_with_config handles binding, axum server setup, and graceful shutdown internally
            let sse_server = SseServer::serve_with_config(config).await?;
            let ct = sse_server.with_service(move || MealieMcpServer::new(client.clone()));

            tracing::info!("Mealie MCP Server started successfully");

            // Wait for Ctrl+C
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutting down...");
            ct.cancel();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let config = ClientConfig::from_env()?;
    tracing::info!("Connecting to Mealie at {}", config.base_url);

    let client = match MealieClient::connect(config.clone()).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            tracing::error!("Please verify:");
            tracing::error!("  - MEALIE_URL is correct: {}", config.base_url);
            tracing::error!("  - MEALIE_USERNAME is correct: {}", config.username);
            tracing::error!("  - MEALIE_PASSWORD is correct");
            tracing::error!("  - Mealie server is running and accessible");
            return Err(e.into());
        }
    };
    tracing::info!("Authenticated with Mealie");

    let result = serve(client.clone(), &args).await;
    if let Err(e) = &result {
        tracing::error!("Fatal error in MCP server: {}", e);
    }

    client.close().await;
    tracing::info!("Shutting down Mealie MCP server");
    result
}
