//! Bounty Gateway - HTTP server resolving CMS paths to content.
//!
//! Serves entity JSON, redirects and project listings backed by the
//! content graph. Stops accepting connections on SIGINT or SIGTERM and
//! drains in-flight requests before exiting.

use anyhow::Context;
use axum::Router;
use axum::http::Request;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use bounty_gateway::{AppState, Config, router, shutdown};

/// Resolve CMS paths to entities and redirects.
#[derive(Parser, Debug)]
#[command(name = "bounty-gateway")]
#[command(about = "Route resolution gateway for the bounty CMS", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,

    /// Override the bind address from GATEWAY_BIND_ADDR.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)
            .with_context(|| format!("failed to load {}", args.dotenv))?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let bind_addr = config.bind_addr.clone();

    let state = AppState::new(config)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

/// Router plus request tracing and CORS.
fn build_app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        // Path only: query strings can carry preview tokens.
        tracing::span!(
            Level::INFO,
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router(state).layer(trace).layer(cors)
}
