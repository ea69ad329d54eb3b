use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use server::handlers::http::build_api_router;
use server::token::TokenService;
use server::{AppState, database, serve_request};
use shared::config::load_config;

#[derive(Parser, Debug)]
#[command(name = "server", about = "User registration and login API")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let tokens = TokenService::from_config(&config.auth).context("Failed to load token keys")?;

    let db = database::connect(&config.database.resolved_url(), config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    database::create_tables(&db)
        .await
        .context("Failed to create database tables")?;

    let addr = config.server.addr();
    let state = AppState::new(db, config, tokens);
    let router = Arc::new(build_api_router());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let io = TokioIo::new(stream);
                let router = Arc::clone(&router);
                let state = state.clone();

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        serve_request(Arc::clone(&router), state.clone(), req)
                    });

                    if let Err(err) = http1::Builder::new()
                        .timer(TokioTimer::new())
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", peer, err);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    state.db.close().await;
    info!("Server closed!");
    Ok(())
}
