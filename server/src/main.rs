use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::load_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus directory of .txt files, or a .json/.jsonl manifest
    #[arg(long, default_value = "./pdfs")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 1999)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    // The index is fully built before the listener is bound.
    let app: Router = load_app(&args.corpus)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, corpus = %args.corpus, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
