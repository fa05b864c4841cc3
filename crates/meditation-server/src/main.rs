//! `meditation-server`: HTTP API and static pages for the meditation catalog.

mod api;
mod auth;
mod catalog;
mod config;
mod error;
mod openapi;
mod startup;
mod state;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "meditation-server", version = VERSION)]
pub(crate) struct Args {
    /// Full bind address, e.g. 127.0.0.1:3006 (overrides host and port).
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Listen port (overrides the PORT environment variable).
    #[arg(long)]
    port: Option<u16>,

    /// Optional server config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite document store path.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory with the static front-end pages.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,actix_web=info,meditation_server=info")
        }))
        .init();

    startup::run(args).await
}
