//! monban Server Binary
//!
//! Issues and refreshes tokens over HTTP on MONBAN_HTTP (e.g. 0.0.0.0:8080).
//! Run with --help for every setting and its environment variable.
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mb_core::log();
    mb_server::run(mb_server::Args::parse()).await
}
