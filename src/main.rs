use crate::generator::workflow::launch;
use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod gate;
mod generator;
mod llm;
mod media;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = args.into_config();

    launch(&config).await
}
