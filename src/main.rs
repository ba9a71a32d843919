use anyhow::Result;
use clap::Parser;
use cv_screen::cli;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args).await {
        error!("{:#}", err);
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
