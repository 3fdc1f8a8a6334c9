use blockchain_utils::init_logger;
use clap::Parser;
use snafu::ResultExt;
use swap_batcher::{args::Args, run, LoggerSnafu};

#[tokio::main]
async fn main() -> swap_batcher::Result<()> {
    // Parse args once to get the env_file path if specified
    let args = Args::parse();

    if let Some(env_file) = &args.env_file {
        if let Err(e) = dotenvy::from_path(env_file) {
            eprintln!("Failed to load env file {}: {e}", env_file.display());
            std::process::exit(2);
        }
    } else {
        let _ = dotenvy::dotenv();
    }

    // Re-parse args to pick up environment variables from the loaded file
    let args = Args::parse();

    init_logger(&args.log_level).context(LoggerSnafu)?;

    run(args).await
}
