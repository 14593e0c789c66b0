use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use srcbatch_engine::BatchError;
use tracing_subscriber::EnvFilter;

mod cli;
mod console;
mod remote;

use cli::{Command, RootArgs};

/// Exit status when the instance lacks server-side batch changes.
const EXIT_UNSUPPORTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = RootArgs::parse();

    match dispatch(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if error
                .downcast_ref::<BatchError>()
                .is_some_and(BatchError::is_unsupported)
            {
                eprintln!(
                    "error: {error}\n\nServer-side batch changes are not enabled on this instance. \
                     Ask a site admin to enable them, or run the batch spec locally."
                );
                return ExitCode::from(EXIT_UNSUPPORTED);
            }
            eprintln!("error: {}", srcbatch_util::redact_sensitive(&format!("{error:#}")));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Remote(args) => {
            let report = remote::run(args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
