//! `medsheet` binary entry point.

use anyhow::Result;
use clap::Parser;
use medsheet_server::cli::{Cli, EnumCommand, run_convert};
use medsheet_server::{ServerState, start_server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "medsheet_server=info,medsheet_io_xlsx=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        EnumCommand::Serve(args) => {
            let state = ServerState::new(args.convert.to_convert_options(), args.max_upload_mb);
            tracing::info!(
                group_field = %state.options.group_field,
                max_upload_mb = args.max_upload_mb,
                "Starting medsheet server"
            );
            start_server(&args.addr, state).await?;
        }
        EnumCommand::Convert(args) => {
            let path_out = tokio::task::spawn_blocking(move || run_convert(&args)).await??;
            println!("{}", path_out.display());
        }
    }

    Ok(())
}
