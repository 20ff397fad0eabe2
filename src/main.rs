//! athena-frame - Run SQL on Amazon Athena and print the result.

mod cli;
mod logging;

use athena_frame::config::Config;
use athena_frame::error::{AthenaError, Result};
use athena_frame::output;
use athena_frame::Connector;
use cli::Cli;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.parse_output_format()?;
    let sql = cli.query_text()?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connector_config = cli.resolve_connector(&config)?;
    let output_location = connector_config.output_location.clone().ok_or_else(|| {
        AthenaError::config(
            "No output location configured. Use --output-location or set ATHENA_OUTPUT_LOCATION",
        )
    })?;
    info!("Connection: {}", connector_config.display_string());

    let connector = Connector::connect(&connector_config).await?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no longer waiting for the query");
            ctrl_c.cancel();
        }
    });

    let table = connector
        .query_with_cancel(&sql, &output_location, &cancel)
        .await?;

    print!("{}", output::render(&table, format)?);
    Ok(())
}
