//! healthreport - runs the health-report SQL battery against a database.

use std::io::{self, Write};

use healthreport::cli::Cli;
use healthreport::config::{redact_connection_string, Config, ConnectionConfig};
use healthreport::db::{self, DatabaseBackend, DatabaseClient};
use healthreport::error::{ReportError, Result};
use healthreport::logging::init_logging;
use healthreport::report::{sink_for, write_plan, OutputFormat};
use healthreport::script::{
    health_report_plan, run_plan, run_statements, RunSummary, TransactionMode,
};
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    cli.validate().map_err(ReportError::config)?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let mode = cli.transaction_mode(&config.run).map_err(ReportError::config)?;
    let format = cli.output_format(&config.run).map_err(ReportError::config)?;

    // Precedence:
    // 1. Connection string (highest)
    // 2. -H/-p/-d/-U over the named or default connection from config
    // 3. Environment variables
    let connection = resolve_connection(&cli, &config)?;

    if cli.list {
        let mut out = io::stdout().lock();
        write_plan(&mut out, &health_report_plan(), connection.backend)?;
        out.flush()?;
        return Ok(());
    }

    if connection.backend == DatabaseBackend::Postgres && connection.database.is_none() {
        return Err(ReportError::config(
            "No database configured. Pass a connection string, use --connection, or set PGDATABASE",
        ));
    }

    if let Ok(conn_str) = connection.to_connection_string() {
        info!("Connecting to {}", redact_connection_string(&conn_str));
    }
    let mut client = db::connect(&connection).await?;

    let result = execute(&cli, client.as_mut(), mode, format).await;
    if let Err(e) = client.close().await {
        warn!("Failed to close connection: {}", e);
    }
    let summary = result?;

    info!(
        "{} statements, {} rows fetched, {} rows affected ({})",
        summary.stats.statements,
        summary.stats.rows_fetched,
        summary.stats.rows_affected,
        summary.completion.as_str()
    );
    Ok(())
}

async fn execute(
    cli: &Cli,
    client: &mut dyn DatabaseClient,
    mode: TransactionMode,
    format: OutputFormat,
) -> Result<RunSummary> {
    if let Some(seed) = &cli.seed {
        info!("Seeding from {}", seed.display());
        let sql = std::fs::read_to_string(seed).map_err(|e| {
            ReportError::config(format!("Failed to read seed file {}: {e}", seed.display()))
        })?;
        client.execute_batch(&sql).await?;
    }

    let stdout = io::stdout();
    let mut sink = sink_for(format, stdout.lock());

    if cli.is_exec() {
        run_statements(client, &cli.exec, &cli.prefix, mode, sink.as_mut()).await
    } else {
        run_plan(client, &health_report_plan(), mode, sink.as_mut()).await
    }
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = cli.resolve_connection(config)?;
    connection.apply_env_defaults();

    info!("Connection: {}", connection.display_string());
    Ok(connection)
}
