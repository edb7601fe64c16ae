//! CLI command implementations
//!
//! Both commands follow the same boot sequence: load and validate the
//! configuration, then open (and migrate) the database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use crate::config::ServiceConfig;
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::rest_api::AppState;
use crate::store::SqliteJobStore;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config, database } => init(&config, database),
        Command::Serve {
            config,
            host,
            port,
            database,
        } => serve(&config, host, port, database),
    }
}

/// Create the database and schema, then report where it lives
pub fn init(config_path: &Path, database: Option<PathBuf>) -> CliResult<()> {
    let config = load_config(config_path, None, None, database)?;
    let store = open_store(&config)?;

    write_response(json!({
        "initialized": true,
        "database": config.database_path.display().to_string(),
        "schema_version": store.schema_version()?,
    }))
}

/// Boot and serve the HTTP API until Ctrl-C
pub fn serve(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> CliResult<()> {
    log_event(Event::BootStart);

    let config = load_config(config_path, host, port, database)?;
    let store = open_store(&config)?;
    let state = AppState::with_metrics(Arc::new(store), Arc::new(MetricsRegistry::new()));
    let server = HttpServer::new(config, state);

    // Start the async runtime and run the server
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

fn load_config(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> CliResult<ServiceConfig> {
    let config = ServiceConfig::load(config_path)?.with_overrides(host, port, database)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &config_path.display().to_string()),
            ("addr", &config.socket_addr()),
        ],
    );
    Ok(config)
}

fn open_store(config: &ServiceConfig) -> CliResult<SqliteJobStore> {
    let path = config.database_path.display().to_string();
    let store = match SqliteJobStore::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            log_event_with_fields(
                Event::StoreOpenFailed,
                &[("database", &path), ("error", &e.to_string())],
            );
            return Err(e.into());
        }
    };
    log_event_with_fields(Event::StoreOpened, &[("database", &path)]);
    log_event_with_fields(
        Event::SchemaMigrated,
        &[("version", &store.schema_version()?.to_string())],
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_database() {
        let tmp = TempDir::new().unwrap();
        let database = tmp.path().join("nested").join("jobs.db");

        init(&tmp.path().join("missing.json"), Some(database.clone())).unwrap();
        assert!(database.exists());
    }

    #[test]
    fn test_init_reports_bad_config() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("jobsys.json");
        fs::write(&config, r#"{"port": 0}"#).unwrap();

        let err = init(&config, Some(tmp.path().join("jobs.db"))).unwrap_err();
        assert_eq!(err.code_str(), "JOBSYS_CLI_CONFIG_ERROR");
    }
}
