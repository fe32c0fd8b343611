// This is the entry point of the Sheets pivot-table agent tool server.
//
// **Architecture Overview:**
// - `core/` = Business logic (range parsing, pivot compilation, service traits)
// - `infra/` = Implementations of core traits (Google Sheets API, in-memory)
// - `tools/` = Agent-facing adapter (tool schemas, dispatch, rendering, stdio)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve tool calls over stdin/stdout

#![recursion_limit = "256"]

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "tools/tools_layer.rs"]
mod tools;

mod config;

use crate::config::{AppConfig, Credentials};
use crate::core::sheets::{PivotTableService, SpreadsheetBackend};
use crate::infra::google_sheets::{GoogleSheetsClient, ServiceAccountAuth};
use crate::infra::sheets::InMemorySpreadsheets;
use crate::tools::stdio_server;
use crate::tools::SheetsToolHandler;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Spreadsheet seeded in dry-run mode so the tools have something to work on.
const DRY_RUN_SPREADSHEET_ID: &str = "dry-run";

async fn build_backend(config: &AppConfig) -> anyhow::Result<Box<dyn SpreadsheetBackend>> {
    if config.dry_run {
        tracing::warn!(
            spreadsheet_id = DRY_RUN_SPREADSHEET_ID,
            "SHEETS_DRY_RUN is set, using the in-memory spreadsheet"
        );
        let store = InMemorySpreadsheets::new();
        store.add_spreadsheet(DRY_RUN_SPREADSHEET_ID, &["Sheet1"]);
        return Ok(Box::new(store));
    }

    let auth = match &config.credentials {
        Some(Credentials::KeyFile(path)) => ServiceAccountAuth::from_file(path).await?,
        Some(Credentials::InlineJson(json)) => ServiceAccountAuth::from_json(json)?,
        None => anyhow::bail!("No Google credentials configured"),
    };

    tracing::info!(
        client_email = auth.client_email(),
        base_url = %config.base_url,
        "Using Google Sheets API"
    );

    Ok(Box::new(GoogleSheetsClient::new(auth, config.base_url.clone())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // stdout belongs to the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let backend = build_backend(&config)
        .await
        .context("Failed to initialize spreadsheet backend")?;
    let service = PivotTableService::new(backend, config.default_pivot_sheet_name.clone());
    let handler = SheetsToolHandler::new(service);

    tracing::info!("🚀 Sheets pivot agent is ready, reading requests from stdin");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    stdio_server::serve(&handler, stdin, tokio::io::stdout())
        .await
        .context("stdio transport failed")?;

    Ok(())
}
