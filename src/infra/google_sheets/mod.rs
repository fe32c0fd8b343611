// =============================================================================
// GOOGLE SHEETS MODULE
// =============================================================================
//
// HTTP access to the Google Sheets API. This is the only place that performs
// network I/O; the core layer sees it through the `SheetCatalog` and
// `PivotTableWriter` traits.
//
// Authentication is a service account (see `service_account.rs`). Every
// spreadsheet the agent works with must be shared with the service account
// email.

pub mod service_account;
pub mod sheets_client;

pub use service_account::ServiceAccountAuth;
pub use sheets_client::{GoogleSheetsClient, SheetsApiError, DEFAULT_BASE_URL};
