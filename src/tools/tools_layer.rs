// Tool layer - the agent-facing adapter (tool schemas, dispatch, rendering,
// transport). No business logic lives here.

#[path = "tool_catalog.rs"]
pub mod tool_catalog;

#[path = "formatter.rs"]
pub mod formatter;

#[path = "sheets_tools.rs"]
pub mod sheets_tools;

#[path = "stdio_server.rs"]
pub mod stdio_server;

pub use sheets_tools::SheetsToolHandler;
