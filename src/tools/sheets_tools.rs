// =============================================================================
// SHEETS TOOL HANDLER
// =============================================================================
//
// Turns a tool call (name + JSON arguments) into a pivot service call and
// renders the result. Argument decoding happens here; everything after that is
// core logic.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::formatter::{self, ResponseFormat};
use super::tool_catalog::{tool_definitions, ToolDefinition, CREATE_PIVOT_TABLE, LIST_SHEETS, RESOLVE_RANGE};
use crate::core::sheets::{
    PivotError, PivotTableService, PivotTableSpec, PivotTableWriter, SheetCatalog,
};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error(transparent)]
    Pivot(#[from] PivotError),
}

/// Text returned to the agent; `is_error` marks a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
struct CreatePivotTableArgs {
    spreadsheet_id: String,
    #[serde(default)]
    response_format: ResponseFormat,
    #[serde(flatten)]
    spec: PivotTableSpec,
}

#[derive(Debug, Deserialize)]
struct ListSheetsArgs {
    spreadsheet_id: String,
    #[serde(default)]
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ResolveRangeArgs {
    spreadsheet_id: String,
    range: String,
    #[serde(default)]
    response_format: ResponseFormat,
}

#[derive(Debug, Default, Deserialize)]
struct FormatOnly {
    #[serde(default)]
    response_format: ResponseFormat,
}

fn decode<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, PivotError> {
    T::deserialize(args).map_err(|e| PivotError::InvalidSpec(format!("{} arguments: {}", tool, e)))
}

pub struct SheetsToolHandler<B: SheetCatalog + PivotTableWriter> {
    service: PivotTableService<B>,
}

impl<B: SheetCatalog + PivotTableWriter> SheetsToolHandler<B> {
    pub fn new(service: PivotTableService<B>) -> Self {
        Self { service }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Runs a tool. Failures of the call itself come back as an error
    /// output; only an unknown tool name is an `Err`.
    pub async fn execute(&self, name: &str, args: &Value) -> Result<ToolOutput, ToolError> {
        // Best effort: a malformed call still gets its error in the format it asked for.
        let format = FormatOnly::deserialize(args)
            .unwrap_or_default()
            .response_format;

        let result = match name {
            CREATE_PIVOT_TABLE => self.create_pivot_table(args).await,
            LIST_SHEETS => self.list_sheets(args).await,
            RESOLVE_RANGE => self.resolve_range(args).await,
            _ => return Err(ToolError::UnknownTool(name.to_string())),
        };

        match result {
            Ok(text) => Ok(ToolOutput {
                text,
                is_error: false,
            }),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "Tool call failed");
                Ok(ToolOutput {
                    text: formatter::format_error(&err.to_string(), format),
                    is_error: true,
                })
            }
        }
    }

    async fn create_pivot_table(&self, args: &Value) -> Result<String, PivotError> {
        let args: CreatePivotTableArgs = decode(CREATE_PIVOT_TABLE, args)?;
        let summary = self
            .service
            .create_pivot_table(&args.spreadsheet_id, &args.spec)
            .await?;
        Ok(formatter::format_pivot_summary(&summary, args.response_format))
    }

    async fn list_sheets(&self, args: &Value) -> Result<String, PivotError> {
        let args: ListSheetsArgs = decode(LIST_SHEETS, args)?;
        let sheets = self.service.list_sheets(&args.spreadsheet_id).await?;
        Ok(formatter::format_sheet_list(
            &args.spreadsheet_id,
            &sheets,
            args.response_format,
        ))
    }

    async fn resolve_range(&self, args: &Value) -> Result<String, PivotError> {
        let args: ResolveRangeArgs = decode(RESOLVE_RANGE, args)?;
        let region = self
            .service
            .resolve_range(&args.spreadsheet_id, &args.range)
            .await?;
        Ok(formatter::format_region(&args.range, &region, args.response_format))
    }
}
