// Line-delimited JSON transport over stdin/stdout.
//
// One request per line:
//   {"id": 1, "method": "tools/list"}
//   {"id": 2, "method": "tools/call", "params": {"name": "...", "arguments": {...}}}
// One response per request:
//   {"id": 1, "result": {...}}   or   {"id": 1, "error": {"message": "..."}}
//
// stdout carries nothing but responses; logs go to stderr.

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::sheets_tools::SheetsToolHandler;
use crate::core::sheets::{PivotTableWriter, SheetCatalog};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn error_response(id: Value, message: impl Into<String>) -> Value {
    json!({"id": id, "error": {"message": message.into()}})
}

/// Handles one input line. Returns `None` when nothing should be written
/// back (blank lines and notifications).
pub async fn handle_line<B: SheetCatalog + PivotTableWriter>(
    handler: &SheetsToolHandler<B>,
    line: &str,
) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Some(error_response(Value::Null, format!("Malformed request: {}", e))),
    };

    if request.method.starts_with("notifications/") {
        return None;
    }

    let id = request.id;
    let response = match request.method.as_str() {
        "initialize" => json!({
            "id": id,
            "result": {
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {"tools": {}}
            }
        }),
        "tools/list" => json!({
            "id": id,
            "result": {"tools": handler.definitions()}
        }),
        "tools/call" => {
            let params: CallParams = match serde_json::from_value(request.params) {
                Ok(params) => params,
                Err(e) => return Some(error_response(id, format!("Invalid tools/call params: {}", e))),
            };

            tracing::debug!(tool = %params.name, "Tool call");

            match handler.execute(&params.name, &params.arguments).await {
                Ok(output) => json!({
                    "id": id,
                    "result": {
                        "content": [{"type": "text", "text": output.text}],
                        "isError": output.is_error
                    }
                }),
                Err(err) => error_response(id, err.to_string()),
            }
        }
        other => error_response(id, format!("Unknown method: {}", other)),
    };

    Some(response)
}

/// Serves requests until the reader hits EOF.
pub async fn serve<B, R, W>(handler: &SheetsToolHandler<B>, reader: R, mut writer: W) -> std::io::Result<()>
where
    B: SheetCatalog + PivotTableWriter,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if let Some(response) = handle_line(handler, &line).await {
            let mut out = response.to_string();
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
