// Renders tool results for the agent, as Markdown (default) or pretty JSON.

use crate::core::sheets::column_address::to_letters;
use crate::core::sheets::pivot_models::SourceRegion;
use crate::core::sheets::range_parser::UNBOUNDED_END_ROW;
use crate::core::sheets::{PivotTableSummary, SheetInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// `A1:E100`, or `A:E` when the rows run to the sentinel end.
pub fn region_a1(region: &SourceRegion) -> String {
    let start_col = to_letters(region.start_col);
    let end_col = to_letters(region.end_col.saturating_sub(1));
    if region.start_row == 0 && region.end_row == UNBOUNDED_END_ROW {
        format!("{}:{}", start_col, end_col)
    } else {
        format!(
            "{}{}:{}{}",
            start_col,
            region.start_row + 1,
            end_col,
            region.end_row
        )
    }
}

pub fn format_pivot_summary(summary: &PivotTableSummary, format: ResponseFormat) -> String {
    match format {
        ResponseFormat::Json => to_json(summary),
        ResponseFormat::Markdown => {
            let destination = match &summary.destination_sheet_name {
                Some(name) => format!("{} (sheet id {})", name, summary.destination_sheet_id),
                None => format!("sheet id {}", summary.destination_sheet_id),
            };

            let mut out = String::from("## Pivot table created\n\n");
            out.push_str(&format!("- **Spreadsheet:** `{}`\n", summary.spreadsheet_id));
            out.push_str(&format!(
                "- **Source:** `{}` (sheet id {})\n",
                summary.source_range, summary.source_sheet_id
            ));
            out.push_str(&format!("- **Destination:** {}\n", destination));
            out.push_str(&format!(
                "- **Layout:** {} row group(s), {} column group(s), {} value(s), {} filter(s)\n",
                summary.row_groups, summary.column_groups, summary.values, summary.filters
            ));
            out
        }
    }
}

pub fn format_sheet_list(spreadsheet_id: &str, sheets: &[SheetInfo], format: ResponseFormat) -> String {
    match format {
        ResponseFormat::Json => to_json(&json!({
            "spreadsheet_id": spreadsheet_id,
            "sheets": sheets,
        })),
        ResponseFormat::Markdown => {
            if sheets.is_empty() {
                return format!("Spreadsheet `{}` has no sheets.\n", spreadsheet_id);
            }

            let mut out = format!("## Sheets in `{}`\n\n", spreadsheet_id);
            out.push_str("| # | Title | Sheet ID |\n|---|---|---|\n");
            for (i, sheet) in sheets.iter().enumerate() {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    i + 1,
                    sheet.title.replace('|', "\\|"),
                    sheet.sheet_id
                ));
            }
            out
        }
    }
}

pub fn format_region(range: &str, region: &SourceRegion, format: ResponseFormat) -> String {
    match format {
        ResponseFormat::Json => to_json(&json!({
            "range": range,
            "region": region,
        })),
        ResponseFormat::Markdown => format!(
            "`{}` resolves to `{}` on sheet id {} (rows {}..{}, columns {}..{}, end exclusive)\n",
            range,
            region_a1(region),
            region.sheet_id,
            region.start_row,
            region.end_row,
            region.start_col,
            region.end_col
        ),
    }
}

pub fn format_error(message: &str, format: ResponseFormat) -> String {
    match format {
        ResponseFormat::Json => to_json(&json!({"success": false, "error": message})),
        ResponseFormat::Markdown => format!("**Error:** {}\n", message),
    }
}
