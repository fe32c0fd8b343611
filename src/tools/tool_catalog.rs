// Tool definitions advertised to the agent.
// Each tool is a name, a description and a JSON schema for its arguments.

use serde::Serialize;
use serde_json::{json, Value};

pub const CREATE_PIVOT_TABLE: &str = "create_pivot_table";
pub const LIST_SHEETS: &str = "list_sheets";
pub const RESOLVE_RANGE: &str = "resolve_range";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

fn response_format_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["markdown", "json"],
        "description": "Output format. Defaults to markdown."
    })
}

fn column_schema(description: &str) -> Value {
    json!({
        "oneOf": [
            {"type": "integer", "minimum": 0},
            {"type": "string", "pattern": "^[A-Za-z]+$"}
        ],
        "description": description
    })
}

fn group_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "source_column": column_schema("Column to group by: zero-based index or letters."),
            "label": {"type": "string"},
            "show_totals": {"type": "boolean", "default": true},
            "sort_order": {"type": "string", "enum": ["ASCENDING", "DESCENDING"]},
            "sort_by_value_index": {
                "type": "integer",
                "minimum": 0,
                "description": "Sort groups by the value at this index in `values`."
            },
            "group_rule": {
                "type": "object",
                "description": "Set exactly one of the rules.",
                "properties": {
                    "date_time_rule": {
                        "type": "object",
                        "properties": {
                            "type": {
                                "type": "string",
                                "enum": [
                                    "SECOND", "MINUTE", "HOUR", "HOUR_MINUTE", "HOUR_MINUTE_AMPM",
                                    "DAY_OF_WEEK", "DAY_OF_YEAR", "DAY_OF_MONTH", "DAY_MONTH",
                                    "MONTH", "QUARTER", "YEAR", "YEAR_MONTH", "YEAR_QUARTER",
                                    "YEAR_MONTH_DAY"
                                ]
                            }
                        },
                        "required": ["type"]
                    },
                    "histogram_rule": {
                        "type": "object",
                        "properties": {
                            "interval": {"type": "number", "exclusiveMinimum": 0},
                            "start": {"type": "number"},
                            "end": {"type": "number"}
                        },
                        "required": ["interval"]
                    },
                    "manual_rule": {
                        "type": "object",
                        "properties": {
                            "groups": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "name": {"type": "string"},
                                        "member_values": {
                                            "type": "array",
                                            "items": {"type": ["string", "number"]}
                                        }
                                    },
                                    "required": ["name"]
                                }
                            }
                        },
                        "required": ["groups"]
                    }
                }
            },
            "group_limit": {"type": "integer", "minimum": 1}
        },
        "required": ["source_column"]
    })
}

fn create_pivot_table_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "spreadsheet_id": {"type": "string"},
            "source_range": {
                "type": "string",
                "description": "A1 range of the source data, e.g. 'Sales!A1:E100' or 'A:E'."
            },
            "destination_sheet_id": {
                "type": "integer",
                "description": "Existing sheet to place the pivot table on. A new sheet is created when omitted."
            },
            "destination_sheet_name": {
                "type": "string",
                "description": "Name for the new sheet when no destination_sheet_id is given."
            },
            "rows": {"type": "array", "items": group_schema()},
            "columns": {"type": "array", "items": group_schema()},
            "values": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "source_column": column_schema("Column to aggregate. Omit when using formula."),
                        "formula": {"type": "string", "description": "Custom formula. Omit when using source_column."},
                        "summarize_function": {
                            "type": "string",
                            "enum": [
                                "SUM", "COUNTA", "COUNT", "COUNTUNIQUE", "AVERAGE", "MAX", "MIN",
                                "MEDIAN", "PRODUCT", "STDEV", "STDEVP", "VAR", "VARP", "CUSTOM"
                            ]
                        },
                        "name": {"type": "string"},
                        "percent_display": {
                            "type": "string",
                            "enum": [
                                "PERCENT_OF_ROW_TOTAL", "PERCENT_OF_COLUMN_TOTAL",
                                "PERCENT_OF_GRAND_TOTAL"
                            ]
                        }
                    },
                    "required": ["summarize_function"]
                }
            },
            "filters": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "source_column": column_schema("Column to filter on."),
                        "visible_values": {"type": "array", "items": {"type": "string"}},
                        "condition": {
                            "type": "object",
                            "properties": {
                                "type": {"type": "string", "description": "Sheets condition type, e.g. NUMBER_GREATER."},
                                "operands": {"type": "array", "items": {"type": ["string", "number"]}}
                            },
                            "required": ["type"]
                        }
                    },
                    "required": ["source_column"]
                }
            },
            "value_layout": {"type": "string", "enum": ["HORIZONTAL", "VERTICAL"]},
            "response_format": response_format_schema()
        },
        "required": ["spreadsheet_id", "source_range", "values"]
    })
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CREATE_PIVOT_TABLE.to_string(),
            description: "Creates a pivot table from a range of a Google Sheets spreadsheet. \
                          Needs at least one row or column grouping and one value."
                .to_string(),
            input_schema: create_pivot_table_schema(),
        },
        ToolDefinition {
            name: LIST_SHEETS.to_string(),
            description: "Lists the sheets (tabs) of a spreadsheet with their ids.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "spreadsheet_id": {"type": "string"},
                    "response_format": response_format_schema()
                },
                "required": ["spreadsheet_id"]
            }),
        },
        ToolDefinition {
            name: RESOLVE_RANGE.to_string(),
            description: "Resolves an A1 range to its sheet id and zero-based bounds.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "spreadsheet_id": {"type": "string"},
                    "range": {"type": "string"},
                    "response_format": response_format_schema()
                },
                "required": ["spreadsheet_id", "range"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_are_unique() {
        let tools = tool_definitions();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn definitions_serialize_with_input_schema() {
        let value = serde_json::to_value(tool_definitions()).unwrap();
        assert_eq!(value[0]["name"], CREATE_PIVOT_TABLE);
        assert_eq!(value[0]["inputSchema"]["type"], "object");
        assert!(value[0]["inputSchema"]["required"]
            .as_array()
            .unwrap()
            .contains(&json!("values")));
    }
}
