use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::service_account::ServiceAccountAuth;
use crate::core::sheets::{
    PivotError, PivotTableDescriptor, PivotTableWriter, SheetCatalog, SheetInfo,
};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, thiserror::Error)]
pub enum SheetsApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Sheets API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Unexpected Sheets API response: {0}")]
    Decode(String),
}

impl From<SheetsApiError> for PivotError {
    fn from(err: SheetsApiError) -> Self {
        match err {
            SheetsApiError::Api { status, body } if status == StatusCode::NOT_FOUND => {
                PivotError::NotFound(format!("spreadsheet ({})", body))
            }
            other => PivotError::Service(other.to_string()),
        }
    }
}

// =============================================================================
// SHEETS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddSheetReply {
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reply {
    add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Reply>,
}

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

fn add_sheet_request(title: &str) -> Value {
    json!({
        "requests": [{
            "addSheet": {"properties": {"title": title}}
        }]
    })
}

/// A single `updateCells` request that drops the pivot table at A1 of the
/// destination sheet.
fn update_pivot_request(descriptor: &PivotTableDescriptor) -> Value {
    json!({
        "requests": [{
            "updateCells": {
                "rows": [{"values": [{"pivotTable": descriptor}]}],
                "start": {
                    "sheetId": descriptor.destination_sheet_id,
                    "rowIndex": 0,
                    "columnIndex": 0
                },
                "fields": "pivotTable"
            }
        }]
    })
}

/// Sheets in tab order.
fn sheets_from_metadata(metadata: SpreadsheetMetadata) -> Vec<SheetInfo> {
    let mut properties: Vec<SheetProperties> =
        metadata.sheets.into_iter().map(|s| s.properties).collect();
    properties.sort_by_key(|p| p.index);
    properties
        .into_iter()
        .map(|p| SheetInfo {
            sheet_id: p.sheet_id,
            title: p.title,
        })
        .collect()
}

fn created_sheet(response: BatchUpdateResponse) -> Result<SheetInfo, SheetsApiError> {
    response
        .replies
        .into_iter()
        .find_map(|reply| reply.add_sheet)
        .map(|added| SheetInfo {
            sheet_id: added.properties.sheet_id,
            title: added.properties.title,
        })
        .ok_or_else(|| SheetsApiError::Decode("addSheet reply is missing".to_string()))
}

// =============================================================================
// GOOGLE SHEETS CLIENT
// =============================================================================

/// Minimal Sheets REST client exposing only what the pivot service needs.
pub struct GoogleSheetsClient {
    client: Client,
    auth: ServiceAccountAuth,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(auth: ServiceAccountAuth, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("{}/spreadsheets/{}", self.base_url, spreadsheet_id)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsApiError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await?;
        Err(SheetsApiError::Api { status, body })
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        body: &Value,
    ) -> Result<BatchUpdateResponse, SheetsApiError> {
        let token = self.auth.get_access_token().await?;
        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet_id)))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| SheetsApiError::Decode(e.to_string()))
    }

    async fn fetch_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, SheetsApiError> {
        let token = self.auth.get_access_token().await?;

        tracing::debug!(spreadsheet_id, "Fetching sheet metadata");

        let response = self
            .client
            .get(self.spreadsheet_url(spreadsheet_id))
            .query(&[("fields", "sheets.properties(sheetId,title,index)")])
            .bearer_auth(token)
            .send()
            .await?;

        let metadata: SpreadsheetMetadata = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetsApiError::Decode(e.to_string()))?;

        Ok(sheets_from_metadata(metadata))
    }
}

#[async_trait]
impl SheetCatalog for GoogleSheetsClient {
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, PivotError> {
        Ok(self.fetch_sheets(spreadsheet_id).await?)
    }

    async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        requested_name: &str,
    ) -> Result<SheetInfo, PivotError> {
        let response = self
            .batch_update(spreadsheet_id, &add_sheet_request(requested_name))
            .await?;
        let sheet = created_sheet(response)?;

        tracing::info!(
            spreadsheet_id,
            sheet_id = sheet.sheet_id,
            title = %sheet.title,
            "Created sheet"
        );

        Ok(sheet)
    }
}

#[async_trait]
impl PivotTableWriter for GoogleSheetsClient {
    async fn apply_pivot_table(
        &self,
        spreadsheet_id: &str,
        descriptor: &PivotTableDescriptor,
    ) -> Result<(), PivotError> {
        self.batch_update(spreadsheet_id, &update_pivot_request(descriptor))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sheets::pivot_models::{SourceRegion, ValueLayout};

    #[test]
    fn metadata_is_ordered_by_tab_index() {
        let metadata: SpreadsheetMetadata = serde_json::from_value(json!({
            "sheets": [
                {"properties": {"sheetId": 9, "title": "Sales", "index": 1}},
                {"properties": {"sheetId": 0, "title": "Sheet1"}}
            ]
        }))
        .unwrap();

        let sheets = sheets_from_metadata(metadata);
        assert_eq!(sheets[0].title, "Sheet1");
        assert_eq!(sheets[1].sheet_id, 9);
    }

    #[test]
    fn empty_spreadsheet_has_no_sheets() {
        let metadata: SpreadsheetMetadata = serde_json::from_value(json!({})).unwrap();
        assert!(sheets_from_metadata(metadata).is_empty());
    }

    #[test]
    fn add_sheet_reply_is_adopted() {
        let response: BatchUpdateResponse = serde_json::from_value(json!({
            "spreadsheetId": "doc",
            "replies": [{"addSheet": {"properties": {"sheetId": 77, "title": "Pivot Table 2"}}}]
        }))
        .unwrap();

        let sheet = created_sheet(response).unwrap();
        assert_eq!(sheet.sheet_id, 77);
        assert_eq!(sheet.title, "Pivot Table 2");

        let empty: BatchUpdateResponse = serde_json::from_value(json!({"replies": [{}]})).unwrap();
        assert!(matches!(created_sheet(empty), Err(SheetsApiError::Decode(_))));
    }

    #[test]
    fn update_request_anchors_pivot_at_destination() {
        let descriptor = PivotTableDescriptor {
            source_region: SourceRegion {
                sheet_id: 3,
                start_row: 0,
                start_col: 0,
                end_row: 100,
                end_col: 5,
            },
            rows: vec![],
            columns: vec![],
            values: vec![],
            filters: vec![],
            value_layout: ValueLayout::Horizontal,
            destination_sheet_id: 12,
            destination_sheet_name: Some("Pivot".into()),
        };

        let body = update_pivot_request(&descriptor);
        let update = &body["requests"][0]["updateCells"];
        assert_eq!(update["start"]["sheetId"], json!(12));
        assert_eq!(update["fields"], json!("pivotTable"));
        assert_eq!(
            update["rows"][0]["values"][0]["pivotTable"]["source"]["sheetId"],
            json!(3)
        );
        assert_eq!(add_sheet_request("Pivot")["requests"][0]["addSheet"]["properties"]["title"], json!("Pivot"));
    }

    #[test]
    fn not_found_status_maps_to_not_found() {
        let err: PivotError = SheetsApiError::Api {
            status: StatusCode::NOT_FOUND,
            body: "Requested entity was not found.".into(),
        }
        .into();
        assert!(matches!(err, PivotError::NotFound(_)));

        let err: PivotError = SheetsApiError::Auth("expired".into()).into();
        assert!(matches!(err, PivotError::Service(ref msg) if msg.contains("expired")));
    }
}
