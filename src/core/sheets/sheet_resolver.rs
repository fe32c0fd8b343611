use super::pivot_models::PivotError;
use async_trait::async_trait;
use serde::Serialize;

/// Sheet metadata as reported by the spreadsheet service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetInfo {
    pub sheet_id: i64,
    pub title: String,
}

/// Read and create access to the sheets of a spreadsheet.
///
/// The compiler only ever sees this trait; the Google Sheets client and the
/// in-memory spreadsheet in `infra` both implement it.
#[async_trait]
pub trait SheetCatalog: Send + Sync {
    /// All sheets, in the order the service reports them.
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, PivotError>;

    /// Looks a sheet up by its exact title.
    async fn lookup_sheet_id_by_name(
        &self,
        spreadsheet_id: &str,
        name: &str,
    ) -> Result<Option<i64>, PivotError> {
        let sheets = self.list_sheets(spreadsheet_id).await?;
        Ok(sheets
            .into_iter()
            .find(|sheet| sheet.title == name)
            .map(|sheet| sheet.sheet_id))
    }

    /// Adds a sheet. The service may rename it, so callers must use the
    /// returned title and id.
    async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        requested_name: &str,
    ) -> Result<SheetInfo, PivotError>;
}

/// Resolves a sheet name to its id; an empty name means the first sheet.
pub async fn resolve_sheet_id<C: SheetCatalog + ?Sized>(
    catalog: &C,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<i64, PivotError> {
    if !sheet_name.is_empty() {
        return catalog
            .lookup_sheet_id_by_name(spreadsheet_id, sheet_name)
            .await?
            .ok_or_else(|| {
                PivotError::NotFound(format!(
                    "sheet '{}' in spreadsheet {}",
                    sheet_name, spreadsheet_id
                ))
            });
    }

    catalog
        .list_sheets(spreadsheet_id)
        .await?
        .first()
        .map(|sheet| sheet.sheet_id)
        .ok_or_else(|| PivotError::NotFound(format!("spreadsheet {} has no sheets", spreadsheet_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCatalog {
        sheets: Vec<SheetInfo>,
    }

    #[async_trait]
    impl SheetCatalog for FixedCatalog {
        async fn list_sheets(&self, _: &str) -> Result<Vec<SheetInfo>, PivotError> {
            Ok(self.sheets.clone())
        }

        async fn create_sheet(&self, _: &str, _: &str) -> Result<SheetInfo, PivotError> {
            Err(PivotError::Service(
                "Fixed catalog should not create sheets".to_string(),
            ))
        }
    }

    fn catalog() -> FixedCatalog {
        FixedCatalog {
            sheets: vec![
                SheetInfo {
                    sheet_id: 11,
                    title: "Summary".to_string(),
                },
                SheetInfo {
                    sheet_id: 3,
                    title: "Sales".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn resolves_named_sheet() {
        let id = resolve_sheet_id(&catalog(), "doc", "Sales").await.unwrap();
        assert_eq!(id, 3);
    }

    #[tokio::test]
    async fn empty_name_falls_back_to_first_sheet() {
        let id = resolve_sheet_id(&catalog(), "doc", "").await.unwrap();
        assert_eq!(id, 11);
    }

    #[tokio::test]
    async fn missing_sheet_is_not_found() {
        let err = resolve_sheet_id(&catalog(), "doc", "Costs").await.unwrap_err();
        assert!(matches!(err, PivotError::NotFound(ref msg) if msg.contains("Costs")));
    }

    #[tokio::test]
    async fn spreadsheet_without_sheets_is_not_found() {
        let empty = FixedCatalog { sheets: vec![] };
        let err = resolve_sheet_id(&empty, "doc", "").await.unwrap_err();
        assert!(matches!(err, PivotError::NotFound(_)));
    }
}
