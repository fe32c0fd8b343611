// In-memory implementation of the spreadsheet traits.
//
// Backs dry-run mode and gives tests a deterministic spreadsheet service.
// It mimics the behaviour the pivot compiler depends on: sheets keep their tab
// order, new sheet titles are de-duplicated ("Pivot Table", "Pivot Table 2"),
// and applied pivot tables are recorded per destination sheet.

use crate::core::sheets::{
    PivotError, PivotTableDescriptor, PivotTableWriter, SheetCatalog, SheetInfo,
};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, Clone, Default)]
struct StoredSpreadsheet {
    sheets: Vec<SheetInfo>,
    next_sheet_id: i64,
    pivot_tables: Vec<PivotTableDescriptor>,
}

/// Maps spreadsheet id -> its sheets and applied pivot tables.
pub struct InMemorySpreadsheets {
    data: DashMap<String, StoredSpreadsheet>,
}

impl InMemorySpreadsheets {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Registers a spreadsheet with the given sheet titles; ids start at 0.
    pub fn add_spreadsheet(&self, spreadsheet_id: &str, titles: &[&str]) {
        let sheets: Vec<SheetInfo> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| SheetInfo {
                sheet_id: i as i64,
                title: title.to_string(),
            })
            .collect();

        self.data.insert(
            spreadsheet_id.to_string(),
            StoredSpreadsheet {
                next_sheet_id: sheets.len() as i64,
                sheets,
                pivot_tables: Vec::new(),
            },
        );
    }

    /// Pivot tables applied to a spreadsheet, oldest first.
    pub fn pivot_tables(&self, spreadsheet_id: &str) -> Vec<PivotTableDescriptor> {
        self.data
            .get(spreadsheet_id)
            .map(|entry| entry.pivot_tables.clone())
            .unwrap_or_default()
    }

    fn not_found(spreadsheet_id: &str) -> PivotError {
        PivotError::NotFound(format!("spreadsheet {}", spreadsheet_id))
    }
}

impl Default for InMemorySpreadsheets {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetCatalog for InMemorySpreadsheets {
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, PivotError> {
        self.data
            .get(spreadsheet_id)
            .map(|entry| entry.sheets.clone())
            .ok_or_else(|| Self::not_found(spreadsheet_id))
    }

    async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        requested_name: &str,
    ) -> Result<SheetInfo, PivotError> {
        let mut entry = self
            .data
            .get_mut(spreadsheet_id)
            .ok_or_else(|| Self::not_found(spreadsheet_id))?;

        let taken = |title: &str| entry.sheets.iter().any(|s| s.title == title);
        let mut title = requested_name.to_string();
        let mut suffix = 2;
        while taken(&title) {
            title = format!("{} {}", requested_name, suffix);
            suffix += 1;
        }

        let sheet = SheetInfo {
            sheet_id: entry.next_sheet_id,
            title,
        };
        entry.next_sheet_id += 1;
        entry.sheets.push(sheet.clone());

        Ok(sheet)
    }
}

#[async_trait]
impl PivotTableWriter for InMemorySpreadsheets {
    async fn apply_pivot_table(
        &self,
        spreadsheet_id: &str,
        descriptor: &PivotTableDescriptor,
    ) -> Result<(), PivotError> {
        let mut entry = self
            .data
            .get_mut(spreadsheet_id)
            .ok_or_else(|| Self::not_found(spreadsheet_id))?;

        if !entry
            .sheets
            .iter()
            .any(|s| s.sheet_id == descriptor.destination_sheet_id)
        {
            return Err(PivotError::NotFound(format!(
                "destination sheet {} in spreadsheet {}",
                descriptor.destination_sheet_id, spreadsheet_id
            )));
        }

        // A new pivot table at A1 replaces whatever was anchored there.
        entry
            .pivot_tables
            .retain(|p| p.destination_sheet_id != descriptor.destination_sheet_id);
        entry.pivot_tables.push(descriptor.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sheets::pivot_models::{SourceRegion, ValueLayout};

    fn descriptor(destination_sheet_id: i64) -> PivotTableDescriptor {
        PivotTableDescriptor {
            source_region: SourceRegion {
                sheet_id: 0,
                start_row: 0,
                start_col: 0,
                end_row: 10,
                end_col: 2,
            },
            rows: vec![],
            columns: vec![],
            values: vec![],
            filters: vec![],
            value_layout: ValueLayout::Horizontal,
            destination_sheet_id,
            destination_sheet_name: None,
        }
    }

    #[tokio::test]
    async fn lists_sheets_in_order() {
        let store = InMemorySpreadsheets::new();
        store.add_spreadsheet("doc", &["Sheet1", "Sales"]);

        let sheets = store.list_sheets("doc").await.unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[1].sheet_id, 1);
        assert_eq!(store.lookup_sheet_id_by_name("doc", "Sales").await.unwrap(), Some(1));
        assert_eq!(store.lookup_sheet_id_by_name("doc", "Nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_spreadsheet_is_not_found() {
        let store = InMemorySpreadsheets::new();
        assert!(matches!(
            store.list_sheets("missing").await,
            Err(PivotError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn created_sheet_titles_are_deduplicated() {
        let store = InMemorySpreadsheets::new();
        store.add_spreadsheet("doc", &["Pivot Table"]);

        let first = store.create_sheet("doc", "Pivot Table").await.unwrap();
        let second = store.create_sheet("doc", "Pivot Table").await.unwrap();

        assert_eq!(first.title, "Pivot Table 2");
        assert_eq!(first.sheet_id, 1);
        assert_eq!(second.title, "Pivot Table 3");
        assert_eq!(second.sheet_id, 2);
    }

    #[tokio::test]
    async fn applied_pivot_tables_replace_previous_on_same_sheet() {
        let store = InMemorySpreadsheets::new();
        store.add_spreadsheet("doc", &["Data", "Pivot"]);

        store.apply_pivot_table("doc", &descriptor(1)).await.unwrap();
        store.apply_pivot_table("doc", &descriptor(1)).await.unwrap();
        assert_eq!(store.pivot_tables("doc").len(), 1);

        let err = store.apply_pivot_table("doc", &descriptor(5)).await.unwrap_err();
        assert!(matches!(err, PivotError::NotFound(_)));
    }
}
