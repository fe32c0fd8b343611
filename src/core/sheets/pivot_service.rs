// Pivot table business logic: compile a request, hand the descriptor to the
// writer, and report what was built. Like the other core services it only
// knows about traits; the Google client and the in-memory spreadsheet plug in
// from infra.

use super::pivot_models::{PivotError, PivotTableDescriptor, PivotTableSpec, SourceRegion};
use super::pivot_table_compiler::PivotTableCompiler;
use super::sheet_resolver::{SheetCatalog, SheetInfo};
use async_trait::async_trait;
use serde::Serialize;

/// Applies a compiled pivot table to its destination sheet as one update.
#[async_trait]
pub trait PivotTableWriter: Send + Sync {
    async fn apply_pivot_table(
        &self,
        spreadsheet_id: &str,
        descriptor: &PivotTableDescriptor,
    ) -> Result<(), PivotError>;
}

/// Everything the pivot service needs from a spreadsheet backend.
pub trait SpreadsheetBackend: SheetCatalog + PivotTableWriter {}

impl<T: SheetCatalog + PivotTableWriter> SpreadsheetBackend for T {}

// Lets main pick the live client or the in-memory spreadsheet at runtime.
#[async_trait]
impl SheetCatalog for Box<dyn SpreadsheetBackend> {
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, PivotError> {
        (**self).list_sheets(spreadsheet_id).await
    }

    async fn lookup_sheet_id_by_name(
        &self,
        spreadsheet_id: &str,
        name: &str,
    ) -> Result<Option<i64>, PivotError> {
        (**self).lookup_sheet_id_by_name(spreadsheet_id, name).await
    }

    async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        requested_name: &str,
    ) -> Result<SheetInfo, PivotError> {
        (**self).create_sheet(spreadsheet_id, requested_name).await
    }
}

#[async_trait]
impl PivotTableWriter for Box<dyn SpreadsheetBackend> {
    async fn apply_pivot_table(
        &self,
        spreadsheet_id: &str,
        descriptor: &PivotTableDescriptor,
    ) -> Result<(), PivotError> {
        (**self).apply_pivot_table(spreadsheet_id, descriptor).await
    }
}

/// What the tool layer reports back after a pivot table was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTableSummary {
    pub spreadsheet_id: String,
    pub destination_sheet_id: i64,
    pub destination_sheet_name: Option<String>,
    pub source_sheet_id: i64,
    pub source_range: String,
    pub row_groups: usize,
    pub column_groups: usize,
    pub values: usize,
    pub filters: usize,
}

impl PivotTableSummary {
    fn new(spreadsheet_id: &str, spec: &PivotTableSpec, descriptor: &PivotTableDescriptor) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            destination_sheet_id: descriptor.destination_sheet_id,
            destination_sheet_name: descriptor.destination_sheet_name.clone(),
            source_sheet_id: descriptor.source_region.sheet_id,
            source_range: spec.source_range.clone(),
            row_groups: descriptor.rows.len(),
            column_groups: descriptor.columns.len(),
            values: descriptor.values.len(),
            filters: descriptor.filters.len(),
        }
    }
}

pub struct PivotTableService<B: SheetCatalog + PivotTableWriter> {
    backend: B,
    compiler: PivotTableCompiler,
}

impl<B: SheetCatalog + PivotTableWriter> PivotTableService<B> {
    pub fn new(backend: B, default_destination_name: impl Into<String>) -> Self {
        Self {
            backend,
            compiler: PivotTableCompiler::new(default_destination_name),
        }
    }

    #[allow(dead_code)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compiles without writing anything except the destination sheet.
    pub async fn compile(
        &self,
        spreadsheet_id: &str,
        spec: &PivotTableSpec,
    ) -> Result<PivotTableDescriptor, PivotError> {
        self.compiler.compile(&self.backend, spreadsheet_id, spec).await
    }

    pub async fn create_pivot_table(
        &self,
        spreadsheet_id: &str,
        spec: &PivotTableSpec,
    ) -> Result<PivotTableSummary, PivotError> {
        let descriptor = self.compile(spreadsheet_id, spec).await?;
        self.backend
            .apply_pivot_table(spreadsheet_id, &descriptor)
            .await?;

        tracing::info!(
            spreadsheet_id,
            destination_sheet_id = descriptor.destination_sheet_id,
            source_range = %spec.source_range,
            "Pivot table created"
        );

        Ok(PivotTableSummary::new(spreadsheet_id, spec, &descriptor))
    }

    pub async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, PivotError> {
        self.backend.list_sheets(spreadsheet_id).await
    }

    /// The region a range covers once its sheet is resolved, without
    /// compiling a pivot table.
    pub async fn resolve_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<SourceRegion, PivotError> {
        let parsed = super::range_parser::parse(range)?;
        let sheet_id =
            super::sheet_resolver::resolve_sheet_id(&self.backend, spreadsheet_id, &parsed.sheet_name)
                .await?;
        Ok(SourceRegion {
            sheet_id,
            start_row: parsed.start_row,
            start_col: parsed.start_col,
            end_row: parsed.end_row,
            end_col: parsed.end_col,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        applied: Mutex<Vec<PivotTableDescriptor>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl SheetCatalog for FakeBackend {
        async fn list_sheets(&self, _: &str) -> Result<Vec<SheetInfo>, PivotError> {
            Ok(vec![SheetInfo {
                sheet_id: 3,
                title: "Sales".to_string(),
            }])
        }

        async fn create_sheet(&self, _: &str, requested_name: &str) -> Result<SheetInfo, PivotError> {
            Ok(SheetInfo {
                sheet_id: 8,
                title: requested_name.to_string(),
            })
        }
    }

    #[async_trait]
    impl PivotTableWriter for FakeBackend {
        async fn apply_pivot_table(
            &self,
            _: &str,
            descriptor: &PivotTableDescriptor,
        ) -> Result<(), PivotError> {
            if self.fail_writes {
                return Err(PivotError::Service("write rejected".to_string()));
            }
            self.applied.lock().unwrap().push(descriptor.clone());
            Ok(())
        }
    }

    fn sales_spec() -> PivotTableSpec {
        serde_json::from_value(json!({
            "source_range": "Sales!A1:E100",
            "rows": [{"source_column": "A"}, {"source_column": "B"}],
            "values": [{"source_column": "E", "summarize_function": "SUM"}],
            "filters": [{"source_column": "C", "visible_values": ["2024"]}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_applies_descriptor_and_summarizes() {
        let service = PivotTableService::new(FakeBackend::default(), "Pivot Table");

        let summary = service.create_pivot_table("doc", &sales_spec()).await.unwrap();

        assert_eq!(summary.destination_sheet_id, 8);
        assert_eq!(summary.destination_sheet_name.as_deref(), Some("Pivot Table"));
        assert_eq!(summary.source_sheet_id, 3);
        assert_eq!(summary.row_groups, 2);
        assert_eq!(summary.column_groups, 0);
        assert_eq!(summary.values, 1);
        assert_eq!(summary.filters, 1);

        let applied = service.backend.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].destination_sheet_id, 8);
    }

    #[tokio::test]
    async fn write_failures_propagate() {
        let backend = FakeBackend {
            fail_writes: true,
            ..Default::default()
        };
        let service = PivotTableService::new(backend, "Pivot Table");

        let err = service
            .create_pivot_table("doc", &sales_spec())
            .await
            .unwrap_err();
        assert_eq!(err, PivotError::Service("write rejected".to_string()));
    }

    #[tokio::test]
    async fn boxed_backend_delegates() {
        let backend: Box<dyn SpreadsheetBackend> = Box::new(FakeBackend::default());
        let service = PivotTableService::new(backend, "Pivot Table");

        let sheets = service.list_sheets("doc").await.unwrap();
        assert_eq!(sheets[0].title, "Sales");

        let region = service.resolve_range("doc", "Sales!B2:C3").await.unwrap();
        assert_eq!(
            region,
            SourceRegion {
                sheet_id: 3,
                start_row: 1,
                start_col: 1,
                end_row: 3,
                end_col: 3,
            }
        );
    }
}
