// Top-level pivot table compilation.
//
// Order of work:
//   1. validate the request shape and parse the source range
//   2. resolve the source sheet id (read-only lookup)
//   3. compile rows, columns, values and filters (pure)
//   4. resolve the destination sheet, creating one if no id was given
//   5. assemble the descriptor
//
// Creating the destination sheet is the only mutation, so it runs after every
// step that can reject the request. A failure in creation itself leaves nothing
// behind; a failure after it is impossible because assembly cannot fail.

use super::pivot_filter_compiler;
use super::pivot_group_compiler;
use super::pivot_models::{
    DestinationGroup, PivotError, PivotGroup, PivotTableDescriptor, PivotTableSpec, SourceRegion,
};
use super::pivot_value_compiler;
use super::range_parser;
use super::sheet_resolver::{resolve_sheet_id, SheetCatalog};

pub const DEFAULT_DESTINATION_SHEET_NAME: &str = "Pivot Table";

pub struct PivotTableCompiler {
    default_destination_name: String,
}

impl PivotTableCompiler {
    pub fn new(default_destination_name: impl Into<String>) -> Self {
        Self {
            default_destination_name: default_destination_name.into(),
        }
    }

    pub async fn compile<C: SheetCatalog + ?Sized>(
        &self,
        catalog: &C,
        spreadsheet_id: &str,
        spec: &PivotTableSpec,
    ) -> Result<PivotTableDescriptor, PivotError> {
        spec.validate()?;
        let range = range_parser::parse(&spec.source_range)?;

        let sheet_id = resolve_sheet_id(catalog, spreadsheet_id, &range.sheet_name).await?;
        let source_region = SourceRegion {
            sheet_id,
            start_row: range.start_row,
            start_col: range.start_col,
            end_row: range.end_row,
            end_col: range.end_col,
        };

        let rows = compile_groups(&spec.rows)?;
        let columns = compile_groups(&spec.columns)?;
        let values = spec
            .values
            .iter()
            .map(pivot_value_compiler::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let filters = pivot_filter_compiler::compile(&spec.filters)?;

        let (destination_sheet_id, destination_sheet_name) = match spec.destination_sheet_id {
            Some(id) => (id, spec.destination_sheet_name.clone()),
            None => {
                let requested = spec
                    .destination_sheet_name
                    .as_deref()
                    .unwrap_or(self.default_destination_name.as_str());
                let created = catalog.create_sheet(spreadsheet_id, requested).await?;
                if created.title != requested {
                    tracing::info!(
                        spreadsheet_id,
                        requested,
                        actual = %created.title,
                        "Destination sheet was renamed by the service"
                    );
                }
                (created.sheet_id, Some(created.title))
            }
        };

        tracing::debug!(
            spreadsheet_id,
            source_sheet_id = sheet_id,
            destination_sheet_id,
            rows = rows.len(),
            columns = columns.len(),
            values = values.len(),
            "Compiled pivot table"
        );

        Ok(PivotTableDescriptor {
            source_region,
            rows,
            columns,
            values,
            filters,
            value_layout: spec.value_layout,
            destination_sheet_id,
            destination_sheet_name,
        })
    }
}

impl Default for PivotTableCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_DESTINATION_SHEET_NAME)
    }
}

fn compile_groups(groups: &[PivotGroup]) -> Result<Vec<DestinationGroup>, PivotError> {
    groups.iter().map(pivot_group_compiler::compile).collect()
}
