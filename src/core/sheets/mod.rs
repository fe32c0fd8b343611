pub mod column_address;
pub mod group_rule_compiler;
pub mod pivot_filter_compiler;
pub mod pivot_group_compiler;
pub mod pivot_models;
pub mod pivot_service;
pub mod pivot_table_compiler;
pub mod pivot_value_compiler;
pub mod range_parser;
pub mod sheet_resolver;

pub use pivot_models::{PivotError, PivotTableDescriptor, PivotTableSpec};
pub use pivot_service::{PivotTableService, PivotTableSummary, PivotTableWriter, SpreadsheetBackend};
pub use sheet_resolver::{SheetCatalog, SheetInfo};
