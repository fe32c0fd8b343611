// In-memory spreadsheet backend.

pub mod in_memory;

pub use in_memory::InMemorySpreadsheets;
