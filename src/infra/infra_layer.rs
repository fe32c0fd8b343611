// The infra module contains implementations of core traits.
// Each backend goes in its own submodule.

#[path = "google_sheets/mod.rs"]
pub mod google_sheets;

#[path = "sheets/mod.rs"]
pub mod sheets;
