// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "sheets/mod.rs"]
pub mod sheets;
