//! Sidesa Engine library.
//!
//! Server-side code for the village administration backend.
//!
//! ## Structure
//!
//! - `use_cases/` - Regulation, emergency, map and user operations
//! - `infrastructure/` - Ports and their adapters (SQLite, local disk, clock, config)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
