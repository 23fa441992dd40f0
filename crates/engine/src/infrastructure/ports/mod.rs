//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - Uploaded file storage (could swap local disk -> object storage)
//! - Clock (for testing)

mod error;
mod repos;
mod storage;
mod testing;

pub use error::{RepoError, StorageError};
pub use repos::*;
pub use storage::{FileStorage, UploadedFile};
pub use testing::ClockPort;

#[cfg(test)]
pub use storage::MockFileStorage;
#[cfg(test)]
pub use testing::MockClockPort;
