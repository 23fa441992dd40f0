//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases sit between the HTTP handlers and the repository ports.

pub mod emergency;
pub mod map;
pub mod regulation;
pub mod user;
pub mod validation;

pub use emergency::{EmergencyError, EmergencyUseCases};
pub use map::{MapError, MapUseCases};
pub use regulation::{RegulationError, RegulationUseCases};
pub use user::{UserError, UserUseCases};
pub use validation::ValidationFailure;
