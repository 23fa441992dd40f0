//! Entities persisted by the village administration backend.

mod emergency;
mod map_feature;
mod regulation;
mod user;

pub use emergency::{Emergency, EmergencyWithReporter, NewEmergency, ReporterSummary};
pub use map_feature::{MapFeature, MapFeatureChanges, MapType, NewMapFeature};
pub use regulation::{NewRegulation, Regulation, RegulationChanges, RegulationFile};
pub use user::{NewUser, Role, User};
