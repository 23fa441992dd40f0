extern crate self as sidesa_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    Emergency, EmergencyWithReporter, MapFeature, MapFeatureChanges, MapType, NewEmergency,
    NewMapFeature, NewRegulation, NewUser, Regulation, RegulationChanges, RegulationFile,
    ReporterSummary, Role, User,
};

pub use error::DomainError;

pub use ids::{EmergencyId, MapFeatureId, RegulationId, UserId};

pub use value_objects::{Coordinates, CooldownPolicy, EmergencyQuota};
