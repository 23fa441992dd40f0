//! Value objects - Immutable objects defined by their attributes

mod coordinates;
mod emergency_quota;

pub use coordinates::Coordinates;
pub use emergency_quota::{CooldownPolicy, EmergencyQuota};
