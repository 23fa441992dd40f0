//! Request DTOs, grouped by resource.

mod emergency;
mod map;
mod regulation;
mod user;

pub use emergency::{is_decimal, CreateEmergencyRequest, EmergencyListQuery};
pub use map::{CreateMapRequest, MapListQuery, UpdateMapRequest};
pub use regulation::RegulationForm;
pub use user::RegisterUserRequest;

use std::borrow::Cow;

use validator::ValidationError;

pub(crate) fn issue(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
