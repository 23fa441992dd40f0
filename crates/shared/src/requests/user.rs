use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 10, max = 15, message = "phone_number must be 10-15 characters"))]
    pub phone_number: String,
}
