//! Sidesa wire types - request and response DTOs for the HTTP API.
//!
//! # Design Principles
//!
//! 1. **No business logic** - Pure data types, serialization and field-level validation
//! 2. **No domain IDs** - raw `i64`/`String` identifiers on the wire
//! 3. **Lenient inputs** - numbers may arrive as JSON numbers or as numeric strings,
//!    since the same shapes are also posted from HTML forms

pub mod de;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateEmergencyRequest, CreateMapRequest, EmergencyListQuery, MapListQuery,
    RegisterUserRequest, RegulationForm, UpdateMapRequest,
};
pub use responses::{
    DataResponse, EmergencyCounts, ErrorDetail, ErrorResponse, FieldIssue, MessageResponse,
    PageResponse,
};
