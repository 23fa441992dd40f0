//! Response envelopes.
//!
//! Regulation endpoints answer with [`MessageResponse`]; the other resources
//! wrap their payload in [`DataResponse`]. Every failure is an
//! [`ErrorResponse`].

use serde::{Deserialize, Serialize};

/// `{success, message, data?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MessageResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl MessageResponse<()> {
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// `{data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub page: u32,
    pub limit: u32,
    pub total_page: u64,
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyCounts {
    pub is_not_handled: u64,
    pub is_handled: u64,
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Issues(Vec<FieldIssue>),
}

/// `{"errors": ...}` - the body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: ErrorDetail,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: ErrorDetail::Message(message.into()),
        }
    }

    pub fn issues(issues: Vec<FieldIssue>) -> Self {
        Self {
            errors: ErrorDetail::Issues(issues),
        }
    }
}
