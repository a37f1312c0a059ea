//! JSON envelope and payloads shared by the server and the client

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::model::CellValue;
use crate::model::Row;
use crate::model::User;

/// Every API response body.
///
/// ```json
/// {"status":"success","data":{...}}
/// {"status":"error","statusCode":404,"message":"User not found: u9"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    Success {
        data: T,
    },
    Error {
        #[serde(rename = "statusCode")]
        status_code: u16,
        message: String,
        /// Field-level validation messages.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        errors: BTreeMap<String, String>,
    },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success { data }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        ApiResponse::Error {
            status_code,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// Returns the payload of a success response.
    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResponse::Success { data } => Some(data),
            ApiResponse::Error { .. } => None,
        }
    }
}

/// Payload of `GET /tasks/:id` and `PATCH /tasks/:id/cells/:column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPayload {
    pub row: Row,
}

/// Payload of `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersPayload {
    pub users: Vec<User>,
}

/// Payload of `GET /users/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

/// Body of `PATCH /tasks/:id/cells/:column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCellRequest {
    pub value: CellValue,
}
