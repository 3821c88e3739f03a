// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use repeetcode_core::SolveError;
use serde_json::json;

use crate::auth::AuthError;
use crate::error::ErrorReport;

/// Errors returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(AuthError),
    /// The request was understood but rejected: unknown problem, invalid
    /// difficulty, or a malformed body.
    BadRequest(String),
    Internal(ErrorReport),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Unauthorized(e) => e.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        ApiError::Unauthorized(value)
    }
}

impl From<SolveError> for ApiError {
    fn from(value: SolveError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        ApiError::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(e) => log::error!("Request failed: {e}"),
            _ => log::warn!("Request rejected ({status}): {}", self.detail()),
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
