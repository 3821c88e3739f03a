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

//! Bearer-token authentication.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

pub type UserId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header.
    Missing,
    /// The header is not of the form `Bearer <token>`.
    Malformed,
    /// The token is unknown or expired.
    Invalid,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Missing | AuthError::Malformed => {
                write!(f, "Missing or invalid Authorization header")
            }
            AuthError::Invalid => write!(f, "Invalid or expired token"),
        }
    }
}

impl Error for AuthError {}

/// Maps an opaque credential to the user it belongs to.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<UserId, AuthError>;
}

/// Verifies tokens against a fixed table loaded from the configuration.
pub struct StaticTokens {
    tokens: HashMap<String, UserId>,
}

impl StaticTokens {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }
}

impl TokenVerifier for StaticTokens {
    fn verify(&self, credential: &str) -> Result<UserId, AuthError> {
        self.tokens.get(credential).cloned().ok_or(AuthError::Invalid)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::Missing)?;
    let value = value.to_str().map_err(|_| AuthError::Malformed)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::Malformed)?;
    if token.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(token)
}

/// Resolves the user making a request.
pub fn authenticate(
    verifier: &dyn TokenVerifier,
    headers: &HeaderMap,
) -> Result<UserId, AuthError> {
    let token = bearer_token(headers)?;
    verifier.verify(token)
}
