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

use std::sync::Arc;

use axum::http::HeaderMap;
use repeetcode_core::SchedulingPolicy;
use repeetcode_core::Timestamp;

use crate::auth::TokenVerifier;
use crate::auth::UserId;
use crate::auth::authenticate;
use crate::cmd::serve::error::ApiError;
use crate::db::Database;
use crate::db::Session;

/// Where handlers get the current time from.
#[derive(Clone, Copy, Debug)]
pub enum Clock {
    System,
    /// Always returns the same instant.
    Fixed(Timestamp),
}

impl Clock {
    pub fn now(&self) -> Timestamp {
        match self {
            Clock::System => Timestamp::now(),
            Clock::Fixed(ts) => *ts,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub db: Database,
    pub policy: Arc<dyn SchedulingPolicy>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub clock: Clock,
}

impl ServerState {
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, ApiError> {
        Ok(authenticate(self.verifier.as_ref(), headers)?)
    }

    /// Opens a database session for the duration of one request.
    pub fn session(&self) -> Result<Session, ApiError> {
        Ok(self.db.session()?)
    }
}
