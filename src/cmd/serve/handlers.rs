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
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use repeetcode_core::CatalogEntry;
use repeetcode_core::DashboardStats;
use repeetcode_core::Date;
use repeetcode_core::DueSet;
use repeetcode_core::ProblemRecord;
use repeetcode_core::SolveError;
use repeetcode_core::SolveEvent;
use repeetcode_core::apply_solve;
use repeetcode_core::select_due;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::cmd::serve::error::ApiError;
use crate::cmd::serve::state::ServerState;

#[derive(Serialize)]
pub struct LogResponse {
    pub message: String,
    pub next_review: Date,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews_due: Vec<ProblemRecord>,
    pub upcoming: Option<ProblemRecord>,
}

#[derive(Serialize)]
pub struct AllProblemsResponse {
    pub all_problems: Vec<ProblemRecord>,
}

#[derive(Serialize)]
pub struct ProblemBankResponse {
    pub problems: Vec<CatalogEntry>,
}

/// Records a solve and schedules the problem's next review.
pub async fn log_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Result<Json<SolveEvent>, JsonRejection>,
) -> Result<Json<LogResponse>, ApiError> {
    let user = state.authenticate(&headers)?;
    let Json(event) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let now = state.clock.now();
    let mut session = state.session()?;
    let entry: CatalogEntry = session
        .catalog_entry(&event.slug)?
        .ok_or_else(|| SolveError::UnknownProblem(event.slug.clone()))?;
    let policy = state.policy.as_ref();
    let record: ProblemRecord = session.update_record(&user, &event.slug, |prior| {
        apply_solve(policy, &entry, prior.as_ref(), &event, now).map_err(ApiError::from)
    })?;
    log::info!(
        "Logged '{}' for {user} with the {} policy, next review {}",
        record.slug,
        policy.name(),
        record.next_review_date
    );
    Ok(Json(LogResponse {
        message: format!("{} logged!", record.title),
        next_review: record.next_review_date.date(),
    }))
}

/// The problems due today, or the next upcoming one when none are due.
pub async fn reviews_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let user = state.authenticate(&headers)?;
    let records = state.session()?.list_records(&user)?;
    let DueSet { due, upcoming } = select_due(records, state.clock.now());
    log::debug!("{user} has {} reviews due", due.len());
    Ok(Json(ReviewsResponse {
        reviews_due: due,
        upcoming,
    }))
}

pub async fn all_problems_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<AllProblemsResponse>, ApiError> {
    let user = state.authenticate(&headers)?;
    let all_problems = state.session()?.list_records(&user)?;
    Ok(Json(AllProblemsResponse { all_problems }))
}

pub async fn dashboard_stats_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, ApiError> {
    let user = state.authenticate(&headers)?;
    let records = state.session()?.list_records(&user)?;
    Ok(Json(DashboardStats::compute(records, state.clock.now())))
}

pub async fn problem_bank_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<ProblemBankResponse>, ApiError> {
    state.authenticate(&headers)?;
    let problems = state.session()?.catalog()?;
    Ok(Json(ProblemBankResponse { problems }))
}

pub async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}
