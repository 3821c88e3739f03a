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

//! Turning a solve event into the replacement record for a problem.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;

use crate::schedule::InvalidDifficulty;
use crate::schedule::PriorReview;
use crate::schedule::Schedule;
use crate::schedule::SchedulingPolicy;
use crate::types::problem::CatalogEntry;
use crate::types::problem::ProblemRecord;
use crate::types::problem::ReviewResult;
use crate::types::problem::normalize_tags;
use crate::types::timestamp::Timestamp;

/// A solve reported by the user.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SolveEvent {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    pub difficulty: i64,
    #[serde(default)]
    pub result: Option<ReviewResult>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Reasons a solve event is rejected. Nothing is written when one occurs.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The slug is not in the catalog.
    UnknownProblem(String),
    InvalidDifficulty(InvalidDifficulty),
}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::UnknownProblem(slug) => {
                write!(f, "problem '{slug}' does not exist in the catalog")
            }
            SolveError::InvalidDifficulty(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SolveError {}

impl From<InvalidDifficulty> for SolveError {
    fn from(value: InvalidDifficulty) -> Self {
        SolveError::InvalidDifficulty(value)
    }
}

/// Builds the record that replaces `prior` after `event`.
pub fn apply_solve(
    policy: &dyn SchedulingPolicy,
    entry: &CatalogEntry,
    prior: Option<&ProblemRecord>,
    event: &SolveEvent,
    now: Timestamp,
) -> Result<ProblemRecord, SolveError> {
    if entry.slug != event.slug {
        return Err(SolveError::UnknownProblem(event.slug.clone()));
    }
    let difficulty = policy.difficulty_range().check(event.difficulty)?;
    let prior_review: Option<PriorReview> = prior.map(|r| PriorReview {
        reviewed_at: r.date_solved,
        stage: r.review_stage,
    });
    let Schedule { next_review, stage } =
        policy.next_review(event.difficulty, event.result, prior_review, now)?;
    let title: String = if event.title.trim().is_empty() {
        entry.title.clone()
    } else {
        event.title.trim().to_string()
    };
    let tags = normalize_tags(&event.tags);
    let tags = if tags.is_empty() {
        entry.tags.clone()
    } else {
        tags
    };
    Ok(ProblemRecord {
        slug: entry.slug.clone(),
        title,
        official_difficulty: entry.official_difficulty,
        user_difficulty: difficulty,
        last_result: event.result,
        review_stage: stage,
        date_solved: now,
        next_review_date: next_review,
        tags,
    })
}
