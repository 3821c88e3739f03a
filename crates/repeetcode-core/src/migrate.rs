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

//! Migration of version 1 records into the canonical schema.
//!
//! Version 1 records were keyed by title when the slug was missing, stored
//! timestamps without an offset, had no `last_result` in some versions and
//! could repeat tags. This module is the only place where offset-less
//! timestamps are accepted; they are read as UTC.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::schedule::DifficultyRange;
use crate::schedule::MIN_INTERVAL_DAYS;
use crate::solve::SolveError;
use crate::types::problem::CatalogEntry;
use crate::types::problem::ProblemRecord;
use crate::types::problem::ReviewResult;
use crate::types::problem::normalize_tags;
use crate::types::timestamp::Timestamp;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A record in the version 1 shape.
#[derive(Clone, Debug, Deserialize)]
pub struct LegacyRecord {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(alias = "user_difficulty")]
    pub difficulty: i64,
    #[serde(default)]
    pub last_result: Option<String>,
    #[serde(default)]
    pub review_stage: Option<u32>,
    pub date_solved: String,
    pub next_review_date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Derives a slug from a title: lowercase ASCII alphanumerics, with every run
/// of other characters collapsed into a single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Parses a stored timestamp, reading offset-less values as UTC.
pub fn parse_legacy_timestamp(value: &str) -> Fallible<Timestamp> {
    if let Ok(ts) = Timestamp::try_from(value.to_string()) {
        return Ok(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
        .map(|ndt| Timestamp::new(ndt.and_utc()))
        .ok_or_else(|| ErrorReport::new(format!("invalid legacy timestamp: '{value}'")))
}

/// Converts a legacy record into the canonical schema.
pub fn migrate_record<F>(
    legacy: LegacyRecord,
    catalog: F,
    range: DifficultyRange,
) -> Fallible<ProblemRecord>
where
    F: Fn(&str) -> Option<CatalogEntry>,
{
    let slug: String = match legacy.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(&legacy.title),
    };
    let entry: CatalogEntry =
        catalog(&slug).ok_or_else(|| SolveError::UnknownProblem(slug.clone()))?;
    let user_difficulty = range.check(legacy.difficulty)?;
    let last_result: Option<ReviewResult> = match legacy.last_result {
        Some(result) => Some(ReviewResult::try_from(result)?),
        None => None,
    };
    let date_solved: Timestamp = parse_legacy_timestamp(&legacy.date_solved)?;
    let earliest_review: Timestamp = date_solved.plus_days(MIN_INTERVAL_DAYS);
    let next_review_date: Timestamp =
        parse_legacy_timestamp(&legacy.next_review_date)?.max(earliest_review);
    let title = if legacy.title.trim().is_empty() {
        entry.title.clone()
    } else {
        legacy.title.trim().to_string()
    };
    let tags = normalize_tags(&legacy.tags);
    let tags = if tags.is_empty() { entry.tags } else { tags };
    Ok(ProblemRecord {
        slug,
        title,
        official_difficulty: entry.official_difficulty,
        user_difficulty,
        last_result,
        review_stage: legacy.review_stage.unwrap_or(0),
        date_solved,
        next_review_date,
        tags,
    })
}
