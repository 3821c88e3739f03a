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

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

/// The version of the canonical record schema.
pub const RECORD_SCHEMA_VERSION: u32 = 2;

/// The user's own difficulty rating, validated by the active scheduling
/// policy.
pub type Difficulty = u8;

/// The outcome the user reported for a solve.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReviewResult {
    Pass,
    Fail,
}

impl ReviewResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewResult::Pass => "pass",
            ReviewResult::Fail => "fail",
        }
    }
}

impl TryFrom<String> for ReviewResult {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pass" => Ok(ReviewResult::Pass),
            "fail" => Ok(ReviewResult::Fail),
            _ => fail(format!("invalid result: '{value}', expected 'pass' or 'fail'")),
        }
    }
}

impl From<ReviewResult> for String {
    fn from(value: ReviewResult) -> String {
        value.as_str().to_string()
    }
}

/// The difficulty label from the canonical problem catalog.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OfficialDifficulty {
    Easy,
    Medium,
    Hard,
}

impl OfficialDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficialDifficulty::Easy => "Easy",
            OfficialDifficulty::Medium => "Medium",
            OfficialDifficulty::Hard => "Hard",
        }
    }

    /// Maps a LeetCode difficulty level. Unknown levels are treated as
    /// medium.
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => OfficialDifficulty::Easy,
            3 => OfficialDifficulty::Hard,
            _ => OfficialDifficulty::Medium,
        }
    }
}

impl TryFrom<String> for OfficialDifficulty {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Easy" => Ok(OfficialDifficulty::Easy),
            "Medium" => Ok(OfficialDifficulty::Medium),
            "Hard" => Ok(OfficialDifficulty::Hard),
            _ => fail(format!("invalid official difficulty: '{value}'")),
        }
    }
}

impl From<OfficialDifficulty> for String {
    fn from(value: OfficialDifficulty) -> String {
        value.as_str().to_string()
    }
}

/// An entry in the canonical problem catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub slug: String,
    pub title: String,
    pub official_difficulty: OfficialDifficulty,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// The latest state of a problem in a user's collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub slug: String,
    pub title: String,
    pub official_difficulty: OfficialDifficulty,
    pub user_difficulty: Difficulty,
    pub last_result: Option<ReviewResult>,
    /// Consecutive passes since the first solve or the last fail.
    pub review_stage: u32,
    pub date_solved: Timestamp,
    pub next_review_date: Timestamp,
    pub tags: BTreeSet<String>,
}

/// Trims tags, drops blank ones and collapses duplicates.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_result_parsing() -> Fallible<()> {
        assert_eq!(ReviewResult::try_from("pass".to_string())?, ReviewResult::Pass);
        assert_eq!(ReviewResult::try_from(" FAIL ".to_string())?, ReviewResult::Fail);
        assert!(ReviewResult::try_from("maybe".to_string()).is_err());
        Ok(())
    }

    #[test]
    fn test_result_serialization_format() -> Fallible<()> {
        assert_eq!(serde_json::to_string(&ReviewResult::Fail)?, "\"fail\"");
        Ok(())
    }

    #[test]
    fn test_official_difficulty_levels() {
        assert_eq!(OfficialDifficulty::from_level(1), OfficialDifficulty::Easy);
        assert_eq!(OfficialDifficulty::from_level(2), OfficialDifficulty::Medium);
        assert_eq!(OfficialDifficulty::from_level(3), OfficialDifficulty::Hard);
        assert_eq!(OfficialDifficulty::from_level(7), OfficialDifficulty::Medium);
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(["Array", " Hash Table ", "", "Array"]);
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["Array", "Hash Table"]);
    }

    #[test]
    fn test_catalog_entry_tags_default_to_empty() -> Fallible<()> {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{"slug": "two-sum", "title": "Two Sum", "official_difficulty": "Easy"}"#,
        )?;
        assert!(entry.tags.is_empty());
        Ok(())
    }
}
