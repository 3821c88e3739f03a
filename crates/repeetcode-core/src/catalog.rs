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

//! Parsing the LeetCode problem list into catalog entries.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::problem::CatalogEntry;
use crate::types::problem::OfficialDifficulty;

#[derive(Deserialize)]
struct ProblemList {
    stat_status_pairs: Vec<StatStatusPair>,
}

#[derive(Deserialize)]
struct StatStatusPair {
    stat: Stat,
    difficulty: Level,
}

#[derive(Deserialize)]
struct Stat {
    #[serde(rename = "question__title")]
    title: String,
    #[serde(rename = "question__title_slug")]
    slug: String,
}

#[derive(Deserialize)]
struct Level {
    level: i64,
}

/// Parses the JSON returned by LeetCode's problem-list endpoint. Entries are
/// returned sorted by slug; a slug that appears twice is an error.
pub fn parse_problem_list(json: &str) -> Fallible<Vec<CatalogEntry>> {
    let list: ProblemList = serde_json::from_str(json)?;
    let mut entries: Vec<CatalogEntry> = Vec::with_capacity(list.stat_status_pairs.len());
    for pair in list.stat_status_pairs {
        let slug = pair.stat.slug.trim().to_string();
        if slug.is_empty() {
            return fail(format!(
                "problem '{}' has an empty slug",
                pair.stat.title
            ));
        }
        entries.push(CatalogEntry {
            slug,
            title: pair.stat.title.trim().to_string(),
            official_difficulty: OfficialDifficulty::from_level(pair.difficulty.level),
            tags: BTreeSet::new(),
        });
    }
    entries.sort_by(|a, b| a.slug.cmp(&b.slug));
    if let Some(pair) = entries.windows(2).find(|w| w[0].slug == w[1].slug) {
        return fail(format!("duplicate slug in problem list: '{}'", pair[0].slug));
    }
    Ok(entries)
}
