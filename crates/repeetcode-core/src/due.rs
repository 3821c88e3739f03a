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

//! Selecting the problems due for review.

use crate::types::problem::ProblemRecord;
use crate::types::timestamp::Timestamp;

/// The problems due today, or failing that, the next one coming up.
#[derive(Clone, Debug, PartialEq)]
pub struct DueSet {
    pub due: Vec<ProblemRecord>,
    pub upcoming: Option<ProblemRecord>,
}

/// Selects every record whose next review falls on or before the end of
/// today (UTC), ordered by next review date and then slug. When nothing is
/// due, `upcoming` holds the record with the earliest next review.
pub fn select_due(records: Vec<ProblemRecord>, now: Timestamp) -> DueSet {
    let cutoff: Timestamp = now.end_of_day();
    let mut records: Vec<ProblemRecord> = records;
    records.sort_by(|a, b| {
        a.next_review_date
            .cmp(&b.next_review_date)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    let due: Vec<ProblemRecord> = records
        .iter()
        .take_while(|r| r.next_review_date <= cutoff)
        .cloned()
        .collect();
    let upcoming: Option<ProblemRecord> = if due.is_empty() {
        records.into_iter().next()
    } else {
        None
    };
    DueSet { due, upcoming }
}
