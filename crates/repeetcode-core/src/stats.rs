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

use serde::Serialize;

use crate::due::select_due;
use crate::streak::current_streak;
use crate::types::problem::ProblemRecord;
use crate::types::problem::ReviewResult;
use crate::types::timestamp::Timestamp;

/// Summary figures for the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_problems: usize,
    pub due_today: usize,
    /// Percentage of passes among records that carry a result.
    pub success_rate: Option<u32>,
    pub current_streak: u32,
}

impl DashboardStats {
    pub fn compute(records: Vec<ProblemRecord>, now: Timestamp) -> Self {
        let total_problems = records.len();
        let streak = current_streak(records.iter().map(|r| r.date_solved.date()), now.date());
        let (passes, graded) = records
            .iter()
            .filter_map(|r| r.last_result)
            .fold((0usize, 0usize), |(passes, graded), result| {
                let pass = usize::from(result == ReviewResult::Pass);
                (passes + pass, graded + 1)
            });
        let success_rate = if graded == 0 {
            None
        } else {
            Some(((passes as f64 / graded as f64) * 100.0).round() as u32)
        };
        let due_today = select_due(records, now).due.len();
        DashboardStats {
            total_problems,
            due_today,
            success_rate,
            current_streak: streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::problem::OfficialDifficulty;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn record(slug: &str, result: Option<ReviewResult>, solved: &str, next: &str) -> ProblemRecord {
        ProblemRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            official_difficulty: OfficialDifficulty::Hard,
            user_difficulty: 4,
            last_result: result,
            review_stage: 0,
            date_solved: ts(solved),
            next_review_date: ts(next),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn test_empty_collection() {
        let stats = DashboardStats::compute(vec![], ts("2024-03-03T12:00:00Z"));
        assert_eq!(
            stats,
            DashboardStats {
                total_problems: 0,
                due_today: 0,
                success_rate: None,
                current_streak: 0,
            }
        );
    }

    #[test]
    fn test_stats() {
        let records = vec![
            record("a", Some(ReviewResult::Pass), "2024-03-01T10:00:00Z", "2024-03-02T10:00:00Z"),
            record("b", Some(ReviewResult::Fail), "2024-03-02T10:00:00Z", "2024-03-03T10:00:00Z"),
            record("c", Some(ReviewResult::Pass), "2024-03-03T08:00:00Z", "2024-03-10T08:00:00Z"),
            record("d", None, "2024-03-03T09:00:00Z", "2024-03-04T09:00:00Z"),
        ];
        let stats = DashboardStats::compute(records, ts("2024-03-03T12:00:00Z"));
        assert_eq!(stats.total_problems, 4);
        assert_eq!(stats.due_today, 2);
        assert_eq!(stats.success_rate, Some(67));
        assert_eq!(stats.current_streak, 3);
    }
}
