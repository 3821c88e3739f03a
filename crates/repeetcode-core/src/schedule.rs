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

//! Review scheduling policies.
//!
//! A policy maps a solve event (difficulty, result, prior review) to the next
//! review timestamp. Every policy guarantees that the next review is at least
//! one day after `now`.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::problem::Difficulty;
use crate::types::problem::ReviewResult;
use crate::types::timestamp::Timestamp;

/// The shortest interval any policy will schedule, in days.
pub const MIN_INTERVAL_DAYS: i64 = 1;

/// The longest interval any policy will schedule, in days.
pub const MAX_INTERVAL_DAYS: i64 = 36500;

/// Slack added before truncating `elapsed * multiplier`, so that products like
/// `10 * 1.2` are not truncated to 11 by representation error.
const TRUNCATION_EPSILON: f64 = 1e-9;

/// A difficulty rating outside the active policy's domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidDifficulty {
    pub value: i64,
    pub min: Difficulty,
    pub max: Difficulty,
}

impl Display for InvalidDifficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid difficulty {}: expected a value between {} and {}",
            self.value, self.min, self.max
        )
    }
}

impl Error for InvalidDifficulty {}

/// The inclusive domain of difficulty ratings a policy accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyRange {
    pub min: Difficulty,
    pub max: Difficulty,
}

impl DifficultyRange {
    pub fn check(&self, value: i64) -> Result<Difficulty, InvalidDifficulty> {
        if value < self.min as i64 || value > self.max as i64 {
            return Err(InvalidDifficulty {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value as Difficulty)
    }

    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of an already-checked difficulty within per-difficulty tables.
    fn index(&self, difficulty: Difficulty) -> usize {
        (difficulty - self.min) as usize
    }
}

/// What the scheduler needs to know about the previous review.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriorReview {
    pub reviewed_at: Timestamp,
    pub stage: u32,
}

/// The outcome of scheduling a review.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schedule {
    pub next_review: Timestamp,
    pub stage: u32,
}

pub trait SchedulingPolicy: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &'static str;

    fn difficulty_range(&self) -> DifficultyRange;

    /// Computes the next review. `result` is the outcome of the solve being
    /// logged now; an absent result counts as a pass.
    fn next_review(
        &self,
        difficulty: i64,
        result: Option<ReviewResult>,
        prior: Option<PriorReview>,
        now: Timestamp,
    ) -> Result<Schedule, InvalidDifficulty>;
}

/// Adaptive multiplicative policy.
///
/// On a first solve or a fail, the next review is `base_days[d]` out. On a
/// pass, the gap is the number of whole days since the last review times
/// `multipliers[d]`, truncated, capped at `max_spacing_days`, and floored at
/// one day.
pub struct AdaptivePolicy {
    range: DifficultyRange,
    base_days: Vec<i64>,
    multipliers: Vec<f64>,
    max_spacing_days: i64,
}

impl AdaptivePolicy {
    pub fn new(config: &AdaptiveConfig) -> Fallible<Self> {
        let range = DifficultyRange {
            min: config.min_difficulty,
            max: config.max_difficulty,
        };
        if range.is_empty() {
            return fail("adaptive policy: min_difficulty is greater than max_difficulty");
        }
        if !(MIN_INTERVAL_DAYS..=MAX_INTERVAL_DAYS).contains(&config.max_spacing_days) {
            return fail(format!(
                "adaptive policy: max_spacing_days {} is outside {MIN_INTERVAL_DAYS}..={MAX_INTERVAL_DAYS}",
                config.max_spacing_days
            ));
        }
        if config.base_days.len() != range.len() {
            return fail(format!(
                "adaptive policy: expected {} base_days entries, found {}",
                range.len(),
                config.base_days.len()
            ));
        }
        if config.multipliers.len() != range.len() {
            return fail(format!(
                "adaptive policy: expected {} multipliers, found {}",
                range.len(),
                config.multipliers.len()
            ));
        }
        for days in &config.base_days {
            if *days < MIN_INTERVAL_DAYS || *days > config.max_spacing_days {
                return fail(format!(
                    "adaptive policy: base interval {days} is outside 1..={}",
                    config.max_spacing_days
                ));
            }
        }
        for m in &config.multipliers {
            if !m.is_finite() || *m <= 0.0 {
                return fail(format!("adaptive policy: invalid multiplier {m}"));
            }
        }
        Ok(Self {
            range,
            base_days: config.base_days.clone(),
            multipliers: config.multipliers.clone(),
            max_spacing_days: config.max_spacing_days,
        })
    }

    /// The gap in days for a pass after `elapsed_days`.
    fn grown_gap(&self, index: usize, elapsed_days: i64) -> i64 {
        let product = elapsed_days as f64 * self.multipliers[index];
        let gap = (product + TRUNCATION_EPSILON).floor() as i64;
        gap.min(self.max_spacing_days).max(MIN_INTERVAL_DAYS)
    }
}

impl SchedulingPolicy for AdaptivePolicy {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn difficulty_range(&self) -> DifficultyRange {
        self.range
    }

    fn next_review(
        &self,
        difficulty: i64,
        result: Option<ReviewResult>,
        prior: Option<PriorReview>,
        now: Timestamp,
    ) -> Result<Schedule, InvalidDifficulty> {
        let index = self.range.index(self.range.check(difficulty)?);
        let (days, stage) = match prior {
            Some(prior) if result != Some(ReviewResult::Fail) => {
                let elapsed = now.whole_days_since(prior.reviewed_at);
                (
                    self.grown_gap(index, elapsed),
                    prior.stage.saturating_add(1),
                )
            }
            _ => (self.base_days[index], 0),
        };
        Ok(Schedule {
            next_review: now.plus_days(days),
            stage,
        })
    }
}

/// Fixed-ladder policy.
///
/// Difficulty is validated but otherwise ignored. A first solve or a fail
/// resets to the first rung; every pass climbs one rung, staying on the last
/// once it is reached.
pub struct FixedLadderPolicy {
    range: DifficultyRange,
    ladder: Vec<i64>,
}

impl FixedLadderPolicy {
    pub fn new(config: &LadderConfig) -> Fallible<Self> {
        let range = DifficultyRange {
            min: config.min_difficulty,
            max: config.max_difficulty,
        };
        if range.is_empty() {
            return fail("fixed-ladder policy: min_difficulty is greater than max_difficulty");
        }
        if config.ladder.is_empty() {
            return fail("fixed-ladder policy: the ladder is empty");
        }
        if let Some(rung) = config
            .ladder
            .iter()
            .find(|d| !(MIN_INTERVAL_DAYS..=MAX_INTERVAL_DAYS).contains(*d))
        {
            return fail(format!("fixed-ladder policy: invalid rung {rung}"));
        }
        Ok(Self {
            range,
            ladder: config.ladder.clone(),
        })
    }
}

impl SchedulingPolicy for FixedLadderPolicy {
    fn name(&self) -> &'static str {
        "fixed-ladder"
    }

    fn difficulty_range(&self) -> DifficultyRange {
        self.range
    }

    fn next_review(
        &self,
        difficulty: i64,
        result: Option<ReviewResult>,
        prior: Option<PriorReview>,
        now: Timestamp,
    ) -> Result<Schedule, InvalidDifficulty> {
        self.range.check(difficulty)?;
        let top = (self.ladder.len() - 1) as u32;
        let stage = match prior {
            Some(prior) if result != Some(ReviewResult::Fail) => {
                prior.stage.saturating_add(1).min(top)
            }
            _ => 0,
        };
        Ok(Schedule {
            next_review: now.plus_days(self.ladder[stage as usize]),
            stage,
        })
    }
}

/// Tables for [`AdaptivePolicy`]. Index `i` of each table belongs to
/// difficulty `min_difficulty + i`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptiveConfig {
    pub min_difficulty: Difficulty,
    pub max_difficulty: Difficulty,
    pub base_days: Vec<i64>,
    /// Growth factors. Ratings run from 1 (easiest) to 5 (hardest), so the
    /// factors shrink as difficulty rises.
    pub multipliers: Vec<f64>,
    pub max_spacing_days: i64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_difficulty: 1,
            max_difficulty: 5,
            base_days: vec![1, 1, 1, 1, 1],
            multipliers: vec![2.5, 2.0, 1.7, 1.4, 1.2],
            max_spacing_days: 60,
        }
    }
}

/// Tables for [`FixedLadderPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LadderConfig {
    pub min_difficulty: Difficulty,
    pub max_difficulty: Difficulty,
    pub ladder: Vec<i64>,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            min_difficulty: 1,
            max_difficulty: 5,
            ladder: vec![1, 3, 7, 15, 30],
        }
    }
}

/// Selects and parameterizes a scheduling policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PolicyConfig {
    Adaptive(AdaptiveConfig),
    FixedLadder(LadderConfig),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::Adaptive(AdaptiveConfig::default())
    }
}

impl PolicyConfig {
    pub fn build(&self) -> Fallible<Box<dyn SchedulingPolicy>> {
        Ok(match self {
            PolicyConfig::Adaptive(config) => Box::new(AdaptivePolicy::new(config)?),
            PolicyConfig::FixedLadder(config) => Box::new(FixedLadderPolicy::new(config)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn adaptive() -> AdaptivePolicy {
        AdaptivePolicy::new(&AdaptiveConfig::default()).unwrap()
    }

    fn ladder() -> FixedLadderPolicy {
        FixedLadderPolicy::new(&LadderConfig::default()).unwrap()
    }

    fn prior(s: &str, stage: u32) -> Option<PriorReview> {
        Some(PriorReview {
            reviewed_at: ts(s),
            stage,
        })
    }

    #[test]
    fn test_fail_uses_base_interval() {
        let policy = adaptive();
        let now = ts("2024-01-10T00:00:00Z");
        for last in ["2023-06-01T00:00:00Z", "2024-01-01T00:00:00Z", "2024-01-10T00:00:00Z"] {
            let schedule = policy
                .next_review(2, Some(ReviewResult::Fail), prior(last, 4), now)
                .unwrap();
            assert_eq!(schedule.next_review, ts("2024-01-11T00:00:00Z"));
            assert_eq!(schedule.stage, 0);
        }
    }

    #[test]
    fn test_first_solve_uses_base_interval() {
        let schedule = adaptive()
            .next_review(3, Some(ReviewResult::Pass), None, ts("2024-01-10T09:00:00Z"))
            .unwrap();
        assert_eq!(schedule.next_review, ts("2024-01-11T09:00:00Z"));
    }

    #[test]
    fn test_pass_after_ten_days() {
        let config = AdaptiveConfig {
            min_difficulty: 1,
            max_difficulty: 3,
            base_days: vec![1, 1, 1],
            multipliers: vec![1.2, 1.1, 1.05],
            max_spacing_days: 60,
        };
        let policy = AdaptivePolicy::new(&config).unwrap();
        let schedule = policy
            .next_review(
                1,
                Some(ReviewResult::Pass),
                prior("2024-01-01T00:00:00Z", 0),
                ts("2024-01-11T00:00:00Z"),
            )
            .unwrap();
        assert_eq!(schedule.next_review, ts("2024-01-23T00:00:00Z"));
        assert_eq!(schedule.stage, 1);
    }

    #[test]
    fn test_absent_result_counts_as_pass() {
        let schedule = adaptive()
            .next_review(
                1,
                None,
                prior("2024-01-01T00:00:00Z", 2),
                ts("2024-01-11T00:00:00Z"),
            )
            .unwrap();
        // floor(10 * 2.5) = 25
        assert_eq!(schedule.next_review, ts("2024-02-05T00:00:00Z"));
        assert_eq!(schedule.stage, 3);
    }

    #[test]
    fn test_same_day_relog_is_floored_to_one_day() {
        let now = ts("2024-01-10T18:00:00Z");
        let schedule = adaptive()
            .next_review(
                5,
                Some(ReviewResult::Pass),
                prior("2024-01-10T08:00:00Z", 1),
                now,
            )
            .unwrap();
        assert_eq!(schedule.next_review, now.plus_days(1));
    }

    #[test]
    fn test_partial_days_truncate() {
        // 1 day 23 hours elapsed counts as 1 day; floor(1 * 1.2) = 1.
        let now = ts("2024-01-03T07:00:00Z");
        let schedule = adaptive()
            .next_review(
                5,
                Some(ReviewResult::Pass),
                prior("2024-01-01T08:00:00Z", 1),
                now,
            )
            .unwrap();
        assert_eq!(schedule.next_review, now.plus_days(1));
    }

    #[test]
    fn test_gap_is_capped() {
        let now = ts("2024-06-01T00:00:00Z");
        let schedule = adaptive()
            .next_review(
                1,
                Some(ReviewResult::Pass),
                prior("2023-01-01T00:00:00Z", 7),
                now,
            )
            .unwrap();
        assert_eq!(schedule.next_review, now.plus_days(60));
    }

    #[test]
    fn test_never_same_day_and_never_beyond_cap() {
        let policy = adaptive();
        let now = ts("2024-06-01T12:00:00Z");
        for difficulty in 1..=5 {
            for result in [None, Some(ReviewResult::Pass), Some(ReviewResult::Fail)] {
                for elapsed in 0..200 {
                    let last = now.plus_days(-elapsed);
                    let schedule = policy
                        .next_review(
                            difficulty,
                            result,
                            Some(PriorReview {
                                reviewed_at: last,
                                stage: 0,
                            }),
                            now,
                        )
                        .unwrap();
                    let gap = schedule.next_review.whole_days_since(now);
                    assert!(gap >= 1, "d={difficulty} elapsed={elapsed}");
                    assert!(gap <= 60, "d={difficulty} elapsed={elapsed}");
                }
            }
        }
    }

    #[test]
    fn test_gap_is_monotone_in_elapsed_days() {
        let policy = adaptive();
        let now = ts("2024-06-01T00:00:00Z");
        for difficulty in 1..=5 {
            let mut previous = 0;
            for elapsed in 0..120 {
                let schedule = policy
                    .next_review(
                        difficulty,
                        Some(ReviewResult::Pass),
                        Some(PriorReview {
                            reviewed_at: now.plus_days(-elapsed),
                            stage: 0,
                        }),
                        now,
                    )
                    .unwrap();
                let gap = schedule.next_review.whole_days_since(now);
                assert!(gap >= previous);
                previous = gap;
            }
        }
    }

    #[test]
    fn test_harder_problems_come_back_sooner() {
        let policy = adaptive();
        let now = ts("2024-01-11T00:00:00Z");
        let gap = |d: i64| {
            policy
                .next_review(
                    d,
                    Some(ReviewResult::Pass),
                    prior("2024-01-01T00:00:00Z", 0),
                    now,
                )
                .unwrap()
                .next_review
        };
        for d in 1..5 {
            assert!(gap(d) >= gap(d + 1));
        }
    }

    #[test]
    fn test_difficulty_indexed_base_days() {
        let config = AdaptiveConfig {
            min_difficulty: 1,
            max_difficulty: 3,
            base_days: vec![3, 2, 1],
            multipliers: vec![2.0, 1.5, 1.2],
            max_spacing_days: 90,
        };
        let policy = AdaptivePolicy::new(&config).unwrap();
        let now = ts("2024-01-10T00:00:00Z");
        let next = policy.next_review(1, None, None, now).unwrap().next_review;
        assert_eq!(next, ts("2024-01-13T00:00:00Z"));
        let next = policy.next_review(3, None, None, now).unwrap().next_review;
        assert_eq!(next, ts("2024-01-11T00:00:00Z"));
    }

    #[test]
    fn test_invalid_difficulty() {
        let now = ts("2024-01-10T00:00:00Z");
        for difficulty in [0, 6, -1, 300] {
            let err = adaptive()
                .next_review(difficulty, None, None, now)
                .unwrap_err();
            assert_eq!(
                err,
                InvalidDifficulty {
                    value: difficulty,
                    min: 1,
                    max: 5
                }
            );
            assert!(ladder().next_review(difficulty, None, None, now).is_err());
        }
    }

    #[test]
    fn test_ladder_climbs_and_resets() {
        let policy = ladder();
        let mut now = ts("2024-01-01T00:00:00Z");
        let mut previous: Option<PriorReview> = None;
        let mut gaps = vec![];
        for _ in 0..7 {
            let schedule = policy
                .next_review(2, Some(ReviewResult::Pass), previous, now)
                .unwrap();
            gaps.push(schedule.next_review.whole_days_since(now));
            previous = Some(PriorReview {
                reviewed_at: now,
                stage: schedule.stage,
            });
            now = schedule.next_review;
        }
        assert_eq!(gaps, vec![1, 3, 7, 15, 30, 30, 30]);

        let schedule = policy
            .next_review(2, Some(ReviewResult::Fail), previous, now)
            .unwrap();
        assert_eq!(schedule.stage, 0);
        assert_eq!(schedule.next_review, now.plus_days(1));
    }

    #[test]
    fn test_ladder_ignores_difficulty() {
        let policy = ladder();
        let now = ts("2024-01-10T00:00:00Z");
        let a = policy
            .next_review(
                1,
                Some(ReviewResult::Pass),
                prior("2024-01-09T00:00:00Z", 1),
                now,
            )
            .unwrap();
        let b = policy
            .next_review(
                5,
                Some(ReviewResult::Pass),
                prior("2024-01-09T00:00:00Z", 1),
                now,
            )
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.next_review, ts("2024-01-17T00:00:00Z"));
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            AdaptiveConfig {
                base_days: vec![1, 1],
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                multipliers: vec![1.0; 4],
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                base_days: vec![0, 1, 1, 1, 1],
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                base_days: vec![90, 1, 1, 1, 1],
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                multipliers: vec![1.0, 1.0, f64::NAN, 1.0, 1.0],
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                max_spacing_days: 0,
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                max_spacing_days: MAX_INTERVAL_DAYS + 1,
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                base_days: vec![i64::MAX; 5],
                max_spacing_days: i64::MAX,
                ..AdaptiveConfig::default()
            },
            AdaptiveConfig {
                min_difficulty: 4,
                max_difficulty: 2,
                ..AdaptiveConfig::default()
            },
        ];
        for config in bad {
            assert!(AdaptivePolicy::new(&config).is_err(), "{config:?}");
        }
        let bad_ladders = [
            vec![],
            vec![0, 3],
            vec![1, MAX_INTERVAL_DAYS + 1],
            vec![i64::MAX],
        ];
        for ladder in bad_ladders {
            let config = LadderConfig {
                ladder,
                ..LadderConfig::default()
            };
            assert!(FixedLadderPolicy::new(&config).is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_longest_interval_round_trips() {
        let now = ts("2024-01-10T00:00:00Z");
        let policy = FixedLadderPolicy::new(&LadderConfig {
            ladder: vec![MAX_INTERVAL_DAYS],
            ..LadderConfig::default()
        })
        .unwrap();
        let next = policy.next_review(3, None, None, now).unwrap().next_review;
        assert_eq!(Timestamp::try_from(next.to_string()).unwrap(), next);

        let policy = AdaptivePolicy::new(&AdaptiveConfig {
            max_spacing_days: MAX_INTERVAL_DAYS,
            ..AdaptiveConfig::default()
        })
        .unwrap();
        let prior = PriorReview {
            reviewed_at: ts("1970-01-01T00:00:00Z"),
            stage: 0,
        };
        let next = policy
            .next_review(1, Some(ReviewResult::Pass), Some(prior), now)
            .unwrap()
            .next_review;
        assert_eq!(next, now.plus_days(MAX_INTERVAL_DAYS));
        assert_eq!(Timestamp::try_from(next.to_string()).unwrap(), next);
    }

    #[test]
    fn test_policy_config_rejects_unknown_keys() {
        let adaptive = r#"{"kind": "adaptive", "max_spacing_day": 90}"#;
        assert!(serde_json::from_str::<PolicyConfig>(adaptive).is_err());
        let ladder = r#"{"kind": "fixed-ladder", "rungs": [1, 2]}"#;
        assert!(serde_json::from_str::<PolicyConfig>(ladder).is_err());
    }

    #[test]
    fn test_policy_config_deserialization() {
        let config: PolicyConfig = serde_json::from_str(
            r#"{"kind": "fixed-ladder", "min_difficulty": 1, "max_difficulty": 3}"#,
        )
        .unwrap();
        let policy = config.build().unwrap();
        assert_eq!(policy.name(), "fixed-ladder");
        assert_eq!(policy.difficulty_range(), DifficultyRange { min: 1, max: 3 });

        let config: PolicyConfig =
            serde_json::from_str(r#"{"kind": "adaptive", "max_spacing_days": 90}"#).unwrap();
        match &config {
            PolicyConfig::Adaptive(c) => assert_eq!(c.max_spacing_days, 90),
            PolicyConfig::FixedLadder(_) => panic!("wrong policy"),
        }
        assert_eq!(config.build().unwrap().name(), "adaptive");
    }
}
