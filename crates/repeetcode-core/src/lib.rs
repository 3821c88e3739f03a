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

//! repeetcode-core: Core library for the repeetcode practice tracker.
//!
//! This library is free of I/O and provides:
//! - The problem record and catalog data model
//! - Review scheduling policies (adaptive and fixed-ladder)
//! - Due-review selection and practice streaks
//! - Catalog import and legacy record migration

pub mod catalog;
pub mod due;
pub mod error;
pub mod migrate;
pub mod schedule;
pub mod solve;
pub mod stats;
pub mod streak;
pub mod types;

// Re-exports for convenience
pub use due::{DueSet, select_due};
pub use error::{ErrorReport, Fallible, fail};
pub use schedule::{InvalidDifficulty, PolicyConfig, SchedulingPolicy};
pub use solve::{SolveError, SolveEvent, apply_solve};
pub use stats::DashboardStats;
pub use streak::current_streak;
pub use types::date::Date;
pub use types::problem::{CatalogEntry, OfficialDifficulty, ProblemRecord, ReviewResult};
pub use types::timestamp::Timestamp;
