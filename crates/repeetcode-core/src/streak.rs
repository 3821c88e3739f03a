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

use std::collections::HashSet;

use crate::error::Fallible;
use crate::types::date::Date;

/// The number of consecutive days, ending today, on which at least one
/// problem was solved. Zero if nothing was solved today.
pub fn current_streak<I>(solve_dates: I, today: Date) -> u32
where
    I: IntoIterator<Item = Date>,
{
    let days: HashSet<Date> = solve_dates.into_iter().collect();
    let mut streak: u32 = 0;
    let mut day: Date = today;
    while days.contains(&day) {
        streak += 1;
        let previous = day.previous();
        if previous == day {
            break;
        }
        day = previous;
    }
    streak
}

/// Like [`current_streak`], for dates given as `YYYY-MM-DD` strings or
/// timestamps with an explicit offset.
pub fn current_streak_from_strings<I, S>(solve_dates: I, today: Date) -> Fallible<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dates: Vec<Date> = solve_dates
        .into_iter()
        .map(|s| Date::parse_date_or_timestamp(s.as_ref()))
        .collect::<Fallible<_>>()?;
    Ok(current_streak(dates, today))
}
