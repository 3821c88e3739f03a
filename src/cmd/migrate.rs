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

use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

use repeetcode_core::CatalogEntry;
use repeetcode_core::PolicyConfig;
use repeetcode_core::ProblemRecord;
use repeetcode_core::migrate::LegacyRecord;
use repeetcode_core::migrate::migrate_record;

use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// Converts a JSON array of version 1 records into the current schema and
/// stores them for `user_id`. Every record is converted before any is
/// written, so a single bad record leaves the database untouched.
pub fn migrate_records(
    database: &Path,
    file: &Path,
    user_id: &str,
    policy: &PolicyConfig,
) -> Fallible<usize> {
    if !file.exists() {
        return fail(format!("file does not exist: {}", file.display()));
    }
    let legacy: Vec<LegacyRecord> = serde_json::from_str(&read_to_string(file)?)?;
    let range = policy.build()?.difficulty_range();
    let db = Database::open(database)?;
    let mut session = db.session()?;
    let catalog: HashMap<String, CatalogEntry> = session
        .catalog()?
        .into_iter()
        .map(|entry| (entry.slug.clone(), entry))
        .collect();

    let records: Vec<ProblemRecord> = legacy
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            migrate_record(record, |slug| catalog.get(slug).cloned(), range).map_err(|e| {
                ErrorReport::new(format!("record {index}: {}", e.message()))
            })
        })
        .collect::<Fallible<_>>()?;

    let count = session.put_records(user_id, &records)?;
    log::info!("Migrated {count} records for {user_id}");
    println!("Migrated {count} records.");
    Ok(count)
}
