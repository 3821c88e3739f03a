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

use std::fs::read_to_string;
use std::path::Path;

use repeetcode_core::catalog::parse_problem_list;

use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

/// Loads a LeetCode problem list into the catalog, replacing entries that
/// already exist.
pub fn import_catalog(database: &Path, file: &Path) -> Fallible<usize> {
    if !file.exists() {
        return fail(format!("file does not exist: {}", file.display()));
    }
    let entries = parse_problem_list(&read_to_string(file)?)?;
    let db = Database::open(database)?;
    let count = db.session()?.upsert_catalog(&entries)?;
    log::info!("Imported {count} problems from {}", file.display());
    println!("Imported {count} problems.");
    Ok(count)
}
