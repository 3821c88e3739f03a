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

use std::path::PathBuf;
use std::time::Duration;

use repeetcode_core::CatalogEntry;
use repeetcode_core::OfficialDifficulty;
use repeetcode_core::types::problem::normalize_tags;
use tempfile::TempDir;
use tempfile::tempdir;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::db::Database;
use crate::error::Fallible;

/// A small catalog, ordered by slug.
pub fn sample_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            slug: "add-two-numbers".to_string(),
            title: "Add Two Numbers".to_string(),
            official_difficulty: OfficialDifficulty::Medium,
            tags: normalize_tags(["Linked List", "Math", "Recursion"]),
        },
        CatalogEntry {
            slug: "median-of-two-sorted-arrays".to_string(),
            title: "Median of Two Sorted Arrays".to_string(),
            official_difficulty: OfficialDifficulty::Hard,
            tags: normalize_tags(["Array", "Binary Search"]),
        },
        CatalogEntry {
            slug: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            official_difficulty: OfficialDifficulty::Easy,
            tags: normalize_tags(["Array", "Hash Table"]),
        },
    ]
}

/// Creates a database in a temporary directory, seeded with
/// [`sample_catalog`]. The directory lives as long as the returned handle.
pub fn create_tmp_database() -> Fallible<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let path = dir.path().join("repeetcode.db");
    let db = Database::open(&path)?;
    db.session()?.upsert_catalog(&sample_catalog())?;
    Ok((dir, path))
}

pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    loop {
        if let Ok(stream) = TcpStream::connect(format!("{host}:{port}")).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}
