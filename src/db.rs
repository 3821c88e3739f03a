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

//! SQLite-backed storage for the catalog and per-user problem records.
//!
//! There is no shared connection: [`Database`] only knows where the file is,
//! and each request opens its own [`Session`], which closes when dropped.

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use repeetcode_core::CatalogEntry;
use repeetcode_core::OfficialDifficulty;
use repeetcode_core::ProblemRecord;
use repeetcode_core::ReviewResult;
use repeetcode_core::Timestamp;
use repeetcode_core::types::problem::Difficulty;
use repeetcode_core::types::problem::RECORD_SCHEMA_VERSION;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::params;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
create table if not exists catalog (
    slug text primary key,
    title text not null,
    official_difficulty text not null,
    tags text not null
) strict;

create table if not exists problems (
    user_id text not null,
    slug text not null references catalog (slug),
    title text not null,
    official_difficulty text not null,
    user_difficulty integer not null,
    last_result text,
    review_stage integer not null,
    date_solved text not null,
    next_review_date text not null,
    tags text not null,
    primary key (user_id, slug)
) strict;
";

const RECORD_COLUMNS: &str = "slug, title, official_difficulty, user_difficulty, last_result, review_stage, date_solved, next_review_date, tags";

/// Handle to the database file.
#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Opens the database at `path`, creating the schema if needed.
    pub fn open(path: &Path) -> Fallible<Self> {
        let db = Database {
            path: path.to_path_buf(),
        };
        let session = db.session()?;
        let version: u32 = session
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        match version {
            0 => {
                log::debug!("Creating schema in {}", path.display());
                session.conn.execute_batch(SCHEMA)?;
                session
                    .conn
                    .pragma_update(None, "user_version", RECORD_SCHEMA_VERSION)?;
            }
            v if v == RECORD_SCHEMA_VERSION => {}
            v => {
                return fail(format!(
                    "database schema version {v} is not supported (expected {RECORD_SCHEMA_VERSION})"
                ));
            }
        }
        Ok(db)
    }

    /// Opens a connection scoped to the caller.
    pub fn session(&self) -> Fallible<Session> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Session { conn })
    }
}

pub struct Session {
    conn: Connection,
}

impl Session {
    pub fn catalog_entry(&self, slug: &str) -> Fallible<Option<CatalogEntry>> {
        let row: Option<CatalogRow> = self
            .conn
            .query_row(
                "select slug, title, official_difficulty, tags from catalog where slug = ?1",
                params![slug],
                CatalogRow::read,
            )
            .optional()?;
        row.map(CatalogRow::parse).transpose()
    }

    /// All catalog entries, ordered by slug.
    pub fn catalog(&self) -> Fallible<Vec<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("select slug, title, official_difficulty, tags from catalog order by slug")?;
        let rows: Vec<CatalogRow> = stmt
            .query_map([], CatalogRow::read)?
            .collect::<Result<_, _>>()?;
        rows.into_iter().map(CatalogRow::parse).collect()
    }

    /// Inserts or replaces catalog entries in a single transaction. Returns the
    /// number of entries written.
    pub fn upsert_catalog(&mut self, entries: &[CatalogEntry]) -> Fallible<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "insert into catalog (slug, title, official_difficulty, tags) values (?1, ?2, ?3, ?4)
                 on conflict (slug) do update set
                    title = excluded.title,
                    official_difficulty = excluded.official_difficulty,
                    tags = excluded.tags",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.slug,
                    entry.title,
                    entry.official_difficulty.as_str(),
                    serde_json::to_string(&entry.tags)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    /// Writes records in a single transaction, replacing any earlier state for
    /// the same problems. Either all are written or none are.
    pub fn put_records(&mut self, user_id: &str, records: &[ProblemRecord]) -> Fallible<usize> {
        let tx = self.conn.transaction()?;
        for record in records {
            put_record(&tx, user_id, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// All of a user's records, ordered by slug.
    pub fn list_records(&self, user_id: &str) -> Fallible<Vec<ProblemRecord>> {
        let sql = format!("select {RECORD_COLUMNS} from problems where user_id = ?1 order by slug");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows: Vec<RecordRow> = stmt
            .query_map(params![user_id], RecordRow::read)?
            .collect::<Result<_, _>>()?;
        rows.into_iter().map(RecordRow::parse).collect()
    }

    /// Reads the current record, computes its replacement with `f` and writes
    /// it back, all inside one immediate transaction. If `f` fails nothing is
    /// written.
    pub fn update_record<E, F>(
        &mut self,
        user_id: &str,
        slug: &str,
        f: F,
    ) -> Result<ProblemRecord, E>
    where
        E: From<ErrorReport>,
        F: FnOnce(Option<ProblemRecord>) -> Result<ProblemRecord, E>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(ErrorReport::from)?;
        let prior = get_record(&tx, user_id, slug)?;
        let record = f(prior)?;
        if record.slug != slug {
            return Err(E::from(ErrorReport::new(format!(
                "record for '{}' cannot replace '{slug}'",
                record.slug
            ))));
        }
        put_record(&tx, user_id, &record)?;
        tx.commit().map_err(ErrorReport::from)?;
        Ok(record)
    }
}

fn get_record(conn: &Connection, user_id: &str, slug: &str) -> Fallible<Option<ProblemRecord>> {
    let sql = format!("select {RECORD_COLUMNS} from problems where user_id = ?1 and slug = ?2");
    let row: Option<RecordRow> = conn
        .query_row(&sql, params![user_id, slug], RecordRow::read)
        .optional()?;
    row.map(RecordRow::parse).transpose()
}

fn put_record(conn: &Connection, user_id: &str, record: &ProblemRecord) -> Fallible<()> {
    let sql = format!(
        "insert or replace into problems (user_id, {RECORD_COLUMNS})
         values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
    );
    conn.execute(
        &sql,
        params![
            user_id,
            record.slug,
            record.title,
            record.official_difficulty.as_str(),
            record.user_difficulty,
            record.last_result.map(|r| r.as_str()),
            record.review_stage,
            record.date_solved.to_string(),
            record.next_review_date.to_string(),
            serde_json::to_string(&record.tags)?,
        ],
    )?;
    Ok(())
}

/// A catalog row as stored, before parsing.
struct CatalogRow {
    slug: String,
    title: String,
    official_difficulty: String,
    tags: String,
}

impl CatalogRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(CatalogRow {
            slug: row.get(0)?,
            title: row.get(1)?,
            official_difficulty: row.get(2)?,
            tags: row.get(3)?,
        })
    }

    fn parse(self) -> Fallible<CatalogEntry> {
        Ok(CatalogEntry {
            slug: self.slug,
            title: self.title,
            official_difficulty: OfficialDifficulty::try_from(self.official_difficulty)?,
            tags: serde_json::from_str(&self.tags)?,
        })
    }
}

/// A problem row as stored, before parsing.
struct RecordRow {
    slug: String,
    title: String,
    official_difficulty: String,
    user_difficulty: Difficulty,
    last_result: Option<String>,
    review_stage: u32,
    date_solved: String,
    next_review_date: String,
    tags: String,
}

impl RecordRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(RecordRow {
            slug: row.get(0)?,
            title: row.get(1)?,
            official_difficulty: row.get(2)?,
            user_difficulty: row.get(3)?,
            last_result: row.get(4)?,
            review_stage: row.get(5)?,
            date_solved: row.get(6)?,
            next_review_date: row.get(7)?,
            tags: row.get(8)?,
        })
    }

    fn parse(self) -> Fallible<ProblemRecord> {
        let last_result: Option<ReviewResult> = match self.last_result {
            Some(result) => Some(ReviewResult::try_from(result)?),
            None => None,
        };
        let tags: BTreeSet<String> = serde_json::from_str(&self.tags)?;
        Ok(ProblemRecord {
            slug: self.slug,
            title: self.title,
            official_difficulty: OfficialDifficulty::try_from(self.official_difficulty)?,
            user_difficulty: self.user_difficulty,
            last_result,
            review_stage: self.review_stage,
            date_solved: Timestamp::try_from(self.date_solved)?,
            next_review_date: Timestamp::try_from(self.next_review_date)?,
            tags,
        })
    }
}
