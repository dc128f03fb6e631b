// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The relational store handle and the plan executor.
//!
//! The store is an SQLite database populated by the build pipeline, holding
//! the `files`/`lines` relations, the structural tables and the trigram
//! index. The index exposes itself as the `trg_index` virtual table with a
//! `MATCH` predicate and an `extents()` function; both are opaque to this
//! crate. The executor owns no state beyond the borrowed pool; it does not
//! retry, and it buffers only what profiling needs to measure timings.
//!

use crate::{MyError, config::config};
use futures::TryStreamExt;
use serde::Serialize;
use sqlx::{
    AssertSqlSafe, FromRow, Pool, Row, Sqlite, pool::PoolOptions, sqlite::SqliteConnectOptions,
    sqlite::SqliteRow,
};
use std::{str::FromStr, time::Instant};
use tracing::{debug, info};

const FIND_FILES_TABLE: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'files'";

// structure to read back a single textual column.
#[allow(dead_code)]
#[derive(Debug, FromRow)]
struct Name(String);

/// Execution profile of one statement, collected when a query runs in
/// explain mode.
#[derive(Debug, Serialize)]
pub struct SqlProfile {
    /// The statement text.
    pub sql: String,
    /// The bound parameters, in bind order.
    pub parameters: Vec<String>,
    /// The store's query plan explanation, one line per step.
    pub explanation: Vec<String>,
    /// Wall time of the fetch, in seconds.
    pub elapsed: f64,
    /// Number of rows the statement produced.
    pub nrows: usize,
}

/// Handle on the search index database.
#[derive(Debug)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Open the store at the given database URL, loading the trigram
    /// extension when one is configured, and sanity-check the schema.
    pub async fn connect(url: &str) -> Result<Self, MyError> {
        let mut opts = SqliteConnectOptions::from_str(url)?;
        if let Some(path) = config().trigram_extension() {
            // IMPORTANT - this is UNSAFE but i have no control over how to
            // do it differently: substring + regexp matching is a no go
            // w/o the trigram extension unless the deployment pre-loads it
            // into every connection...
            opts = unsafe { opts.extension(path.to_owned()) };
            info!("loading trigram extension from {path}");
        }
        let pool = PoolOptions::new().connect_with(opts).await?;

        // ensure this is actually a search index...
        let found = sqlx::query_as::<_, Name>(FIND_FILES_TABLE)
            .fetch_optional(&pool)
            .await?;
        if found.is_none() {
            return Err(MyError::Runtime("Not a search index: no 'files' table".into()));
        }

        Ok(Self { pool })
    }

    /// Wrap an already-configured pool. Schema checks are the caller's
    /// business.
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Return a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run a retrieval plan's SQL and collect its rows. When `profile` is
    /// given, also record the statement text, its parameters, the store's
    /// query plan explanation, the elapsed wall time and the row count.
    pub(crate) async fn fetch_rows(
        &self,
        sql: &str,
        args: &[&str],
        limit: i64,
        offset: i64,
        profile: Option<&mut Vec<SqlProfile>>,
    ) -> Result<Vec<SqliteRow>, MyError> {
        debug!("fetch_rows: {sql} {args:?} limit={limit} offset={offset}");
        let explaining = profile.is_some();
        let explanation = if explaining {
            let explain_sql = format!("EXPLAIN QUERY PLAN {sql}");
            let mut q = sqlx::query(AssertSqlSafe(explain_sql));
            for a in args {
                q = q.bind((*a).to_owned());
            }
            q = q.bind(limit).bind(offset);
            let rows = q.fetch_all(&self.pool).await?;
            rows.iter()
                .map(|r| r.try_get::<String, _>("detail"))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        let start = Instant::now();
        let mut q = sqlx::query(AssertSqlSafe(sql.to_owned()));
        for a in args {
            q = q.bind((*a).to_owned());
        }
        q = q.bind(limit).bind(offset);
        // pull through the cursor so an early drop releases it even when
        // profiling forces eager materialization...
        let mut stream = q.fetch(&self.pool);
        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            rows.push(row);
        }
        drop(stream);

        if let Some(profile) = profile {
            let mut parameters: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
            parameters.push(limit.to_string());
            parameters.push(offset.to_string());
            profile.push(SqlProfile {
                sql: sql.to_owned(),
                parameters,
                explanation,
                elapsed: start.elapsed().as_secs_f64(),
                nrows: rows.len(),
            });
        }
        Ok(rows)
    }

    /// Run a per-file extent query: `arg` fills the name-match placeholder
    /// and `file_id` the file slot. Rows with null or zero sentinels are
    /// dropped, the rest come back as `(start, end)` pairs.
    pub(crate) async fn extent_rows(
        &self,
        sql: &str,
        arg: &str,
        file_id: i64,
    ) -> Result<Vec<(u32, u32)>, MyError> {
        debug!("extent_rows: {sql} [{arg}, {file_id}]");
        let rows = sqlx::query_as::<_, (Option<i64>, Option<i64>)>(AssertSqlSafe(sql.to_owned()))
            .bind(arg.to_owned())
            .bind(file_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|pair| match pair {
                (Some(s), Some(e)) if s > 0 && e > 0 => {
                    Some((u32::try_from(s).ok()?, u32::try_from(e).ok()?))
                }
                _ => None,
            })
            .collect())
    }
}

/// Build the connect options test fixtures and small tools want for an
/// in-memory store: a single pinned connection, since each new in-memory
/// connection would otherwise be a fresh empty database.
pub fn in_memory_pool_options() -> (PoolOptions<Sqlite>, SqliteConnectOptions) {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:").expect("static URL");
    let pool_opts = PoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None);
    (pool_opts, opts)
}
