// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The "jump straight there" heuristic for single-term queries.
//!
//! When a query is one bare word it usually names a file, a type or a
//! function, and the user wants the definition, not a hit list. Each
//! lookup runs with `LIMIT 2` so the "exactly one match" test stays cheap
//! and unambiguous; two candidates at every rung means no jump.
//!

use crate::{MyError, store::Store};
use regex::Regex;
use sqlx::FromRow;
use std::sync::LazyLock;

// Pattern matching a file-and-line-number token `filename:n`.
static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^.*:[0-9]+$").expect("static pattern"));

const FIND_FILE: &str = "SELECT path FROM files \
     WHERE path = $1 OR path LIKE $2 LIMIT 2";

const FIND_TYPE_EXACT: &str = "SELECT \
       (SELECT path FROM files WHERE files.id = types.file_id) AS path, \
       types.file_line \
     FROM types WHERE types.name = $1 LIMIT 2";

const FIND_FUNCTION_EXACT: &str = "SELECT \
       (SELECT path FROM files WHERE files.id = functions.file_id) AS path, \
       functions.file_line \
     FROM functions WHERE functions.name = $1 LIMIT 2";

const FIND_TYPE_QUALIFIED: &str = "SELECT \
       (SELECT path FROM files WHERE files.id = types.file_id) AS path, \
       types.file_line \
     FROM types WHERE types.qualname LIKE $1 LIMIT 2";

const FIND_FUNCTION_QUALIFIED: &str = "SELECT \
       (SELECT path FROM files WHERE files.id = functions.file_id) AS path, \
       functions.file_line \
     FROM functions WHERE functions.qualname LIKE $1 LIMIT 2";

const FIND_TYPE_LIKE: &str = "SELECT \
       (SELECT path FROM files WHERE files.id = types.file_id) AS path, \
       types.file_line \
     FROM types WHERE types.name LIKE $1 LIMIT 2";

const FIND_FUNCTION_LIKE: &str = "SELECT \
       (SELECT path FROM files WHERE files.id = functions.file_id) AS path, \
       functions.file_line \
     FROM functions WHERE functions.name LIKE $1 LIMIT 2";

#[derive(Debug, FromRow)]
struct PathRow {
    path: String,
}

#[derive(Debug, FromRow)]
struct LocationRow {
    path: String,
    file_line: i64,
}

// exactly-one test over a LIMIT 2 result...
fn only<T>(mut rows: Vec<T>) -> Option<T> {
    match rows.len() {
        1 => rows.pop(),
        _ => None,
    }
}

async fn lookup(
    store: &Store,
    sql: &'static str,
    arg: &str,
) -> Result<Option<(String, u64)>, MyError> {
    let rows = sqlx::query_as::<_, LocationRow>(sql)
        .bind(arg.to_owned())
        .fetch_all(store.pool())
        .await?;
    Ok(only(rows).map(|r| (r.path, r.file_line.max(0) as u64)))
}

/// Resolve a single textual term to a unique `(path, line)` navigation
/// target, or `None` when nothing (or more than one thing) matches.
pub(crate) async fn direct_result(
    store: &Store,
    term: &str,
) -> Result<Option<(String, u64)>, MyError> {
    // `foo.cpp:17` means line 17 of foo.cpp; everything else means the
    // top of whatever we find...
    let (term, line_number) = match LINE_NUMBER.is_match(term) {
        true => {
            let (name, number) = term.rsplit_once(':').expect("pattern has a colon");
            (name, number.parse::<u64>().unwrap_or(1))
        }
        false => (term, 1),
    };

    // a unique file match wins outright...
    let rows = sqlx::query_as::<_, PathRow>(FIND_FILE)
        .bind(term.to_owned())
        .bind(format!("%/{term}"))
        .fetch_all(store.pool())
        .await?;
    if let Some(row) = only(rows) {
        return Ok(Some((row.path, line_number)));
    }

    // case sensitive type, then function names...
    if let Some(hit) = lookup(store, FIND_TYPE_EXACT, term).await? {
        return Ok(Some(hit));
    }
    if let Some(hit) = lookup(store, FIND_FUNCTION_EXACT, term).await? {
        return Ok(Some(hit));
    }

    // fully qualified identifiers; the trailing wildcard on functions
    // eats parameter lists like "(int x)"...
    if term.contains("::") {
        if let Some(hit) = lookup(store, FIND_TYPE_QUALIFIED, term).await? {
            return Ok(Some(hit));
        }
        if let Some(hit) = lookup(store, FIND_FUNCTION_QUALIFIED, &format!("{term}%")).await? {
            return Ok(Some(hit));
        }
    }

    // case insensitive fallback...
    if let Some(hit) = lookup(store, FIND_TYPE_LIKE, term).await? {
        return Ok(Some(hit));
    }
    if let Some(hit) = lookup(store, FIND_FUNCTION_LIKE, term).await? {
        return Ok(Some(hit));
    }

    // okay we've got nothing...
    Ok(None)
}
