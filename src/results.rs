// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Shaping of raw plan rows into per-file search results with highlighted
//! line fragments.
//!
//! Line-joined plans order rows by `(path, line number)`, so rows of one
//! file arrive contiguously, and the same line may arrive more than once
//! when several filters (or several matches of one structural filter)
//! contribute extents to it. The shaper folds duplicates by unioning their
//! extents before a line is highlighted exactly once.
//!

use crate::{
    MyError,
    extents::{self, parse_extents},
    plan::LINE_FIELDS,
    store::SqlProfile,
};
use serde::Serialize;
use sqlx::{Row, sqlite::SqliteRow};
use tracing::warn;

/// One file's worth of hits: the file icon, its path within the tree, and
/// the matching lines with their highlighted text. File-only queries leave
/// `lines` empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Icon name for rendering.
    pub icon: String,
    /// Path within the indexed tree.
    pub path: String,
    /// `(line number, highlighted line)` pairs, ascending.
    pub lines: Vec<(u64, String)>,
}

/// Everything one query execution produced.
#[derive(Debug, Default)]
pub struct ResultSet {
    /// Search results grouped by file, ordered by path then line number.
    /// When the query ran in explain mode, synthetic report rows describing
    /// the executed SQL are prefixed to the list.
    pub results: Vec<SearchResult>,
    /// One entry per term that was dropped from the plan because the
    /// trigram engine would reject its pattern.
    pub bad_patterns: Vec<MyError>,
}

// one extracted line-joined row...
struct LineRow {
    path: String,
    icon: String,
    encoding: String,
    file_id: i64,
    line_id: i64,
    number: i64,
    text: Vec<u8>,
    extents: Vec<(u32, u32)>,
}

fn extract(row: &SqliteRow) -> Result<LineRow, MyError> {
    let mut extents = parse_extents(
        &row.try_get::<Option<Vec<u8>>, _>(7)?.unwrap_or_default(),
    );
    // filter-contributed extent pairs trail the fixed prefix; a pair is
    // NULL when its filter matched the file but has no extent there...
    let mut i = LINE_FIELDS;
    while i + 1 < row.len() {
        let start = row.try_get::<Option<i64>, _>(i)?;
        let end = row.try_get::<Option<i64>, _>(i + 1)?;
        if let (Some(start), Some(end)) = (start, end)
            && start >= 0
            && end > start
        {
            extents.push((start as u32, end as u32));
        }
        i += 2;
    }
    Ok(LineRow {
        path: row.try_get(0)?,
        icon: row.try_get::<Option<String>, _>(1)?.unwrap_or_default(),
        encoding: row
            .try_get::<Option<String>, _>(2)?
            .unwrap_or_else(|| "utf-8".to_owned()),
        file_id: row.try_get(3)?,
        line_id: row.try_get(4)?,
        number: row.try_get(5)?,
        text: row.try_get(6)?,
        extents,
    })
}

// decode + highlight one finished line, or skip it when its bytes do not
// survive the declared encoding...
fn push_line(
    result: &mut SearchResult,
    encoding: &str,
    number: i64,
    text: &[u8],
    extents: Vec<(u32, u32)>,
    markup: &str,
    markdown: &str,
) {
    match extents::decode(text, encoding) {
        Ok(text) => {
            let highlighted = extents::highlight_line(&text, &extents, markup, markdown);
            result.lines.push((number.max(0) as u64, highlighted));
        }
        Err(x) => warn!("skipping line {number} of {}: {x}", result.path),
    }
}

/// Shape rows of a file-only plan: one result per row, no lines.
pub(crate) fn shape_file_rows(rows: &[SqliteRow]) -> Result<Vec<SearchResult>, MyError> {
    rows.iter()
        .map(|row| {
            Ok(SearchResult {
                icon: row.try_get::<Option<String>, _>(1)?.unwrap_or_default(),
                path: row.try_get(0)?,
                lines: Vec::new(),
            })
        })
        .collect()
}

/// Shape rows of a line-joined plan: group contiguous rows by file, fold
/// duplicate lines by unioning their extents, highlight each line once.
pub(crate) fn shape_line_rows(
    rows: &[SqliteRow],
    markup: &str,
    markdown: &str,
) -> Result<Vec<SearchResult>, MyError> {
    let rows = rows.iter().map(extract).collect::<Result<Vec<_>, _>>()?;

    let mut out: Vec<SearchResult> = Vec::new();
    let mut file_id = i64::MIN;
    let mut encoding = String::new();
    // (line_id, number, text, merged-extents-so-far)
    let mut pending: Option<(i64, i64, Vec<u8>, Vec<(u32, u32)>)> = None;

    for row in rows {
        if row.file_id != file_id || out.is_empty() {
            if let (Some((_, number, text, exts)), Some(result)) = (pending.take(), out.last_mut())
            {
                push_line(result, &encoding, number, &text, exts, markup, markdown);
            }
            out.push(SearchResult {
                icon: row.icon,
                path: row.path,
                lines: Vec::new(),
            });
            file_id = row.file_id;
            encoding = row.encoding;
            pending = Some((row.line_id, row.number, row.text, row.extents));
            continue;
        }
        match &mut pending {
            Some((line_id, _, _, exts)) if *line_id == row.line_id => {
                // same line again, courtesy of the cross-product; keep
                // collecting its extents...
                exts.extend(row.extents);
            }
            _ => {
                if let (Some((_, number, text, exts)), Some(result)) =
                    (pending.take(), out.last_mut())
                {
                    push_line(result, &encoding, number, &text, exts, markup, markdown);
                }
                pending = Some((row.line_id, row.number, row.text, row.extents));
            }
        }
    }
    if let (Some((_, number, text, exts)), Some(result)) = (pending.take(), out.last_mut()) {
        push_line(result, &encoding, number, &text, exts, markup, markdown);
    }
    Ok(out)
}

// empty lines collapse some renderers' line boxes; pad them like the
// report view expects...
fn number_lines<I: IntoIterator<Item = String>>(lines: I) -> Vec<(u64, String)> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line = if line.is_empty() { " ".to_owned() } else { line };
            (i as u64, line)
        })
        .collect()
}

/// Render collected execution profiles as synthetic result rows, to be
/// prefixed to the hit list.
pub(crate) fn report_results(profiles: &[SqlProfile]) -> Vec<SearchResult> {
    let mut out = Vec::with_capacity(profiles.len() * 3);
    for (i, p) in profiles.iter().enumerate() {
        out.push(SearchResult {
            icon: String::new(),
            path: format!("sql {i} ({} row(s); {:.6} seconds)", p.nrows, p.elapsed),
            lines: number_lines(p.sql.split('\n').map(str::to_owned)),
        });
        out.push(SearchResult {
            icon: String::new(),
            path: format!("parameters {i}"),
            lines: number_lines(p.parameters.iter().map(|x| format!("{x:?}"))),
        });
        out.push(SearchResult {
            icon: String::new(),
            path: format!("explanation {i}"),
            lines: number_lines(p.explanation.iter().cloned()),
        });
    }
    out
}
