// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Query core of a source-code search engine.
//!
//! The next paragraphs explain in more detail the elements of this project
//! as well as the rationale behind some of the decisions that shaped its
//! components.
//!
//! # Queries
//!
//! The kernel of this project is the [`Query`]: a user-typed search string
//! parsed into typed terms. Free text and `kind:argument` pairs mix
//! freely, terms may be negated with a leading `-`, and structural terms
//! may ask for qualified-name matching with a leading `+`:
//!
//! ```text
//! function:main -path:test "o hai" +type:std::vector
//! ```
//!
//! Parsing is done by [`Query::parse()`]:
//! ```rust
//! use quarry::prelude::*;
//! use std::error::Error;
//!
//! # fn test() -> Result<(), Box<dyn Error>> {
//! let q = Query::parse(r#"function:main -path:test"#, false)?;
//! # Ok(())
//! # }
//! ```
//! An `Ok` result implies a syntactically correct parsed query!
//!
//! For convenience, a standalone tool is included that can be used from
//! the command line to inspect how a query parses and what SQL it plans.
//! Once the library is built (`cargo b↵`), invoke it by calling:
//! ```bash
//! cargo r --bin repl↵
//! ```
//!
//! # Filters and plans
//!
//! Each term kind is answered by a catalog [filter](filter_menu_items):
//! trigram-backed text and regexp matching, file-level `path`/`ext`
//! predicates, and structural filters over the code graph (functions,
//! types, variables, macros, namespaces, inheritance, membership,
//! overrides, warnings). Every active filter contributes columns,
//! predicates and bound arguments to **one** retrieval plan, whose shape
//! depends on whether any contributing filter restricts individual lines:
//! file-only plans touch the files relation alone, line-joined plans join
//! the line and trigram indexes and return per-line rows with highlight
//! extents.
//!
//! [`Query::results()`] executes the plan against a [`Store`] and shapes
//! the rows into per-file [`SearchResult`]s with merged, marker-wrapped
//! extents. [`Query::direct_result()`] is the orthogonal fast path: when
//! the query is a single bare term it tries to resolve a unique
//! `(path, line)` navigation target over files, types and functions.
//!
//! # The store
//!
//! The core borrows a [`Store`] handle over the SQLite index the build
//! pipeline populates. The trigram index is opaque: an extension exposing
//! a `MATCH` predicate with scheme-tagged search strings
//! (`substr:`, `isubstr:`, `regexp:`, with an `-extents` suffix when
//! match positions are wanted) and an `extents()` function returning
//! packed position pairs. Nothing here retries store operations; retries
//! are the caller's business, and per-line decoding failures are the only
//! errors recovered locally.
//!

mod config;
mod direct;
mod error;
mod extents;
mod filter;
mod plan;
mod results;
mod store;
mod term;
mod text;

pub use config::*;
pub use error::MyError;
pub use extents::highlight_line;
pub use filter::{MenuItem, filter_menu_items};
pub use results::{ResultSet, SearchResult};
pub use store::{SqlProfile, Store, in_memory_pool_options};
pub use term::{Term, TermSet};

pub mod prelude;

use crate::{filter::registry, text::search};
use tracing::debug;

/// Options shaping one result iteration.
#[derive(Debug, Clone)]
pub struct SearchOptions<'a> {
    /// Number of leading rows to skip.
    pub offset: i64,
    /// Page size.
    pub limit: i64,
    /// Marker inserted before each highlighted extent.
    pub markup: &'a str,
    /// Marker inserted after each highlighted extent.
    pub markdown: &'a str,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: config().result_limit(),
            markup: "<b>",
            markdown: "</b>",
        }
    }
}

/// A parsed search query, ready to plan and execute.
#[derive(Debug)]
pub struct Query {
    terms: TermSet,
    should_explain: bool,
}

impl Query {
    /// Parse a raw query string. `case_sensitive` applies query-wide to
    /// every textual term; per-term case control is a planned extension.
    pub fn parse(input: &str, case_sensitive: bool) -> Result<Self, MyError> {
        let mut pairs = search::query(input).map_err(MyError::MalformedQuery)?;
        for (_, term) in &mut pairs {
            term.case_sensitive = case_sensitive;
        }
        debug!("parsed {input:?} -> {pairs:?}");
        Ok(Self {
            terms: TermSet::from_pairs(pairs),
            should_explain: false,
        })
    }

    /// Toggle explain mode: when on, execution profiles are collected and
    /// prefixed to the results as synthetic report rows.
    pub fn explain(mut self, yes: bool) -> Self {
        self.should_explain = yes;
        self
    }

    /// Return the parsed term set.
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Return the single textual term comprising the query, or `None`
    /// when the query holds anything else.
    pub fn single_term(&self) -> Option<&str> {
        self.terms.single_text_term()
    }

    /// Render the retrieval plan this query would execute: the SQL text
    /// and its bound arguments, LIMIT and OFFSET excluded. Meant for
    /// debugging and tooling; [`results()`][Query::results] plans and
    /// executes in one go.
    pub fn plan(&self) -> (String, Vec<String>) {
        let plan = plan::synthesize(&self.terms);
        let args = plan.arguments().map(str::to_owned).collect();
        (plan.sql(), args)
    }

    /// Plan, execute and shape this query against the given store.
    ///
    /// Results are grouped per file and ordered by `(path, line number)`.
    /// File-only queries (only `path`/`ext` terms, or no terms at all)
    /// return bare file entries; anything line-based returns highlighted
    /// line fragments.
    pub async fn results(
        &self,
        store: &Store,
        opts: &SearchOptions<'_>,
    ) -> Result<ResultSet, MyError> {
        let plan = plan::synthesize(&self.terms);
        let args: Vec<&str> = plan.arguments().collect();

        let mut profiles = Vec::new();
        let rows = store
            .fetch_rows(
                &plan.sql(),
                &args,
                opts.limit,
                opts.offset,
                self.should_explain.then_some(&mut profiles),
            )
            .await?;

        let mut results = results::report_results(&profiles);
        if plan.has_lines {
            results.extend(results::shape_line_rows(&rows, opts.markup, opts.markdown)?);
        } else {
            results.extend(results::shape_file_rows(&rows)?);
        }
        Ok(ResultSet {
            results,
            bad_patterns: plan.rejected,
        })
    }

    /// Return a single search result that is an exact match for the
    /// query: a unique `(path within tree, line number)` target. `None`
    /// when the query is not a single bare term, or when no step of the
    /// lookup ladder finds exactly one candidate.
    pub async fn direct_result(&self, store: &Store) -> Result<Option<(String, u64)>, MyError> {
        match self.single_term() {
            Some(term) => direct::direct_result(store, term).await,
            None => Ok(None),
        }
    }

    /// Fetch every `(start, end)` extent the active filters match inside
    /// the given file, in registry order per filter and ascending within
    /// one. Useful for per-file views that highlight structural hits
    /// without rerunning the whole search.
    pub async fn file_extents(
        &self,
        store: &Store,
        file_id: i64,
    ) -> Result<Vec<(u32, u32)>, MyError> {
        let mut out = Vec::new();
        for f in registry() {
            out.extend(f.extents(store, &self.terms, file_id).await?);
        }
        Ok(out)
    }
}
