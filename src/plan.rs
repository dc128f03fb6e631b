// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Synthesis of a single retrieval plan from the contributions of every
//! active filter.
//!
//! Two plan shapes exist: **file-only** plans touch the files relation
//! alone and return one row per matching file, while **line-joined** plans
//! join files to the line index and the trigram index and return one row
//! per matching line. The switch from the former to the latter happens at
//! the first contribution of a line-having filter and at most once, which
//! keeps the line columns at a fixed position right after the two base
//! columns. Extent columns contributed by filters always trail that prefix
//! so the result shaper can slice rows blindly.
//!

use crate::{MyError, filter, term::TermSet};

/// Number of leading columns in every plan (`files.path`, `files.icon`).
pub(crate) const BASE_FIELDS: usize = 2;

/// Number of columns a line-joined plan holds before any filter-contributed
/// extent pair (base fields + encoding, file id, line id, line number,
/// line text, base extents blob).
pub(crate) const LINE_FIELDS: usize = BASE_FIELDS + 6;

/// The synthesized retrieval: output columns, participating relations, a
/// conjunction of predicates, orderings and bound arguments, split into
/// column and predicate arguments so the bind order follows placeholder
/// order in the rendered SQL text.
#[derive(Debug, Default)]
pub(crate) struct Plan {
    pub(crate) fields: Vec<String>,
    pub(crate) tables: Vec<String>,
    pub(crate) conditions: Vec<String>,
    pub(crate) orderings: Vec<String>,
    pub(crate) col_args: Vec<String>,
    pub(crate) where_args: Vec<String>,
    pub(crate) has_lines: bool,
    /// Terms dropped from the plan, one error per term. The rest of the
    /// query still executes.
    pub(crate) rejected: Vec<MyError>,
}

impl Plan {
    /// Render the SQL text. The two trailing placeholders are LIMIT and
    /// OFFSET, bound by the executor after [`arguments`][Plan::arguments].
    pub(crate) fn sql(&self) -> String {
        let where_clause = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", self.conditions.join(" AND "))
        };
        format!(
            "SELECT {} FROM {} {}ORDER BY {} LIMIT ? OFFSET ?",
            self.fields.join(", "),
            self.tables.join(", "),
            where_clause,
            self.orderings.join(", "),
        )
    }

    /// The bound arguments in bind order: column arguments first, then
    /// predicate arguments, matching positional placeholder order in
    /// [`sql`][Plan::sql].
    pub(crate) fn arguments(&self) -> impl Iterator<Item = &str> {
        self.col_args
            .iter()
            .chain(self.where_args.iter())
            .map(String::as_str)
    }
}

/// Combine the contributions of every registered filter into one plan.
///
/// Assembly is deterministic by (filter registry order, term order within
/// kind). Duplicate contributions are not deduplicated; the store copes.
pub(crate) fn synthesize(terms: &TermSet) -> Plan {
    let mut plan = Plan {
        fields: vec!["files.path".to_owned(), "files.icon".to_owned()],
        tables: vec!["files".to_owned()],
        orderings: vec!["files.path".to_owned()],
        ..Plan::default()
    };

    // TODO: the walk visits every registered filter even when the term set
    // names only a couple of kinds; precompute the active subset if this
    // ever shows up in profiles.
    for f in filter::registry() {
        let contributions = f.contribute(terms, &mut plan.rejected);
        for c in contributions {
            if !plan.has_lines && f.has_lines() {
                plan.has_lines = true;
                // the first line-having contribution switches the shape;
                // line columns always land right after the base columns
                // since file-level filters contribute no fields...
                plan.fields.extend([
                    "files.encoding".to_owned(),
                    "files.id AS file_id".to_owned(),
                    "lines.id AS line_id".to_owned(),
                    "lines.number".to_owned(),
                    "trg_index.text".to_owned(),
                    "extents(trg_index.contents)".to_owned(),
                ]);
                plan.tables.extend(["lines".to_owned(), "trg_index".to_owned()]);
                plan.conditions.extend([
                    "files.id = lines.file_id".to_owned(),
                    "lines.id = trg_index.id".to_owned(),
                ]);
                plan.orderings.push("lines.number".to_owned());
            }
            plan.fields.extend(c.cols);
            plan.col_args.extend(c.col_args);
            plan.conditions.push(c.cond);
            plan.where_args.extend(c.args);
        }
    }
    plan
}
