// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The filter catalog: every user-visible query kind, what it contributes
//! to a retrieval plan, and how it fetches highlight extents.
//!
//! Four concrete shapes exist -- trigram text/regexp matching, simple
//! file-level predicates, structural code filters, and unions of
//! structural filters that answer one user-facing kind from several
//! relations. The catalog is a closed set: the grammar recognizes exactly
//! the names registered here, so an unknown kind cannot reach a filter.
//! Registration order matters for grammar generation and for deterministic
//! plan assembly, and the registry is immutable for the life of the
//! process.
//!

use crate::{
    MyError,
    store::Store,
    term::{Term, TermSet},
};
use serde::Serialize;
use std::sync::OnceLock;

/// Sentinel kind under which unadorned query words are collected.
pub(crate) const TEXT_KIND: &str = "text";

/// The trigram match predicate, shared by every text/regexp contribution.
const TRIGRAM_MATCH: &str = "trg_index.contents MATCH ?";

/// Escape `val` for use as an argument to the LIKE operator with `\` as
/// the escape character. Shell-style wildcards `?` and `*` become the SQL
/// ones `_` and `%`.
pub(crate) fn like_escape(val: &str) -> String {
    val.replace('\\', r"\\")
        .replace('_', r"\_")
        .replace('%', r"\%")
        .replace('?', "_")
        .replace('*', "%")
}

/// One entry of the filter menu exposed to rendering callers. The
/// description strings are HTML-safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// The user-facing filter name.
    pub name: &'static str,
    /// Short HTML description for the menu.
    pub description: &'static str,
}

/// What one filter adds to the retrieval plan for one (or, for grouped
/// negations, several) of its terms.
///
/// `cols` holds extent expressions in `(start, end)` pairs. Column
/// expressions may embed placeholders of their own; those bind before any
/// predicate placeholder because SQL binds positionally in text order,
/// which is why their arguments travel separately in `col_args`.
#[derive(Debug, Default)]
pub(crate) struct Contribution {
    pub(crate) cols: Vec<String>,
    pub(crate) col_args: Vec<String>,
    pub(crate) cond: String,
    pub(crate) args: Vec<String>,
}

/// Free text and regular expressions, answered by the trigram index.
///
/// Positive terms each bind one scheme-tagged search string against the
/// match predicate; negative terms are grouped into a single NOT EXISTS
/// over the same line id, using the non-extents schemes since no highlight
/// positions are wanted for absent text.
#[derive(Debug)]
pub(crate) struct TrigramTextFilter;

impl TrigramTextFilter {
    fn contribute(&self, terms: &TermSet, rejected: &mut Vec<MyError>) -> Vec<Contribution> {
        let mut out = Vec::new();
        let mut not_conds = Vec::new();
        let mut not_args = Vec::new();

        for term in terms.get(TEXT_KIND) {
            if term.arg.is_empty() {
                continue;
            }
            if term.negated {
                let scheme = if term.case_sensitive { "substr:" } else { "isubstr:" };
                not_conds.push(TRIGRAM_MATCH);
                not_args.push(format!("{scheme}{}", term.arg));
            } else {
                let scheme = if term.case_sensitive {
                    "substr-extents:"
                } else {
                    "isubstr-extents:"
                };
                out.push(Contribution {
                    cond: TRIGRAM_MATCH.to_owned(),
                    args: vec![format!("{scheme}{}", term.arg)],
                    ..Contribution::default()
                });
            }
        }

        // `re` predates `regexp` and is still accepted...
        for kind in ["re", "regexp"] {
            for term in terms.get(kind) {
                if term.arg.is_empty() {
                    continue;
                }
                // weed out patterns the trigram engine would choke on;
                // the term is dropped, the rest of the query still runs...
                if let Err(x) = regex::Regex::new(&term.arg) {
                    tracing::debug!("rejecting pattern {:?}: {x}", term.arg);
                    rejected.push(MyError::BadPattern {
                        pattern: term.arg.clone(),
                        reason: x.to_string(),
                    });
                    continue;
                }
                if term.negated {
                    not_conds.push(TRIGRAM_MATCH);
                    not_args.push(format!("regexp:{}", term.arg));
                } else {
                    out.push(Contribution {
                        cond: TRIGRAM_MATCH.to_owned(),
                        args: vec![format!("regexp-extents:{}", term.arg)],
                        ..Contribution::default()
                    });
                }
            }
        }

        if !not_conds.is_empty() {
            out.push(Contribution {
                cond: format!(
                    "NOT EXISTS (SELECT 1 FROM trg_index WHERE trg_index.id = lines.id AND ({}))",
                    not_conds.join(" OR ")
                ),
                args: not_args,
                ..Contribution::default()
            });
        }
        out
    }
}

/// File-level predicates that never join the line index.
#[derive(Debug)]
pub(crate) struct SimpleFilter {
    param: &'static str,
    description: &'static str,
    filter_sql: &'static str,
    neg_filter_sql: &'static str,
    formatter: fn(&str) -> String,
}

fn format_path(arg: &str) -> String {
    format!("%{}%", like_escape(arg))
}

fn format_ext(arg: &str) -> String {
    let arg = if arg.starts_with('.') {
        arg.to_owned()
    } else {
        format!(".{arg}")
    };
    format!("%{}", like_escape(&arg))
}

impl SimpleFilter {
    fn contribute(&self, terms: &TermSet) -> Vec<Contribution> {
        terms
            .get(self.param)
            .iter()
            .map(|term| Contribution {
                cond: if term.negated {
                    self.neg_filter_sql.to_owned()
                } else {
                    self.filter_sql.to_owned()
                },
                args: vec![(self.formatter)(&term.arg)],
                ..Contribution::default()
            })
            .collect()
    }
}

/// A structural code filter over one join graph of the store.
///
/// Everything is derived from a single flat parameterization: `from` names
/// the participating relations, `join` ties them together and correlates
/// on a `{file}` slot, and `ext_alias` is the relation whose
/// `extent_start`/`extent_end` columns carry the highlight positions. The
/// name match is `qual_col = ?` for qualified terms, otherwise
/// `like_col LIKE ? ESCAPE '\'` with a `%`-wrapped, LIKE-escaped argument.
#[derive(Debug)]
pub(crate) struct StructuralFilter {
    param: &'static str,
    description: &'static str,
    from: &'static str,
    join: &'static str,
    ext_alias: &'static str,
    like_col: &'static str,
    qual_col: &'static str,
}

impl StructuralFilter {
    #[allow(clippy::too_many_arguments)]
    fn new(
        param: &'static str,
        description: &'static str,
        from: &'static str,
        join: &'static str,
        ext_alias: &'static str,
        like_col: &'static str,
        qual_col: &'static str,
    ) -> Self {
        debug_assert!(join.contains("{file}"), "join must correlate on {{file}}");
        Self {
            param,
            description,
            from,
            join,
            ext_alias,
            like_col,
            qual_col,
        }
    }

    // name-match fragment + the argument that goes with it...
    fn match_expr(&self, term: &Term) -> (String, String) {
        if term.qualified {
            (format!("{} = ?", self.qual_col), term.arg.clone())
        } else {
            (
                format!(r"{} LIKE ? ESCAPE '\'", self.like_col),
                format!("%{}%", like_escape(&term.arg)),
            )
        }
    }

    fn contribute_term(&self, term: &Term) -> Contribution {
        let (match_expr, arg) = self.match_expr(term);
        let join = self.join.replace("{file}", "files.id");
        let body = format!("SELECT 1 FROM {} WHERE {match_expr} AND {join}", self.from);
        if term.negated {
            return Contribution {
                cond: format!("NOT EXISTS ({body})"),
                args: vec![arg],
                ..Contribution::default()
            };
        }
        // the first extent of the match rides the master query as a pair
        // of correlated scalar columns; the complete set is available
        // through `extents()`...
        let start = format!(
            "(SELECT {0}.extent_start FROM {1} WHERE {match_expr} AND {join} ORDER BY {0}.extent_start LIMIT 1)",
            self.ext_alias, self.from,
        );
        let end = format!(
            "(SELECT {0}.extent_end FROM {1} WHERE {match_expr} AND {join} ORDER BY {0}.extent_start LIMIT 1)",
            self.ext_alias, self.from,
        );
        Contribution {
            cols: vec![start, end],
            col_args: vec![arg.clone(), arg.clone()],
            cond: format!("EXISTS ({body})"),
            args: vec![arg],
        }
    }

    fn contribute(&self, terms: &TermSet) -> Vec<Contribution> {
        terms
            .get(self.param)
            .iter()
            .map(|t| self.contribute_term(t))
            .collect()
    }

    // `(start, end)` extent pairs of every positive match inside one file,
    // ordered by start offset. Null or zero sentinels are dropped.
    async fn extents(
        &self,
        store: &Store,
        terms: &TermSet,
        file_id: i64,
    ) -> Result<Vec<(u32, u32)>, MyError> {
        let mut out = Vec::new();
        for term in terms.get(self.param) {
            if term.negated {
                continue;
            }
            let (match_expr, arg) = self.match_expr(term);
            let join = self.join.replace("{file}", "?");
            let sql = format!(
                "SELECT {0}.extent_start, {0}.extent_end FROM {1} WHERE {match_expr} AND {join} ORDER BY {0}.extent_start",
                self.ext_alias, self.from,
            );
            out.extend(store.extent_rows(&sql, &arg, file_id).await?);
        }
        Ok(out)
    }
}

/// The union of several structural filters that share one user-facing
/// kind: their per-term predicates are OR-joined inside a single group,
/// for when you want OR instead of AND.
#[derive(Debug)]
pub(crate) struct UnionFilter {
    description: &'static str,
    branches: Vec<StructuralFilter>,
}

impl UnionFilter {
    fn new(description: &'static str, branches: Vec<StructuralFilter>) -> Self {
        debug_assert!(!branches.is_empty());
        debug_assert!(
            branches.iter().all(|b| b.param == branches[0].param),
            "all branches of a union must answer the same kind"
        );
        Self {
            description,
            branches,
        }
    }

    fn param(&self) -> &'static str {
        self.branches[0].param
    }

    fn contribute(&self, terms: &TermSet) -> Vec<Contribution> {
        terms
            .get(self.param())
            .iter()
            .map(|term| {
                let parts: Vec<Contribution> = self
                    .branches
                    .iter()
                    .map(|b| b.contribute_term(term))
                    .collect();
                let conds: Vec<&str> = parts.iter().map(|c| c.cond.as_str()).collect();
                let mut merged = Contribution {
                    cond: format!("({})", conds.join(" OR ")),
                    ..Contribution::default()
                };
                for part in parts {
                    merged.cols.extend(part.cols);
                    merged.col_args.extend(part.col_args);
                    merged.args.extend(part.args);
                }
                merged
            })
            .collect()
    }

    async fn extents(
        &self,
        store: &Store,
        terms: &TermSet,
        file_id: i64,
    ) -> Result<Vec<(u32, u32)>, MyError> {
        let mut out = Vec::new();
        for branch in &self.branches {
            out.extend(branch.extents(store, terms, file_id).await?);
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }
}

/// A catalog entry. Dispatch is explicit on the variant; no open extension
/// at runtime is needed since the grammar depends on the fixed registry.
#[derive(Debug)]
pub(crate) enum Filter {
    /// Trigram-backed text and regexp matching.
    Trigram(TrigramTextFilter),
    /// File-level predicate.
    Simple(SimpleFilter),
    /// One structural join graph.
    Structural(StructuralFilter),
    /// OR-union of structural filters sharing a kind.
    Union(UnionFilter),
}

impl Filter {
    /// The kind name(s) this filter claims in the grammar.
    pub(crate) fn names(&self) -> Vec<&'static str> {
        match self {
            Filter::Trigram(_) => vec![TEXT_KIND, "regexp", "re"],
            Filter::Simple(f) => vec![f.param],
            Filter::Structural(f) => vec![f.param],
            Filter::Union(f) => vec![f.param()],
        }
    }

    /// Whether matches are per-line (requiring the line join) or per-file.
    pub(crate) fn has_lines(&self) -> bool {
        !matches!(self, Filter::Simple(_))
    }

    /// Yield this filter's contributions for the given term set. Terms
    /// dropped for bad patterns are appended to `rejected`.
    pub(crate) fn contribute(
        &self,
        terms: &TermSet,
        rejected: &mut Vec<MyError>,
    ) -> Vec<Contribution> {
        match self {
            Filter::Trigram(f) => f.contribute(terms, rejected),
            Filter::Simple(f) => f.contribute(terms),
            Filter::Structural(f) => f.contribute(terms),
            Filter::Union(f) => f.contribute(terms),
        }
    }

    /// Fetch the `(start, end)` extents this filter's positive terms match
    /// inside the given file. Trigram and simple filters own no per-file
    /// extents and yield nothing.
    pub(crate) async fn extents(
        &self,
        store: &Store,
        terms: &TermSet,
        file_id: i64,
    ) -> Result<Vec<(u32, u32)>, MyError> {
        match self {
            Filter::Trigram(_) | Filter::Simple(_) => Ok(Vec::new()),
            Filter::Structural(f) => f.extents(store, terms, file_id).await,
            Filter::Union(f) => f.extents(store, terms, file_id).await,
        }
    }

    /// The item this filter contributes to the filter menu.
    pub(crate) fn menu_item(&self) -> MenuItem {
        match self {
            Filter::Trigram(_) => MenuItem {
                name: "regexp",
                description: r#"Regular expression. Examples: <code>regexp:(?i)\bs?printf</code> <code>regexp:"(three|3) mice"</code>"#,
            },
            Filter::Simple(f) => MenuItem {
                name: f.param,
                description: f.description,
            },
            Filter::Structural(f) => MenuItem {
                name: f.param,
                description: f.description,
            },
            Filter::Union(f) => MenuItem {
                name: f.param(),
                description: f.description,
            },
        }
    }
}

static REGISTRY: OnceLock<Vec<Filter>> = OnceLock::new();

/// The ordered, process-lifetime catalog of filters.
pub(crate) fn registry() -> &'static [Filter] {
    REGISTRY.get_or_init(build_registry)
}

/// `true` when `name` is a kind some registered filter claims. The grammar
/// consults this, which is what ties the filter alternation to the
/// registry.
pub(crate) fn is_registered(name: &str) -> bool {
    registry().iter().any(|f| f.names().contains(&name))
}

/// Return the `{name, description}` tuples the caller needs to render the
/// filter menu, in registration order.
pub fn filter_menu_items() -> Vec<MenuItem> {
    registry().iter().map(Filter::menu_item).collect()
}

#[rustfmt::skip]
fn build_registry() -> Vec<Filter> {
    vec![
        Filter::Simple(SimpleFilter {
            param: "path",
            description: "File or directory sub-path to search within. <code>*</code> and <code>?</code> act as shell wildcards.",
            filter_sql: r"files.path LIKE ? ESCAPE '\'",
            neg_filter_sql: r"files.path NOT LIKE ? ESCAPE '\'",
            formatter: format_path,
        }),
        Filter::Simple(SimpleFilter {
            param: "ext",
            description: "Filename extension: <code>ext:cpp</code>",
            filter_sql: r"files.path LIKE ? ESCAPE '\'",
            neg_filter_sql: r"files.path NOT LIKE ? ESCAPE '\'",
            formatter: format_ext,
        }),
        Filter::Trigram(TrigramTextFilter),
        Filter::Structural(StructuralFilter::new(
            "function",
            "Function or method definition: <code>function:foo</code>",
            "functions",
            "functions.file_id = {file}",
            "functions", "functions.name", "functions.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "function-ref",
            "Function or method references",
            "functions, function_refs AS refs",
            "functions.id = refs.refid AND refs.file_id = {file}",
            "refs", "functions.name", "functions.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "function-decl",
            "Function or method declaration",
            "functions, function_decldef AS decldef",
            "functions.id = decldef.defid AND decldef.file_id = {file}",
            "decldef", "functions.name", "functions.qualname",
        )),
        Filter::Union(UnionFilter::new(
            "Functions which call the given function or method: <code>callers:GetStringFromName</code>",
            vec![
                // direct calls...
                StructuralFilter::new(
                    "callers", "",
                    "functions AS caller, functions AS target, callers",
                    "callers.targetid = target.id AND callers.callerid = caller.id AND caller.file_id = {file}",
                    "caller", "target.name", "target.qualname",
                ),
                // indirect calls through the dispatch table...
                StructuralFilter::new(
                    "callers", "",
                    "functions AS caller, functions AS target, callers, targets",
                    "targets.funcid = target.id AND targets.targetid = callers.targetid AND callers.callerid = caller.id AND caller.file_id = {file}",
                    "caller", "target.name", "target.qualname",
                ),
            ],
        )),
        Filter::Union(UnionFilter::new(
            "Functions or methods which are called by the given one",
            vec![
                StructuralFilter::new(
                    "called-by", "",
                    "functions AS target, functions AS caller, callers",
                    "callers.callerid = caller.id AND callers.targetid = target.id AND target.file_id = {file}",
                    "target", "caller.name", "caller.qualname",
                ),
                StructuralFilter::new(
                    "called-by", "",
                    "functions AS target, functions AS caller, callers, targets",
                    "callers.callerid = caller.id AND targets.funcid = target.id AND targets.targetid = callers.targetid AND target.file_id = {file}",
                    "target", "caller.name", "caller.qualname",
                ),
            ],
        )),
        Filter::Union(UnionFilter::new(
            "Type or class definition: <code>type:Stack</code>",
            vec![
                StructuralFilter::new(
                    "type", "",
                    "types",
                    "types.file_id = {file}",
                    "types", "types.name", "types.qualname",
                ),
                StructuralFilter::new(
                    "type", "",
                    "typedefs",
                    "typedefs.file_id = {file}",
                    "typedefs", "typedefs.name", "typedefs.qualname",
                ),
            ],
        )),
        Filter::Union(UnionFilter::new(
            "Type or class references, uses, or instantiations",
            vec![
                StructuralFilter::new(
                    "type-ref", "",
                    "types, type_refs AS refs",
                    "types.id = refs.refid AND refs.file_id = {file}",
                    "refs", "types.name", "types.qualname",
                ),
                StructuralFilter::new(
                    "type-ref", "",
                    "typedefs, typedef_refs AS refs",
                    "typedefs.id = refs.refid AND refs.file_id = {file}",
                    "refs", "typedefs.name", "typedefs.qualname",
                ),
            ],
        )),
        Filter::Structural(StructuralFilter::new(
            "type-decl",
            "Type or class declaration",
            "types, type_decldef AS decldef",
            "types.id = decldef.defid AND decldef.file_id = {file}",
            "decldef", "types.name", "types.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "var",
            "Variable definition",
            "variables",
            "variables.file_id = {file}",
            "variables", "variables.name", "variables.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "var-ref",
            "Variable uses (lvalue, rvalue, dereference, etc.)",
            "variables, variable_refs AS refs",
            "variables.id = refs.refid AND refs.file_id = {file}",
            "refs", "variables.name", "variables.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "var-decl",
            "Variable declaration",
            "variables, variable_decldef AS decldef",
            "variables.id = decldef.defid AND decldef.file_id = {file}",
            "decldef", "variables.name", "variables.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "macro",
            "Macro definition",
            "macros",
            "macros.file_id = {file}",
            "macros", "macros.name", "macros.name",
        )),
        Filter::Structural(StructuralFilter::new(
            "macro-ref",
            "Macro uses",
            "macros, macro_refs AS refs",
            "macros.id = refs.refid AND refs.file_id = {file}",
            "refs", "macros.name", "macros.name",
        )),
        Filter::Structural(StructuralFilter::new(
            "namespace",
            "Namespace definition",
            "namespaces",
            "namespaces.file_id = {file}",
            "namespaces", "namespaces.name", "namespaces.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "namespace-ref",
            "Namespace references",
            "namespaces, namespace_refs AS refs",
            "namespaces.id = refs.refid AND refs.file_id = {file}",
            "refs", "namespaces.name", "namespaces.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "namespace-alias",
            "Namespace alias",
            "namespace_aliases",
            "namespace_aliases.file_id = {file}",
            "namespace_aliases", "namespace_aliases.name", "namespace_aliases.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "namespace-alias-ref",
            "Namespace alias references",
            "namespace_aliases, namespace_alias_refs AS refs",
            "namespace_aliases.id = refs.refid AND refs.file_id = {file}",
            "refs", "namespace_aliases.name", "namespace_aliases.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "bases",
            "Superclasses of a class: <code>bases:SomeSubclass</code>",
            "types AS base, impl, types",
            "impl.tbase = base.id AND impl.tderived = types.id AND base.file_id = {file}",
            "base", "types.name", "types.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "derived",
            "Subclasses of a class: <code>derived:SomeSuperclass</code>",
            "types AS sub, impl, types",
            "impl.tbase = types.id AND impl.tderived = sub.id AND sub.file_id = {file}",
            "sub", "types.name", "types.qualname",
        )),
        Filter::Union(UnionFilter::new(
            "Member variables, types, or methods of a class: <code>member:SomeClass</code>",
            vec![
                StructuralFilter::new(
                    "member", "",
                    "types AS type, functions AS mem",
                    "mem.scopeid = type.id AND mem.file_id = {file}",
                    "mem", "type.name", "type.qualname",
                ),
                StructuralFilter::new(
                    "member", "",
                    "types AS type, types AS mem",
                    "mem.scopeid = type.id AND mem.file_id = {file}",
                    "mem", "type.name", "type.qualname",
                ),
                StructuralFilter::new(
                    "member", "",
                    "types AS type, variables AS mem",
                    "mem.scopeid = type.id AND mem.file_id = {file}",
                    "mem", "type.name", "type.qualname",
                ),
            ],
        )),
        Filter::Structural(StructuralFilter::new(
            "overridden",
            "Methods which are overridden by the given one. Useful mostly with fully qualified methods, like <code>+overridden:Derived::foo()</code>.",
            "functions AS base, functions AS derived, targets",
            "base.id = -targets.targetid AND derived.id = targets.funcid AND base.id <> derived.id AND base.file_id = {file}",
            "base", "derived.name", "derived.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "overrides",
            "Methods which override the given one: <code>overrides:someMethod</code>",
            "functions AS base, functions AS derived, targets",
            "base.id = -targets.targetid AND derived.id = targets.funcid AND base.id <> derived.id AND derived.file_id = {file}",
            "derived", "base.name", "base.qualname",
        )),
        Filter::Structural(StructuralFilter::new(
            "warning",
            "Compiler warning messages",
            "warnings",
            "warnings.file_id = {file}",
            "warnings", "warnings.msg", "warnings.msg",
        )),
        Filter::Structural(StructuralFilter::new(
            "warning-opt",
            "More (less severe?) warning messages",
            "warnings",
            "warnings.file_id = {file}",
            "warnings", "warnings.opt", "warnings.opt",
        )),
    ]
}
