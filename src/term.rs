// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Parsed query terms and the per-query collection that groups them by
//! filter kind.
//!

use std::collections::HashMap;

/// The parsed atom of a query: one bare word, quoted phrase or
/// `kind:argument` pair, together with its prefix modifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Term {
    /// Textual payload, after quote stripping and escape resolution.
    pub arg: String,
    /// `true` when the term was prefixed with `-`.
    pub negated: bool,
    /// `true` when the term was prefixed with `+`. Only structural
    /// filters give this any meaning; the others treat it as `false`.
    pub qualified: bool,
    /// Copied from the query-wide flag. Per-term case control is a
    /// planned extension.
    pub case_sensitive: bool,
}

impl Term {
    /// Constructor for a plain positive term.
    pub fn plain<S: Into<String>>(arg: S) -> Self {
        Self {
            arg: arg.into(),
            ..Self::default()
        }
    }
}

/// All terms of one query, keyed by filter kind. Insertion order within a
/// kind follows source order in the query string. Free text lives under
/// the sentinel kind `text`.
#[derive(Debug, Default)]
pub struct TermSet(HashMap<String, Vec<Term>>);

impl TermSet {
    /// Group `(kind, term)` pairs, preserving source order within a kind.
    pub(crate) fn from_pairs(pairs: Vec<(String, Term)>) -> Self {
        let mut map: HashMap<String, Vec<Term>> = HashMap::new();
        for (kind, term) in pairs {
            map.entry(kind).or_default().push(term);
        }
        Self(map)
    }

    /// Return the terms of the given kind, in source order.
    pub fn get(&self, kind: &str) -> &[Term] {
        self.0.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct kinds present.
    pub fn num_kinds(&self) -> usize {
        self.0.len()
    }

    /// `true` when no term at all was parsed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the single textual term comprising the query: the set must
    /// hold exactly one kind, that kind must be `text`, and it must
    /// contain exactly one term. Anything else yields `None`.
    pub fn single_text_term(&self) -> Option<&str> {
        if self.0.len() != 1 {
            return None;
        }
        match self.0.get("text").map(Vec::as_slice) {
            Some([only]) => Some(&only.arg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_text_term() {
        let ts = TermSet::from_pairs(vec![("text".into(), Term::plain("foo"))]);
        assert_eq!(ts.single_text_term(), Some("foo"));
    }

    #[test]
    fn test_single_text_term_two_terms() {
        let ts = TermSet::from_pairs(vec![
            ("text".into(), Term::plain("foo")),
            ("text".into(), Term::plain("bar")),
        ]);
        assert_eq!(ts.single_text_term(), None);
    }

    #[test]
    fn test_single_text_term_mixed_kinds() {
        let ts = TermSet::from_pairs(vec![
            ("text".into(), Term::plain("foo")),
            ("path".into(), Term::plain("src")),
        ]);
        assert_eq!(ts.single_text_term(), None);
    }

    #[test]
    fn test_single_non_text_kind() {
        let ts = TermSet::from_pairs(vec![("function".into(), Term::plain("main"))]);
        assert_eq!(ts.single_text_term(), None);
    }

    #[test]
    fn test_source_order_within_kind() {
        let ts = TermSet::from_pairs(vec![
            ("text".into(), Term::plain("a")),
            ("text".into(), Term::plain("b")),
            ("text".into(), Term::plain("c")),
        ]);
        let args: Vec<_> = ts.get("text").iter().map(|t| t.arg.as_str()).collect();
        assert_eq!(args, ["a", "b", "c"]);
    }
}
