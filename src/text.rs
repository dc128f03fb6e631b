// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! PEG parser rules and actions for the user-facing query language.
//!
//! Being a PEG parser means the following limits/constraints/directives
//! should be observed when writing and ordering rules...
//!
//! * From the [pest book](https://pest.rs/book/grammars/peg.html) (even though
//!   i'm not using the `pest` crate): **_In general, when writing a
//!   parser with choices, put the longest or most specific choice first, and
//!   the shortest or most general choice last._**
//! * PEGs do not backtrack into a successfully matched prefix. Filter names
//!   are therefore tokenized with maximal munch (`[a-z-]+`) and then checked
//!   against the registry, instead of spelling out an alternation of names.
//!   That way `warning-opt` can never lose its tail to `warning`, and an
//!   unregistered name like `std:` falls through to free text.
//!
//! Quoted strings survive unbalanced closers: a quote terminates only at
//! quote+space, quote+EOF or plain EOF, so a query still parses while the
//! user is mid-typing. Backslash-escaped quotes become literal quotes in
//! the argument.
//!

use crate::{filter, term::Term};

peg::parser! {
    pub(crate) grammar search() for str {
        rule _ = quiet! { [' ' | '\t']* }

        // ignore leading whitespace, require full consumption...
        pub rule query() -> Vec<(String, Term)> = _ ts:term()* ![_] { ts }

        rule term() -> (String, Term)
        = t:not_term()      { t }
        / t:positive_term() { t }

        rule not_term() -> (String, Term) = "-" t:positive_term() {
            let (kind, mut term) = t;
            term.negated = true;
            (kind, term)
        }

        rule positive_term() -> (String, Term)
        = t:filtered_term() { t }
        / t:free_text()     { t }

        // a plus parses in front of any filter but only the structural
        // ones give the resulting bit a meaning...
        rule filtered_term() -> (String, Term)
        = plus:"+"? name:filter_name() ":" arg:text() {
            (
                name.to_owned(),
                Term {
                    arg,
                    qualified: plus.is_some(),
                    ..Term::default()
                },
            )
        }

        rule filter_name() -> &'input str
        = s:$(['a'..='z' | '-']+)
        {? if filter::is_registered(s) { Ok(s) } else { Err("registered filter name") } }

        rule free_text() -> (String, Term) = arg:text() {
            ("text".to_owned(), Term { arg, ..Term::default() })
        }

        rule text() -> String
        = s:(double_quoted() / single_quoted() / bare()) _ { s }

        // unquoted text until a space or EOL, never empty...
        rule bare() -> String = s:$([^ ' ']+) { s.to_owned() }

        rule double_quoted() -> String
        = "\"" cs:dq_char()* dq_close() { cs.into_iter().collect() }

        rule dq_char() -> char
        = "\\\""          { '"' }
        / "\\"            { '\\' }
        / "\"" !" " &[_]  { '"' }  // a closer only counts before a space or EOF
        / !"\"" c:[_]     { c }

        rule dq_close() = "\"" &" " / "\"" ![_] / ![_]

        rule single_quoted() -> String
        = "'" cs:sq_char()* sq_close() { cs.into_iter().collect() }

        rule sq_char() -> char
        = "\\'"          { '\'' }
        / "\\"           { '\\' }
        / "'" !" " &[_]  { '\'' }
        / !"'" c:[_]     { c }

        rule sq_close() = "'" &" " / "'" ![_] / ![_]
    }
}
