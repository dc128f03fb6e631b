// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Errors raised from this library.
//!

use peg::{error::ParseError, str::LineCol};
use std::borrow::Cow;
use thiserror::Error;

/// Variants of error raised from this library.
#[derive(Debug, Error)]
pub enum MyError {
    /// Input/output error.
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),

    /// The query grammar did not accept the input.
    #[error("Malformed query: {0}")]
    MalformedQuery(ParseError<LineCol>),

    /// A regexp term was accepted by the grammar but rejected before it
    /// reached the trigram engine. Reported per-term; the rest of the
    /// query still executes.
    #[error("Bad pattern '{pattern}': {reason}")]
    BadPattern {
        /// The offending pattern, as the user typed it.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The relational store failed (timeout, I/O, integrity).
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// A line's bytes cannot be decoded with its declared encoding.
    #[error("Cannot decode line as '{0}'")]
    Encoding(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(Cow<'static, str>),
}
