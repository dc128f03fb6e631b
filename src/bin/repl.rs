// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! A quick + dirty little REPL (Read + Eval + Print Loop) command line tool
//! to inspect how a search query parses and what SQL it plans.
//!
//! Every input line is parsed as a query; the parsed term set, the
//! synthesized SQL and its bound arguments are printed back. When a
//! `DATABASE_URL` environment variable (or `.env` entry) points at a
//! search index, the query is also executed and the grouped results are
//! printed. Enter `:menu` to dump the filter menu as JSON.
//!
//! To start the loop enter...
//! ```bash
//! cargo run --bin repl↵
//! ```
//! To exit the program, press `Ctrl-D`.
//!

use quarry::{MyError, Query, SearchOptions, Store, filter_menu_items};
use std::io::{self, Write};

#[doc(hidden)]
const RED: &str = "\x1b[31m";
#[doc(hidden)]
const GREEN: &str = "\x1b[32m";
#[doc(hidden)]
const YELLOW: &str = "\x1b[33m";
#[doc(hidden)]
const RESET: &str = "\x1b[0m";
#[doc(hidden)]
const MENU: &str = ":menu";

macro_rules! error {
    ( $( $arg: tt )* ) => {
        {
            let msg = ::std::fmt::format(::core::format_args!($($arg)*));
            eprintln!("{RED}{msg}{RESET}");
        }
    }
}

macro_rules! info {
    ( $( $arg: tt )* ) => {
        {
            let msg = ::std::fmt::format(::core::format_args!($($arg)*));
            println!("{YELLOW}{msg}{RESET}");
        }
    }
}

macro_rules! note {
    ( $( $arg: tt )* ) => {
        {
            let msg = ::std::fmt::format(::core::format_args!($($arg)*));
            println!("{GREEN}{msg}{RESET}");
        }
    }
}

#[doc(hidden)]
fn prompt(s: &str) -> Result<(), MyError> {
    print!("{GREEN}{s} {RESET}");
    io::stdout().flush().map_err(MyError::IO)
}

async fn show(query: &Query, store: Option<&Store>) -> Result<(), MyError> {
    let (sql, args) = query.plan();
    info!("sql:  {sql}");
    info!("args: {args:?}");

    let Some(store) = store else {
        return Ok(());
    };
    let hits = query.results(store, &SearchOptions::default()).await?;
    for bad in &hits.bad_patterns {
        error!("{bad}");
    }
    for result in &hits.results {
        note!("{} {}", result.icon, result.path);
        for (number, line) in &result.lines {
            println!("{number:>6}  {line}");
        }
    }
    Ok(())
}

/// Executable main method.
///
/// Invoke it like so...
/// ```bash
/// cargo run --bin repl↵
/// ```
#[tokio::main]
async fn main() -> Result<(), MyError> {
    let store = match dotenvy::var("DATABASE_URL") {
        Ok(url) => {
            note!("Using search index at {url}");
            Some(Store::connect(&url).await?)
        }
        Err(_) => {
            info!("No DATABASE_URL; planning only.");
            None
        }
    };

    note!("Enter a search query to inspect, or :menu.\nWhen done, hit Ctrl-D.");
    let stdin = io::stdin();
    loop {
        prompt("> ")?;
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => {
                note!("\nSee you later...");
                break;
            }

            Ok(_) => {
                let input = line.trim_end_matches(['\r', '\n']);
                if input == MENU {
                    let json = serde_json::to_string_pretty(&filter_menu_items())
                        .expect("menu always serializes");
                    println!("{json}");
                    continue;
                }

                match Query::parse(input, false) {
                    Ok(q) => {
                        if let Err(x) = show(&q, store.as_ref()).await {
                            error!("Failed: {x}");
                        }
                    }
                    Err(x) => error!("Failed parse: {x}"),
                }
            }
            Err(x) => {
                error!("Failed Read: {}", x);
                break;
            }
        }
    }

    Ok(())
}
