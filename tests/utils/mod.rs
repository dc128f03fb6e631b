// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

//! Test harness: an in-memory search index seeded with a miniature code
//! graph, enough to exercise file predicates, the structural extent
//! queries and the direct-result ladder without the trigram extension.
//!

use quarry::{Store, in_memory_pool_options};

// Schema mirrors what the build pipeline populates. Only the columns the
// query core touches are declared.
const SCHEMA: &[&str] = &[
    "CREATE TABLE files (id INTEGER PRIMARY KEY, path TEXT NOT NULL, icon TEXT, encoding TEXT)",
    "CREATE TABLE lines (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, number INTEGER NOT NULL)",
    "CREATE TABLE trg_index (id INTEGER PRIMARY KEY, contents TEXT, text TEXT)",
    "CREATE TABLE functions (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        qualname TEXT, file_line INTEGER, scopeid INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE function_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE function_decldef (defid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE callers (callerid INTEGER, targetid INTEGER)",
    "CREATE TABLE targets (funcid INTEGER, targetid INTEGER)",
    "CREATE TABLE types (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        qualname TEXT, file_line INTEGER, scopeid INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE typedefs (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        qualname TEXT, file_line INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE type_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE typedef_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE type_decldef (defid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE impl (tbase INTEGER, tderived INTEGER)",
    "CREATE TABLE variables (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        qualname TEXT, file_line INTEGER, scopeid INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE variable_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE variable_decldef (defid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE macros (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        file_line INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE macro_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE namespaces (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        qualname TEXT, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE namespace_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE namespace_aliases (id INTEGER PRIMARY KEY, file_id INTEGER NOT NULL, name TEXT,
        qualname TEXT, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE namespace_alias_refs (refid INTEGER, file_id INTEGER, extent_start INTEGER, extent_end INTEGER)",
    "CREATE TABLE warnings (file_id INTEGER, msg TEXT, opt TEXT, extent_start INTEGER, extent_end INTEGER)",
];

// A tree of five files: a main program, a Stack header w/ a derived type,
// a test file whose helper calls main, and two same-named headers to make
// single-term lookups ambiguous.
const SEED: &[&str] = &[
    "INSERT INTO files VALUES (1, 'src/main.cpp', 'page_cpp', 'utf-8')",
    "INSERT INTO files VALUES (2, 'src/util/stack.h', 'page_h', 'utf-8')",
    "INSERT INTO files VALUES (3, 'test/stack_test.cpp', 'page_cpp', 'utf-8')",
    "INSERT INTO files VALUES (4, 'src/a/util.h', 'page_h', 'utf-8')",
    "INSERT INTO files VALUES (5, 'src/b/util.h', 'page_h', 'utf-8')",
    "INSERT INTO functions VALUES (1, 1, 'main', 'main(int, char**)', 10, NULL, 120, 180)",
    "INSERT INTO functions VALUES (2, 2, 'push', 'Stack::push(int)', 12, 1, 200, 260)",
    "INSERT INTO functions VALUES (3, 3, 'helper', 'helper()', 5, NULL, 40, 80)",
    "INSERT INTO function_refs VALUES (1, 3, 300, 310)",
    "INSERT INTO callers VALUES (3, 1)",
    "INSERT INTO types VALUES (1, 2, 'Stack', 'Stack', 8, NULL, 90, 110)",
    "INSERT INTO types VALUES (2, 2, 'BigStack', 'BigStack', 20, NULL, 400, 440)",
    "INSERT INTO typedefs VALUES (1, 2, 'StackRef', 'StackRef', 9, 130, 150)",
    "INSERT INTO impl VALUES (1, 2)",
    "INSERT INTO variables VALUES (1, 1, 'count', 'main::count', 11, NULL, 140, 150)",
    "INSERT INTO warnings VALUES (1, 'unused variable', '-Wunused', 140, 150)",
];

/// Build the seeded in-memory store. One connection pinned for the life of
/// the pool, since every fresh in-memory connection is an empty database.
pub(crate) async fn seeded_store() -> Store {
    let (pool_opts, opts) = in_memory_pool_options();
    let pool = pool_opts
        .connect_with(opts)
        .await
        .expect("in-memory pool must open");
    for stmt in SCHEMA.iter().chain(SEED) {
        sqlx::query(*stmt).execute(&pool).await.expect("fixture sql");
    }
    Store::from_pool(pool)
}

/// Paths of every seeded file, in path order.
pub(crate) const ALL_PATHS: [&str; 5] = [
    "src/a/util.h",
    "src/b/util.h",
    "src/main.cpp",
    "src/util/stack.h",
    "test/stack_test.cpp",
];
