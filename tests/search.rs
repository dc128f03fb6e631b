// SPDX-License-Identifier: Apache-2.0

//! End-to-end searches against the seeded in-memory index: file-level
//! predicates, execution profiling, bad-pattern reporting and the per-file
//! structural extent queries. Line-joined execution needs the trigram
//! extension and is covered at the plan level instead.
//!

mod utils;

use quarry::{MyError, Query, SearchOptions};
use std::error::Error;
use tracing_test::traced_test;
use utils::{ALL_PATHS, seeded_store};

#[tokio::test]
async fn test_empty_query_lists_files() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("", false)?;
    let hits = q.results(&store, &SearchOptions::default()).await?;
    let paths: Vec<&str> = hits.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ALL_PATHS);
    // file-only results carry no line fragments...
    assert!(hits.results.iter().all(|r| r.lines.is_empty()));
    assert_eq!(hits.results[2].icon, "page_cpp");
    Ok(())
}

#[tokio::test]
async fn test_path_filter() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("path:util", false)?;
    let hits = q.results(&store, &SearchOptions::default()).await?;
    let paths: Vec<&str> = hits.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["src/a/util.h", "src/b/util.h", "src/util/stack.h"]);
    Ok(())
}

#[tokio::test]
async fn test_negated_path_filter() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("-path:util", false)?;
    let hits = q.results(&store, &SearchOptions::default()).await?;
    let paths: Vec<&str> = hits.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["src/main.cpp", "test/stack_test.cpp"]);
    Ok(())
}

#[tokio::test]
async fn test_path_wildcards() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    // shell-style wildcards translate to LIKE ones...
    let q = Query::parse("path:util/*.h", false)?;
    let hits = q.results(&store, &SearchOptions::default()).await?;
    let paths: Vec<&str> = hits.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["src/util/stack.h"]);
    Ok(())
}

#[tokio::test]
async fn test_ext_filter_dot_insensitive() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    for input in ["ext:cpp", "ext:.cpp"] {
        let q = Query::parse(input, false)?;
        let hits = q.results(&store, &SearchOptions::default()).await?;
        let paths: Vec<&str> = hits.results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["src/main.cpp", "test/stack_test.cpp"], "for {input}");
    }
    Ok(())
}

#[tokio::test]
async fn test_limit_and_offset() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("", false)?;
    let opts = SearchOptions {
        offset: 1,
        limit: 2,
        ..SearchOptions::default()
    };
    let hits = q.results(&store, &opts).await?;
    let paths: Vec<&str> = hits.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, &ALL_PATHS[1..3]);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_explain_prefixes_reports() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("path:util", false)?.explain(true);
    let hits = q.results(&store, &SearchOptions::default()).await?;
    // one statement -> three report rows, then the hits...
    assert!(hits.results.len() == 3 + 3);
    assert!(hits.results[0].path.starts_with("sql 0 (3 row(s);"));
    assert_eq!(hits.results[1].path, "parameters 0");
    assert_eq!(hits.results[2].path, "explanation 0");
    assert!(!hits.results[2].lines.is_empty());
    assert_eq!(hits.results[3].path, "src/a/util.h");
    Ok(())
}

#[tokio::test]
async fn test_bad_pattern_reported_not_fatal() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("regexp:(unclosed path:util", false)?;
    let hits = q.results(&store, &SearchOptions::default()).await?;
    assert_eq!(hits.bad_patterns.len(), 1);
    assert!(matches!(hits.bad_patterns[0], MyError::BadPattern { .. }));
    // the path term still ran...
    assert_eq!(hits.results.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_function_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("function:push", false)?;
    assert_eq!(q.file_extents(&store, 2).await?, [(200, 260)]);
    // no match in the main file...
    assert!(q.file_extents(&store, 1).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_type_union_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    // 'Stack' matches the type, the typedef and the derived type; the
    // union reports all three sources sorted by start offset...
    let q = Query::parse("type:Stack", false)?;
    assert_eq!(
        q.file_extents(&store, 2).await?,
        [(90, 110), (130, 150), (400, 440)]
    );
    Ok(())
}

#[tokio::test]
async fn test_qualified_type_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    // qualified matching is exact, so the derived type drops out...
    let q = Query::parse("+type:Stack", false)?;
    assert_eq!(q.file_extents(&store, 2).await?, [(90, 110)]);
    Ok(())
}

#[tokio::test]
async fn test_function_ref_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("function-ref:main", false)?;
    assert_eq!(q.file_extents(&store, 3).await?, [(300, 310)]);
    Ok(())
}

#[tokio::test]
async fn test_callers_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    // helper() in the test file calls main directly...
    let q = Query::parse("callers:main", false)?;
    assert_eq!(q.file_extents(&store, 3).await?, [(40, 80)]);
    Ok(())
}

#[tokio::test]
async fn test_bases_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("bases:BigStack", false)?;
    assert_eq!(q.file_extents(&store, 2).await?, [(90, 110)]);
    Ok(())
}

#[tokio::test]
async fn test_warning_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("warning:unused", false)?;
    assert_eq!(q.file_extents(&store, 1).await?, [(140, 150)]);

    let q = Query::parse("warning-opt:Wunused", false)?;
    assert_eq!(q.file_extents(&store, 1).await?, [(140, 150)]);
    Ok(())
}

#[tokio::test]
async fn test_negated_terms_own_no_extents() -> Result<(), Box<dyn Error>> {
    let store = seeded_store().await;
    let q = Query::parse("-function:push", false)?;
    assert!(q.file_extents(&store, 2).await?.is_empty());
    Ok(())
}
