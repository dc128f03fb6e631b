// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

//! Common artifacts for benchmarking.
//!

/// A spread of realistic queries: free text, quoted phrases, file
/// predicates, structural filters, unions and negations.
pub const QUERY_SAMPLES: [&str; 10] = [
    "open file",
    "\"three blind mice\" path:src",
    "function:main -path:test",
    "+type:std::vector",
    "callers:GetStringFromName",
    "member:nsDocShell -var:mContent",
    r#"regexp:"(three|3) mice" ext:cpp"#,
    "-regexp:TODO text warning:unused",
    "namespace-alias-ref:mozilla path:dom/workers ext:.h",
    "overridden:Derived::foo() bases:SomeSubclass derived:SomeSuperclass",
];
