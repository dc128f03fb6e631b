// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Group imports of many common traits and types by adding a glob import
//! for use by clients of this library.
//!

pub use super::error::*;
pub use super::extents::highlight_line;
pub use super::filter::{MenuItem, filter_menu_items};
pub use super::results::*;
pub use super::store::*;
pub use super::term::*;

pub use super::Query;
pub use super::SearchOptions;
