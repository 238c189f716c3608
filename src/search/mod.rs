//! Search layer facade.
//!
//! - **[`query`]**: Type-prefix parsing and substring filtering over collected items.

pub mod query;
