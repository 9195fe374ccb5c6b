//! Grammar productions.
//!
//! - `item`: top-level declarations and stage entries
//! - `stmt`: statements
//! - `expr`: the precedence chain, postfix chaining and primaries
//! - `ty`: type names and array suffixes

mod expr;
mod item;
mod stmt;
mod ty;
