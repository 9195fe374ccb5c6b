//! Semantic checks applied while the tree is built.
//!
//! - `ops`: operator typing, implicit conversions, lvalues, constants
//! - `intrinsic`: intrinsic signatures and texture arguments
//! - `entry`: stage entry signatures and system-value placement
//! - `calls`: recursion and undefined-function checks after parsing

pub(crate) mod calls;
mod entry;
mod intrinsic;
mod ops;
