//! Command implementations.
//!
//! - [`rules`] - print the configuration produced for one target
//! - [`check`] - configure both targets of a build and report problems
//! - [`explain`] - show which rules act on one import
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod check;
pub mod explain;
pub mod rules;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use explain::execute as explain_execute;
pub use rules::execute as rules_execute;
