//! Semantic validation phases, in the order the compiler runs them.
//!
//! Each phase appends to a shared diagnostics list; only schema checks can
//! abort with a [`crate::error::StructuralError`].

pub mod aliases;
pub mod branches;
pub mod branchspecs;
pub mod flow;
pub mod schema;

pub use aliases::resolve_aliases;
pub use branches::{build_branch_table, check_streams, BranchEntry, BranchTable, PendingStream};
pub use branchspecs::validate_branchspecs;
pub use flow::validate_flows;
pub use schema::{normalize_common_options, normalize_day, validate_edges, validate_nodes};
