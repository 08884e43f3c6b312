//! Graph module for module import relationships.
//!
//! This module provides the [`DependencyGraph`] struct, which scans a Python
//! package and records which modules import which, and the [`ModuleFilter`]
//! used to narrow it down to the modules of interest.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use betsy::graph::{validate_package_root, DependencyGraph, ModuleFilter};
//!
//! let root = validate_package_root(Path::new("src/pkg"))?;
//! let filter = ModuleFilter::default().with_exclude(["pkg.tests"]);
//! let graph = DependencyGraph::build(&root, filter)?;
//!
//! for (importer, imports) in graph.data() {
//!     println!("{} imports {} modules", importer, imports.len());
//! }
//! ```

mod dependency_graph;
pub mod filter;

pub use dependency_graph::{
    validate_package_root, CycleInfo, DependencyGraph, GraphError, GraphResult,
};
pub use filter::{matches_any_prefix, parse_prefix_list, ModuleFilter};
