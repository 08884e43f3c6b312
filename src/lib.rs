//! Betsy - import graph explorer for Python packages
//!
//! This crate scans the source files of one Python package, resolves their
//! absolute and relative imports into dotted module names, and builds a
//! filtered import graph that can be exported as JSON, an HTML page or
//! Graphviz DOT.

pub mod analysis;
pub mod export;
pub mod graph;
