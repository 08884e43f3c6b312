//! Source code analysis module for betsy.
//!
//! This module provides tools for analyzing Python source code to find the
//! modules each file depends on.
//!
//! # Features
//!
//! - Parse `import a.b` and `from a.b import c` statements, wherever they occur
//! - Resolve relative imports (`from ..core import x`) against the importer
//! - Derive a module's dotted path from its location in the package
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use betsy::analysis::ImportResolver;
//!
//! let mut resolver = ImportResolver::new()?;
//! let (module, imports) = resolver.resolve_file(Path::new("pkg/mod.py"), Path::new("pkg"))?;
//!
//! for import in imports {
//!     println!("{} -> {}", module, import);
//! }
//! ```

pub mod error;
pub mod imports;
pub mod module_path;

// Re-export main types for convenience
pub use error::{AnalysisError, AnalysisResult};
pub use imports::{is_source_file, resolve_imports, ImportResolver, ImportStatement};
pub use module_path::{ModulePath, PACKAGE_INIT_FILE};
