//! Errors raised while deriving module paths and resolving imports.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during import analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Syntax error in module '{module}' at line {line}, column {column}")]
    Syntax {
        module: String,
        line: usize,
        column: usize,
    },

    /// A relative import climbs above the top-level package.
    #[error("Invalid relative import from '{module}' at level {level} (base {base})")]
    InvalidRelativeImport {
        module: String,
        level: usize,
        base: String,
    },

    #[error("{} is not located under {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
