//! Export functionality for import graphs.
//!
//! This module provides exporters for writing a [`DependencyGraph`] out as
//! JSON records, as a self-contained HTML page, or as Graphviz DOT.

pub mod dot;
pub mod html;
pub mod json;

use crate::graph::DependencyGraph;
use std::io::{self, Write};
use thiserror::Error;

/// Errors that can occur while exporting or rendering a graph.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Graphviz `dot` executable is missing or failed.
    #[error("Graphviz rendering failed: {0}")]
    Graphviz(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Interactive HTML page (default)
    #[default]
    Html,
    /// JSON array of `{name, imports}` records
    Json,
    /// Graphviz DOT source of the package-internal graph
    Dot,
}

impl ExportFormat {
    /// File extension used for artifacts in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Dot => "gv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            "dot" | "gv" | "graphviz" => Ok(ExportFormat::Dot),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: html, json, dot",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Html => write!(f, "html"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Dot => write!(f, "dot"),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the graph to the given writer.
    fn export<W: Write>(&self, graph: &DependencyGraph, writer: &mut W) -> ExportResult<()>;
}

/// Export a graph in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    graph: &DependencyGraph,
    writer: &mut W,
) -> ExportResult<()> {
    match format {
        ExportFormat::Html => html::HtmlExporter.export(graph, writer),
        ExportFormat::Json => json::JsonExporter.export(graph, writer),
        ExportFormat::Dot => dot::DotExporter.export(graph, writer),
    }
}

/// Export a graph to a string.
pub fn export_to_string(format: ExportFormat, graph: &DependencyGraph) -> ExportResult<String> {
    let mut buffer = Vec::new();
    export(format, graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ModulePath;
    use crate::graph::ModuleFilter;

    fn sample_graph() -> DependencyGraph {
        DependencyGraph::from_modules(
            "pkg",
            ModuleFilter::default(),
            vec![
                (ModulePath::from("pkg.a"), vec![ModulePath::from("pkg.b")]),
                (ModulePath::from("pkg.b"), vec![]),
            ],
        )
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!("HTML".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("dot".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert_eq!("gv".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(format!("{}", ExportFormat::Html), "html");
        assert_eq!(format!("{}", ExportFormat::Json), "json");
        assert_eq!(format!("{}", ExportFormat::Dot), "dot");
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::default().extension(), "html");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::Dot.extension(), "gv");
    }

    #[test]
    fn test_export_to_string_each_format() {
        let graph = sample_graph();

        let json = export_to_string(ExportFormat::Json, &graph).unwrap();
        assert!(json.starts_with('['));

        let html = export_to_string(ExportFormat::Html, &graph).unwrap();
        assert!(html.contains("var diameter = 608"));

        let dot = export_to_string(ExportFormat::Dot, &graph).unwrap();
        assert!(dot.contains("digraph"));
    }
}
