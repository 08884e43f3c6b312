//! Graphviz output.
//!
//! Only the drawable part of the graph is emitted: the root package in
//! light green, package-internal modules in light blue, and an edge from each
//! imported module to the module importing it.

use super::{ExportError, ExportResult, Exporter};
use crate::graph::DependencyGraph;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Graphviz executable used by [`render`].
pub const DOT_COMMAND: &str = "dot";

const ROOT_NODE_ATTRS: &str = "style = filled, fillcolor = lightgreen";
const MODULE_NODE_ATTRS: &str = "style = filled, fillcolor = lightblue";

/// DOT exporter implementation.
pub struct DotExporter;

/// Renders the package-internal graph as DOT source.
pub fn to_dot(graph: &DependencyGraph) -> String {
    let root = graph.root_name();

    // Unlabelled edges; `Dot` needs a printable edge weight.
    let drawn: DiGraph<String, &str> = graph
        .render_graph()
        .map(|_, name| name.clone(), |_, _| "");

    let edge_attrs = |_: &DiGraph<String, &str>, _: EdgeReference<'_, &str>| String::new();
    let node_attrs = |_: &DiGraph<String, &str>, (_, name): (NodeIndex, &String)| {
        if name.as_str() == root {
            ROOT_NODE_ATTRS.to_string()
        } else {
            MODULE_NODE_ATTRS.to_string()
        }
    };

    let dot = Dot::with_attr_getters(&drawn, &[Config::EdgeNoLabel], &edge_attrs, &node_attrs);

    format!("// The {} package\n{}", root, dot)
}

/// Writes DOT source to `dest` and lays it out to `<dest>.pdf` with Graphviz.
///
/// Returns the path of the PDF. The DOT file is left in place even when the
/// `dot` executable is missing or fails.
pub fn render(graph: &DependencyGraph, dest: &Path) -> ExportResult<PathBuf> {
    fs::write(dest, to_dot(graph))?;

    let pdf = pdf_path(dest);
    log::debug!("Running {} on {}", DOT_COMMAND, dest.display());

    let status = Command::new(DOT_COMMAND)
        .arg("-Tpdf")
        .arg("-o")
        .arg(&pdf)
        .arg(dest)
        .status()
        .map_err(|e| ExportError::Graphviz(format!("could not run '{}': {}", DOT_COMMAND, e)))?;

    if !status.success() {
        return Err(ExportError::Graphviz(format!(
            "'{}' exited with {}",
            DOT_COMMAND, status
        )));
    }

    Ok(pdf)
}

fn pdf_path(dest: &Path) -> PathBuf {
    let mut pdf = OsString::from(dest.as_os_str());
    pdf.push(".pdf");
    PathBuf::from(pdf)
}

impl Exporter for DotExporter {
    fn export<W: Write>(&self, graph: &DependencyGraph, writer: &mut W) -> ExportResult<()> {
        write!(writer, "{}", to_dot(graph))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ModulePath;
    use crate::graph::ModuleFilter;
    use tempfile::TempDir;

    fn create_test_graph() -> DependencyGraph {
        DependencyGraph::from_modules(
            "pkg",
            ModuleFilter::default(),
            vec![
                (
                    ModulePath::from("pkg.a"),
                    vec![ModulePath::from("pkg.b"), ModulePath::from("numpy")],
                ),
                (ModulePath::from("pkg.b"), vec![]),
            ],
        )
    }

    #[test]
    fn test_dot_contains_internal_modules() {
        let dot = to_dot(&create_test_graph());

        assert!(dot.starts_with("// The pkg package"));
        assert!(dot.contains("digraph"));
        assert!(dot.contains("pkg.a"));
        assert!(dot.contains("pkg.b"));
        assert!(dot.contains("->"));
    }

    #[test]
    fn test_dot_labels_are_plain_names() {
        let dot = to_dot(&create_test_graph());

        assert!(dot.contains("\"pkg.a\""));
        assert!(!dot.contains("\\\"pkg.a"));
        assert!(!dot.contains("label = \"\""));
    }

    #[test]
    fn test_dot_omits_external_modules() {
        let dot = to_dot(&create_test_graph());
        assert!(!dot.contains("numpy"));
    }

    #[test]
    fn test_dot_colors_root() {
        let dot = to_dot(&create_test_graph());
        assert_eq!(dot.matches("lightgreen").count(), 1);
        assert_eq!(dot.matches("lightblue").count(), 2);
    }

    #[test]
    fn test_dot_single_edge() {
        let dot = to_dot(&create_test_graph());
        assert_eq!(dot.matches("->").count(), 1);
    }

    #[test]
    fn test_pdf_path_appends_extension() {
        assert_eq!(
            pdf_path(Path::new("/tmp/out.gv")),
            PathBuf::from("/tmp/out.gv.pdf")
        );
    }

    #[test]
    fn test_render_writes_dot_source() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("pkg.gv");

        // Graphviz may not be installed; the DOT source is written either way.
        match render(&create_test_graph(), &dest) {
            Ok(pdf) => assert_eq!(pdf, dir.path().join("pkg.gv.pdf")),
            Err(e) => assert!(matches!(e, ExportError::Graphviz(_))),
        }

        let written = fs::read_to_string(&dest).unwrap();
        assert!(written.contains("pkg.a"));
    }
}
