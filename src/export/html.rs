//! HTML export.
//!
//! The page is a fixed edge-bundling template with two placeholders: the
//! JSON records and the layout diameter.

use super::{json, ExportResult, Exporter};
use crate::graph::DependencyGraph;
use std::io::Write;

/// The page template.
pub const TEMPLATE: &str = include_str!("../../assets/index.html");

const CLASSES_PLACEHOLDER: &str = "var classes = []";
const DIAMETER_PLACEHOLDER: &str = "var diameter = 800";

const BASE_DIAMETER: usize = 600;
const DIAMETER_PER_IMPORTER: usize = 4;

/// HTML exporter implementation.
pub struct HtmlExporter;

/// Layout diameter: grows with the number of importers.
pub fn diameter(graph: &DependencyGraph) -> usize {
    BASE_DIAMETER + DIAMETER_PER_IMPORTER * graph.importer_count()
}

/// Fills the template with the graph's JSON records and diameter.
pub fn render_page(graph: &DependencyGraph) -> ExportResult<String> {
    let classes = format!("var classes = {}", json::to_json(graph)?);
    let diameter = format!("var diameter = {}", diameter(graph));

    Ok(TEMPLATE
        .replace(CLASSES_PLACEHOLDER, &classes)
        .replace(DIAMETER_PLACEHOLDER, &diameter))
}

impl Exporter for HtmlExporter {
    fn export<W: Write>(&self, graph: &DependencyGraph, writer: &mut W) -> ExportResult<()> {
        writer.write_all(render_page(graph)?.as_bytes())?;
        Ok(())
    }
}
