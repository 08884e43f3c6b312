//! JSON export implementation.
//!
//! Exports the import graph as an array of `{name, imports}` records, one per
//! importer. This is also the payload embedded in the HTML page.

use super::{ExportResult, Exporter};
use crate::graph::DependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;

/// JSON exporter implementation.
pub struct JsonExporter;

/// One importer and the modules it imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Dotted name of the importer
    pub name: String,
    /// Dotted names of the imported modules
    pub imports: Vec<String>,
}

/// Projects the graph's importer mapping into records, in mapping order.
pub fn records(graph: &DependencyGraph) -> Vec<ImportRecord> {
    graph
        .data()
        .iter()
        .map(|(importer, imports)| ImportRecord {
            name: importer.clone(),
            imports: imports.iter().cloned().collect(),
        })
        .collect()
}

/// Serializes the graph as a compact JSON array of records.
pub fn to_json(graph: &DependencyGraph) -> ExportResult<String> {
    Ok(serde_json::to_string(&records(graph))?)
}

/// Reads records back from JSON produced by [`to_json`].
pub fn records_from_json(json: &str) -> ExportResult<Vec<ImportRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Rebuilds the importer mapping from exported JSON.
pub fn data_from_json(json: &str) -> ExportResult<BTreeMap<String, BTreeSet<String>>> {
    let mut data: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in records_from_json(json)? {
        data.entry(record.name).or_default().extend(record.imports);
    }
    Ok(data)
}

/// Writes the JSON export to `path`.
pub fn write_json(graph: &DependencyGraph, path: &Path) -> ExportResult<()> {
    fs::write(path, to_json(graph)?)?;
    Ok(())
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, graph: &DependencyGraph, writer: &mut W) -> ExportResult<()> {
        let json = to_json(graph)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }
}
