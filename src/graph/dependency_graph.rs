//! Module import graph built from a Python package tree.
//!
//! The graph maps every importer (a module discovered under the package
//! root) to the set of modules it imports, after include/exclude filtering.
//! petgraph is used for cycle detection and for the drawable subset of the
//! graph handed to the renderer.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use walkdir::WalkDir;

use super::filter::{matches_any_prefix, ModuleFilter};
use crate::analysis::{is_source_file, AnalysisError, ImportResolver, ModulePath, PACKAGE_INIT_FILE};

/// Errors that can occur while building the graph.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} is not a Python package (missing __init__.py)", .0.display())]
    NotAPackage(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk package tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file could not be analyzed; the whole scan is abandoned.
    #[error("Failed to analyze {}", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        source: AnalysisError,
    },
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Checks that `root` is a Python package and returns its canonical path.
///
/// This is the caller's precondition for [`DependencyGraph::build`].
pub fn validate_package_root(root: &Path) -> GraphResult<PathBuf> {
    if !root.is_dir() {
        return Err(GraphError::NotADirectory(root.to_path_buf()));
    }
    if !root.join(PACKAGE_INIT_FILE).is_file() {
        return Err(GraphError::NotAPackage(root.to_path_buf()));
    }
    Ok(root.canonicalize()?)
}

/// A group of modules that import each other, directly or transitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// Dotted names of the modules in the cycle, sorted.
    pub modules: Vec<String>,
}

impl CycleInfo {
    /// Returns the number of modules in the cycle.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Display for CycleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.modules.join(", "))
    }
}

/// The import graph of a Python package.
///
/// `data` maps each importer's dotted name to the dotted names it imports;
/// `nodes` is the union of all importers and imported modules. Both are
/// post-filter and immutable once built.
///
/// # Example
///
/// ```rust
/// use betsy::analysis::ModulePath;
/// use betsy::graph::{DependencyGraph, ModuleFilter};
///
/// let modules = vec![
///     (ModulePath::from_dotted("pkg.a"), vec![ModulePath::from_dotted("pkg.b")]),
///     (ModulePath::from_dotted("pkg.b"), vec![ModulePath::from_dotted("os")]),
/// ];
///
/// let graph = DependencyGraph::from_modules("pkg", ModuleFilter::default(), modules);
///
/// assert_eq!(graph.importer_count(), 2);
/// assert_eq!(graph.node_count(), 3);
/// assert!(graph.nodes().contains("os"));
/// assert!(!graph.is_internal("os"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Name of the scanned package (last component of the root directory)
    root_name: String,
    /// Filter applied during construction
    filter: ModuleFilter,
    /// importer -> imported modules
    data: BTreeMap<String, BTreeSet<String>>,
    /// All importers and imported modules
    nodes: BTreeSet<String>,
}

impl DependencyGraph {
    /// Scans every `.py` file under `root` and builds the import graph.
    ///
    /// `root` is expected to have passed [`validate_package_root`]. The first
    /// file that fails to read, parse or resolve aborts the scan.
    pub fn build(root: &Path, filter: ModuleFilter) -> GraphResult<Self> {
        let root = root.canonicalize()?;
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut resolver = ImportResolver::new().map_err(|source| GraphError::Analysis {
            path: root.clone(),
            source,
        })?;

        let mut modules = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || !is_source_file(path) {
                continue;
            }

            log::debug!("Scanning {}", path.display());
            let resolved = resolver.resolve_file(path, &root).map_err(|source| {
                GraphError::Analysis {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            modules.push(resolved);
        }

        log::info!("Scanned {} source files under {}", modules.len(), root.display());

        let graph = Self::from_modules(root_name, filter, modules);

        log::info!(
            "Built import graph: {} importers, {} nodes, {} edges",
            graph.importer_count(),
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }

    /// Assembles a graph from already resolved `(importer, imports)` pairs.
    ///
    /// The filter is applied to each importer and, independently, to each of
    /// its imports. An importer that passes is kept even when none of its
    /// imports do. Importers that share a module path have their imports
    /// merged.
    pub fn from_modules<I, S>(root_name: impl Into<String>, filter: ModuleFilter, modules: I) -> Self
    where
        I: IntoIterator<Item = (ModulePath, S)>,
        S: IntoIterator<Item = ModulePath>,
    {
        let mut data: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (importer, imports) in modules {
            let importer = importer.to_string();
            if !filter.allows(&importer) {
                log::trace!("Filtered out importer {}", importer);
                continue;
            }

            let kept = imports
                .into_iter()
                .map(|path| path.to_string())
                .filter(|name| filter.allows(name));
            data.entry(importer).or_default().extend(kept);
        }

        let mut nodes = BTreeSet::new();
        for (importer, imports) in &data {
            nodes.insert(importer.clone());
            nodes.extend(imports.iter().cloned());
        }

        Self {
            root_name: root_name.into(),
            filter,
            data,
            nodes,
        }
    }

    /// Name of the scanned package.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The filter the graph was built with.
    pub fn filter(&self) -> &ModuleFilter {
        &self.filter
    }

    /// Importer -> imported modules.
    pub fn data(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.data
    }

    /// Every module appearing as importer or imported.
    pub fn nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    /// Gets the modules imported by `importer`, if it was scanned.
    pub fn imports_of(&self, importer: &str) -> Option<&BTreeSet<String>> {
        self.data.get(importer)
    }

    /// Gets the scanned modules that import `module`.
    pub fn importers_of(&self, module: &str) -> Vec<&str> {
        self.data
            .iter()
            .filter(|(_, imports)| imports.contains(module))
            .map(|(importer, _)| importer.as_str())
            .collect()
    }

    /// Returns the number of importer entries.
    pub fn importer_count(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of importer -> imported edges.
    pub fn edge_count(&self) -> usize {
        self.data.values().map(BTreeSet::len).sum()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks if a node exists in the graph.
    pub fn contains(&self, module: &str) -> bool {
        self.nodes.contains(module)
    }

    /// True if `module` is the scanned package or lives inside it.
    pub fn is_internal(&self, module: &str) -> bool {
        matches_any_prefix(module, [&self.root_name])
    }

    /// Detects groups of modules that import each other.
    ///
    /// Uses Tarjan's strongly connected components; a module importing
    /// itself is reported as a cycle of one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use betsy::analysis::ModulePath;
    /// use betsy::graph::{DependencyGraph, ModuleFilter};
    ///
    /// let modules = vec![
    ///     (ModulePath::from_dotted("pkg.a"), vec![ModulePath::from_dotted("pkg.b")]),
    ///     (ModulePath::from_dotted("pkg.b"), vec![ModulePath::from_dotted("pkg.a")]),
    /// ];
    /// let graph = DependencyGraph::from_modules("pkg", ModuleFilter::default(), modules);
    ///
    /// let cycles = graph.import_cycles();
    /// assert_eq!(cycles.len(), 1);
    /// assert_eq!(cycles[0].modules, vec!["pkg.a", "pkg.b"]);
    /// ```
    pub fn import_cycles(&self) -> Vec<CycleInfo> {
        let graph = self.module_graph();
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&graph) {
            let is_cycle = scc.len() > 1 || (scc.len() == 1 && graph.contains_edge(scc[0], scc[0]));
            if !is_cycle {
                continue;
            }

            let mut modules: Vec<String> = scc
                .iter()
                .filter_map(|&idx| graph.node_weight(idx))
                .cloned()
                .collect();
            modules.sort();
            cycles.push(CycleInfo { modules });
        }

        cycles.sort_by(|a, b| a.modules.cmp(&b.modules));
        cycles
    }

    /// The full graph as petgraph, with edges pointing importer -> imported.
    pub fn module_graph(&self) -> DiGraph<String, ()> {
        let mut graph = GraphAssembler::with_capacity(self.node_count(), self.edge_count());

        for node in &self.nodes {
            graph.node(node);
        }
        for (importer, imports) in &self.data {
            for imported in imports {
                graph.edge(importer, imported);
            }
        }

        graph.finish()
    }

    /// The drawable part of the graph.
    ///
    /// Contains the root package and every node inside its namespace, with
    /// edges pointing imported -> importer. Imports of modules outside the
    /// package stay in [`data`](Self::data) but are not drawn.
    pub fn render_graph(&self) -> DiGraph<String, ()> {
        let mut graph = GraphAssembler::with_capacity(self.node_count() + 1, self.edge_count());

        graph.node(&self.root_name);
        for node in self.nodes.iter().filter(|node| self.is_internal(node)) {
            graph.node(node);
        }

        for (importer, imports) in &self.data {
            for imported in imports.iter().filter(|imported| self.is_internal(imported)) {
                graph.edge(imported, importer);
            }
        }

        graph.finish()
    }
}

/// Builds a petgraph graph keyed by module name.
struct GraphAssembler {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
}

impl GraphAssembler {
    fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
        }
    }

    /// Return existing index if node already exists
    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }

        let idx = self.graph.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    fn edge(&mut self, from: &str, to: &str) {
        let from_idx = self.node(from);
        let to_idx = self.node(to);
        self.graph.update_edge(from_idx, to_idx, ());
    }

    fn finish(self) -> DiGraph<String, ()> {
        self.graph
    }
}
