//! Import resolution using tree-sitter for Python.
//!
//! This module parses Python source files and turns every `import` and
//! `from ... import` statement into the [`ModulePath`] of the module it
//! depends on. Relative imports are resolved against the module path of the
//! importing file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tree_sitter::{Node, Parser, TreeCursor};

use super::error::{AnalysisError, AnalysisResult};
use super::module_path::ModulePath;

/// Extension of the source files considered by the resolver.
pub const SOURCE_EXTENSION: &str = "py";

/// Returns true if `path` names a Python source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// A single import statement, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatement {
    /// `import a.b, c as d`: one target per comma-separated name.
    Plain(Vec<ModulePath>),
    /// `from ..module import x, y` or `from module import *`
    From {
        /// Number of leading dots (0 for absolute imports).
        level: usize,
        /// The dotted module part, possibly empty for `from . import x`.
        module: ModulePath,
        /// The imported names, aliases stripped.
        names: Vec<String>,
        /// Whether this is a `*` import.
        wildcard: bool,
    },
}

impl ImportStatement {
    /// Builds a statement from a tree-sitter node, if the node is an import.
    pub fn from_node(node: &Node, source: &str) -> Option<Self> {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                let modules = node
                    .children_by_field_name("name", &mut cursor)
                    .filter_map(|name| imported_target(&name, source))
                    .collect();
                Some(ImportStatement::Plain(modules))
            }
            "import_from_statement" => {
                let module_node = node.child_by_field_name("module_name")?;
                let (level, module) = match module_node.kind() {
                    "relative_import" => parse_relative_import(&module_node, source),
                    _ => (0, dotted_name(&module_node, source)),
                };
                let (names, wildcard) = imported_names(node, source);
                Some(ImportStatement::From {
                    level,
                    module,
                    names,
                    wildcard,
                })
            }
            "future_import_statement" => {
                let (names, wildcard) = imported_names(node, source);
                Some(ImportStatement::From {
                    level: 0,
                    module: ModulePath::new(["__future__"]),
                    names,
                    wildcard,
                })
            }
            _ => None,
        }
    }

    /// Resolves the statement into the module paths it depends on.
    ///
    /// `base` is the module path of the importing file. Relative imports
    /// strip `level` trailing segments from it; climbing past the top of
    /// `base` is an [`AnalysisError::InvalidRelativeImport`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use betsy::analysis::{ImportStatement, ModulePath};
    ///
    /// let statement = ImportStatement::From {
    ///     level: 1,
    ///     module: ModulePath::from_dotted("utils"),
    ///     names: vec!["helper".to_string()],
    ///     wildcard: false,
    /// };
    /// let base = ModulePath::from_dotted("pkg.sub.mod");
    /// let targets = statement.resolve(&base).unwrap();
    /// assert_eq!(targets, vec![ModulePath::from_dotted("pkg.sub.utils")]);
    /// ```
    pub fn resolve(&self, base: &ModulePath) -> AnalysisResult<Vec<ModulePath>> {
        match self {
            ImportStatement::Plain(modules) => Ok(modules.clone()),
            ImportStatement::From { level: 0, module, .. } => Ok(vec![module.clone()]),
            ImportStatement::From {
                level,
                module,
                names,
                wildcard,
            } => {
                let anchor = base
                    .ancestor(*level)
                    .ok_or_else(|| AnalysisError::InvalidRelativeImport {
                        module: module.to_string(),
                        level: *level,
                        base: base.to_string(),
                    })?;

                // `from . import x` names sibling modules of the importer
                if module.is_empty() && !*wildcard && !names.is_empty() {
                    return Ok(names
                        .iter()
                        .map(|name| anchor.join(&ModulePath::from_dotted(name)))
                        .collect());
                }

                Ok(vec![anchor.join(module)])
            }
        }
    }
}

/// Resolver for extracting module dependencies from Python source files.
pub struct ImportResolver {
    parser: Parser,
}

impl ImportResolver {
    /// Create a new ImportResolver.
    pub fn new() -> AnalysisResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|_| AnalysisError::LanguageInit)?;

        Ok(Self { parser })
    }

    /// Resolve the imports of a file inside the package rooted at `root`.
    ///
    /// Returns the file's own module path together with its dependencies.
    pub fn resolve_file(
        &mut self,
        path: &Path,
        root: &Path,
    ) -> AnalysisResult<(ModulePath, HashSet<ModulePath>)> {
        let module = ModulePath::from_file(path, root)?;
        let source = fs::read_to_string(path)?;
        let imports = self.resolve_source(&source, &module)?;
        Ok((module, imports))
    }

    /// Resolve the imports of source code whose module path is `base`.
    pub fn resolve_source(
        &mut self,
        source: &str,
        base: &ModulePath,
    ) -> AnalysisResult<HashSet<ModulePath>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| syntax_error(base, None))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(base, first_error(root)));
        }

        let mut imports = HashSet::new();
        let mut cursor = root.walk();
        visit_node(&mut cursor, source, base, &mut imports)?;

        Ok(imports)
    }
}

/// Resolve the imports of a single source string.
pub fn resolve_imports(source: &str, base: &ModulePath) -> AnalysisResult<HashSet<ModulePath>> {
    let mut resolver = ImportResolver::new()?;
    resolver.resolve_source(source, base)
}

/// Recursively visit nodes to find import statements.
fn visit_node(
    cursor: &mut TreeCursor,
    source: &str,
    base: &ModulePath,
    imports: &mut HashSet<ModulePath>,
) -> AnalysisResult<()> {
    let node = cursor.node();

    if is_legacy_syntax(&node, source) {
        return Err(syntax_error(base, Some(node)));
    }

    if let Some(statement) = ImportStatement::from_node(&node, source) {
        imports.extend(statement.resolve(base)?);
        return Ok(());
    }

    if cursor.goto_first_child() {
        loop {
            visit_node(cursor, source, base, imports)?;
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    Ok(())
}

/// Python 2 constructs that the grammar still parses without errors.
fn is_legacy_syntax(node: &Node, source: &str) -> bool {
    match node.kind() {
        "print_statement" | "exec_statement" | "<>" => true,
        // `except ValueError, e:`
        "except_clause" => {
            let mut cursor = node.walk();
            let has_comma = node
                .children(&mut cursor)
                .take_while(|child| child.kind() != ":")
                .any(|child| child.kind() == ",");
            has_comma
        }
        // long literals such as `10L`
        "integer" => node_text(node, source).is_some_and(|text| text.ends_with(['l', 'L'])),
        _ => false,
    }
}

fn syntax_error(base: &ModulePath, node: Option<Node<'_>>) -> AnalysisError {
    let (row, column) = node
        .map(|n| (n.start_position().row, n.start_position().column))
        .unwrap_or((0, 0));
    AnalysisError::Syntax {
        module: base.to_string(),
        line: row + 1,
        column: column + 1,
    }
}

/// Find the first error or missing node below `node`.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }

    None
}

/// Parse `..module` into its level and module part.
fn parse_relative_import(node: &Node, source: &str) -> (usize, ModulePath) {
    let mut level = 0;
    let mut module = ModulePath::default();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_prefix" => {
                level = node_text(&child, source)
                    .map(|text| text.matches('.').count())
                    .unwrap_or(0);
            }
            "dotted_name" => module = dotted_name(&child, source),
            _ => {}
        }
    }

    (level, module)
}

/// The names listed after `import` in a from-import.
fn imported_names(node: &Node, source: &str) -> (Vec<String>, bool) {
    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|name| imported_target(&name, source))
        .map(|path| path.to_string())
        .collect();

    let mut cursor = node.walk();
    let wildcard = node
        .children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import");

    (names, wildcard)
}

/// The dotted target of `a.b` or `a.b as c`.
fn imported_target(node: &Node, source: &str) -> Option<ModulePath> {
    match node.kind() {
        "dotted_name" => Some(dotted_name(node, source)),
        "aliased_import" => {
            let name = node.child_by_field_name("name")?;
            Some(dotted_name(&name, source))
        }
        _ => None,
    }
}

/// Collect the identifier segments of a `dotted_name` node.
fn dotted_name(node: &Node, source: &str) -> ModulePath {
    let mut cursor = node.walk();
    let segments: Vec<&str> = node
        .children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .filter_map(|child| node_text(&child, source))
        .collect();
    ModulePath::new(segments)
}

/// Extract the text content of a node.
fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}
