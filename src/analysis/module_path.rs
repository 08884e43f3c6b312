//! Canonical module identities.
//!
//! A [`ModulePath`] is the dotted name Python would use to import a module,
//! stored as its individual segments. Paths are derived from the location of
//! a source file relative to the parent of the package root, so that
//! `pkg/sub/mod.py` becomes `pkg.sub.mod` and `pkg/sub/__init__.py` becomes
//! `pkg.sub`.

use std::fmt;
use std::path::{Component, Path};

use super::error::{AnalysisError, AnalysisResult};

/// File stem of the package-init marker.
pub const PACKAGE_INIT_STEM: &str = "__init__";

/// File name of the package-init marker.
pub const PACKAGE_INIT_FILE: &str = "__init__.py";

/// An ordered sequence of name segments identifying a module or package.
///
/// # Example
///
/// ```rust
/// use betsy::analysis::ModulePath;
///
/// let path = ModulePath::from_dotted("pkg.sub.mod");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "pkg.sub.mod");
/// assert_eq!(path, ModulePath::new(["pkg", "sub", "mod"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// Creates a module path from its segments, outermost first.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Splits a dotted name into segments. The empty string yields an empty path.
    pub fn from_dotted(name: &str) -> Self {
        if name.is_empty() {
            return Self::default();
        }
        Self::new(name.split('.'))
    }

    /// Derives the module path of `file` inside the package rooted at `root`.
    ///
    /// Both paths are canonicalized first. The file must live under the
    /// parent directory of `root`.
    ///
    /// ```ignore
    /// // /src/pkg/sub/mod.py with root /src/pkg
    /// let path = ModulePath::from_file(file, root)?;
    /// assert_eq!(path.to_string(), "pkg.sub.mod");
    /// ```
    pub fn from_file(file: &Path, root: &Path) -> AnalysisResult<Self> {
        let file = file.canonicalize()?;
        let root = root.canonicalize()?;

        let outside = || AnalysisError::OutsideRoot {
            path: file.clone(),
            root: root.clone(),
        };

        let anchor = root.parent().ok_or_else(outside)?;
        let relative = file.strip_prefix(anchor).map_err(|_| outside())?;

        let segments: Vec<String> = relative
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let package = Self(segments);
        match relative.file_stem().map(|stem| stem.to_string_lossy()) {
            Some(stem) if stem != PACKAGE_INIT_STEM => Ok(package.child(stem)),
            _ => Ok(package),
        }
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the path with its last `levels` segments removed, or `None`
    /// if there are fewer than `levels` segments.
    pub fn ancestor(&self, levels: usize) -> Option<Self> {
        let keep = self.0.len().checked_sub(levels)?;
        Some(Self(self.0[..keep].to_vec()))
    }

    /// Returns a new path made of this path followed by `other`.
    pub fn join(&self, other: &ModulePath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Returns a new path with a single segment appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for ModulePath {
    fn from(name: &str) -> Self {
        Self::from_dotted(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str) -> std::path::PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_from_dotted() {
        let path = ModulePath::from_dotted("a.b.c");
        assert_eq!(path.segments(), &["a", "b", "c"]);
        assert!(ModulePath::from_dotted("").is_empty());
    }

    #[test]
    fn test_display_joins_with_dots() {
        assert_eq!(ModulePath::new(["pkg", "sub"]).to_string(), "pkg.sub");
        assert_eq!(ModulePath::default().to_string(), "");
    }

    #[test]
    fn test_equality_is_segment_wise() {
        assert_eq!(ModulePath::new(["a", "b"]), ModulePath::from("a.b"));
        assert_ne!(ModulePath::new(["a", "b"]), ModulePath::new(["a", "b", "c"]));
    }

    #[test]
    fn test_ancestor() {
        let path = ModulePath::from_dotted("pkg.sub.mod");
        assert_eq!(path.ancestor(0), Some(path.clone()));
        assert_eq!(path.ancestor(1), Some(ModulePath::from_dotted("pkg.sub")));
        assert_eq!(path.ancestor(3), Some(ModulePath::default()));
        assert_eq!(path.ancestor(4), None);
    }

    #[test]
    fn test_join_and_child() {
        let base = ModulePath::from_dotted("pkg");
        assert_eq!(
            base.join(&ModulePath::from_dotted("sub.mod")).to_string(),
            "pkg.sub.mod"
        );
        assert_eq!(base.child("x").to_string(), "pkg.x");
    }

    #[test]
    fn test_from_file_module() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pkg");
        let file = touch(dir.path(), "pkg/sub/mod.py");

        let path = ModulePath::from_file(&file, &root).unwrap();
        assert_eq!(path, ModulePath::new(["pkg", "sub", "mod"]));
    }

    #[test]
    fn test_from_file_package_init() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pkg");
        let top = touch(dir.path(), "pkg/__init__.py");
        let nested = touch(dir.path(), "pkg/sub/__init__.py");

        assert_eq!(
            ModulePath::from_file(&top, &root).unwrap(),
            ModulePath::new(["pkg"])
        );
        assert_eq!(
            ModulePath::from_file(&nested, &root).unwrap(),
            ModulePath::new(["pkg", "sub"])
        );
    }

    #[test]
    fn test_from_file_outside_root() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let root = dir.path().join("pkg");
        touch(dir.path(), "pkg/__init__.py");
        let stray = touch(other.path(), "stray.py");

        let err = ModulePath::from_file(&stray, &root).unwrap_err();
        assert!(matches!(err, AnalysisError::OutsideRoot { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = ModulePath::from_file(&dir.path().join("nope.py"), dir.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::FileRead(_)));
    }
}
