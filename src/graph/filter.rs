//! Include/exclude filtering on dotted module names.
//!
//! A name matches a prefix when it is equal to it or continues it past a dot:
//! `pkg` and `pkg.sub` match the prefix `pkg`, but `pkg2` does not.

use std::collections::BTreeSet;

/// Returns true if `name` equals one of `prefixes` or lies below one of them.
///
/// # Example
///
/// ```rust
/// use betsy::graph::filter::matches_any_prefix;
///
/// let prefixes = ["pkg".to_string()];
/// assert!(matches_any_prefix("pkg", &prefixes));
/// assert!(matches_any_prefix("pkg.sub", &prefixes));
/// assert!(!matches_any_prefix("pkg2", &prefixes));
/// ```
pub fn matches_any_prefix<'a, I>(name: &str, prefixes: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    prefixes.into_iter().any(|prefix| {
        name == prefix
            || name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Parses a comma-separated prefix list such as `"pkg.a, pkg.b"`.
///
/// Entries are trimmed and empty entries are dropped. Used as a clap value
/// parser for `--include` and `--exclude`.
pub fn parse_prefix_list(list: &str) -> Result<BTreeSet<String>, String> {
    Ok(list
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect())
}

/// Include/exclude filter applied to importers and imported modules alike.
///
/// An unset include list lets everything in; an unset exclude list keeps
/// nothing out. A module matching both lists is excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    include: Option<BTreeSet<String>>,
    exclude: Option<BTreeSet<String>>,
}

impl ModuleFilter {
    /// Creates a filter from optional include and exclude prefix sets.
    pub fn new(include: Option<BTreeSet<String>>, exclude: Option<BTreeSet<String>>) -> Self {
        Self { include, exclude }
    }

    /// Returns a copy of this filter with the include prefixes set.
    pub fn with_include<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Returns a copy of this filter with the exclude prefixes set.
    pub fn with_exclude<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// The include prefixes, if an include list was given.
    pub fn include(&self) -> Option<&BTreeSet<String>> {
        self.include.as_ref()
    }

    /// The exclude prefixes, if an exclude list was given.
    pub fn exclude(&self) -> Option<&BTreeSet<String>> {
        self.exclude.as_ref()
    }

    /// True if `name` passes the include list (or there is none).
    pub fn is_included(&self, name: &str) -> bool {
        self.include
            .as_ref()
            .map_or(true, |prefixes| matches_any_prefix(name, prefixes))
    }

    /// True if `name` matches the exclude list.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|prefixes| matches_any_prefix(name, prefixes))
    }

    /// True if `name` is kept by this filter.
    pub fn allows(&self, name: &str) -> bool {
        self.is_included(name) && !self.is_excluded(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        assert!(matches_any_prefix("pkg", &prefixes(&["pkg"])));
        assert!(matches_any_prefix("pkg.a", &prefixes(&["pkg.a"])));
    }

    #[test]
    fn test_prefix_with_dot_separator() {
        assert!(matches_any_prefix("pkg.a", &prefixes(&["pkg"])));
        assert!(matches_any_prefix("pkg.a.b", &prefixes(&["pkg.a"])));
    }

    #[test]
    fn test_prefix_without_separator_does_not_match() {
        assert!(!matches_any_prefix("pkg2", &prefixes(&["pkg"])));
        assert!(!matches_any_prefix("pkg_extra.a", &prefixes(&["pkg"])));
        assert!(!matches_any_prefix("pkg", &prefixes(&["pkg.a"])));
    }

    #[test]
    fn test_empty_prefix_set_matches_nothing() {
        assert!(!matches_any_prefix("pkg", &prefixes(&[])));
    }

    #[test]
    fn test_unset_filter_allows_everything() {
        let filter = ModuleFilter::default();
        assert!(filter.is_included("anything"));
        assert!(!filter.is_excluded("anything"));
        assert!(filter.allows("anything"));
    }

    #[test]
    fn test_include_only() {
        let filter = ModuleFilter::default().with_include(["pkg.core"]);
        assert!(filter.allows("pkg.core"));
        assert!(filter.allows("pkg.core.models"));
        assert!(!filter.allows("pkg.cli"));
        assert!(!filter.allows("numpy"));
    }

    #[test]
    fn test_exclude_only() {
        let filter = ModuleFilter::default().with_exclude(["pkg.b"]);
        assert!(filter.allows("pkg.a"));
        assert!(filter.allows("pkg.bb"));
        assert!(!filter.allows("pkg.b"));
        assert!(!filter.allows("pkg.b.c"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = ModuleFilter::default()
            .with_include(["pkg"])
            .with_exclude(["pkg.tests"]);
        assert!(filter.allows("pkg.a"));
        assert!(!filter.allows("pkg.tests"));
        assert!(!filter.allows("pkg.tests.test_a"));
        assert!(!filter.allows("os"));
    }

    #[test]
    fn test_accessors() {
        let filter = ModuleFilter::default().with_include(["pkg"]);
        assert_eq!(filter.include().map(|p| p.len()), Some(1));
        assert!(filter.exclude().is_none());
    }

    #[test]
    fn test_parse_prefix_list() {
        let parsed = parse_prefix_list(" pkg.a , pkg.b,,").unwrap();
        let expected: BTreeSet<String> = ["pkg.a", "pkg.b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_prefix_list_single() {
        let parsed = parse_prefix_list("pkg").unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains("pkg"));
    }
}
