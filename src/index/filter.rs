//! Attribute filters for local-replica queries.

use crate::model::Entry;
use crate::types::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusion flags per access-point category.
///
/// Package filters are keyed by registry type (`npm`, `pypi`, `oci`, ...),
/// remote filters by transport type (`streamable-http`, `sse`, ...).
/// A category with no flag counts as included, so the default set passes
/// every entry through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub packages: BTreeMap<String, bool>,
    #[serde(default)]
    pub remotes: BTreeMap<String, bool>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, registry_type: impl Into<String>, included: bool) -> Self {
        self.packages.insert(registry_type.into(), included);
        self
    }

    pub fn with_remote(mut self, transport_type: impl Into<String>, included: bool) -> Self {
        self.remotes.insert(transport_type.into(), included);
        self
    }

    pub fn includes_package(&self, registry_type: &str) -> bool {
        self.packages.get(registry_type).copied().unwrap_or(true)
    }

    pub fn includes_remote(&self, transport_type: &str) -> bool {
        self.remotes.get(transport_type).copied().unwrap_or(true)
    }

    /// True when no flag excludes anything.
    pub fn is_noop(&self) -> bool {
        self.packages.values().chain(self.remotes.values()).all(|v| *v)
    }

    /// Whether `entry` passes both filters.
    ///
    /// Each kind only excludes entries that have access points of that kind
    /// and none in an included category.
    pub fn admits(&self, entry: &Entry) -> bool {
        let packages_ok = entry.packages().is_empty()
            || entry
                .packages()
                .iter()
                .any(|p| self.includes_package(&p.registry_type));
        let remotes_ok = entry.remotes().is_empty()
            || entry
                .remotes()
                .iter()
                .any(|r| self.includes_remote(&r.transport_type));
        packages_ok && remotes_ok
    }

    /// Parses `kind=on|off` pairs as given on the command line.
    pub fn apply_flag(&mut self, kind: FilterKind, spec: &str) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFilter {
            input: spec.to_string(),
            reason: reason.to_string(),
        };
        let (category, value) = spec
            .split_once('=')
            .ok_or_else(|| invalid("expected CATEGORY=on|off"))?;
        let included = match value.trim() {
            "on" | "true" | "yes" => true,
            "off" | "false" | "no" => false,
            _ => return Err(invalid("value must be on or off")),
        };
        if category.trim().is_empty() {
            return Err(invalid("missing category"));
        }
        let category = category.trim().to_string();
        match kind {
            FilterKind::Package => self.packages.insert(category, included),
            FilterKind::Remote => self.remotes.insert(category, included),
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Package,
    Remote,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Package, Remote};

    fn package(registry_type: &str) -> Package {
        Package {
            identifier: "x".to_string(),
            registry_type: registry_type.to_string(),
            registry_base_url: None,
            version: None,
            runtime_hint: None,
            runtime_arguments: Vec::new(),
            package_arguments: Vec::new(),
            transport: None,
            environment_variables: Vec::new(),
            file_sha256: None,
            extra: Default::default(),
        }
    }

    fn remote(transport_type: &str) -> Remote {
        Remote {
            transport_type: transport_type.to_string(),
            url: None,
            headers: Vec::new(),
            extra: Default::default(),
        }
    }

    fn entry(packages: &[&str], remotes: &[&str]) -> Entry {
        let mut entry = Entry::new("e", "");
        entry.server.packages = packages.iter().map(|p| package(p)).collect();
        entry.server.remotes = remotes.iter().map(|r| remote(r)).collect();
        entry
    }

    #[test]
    fn default_filter_admits_everything() {
        let filters = FilterSet::new();
        assert!(filters.is_noop());
        assert!(filters.admits(&entry(&["npm"], &["sse"])));
        assert!(filters.admits(&entry(&[], &[])));
    }

    #[test]
    fn all_true_flags_are_a_noop() {
        let filters = FilterSet::new()
            .with_package("npm", true)
            .with_remote("sse", true);
        assert!(filters.is_noop());
        assert!(filters.admits(&entry(&["npm"], &["sse"])));
    }

    #[test]
    fn entry_without_packages_ignores_package_filter() {
        let filters = FilterSet::new()
            .with_package("npm", false)
            .with_package("pypi", false)
            .with_package("oci", false);
        assert!(filters.admits(&entry(&[], &["streamable-http"])));
        assert!(!filters.admits(&entry(&["npm"], &["streamable-http"])));
    }

    #[test]
    fn entry_without_remotes_ignores_remote_filter() {
        let filters = FilterSet::new().with_remote("sse", false);
        assert!(filters.admits(&entry(&["npm"], &[])));
        assert!(!filters.admits(&entry(&[], &["sse"])));
    }

    #[test]
    fn one_included_category_is_enough() {
        let filters = FilterSet::new().with_package("npm", false);
        assert!(filters.admits(&entry(&["npm", "pypi"], &[])));
    }

    #[test]
    fn kinds_are_checked_independently() {
        let filters = FilterSet::new().with_remote("sse", false);
        assert!(!filters.admits(&entry(&["npm"], &["sse"])));
    }

    #[test]
    fn flag_parsing() {
        let mut filters = FilterSet::new();
        filters.apply_flag(FilterKind::Package, "oci=off").unwrap();
        filters.apply_flag(FilterKind::Remote, "sse = on").unwrap();
        assert!(!filters.includes_package("oci"));
        assert!(filters.includes_remote("sse"));
        assert!(filters.apply_flag(FilterKind::Package, "npm").is_err());
        assert!(filters.apply_flag(FilterKind::Package, "npm=maybe").is_err());
        assert!(filters.apply_flag(FilterKind::Remote, "=off").is_err());
    }
}
