//! The user's working set of selected access points.

use crate::model::{AccessKind, AccessPoint, Entry};
use crate::types::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settings the user saved for one stack item, layered over what the
/// registry declares when the item is exported.
///
/// `command`, `args` and `env` apply to packages, `headers` to remotes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Replaces the generated argument list entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
}

impl ItemConfig {
    pub fn is_empty(&self) -> bool {
        self.command.is_none()
            && self.args.is_none()
            && self.env.is_empty()
            && self.headers.is_empty()
    }

    /// Overlays `other`: set scalars replace, map entries are upserted.
    pub fn merge(mut self, other: ItemConfig) -> Self {
        if other.command.is_some() {
            self.command = other.command;
        }
        if other.args.is_some() {
            self.args = other.args;
        }
        self.env.extend(other.env);
        self.headers.extend(other.headers);
        self
    }
}

/// One selected access point of one server.
///
/// `index` is the position of the access point within the server's
/// packages or remotes, so a server can contribute several items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackItem {
    pub server_name: String,
    pub index: usize,
    #[serde(flatten)]
    pub access_point: AccessPoint,
    #[serde(rename = "ideConfig", default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ItemConfig>,
}

impl StackItem {
    pub fn kind(&self) -> AccessKind {
        self.access_point.kind()
    }

    fn is(&self, server_name: &str, kind: AccessKind, index: usize) -> bool {
        self.server_name == server_name && self.kind() == kind && self.index == index
    }

    /// Picks the `index`th access point of `kind` from `entry`.
    pub fn from_entry(entry: &Entry, kind: AccessKind, index: usize) -> Option<Self> {
        let access_point = match kind {
            AccessKind::Package => AccessPoint::Package(entry.packages().get(index)?.clone()),
            AccessKind::Remote => AccessPoint::Remote(entry.remotes().get(index)?.clone()),
        };
        Some(Self {
            server_name: entry.name().to_string(),
            index,
            access_point,
            config: None,
        })
    }

    /// Checks `config` against this item's access point and stores it.
    ///
    /// Package settings on a remote (or headers on a package) are rejected,
    /// as are a command shorter than two characters and an empty value for
    /// an environment variable the package marks as required.
    pub fn set_config(&mut self, config: ItemConfig) -> Result<(), ValidationError> {
        let invalid = |field: &str, reason: String| ValidationError::InvalidOverride {
            field: field.to_string(),
            reason,
        };
        match &self.access_point {
            AccessPoint::Remote(_) => {
                if config.command.is_some() || config.args.is_some() || !config.env.is_empty() {
                    return Err(invalid("config", "remotes only accept headers".to_string()));
                }
            }
            AccessPoint::Package(package) => {
                if !config.headers.is_empty() {
                    return Err(invalid("headers", "packages do not take headers".to_string()));
                }
                if let Some(command) = &config.command {
                    if command.trim().chars().count() < 2 {
                        return Err(invalid(
                            "command",
                            "must be at least 2 characters".to_string(),
                        ));
                    }
                }
                for var in package.environment_variables.iter().filter(|v| v.is_required) {
                    if config.env.get(&var.name).is_some_and(|v| v.trim().is_empty()) {
                        return Err(invalid(&var.name, "is required".to_string()));
                    }
                }
            }
        }
        self.config = (!config.is_empty()).then_some(config);
        Ok(())
    }

    /// Required environment variables with neither a saved nor a
    /// registry-provided value.
    pub fn missing_required_env(&self) -> Vec<&str> {
        let AccessPoint::Package(package) = &self.access_point else {
            return Vec::new();
        };
        package
            .environment_variables
            .iter()
            .filter(|var| var.is_required)
            .filter(|var| {
                let saved = self
                    .config
                    .as_ref()
                    .and_then(|c| c.env.get(&var.name))
                    .is_some_and(|v| !v.trim().is_empty());
                !saved && var.value.is_none() && var.default.is_none()
            })
            .map(|var| var.name.as_str())
            .collect()
    }
}

/// Ordered collection of stack items, unique by (server, kind, index).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    items: Vec<StackItem>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item`; returns false if an equivalent item is already present.
    pub fn add(&mut self, item: StackItem) -> bool {
        if self.contains(&item.server_name, item.kind(), item.index) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Removes the matching item; returns whether one was removed.
    pub fn remove(&mut self, server_name: &str, kind: AccessKind, index: usize) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.is(server_name, kind, index));
        self.items.len() != before
    }

    pub fn get(&self, server_name: &str, kind: AccessKind, index: usize) -> Option<&StackItem> {
        self.items.iter().find(|item| item.is(server_name, kind, index))
    }

    /// Merges `config` into the saved settings of the matching item.
    ///
    /// Returns `Ok(false)` when no such item is in the stack.
    pub fn configure(
        &mut self,
        server_name: &str,
        kind: AccessKind,
        index: usize,
        config: ItemConfig,
    ) -> Result<bool, ValidationError> {
        let Some(item) = self.items.iter_mut().find(|item| item.is(server_name, kind, index)) else {
            return Ok(false);
        };
        let merged = item.config.clone().unwrap_or_default().merge(config);
        item.set_config(merged)?;
        Ok(true)
    }

    /// Drops the saved settings of the matching item.
    pub fn reset_config(&mut self, server_name: &str, kind: AccessKind, index: usize) -> bool {
        match self.items.iter_mut().find(|item| item.is(server_name, kind, index)) {
            Some(item) => {
                item.config = None;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, server_name: &str, kind: AccessKind, index: usize) -> bool {
        self.items.iter().any(|item| item.is(server_name, kind, index))
    }

    pub fn server_has_items(&self, server_name: &str) -> bool {
        self.items.iter().any(|item| item.server_name == server_name)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a StackItem;
    type IntoIter = std::slice::Iter<'a, StackItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyValueInput, Package, Remote};
    use pretty_assertions::assert_eq;

    fn remote_item(server: &str, index: usize) -> StackItem {
        StackItem {
            server_name: server.to_string(),
            index,
            access_point: AccessPoint::Remote(Remote {
                transport_type: "sse".to_string(),
                url: Some(format!("https://{}.example/sse", server)),
                headers: Vec::new(),
                extra: Default::default(),
            }),
            config: None,
        }
    }

    #[test]
    fn add_ignores_duplicates() {
        let mut stack = Stack::new();
        assert!(stack.add(remote_item("a", 0)));
        assert!(!stack.add(remote_item("a", 0)));
        assert!(stack.add(remote_item("a", 1)));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn remove_and_membership() {
        let mut stack = Stack::new();
        stack.add(remote_item("a", 0));
        stack.add(remote_item("b", 0));

        assert!(stack.contains("a", AccessKind::Remote, 0));
        assert!(!stack.contains("a", AccessKind::Package, 0));
        assert!(stack.server_has_items("b"));

        assert!(stack.remove("a", AccessKind::Remote, 0));
        assert!(!stack.remove("a", AccessKind::Remote, 0));
        assert!(!stack.server_has_items("a"));

        stack.clear();
        assert!(stack.is_empty());
    }

    #[test]
    fn serialized_items_are_tagged() {
        let mut stack = Stack::new();
        stack.add(remote_item("a", 2));
        let json = serde_json::to_value(&stack).unwrap();
        assert_eq!(json[0]["serverName"], "a");
        assert_eq!(json[0]["index"], 2);
        assert_eq!(json[0]["kind"], "remote");
        assert_eq!(json[0]["payload"]["type"], "sse");

        let back: Stack = serde_json::from_value(json).unwrap();
        assert_eq!(back, stack);
    }

    #[test]
    fn from_entry_selects_by_kind_and_index() {
        let mut entry = Entry::new("io.example/srv", "");
        entry.server.remotes.push(Remote {
            transport_type: "streamable-http".to_string(),
            url: Some("https://srv.example/mcp".to_string()),
            headers: Vec::new(),
            extra: Default::default(),
        });

        let item = StackItem::from_entry(&entry, AccessKind::Remote, 0).unwrap();
        assert_eq!(item.server_name, "io.example/srv");
        assert!(StackItem::from_entry(&entry, AccessKind::Remote, 1).is_none());
        assert!(StackItem::from_entry(&entry, AccessKind::Package, 0).is_none());
    }

    fn package_item(required: &[&str]) -> StackItem {
        let package = Package {
            identifier: "@acme/db".to_string(),
            registry_type: "npm".to_string(),
            environment_variables: required
                .iter()
                .map(|name| KeyValueInput {
                    name: name.to_string(),
                    is_required: true,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        StackItem {
            server_name: "db".to_string(),
            index: 0,
            access_point: AccessPoint::Package(package),
            config: None,
        }
    }

    fn env(pairs: &[(&str, &str)]) -> ItemConfig {
        ItemConfig {
            env: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn settings_are_checked_against_the_access_point() {
        let mut remote = remote_item("a", 0);
        assert!(remote.set_config(env(&[("X", "1")])).is_err());

        let mut package = package_item(&["DB_URL"]);
        let headers = ItemConfig {
            headers: IndexMap::from([("A".to_string(), "b".to_string())]),
            ..Default::default()
        };
        assert!(package.set_config(headers).is_err());
        let short = ItemConfig {
            command: Some("x".to_string()),
            ..Default::default()
        };
        assert!(package.set_config(short).is_err());
        assert!(matches!(
            package.set_config(env(&[("DB_URL", "  ")])),
            Err(ValidationError::InvalidOverride { field, .. }) if field == "DB_URL"
        ));
        assert_eq!(package.config, None);
    }

    #[test]
    fn missing_required_env_tracks_saved_values() {
        let mut item = package_item(&["DB_URL", "DB_USER"]);
        assert_eq!(item.missing_required_env(), vec!["DB_URL", "DB_USER"]);

        item.set_config(env(&[("DB_URL", "postgres://localhost")])).unwrap();
        assert_eq!(item.missing_required_env(), vec!["DB_USER"]);
    }

    #[test]
    fn configure_merges_and_persists_with_the_item() {
        let mut stack = Stack::new();
        stack.add(package_item(&[]));

        assert!(stack
            .configure("db", AccessKind::Package, 0, env(&[("A", "1"), ("B", "2")]))
            .unwrap());
        let update = ItemConfig {
            command: Some("bunx".to_string()),
            ..env(&[("B", "3")])
        };
        assert!(stack.configure("db", AccessKind::Package, 0, update).unwrap());
        assert!(!stack
            .configure("db", AccessKind::Package, 1, ItemConfig::default())
            .unwrap());

        let saved = stack.get("db", AccessKind::Package, 0).unwrap().config.clone().unwrap();
        assert_eq!(saved.command.as_deref(), Some("bunx"));
        assert_eq!(saved.env["A"], "1");
        assert_eq!(saved.env["B"], "3");

        let json = serde_json::to_value(&stack).unwrap();
        assert_eq!(json[0]["ideConfig"]["env"]["B"], "3");
        let back: Stack = serde_json::from_value(json).unwrap();
        assert_eq!(back, stack);

        assert!(stack.reset_config("db", AccessKind::Package, 0));
        assert_eq!(stack.get("db", AccessKind::Package, 0).unwrap().config, None);
    }
}
