//! Access points: the two ways an entry can be reached.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An installable artifact published to a package registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub identifier: String,
    /// Registry category (`npm`, `pypi`, `oci`, ...). Drives package filters.
    pub registry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_arguments: Vec<PackageArgument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_arguments: Vec<PackageArgument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Remote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<KeyValueInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_sha256: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A networked endpoint, or the transport section of a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Remote {
    /// Transport category (`streamable-http`, `sse`, `stdio`). Drives remote filters.
    #[serde(rename = "type")]
    pub transport_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<KeyValueInput>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Remote {
    pub fn new(transport_type: impl Into<String>, url: Option<String>) -> Self {
        Self {
            transport_type: transport_type.into(),
            url,
            ..Self::default()
        }
    }
}

/// An environment variable or HTTP header the user may have to supply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KeyValueInput {
    /// The value written into an exported config: explicit value, then the
    /// declared default, then a `<placeholder>` naming what is expected.
    pub fn resolved_value(&self) -> String {
        self.value
            .clone()
            .or_else(|| self.default.clone())
            .unwrap_or_else(|| {
                format!("<{}>", self.description.as_deref().unwrap_or(&self.name))
            })
    }
}

/// A runtime or package argument (`named` or `positional`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageArgument {
    #[serde(rename = "type", default)]
    pub argument_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_repeated: bool,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which kind of access point something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Package,
    Remote,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// A single access point, tagged by kind so consumers match exhaustively.
///
/// Serialized as `{"kind": "package", "payload": {...}}` or
/// `{"kind": "remote", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum AccessPoint {
    Package(Package),
    Remote(Remote),
}

impl AccessPoint {
    pub fn kind(&self) -> AccessKind {
        match self {
            Self::Package(_) => AccessKind::Package,
            Self::Remote(_) => AccessKind::Remote,
        }
    }
}
