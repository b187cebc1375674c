//! Domain types shared by the store, the matcher and the import pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub type ComponentId = String;

/// Parameter name (e.g. "Collector Current (Ic)") to free-text value ("800mA").
pub type Specifications = BTreeMap<String, String>;

/// Component family tag.
///
/// The four known families serialize as "Transistor", "MOSFET", "IC" and
/// "IGBT". Any other tag is kept verbatim in `Other` so that equality stays a
/// literal comparison of the stored tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    #[default]
    Transistor,
    Mosfet,
    Ic,
    Igbt,
    Other(String),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transistor => "Transistor",
            Self::Mosfet => "MOSFET",
            Self::Ic => "IC",
            Self::Igbt => "IGBT",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for ComponentKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Transistor" => Self::Transistor,
            "MOSFET" => Self::Mosfet,
            "IC" => Self::Ic,
            "IGBT" => Self::Igbt,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for ComponentKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A known replacement part listed by the catalog itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquivalentRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
}

/// One electronic part.
///
/// - `id`: unique within a collection
/// - `name`: display name, also accepted as a lookup key
/// - `kind`: serialized as `type`; matching only happens within one kind
/// - `specifications`: may be empty; non-string scalar values are
///   stringified on read, `null` values are dropped and a value that is not
///   a map at all reads as empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, deserialize_with = "lenient_specifications")]
    pub specifications: Specifications,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalents: Option<Vec<EquivalentRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasheet_url: Option<String>,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: None,
            manufacturer: None,
            package: None,
            specifications: Specifications::new(),
            equivalents: None,
            datasheet_url: None,
        }
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn with_spec(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.specifications.insert(name.into(), value.into());
        self
    }

    /// Package descriptor, `None` when absent or empty.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref().filter(|p| !p.is_empty())
    }

    /// Specification value, `None` when absent or empty.
    pub fn spec(&self, name: &str) -> Option<&str> {
        self.specifications
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn lenient_specifications<'de, D>(deserializer: D) -> Result<Specifications, D::Error>
where
    D: Deserializer<'de>,
{
    // Anything other than an object reads as no specifications.
    let Value::Object(raw) = Value::deserialize(deserializer)? else {
        return Ok(Specifications::new());
    };
    let mut specs = Specifications::new();
    for (name, value) in raw {
        match value {
            Value::String(s) => {
                specs.insert(name, s);
            }
            Value::Number(n) => {
                specs.insert(name, n.to_string());
            }
            Value::Bool(b) => {
                specs.insert(name, b.to_string());
            }
            Value::Null | Value::Array(_) | Value::Object(_) => {}
        }
    }
    Ok(specs)
}
