//! Import pipeline: raw catalog records and user uploads into [`Component`]s.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ImportError;
use crate::types::{Component, ComponentKind, EquivalentRef, Specifications};

/// Largest upload accepted; the storage medium tops out around 5MB.
pub const MAX_UPLOAD_BYTES: usize = 4_000_000;

/// A catalog entry as scraped from datasheet listings, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawComponent {
    pub id: String,
    pub name: String,
    pub category: String,
    pub part_number: String,
    pub manufacturer: String,
    pub description: String,
    pub key_specs: Specifications,
    pub equivalents: Vec<RawEquivalent>,
    pub datasheet_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEquivalent {
    pub part_number: String,
    pub manufacturer: String,
    pub notes: String,
    pub percent_match: Option<Value>,
}

/// Map a free-text catalog category onto a component family.
pub fn kind_for_category(category: &str) -> ComponentKind {
    let category = category.to_lowercase();
    if category.contains("mosfet") {
        ComponentKind::Mosfet
    } else if category.contains("ic") || category.contains("integrated") {
        ComponentKind::Ic
    } else if category.contains("igbt") {
        ComponentKind::Igbt
    } else {
        ComponentKind::Transistor
    }
}

pub fn process_record(raw: RawComponent) -> Component {
    let kind = kind_for_category(&raw.category);
    let package = raw
        .key_specs
        .get("Package")
        .filter(|p| !p.is_empty())
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string());
    let equivalents: Vec<EquivalentRef> = raw
        .equivalents
        .into_iter()
        .enumerate()
        .map(|(index, eq)| EquivalentRef {
            id: format!("eq_{}_{}", raw.id, index),
            name: eq.part_number,
            manufacturer: non_empty(eq.manufacturer).unwrap_or_else(|| "Unknown".to_string()),
            match_score: eq.percent_match.as_ref().and_then(parse_percent),
        })
        .collect();
    let description =
        non_empty(raw.description).unwrap_or_else(|| format!("{} {}", raw.name, kind));

    Component {
        id: raw.id,
        name: raw.name,
        kind,
        description: Some(description),
        manufacturer: Some(non_empty(raw.manufacturer).unwrap_or_else(|| "Unknown".to_string())),
        package: Some(package),
        specifications: raw.key_specs,
        equivalents: if equivalents.is_empty() { None } else { Some(equivalents) },
        datasheet_url: non_empty(raw.datasheet_url),
    }
}

pub fn process_catalog(records: Vec<RawComponent>) -> Vec<Component> {
    records.into_iter().map(process_record).collect()
}

pub fn process_catalog_file(path: &Path) -> Result<Vec<Component>, ImportError> {
    let data = fs::read_to_string(path)?;
    let records: Vec<RawComponent> =
        serde_json::from_str(&data).map_err(ImportError::InvalidJson)?;
    let components = process_catalog(records);
    info!(count = components.len(), path = %path.display(), "processed catalog");
    Ok(components)
}

pub fn save_processed(path: &Path, components: &[Component]) -> Result<(), ImportError> {
    fs::write(path, export_json(components))?;
    info!(count = components.len(), path = %path.display(), "saved processed data");
    Ok(())
}

/// Validate an uploaded JSON document and fill in required fields.
///
/// The top level must be an array. Missing or empty `id`, `name` and `type`
/// become `component_<index>`, `Component <index>` and "Transistor".
pub fn parse_upload(text: &str) -> Result<Vec<Component>, ImportError> {
    if text.len() > MAX_UPLOAD_BYTES {
        return Err(ImportError::TooLarge { size: text.len(), max: MAX_UPLOAD_BYTES });
    }
    let data: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    let Value::Array(items) = data else {
        return Err(ImportError::NotAnArray);
    };
    debug!(count = items.len(), "parsing upload");

    items
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            if let Value::Object(fields) = &mut item {
                fill_default(fields, "id", format!("component_{index}"));
                fill_default(fields, "name", format!("Component {index}"));
                fill_default(fields, "type", "Transistor".to_string());
            }
            serde_json::from_value(item)
                .map_err(|source| ImportError::InvalidComponent { index, source })
        })
        .collect()
}

pub fn export_json(components: &[Component]) -> String {
    // Serializing plain data with string keys cannot fail.
    serde_json::to_string_pretty(components).unwrap_or_else(|_| "[]".to_string())
}

fn fill_default(fields: &mut Map<String, Value>, key: &str, default: String) {
    let replacement = match fields.get(key) {
        None | Some(Value::Null | Value::Bool(false)) => Some(Value::String(default)),
        Some(Value::String(s)) if s.is_empty() => Some(Value::String(default)),
        Some(Value::Number(n)) => Some(Value::String(n.to_string())),
        Some(_) => None,
    };
    if let Some(value) = replacement {
        fields.insert(key.to_string(), value);
    }
}

/// Leading integer of a percentage such as "85%" or "92.5".
fn parse_percent(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u32),
        Value::String(s) => {
            let s = s.trim_start();
            let s = s.strip_prefix('+').unwrap_or(s);
            let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
