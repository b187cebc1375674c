//! Specification value grammar.
//!
//! A value is numeric when it starts with a signed decimal number
//! (`[-+]?[0-9]*\.?[0-9]+`). Everything after the number is the unit, cut at
//! the first character that cannot belong to one, so "40V to 32V" parses as
//! 40 with unit "V". Anything else is plain text.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::types::Specifications;

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-+]?[0-9]*\.?[0-9]+)").expect("valid number regex"));
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9]*\.?[0-9]+\s*([a-zA-Z%°Ωµμ]+)").expect("valid unit regex")
});

#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue<'a> {
    Numeric { magnitude: f64, unit: &'a str },
    Text(&'a str),
}

impl SpecValue<'_> {
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Self::Numeric { magnitude, .. } => Some(*magnitude),
            Self::Text(_) => None,
        }
    }
}

pub fn parse(raw: &str) -> SpecValue<'_> {
    match extract_numeric_value(raw) {
        Some(magnitude) => SpecValue::Numeric { magnitude, unit: unit_of(raw) },
        None => SpecValue::Text(raw),
    }
}

/// Leading signed decimal of `raw`, e.g. "100mA" -> 100.
pub fn extract_numeric_value(raw: &str) -> Option<f64> {
    let caps = LEADING_NUMBER_RE.captures(raw)?;
    caps.get(1)?.as_str().parse::<f64>().ok()
}

/// Unit suffix directly after the leading number, e.g. "100mA" -> "mA".
pub fn extract_unit(raw: &str) -> String {
    unit_of(raw).to_string()
}

fn unit_of(raw: &str) -> &str {
    UNIT_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Strip one SI prefix from `unit`, scaling `value` to the base unit.
/// mA -> A, kΩ -> Ω. A bare prefix letter ("m", "k") is left alone.
pub fn normalize_unit(value: f64, unit: &str) -> (f64, String) {
    const PREFIXES: [(char, f64); 8] = [
        ('m', 1e-3),
        ('µ', 1e-6),
        ('μ', 1e-6),
        ('u', 1e-6),
        ('n', 1e-9),
        ('k', 1e3),
        ('M', 1e6),
        ('G', 1e9),
    ];
    let mut chars = unit.chars();
    if let Some(first) = chars.next() {
        let rest = chars.as_str();
        if !rest.is_empty() {
            if let Some((_, scale)) = PREFIXES.iter().find(|(p, _)| *p == first) {
                return (value * scale, rest.to_string());
            }
        }
    }
    (value, unit.to_string())
}

/// A numeric specification, as consumed by chart and formatting layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSpec {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Every numeric-parseable entry of `specs`, in parameter-name order.
pub fn numeric_specs(specs: &Specifications) -> Vec<NumericSpec> {
    specs
        .iter()
        .filter_map(|(name, raw)| match parse(raw) {
            SpecValue::Numeric { magnitude, unit } => Some(NumericSpec {
                name: name.clone(),
                value: magnitude,
                unit: unit.to_string(),
            }),
            SpecValue::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_number_forms() {
        assert_eq!(extract_numeric_value("800mA"), Some(800.0));
        assert_eq!(extract_numeric_value("0.3V"), Some(0.3));
        assert_eq!(extract_numeric_value(".5W"), Some(0.5));
        assert_eq!(extract_numeric_value("-40V"), Some(-40.0));
        assert_eq!(extract_numeric_value("+5"), Some(5.0));
        assert_eq!(extract_numeric_value("40V to 32V"), Some(40.0));
        assert_eq!(extract_numeric_value("NPN"), None);
        assert_eq!(extract_numeric_value(""), None);
        assert_eq!(extract_numeric_value(" 5V"), None);
    }

    #[test]
    fn unit_follows_number() {
        assert_eq!(extract_unit("100mA"), "mA");
        assert_eq!(extract_unit("4.7 kΩ"), "kΩ");
        assert_eq!(extract_unit("25°C"), "°C");
        assert_eq!(extract_unit("10µA"), "µA");
        assert_eq!(extract_unit("150"), "");
        assert_eq!(extract_unit("TO-92"), "");
    }

    #[test]
    fn parse_tags_values() {
        assert_eq!(parse("0.3V"), SpecValue::Numeric { magnitude: 0.3, unit: "V" });
        assert_eq!(parse("NPN"), SpecValue::Text("NPN"));
        assert_eq!(parse("NPN").magnitude(), None);
    }

    #[test]
    fn normalize_strips_one_prefix() {
        let (v, u) = normalize_unit(800.0, "mA");
        assert!((v - 0.8).abs() < 1e-12);
        assert_eq!(u, "A");
        let (v, u) = normalize_unit(4.7, "kΩ");
        assert!((v - 4700.0).abs() < 1e-9);
        assert_eq!(u, "Ω");
        assert_eq!(normalize_unit(3.0, "m"), (3.0, "m".to_string()));
        assert_eq!(normalize_unit(3.0, "V"), (3.0, "V".to_string()));
    }

    #[test]
    fn numeric_specs_skip_text() {
        let mut specs = Specifications::new();
        specs.insert("Polarity".into(), "NPN".into());
        specs.insert("Vce".into(), "40V".into());
        let out = numeric_specs(&specs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Vce");
        assert_eq!(out[0].unit, "V");
    }
}
