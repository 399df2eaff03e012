//! Registration records
//!
//! [`UnitNames`] lets `register` accept one name or a list of aliases;
//! [`UnitDef`] is the serde form of a single registration, used to load
//! extra units from configuration.

use serde::{Deserialize, Deserializer, Serialize};

/// One name or several aliases for the same unit
pub trait UnitNames {
    fn into_names(self) -> Vec<String>;
}

impl UnitNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl UnitNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl<const N: usize> UnitNames for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl UnitNames for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl UnitNames for &[String] {
    fn into_names(self) -> Vec<String> {
        self.to_vec()
    }
}

impl UnitNames for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}

impl UnitNames for Vec<&str> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

/// A single unit registration
///
/// Without `equivalent` this is a base unit and `factor` is ignored.
/// With it, one unit of `names` equals `factor` (default 1) of `equivalent`.
///
/// ```json
/// [
///   {"names": "byte"},
///   {"names": ["kibibyte", "KiB"], "factor": 1024, "equivalent": "byte"}
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    #[serde(deserialize_with = "one_or_many")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalent: Option<String>,
}

impl UnitDef {
    pub fn base(names: impl UnitNames) -> Self {
        UnitDef {
            names: names.into_names(),
            factor: None,
            equivalent: None,
        }
    }

    pub fn derived(names: impl UnitNames, factor: f64, equivalent: &str) -> Self {
        UnitDef {
            names: names.into_names(),
            factor: Some(factor),
            equivalent: Some(equivalent.to_string()),
        }
    }

    pub fn is_base(&self) -> bool {
        self.equivalent.is_none()
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_forms() {
        assert_eq!("m".into_names(), vec!["m"]);
        assert_eq!(["meter", "m"].into_names(), vec!["meter", "m"]);
        assert_eq!(vec!["a".to_string()].into_names(), vec!["a"]);
    }

    #[test]
    fn test_deserialize_single_name() {
        let def: UnitDef = serde_json::from_str(r#"{"names": "byte"}"#).unwrap();
        assert_eq!(def, UnitDef::base("byte"));
        assert!(def.is_base());
    }

    #[test]
    fn test_deserialize_derived() {
        let def: UnitDef = serde_json::from_str(
            r#"{"names": ["kibibyte", "KiB"], "factor": 1024, "equivalent": "byte"}"#,
        )
        .unwrap();
        assert_eq!(def, UnitDef::derived(["kibibyte", "KiB"], 1024.0, "byte"));
        assert!(!def.is_base());
    }

    #[test]
    fn test_serialize_skips_missing() {
        let json = serde_json::to_string(&UnitDef::base(["second", "s"])).unwrap();
        assert_eq!(json, r#"{"names":["second","s"]}"#);
    }
}
