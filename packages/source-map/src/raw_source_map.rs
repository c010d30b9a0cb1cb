//! The JSON document of a source map, as written to and read from disk.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// Some producers prefix the map with an anti-XSSI guard line.
static XSSI_GUARD_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\)\]\}'[^\n]*\n?").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<RawSection>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub offset: RawOffset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Box<RawSourceMap>>,
}

/// 0-based line and column where a section starts in the generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawOffset {
    pub line: u32,
    pub column: u32,
}

impl RawSourceMap {
    /// Parses a source map from JSON text, ignoring a leading `)]}'` guard.
    pub fn from_json(json: &str) -> Result<Self> {
        let json = XSSI_GUARD_REGEXP.replace(json, "");
        Ok(serde_json::from_str(&json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_strip_the_xssi_guard() {
        let raw = RawSourceMap::from_json(
            ")]}'\n{\"version\":3,\"sources\":[\"a.js\"],\"names\":[],\"mappings\":\"AAAA\"}",
        )
        .unwrap();
        assert_eq!(raw.sources, vec!["a.js"]);
        assert_eq!(raw.mappings, "AAAA");
    }

    #[test]
    fn should_default_optional_fields() {
        let raw = RawSourceMap::from_json(r#"{"version":3,"sources":[],"mappings":""}"#).unwrap();
        assert!(raw.names.is_empty());
        assert_eq!(raw.file, None);
        assert_eq!(raw.sources_content, None);
        assert_eq!(raw.sections, None);
    }

    #[test]
    fn should_use_wire_names_when_serializing() {
        let raw = RawSourceMap {
            version: 3,
            file: Some("min.js".to_string()),
            source_root: Some("/root".to_string()),
            sources: vec!["a.js".to_string()],
            names: vec![],
            mappings: "AAAA".to_string(),
            sources_content: Some(vec![None]),
            sections: None,
        };
        assert_eq!(
            raw.to_json_string().unwrap(),
            r#"{"version":3,"file":"min.js","sourceRoot":"/root","sources":["a.js"],"names":[],"mappings":"AAAA","sourcesContent":[null]}"#
        );
    }

    #[test]
    fn should_reject_malformed_json() {
        assert!(RawSourceMap::from_json("{").is_err());
    }
}
