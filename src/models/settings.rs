use super::error::AdRefreshError;
use super::refresh_config::SlotStatus;
use serde::Deserialize;
use serde_json::Value;

/// Module-wide settings consumed by the attachment gate.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ModuleSettings {
    #[serde(default)]
    status: Value,

    /// Newline separated page patterns, interpreted by the exclusion predicate
    #[serde(default, deserialize_with = "deserialize_patterns")]
    page_exclusions: String,
}

impl ModuleSettings {
    /// Parses the stored `items` setting.
    ///
    /// An empty or blank value means nothing has been saved yet and yields
    /// disabled defaults.
    pub fn parse(items: &str) -> Result<Self, AdRefreshError> {
        if items.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_json::from_str(items)?)
    }

    pub fn new(status: impl Into<Value>, page_exclusions: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            page_exclusions: page_exclusions.into(),
        }
    }

    pub fn status(&self) -> SlotStatus {
        SlotStatus::from_value(&self.status)
    }

    pub fn is_enabled(&self) -> bool {
        self.status().is_enabled()
    }

    pub fn page_exclusions(&self) -> &str {
        &self.page_exclusions
    }
}

fn deserialize_patterns<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    Ok(match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enabled_settings() {
        let settings =
            ModuleSettings::parse(r#"{"status": "1", "page_exclusions": "/admin/*\n/user/*"}"#).unwrap();

        assert!(settings.is_enabled());
        assert_eq!(settings.page_exclusions(), "/admin/*\n/user/*");
    }

    #[test]
    fn test_parse_empty_items_is_disabled() {
        let settings = ModuleSettings::parse("  ").unwrap();
        assert!(!settings.is_enabled());
        assert_eq!(settings.page_exclusions(), "");
    }

    #[test]
    fn test_parse_missing_fields() {
        let settings = ModuleSettings::parse(r#"{"page_exclusions": null}"#).unwrap();
        assert!(!settings.is_enabled());
        assert_eq!(settings.page_exclusions(), "");
    }

    #[test]
    fn test_parse_pattern_list() {
        let settings = ModuleSettings::parse(r#"{"status": 1, "page_exclusions": ["/a", "/b"]}"#).unwrap();
        assert!(settings.is_enabled());
        assert_eq!(settings.page_exclusions(), "/a\n/b");
    }

    #[test]
    fn test_parse_malformed_items() {
        assert!(matches!(
            ModuleSettings::parse("{\"status\": "),
            Err(AdRefreshError::ConfigParse(_))
        ));
    }
}
