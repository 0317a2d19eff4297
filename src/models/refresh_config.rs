use super::error::AdRefreshError;
use crate::config::Config;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// Whether a slot takes part in periodic refreshing.
///
/// The enabled value is the numeral one, written either as the string `"1"`
/// or the integer `1`. Anything else, booleans included, disables the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    Enabled,
    #[default]
    Disabled,
}

impl SlotStatus {
    pub fn from_value(value: &Value) -> Self {
        let enabled = match value {
            Value::String(s) => s == Config::ENABLED_MARKER,
            Value::Number(n) => n.as_u64() == Some(1),
            _ => false,
        };

        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// A refresh cadence in whole seconds whose millisecond period fits a browser timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInterval {
    seconds: NonZeroU32,
}

impl RefreshInterval {
    pub fn from_seconds(seconds: u32) -> Option<Self> {
        let period_ms = seconds.checked_mul(Config::MILLIS_PER_SECOND)?;
        if period_ms > Config::MAX_PERIOD_MS {
            return None;
        }

        NonZeroU32::new(seconds).map(|seconds| Self { seconds })
    }

    /// Reads an interval from a whole JSON number or a string of digits.
    ///
    /// Strings are matched exactly, like statuses: surrounding whitespace is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let seconds = match value {
            Value::Number(n) => match n.as_u64() {
                Some(seconds) => seconds,
                None => whole_seconds(n.as_f64()?)?,
            },
            Value::String(s) => s.parse::<u64>().ok()?,
            _ => return None,
        };

        u32::try_from(seconds).ok().and_then(Self::from_seconds)
    }

    pub fn seconds(&self) -> u32 {
        self.seconds.get()
    }

    pub fn period_ms(&self) -> u32 {
        // Bounded in `from_seconds`.
        self.seconds.get() * Config::MILLIS_PER_SECOND
    }
}

/// Accepts integral floats such as `30.0`, which serializers emit for numeric settings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(value: f64) -> Option<u64> {
    let whole = value.is_finite() && value > 0.0 && value.fract() == 0.0;
    (whole && value <= f64::from(u32::MAX)).then(|| value as u64)
}

/// Raw per-slot settings as delivered by the page.
///
/// Fields are kept as JSON values so a malformed entry only disables its own
/// slot instead of invalidating the whole configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotSettings {
    status: Value,
    interval: Value,
}

impl SlotSettings {
    pub fn new(status: impl Into<Value>, interval: impl Into<Value>) -> Self {
        Self {
            status: status.into(),
            interval: interval.into(),
        }
    }

    fn from_object(mut object: Map<String, Value>) -> Self {
        Self {
            status: object.remove("status").unwrap_or_default(),
            interval: object.remove("interval").unwrap_or_default(),
        }
    }

    pub fn status(&self) -> SlotStatus {
        SlotStatus::from_value(&self.status)
    }

    pub fn interval(&self) -> Option<RefreshInterval> {
        RefreshInterval::from_value(&self.interval)
    }
}

/// Per-slot refresh configuration, parsed once per page load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefreshConfig {
    slots: BTreeMap<String, SlotSettings>,
}

impl RefreshConfig {
    /// Parses the serialized configuration blob.
    ///
    /// The blob must be a JSON object whose values are all JSON objects.
    /// Any other shape rejects the whole configuration.
    pub fn parse(blob: &str) -> Result<Self, AdRefreshError> {
        let raw: BTreeMap<String, Map<String, Value>> = serde_json::from_str(blob)?;

        let slots = raw
            .into_iter()
            .map(|(slot, object)| (slot, SlotSettings::from_object(object)))
            .collect();

        Ok(Self { slots })
    }

    pub fn get(&self, slot: &str) -> Option<&SlotSettings> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotSettings)> {
        self.slots.iter().map(|(slot, settings)| (slot.as_str(), settings))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(String, SlotSettings)> for RefreshConfig {
    fn from_iter<I: IntoIterator<Item = (String, SlotSettings)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl std::str::FromStr for RefreshConfig {
    type Err = AdRefreshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object_of_objects() {
        let config = RefreshConfig::parse(
            r#"{"top": {"status": "1", "interval": 30}, "side": {"status": "0", "interval": 15}}"#,
        )
        .unwrap();

        assert_eq!(config.len(), 2);
        let top = config.get("top").unwrap();
        assert!(top.status().is_enabled());
        assert_eq!(top.interval().unwrap().period_ms(), 30_000);
        assert!(!config.get("side").unwrap().status().is_enabled());
    }

    #[test]
    fn test_parse_rejects_malformed_blob() {
        assert!(matches!(
            RefreshConfig::parse(r#"{"top": {"status": "1", "interv"#),
            Err(AdRefreshError::ConfigParse(_))
        ));
        assert!(RefreshConfig::parse("").is_err());
        assert!(RefreshConfig::parse("[1, 2]").is_err());
    }

    #[test]
    fn test_parse_rejects_non_object_entries() {
        // One bad entry invalidates everything.
        assert!(RefreshConfig::parse(r#"{"top": {"status": "1"}, "side": 15}"#).is_err());
        assert!(RefreshConfig::parse(r#"{"top": ["1", 30]}"#).is_err());
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let config = RefreshConfig::parse(r#"{"top": {}, "side": {"label": "x"}}"#).unwrap();
        let top = config.get("top").unwrap();

        assert_eq!(top.status(), SlotStatus::Disabled);
        assert!(top.interval().is_none());
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_status_single_enabled_value() {
        assert_eq!(SlotStatus::from_value(&json!("1")), SlotStatus::Enabled);
        assert_eq!(SlotStatus::from_value(&json!(1)), SlotStatus::Enabled);

        let disabled = [
            json!(true),
            json!("0"),
            json!(0),
            json!(2),
            json!("true"),
            json!(1.5),
            json!(" 1"),
            json!(null),
        ];
        for value in disabled {
            assert_eq!(SlotStatus::from_value(&value), SlotStatus::Disabled, "{value}");
        }
    }

    #[test]
    fn test_interval_accepts_positive_whole_seconds() {
        assert_eq!(RefreshInterval::from_value(&json!(30)).unwrap().seconds(), 30);
        assert_eq!(RefreshInterval::from_value(&json!("45")).unwrap().period_ms(), 45_000);
        assert_eq!(RefreshInterval::from_value(&json!(30.0)).unwrap().period_ms(), 30_000);
    }

    #[test]
    fn test_parse_integral_float_interval() {
        let config = RefreshConfig::parse(r#"{"top": {"status": "1", "interval": 30.0}}"#).unwrap();
        assert_eq!(config.get("top").unwrap().interval().unwrap().seconds(), 30);
    }

    #[test]
    fn test_interval_rejects_non_positive_and_garbage() {
        let invalid = [
            json!(0),
            json!(-5),
            json!("-5"),
            json!(2.5),
            json!(-30.0),
            json!(0.0),
            json!(" 30"),
            json!("30 "),
            json!("soon"),
            json!(null),
            json!([30]),
        ];
        for value in invalid {
            assert!(RefreshInterval::from_value(&value).is_none(), "{value}");
        }
    }

    #[test]
    fn test_interval_rejects_period_beyond_browser_timer_range() {
        let longest = RefreshInterval::from_seconds(2_147_483).unwrap();
        assert!(i32::try_from(longest.period_ms()).is_ok());

        assert!(RefreshInterval::from_seconds(2_147_484).is_none());
        assert!(RefreshInterval::from_value(&json!(3_000_000)).is_none());
        assert!(RefreshInterval::from_value(&json!(3_000_000.0)).is_none());
        assert!(RefreshInterval::from_value(&json!(u64::MAX)).is_none());
    }

    #[test]
    fn test_collect_from_settings() {
        let config: RefreshConfig = [
            ("top".to_string(), SlotSettings::new("1", 30)),
            ("side".to_string(), SlotSettings::new(0, "15")),
        ]
        .into_iter()
        .collect();

        let slots: Vec<&str> = config.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, ["side", "top"]);
        assert!(config.get("top").unwrap().status().is_enabled());
        assert_eq!(config.get("side").unwrap().interval().unwrap().seconds(), 15);
    }
}
