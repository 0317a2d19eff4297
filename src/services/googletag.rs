use crate::models::error::AdRefreshError;
use crate::services::registry::{RefreshOptions, SlotRegistry};
use web_sys::js_sys::{self, Array, Function, JSON, Reflect};
use web_sys::wasm_bindgen::{JsCast, JsValue};

/// `SlotRegistry` over the page's `googletag` global.
///
/// The global is resolved on every call because the SDK loads asynchronously
/// and may replace its stub command queue after the library attached.
#[derive(Debug, Clone)]
pub struct GoogleTag {
    global: JsValue,
}

impl GoogleTag {
    pub fn new() -> Self {
        Self {
            global: js_sys::global().into(),
        }
    }

    fn googletag(&self) -> Option<JsValue> {
        property(&self.global, "googletag")
    }

    /// Returns the publisher ads service.
    fn pubads(&self) -> Result<JsValue, AdRefreshError> {
        let googletag = self
            .googletag()
            .ok_or_else(|| AdRefreshError::RegistryUnavailable("googletag is not defined".to_string()))?;

        let pubads = function(&googletag, "pubads")?;
        pubads.call0(&googletag).map_err(script_error)
    }
}

impl Default for GoogleTag {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRegistry for GoogleTag {
    type Handle = JsValue;

    fn slot(&self, slot_id: &str) -> Option<JsValue> {
        let slots = property(&self.googletag()?, "slots")?;
        property(&slots, slot_id)
    }

    fn refresh(&self, handles: &[JsValue], options: RefreshOptions) -> Result<(), AdRefreshError> {
        let service = self.pubads()?;
        let refresh = function(&service, "refresh")?;

        let slots: Array = handles.iter().collect();
        let options = serde_json::to_string(&options)
            .map_err(|e| AdRefreshError::Script(format!("Failed to encode refresh options: {e}")))?;
        let options = JSON::parse(&options).map_err(script_error)?;

        refresh.call2(&service, &slots, &options).map(drop).map_err(script_error)
    }
}

/// Reads `target[key]`, treating `undefined`, `null` and throwing getters as absent.
pub(crate) fn property(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn function(target: &JsValue, key: &str) -> Result<Function, AdRefreshError> {
    property(target, key)
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| AdRefreshError::RegistryUnavailable(format!("{key} is not a function")))
}

/// Converts a thrown JS value into an error with a readable message.
pub(crate) fn script_error(error: JsValue) -> AdRefreshError {
    let message = error
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{error:?}"));

    AdRefreshError::Script(message)
}
