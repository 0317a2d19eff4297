use crate::models::error::AdRefreshError;
use serde::Serialize;

/// Options forwarded to the ad-serving SDK's refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOptions {
    /// Rotate the correlator, treating the refreshed impression as a new page view
    pub change_correlator: bool,
}

impl RefreshOptions {
    /// Keep the refreshed impression attributed to the original page view.
    pub const KEEP_CORRELATOR: Self = Self {
        change_correlator: false,
    };
}

/// Page-wide registry of rendered ad slots owned by the ad-serving SDK.
///
/// The scheduler only reads handles and requests refreshes; it never changes
/// which slots are registered.
pub trait SlotRegistry {
    type Handle: Clone + 'static;

    /// Looks up the live handle for `slot_id`, if the slot is rendered on this page.
    fn slot(&self, slot_id: &str) -> Option<Self::Handle>;

    fn refresh(&self, handles: &[Self::Handle], options: RefreshOptions) -> Result<(), AdRefreshError>;
}
