/// Configuration constants for the ad refresh library
pub struct Config;

impl Config {
    /// Key under the page settings object that holds the slot configuration blob
    pub const SETTINGS_KEY: &'static str = "sgc_ad_refresh";

    /// Library attached to responses that pass the attachment gate
    pub const LIBRARY: &'static str = "sgc_ad_refresh/sgc_ad_refresh";

    /// The one status value that enables a slot or the module
    pub const ENABLED_MARKER: &'static str = "1";

    pub const MILLIS_PER_SECOND: u32 = 1_000;

    /// Longest period `setInterval` honours; larger delays wrap to zero
    pub const MAX_PERIOD_MS: u32 = i32::MAX.unsigned_abs();

    /// Skip ticks while the document is hidden
    pub const PAUSE_WHEN_HIDDEN: bool = true;

    /// Log skipped slots and armed timers to the console
    pub const DEBUG_LOGGING: bool = false;
}
