//! Page entry points exported to JavaScript.
//!
//! The page calls [`attach_from_page`] (or [`attach`] with an explicit blob)
//! once the document is ready. Repeated calls, such as behaviors re-running for
//! partial page updates, do not arm a second set of timers.

use crate::config::Config;
use crate::models::error::AdRefreshError;
use crate::services::googletag::{GoogleTag, property};
use crate::services::scheduler::{RefreshSchedule, RefreshScheduler};
use crate::utils::diagnostics::{ConsoleDiagnostics, Diagnostics};
use crate::utils::interval::BrowserTimers;
use crate::utils::visibility::DocumentVisibility;
use gloo_timers::callback::Interval;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::js_sys::{self, JSON};

thread_local! {
    static ATTACHED: Cell<bool> = const { Cell::new(false) };
}

/// Claim on the page's single set of refresh timers, released on drop.
#[derive(Debug)]
struct AttachGuard(());

impl AttachGuard {
    fn claim() -> Option<Self> {
        if ATTACHED.replace(true) {
            None
        } else {
            Some(Self(()))
        }
    }
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        ATTACHED.set(false);
    }
}

struct Attached {
    schedule: RefreshSchedule<Interval>,
    _guard: AttachGuard,
}

/// Handle to the refresh timers of the current page view.
///
/// `detach()` and `free()` both stop the timers and allow a later attach.
#[wasm_bindgen]
pub struct AdRefresh {
    attached: Option<Attached>,
}

#[wasm_bindgen]
impl AdRefresh {
    /// Slot ids with an armed refresh timer.
    pub fn slots(&self) -> Vec<String> {
        self.attached
            .iter()
            .flat_map(|attached| attached.schedule.armed_slots())
            .map(str::to_string)
            .collect()
    }

    /// Stops all timers so a later navigation can attach again.
    pub fn detach(&mut self) {
        if let Some(attached) = self.attached.take() {
            let cancelled = attached.schedule.cancel();
            ConsoleDiagnostics::default().debug(&format!("Cancelled {cancelled} ad refresh timer(s)"));
        }
    }
}

/// Schedules refreshes from the serialized slot settings.
///
/// Returns `None` when the library is already attached on this page.
#[wasm_bindgen]
pub fn attach(settings: &str) -> Option<AdRefresh> {
    let diagnostics: Rc<dyn Diagnostics> = Rc::new(ConsoleDiagnostics::default());

    let Some(guard) = AttachGuard::claim() else {
        diagnostics.debug("Ad refresh already attached");
        return None;
    };

    let scheduler = RefreshScheduler::new(
        Rc::new(GoogleTag::new()),
        Rc::new(DocumentVisibility::new()),
        BrowserTimers,
        diagnostics,
    );

    Some(AdRefresh {
        attached: Some(Attached {
            schedule: scheduler.schedule_blob(settings),
            _guard: guard,
        }),
    })
}

/// Schedules refreshes from `drupalSettings.sgc_ad_refresh`.
#[wasm_bindgen(js_name = attachFromPage)]
pub fn attach_from_page() -> Option<AdRefresh> {
    match page_settings() {
        Ok(blob) => attach(&blob),
        Err(e) => {
            ConsoleDiagnostics::default().warn(&e.to_string());
            None
        }
    }
}

/// Reads the settings blob from the page, serializing it if the page already
/// holds it as an object.
fn page_settings() -> Result<String, AdRefreshError> {
    let global: JsValue = js_sys::global().into();

    let settings = property(&global, "drupalSettings")
        .and_then(|settings| property(&settings, Config::SETTINGS_KEY))
        .ok_or_else(|| {
            AdRefreshError::SettingsMissing(format!("drupalSettings.{}", Config::SETTINGS_KEY))
        })?;

    if let Some(blob) = settings.as_string() {
        return Ok(blob);
    }

    JSON::stringify(&settings)
        .map(String::from)
        .map_err(crate::services::googletag::script_error)
}
