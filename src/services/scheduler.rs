use crate::models::error::AdRefreshError;
use crate::models::refresh_config::{RefreshConfig, RefreshInterval, SlotSettings};
use crate::services::registry::{RefreshOptions, SlotRegistry};
use crate::utils::diagnostics::Diagnostics;
use crate::utils::interval::TimerFactory;
use crate::utils::visibility::PageVisibility;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Why a configured slot got no timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Status is not the enabled value
    Disabled,
    /// Configured but not rendered on this page
    NotRendered,
    /// Interval missing, non-positive or out of range
    InvalidInterval,
}

impl SkipReason {
    pub fn description(self) -> &'static str {
        match self {
            SkipReason::Disabled => "refresh disabled",
            SkipReason::NotRendered => "slot not rendered on this page",
            SkipReason::InvalidInterval => "invalid refresh interval",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Per-slot tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks that issued a refresh call which returned normally
    pub refreshed: u64,
    /// Ticks skipped because the page was hidden
    pub suppressed: u64,
    /// Ticks whose refresh call failed
    pub failed: u64,
}

impl TickStats {
    pub fn ticks(&self) -> u64 {
        self.refreshed + self.suppressed + self.failed
    }
}

struct ArmedSlot<Timer> {
    interval: RefreshInterval,
    stats: Rc<Cell<TickStats>>,
    // Dropping the timer cancels it.
    _timer: Timer,
}

/// The timers armed for one page view.
///
/// Dropping the schedule, or calling [`RefreshSchedule::cancel`], stops every
/// timer it owns.
pub struct RefreshSchedule<Timer> {
    armed: BTreeMap<String, ArmedSlot<Timer>>,
    skipped: Vec<(String, SkipReason)>,
}

impl<Timer> RefreshSchedule<Timer> {
    pub fn empty() -> Self {
        Self {
            armed: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    fn arm(&mut self, slot_id: &str, interval: RefreshInterval, stats: Rc<Cell<TickStats>>, timer: Timer) {
        // At most one timer per slot: a replaced entry drops, and so cancels, its timer.
        self.armed.insert(
            slot_id.to_string(),
            ArmedSlot {
                interval,
                stats,
                _timer: timer,
            },
        );
    }

    fn skip(&mut self, slot_id: &str, reason: SkipReason) {
        self.skipped.push((slot_id.to_string(), reason));
    }

    pub fn armed_slots(&self) -> impl Iterator<Item = &str> {
        self.armed.keys().map(String::as_str)
    }

    pub fn is_armed(&self, slot_id: &str) -> bool {
        self.armed.contains_key(slot_id)
    }

    pub fn interval(&self, slot_id: &str) -> Option<RefreshInterval> {
        self.armed.get(slot_id).map(|slot| slot.interval)
    }

    pub fn period_ms(&self, slot_id: &str) -> Option<u32> {
        self.interval(slot_id).map(|interval| interval.period_ms())
    }

    pub fn stats(&self, slot_id: &str) -> Option<TickStats> {
        self.armed.get(slot_id).map(|slot| slot.stats.get())
    }

    pub fn skipped(&self) -> &[(String, SkipReason)] {
        &self.skipped
    }

    pub fn skip_reason(&self, slot_id: &str) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|(slot, _)| slot == slot_id)
            .map(|(_, reason)| *reason)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Stops every timer, returning how many were running.
    pub fn cancel(mut self) -> usize {
        let cancelled = self.armed.len();
        self.armed.clear();
        cancelled
    }
}

impl<Timer> Default for RefreshSchedule<Timer> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Timer> std::fmt::Debug for RefreshSchedule<Timer> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshSchedule")
            .field("armed", &self.armed.keys().collect::<Vec<_>>())
            .field("skipped", &self.skipped)
            .finish()
    }
}

/// Turns refresh settings plus the live slot registry into recurring refreshes.
pub struct RefreshScheduler<R, T> {
    registry: Rc<R>,
    visibility: Rc<dyn PageVisibility>,
    timers: T,
    diagnostics: Rc<dyn Diagnostics>,
}

impl<R, T> RefreshScheduler<R, T>
where
    R: SlotRegistry + 'static,
    T: TimerFactory,
{
    pub fn new(
        registry: Rc<R>,
        visibility: Rc<dyn PageVisibility>,
        timers: T,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> Self {
        Self {
            registry,
            visibility,
            timers,
            diagnostics,
        }
    }

    /// Parses `blob` and schedules it.
    ///
    /// A malformed blob is reported once and nothing is scheduled: no slot
    /// refreshes rather than a partial set.
    pub fn schedule_blob(&self, blob: &str) -> RefreshSchedule<T::Timer> {
        match RefreshConfig::parse(blob) {
            Ok(config) => self.schedule(&config),
            Err(e) => {
                self.diagnostics
                    .error(&format!("Error parsing SGC Ad Refresh settings: {e}"));
                RefreshSchedule::empty()
            }
        }
    }

    /// Arms one timer per enabled slot that the registry can resolve right now.
    ///
    /// Slots that appear in the registry later are not picked up.
    pub fn schedule(&self, config: &RefreshConfig) -> RefreshSchedule<T::Timer> {
        let mut schedule = RefreshSchedule::empty();

        for (slot_id, settings) in config.iter() {
            match self.resolve(slot_id, settings) {
                Ok((handle, interval)) => {
                    let stats = Rc::new(Cell::new(TickStats::default()));
                    let tick = self.tick(slot_id, handle, Rc::clone(&stats));
                    let timer = self.timers.every(interval.period_ms(), tick);

                    self.diagnostics.debug(&format!(
                        "Refreshing ad slot '{slot_id}' every {}s",
                        interval.seconds()
                    ));
                    schedule.arm(slot_id, interval, stats, timer);
                }
                Err(reason) => {
                    self.diagnostics
                        .debug(&format!("Skipping ad slot '{slot_id}': {reason}"));
                    schedule.skip(slot_id, reason);
                }
            }
        }

        schedule
    }

    fn resolve(
        &self,
        slot_id: &str,
        settings: &SlotSettings,
    ) -> Result<(R::Handle, RefreshInterval), SkipReason> {
        if !settings.status().is_enabled() {
            return Err(SkipReason::Disabled);
        }

        let handle = self.registry.slot(slot_id).ok_or(SkipReason::NotRendered)?;
        let interval = settings.interval().ok_or(SkipReason::InvalidInterval)?;

        Ok((handle, interval))
    }

    /// Builds the tick action for one slot.
    ///
    /// A hidden page turns the tick into a no-op; nothing is caught up later.
    /// Refresh failures are logged and stay confined to the tick.
    fn tick(&self, slot_id: &str, handle: R::Handle, stats: Rc<Cell<TickStats>>) -> Box<dyn FnMut()> {
        let registry = Rc::clone(&self.registry);
        let visibility = Rc::clone(&self.visibility);
        let diagnostics = Rc::clone(&self.diagnostics);
        let slot_id = slot_id.to_string();

        Box::new(move || {
            let mut current = stats.get();

            if visibility.is_hidden() {
                current.suppressed += 1;
            } else {
                match registry.refresh(std::slice::from_ref(&handle), RefreshOptions::KEEP_CORRELATOR) {
                    Ok(()) => current.refreshed += 1,
                    Err(e) => {
                        current.failed += 1;
                        let error = AdRefreshError::RefreshInvocation {
                            slot: slot_id.clone(),
                            message: e.to_string(),
                        };
                        diagnostics.error(&error.to_string());
                    }
                }
            }

            stats.set(current);
        })
    }
}
