use gloo_timers::callback::Interval;

/// Arms recurring timers.
///
/// The returned timer keeps firing for as long as it is alive; dropping it
/// cancels the recurrence. Implementations never fire `tick` re-entrantly.
pub trait TimerFactory {
    type Timer: 'static;

    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Self::Timer;
}

/// Browser timers backed by `setInterval`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimers;

impl TimerFactory for BrowserTimers {
    type Timer = Interval;

    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Interval {
        Interval::new(period_ms, tick)
    }
}
