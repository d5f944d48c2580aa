//! Timer Queue - Deferred and periodic callbacks on a host-driven clock
//!
//! Widgets never sleep. They schedule callbacks here and the host advances
//! the clock (`advance(ms)`), which fires everything that came due in order.
//! Tests drive time deterministically the same way.
//!
//! # Pattern
//!
//! - One queue per thread, ordered by due time then by scheduling order
//! - Intervals reschedule themselves before their callback runs
//! - `TimerScope` groups a widget's timers and cancels them on drop
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::timers::{self, TimerScope};
//!
//! let scope = TimerScope::new();
//! scope.timeout(100, || focus_first_field());
//!
//! timers::advance(100); // fires
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

// =============================================================================
// TYPES
// =============================================================================

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct TimerEntry {
    due: u64,
    interval: Option<u64>,
    callback: Rc<dyn Fn()>,
}

struct TimerQueue {
    next_id: u64,
    entries: BTreeMap<TimerId, TimerEntry>,
}

impl TimerQueue {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    fn schedule(&mut self, due: u64, interval: Option<u64>, callback: Rc<dyn Fn()>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, TimerEntry { due, interval, callback });
        id
    }

    /// Earliest entry due at or before `limit`.
    fn next_due(&self, limit: u64) -> Option<(TimerId, u64)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.due <= limit)
            .min_by_key(|(id, entry)| (entry.due, **id))
            .map(|(id, entry)| (*id, entry.due))
    }
}

thread_local! {
    static QUEUE: RefCell<TimerQueue> = RefCell::new(TimerQueue::new());
    static NOW: Signal<u64> = signal(0);
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Current clock value in milliseconds.
pub fn now() -> u64 {
    NOW.with(|s| s.get())
}

/// Run `callback` once after `delay_ms`.
pub fn set_timeout(delay_ms: u64, callback: impl Fn() + 'static) -> TimerId {
    let due = now() + delay_ms;
    QUEUE.with(|q| q.borrow_mut().schedule(due, None, Rc::new(callback)))
}

/// Run `callback` every `period_ms`.
///
/// A zero period would never let the clock move; it returns `None` and
/// schedules nothing.
pub fn set_interval(period_ms: u64, callback: impl Fn() + 'static) -> Option<TimerId> {
    if period_ms == 0 {
        log::warn!("ignoring interval with zero period");
        return None;
    }
    let due = now() + period_ms;
    Some(QUEUE.with(|q| q.borrow_mut().schedule(due, Some(period_ms), Rc::new(callback))))
}

/// Cancel a timer. Unknown or already-fired ids are ignored.
pub fn clear_timer(id: TimerId) {
    QUEUE.with(|q| {
        q.borrow_mut().entries.remove(&id);
    });
}

/// Whether a timer is still scheduled.
pub fn is_pending(id: TimerId) -> bool {
    QUEUE.with(|q| q.borrow().entries.contains_key(&id))
}

/// Number of scheduled timers.
pub fn pending_count() -> usize {
    QUEUE.with(|q| q.borrow().entries.len())
}

/// Move the clock forward, firing every timer that comes due.
///
/// Callbacks may schedule or cancel timers; new timers due within the
/// window fire in the same call.
pub fn advance(ms: u64) {
    let target = now() + ms;

    loop {
        let fired = QUEUE.with(|q| {
            let mut queue = q.borrow_mut();
            let (id, due) = queue.next_due(target)?;
            let interval = queue.entries.get(&id)?.interval;
            let callback = match interval {
                Some(period) => {
                    let entry = queue.entries.get_mut(&id)?;
                    entry.due = due + period;
                    entry.callback.clone()
                }
                None => queue.entries.remove(&id)?.callback,
            };
            Some((due, callback))
        });

        let Some((due, callback)) = fired else {
            break;
        };
        NOW.with(|s| s.set(due));
        callback();
    }

    NOW.with(|s| s.set(target));
}

/// Drop every timer and rewind the clock (for testing)
pub fn reset_timers() {
    QUEUE.with(|q| *q.borrow_mut() = TimerQueue::new());
    NOW.with(|s| s.set(0));
}

// =============================================================================
// TIMER SCOPE
// =============================================================================

/// Owner of a group of timers, cancelled together.
///
/// Every widget keeps one; disposing the widget drops the scope and nothing
/// it scheduled can fire afterwards.
#[derive(Default)]
pub struct TimerScope {
    ids: RefCell<Vec<TimerId>>,
    cancelled: Cell<bool>,
}

impl TimerScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&self, id: TimerId) -> TimerId {
        let mut ids = self.ids.borrow_mut();
        ids.retain(|&existing| is_pending(existing));
        ids.push(id);
        id
    }

    /// Schedule a one-shot timer owned by this scope.
    pub fn timeout(&self, delay_ms: u64, callback: impl Fn() + 'static) -> Option<TimerId> {
        if self.cancelled.get() {
            return None;
        }
        Some(self.track(set_timeout(delay_ms, callback)))
    }

    /// Schedule a periodic timer owned by this scope.
    pub fn interval(&self, period_ms: u64, callback: impl Fn() + 'static) -> Option<TimerId> {
        if self.cancelled.get() {
            return None;
        }
        set_interval(period_ms, callback).map(|id| self.track(id))
    }

    /// Cancel one timer from this scope.
    pub fn cancel(&self, id: TimerId) {
        clear_timer(id);
        self.ids.borrow_mut().retain(|&existing| existing != id);
    }

    /// Cancel everything this scope scheduled and refuse new timers.
    pub fn cancel_all(&self) {
        self.cancelled.set(true);
        for id in self.ids.borrow_mut().drain(..) {
            clear_timer(id);
        }
    }

    /// Number of this scope's timers still scheduled.
    pub fn active_count(&self) -> usize {
        self.ids.borrow().iter().filter(|&&id| is_pending(id)).count()
    }
}

impl Drop for TimerScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset_timers();
    }

    #[test]
    fn test_timeout_fires_once_when_due() {
        setup();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        set_timeout(100, move || c.set(c.get() + 1));

        advance(99);
        assert_eq!(count.get(), 0);
        advance(1);
        assert_eq!(count.get(), 1);
        advance(1000);
        assert_eq!(count.get(), 1);
        assert_eq!(pending_count(), 0);
    }

    #[test]
    fn test_interval_repeats_and_clears() {
        setup();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = set_interval(50, move || c.set(c.get() + 1)).unwrap();

        advance(175);
        assert_eq!(count.get(), 3);
        clear_timer(id);
        advance(500);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        setup();
        assert!(set_interval(0, || {}).is_none());
        assert_eq!(pending_count(), 0);
    }

    #[test]
    fn test_fires_in_due_order() {
        setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        set_timeout(30, move || a.borrow_mut().push("late"));
        set_timeout(10, move || b.borrow_mut().push("early"));
        set_timeout(10, move || c.borrow_mut().push("early-second"));

        advance(30);
        assert_eq!(*log.borrow(), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_clock_reflects_due_time_inside_callback() {
        setup();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        set_timeout(40, move || s.set(now()));
        advance(100);
        assert_eq!(seen.get(), 40);
        assert_eq!(now(), 100);
    }

    #[test]
    fn test_callback_may_schedule_more() {
        setup();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        set_timeout(10, move || {
            let inner = c.clone();
            set_timeout(10, move || inner.set(inner.get() + 1));
        });
        advance(25);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_scope_cancels_on_drop() {
        setup();
        let count = Rc::new(Cell::new(0));
        {
            let scope = TimerScope::new();
            let c = count.clone();
            scope.timeout(10, move || c.set(c.get() + 1));
            let c = count.clone();
            scope.interval(10, move || c.set(c.get() + 1));
            assert_eq!(scope.active_count(), 2);
        }
        advance(100);
        assert_eq!(count.get(), 0);
        assert_eq!(pending_count(), 0);
    }

    #[test]
    fn test_cancelled_scope_refuses_new_timers() {
        setup();
        let scope = TimerScope::new();
        scope.cancel_all();
        assert!(scope.timeout(10, || {}).is_none());
        assert_eq!(pending_count(), 0);
    }
}
