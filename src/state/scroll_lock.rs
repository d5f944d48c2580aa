//! Scroll Lock - Page scrolling suppression while overlays are open
//!
//! Locks are counted. The body carries `overflow: hidden` while at least one
//! guard is alive, and gets its previous inline style back when the last one
//! is dropped. Two stacked modals therefore keep the page locked until both
//! close.

use std::cell::RefCell;

use spark_signals::{signal, Signal};

use crate::engine;
use crate::types::attr;

const LOCKED_STYLE: &str = "overflow: hidden";

thread_local! {
    static LOCK_COUNT: Signal<usize> = signal(0);
    static SAVED_STYLE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Held while page scrolling must stay disabled.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScrollLockGuard {
    _private: (),
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        release();
    }
}

/// Disable page scrolling until the returned guard is dropped.
pub fn acquire() -> ScrollLockGuard {
    let count = lock_count();
    if count == 0 {
        let body = engine::body();
        SAVED_STYLE.with(|s| *s.borrow_mut() = engine::get_attribute(body, attr::STYLE));
        engine::set_attribute(body, attr::STYLE, LOCKED_STYLE);
        log::debug!("page scroll locked");
    }
    LOCK_COUNT.with(|s| s.set(count + 1));
    ScrollLockGuard { _private: () }
}

fn release() {
    let count = lock_count();
    if count == 0 {
        return;
    }
    LOCK_COUNT.with(|s| s.set(count - 1));
    if count == 1 {
        let body = engine::body();
        match SAVED_STYLE.with(|s| s.borrow_mut().take()) {
            Some(style) => engine::set_attribute(body, attr::STYLE, &style),
            None => engine::remove_attribute(body, attr::STYLE),
        }
        log::debug!("page scroll unlocked");
    }
}

/// Number of live guards.
pub fn lock_count() -> usize {
    LOCK_COUNT.with(|s| s.get())
}

pub fn is_scroll_locked() -> bool {
    lock_count() > 0
}

/// Forget all locks without touching the document (for testing)
pub fn reset_scroll_lock() {
    LOCK_COUNT.with(|s| s.set(0));
    SAVED_STYLE.with(|s| *s.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{body, get_attribute, reset_document, set_attribute};

    fn setup() {
        reset_document();
        reset_scroll_lock();
    }

    #[test]
    fn test_guard_locks_and_unlocks() {
        setup();
        let guard = acquire();
        assert!(is_scroll_locked());
        assert_eq!(get_attribute(body(), attr::STYLE).as_deref(), Some(LOCKED_STYLE));

        drop(guard);
        assert!(!is_scroll_locked());
        assert_eq!(get_attribute(body(), attr::STYLE), None);
    }

    #[test]
    fn test_nested_guards_hold_lock() {
        setup();
        let first = acquire();
        let second = acquire();
        assert_eq!(lock_count(), 2);

        drop(first);
        assert!(is_scroll_locked());
        drop(second);
        assert!(!is_scroll_locked());
    }

    #[test]
    fn test_previous_style_restored() {
        setup();
        set_attribute(body(), attr::STYLE, "color: red");
        let guard = acquire();
        drop(guard);
        assert_eq!(get_attribute(body(), attr::STYLE).as_deref(), Some("color: red"));
    }
}
