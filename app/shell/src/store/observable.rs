//! Observable value container with equality-gated change notification.
//!
//! An [`Observable`] holds one value and a list of subscriber callbacks.
//! Setting a value that compares equal to the current one notifies nobody;
//! setting a different value notifies every live subscriber synchronously,
//! in registration order, before the call returns. Subscribing replays the
//! current value into the callback immediately.
//!
//! # Locking
//!
//! Value and subscriber list live behind one `parking_lot::Mutex`. The lock
//! is released before callbacks run, so a callback may call `get`, `set`, or
//! `subscribe` on the same observable without deadlocking. The closure given
//! to [`Observable::update`] runs under the lock and must not touch the
//! observable itself.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    next_token: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// A shared observable value.
///
/// Cloning the handle is cheap and refers to the same underlying value.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<T> Observable<T>
where T: Clone + PartialEq + Send + 'static
{
    /// Creates an observable with the given initial value.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: initial,
                next_token: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Returns a clone of the current value. No side effects.
    #[must_use]
    pub fn get(&self) -> T { self.inner.lock().value.clone() }

    /// Replaces the value, notifying subscribers iff it changed.
    pub fn set(&self, next: T) {
        let (callbacks, value) = {
            let mut inner = self.inner.lock();
            if inner.value == next {
                return;
            }
            inner.value = next.clone();
            (snapshot_callbacks(&inner), next)
        };
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Replaces the value with one derived from the current value.
    ///
    /// The read and the write happen under one lock acquisition, so no other
    /// mutation can interleave between them. `derive` must not call back
    /// into this observable.
    pub fn update(&self, derive: impl FnOnce(&T) -> T) {
        let (callbacks, value) = {
            let mut inner = self.inner.lock();
            let next = derive(&inner.value);
            if inner.value == next {
                return;
            }
            inner.value = next.clone();
            (snapshot_callbacks(&inner), next)
        };
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Registers a subscriber.
    ///
    /// The callback is invoked immediately with the current value, then on
    /// every subsequent change until the returned [`Subscription`] is
    /// revoked. Dropping the subscription without revoking it leaves the
    /// callback registered for the life of the observable.
    #[must_use = "dropping the subscription handle makes it impossible to unsubscribe"]
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let callback: Callback<T> = Arc::new(callback);
        let (token, current) = {
            let mut inner = self.inner.lock();
            let token = inner.next_token;
            inner.next_token += 1;
            inner.subscribers.push((token, Arc::clone(&callback)));
            (token, inner.value.clone())
        };
        callback(&current);

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.lock().subscribers.retain(|(t, _)| *t != token);
            }
        })
    }

    /// Number of live subscribers. Mostly useful for diagnostics and tests.
    #[must_use]
    pub fn subscriber_count(&self) -> usize { self.inner.lock().subscribers.len() }
}

fn snapshot_callbacks<T>(inner: &Inner<T>) -> Vec<Callback<T>> {
    inner.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
}

impl<T: std::fmt::Debug + Clone + PartialEq + Send + 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Revocation handle for a registered subscriber.
///
/// Type-erased so that subscriptions to observables of different value types
/// can be collected in one place.
pub struct Subscription {
    revoke: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    fn new(revoke: impl Fn() + Send + Sync + 'static) -> Self { Self { revoke: Box::new(revoke) } }

    /// Removes the callback from the observable. Calling this more than once
    /// is a no-op.
    pub fn unsubscribe(&self) { (self.revoke)() }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn subscribe_replays_current_value() {
        let value = Observable::new(7);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let _sub = value.subscribe(move |v| seen_clone.lock().push(*v));

        assert_eq!(*seen.lock(), vec![7]);
    }

    #[test]
    fn set_with_equal_value_notifies_nobody() {
        let value = Observable::new("idle".to_string());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let _sub = value.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        value.set("idle".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        value.set("busy".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn set_notifies_every_subscriber_exactly_once() {
        let value = Observable::new(0);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = Arc::clone(&first);
        let second_clone = Arc::clone(&second);
        let _a = value.subscribe(move |_| {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let _b = value.subscribe(move |_| {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        value.set(1);

        // One replay each plus one change each.
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn notification_happens_before_set_returns() {
        let value = Observable::new(0);
        let last_seen = Arc::new(AtomicUsize::new(0));
        let last_seen_clone = Arc::clone(&last_seen);

        let _sub = value.subscribe(move |v| {
            #[allow(clippy::cast_sign_loss)]
            last_seen_clone.store(*v as usize, Ordering::SeqCst);
        });

        value.set(42);
        assert_eq!(last_seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn update_derives_from_current_value() {
        let value = Observable::new(10);
        value.update(|v| v + 5);
        assert_eq!(value.get(), 15);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let value = Observable::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let sub = value.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        sub.unsubscribe();
        sub.unsubscribe();

        value.set(1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(value.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_removes_only_its_own_callback() {
        let value = Observable::new(0);
        let kept = Arc::new(AtomicUsize::new(0));
        let kept_clone = Arc::clone(&kept);

        let dropped = value.subscribe(|_| {});
        let _kept = value.subscribe(move |_| {
            kept_clone.fetch_add(1, Ordering::SeqCst);
        });

        dropped.unsubscribe();
        value.set(3);

        assert_eq!(value.subscriber_count(), 1);
        assert_eq!(kept.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn callback_may_reenter_the_observable() {
        let value = Observable::new(1usize);
        let observed = Arc::new(AtomicUsize::new(0));
        let observed_clone = Arc::clone(&observed);
        let value_clone = value.clone();

        let _sub = value.subscribe(move |_| {
            // Reading back from inside a notification must not deadlock.
            observed_clone.store(value_clone.get(), Ordering::SeqCst);
        });

        value.set(9);
        assert_eq!(observed.load(Ordering::SeqCst), 9);
    }
}
