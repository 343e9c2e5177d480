//! In-process publish/subscribe
//!
//! Every UI-facing component owns one [`EventBus`] and talks to the others
//! only through the events it publishes. Dispatch is synchronous and runs on
//! the caller's thread: callbacks execute in registration order and each one
//! completes before the next begins.
//!
//! A panicking callback is not isolated. The panic unwinds out of
//! [`EventBus::publish`] and the callbacks registered after it do not run.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event payload that knows which name it is published under.
pub trait Event: fmt::Debug {
    /// The event name. Subscriptions are keyed by it.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// Name this event is dispatched under
    fn kind(&self) -> Self::Kind;
}

type Callback<E, R> = Box<dyn FnMut(&E) -> R>;

/// Registry mapping event names to ordered callback lists.
///
/// `R` is the callback return type. [`EventBus::publish`] hands back the
/// result of the last callback it ran, which is only meaningful when a single
/// subscriber is expected for that event.
pub struct EventBus<E: Event, R = ()> {
    subscribers: HashMap<E::Kind, Vec<Callback<E, R>>>,
}

impl<E: Event, R> EventBus<E, R> {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Append `callback` to the list for `kind`.
    ///
    /// There is no de-duplication: registering the same logic twice makes it
    /// run twice per publish.
    pub fn subscribe<F>(&mut self, kind: E::Kind, callback: F)
    where
        F: FnMut(&E) -> R + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Dispatch `event` to every callback registered for its kind.
    ///
    /// Returns `None` when nobody is subscribed, otherwise the value returned
    /// by the last callback.
    pub fn publish(&mut self, event: &E) -> Option<R> {
        let callbacks = self.subscribers.get_mut(&event.kind())?;

        tracing::trace!(?event, subscribers = callbacks.len(), "publish");

        let mut last = None;
        for callback in callbacks.iter_mut() {
            last = Some(callback(event));
        }
        last
    }

    /// Number of registrations for `kind`
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

impl<E: Event, R> Default for EventBus<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event, R> fmt::Debug for EventBus<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&E::Kind, usize> = self
            .subscribers
            .iter()
            .map(|(kind, callbacks)| (kind, callbacks.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestKind {
        Ping,
        Pong,
    }

    #[derive(Debug)]
    enum TestEvent {
        Ping(u32),
        Pong,
    }

    impl Event for TestEvent {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            match self {
                Self::Ping(_) => TestKind::Ping,
                Self::Pong => TestKind::Pong,
            }
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let mut bus: EventBus<TestEvent, u32> = EventBus::new();
        assert_eq!(bus.publish(&TestEvent::Ping(1)), None);
        assert_eq!(bus.subscriber_count(TestKind::Ping), 0);
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<TestEvent> = EventBus::new();

        for tag in ["first", "second", "third"] {
            let calls = calls.clone();
            bus.subscribe(TestKind::Ping, move |event| {
                if let TestEvent::Ping(value) = event {
                    calls.borrow_mut().push((tag, *value));
                }
            });
        }

        bus.publish(&TestEvent::Ping(7));

        assert_eq!(
            *calls.borrow(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn test_publish_returns_last_result() {
        let mut bus: EventBus<TestEvent, u32> = EventBus::new();
        bus.subscribe(TestKind::Ping, |_| 1);
        bus.subscribe(TestKind::Ping, |_| 2);

        assert_eq!(bus.publish(&TestEvent::Ping(0)), Some(2));
    }

    #[test]
    fn test_duplicate_registration_runs_twice() {
        let count = Rc::new(RefCell::new(0));
        let mut bus: EventBus<TestEvent> = EventBus::new();

        let callback = {
            let count = count.clone();
            move |_: &TestEvent| *count.borrow_mut() += 1
        };
        bus.subscribe(TestKind::Pong, callback.clone());
        bus.subscribe(TestKind::Pong, callback);

        bus.publish(&TestEvent::Pong);

        assert_eq!(*count.borrow(), 2);
        assert_eq!(bus.subscriber_count(TestKind::Pong), 2);
    }

    #[test]
    fn test_events_only_reach_their_kind() {
        let pings = Rc::new(RefCell::new(0));
        let mut bus: EventBus<TestEvent> = EventBus::new();
        {
            let pings = pings.clone();
            bus.subscribe(TestKind::Ping, move |_| *pings.borrow_mut() += 1);
        }

        assert_eq!(bus.publish(&TestEvent::Pong), None);
        assert_eq!(*pings.borrow(), 0);
    }

    #[test]
    fn test_panicking_callback_stops_dispatch() {
        let reached = Rc::new(RefCell::new(false));
        let mut bus: EventBus<TestEvent> = EventBus::new();
        bus.subscribe(TestKind::Ping, |_| panic!("subscriber failed"));
        {
            let reached = reached.clone();
            bus.subscribe(TestKind::Ping, move |_| *reached.borrow_mut() = true);
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            bus.publish(&TestEvent::Ping(0));
        }));

        assert!(result.is_err());
        assert!(!*reached.borrow());
    }
}
