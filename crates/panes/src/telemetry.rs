//! Records presenter activity so refresh and pane behaviour can be inspected after the fact.

#[cfg(feature = "telemetry")]
use std::collections::VecDeque;

#[cfg(feature = "telemetry")]
use parking_lot::Mutex;
use tasktab_core::model::TaskFilter;

/// Events kept by [`Handle::new`]; older ones are discarded first.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ListRefreshRequested { filter: TaskFilter, forced: bool },
    ListLoaded { filter: TaskFilter, count: usize },
    ListUnavailable(TaskFilter),
    StaleResultDropped(&'static str),
    PaneChanged { from: String, to: String },
    MutationApplied(&'static str),
    MutationFailed { action: &'static str, error: String },
}

#[derive(Debug)]
pub struct Handle {
    #[cfg(feature = "telemetry")]
    events: Mutex<VecDeque<Event>>,
    #[cfg_attr(not(feature = "telemetry"), allow(dead_code))]
    capacity: usize,
}

impl Default for Handle {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Handle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            #[cfg(feature = "telemetry")]
            events: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    pub fn record(&self, event: Event) {
        #[cfg(feature = "telemetry")]
        {
            match &event {
                Event::ListRefreshRequested { filter, forced } => tracing::debug!(
                    filter = filter.as_str(),
                    forced,
                    "presenter telemetry list refresh requested"
                ),
                Event::ListLoaded { filter, count } => tracing::debug!(
                    filter = filter.as_str(),
                    count,
                    "presenter telemetry list loaded"
                ),
                Event::ListUnavailable(filter) => tracing::debug!(
                    filter = filter.as_str(),
                    "presenter telemetry list unavailable"
                ),
                Event::StaleResultDropped(screen) => {
                    tracing::debug!(screen, "presenter telemetry dropped result for inactive view")
                }
                Event::PaneChanged { from, to } => tracing::debug!(
                    from = from.as_str(),
                    to = to.as_str(),
                    "presenter telemetry pane changed"
                ),
                Event::MutationApplied(action) => {
                    tracing::debug!(action, "presenter telemetry mutation applied")
                }
                Event::MutationFailed { action, error } => tracing::debug!(
                    action,
                    error = error.as_str(),
                    "presenter telemetry mutation failed"
                ),
            }
            let mut events = self.events.lock();
            if self.capacity == 0 {
                return;
            }
            if events.len() == self.capacity {
                events.pop_front();
            }
            events.push_back(event);
        }
        #[cfg(not(feature = "telemetry"))]
        {
            let _ = event;
        }
    }

    pub fn is_enabled(&self) -> bool {
        cfg!(feature = "telemetry")
    }

    /// Everything recorded so far; always empty with the `telemetry` feature off.
    pub fn events(&self) -> Vec<Event> {
        #[cfg(feature = "telemetry")]
        {
            self.events.lock().iter().cloned().collect()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            Vec::new()
        }
    }

    /// Take everything recorded so far, leaving the log empty.
    pub fn drain(&self) -> Vec<Event> {
        #[cfg(feature = "telemetry")]
        {
            self.events.lock().drain(..).collect()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            Vec::new()
        }
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events_when_enabled() {
        let handle = Handle::new();
        handle.record(Event::ListLoaded {
            filter: TaskFilter::Active,
            count: 2,
        });
        handle.record(Event::MutationApplied("complete"));
        if handle.is_enabled() {
            assert_eq!(handle.events().len(), 2);
            assert_eq!(
                handle.count(|event| matches!(event, Event::MutationApplied(_))),
                1
            );
        } else {
            assert!(handle.events().is_empty());
        }
    }

    #[test]
    fn log_keeps_only_the_newest_events() {
        let handle = Handle::with_capacity(2);
        handle.record(Event::MutationApplied("complete"));
        handle.record(Event::MutationApplied("activate"));
        handle.record(Event::MutationApplied("delete"));
        if handle.is_enabled() {
            assert_eq!(
                handle.events(),
                vec![
                    Event::MutationApplied("activate"),
                    Event::MutationApplied("delete"),
                ]
            );
            assert_eq!(handle.drain().len(), 2);
        }
        assert!(handle.events().is_empty());
    }
}
