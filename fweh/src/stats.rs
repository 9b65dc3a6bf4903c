//! Event engine counters

use crate::errors::DropReason;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

const DROP_REASONS: usize = 10;

/// Counters shared between the ingestion path and the worker.
#[derive(Debug, Default)]
pub struct EventStats {
    received: AtomicU64,
    queued: AtomicU64,
    dispatched: AtomicU64,
    unhandled: AtomicU64,
    handler_failures: AtomicU64,
    interface_events: AtomicU64,
    suppressed_interface_events: AtomicU64,
    dropped: [AtomicU64; DROP_REASONS],
}

impl EventStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unhandled(&self) {
        self.unhandled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interface_event(&self) {
        self.interface_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed_interface_event(&self) {
        self.suppressed_interface_events
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self, reason: DropReason) {
        self.dropped[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self, reason: DropReason) -> u64 {
        self.dropped[reason.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let dropped = DropReason::all()
            .into_iter()
            .map(|reason| (reason.as_str().to_string(), self.dropped(reason)))
            .filter(|(_, count)| *count > 0)
            .collect();

        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            interface_events: self.interface_events.load(Ordering::Relaxed),
            suppressed_interface_events: self.suppressed_interface_events.load(Ordering::Relaxed),
            dropped,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub received: u64,
    pub queued: u64,
    pub dispatched: u64,
    pub unhandled: u64,
    pub handler_failures: u64,
    pub interface_events: u64,
    pub suppressed_interface_events: u64,
    /// Drop counts keyed by [`DropReason::as_str`]; zero counts are omitted.
    pub dropped: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }
}
