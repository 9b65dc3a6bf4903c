//! Single-producer, single-consumer event queue
//!
//! Producers append and wake the worker; they never wait on anything but the
//! short list lock. The worker sleeps on [`EventQueue::wait_for_work`] and
//! drains with [`EventQueue::dequeue`] until it comes back empty.

use crate::event_processing::RawEventItem;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct SignalState {
    scheduled: bool,
    cancelled: bool,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    items: Mutex<VecDeque<RawEventItem>>,
    signal: Mutex<SignalState>,
    wake: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` and schedules the worker. Scheduling an already
    /// scheduled worker is a no-op.
    pub fn enqueue(&self, item: RawEventItem) {
        self.items().push_back(item);
        self.schedule();
    }

    /// Removes the oldest item; never blocks on an empty queue.
    pub fn dequeue(&self) -> Option<RawEventItem> {
        self.items().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn schedule(&self) {
        let mut state = self.signal();
        if !state.scheduled {
            state.scheduled = true;
            self.wake.notify_one();
        }
    }

    /// Stops future scheduling. The worker runs one more drain pass.
    pub fn cancel(&self) {
        let mut state = self.signal();
        state.cancelled = true;
        self.wake.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal().cancelled
    }

    /// Blocks until the worker is scheduled or cancelled and consumes the
    /// schedule. Returns `false` once cancelled; the caller drains one last
    /// time and exits.
    pub fn wait_for_work(&self) -> bool {
        let mut state = self.signal();
        while !state.scheduled && !state.cancelled {
            state = self.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.scheduled = false;
        !state.cancelled
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<RawEventItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn signal(&self) -> MutexGuard<'_, SignalState> {
        self.signal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use fweh_common::EventMessageBe;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn item(code: u32) -> RawEventItem {
        RawEventItem {
            code,
            ifidx: 0,
            ifaddr: [0; 6],
            emsg: EventMessageBe::new().with_event_type(code),
            data: Bytes::new(),
        }
    }

    mod fifo {
        use super::*;

        #[test]
        fn should_return_none_when_empty() {
            let queue = EventQueue::new();
            assert!(queue.dequeue().is_none());
            assert!(queue.is_empty());
        }

        #[test]
        fn should_dequeue_in_arrival_order() {
            let queue = EventQueue::new();
            for code in [3, 1, 2] {
                queue.enqueue(item(code));
            }

            let order: Vec<u32> = std::iter::from_fn(|| queue.dequeue())
                .map(|item| item.code)
                .collect();

            assert_eq!(order, vec![3, 1, 2]);
            assert_eq!(queue.len(), 0);
        }
    }

    mod signalling {
        use super::*;

        #[test]
        fn should_coalesce_repeated_wakes() {
            let queue = EventQueue::new();
            queue.enqueue(item(1));
            queue.enqueue(item(2));

            assert!(queue.wait_for_work());
            assert!(!queue.signal().scheduled);
            assert_eq!(queue.len(), 2);
        }

        #[test]
        fn should_report_cancellation() {
            let queue = EventQueue::new();
            queue.cancel();

            assert!(!queue.wait_for_work());
            assert!(queue.is_cancelled());
        }

        #[test]
        fn should_wake_blocked_worker() {
            let queue = Arc::new(EventQueue::new());
            let worker_queue = Arc::clone(&queue);

            let worker = thread::spawn(move || {
                let mut seen = Vec::new();
                while worker_queue.wait_for_work() {
                    while let Some(item) = worker_queue.dequeue() {
                        seen.push(item.code);
                    }
                }
                while let Some(item) = worker_queue.dequeue() {
                    seen.push(item.code);
                }
                seen
            });

            queue.enqueue(item(5));
            thread::sleep(Duration::from_millis(10));
            queue.enqueue(item(6));
            queue.cancel();

            assert_eq!(worker.join().unwrap(), vec![5, 6]);
        }
    }
}
