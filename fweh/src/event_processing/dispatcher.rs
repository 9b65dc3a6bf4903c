//! Worker side of the engine
//!
//! Drains the queue one item at a time, in arrival order, translating each
//! into host order and handing it to the handler registered for its code.
//! Nothing here propagates an error: bad items are logged, counted and
//! dropped, and the loop moves on to the next one. A panic in a handler or
//! collaborator is caught at the item boundary and counted the same way.

use crate::errors::{DispatchError, DropReason, HandlerError};
use crate::event_processing::{CodeMapper, EventQueue, HandlerRegistry, RawEventItem};
use crate::host::{Interface, InterfaceHost};
use crate::stats::EventStats;
use fweh_common::{DisplayMac, EventCode, EventMessage};
use log::{debug, error, log_enabled, Level};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

pub struct EventDispatcher {
    pub(super) mapper: CodeMapper,
    pub(super) registry: Arc<RwLock<HandlerRegistry>>,
    pub(super) host: Arc<dyn InterfaceHost>,
    pub(super) stats: Arc<EventStats>,
    pub(super) p2pdev_setup_ongoing: Arc<AtomicBool>,
    pub(super) max_interfaces: usize,
    pub(super) payload_dump_len: usize,
}

impl EventDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mapper: CodeMapper,
        registry: Arc<RwLock<HandlerRegistry>>,
        host: Arc<dyn InterfaceHost>,
        stats: Arc<EventStats>,
        p2pdev_setup_ongoing: Arc<AtomicBool>,
        max_interfaces: usize,
        payload_dump_len: usize,
    ) -> Self {
        Self {
            mapper,
            registry,
            host,
            stats,
            p2pdev_setup_ongoing,
            max_interfaces,
            payload_dump_len,
        }
    }

    /// Worker body: sleeps until scheduled, drains, repeats. After
    /// cancellation it drains once more so nothing queued before shutdown
    /// is left behind.
    pub fn run(&self, queue: &EventQueue) {
        while queue.wait_for_work() {
            self.drain(queue);
        }
        self.drain(queue);
    }

    /// Processes every queued item; returns how many were taken.
    pub fn drain(&self, queue: &EventQueue) -> usize {
        let mut processed = 0;
        while let Some(item) = queue.dequeue() {
            self.dispatch_guarded(item);
            processed += 1;
        }
        processed
    }

    fn dispatch_guarded(&self, item: RawEventItem) {
        let fw_code = item.code;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(item))) {
            error!(
                "event {} processing panicked: {}",
                fw_code,
                panic_message(payload.as_ref())
            );
            self.stats.record_handler_failure();
        }
    }

    /// Handles one dequeued item. The item is consumed whatever the outcome.
    pub fn dispatch(&self, item: RawEventItem) {
        let code = self.mapper.firmware_to_canonical(item.code);
        debug!(
            "event {} ({}:{}) ifidx {} bsscfg {} addr {}",
            code.name(),
            code.as_u32(),
            item.code,
            item.emsg.ifidx,
            item.emsg.bsscfgidx,
            DisplayMac(&item.emsg.addr)
        );

        if item.emsg.bsscfgidx as usize >= self.max_interfaces {
            error!("invalid bsscfg index: {}", item.emsg.bsscfgidx);
            self.stats.record_drop(DropReason::InvalidBsscfg);
            return;
        }

        let emsg = item.to_message(code);
        debug!(
            "  version {} flags {} status {} reason {}",
            emsg.version, emsg.flags, emsg.status, emsg.reason
        );
        if log_enabled!(Level::Debug) {
            let shown = item.data.len().min(self.payload_dump_len);
            debug!(
                "event payload, len={}: {}",
                emsg.datalen,
                crate::hex_dump(&item.data[..shown])
            );
        }

        if code == EventCode::IF {
            self.stats.record_interface_event();
            self.handle_if_event(item.code, &emsg, &item.data);
            return;
        }

        let ifp = if code == EventCode::TDLS_PEER_EVENT {
            self.host.interface(0)
        } else {
            self.host.interface(emsg.bsscfgidx)
        };

        match self.call_event_handler(ifp.as_deref(), item.code, &emsg, &item.data) {
            Ok(()) => self.stats.record_dispatched(),
            Err(DispatchError::Handler(err)) => {
                error!("event handler failed ({}): {}", item.code, err);
                self.stats.record_handler_failure();
            }
            Err(DispatchError::Unhandled { .. }) => self.stats.record_unhandled(),
            Err(DispatchError::NoInterface) => {
                self.stats.record_drop(DropReason::MissingInterface)
            }
        }
    }

    /// Invokes the handler in firmware slot `fw_code` for `ifp`.
    pub(super) fn call_event_handler(
        &self,
        ifp: Option<&Interface>,
        fw_code: u32,
        emsg: &EventMessage,
        data: &[u8],
    ) -> Result<(), DispatchError> {
        let Some(ifp) = ifp else {
            error!("no interface object");
            return Err(DispatchError::NoInterface);
        };

        // The registry lock is released before the handler runs.
        let handler = self.registry().lookup(fw_code);
        match handler {
            Some(handler) => {
                panic::catch_unwind(AssertUnwindSafe(|| handler.handle(ifp, emsg, data)))
                    .unwrap_or_else(|payload| {
                        Err(HandlerError::Panicked {
                            message: panic_message(payload.as_ref()).to_string(),
                        })
                    })?;
                Ok(())
            }
            None => {
                let err = DispatchError::Unhandled { fw_code };
                error!("{err}");
                Err(err)
            }
        }
    }

    pub(super) fn registry(&self) -> RwLockReadGuard<'_, HandlerRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
