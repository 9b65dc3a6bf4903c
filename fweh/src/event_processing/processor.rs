//! Event engine lifecycle
//!
//! [`Fweh`] ties the pieces together: packets come in through
//! [`Fweh::process_event`] on any thread, get validated and queued, and a
//! single worker thread dispatches them in arrival order. Registration and
//! activation run on the caller's thread under the registry lock.

use crate::configuration::EngineConfig;
use crate::errors::{DropReason, FwehError, Result};
use crate::event_processing::{
    CodeMapper, EventDecoder, EventDispatcher, EventHandler, EventQueue, HandlerRegistry,
};
use crate::host::{FirmwareIovar, Interface, InterfaceHost};
use crate::stats::{EventStats, StatsSnapshot};
use crate::vendor::VendorOps;
use fweh_common::EventCode;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};

/// Firmware variable holding the event enable mask.
pub const EVENT_MSGS_IOVAR: &str = "event_msgs";

const WORKER_NAME: &str = "fweh-worker";

/// Firmware event engine of one attached device.
pub struct Fweh {
    mapper: CodeMapper,
    decoder: EventDecoder,
    registry: Arc<RwLock<HandlerRegistry>>,
    queue: Arc<EventQueue>,
    stats: Arc<EventStats>,
    p2pdev_setup_ongoing: Arc<AtomicBool>,
    vendor: Arc<dyn VendorOps>,
    firmware: Arc<dyn FirmwareIovar>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Fweh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fweh").finish_non_exhaustive()
    }
}

impl Fweh {
    /// Sizes the handler table for the vendor's code space and starts the
    /// worker. The interface event must fall inside that code space.
    pub fn attach(
        config: &EngineConfig,
        vendor: Arc<dyn VendorOps>,
        host: Arc<dyn InterfaceHost>,
        firmware: Arc<dyn FirmwareIovar>,
    ) -> Result<Self> {
        let num_event_codes = vendor.num_event_codes();
        let mapper = CodeMapper::new(vendor.event_map());

        let if_fw_code = mapper.canonical_to_firmware(EventCode::IF);
        if if_fw_code >= num_event_codes {
            return Err(FwehError::InvalidCodeSpace {
                if_fw_code,
                num_event_codes,
            });
        }

        let registry = Arc::new(RwLock::new(HandlerRegistry::new(num_event_codes)?));
        let queue = Arc::new(EventQueue::new());
        let stats = Arc::new(EventStats::new());
        let p2pdev_setup_ongoing = Arc::new(AtomicBool::new(false));

        let dispatcher = EventDispatcher::new(
            mapper.clone(),
            Arc::clone(&registry),
            host,
            Arc::clone(&stats),
            Arc::clone(&p2pdev_setup_ongoing),
            config.max_interfaces,
            config.payload_dump_len,
        );
        let worker_queue = Arc::clone(&queue);
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || dispatcher.run(&worker_queue))
            .map_err(|source| FwehError::WorkerSpawn { source })?;

        info!(
            "firmware event engine attached: vendor {}, {} event codes{}",
            vendor.name(),
            num_event_codes,
            if mapper.is_identity() { "" } else { ", remapped" }
        );

        Ok(Self {
            decoder: EventDecoder::new(num_event_codes, config.max_payload_len, &mapper),
            mapper,
            registry,
            queue,
            stats,
            p2pdev_setup_ongoing,
            vendor,
            firmware,
            worker: Some(worker),
        })
    }

    /// Accepts one raw event packet from the bus. Never fails: a packet that
    /// does not pass validation is dropped and counted.
    pub fn process_event(&self, packet: &[u8]) {
        self.stats.record_received();

        if self.worker.is_none() {
            self.drop_packet(DropReason::Detached);
            return;
        }

        let decoded = self.decoder.decode(packet, &self.registry());
        match decoded {
            Ok(item) => {
                self.stats.record_queued();
                self.queue.enqueue(item);
            }
            Err(reason) => self.drop_packet(reason),
        }
    }

    fn drop_packet(&self, reason: DropReason) {
        match reason {
            DropReason::EventTypeOutOfRange | DropReason::NoHandler => {
                debug!("event dropped: {reason}")
            }
            _ => warn!("event dropped: {reason}"),
        }
        self.stats.record_drop(reason);
    }

    /// Installs `handler` for canonical `code`. Fails if the slot is taken
    /// or the engine is detached.
    pub fn register(&self, code: EventCode, handler: Arc<dyn EventHandler>) -> Result<()> {
        self.ensure_attached()?;
        self.registry_mut().register(&self.mapper, code, handler)
    }

    pub fn unregister(&self, code: EventCode) {
        self.registry_mut().unregister(&self.mapper, code);
    }

    pub fn is_registered(&self, code: EventCode) -> bool {
        self.registry()
            .is_registered(self.mapper.canonical_to_firmware(code))
    }

    pub fn canonical_to_firmware(&self, code: EventCode) -> u32 {
        self.mapper.canonical_to_firmware(code)
    }

    pub fn firmware_to_canonical(&self, fw_code: u32) -> EventCode {
        self.mapper.firmware_to_canonical(fw_code)
    }

    /// Pushes the current enable mask to the firmware through `ifp`. The
    /// vendor gets the first try; the generic variable set only runs when it
    /// declines.
    pub fn activate_events(&self, ifp: &Interface) -> Result<()> {
        self.ensure_attached()?;
        let mask = self.registry().compute_enable_mask(&self.mapper)?;

        match self.vendor.activate_events(ifp, &mask) {
            Ok(()) => {
                debug!("events activated by vendor {}", self.vendor.name());
                return Ok(());
            }
            Err(err) => debug!("vendor activation not used: {err}"),
        }

        self.firmware
            .set_iovar(ifp, EVENT_MSGS_IOVAR, mask.as_bytes())
            .map_err(|source| {
                error!("set {EVENT_MSGS_IOVAR} error ({source})");
                FwehError::Transport {
                    iovar: EVENT_MSGS_IOVAR,
                    source,
                }
            })
    }

    /// Marks whether peer-discovery device setup is in progress; station
    /// placeholders are only accepted as that device while it is.
    pub fn set_peer_setup_ongoing(&self, ongoing: bool) {
        self.p2pdev_setup_ongoing.store(ongoing, Ordering::Release);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Stops the worker and waits for it to drain what was queued. Calling
    /// it again is a no-op.
    pub fn detach(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.queue.cancel();
        if worker.join().is_err() {
            error!("{WORKER_NAME} panicked");
        }

        if !self.queue.is_empty() {
            error!("event queue not empty after detach: {}", self.queue.len());
            while self.queue.dequeue().is_some() {}
        }

        info!("firmware event engine detached");
    }

    fn ensure_attached(&self) -> Result<()> {
        if self.worker.is_none() {
            return Err(FwehError::Detached);
        }
        Ok(())
    }

    fn registry(&self) -> RwLockReadGuard<'_, HandlerRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, HandlerRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Fweh {
    fn drop(&mut self) {
        self.detach();
    }
}
