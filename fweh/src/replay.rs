//! Offline replay of captured firmware event packets
//!
//! Capture files hold one packet per line as hex (whitespace and `:` between
//! bytes are ignored); `#` starts a comment. The replay attaches an engine to
//! an in-memory interface table, feeds it every packet and returns the
//! statistics once the worker has drained.

use crate::configuration::Configuration;
use crate::errors::{FirmwareError, HostError};
use crate::event_processing::{handler_fn, EventHandler, Fweh};
use crate::host::{FirmwareIovar, Interface, InterfaceHost};
use crate::report::StatsReport;
use crate::stats::StatsSnapshot;
use crate::vendor::VendorOps;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use fweh_common::{is_event_packet, DisplayMac, EventCode, MacAddr};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;

pub fn decode_hex(line: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = line
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }

    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair)?;
            u8::from_str_radix(text, 16).with_context(|| format!("invalid hex byte {text:?}"))
        })
        .collect()
}

/// Packets in capture order.
pub fn parse_capture(text: &str) -> Result<Vec<Vec<u8>>> {
    let mut packets = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let packet = decode_hex(line).with_context(|| format!("capture line {}", lineno + 1))?;
        packets.push(packet);
    }
    Ok(packets)
}

/// Interface table kept in memory; lifecycle calls are only logged.
pub struct LoggingHost {
    interfaces: Mutex<BTreeMap<u8, Arc<Interface>>>,
}

impl LoggingHost {
    /// Host with the primary interface `wlan0` at bsscfg 0.
    pub fn new(primary_addr: MacAddr) -> Self {
        let primary = Arc::new(Interface::new(0, 0, "wlan0", primary_addr));
        Self {
            interfaces: Mutex::new(BTreeMap::from([(0, primary)])),
        }
    }

    pub fn primary(&self) -> Option<Arc<Interface>> {
        self.interface(0)
    }

    pub fn interface_names(&self) -> Vec<String> {
        self.table().values().map(|ifp| ifp.name.clone()).collect()
    }

    fn table(&self) -> MutexGuard<'_, BTreeMap<u8, Arc<Interface>>> {
        self.interfaces.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InterfaceHost for LoggingHost {
    fn interface(&self, bsscfgidx: u8) -> Option<Arc<Interface>> {
        self.table().get(&bsscfgidx).cloned()
    }

    fn add_interface(
        &self,
        bsscfgidx: u8,
        ifidx: u8,
        is_p2pdev: bool,
        name: &str,
        addr: MacAddr,
    ) -> std::result::Result<Arc<Interface>, HostError> {
        let mut ifp = Interface::new(bsscfgidx, ifidx, name, addr);
        ifp.is_p2pdev = is_p2pdev;
        let ifp = Arc::new(ifp);
        info!("interface added: {ifp}");
        self.table().insert(bsscfgidx, Arc::clone(&ifp));
        Ok(ifp)
    }

    fn proto_add_if(&self, ifp: &Interface) {
        debug!("protocol attach {}", ifp.name);
    }

    fn proto_reset_if(&self, ifp: &Interface) {
        info!("protocol reset {}", ifp.name);
    }

    fn net_attach(&self, ifp: &Interface, _locked: bool) -> std::result::Result<(), HostError> {
        info!("net attach {}", ifp.name);
        Ok(())
    }

    fn remove_interface(&self, ifp: &Interface, _locked: bool) {
        info!("interface removed: {ifp}");
        self.table().remove(&ifp.bsscfgidx);
    }

    fn is_delete_waiter_armed(&self, _ifp: &Interface) -> bool {
        false
    }
}

/// Accepts every variable set and logs it.
#[derive(Debug, Default)]
pub struct LoggingFirmware;

impl FirmwareIovar for LoggingFirmware {
    fn set_iovar(
        &self,
        ifp: &Interface,
        name: &str,
        data: &[u8],
    ) -> std::result::Result<(), FirmwareError> {
        info!("{}: set {} ({} bytes) {}", ifp.name, name, data.len(), crate::hex_dump(data));
        Ok(())
    }
}

/// Handler that logs each event it receives.
pub fn logging_handler() -> Arc<dyn EventHandler> {
    handler_fn(|ifp, emsg, data| {
        info!(
            "{}: {} status {} reason {} from {} ({} bytes)",
            ifp.name,
            emsg.event_code.name(),
            emsg.status,
            emsg.reason,
            DisplayMac(&emsg.addr),
            data.len()
        );
        Ok(())
    })
}

/// Every named code except the interface event.
pub fn default_replay_events() -> Vec<EventCode> {
    EventCode::named()
        .filter(|&code| code != EventCode::IF)
        .collect()
}

/// Holds the engine for the length of a replay. However the replay ends,
/// the worker is joined off the async runtime threads.
struct BlockingDetach(Option<Fweh>);

impl BlockingDetach {
    fn engine(&self) -> Result<&Fweh> {
        self.0.as_ref().context("event engine already detached")
    }

    /// Drains and stops the engine, then returns its final counters.
    async fn detach(mut self) -> Result<StatsSnapshot> {
        let mut engine = self.0.take().context("event engine already detached")?;
        let stats = tokio::task::spawn_blocking(move || {
            engine.detach();
            engine.stats()
        })
        .await?;
        Ok(stats)
    }
}

impl Drop for BlockingDetach {
    fn drop(&mut self) {
        let Some(mut engine) = self.0.take() else {
            return;
        };
        warn!("replay interrupted, detaching event engine");
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || engine.detach());
            }
            Err(_) => engine.detach(),
        }
    }
}

/// Replays `packets` through a fresh engine and reports what happened.
pub async fn replay_packets(
    config: &Configuration,
    packets: Vec<Vec<u8>>,
    events: &[EventCode],
) -> Result<StatsReport> {
    let started = Utc::now();
    let vendor = config.vendor_ops();
    let vendor_name = vendor.name().to_string();
    let host = Arc::new(LoggingHost::new([0x02, 0, 0, 0, 0, 0x01]));

    let attached = BlockingDetach(Some(Fweh::attach(
        &config.engine,
        Arc::new(vendor),
        Arc::clone(&host) as Arc<dyn InterfaceHost>,
        Arc::new(LoggingFirmware),
    )?));
    let engine = attached.engine()?;

    for &code in events {
        if let Err(err) = engine.register(code, logging_handler()) {
            warn!("not listening for {code}: {err}");
        }
    }
    if let Some(primary) = host.primary() {
        engine.activate_events(&primary)?;
    }

    let mut skipped = 0usize;
    for packet in &packets {
        if !is_event_packet(packet) {
            skipped += 1;
            continue;
        }
        engine.process_event(packet);
        tokio::task::yield_now().await;
    }
    if skipped > 0 {
        warn!("{skipped} packets were not firmware events");
    }

    let stats = attached.detach().await?;

    info!("interfaces after replay: {:?}", host.interface_names());
    Ok(StatsReport::new(
        &vendor_name,
        started,
        packets.len() as u64,
        stats,
    ))
}

pub async fn replay_file(
    config: &Configuration,
    capture: &Path,
    events: &[EventCode],
) -> Result<StatsReport> {
    let text = tokio::fs::read_to_string(capture)
        .await
        .with_context(|| format!("reading capture {}", capture.display()))?;
    let packets = parse_capture(&text)?;
    info!("replaying {} packets from {}", packets.len(), capture.display());
    replay_packets(config, packets, events).await
}
