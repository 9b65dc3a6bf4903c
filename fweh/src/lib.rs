//! Firmware event handling for a wireless NIC driver.
//!
//! The device firmware reports asynchronous happenings (link changes, scan
//! results, interface creation and so on) as specially framed packets on the
//! data path. [`Fweh`] validates those packets, queues them and dispatches
//! them on a worker thread to the handlers other parts of the driver
//! registered, while keeping the firmware's event enable mask in step with
//! what is registered.

use std::fmt::Write;

pub mod cli;
pub mod configuration;
pub mod errors;
pub mod event_processing;
pub mod host;
pub mod replay;
pub mod report;
pub mod stats;
pub mod vendor;

pub use cli::Args;
pub use configuration::Configuration;
pub use errors::{DropReason, FwehError, HandlerError, Result};
pub use event_processing::{handler_fn, EventHandler, Fweh};
pub use host::{FirmwareIovar, Interface, InterfaceHost};
pub use report::StatsReport;
pub use stats::{EventStats, StatsSnapshot};
pub use vendor::{ConfiguredVendor, DefaultVendor, VendorOps};

pub use fweh_common::{EventCode, EventMessage, IfAction, IfEvent};

/// Lowercase hex, one space between bytes.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}
