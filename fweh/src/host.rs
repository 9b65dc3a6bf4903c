//! Driver collaborators the event engine calls out to.
//!
//! The engine owns no interface objects and never talks to the bus. It is
//! handed these traits at attach time and calls them from the worker, one
//! event at a time.

use crate::errors::{FirmwareError, HostError};
use fweh_common::{DisplayMac, MacAddr};
use std::fmt;
use std::sync::Arc;

/// Network interface as seen by event handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub bsscfgidx: u8,
    pub ifidx: u8,
    pub name: String,
    pub addr: MacAddr,
    /// Placeholder for the peer-discovery device; it has no net device.
    pub is_p2pdev: bool,
}

impl Interface {
    pub fn new(bsscfgidx: u8, ifidx: u8, name: impl Into<String>, addr: MacAddr) -> Self {
        Self {
            bsscfgidx,
            ifidx,
            name: name.into(),
            addr,
            is_p2pdev: false,
        }
    }

    pub fn p2p_device(mut self) -> Self {
        self.is_p2pdev = true;
        self
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ifidx {} bsscfg {} {})",
            self.name,
            self.ifidx,
            self.bsscfgidx,
            DisplayMac(&self.addr)
        )
    }
}

/// Interface table and lifecycle operations owned by the rest of the driver.
pub trait InterfaceHost: Send + Sync {
    /// Interface currently occupying `bsscfgidx`, if any.
    fn interface(&self, bsscfgidx: u8) -> Option<Arc<Interface>>;

    /// Creates the interface object for a firmware ADD event.
    fn add_interface(
        &self,
        bsscfgidx: u8,
        ifidx: u8,
        is_p2pdev: bool,
        name: &str,
        addr: MacAddr,
    ) -> Result<Arc<Interface>, HostError>;

    /// Protocol layer setup for a freshly created interface.
    fn proto_add_if(&self, ifp: &Interface);

    /// Protocol layer reset after the firmware changed the interface.
    fn proto_reset_if(&self, ifp: &Interface);

    /// Brings the interface online as a network device.
    fn net_attach(&self, ifp: &Interface, locked: bool) -> Result<(), HostError>;

    /// Tears the interface down.
    fn remove_interface(&self, ifp: &Interface, locked: bool);

    /// True when some configuration path is waiting for the deletion of
    /// `ifp` and will tear it down itself.
    fn is_delete_waiter_armed(&self, ifp: &Interface) -> bool;
}

/// Firmware variable channel used to push settings to the device.
pub trait FirmwareIovar: Send + Sync {
    fn set_iovar(&self, ifp: &Interface, name: &str, data: &[u8]) -> Result<(), FirmwareError>;
}
