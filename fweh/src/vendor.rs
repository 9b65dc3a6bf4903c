//! Vendor-specific event plumbing
//!
//! Firmware from different vendors numbers its events differently and may
//! have its own way of enabling them. A [`VendorOps`] supplies the size of
//! the code space, the code map and an optional activation path.

use crate::configuration::VendorConfig;
use crate::errors::FirmwareError;
use crate::event_processing::{EventMap, EventMask};
use crate::host::Interface;
use fweh_common::EventCode;

pub trait VendorOps: Send + Sync {
    fn name(&self) -> &str;

    /// Number of firmware event codes; sizes the handler table and mask.
    fn num_event_codes(&self) -> u32 {
        EventCode::LAST.as_u32()
    }

    /// Canonical to firmware code translations, when the vendor renumbers.
    fn event_map(&self) -> Option<EventMap> {
        None
    }

    /// Vendor activation of firmware events. `Ok` means the vendor has
    /// enabled `mask` itself and the generic `event_msgs` set is skipped.
    fn activate_events(&self, _ifp: &Interface, _mask: &EventMask) -> Result<(), FirmwareError> {
        Err(FirmwareError::Unsupported)
    }
}

/// Identity code map over the canonical code space.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultVendor;

impl VendorOps for DefaultVendor {
    fn name(&self) -> &str {
        "default"
    }
}

/// Vendor described by configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredVendor {
    name: String,
    num_event_codes: u32,
    event_map: Option<EventMap>,
}

impl ConfiguredVendor {
    pub fn new(config: &VendorConfig, num_event_codes: u32) -> Self {
        let event_map = if config.event_map.is_empty() {
            None
        } else {
            Some(EventMap::from_pairs(
                config
                    .event_map
                    .iter()
                    .map(|entry| (EventCode(entry.code), entry.fw_code)),
            ))
        };

        Self {
            name: config.name.clone(),
            num_event_codes,
            event_map,
        }
    }
}

impl VendorOps for ConfiguredVendor {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_event_codes(&self) -> u32 {
        self.num_event_codes
    }

    fn event_map(&self) -> Option<EventMap> {
        self.event_map.clone()
    }
}
