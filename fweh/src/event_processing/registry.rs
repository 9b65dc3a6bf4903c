//! Handler registry and firmware event mask.

use crate::errors::{FwehError, HandlerError, Result};
use crate::event_processing::CodeMapper;
use crate::host::Interface;
use fweh_common::{EventCode, EventMessage};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Receiver of one kind of firmware event.
pub trait EventHandler: Send + Sync {
    fn handle(
        &self,
        ifp: &Interface,
        event: &EventMessage,
        data: &[u8],
    ) -> std::result::Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&Interface, &EventMessage, &[u8]) -> std::result::Result<(), HandlerError> + Send + Sync,
{
    fn handle(
        &self,
        ifp: &Interface,
        event: &EventMessage,
        data: &[u8],
    ) -> std::result::Result<(), HandlerError> {
        self(ifp, event, data)
    }
}

/// Wraps a closure as a shareable handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(&Interface, &EventMessage, &[u8]) -> std::result::Result<(), HandlerError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// One optional handler per firmware code, sized once at attach.
pub struct HandlerRegistry {
    slots: Vec<Option<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new(num_event_codes: u32) -> Result<Self> {
        let len = num_event_codes as usize;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| FwehError::OutOfMemory {
                what: "event handler table",
            })?;
        slots.resize_with(len, || None);
        Ok(Self { slots })
    }

    pub fn num_event_codes(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Installs `handler` in the slot `code` maps to. An occupied slot is
    /// left untouched.
    pub fn register(
        &mut self,
        mapper: &CodeMapper,
        code: EventCode,
        handler: Arc<dyn EventHandler>,
    ) -> Result<()> {
        let fw_code = mapper.canonical_to_firmware(code);
        let num_event_codes = self.num_event_codes();
        let slot = self
            .slots
            .get_mut(fw_code as usize)
            .ok_or(FwehError::InvalidEventCode {
                code,
                fw_code,
                num_event_codes,
            })?;

        if slot.is_some() {
            return Err(FwehError::AlreadyRegistered { code });
        }

        *slot = Some(handler);
        debug!("event handler registered for {}", code.name());
        Ok(())
    }

    /// Clears the slot `code` maps to, whether or not it was occupied.
    pub fn unregister(&mut self, mapper: &CodeMapper, code: EventCode) {
        debug!("event handler cleared for {}", code.name());
        let fw_code = mapper.canonical_to_firmware(code);
        if let Some(slot) = self.slots.get_mut(fw_code as usize) {
            *slot = None;
        }
    }

    /// Handler in firmware slot `fw_code`, without any translation.
    pub fn lookup(&self, fw_code: u32) -> Option<Arc<dyn EventHandler>> {
        self.slots.get(fw_code as usize).and_then(|slot| slot.clone())
    }

    pub fn is_registered(&self, fw_code: u32) -> bool {
        matches!(self.slots.get(fw_code as usize), Some(Some(_)))
    }

    pub fn registered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Mask of every occupied slot plus the interface event.
    pub fn compute_enable_mask(&self, mapper: &CodeMapper) -> Result<EventMask> {
        let mut mask = EventMask::new(self.num_event_codes())?;

        for (fw_code, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                let fw_code = fw_code as u32;
                debug!(
                    "enable event {}",
                    mapper.firmware_to_canonical(fw_code).name()
                );
                mask.set(fw_code);
            }
        }

        debug!("enable event IF");
        mask.set(mapper.canonical_to_firmware(EventCode::IF));
        Ok(mask)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("num_event_codes", &self.num_event_codes())
            .field("registered", &self.registered_count())
            .finish()
    }
}

/// Bit per firmware code, least significant bit first within each byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMask {
    num_event_codes: u32,
    bits: Vec<u8>,
}

impl EventMask {
    pub fn new(num_event_codes: u32) -> Result<Self> {
        let len = (num_event_codes as usize).div_ceil(8);
        let mut bits = Vec::new();
        bits.try_reserve_exact(len)
            .map_err(|_| FwehError::OutOfMemory { what: "event mask" })?;
        bits.resize(len, 0);
        Ok(Self {
            num_event_codes,
            bits,
        })
    }

    /// Sets the bit for `fw_code`; codes outside the mask are ignored.
    pub fn set(&mut self, fw_code: u32) {
        if fw_code < self.num_event_codes {
            self.bits[(fw_code / 8) as usize] |= 1 << (fw_code % 8);
        }
    }

    pub fn is_set(&self, fw_code: u32) -> bool {
        fw_code < self.num_event_codes && self.bits[(fw_code / 8) as usize] & (1 << (fw_code % 8)) != 0
    }

    /// Firmware codes whose bit is set, ascending.
    pub fn iter_set(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.num_event_codes).filter(|&code| self.is_set(code))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn num_event_codes(&self) -> u32 {
        self.num_event_codes
    }
}
