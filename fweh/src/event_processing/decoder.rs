//! Validation of raw firmware event packets
//!
//! Firmware input is untrusted. Every check here turns a bad packet into a
//! [`DropReason`]; nothing is ever queued from a packet that failed one.

use crate::errors::DropReason;
use crate::event_processing::{CodeMapper, HandlerRegistry};
use bytes::Bytes;
use fweh_common::{EventCode, EventMessage, EventMessageBe, EventPacket, MacAddr, EVENT_PACKET_HLEN};

/// Event as queued for the worker, header still in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventItem {
    /// Firmware event code, already range-checked.
    pub code: u32,
    pub ifidx: u8,
    /// Destination address of the carrying ethernet frame.
    pub ifaddr: MacAddr,
    pub emsg: EventMessageBe,
    pub data: Bytes,
}

impl RawEventItem {
    /// Host-order header carrying the canonical `code`.
    pub fn to_message(&self, code: EventCode) -> EventMessage {
        self.emsg.to_host(code)
    }

    pub fn datalen(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventDecoder {
    num_event_codes: u32,
    max_payload_len: usize,
    if_fw_code: u32,
}

impl EventDecoder {
    pub fn new(num_event_codes: u32, max_payload_len: usize, mapper: &CodeMapper) -> Self {
        Self {
            num_event_codes,
            max_payload_len,
            if_fw_code: mapper.canonical_to_firmware(EventCode::IF),
        }
    }

    /// Checks `packet` and copies it into an owned queue item.
    pub fn decode(
        &self,
        packet: &[u8],
        registry: &HandlerRegistry,
    ) -> Result<RawEventItem, DropReason> {
        let view = EventPacket::new(packet).ok_or(DropReason::Truncated)?;
        let emsg = view.message();
        let fw_code = emsg.event_type();
        let datalen = emsg.datalen() as usize;

        if fw_code >= self.num_event_codes {
            return Err(DropReason::EventTypeOutOfRange);
        }

        if fw_code != self.if_fw_code && !registry.is_registered(fw_code) {
            return Err(DropReason::NoHandler);
        }

        if datalen > self.max_payload_len {
            return Err(DropReason::PayloadTooLarge);
        }

        if datalen > packet.len() - EVENT_PACKET_HLEN {
            return Err(DropReason::PayloadOverrun);
        }

        let mut data = Vec::new();
        data.try_reserve_exact(datalen)
            .map_err(|_| DropReason::OutOfMemory)?;
        data.extend_from_slice(&view.trailing()[..datalen]);

        Ok(RawEventItem {
            code: fw_code,
            ifidx: emsg.ifidx,
            ifaddr: view.eth_dest(),
            emsg,
            data: Bytes::from(data),
        })
    }
}
