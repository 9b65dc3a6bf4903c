//! Envelope of a firmware event packet.
//!
//! ```text
//! | ethernet (14) | vendor header (10) | event message (48) | payload |
//! ```

use crate::message::{EventMessageBe, MacAddr, ETH_ALEN};

/// Ethertype used by the firmware for link-control frames.
pub const ETH_P_LINK_CTL: u16 = 0x886c;
/// Vendor OUI carried in the vendor header.
pub const BRCM_OUI: [u8; 3] = [0x00, 0x10, 0x18];
/// Vendor header subtype for event frames.
pub const BCMILCP_SUBTYPE_VENDOR_LONG: u16 = 32769;
/// Vendor header user subtype for event frames.
pub const BCMILCP_BCM_SUBTYPE_EVENT: u16 = 1;

pub const ETH_HLEN: usize = 14;
pub const VENDOR_HLEN: usize = 10;
/// Offset of the event message inside a packet.
pub const EVENT_MSG_OFFSET: usize = ETH_HLEN + VENDOR_HLEN;
/// Size of everything ahead of the payload.
pub const EVENT_PACKET_HLEN: usize = EVENT_MSG_OFFSET + EventMessageBe::SIZE;

/// Borrowed view over the fixed-size part of an event packet.
#[derive(Clone, Copy, Debug)]
pub struct EventPacket<'a> {
    bytes: &'a [u8],
}

impl<'a> EventPacket<'a> {
    /// Wraps `bytes` if it is long enough to hold every fixed header.
    pub fn new(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() < EVENT_PACKET_HLEN {
            return None;
        }
        Some(Self { bytes })
    }

    pub fn eth_dest(&self) -> MacAddr {
        let mut addr = [0u8; ETH_ALEN];
        addr.copy_from_slice(&self.bytes[0..ETH_ALEN]);
        addr
    }

    pub fn eth_source(&self) -> MacAddr {
        let mut addr = [0u8; ETH_ALEN];
        addr.copy_from_slice(&self.bytes[ETH_ALEN..2 * ETH_ALEN]);
        addr
    }

    pub fn ethertype(&self) -> u16 {
        u16::from_be_bytes([self.bytes[12], self.bytes[13]])
    }

    pub fn vendor_subtype(&self) -> u16 {
        u16::from_be_bytes([self.bytes[14], self.bytes[15]])
    }

    pub fn vendor_oui(&self) -> [u8; 3] {
        [self.bytes[19], self.bytes[20], self.bytes[21]]
    }

    pub fn vendor_usr_subtype(&self) -> u16 {
        u16::from_be_bytes([self.bytes[22], self.bytes[23]])
    }

    /// Copy of the event message header, still in wire order.
    pub fn message(&self) -> EventMessageBe {
        EventMessageBe::from_bytes(&self.bytes[EVENT_MSG_OFFSET..]).unwrap_or_default()
    }

    /// Everything after the fixed headers; may be longer than the declared
    /// payload length.
    pub fn trailing(&self) -> &'a [u8] {
        &self.bytes[EVENT_PACKET_HLEN..]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// True when `bytes` carries the ethertype, OUI and user subtype of a
/// firmware event frame.
pub fn is_event_packet(bytes: &[u8]) -> bool {
    match EventPacket::new(bytes) {
        Some(packet) => {
            packet.ethertype() == ETH_P_LINK_CTL
                && packet.vendor_oui() == BRCM_OUI
                && packet.vendor_usr_subtype() == BCMILCP_BCM_SUBTYPE_EVENT
        }
        None => false,
    }
}

/// Writes the ethernet and vendor headers for an event frame into `out`.
pub fn write_envelope(out: &mut [u8; EVENT_MSG_OFFSET], dest: MacAddr, source: MacAddr) {
    out[0..6].copy_from_slice(&dest);
    out[6..12].copy_from_slice(&source);
    out[12..14].copy_from_slice(&ETH_P_LINK_CTL.to_be_bytes());
    out[14..16].copy_from_slice(&BCMILCP_SUBTYPE_VENDOR_LONG.to_be_bytes());
    out[16..18].copy_from_slice(&((VENDOR_HLEN + EventMessageBe::SIZE) as u16).to_be_bytes());
    out[18] = 0;
    out[19..22].copy_from_slice(&BRCM_OUI);
    out[22..24].copy_from_slice(&BCMILCP_BCM_SUBTYPE_EVENT.to_be_bytes());
}
