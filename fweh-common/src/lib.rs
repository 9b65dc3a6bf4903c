#![no_std]

#[cfg(test)]
extern crate std;

pub mod codes;
pub mod if_event;
pub mod message;
pub mod packet;

pub use codes::EventCode;
pub use if_event::{IfAction, IfEvent};
pub use message::{DisplayMac, EventMessage, EventMessageBe, MacAddr, ETH_ALEN, IFNAMSIZ};
pub use packet::{is_event_packet, EventPacket, EVENT_PACKET_HLEN};

/// Largest payload the firmware is allowed to attach to an event.
pub const DCMD_MAXLEN: usize = 8192;

/// Number of interface slots the firmware can address.
pub const MAX_IFS: usize = 16;
