//! Firmware event message header in wire and host byte order.

use crate::codes::EventCode;

pub const ETH_ALEN: usize = 6;
pub const IFNAMSIZ: usize = 16;

pub type MacAddr = [u8; ETH_ALEN];

/// Event message header exactly as the firmware sends it.
///
/// Every multi-byte field is kept as big-endian bytes so the struct has no
/// alignment requirement and can be copied straight out of a packet buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventMessageBe {
    pub version: [u8; 2],
    pub flags: [u8; 2],
    pub event_type: [u8; 4],
    pub status: [u8; 4],
    pub reason: [u8; 4],
    pub auth_type: [u8; 4],
    pub datalen: [u8; 4],
    pub addr: MacAddr,
    pub ifname: [u8; IFNAMSIZ],
    pub ifidx: u8,
    pub bsscfgidx: u8,
}

impl EventMessageBe {
    /// Wire size of the header.
    pub const SIZE: usize = 48;

    pub const fn new() -> Self {
        Self {
            version: [0; 2],
            flags: [0; 2],
            event_type: [0; 4],
            status: [0; 4],
            reason: [0; 4],
            auth_type: [0; 4],
            datalen: [0; 4],
            addr: [0; ETH_ALEN],
            ifname: [0; IFNAMSIZ],
            ifidx: 0,
            bsscfgidx: 0,
        }
    }

    /// Copies the header out of the first [`EventMessageBe::SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; Self::SIZE] = bytes.get(..Self::SIZE)?.try_into().ok()?;
        let mut msg = Self::new();

        msg.version.copy_from_slice(&bytes[0..2]);
        msg.flags.copy_from_slice(&bytes[2..4]);
        msg.event_type.copy_from_slice(&bytes[4..8]);
        msg.status.copy_from_slice(&bytes[8..12]);
        msg.reason.copy_from_slice(&bytes[12..16]);
        msg.auth_type.copy_from_slice(&bytes[16..20]);
        msg.datalen.copy_from_slice(&bytes[20..24]);
        msg.addr.copy_from_slice(&bytes[24..30]);
        msg.ifname.copy_from_slice(&bytes[30..46]);
        msg.ifidx = bytes[46];
        msg.bsscfgidx = bytes[47];

        Some(msg)
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&self.version);
        out[2..4].copy_from_slice(&self.flags);
        out[4..8].copy_from_slice(&self.event_type);
        out[8..12].copy_from_slice(&self.status);
        out[12..16].copy_from_slice(&self.reason);
        out[16..20].copy_from_slice(&self.auth_type);
        out[20..24].copy_from_slice(&self.datalen);
        out[24..30].copy_from_slice(&self.addr);
        out[30..46].copy_from_slice(&self.ifname);
        out[46] = self.ifidx;
        out[47] = self.bsscfgidx;
        out
    }

    pub fn event_type(&self) -> u32 {
        u32::from_be_bytes(self.event_type)
    }

    pub fn datalen(&self) -> u32 {
        u32::from_be_bytes(self.datalen)
    }

    /// Converts to host order. `code` is the canonical code the caller
    /// already translated from [`EventMessageBe::event_type`].
    pub fn to_host(&self, code: EventCode) -> EventMessage {
        EventMessage {
            version: u16::from_be_bytes(self.version),
            flags: u16::from_be_bytes(self.flags),
            event_code: code,
            status: u32::from_be_bytes(self.status),
            reason: u32::from_be_bytes(self.reason),
            auth_type: u32::from_be_bytes(self.auth_type),
            datalen: u32::from_be_bytes(self.datalen),
            addr: self.addr,
            ifname: self.ifname,
            ifidx: self.ifidx,
            bsscfgidx: self.bsscfgidx,
        }
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version.to_be_bytes();
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags.to_be_bytes();
        self
    }

    pub fn with_event_type(mut self, event_type: u32) -> Self {
        self.event_type = event_type.to_be_bytes();
        self
    }

    pub fn with_status(mut self, status: u32) -> Self {
        self.status = status.to_be_bytes();
        self
    }

    pub fn with_reason(mut self, reason: u32) -> Self {
        self.reason = reason.to_be_bytes();
        self
    }

    pub fn with_auth_type(mut self, auth_type: u32) -> Self {
        self.auth_type = auth_type.to_be_bytes();
        self
    }

    pub fn with_datalen(mut self, datalen: u32) -> Self {
        self.datalen = datalen.to_be_bytes();
        self
    }

    pub fn with_addr(mut self, addr: MacAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_ifname(mut self, ifname: &[u8]) -> Self {
        let copy_len = ifname.len().min(self.ifname.len());
        self.ifname = [0; IFNAMSIZ];
        self.ifname[..copy_len].copy_from_slice(&ifname[..copy_len]);
        self
    }

    pub fn with_ifidx(mut self, ifidx: u8) -> Self {
        self.ifidx = ifidx;
        self
    }

    pub fn with_bsscfgidx(mut self, bsscfgidx: u8) -> Self {
        self.bsscfgidx = bsscfgidx;
        self
    }
}

impl Default for EventMessageBe {
    fn default() -> Self {
        Self::new()
    }
}

/// Event message header converted to host byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventMessage {
    pub version: u16,
    pub flags: u16,
    pub event_code: EventCode,
    pub status: u32,
    pub reason: u32,
    pub auth_type: u32,
    pub datalen: u32,
    pub addr: MacAddr,
    pub ifname: [u8; IFNAMSIZ],
    pub ifidx: u8,
    pub bsscfgidx: u8,
}

impl EventMessage {
    pub fn ifname_as_str(&self) -> &str {
        let end = self
            .ifname
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.ifname.len());
        core::str::from_utf8(&self.ifname[..end]).unwrap_or("<invalid>")
    }
}

/// Formats a hardware address as `aa:bb:cc:dd:ee:ff`.
pub struct DisplayMac<'a>(pub &'a MacAddr);

impl core::fmt::Display for DisplayMac<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = *self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
