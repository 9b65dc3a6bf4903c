//! Payload of the interface-lifecycle event.

/// Action carried by an interface event.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IfAction {
    Add = 1,
    Del = 2,
    Change = 3,
}

impl IfAction {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Add),
            2 => Some(Self::Del),
            3 => Some(Self::Change),
            _ => None,
        }
    }
}

/// Interface event without a real network interface behind it.
pub const IF_FLAG_NOIF: u8 = 0x01;

pub const IF_ROLE_STA: u8 = 0;
pub const IF_ROLE_AP: u8 = 1;
pub const IF_ROLE_WDS: u8 = 2;
pub const IF_ROLE_P2P_GO: u8 = 3;
pub const IF_ROLE_P2P_CLIENT: u8 = 4;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfEvent {
    pub ifidx: u8,
    pub action: u8,
    pub flags: u8,
    pub bsscfgidx: u8,
    pub role: u8,
}

impl IfEvent {
    pub const SIZE: usize = 5;

    pub const fn new() -> Self {
        Self {
            ifidx: 0,
            action: 0,
            flags: 0,
            bsscfgidx: 0,
            role: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match *bytes.get(..Self::SIZE)? {
            [ifidx, action, flags, bsscfgidx, role] => Some(Self {
                ifidx,
                action,
                flags,
                bsscfgidx,
                role,
            }),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [self.ifidx, self.action, self.flags, self.bsscfgidx, self.role]
    }

    pub fn action(&self) -> Option<IfAction> {
        IfAction::from_raw(self.action)
    }

    pub fn is_noif(&self) -> bool {
        self.flags & IF_FLAG_NOIF != 0
    }

    /// Whether this placeholder announces the peer-discovery device
    /// interface. Older firmware reports it with the station role, which is
    /// only trusted while a peer-discovery setup is in progress.
    pub fn is_p2p_device(&self, p2pdev_setup_ongoing: bool) -> bool {
        self.is_noif()
            && (self.role == IF_ROLE_P2P_CLIENT
                || (self.role == IF_ROLE_STA && p2pdev_setup_ongoing))
    }

    pub fn with_ifidx(mut self, ifidx: u8) -> Self {
        self.ifidx = ifidx;
        self
    }

    pub fn with_action(mut self, action: IfAction) -> Self {
        self.action = action as u8;
        self
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_bsscfgidx(mut self, bsscfgidx: u8) -> Self {
        self.bsscfgidx = bsscfgidx;
        self
    }

    pub fn with_role(mut self, role: u8) -> Self {
        self.role = role;
        self
    }
}
