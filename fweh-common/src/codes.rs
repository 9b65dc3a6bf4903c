//! Canonical firmware event codes.

use core::fmt;

/// Canonical, vendor-independent firmware event code.
///
/// Firmware on different vendor platforms may put a different number on the
/// wire for the same logical event; the engine translates those through its
/// code map before anything is dispatched.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventCode(pub u32);

macro_rules! event_codes {
    ($($name:ident = $value:expr),* $(,)?) => {
        impl EventCode {
            $(pub const $name: EventCode = EventCode($value);)*

            const NAMED: &'static [(EventCode, &'static str)] = &[
                $((EventCode($value), stringify!($name)),)*
            ];
        }
    };
}

event_codes! {
    SET_SSID = 0,
    JOIN = 1,
    START = 2,
    AUTH = 3,
    AUTH_IND = 4,
    DEAUTH = 5,
    DEAUTH_IND = 6,
    ASSOC = 7,
    ASSOC_IND = 8,
    REASSOC = 9,
    REASSOC_IND = 10,
    DISASSOC = 11,
    DISASSOC_IND = 12,
    QUIET_START = 13,
    QUIET_END = 14,
    BEACON_RX = 15,
    LINK = 16,
    MIC_ERROR = 17,
    NDIS_LINK = 18,
    ROAM = 19,
    TXFAIL = 20,
    PMKID_CACHE = 21,
    RETROGRADE_TSF = 22,
    PRUNE = 23,
    AUTOAUTH = 24,
    EAPOL_MSG = 25,
    SCAN_COMPLETE = 26,
    ADDTS_IND = 27,
    DELTS_IND = 28,
    BCNSENT_IND = 29,
    BCNRX_MSG = 30,
    BCNLOST_MSG = 31,
    ROAM_PREP = 32,
    PFN_NET_FOUND = 33,
    PFN_NET_LOST = 34,
    RESET_COMPLETE = 35,
    JOIN_START = 36,
    ROAM_START = 37,
    ASSOC_START = 38,
    IBSS_ASSOC = 39,
    RADIO = 40,
    PSM_WATCHDOG = 41,
    PROBREQ_MSG = 44,
    SCAN_CONFIRM_IND = 45,
    PSK_SUP = 46,
    COUNTRY_CODE_CHANGED = 47,
    EXCEEDED_MEDIUM_TIME = 48,
    ICV_ERROR = 49,
    UNICAST_DECODE_ERROR = 50,
    MULTICAST_DECODE_ERROR = 51,
    TRACE = 52,
    IF = 54,
    P2P_DISC_LISTEN_COMPLETE = 55,
    RSSI = 56,
    EXTLOG_MSG = 58,
    ACTION_FRAME = 59,
    ACTION_FRAME_COMPLETE = 60,
    PRE_ASSOC_IND = 61,
    PRE_REASSOC_IND = 62,
    CHANNEL_ADOPTED = 63,
    AP_STARTED = 64,
    DFS_AP_STOP = 65,
    DFS_AP_RESUME = 66,
    ESCAN_RESULT = 69,
    ACTION_FRAME_OFF_CHAN_COMPLETE = 70,
    PROBERESP_MSG = 71,
    P2P_PROBEREQ_MSG = 72,
    DCS_REQUEST = 73,
    FIFO_CREDIT_MAP = 74,
    ACTION_FRAME_RX = 75,
    TDLS_PEER_EVENT = 92,
    BCMC_CREDIT_SUPPORT = 127,
}

impl EventCode {
    /// Size of the canonical code space when the vendor does not override it.
    pub const LAST: EventCode = EventCode(128);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn as_index(self) -> usize {
        self.0 as usize
    }

    /// Symbolic name of the code, `"unknown"` when it has none.
    pub fn name(self) -> &'static str {
        Self::NAMED
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Reverse of [`EventCode::name`], case-insensitive.
    pub fn from_name(name: &str) -> Option<EventCode> {
        Self::NAMED
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map(|(code, _)| *code)
    }

    /// Every code that carries a symbolic name, in ascending order.
    pub fn named() -> impl Iterator<Item = EventCode> {
        Self::NAMED.iter().map(|(code, _)| *code)
    }
}

impl From<u32> for EventCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl From<EventCode> for u32 {
    fn from(code: EventCode) -> Self {
        code.0
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}
