//! Canonical <-> firmware event code translation.

use fweh_common::EventCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMapEntry {
    pub code: EventCode,
    pub fw_code: u32,
}

/// Ordered vendor remapping table. Lookups scan in order, first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMap {
    items: Vec<CodeMapEntry>,
}

impl EventMap {
    pub fn new(items: Vec<CodeMapEntry>) -> Self {
        Self { items }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (EventCode, u32)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(code, fw_code)| CodeMapEntry { code, fw_code })
                .collect(),
        )
    }

    pub fn items(&self) -> &[CodeMapEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Translates between canonical and firmware codes, falling back to the
/// identity when no map is installed or nothing matches.
#[derive(Debug, Clone, Default)]
pub struct CodeMapper {
    map: Option<EventMap>,
}

impl CodeMapper {
    pub fn new(map: Option<EventMap>) -> Self {
        Self { map }
    }

    pub fn identity() -> Self {
        Self { map: None }
    }

    pub fn canonical_to_firmware(&self, code: EventCode) -> u32 {
        self.map
            .as_ref()
            .and_then(|map| map.items.iter().find(|item| item.code == code))
            .map_or(code.as_u32(), |item| item.fw_code)
    }

    pub fn firmware_to_canonical(&self, fw_code: u32) -> EventCode {
        self.map
            .as_ref()
            .and_then(|map| map.items.iter().find(|item| item.fw_code == fw_code))
            .map_or(EventCode(fw_code), |item| item.code)
    }

    pub fn is_identity(&self) -> bool {
        self.map.as_ref().map_or(true, EventMap::is_empty)
    }
}
