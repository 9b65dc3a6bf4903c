//! Configuration validation logic

use super::Configuration;
use crate::errors::{FwehError, Result};
use fweh_common::EventCode;
use std::collections::HashSet;

/// Interface indices are single bytes on the wire.
const MAX_INTERFACE_LIMIT: usize = 256;

impl Configuration {
    /// Validate engine limits
    pub fn validate_engine(&self) -> Result<()> {
        let engine = &self.engine;

        if engine.num_event_codes == 0 {
            return Err(FwehError::ConfigError {
                message: "num_event_codes must be greater than 0".to_string(),
            });
        }

        if engine.max_interfaces == 0 || engine.max_interfaces > MAX_INTERFACE_LIMIT {
            return Err(FwehError::ConfigError {
                message: format!("max_interfaces must be between 1 and {MAX_INTERFACE_LIMIT}"),
            });
        }

        if engine.max_payload_len == 0 {
            return Err(FwehError::ConfigError {
                message: "max_payload_len must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Validate the vendor event map against the code space
    pub fn validate_event_map(&self) -> Result<()> {
        let num_event_codes = self.engine.num_event_codes;
        let mut seen = HashSet::new();

        for entry in &self.vendor.event_map {
            if !seen.insert(entry.code) {
                return Err(FwehError::ConfigError {
                    message: format!("duplicate event map entry for code {}", entry.code),
                });
            }
            if entry.fw_code >= num_event_codes {
                return Err(FwehError::ConfigError {
                    message: format!(
                        "firmware code {} for {} is outside the {} event codes",
                        entry.fw_code,
                        EventCode(entry.code),
                        num_event_codes
                    ),
                });
            }
        }

        let if_fw_code = self
            .vendor
            .event_map
            .iter()
            .find(|entry| entry.code == EventCode::IF.as_u32())
            .map_or(EventCode::IF.as_u32(), |entry| entry.fw_code);
        if if_fw_code >= num_event_codes {
            return Err(FwehError::ConfigError {
                message: format!(
                    "interface event code {if_fw_code} is outside the {num_event_codes} event codes"
                ),
            });
        }

        Ok(())
    }
}
