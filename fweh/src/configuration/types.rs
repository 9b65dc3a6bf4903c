//! Configuration type definitions
//!
//! Every section deserializes with defaults for missing fields, so a config
//! file only needs to name what it changes.

use fweh_common::{EventCode, DCMD_MAXLEN, MAX_IFS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Maximum payload bytes shown in a debug hex dump.
pub const DEFAULT_PAYLOAD_DUMP_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the firmware event code space.
    pub num_event_codes: u32,
    pub max_interfaces: usize,
    pub max_payload_len: usize,
    pub payload_dump_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_event_codes: EventCode::LAST.as_u32(),
            max_interfaces: MAX_IFS,
            max_payload_len: DCMD_MAXLEN,
            payload_dump_len: DEFAULT_PAYLOAD_DUMP_LEN,
        }
    }
}

/// One canonical to firmware code translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMapEntry {
    pub code: u32,
    pub fw_code: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    pub name: String,
    /// Ordered; the first entry for a code wins.
    pub event_map: Vec<EventMapEntry>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            event_map: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub verbose: bool,
    pub format: ReportFormat,
}

/// Settings that only exist for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub config_file: Option<PathBuf>,
    pub duration: Option<Duration>,
}

/// Shape of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: EngineConfig,
    pub vendor: VendorConfig,
    pub output: OutputConfig,
}
