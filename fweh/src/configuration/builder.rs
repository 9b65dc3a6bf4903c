//! Configuration Builder
//!
//! Provides a builder pattern for constructing Configuration instances
//! from multiple sources with proper validation.

use super::{Configuration, EngineConfig, EventMapEntry, FileConfig, OutputConfig, ReportFormat, RuntimeConfig, VendorConfig};
use crate::errors::{FwehError, Result};
use fweh_common::EventCode;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Builder for creating Configuration instances
///
/// Supports fluent API and multiple sources:
/// - CLI arguments
/// - Configuration files (YAML, JSON, TOML)
/// - Defaults
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    engine: EngineConfig,
    vendor: VendorConfig,
    output: OutputConfig,
    runtime: RuntimeConfig,
}

/// Parses a canonical event code given by name (`ESCAN_RESULT`) or number.
pub fn parse_event_code(value: &str) -> Result<EventCode> {
    let value = value.trim();
    if let Ok(code) = value.parse::<u32>() {
        return Ok(EventCode(code));
    }
    EventCode::from_name(value).ok_or_else(|| FwehError::ConfigError {
        message: format!("Unknown event code: {value}"),
    })
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| FwehError::ConfigError {
        message: format!("Invalid value for {flag}: {value}"),
    })
}

fn parse_map_entry(value: &str) -> Result<EventMapEntry> {
    let (code, fw_code) = value.split_once('=').ok_or_else(|| FwehError::ConfigError {
        message: format!("Invalid event map entry (expected CODE=FW_CODE): {value}"),
    })?;
    Ok(EventMapEntry {
        code: parse_event_code(code)?.as_u32(),
        fw_code: parse_number("--map", fw_code.trim())?,
    })
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure from CLI arguments
    pub fn from_cli_args(mut self, args: &[&str]) -> Result<Self> {
        let mut i = 0;
        while i < args.len() {
            let flag = args[i];
            let takes_value = matches!(
                flag,
                "--num-event-codes"
                    | "--max-interfaces"
                    | "--max-payload-len"
                    | "--payload-dump-len"
                    | "--vendor"
                    | "--map"
                    | "--format"
                    | "-f"
                    | "--duration"
                    | "-d"
            );

            if !takes_value {
                if matches!(flag, "--verbose" | "-v") {
                    self.output.verbose = true;
                }
                i += 1;
                continue;
            }

            let value = *args.get(i + 1).ok_or_else(|| FwehError::ConfigError {
                message: format!("Missing value for {flag}"),
            })?;

            match flag {
                "--num-event-codes" => self.engine.num_event_codes = parse_number(flag, value)?,
                "--max-interfaces" => self.engine.max_interfaces = parse_number(flag, value)?,
                "--max-payload-len" => self.engine.max_payload_len = parse_number(flag, value)?,
                "--payload-dump-len" => self.engine.payload_dump_len = parse_number(flag, value)?,
                "--vendor" => self.vendor.name = value.to_string(),
                "--map" => self.vendor.event_map.push(parse_map_entry(value)?),
                "--format" | "-f" => {
                    self.output.format = match value {
                        "json" => ReportFormat::Json,
                        "markdown" => ReportFormat::Markdown,
                        _ => {
                            return Err(FwehError::ConfigError {
                                message: format!("Invalid format: {value}"),
                            })
                        }
                    }
                }
                _ => {
                    let secs: u64 = parse_number(flag, value)?;
                    self.runtime.duration = Some(Duration::from_secs(secs));
                }
            }
            i += 2;
        }

        Ok(self)
    }

    /// Configure from a YAML, JSON or TOML configuration file
    pub fn from_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| FwehError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        // Auto-detect format by extension or content
        let extension = path.extension().and_then(|s| s.to_str());
        let mut builder = if extension == Some("json") || content.trim_start().starts_with('{') {
            self.from_json_str(&content)?
        } else if extension == Some("toml") {
            self.from_toml_str(&content)?
        } else {
            self.from_yaml_str(&content)?
        };

        builder.runtime.config_file = Some(path.to_path_buf());
        Ok(builder)
    }

    pub fn from_yaml_str(self, yaml: &str) -> Result<Self> {
        let config: FileConfig = serde_yaml::from_str(yaml).map_err(|e| FwehError::ConfigError {
            message: format!("Failed to parse YAML config: {}", e),
        })?;
        Ok(self.with_file_config(config))
    }

    pub fn from_json_str(self, json: &str) -> Result<Self> {
        let config: FileConfig = serde_json::from_str(json).map_err(|e| FwehError::ConfigError {
            message: format!("Failed to parse JSON config: {}", e),
        })?;
        Ok(self.with_file_config(config))
    }

    pub fn from_toml_str(self, text: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(text).map_err(|e| FwehError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })?;
        Ok(self.with_file_config(config))
    }

    fn with_file_config(mut self, config: FileConfig) -> Self {
        self.engine = config.engine;
        self.vendor = config.vendor;
        // A verbose flag given earlier on the command line survives the file.
        self.output = OutputConfig {
            verbose: self.output.verbose || config.output.verbose,
            format: config.output.format,
        };
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Configuration> {
        let config = Configuration {
            engine: self.engine,
            vendor: self.vendor,
            output: self.output,
            runtime: self.runtime,
        };

        config.validate()?;
        Ok(config)
    }
}
