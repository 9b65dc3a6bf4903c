//! Unified Configuration System
//!
//! Combines defaults, CLI-style arguments and configuration files into a
//! single validated configuration for the event engine.
//!
//! # Basic Usage
//!
//! ```rust
//! use fweh::configuration::Configuration;
//!
//! let config = Configuration::builder()
//!     .from_cli_args(&["--num-event-codes", "160", "--verbose"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.engine.num_event_codes, 160);
//! assert!(config.is_verbose());
//! ```

pub mod builder;
pub mod types;
pub mod validation;

pub use builder::{parse_event_code, ConfigurationBuilder};
pub use types::*;

use crate::errors::Result;
use crate::vendor::ConfiguredVendor;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    pub engine: EngineConfig,
    pub vendor: VendorConfig,
    pub output: OutputConfig,
    pub runtime: RuntimeConfig,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<()> {
        self.validate_engine()?;
        self.validate_event_map()?;
        Ok(())
    }

    /// Vendor operations described by the `vendor` section.
    pub fn vendor_ops(&self) -> ConfiguredVendor {
        ConfiguredVendor::new(&self.vendor, self.engine.num_event_codes)
    }

    pub fn is_verbose(&self) -> bool {
        self.output.verbose
    }

    pub fn report_format(&self) -> ReportFormat {
        self.output.format
    }

    pub fn duration(&self) -> Option<Duration> {
        self.runtime.duration
    }
}
