use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::configuration::ReportFormat;
use crate::stats::StatsSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub duration_millis: u64,
    pub vendor: String,
    pub packets: u64,
    pub version: String,
}

/// Statistics of one engine run, ready to print or save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub metadata: ReportMetadata,
    pub stats: StatsSnapshot,
}

impl StatsReport {
    /// `packets` counts every frame offered, including ones the engine never
    /// saw because they were not firmware events.
    pub fn new(vendor: &str, started: DateTime<Utc>, packets: u64, stats: StatsSnapshot) -> Self {
        let finished = Utc::now();
        let duration_millis = finished
            .signed_duration_since(started)
            .num_milliseconds()
            .max(0) as u64;

        Self {
            metadata: ReportMetadata {
                timestamp: finished.to_rfc3339(),
                duration_millis,
                vendor: vendor.to_string(),
                packets,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            stats,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Firmware Event Report\n\n");

        md.push_str("## Metadata\n\n");
        md.push_str(&format!("- **Timestamp**: {}\n", self.metadata.timestamp));
        md.push_str(&format!("- **Duration**: {} ms\n", self.metadata.duration_millis));
        md.push_str(&format!("- **Vendor**: {}\n", self.metadata.vendor));
        md.push_str(&format!("- **Packets**: {}\n", self.metadata.packets));
        md.push_str(&format!("- **Version**: {}\n\n", self.metadata.version));

        md.push_str("## Summary\n\n");
        md.push_str("| Counter | Count |\n");
        md.push_str("|---------|-------|\n");
        let rows = [
            ("Received", self.stats.received),
            ("Queued", self.stats.queued),
            ("Dispatched", self.stats.dispatched),
            ("Unhandled", self.stats.unhandled),
            ("Handler failures", self.stats.handler_failures),
            ("Interface events", self.stats.interface_events),
            ("Suppressed interface events", self.stats.suppressed_interface_events),
        ];
        for (name, count) in rows {
            md.push_str(&format!("| {name} | {count} |\n"));
        }
        md.push_str(&format!(
            "| **Dropped** | **{}** |\n\n",
            self.stats.total_dropped()
        ));

        if !self.stats.dropped.is_empty() {
            md.push_str("## Drops\n\n");
            for (reason, count) in &self.stats.dropped {
                md.push_str(&format!("- `{reason}`: {count}\n"));
            }
            md.push('\n');
        }

        md
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Markdown => Ok(self.to_markdown()),
        }
    }

    pub fn save(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render(format)?.as_bytes())?;
        Ok(())
    }
}
