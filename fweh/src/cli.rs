use std::path::PathBuf;

use clap::Parser;
use fweh_common::EventCode;

use crate::configuration::{parse_event_code, Configuration};
use crate::errors::Result;
use crate::replay::default_replay_events;

#[derive(Debug, Clone, Parser)]
#[clap(
    name = "fweh-replay",
    version,
    about = "Replay captured firmware event packets through the event engine"
)]
pub struct Args {
    #[clap(short, long, value_name = "FILE", help = "Capture file, one hex packet per line")]
    pub capture: PathBuf,

    #[clap(long, value_name = "FILE", help = "Configuration file (YAML, JSON or TOML)")]
    pub config: Option<PathBuf>,

    #[clap(
        short,
        long,
        value_name = "NAMES",
        value_delimiter = ',',
        help = "Event codes to listen for, by name or number [default: all named except IF]"
    )]
    pub events: Vec<String>,

    #[clap(short, long, help = "Show verbose output")]
    pub verbose: bool,

    #[clap(short, long, value_parser = ["json", "markdown"], help = "Report format")]
    pub format: Option<String>,

    #[clap(short, long, value_name = "SECONDS", help = "Give up on the replay after this long")]
    pub duration: Option<u64>,

    #[clap(short, long, value_name = "FILE", help = "Save the report to a file")]
    pub output: Option<PathBuf>,

    #[clap(long, value_name = "N", help = "Size of the firmware event code space")]
    pub num_event_codes: Option<u32>,

    #[clap(long, value_name = "N", help = "Number of interface slots")]
    pub max_interfaces: Option<usize>,

    #[clap(long, value_name = "BYTES", help = "Largest accepted event payload")]
    pub max_payload_len: Option<usize>,

    #[clap(long, value_name = "BYTES", help = "Payload bytes shown in debug output")]
    pub payload_dump_len: Option<usize>,

    #[clap(long, value_name = "NAME", help = "Vendor name")]
    pub vendor: Option<String>,

    #[clap(
        long = "map",
        value_name = "CODE=FW_CODE",
        help = "Map a canonical event code to a firmware code (repeatable)"
    )]
    pub map: Vec<String>,
}

impl Args {
    /// Command line flags override the configuration file; `--map` entries
    /// are appended to the file's event map.
    pub fn to_configuration(&self) -> Result<Configuration> {
        let mut builder = Configuration::builder();
        if let Some(path) = &self.config {
            builder = builder.from_config_file(path)?;
        }
        let overrides = self.builder_args();
        let overrides: Vec<&str> = overrides.iter().map(String::as_str).collect();
        builder.from_cli_args(&overrides)?.build()
    }

    /// Flags in the form [`ConfigurationBuilder::from_cli_args`] parses.
    ///
    /// [`ConfigurationBuilder::from_cli_args`]: crate::configuration::ConfigurationBuilder::from_cli_args
    fn builder_args(&self) -> Vec<String> {
        let valued = [
            ("--num-event-codes", self.num_event_codes.map(|n| n.to_string())),
            ("--max-interfaces", self.max_interfaces.map(|n| n.to_string())),
            ("--max-payload-len", self.max_payload_len.map(|n| n.to_string())),
            ("--payload-dump-len", self.payload_dump_len.map(|n| n.to_string())),
            ("--vendor", self.vendor.clone()),
            ("--format", self.format.clone()),
            ("--duration", self.duration.map(|secs| secs.to_string())),
        ];

        let mut args = Vec::new();
        for (flag, value) in valued {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value);
            }
        }
        for entry in &self.map {
            args.push("--map".to_string());
            args.push(entry.clone());
        }
        if self.verbose {
            args.push("--verbose".to_string());
        }
        args
    }

    pub fn event_codes(&self) -> Result<Vec<EventCode>> {
        if self.events.is_empty() {
            return Ok(default_replay_events());
        }
        self.events.iter().map(|name| parse_event_code(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{EventMapEntry, ReportFormat};
    use std::time::Duration;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("fweh-replay").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn should_require_capture_file() {
        assert!(Args::try_parse_from(["fweh-replay"]).is_err());
    }

    #[test]
    fn should_default_to_all_named_events_except_interface() {
        let args = parse(&["--capture", "events.hex"]);

        let codes = args.event_codes().unwrap();

        assert!(codes.contains(&EventCode::ESCAN_RESULT));
        assert!(!codes.contains(&EventCode::IF));
    }

    #[test]
    fn should_parse_comma_separated_events() {
        let args = parse(&["-c", "events.hex", "--events", "LINK,escan_result,92"]);

        assert_eq!(
            args.event_codes().unwrap(),
            vec![EventCode::LINK, EventCode::ESCAN_RESULT, EventCode::TDLS_PEER_EVENT]
        );
    }

    #[test]
    fn should_reject_unknown_event_name() {
        let args = parse(&["-c", "events.hex", "--events", "SUNSPOT"]);

        assert!(args.event_codes().is_err());
    }

    #[test]
    fn should_apply_flags_to_configuration() {
        let args = parse(&["-c", "events.hex", "-v", "-f", "markdown", "-d", "3"]);

        let config = args.to_configuration().unwrap();

        assert!(config.is_verbose());
        assert_eq!(config.report_format(), ReportFormat::Markdown);
        assert_eq!(config.duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn should_apply_engine_and_vendor_flags() {
        let args = parse(&[
            "-c",
            "events.hex",
            "--num-event-codes",
            "160",
            "--max-interfaces",
            "8",
            "--payload-dump-len",
            "16",
            "--vendor",
            "acme",
            "--map",
            "ESCAN_RESULT=140",
            "--map",
            "IF=141",
        ]);

        let config = args.to_configuration().unwrap();

        assert_eq!(config.engine.num_event_codes, 160);
        assert_eq!(config.engine.max_interfaces, 8);
        assert_eq!(config.engine.payload_dump_len, 16);
        assert_eq!(config.vendor.name, "acme");
        assert_eq!(
            config.vendor.event_map,
            vec![
                EventMapEntry { code: 69, fw_code: 140 },
                EventMapEntry { code: 54, fw_code: 141 },
            ]
        );
    }

    #[test]
    fn should_validate_flag_values() {
        let args = parse(&["-c", "events.hex", "--num-event-codes", "32"]);

        assert!(args.to_configuration().is_err());
    }

    #[test]
    fn should_reject_unknown_format() {
        let result = Args::try_parse_from(["fweh-replay", "-c", "x.hex", "-f", "csv"]);

        assert!(result.is_err());
    }
}
