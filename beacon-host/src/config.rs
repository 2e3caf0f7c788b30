//! Remote configuration: TOML file plus command-line overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use beacon_hal::i2c::DEFAULT_TARGET_ADDRESS;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::transport::TransportConfig;

type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for `beacon-remote`; every field has a default
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// I2C character device
    pub bus: String,
    pub address: u8,
    pub settle_ms: u32,
    pub spacing_ms: u32,
    pub enable_delay_ms: u32,
    /// Command sent by the `go` poller
    pub poll_request: String,
    pub poll_interval_ms: u64,
    pub fail_on_protocol_error: bool,
    pub set_time_on_enable: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            bus: "/dev/i2c-1".to_string(),
            address: DEFAULT_TARGET_ADDRESS,
            settle_ms: transport.settle_ms,
            spacing_ms: transport.spacing_ms,
            enable_delay_ms: transport.enable_delay_ms,
            poll_request: "data".to_string(),
            poll_interval_ms: 1000,
            fail_on_protocol_error: transport.fail_on_protocol_error,
            set_time_on_enable: transport.set_time_on_enable,
        }
    }
}

impl RemoteConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the config file if one was given, then flags
    pub fn resolve(options: &CliOptions) -> Result<Self> {
        let mut config = match &options.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(options);
        Ok(config)
    }

    pub fn apply(&mut self, options: &CliOptions) {
        if let Some(bus) = &options.bus {
            self.bus = bus.clone();
        }
        if let Some(address) = options.address {
            self.address = address;
        }
        if let Some(settle) = options.settle_ms {
            self.settle_ms = settle;
        }
        if options.no_time {
            self.set_time_on_enable = false;
        }
        if options.fail_on_error {
            self.fail_on_protocol_error = true;
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            address: self.address,
            settle_ms: self.settle_ms,
            spacing_ms: self.spacing_ms,
            enable_delay_ms: self.enable_delay_ms,
            fail_on_protocol_error: self.fail_on_protocol_error,
            set_time_on_enable: self.set_time_on_enable,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Flags given on the command line; `None`/`false` when absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub bus: Option<String>,
    pub address: Option<u8>,
    pub settle_ms: Option<u32>,
    pub no_time: bool,
    pub fail_on_error: bool,
}

/// Parsed command-line intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(CliOptions),
    ShowHelp,
    ShowVersion,
}

impl CliCommand {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut opts = CliOptions::default();
        let mut iter = args.iter();

        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "--help" | "-h" => return Ok(CliCommand::ShowHelp),
                "--version" | "-V" => return Ok(CliCommand::ShowVersion),
                "--config" | "-c" => {
                    opts.config = Some(PathBuf::from(take_value(flag, &mut iter)?));
                }
                "--bus" => {
                    opts.bus = Some(take_value(flag, &mut iter)?);
                }
                "--address" => {
                    let raw = take_value(flag, &mut iter)?;
                    opts.address = Some(parse_address(&raw)?);
                }
                "--settle-ms" => {
                    let raw = take_value(flag, &mut iter)?;
                    opts.settle_ms = Some(raw.parse().map_err(|_| {
                        ConfigError::InvalidArgs("settle-ms must be a positive integer".to_string())
                    })?);
                }
                "--no-time" => opts.no_time = true,
                "--fail-on-error" => opts.fail_on_error = true,
                other => {
                    return Err(ConfigError::InvalidArgs(format!(
                        "unknown flag '{other}', try --help"
                    )));
                }
            }
        }

        Ok(CliCommand::Run(opts))
    }

    pub fn help() -> &'static str {
        concat!(
            "beacon-remote - interactive I2C remote for Beacon peripherals\n",
            "\n",
            "USAGE:\n",
            "  beacon-remote [--config <path>] [--bus <path>] [--address <addr>] [--settle-ms <ms>] [--no-time] [--fail-on-error]\n",
            "\n",
            "OPTIONS:\n",
            "  -c, --config <path>  TOML configuration file\n",
            "  --bus <path>         I2C device (default: /dev/i2c-1)\n",
            "  --address <addr>     Target address, decimal or 0x-prefixed hex (default: 0x47)\n",
            "  --settle-ms <ms>     Wait between command and response read (default: 11)\n",
            "  --no-time            Do not set the peripheral clock on start\n",
            "  --fail-on-error      Stop on protocol errors instead of skipping them\n",
            "  -h, --help           Show this help\n",
            "  -V, --version        Show version\n",
            "\n",
            "SESSION:\n",
            "  <command>  send a command, e.g. 'ping' or 'rgb 1 255 0 0'\n",
            "  r          repeat the previous command\n",
            "  go / stop  start or stop background polling\n",
            "  quit       exit\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_address(raw: &str) -> Result<u8> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    match parsed {
        Ok(address) if address <= 0x7f => Ok(address),
        _ => Err(ConfigError::InvalidArgs(format!(
            "address '{raw}' is not a 7-bit I2C address"
        ))),
    }
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| ConfigError::InvalidArgs(format!("expected a value after {flag}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_with_no_args() {
        let cmd = CliCommand::parse(&[]).unwrap();
        assert_eq!(cmd, CliCommand::Run(CliOptions::default()));
        let config = RemoteConfig::resolve(&CliOptions::default()).unwrap();
        assert_eq!(config.address, 0x47);
        assert_eq!(config.transport_config(), TransportConfig::default());
    }

    #[test]
    fn test_flags_override() {
        let cmd = CliCommand::parse(&args(&[
            "--bus",
            "/dev/i2c-3",
            "--address",
            "0x20",
            "--settle-ms",
            "25",
            "--no-time",
            "--fail-on-error",
        ]))
        .unwrap();
        let CliCommand::Run(opts) = cmd else {
            panic!("expected run");
        };
        let mut config = RemoteConfig::default();
        config.apply(&opts);
        assert_eq!(config.bus, "/dev/i2c-3");
        assert_eq!(config.address, 0x20);
        let transport = config.transport_config();
        assert_eq!(transport.settle_ms, 25);
        assert!(!transport.set_time_on_enable);
        assert!(transport.fail_on_protocol_error);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(CliCommand::parse(&args(&["-h"])).unwrap(), CliCommand::ShowHelp);
        assert_eq!(
            CliCommand::parse(&args(&["--version"])).unwrap(),
            CliCommand::ShowVersion
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = CliCommand::parse(&args(&["--nope"])).unwrap_err();
        assert!(err.to_string().contains("unknown flag"));
        assert!(CliCommand::parse(&args(&["--address", "0x80"])).is_err());
        assert!(CliCommand::parse(&args(&["--bus"])).is_err());
    }

    #[test]
    fn test_address_formats() {
        assert_eq!(parse_address("71").unwrap(), 71);
        assert_eq!(parse_address("0x47").unwrap(), 0x47);
        assert!(parse_address("zz").is_err());
    }

    #[test]
    fn test_toml_partial() {
        let config = RemoteConfig::from_toml_str(
            "address = 0x30\npoll_request = \"time get\"\npoll_interval_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.address, 0x30);
        assert_eq!(config.poll_request, "time get");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.bus, "/dev/i2c-1");
        assert!(RemoteConfig::from_toml_str("address = \"x\"").is_err());
    }
}
