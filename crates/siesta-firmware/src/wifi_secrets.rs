//! Build-time configuration injected by `build.rs` from `.env`.

use siesta_core::config::{Config, DEFAULT_STANDBY_SECS, InternetConfig, ReportConfig};

pub const WIFI_SSID: &str = env!("WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");

/// Reporting server, dotted-quad IPv4.
pub const REPORT_HOST: &str = env!("REPORT_HOST");
pub const REPORT_PORT_RAW: &str = env!("REPORT_PORT");

/// Assemble the device configuration from the injected values.
pub fn config() -> Config<'static> {
    Config {
        internet: InternetConfig {
            ssid: WIFI_SSID,
            password: WIFI_PASSWORD,
        },
        report: ReportConfig {
            host: REPORT_HOST,
            port: parse_port(REPORT_PORT_RAW),
        },
        standby_secs: DEFAULT_STANDBY_SECS,
    }
}

fn parse_port(raw: &str) -> u16 {
    raw.parse().unwrap_or(9000)
}
