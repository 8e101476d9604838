use serde::{Deserialize, Serialize};

/// How long the device sleeps between wake cycles when the config does not
/// say otherwise.
pub const DEFAULT_STANDBY_SECS: u32 = 60;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    pub report: ReportConfig<'a>,
    /// Deep-sleep interval between wake cycles, in seconds.
    pub standby_secs: u32,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ReportConfig<'a> {
    /// Reporting server hostname or address.
    pub host: &'a str,
    pub port: u16,
}
