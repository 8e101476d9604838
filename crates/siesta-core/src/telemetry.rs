//! Telemetry readings and their wire payloads.
//!
//! The reporting server keys each quantity by resource path and expects a
//! short plain-text body with the unit spelled out. The HTTP framing around
//! these payloads belongs to the sink implementation, not here.

use core::fmt::Write;

use heapless::String;

/// Largest body this module produces ("xxx.xx kPa").
pub const BODY_CAPACITY: usize = 16;

/// Resource the shutdown-error event is posted to.
pub const SHUTDOWN_ERROR_RESOURCE: &str = "/shutdown_errors";

/// Body of a shutdown-error event.
pub const SHUTDOWN_ERROR_BODY: &str = "1 unitless";

const CELSIUS_TO_KELVIN: f32 = 273.15;

/// One sensor reading ready for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Barometric pressure in kilopascals.
    Pressure { kilopascals: f32 },
    /// Ambient temperature in degrees Celsius; reported in Kelvin.
    Temperature { celsius: f32 },
    /// Illuminance in lux.
    Lux { lux: u32 },
}

impl Reading {
    /// Server resource this reading is posted to.
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Pressure { .. } => "/pressure",
            Self::Temperature { .. } => "/temperature",
            Self::Lux { .. } => "/lux",
        }
    }

    /// Plain-text body, value plus unit.
    pub fn body(&self) -> String<BODY_CAPACITY> {
        let mut body = String::new();
        // Capacity covers every arm; a formatting failure would truncate,
        // never panic.
        let _ = match self {
            Self::Pressure { kilopascals } => write!(body, "{kilopascals:.2} kPa"),
            Self::Temperature { celsius } => {
                write!(body, "{:.2} K", celsius + CELSIUS_TO_KELVIN)
            }
            Self::Lux { lux } => write!(body, "{lux} lx"),
        };
        body
    }
}

/// Where readings get posted.
///
/// Implementations own transport and HTTP framing; the returned value is the
/// response status code. The firmware backs this with a TCP socket, the
/// simulator with a logger.
pub trait ReportSink {
    type Error;

    /// Post one `(resource, body)` pair, returning the HTTP status code.
    fn post(
        &mut self,
        resource: &str,
        body: &str,
    ) -> impl Future<Output = Result<u16, Self::Error>>;
}

/// Success is any 2xx response.
pub fn is_accepted(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_body_in_kilopascals() {
        let reading = Reading::Pressure {
            kilopascals: 101.25,
        };
        assert_eq!(reading.resource(), "/pressure");
        assert_eq!(reading.body().as_str(), "101.25 kPa");
    }

    #[test]
    fn temperature_body_is_kelvin() {
        let reading = Reading::Temperature { celsius: 20.0 };
        assert_eq!(reading.resource(), "/temperature");
        assert_eq!(reading.body().as_str(), "293.15 K");
    }

    #[test]
    fn lux_body_is_integral() {
        let reading = Reading::Lux { lux: 742 };
        assert_eq!(reading.resource(), "/lux");
        assert_eq!(reading.body().as_str(), "742 lx");
    }

    #[test]
    fn status_classification() {
        assert!(is_accepted(200));
        assert!(is_accepted(204));
        assert!(!is_accepted(302));
        assert!(!is_accepted(500));
    }
}
