//! I2C sensor drivers feeding [`Reading`] values.
//!
//! Each wrapper borrows the bus only while it samples, so the three drivers
//! share the single I2C peripheral without any mux or bus-sharing layer.

use log::{error, info};
use siesta_core::telemetry::Reading;

#[derive(Debug, Clone, Copy)]
pub struct SensorError {
    pub sensor: &'static str,
}

#[cfg(feature = "sensor-bmp388")]
pub mod pressure {
    use bmp388_embedded::{Address, r#async::Bmp388Async};
    use embedded_hal_async::i2c::I2c;

    use super::*;

    /// Sample barometric pressure from the BMP388, in kilopascals.
    pub async fn sample<I: I2c>(i2c: I) -> Result<Reading, SensorError> {
        let mut sensor = Bmp388Async::<I, embassy_time::Delay>::new(
            i2c,
            embassy_time::Delay,
            Address::Low,
        );
        let pascals = sensor.pressure().await.map_err(|e| {
            error!("BMP388 pressure read failed: {e:?}");
            SensorError { sensor: "BMP388" }
        })?;

        let kilopascals = pascals / 1000.0;
        info!("BMP388: {kilopascals:.2} kPa");
        Ok(Reading::Pressure { kilopascals })
    }
}

#[cfg(feature = "sensor-sht40")]
pub mod temperature {
    use embedded_hal_async::i2c::I2c;
    use sht4x::Sht4xAsync;

    use super::*;

    /// Sample ambient temperature from the SHT40, in degrees Celsius.
    pub async fn sample<I: I2c>(i2c: I) -> Result<Reading, SensorError> {
        let mut sensor = Sht4xAsync::<I, embassy_time::Delay>::new(i2c);
        let measurement = sensor
            .measure(sht4x::Precision::High, &mut embassy_time::Delay)
            .await
            .map_err(|e| {
                error!("SHT40 measurement failed: {e:?}");
                SensorError { sensor: "SHT40" }
            })?;

        let celsius = measurement.temperature_celsius().to_num::<f32>();
        info!("SHT40: {celsius:.2} C");
        Ok(Reading::Temperature { celsius })
    }
}

#[cfg(feature = "sensor-bh1750")]
pub mod light {
    use bh1750_embedded::{Address, Resolution, r#async::Bh1750Async};
    use embedded_hal_async::i2c::I2c;

    use super::*;

    /// Sample illuminance from the BH1750, in lux.
    pub async fn sample<I: I2c>(i2c: I) -> Result<Reading, SensorError> {
        let mut sensor = Bh1750Async::<I, embassy_time::Delay>::new(
            i2c,
            embassy_time::Delay,
            Address::Low,
        );
        let lux = sensor
            .one_time_measurement(Resolution::High)
            .await
            .map_err(|e| {
                error!("BH1750 one_time_measurement failed: {e:?}");
                SensorError { sensor: "BH1750" }
            })?;

        info!("BH1750: {lux} lx");
        Ok(Reading::Lux { lux: lux as u32 })
    }
}
