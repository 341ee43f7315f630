use num_traits::float::FloatCore;

use crate::{Error, MeasurementKind};

#[derive(Debug, Clone, Copy, PartialEq)]
/// A measurement value together with its kind.
pub enum Reading {
    /// Digital input state.
    DigitalInput(u8),
    /// Digital output state.
    DigitalOutput(u8),
    /// Analog input, in arbitrary units.
    AnalogInput(f32),
    /// Analog output, in arbitrary units.
    AnalogOutput(f32),
    /// Illuminance in lux.
    Luminosity(u16),
    /// Presence count.
    Presence(u8),
    /// Temperature in °C.
    Temperature(f32),
    /// Relative humidity in %.
    RelativeHumidity(f32),
    /// Acceleration in G per axis.
    Accelerometer {
        /// X axis.
        x: f32,
        /// Y axis.
        y: f32,
        /// Z axis.
        z: f32,
    },
    /// Barometric pressure in hPa.
    BarometricPressure(f32),
    /// Angular rate in °/s per axis.
    Gyrometer {
        /// X axis.
        x: f32,
        /// Y axis.
        y: f32,
        /// Z axis.
        z: f32,
    },
    /// GPS fix.
    Gps {
        /// Latitude in degrees.
        latitude: f32,
        /// Longitude in degrees.
        longitude: f32,
        /// Altitude in meters.
        altitude: f32,
    },
}

impl Reading {
    /// The kind this reading is encoded as.
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Reading::DigitalInput(_) => MeasurementKind::DigitalInput,
            Reading::DigitalOutput(_) => MeasurementKind::DigitalOutput,
            Reading::AnalogInput(_) => MeasurementKind::AnalogInput,
            Reading::AnalogOutput(_) => MeasurementKind::AnalogOutput,
            Reading::Luminosity(_) => MeasurementKind::Luminosity,
            Reading::Presence(_) => MeasurementKind::Presence,
            Reading::Temperature(_) => MeasurementKind::Temperature,
            Reading::RelativeHumidity(_) => MeasurementKind::RelativeHumidity,
            Reading::Accelerometer { .. } => MeasurementKind::Accelerometer,
            Reading::BarometricPressure(_) => MeasurementKind::BarometricPressure,
            Reading::Gyrometer { .. } => MeasurementKind::Gyrometer,
            Reading::Gps { .. } => MeasurementKind::Gps,
        }
    }

    /// The values of this reading in wire order.
    ///
    /// Only the first `self.kind().fields().len()` entries are meaningful, the rest are zero.
    pub fn values(&self) -> [f32; 3] {
        match *self {
            Reading::DigitalInput(v) | Reading::DigitalOutput(v) | Reading::Presence(v) => {
                [v as f32, 0.0, 0.0]
            }
            Reading::Luminosity(v) => [v as f32, 0.0, 0.0],
            Reading::AnalogInput(v)
            | Reading::AnalogOutput(v)
            | Reading::Temperature(v)
            | Reading::RelativeHumidity(v)
            | Reading::BarometricPressure(v) => [v, 0.0, 0.0],
            Reading::Accelerometer { x, y, z } | Reading::Gyrometer { x, y, z } => [x, y, z],
            Reading::Gps {
                latitude,
                longitude,
                altitude,
            } => [latitude, longitude, altitude],
        }
    }

    /// Build a reading of `kind` from its values in wire order.
    ///
    /// Fails with [`Error::InvalidValueCount`] if `values` does not hold exactly one value per field,
    /// and with [`Error::ValueOutOfRange`] if an integral kind gets a value outside its range.
    pub fn from_values(kind: MeasurementKind, values: &[f32]) -> Result<Self, Error> {
        if values.len() != kind.fields().len() {
            return Err(Error::InvalidValueCount);
        }
        let reading = match kind {
            MeasurementKind::DigitalInput => Reading::DigitalInput(integral(values[0])?),
            MeasurementKind::DigitalOutput => Reading::DigitalOutput(integral(values[0])?),
            MeasurementKind::AnalogInput => Reading::AnalogInput(values[0]),
            MeasurementKind::AnalogOutput => Reading::AnalogOutput(values[0]),
            MeasurementKind::Luminosity => Reading::Luminosity(integral(values[0])?),
            MeasurementKind::Presence => Reading::Presence(integral(values[0])?),
            MeasurementKind::Temperature => Reading::Temperature(values[0]),
            MeasurementKind::RelativeHumidity => Reading::RelativeHumidity(values[0]),
            MeasurementKind::Accelerometer => Reading::Accelerometer {
                x: values[0],
                y: values[1],
                z: values[2],
            },
            MeasurementKind::BarometricPressure => Reading::BarometricPressure(values[0]),
            MeasurementKind::Gyrometer => Reading::Gyrometer {
                x: values[0],
                y: values[1],
                z: values[2],
            },
            MeasurementKind::Gps => Reading::Gps {
                latitude: values[0],
                longitude: values[1],
                altitude: values[2],
            },
        };
        Ok(reading)
    }
}

fn integral<T: TryFrom<i64>>(value: f32) -> Result<T, Error> {
    if !value.is_finite() {
        return Err(Error::ValueOutOfRange);
    }
    T::try_from(FloatCore::round(value as f64) as i64).map_err(|_| Error::ValueOutOfRange)
}
