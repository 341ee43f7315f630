use num_traits::float::FloatCore;

use crate::Error;

/// Size of the type tag and channel bytes that prefix every record.
pub(crate) const RECORD_HEADER_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Layout of one fixed-point value inside a record.
pub struct Field {
    /// Width of the field in bytes.
    pub width: usize,
    /// Whether the field is a two's complement integer.
    pub signed: bool,
    /// Raw units per engineering unit, i.e. the inverse of the resolution.
    pub scale: f64,
}

impl Field {
    const fn new(width: usize, signed: bool, scale: f64) -> Self {
        Self {
            width,
            signed,
            scale,
        }
    }

    /// The smallest step this field can represent, in engineering units.
    pub fn resolution(&self) -> f64 {
        1.0 / self.scale
    }

    fn bounds(&self) -> (i64, i64) {
        let bits = (self.width * 8) as u32;
        if self.signed {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        } else {
            (0, (1i64 << bits) - 1)
        }
    }

    /// Quantize `value` and write it big-endian into `out`, which must be `width` bytes long.
    pub(crate) fn encode(&self, value: f32, out: &mut [u8]) -> Result<(), Error> {
        if !value.is_finite() {
            return Err(Error::ValueOutOfRange);
        }
        let raw = FloatCore::round(value as f64 * self.scale);
        let (min, max) = self.bounds();
        if raw < min as f64 || raw > max as f64 {
            return Err(Error::ValueOutOfRange);
        }
        let bytes = (raw as i64).to_be_bytes();
        out.copy_from_slice(&bytes[bytes.len() - self.width..]);
        Ok(())
    }

    /// Read a big-endian field of `width` bytes back into engineering units.
    pub(crate) fn decode(&self, bytes: &[u8]) -> f32 {
        let mut raw = bytes.iter().fold(0i64, |acc, b| (acc << 8) | *b as i64);
        if self.signed {
            let shift = 64 - (self.width * 8) as u32;
            raw = (raw << shift) >> shift;
        }
        (raw as f64 / self.scale) as f32
    }
}

const DIGITAL: [Field; 1] = [Field::new(1, false, 1.0)];
const ANALOG: [Field; 1] = [Field::new(2, true, 100.0)];
const LUMINOSITY: [Field; 1] = [Field::new(2, false, 1.0)];
const TEMPERATURE: [Field; 1] = [Field::new(2, true, 10.0)];
const HUMIDITY: [Field; 1] = [Field::new(1, false, 2.0)];
const ACCELEROMETER: [Field; 3] = [Field::new(2, true, 1000.0); 3];
const BAROMETER: [Field; 1] = [Field::new(2, false, 10.0)];
const GYROMETER: [Field; 3] = [Field::new(2, true, 100.0); 3];
const GPS: [Field; 3] = [
    Field::new(3, true, 10000.0),
    Field::new(3, true, 10000.0),
    Field::new(3, true, 100.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
/// The measurement types of the Cayenne LPP v1 table, keyed by their type tag.
pub enum MeasurementKind {
    /// Digital input, 1 byte unsigned.
    DigitalInput = 0,
    /// Digital output, 1 byte unsigned.
    DigitalOutput = 1,
    /// Analog input, 2 bytes signed, 0.01 resolution.
    AnalogInput = 2,
    /// Analog output, 2 bytes signed, 0.01 resolution.
    AnalogOutput = 3,
    /// Illuminance, 2 bytes unsigned, 1 lux resolution.
    Luminosity = 101,
    /// Presence, 1 byte unsigned.
    Presence = 102,
    /// Temperature, 2 bytes signed, 0.1 °C resolution.
    Temperature = 103,
    /// Relative humidity, 1 byte unsigned, 0.5 % resolution.
    RelativeHumidity = 104,
    /// Accelerometer, 3 × 2 bytes signed, 0.001 G resolution.
    Accelerometer = 113,
    /// Barometric pressure, 2 bytes unsigned, 0.1 hPa resolution.
    BarometricPressure = 115,
    /// Gyrometer, 3 × 2 bytes signed, 0.01 °/s resolution.
    Gyrometer = 134,
    /// GPS fix: latitude and longitude 3 bytes signed at 0.0001°, altitude 3 bytes signed at 0.01 m.
    Gps = 136,
}

impl MeasurementKind {
    /// Every supported kind, in tag order.
    pub const ALL: [Self; 12] = [
        Self::DigitalInput,
        Self::DigitalOutput,
        Self::AnalogInput,
        Self::AnalogOutput,
        Self::Luminosity,
        Self::Presence,
        Self::Temperature,
        Self::RelativeHumidity,
        Self::Accelerometer,
        Self::BarometricPressure,
        Self::Gyrometer,
        Self::Gps,
    ];

    /// Length of the largest record (a GPS fix).
    pub const MAX_RECORD_LEN: usize = RECORD_HEADER_LEN + 9;

    #[inline]
    /// The type tag written in front of the channel byte.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// The value fields of this kind, in wire order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::DigitalInput | Self::DigitalOutput | Self::Presence => &DIGITAL,
            Self::AnalogInput | Self::AnalogOutput => &ANALOG,
            Self::Luminosity => &LUMINOSITY,
            Self::Temperature => &TEMPERATURE,
            Self::RelativeHumidity => &HUMIDITY,
            Self::Accelerometer => &ACCELEROMETER,
            Self::BarometricPressure => &BAROMETER,
            Self::Gyrometer => &GYROMETER,
            Self::Gps => &GPS,
        }
    }

    /// Encoded size of one record of this kind, header included.
    pub fn record_len(self) -> usize {
        RECORD_HEADER_LEN + self.fields().iter().map(|f| f.width).sum::<usize>()
    }

    /// Position of this kind in [`MeasurementKind::ALL`].
    pub(crate) fn index(self) -> usize {
        match self {
            Self::DigitalInput => 0,
            Self::DigitalOutput => 1,
            Self::AnalogInput => 2,
            Self::AnalogOutput => 3,
            Self::Luminosity => 4,
            Self::Presence => 5,
            Self::Temperature => 6,
            Self::RelativeHumidity => 7,
            Self::Accelerometer => 8,
            Self::BarometricPressure => 9,
            Self::Gyrometer => 10,
            Self::Gps => 11,
        }
    }
}

impl TryFrom<u8> for MeasurementKind {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(Error::UnsupportedType(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_table_order() {
        for (idx, kind) in MeasurementKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), idx);
            assert_eq!(MeasurementKind::try_from(kind.tag()), Ok(*kind));
        }
    }

    #[test]
    fn record_lengths() {
        assert_eq!(MeasurementKind::DigitalInput.record_len(), 3);
        assert_eq!(MeasurementKind::AnalogInput.record_len(), 4);
        assert_eq!(MeasurementKind::Temperature.record_len(), 4);
        assert_eq!(MeasurementKind::RelativeHumidity.record_len(), 3);
        assert_eq!(MeasurementKind::Accelerometer.record_len(), 8);
        assert_eq!(MeasurementKind::Gps.record_len(), 11);
        let longest = MeasurementKind::ALL
            .iter()
            .map(|k| k.record_len())
            .max();
        assert_eq!(longest, Some(MeasurementKind::MAX_RECORD_LEN));
    }

    #[test]
    fn unknown_tag() {
        assert_eq!(
            MeasurementKind::try_from(0x42),
            Err(Error::UnsupportedType(0x42))
        );
    }

    #[test]
    fn signed_field_encoding() {
        let field = TEMPERATURE[0];
        let mut out = [0u8; 2];
        field.encode(-11.0, &mut out).unwrap();
        assert_eq!(out, [0xff, 0x92]);
        assert_eq!(field.decode(&out), -11.0);
        field.encode(27.2, &mut out).unwrap();
        assert_eq!(out, [0x01, 0x10]);
    }

    #[test]
    fn three_byte_field_sign_extends() {
        let field = GPS[0];
        let mut out = [0u8; 3];
        field.encode(-33.8688, &mut out).unwrap();
        assert_eq!(out, [0xfa, 0xd5, 0x00]);
        assert!((field.decode(&out) + 33.8688).abs() < 1e-4);
    }

    #[test]
    fn halves_round_away_from_zero() {
        let mut out = [0u8; 1];
        HUMIDITY[0].encode(0.25, &mut out).unwrap();
        assert_eq!(out, [0x01]);
        let mut out = [0u8; 2];
        TEMPERATURE[0].encode(-0.25, &mut out).unwrap();
        assert_eq!(out, [0xff, 0xfd]);
        TEMPERATURE[0].encode(0.25, &mut out).unwrap();
        assert_eq!(out, [0x00, 0x03]);
    }

    #[test]
    fn out_of_range_values() {
        let mut out = [0u8; 1];
        assert_eq!(HUMIDITY[0].encode(128.0, &mut out), Err(Error::ValueOutOfRange));
        assert_eq!(HUMIDITY[0].encode(-0.5, &mut out), Err(Error::ValueOutOfRange));
        assert_eq!(HUMIDITY[0].encode(f32::NAN, &mut out), Err(Error::ValueOutOfRange));
        assert_eq!(HUMIDITY[0].encode(127.5, &mut out), Ok(()));
        assert_eq!(out, [0xff]);
        let mut out = [0u8; 2];
        assert_eq!(ANALOG[0].encode(327.68, &mut out), Err(Error::ValueOutOfRange));
        assert_eq!(ANALOG[0].encode(-327.68, &mut out), Ok(()));
    }
}
