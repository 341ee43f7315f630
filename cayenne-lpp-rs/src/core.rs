use crate::{Error, MeasurementKind, Reading, Transport, kind::RECORD_HEADER_LEN};

/// Largest LoRaWAN application payload, in bytes.
pub const MAX_FRAME_SIZE: usize = 222;

/// First channel handed out to each measurement kind when no channel is given.
pub const AUTO_CHANNEL_BASE: u8 = 1;

#[derive(Debug, Clone)]
/// A Cayenne LPP payload under construction.
///
/// Records are appended into a buffer of `N` bytes, of which at most
/// [`max_size`](CayenneLpp::max_size) are used. An add that does not fit fails and
/// leaves the payload untouched.
///
/// Records added without a channel get one from a counter kept per measurement kind,
/// starting at [`AUTO_CHANNEL_BASE`] and advancing by one for every such record. Explicit
/// channels do not move the counters. [`reset`](CayenneLpp::reset) restarts all counters,
/// so a node that adds the same sensors before every send numbers them the same way in
/// every frame.
pub struct CayenneLpp<const N: usize> {
    buffer: [u8; N],
    len: usize,
    max_size: usize,
    channels: [u8; MeasurementKind::ALL.len()],
}

impl<const N: usize> Default for CayenneLpp<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CayenneLpp<N> {
    /// Create an empty payload that may use the whole `N` byte buffer.
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            len: 0,
            max_size: N,
            channels: [AUTO_CHANNEL_BASE; MeasurementKind::ALL.len()],
        }
    }

    /// Create an empty payload limited to `size` bytes.
    ///
    /// Fails with [`Error::InvalidCapacity`] if `size` is zero or larger than `N`.
    pub fn with_max_size(size: usize) -> Result<Self, Error> {
        if size == 0 || size > N {
            return Err(Error::InvalidCapacity);
        }
        let mut lpp = Self::new();
        lpp.max_size = size;
        Ok(lpp)
    }

    #[inline]
    /// Maximum number of bytes this payload may hold.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    /// Number of bytes currently encoded.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Whether no record has been added since the last reset.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Number of bytes still available.
    pub fn remaining(&self) -> usize {
        self.max_size - self.len
    }

    /// The encoded records, in the order they were added.
    pub fn serialize(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Drop every record and restart the automatic channel numbering.
    pub fn reset(&mut self) {
        self.len = 0;
        self.channels = [AUTO_CHANNEL_BASE; MeasurementKind::ALL.len()];
    }

    /// Append a record for `reading`.
    ///
    /// # Parameters:
    /// - `reading`: The measurement to encode.
    /// - `channel`: The channel to tag it with, or `None` to take the next channel of its kind.
    ///
    /// # Returns:
    /// - The channel the record was written with.
    ///
    /// Fails with [`Error::CapacityExceeded`] if the record does not fit, or
    /// [`Error::ValueOutOfRange`] if a value cannot be represented. The payload is unchanged
    /// on failure.
    pub fn add(&mut self, reading: Reading, channel: Option<u8>) -> Result<u8, Error> {
        let kind = reading.kind();
        let size = kind.record_len();
        if size > self.remaining() {
            return Err(Error::CapacityExceeded);
        }
        let slot = kind.index();
        let chan = channel.unwrap_or(self.channels[slot]);
        // Encode aside so that a bad value leaves the buffer untouched
        let mut record = [0u8; MeasurementKind::MAX_RECORD_LEN];
        record[0] = kind.tag();
        record[1] = chan;
        let mut offset = RECORD_HEADER_LEN;
        for (field, value) in kind.fields().iter().zip(reading.values()) {
            field.encode(value, &mut record[offset..offset + field.width])?;
            offset += field.width;
        }
        self.buffer[self.len..self.len + size].copy_from_slice(&record[..size]);
        self.len += size;
        if channel.is_none() {
            self.channels[slot] = match chan {
                u8::MAX => AUTO_CHANNEL_BASE,
                c => c + 1,
            };
        }
        Ok(chan)
    }

    /// Append a record given its numeric type tag and values in wire order.
    ///
    /// Fails with [`Error::UnsupportedType`] for an unknown tag and [`Error::InvalidValueCount`]
    /// if the number of values does not match the kind; otherwise behaves like [`add`](Self::add).
    pub fn add_tagged(
        &mut self,
        tag: u8,
        values: &[f32],
        channel: Option<u8>,
    ) -> Result<u8, Error> {
        let kind = MeasurementKind::try_from(tag)?;
        let reading = Reading::from_values(kind, values)?;
        self.add(reading, channel)
    }

    /// Append a digital input state.
    pub fn add_digital_input(&mut self, value: u8, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::DigitalInput(value), channel)
    }

    /// Append a digital output state.
    pub fn add_digital_output(&mut self, value: u8, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::DigitalOutput(value), channel)
    }

    /// Append an analog input value.
    pub fn add_analog_input(&mut self, value: f32, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::AnalogInput(value), channel)
    }

    /// Append an analog output value.
    pub fn add_analog_output(&mut self, value: f32, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::AnalogOutput(value), channel)
    }

    /// Append an illuminance in lux.
    pub fn add_luminosity(&mut self, lux: u16, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::Luminosity(lux), channel)
    }

    /// Append a presence count.
    pub fn add_presence(&mut self, value: u8, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::Presence(value), channel)
    }

    /// Append a temperature in °C.
    pub fn add_temperature(&mut self, celsius: f32, channel: Option<u8>) -> Result<u8, Error> {
        self.add(Reading::Temperature(celsius), channel)
    }

    /// Append a relative humidity in %.
    pub fn add_relative_humidity(
        &mut self,
        percentage: f32,
        channel: Option<u8>,
    ) -> Result<u8, Error> {
        self.add(Reading::RelativeHumidity(percentage), channel)
    }

    /// Append an accelerometer sample in G.
    pub fn add_accelerometer(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        channel: Option<u8>,
    ) -> Result<u8, Error> {
        self.add(Reading::Accelerometer { x, y, z }, channel)
    }

    /// Append a barometric pressure in hPa.
    pub fn add_barometric_pressure(
        &mut self,
        hpa: f32,
        channel: Option<u8>,
    ) -> Result<u8, Error> {
        self.add(Reading::BarometricPressure(hpa), channel)
    }

    /// Append a gyrometer sample in °/s.
    pub fn add_gyrometer(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        channel: Option<u8>,
    ) -> Result<u8, Error> {
        self.add(Reading::Gyrometer { x, y, z }, channel)
    }

    /// Append a GPS fix: latitude and longitude in degrees, altitude in meters.
    pub fn add_gps(
        &mut self,
        latitude: f32,
        longitude: f32,
        altitude: f32,
        channel: Option<u8>,
    ) -> Result<u8, Error> {
        self.add(
            Reading::Gps {
                latitude,
                longitude,
                altitude,
            },
            channel,
        )
    }

    /// Hand the serialized payload to `transport`.
    ///
    /// # Parameters:
    /// - `transport`: The link to send the frame over.
    /// - `reset_payload`: Whether to [`reset`](Self::reset) the payload once the frame was sent.
    ///
    /// # Returns:
    /// - The number of bytes sent.
    ///
    /// If the transport fails ([`Error::Transport`]) or accepts only part of the frame
    /// ([`Error::PartialSend`]), the payload is kept as is regardless of `reset_payload`.
    pub fn send<T: Transport>(
        &mut self,
        transport: &mut T,
        reset_payload: bool,
    ) -> Result<usize, Error<T::Error>> {
        let sent = transport.transmit(self.serialize())?;
        if sent < self.len {
            return Err(Error::PartialSend(sent));
        }
        if reset_payload {
            self.reset();
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{vec, vec::Vec};

    use super::*;
    use crate::Decoder;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<u8>>,
        fail: bool,
        accept: Option<usize>,
    }

    impl Transport for Recorder {
        type Error = &'static str;

        fn transmit(&mut self, frame: &[u8]) -> Result<usize, Self::Error> {
            if self.fail {
                return Err("link down");
            }
            self.frames.push(frame.to_vec());
            Ok(self.accept.unwrap_or(frame.len()))
        }
    }

    #[test]
    fn temperature_and_humidity_frame() {
        let mut lpp = CayenneLpp::<64>::new();
        assert_eq!(lpp.add_temperature(23.4, None), Ok(1));
        assert_eq!(lpp.add_relative_humidity(55.0, None), Ok(1));
        assert_eq!(lpp.serialize(), &[103, 1, 0x00, 0xea, 104, 1, 110]);
        assert_eq!(lpp.len(), 7);
    }

    #[test]
    fn demo_frame_bytes() {
        let mut lpp = CayenneLpp::<MAX_FRAME_SIZE>::new();
        lpp.add_temperature(-11.0, None).unwrap();
        lpp.add_temperature(54.3, Some(118)).unwrap();
        lpp.add_gps(50.5434, 4.4069, 100.98, None).unwrap();
        assert_eq!(
            lpp.serialize(),
            &[
                103, 1, 0xff, 0x92, // -11.0 °C
                103, 118, 0x02, 0x1f, // 54.3 °C
                136, 1, 0x07, 0xb6, 0x5a, 0x00, 0xac, 0x25, 0x00, 0x27, 0x72,
            ]
        );
    }

    #[test]
    fn auto_channels_per_kind() {
        let mut lpp = CayenneLpp::<64>::new();
        assert_eq!(lpp.add_analog_input(1.0, None), Ok(1));
        assert_eq!(lpp.add_analog_input(2.0, Some(114)), Ok(114));
        assert_eq!(lpp.add_analog_input(3.0, None), Ok(2));
        assert_eq!(lpp.add_temperature(20.0, None), Ok(1));
        lpp.reset();
        assert!(lpp.is_empty());
        assert_eq!(lpp.add_analog_input(1.0, None), Ok(1));
    }

    #[test]
    fn auto_channel_wraps_to_base() {
        let mut lpp = CayenneLpp::<MAX_FRAME_SIZE>::new();
        lpp.channels[MeasurementKind::DigitalInput.index()] = u8::MAX;
        assert_eq!(lpp.add_digital_input(1, None), Ok(u8::MAX));
        assert_eq!(lpp.add_digital_input(0, None), Ok(AUTO_CHANNEL_BASE));
    }

    #[test]
    fn overflow_leaves_payload_unchanged() {
        let mut lpp = CayenneLpp::<MAX_FRAME_SIZE>::with_max_size(11).unwrap();
        lpp.add_temperature(20.0, None).unwrap();
        lpp.add_temperature(21.0, None).unwrap();
        let before = lpp.serialize().to_vec();
        assert_eq!(lpp.add_temperature(22.0, None), Err(Error::CapacityExceeded));
        assert_eq!(lpp.serialize(), &before[..]);
        // a smaller record still fits
        assert_eq!(lpp.add_relative_humidity(40.0, None), Ok(1));
        assert_eq!(lpp.remaining(), 0);
        assert_eq!(lpp.add_digital_input(1, None), Err(Error::CapacityExceeded));
        // the failed add did not consume a channel
        lpp.reset();
        assert_eq!(lpp.add_temperature(22.0, None), Ok(1));
    }

    #[test]
    fn bad_value_leaves_payload_unchanged() {
        let mut lpp = CayenneLpp::<16>::new();
        lpp.add_presence(3, None).unwrap();
        assert_eq!(
            lpp.add_gps(45.0, 1000.0, 10.0, None),
            Err(Error::ValueOutOfRange)
        );
        assert_eq!(lpp.serialize(), &[102, 1, 3]);
        assert_eq!(lpp.add_temperature(f32::INFINITY, None), Err(Error::ValueOutOfRange));
        assert_eq!(lpp.add_temperature(0.0, None), Ok(1));
    }

    #[test]
    fn invalid_capacity() {
        assert!(matches!(
            CayenneLpp::<8>::with_max_size(0),
            Err(Error::InvalidCapacity)
        ));
        assert!(matches!(
            CayenneLpp::<8>::with_max_size(9),
            Err(Error::InvalidCapacity)
        ));
        assert_eq!(CayenneLpp::<8>::with_max_size(8).unwrap().max_size(), 8);
    }

    #[test]
    fn tagged_entry_point() {
        let mut lpp = CayenneLpp::<32>::new();
        assert_eq!(lpp.add_tagged(0x42, &[1.0], None), Err(Error::UnsupportedType(0x42)));
        assert_eq!(lpp.add_tagged(136, &[1.0], None), Err(Error::InvalidValueCount));
        assert!(lpp.is_empty());
        assert_eq!(lpp.add_tagged(2, &[102.34], None), Ok(1));
        assert_eq!(lpp.serialize(), &[2, 1, 0x27, 0xfa]);
    }

    #[test]
    fn send_with_reset() {
        let mut lpp = CayenneLpp::<32>::new();
        let mut link = Recorder::default();
        lpp.add_analog_input(-70.0, None).unwrap();
        assert_eq!(lpp.send(&mut link, true), Ok(4));
        assert!(lpp.serialize().is_empty());
        assert_eq!(link.frames, vec![vec![2, 1, 0xe4, 0xa8]]);
    }

    #[test]
    fn send_without_reset_keeps_appending() {
        let mut lpp = CayenneLpp::<32>::new();
        let mut link = Recorder::default();
        lpp.add_analog_input(1.0, None).unwrap();
        lpp.send(&mut link, false).unwrap();
        assert_eq!(lpp.len(), 4);
        lpp.add_analog_input(2.0, None).unwrap();
        lpp.send(&mut link, false).unwrap();
        assert_eq!(link.frames[1].len(), 8);
        assert_eq!(&link.frames[1][..4], &link.frames[0][..]);
        assert_eq!(link.frames[1][5], 2);
    }

    #[test]
    fn failed_send_keeps_payload() {
        let mut lpp = CayenneLpp::<32>::new();
        lpp.add_temperature(18.5, None).unwrap();
        let mut link = Recorder {
            fail: true,
            ..Default::default()
        };
        assert_eq!(lpp.send(&mut link, true), Err(Error::Transport("link down")));
        assert_eq!(lpp.len(), 4);

        let mut link = Recorder {
            accept: Some(2),
            ..Default::default()
        };
        assert_eq!(lpp.send(&mut link, true), Err(Error::PartialSend(2)));
        assert_eq!(lpp.len(), 4);
    }

    #[test]
    fn round_trip_within_resolution() {
        let mut lpp = CayenneLpp::<MAX_FRAME_SIZE>::new();
        let readings = [
            Reading::AnalogInput(-89.34),
            Reading::Temperature(23.4),
            Reading::RelativeHumidity(55.3),
            Reading::Accelerometer {
                x: 0.012,
                y: -1.0,
                z: 0.9876,
            },
            Reading::BarometricPressure(1013.25),
            Reading::Gyrometer {
                x: 1.23,
                y: -45.6,
                z: 0.0,
            },
            Reading::Gps {
                latitude: -34.9011,
                longitude: -56.1645,
                altitude: 43.21,
            },
            Reading::Luminosity(870),
        ];
        let mut expected_len = 0;
        for reading in readings.iter() {
            lpp.add(*reading, None).unwrap();
            expected_len += reading.kind().record_len();
        }
        assert_eq!(lpp.len(), expected_len);
        let decoded = Decoder::new(lpp.serialize())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(decoded.len(), readings.len());
        for (record, reading) in decoded.iter().zip(readings.iter()) {
            assert_eq!(record.channel, AUTO_CHANNEL_BASE);
            assert_eq!(record.reading.kind(), reading.kind());
            let fields = reading.kind().fields();
            let got = record.reading.values();
            for (idx, field) in fields.iter().enumerate() {
                let err = (got[idx] as f64 - reading.values()[idx] as f64).abs();
                assert!(
                    err <= field.resolution() / 2.0 + 1e-6,
                    "{:?} field {idx}: {err}",
                    reading.kind()
                );
            }
        }
        let temperature = decoded[1].reading.values()[0];
        assert!((23.35..23.45).contains(&temperature));
    }
}
