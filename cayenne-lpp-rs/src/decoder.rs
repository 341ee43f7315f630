use crate::{Error, MeasurementKind, Reading, kind::RECORD_HEADER_LEN};

#[derive(Debug, Clone, Copy, PartialEq)]
/// One decoded record of a frame.
pub struct Record {
    /// The channel the record was tagged with.
    pub channel: u8,
    /// The decoded value, quantized to the resolution of its kind.
    pub reading: Reading,
}

#[derive(Debug, Clone)]
/// Iterates over the records of a serialized Cayenne LPP frame.
///
/// Yields [`Error::UnsupportedType`] for an unknown type tag and [`Error::Truncated`] for a
/// record cut short; the iterator ends after the first error.
pub struct Decoder<'a> {
    frame: &'a [u8],
    failed: bool,
}

impl<'a> Decoder<'a> {
    /// Start decoding `frame`.
    pub fn new(frame: &'a [u8]) -> Self {
        Self {
            frame,
            failed: false,
        }
    }

    /// The bytes not decoded yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.frame
    }

    fn next_record(&mut self) -> Result<Record, Error> {
        let (tag, channel) = match self.frame {
            [tag, channel, ..] => (*tag, *channel),
            _ => return Err(Error::Truncated),
        };
        let kind = MeasurementKind::try_from(tag)?;
        let len = kind.record_len();
        if self.frame.len() < len {
            return Err(Error::Truncated);
        }
        let mut values = [0f32; 3];
        let mut offset = RECORD_HEADER_LEN;
        for (field, value) in kind.fields().iter().zip(values.iter_mut()) {
            *value = field.decode(&self.frame[offset..offset + field.width]);
            offset += field.width;
        }
        let reading = Reading::from_values(kind, &values[..kind.fields().len()])?;
        self.frame = &self.frame[len..];
        Ok(Record { channel, reading })
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.frame.is_empty() {
            return None;
        }
        let record = self.next_record();
        self.failed = record.is_err();
        Some(record)
    }
}
