use core::convert::Infallible;

#[derive(Debug, PartialEq)]
/// Represents errors that can occur while building, sending or decoding a frame.
///
/// `E` is the error type of the [`Transport`](crate::Transport) used by
/// [`CayenneLpp::send`](crate::CayenneLpp::send); operations that never touch a
/// transport use the default, [`Infallible`].
pub enum Error<E = Infallible> {
    /// The record does not fit in the remaining payload capacity.
    CapacityExceeded,
    /// The type tag is not a known measurement kind.
    UnsupportedType(u8),
    /// The number of values does not match the measurement kind.
    InvalidValueCount,
    /// A value is not finite or does not fit its fixed-point field.
    ValueOutOfRange,
    /// The requested capacity is zero or larger than the backing buffer.
    InvalidCapacity,
    /// A record in the frame is cut short.
    Truncated,
    /// The transport accepted only part of the frame.
    PartialSend(usize),
    /// The transport failed to send the frame.
    Transport(E),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Transport(e)
    }
}
