/// A link that can carry a serialized frame, such as a LoRa modem.
///
/// Implementations own their timeouts and retries; [`CayenneLpp::send`](crate::CayenneLpp::send)
/// calls [`Transport::transmit`] exactly once per send.
pub trait Transport {
    /// The error reported when the frame could not be sent.
    type Error;

    /// Send `frame`, returning the number of bytes the link accepted.
    fn transmit(&mut self, frame: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, frame: &[u8]) -> Result<usize, Self::Error> {
        (**self).transmit(frame)
    }
}
