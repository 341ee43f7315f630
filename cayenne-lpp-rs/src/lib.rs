#![no_std]
#![deny(missing_docs)]
//! # Cayenne LPP
//!
//! A no-std encoder for Cayenne Low Power Payload frames, the compact type-tagged
//! format used to pack several sensor channels into a single LoRa uplink.
//!
//! Every record is a 1-byte type tag, a 1-byte channel and the fixed-width,
//! big-endian fixed-point fields of its [`MeasurementKind`]. The encoder is an
//! owned [`CayenneLpp`] bounded by a maximum frame size; frames leave through the
//! [`Transport`] trait and can be read back with the [`Decoder`].
mod core;
mod decoder;
mod error;
mod kind;
mod reading;
mod transport;

pub use crate::core::{AUTO_CHANNEL_BASE, CayenneLpp, MAX_FRAME_SIZE};
pub use decoder::{Decoder, Record};
pub use error::Error;
pub use kind::{Field, MeasurementKind};
pub use reading::Reading;
pub use transport::Transport;
