//! A crate to read the UID of a DESFire-style card through an APDU delegate.
//!
//! The card is asked for its version data with a fixed chain of commands; the last frame of that
//! data carries the UID. The chain itself is driven by [`sequencer::Sequencer`], which does no I/O
//! by itself, while [`session`] binds it to a connection opened from a [`nfc::Card`].

#[macro_use]
mod log;

#[cfg(feature = "pcsc")]
pub mod pcsc;

#[cfg(test)]
pub(crate) mod test_support;

pub mod hex;
pub mod nfc;
pub mod response;
pub mod sequencer;
pub mod session;

pub use response::Identifier;
pub use sequencer::{ExchangeStep, SequenceOutcome, Stage};
pub use session::{handle_card_present, handle_card_present_with, CardSession};
