//! Communicating with the card using NFC technology

use std::fmt;

use crate::hex::Hex;

/// CLA of the card's native commands wrapped in ISO 7816-4 frames.
const CLA_NATIVE: u8 = 0x90;

const INS_GET_VERSION: u8 = 0x60;
const INS_ADDITIONAL_FRAME: u8 = 0xAF;

/// Requests the hardware related part of the version data.
pub const HARDWARE: Command = Command::new(CLA_NATIVE, INS_GET_VERSION, 0x00, 0x00, 0x00);

/// Requests the software related part of the version data.
pub const SOFTWARE: Command = Command::new(CLA_NATIVE, INS_ADDITIONAL_FRAME, 0x00, 0x00, 0x00);

/// Requests the last part of the version data, which carries the UID.
/// Same octets as [`SOFTWARE`].
pub const UID: Command = Command::new(CLA_NATIVE, INS_ADDITIONAL_FRAME, 0x00, 0x00, 0x00);

/// An APDU command to be transmitted, consisting of CLA, INS, P1, P2 and Le.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Command([u8; 5]);

impl Command {
    /// Constructs a command with CLA, INS, P1, P2 and Le.
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8, le: u8) -> Self {
        Self([cla, ins, p1, p2, le])
    }

    pub fn cla(&self) -> u8 {
        self.0[0]
    }

    pub fn ins(&self) -> u8 {
        self.0[1]
    }

    pub fn p1(&self) -> u8 {
        self.0[2]
    }

    pub fn p2(&self) -> u8 {
        self.0[3]
    }

    pub fn le(&self) -> u8 {
        self.0[4]
    }

    /// Octets to be put on the wire.
    pub fn as_bytes(&self) -> &[u8; 5] {
        &self.0
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Command> for Vec<u8> {
    fn from(command: Command) -> Self {
        command.0.to_vec()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Command").field(&Hex(&self.0)).finish()
    }
}

/// A delegate to transmit commands to the card and receive their responses
pub trait Transmit {
    type Error;

    /// Transmits the command to the card, then receives the raw response from them.
    /// The response still carries its status trailer, and may be shorter than the trailer itself.
    /// Implementations must fail with an error when the connection is lost.
    fn transmit(&self, command: &Command) -> Result<Vec<u8>, Self::Error>;
}

impl<T> Transmit for &T
where
    T: Transmit + ?Sized,
{
    type Error = T::Error;

    fn transmit(&self, command: &Command) -> Result<Vec<u8>, Self::Error> {
        (**self).transmit(command)
    }
}

/// A card presented to a reader, which can be connected to transmit commands.
pub trait Card {
    /// A connection to the card. It is released when dropped.
    type Connection: Transmit;

    /// Opens a connection to the card.
    fn connect(&self) -> Result<Self::Connection, <Self::Connection as Transmit>::Error>;
}

/// Error type shared by a card and its connections.
pub type CardError<C> = <<C as Card>::Connection as Transmit>::Error;
