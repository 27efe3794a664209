//! Inspecting raw responses received from the card.

use std::fmt;

use crate::hex::Hex;

/// Status trailer telling that more frames are available on the card.
pub const CONTINUATION_MARKER: [u8; 2] = [0x91, 0xAF];

/// Offset of the UID in the last frame of the version data.
const UID_OFFSET: usize = 1;

/// Length of the UID in octets.
pub const UID_LEN: usize = 7;

/// Determines whether the response ends with [`CONTINUATION_MARKER`].
/// Responses carrying no payload at all never do.
pub fn has_continuation(response: &[u8]) -> bool {
    response.len() > CONTINUATION_MARKER.len() && response.ends_with(&CONTINUATION_MARKER)
}

/// Extracts the UID from the response, if it is long enough to carry one.
///
/// The status trailer is not inspected here; callers decide which response the UID should be
/// taken from.
pub fn extract_identifier(response: &[u8]) -> Option<Identifier> {
    if response.len() <= UID_OFFSET + UID_LEN {
        return None;
    }

    Identifier::try_from(&response[UID_OFFSET..UID_OFFSET + UID_LEN]).ok()
}

/// Returns SW1 and SW2 of the response.
pub fn status_word(response: &[u8]) -> Option<(u8, u8)> {
    match response {
        [.., sw1, sw2] => Some((*sw1, *sw2)),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
#[error("An identifier must be 7 octets, got {0}")]
pub struct InvalidLength(pub usize);

/// The unique identifier of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Identifier([u8; UID_LEN]);

impl Identifier {
    pub fn as_bytes(&self) -> &[u8; UID_LEN] {
        &self.0
    }
}

impl From<[u8; UID_LEN]> for Identifier {
    fn from(bytes: [u8; UID_LEN]) -> Self {
        Self(bytes)
    }
}

impl<'a> TryFrom<&'a [u8]> for Identifier {
    type Error = InvalidLength;

    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; UID_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| InvalidLength(bytes.len()))
    }
}

impl AsRef<[u8]> for Identifier {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Hex(&self.0), f)
    }
}
