//! Rendering octets for humans.

use std::fmt;

/// Displays the octets as lowercase hex pairs, each followed by a single space.
///
/// ```
/// use desfire_uid::hex::Hex;
///
/// assert_eq!(Hex(&[0xde, 0xad]).to_string(), "de ad ");
/// ```
#[derive(Clone, Copy)]
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x} ", byte)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Formats the octets into a string, see [`Hex`].
pub fn format(bytes: &[u8]) -> String {
    Hex(bytes).to_string()
}
