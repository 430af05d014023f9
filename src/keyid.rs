use std::fmt;

use crate::Result;

/// Holds a KeyID.
///
/// A KeyID is a fingerprint fragment.  It identifies a public key,
/// but is easy to forge.  For more details about how a KeyID is
/// generated, see [Section 12.2 of RFC 4880].
///
///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub enum KeyID {
    /// Lower 8 bytes of a 20 byte SHA-1 hash.
    V4([u8; 8]),
    /// Used for holding KeyIDs that we don't understand.  For
    /// instance, we don't grok v3 KeyIDs.  And, it is possible that
    /// an Issuer subpacket contains the wrong number of bytes.
    Invalid(Box<[u8]>),
}

impl From<u64> for KeyID {
    fn from(id: u64) -> Self {
        KeyID::V4(id.to_be_bytes())
    }
}

impl fmt::Display for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.convert_to_string(true))
    }
}

impl fmt::Debug for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("KeyID")
            .field(&self.to_string())
            .finish()
    }
}

impl fmt::UpperHex for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.convert_to_string(false))
    }
}

impl std::str::FromStr for KeyID {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = crate::fmt::from_hex(s, true)
            .ok_or_else(|| crate::Error::InvalidArgument(
                format!("Not a hexadecimal KeyID: {:?}", s)))?;
        Ok(KeyID::from_bytes(&bytes))
    }
}

impl KeyID {
    /// Reads a KeyID from a byte slice.
    ///
    /// This never fails: unexpected lengths are preserved as
    /// `KeyID::Invalid`.
    pub fn from_bytes(raw: &[u8]) -> KeyID {
        if raw.len() == 8 {
            let mut keyid: [u8; 8] = Default::default();
            keyid.copy_from_slice(raw);
            KeyID::V4(keyid)
        } else {
            KeyID::Invalid(raw.to_vec().into_boxed_slice())
        }
    }

    /// Returns the wildcard KeyID, i.e., all zeros.
    ///
    /// A wildcard KeyID is emitted in place of the real issuer or
    /// recipient when the caller requested that the key ID be
    /// "thrown"; consumers must then trial-verify or trial-decrypt.
    pub fn wildcard() -> Self {
        KeyID::V4([0; 8])
    }

    /// Returns true if this is the wildcard KeyID.
    pub fn is_wildcard(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }

    /// Returns the raw KeyID as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyID::V4(id) => id,
            KeyID::Invalid(id) => id,
        }
    }

    /// Converts this KeyID to its canonical hexadecimal
    /// representation.
    pub fn to_hex(&self) -> String {
        crate::fmt::to_hex(self.as_bytes(), false)
    }

    fn convert_to_string(&self, spaces: bool) -> String {
        let raw = self.as_bytes();
        let mut output = Vec::with_capacity(raw.len() * 2 + raw.len() / 2);

        for (i, b) in raw.iter().enumerate() {
            if spaces && i > 0 && i % 2 == 0 {
                output.push(b' ');
            }

            let top = b >> 4;
            let bottom = b & 0xF;
            output.push(char::from_digit(top as u32, 16).unwrap()
                        .to_ascii_uppercase() as u8);
            output.push(char::from_digit(bottom as u32, 16).unwrap()
                        .to_ascii_uppercase() as u8);
        }

        String::from_utf8(output).unwrap()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_u64_round_trip() {
        let id = KeyID::from(0x9B7DD433F254904Au64);
        assert_eq!(id.to_hex(), "9B7DD433F254904A");
        assert_eq!(id, "9B7D D433 F254 904A".parse().unwrap());
    }

    #[test]
    fn wildcard() {
        assert!(KeyID::wildcard().is_wildcard());
        assert_eq!(KeyID::wildcard().to_hex(), "0000000000000000");
        assert!(!KeyID::from(1u64).is_wildcard());
    }
}
