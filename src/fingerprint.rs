use std::fmt;

use crate::KeyID;
use crate::Result;

/// Holds a fingerprint.
///
/// A fingerprint uniquely identifies a public key.  It is the SHA-1
/// hash over the canonical form of the public key packet.  For more
/// details about how a fingerprint is generated, see [Section 12.2 of
/// RFC 4880].
///
///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub enum Fingerprint {
    /// 20 byte SHA-1 hash.
    V4([u8; 20]),
    /// Used for holding fingerprints that we don't understand.  For
    /// instance, we don't grok v3 fingerprints.  And, it is possible
    /// that a subpacket contains the wrong number of bytes.
    Invalid(Box<[u8]>),
}

impl From<&Fingerprint> for KeyID {
    fn from(fp: &Fingerprint) -> Self {
        fp.clone().into()
    }
}

impl From<Fingerprint> for KeyID {
    fn from(fp: Fingerprint) -> Self {
        match fp {
            Fingerprint::V4(fp) => {
                let mut keyid = [0; 8];
                keyid.copy_from_slice(&fp[12..]);
                KeyID::V4(keyid)
            },
            Fingerprint::Invalid(fp) => KeyID::Invalid(fp),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.convert_to_string())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Fingerprint")
            .field(&self.to_string())
            .finish()
    }
}

impl std::str::FromStr for Fingerprint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = crate::fmt::from_hex(s, true)
            .ok_or_else(|| crate::Error::InvalidArgument(
                format!("Not a hexadecimal fingerprint: {:?}", s)))?;
        Ok(Fingerprint::from_bytes(&bytes))
    }
}

impl Fingerprint {
    /// Reads a fingerprint from a byte slice.
    ///
    /// This never fails: unexpected lengths are preserved as
    /// `Fingerprint::Invalid`.
    pub fn from_bytes(raw: &[u8]) -> Fingerprint {
        if raw.len() == 20 {
            let mut fp: [u8; 20] = Default::default();
            fp.copy_from_slice(raw);
            Fingerprint::V4(fp)
        } else {
            Fingerprint::Invalid(raw.to_vec().into_boxed_slice())
        }
    }

    /// Returns the raw fingerprint as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Fingerprint::V4(fp) => fp,
            Fingerprint::Invalid(fp) => fp,
        }
    }

    /// Converts this fingerprint to its canonical hexadecimal
    /// representation.
    pub fn to_hex(&self) -> String {
        crate::fmt::to_hex(self.as_bytes(), false)
    }

    /// Returns the key ID, i.e., the low 8 bytes of the fingerprint.
    pub fn to_keyid(&self) -> KeyID {
        self.into()
    }

    // Converts the fingerprint to a string for display, with spaces
    // every four digits and a gap in the middle, the way GnuPG prints
    // fingerprints.
    fn convert_to_string(&self) -> String {
        let raw = self.as_bytes();
        let mut output = Vec::with_capacity(raw.len() * 2 + raw.len() / 2 + 1);

        for (i, b) in raw.iter().enumerate() {
            if i > 0 && i % 2 == 0 {
                output.push(b' ');
            }
            if raw.len() == 20 && i == raw.len() / 2 {
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
    fn v4_to_keyid() {
        let fp: Fingerprint =
            "CBCD8F030588653EEDD7E2659B7DD433F254904A".parse().unwrap();
        assert_eq!(format!("{:X}", fp.to_keyid()), "9B7DD433F254904A");
    }

    #[test]
    fn hex_formatting() {
        let fp: Fingerprint =
            "CBCD 8F03 0588 653E EDD7  E265 9B7D D433 F254 904A"
            .parse().unwrap();
        assert_eq!(fp.to_hex(), "CBCD8F030588653EEDD7E2659B7DD433F254904A");
        assert_eq!(fp.to_string(),
                   "CBCD 8F03 0588 653E EDD7  E265 9B7D D433 F254 904A");
    }

    #[test]
    fn bad_length_is_invalid() {
        let fp = Fingerprint::from_bytes(&[0x12, 0x34]);
        assert!(matches!(fp, Fingerprint::Invalid(_)));
    }
}
