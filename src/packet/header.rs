//! Packet headers.
//!
//! An OpenPGP packet starts with a cipher type byte (CTB) carrying
//! the packet tag, followed by a body length.  There are two header
//! formats: the old format, whose length field is sized by two bits
//! in the CTB, and the new format with a variable-width length
//! encoding.  Writers emit new-format headers; readers accept both.
//! See [Section 4.2 of RFC 4880].
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use crate::Error;
use crate::Result;
use crate::packet::Tag;

/// A packet's size.
///
/// A packet's size can be expressed in three different ways.  Either
/// the size of the packet is fully known (`Full`), the packet is
/// chunked using OpenPGP's partial body encoding (`Partial`), or the
/// packet extends until the end of the input (`Indeterminate`).  The
/// latter is only valid for old-format headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLength {
    /// Packet size is fully known.
    Full(u32),
    /// The parameter is the number of bytes in the current chunk.
    ///
    /// This type is only used with new format packets.
    Partial(u32),
    /// The packet extends until an EOF is encountered.
    ///
    /// This type is only used with old format packets.
    Indeterminate,
}

/// The parsed CTB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CTB {
    /// The packet's tag.
    pub tag: Tag,
    /// Whether the header uses the old format.
    pub old_format: bool,
    /// The length type bits for old format headers.
    pub length_type: u8,
}

impl CTB {
    /// Parses the CTB octet.
    ///
    /// The most significant bit must be set; bit 6 selects the
    /// format.
    pub fn from_byte(byte: u8) -> Result<CTB> {
        if byte & 0x80 == 0 {
            return Err(Error::MalformedPacket(
                format!("Malformed CTB: MSB of leading byte unset: {:#02x}",
                        byte)).into());
        }

        if byte & 0x40 != 0 {
            // New format.
            Ok(CTB {
                tag: (byte & 0x3f).into(),
                old_format: false,
                length_type: 0,
            })
        } else {
            // Old format.
            Ok(CTB {
                tag: ((byte & 0x3c) >> 2).into(),
                old_format: true,
                length_type: byte & 0x03,
            })
        }
    }
}

impl BodyLength {
    /// Decodes a new format body length as described in [Section
    /// 4.2.2 of RFC 4880].
    ///
    ///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
    pub(crate) fn parse_new_format(input: &[u8])
                                   -> Result<(BodyLength, usize)>
    {
        let b0 = *input.first().ok_or_else(
            || truncated("new format body length"))? as u32;
        match b0 {
            0..=191 => Ok((BodyLength::Full(b0), 1)),
            192..=223 => {
                let b1 = *input.get(1).ok_or_else(
                    || truncated("two-octet body length"))? as u32;
                Ok((BodyLength::Full(((b0 - 192) << 8) + b1 + 192), 2))
            },
            224..=254 =>
                Ok((BodyLength::Partial(1 << (b0 as u8 & 0x1f)), 1)),
            255 => {
                if input.len() < 5 {
                    return Err(truncated("five-octet body length"));
                }
                let len = u32::from_be_bytes(input[1..5].try_into().unwrap());
                Ok((BodyLength::Full(len), 5))
            },
            _ => unreachable!(),
        }
    }

    /// Decodes an old format body length as described in [Section
    /// 4.2.1 of RFC 4880].
    ///
    ///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
    pub(crate) fn parse_old_format(length_type: u8, input: &[u8])
                                   -> Result<(BodyLength, usize)>
    {
        match length_type {
            0 => {
                let b0 = *input.first().ok_or_else(
                    || truncated("one-octet body length"))?;
                Ok((BodyLength::Full(b0 as u32), 1))
            },
            1 => {
                if input.len() < 2 {
                    return Err(truncated("two-octet body length"));
                }
                let len = u16::from_be_bytes(input[..2].try_into().unwrap());
                Ok((BodyLength::Full(len as u32), 2))
            },
            2 => {
                if input.len() < 4 {
                    return Err(truncated("four-octet body length"));
                }
                let len = u32::from_be_bytes(input[..4].try_into().unwrap());
                Ok((BodyLength::Full(len), 4))
            },
            3 => Ok((BodyLength::Indeterminate, 0)),
            _ => unreachable!("two bits"),
        }
    }

    /// Emits a new format length.
    ///
    /// # Errors
    ///
    /// `BodyLength::Indeterminate` cannot be represented in the new
    /// format.
    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            BodyLength::Full(l) => {
                let l = *l;
                if l <= 191 {
                    buf.push(l as u8);
                } else if l <= 8383 {
                    let v = l - 192;
                    buf.push((v >> 8) as u8 + 192);
                    buf.push((v & 0xff) as u8);
                } else {
                    buf.push(0xff);
                    buf.extend_from_slice(&l.to_be_bytes());
                }
            },
            BodyLength::Partial(l) => {
                let l = *l;
                if l > 1 << 30 {
                    return Err(Error::InvalidArgument(
                        format!("Partial length too large: {}", l)).into());
                }
                if !l.is_power_of_two() {
                    return Err(Error::InvalidArgument(
                        format!("Partial length not a power of two: {}", l))
                               .into());
                }
                buf.push(224 + l.trailing_zeros() as u8);
            },
            BodyLength::Indeterminate =>
                return Err(Error::InvalidArgument(
                    "Indeterminate lengths are an old-format feature".into())
                           .into()),
        }
        Ok(())
    }
}

/// Emits a new format header for a packet of the given tag and
/// length.
pub(crate) fn serialize_header(buf: &mut Vec<u8>, tag: Tag, len: usize)
                               -> Result<()>
{
    buf.push(0b1100_0000 | u8::from(tag));
    BodyLength::Full(len as u32).serialize_into(buf)
}

fn truncated(what: &str) -> anyhow::Error {
    Error::MalformedPacket(format!("Truncated {}", what)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_format_lengths() {
        // One-octet.
        assert_eq!(BodyLength::parse_new_format(&[100]).unwrap(),
                   (BodyLength::Full(100), 1));
        // Two-octet: ((b0 - 192) << 8) + b1 + 192.
        assert_eq!(BodyLength::parse_new_format(&[0xc5, 0xfb]).unwrap(),
                   (BodyLength::Full(1723), 2));
        // Five-octet.
        assert_eq!(
            BodyLength::parse_new_format(&[0xff, 0, 1, 0, 0]).unwrap(),
            (BodyLength::Full(65536), 5));
        // Partial.
        assert_eq!(BodyLength::parse_new_format(&[0xef]).unwrap(),
                   (BodyLength::Partial(32768), 1));
        assert_eq!(BodyLength::parse_new_format(&[0xe1]).unwrap(),
                   (BodyLength::Partial(2), 1));
    }

    #[test]
    fn new_format_length_round_trip() {
        for len in [0u32, 1, 191, 192, 8383, 8384, 65536, 1 << 24] {
            let mut buf = Vec::new();
            BodyLength::Full(len).serialize_into(&mut buf).unwrap();
            let (parsed, consumed) =
                BodyLength::parse_new_format(&buf).unwrap();
            assert_eq!(parsed, BodyLength::Full(len));
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn shortest_encoding_is_used() {
        let mut buf = Vec::new();
        BodyLength::Full(191).serialize_into(&mut buf).unwrap();
        assert_eq!(buf.len(), 1);

        buf.clear();
        BodyLength::Full(192).serialize_into(&mut buf).unwrap();
        assert_eq!(buf.len(), 2);

        buf.clear();
        BodyLength::Full(8383).serialize_into(&mut buf).unwrap();
        assert_eq!(buf.len(), 2);

        buf.clear();
        BodyLength::Full(8384).serialize_into(&mut buf).unwrap();
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn old_format_lengths() {
        assert_eq!(BodyLength::parse_old_format(0, &[42]).unwrap(),
                   (BodyLength::Full(42), 1));
        assert_eq!(BodyLength::parse_old_format(1, &[1, 2]).unwrap(),
                   (BodyLength::Full(258), 2));
        assert_eq!(BodyLength::parse_old_format(2, &[0, 1, 0, 0]).unwrap(),
                   (BodyLength::Full(65536), 4));
        assert_eq!(BodyLength::parse_old_format(3, &[]).unwrap(),
                   (BodyLength::Indeterminate, 0));
    }

    #[test]
    fn ctb_parsing() {
        // New format literal data packet.
        let ctb = CTB::from_byte(0xcb).unwrap();
        assert_eq!(ctb.tag, Tag::Literal);
        assert!(!ctb.old_format);

        // Old format public key, one-octet length.
        let ctb = CTB::from_byte(0x98).unwrap();
        assert_eq!(ctb.tag, Tag::PublicKey);
        assert!(ctb.old_format);
        assert_eq!(ctb.length_type, 0);

        // MSB unset.
        assert!(CTB::from_byte(0x3f).is_err());
    }
}
