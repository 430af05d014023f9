use std::fmt;

/// Holds a UserAttribute packet.
///
/// A user attribute is a set of subpackets.  The only subpacket
/// defined by [Section 5.12 of RFC 4880] is the image attribute; we
/// treat the body as opaque and round-trip it byte for byte.
///
///   [Section 5.12 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.12
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UserAttribute {
    /// The user attribute.
    value: Box<[u8]>,
}

impl From<Vec<u8>> for UserAttribute {
    fn from(u: Vec<u8>) -> Self {
        UserAttribute {
            value: u.into_boxed_slice(),
        }
    }
}

impl From<&[u8]> for UserAttribute {
    fn from(u: &[u8]) -> Self {
        u.to_vec().into()
    }
}

impl fmt::Debug for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserAttribute")
            .field("bytes", &self.value.len())
            .finish()
    }
}

impl UserAttribute {
    /// Constructs a user attribute holding a JPEG image.
    ///
    /// The image is wrapped in an image attribute subpacket with a
    /// version 1 image header.
    pub fn new_jpeg(image: &[u8]) -> Self {
        // Version 1 image header: 16 octets, little-endian header
        // length, version 1, encoding 1 (JPEG), 12 reserved octets.
        let mut body = Vec::with_capacity(16 + image.len());
        body.extend_from_slice(&[0x10, 0x00, 0x01, 0x01]);
        body.extend_from_slice(&[0; 12]);
        body.extend_from_slice(image);

        // Wrap in subpacket type 1 (image attribute), using the same
        // length encoding as signature subpackets.
        let mut value = Vec::with_capacity(body.len() + 6);
        let len = 1 + body.len() as u32;
        if len < 192 {
            value.push(len as u8);
        } else if len < 16320 {
            let v = len - 192;
            value.push((v >> 8) as u8 + 192);
            value.push((v & 0xff) as u8);
        } else {
            value.push(255);
            value.extend_from_slice(&len.to_be_bytes());
        }
        value.push(1);
        value.extend_from_slice(&body);

        value.into()
    }

    /// Gets the user attribute packet's raw, unparsed value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_framing() {
        let ua = UserAttribute::new_jpeg(&[0xff, 0xd8, 0xff, 0xe0]);
        let v = ua.value();
        // Subpacket length covers type octet, image header, image.
        assert_eq!(v[0] as usize, 1 + 16 + 4);
        assert_eq!(v[1], 1);     // Image attribute.
        assert_eq!(&v[2..6], &[0x10, 0x00, 0x01, 0x01]);
        assert_eq!(&v[18..], &[0xff, 0xd8, 0xff, 0xe0]);
    }
}
