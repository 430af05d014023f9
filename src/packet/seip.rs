use std::fmt;

/// Holds an encrypted data packet.
///
/// An encrypted data packet is a container; its body holds the
/// version octet followed by the ciphertext.  Only version 1, the
/// MDC-protected variant, is defined.  See [Section 5.13 of RFC
/// 4880] for details.
///
///   [Section 5.13 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.13
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SEIP {
    /// The ciphertext: a random block-sized prefix with quick-check
    /// octets, the inner packets, and the trailing MDC packet, all
    /// encrypted in CFB mode.
    body: Vec<u8>,
}

impl fmt::Debug for SEIP {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SEIP")
            .field("version", &self.version())
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl SEIP {
    /// Creates a new SEIP packet with the given ciphertext.
    pub fn new(ciphertext: Vec<u8>) -> Self {
        SEIP { body: ciphertext }
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        1
    }

    /// Gets the ciphertext (excluding the version octet).
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Gets a mutable reference to the ciphertext.
    #[cfg(test)]
    pub(crate) fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }
}
