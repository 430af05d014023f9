use std::fmt;

/// Holds a modification detection code packet.
///
/// The MDC packet holds a SHA-1 hash over the plaintext (including
/// the random prefix and the MDC packet's own header).  It is the
/// mandatory trailer of the SEIP container.  See [Section 5.14 of RFC
/// 4880] for details.
///
///   [Section 5.14 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.14
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MDC {
    /// Our SHA-1 hash.
    computed_digest: [u8; 20],
    /// A 20-octet SHA-1 hash of the preceding plaintext data.
    digest: [u8; 20],
}

impl fmt::Debug for MDC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MDC")
            .field("digest", &crate::fmt::hex::encode(self.digest))
            .field("computed_digest",
                   &crate::fmt::hex::encode(self.computed_digest))
            .finish()
    }
}

impl MDC {
    /// Creates an MDC packet.
    pub fn new(digest: [u8; 20]) -> Self {
        MDC {
            computed_digest: digest,
            digest,
        }
    }

    /// Creates an MDC packet with an explicitly computed digest.
    pub(crate) fn from_parts(computed_digest: [u8; 20], digest: [u8; 20])
                             -> Self
    {
        MDC { computed_digest, digest }
    }

    /// Gets the stored digest.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Gets the locally computed digest.
    pub fn computed_digest(&self) -> &[u8] {
        &self.computed_digest
    }

    /// Returns whether the data was tampered with.
    pub fn valid(&self) -> bool {
        self.computed_digest == self.digest
    }
}
