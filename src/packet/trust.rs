use std::fmt;

/// Holds a Trust packet.
///
/// Trust packets are used to hold implementation-specific information
/// in local keyrings.  They are not emitted when a key is exported,
/// and their contents are ignored on import; we preserve the bytes so
/// that a parsed sequence round-trips.  See [Section 5.10 of RFC
/// 4880].
///
///   [Section 5.10 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.10
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Trust {
    value: Box<[u8]>,
}

impl From<Vec<u8>> for Trust {
    fn from(u: Vec<u8>) -> Self {
        Trust {
            value: u.into_boxed_slice(),
        }
    }
}

impl fmt::Debug for Trust {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Trust")
            .field("value", &crate::fmt::hex::encode(&self.value))
            .finish()
    }
}

impl Trust {
    /// Gets the trust packet's value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}
