/// Holds a Marker packet.
///
/// See [Section 5.8 of RFC 4880] for details.  The body is the
/// literal string `PGP`; the packet must be ignored when received.
///
///   [Section 5.8 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.8
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Marker {
}

impl Marker {
    /// The body of the marker packet.
    pub(crate) const BODY: &'static [u8] = b"PGP";

    /// Returns a new Marker packet.
    pub fn new() -> Self {
        Marker {}
    }
}
