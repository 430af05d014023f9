use std::fmt;

use crate::packet::Tag;

/// Holds an unknown packet.
///
/// This is used by the parser to hold packets that it doesn't
/// understand: unknown tags, but also known packets with unsupported
/// versions or unparseable bodies.  An unknown packet round-trips
/// losslessly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Unknown {
    /// Packet tag.
    tag: Tag,
    /// The unparsed body.
    body: Vec<u8>,
}

impl fmt::Debug for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Unknown")
            .field("tag", &self.tag)
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl Unknown {
    /// Returns a new `Unknown` packet.
    pub fn new(tag: Tag, body: Vec<u8>) -> Self {
        Unknown { tag, body }
    }

    /// Gets the unknown packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Gets the unknown packet's body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
