use std::fmt;

use crate::Error;
use crate::Result;
use crate::types::{DataFormat, Timestamp};

/// Holds a literal packet.
///
/// A literal packet contains unstructured data.  Since the size can
/// be very large, it is advised to process messages from
/// `std::io::Read`ers... but this crate operates on in-memory
/// buffers, so the body is simply a `Vec<u8>`.  See [Section 5.9 of
/// RFC 4880].
///
///   [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    /// A one-octet field that describes how the data is formatted.
    format: DataFormat,
    /// Filename, if any.
    ///
    /// The standard says this is up to 255 bytes.  The special name
    /// `_CONSOLE` indicates that the data is "for your eyes only".
    filename: Option<Vec<u8>>,
    /// A four-octet number that indicates a date associated with the
    /// literal data.
    date: Option<Timestamp>,
    /// The literal data packet's body.
    body: Vec<u8>,
}

/// Filename used to mark a message as sensitive, "for your eyes
/// only".
pub const CONSOLE: &[u8] = b"_CONSOLE";

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let filename = self.filename.as_ref()
            .map(|f| String::from_utf8_lossy(f));
        let threshold = 36;
        let prefix = &self.body[..std::cmp::min(threshold, self.body.len())];
        let mut prefix_fmt = crate::fmt::hex::encode(prefix);
        if self.body.len() > threshold {
            prefix_fmt.push_str("...");
        }
        prefix_fmt.push_str(&format!(" ({} bytes)", self.body.len()));

        f.debug_struct("Literal")
            .field("format", &self.format)
            .field("filename", &filename)
            .field("date", &self.date)
            .field("body", &prefix_fmt)
            .finish()
    }
}

impl Literal {
    /// Returns a new `Literal` packet.
    pub fn new(format: DataFormat) -> Literal {
        Literal {
            format,
            filename: None,
            date: None,
            body: Vec::with_capacity(0),
        }
    }

    /// Gets the Literal packet's body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the Literal packet's body.
    pub fn set_body(&mut self, data: Vec<u8>) {
        self.body = data;
    }

    /// Gets the Literal packet's content disposition.
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Sets the Literal packet's content disposition.
    pub fn set_format(&mut self, format: DataFormat) {
        self.format = format;
    }

    /// Gets the literal packet's filename.
    ///
    /// Note: when a literal data packet is protected by a signature,
    /// only the literal data packet's body is protected, not the
    /// meta-data.  As such, this field should normally be ignored.
    pub fn filename(&self) -> Option<&[u8]> {
        self.filename.as_deref()
    }

    /// Sets the literal packet's filename field.
    ///
    /// The standard does not specify the encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename is longer than 255 bytes,
    /// the maximum the wire format can represent.
    pub fn set_filename(&mut self, filename: &[u8]) -> Result<()> {
        if filename.len() > 255 {
            return Err(Error::InvalidArgument(
                format!("filename too long: {} bytes", filename.len()))
                       .into());
        }
        self.filename = if filename.is_empty() {
            None
        } else {
            Some(filename.to_vec())
        };
        Ok(())
    }

    /// Returns whether the literal data is marked "for your eyes
    /// only", i.e. the filename is `_CONSOLE`.
    pub fn is_sensitive(&self) -> bool {
        self.filename.as_deref() == Some(CONSOLE)
    }

    /// Gets the literal packet's date field.
    ///
    /// Note: when a literal data packet is protected by a signature,
    /// only the literal data packet's body is protected, not the
    /// meta-data.  As such, this field should normally be ignored.
    pub fn date(&self) -> Option<Timestamp> {
        self.date
    }

    /// Sets the literal packet's date field.
    pub fn set_date(&mut self, timestamp: Option<Timestamp>) {
        self.date = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_filename() {
        let mut l = Literal::new(DataFormat::Text);
        assert!(!l.is_sensitive());
        l.set_filename(b"_CONSOLE").unwrap();
        assert!(l.is_sensitive());
    }

    #[test]
    fn overlong_filename_is_rejected() {
        let mut l = Literal::new(DataFormat::Binary);
        assert!(l.set_filename(&[b'x'; 256]).is_err());
        assert!(l.set_filename(&[b'x'; 255]).is_ok());
    }
}
