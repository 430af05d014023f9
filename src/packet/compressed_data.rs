use std::fmt;
use std::io::{Read, Write};

use crate::Error;
use crate::Result;
use crate::types::CompressionAlgorithm;

/// Holds a compressed data packet.
///
/// A compressed data packet is a container; its body holds the
/// compressed serialization of a message.  The compressed bytes are
/// kept verbatim so that re-serializing a parsed packet is
/// byte-exact.  See [Section 5.6 of RFC 4880].
///
///   [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompressedData {
    algo: CompressionAlgorithm,
    /// The compressed data.
    body: Vec<u8>,
}

impl fmt::Debug for CompressedData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompressedData")
            .field("algo", &self.algo)
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl CompressedData {
    /// Compresses `data` using the given algorithm.
    pub fn compress(algo: CompressionAlgorithm, data: &[u8])
                    -> Result<CompressedData>
    {
        let body = match algo {
            CompressionAlgorithm::Uncompressed => data.to_vec(),
            CompressionAlgorithm::Zip => {
                let mut enc = flate2::write::DeflateEncoder::new(
                    Vec::new(), flate2::Compression::default());
                enc.write_all(data)?;
                enc.finish()?
            },
            CompressionAlgorithm::Zlib => {
                let mut enc = flate2::write::ZlibEncoder::new(
                    Vec::new(), flate2::Compression::default());
                enc.write_all(data)?;
                enc.finish()?
            },
            CompressionAlgorithm::BZip2 => {
                let mut enc = bzip2::write::BzEncoder::new(
                    Vec::new(), bzip2::Compression::default());
                enc.write_all(data)?;
                enc.finish()?
            },
            a => return Err(
                Error::UnsupportedCompressionAlgorithm(a).into()),
        };

        Ok(CompressedData { algo, body })
    }

    /// Creates a compressed data packet from its wire
    /// representation.
    pub(crate) fn from_raw(algo: CompressionAlgorithm, body: Vec<u8>)
                           -> CompressedData
    {
        CompressedData { algo, body }
    }

    /// Returns the compression algorithm.
    pub fn algo(&self) -> CompressionAlgorithm {
        self.algo
    }

    /// Returns the raw compressed body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decompresses the body.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self.algo {
            CompressionAlgorithm::Uncompressed =>
                out.extend_from_slice(&self.body),
            CompressionAlgorithm::Zip => {
                flate2::read::DeflateDecoder::new(&self.body[..])
                    .read_to_end(&mut out)?;
            },
            CompressionAlgorithm::Zlib => {
                flate2::read::ZlibDecoder::new(&self.body[..])
                    .read_to_end(&mut out)?;
            },
            CompressionAlgorithm::BZip2 => {
                bzip2::read::BzDecoder::new(&self.body[..])
                    .read_to_end(&mut out)?;
            },
            a => return Err(
                Error::UnsupportedCompressionAlgorithm(a).into()),
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_algorithms() {
        let data = b"Hello world, hello world, hello world, hello world!";
        for algo in [CompressionAlgorithm::Uncompressed,
                     CompressionAlgorithm::Zip,
                     CompressionAlgorithm::Zlib,
                     CompressionAlgorithm::BZip2] {
            let c = CompressedData::compress(algo, data).unwrap();
            assert_eq!(c.decompress().unwrap(), data);
        }
    }

    #[test]
    fn compression_shrinks_repetitive_input() {
        let data = vec![0x41u8; 4096];
        let c = CompressedData::compress(CompressionAlgorithm::Zlib, &data)
            .unwrap();
        assert!(c.body().len() < data.len());
    }
}
