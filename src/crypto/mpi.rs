//! Multiprecision Integers.
//!
//! Cryptographic objects in OpenPGP are represented as bags of
//! multiprecision integers whose layout is algorithm-specific.  This
//! module provides a typed and structured way of storing those bags:
//! [`PublicKey`], [`SecretKeyMaterial`], [`Ciphertext`], and
//! [`Signature`].

use std::fmt;
use std::cmp::Ordering;

use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm,
                   SymmetricAlgorithm};
use crate::crypto::mem::{secure_cmp, Protected};

use crate::Error;
use crate::Result;

/// A Multiprecision Integer.
///
/// An MPI is serialized as a 16-bit big-endian bit count followed by
/// the big-endian magnitude with no leading zero octets.
#[derive(Clone)]
pub struct MPI {
    /// Integer value as big-endian.
    value: Box<[u8]>,
}

impl From<Vec<u8>> for MPI {
    fn from(v: Vec<u8>) -> Self {
        Self::new(&v)
    }
}

impl MPI {
    /// Creates a new MPI.
    ///
    /// This function takes care of leading zeros.
    pub fn new(value: &[u8]) -> Self {
        let offset = value.iter().take_while(|&&b| b == 0).count();
        MPI {
            value: Vec::from(&value[offset..]).into_boxed_slice(),
        }
    }

    /// Creates a new MPI encoding an uncompressed EC point.
    ///
    /// Encodes the given point on a NIST curve as 0x04 || x || y, the
    /// uncompressed format from [Section 6 of RFC 6637].
    ///
    ///   [Section 6 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-6
    pub fn new_point(x: &[u8], y: &[u8], field_bits: usize) -> Self {
        let field_sz = (field_bits + 7) / 8;
        let mut val = vec![0u8; 1 + 2 * field_sz];
        let x_missing = field_sz - x.len();
        let y_missing = field_sz - y.len();

        val[0] = 0x4;
        val[1 + x_missing..1 + field_sz].copy_from_slice(x);
        val[1 + field_sz + y_missing..].copy_from_slice(y);

        MPI {
            value: val.into_boxed_slice(),
        }
    }

    /// Creates a new MPI encoding a compressed EC point using the
    /// Curve25519 conventions, i.e. a 0x40 prefix and the native
    /// encoding of the point.
    pub fn new_compressed_point(x: &[u8]) -> Self {
        let mut val = vec![0; 1 + x.len()];
        val[0] = 0x40;
        val[1..].copy_from_slice(x);

        MPI {
            value: val.into_boxed_slice(),
        }
    }

    /// Returns the length of the MPI in bits.
    pub fn bits(&self) -> usize {
        self.value.len() * 8
            - self.value.first().map(|&b| b.leading_zeros() as usize)
                  .unwrap_or(0)
    }

    /// Returns the value of this MPI.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the value of this MPI zero-padded to the given length.
    ///
    /// MPI-encoding strips leading zero-bytes.  This adds them back
    /// where a fixed-width encoding is required, e.g. the secret part
    /// of a Curve25519 key.
    pub fn value_padded(&self, to: usize) -> Result<Vec<u8>> {
        if self.value.len() > to {
            return Err(Error::InvalidOperation(
                format!("MPI is larger than {} bytes", to)).into());
        }
        let mut v = vec![0; to];
        v[to - self.value.len()..].copy_from_slice(&self.value);
        Ok(v)
    }

    /// Dissects this MPI describing a point into the individual
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedEllipticCurve` if the curve is not
    /// supported, `Error::MalformedMPI` if the point is formatted
    /// incorrectly.
    pub fn decode_point(&self, curve: &Curve) -> Result<(&[u8], &[u8])> {
        use self::Curve::*;
        match curve {
            Ed25519 | Cv25519 => {
                // This curve uses a custom compression format which
                // only contains the X coordinate.
                if self.value().len() != 1 + 32 {
                    return Err(Error::MalformedMPI(
                        format!("Bad size of Curve25519 key: {} expected: {}",
                                self.value().len(), 1 + 32)).into());
                }

                if self.value().first().map(|&b| b != 0x40).unwrap_or(true) {
                    return Err(Error::MalformedMPI(
                        "Bad encoding of Curve25519 key".into()).into());
                }

                Ok((&self.value()[1..], &[]))
            },

            _ => {
                // Length of one coordinate in bytes, rounded up.
                let coordinate_length = (curve.bits()? + 7) / 8;

                // Check length of Q.
                let expected_length =
                    1 // 0x04.
                    + (2 // (x, y)
                       * coordinate_length);

                if self.value().len() != expected_length {
                    return Err(Error::MalformedMPI(
                        format!("Invalid length of MPI: {} (expected {})",
                                self.value().len(), expected_length)).into());
                }

                if self.value().first().map(|&b| b != 0x04).unwrap_or(true) {
                    return Err(Error::MalformedMPI(
                        format!("Bad prefix: {:?} (expected Some(0x04))",
                                self.value().first())).into());
                }

                Ok((&self.value()[1..1 + coordinate_length],
                    &self.value()[1 + coordinate_length..]))
            },
        }
    }

    /// Writes the MPI to the given buffer: 16-bit big-endian bit
    /// count, then the magnitude.
    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) {
        let len = self.bits() as u16;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&self.value);
    }

    /// Returns the length of the serialized form.
    pub(crate) fn serialized_len(&self) -> usize {
        2 + self.value.len()
    }

    fn secure_memcmp(&self, other: &Self) -> Ordering {
        secure_cmp(&self.value, &other.value)
    }
}

impl fmt::Debug for MPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_fmt(format_args!(
            "{} bits: {}", self.bits(),
            crate::fmt::to_hex(&self.value, true)))
    }
}

impl PartialOrd for MPI {
    fn partial_cmp(&self, other: &MPI) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MPI {
    fn cmp(&self, other: &MPI) -> Ordering {
        self.secure_memcmp(other)
    }
}

impl PartialEq for MPI {
    fn eq(&self, other: &MPI) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MPI {}

impl std::hash::Hash for MPI {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// A Multiprecision Integer holding secrets.
///
/// The memory is cleared when the object is dropped.
#[derive(Clone)]
pub struct ProtectedMPI {
    /// Integer value as big-endian.
    value: Protected,
}

impl From<Vec<u8>> for ProtectedMPI {
    fn from(m: Vec<u8>) -> Self {
        MPI::from(m).into()
    }
}

impl From<Protected> for ProtectedMPI {
    fn from(m: Protected) -> Self {
        MPI::new(&m).into()
    }
}

impl From<MPI> for ProtectedMPI {
    fn from(m: MPI) -> Self {
        ProtectedMPI {
            value: m.value.into(),
        }
    }
}

impl PartialOrd for ProtectedMPI {
    fn partial_cmp(&self, other: &ProtectedMPI) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProtectedMPI {
    fn cmp(&self, other: &ProtectedMPI) -> Ordering {
        secure_cmp(&self.value, &other.value)
    }
}

impl PartialEq for ProtectedMPI {
    fn eq(&self, other: &ProtectedMPI) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProtectedMPI {}

impl std::hash::Hash for ProtectedMPI {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl ProtectedMPI {
    /// Returns the length of the MPI in bits.
    pub fn bits(&self) -> usize {
        self.value.len() * 8
            - self.value.first().map(|&b| b.leading_zeros() as usize)
                  .unwrap_or(0)
    }

    /// Returns the value of this MPI.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the value of this MPI zero-padded to the given length.
    pub fn value_padded(&self, to: usize) -> Result<Protected> {
        if self.value.len() > to {
            return Err(Error::InvalidOperation(
                format!("MPI is larger than {} bytes", to)).into());
        }
        let mut v: Protected = vec![0; to].into();
        v[to - self.value.len()..].copy_from_slice(&self.value);
        Ok(v)
    }

    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) {
        let len = self.bits() as u16;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&self.value);
    }

    pub(crate) fn serialized_len(&self) -> usize {
        2 + self.value.len()
    }
}

impl fmt::Debug for ProtectedMPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if cfg!(debug_assertions) {
            f.write_fmt(format_args!(
                "{} bits: {}", self.bits(),
                crate::fmt::to_hex(&self.value, true)))
        } else {
            f.write_str("<Redacted>")
        }
    }
}

/// A public key.
///
/// Provides a typed and structured way of storing multiple MPIs (and
/// the occasional elliptic curve) in packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum PublicKey {
    /// RSA public key.
    RSA {
        /// Public exponent
        e: MPI,
        /// Public modulo N = pq.
        n: MPI,
    },

    /// NIST DSA public key.
    DSA {
        /// Prime of the ring Zp.
        p: MPI,
        /// Order of `g` in Zp.
        q: MPI,
        /// Public generator of Zp.
        g: MPI,
        /// Public key g**x mod p.
        y: MPI,
    },

    /// ElGamal public key.
    ElGamal {
        /// Prime of the ring Zp.
        p: MPI,
        /// Generator of Zp.
        g: MPI,
        /// Public key g**x mod p.
        y: MPI,
    },

    /// DJB's "Twisted" Edwards curve DSA public key.
    EdDSA {
        /// Curve we're using.  Must be curve 25519.
        curve: Curve,
        /// Public point.
        q: MPI,
    },

    /// NIST's ECDSA public key.
    ECDSA {
        /// Curve we're using.
        curve: Curve,
        /// Public point.
        q: MPI,
    },

    /// Elliptic curve ElGamal public key.
    ECDH {
        /// Curve we're using.
        curve: Curve,
        /// Public point.
        q: MPI,
        /// Algorithm used to derive the Key Encapsulation Key.
        hash: HashAlgorithm,
        /// Algorithm used to encapsulate the session key.
        sym: SymmetricAlgorithm,
    },

    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[MPI]>,
        /// Any data that failed to parse.
        rest: Box<[u8]>,
    },
}

impl PublicKey {
    /// Returns the length of the public key in bits.
    ///
    /// For finite field crypto this returns the size of the field we
    /// operate in, for ECC it returns `Curve::bits()`.
    pub fn bits(&self) -> Option<usize> {
        use self::PublicKey::*;
        match self {
            RSA { n, .. } => Some(n.bits()),
            DSA { p, .. } => Some(p.bits()),
            ElGamal { p, .. } => Some(p.bits()),
            EdDSA { curve, .. } => curve.bits().ok(),
            ECDSA { curve, .. } => curve.bits().ok(),
            ECDH { curve, .. } => curve.bits().ok(),
            Unknown { .. } => None,
        }
    }

    /// Returns, if known, the public-key algorithm for this public key.
    pub fn algo(&self) -> Option<PublicKeyAlgorithm> {
        use self::PublicKey::*;
        match self {
            RSA { .. } => Some(PublicKeyAlgorithm::RSAEncryptSign),
            DSA { .. } => Some(PublicKeyAlgorithm::DSA),
            ElGamal { .. } => Some(PublicKeyAlgorithm::ElGamalEncrypt),
            EdDSA { .. } => Some(PublicKeyAlgorithm::EdDSA),
            ECDSA { .. } => Some(PublicKeyAlgorithm::ECDSA),
            ECDH { .. } => Some(PublicKeyAlgorithm::ECDH),
            Unknown { .. } => None,
        }
    }

    /// Writes the public key MPIs in their canonical packet form.
    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) {
        use self::PublicKey::*;
        match self {
            RSA { e, n } => {
                n.serialize_into(buf);
                e.serialize_into(buf);
            },
            DSA { p, q, g, y } => {
                p.serialize_into(buf);
                q.serialize_into(buf);
                g.serialize_into(buf);
                y.serialize_into(buf);
            },
            ElGamal { p, g, y } => {
                p.serialize_into(buf);
                g.serialize_into(buf);
                y.serialize_into(buf);
            },
            EdDSA { curve, q } | ECDSA { curve, q } => {
                buf.push(curve.oid().len() as u8);
                buf.extend_from_slice(curve.oid());
                q.serialize_into(buf);
            },
            ECDH { curve, q, hash, sym } => {
                buf.push(curve.oid().len() as u8);
                buf.extend_from_slice(curve.oid());
                q.serialize_into(buf);
                // KDF parameters.
                buf.push(3);    // Length.
                buf.push(1);    // Reserved.
                buf.push((*hash).into());
                buf.push((*sym).into());
            },
            Unknown { mpis, rest } => {
                for mpi in mpis.iter() {
                    mpi.serialize_into(buf);
                }
                buf.extend_from_slice(rest);
            },
        }
    }

    pub(crate) fn serialized_len(&self) -> usize {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf.len()
    }
}

/// A secret key.
///
/// Provides a typed and structured way of storing multiple MPIs in
/// packets.  Secret key components are protected and are cleared when
/// dropped.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum SecretKeyMaterial {
    /// RSA secret key.
    RSA {
        /// Secret exponent, inverse of e in Phi(N).
        d: ProtectedMPI,
        /// Smaller secret prime.
        p: ProtectedMPI,
        /// Larger secret prime.
        q: ProtectedMPI,
        /// Inverse of p mod q.
        u: ProtectedMPI,
    },

    /// NIST DSA secret key.
    DSA {
        /// Secret key log_g(y) in Zp.
        x: ProtectedMPI,
    },

    /// ElGamal secret key.
    ElGamal {
        /// Secret key log_g(y) in Zp.
        x: ProtectedMPI,
    },

    /// DJB's "Twisted" Edwards curve DSA secret key.
    EdDSA {
        /// Secret scalar.
        scalar: ProtectedMPI,
    },

    /// NIST's ECDSA secret key.
    ECDSA {
        /// Secret scalar.
        scalar: ProtectedMPI,
    },

    /// Elliptic curve ElGamal secret key.
    ECDH {
        /// Secret scalar.
        scalar: ProtectedMPI,
    },

    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[ProtectedMPI]>,
        /// Any data that failed to parse.
        rest: Protected,
    },
}

impl SecretKeyMaterial {
    /// Returns, if known, the public-key algorithm for this secret
    /// key.
    pub fn algo(&self) -> Option<PublicKeyAlgorithm> {
        use self::SecretKeyMaterial::*;
        match self {
            RSA { .. } => Some(PublicKeyAlgorithm::RSAEncryptSign),
            DSA { .. } => Some(PublicKeyAlgorithm::DSA),
            ElGamal { .. } => Some(PublicKeyAlgorithm::ElGamalEncrypt),
            EdDSA { .. } => Some(PublicKeyAlgorithm::EdDSA),
            ECDSA { .. } => Some(PublicKeyAlgorithm::ECDSA),
            ECDH { .. } => Some(PublicKeyAlgorithm::ECDH),
            Unknown { .. } => None,
        }
    }

    /// Writes the secret key MPIs in their canonical packet form.
    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) {
        use self::SecretKeyMaterial::*;
        match self {
            RSA { d, p, q, u } => {
                d.serialize_into(buf);
                p.serialize_into(buf);
                q.serialize_into(buf);
                u.serialize_into(buf);
            },
            DSA { x } | ElGamal { x } => x.serialize_into(buf),
            EdDSA { scalar } | ECDSA { scalar } | ECDH { scalar } =>
                scalar.serialize_into(buf),
            Unknown { mpis, rest } => {
                for mpi in mpis.iter() {
                    mpi.serialize_into(buf);
                }
                buf.extend_from_slice(rest);
            },
        }
    }
}

/// An encrypted session key.
///
/// Provides a typed and structured way of storing multiple MPIs in
/// packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum Ciphertext {
    /// RSA ciphertext.
    RSA {
        /// m^e mod N.
        c: MPI,
    },

    /// ElGamal ciphertext.
    ElGamal {
        /// Ephemeral key.
        e: MPI,
        /// Ciphertext.
        c: MPI,
    },

    /// Elliptic curve ElGamal public key.
    ECDH {
        /// Ephemeral key.
        e: MPI,
        /// Symmetrically encrypted session key.
        key: Box<[u8]>,
    },

    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[MPI]>,
        /// Any data that failed to parse.
        rest: Box<[u8]>,
    },
}

impl Ciphertext {
    /// Returns, if known, the public-key algorithm for this
    /// ciphertext.
    pub fn pk_algo(&self) -> Option<PublicKeyAlgorithm> {
        use self::Ciphertext::*;
        match self {
            RSA { .. } => Some(PublicKeyAlgorithm::RSAEncryptSign),
            ElGamal { .. } => Some(PublicKeyAlgorithm::ElGamalEncrypt),
            ECDH { .. } => Some(PublicKeyAlgorithm::ECDH),
            Unknown { .. } => None,
        }
    }

    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) {
        use self::Ciphertext::*;
        match self {
            RSA { c } => c.serialize_into(buf),
            ElGamal { e, c } => {
                e.serialize_into(buf);
                c.serialize_into(buf);
            },
            ECDH { e, key } => {
                e.serialize_into(buf);
                buf.push(key.len() as u8);
                buf.extend_from_slice(key);
            },
            Unknown { mpis, rest } => {
                for mpi in mpis.iter() {
                    mpi.serialize_into(buf);
                }
                buf.extend_from_slice(rest);
            },
        }
    }
}

/// A cryptographic signature.
///
/// Provides a typed and structured way of storing multiple MPIs in
/// packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum Signature {
    /// RSA signature.
    RSA {
        /// Signature m^d mod N.
        s: MPI,
    },

    /// NIST's DSA signature.
    DSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// ElGamal signature.
    ElGamal {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// DJB's "Twisted" Edwards curve DSA signature.
    EdDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// NIST's ECDSA signature.
    ECDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[MPI]>,
        /// Any data that failed to parse.
        rest: Box<[u8]>,
    },
}

impl Signature {
    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) {
        use self::Signature::*;
        match self {
            RSA { s } => s.serialize_into(buf),
            DSA { r, s } | ElGamal { r, s } | EdDSA { r, s }
            | ECDSA { r, s } => {
                r.serialize_into(buf);
                s.serialize_into(buf);
            },
            Unknown { mpis, rest } => {
                for mpi in mpis.iter() {
                    mpi.serialize_into(buf);
                }
                buf.extend_from_slice(rest);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpi_strips_leading_zeros() {
        let mpi = MPI::new(&[0, 0, 1, 2]);
        assert_eq!(mpi.value(), &[1, 2]);
        assert_eq!(mpi.bits(), 9);
    }

    #[test]
    fn mpi_serialized_form() {
        let mpi = MPI::new(&[0x01, 0xff]);
        let mut buf = Vec::new();
        mpi.serialize_into(&mut buf);
        assert_eq!(&buf, &[0x00, 0x09, 0x01, 0xff]);
    }

    #[test]
    fn point_round_trip() {
        let x = [1u8; 32];
        let y = [2u8; 32];
        let mpi = MPI::new_point(&x, &y, 256);
        let (px, py) = mpi.decode_point(&Curve::NistP256).unwrap();
        assert_eq!(px, &x);
        assert_eq!(py, &y);
    }

    #[test]
    fn compressed_point_round_trip() {
        let x = [3u8; 32];
        let mpi = MPI::new_compressed_point(&x);
        let (px, py) = mpi.decode_point(&Curve::Cv25519).unwrap();
        assert_eq!(px, &x);
        assert!(py.is_empty());
    }

    #[test]
    fn value_padded() {
        let mpi = MPI::new(&[1, 2]);
        assert_eq!(mpi.value_padded(4).unwrap(), vec![0, 0, 1, 2]);
        assert!(mpi.value_padded(1).is_err());
    }
}
