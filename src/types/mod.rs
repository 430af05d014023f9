//! Primitive types.
//!
//! This module provides types used in OpenPGP, like enumerations
//! describing algorithms and the various flag types carried in
//! signature subpackets.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::Error;
use crate::Fingerprint;
use crate::Result;

/// The OpenPGP public key algorithms as defined in [Section 9.1 of
/// RFC 4880], and [Section 5 of RFC 6637].
///
///   [Section 9.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.1
///   [Section 5 of RFC 6637]: https://tools.ietf.org/html/rfc6637
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt or Sign)
    RSAEncryptSign,
    /// RSA Encrypt-Only, deprecated in RFC 4880.
    RSAEncrypt,
    /// RSA Sign-Only, deprecated in RFC 4880.
    RSASign,
    /// ElGamal (Encrypt-Only)
    ElGamalEncrypt,
    /// DSA (Digital Signature Algorithm)
    DSA,
    /// Elliptic curve DH
    ECDH,
    /// Elliptic curve DSA
    ECDSA,
    /// ElGamal (Encrypt or Sign), deprecated in RFC 4880.
    ElGamalEncryptSign,
    /// "Twisted" Edwards curve DSA
    EdDSA,
    /// Private algorithm identifier.
    Private(u8),
    /// Unknown algorithm identifier.
    Unknown(u8),
}

impl PublicKeyAlgorithm {
    /// Returns true if the algorithm can sign data.
    pub fn for_signing(&self) -> bool {
        use self::PublicKeyAlgorithm::*;
        matches!(self, RSAEncryptSign | RSASign | DSA | ECDSA | EdDSA
                 | ElGamalEncryptSign)
    }

    /// Returns true if the algorithm can encrypt data.
    pub fn for_encryption(&self) -> bool {
        use self::PublicKeyAlgorithm::*;
        matches!(self, RSAEncryptSign | RSAEncrypt | ElGamalEncrypt | ECDH
                 | ElGamalEncryptSign)
    }
}

impl From<u8> for PublicKeyAlgorithm {
    fn from(u: u8) -> Self {
        use self::PublicKeyAlgorithm::*;
        match u {
            1 => RSAEncryptSign,
            2 => RSAEncrypt,
            3 => RSASign,
            16 => ElGamalEncrypt,
            17 => DSA,
            18 => ECDH,
            19 => ECDSA,
            20 => ElGamalEncryptSign,
            22 => EdDSA,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<PublicKeyAlgorithm> for u8 {
    fn from(p: PublicKeyAlgorithm) -> u8 {
        use self::PublicKeyAlgorithm::*;
        match p {
            RSAEncryptSign => 1,
            RSAEncrypt => 2,
            RSASign => 3,
            ElGamalEncrypt => 16,
            DSA => 17,
            ECDH => 18,
            ECDSA => 19,
            ElGamalEncryptSign => 20,
            EdDSA => 22,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::PublicKeyAlgorithm::*;
        match *self {
            RSAEncryptSign => f.write_str("RSA (Encrypt or Sign)"),
            RSAEncrypt => f.write_str("RSA Encrypt-Only"),
            RSASign => f.write_str("RSA Sign-Only"),
            ElGamalEncrypt => f.write_str("ElGamal (Encrypt-Only)"),
            DSA => f.write_str("DSA (Digital Signature Algorithm)"),
            ECDSA => f.write_str("ECDSA public key algorithm"),
            ElGamalEncryptSign => f.write_str("ElGamal (Encrypt or Sign)"),
            ECDH => f.write_str("ECDH public key algorithm"),
            EdDSA => f.write_str("EdDSA Edwards-curve Digital Signature Algorithm"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental public key algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown public key algorithm {}", u)),
        }
    }
}

/// Elliptic curves used in OpenPGP.
///
/// OpenPGP does not include the curve parameters in the key material;
/// the curve is identified by its ASN.1 object identifier.
#[derive(Clone, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum Curve {
    /// NIST curve P-256.
    NistP256,
    /// NIST curve P-384.
    NistP384,
    /// NIST curve P-521.
    NistP521,
    /// brainpoolP256r1.
    BrainpoolP256,
    /// brainpoolP512r1.
    BrainpoolP512,
    /// D.J. Bernstein's "Twisted" Edwards curve Ed25519.
    Ed25519,
    /// Elliptic curve Diffie-Hellman using D.J. Bernstein's Curve25519.
    Cv25519,
    /// secp256k1, the Bitcoin curve.
    Secp256k1,
    /// Unknown curve.
    Unknown(Box<[u8]>),
}

const NIST_P256_OID: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
const NIST_P384_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x22];
const NIST_P521_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x23];
const BRAINPOOL_P256_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x07];
const BRAINPOOL_P512_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0D];
const ED25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
const CV25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01];
const SECP256K1_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x0A];

impl Curve {
    /// Parses the given OID.
    pub fn from_oid(oid: &[u8]) -> Curve {
        // Match on OIDs, see section 11 of RFC6637.
        match oid {
            NIST_P256_OID => Curve::NistP256,
            NIST_P384_OID => Curve::NistP384,
            NIST_P521_OID => Curve::NistP521,
            BRAINPOOL_P256_OID => Curve::BrainpoolP256,
            BRAINPOOL_P512_OID => Curve::BrainpoolP512,
            ED25519_OID => Curve::Ed25519,
            CV25519_OID => Curve::Cv25519,
            SECP256K1_OID => Curve::Secp256k1,
            oid => Curve::Unknown(Vec::from(oid).into_boxed_slice()),
        }
    }

    /// Returns this curve's OID.
    pub fn oid(&self) -> &[u8] {
        match self {
            Curve::NistP256 => NIST_P256_OID,
            Curve::NistP384 => NIST_P384_OID,
            Curve::NistP521 => NIST_P521_OID,
            Curve::BrainpoolP256 => BRAINPOOL_P256_OID,
            Curve::BrainpoolP512 => BRAINPOOL_P512_OID,
            Curve::Ed25519 => ED25519_OID,
            Curve::Cv25519 => CV25519_OID,
            Curve::Secp256k1 => SECP256K1_OID,
            Curve::Unknown(oid) => oid,
        }
    }

    /// Returns the length of a coordinate in bits.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedEllipticCurve` if the curve is not
    /// supported.
    pub fn bits(&self) -> Result<usize> {
        match self {
            Curve::NistP256 => Ok(256),
            Curve::NistP384 => Ok(384),
            Curve::NistP521 => Ok(521),
            Curve::BrainpoolP256 => Ok(256),
            Curve::BrainpoolP512 => Ok(512),
            Curve::Ed25519 => Ok(256),
            Curve::Cv25519 => Ok(256),
            Curve::Secp256k1 => Ok(256),
            Curve::Unknown(_) =>
                Err(Error::UnsupportedEllipticCurve(self.clone()).into()),
        }
    }

    /// Returns the weakest hash algorithm that may be used with
    /// signatures over this curve.
    ///
    /// ECDSA and EdDSA truncate the digest to the size of the group
    /// order; a digest shorter than the order weakens the signature,
    /// so signing rejects such combinations.
    pub fn minimum_hash(&self) -> Result<HashAlgorithm> {
        match self.bits()? {
            0..=256 => Ok(HashAlgorithm::SHA256),
            257..=384 => Ok(HashAlgorithm::SHA384),
            _ => Ok(HashAlgorithm::SHA512),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Curve::*;
        match *self {
            NistP256 => f.write_str("NIST curve P-256"),
            NistP384 => f.write_str("NIST curve P-384"),
            NistP521 => f.write_str("NIST curve P-521"),
            BrainpoolP256 => f.write_str("brainpoolP256r1"),
            BrainpoolP512 => f.write_str("brainpoolP512r1"),
            Ed25519 => f.write_str("D.J. Bernstein's \"Twisted\" Edwards curve Ed25519"),
            Cv25519 => f.write_str("D.J. Bernstein's Curve25519"),
            Secp256k1 => f.write_str("secp256k1"),
            Unknown(ref oid) =>
                f.write_fmt(format_args!("Unknown curve (OID: {:?})", oid)),
        }
    }
}

/// The OpenPGP symmetric algorithms as defined in [Section 9.2 of RFC
/// 4880].
///
///   [Section 9.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.2
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum SymmetricAlgorithm {
    /// Null encryption.
    Unencrypted,
    /// IDEA block cipher.
    IDEA,
    /// 3-DES in EDE configuration.
    TripleDES,
    /// CAST5/CAST128 block cipher.
    CAST5,
    /// Schneier et.al. Blowfish block cipher.
    Blowfish,
    /// 10-round AES.
    AES128,
    /// 12-round AES.
    AES192,
    /// 14-round AES.
    AES256,
    /// Twofish block cipher.
    Twofish,
    /// 18 rounds of NESSIEs Camellia.
    Camellia128,
    /// 24 rounds of NESSIEs Camellia w/192 bit keys.
    Camellia192,
    /// 24 rounds of NESSIEs Camellia w/256 bit keys.
    Camellia256,
    /// Private algorithm identifier.
    Private(u8),
    /// Unknown algorithm identifier.
    Unknown(u8),
}

impl Default for SymmetricAlgorithm {
    fn default() -> Self {
        SymmetricAlgorithm::AES256
    }
}

impl From<u8> for SymmetricAlgorithm {
    fn from(u: u8) -> Self {
        use self::SymmetricAlgorithm::*;
        match u {
            0 => Unencrypted,
            1 => IDEA,
            2 => TripleDES,
            3 => CAST5,
            4 => Blowfish,
            7 => AES128,
            8 => AES192,
            9 => AES256,
            10 => Twofish,
            11 => Camellia128,
            12 => Camellia192,
            13 => Camellia256,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<SymmetricAlgorithm> for u8 {
    fn from(s: SymmetricAlgorithm) -> u8 {
        use self::SymmetricAlgorithm::*;
        match s {
            Unencrypted => 0,
            IDEA => 1,
            TripleDES => 2,
            CAST5 => 3,
            Blowfish => 4,
            AES128 => 7,
            AES192 => 8,
            AES256 => 9,
            Twofish => 10,
            Camellia128 => 11,
            Camellia192 => 12,
            Camellia256 => 13,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SymmetricAlgorithm::*;
        match *self {
            Unencrypted => f.write_str("Unencrypted"),
            IDEA => f.write_str("IDEA"),
            TripleDES => f.write_str("TripleDES (EDE-DES, 168 bit key derived from 192)"),
            CAST5 => f.write_str("CAST5 (128 bit key, 16 rounds)"),
            Blowfish => f.write_str("Blowfish (128 bit key, 16 rounds)"),
            AES128 => f.write_str("AES with 128-bit key"),
            AES192 => f.write_str("AES with 192-bit key"),
            AES256 => f.write_str("AES with 256-bit key"),
            Twofish => f.write_str("Twofish with 256-bit key"),
            Camellia128 => f.write_str("Camellia with 128-bit key"),
            Camellia192 => f.write_str("Camellia with 192-bit key"),
            Camellia256 => f.write_str("Camellia with 256-bit key"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental symmetric key algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown symmetric key algorithm {}", u)),
        }
    }
}

impl SymmetricAlgorithm {
    /// Length of a key for this algorithm in bytes.
    pub fn key_size(self) -> Result<usize> {
        use self::SymmetricAlgorithm::*;
        match self {
            IDEA => Ok(16),
            TripleDES => Ok(24),
            CAST5 => Ok(16),
            // RFC4880, Section 9.2: Blowfish (128 bit key, 16 rounds)
            Blowfish => Ok(16),
            AES128 => Ok(16),
            AES192 => Ok(24),
            AES256 => Ok(32),
            Twofish => Ok(32),
            Camellia128 => Ok(16),
            Camellia192 => Ok(24),
            Camellia256 => Ok(32),
            _ => Err(Error::UnsupportedSymmetricAlgorithm(self).into()),
        }
    }

    /// Length of a block for this algorithm in bytes.
    pub fn block_size(self) -> Result<usize> {
        use self::SymmetricAlgorithm::*;
        match self {
            IDEA => Ok(8),
            TripleDES => Ok(8),
            CAST5 => Ok(8),
            Blowfish => Ok(8),
            AES128 => Ok(16),
            AES192 => Ok(16),
            AES256 => Ok(16),
            Twofish => Ok(16),
            Camellia128 => Ok(16),
            Camellia192 => Ok(16),
            Camellia256 => Ok(16),
            _ => Err(Error::UnsupportedSymmetricAlgorithm(self).into()),
        }
    }
}

/// The OpenPGP hash algorithms as defined in [Section 9.4 of RFC 4880].
///
///   [Section 9.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.4
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// Rivest et.al. message digest 5.
    MD5,
    /// NIST Secure Hash Algorithm (deprecated)
    SHA1,
    /// RIPEMD-160
    RipeMD,
    /// 256-bit version of SHA2
    SHA256,
    /// 384-bit version of SHA2
    SHA384,
    /// 512-bit version of SHA2
    SHA512,
    /// 224-bit version of SHA2
    SHA224,
    /// 256-bit version of SHA3
    SHA3_256,
    /// 512-bit version of SHA3
    SHA3_512,
    /// Private hash algorithm identifier.
    Private(u8),
    /// Unknown hash algorithm identifier.
    Unknown(u8),
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::SHA512
    }
}

impl From<u8> for HashAlgorithm {
    fn from(u: u8) -> Self {
        match u {
            1 => HashAlgorithm::MD5,
            2 => HashAlgorithm::SHA1,
            3 => HashAlgorithm::RipeMD,
            8 => HashAlgorithm::SHA256,
            9 => HashAlgorithm::SHA384,
            10 => HashAlgorithm::SHA512,
            11 => HashAlgorithm::SHA224,
            12 => HashAlgorithm::SHA3_256,
            14 => HashAlgorithm::SHA3_512,
            100..=110 => HashAlgorithm::Private(u),
            u => HashAlgorithm::Unknown(u),
        }
    }
}

impl From<HashAlgorithm> for u8 {
    fn from(h: HashAlgorithm) -> u8 {
        match h {
            HashAlgorithm::MD5 => 1,
            HashAlgorithm::SHA1 => 2,
            HashAlgorithm::RipeMD => 3,
            HashAlgorithm::SHA256 => 8,
            HashAlgorithm::SHA384 => 9,
            HashAlgorithm::SHA512 => 10,
            HashAlgorithm::SHA224 => 11,
            HashAlgorithm::SHA3_256 => 12,
            HashAlgorithm::SHA3_512 => 14,
            HashAlgorithm::Private(u) => u,
            HashAlgorithm::Unknown(u) => u,
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        if s.eq_ignore_ascii_case("MD5") {
            Ok(HashAlgorithm::MD5)
        } else if s.eq_ignore_ascii_case("SHA1") {
            Ok(HashAlgorithm::SHA1)
        } else if s.eq_ignore_ascii_case("RipeMD160") {
            Ok(HashAlgorithm::RipeMD)
        } else if s.eq_ignore_ascii_case("SHA256") {
            Ok(HashAlgorithm::SHA256)
        } else if s.eq_ignore_ascii_case("SHA384") {
            Ok(HashAlgorithm::SHA384)
        } else if s.eq_ignore_ascii_case("SHA512") {
            Ok(HashAlgorithm::SHA512)
        } else if s.eq_ignore_ascii_case("SHA224") {
            Ok(HashAlgorithm::SHA224)
        } else if s.eq_ignore_ascii_case("SHA3-256") {
            Ok(HashAlgorithm::SHA3_256)
        } else if s.eq_ignore_ascii_case("SHA3-512") {
            Ok(HashAlgorithm::SHA3_512)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HashAlgorithm::MD5 => f.write_str("MD5"),
            HashAlgorithm::SHA1 => f.write_str("SHA1"),
            HashAlgorithm::RipeMD => f.write_str("RipeMD160"),
            HashAlgorithm::SHA256 => f.write_str("SHA256"),
            HashAlgorithm::SHA384 => f.write_str("SHA384"),
            HashAlgorithm::SHA512 => f.write_str("SHA512"),
            HashAlgorithm::SHA224 => f.write_str("SHA224"),
            HashAlgorithm::SHA3_256 => f.write_str("SHA3-256"),
            HashAlgorithm::SHA3_512 => f.write_str("SHA3-512"),
            HashAlgorithm::Private(u) =>
                f.write_fmt(format_args!("Private/Experimental hash algorithm {}", u)),
            HashAlgorithm::Unknown(u) =>
                f.write_fmt(format_args!("Unknown hash algorithm {}", u)),
        }
    }
}

/// The OpenPGP compression algorithms as defined in [Section 9.3 of
/// RFC 4880].
///
///   [Section 9.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.3
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum CompressionAlgorithm {
    /// Null compression.
    Uncompressed,
    /// DEFLATE.
    Zip,
    /// ZLIB.
    Zlib,
    /// bzip2.
    BZip2,
    /// Private algorithm identifier.
    Private(u8),
    /// Unknown algorithm identifier.
    Unknown(u8),
}

impl Default for CompressionAlgorithm {
    fn default() -> Self {
        CompressionAlgorithm::Zip
    }
}

impl From<u8> for CompressionAlgorithm {
    fn from(u: u8) -> Self {
        use self::CompressionAlgorithm::*;
        match u {
            0 => Uncompressed,
            1 => Zip,
            2 => Zlib,
            3 => BZip2,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<CompressionAlgorithm> for u8 {
    fn from(c: CompressionAlgorithm) -> u8 {
        use self::CompressionAlgorithm::*;
        match c {
            Uncompressed => 0,
            Zip => 1,
            Zlib => 2,
            BZip2 => 3,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CompressionAlgorithm::*;
        match *self {
            Uncompressed => f.write_str("Uncompressed"),
            Zip => f.write_str("ZIP"),
            Zlib => f.write_str("ZLIB"),
            BZip2 => f.write_str("BZip2"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental compression algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown compression algorithm {}", u)),
        }
    }
}

/// The OpenPGP signature types as defined in [Section 5.2.1 of RFC
/// 4880].
///
///   [Section 5.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.1
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum SignatureType {
    /// Signature over a binary document.
    Binary,
    /// Signature over a canonical text document.
    Text,
    /// Standalone signature.
    Standalone,
    /// Generic certification of a User ID and Public-Key packet.
    GenericCertification,
    /// Persona certification of a User ID and Public-Key packet.
    PersonaCertification,
    /// Casual certification of a User ID and Public-Key packet.
    CasualCertification,
    /// Positive certification of a User ID and Public-Key packet.
    PositiveCertification,
    /// Subkey Binding Signature
    SubkeyBinding,
    /// Primary Key Binding Signature
    PrimaryKeyBinding,
    /// Signature directly on a key
    DirectKey,
    /// Key revocation signature
    KeyRevocation,
    /// Subkey revocation signature
    SubkeyRevocation,
    /// Certification revocation signature
    CertificationRevocation,
    /// Timestamp signature.
    Timestamp,
    /// Catchall.
    Unknown(u8),
}

impl From<u8> for SignatureType {
    fn from(u: u8) -> Self {
        match u {
            0x00 => SignatureType::Binary,
            0x01 => SignatureType::Text,
            0x02 => SignatureType::Standalone,
            0x10 => SignatureType::GenericCertification,
            0x11 => SignatureType::PersonaCertification,
            0x12 => SignatureType::CasualCertification,
            0x13 => SignatureType::PositiveCertification,
            0x18 => SignatureType::SubkeyBinding,
            0x19 => SignatureType::PrimaryKeyBinding,
            0x1f => SignatureType::DirectKey,
            0x20 => SignatureType::KeyRevocation,
            0x28 => SignatureType::SubkeyRevocation,
            0x30 => SignatureType::CertificationRevocation,
            0x40 => SignatureType::Timestamp,
            u => SignatureType::Unknown(u),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(t: SignatureType) -> Self {
        match t {
            SignatureType::Binary => 0x00,
            SignatureType::Text => 0x01,
            SignatureType::Standalone => 0x02,
            SignatureType::GenericCertification => 0x10,
            SignatureType::PersonaCertification => 0x11,
            SignatureType::CasualCertification => 0x12,
            SignatureType::PositiveCertification => 0x13,
            SignatureType::SubkeyBinding => 0x18,
            SignatureType::PrimaryKeyBinding => 0x19,
            SignatureType::DirectKey => 0x1f,
            SignatureType::KeyRevocation => 0x20,
            SignatureType::SubkeyRevocation => 0x28,
            SignatureType::CertificationRevocation => 0x30,
            SignatureType::Timestamp => 0x40,
            SignatureType::Unknown(u) => u,
        }
    }
}

impl SignatureType {
    /// Returns true for the four User ID certification types.
    pub fn is_certification(&self) -> bool {
        use self::SignatureType::*;
        matches!(self, GenericCertification | PersonaCertification
                 | CasualCertification | PositiveCertification)
    }

    /// Returns true for the revocation types.
    pub fn is_revocation(&self) -> bool {
        use self::SignatureType::*;
        matches!(self, KeyRevocation | SubkeyRevocation
                 | CertificationRevocation)
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SignatureType::*;
        match *self {
            Binary => f.write_str("Binary"),
            Text => f.write_str("Text"),
            Standalone => f.write_str("Standalone"),
            GenericCertification => f.write_str("GenericCertification"),
            PersonaCertification => f.write_str("PersonaCertification"),
            CasualCertification => f.write_str("CasualCertification"),
            PositiveCertification => f.write_str("PositiveCertification"),
            SubkeyBinding => f.write_str("SubkeyBinding"),
            PrimaryKeyBinding => f.write_str("PrimaryKeyBinding"),
            DirectKey => f.write_str("DirectKey"),
            KeyRevocation => f.write_str("KeyRevocation"),
            SubkeyRevocation => f.write_str("SubkeyRevocation"),
            CertificationRevocation => f.write_str("CertificationRevocation"),
            Timestamp => f.write_str("Timestamp"),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown signature type 0x{:x}", u)),
        }
    }
}

/// Describes the format of the body of a literal data packet.
///
/// See [Section 5.9 of RFC 4880].
///
///   [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DataFormat {
    /// Binary data.
    Binary,
    /// Text data.
    Text,
    /// Text data, probably UTF-8 encoded.
    Unicode,
    /// Unknown format specifier.
    Unknown(char),
}

impl Default for DataFormat {
    fn default() -> Self {
        DataFormat::Binary
    }
}

impl From<u8> for DataFormat {
    fn from(b: u8) -> Self {
        (b as char).into()
    }
}

impl From<char> for DataFormat {
    fn from(c: char) -> Self {
        use self::DataFormat::*;
        match c {
            'b' => Binary,
            't' => Text,
            'u' => Unicode,
            c => Unknown(c),
        }
    }
}

impl From<DataFormat> for u8 {
    fn from(f: DataFormat) -> u8 {
        char::from(f) as u8
    }
}

impl From<DataFormat> for char {
    fn from(f: DataFormat) -> char {
        use self::DataFormat::*;
        match f {
            Binary => 'b',
            Text => 't',
            Unicode => 'u',
            Unknown(c) => c,
        }
    }
}

/// Describes the reason for a revocation.
///
/// See the description of revocation subpackets in [Section 5.2.3.23
/// of RFC 4880].
///
///   [Section 5.2.3.23 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.23
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum ReasonForRevocation {
    /// No reason specified (key revocations or cert revocations)
    Unspecified,
    /// Key is superseded (key revocations)
    KeySuperseded,
    /// Key material has been compromised (key revocations)
    KeyCompromised,
    /// Key is retired and no longer used (key revocations)
    KeyRetired,
    /// User ID information is no longer valid (cert revocations)
    UIDRetired,
    /// Private reason identifier.
    Private(u8),
    /// Unknown reason identifier.
    Unknown(u8),
}

impl From<u8> for ReasonForRevocation {
    fn from(u: u8) -> Self {
        use self::ReasonForRevocation::*;
        match u {
            0 => Unspecified,
            1 => KeySuperseded,
            2 => KeyCompromised,
            3 => KeyRetired,
            32 => UIDRetired,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<ReasonForRevocation> for u8 {
    fn from(r: ReasonForRevocation) -> u8 {
        use self::ReasonForRevocation::*;
        match r {
            Unspecified => 0,
            KeySuperseded => 1,
            KeyCompromised => 2,
            KeyRetired => 3,
            UIDRetired => 32,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for ReasonForRevocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ReasonForRevocation::*;
        match *self {
            Unspecified => f.write_str("No reason specified"),
            KeySuperseded => f.write_str("Key is superseded"),
            KeyCompromised => f.write_str("Key material has been compromised"),
            KeyRetired => f.write_str("Key is retired and no longer used"),
            UIDRetired => f.write_str("User ID information is no longer valid"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental revocation reason {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown revocation reason {}", u)),
        }
    }
}

/// Describes the key flags subpacket, [Section 5.2.3.21 of RFC 4880].
///
///   [Section 5.2.3.21 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.21
///
/// # A note on equality
///
/// `PartialEq` implements semantic equality, i.e. it ignores padding.
#[derive(Clone, Default)]
pub struct KeyFlags {
    for_certification: bool,
    for_signing: bool,
    for_transport_encryption: bool,
    for_storage_encryption: bool,
    for_authentication: bool,
    is_split_key: bool,
    is_group_key: bool,
    unknown: Box<[u8]>,
    /// Original length, including trailing zeros.
    pad_to: usize,
}

const KEY_FLAG_CERTIFY: u8 = 0x01;
const KEY_FLAG_SIGN: u8 = 0x02;
const KEY_FLAG_ENCRYPT_FOR_TRANSPORT: u8 = 0x04;
const KEY_FLAG_ENCRYPT_AT_REST: u8 = 0x08;
const KEY_FLAG_SPLIT_KEY: u8 = 0x10;
const KEY_FLAG_AUTHENTICATE: u8 = 0x20;
const KEY_FLAG_GROUP_KEY: u8 = 0x80;

impl KeyFlags {
    /// Creates a new instance from `bits`.
    pub fn new(bits: &[u8]) -> Self {
        let byte = bits.first().cloned().unwrap_or(0);
        let unknown = if bits.len() > 1 {
            let mut unknown = bits[1..].to_vec();
            while unknown.last() == Some(&0) {
                unknown.pop();
            }
            unknown
        } else {
            Vec::new()
        };

        KeyFlags {
            for_certification: byte & KEY_FLAG_CERTIFY != 0,
            for_signing: byte & KEY_FLAG_SIGN != 0,
            for_transport_encryption:
                byte & KEY_FLAG_ENCRYPT_FOR_TRANSPORT != 0,
            for_storage_encryption: byte & KEY_FLAG_ENCRYPT_AT_REST != 0,
            for_authentication: byte & KEY_FLAG_AUTHENTICATE != 0,
            is_split_key: byte & KEY_FLAG_SPLIT_KEY != 0,
            is_group_key: byte & KEY_FLAG_GROUP_KEY != 0,
            unknown: unknown.into_boxed_slice(),
            pad_to: bits.len(),
        }
    }

    /// Returns an empty key flags set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a slice with the raw values.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bits = 0u8;
        if self.for_certification { bits |= KEY_FLAG_CERTIFY; }
        if self.for_signing { bits |= KEY_FLAG_SIGN; }
        if self.for_transport_encryption {
            bits |= KEY_FLAG_ENCRYPT_FOR_TRANSPORT;
        }
        if self.for_storage_encryption { bits |= KEY_FLAG_ENCRYPT_AT_REST; }
        if self.for_authentication { bits |= KEY_FLAG_AUTHENTICATE; }
        if self.is_split_key { bits |= KEY_FLAG_SPLIT_KEY; }
        if self.is_group_key { bits |= KEY_FLAG_GROUP_KEY; }

        let mut out = vec![bits];
        out.extend_from_slice(&self.unknown);
        while out.len() < self.pad_to.max(1) {
            out.push(0);
        }
        out
    }

    /// This key may be used to certify other keys.
    pub fn for_certification(&self) -> bool { self.for_certification }

    /// Sets whether this key may be used to certify other keys.
    pub fn set_certification(mut self, v: bool) -> Self {
        self.for_certification = v;
        self
    }

    /// This key may be used to sign data.
    pub fn for_signing(&self) -> bool { self.for_signing }

    /// Sets whether this key may be used to sign data.
    pub fn set_signing(mut self, v: bool) -> Self {
        self.for_signing = v;
        self
    }

    /// This key may be used to encrypt communications.
    pub fn for_transport_encryption(&self) -> bool {
        self.for_transport_encryption
    }

    /// Sets whether this key may be used to encrypt communications.
    pub fn set_transport_encryption(mut self, v: bool) -> Self {
        self.for_transport_encryption = v;
        self
    }

    /// This key may be used to encrypt storage.
    pub fn for_storage_encryption(&self) -> bool {
        self.for_storage_encryption
    }

    /// Sets whether this key may be used to encrypt storage.
    pub fn set_storage_encryption(mut self, v: bool) -> Self {
        self.for_storage_encryption = v;
        self
    }

    /// This key may be used for authentication.
    pub fn for_authentication(&self) -> bool { self.for_authentication }

    /// Sets whether this key may be used for authentication.
    pub fn set_authentication(mut self, v: bool) -> Self {
        self.for_authentication = v;
        self
    }

    /// The private component of this key may have been split using a
    /// secret-sharing mechanism.
    pub fn is_split_key(&self) -> bool { self.is_split_key }

    /// The private component of this key may be in possession of more
    /// than one person.
    pub fn is_group_key(&self) -> bool { self.is_group_key }

    /// Returns whether no flags are set.
    pub fn is_empty(&self) -> bool {
        self.to_bytes().iter().all(|b| *b == 0)
    }
}

impl fmt::Debug for KeyFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.for_certification() { f.write_str("C")?; }
        if self.for_signing() { f.write_str("S")?; }
        if self.for_transport_encryption() { f.write_str("Et")?; }
        if self.for_storage_encryption() { f.write_str("Er")?; }
        if self.for_authentication() { f.write_str("A")?; }
        if self.is_split_key() { f.write_str("D")?; }
        if self.is_group_key() { f.write_str("G")?; }
        if !self.unknown.is_empty() {
            f.write_fmt(
                format_args!("+0x{}", crate::fmt::hex::encode(&self.unknown)))?;
        }
        Ok(())
    }
}

impl PartialEq for KeyFlags {
    fn eq(&self, other: &KeyFlags) -> bool {
        let mut a = self.to_bytes();
        let mut b = other.to_bytes();
        while a.last() == Some(&0) { a.pop(); }
        while b.last() == Some(&0) { b.pop(); }
        a == b
    }
}

impl Eq for KeyFlags {}

impl std::hash::Hash for KeyFlags {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut bytes = self.to_bytes();
        while bytes.last() == Some(&0) { bytes.pop(); }
        bytes.hash(state);
    }
}

/// Describes the features subpacket, [Section 5.2.3.24 of RFC 4880].
///
///   [Section 5.2.3.24 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.24
///
/// # A note on equality
///
/// `PartialEq` implements semantic equality, i.e. it ignores padding.
#[derive(Clone, Default)]
pub struct Features {
    mdc: bool,
    unknown: Box<[u8]>,
    /// Original length, including trailing zeros.
    pad_to: usize,
}

const FEATURE_FLAG_MDC: u8 = 0x01;

impl Features {
    /// Creates a new instance from `bits`.
    pub fn new(bits: &[u8]) -> Self {
        let byte = bits.first().cloned().unwrap_or(0);
        let unknown = if bits.len() > 1 {
            let mut unknown = bits[1..].to_vec();
            while unknown.last() == Some(&0) {
                unknown.pop();
            }
            unknown
        } else {
            Vec::new()
        };

        Features {
            mdc: byte & FEATURE_FLAG_MDC != 0,
            unknown: unknown.into_boxed_slice(),
            pad_to: bits.len(),
        }
    }

    /// Features sent by this crate's generated keys: modification
    /// detection.
    pub fn modification_detection() -> Self {
        Features::new(&[FEATURE_FLAG_MDC])
    }

    /// Returns a slice with the raw values.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bits = 0u8;
        if self.mdc { bits |= FEATURE_FLAG_MDC; }

        let mut out = vec![bits];
        out.extend_from_slice(&self.unknown);
        while out.len() < self.pad_to.max(1) {
            out.push(0);
        }
        out
    }

    /// Whether or not MDC is supported.
    pub fn supports_mdc(&self) -> bool {
        self.mdc
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.supports_mdc() { f.write_str("MDC")?; }
        if !self.unknown.is_empty() {
            f.write_fmt(
                format_args!("+0x{}", crate::fmt::hex::encode(&self.unknown)))?;
        }
        Ok(())
    }
}

impl PartialEq for Features {
    fn eq(&self, other: &Features) -> bool {
        let mut a = self.to_bytes();
        let mut b = other.to_bytes();
        while a.last() == Some(&0) { a.pop(); }
        while b.last() == Some(&0) { b.pop(); }
        a == b
    }
}

impl Eq for Features {}

impl std::hash::Hash for Features {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut bytes = self.to_bytes();
        while bytes.last() == Some(&0) { bytes.pop(); }
        bytes.hash(state);
    }
}

/// Describes preferences regarding key servers, [Section 5.2.3.17 of
/// RFC 4880].
///
///   [Section 5.2.3.17 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.17
///
/// # A note on equality
///
/// `PartialEq` implements semantic equality, i.e. it ignores padding.
#[derive(Clone, Default)]
pub struct KeyServerPreferences {
    no_modify: bool,
    unknown: Box<[u8]>,
    /// Original length, including trailing zeros.
    pad_to: usize,
}

const KEYSERVER_PREFERENCE_NO_MODIFY: u8 = 0x80;

impl KeyServerPreferences {
    /// Creates a new instance from `bits`.
    pub fn new(bits: &[u8]) -> Self {
        let byte = bits.first().cloned().unwrap_or(0);
        let unknown = if bits.len() > 1 {
            let mut unknown = bits[1..].to_vec();
            while unknown.last() == Some(&0) {
                unknown.pop();
            }
            unknown
        } else {
            Vec::new()
        };

        KeyServerPreferences {
            no_modify: byte & KEYSERVER_PREFERENCE_NO_MODIFY != 0,
            unknown: unknown.into_boxed_slice(),
            pad_to: bits.len(),
        }
    }

    /// Returns a slice with the raw values.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bits = 0u8;
        if self.no_modify { bits |= KEYSERVER_PREFERENCE_NO_MODIFY; }

        let mut out = vec![bits];
        out.extend_from_slice(&self.unknown);
        while out.len() < self.pad_to.max(1) {
            out.push(0);
        }
        out
    }

    /// Whether or not keyservers are allowed to modify this key.
    pub fn no_modify(&self) -> bool {
        self.no_modify
    }

    /// Sets whether or not keyservers are allowed to modify this key.
    pub fn set_no_modify(mut self, v: bool) -> Self {
        self.no_modify = v;
        self
    }
}

impl fmt::Debug for KeyServerPreferences {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.no_modify() { f.write_str("no modify")?; }
        if !self.unknown.is_empty() {
            f.write_fmt(
                format_args!("+0x{}", crate::fmt::hex::encode(&self.unknown)))?;
        }
        Ok(())
    }
}

impl PartialEq for KeyServerPreferences {
    fn eq(&self, other: &KeyServerPreferences) -> bool {
        let mut a = self.to_bytes();
        let mut b = other.to_bytes();
        while a.last() == Some(&0) { a.pop(); }
        while b.last() == Some(&0) { b.pop(); }
        a == b
    }
}

impl Eq for KeyServerPreferences {}

impl std::hash::Hash for KeyServerPreferences {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut bytes = self.to_bytes();
        while bytes.last() == Some(&0) { bytes.pop(); }
        bytes.hash(state);
    }
}

/// Designates a key as a valid third-party revoker.
///
/// This is described in [Section 5.2.3.15 of RFC 4880].
///
///   [Section 5.2.3.15 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.15
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevocationKey {
    /// The public key algorithm of the authorized revoker.
    pk_algo: PublicKeyAlgorithm,

    /// Fingerprint of authorized key.
    fp: Fingerprint,

    /// Indicates that the relation between revoker and revokee is of
    /// a sensitive nature.
    sensitive: bool,
}

/// The bit in the class octet that must be set.
const REVOCATION_KEY_FLAG_MUST_BE_SET: u8 = 0x80;

/// The bit in the class octet signaling a sensitive relation.
const REVOCATION_KEY_FLAG_SENSITIVE: u8 = 0x40;

impl RevocationKey {
    /// Creates a new instance.
    pub fn new(pk_algo: PublicKeyAlgorithm, fp: Fingerprint, sensitive: bool)
               -> Self
    {
        RevocationKey { pk_algo, fp, sensitive }
    }

    /// Creates a new instance from the raw `class` parameter.
    pub fn from_bits(pk_algo: PublicKeyAlgorithm, fp: Fingerprint, class: u8)
                     -> Result<Self>
    {
        if class & REVOCATION_KEY_FLAG_MUST_BE_SET == 0 {
            return Err(Error::InvalidArgument(
                "Most significant bit of class must be set".into()).into());
        }
        let sensitive = class & REVOCATION_KEY_FLAG_SENSITIVE > 0;
        Ok(RevocationKey { pk_algo, fp, sensitive })
    }

    /// Returns the `class` octet, the sum of all flags.
    pub fn class(&self) -> u8 {
        REVOCATION_KEY_FLAG_MUST_BE_SET
            | if self.sensitive() {
                REVOCATION_KEY_FLAG_SENSITIVE
            } else {
                0
            }
    }

    /// The public key algorithm of the authorized revoker.
    pub fn revoker(&self) -> (PublicKeyAlgorithm, &Fingerprint) {
        (self.pk_algo, &self.fp)
    }

    /// Returns whether or not the relation between revoker and
    /// revokee is of a sensitive nature.
    pub fn sensitive(&self) -> bool {
        self.sensitive
    }
}

/// A timestamp representable by OpenPGP.
///
/// OpenPGP timestamps are represented as `u32` containing the number
/// of seconds elapsed since midnight, 1 January 1970 UTC ([Section
/// 3.5 of RFC 4880]).
///
///   [Section 3.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u32);

impl From<Timestamp> for u32 {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl From<u32> for Timestamp {
    fn from(t: u32) -> Self {
        Timestamp(t)
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = anyhow::Error;

    fn try_from(t: SystemTime) -> Result<Self> {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) if d.as_secs() <= u32::MAX as u64 =>
                Ok(Timestamp(d.as_secs() as u32)),
            _ => Err(Error::InvalidArgument(
                format!("Time exceeds u32 epoch: {:?}", t)).into()),
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        UNIX_EPOCH + std::time::Duration::new(t.0 as u64, 0)
    }
}

impl Timestamp {
    /// Returns the current time, rounded down to whole seconds.
    pub fn now() -> Timestamp {
        SystemTime::now().try_into()
            .expect("representable for the next hundred years")
    }

    /// Adds a duration to this timestamp.
    ///
    /// Returns `None` if the resulting timestamp is not
    /// representable.
    pub fn checked_add(&self, d: Duration) -> Option<Timestamp> {
        self.0.checked_add(d.0).map(Timestamp)
    }

    /// Returns the duration between `self` and `other`.
    pub fn duration_since(&self, other: Timestamp) -> Option<Duration> {
        self.0.checked_sub(other.0).map(Duration)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A duration representable by OpenPGP.
///
///   [Section 3.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(u32);

impl From<Duration> for u32 {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl From<u32> for Duration {
    fn from(d: u32) -> Self {
        Duration(d)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = anyhow::Error;

    fn try_from(d: std::time::Duration) -> Result<Self> {
        if d.as_secs() <= u32::MAX as u64 {
            Ok(Duration(d.as_secs() as u32))
        } else {
            Err(Error::InvalidArgument(
                format!("Duration exceeds u32: {:?}", d)).into())
        }
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::new(d.0 as u64, 0)
    }
}

impl Duration {
    /// Returns a `Duration` with the given number of seconds.
    pub fn seconds(n: u32) -> Duration {
        Duration(n)
    }

    /// Returns the duration as seconds.
    pub fn as_secs(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} seconds", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, quickcheck};

    impl Arbitrary for PublicKeyAlgorithm {
        fn arbitrary(g: &mut Gen) -> Self {
            u8::arbitrary(g).into()
        }
    }

    impl Arbitrary for SymmetricAlgorithm {
        fn arbitrary(g: &mut Gen) -> Self {
            u8::arbitrary(g).into()
        }
    }

    impl Arbitrary for HashAlgorithm {
        fn arbitrary(g: &mut Gen) -> Self {
            u8::arbitrary(g).into()
        }
    }

    impl Arbitrary for CompressionAlgorithm {
        fn arbitrary(g: &mut Gen) -> Self {
            u8::arbitrary(g).into()
        }
    }

    impl Arbitrary for SignatureType {
        fn arbitrary(g: &mut Gen) -> Self {
            u8::arbitrary(g).into()
        }
    }

    quickcheck! {
        fn pk_roundtrip(algo: PublicKeyAlgorithm) -> bool {
            let val: u8 = algo.into();
            algo == PublicKeyAlgorithm::from(val)
        }
    }

    quickcheck! {
        fn sym_roundtrip(algo: SymmetricAlgorithm) -> bool {
            let val: u8 = algo.into();
            algo == SymmetricAlgorithm::from(val)
        }
    }

    quickcheck! {
        fn hash_roundtrip(algo: HashAlgorithm) -> bool {
            let val: u8 = algo.into();
            algo == HashAlgorithm::from(val)
        }
    }

    quickcheck! {
        fn comp_roundtrip(algo: CompressionAlgorithm) -> bool {
            let val: u8 = algo.into();
            algo == CompressionAlgorithm::from(val)
        }
    }

    quickcheck! {
        fn sigtype_roundtrip(typ: SignatureType) -> bool {
            let val: u8 = typ.into();
            typ == SignatureType::from(val)
        }
    }

    #[test]
    fn curve_oid_roundtrip() {
        for curve in [Curve::NistP256, Curve::NistP384, Curve::NistP521,
                      Curve::BrainpoolP256, Curve::BrainpoolP512,
                      Curve::Ed25519, Curve::Cv25519, Curve::Secp256k1] {
            assert_eq!(curve, Curve::from_oid(curve.oid()));
        }
    }

    #[test]
    fn key_flags_padding_is_ignored() {
        let a = KeyFlags::new(&[0x03]);
        let b = KeyFlags::new(&[0x03, 0x00, 0x00]);
        assert_eq!(a, b);
        assert!(a.for_certification() && a.for_signing());
        assert_eq!(b.to_bytes(), vec![0x03, 0x00, 0x00]);
    }

    #[test]
    fn timestamp_conversions() {
        let t = Timestamp::from(1554542220);
        let st: SystemTime = t.into();
        assert_eq!(Timestamp::try_from(st).unwrap(), t);
        assert_eq!(t.checked_add(Duration::seconds(5)),
                   Some(Timestamp::from(1554542225)));
    }
}
