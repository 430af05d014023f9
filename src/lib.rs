//! OpenPGP data types and associated machinery.
//!
//! This crate implements the core of OpenPGP as defined by [RFC 4880]
//! as well as some extensions (e.g., [RFC 6637], which describes ECC
//! cryptography for OpenPGP): the packet codec, the signature
//! subsystem, the key lifecycle, and the message pipeline.  Artifacts
//! produced by this crate interoperate bit-exactly with established
//! implementations, notably GnuPG.
//!
//! A few features that the OpenPGP community considers to be
//! deprecated (e.g., version 3 packets) have been left out.  We have
//! also updated some OpenPGP defaults to avoid foot guns (e.g.,
//! secret key material is always protected with an SHA-1 integrity
//! tag, never the legacy two-octet checksum).
//!
//! A non-goal of this crate is support for any sort of high-level,
//! bolted-on functionality.  For instance, [RFC 4880] does not define
//! trust models, such as the web of trust, and neither does this
//! crate.  Key-server access, on-disk keyrings, and streaming are
//! likewise out of scope; everything operates on in-memory buffers.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880
//! [RFC 6637]: https://tools.ietf.org/html/rfc6637

#![warn(missing_docs)]

#[macro_use] extern crate lazy_static;

pub mod armor;
pub mod crypto;

pub mod packet;

pub mod parse;
pub mod serialize;

pub mod cert;
pub use cert::Cert;
pub mod message;
pub use message::Message;

pub mod types;
use crate::types::{
    CompressionAlgorithm,
    HashAlgorithm,
    PublicKeyAlgorithm,
    SignatureType,
    SymmetricAlgorithm,
};

mod fingerprint;
pub use fingerprint::Fingerprint;
mod keyid;
pub use keyid::KeyID;

mod verify;
pub use verify::{SignatureVerification, VerificationSet};

pub(crate) mod fmt;

/// Crate result specialization.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

#[derive(thiserror::Error, Debug, Clone)]
/// Errors returned by this crate.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A malformed packet.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// Unsupported hash algorithm identifier.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    /// Unsupported public key algorithm identifier.
    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedPublicKeyAlgorithm(PublicKeyAlgorithm),

    /// Unsupported elliptic curve ASN.1 OID.
    #[error("Unsupported elliptic curve: {0}")]
    UnsupportedEllipticCurve(types::Curve),

    /// Unsupported symmetric key algorithm.
    #[error("Unsupported symmetric algorithm: {0}")]
    UnsupportedSymmetricAlgorithm(SymmetricAlgorithm),

    /// Unsupported compression algorithm.
    #[error("Unsupported compression algorithm: {0}")]
    UnsupportedCompressionAlgorithm(CompressionAlgorithm),

    /// Unsupported signature type.
    #[error("Unsupported signature type: {0}")]
    UnsupportedSignatureType(SignatureType),

    /// Invalid password.
    #[error("Invalid password")]
    InvalidPassword,

    /// Invalid session key.
    #[error("Invalid session key: {0}")]
    InvalidSessionKey(String),

    /// Missing session key.
    #[error("Missing session key: {0}")]
    MissingSessionKey(String),

    /// Malformed MPI.
    #[error("Malformed MPI: {0}")]
    MalformedMPI(String),

    /// Bad signature.
    #[error("Bad signature: {0}")]
    BadSignature(String),

    /// Message has been manipulated.
    ///
    /// Raised when the modification detection code is missing or does
    /// not match.  Any partially decrypted plaintext must be
    /// discarded.
    #[error("Message has been manipulated")]
    ManipulatedMessage,

    /// Malformed message.
    #[error("Malformed Message: {0}")]
    MalformedMessage(String),

    /// Malformed certificate.
    #[error("Malformed Cert: {0}")]
    MalformedCert(String),

    /// Malformed ASCII armor.
    #[error("Malformed armor: {0}")]
    MalformedArmor(String),

    /// The secret key material is locked.
    ///
    /// The operation requires the secret key material in cleartext,
    /// but it is protected by a passphrase.  Unlock it first.
    #[error("Secret key material is locked: {0}")]
    KeyLocked(String),

    /// The key's usage flags do not permit the operation.
    #[error("Key usage flags do not permit: {0}")]
    WrongKeyUsage(String),

    /// The key is revoked.
    #[error("Key is revoked")]
    KeyRevoked,

    /// Invalid key.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Expired.
    #[error("Expired on {0:?}")]
    Expired(std::time::SystemTime),
}

/// The OpenPGP packets this crate understands.
///
/// The different OpenPGP packets are detailed in [Section 5 of RFC 4880].
///
/// The `Unknown` packet allows the codec to deal with packets that it
/// doesn't understand.  It is basically a binary blob that includes
/// the packet's tag, and it round-trips losslessly.
///
///   [Section 5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
#[non_exhaustive]
pub enum Packet {
    /// Unknown packet.
    Unknown(packet::Unknown),
    /// Signature packet.
    Signature(packet::Signature),
    /// One pass signature packet.
    OnePassSig(packet::OnePassSig),
    /// Public key packet.
    PublicKey(packet::Key),
    /// Public subkey packet.
    PublicSubkey(packet::Key),
    /// Public/Secret key pair.
    SecretKey(packet::Key),
    /// Public/Secret subkey pair.
    SecretSubkey(packet::Key),
    /// Marker packet.
    Marker(packet::Marker),
    /// Trust packet.
    Trust(packet::Trust),
    /// User ID packet.
    UserID(packet::UserID),
    /// User attribute packet.
    UserAttribute(packet::UserAttribute),
    /// Literal data packet.
    Literal(packet::Literal),
    /// Compressed literal data packet.
    CompressedData(packet::CompressedData),
    /// Public key encrypted session key packet.
    PKESK(packet::PKESK),
    /// Symmetric key encrypted session key packet.
    SKESK(packet::SKESK),
    /// Symmetric key encrypted, integrity protected data packet.
    SEIP(packet::SEIP),
    /// Modification detection code packet.
    MDC(packet::MDC),
}

impl Packet {
    /// Returns the `Packet's` corresponding OpenPGP tag.
    ///
    /// Tags are explained in [Section 4.3 of RFC 4880].
    ///
    ///   [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
    pub fn tag(&self) -> packet::Tag {
        use crate::packet::Tag;
        match self {
            Packet::Unknown(p) => p.tag(),
            Packet::Signature(_) => Tag::Signature,
            Packet::OnePassSig(_) => Tag::OnePassSig,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::SecretKey(_) => Tag::SecretKey,
            Packet::SecretSubkey(_) => Tag::SecretSubkey,
            Packet::Marker(_) => Tag::Marker,
            Packet::Trust(_) => Tag::Trust,
            Packet::UserID(_) => Tag::UserID,
            Packet::UserAttribute(_) => Tag::UserAttribute,
            Packet::Literal(_) => Tag::Literal,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::PKESK(_) => Tag::PKESK,
            Packet::SKESK(_) => Tag::SKESK,
            Packet::SEIP(_) => Tag::SEIP,
            Packet::MDC(_) => Tag::MDC,
        }
    }

    /// Returns the parsed `Packet's` corresponding OpenPGP tag.
    ///
    /// Like [`Packet::tag`], but only if the packet was successfully
    /// parsed into the corresponding packet type.  An unparseable
    /// packet is reported as `None`.
    pub fn kind(&self) -> Option<packet::Tag> {
        match self {
            Packet::Unknown(_) => None,
            _ => Some(self.tag()),
        }
    }
}
