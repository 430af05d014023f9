use std::fmt;

use crate::KeyID;
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, SignatureType};

/// Holds a one-pass signature packet.
///
/// The one-pass signature packet precedes the signed data, so that a
/// consumer can start hashing immediately; the matching signature
/// packet follows the data.  See [Section 5.4 of RFC 4880].
///
///   [Section 5.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.4
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OnePassSig {
    /// Type of the signature the packet refers to.
    typ: SignatureType,
    /// Hash algorithm used to compute the signature.
    hash_algo: HashAlgorithm,
    /// Public key algorithm of this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Key ID of the signing key.
    issuer: KeyID,
    /// A one-octet number holding a flag showing whether the
    /// signature is nested.
    last: bool,
}

impl fmt::Debug for OnePassSig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OnePassSig")
            .field("typ", &self.typ)
            .field("hash_algo", &self.hash_algo)
            .field("pk_algo", &self.pk_algo)
            .field("issuer", &self.issuer)
            .field("last", &self.last)
            .finish()
    }
}

impl OnePassSig {
    /// Returns a new `OnePassSig` packet.
    pub fn new(typ: SignatureType) -> Self {
        OnePassSig {
            typ,
            hash_algo: HashAlgorithm::Unknown(0),
            pk_algo: PublicKeyAlgorithm::Unknown(0),
            issuer: KeyID::wildcard(),
            last: true,
        }
    }

    /// Gets the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Sets the public key algorithm.
    pub fn set_pk_algo(&mut self, algo: PublicKeyAlgorithm) {
        self.pk_algo = algo;
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Sets the hash algorithm.
    pub fn set_hash_algo(&mut self, algo: HashAlgorithm) {
        self.hash_algo = algo;
    }

    /// Gets the issuer.
    pub fn issuer(&self) -> &KeyID {
        &self.issuer
    }

    /// Sets the issuer.
    pub fn set_issuer(&mut self, issuer: KeyID) {
        self.issuer = issuer;
    }

    /// Gets the last flag.
    ///
    /// When multiple one-pass signature packets are nested, only the
    /// innermost one has this flag set.
    pub fn last(&self) -> bool {
        self.last
    }

    /// Sets the last flag.
    pub fn set_last(&mut self, last: bool) {
        self.last = last;
    }
}
