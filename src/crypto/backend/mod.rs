//! The crypto-provider abstraction.
//!
//! All cryptographic primitives are invoked through the
//! [`CryptoProvider`] capability.  The core itself never touches key
//! material beyond moving opaque MPI bags around; everything that
//! computes lives behind this boundary.

use crate::Fingerprint;
use crate::Result;
use crate::crypto::hash;
use crate::crypto::mem::Protected;
use crate::crypto::mpi;
use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm,
                   SymmetricAlgorithm};

mod rust;

/// Random-byte generation.
///
/// The core never caches randomness between calls.
pub trait Entropy: Send + Sync {
    /// Fills the given buffer with random data.
    ///
    /// Fills the given buffer with random data produced by a
    /// cryptographically secure pseudorandom number generator
    /// (CSPRNG).  The output may be used as session keys or to derive
    /// long-term cryptographic keys from.
    fn random(&self, buf: &mut [u8]) -> Result<()>;
}

/// Abstracts over the cryptographic backends.
///
/// Note: when implementing the support predicates, match exhaustively
/// on the algorithm, do not use a catch-all.  This way, when new
/// algorithms are introduced, we will see where we may need to add
/// support.
pub trait CryptoProvider: Entropy {
    /// Returns whether the given hash algorithm is supported.
    fn hash_supported(&self, algo: HashAlgorithm) -> bool;

    /// Creates a fresh hash context.
    fn hash_context(&self, algo: HashAlgorithm) -> Result<hash::Context>;

    /// Returns whether the given public key cryptography algorithm is
    /// supported by this provider.
    fn supports_algo(&self, algo: PublicKeyAlgorithm) -> bool;

    /// Returns whether the given elliptic curve is supported by this
    /// provider.
    fn supports_curve(&self, curve: &Curve) -> bool;

    /// Creates a signature over the `digest` using the given secret
    /// key material.
    fn sign(&self, public: &mpi::PublicKey, secret: &mpi::SecretKeyMaterial,
            hash_algo: HashAlgorithm, digest: &[u8])
            -> Result<mpi::Signature>;

    /// Verifies the signature over `digest`.
    ///
    /// A failed verification is an error (`Error::BadSignature`), not
    /// a boolean; callers convert it into a verification value.
    fn verify(&self, public: &mpi::PublicKey, sig: &mpi::Signature,
              hash_algo: HashAlgorithm, digest: &[u8])
              -> Result<()>;

    /// Encrypts the session key envelope to the given public key.
    ///
    /// `recipient` is the fingerprint of the recipient key; ECDH
    /// binds it into the key derivation.
    fn encrypt_session_key(&self, public: &mpi::PublicKey,
                           recipient: &Fingerprint, payload: &Protected)
                           -> Result<mpi::Ciphertext>;

    /// Decrypts the session key envelope.
    fn decrypt_session_key(&self, public: &mpi::PublicKey,
                           secret: &mpi::SecretKeyMaterial,
                           recipient: &Fingerprint,
                           ciphertext: &mpi::Ciphertext)
                           -> Result<Protected>;

    /// Encrypts the given buffer in place using CFB mode.
    fn cfb_encrypt(&self, algo: SymmetricAlgorithm, key: &[u8], iv: &[u8],
                   data: &mut [u8]) -> Result<()>;

    /// Decrypts the given buffer in place using CFB mode.
    fn cfb_decrypt(&self, algo: SymmetricAlgorithm, key: &[u8], iv: &[u8],
                   data: &mut [u8]) -> Result<()>;

    /// Generates a fresh RSA key of the given size.
    fn generate_rsa(&self, bits: usize)
                    -> Result<(mpi::PublicKey, mpi::SecretKeyMaterial)>;

    /// Generates a fresh DSA key of the given size.
    fn generate_dsa(&self, bits: usize)
                    -> Result<(mpi::PublicKey, mpi::SecretKeyMaterial)>;

    /// Generates a fresh ECC key on the given curve.
    ///
    /// `for_signing` selects between EdDSA/ECDSA and ECDH key shapes.
    fn generate_ecc(&self, for_signing: bool, curve: Curve)
                    -> Result<(mpi::PublicKey, mpi::SecretKeyMaterial)>;
}

/// Returns the default crypto provider.
pub fn provider() -> &'static dyn CryptoProvider {
    &rust::RustCrypto
}
