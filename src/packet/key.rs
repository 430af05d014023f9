//! Key packets.
//!
//! The same in-core type backs all four key packets (public/secret,
//! primary/subkey); the distinction is carried by the `Packet`
//! variant, and a secret key is a public key with attached
//! [`SecretKeyMaterial`].  See [Section 5.5 of RFC 4880].
//!
//!   [Section 5.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5

use std::fmt;

use crate::Error;
use crate::Fingerprint;
use crate::KeyID;
use crate::Result;
use crate::crypto::{Password, S2K};
use crate::crypto::hash::Hash;
use crate::crypto::mem::Protected;
use crate::crypto::mpi;
use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm,
                   SymmetricAlgorithm, Timestamp};

/// Holds a key packet.
///
/// The packet is a public key when `secret` is `None`, and a secret
/// key otherwise.  Whether the key is a primary key or a subkey is
/// decided by the packet framing, not by this type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key {
    /// When the key was created.
    creation_time: Timestamp,
    /// Public key algorithm of this key.
    pk_algo: PublicKeyAlgorithm,
    /// The key's public MPIs.
    mpis: mpi::PublicKey,
    /// The key's optional secret material.
    secret: Option<SecretKeyMaterial>,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key")
            .field("fingerprint", &self.fingerprint())
            .field("creation_time", &self.creation_time)
            .field("pk_algo", &self.pk_algo)
            .field("mpis", &self.mpis)
            .field("secret", &self.secret)
            .finish()
    }
}

impl Key {
    /// Creates an OpenPGP key packet from existing parts.
    pub fn from_parts(creation_time: Timestamp,
                      pk_algo: PublicKeyAlgorithm,
                      mpis: mpi::PublicKey,
                      secret: Option<SecretKeyMaterial>)
                      -> Self
    {
        Key { creation_time, pk_algo, mpis, secret }
    }

    /// Generates a new RSA key with a modulus of the given size.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let (mpis, secret) = crate::crypto::provider().generate_rsa(bits)?;
        Ok(Key {
            creation_time: Timestamp::now(),
            pk_algo: PublicKeyAlgorithm::RSAEncryptSign,
            mpis,
            secret: Some(SecretKeyMaterial::Unencrypted(secret.into())),
        })
    }

    /// Generates a new DSA key.
    pub fn generate_dsa(bits: usize) -> Result<Self> {
        let (mpis, secret) = crate::crypto::provider().generate_dsa(bits)?;
        Ok(Key {
            creation_time: Timestamp::now(),
            pk_algo: PublicKeyAlgorithm::DSA,
            mpis,
            secret: Some(SecretKeyMaterial::Unencrypted(secret.into())),
        })
    }

    /// Generates a new ECC key on `curve`.
    ///
    /// If `for_signing` is false, an ECDH key is generated.  Signing
    /// keys use EdDSA on Curve25519 and ECDSA on the Weierstrass
    /// curves.
    pub fn generate_ecc(for_signing: bool, curve: Curve) -> Result<Self> {
        let (mpis, secret) =
            crate::crypto::provider().generate_ecc(for_signing, curve)?;
        let pk_algo = mpis.algo()
            .expect("generated key material has a known algorithm");
        Ok(Key {
            creation_time: Timestamp::now(),
            pk_algo,
            mpis,
            secret: Some(SecretKeyMaterial::Unencrypted(secret.into())),
        })
    }

    /// Gets the key packet's creation time field.
    pub fn creation_time(&self) -> Timestamp {
        self.creation_time
    }

    /// Sets the key packet's creation time field.
    pub fn set_creation_time(&mut self, timestamp: Timestamp) {
        self.creation_time = timestamp;
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the key packet's MPIs.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }

    /// Computes and returns the key's fingerprint.
    ///
    /// See [Section 12.2 of RFC 4880].
    ///
    ///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
    pub fn fingerprint(&self) -> Fingerprint {
        let mut h = HashAlgorithm::SHA1.context()
            .expect("SHA1 is mandatory");
        self.hash(&mut h);

        let mut digest = vec![0u8; h.digest_size()];
        let _ = h.digest(&mut digest);
        Fingerprint::from_bytes(&digest)
    }

    /// Computes and returns the key's key ID.
    pub fn keyid(&self) -> KeyID {
        self.fingerprint().to_keyid()
    }

    /// Returns whether the key has secret key material attached.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Gets the key packet's secret key material, if any.
    pub fn secret(&self) -> Option<&SecretKeyMaterial> {
        self.secret.as_ref()
    }

    /// Returns whether the secret key material is protected by a
    /// passphrase.
    pub fn is_protected(&self) -> bool {
        matches!(self.secret, Some(SecretKeyMaterial::Encrypted(_)))
    }

    /// Returns whether cleartext secret key material is available,
    /// i.e. the key is a secret key and not locked.
    pub fn is_unlocked(&self) -> bool {
        matches!(self.secret, Some(SecretKeyMaterial::Unencrypted(_)))
    }

    /// Returns the cleartext secret key material.
    ///
    /// # Errors
    ///
    /// Fails with `Error::KeyLocked` if the material is protected by
    /// a passphrase, and with `Error::InvalidOperation` if the packet
    /// has no secret material at all.
    pub fn unencrypted_secret(&self) -> Result<&mpi::SecretKeyMaterial> {
        match &self.secret {
            Some(SecretKeyMaterial::Unencrypted(u)) => Ok(&u.mpis),
            Some(SecretKeyMaterial::Encrypted(_)) =>
                Err(Error::KeyLocked(
                    format!("key {}", self.keyid())).into()),
            None => Err(Error::InvalidOperation(
                format!("no secret material for key {}", self.keyid()))
                        .into()),
        }
    }

    /// Protects the secret key material with `password`.
    ///
    /// The key is derived with an iterated and salted S2K using
    /// `hash` and a fresh salt, with the iteration count calibrated
    /// to take on the order of a tenth of a second.  The secret MPIs
    /// and their SHA-1 tag are encrypted with `algo` in CFB mode.
    ///
    /// # Errors
    ///
    /// Fails with `Error::KeyLocked` if the material is already
    /// protected.
    pub fn protect(&mut self, password: &Password,
                   algo: SymmetricAlgorithm, hash: HashAlgorithm)
                   -> Result<()>
    {
        let unencrypted = match &self.secret {
            Some(SecretKeyMaterial::Unencrypted(u)) => u,
            Some(SecretKeyMaterial::Encrypted(_)) =>
                return Err(Error::KeyLocked(
                    "already protected; unlock it first".into()).into()),
            None => return Err(Error::InvalidOperation(
                "no secret material to protect".into()).into()),
        };

        let s2k = match S2K::default() {
            S2K::Iterated { salt, hash_bytes, .. } =>
                S2K::Iterated { hash, salt, hash_bytes },
            _ => unreachable!("default S2K is iterated"),
        };
        let key = s2k.derive_key(password, algo.key_size()?)?;

        // Serialize the secret MPIs, then append the SHA-1 tag over
        // them.
        let mut plaintext = Vec::new();
        unencrypted.mpis.serialize_into(&mut plaintext);
        let mut sha1 = HashAlgorithm::SHA1.context()?;
        sha1.update(&plaintext);
        let mut tag = [0u8; 20];
        sha1.digest(&mut tag)?;
        plaintext.extend_from_slice(&tag);

        let mut iv = vec![0u8; algo.block_size()?];
        crate::crypto::random(&mut iv);
        crate::crypto::provider().cfb_encrypt(
            algo, &key, &iv, &mut plaintext)?;

        // Swap in the protected envelope atomically.
        self.secret = Some(SecretKeyMaterial::Encrypted(Encrypted {
            s2k,
            algo,
            checksum: SecretChecksum::Sha1,
            iv: iv.into_boxed_slice(),
            ciphertext: plaintext.into_boxed_slice(),
        }));
        Ok(())
    }

    /// Unlocks the secret key material in place.
    ///
    /// # Errors
    ///
    /// Fails with `Error::InvalidPassword` if the password is wrong
    /// (detected through the integrity tag).
    pub fn decrypt_secret(&mut self, password: &Password) -> Result<()> {
        let encrypted = match &self.secret {
            Some(SecretKeyMaterial::Encrypted(e)) => e,
            Some(SecretKeyMaterial::Unencrypted(_)) => return Ok(()),
            None => return Err(Error::InvalidOperation(
                "no secret material to unlock".into()).into()),
        };

        let mpis = encrypted.decrypt(self.pk_algo, password)?;
        self.secret = Some(SecretKeyMaterial::Unencrypted(mpis.into()));
        Ok(())
    }

    /// Unlocks the key for the duration of the closure.
    ///
    /// The cleartext secret key material lives in a temporary copy
    /// that is zeroed out when the closure returns, on every exit
    /// path.  The key itself is not mutated.
    pub fn unlock<T, F>(&self, password: &Password, fun: F) -> Result<T>
        where F: FnOnce(&Key) -> Result<T>
    {
        match &self.secret {
            Some(SecretKeyMaterial::Encrypted(_)) => {
                let mut unlocked = self.clone();
                unlocked.decrypt_secret(password)?;
                fun(&unlocked)
                // The temporary's ProtectedMPIs are zeroed on drop.
            },
            Some(SecretKeyMaterial::Unencrypted(_)) => fun(self),
            None => Err(Error::InvalidOperation(
                "no secret material to unlock".into()).into()),
        }
    }

    /// Returns a copy of this key with the secret material removed.
    pub fn public_cloned(&self) -> Key {
        Key {
            creation_time: self.creation_time,
            pk_algo: self.pk_algo,
            mpis: self.mpis.clone(),
            secret: None,
        }
    }

    /// Attaches the given secret key material.
    pub(crate) fn set_secret(&mut self, secret: Option<SecretKeyMaterial>) {
        self.secret = secret;
    }
}

/// Holds secret key material.
///
/// This type allows postponing the decryption of the secret key
/// material until it is actually needed.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum SecretKeyMaterial {
    /// Unencrypted secret key.  Can be used as-is.
    Unencrypted(Unencrypted),
    /// The secret key is encrypted with a password.
    Encrypted(Encrypted),
}

impl From<mpi::SecretKeyMaterial> for SecretKeyMaterial {
    fn from(mpis: mpi::SecretKeyMaterial) -> Self {
        SecretKeyMaterial::Unencrypted(mpis.into())
    }
}

/// Unencrypted secret key material.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Unencrypted {
    /// The secret MPIs, in protected memory.
    mpis: mpi::SecretKeyMaterial,
}

impl From<mpi::SecretKeyMaterial> for Unencrypted {
    fn from(mpis: mpi::SecretKeyMaterial) -> Self {
        Unencrypted { mpis }
    }
}

impl fmt::Debug for Unencrypted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Unencrypted { <Redacted> }")
    }
}

impl Unencrypted {
    /// Returns the secret MPIs.
    pub fn mpis(&self) -> &mpi::SecretKeyMaterial {
        &self.mpis
    }
}

/// How the protected secret material is integrity-checked.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SecretChecksum {
    /// A SHA-1 tag over the cleartext MPIs (S2K usage octet 0xFE).
    ///
    /// This is the only variant new keys emit.
    Sha1,
    /// The legacy two-octet sum modulo 65536.  Accepted on parse
    /// only.
    Sum16,
}

/// Secret key material encrypted with a password.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Encrypted {
    /// Key derivation mechanism to use.
    pub(crate) s2k: S2K,
    /// Symmetric algorithm used to encrypt the secret key material.
    pub(crate) algo: SymmetricAlgorithm,
    /// The integrity mechanism.
    pub(crate) checksum: SecretChecksum,
    /// The initialization vector.
    pub(crate) iv: Box<[u8]>,
    /// Encrypted secret key material.
    pub(crate) ciphertext: Box<[u8]>,
}

impl fmt::Debug for Encrypted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Encrypted")
            .field("s2k", &self.s2k)
            .field("algo", &self.algo)
            .field("checksum", &self.checksum)
            .finish()
    }
}

impl Encrypted {
    /// Creates a new encrypted key object from its parts.
    pub(crate) fn from_parts(s2k: S2K, algo: SymmetricAlgorithm,
                             checksum: SecretChecksum, iv: Box<[u8]>,
                             ciphertext: Box<[u8]>)
                             -> Self
    {
        Encrypted { s2k, algo, checksum, iv, ciphertext }
    }

    /// Returns the key derivation mechanism.
    pub fn s2k(&self) -> &S2K {
        &self.s2k
    }

    /// Returns the symmetric algorithm.
    pub fn algo(&self) -> SymmetricAlgorithm {
        self.algo
    }

    /// Decrypts the secret key material using `password`.
    pub(crate) fn decrypt(&self, pk_algo: PublicKeyAlgorithm,
                          password: &Password)
                          -> Result<mpi::SecretKeyMaterial>
    {
        let key = self.s2k.derive_key(password, self.algo.key_size()?)?;

        let mut plaintext: Protected =
            self.ciphertext.to_vec().into();
        crate::crypto::provider().cfb_decrypt(
            self.algo, &key, &self.iv, &mut plaintext)?;

        // Check the integrity tag; a mismatch means the password was
        // wrong (or the envelope was damaged, which we cannot tell
        // apart).
        let mpi_bytes: Protected = match self.checksum {
            SecretChecksum::Sha1 => {
                if plaintext.len() < 20 {
                    return Err(Error::InvalidPassword.into());
                }
                let (mpis, tag) = plaintext.split_at(plaintext.len() - 20);
                let mut sha1 = HashAlgorithm::SHA1.context()?;
                sha1.update(mpis);
                let mut digest = [0u8; 20];
                sha1.digest(&mut digest)?;
                if crate::crypto::mem::secure_cmp(&digest, tag)
                    != std::cmp::Ordering::Equal
                {
                    return Err(Error::InvalidPassword.into());
                }
                mpis.into()
            },
            SecretChecksum::Sum16 => {
                if plaintext.len() < 2 {
                    return Err(Error::InvalidPassword.into());
                }
                let (mpis, sum) = plaintext.split_at(plaintext.len() - 2);
                let expected = u16::from_be_bytes(sum.try_into().unwrap());
                if crate::crypto::checksum(mpis) != expected {
                    return Err(Error::InvalidPassword.into());
                }
                mpis.into()
            },
        };

        crate::parse::secret_key_material(pk_algo, &mpi_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_and_fingerprint_is_stable() {
        let key = Key::generate_ecc(true, Curve::Ed25519).unwrap();
        let fp1 = key.fingerprint();
        let fp2 = key.fingerprint();
        assert_eq!(fp1, fp2);
        assert_eq!(key.keyid(), fp1.to_keyid());
        assert!(key.is_unlocked());
        assert!(!key.is_protected());
    }

    #[test]
    fn public_cloned_strips_secret() {
        let key = Key::generate_ecc(true, Curve::Ed25519).unwrap();
        let public = key.public_cloned();
        assert!(!public.has_secret());
        assert_eq!(public.fingerprint(), key.fingerprint());
    }

    #[test]
    fn protect_unlock_cycle() {
        let mut key = Key::generate_ecc(true, Curve::Ed25519).unwrap();
        let password: Password = "QwertyUiop".into();
        key.protect(&password, SymmetricAlgorithm::AES256,
                    HashAlgorithm::SHA256).unwrap();
        assert!(key.is_protected());
        assert!(!key.is_unlocked());
        assert!(key.unencrypted_secret().is_err());

        // Wrong password.
        assert!(key.unlock(&"wrong".into(), |_| Ok(())).is_err());

        // Right password; the key itself stays protected.
        key.unlock(&password, |unlocked| {
            assert!(unlocked.is_unlocked());
            unlocked.unencrypted_secret().map(|_| ())
        }).unwrap();
        assert!(key.is_protected());
    }

    #[test]
    fn change_passphrase() {
        let mut key = Key::generate_ecc(true, Curve::Ed25519).unwrap();
        key.protect(&"first".into(), SymmetricAlgorithm::AES256,
                    HashAlgorithm::SHA256).unwrap();

        key.decrypt_secret(&"first".into()).unwrap();
        key.protect(&"second".into(), SymmetricAlgorithm::AES256,
                    HashAlgorithm::SHA256).unwrap();

        assert!(key.unlock(&"first".into(), |_| Ok(())).is_err());
        key.unlock(&"second".into(), |_| Ok(())).unwrap();
    }
}
