use std::fmt;

use crate::Error;
use crate::Result;
use crate::crypto::{Password, S2K, SessionKey};
use crate::types::SymmetricAlgorithm;

/// Holds a symmetrically encrypted session key.
///
/// The session key is needed to decrypt the actual ciphertext.  See
/// [Section 5.3 of RFC 4880] for details.
///
/// The encrypted session key (esk) field may be absent: in that case
/// the S2K-derived key *is* the session key.  When several
/// passphrases (or passphrases and public keys) share one session
/// key, the esk is present and wraps the true session key.
///
///   [Section 5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.3
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SKESK {
    /// Symmetric algorithm used to encrypt the session key.
    sym_algo: SymmetricAlgorithm,
    /// Key derivation method for the symmetric key.
    s2k: S2K,
    /// The encrypted session key.
    esk: Option<Vec<u8>>,
}

impl fmt::Debug for SKESK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SKESK")
            .field("sym_algo", &self.sym_algo)
            .field("s2k", &self.s2k)
            .field("esk", &self.esk.as_ref()
                   .map(crate::fmt::hex::encode))
            .finish()
    }
}

impl SKESK {
    pub(crate) fn from_parts(sym_algo: SymmetricAlgorithm, s2k: S2K,
                             esk: Option<Vec<u8>>)
                             -> Self
    {
        SKESK { sym_algo, s2k, esk }
    }

    /// Creates an SKESK packet whose derived key is the session key.
    ///
    /// The caller uses the returned session key to encrypt the
    /// payload.
    pub fn new_derived(password: &Password, algo: SymmetricAlgorithm)
                       -> Result<(SKESK, SessionKey)>
    {
        let s2k = S2K::default();
        let sk = s2k.derive_key(password, algo.key_size()?)?;
        Ok((SKESK {
            sym_algo: algo,
            s2k,
            esk: None,
        }, sk))
    }

    /// Creates an SKESK packet wrapping an existing session key.
    ///
    /// The derived key encrypts `algo || session_key` in CFB mode
    /// with a zero IV.
    pub fn with_session_key(password: &Password,
                            session_key: &SessionKey,
                            algo: SymmetricAlgorithm)
                            -> Result<SKESK>
    {
        let s2k = S2K::default();
        let derived = s2k.derive_key(password, algo.key_size()?)?;

        let mut esk = vec![0u8; 1 + session_key.len()];
        esk[0] = algo.into();
        esk[1..].copy_from_slice(session_key);
        let iv = vec![0u8; algo.block_size()?];
        crate::crypto::provider().cfb_encrypt(
            algo, &derived, &iv, &mut esk)?;

        Ok(SKESK {
            sym_algo: algo,
            s2k,
            esk: Some(esk),
        })
    }

    /// Gets the symmetric encryption algorithm.
    pub fn symmetric_algo(&self) -> SymmetricAlgorithm {
        self.sym_algo
    }

    /// Gets the S2K object.
    pub fn s2k(&self) -> &S2K {
        &self.s2k
    }

    /// Gets the encrypted session key, if any.
    pub fn esk(&self) -> Option<&[u8]> {
        self.esk.as_deref()
    }

    /// Derives the key inside this SKESK from `password`.
    ///
    /// Returns a tuple of the symmetric cipher to use with the key
    /// and the key itself.
    pub fn decrypt(&self, password: &Password)
                   -> Result<(SymmetricAlgorithm, SessionKey)>
    {
        let derived =
            self.s2k.derive_key(password, self.sym_algo.key_size()?)?;

        if let Some(esk) = &self.esk {
            // The derived key wraps the true session key.
            let mut plain = esk.clone();
            let iv = vec![0u8; self.sym_algo.block_size()?];
            crate::crypto::provider().cfb_decrypt(
                self.sym_algo, &derived, &iv, &mut plain)?;

            if plain.is_empty() {
                return Err(Error::InvalidSessionKey(
                    "Empty encrypted session key".into()).into());
            }
            let algo: SymmetricAlgorithm = plain[0].into();
            let sk: SessionKey = plain[1..].to_vec().into();
            Ok((algo, sk))
        } else {
            // The derived key is the session key.
            Ok((self.sym_algo, derived))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esk_round_trip() {
        let password: Password = "hunter2".into();
        let sk = SessionKey::new(32);
        let skesk = SKESK::with_session_key(
            &password, &sk, SymmetricAlgorithm::AES256).unwrap();
        let (algo, decrypted) = skesk.decrypt(&password).unwrap();
        assert_eq!(algo, SymmetricAlgorithm::AES256);
        assert_eq!(&decrypted[..], &sk[..]);
    }

    #[test]
    fn derived_key_is_session_key() {
        let password: Password = "hunter2".into();
        let (skesk, sk) =
            SKESK::new_derived(&password, SymmetricAlgorithm::AES128)
            .unwrap();
        assert!(skesk.esk().is_none());
        let (algo, decrypted) = skesk.decrypt(&password).unwrap();
        assert_eq!(algo, SymmetricAlgorithm::AES128);
        assert_eq!(&decrypted[..], &sk[..]);
    }
}
