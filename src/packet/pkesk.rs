use std::fmt;

use crate::Error;
use crate::KeyID;
use crate::Result;
use crate::crypto::SessionKey;
use crate::crypto::mem::Protected;
use crate::crypto::mpi::Ciphertext;
use crate::packet::Key;
use crate::types::{PublicKeyAlgorithm, SymmetricAlgorithm};

/// Holds an asymmetrically encrypted session key.
///
/// The session key is needed to decrypt the actual ciphertext.  See
/// [Section 5.1 of RFC 4880] for details.
///
///   [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PKESK {
    /// Key ID of the key this is encrypted to.
    ///
    /// A wildcard (all-zero) key ID hides the recipient; consumers
    /// must trial-decrypt ("throw keyid").
    recipient: KeyID,
    /// Public key algorithm used to encrypt the session key.
    pk_algo: PublicKeyAlgorithm,
    /// The encrypted session key.
    esk: Ciphertext,
}

impl fmt::Debug for PKESK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PKESK")
            .field("recipient", &self.recipient)
            .field("pk_algo", &self.pk_algo)
            .field("esk", &self.esk)
            .finish()
    }
}

impl PKESK {
    /// Creates a new PKESK packet from its parts.
    pub(crate) fn from_parts(recipient: KeyID,
                             pk_algo: PublicKeyAlgorithm,
                             esk: Ciphertext)
                             -> Self
    {
        PKESK { recipient, pk_algo, esk }
    }

    /// Creates a new PKESK packet.
    ///
    /// The given symmetric algorithm must match the algorithm that is
    /// used to encrypt the payload.  If `throw_keyid` is set, the
    /// recipient's key ID is replaced by the wildcard.
    pub fn for_recipient(algo: SymmetricAlgorithm,
                         session_key: &SessionKey,
                         recipient: &Key,
                         throw_keyid: bool)
                         -> Result<PKESK>
    {
        // The session key is encoded as:
        //
        //   cipher octet || session key || two-octet checksum
        let mut payload: Protected =
            vec![0; 1 + session_key.len() + 2].into();
        payload[0] = algo.into();
        payload[1..1 + session_key.len()].copy_from_slice(session_key);
        let checksum = crate::crypto::checksum(session_key);
        payload[1 + session_key.len()..]
            .copy_from_slice(&checksum.to_be_bytes());

        let esk = crate::crypto::provider().encrypt_session_key(
            recipient.mpis(), &recipient.fingerprint(), &payload)?;

        Ok(PKESK {
            recipient: if throw_keyid {
                KeyID::wildcard()
            } else {
                recipient.keyid()
            },
            pk_algo: recipient.pk_algo(),
            esk,
        })
    }

    /// Gets the recipient.
    pub fn recipient(&self) -> &KeyID {
        &self.recipient
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the encrypted session key.
    pub fn esk(&self) -> &Ciphertext {
        &self.esk
    }

    /// Decrypts the encrypted session key.
    ///
    /// Returns the session key and the symmetric algorithm used to
    /// encrypt the following payload.  `key` must carry unlocked
    /// secret key material.
    pub fn decrypt(&self, key: &Key)
                   -> Result<(SymmetricAlgorithm, SessionKey)>
    {
        let secret = key.unencrypted_secret()?;

        let payload = crate::crypto::provider().decrypt_session_key(
            key.mpis(), secret, &key.fingerprint(), &self.esk)?;

        if payload.len() < 1 + 2 {
            return Err(Error::InvalidSessionKey(
                "Session key payload too short".into()).into());
        }

        let algo: SymmetricAlgorithm = payload[0].into();
        let sk: SessionKey = Protected::from(
            &payload[1..payload.len() - 2]).into();
        let checksum = u16::from_be_bytes(
            payload[payload.len() - 2..].try_into().unwrap());

        if crate::crypto::checksum(&sk) != checksum {
            return Err(Error::InvalidSessionKey(
                "Session key checksum mismatch".into()).into());
        }

        Ok((algo, sk))
    }
}
