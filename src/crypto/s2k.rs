//! String-to-Key transformations.
//!
//! The S2K mechanism is used to derive a symmetric key from a
//! password, for symmetric-key encrypted messages and for protecting
//! secret key material.  See [Section 3.7 of RFC 4880].
//!
//!   [Section 3.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7

use std::fmt;
use std::time::Instant;

use crate::Error;
use crate::Result;
use crate::crypto::Password;
use crate::crypto::SessionKey;
use crate::types::HashAlgorithm;

/// String-to-Key (S2K) specifiers.
///
/// String-to-key (S2K) specifiers are used to convert passphrase
/// strings into symmetric-key encryption/decryption keys.  See
/// [Section 3.7 of RFC 4880].
///
///   [Section 3.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum S2K {
    /// Simply hashes the password.
    Simple {
        /// Hash used for key derivation.
        hash: HashAlgorithm,
    },

    /// Hashes the password with a public `salt` value.
    Salted {
        /// Hash used for key derivation.
        hash: HashAlgorithm,
        /// Public salt value mixed into the password.
        salt: [u8; 8],
    },

    /// Repeatedly hashes the password with a public `salt` value.
    Iterated {
        /// Hash used for key derivation.
        hash: HashAlgorithm,
        /// Public salt value mixed into the password.
        salt: [u8; 8],
        /// Number of bytes to hash.
        ///
        /// This parameter increases the workload for an attacker
        /// doing a dictionary attack.  Only certain values are
        /// representable on the wire; see [`S2K::nearest_hash_count`].
        hash_bytes: u32,
    },

    /// Private S2K algorithm.
    Private(u8),

    /// Unknown S2K algorithm.
    Unknown(u8),
}

impl Default for S2K {
    fn default() -> Self {
        let mut salt = [0u8; 8];
        crate::crypto::random(&mut salt);
        S2K::Iterated {
            // SHA2-256, being optimized for implementations on
            // architectures with a word size of 32 bit, has a more
            // consistent runtime across platforms than SHA2-512.
            hash: HashAlgorithm::SHA256,
            salt,
            hash_bytes: S2K::nearest_hash_count(Self::calibrated_count()),
        }
    }
}

lazy_static! {
    /// Hash count calibrated such that a derivation takes roughly
    /// 65 to 130 milliseconds on this machine.
    ///
    /// Measured once per process; the table is never mutated.
    static ref CALIBRATED_COUNT: u32 = S2K::calibrate();
}

impl S2K {
    /// Calibrated hash count for this machine.
    fn calibrated_count() -> u32 {
        *CALIBRATED_COUNT
    }

    fn calibrate() -> u32 {
        // Measure how many bytes we can hash in ~10ms, then scale to
        // land in the 65..130ms window.
        const SAMPLE: usize = 1 << 20;
        let h = HashAlgorithm::SHA256;

        let mut ctx = match h.context() {
            Ok(ctx) => ctx,
            // SHA256 is always supported by the default provider;
            // fall back to a reasonable fixed cost otherwise.
            Err(_) => return 65011712,
        };
        let buf = vec![0u8; SAMPLE];
        let start = Instant::now();
        ctx.update(&buf);
        let mut digest = vec![0u8; ctx.digest_size()];
        let _ = ctx.digest(&mut digest);
        let elapsed = start.elapsed().as_nanos().max(1);

        let bytes_per_100ms =
            (SAMPLE as u128)
            .saturating_mul(100_000_000)
            .checked_div(elapsed)
            .unwrap_or(u32::MAX as u128);

        bytes_per_100ms.clamp(1 << 16, 0xFFFF_FFFF) as u32
    }

    /// Convert the given iteration count to a coded count, rounded up
    /// to the next representable value.
    ///
    /// Iterated S2K can only represent hash counts of the form
    /// `(16 + (c & 15)) << ((c >> 4) + 6)`.
    pub fn nearest_hash_count(hash_bytes: u32) -> u32 {
        if hash_bytes <= 1024 {
            1024
        } else if hash_bytes >= 0x3e00000 {
            0x3e00000
        } else {
            Self::decode_count(Self::encode_count(hash_bytes))
        }
    }

    pub(crate) fn decode_count(coded: u8) -> u32 {
        (16 + (coded as u32 & 15)) << ((coded >> 4) + 6)
    }

    pub(crate) fn encode_count(hash_bytes: u32) -> u8 {
        for coded in 0..=255u8 {
            if Self::decode_count(coded) >= hash_bytes {
                return coded;
            }
        }
        255
    }

    /// Converts the given password to a symmetric key of `key_size`
    /// bytes.
    pub fn derive_key(&self, password: &Password, key_size: usize)
        -> Result<SessionKey>
    {
        match self {
            &S2K::Simple { hash } | &S2K::Salted { hash, .. }
            | &S2K::Iterated { hash, .. } => password.map(|string| {
                let mut key: Vec<u8> = vec![0u8; key_size];

                // If the digest is too short, we need multiple hash
                // contexts, each preloaded with one more zero byte
                // than the previous one.
                for (i, key_block) in {
                    let digest_size = hash.context()?.digest_size();
                    key.chunks_mut(digest_size).enumerate()
                } {
                    let mut ctx = hash.context()?;
                    ctx.update(&vec![0u8; i]);

                    match self {
                        &S2K::Simple { .. } => {
                            ctx.update(string);
                        },
                        &S2K::Salted { ref salt, .. } => {
                            ctx.update(salt);
                            ctx.update(string);
                        },
                        &S2K::Iterated { ref salt, hash_bytes, .. } => {
                            // Independent of what the hash count is,
                            // the salt and password are hashed at
                            // least once.
                            let todo = (hash_bytes as usize)
                                .max(salt.len() + string.len());
                            let mut done = 0;
                            while done < todo {
                                let burst =
                                    (todo - done).min(salt.len() + string.len());
                                let mut data =
                                    Vec::with_capacity(salt.len() + string.len());
                                data.extend_from_slice(salt);
                                data.extend_from_slice(string);
                                ctx.update(&data[..burst]);
                                done += burst;
                            }
                        },
                        _ => unreachable!(),
                    }

                    let mut digest = vec![0u8; ctx.digest_size()];
                    ctx.digest(&mut digest)?;
                    let n = key_block.len().min(digest.len());
                    key_block[..n].copy_from_slice(&digest[..n]);
                }

                Ok(key.into())
            }),
            S2K::Unknown(u) | S2K::Private(u) =>
                Err(Error::MalformedPacket(
                    format!("Unknown S2K type {:#x}", u)).into()),
        }
    }

    /// Returns whether this S2K mechanism is supported.
    pub fn is_supported(&self) -> bool {
        !matches!(self, S2K::Unknown(_) | S2K::Private(_))
    }

    pub(crate) fn serialize_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            S2K::Simple { hash } => {
                buf.push(0);
                buf.push((*hash).into());
            },
            S2K::Salted { hash, salt } => {
                buf.push(1);
                buf.push((*hash).into());
                buf.extend_from_slice(salt);
            },
            S2K::Iterated { hash, salt, hash_bytes } => {
                buf.push(3);
                buf.push((*hash).into());
                buf.extend_from_slice(salt);
                buf.push(Self::encode_count(*hash_bytes));
            },
            S2K::Private(u) | S2K::Unknown(u) =>
                return Err(Error::InvalidOperation(
                    format!("Cannot serialize unknown S2K type {:#x}", u))
                           .into()),
        }
        Ok(())
    }
}

impl fmt::Display for S2K {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            S2K::Simple { hash } =>
                f.write_fmt(format_args!("Simple S2K with {}", hash)),
            S2K::Salted { hash, salt } =>
                f.write_fmt(format_args!(
                    "Salted S2K with {} and salt {}",
                    hash, crate::fmt::hex::encode(salt))),
            S2K::Iterated { hash, salt, hash_bytes } =>
                f.write_fmt(format_args!(
                    "Iterated and Salted S2K with {}, salt {} and {} bytes \
                     to hash", hash, crate::fmt::hex::encode(salt),
                    hash_bytes)),
            S2K::Private(u) =>
                f.write_fmt(format_args!("Private/Experimental S2K {}", u)),
            S2K::Unknown(u) =>
                f.write_fmt(format_args!("Unknown S2K {:#x}", u)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coded_count_round_trip() {
        for coded in 0..=255u8 {
            let count = S2K::decode_count(coded);
            assert_eq!(S2K::encode_count(count), coded);
        }
        // The canonical GnuPG default.
        assert_eq!(S2K::decode_count(0x60), 65536);
        assert_eq!(S2K::decode_count(0xff), 0x3e00000);
    }

    #[test]
    fn nearest_hash_count_is_representable() {
        for count in [0u32, 1, 1024, 65536, 65537, 12345678, u32::MAX] {
            let nearest = S2K::nearest_hash_count(count);
            assert_eq!(S2K::decode_count(S2K::encode_count(nearest)), nearest);
        }
    }

    #[test]
    fn simple_s2k_is_a_plain_hash() {
        // SHA1("foobar"), truncated to the key size.
        let password: Password = "foobar".into();
        let s2k = S2K::Simple { hash: HashAlgorithm::SHA1 };
        let key = s2k.derive_key(&password, 16).unwrap();
        assert_eq!(&key[..],
                   &crate::fmt::from_hex("8843d7f92416211de9ebb963ff4ce281",
                                         false).unwrap()[..]);
    }

    #[test]
    fn salted_s2k_prepends_salt() {
        let password: Password = "foobar".into();
        let salt = [1, 2, 3, 4, 5, 6, 7, 8];
        let s2k = S2K::Salted { hash: HashAlgorithm::SHA1, salt };
        let expected = {
            let mut ctx = HashAlgorithm::SHA1.context().unwrap();
            ctx.update(salt);
            ctx.update(b"foobar");
            let mut digest = vec![0; 20];
            ctx.digest(&mut digest).unwrap();
            digest
        };
        let key = s2k.derive_key(&password, 16).unwrap();
        assert_eq!(&key[..], &expected[..16]);
    }

    #[test]
    fn derive_key_long_output_uses_preloaded_contexts() {
        // A 32 byte key from a 20 byte digest needs two contexts; the
        // second is preloaded with a single zero byte.
        let password: Password = "xyzzy".into();
        let s2k = S2K::Simple { hash: HashAlgorithm::SHA1 };
        let key = s2k.derive_key(&password, 32).unwrap();

        let first = {
            let mut ctx = HashAlgorithm::SHA1.context().unwrap();
            ctx.update(b"xyzzy");
            let mut digest = vec![0; 20];
            ctx.digest(&mut digest).unwrap();
            digest
        };
        let second = {
            let mut ctx = HashAlgorithm::SHA1.context().unwrap();
            ctx.update([0u8]);
            ctx.update(b"xyzzy");
            let mut digest = vec![0; 20];
            ctx.digest(&mut digest).unwrap();
            digest
        };
        assert_eq!(&key[..20], &first[..]);
        assert_eq!(&key[20..], &second[..12]);
    }

    #[test]
    fn iterated_min_one_pass() {
        // Even with an absurdly small hash count, the salt and
        // password are hashed at least once.
        let password: Password = "abc".into();
        let s2k = S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt: [0; 8],
            hash_bytes: 1,
        };
        let simple_equivalent = {
            let mut ctx = HashAlgorithm::SHA256.context().unwrap();
            ctx.update([0u8; 8]);
            ctx.update(b"abc");
            let mut digest = vec![0; 32];
            ctx.digest(&mut digest).unwrap();
            digest
        };
        let key = s2k.derive_key(&password, 32).unwrap();
        assert_eq!(&key[..], &simple_equivalent[..]);
    }
}
