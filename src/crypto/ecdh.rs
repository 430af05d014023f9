//! Elliptic Curve Diffie-Hellman.
//!
//! Key derivation and key encapsulation for ECDH, as described in
//! [RFC 6637].  The shared point is computed by the crypto provider;
//! this module turns it into a key encryption key and wraps the
//! session key with it.
//!
//!   [RFC 6637]: https://tools.ietf.org/html/rfc6637

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit,
                  generic_array::GenericArray};

use crate::Error;
use crate::Fingerprint;
use crate::Result;
use crate::crypto::mem::Protected;
use crate::types::{Curve, HashAlgorithm, SymmetricAlgorithm};

/// Derives a key encryption key from the shared point.
///
/// This is the key derivation function from [Section 7 of RFC 6637].
/// The KDF binds the curve, the KDF parameters, and the recipient's
/// fingerprint into the derived key.
pub(crate) fn derive_kek(curve: &Curve,
                         hash: HashAlgorithm,
                         sym: SymmetricAlgorithm,
                         shared: &Protected,
                         recipient: &Fingerprint)
                         -> Result<Protected>
{
    let mut ctx = hash.context()?;

    ctx.update([0u8, 0, 0, 1]);
    ctx.update(shared);

    // The KDF parameters.
    ctx.update([curve.oid().len() as u8]);
    ctx.update(curve.oid());
    ctx.update([u8::from(crate::types::PublicKeyAlgorithm::ECDH)]);
    ctx.update([0x03, 0x01, hash.into(), sym.into()]);
    ctx.update(b"Anonymous Sender    ");
    ctx.update(recipient.as_bytes());

    let mut digest: Protected = vec![0u8; ctx.digest_size()].into();
    ctx.digest(&mut digest)?;

    let key_size = sym.key_size()?;
    if digest.len() < key_size {
        return Err(Error::InvalidOperation(
            format!("KDF hash {} too short for {}", hash, sym)).into());
    }
    Ok(digest[..key_size].into())
}

/// Pads a session key envelope using the PKCS#5 convention.
///
/// The padded length is the next multiple of eight; if the input is
/// already a multiple, a full block of padding is added so the
/// padding is always removable.
pub(crate) fn pkcs5_pad(sk: Protected) -> Protected {
    let n = 8 - (sk.len() % 8);
    let mut padded: Protected = vec![0u8; sk.len() + n].into();
    padded[..sk.len()].copy_from_slice(&sk);
    for b in &mut padded[sk.len()..] {
        *b = n as u8;
    }
    padded
}

/// Removes the PKCS#5 padding.
pub(crate) fn pkcs5_unpad(sk: Protected) -> Result<Protected> {
    let n = *sk.last()
        .ok_or_else(|| anyhow::Error::from(
            Error::InvalidSessionKey("Empty session key envelope".into())))?
        as usize;
    if n == 0 || n > 8 || n > sk.len()
        || sk[sk.len() - n..].iter().any(|&b| b as usize != n)
    {
        return Err(Error::InvalidSessionKey("Bad padding".into()).into());
    }
    Ok(sk[..sk.len() - n].into())
}

const KEY_WRAP_IV: u64 = 0xa6a6a6a6a6a6a6a6;

/// Wraps a key using the AES Key Wrap Algorithm from [RFC 3394].
///
///   [RFC 3394]: https://tools.ietf.org/html/rfc3394
pub(crate) fn aes_key_wrap(algo: SymmetricAlgorithm, kek: &Protected,
                           plaintext: &Protected)
                           -> Result<Vec<u8>>
{
    if plaintext.len() % 8 != 0 || plaintext.is_empty() {
        return Err(Error::InvalidArgument(
            "Plaintext must be a multiple of 8 bytes".into()).into());
    }
    if kek.len() != algo.key_size()? {
        return Err(Error::InvalidArgument("Bad KEK size".into()).into());
    }

    let cipher = KeyWrapCipher::new(algo, kek)?;
    let n = plaintext.len() / 8;

    let mut a = KEY_WRAP_IV;
    let mut r = plaintext.to_vec();
    let mut b = [0u8; 16];

    for j in 0..6 {
        for i in 0..n {
            b[..8].copy_from_slice(&a.to_be_bytes());
            b[8..].copy_from_slice(&r[8 * i..8 * (i + 1)]);
            cipher.encrypt(&mut b);
            a = u64::from_be_bytes(b[..8].try_into().unwrap())
                ^ (n * j + i + 1) as u64;
            r[8 * i..8 * (i + 1)].copy_from_slice(&b[8..]);
        }
    }

    let mut ciphertext = Vec::with_capacity(8 + r.len());
    ciphertext.extend_from_slice(&a.to_be_bytes());
    ciphertext.extend_from_slice(&r);
    Ok(ciphertext)
}

/// Unwraps an encrypted key using the AES Key Wrap Algorithm from
/// [RFC 3394].
///
///   [RFC 3394]: https://tools.ietf.org/html/rfc3394
pub(crate) fn aes_key_unwrap(algo: SymmetricAlgorithm, kek: &Protected,
                             ciphertext: &[u8])
                             -> Result<Protected>
{
    if ciphertext.len() % 8 != 0 || ciphertext.len() < 16 {
        return Err(Error::InvalidArgument(
            "Ciphertext must be a multiple of 8 bytes".into()).into());
    }
    if kek.len() != algo.key_size()? {
        return Err(Error::InvalidArgument("Bad KEK size".into()).into());
    }

    let cipher = KeyWrapCipher::new(algo, kek)?;
    let n = ciphertext.len() / 8 - 1;

    let mut a = u64::from_be_bytes(ciphertext[..8].try_into().unwrap());
    let mut r: Protected = ciphertext[8..].into();
    let mut b = [0u8; 16];

    for j in (0..6).rev() {
        for i in (0..n).rev() {
            b[..8].copy_from_slice(&(a ^ (n * j + i + 1) as u64).to_be_bytes());
            b[8..].copy_from_slice(&r[8 * i..8 * (i + 1)]);
            cipher.decrypt(&mut b);
            a = u64::from_be_bytes(b[..8].try_into().unwrap());
            r[8 * i..8 * (i + 1)].copy_from_slice(&b[8..]);
        }
    }

    if a != KEY_WRAP_IV {
        return Err(Error::InvalidSessionKey(
            "Key unwrap integrity check failed".into()).into());
    }

    Ok(r)
}

// RFC 6637 only permits the AES family for key encapsulation.
enum KeyWrapCipher {
    Aes128(aes::Aes128),
    Aes192(aes::Aes192),
    Aes256(aes::Aes256),
}

impl KeyWrapCipher {
    fn new(algo: SymmetricAlgorithm, kek: &Protected) -> Result<Self> {
        use self::SymmetricAlgorithm::*;
        match algo {
            AES128 => Ok(KeyWrapCipher::Aes128(
                aes::Aes128::new(GenericArray::from_slice(kek)))),
            AES192 => Ok(KeyWrapCipher::Aes192(
                aes::Aes192::new(GenericArray::from_slice(kek)))),
            AES256 => Ok(KeyWrapCipher::Aes256(
                aes::Aes256::new(GenericArray::from_slice(kek)))),
            a => Err(Error::UnsupportedSymmetricAlgorithm(a).into()),
        }
    }

    fn encrypt(&self, block: &mut [u8; 16]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            KeyWrapCipher::Aes128(c) => c.encrypt_block(block),
            KeyWrapCipher::Aes192(c) => c.encrypt_block(block),
            KeyWrapCipher::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt(&self, block: &mut [u8; 16]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            KeyWrapCipher::Aes128(c) => c.decrypt_block(block),
            KeyWrapCipher::Aes192(c) => c.decrypt_block(block),
            KeyWrapCipher::Aes256(c) => c.decrypt_block(block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3394_test_vector_128() {
        // 4.1 Wrap 128 bits of Key Data with a 128-bit KEK.
        let kek: Protected =
            crate::fmt::from_hex("000102030405060708090A0B0C0D0E0F", false)
            .unwrap().into();
        let key: Protected =
            crate::fmt::from_hex("00112233445566778899AABBCCDDEEFF", false)
            .unwrap().into();
        let expected = crate::fmt::from_hex(
            "1FA68B0A8112B447AEF34BD8FB5A7B829D3E862371D2CFE5", false)
            .unwrap();

        let wrapped =
            aes_key_wrap(SymmetricAlgorithm::AES128, &kek, &key).unwrap();
        assert_eq!(wrapped, expected);

        let unwrapped =
            aes_key_unwrap(SymmetricAlgorithm::AES128, &kek, &wrapped)
            .unwrap();
        assert_eq!(&unwrapped[..], &key[..]);
    }

    #[test]
    fn rfc3394_test_vector_256() {
        // 4.6 Wrap 256 bits of Key Data with a 256-bit KEK.
        let kek: Protected = crate::fmt::from_hex(
            "000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F",
            false).unwrap().into();
        let key: Protected = crate::fmt::from_hex(
            "00112233445566778899AABBCCDDEEFF000102030405060708090A0B0C0D0E0F",
            false).unwrap().into();
        let expected = crate::fmt::from_hex(
            "28C9F404C4B810F4CBCCB35CFB87F8263F5786E2D80ED326CBC7F0E71A99F43B\
             FB988B9B7A02DD21", false).unwrap();

        let wrapped =
            aes_key_wrap(SymmetricAlgorithm::AES256, &kek, &key).unwrap();
        assert_eq!(wrapped, expected);

        let unwrapped =
            aes_key_unwrap(SymmetricAlgorithm::AES256, &kek, &wrapped)
            .unwrap();
        assert_eq!(&unwrapped[..], &key[..]);
    }

    #[test]
    fn unwrap_detects_tampering() {
        let kek: Protected = vec![0; 16].into();
        let key: Protected = vec![1; 16].into();
        let mut wrapped =
            aes_key_wrap(SymmetricAlgorithm::AES128, &kek, &key).unwrap();
        wrapped[3] ^= 1;
        assert!(aes_key_unwrap(SymmetricAlgorithm::AES128, &kek, &wrapped)
                .is_err());
    }

    #[test]
    fn pkcs5_round_trip() {
        for len in [0usize, 1, 7, 8, 9, 32] {
            let data: Protected = vec![0xAA; len].into();
            let padded = pkcs5_pad(data.clone());
            assert_eq!(padded.len() % 8, 0);
            assert!(padded.len() > len);
            let unpadded = pkcs5_unpad(padded).unwrap();
            assert_eq!(&unpadded[..], &data[..]);
        }
    }
}
