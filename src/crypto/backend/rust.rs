//! Implementation of the crypto provider using the RustCrypto crates.

use num_bigint_dig::{BigUint, ModInverse};
use rand::{Rng, RngCore};

use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use ed25519_dalek::{Signer as _, Verifier as _};
use p256::elliptic_curve::sec1::ToEncodedPoint;

use crate::Error;
use crate::Fingerprint;
use crate::Result;
use crate::crypto::ecdh;
use crate::crypto::hash;
use crate::crypto::mem::Protected;
use crate::crypto::mpi::{self, MPI};
use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm,
                   SymmetricAlgorithm};

use super::{CryptoProvider, Entropy};

// `Sha1CD` implements the RustCrypto `digest` traits `Update`,
// `Reset`, and `FixedOutput`, but not `FixedOutputReset` (there is no
// blanket impl deriving it from the other three), so it does not
// satisfy `hash::Digest`'s blanket impl directly.  A newtype lets us
// provide the glue explicitly, composing the same primitives
// `finalize_fixed_reset` would use, without overlapping the blanket
// impl (which is keyed on `digest::Update`, absent here).
#[derive(Clone)]
struct Sha1CDDigest(sha1collisiondetection::Sha1CD);

impl hash::Digest for Sha1CDDigest {
    fn digest_size(&self) -> usize {
        <sha1collisiondetection::Sha1CD as digest::OutputSizeUser>::output_size()
    }

    fn update(&mut self, data: &[u8]) {
        digest::Update::update(&mut self.0, data);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let mut out = digest::Output::<sha1collisiondetection::Sha1CD>::default();
        digest::FixedOutput::finalize_into(self.0.clone(), &mut out);
        digest::Reset::reset(&mut self.0);
        out.to_vec()
    }

    fn clone_boxed(&self) -> Box<dyn hash::Digest> {
        Box::new(self.clone())
    }
}

/// The default provider, backed by the RustCrypto crates.
pub struct RustCrypto;

impl Entropy for RustCrypto {
    fn random(&self, buf: &mut [u8]) -> Result<()> {
        rand::thread_rng().fill_bytes(buf);
        Ok(())
    }
}

impl CryptoProvider for RustCrypto {
    fn hash_supported(&self, algo: HashAlgorithm) -> bool {
        use self::HashAlgorithm::*;
        match algo {
            MD5 | SHA1 | RipeMD | SHA256 | SHA384 | SHA512 | SHA224
            | SHA3_256 | SHA3_512 => true,
            Private(_) | Unknown(_) => false,
        }
    }

    fn hash_context(&self, algo: HashAlgorithm) -> Result<hash::Context> {
        use self::HashAlgorithm::*;
        let ctx: Box<dyn hash::Digest> = match algo {
            MD5 => Box::new(md5::Md5::default()),
            SHA1 => Box::new(Sha1CDDigest(sha1collisiondetection::Sha1CD::default())),
            RipeMD => Box::new(ripemd::Ripemd160::default()),
            SHA224 => Box::new(sha2::Sha224::default()),
            SHA256 => Box::new(sha2::Sha256::default()),
            SHA384 => Box::new(sha2::Sha384::default()),
            SHA512 => Box::new(sha2::Sha512::default()),
            SHA3_256 => Box::new(sha3::Sha3_256::default()),
            SHA3_512 => Box::new(sha3::Sha3_512::default()),
            Private(_) | Unknown(_) =>
                return Err(Error::UnsupportedHashAlgorithm(algo).into()),
        };
        Ok(hash::Context::new(algo, ctx))
    }

    fn supports_algo(&self, algo: PublicKeyAlgorithm) -> bool {
        use self::PublicKeyAlgorithm::*;
        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign | DSA | ECDH | ECDSA
            | EdDSA | ElGamalEncrypt | ElGamalEncryptSign => true,
            Private(_) | Unknown(_) => false,
        }
    }

    fn supports_curve(&self, curve: &Curve) -> bool {
        use self::Curve::*;
        match curve {
            NistP256 | NistP384 | Secp256k1 | Ed25519 | Cv25519 => true,
            NistP521 | BrainpoolP256 | BrainpoolP512 | Unknown(_) => false,
        }
    }

    fn sign(&self, public: &mpi::PublicKey, secret: &mpi::SecretKeyMaterial,
            hash_algo: HashAlgorithm, digest: &[u8])
            -> Result<mpi::Signature>
    {
        use crate::crypto::mpi::{PublicKey, SecretKeyMaterial};
        match (public, secret) {
            (PublicKey::RSA { e, n },
             SecretKeyMaterial::RSA { d, p, q, .. }) => {
                let key = rsa::RsaPrivateKey::from_components(
                    BigUint::from_bytes_be(n.value()),
                    BigUint::from_bytes_be(e.value()),
                    BigUint::from_bytes_be(d.value()),
                    vec![BigUint::from_bytes_be(p.value()),
                         BigUint::from_bytes_be(q.value())])?;
                let sig = key.sign(pkcs1v15_sign_padding(hash_algo)?,
                                   digest)?;
                Ok(mpi::Signature::RSA { s: MPI::new(&sig) })
            },

            (PublicKey::DSA { p, q, g, y },
             SecretKeyMaterial::DSA { x }) => {
                let components = dsa::Components::from_components(
                    BigUint::from_bytes_be(p.value()),
                    BigUint::from_bytes_be(q.value()),
                    BigUint::from_bytes_be(g.value()))?;
                let verifying = dsa::VerifyingKey::from_components(
                    components, BigUint::from_bytes_be(y.value()))?;
                let signing = dsa::SigningKey::from_components(
                    verifying, BigUint::from_bytes_be(x.value()))?;

                // The digest is truncated to the size of q.
                let digest = &digest[..digest.len().min(q.value().len())];
                let sig: dsa::Signature = signing.sign_prehash(digest)
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;

                Ok(mpi::Signature::DSA {
                    r: MPI::new(&sig.r().to_bytes_be()),
                    s: MPI::new(&sig.s().to_bytes_be()),
                })
            },

            (PublicKey::EdDSA { curve, q },
             SecretKeyMaterial::EdDSA { scalar }) => match curve {
                Curve::Ed25519 => {
                    let _ = q.decode_point(&Curve::Ed25519)?;
                    let seed: [u8; 32] = scalar.value_padded(32)?
                        .as_ref().try_into().unwrap();
                    let signing = ed25519_dalek::SigningKey::from_bytes(&seed);
                    let sig = signing.sign(digest);
                    Ok(mpi::Signature::EdDSA {
                        r: MPI::new(&sig.r_bytes()[..]),
                        s: MPI::new(&sig.s_bytes()[..]),
                    })
                },
                _ => Err(Error::UnsupportedEllipticCurve(curve.clone())
                         .into()),
            },

            (PublicKey::ECDSA { curve, .. },
             SecretKeyMaterial::ECDSA { scalar }) => match curve {
                Curve::NistP256 => nist_p256::sign(scalar, digest),
                Curve::NistP384 => nist_p384::sign(scalar, digest),
                Curve::Secp256k1 => secp256k1::sign(scalar, digest),
                _ => Err(Error::UnsupportedEllipticCurve(curve.clone())
                         .into()),
            },

            (public, secret) => Err(Error::InvalidOperation(
                format!("unsupported combination of key material {:?} \
                         and secret {:?}", public.algo(), secret.algo()))
                                    .into()),
        }
    }

    fn verify(&self, public: &mpi::PublicKey, sig: &mpi::Signature,
              hash_algo: HashAlgorithm, digest: &[u8])
              -> Result<()>
    {
        use crate::crypto::mpi::{PublicKey, Signature};
        match (public, sig) {
            (PublicKey::RSA { e, n }, Signature::RSA { s }) => {
                let key = rsa::RsaPublicKey::new(
                    BigUint::from_bytes_be(n.value()),
                    BigUint::from_bytes_be(e.value()))?;
                let s = s.value_padded((n.bits() + 7) / 8)?;
                key.verify(pkcs1v15_sign_padding(hash_algo)?, digest, &s)
                    .map_err(|_| Error::BadSignature(
                        "RSA signature verification failed".into()).into())
            },

            (PublicKey::DSA { p, q, g, y }, Signature::DSA { r, s }) => {
                let components = dsa::Components::from_components(
                    BigUint::from_bytes_be(p.value()),
                    BigUint::from_bytes_be(q.value()),
                    BigUint::from_bytes_be(g.value()))?;
                let key = dsa::VerifyingKey::from_components(
                    components, BigUint::from_bytes_be(y.value()))?;
                let sig = dsa::Signature::from_components(
                    BigUint::from_bytes_be(r.value()),
                    BigUint::from_bytes_be(s.value()))?;

                let digest = &digest[..digest.len().min(q.value().len())];
                key.verify_prehash(digest, &sig)
                    .map_err(|_| Error::BadSignature(
                        "DSA signature verification failed".into()).into())
            },

            (PublicKey::EdDSA { curve, q }, Signature::EdDSA { r, s }) =>
                match curve {
                    Curve::Ed25519 => {
                        let (point, _) = q.decode_point(&Curve::Ed25519)?;
                        let key = ed25519_dalek::VerifyingKey::from_bytes(
                            point.try_into().map_err(
                                |_| Error::MalformedMPI(
                                    "Bad Ed25519 point".into()))?)
                            .map_err(|e| Error::InvalidKey(e.to_string()))?;

                        let mut sig_bytes = [0u8; 64];
                        sig_bytes[..32].copy_from_slice(
                            &r.value_padded(32)?);
                        sig_bytes[32..].copy_from_slice(
                            &s.value_padded(32)?);
                        let sig =
                            ed25519_dalek::Signature::from_bytes(&sig_bytes);

                        key.verify(digest, &sig)
                            .map_err(|_| Error::BadSignature(
                                "EdDSA signature verification failed".into())
                                     .into())
                    },
                    _ => Err(Error::UnsupportedEllipticCurve(curve.clone())
                             .into()),
                },

            (PublicKey::ECDSA { curve, q }, Signature::ECDSA { r, s }) =>
                match curve {
                    Curve::NistP256 =>
                        nist_p256::verify(q, r, s, digest),
                    Curve::NistP384 =>
                        nist_p384::verify(q, r, s, digest),
                    Curve::Secp256k1 =>
                        secp256k1::verify(q, r, s, digest),
                    _ => Err(Error::UnsupportedEllipticCurve(curve.clone())
                             .into()),
                },

            (public, sig) => Err(Error::MalformedPacket(
                format!("unsupported combination of key {:?} and \
                         signature {:?}", public.algo(), sig)).into()),
        }
    }

    fn encrypt_session_key(&self, public: &mpi::PublicKey,
                           recipient: &Fingerprint, payload: &Protected)
                           -> Result<mpi::Ciphertext>
    {
        use crate::crypto::mpi::PublicKey;
        match public {
            PublicKey::RSA { e, n } => {
                let key = rsa::RsaPublicKey::new(
                    BigUint::from_bytes_be(n.value()),
                    BigUint::from_bytes_be(e.value()))?;
                let c = key.encrypt(&mut rand::thread_rng(),
                                    rsa::Pkcs1v15Encrypt, payload)?;
                Ok(mpi::Ciphertext::RSA { c: MPI::new(&c) })
            },

            PublicKey::ElGamal { p, g, y } => {
                let p = BigUint::from_bytes_be(p.value());
                let g = BigUint::from_bytes_be(g.value());
                let y = BigUint::from_bytes_be(y.value());
                let k_size = ((p.bits() + 7) / 8) as usize;

                let m = BigUint::from_bytes_be(
                    &eme_pkcs1v15_encode(payload, k_size - 1)?);
                let k = random_biguint_below(&p);
                let e = g.modpow(&k, &p);
                let c = (m * y.modpow(&k, &p)) % &p;

                Ok(mpi::Ciphertext::ElGamal {
                    e: MPI::new(&e.to_bytes_be()),
                    c: MPI::new(&c.to_bytes_be()),
                })
            },

            PublicKey::ECDH { curve, q, hash, sym } => {
                let (e, shared) = match curve {
                    Curve::Cv25519 => {
                        let (point, _) = q.decode_point(&Curve::Cv25519)?;
                        let their: [u8; 32] = point.try_into().unwrap();
                        let their = x25519_dalek::PublicKey::from(their);

                        let eph = x25519_dalek::StaticSecret::random_from_rng(
                            rand::thread_rng());
                        let e = MPI::new_compressed_point(
                            x25519_dalek::PublicKey::from(&eph).as_bytes());
                        let shared: Protected =
                            eph.diffie_hellman(&their).to_bytes().into();
                        (e, shared)
                    },
                    Curve::NistP256 => nist_p256::wrap(q)?,
                    Curve::NistP384 => nist_p384::wrap(q)?,
                    Curve::Secp256k1 => secp256k1::wrap(q)?,
                    _ => return Err(Error::UnsupportedEllipticCurve(
                        curve.clone()).into()),
                };

                let kek = ecdh::derive_kek(curve, *hash, *sym, &shared,
                                           recipient)?;
                let wrapped = ecdh::aes_key_wrap(
                    *sym, &kek, &ecdh::pkcs5_pad(payload.clone()))?;
                Ok(mpi::Ciphertext::ECDH {
                    e,
                    key: wrapped.into_boxed_slice(),
                })
            },

            public => Err(Error::InvalidOperation(
                format!("encryption not supported for {:?}", public.algo()))
                          .into()),
        }
    }

    fn decrypt_session_key(&self, public: &mpi::PublicKey,
                           secret: &mpi::SecretKeyMaterial,
                           recipient: &Fingerprint,
                           ciphertext: &mpi::Ciphertext)
                           -> Result<Protected>
    {
        use crate::crypto::mpi::{Ciphertext, PublicKey, SecretKeyMaterial};
        match (public, secret, ciphertext) {
            (PublicKey::RSA { e, n },
             SecretKeyMaterial::RSA { d, p, q, .. },
             Ciphertext::RSA { c }) => {
                let key = rsa::RsaPrivateKey::from_components(
                    BigUint::from_bytes_be(n.value()),
                    BigUint::from_bytes_be(e.value()),
                    BigUint::from_bytes_be(d.value()),
                    vec![BigUint::from_bytes_be(p.value()),
                         BigUint::from_bytes_be(q.value())])?;
                let c = c.value_padded((n.bits() + 7) / 8)?;
                let m = key.decrypt(rsa::Pkcs1v15Encrypt, &c)
                    .map_err(|_| Error::InvalidSessionKey(
                        "RSA decryption failed".into()))?;
                Ok(m.into())
            },

            (PublicKey::ElGamal { p, .. },
             SecretKeyMaterial::ElGamal { x },
             Ciphertext::ElGamal { e, c }) => {
                let p = BigUint::from_bytes_be(p.value());
                let x = BigUint::from_bytes_be(x.value());
                let e = BigUint::from_bytes_be(e.value());
                let c = BigUint::from_bytes_be(c.value());
                let k_size = ((p.bits() + 7) / 8) as usize;

                // m = c * e^(p - 1 - x) mod p avoids computing an
                // explicit modular inverse.
                let exp = &p - 1u8 - &x;
                let m = (c * e.modpow(&exp, &p)) % &p;

                let em: Protected =
                    MPI::new(&m.to_bytes_be()).value_padded(k_size - 1)?
                    .into();
                eme_pkcs1v15_decode(&em)
            },

            (PublicKey::ECDH { curve, hash, sym, .. },
             SecretKeyMaterial::ECDH { scalar },
             Ciphertext::ECDH { e, key }) => {
                let shared = match curve {
                    Curve::Cv25519 => {
                        let (point, _) = e.decode_point(&Curve::Cv25519)?;
                        let their: [u8; 32] = point.try_into().unwrap();
                        let their = x25519_dalek::PublicKey::from(their);

                        // OpenPGP stores the secret scalar as a
                        // big-endian MPI, while X25519 uses
                        // little-endian.
                        let mut sk = scalar.value_padded(32)?;
                        sk.reverse();
                        let sk_bytes: [u8; 32] =
                            sk.as_ref().try_into().unwrap();
                        let our = x25519_dalek::StaticSecret::from(sk_bytes);

                        let shared: Protected =
                            our.diffie_hellman(&their).to_bytes().into();
                        shared
                    },
                    Curve::NistP256 =>
                        nist_p256::unwrap(scalar, e)?,
                    Curve::NistP384 =>
                        nist_p384::unwrap(scalar, e)?,
                    Curve::Secp256k1 =>
                        secp256k1::unwrap(scalar, e)?,
                    _ => return Err(Error::UnsupportedEllipticCurve(
                        curve.clone()).into()),
                };

                let kek = ecdh::derive_kek(curve, *hash, *sym, &shared,
                                           recipient)?;
                let padded = ecdh::aes_key_unwrap(*sym, &kek, key)?;
                ecdh::pkcs5_unpad(padded)
            },

            _ => Err(Error::InvalidOperation(
                "unsupported combination of key material and ciphertext"
                    .to_string()).into()),
        }
    }

    fn cfb_encrypt(&self, algo: SymmetricAlgorithm, key: &[u8], iv: &[u8],
                   data: &mut [u8]) -> Result<()> {
        use self::SymmetricAlgorithm::*;
        match algo {
            IDEA => cfb_encrypt_inner::<idea::Idea>(key, iv, data),
            TripleDES => cfb_encrypt_inner::<des::TdesEde3>(key, iv, data),
            CAST5 => cfb_encrypt_inner::<cast5::Cast5>(key, iv, data),
            Blowfish => cfb_encrypt_inner::<blowfish::Blowfish>(key, iv, data),
            AES128 => cfb_encrypt_inner::<aes::Aes128>(key, iv, data),
            AES192 => cfb_encrypt_inner::<aes::Aes192>(key, iv, data),
            AES256 => cfb_encrypt_inner::<aes::Aes256>(key, iv, data),
            Twofish => cfb_encrypt_inner::<twofish::Twofish>(key, iv, data),
            Camellia128 =>
                cfb_encrypt_inner::<camellia::Camellia128>(key, iv, data),
            Camellia192 =>
                cfb_encrypt_inner::<camellia::Camellia192>(key, iv, data),
            Camellia256 =>
                cfb_encrypt_inner::<camellia::Camellia256>(key, iv, data),
            a => Err(Error::UnsupportedSymmetricAlgorithm(a).into()),
        }
    }

    fn cfb_decrypt(&self, algo: SymmetricAlgorithm, key: &[u8], iv: &[u8],
                   data: &mut [u8]) -> Result<()> {
        use self::SymmetricAlgorithm::*;
        match algo {
            IDEA => cfb_decrypt_inner::<idea::Idea>(key, iv, data),
            TripleDES => cfb_decrypt_inner::<des::TdesEde3>(key, iv, data),
            CAST5 => cfb_decrypt_inner::<cast5::Cast5>(key, iv, data),
            Blowfish => cfb_decrypt_inner::<blowfish::Blowfish>(key, iv, data),
            AES128 => cfb_decrypt_inner::<aes::Aes128>(key, iv, data),
            AES192 => cfb_decrypt_inner::<aes::Aes192>(key, iv, data),
            AES256 => cfb_decrypt_inner::<aes::Aes256>(key, iv, data),
            Twofish => cfb_decrypt_inner::<twofish::Twofish>(key, iv, data),
            Camellia128 =>
                cfb_decrypt_inner::<camellia::Camellia128>(key, iv, data),
            Camellia192 =>
                cfb_decrypt_inner::<camellia::Camellia192>(key, iv, data),
            Camellia256 =>
                cfb_decrypt_inner::<camellia::Camellia256>(key, iv, data),
            a => Err(Error::UnsupportedSymmetricAlgorithm(a).into()),
        }
    }

    fn generate_rsa(&self, bits: usize)
                    -> Result<(mpi::PublicKey, mpi::SecretKeyMaterial)>
    {
        use rsa::traits::{PrivateKeyParts, PublicKeyParts};

        let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), bits)?;
        let (p, q) = match key.primes() {
            [p, q, ..] => (p, q),
            _ => return Err(Error::InvalidOperation(
                "RSA key generation returned too few primes".into()).into()),
        };
        let u = p.clone().mod_inverse(q)
            .and_then(|u| u.to_biguint())
            .ok_or_else(|| anyhow::Error::from(Error::InvalidOperation(
                "p is not invertible mod q".into())))?;

        Ok((mpi::PublicKey::RSA {
                e: MPI::new(&key.e().to_bytes_be()),
                n: MPI::new(&key.n().to_bytes_be()),
            },
            mpi::SecretKeyMaterial::RSA {
                d: MPI::new(&key.d().to_bytes_be()).into(),
                p: MPI::new(&p.to_bytes_be()).into(),
                q: MPI::new(&q.to_bytes_be()).into(),
                u: MPI::new(&u.to_bytes_be()).into(),
            }))
    }

    fn generate_dsa(&self, bits: usize)
                    -> Result<(mpi::PublicKey, mpi::SecretKeyMaterial)>
    {
        #[allow(deprecated)]
        let size = match bits {
            1024 => dsa::KeySize::DSA_1024_160,
            2048 => dsa::KeySize::DSA_2048_256,
            3072 => dsa::KeySize::DSA_3072_256,
            n => return Err(Error::InvalidArgument(
                format!("Invalid DSA key size: {}", n)).into()),
        };

        let mut rng = rand::thread_rng();
        let components = dsa::Components::generate(&mut rng, size);
        let signing = dsa::SigningKey::generate(&mut rng, components);
        let verifying = signing.verifying_key();

        Ok((mpi::PublicKey::DSA {
                p: MPI::new(&verifying.components().p().to_bytes_be()),
                q: MPI::new(&verifying.components().q().to_bytes_be()),
                g: MPI::new(&verifying.components().g().to_bytes_be()),
                y: MPI::new(&verifying.y().to_bytes_be()),
            },
            mpi::SecretKeyMaterial::DSA {
                x: MPI::new(&signing.x().to_bytes_be()).into(),
            }))
    }

    fn generate_ecc(&self, for_signing: bool, curve: Curve)
                    -> Result<(mpi::PublicKey, mpi::SecretKeyMaterial)>
    {
        let mut rng = rand::thread_rng();
        match (for_signing, &curve) {
            (true, Curve::Ed25519) => {
                let signing = ed25519_dalek::SigningKey::generate(&mut rng);
                let q = MPI::new_compressed_point(
                    signing.verifying_key().as_bytes());
                Ok((mpi::PublicKey::EdDSA { curve, q },
                    mpi::SecretKeyMaterial::EdDSA {
                        scalar: MPI::new(&signing.to_bytes()).into(),
                    }))
            },

            (false, Curve::Cv25519) => {
                let secret =
                    x25519_dalek::StaticSecret::random_from_rng(&mut rng);
                let q = MPI::new_compressed_point(
                    x25519_dalek::PublicKey::from(&secret).as_bytes());

                // Store the scalar as a big-endian MPI.
                let mut sk = secret.to_bytes();
                sk.reverse();
                Ok((mpi::PublicKey::ECDH {
                        curve,
                        q,
                        hash: HashAlgorithm::SHA256,
                        sym: SymmetricAlgorithm::AES128,
                    },
                    mpi::SecretKeyMaterial::ECDH {
                        scalar: MPI::new(&sk).into(),
                    }))
            },

            (true, Curve::NistP256) => {
                let (q, scalar) = nist_p256::generate();
                Ok((mpi::PublicKey::ECDSA { curve, q },
                    mpi::SecretKeyMaterial::ECDSA { scalar }))
            },
            (true, Curve::NistP384) => {
                let (q, scalar) = nist_p384::generate();
                Ok((mpi::PublicKey::ECDSA { curve, q },
                    mpi::SecretKeyMaterial::ECDSA { scalar }))
            },
            (true, Curve::Secp256k1) => {
                let (q, scalar) = secp256k1::generate();
                Ok((mpi::PublicKey::ECDSA { curve, q },
                    mpi::SecretKeyMaterial::ECDSA { scalar }))
            },

            (false, Curve::NistP256) => {
                let (q, scalar) = nist_p256::generate();
                Ok((mpi::PublicKey::ECDH {
                        curve, q,
                        hash: HashAlgorithm::SHA256,
                        sym: SymmetricAlgorithm::AES128,
                    },
                    mpi::SecretKeyMaterial::ECDH { scalar }))
            },
            (false, Curve::NistP384) => {
                let (q, scalar) = nist_p384::generate();
                Ok((mpi::PublicKey::ECDH {
                        curve, q,
                        hash: HashAlgorithm::SHA384,
                        sym: SymmetricAlgorithm::AES192,
                    },
                    mpi::SecretKeyMaterial::ECDH { scalar }))
            },
            (false, Curve::Secp256k1) => {
                let (q, scalar) = secp256k1::generate();
                Ok((mpi::PublicKey::ECDH {
                        curve, q,
                        hash: HashAlgorithm::SHA256,
                        sym: SymmetricAlgorithm::AES128,
                    },
                    mpi::SecretKeyMaterial::ECDH { scalar }))
            },

            (_, curve) =>
                Err(Error::UnsupportedEllipticCurve(curve.clone()).into()),
        }
    }
}

/// Returns the PKCS#1 v1.5 signature padding for the given hash.
fn pkcs1v15_sign_padding(hash_algo: HashAlgorithm)
                         -> Result<rsa::Pkcs1v15Sign>
{
    use self::HashAlgorithm::*;
    Ok(match hash_algo {
        MD5 => rsa::Pkcs1v15Sign::new::<md5::Md5>(),
        SHA1 => rsa::Pkcs1v15Sign::new::<sha1collisiondetection::Sha1CD>(),
        RipeMD => rsa::Pkcs1v15Sign::new::<ripemd::Ripemd160>(),
        SHA224 => rsa::Pkcs1v15Sign::new::<sha2::Sha224>(),
        SHA256 => rsa::Pkcs1v15Sign::new::<sha2::Sha256>(),
        SHA384 => rsa::Pkcs1v15Sign::new::<sha2::Sha384>(),
        SHA512 => rsa::Pkcs1v15Sign::new::<sha2::Sha512>(),
        SHA3_256 => rsa::Pkcs1v15Sign::new::<sha3::Sha3_256>(),
        SHA3_512 => rsa::Pkcs1v15Sign::new::<sha3::Sha3_512>(),
        a => return Err(Error::UnsupportedHashAlgorithm(a).into()),
    })
}

fn cfb_encrypt_inner<C>(key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<()>
where
    C: cipher::BlockEncryptMut + cipher::BlockCipher + cipher::KeyInit,
{
    use cipher::{AsyncStreamCipher, KeyIvInit};
    cfb_mode::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidArgument("Bad key or IV length".into()))?
        .encrypt(data);
    Ok(())
}

fn cfb_decrypt_inner<C>(key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<()>
where
    C: cipher::BlockEncryptMut + cipher::BlockCipher + cipher::KeyInit,
{
    use cipher::{AsyncStreamCipher, KeyIvInit};
    cfb_mode::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidArgument("Bad key or IV length".into()))?
        .decrypt(data);
    Ok(())
}

// Weierstrass curve operations, instantiated once per supported
// curve.  The RustCrypto curve crates share their API surface, so a
// macro keeps the three instantiations in sync.
macro_rules! weierstrass_ops {
    ($mod:ident, $krate:ident, $field_size:expr) => {
        mod $mod {
            use super::*;

            pub(super) const FIELD_SIZE: usize = $field_size;

            pub(super) fn sign(scalar: &mpi::ProtectedMPI, digest: &[u8])
                               -> Result<mpi::Signature>
            {
                let sk = scalar.value_padded(FIELD_SIZE)?;
                let key = $krate::ecdsa::SigningKey::from_slice(&sk)
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;
                let sig: $krate::ecdsa::Signature = key.sign_prehash(digest)
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;
                let (r, s) = sig.split_bytes();
                Ok(mpi::Signature::ECDSA {
                    r: MPI::new(&r),
                    s: MPI::new(&s),
                })
            }

            pub(super) fn verify(q: &MPI, r: &MPI, s: &MPI, digest: &[u8])
                                 -> Result<()>
            {
                let key =
                    $krate::ecdsa::VerifyingKey::from_sec1_bytes(q.value())
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;

                let mut bytes = vec![0u8; 2 * FIELD_SIZE];
                bytes[..FIELD_SIZE].copy_from_slice(
                    &r.value_padded(FIELD_SIZE)?);
                bytes[FIELD_SIZE..].copy_from_slice(
                    &s.value_padded(FIELD_SIZE)?);
                let sig = $krate::ecdsa::Signature::from_slice(&bytes)
                    .map_err(|_| Error::BadSignature(
                        "Bad ECDSA signature".into()))?;
                // Some implementations emit high-S signatures;
                // normalize before the strict low-S check.
                let sig = sig.normalize_s().unwrap_or(sig);

                key.verify_prehash(digest, &sig)
                    .map_err(|_| Error::BadSignature(
                        "ECDSA signature verification failed".into()).into())
            }

            pub(super) fn generate() -> (MPI, mpi::ProtectedMPI) {
                let secret =
                    $krate::SecretKey::random(&mut rand::thread_rng());
                let q = MPI::new(
                    secret.public_key().to_encoded_point(false).as_bytes());
                (q, MPI::new(&secret.to_bytes()).into())
            }

            /// Computes an ephemeral shared point for encryption.
            pub(super) fn wrap(q: &MPI) -> Result<(MPI, Protected)> {
                let their = $krate::PublicKey::from_sec1_bytes(q.value())
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;

                let eph = $krate::ecdh::EphemeralSecret::random(
                    &mut rand::thread_rng());
                let e = MPI::new(
                    eph.public_key().to_encoded_point(false).as_bytes());
                let shared: Protected = eph.diffie_hellman(&their)
                    .raw_secret_bytes().as_slice().into();
                Ok((e, shared))
            }

            /// Recomputes the shared point for decryption.
            pub(super) fn unwrap(scalar: &mpi::ProtectedMPI, e: &MPI)
                                 -> Result<Protected>
            {
                let sk = scalar.value_padded(FIELD_SIZE)?;
                let our = $krate::SecretKey::from_slice(&sk)
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;
                let their = $krate::PublicKey::from_sec1_bytes(e.value())
                    .map_err(|e| Error::InvalidKey(e.to_string()))?;

                let shared = $krate::ecdh::diffie_hellman(
                    our.to_nonzero_scalar(), their.as_affine());
                Ok(shared.raw_secret_bytes().as_slice().into())
            }
        }
    };
}

weierstrass_ops!(nist_p256, p256, 32);
weierstrass_ops!(nist_p384, p384, 48);
weierstrass_ops!(secp256k1, k256, 32);

/// EME-PKCS1-v1_5 encoding, used by ElGamal encryption ([Section
/// 13.1.1 of RFC 4880]).
///
///   [Section 13.1.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-13.1.1
fn eme_pkcs1v15_encode(m: &[u8], em_len: usize) -> Result<Protected> {
    if em_len < m.len() + 10 {
        return Err(Error::InvalidArgument(
            "Message too long for the modulus".into()).into());
    }

    // EM = 02 || PS || 00 || M, with PS at least 8 nonzero random
    // octets.  (The leading 00 octet of the standard encoding is
    // absorbed by the integer conversion.)
    let mut em: Protected = vec![0u8; em_len].into();
    em[0] = 0x02;
    let ps_len = em_len - m.len() - 2;
    let mut rng = rand::thread_rng();
    for b in &mut em[1..1 + ps_len] {
        *b = rng.gen_range(1..=255);
    }
    em[1 + ps_len] = 0x00;
    em[2 + ps_len..].copy_from_slice(m);
    Ok(em)
}

fn eme_pkcs1v15_decode(em: &[u8]) -> Result<Protected> {
    if em.len() > 10 && em[0] == 0x02 {
        if let Some(n) = em[1..].iter().position(|&b| b == 0) {
            if n >= 8 {
                return Ok(em[n + 2..].into());
            }
        }
    }
    Err(Error::InvalidSessionKey("Bad PKCS1 padding".into()).into())
}

fn random_biguint_below(p: &BigUint) -> BigUint {
    let bytes = (p.bits() + 7) / 8;
    let mut rng = rand::thread_rng();
    let one = BigUint::from(1u8);
    loop {
        let mut buf = vec![0u8; bytes as usize];
        rng.fill_bytes(&mut buf);
        let k = BigUint::from_bytes_be(&buf) % p;
        if k > one {
            return k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfb_round_trip() {
        let p = RustCrypto;
        let key = [1u8; 16];
        let iv = [0u8; 16];
        let mut data = b"hello, cfb mode!".to_vec();
        p.cfb_encrypt(SymmetricAlgorithm::AES128, &key, &iv, &mut data)
            .unwrap();
        assert_ne!(&data, b"hello, cfb mode!");
        p.cfb_decrypt(SymmetricAlgorithm::AES128, &key, &iv, &mut data)
            .unwrap();
        assert_eq!(&data, b"hello, cfb mode!");
    }

    #[test]
    fn eme_pkcs1v15_round_trip() {
        let m = b"0123456789abcdef";
        let em = eme_pkcs1v15_encode(m, 63).unwrap();
        let out = eme_pkcs1v15_decode(&em).unwrap();
        assert_eq!(&out[..], &m[..]);
    }

    #[test]
    fn ed25519_sign_verify() {
        let p = RustCrypto;
        let (public, secret) =
            p.generate_ecc(true, Curve::Ed25519).unwrap();
        let digest = [42u8; 32];
        let sig = p.sign(&public, &secret, HashAlgorithm::SHA256, &digest)
            .unwrap();
        p.verify(&public, &sig, HashAlgorithm::SHA256, &digest).unwrap();
        assert!(p.verify(&public, &sig, HashAlgorithm::SHA256, &[43u8; 32])
                .is_err());
    }

    #[test]
    fn ecdh_p256_round_trip() {
        let p = RustCrypto;
        let (public, secret) =
            p.generate_ecc(false, Curve::NistP256).unwrap();
        let fp = Fingerprint::from_bytes(&[0xAB; 20]);
        let payload: Protected = b"\x09sessionkeysessionkey\x01\x02"[..].into();
        let ct = p.encrypt_session_key(&public, &fp, &payload).unwrap();
        let pt = p.decrypt_session_key(&public, &secret, &fp, &ct).unwrap();
        assert_eq!(&pt[..], &payload[..]);
    }

    #[test]
    fn ecdh_cv25519_round_trip() {
        let p = RustCrypto;
        let (public, secret) =
            p.generate_ecc(false, Curve::Cv25519).unwrap();
        let fp = Fingerprint::from_bytes(&[0xCD; 20]);
        let payload: Protected = b"\x09sixteen byte key"[..].into();
        let ct = p.encrypt_session_key(&public, &fp, &payload).unwrap();
        let pt = p.decrypt_session_key(&public, &secret, &fp, &ct).unwrap();
        assert_eq!(&pt[..], &payload[..]);
    }
}
