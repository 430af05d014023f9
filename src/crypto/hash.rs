//! Functionality to hash packets, and generate hashes.
//!
//! Signatures are calculated over a canonical byte sequence that
//! depends on the signature type: documents are hashed directly,
//! while keys, user IDs and user attributes are hashed with
//! type-specific prefixes.  This module implements those
//! canonicalization rules; see [Section 5.2.4 of RFC 4880].
//!
//!   [Section 5.2.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.4

use crate::Result;
use crate::packet::Key;
use crate::packet::UserID;
use crate::packet::UserAttribute;
use crate::packet::signature::SignatureFields;
use crate::types::HashAlgorithm;

/// Object-safe digest interface implemented by the provider's hash
/// functions.
///
/// Blanket-implemented for everything that implements the RustCrypto
/// `digest` traits, so providers simply box their digest types.
pub(crate) trait Digest: Send + Sync {
    /// Size of the digest in bytes.
    fn digest_size(&self) -> usize;

    /// Writes data into the hash function.
    fn update(&mut self, data: &[u8]);

    /// Finalizes the hash function, returning the digest and
    /// resetting the state.
    fn finalize_reset(&mut self) -> Vec<u8>;

    /// Clones the state into a fresh box.
    fn clone_boxed(&self) -> Box<dyn Digest>;
}

impl<D> Digest for D
where
    D: digest::Update + digest::FixedOutputReset + Clone
        + Send + Sync + 'static,
{
    fn digest_size(&self) -> usize {
        <D as digest::OutputSizeUser>::output_size()
    }

    fn update(&mut self, data: &[u8]) {
        <D as digest::Update>::update(self, data);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        digest::FixedOutputReset::finalize_fixed_reset(self).to_vec()
    }

    fn clone_boxed(&self) -> Box<dyn Digest> {
        Box::new(self.clone())
    }
}

/// State of a hash function.
pub struct Context {
    algo: HashAlgorithm,
    ctx: Box<dyn Digest>,
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Context {
            algo: self.algo,
            ctx: self.ctx.clone_boxed(),
        }
    }
}

impl Context {
    pub(crate) fn new(algo: HashAlgorithm, ctx: Box<dyn Digest>) -> Self {
        Context { algo, ctx }
    }

    /// Returns the algorithm.
    pub fn algo(&self) -> HashAlgorithm {
        self.algo
    }

    /// Size of the digest in bytes.
    pub fn digest_size(&self) -> usize {
        self.ctx.digest_size()
    }

    /// Writes data into the hash function.
    pub fn update<D: AsRef<[u8]>>(&mut self, data: D) {
        self.ctx.update(data.as_ref());
    }

    /// Finalizes the hash function and writes the digest into the
    /// provided slice.
    ///
    /// Resets the hash function context.  `digest` may be shorter
    /// than the digest; in that case the digest is truncated.
    pub fn digest<D: AsMut<[u8]>>(&mut self, mut digest: D) -> Result<()> {
        let d = self.ctx.finalize_reset();
        let digest = digest.as_mut();
        let n = digest.len().min(d.len());
        digest[..n].copy_from_slice(&d[..n]);
        Ok(())
    }

    /// Finalizes the hash function and returns the digest.
    pub fn into_digest(mut self) -> Result<Vec<u8>> {
        let mut digest = vec![0u8; self.digest_size()];
        self.digest(&mut digest)?;
        Ok(digest)
    }
}

impl std::io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl HashAlgorithm {
    /// Whether the default crypto provider supports this algorithm.
    pub fn is_supported(self) -> bool {
        crate::crypto::provider().hash_supported(self)
    }

    /// Creates a new hash context for this algorithm.
    ///
    /// # Errors
    ///
    /// Fails with `Error::UnsupportedHashAlgorithm` if the default
    /// provider does not support this algorithm.  See
    /// [`HashAlgorithm::is_supported`].
    pub fn context(self) -> Result<Context> {
        crate::crypto::provider().hash_context(self)
    }

    /// Returns the size of the digest in bytes.
    pub fn digest_size(self) -> Result<usize> {
        Ok(self.context()?.digest_size())
    }
}

/// Hashes OpenPGP packets and related types.
///
/// Feeds the canonical byte representation of the object into the
/// given hash context.
pub trait Hash {
    /// Updates the given hash with this object.
    fn hash(&self, hash: &mut Context);
}

impl Hash for UserID {
    /// Update the Hash with a hash of the user id.
    fn hash(&self, hash: &mut Context) {
        let mut header = [0; 5];

        header[0] = 0xB4;
        let len = self.value().len() as u32;
        header[1..5].copy_from_slice(&len.to_be_bytes());

        hash.update(&header[..]);
        hash.update(self.value());
    }
}

impl Hash for UserAttribute {
    /// Update the Hash with a hash of the user attribute.
    fn hash(&self, hash: &mut Context) {
        let mut header = [0; 5];

        header[0] = 0xD1;
        let len = self.value().len() as u32;
        header[1..5].copy_from_slice(&len.to_be_bytes());

        hash.update(&header[..]);
        hash.update(self.value());
    }
}

impl Hash for Key {
    /// Update the Hash with a hash of the key.
    fn hash(&self, hash: &mut Context) {
        // We hash 6 bytes plus the MPIs.  The len does not include
        // the 0x99 tag or the length itself.
        let len = (9 - 3) + self.mpis().serialized_len();

        let mut header: Vec<u8> = Vec::with_capacity(9);

        // Tag.  The same prefix octet is used independent of whether
        // the key is a primary key or a subkey, and whether it has
        // secret material attached.
        header.push(0x99);

        // Length (big endian).
        header.push(((len >> 8) & 0xFF) as u8);
        header.push((len & 0xFF) as u8);

        // Version.
        header.push(4);

        // Creation time.
        let creation_time: u32 = self.creation_time().into();
        header.extend_from_slice(&creation_time.to_be_bytes());

        // Algorithm.
        header.push(self.pk_algo().into());

        hash.update(&header[..]);

        // MPIs.
        let mut mpis = Vec::with_capacity(self.mpis().serialized_len());
        self.mpis().serialize_into(&mut mpis);
        hash.update(&mpis);
    }
}

impl Hash for SignatureFields {
    /// Adds the signature's own hashed area and trailer to the
    /// provided hash context.
    fn hash(&self, hash: &mut Context) {
        // A version 4 signature packet is laid out as follows:
        //
        //   version - 1 byte                    \
        //   type - 1 byte                        \
        //   pk_algo - 1 byte                      \
        //   hash_algo - 1 byte                      Included in the hash
        //   hashed_area_len - 2 bytes (big endian)/
        //   hashed_area                         _/
        //   ...                                 <- Not included in the hash
        let hashed_area = self.hashed_area().to_vec();

        let mut header = [0u8; 6];
        header[0] = 4;
        header[1] = self.typ().into();
        header[2] = self.pk_algo().into();
        header[3] = self.hash_algo().into();
        header[4] = (hashed_area.len() >> 8) as u8;
        header[5] = hashed_area.len() as u8;

        hash.update(&header[..]);
        hash.update(&hashed_area);

        // A version 4 signature trailer is:
        //
        //   version - 1 byte
        //   0xFF (constant) - 1 byte
        //   amount - 4 bytes (big endian)
        //
        // The amount field is the amount of hashed from this packet
        // (this excludes the message content, and this trailer).
        let mut trailer = [0u8; 6];
        trailer[0] = 0x4;
        trailer[1] = 0xff;
        let len = (header.len() + hashed_area.len()) as u32;
        trailer[2..6].copy_from_slice(&len.to_be_bytes());

        hash.update(&trailer[..]);
    }
}

/// Computes the message digest of standalone and timestamp
/// signatures.
pub(crate) fn hash_standalone(sig: &SignatureFields) -> Result<Vec<u8>> {
    let mut h = sig.hash_algo().context()?;
    sig.hash(&mut h);
    h.into_digest()
}

/// Computes the message digest of a direct key or key revocation
/// signature over the given primary key.
pub(crate) fn hash_direct_key(sig: &SignatureFields, key: &Key)
    -> Result<Vec<u8>>
{
    let mut h = sig.hash_algo().context()?;
    key.hash(&mut h);
    sig.hash(&mut h);
    h.into_digest()
}

/// Computes the message digest of a subkey binding or subkey
/// revocation signature over the given primary key and subkey.
pub(crate) fn hash_subkey_binding(sig: &SignatureFields,
                                  key: &Key, subkey: &Key)
    -> Result<Vec<u8>>
{
    let mut h = sig.hash_algo().context()?;
    key.hash(&mut h);
    subkey.hash(&mut h);
    sig.hash(&mut h);
    h.into_digest()
}

/// Computes the message digest of a primary key binding signature
/// (the cross signature a signing-capable subkey makes over its
/// primary).
///
/// The hashed material is the same as for the subkey binding, only
/// the issuer differs.
pub(crate) fn hash_primary_key_binding(sig: &SignatureFields,
                                       key: &Key, subkey: &Key)
    -> Result<Vec<u8>>
{
    hash_subkey_binding(sig, key, subkey)
}

/// Computes the message digest of a user ID binding over the given
/// primary key and user ID.
pub(crate) fn hash_userid_binding(sig: &SignatureFields,
                                  key: &Key, userid: &UserID)
    -> Result<Vec<u8>>
{
    let mut h = sig.hash_algo().context()?;
    key.hash(&mut h);
    userid.hash(&mut h);
    sig.hash(&mut h);
    h.into_digest()
}

/// Computes the message digest of a user attribute binding over the
/// given primary key and user attribute.
pub(crate) fn hash_user_attribute_binding(sig: &SignatureFields,
                                          key: &Key, ua: &UserAttribute)
    -> Result<Vec<u8>>
{
    let mut h = sig.hash_algo().context()?;
    key.hash(&mut h);
    ua.hash(&mut h);
    sig.hash(&mut h);
    h.into_digest()
}

#[cfg(test)]
mod tests {
    use crate::types::HashAlgorithm;

    #[test]
    fn digest_sizes() {
        assert_eq!(HashAlgorithm::SHA1.digest_size().unwrap(), 20);
        assert_eq!(HashAlgorithm::SHA224.digest_size().unwrap(), 28);
        assert_eq!(HashAlgorithm::SHA256.digest_size().unwrap(), 32);
        assert_eq!(HashAlgorithm::SHA384.digest_size().unwrap(), 48);
        assert_eq!(HashAlgorithm::SHA512.digest_size().unwrap(), 64);
        assert_eq!(HashAlgorithm::MD5.digest_size().unwrap(), 16);
        assert_eq!(HashAlgorithm::RipeMD.digest_size().unwrap(), 20);
    }

    #[test]
    fn sha1_known_answer() {
        let mut ctx = HashAlgorithm::SHA1.context().unwrap();
        ctx.update(b"abc");
        let mut digest = [0u8; 20];
        ctx.digest(&mut digest).unwrap();
        assert_eq!(crate::fmt::hex::encode(digest),
                   "A9993E364706816ABA3E25717850C26C9CD0D89D");
    }

    #[test]
    fn context_resets_on_digest() {
        let mut ctx = HashAlgorithm::SHA256.context().unwrap();
        ctx.update(b"abc");
        let mut first = [0u8; 32];
        ctx.digest(&mut first).unwrap();

        ctx.update(b"abc");
        let mut second = [0u8; 32];
        ctx.digest(&mut second).unwrap();
        assert_eq!(first, second);
    }
}
