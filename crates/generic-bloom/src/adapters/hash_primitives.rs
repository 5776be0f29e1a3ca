//! Hash primitive adapters
//!
//! Concrete implementations of [`HashPrimitive`] and [`KeyedHashPrimitive`]:
//!
//! - `DigestPrimitive` - any fixed-output `Digest` (SHA-2, SHA-3, Keccak)
//! - `KeyedPrimitive` - any variable-key `Mac` (HMAC-SHA256, HMAC-SHA512)
//! - `Murmur3Primitive` - MurmurHash3 x64/128, seedable, non-cryptographic
//! - `HashCodePrimitive` - the runtime `Hash` trait over SipHash, 32-bit
//!
//! The fallback `HashCodePrimitive` produces correlated outputs compared to
//! the digests and is only suited to small, simple filters.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::marker::PhantomData;

use hmac::digest::{KeyInit, OutputSizeUser};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::{Keccak256, Sha3_256, Sha3_512};
use siphasher::sip::SipHasher;

use crate::ports::{HashPrimitive, KeyedHashPrimitive};

/// Fixed-output digest wrapped as a hash primitive.
pub struct DigestPrimitive<D> {
    name: &'static str,
    _digest: PhantomData<fn() -> D>,
}

impl<D: Digest> DigestPrimitive<D> {
    /// Wrap digest `D` under a display name.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            _digest: PhantomData,
        }
    }
}

impl DigestPrimitive<Sha256> {
    pub fn sha256() -> Self {
        Self::named("sha256")
    }
}

impl DigestPrimitive<Sha384> {
    pub fn sha384() -> Self {
        Self::named("sha384")
    }
}

impl DigestPrimitive<Sha512> {
    pub fn sha512() -> Self {
        Self::named("sha512")
    }
}

impl DigestPrimitive<Sha3_256> {
    pub fn sha3_256() -> Self {
        Self::named("sha3-256")
    }
}

impl DigestPrimitive<Sha3_512> {
    pub fn sha3_512() -> Self {
        Self::named("sha3-512")
    }
}

impl DigestPrimitive<Keccak256> {
    pub fn keccak256() -> Self {
        Self::named("keccak256")
    }
}

impl<D> fmt::Debug for DigestPrimitive<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestPrimitive")
            .field("name", &self.name)
            .finish()
    }
}

impl<D: Digest + 'static> HashPrimitive for DigestPrimitive<D> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn output_bits(&self) -> usize {
        <D as Digest>::output_size() * 8
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        D::digest(data).to_vec()
    }
}

/// Keyed MAC wrapped as a hash primitive.
///
/// `M` must accept keys of any length, as every HMAC does. Unkeyed
/// `compute` calls use the primitive's base key (empty by default).
pub struct KeyedPrimitive<M> {
    name: &'static str,
    base_key: Vec<u8>,
    _mac: PhantomData<fn() -> M>,
}

impl<M: Mac + KeyInit> KeyedPrimitive<M> {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            base_key: Vec::new(),
            _mac: PhantomData,
        }
    }

    /// Key used by unkeyed `compute` calls.
    pub fn with_base_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.base_key = key.into();
        self
    }
}

impl KeyedPrimitive<Hmac<Sha256>> {
    pub fn hmac_sha256() -> Self {
        Self::named("hmac-sha256")
    }
}

impl KeyedPrimitive<Hmac<Sha512>> {
    pub fn hmac_sha512() -> Self {
        Self::named("hmac-sha512")
    }
}

impl<M> fmt::Debug for KeyedPrimitive<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedPrimitive")
            .field("name", &self.name)
            .field("base_key_len", &self.base_key.len())
            .finish()
    }
}

impl<M: Mac + KeyInit + 'static> HashPrimitive for KeyedPrimitive<M> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn output_bits(&self) -> usize {
        <M as OutputSizeUser>::output_size() * 8
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        self.compute_keyed(&self.base_key, data)
    }
}

impl<M: Mac + KeyInit + 'static> KeyedHashPrimitive for KeyedPrimitive<M> {
    fn compute_keyed(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC key size is always valid");
        Mac::update(&mut mac, data);
        mac.finalize().into_bytes().to_vec()
    }
}

/// MurmurHash3 x64/128 as a seedable, non-cryptographic primitive.
#[derive(Clone, Debug, Default)]
pub struct Murmur3Primitive {
    seed: u32,
}

impl Murmur3Primitive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    fn hash(&self, data: &[u8], seed: u32) -> Vec<u8> {
        let mut cursor = Cursor::new(data);
        let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
        hash.to_le_bytes().to_vec()
    }
}

impl HashPrimitive for Murmur3Primitive {
    fn name(&self) -> &'static str {
        "murmur3-x64-128"
    }

    fn output_bits(&self) -> usize {
        128
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        self.hash(data, self.seed)
    }
}

impl KeyedHashPrimitive for Murmur3Primitive {
    /// Folds the key into the 32-bit seed, four bytes at a time.
    fn compute_keyed(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        let seed = key
            .chunks(4)
            .fold(self.seed, |acc, chunk| acc.rotate_left(5) ^ read_u32_le(chunk));
        self.hash(data, seed)
    }
}

/// The runtime's `Hash` trait driven through SipHash-2-4, truncated to 32 bits.
#[derive(Clone, Debug, Default)]
pub struct HashCodePrimitive {
    key0: u64,
    key1: u64,
}

impl HashCodePrimitive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(key0: u64, key1: u64) -> Self {
        Self { key0, key1 }
    }
}

impl HashPrimitive for HashCodePrimitive {
    fn name(&self) -> &'static str {
        "hash-code"
    }

    fn output_bits(&self) -> usize {
        32
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = SipHasher::new_with_keys(self.key0, self.key1);
        data.hash(&mut hasher);
        (hasher.finish() as u32).to_le_bytes().to_vec()
    }
}

/// Reads up to four bytes as a little-endian u32, zero-padding short input.
fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    let len = bytes.len().min(4);
    buf[..len].copy_from_slice(&bytes[..len]);
    u32::from_le_bytes(buf)
}
