//! Fixed-width identities.
//!
//! An [`Address`] is 60 upper-case ASCII letters: 56 letters encoding a 32-byte
//! Ed25519 public key in base 26 (four little-endian 8-byte limbs of 14 letters
//! each), followed by a 4-letter checksum. Addresses are `Copy` values and are
//! compared by plain equality.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 60;

const BODY_LEN: usize = 56;
const LIMB_LETTERS: usize = 14;
const CHECKSUM_LETTERS: usize = 4;
const CHECKSUM_MASK: u32 = 0x3_FFFF;

/// A 60-letter participant or contract identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-`A` address. Used as the caller before any invocation is set.
    pub const NULL: Self = Self([b'A'; ADDRESS_LEN]);

    /// Derives the address of a public key.
    #[must_use]
    pub fn from_public_key(key: &[u8; 32]) -> Self {
        let mut letters = [b'A'; ADDRESS_LEN];

        for (limb_index, chunk) in key.chunks_exact(8).enumerate() {
            let mut limb_bytes = [0u8; 8];
            limb_bytes.copy_from_slice(chunk);
            let mut limb = u64::from_le_bytes(limb_bytes);
            for slot in &mut letters[limb_index * LIMB_LETTERS..(limb_index + 1) * LIMB_LETTERS] {
                *slot = b'A' + (limb % 26) as u8;
                limb /= 26;
            }
        }

        let mut checksum = checksum(key);
        for slot in &mut letters[BODY_LEN..] {
            *slot = b'A' + (checksum % 26) as u8;
            checksum /= 26;
        }

        Self(letters)
    }

    /// Address of the contract deployed at `index`.
    ///
    /// The contract index occupies the first four bytes of an otherwise zero key.
    #[must_use]
    pub fn contract(index: u32) -> Self {
        let mut key = [0u8; 32];
        key[..4].copy_from_slice(&index.to_le_bytes());
        Self::from_public_key(&key)
    }

    /// Decodes the public key encoded in the first 56 letters.
    ///
    /// Returns `None` if a limb does not fit in 64 bits.
    #[must_use]
    pub fn public_key(&self) -> Option<[u8; 32]> {
        let mut key = [0u8; 32];
        for (limb_index, out) in key.chunks_exact_mut(8).enumerate() {
            let letters = &self.0[limb_index * LIMB_LETTERS..(limb_index + 1) * LIMB_LETTERS];
            let mut limb: u64 = 0;
            for &letter in letters.iter().rev() {
                limb = limb
                    .checked_mul(26)?
                    .checked_add(u64::from(letter - b'A'))?;
            }
            out.copy_from_slice(&limb.to_le_bytes());
        }
        Some(key)
    }

    /// Returns true if the trailing checksum matches the encoded key.
    #[must_use]
    pub fn verify_checksum(&self) -> bool {
        self.public_key()
            .is_some_and(|key| Self::from_public_key(&key) == *self)
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// The raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

fn checksum(key: &[u8; 32]) -> u32 {
    let hash = blake3::hash(key);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]) & CHECKSUM_MASK
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LEN {
            return Err(CoreError::InvalidAddress(format!(
                "address must be {ADDRESS_LEN} letters, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(CoreError::InvalidAddress(format!(
                "address must contain only A-Z: {s}"
            )));
        }

        let mut letters = [0u8; ADDRESS_LEN];
        letters.copy_from_slice(s.as_bytes());
        Ok(Self(letters))
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.as_str()).finish()
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
