//! Ed25519 keys behind participant identities.
//!
//! A [`Wallet`] signs invocations; its [`PublicKey`] derives the [`Address`]
//! the contracts store and compare against.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::{Address, CoreError};

/// An Ed25519 keypair for a marketplace participant.
#[derive(Debug)]
pub struct Wallet {
    signing_key: SigningKey,
}

/// A public key, used to verify signatures and derive addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

/// An Ed25519 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(DalekSignature);

impl Wallet {
    /// Creates a new wallet with a randomly generated keypair.
    #[must_use]
    pub fn new() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Restores a wallet from its 32-byte secret key.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Restores a wallet from a base58-encoded secret key.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Crypto` if the input is not 32 bytes of base58.
    pub fn from_base58(secret: &str) -> Result<Self, CoreError> {
        let bytes = bs58::decode(secret)
            .into_vec()
            .map_err(|e| CoreError::Crypto(format!("invalid base58: {e}")))?;
        let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::Crypto(format!("secret key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_bytes(&secret))
    }

    /// Returns the raw bytes of the signing key.
    ///
    /// # Security
    ///
    /// This exposes the private key material. Handle with care.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The secret key as base58.
    #[must_use]
    pub fn to_base58(&self) -> String {
        bs58::encode(self.signing_key.to_bytes()).into_string()
    }

    /// Returns the public key for this wallet.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    /// The address derived from this wallet's public key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Signs a message with this wallet's private key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message))
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicKey {
    /// Returns the raw bytes of the public key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Creates a public key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Crypto` if the bytes are not a valid curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CoreError> {
        VerifyingKey::from_bytes(bytes)
            .map(PublicKey)
            .map_err(|e| CoreError::Crypto(e.to_string()))
    }

    /// Recovers the public key encoded in an address.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAddress` if the address does not encode a
    /// valid key or its checksum is wrong.
    pub fn from_address(address: &Address) -> Result<Self, CoreError> {
        if !address.verify_checksum() {
            return Err(CoreError::InvalidAddress(format!(
                "checksum mismatch: {address}"
            )));
        }
        let bytes = address
            .public_key()
            .ok_or_else(|| CoreError::InvalidAddress(address.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The address derived from this key.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_public_key(self.0.as_bytes())
    }

    /// Verifies a signature against a message.
    ///
    /// Uses strict verification to reject malleable signatures.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSignature` if the signature is invalid.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CoreError> {
        self.0
            .verify_strict(message, &signature.0)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl Signature {
    /// Returns the raw bytes of the signature.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Creates a signature from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(DalekSignature::from_bytes(bytes))
    }
}
