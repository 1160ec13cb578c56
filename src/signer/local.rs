//! In-process signing with a secp256k1 key.
//!
//! # Security
//! - Keys are never logged or serialized
//! - Keystore-backed keys are decrypted inside `sign` and dropped after it

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as _;
use std::sync::Arc;

use crate::signer::keystore::Keystore;
use crate::signer::{chain_id_too_large, SignerError};
use crate::transaction::{SignatureValues, SignedTransaction, UnsignedTransaction};

/// Default environment variable for an unlocked private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "HMY_PRIVATE_KEY";

#[derive(Clone)]
enum KeySource {
    Unlocked(PrivateKeySigner),
    Keystore {
        keystore: Arc<dyn Keystore>,
        address: Address,
        passphrase: String,
    },
}

#[derive(Clone)]
pub struct LocalSigner {
    source: KeySource,
}

impl LocalSigner {
    /// Create a signer from a hex-encoded private key (with or without 0x prefix).
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, SignerError> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| SignerError::InvalidKey(format!("{}", e)))?;

        tracing::info!(address = %signer.address(), "Local signer initialized");
        Ok(Self {
            source: KeySource::Unlocked(signer),
        })
    }

    /// Load the private key from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, SignerError> {
        let private_key =
            std::env::var(var).map_err(|_| SignerError::MissingEnv(var.to_string()))?;
        Self::from_private_key(&private_key)
    }

    /// Sign with `address`'s keystore entry, unlocked with `passphrase` per call.
    pub fn from_keystore(
        keystore: Arc<dyn Keystore>,
        address: Address,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            source: KeySource::Keystore {
                keystore,
                address,
                passphrase: passphrase.into(),
            },
        }
    }

    /// Address this signer is expected to sign as.
    pub fn address(&self) -> Address {
        match &self.source {
            KeySource::Unlocked(signer) => signer.address(),
            KeySource::Keystore { address, .. } => *address,
        }
    }

    /// Sign the replay-protected hash of `unsigned`.
    pub async fn sign(
        &self,
        unsigned: UnsignedTransaction,
        chain_id: Option<u64>,
    ) -> Result<(SignedTransaction, Address), SignerError> {
        let hash = unsigned.signing_hash(chain_id);
        let (signature, address) = match &self.source {
            KeySource::Unlocked(signer) => (sign_hash(signer, hash).await?, signer.address()),
            KeySource::Keystore {
                keystore,
                address,
                passphrase,
            } => {
                let signer = keystore.unlock(*address, passphrase)?;
                (sign_hash(&signer, hash).await?, signer.address())
            }
        };

        let values = SignatureValues::from_signature(&signature, chain_id)
            .ok_or_else(|| chain_id_too_large(chain_id))?;
        Ok((unsigned.into_signed(values), address))
    }
}

async fn sign_hash(
    signer: &PrivateKeySigner,
    hash: alloy::primitives::B256,
) -> Result<alloy::signers::Signature, SignerError> {
    signer
        .sign_hash(&hash)
        .await
        .map_err(|e| SignerError::Signature(format!("Signing failed: {}", e)))
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            KeySource::Unlocked(_) => "unlocked",
            KeySource::Keystore { .. } => "keystore",
        };
        f.debug_struct("LocalSigner")
            .field("address", &self.address())
            .field("source", &source)
            .finish()
    }
}
