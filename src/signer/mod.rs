//! Signing capability.
//!
//! # Data Flow
//! ```text
//! UnsignedTransaction + chain id
//!     → Signer::Local    (key in memory, or decrypted from a keystore for this call)
//!     → Signer::Hardware (canonical payload → device → recovered public key)
//!     → (SignedTransaction, signer address)
//!     → compared with the expected sender → SignerMismatch on difference
//! ```
//!
//! # Design Decisions
//! - Both variants produce the same `(v, r, s)` shape
//! - The sender check happens here so no caller can skip it

pub mod hardware;
pub mod keystore;
pub mod local;

pub use hardware::{DeviceError, HardwareDevice, HardwareSigner};
pub use keystore::{Keystore, KeystoreDir};
pub use local::{LocalSigner, PRIVATE_KEY_ENV_VAR};

use alloy::primitives::Address;
use thiserror::Error;

use crate::common::{to_bech32, MAX_CHAIN_ID};
use crate::transaction::{SignedTransaction, TxError, UnsignedTransaction};

/// Failures obtaining or using key material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid private key format: {0}")]
    InvalidKey(String),

    #[error("environment variable {0} not set")]
    MissingEnv(String),

    #[error("keystore error: {0}")]
    Keystore(String),

    #[error("no keystore entry for {0}")]
    UnknownAccount(String),

    #[error("hardware device error: {0}")]
    Device(#[from] DeviceError),

    #[error("signature error: {0}")]
    Signature(String),
}

pub(crate) fn chain_id_too_large(chain_id: Option<u64>) -> SignerError {
    SignerError::Signature(format!(
        "chain-id {} exceeds the maximum of {}",
        chain_id.unwrap_or_default(),
        MAX_CHAIN_ID
    ))
}

impl From<SignerError> for TxError {
    fn from(err: SignerError) -> Self {
        TxError::Signer(err.to_string())
    }
}

/// The signing backend bound to one controller.
pub enum Signer {
    Local(LocalSigner),
    Hardware(HardwareSigner),
}

impl Signer {
    /// Sign `unsigned` and check the signature belongs to `expected_sender`.
    pub async fn sign(
        &self,
        unsigned: UnsignedTransaction,
        chain_id: Option<u64>,
        expected_sender: Address,
    ) -> Result<(SignedTransaction, Address), TxError> {
        if chain_id.is_some_and(|id| id > MAX_CHAIN_ID) {
            return Err(chain_id_too_large(chain_id).into());
        }

        let (signed, signer_address) = match self {
            Self::Local(signer) => signer.sign(unsigned, chain_id).await?,
            Self::Hardware(signer) => signer.sign(unsigned, chain_id).await?,
        };

        if signer_address != expected_sender {
            return Err(TxError::SignerMismatch {
                expected: to_bech32(&expected_sender),
                actual: to_bech32(&signer_address),
            });
        }
        Ok((signed, signer_address))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Hardware(_) => "hardware",
        }
    }
}

impl From<LocalSigner> for Signer {
    fn from(signer: LocalSigner) -> Self {
        Self::Local(signer)
    }
}

impl From<HardwareSigner> for Signer {
    fn from(signer: HardwareSigner) -> Self {
        Self::Hardware(signer)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(signer) => f.debug_tuple("Local").field(signer).finish(),
            Self::Hardware(_) => f.write_str("Hardware"),
        }
    }
}
