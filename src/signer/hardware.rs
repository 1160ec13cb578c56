//! Signing delegated to an external device.
//!
//! The device receives the canonical RLP signing payload and answers with a
//! 65-byte `r || s || v` signature. The signer recovers the public key over
//! `keccak(payload)` to learn which account the device actually holds.

use alloy::hex;
use alloy::primitives::{keccak256, Address, Signature};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::common::to_bech32;
use crate::signer::{chain_id_too_large, SignerError};
use crate::transaction::{SignatureValues, SignedTransaction, UnsignedTransaction};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device not connected")]
    Disconnected,

    #[error("signing rejected on device")]
    Rejected,

    #[error("device transport: {0}")]
    Transport(String),
}

/// Transport to a hardware wallet.
#[async_trait]
pub trait HardwareDevice: Send + Sync {
    async fn sign_raw_payload(&self, payload: &[u8]) -> Result<[u8; 65], DeviceError>;
}

#[derive(Clone)]
pub struct HardwareSigner {
    device: Arc<dyn HardwareDevice>,
}

impl HardwareSigner {
    pub fn new(device: Arc<dyn HardwareDevice>) -> Self {
        Self { device }
    }

    /// Have the device sign `unsigned`; returns the address recovered from
    /// the device's signature.
    pub async fn sign(
        &self,
        unsigned: UnsignedTransaction,
        chain_id: Option<u64>,
    ) -> Result<(SignedTransaction, Address), SignerError> {
        let payload = unsigned.signing_payload(chain_id);
        let raw = self.device.sign_raw_payload(&payload).await?;

        let signature = Signature::from_raw_array(&raw)
            .map_err(|e| SignerError::Signature(e.to_string()))?;
        let public_key = signature
            .recover_from_prehash(&keccak256(&payload))
            .map_err(|e| SignerError::Signature(e.to_string()))?;
        let address = Address::from_public_key(&public_key);

        tracing::debug!(
            public_key = %hex::encode(public_key.to_encoded_point(true).as_bytes()),
            signer = %to_bech32(&address),
            "Recovered hardware signer"
        );

        let values = SignatureValues::from_signature(&signature, chain_id)
            .ok_or_else(|| chain_id_too_large(chain_id))?;
        Ok((unsigned.into_signed(values), address))
    }
}
