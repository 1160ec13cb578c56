//! Transaction shapes and their signed form.

use alloy::hex;
use alloy::primitives::{keccak256, Address, Bytes, Signature, SignatureError, B256, U256};
use serde_json::{json, Map, Value};

use crate::common::to_bech32;
use crate::transaction::encoding;

/// Transfer between two shards; same-shard when both ids match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossShardTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub shard_id: u32,
    pub to_shard_id: u32,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Legacy Ethereum-shaped transaction served by the `eth` namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTransaction {
    CrossShard(CrossShardTransaction),
    Eth(EthTransaction),
}

impl UnsignedTransaction {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::CrossShard(tx) => tx.nonce,
            Self::Eth(tx) => tx.nonce,
        }
    }

    pub fn gas_price(&self) -> U256 {
        match self {
            Self::CrossShard(tx) => tx.gas_price,
            Self::Eth(tx) => tx.gas_price,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::CrossShard(tx) => tx.gas_limit,
            Self::Eth(tx) => tx.gas_limit,
        }
    }

    pub fn to(&self) -> Address {
        match self {
            Self::CrossShard(tx) => tx.to,
            Self::Eth(tx) => tx.to,
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            Self::CrossShard(tx) => tx.value,
            Self::Eth(tx) => tx.value,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Self::CrossShard(tx) => &tx.data,
            Self::Eth(tx) => &tx.data,
        }
    }

    /// RLP list that gets hashed and signed; `chain_id` appends the
    /// `[chain_id, 0, 0]` replay-protection suffix.
    pub fn signing_payload(&self, chain_id: Option<u64>) -> Vec<u8> {
        encoding::signing_payload(self, chain_id)
    }

    pub fn signing_hash(&self, chain_id: Option<u64>) -> B256 {
        keccak256(self.signing_payload(chain_id))
    }

    pub fn into_signed(self, signature: SignatureValues) -> SignedTransaction {
        SignedTransaction::new(self, signature)
    }

    /// JSON view with quantities as `0x` hex. Cross-shard receivers are
    /// rendered in bech32, Ethereum-style receivers in hex.
    pub fn to_json(&self) -> Value {
        Value::Object(self.json_fields())
    }

    fn json_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("nonce".into(), json!(format!("0x{:x}", self.nonce())));
        fields.insert("gasPrice".into(), json!(format!("0x{:x}", self.gas_price())));
        fields.insert("gas".into(), json!(format!("0x{:x}", self.gas_limit())));
        match self {
            Self::CrossShard(tx) => {
                fields.insert("shardID".into(), json!(tx.shard_id));
                fields.insert("toShardID".into(), json!(tx.to_shard_id));
                fields.insert("to".into(), json!(to_bech32(&tx.to)));
            }
            Self::Eth(tx) => {
                fields.insert("to".into(), json!(tx.to.to_checksum(None)));
            }
        }
        fields.insert("value".into(), json!(format!("0x{:x}", self.value())));
        fields.insert("input".into(), json!(hex::encode_prefixed(self.data())));
        fields
    }
}

/// Recoverable signature with the chain id folded into `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureValues {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl SignatureValues {
    /// `v = parity + 35 + 2 * chain_id` when replay protected, else `parity + 27`.
    ///
    /// `None` when the chain id is too large for `v` to fit in a `u64`.
    pub fn from_signature(signature: &Signature, chain_id: Option<u64>) -> Option<Self> {
        let parity = u64::from(signature.v());
        let v = match chain_id {
            Some(id) => id.checked_mul(2)?.checked_add(35 + parity)?,
            None => parity + 27,
        };
        Some(Self {
            v,
            r: signature.r(),
            s: signature.s(),
        })
    }

    /// Chain id encoded in `v`, if any.
    pub fn chain_id(&self) -> Option<u64> {
        (self.v >= 35).then(|| (self.v - 35) / 2)
    }

    pub fn y_parity(&self) -> bool {
        if self.v >= 35 {
            (self.v - 35) % 2 == 1
        } else {
            self.v == 28
        }
    }

    pub fn to_signature(&self) -> Signature {
        Signature::new(self.r, self.s, self.y_parity())
    }
}

/// A signed transaction together with its wire encoding and hash.
///
/// Never mutated after construction; re-signing builds a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: UnsignedTransaction,
    signature: SignatureValues,
    raw: Bytes,
    hash: B256,
}

impl SignedTransaction {
    pub fn new(transaction: UnsignedTransaction, signature: SignatureValues) -> Self {
        let raw = Bytes::from(encoding::encode_signed(&transaction, &signature));
        let hash = keccak256(&raw);
        Self {
            transaction,
            signature,
            raw,
            hash,
        }
    }

    /// Decode a raw cross-shard transaction.
    pub fn decode_cross_shard(raw: &[u8]) -> Result<Self, alloy_rlp::Error> {
        let (transaction, signature) = encoding::decode_cross_shard(raw)?;
        Ok(Self::new(transaction, signature))
    }

    /// Decode a raw legacy Ethereum transaction.
    pub fn decode_eth(raw: &[u8]) -> Result<Self, alloy_rlp::Error> {
        let (transaction, signature) = encoding::decode_eth(raw)?;
        Ok(Self::new(transaction, signature))
    }

    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    pub fn signature(&self) -> &SignatureValues {
        &self.signature
    }

    /// RLP bytes sent to `sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn raw_hex(&self) -> String {
        hex::encode_prefixed(&self.raw)
    }

    /// Keccak hash of the raw encoding.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Address whose key produced the signature.
    pub fn recover_signer(&self) -> Result<Address, SignatureError> {
        let digest = self.transaction.signing_hash(self.signature.chain_id());
        self.signature
            .to_signature()
            .recover_address_from_prehash(&digest)
    }

    pub fn to_json(&self) -> Value {
        let mut fields = self.transaction.json_fields();
        fields.insert("v".into(), json!(format!("0x{:x}", self.signature.v)));
        fields.insert("r".into(), json!(format!("0x{:x}", self.signature.r)));
        fields.insert("s".into(), json!(format!("0x{:x}", self.signature.s)));
        fields.insert("hash".into(), json!(hex::encode_prefixed(self.hash)));
        Value::Object(fields)
    }
}
