//! RLP wire encoding of transactions.
//!
//! Cross-shard layout:
//! `[nonce, gasPrice, gasLimit, shardID, toShardID, to, value, data, v, r, s]`.
//! Ethereum layout drops the two shard ids. The signing payload replaces
//! `v, r, s` with `chainId, 0, 0` when replay protected, or omits them.

use alloy::primitives::{Address, Bytes, U256};
use alloy_rlp::{Decodable, Encodable, Error, Header};

use crate::transaction::types::{
    CrossShardTransaction, EthTransaction, SignatureValues, UnsignedTransaction,
};

fn encode_fields(tx: &UnsignedTransaction, out: &mut Vec<u8>) {
    match tx {
        UnsignedTransaction::CrossShard(tx) => {
            tx.nonce.encode(out);
            tx.gas_price.encode(out);
            tx.gas_limit.encode(out);
            tx.shard_id.encode(out);
            tx.to_shard_id.encode(out);
            tx.to.encode(out);
            tx.value.encode(out);
            tx.data.encode(out);
        }
        UnsignedTransaction::Eth(tx) => {
            tx.nonce.encode(out);
            tx.gas_price.encode(out);
            tx.gas_limit.encode(out);
            tx.to.encode(out);
            tx.value.encode(out);
            tx.data.encode(out);
        }
    }
}

fn wrap_list(payload: Vec<u8>) -> Vec<u8> {
    let header = Header {
        list: true,
        payload_length: payload.len(),
    };
    let mut out = Vec::with_capacity(payload.len() + 9);
    header.encode(&mut out);
    out.extend_from_slice(&payload);
    out
}

pub fn signing_payload(tx: &UnsignedTransaction, chain_id: Option<u64>) -> Vec<u8> {
    let mut payload = Vec::new();
    encode_fields(tx, &mut payload);
    if let Some(id) = chain_id {
        id.encode(&mut payload);
        0u8.encode(&mut payload);
        0u8.encode(&mut payload);
    }
    wrap_list(payload)
}

pub fn encode_signed(tx: &UnsignedTransaction, signature: &SignatureValues) -> Vec<u8> {
    let mut payload = Vec::new();
    encode_fields(tx, &mut payload);
    signature.v.encode(&mut payload);
    signature.r.encode(&mut payload);
    signature.s.encode(&mut payload);
    wrap_list(payload)
}

/// Body of the single top-level list in `raw`.
fn list_body(raw: &[u8]) -> Result<&[u8], Error> {
    let mut buf = raw;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(Error::UnexpectedString);
    }
    if buf.len() < header.payload_length {
        return Err(Error::InputTooShort);
    }
    let (body, rest) = buf.split_at(header.payload_length);
    if !rest.is_empty() {
        return Err(Error::Custom("trailing bytes after transaction"));
    }
    Ok(body)
}

fn decode_signature(body: &mut &[u8]) -> Result<SignatureValues, Error> {
    let signature = SignatureValues {
        v: u64::decode(body)?,
        r: U256::decode(body)?,
        s: U256::decode(body)?,
    };
    if !body.is_empty() {
        return Err(Error::Custom("unexpected fields after signature"));
    }
    Ok(signature)
}

pub fn decode_cross_shard(raw: &[u8]) -> Result<(UnsignedTransaction, SignatureValues), Error> {
    let mut body = list_body(raw)?;
    let tx = CrossShardTransaction {
        nonce: u64::decode(&mut body)?,
        gas_price: U256::decode(&mut body)?,
        gas_limit: u64::decode(&mut body)?,
        shard_id: u32::decode(&mut body)?,
        to_shard_id: u32::decode(&mut body)?,
        to: Address::decode(&mut body)?,
        value: U256::decode(&mut body)?,
        data: Bytes::decode(&mut body)?,
    };
    let signature = decode_signature(&mut body)?;
    Ok((UnsignedTransaction::CrossShard(tx), signature))
}

pub fn decode_eth(raw: &[u8]) -> Result<(UnsignedTransaction, SignatureValues), Error> {
    let mut body = list_body(raw)?;
    let tx = EthTransaction {
        nonce: u64::decode(&mut body)?,
        gas_price: U256::decode(&mut body)?,
        gas_limit: u64::decode(&mut body)?,
        to: Address::decode(&mut body)?,
        value: U256::decode(&mut body)?,
        data: Bytes::decode(&mut body)?,
    };
    let signature = decode_signature(&mut body)?;
    Ok((UnsignedTransaction::Eth(tx), signature))
}
