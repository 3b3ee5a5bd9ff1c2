//! Core ledger types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Integer type, amounts are expressed in base units
pub type Integer = i64;

/// OutPoint: the UTXO key, (transaction id, output index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: Natural,
}

/// Transaction Input: claims one prior output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    /// DER-encoded ECDSA signature over the input's signing payload
    pub signature: ByteString,
}

/// Transaction Output: value paid to the holder of `owner`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Integer,
    /// SEC1-encoded secp256k1 public key
    pub owner: ByteString,
}

/// Transaction: ordered inputs and outputs. A coinbase has no inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

/// Block as supplied by an external assembler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// `None` only for genesis
    pub prev_block_hash: Option<Hash>,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
    pub hash: Hash,
}

/// UTXO Set: OutPoint → claimable output
pub type UtxoSet = HashMap<OutPoint, TransactionOutput>;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}
