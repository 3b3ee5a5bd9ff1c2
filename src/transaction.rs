//! Transaction validation against a UTXO set

use crate::crypto::{sha256d_hash, sign_message, verify_signature};
use crate::error::{LedgerError, Result};
use crate::types::*;
use std::collections::HashSet;

/// CheckTransaction: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid} × ℤ
///
/// A transaction tx = (ins, outs) is valid against UTXO set us iff:
/// 1. ∀i ∈ ins: i.prevout ∈ us
/// 2. ∀i ∈ ins: i.signature verifies RawDataToSign(tx, i) under us(i.prevout).owner
/// 3. No prevout is claimed twice within ins
/// 4. ∀o ∈ outs: o.value ≥ 0
/// 5. Σ us(i.prevout).value ≥ Σ o.value
/// 6. ∀k: (tx.id, k) ∉ us
///
/// On success the fee (total_in - total_out) is returned alongside.
pub fn check_transaction(tx: &Transaction, utxo_set: &UtxoSet) -> (ValidationResult, Integer) {
    let mut claimed: HashSet<OutPoint> = HashSet::with_capacity(tx.inputs.len());
    let mut total_input_value: Integer = 0;

    for (i, input) in tx.inputs.iter().enumerate() {
        // 1. Input must reference an unspent output
        let Some(utxo) = utxo_set.get(&input.prevout) else {
            return invalid(format!("Input {} not found in UTXO set", i));
        };

        // 2. Signature must verify under the referenced owner
        let message = raw_data_to_sign(tx, i);
        if !verify_signature(&utxo.owner, &message, &input.signature) {
            return invalid(format!("Invalid signature on input {}", i));
        }

        // 3. No output may be claimed twice
        if !claimed.insert(input.prevout) {
            return invalid(format!("Input {} claims an output already claimed by this transaction", i));
        }

        total_input_value = match total_input_value.checked_add(utxo.value) {
            Some(total) => total,
            None => return invalid("Input value overflow".to_string()),
        };
    }

    // 4. Output values must be non-negative
    let mut total_output_value: Integer = 0;
    for (i, output) in tx.outputs.iter().enumerate() {
        if output.value < 0 {
            return invalid(format!("Negative output value {} at index {}", output.value, i));
        }
        total_output_value = match total_output_value.checked_add(output.value) {
            Some(total) => total,
            None => return invalid("Output value overflow".to_string()),
        };
    }

    // 5. Value cannot be created
    if total_input_value < total_output_value {
        return invalid(format!(
            "Insufficient input value: {} < {}",
            total_input_value, total_output_value
        ));
    }

    // 6. Outputs must not overwrite an unspent entry with the same id
    if let Some(outpoint) = find_unspent_collision(tx, utxo_set) {
        return invalid(format!("Output {} would overwrite an unspent output", outpoint.index));
    }

    (ValidationResult::Valid, total_input_value - total_output_value)
}

fn invalid(reason: String) -> (ValidationResult, Integer) {
    (ValidationResult::Invalid(reason), 0)
}

/// IsValidTx: 𝒯𝒳 × 𝒰𝒮 → {true, false}
pub fn is_valid_tx(tx: &Transaction, utxo_set: &UtxoSet) -> bool {
    check_transaction(tx, utxo_set).0.is_valid()
}

/// ApplyTransaction: us' = (us \ {i.prevout : i ∈ ins}) ∪ {(tx.id, k) ↦ outs[k]}
///
/// Assumes `tx` has already been validated against `utxo_set`.
pub fn apply_transaction(tx: &Transaction, utxo_set: &mut UtxoSet) {
    for input in &tx.inputs {
        utxo_set.remove(&input.prevout);
    }
    add_outputs(tx, utxo_set);
}

/// Insert every output of `tx` keyed by (tx.id, index)
pub fn add_outputs(tx: &Transaction, utxo_set: &mut UtxoSet) {
    let tx_id = calculate_tx_id(tx);
    for (i, output) in tx.outputs.iter().enumerate() {
        let outpoint = OutPoint {
            hash: tx_id,
            index: i as Natural,
        };
        utxo_set.insert(outpoint, output.clone());
    }
}

/// First output key of `tx` that is already present in `utxo_set`
pub fn find_unspent_collision(tx: &Transaction, utxo_set: &UtxoSet) -> Option<OutPoint> {
    let tx_id = calculate_tx_id(tx);
    (0..tx.outputs.len())
        .map(|i| OutPoint {
            hash: tx_id,
            index: i as Natural,
        })
        .find(|outpoint| utxo_set.contains_key(outpoint))
}

/// Check if transaction is coinbase
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.inputs.is_empty()
}

/// Create a coinbase paying `value` to `owner`
pub fn create_coinbase(value: Integer, owner: ByteString) -> Transaction {
    Transaction {
        inputs: vec![],
        outputs: vec![TransactionOutput { value, owner }],
    }
}

/// Transaction id: double SHA-256 of the unsigned encoding
pub fn calculate_tx_id(tx: &Transaction) -> Hash {
    sha256d_hash(&encode_unsigned(tx))
}

/// RawDataToSign: unsigned encoding of tx followed by the input index
pub fn raw_data_to_sign(tx: &Transaction, input_index: usize) -> ByteString {
    let mut data = encode_unsigned(tx);
    data.extend_from_slice(&(input_index as u64).to_le_bytes());
    data
}

/// Sign input `input_index` of `tx` with a raw 32-byte secret key
pub fn sign_input(tx: &mut Transaction, input_index: usize, secret_key: &[u8]) -> Result<()> {
    if input_index >= tx.inputs.len() {
        return Err(LedgerError::InputIndexOutOfRange {
            index: input_index,
            inputs: tx.inputs.len(),
        });
    }

    let signature = sign_message(secret_key, &raw_data_to_sign(tx, input_index))?;
    tx.inputs[input_index].signature = signature;
    Ok(())
}

/// Canonical encoding with every signature stripped
fn encode_unsigned(tx: &Transaction) -> ByteString {
    let mut data = Vec::new();

    data.extend_from_slice(&encode_varint(tx.inputs.len() as u64));
    for input in &tx.inputs {
        data.extend_from_slice(&input.prevout.hash);
        data.extend_from_slice(&input.prevout.index.to_le_bytes());
    }

    data.extend_from_slice(&encode_varint(tx.outputs.len() as u64));
    for output in &tx.outputs {
        data.extend_from_slice(&output.value.to_le_bytes());
        data.extend_from_slice(&encode_varint(output.owner.len() as u64));
        data.extend_from_slice(&output.owner);
    }

    data
}

/// Encode a number as a Bitcoin varint
fn encode_varint(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut result = vec![0xfd];
        result.extend_from_slice(&(value as u16).to_le_bytes());
        result
    } else if value <= 0xffffffff {
        let mut result = vec![0xfe];
        result.extend_from_slice(&(value as u32).to_le_bytes());
        result
    } else {
        let mut result = vec![0xff];
        result.extend_from_slice(&value.to_le_bytes());
        result
    }
}
